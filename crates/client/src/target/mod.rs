//! Target validation, run before any browser session is acquired.
//!
//! ### URL Canonicalization
//! - Trim whitespace, require an explicit `http`/`https` scheme
//! - Lowercase host, remove fragments
//! - Preserve query string
//!
//! ### Private-address gate
//! - Resolve DNS and validate all A/AAAA answers are public.
//! - Deny loopback, RFC 1918, link-local, multicast, unique-local.

pub mod gate;
pub mod url;

pub use gate::{SsrfError, ensure_public_host, is_private_or_reserved, validate_ip};
pub use url::{UrlError, canonicalize};

use parodist_core::Error;

/// Canonicalize `input` and, unless `allow_private` is set, make sure it
/// resolves to public addresses only.
pub async fn resolve_target(input: &str, allow_private: bool) -> Result<::url::Url, Error> {
    let url = canonicalize(input).map_err(|e| Error::InvalidInput(e.to_string()))?;

    if !allow_private {
        ensure_public_host(&url).await.map_err(|e| match e {
            SsrfError::BlockedIp(_) => Error::BlockedTarget(format!("{url}: {e}")),
            SsrfError::DnsError(_) => Error::Navigation(e.to_string()),
        })?;
    }

    Ok(url)
}
