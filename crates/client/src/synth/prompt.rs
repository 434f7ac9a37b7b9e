//! Prompt construction for parody synthesis.

use parodist_core::{ColorPalette, Fingerprint, FontPalette, Headings, Metadata, StyleSamples};
use serde::Serialize;

/// Default truncation budget for the text and markup excerpts, in characters.
pub const DEFAULT_EXCERPT_CHARS: usize = 10_000;

/// Borrowed view of a fingerprint without its two unbounded fields.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct StructuredView<'a> {
    metadata: &'a Metadata,
    style_samples: &'a StyleSamples,
    color_palette: &'a ColorPalette,
    font_palette: &'a FontPalette,
    headings: &'a Headings,
}

impl<'a> From<&'a Fingerprint> for StructuredView<'a> {
    fn from(fp: &'a Fingerprint) -> Self {
        Self {
            metadata: &fp.metadata,
            style_samples: &fp.style_samples,
            color_palette: &fp.color_palette,
            font_palette: &fp.font_palette,
            headings: &fp.headings,
        }
    }
}

/// Per-request working set derived from a [`Fingerprint`].
///
/// The fingerprint is only borrowed; the excerpts are bounded prefixes and the
/// structured block never carries the text or markup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParodyRequest<'a> {
    pub structured: String,
    pub text_excerpt: &'a str,
    pub markup_excerpt: &'a str,
}

impl<'a> ParodyRequest<'a> {
    pub fn from_fingerprint(fingerprint: &'a Fingerprint, excerpt_chars: usize) -> Result<Self, serde_json::Error> {
        let structured = serde_json::to_string_pretty(&StructuredView::from(fingerprint))?;

        Ok(Self {
            structured,
            text_excerpt: truncate_chars(&fingerprint.visible_text, excerpt_chars),
            markup_excerpt: truncate_chars(fingerprint.raw_markup.as_deref().unwrap_or_default(), excerpt_chars),
        })
    }

    /// Render the fixed instruction template.
    pub fn prompt(&self) -> String {
        format!(
            "Help me create a fun parody version of a website. \
I'll give you details about the original site's style, colors, fonts, and structure, \
and you'll create a humorous parody that maintains the visual style but changes the content to be funny.

**Original Site Style Info (JSON):**
{structured}

**Sample Content:**
{text}

**Sample of HTML:**
{markup}

Create a parody website that:
1. Uses the EXACT same colors from the original site's color palette
2. Uses the EXACT same fonts from the original site's font palette
3. Replaces all of the content with satirical, humorous versions
4. Keeps buttons and links styled like the original, but rewrites their text to be funny
5. Captures the essence of what the site does, in an exaggerated way
6. Generates enough filler content to look like a realistic page
7. Keeps the humor subtle and clever rather than over the top

Return ONLY valid HTML with inline CSS. Make it a complete, standalone HTML page that looks structurally similar to the original.",
            structured = self.structured,
            text = self.text_excerpt,
            markup = self.markup_excerpt,
        )
    }
}

/// Prefix of `s` holding at most `max_chars` characters.
pub fn truncate_chars(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
