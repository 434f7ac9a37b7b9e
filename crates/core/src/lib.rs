//! Core types and shared functionality for parodist.
//!
//! This crate provides:
//! - The page fingerprint data model and its bounded collections
//! - Unified error types
//! - Configuration structures

pub mod config;
pub mod error;
pub mod fingerprint;

pub use config::{AppConfig, BrowserMode, BrowserSettings, ConfigError};
pub use error::Error;
pub use fingerprint::{
    ColorPalette, FontPalette, Fingerprint, Headings, MAX_COLORS, MAX_FONTS, MAX_HEADINGS, Metadata, Palette,
    StyleSample, StyleSamples,
};
