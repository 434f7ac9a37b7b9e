//! Page style fingerprint.
//!
//! A [`Fingerprint`] is the only artifact passed from extraction to synthesis.
//! Its palettes and headings are bounded by construction: the collection
//! types dedupe and cap on every insert, including when decoded from JSON, so
//! a fingerprint received over the wire upholds the same limits as one
//! produced by the extractor.

use serde::{Deserialize, Serialize};

/// Maximum number of distinct colors kept in a palette.
pub const MAX_COLORS: usize = 20;

/// Maximum number of distinct font families kept in a palette.
pub const MAX_FONTS: usize = 8;

/// Maximum number of headings captured.
pub const MAX_HEADINGS: usize = 5;

/// Title and meta description of the page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Metadata {
    pub title: String,
    /// Content of `<meta name="description">`, empty when absent.
    pub description: String,
}

/// Computed presentation of a single element.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StyleSample {
    pub background_color: String,
    pub text_color: String,
    pub font_family: String,
    pub font_size: String,
    pub font_weight: String,
    pub padding: String,
    pub margin: String,
}

/// Style samples keyed by semantic role.
///
/// Every role is always present in the serialized form; a role whose element
/// does not exist on the page is `null`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StyleSamples {
    pub body: Option<StyleSample>,
    pub primary_heading: Option<StyleSample>,
    pub secondary_heading: Option<StyleSample>,
    pub link: Option<StyleSample>,
    pub button: Option<StyleSample>,
}

/// Ordered set of distinct strings holding at most `CAP` entries.
///
/// Insertion order is first-seen order. Empty strings are never stored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct Palette<const CAP: usize>(Vec<String>);

/// Distinct colors observed on sampled elements.
pub type ColorPalette = Palette<MAX_COLORS>;

/// Distinct font-family values observed on sampled elements.
pub type FontPalette = Palette<MAX_FONTS>;

impl<const CAP: usize> Palette<CAP> {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Insert a value, returning `true` if it was added.
    ///
    /// Duplicates, empty values, and inserts into a full palette are ignored.
    pub fn insert(&mut self, value: impl Into<String>) -> bool {
        let value = value.into();
        if value.is_empty() || self.is_full() || self.contains(&value) {
            return false;
        }
        self.0.push(value);
        true
    }

    pub fn contains(&self, value: &str) -> bool {
        self.0.iter().any(|v| v == value)
    }

    pub fn is_full(&self) -> bool {
        self.0.len() >= CAP
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn iter(&self) -> std::slice::Iter<'_, String> {
        self.0.iter()
    }
}

impl<const CAP: usize> From<Vec<String>> for Palette<CAP> {
    fn from(values: Vec<String>) -> Self {
        let mut palette = Self::new();
        for value in values {
            palette.insert(value);
        }
        palette
    }
}

impl<const CAP: usize> From<Palette<CAP>> for Vec<String> {
    fn from(palette: Palette<CAP>) -> Self {
        palette.0
    }
}

/// Heading texts in document order, at most [`MAX_HEADINGS`], never blank.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct Headings(Vec<String>);

impl Headings {
    /// Append a heading; whitespace is trimmed and blank text is skipped.
    pub fn push(&mut self, text: &str) -> bool {
        let text = text.trim();
        if text.is_empty() || self.0.len() >= MAX_HEADINGS {
            return false;
        }
        self.0.push(text.to_string());
        true
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }
}

impl From<Vec<String>> for Headings {
    fn from(values: Vec<String>) -> Self {
        let mut headings = Self::default();
        for value in &values {
            headings.push(value);
        }
        headings
    }
}

impl From<Headings> for Vec<String> {
    fn from(headings: Headings) -> Self {
        headings.0
    }
}

/// Bounded structured description of a page's visual style and content.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Fingerprint {
    pub metadata: Metadata,
    pub style_samples: StyleSamples,
    pub color_palette: ColorPalette,
    pub font_palette: FontPalette,
    pub headings: Headings,
    /// Rendered plain text of the body, unbounded.
    pub visible_text: String,
    /// Full rendered markup, present only when capture was requested.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_markup: Option<String>,
}
