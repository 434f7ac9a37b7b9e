//! In-page extraction pass and the typed payload it returns.
//!
//! The script runs synchronously inside the page and returns a JSON string.
//! Decoding is lenient about `null` scalars but the bounded collections
//! re-apply their caps, so a hostile page cannot inflate the fingerprint.

use std::sync::LazyLock;

use parodist_core::{Fingerprint, Headings, MAX_COLORS, MAX_FONTS, MAX_HEADINGS, Metadata, StyleSamples};
use serde::{Deserialize, Deserializer};

/// Tags whose computed colors and fonts feed the palettes. Sampling a fixed
/// set keeps the pass cheap on pathological documents.
pub const SAMPLED_TAGS: &str = "body, header, nav, main, footer, h1, h2, h3, p, a, button";

const SCRIPT_TEMPLATE: &str = r#"
(() => {
  const readStyle = (selector) => {
    const el = document.querySelector(selector);
    if (!el) return null;
    const s = window.getComputedStyle(el);
    return {
      backgroundColor: s.backgroundColor,
      textColor: s.color,
      fontFamily: s.fontFamily,
      fontSize: s.fontSize,
      fontWeight: s.fontWeight,
      padding: s.padding,
      margin: s.margin,
    };
  };

  const addCapped = (list, cap, value) => {
    if (value && list.length < cap && !list.includes(value)) list.push(value);
  };
  const isTransparent = (c) => {
    const t = (c || '').replace(/\s+/g, '').toLowerCase();
    return t === 'transparent' || t === 'rgba(0,0,0,0)';
  };
  const addColor = (list, value) => {
    if (!isTransparent(value)) addCapped(list, __MAX_COLORS__, value);
  };

  const colors = [];
  const fonts = [];
  for (const el of document.querySelectorAll('__SAMPLED_TAGS__')) {
    const s = window.getComputedStyle(el);
    addColor(colors, s.backgroundColor);
    addColor(colors, s.color);
    addCapped(fonts, __MAX_FONTS__, s.fontFamily);
    if (colors.length >= __MAX_COLORS__ && fonts.length >= __MAX_FONTS__) break;
  }

  const headings = [];
  for (const h of document.querySelectorAll('h1, h2, h3')) {
    if (headings.length >= __MAX_HEADINGS__) break;
    const text = (h.textContent || '').trim();
    if (text) headings.push(text);
  }

  const meta = document.querySelector('meta[name="description"]');

  return JSON.stringify({
    title: document.title,
    description: meta ? meta.getAttribute('content') : '',
    styleSamples: {
      body: readStyle('body'),
      primaryHeading: readStyle('h1'),
      secondaryHeading: readStyle('h2'),
      link: readStyle('a'),
      button: readStyle('button'),
    },
    colors,
    fonts,
    headings,
    visibleText: document.body ? document.body.innerText : '',
  });
})()
"#;

/// The extraction script with the palette caps filled in.
pub static EXTRACTION_SCRIPT: LazyLock<String> = LazyLock::new(|| {
    SCRIPT_TEMPLATE
        .replace("__SAMPLED_TAGS__", SAMPLED_TAGS)
        .replace("__MAX_COLORS__", &MAX_COLORS.to_string())
        .replace("__MAX_FONTS__", &MAX_FONTS.to_string())
        .replace("__MAX_HEADINGS__", &MAX_HEADINGS.to_string())
});

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Result of the in-page extraction pass.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PagePayload {
    #[serde(deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(deserialize_with = "null_as_default")]
    pub style_samples: StyleSamples,
    #[serde(deserialize_with = "null_as_default")]
    pub colors: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub fonts: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub headings: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub visible_text: String,
}

/// Fully transparent background, in any of the serializations browsers use.
pub fn is_transparent(color: &str) -> bool {
    let compact: String = color.chars().filter(|c| !c.is_whitespace()).collect();
    compact.eq_ignore_ascii_case("transparent") || compact.eq_ignore_ascii_case("rgba(0,0,0,0)")
}

impl PagePayload {
    pub fn decode(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Build the fingerprint, re-applying palette and heading bounds.
    pub fn into_fingerprint(self, raw_markup: Option<String>) -> Fingerprint {
        let mut color_palette = parodist_core::ColorPalette::new();
        for color in self.colors.into_iter().filter(|c| !is_transparent(c)) {
            color_palette.insert(color);
        }

        Fingerprint {
            metadata: Metadata { title: self.title, description: self.description },
            style_samples: self.style_samples,
            color_palette,
            font_palette: self.fonts.into(),
            headings: Headings::from(self.headings),
            visible_text: self.visible_text,
            raw_markup,
        }
    }
}
