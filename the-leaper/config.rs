//! The tracker's configuration snapshot.
//!
//! Configuration is read once per change and handed to the tracker whole.
//! Hosts usually load it from TOML:
//!
//! ```toml
//! detected-pairs = ["()", "[]", "{}"]
//! decorate-all = false
//!
//! [decoration]
//! outline-color = "editorBracketMatch.border"
//! outline-width = "1px"
//! ```
//!
//! Missing keys fall back to [`Configuration::default`].

use serde::Deserialize;
use the_core::chars::utf16_len;
use thiserror::Error;

use crate::{
  Tendril,
  decoration::DecorationStyle,
};

pub const DEFAULT_DETECTED_PAIRS: &[&str] = &["()", "[]", "{}", "<>", "``", "''", "\"\""];

pub type Result<T> = std::result::Result<T, ConfigError>;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
  #[error("invalid configuration: {0}")]
  Parse(#[from] toml::de::Error),
  #[error("detected pair {pair:?} must be exactly two single-unit characters")]
  InvalidPair { pair: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Configuration {
  detected_pairs: Vec<Tendril>,
  decorate_all:   bool,
  decoration:     DecorationStyle,
}

#[derive(Debug, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
struct RawConfiguration {
  detected_pairs: Vec<String>,
  decorate_all:   bool,
  decoration:     DecorationStyle,
}

impl Default for RawConfiguration {
  fn default() -> Self {
    Self {
      detected_pairs: DEFAULT_DETECTED_PAIRS.iter().map(|&p| p.into()).collect(),
      decorate_all:   false,
      decoration:     DecorationStyle::default(),
    }
  }
}

impl Configuration {
  /// Build a validated snapshot. Duplicate pairs are kept once.
  pub fn new<I, S>(detected_pairs: I, decorate_all: bool, decoration: DecorationStyle) -> Result<Self>
  where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
  {
    let mut pairs: Vec<Tendril> = Vec::new();
    for pair in detected_pairs {
      let pair = pair.as_ref();
      if pair.chars().count() != 2 || utf16_len(pair) != 2 {
        return Err(ConfigError::InvalidPair {
          pair: pair.to_string(),
        });
      }
      if !pairs.iter().any(|known| known == pair) {
        pairs.push(Tendril::from(pair));
      }
    }

    Ok(Self {
      detected_pairs: pairs,
      decorate_all,
      decoration,
    })
  }

  pub fn from_toml(source: &str) -> Result<Self> {
    let raw: RawConfiguration = toml::from_str(source)?;
    Self::new(raw.detected_pairs, raw.decorate_all, raw.decoration)
  }

  pub fn detected_pairs(&self) -> &[Tendril] {
    &self.detected_pairs
  }

  /// Whether inserting `text` at a cursor counts as autoclosing a pair.
  pub fn is_detected(&self, text: &str) -> bool {
    self.detected_pairs.iter().any(|pair| pair == text)
  }

  /// Decorate every tracked pair rather than only the nearest one per cursor.
  pub fn decorate_all(&self) -> bool {
    self.decorate_all
  }

  pub fn decoration(&self) -> &DecorationStyle {
    &self.decoration
  }
}

impl Default for Configuration {
  fn default() -> Self {
    let raw = RawConfiguration::default();
    Self {
      detected_pairs: raw.detected_pairs.iter().map(|p| Tendril::from(p.as_str())).collect(),
      decorate_all:   raw.decorate_all,
      decoration:     raw.decoration,
    }
  }
}
