//! # Codec Configuration
//!
//! Loaded once at startup from TOML. Sender and receiver must load the same
//! values: the sort strategy and model constants shape the bit stream, and
//! nothing in a snapshot says which ones were used.
//!
//! ```toml
//! [sort]
//! kind = "approx"
//! max_passes = 10
//!
//! [models]
//! initial_p1 = 208
//! fast_shift = 4
//! slow_shift = 7
//! ```

use serde::{Deserialize, Serialize};

use crate::coder::PROB_ONE;
use crate::error::ConfigError;

/// Largest shift that still moves a 12-bit probability.
const MAX_SHIFT: u8 = 11;

/// How the ordering engine re-sorts its tables every tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SortStrategy {
    /// Full stable sort every tick.
    Stable,
    /// Bounded adjacent-swap repair that stops early once a pass makes no swap.
    ///
    /// Cheaper than a full sort when last tick's order is already close.
    Approx {
        /// Maximum number of passes per table per tick.
        max_passes: u32,
    },
    /// Never reorder; tables keep their identity order.
    Frozen,
}

impl Default for SortStrategy {
    fn default() -> Self {
        Self::Stable
    }
}

/// Constants of the adaptive "mostly zero" probability model.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Starting probability of a one, in 1/4096 units.
    pub initial_p1: u16,
    /// Adaptation shift of the fast half.
    pub fast_shift: u8,
    /// Adaptation shift of the slow half.
    pub slow_shift: u8,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            initial_p1: 0xd0,
            fast_shift: 4,
            slow_shift: 7,
        }
    }
}

impl ModelConfig {
    /// Checks every constant is in range.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first bad value.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.initial_p1 == 0 || u32::from(self.initial_p1) >= PROB_ONE {
            return Err(ConfigError::Invalid(format!(
                "models.initial_p1 must be in 1..{PROB_ONE}, got {}",
                self.initial_p1
            )));
        }
        for (name, shift) in [("fast_shift", self.fast_shift), ("slow_shift", self.slow_shift)] {
            if !(1..=MAX_SHIFT).contains(&shift) {
                return Err(ConfigError::Invalid(format!(
                    "models.{name} must be in 1..={MAX_SHIFT}, got {shift}"
                )));
            }
        }
        Ok(())
    }
}

/// Complete codec configuration.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CodecConfig {
    /// Ordering engine sort strategy.
    pub sort: SortStrategy,
    /// Probability model constants.
    pub models: ModelConfig,
}

impl CodecConfig {
    /// Parses and validates a TOML document.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed TOML and
    /// [`ConfigError::Invalid`] for out-of-range values.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks every value is in range.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first bad value.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let SortStrategy::Approx { max_passes: 0 } = self.sort {
            return Err(ConfigError::Invalid(
                "sort.max_passes must be at least 1".to_string(),
            ));
        }
        self.models.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_document_gives_defaults() {
        let config = CodecConfig::from_toml_str("").unwrap();
        assert_eq!(config, CodecConfig::default());
        assert_eq!(config.sort, SortStrategy::Stable);
    }

    #[test]
    fn test_parse_approx_strategy() {
        let config = CodecConfig::from_toml_str(
            r#"
            [sort]
            kind = "approx"
            max_passes = 10

            [models]
            fast_shift = 3
            "#,
        )
        .unwrap();
        assert_eq!(config.sort, SortStrategy::Approx { max_passes: 10 });
        assert_eq!(config.models.fast_shift, 3);
        assert_eq!(config.models.slow_shift, ModelConfig::default().slow_shift);
    }

    #[test]
    fn test_parse_frozen_strategy() {
        let config = CodecConfig::from_toml_str("[sort]\nkind = \"frozen\"\n").unwrap();
        assert_eq!(config.sort, SortStrategy::Frozen);
    }

    #[test]
    fn test_rejects_zero_passes() {
        let err = CodecConfig::from_toml_str("[sort]\nkind = \"approx\"\nmax_passes = 0\n")
            .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_rejects_bad_model_constants() {
        for text in [
            "[models]\ninitial_p1 = 0\n",
            "[models]\ninitial_p1 = 4096\n",
            "[models]\nfast_shift = 0\n",
            "[models]\nslow_shift = 12\n",
        ] {
            let err = CodecConfig::from_toml_str(text).unwrap_err();
            assert!(matches!(err, ConfigError::Invalid(_)), "{text}");
        }
    }

    #[test]
    fn test_rejects_malformed_toml() {
        let err = CodecConfig::from_toml_str("[sort\nkind = ").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }
}
