//! # Session Configuration
//!
//! ```toml
//! objects = 901
//! history_depth = 8
//!
//! [codec.sort]
//! kind = "stable"
//! ```

use cubesync_codec::{CodecConfig, ConfigError};
use serde::{Deserialize, Serialize};

/// Fewest frame buffers a session can run with: historic, baseline, current.
pub const MIN_HISTORY_DEPTH: usize = 3;

/// Endpoint configuration. Sender and receiver must agree on all of it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Objects per frame; fixed for the session's lifetime.
    pub objects: usize,
    /// Frame buffers kept, including the one being built.
    pub history_depth: usize,
    /// Codec settings.
    pub codec: CodecConfig,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            objects: 901,
            history_depth: 8,
            codec: CodecConfig::default(),
        }
    }
}

impl SessionConfig {
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
        if self.objects == 0 {
            return Err(ConfigError::Invalid("objects must be at least 1".to_string()));
        }
        if self.history_depth < MIN_HISTORY_DEPTH {
            return Err(ConfigError::Invalid(format!(
                "history_depth must be at least {MIN_HISTORY_DEPTH}, got {}",
                self.history_depth
            )));
        }
        self.codec.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cubesync_codec::SortStrategy;

    #[test]
    fn test_defaults() {
        let config = SessionConfig::from_toml_str("").unwrap();
        assert_eq!(config.objects, 901);
        assert_eq!(config.history_depth, 8);
        assert_eq!(config.codec, CodecConfig::default());
    }

    #[test]
    fn test_nested_codec_table() {
        let config = SessionConfig::from_toml_str(
            r#"
            objects = 64
            history_depth = 3

            [codec.sort]
            kind = "approx"
            max_passes = 4
            "#,
        )
        .unwrap();
        assert_eq!(config.objects, 64);
        assert_eq!(config.codec.sort, SortStrategy::Approx { max_passes: 4 });
    }

    #[test]
    fn test_rejects_out_of_range() {
        for text in [
            "objects = 0\n",
            "history_depth = 2\n",
            "[codec.models]\nslow_shift = 0\n",
        ] {
            let err = SessionConfig::from_toml_str(text).unwrap_err();
            assert!(matches!(err, ConfigError::Invalid(_)), "{text}");
        }
    }
}
