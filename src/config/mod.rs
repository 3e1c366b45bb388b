//! Configuration for word-frequency analysis
//!
//! Holds the tunable knobs of the pipeline (bucket size, minimum word
//! length) and the static stopword set. All values have sensible defaults;
//! a workflow run never requires a configuration file.

mod stopwords;

pub use stopwords::default_stopwords;

use serde::{Deserialize, Serialize};

/// Tunable parameters of the analysis pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Number of words per bucket fanned out to the map step
    #[serde(default = "default_bucket_size")]
    pub bucket_size: usize,
    /// Minimum length of a counted word
    #[serde(default = "default_min_word_len")]
    pub min_word_len: usize,
}

fn default_bucket_size() -> usize {
    5000
}

fn default_min_word_len() -> usize {
    3
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            bucket_size: default_bucket_size(),
            min_word_len: default_min_word_len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let config = AnalysisConfig::default();
        assert_eq!(config.bucket_size, 5000);
        assert_eq!(config.min_word_len, 3);
    }

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let config: AnalysisConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, AnalysisConfig::default());
    }

    #[test]
    fn stopword_set_has_expected_entries() {
        let stopwords = default_stopwords();
        assert!(stopwords.contains("the"));
        assert!(stopwords.contains("over"));
        assert!(!stopwords.contains("fox"));
    }
}
