//! Configuration structures for a comparison run.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Main configuration for the pdfdiff pipeline.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DiffConfig {
    /// Text diff configuration.
    pub text: TextConfig,

    /// Raster comparison configuration.
    pub raster: RasterConfig,

    /// Report generation configuration.
    pub report: ReportConfig,

    /// Page source configuration.
    pub source: SourceConfig,

    /// Execution configuration.
    pub run: RunConfig,
}

/// Text diff configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TextConfig {
    /// Apply semantic cleanup to per-page diffs (the whole-document diff is
    /// always cleaned up).
    pub semantic_cleanup: bool,

    /// Time budget per diff in seconds (0 = unlimited).
    pub timeout_secs: f32,
}

impl Default for TextConfig {
    fn default() -> Self {
        Self {
            semantic_cleanup: true,
            timeout_secs: 0.0,
        }
    }
}

/// Raster comparison configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RasterConfig {
    /// Run the paginated visual stage.
    pub enabled: bool,

    /// Maximum per-channel difference still counted as equal (0 = exact).
    pub channel_tolerance: u8,

    /// Tint for content present only in the second document.
    pub added_color: [u8; 3],

    /// Tint for content present only in the first document.
    pub removed_color: [u8; 3],
}

impl Default for RasterConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            channel_tolerance: 0,
            added_color: [0, 176, 0],
            removed_color: [220, 0, 0],
        }
    }
}

/// Report generation configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// Searchable tag placed before changed lines of the whole-document report.
    pub search_tag: String,

    /// Keep pages whose only differences are whitespace in the paginated report.
    pub include_whitespace_only_pages: bool,

    /// Write the summary to `<prefix>_summary.txt`.
    pub dump_summary: bool,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            search_tag: "PDFDIFF: ".to_string(),
            include_whitespace_only_pages: false,
            dump_summary: false,
        }
    }
}

/// Page source configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    /// Maximum pages to read per document (0 = unlimited).
    pub max_pages: usize,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self { max_pages: 0 }
    }
}

/// Execution configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Compare pages on the rayon thread pool.
    pub parallel: bool,

    /// Abort the comparison after this many seconds (0 = no deadline).
    pub deadline_secs: u64,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            parallel: true,
            deadline_secs: 0,
        }
    }
}

impl RunConfig {
    /// Deadline as a duration, if one is configured.
    pub fn deadline(&self) -> Option<Duration> {
        (self.deadline_secs > 0).then(|| Duration::from_secs(self.deadline_secs))
    }
}

impl DiffConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &std::path::Path) -> Result<Self, std::io::Error> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &std::path::Path) -> Result<(), std::io::Error> {
        let content = serde_json::to_string_pretty(self).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })?;
        std::fs::write(path, content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_partial_json_fills_defaults() {
        let config: DiffConfig =
            serde_json::from_str(r#"{"raster": {"enabled": true}}"#).unwrap();
        assert!(config.raster.enabled);
        assert_eq!(config.raster.channel_tolerance, 0);
        assert_eq!(config.report.search_tag, "PDFDIFF: ");
        assert!(config.run.parallel);
        assert_eq!(config.run.deadline(), None);
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        let mut config = DiffConfig::default();
        config.report.include_whitespace_only_pages = true;
        config.run.deadline_secs = 30;
        config.save(&path).unwrap();

        let loaded = DiffConfig::from_file(&path).unwrap();
        assert!(loaded.report.include_whitespace_only_pages);
        assert_eq!(loaded.run.deadline(), Some(Duration::from_secs(30)));
    }

    #[test]
    fn test_invalid_json_is_invalid_data() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        std::fs::write(&path, "{ not json").unwrap();

        let err = DiffConfig::from_file(&path).unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::InvalidData);
    }
}
