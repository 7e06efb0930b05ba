use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use paperqr_pages::MAX_PAGE_COUNT;

use crate::error::{PaperError, PaperResult};

/// Top-level configuration (loaded from paperqr.toml)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PaperConfig {
    pub output: OutputConfig,
    pub compression: CompressionConfig,
    pub barcode: BarcodeConfig,
    pub scan: ScanConfig,
    pub log: LogConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Refuse to encode into more pages than this (0 = protocol maximum)
    pub max_pages: usize,
    /// Directory page images are written to
    pub directory: PathBuf,
    /// File name prefix for page images: `<prefix>-001.png`, ...
    pub file_prefix: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CompressionConfig {
    /// zstd compression level (default: 19)
    pub level: i32,
}

/// External QR programs. Both read from stdin and write to stdout.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BarcodeConfig {
    pub render_program: String,
    pub render_args: Vec<String>,
    pub scan_program: String,
    pub scan_args: Vec<String>,
    /// Extension of rendered image files
    pub image_extension: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Page-scan worker count (0 = cpu_count)
    pub workers: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Log level (default: info)
    pub level: String,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl OutputConfig {
    /// `max_pages` with `0` mapped to the protocol ceiling.
    pub fn effective_max_pages(&self) -> usize {
        match self.max_pages {
            0 => MAX_PAGE_COUNT,
            n => n.min(MAX_PAGE_COUNT),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            max_pages: 10,
            directory: PathBuf::from("."),
            file_prefix: "page".into(),
        }
    }
}

impl Default for CompressionConfig {
    fn default() -> Self {
        Self { level: 19 }
    }
}

impl Default for BarcodeConfig {
    fn default() -> Self {
        Self {
            render_program: "qrencode".into(),
            render_args: ["--8bit", "--level=L", "--output=-", "--dpi=300", "--size=10"]
                .map(String::from)
                .to_vec(),
            scan_program: "zbarimg".into(),
            scan_args: ["--raw", "--oneshot", "--set=binary", "-"]
                .map(String::from)
                .to_vec(),
            image_extension: "png".into(),
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".into(),
            format: LogFormat::Text,
        }
    }
}

impl PaperConfig {
    /// Parse `path`, or `None` if there is no file there.
    ///
    /// The caller decides how to report falling back to defaults, typically
    /// after installing a subscriber from the loaded `[log]` section.
    pub fn read(path: &Path) -> PaperResult<Option<Self>> {
        if !path.exists() {
            return Ok(None);
        }
        let content = std::fs::read_to_string(path)
            .map_err(|e| PaperError::Config(format!("reading config {}: {e}", path.display())))?;
        toml::from_str(&content)
            .map(Some)
            .map_err(|e| PaperError::Config(format!("parsing config {}: {e}", path.display())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_config() {
        let toml_str = r#"
[output]
max_pages = 25
directory = "/tmp/backup"
file_prefix = "vault"

[compression]
level = 3

[barcode]
render_program = "/usr/local/bin/qrencode"
render_args = ["--8bit", "--output=-"]
scan_program = "zbarimg"
scan_args = ["--raw", "-"]
image_extension = "png"

[scan]
workers = 8

[log]
level = "debug"
format = "json"
"#;
        let config: PaperConfig = toml::from_str(toml_str).unwrap();

        assert_eq!(config.output.max_pages, 25);
        assert_eq!(config.output.directory, PathBuf::from("/tmp/backup"));
        assert_eq!(config.output.file_prefix, "vault");
        assert_eq!(config.compression.level, 3);
        assert_eq!(config.barcode.render_program, "/usr/local/bin/qrencode");
        assert_eq!(config.barcode.render_args, vec!["--8bit", "--output=-"]);
        assert_eq!(config.scan.workers, 8);
        assert_eq!(config.log.level, "debug");
        assert_eq!(config.log.format, LogFormat::Json);
    }

    #[test]
    fn test_parse_defaults() {
        let config: PaperConfig = toml::from_str("").unwrap();

        assert_eq!(config.output.max_pages, 10);
        assert_eq!(config.output.directory, PathBuf::from("."));
        assert_eq!(config.compression.level, 19);
        assert_eq!(config.barcode.render_program, "qrencode");
        assert_eq!(config.barcode.scan_program, "zbarimg");
        assert_eq!(config.scan.workers, 0);
        assert_eq!(config.log.format, LogFormat::Text);
    }

    #[test]
    fn test_parse_partial_config() {
        let toml_str = r#"
[output]
max_pages = 0
"#;
        let config: PaperConfig = toml::from_str(toml_str).unwrap();

        // Overridden
        assert_eq!(config.output.max_pages, 0);
        // Defaults
        assert_eq!(config.output.file_prefix, "page");
        assert_eq!(config.log.level, "info");
    }

    #[test]
    fn test_effective_max_pages() {
        let mut output = OutputConfig::default();
        assert_eq!(output.effective_max_pages(), 10);

        output.max_pages = 0;
        assert_eq!(output.effective_max_pages(), MAX_PAGE_COUNT);

        output.max_pages = 10_000;
        assert_eq!(output.effective_max_pages(), MAX_PAGE_COUNT);
    }

    #[test]
    fn test_serialize_roundtrip() {
        let config = PaperConfig::default();
        let toml_str = toml::to_string(&config).unwrap();
        let parsed: PaperConfig = toml::from_str(&toml_str).unwrap();

        assert_eq!(config.output.directory, parsed.output.directory);
        assert_eq!(config.barcode.scan_args, parsed.barcode.scan_args);
        assert_eq!(config.log.format, parsed.log.format);
    }

    #[test]
    fn test_read_missing_file_is_none() {
        let tmp = tempfile::TempDir::new().unwrap();
        assert!(PaperConfig::read(&tmp.path().join("absent.toml"))
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_read_existing_file() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("paperqr.toml");
        std::fs::write(&path, "[log]\nlevel = \"debug\"\n").unwrap();

        let config = PaperConfig::read(&path).unwrap().unwrap();
        assert_eq!(config.log.level, "debug");
    }

    #[test]
    fn test_read_invalid_file() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("paperqr.toml");
        std::fs::write(&path, "[output\nmax_pages = ").unwrap();

        assert!(matches!(PaperConfig::read(&path), Err(PaperError::Config(_))));
    }
}
