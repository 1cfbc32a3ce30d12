//! Tool configuration.
//!
//! Handles loading, validating, and merging `ogp-img.toml`. Stock defaults are
//! serialized to a TOML table, the user's file is merged on top of it, and the
//! result is deserialized with unknown keys rejected. Command-line flags are
//! applied last (see `main.rs`).
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! template = "ogp_img_template.svg"  # SVG template path
//! placeholder = "{{.article_title}}" # Token replaced by the escaped title
//!
//! [image]
//! width = 1200              # Clip width in CSS pixels
//! height = 630              # Clip height in CSS pixels
//! inset = 7.5               # Clip offset from the page's top-left corner
//! size_from_template = false # Read width/height from the template's <svg>
//!
//! [gate]
//! enabled = true            # Only render articles that opt in
//! key = "autoGenOgpImg"     # Front-matter flag that opts an article in
//!
//! [output]
//! layout = "ogp-png"        # ogp-png | sibling | directory
//! dir = "static/images/ogp" # Output root for the directory layout
//! content_root = "content"  # Stripped from input paths in the directory layout
//!
//! [browser]
//! timeout_secs = 30         # Bound on page load, stability wait and capture
//! sandbox = true            # Chrome sandbox (disable inside some containers)
//! # chrome_path = "/usr/bin/chromium"
//!
//! [logging]
//! level = "warn"            # tracing filter, RUST_LOG wins when set
//! json = false              # JSON log lines on stderr
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// File looked up in the working directory when `--config` is not given.
pub const CONFIG_FILE_NAME: &str = "ogp-img.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config file not found: {}", .0.display())]
    NotFound(PathBuf),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Configuration loaded from `ogp-img.toml`.
///
/// All fields have defaults matching the classic setup: a template next to
/// the working directory, 1200×630 images, opt-in gating, `ogp.png` beside
/// each article.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Path to the SVG template.
    pub template: PathBuf,
    /// Literal token in the template that is replaced by the title.
    pub placeholder: String,
    /// Output image geometry.
    pub image: ImageConfig,
    /// Opt-in gate settings.
    pub gate: GateConfig,
    /// Output path convention.
    pub output: OutputConfig,
    /// Headless browser settings.
    pub browser: BrowserConfig,
    /// Diagnostics.
    pub logging: LoggingConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            template: PathBuf::from("ogp_img_template.svg"),
            placeholder: "{{.article_title}}".to_string(),
            image: ImageConfig::default(),
            gate: GateConfig::default(),
            output: OutputConfig::default(),
            browser: BrowserConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Config {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.image.width == 0 || self.image.height == 0 {
            return Err(ConfigError::Validation(
                "image.width and image.height must be non-zero".into(),
            ));
        }
        if !self.image.inset.is_finite() || self.image.inset < 0.0 {
            return Err(ConfigError::Validation(
                "image.inset must be a non-negative number".into(),
            ));
        }
        if self.placeholder.is_empty() {
            return Err(ConfigError::Validation(
                "placeholder must not be empty".into(),
            ));
        }
        if self.gate.key.trim().is_empty() {
            return Err(ConfigError::Validation("gate.key must not be empty".into()));
        }
        if self.browser.timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "browser.timeout_secs must be non-zero".into(),
            ));
        }
        Ok(())
    }
}

/// Output image geometry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ImageConfig {
    /// Clip width in CSS pixels (= PNG width at scale 1).
    pub width: u32,
    /// Clip height in CSS pixels (= PNG height at scale 1).
    pub height: u32,
    /// Offset of the clip rectangle from the page origin, on both axes.
    ///
    /// The SVG is loaded as a document body, so it sits behind the default
    /// body margin.
    pub inset: f64,
    /// When true, `width` and `height` are read from the template's root
    /// `<svg>` element instead.
    pub size_from_template: bool,
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            width: 1200,
            height: 630,
            inset: 7.5,
            size_from_template: false,
        }
    }
}

/// Opt-in gate: articles must carry `key: true` in their front-matter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GateConfig {
    pub enabled: bool,
    pub key: String,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            key: "autoGenOgpImg".to_string(),
        }
    }
}

/// Where the PNG for an article is written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum OutputLayout {
    /// `<article dir>/ogp.png`
    OgpPng,
    /// `<article dir>/<article stem>.png`
    Sibling,
    /// `<output.dir>/<article path relative to content_root>.png`
    Directory,
}

/// Output path settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputConfig {
    pub layout: OutputLayout,
    /// Output root for [`OutputLayout::Directory`].
    pub dir: PathBuf,
    /// Prefix stripped from article paths for [`OutputLayout::Directory`].
    pub content_root: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            layout: OutputLayout::OgpPng,
            dir: PathBuf::from("static/images/ogp"),
            content_root: PathBuf::from("content"),
        }
    }
}

/// Headless browser settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BrowserConfig {
    /// Upper bound, in seconds, for each browser round-trip.
    pub timeout_secs: u64,
    /// Run Chrome with its sandbox enabled.
    pub sandbox: bool,
    /// Chrome/Chromium executable. Auto-detected when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chrome_path: Option<PathBuf>,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            sandbox: true,
            chrome_path: None,
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    /// Log level filter (e.g. "warn", "ogp_img=debug").
    pub level: String,
    /// Whether to output structured JSON logs.
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            json: false,
        }
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    toml::Value::try_from(Config::default())
        .map_err(|e| ConfigError::Validation(format!("default config must serialize: {e}")))
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load a config file as a raw TOML value.
///
/// Returns `Ok(None)` if the file does not exist.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<Config, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: Config = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from `path`, falling back to stock defaults when the file
/// does not exist.
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let base = stock_defaults_value()?;
    let overlay = load_raw_config(path)?;
    resolve_config(base, overlay)
}

/// Load config from a path the user named explicitly. A missing file is an error.
pub fn load_required_config(path: &Path) -> Result<Config, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::NotFound(path.to_path_buf()));
    }
    load_config(path)
}

/// Returns a fully-commented stock `ogp-img.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# ogp-img Configuration
# =====================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
# Unknown keys will cause an error.

# SVG template. Relative paths are resolved from the working directory.
template = "ogp_img_template.svg"

# Literal token in the template that is replaced by the HTML-escaped title.
placeholder = "{{.article_title}}"

# ---------------------------------------------------------------------------
# Image geometry
# ---------------------------------------------------------------------------
[image]
# Size of the captured PNG in pixels.
width = 1200
height = 630

# Offset of the capture rectangle from the page's top-left corner.
# The SVG sits behind the default document margin.
inset = 7.5

# Read width/height from the template's root <svg> element instead.
size_from_template = false

# ---------------------------------------------------------------------------
# Opt-in gate
# ---------------------------------------------------------------------------
[gate]
# When enabled, only articles whose front-matter sets `key: true` are rendered.
enabled = true
key = "autoGenOgpImg"

# ---------------------------------------------------------------------------
# Output
# ---------------------------------------------------------------------------
[output]
# ogp-png   -> <article dir>/ogp.png
# sibling   -> <article dir>/<article stem>.png
# directory -> <dir>/<article path relative to content_root>.png
layout = "ogp-png"
dir = "static/images/ogp"
content_root = "content"

# ---------------------------------------------------------------------------
# Headless browser
# ---------------------------------------------------------------------------
[browser]
# Upper bound in seconds for each page operation (load, stability, capture).
timeout_secs = 30

# Disable inside containers that cannot run the Chrome sandbox.
sandbox = true

# Chrome/Chromium executable. Auto-detected when omitted.
# chrome_path = "/usr/bin/chromium"

# ---------------------------------------------------------------------------
# Logging
# ---------------------------------------------------------------------------
[logging]
# tracing filter directive. RUST_LOG takes precedence when set.
level = "warn"

# Emit JSON log lines on stderr.
json = false
"##
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn default_config_matches_classic_setup() {
        let config = Config::default();
        assert_eq!(config.template, PathBuf::from("ogp_img_template.svg"));
        assert_eq!(config.placeholder, "{{.article_title}}");
        assert_eq!(config.image.width, 1200);
        assert_eq!(config.image.height, 630);
        assert_eq!(config.image.inset, 7.5);
        assert!(config.gate.enabled);
        assert_eq!(config.gate.key, "autoGenOgpImg");
        assert_eq!(config.output.layout, OutputLayout::OgpPng);
    }

    #[test]
    fn parse_partial_config() {
        let toml = r#"
[image]
width = 800
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.image.width, 800);
        // Defaults preserved
        assert_eq!(config.image.height, 630);
        assert_eq!(config.gate.key, "autoGenOgpImg");
    }

    #[test]
    fn parse_output_layouts() {
        for (raw, expected) in [
            ("ogp-png", OutputLayout::OgpPng),
            ("sibling", OutputLayout::Sibling),
            ("directory", OutputLayout::Directory),
        ] {
            let config: Config = toml::from_str(&format!("[output]\nlayout = \"{raw}\"\n")).unwrap();
            assert_eq!(config.output.layout, expected);
        }
    }

    #[test]
    fn unknown_layout_rejected() {
        let result: Result<Config, _> = toml::from_str("[output]\nlayout = \"flat\"\n");
        assert!(result.is_err());
    }

    // =========================================================================
    // load_config tests
    // =========================================================================

    #[test]
    fn load_config_returns_default_when_no_file() {
        let tmp = TempDir::new().unwrap();
        let config = load_config(&tmp.path().join(CONFIG_FILE_NAME)).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn load_config_reads_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join(CONFIG_FILE_NAME);
        fs::write(
            &path,
            r#"
template = "assets/card.svg"

[gate]
enabled = false

[output]
layout = "directory"
dir = "public/og"
"#,
        )
        .unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.template, PathBuf::from("assets/card.svg"));
        assert!(!config.gate.enabled);
        assert_eq!(config.output.layout, OutputLayout::Directory);
        assert_eq!(config.output.dir, PathBuf::from("public/og"));
        // Unspecified values should be defaults
        assert_eq!(config.gate.key, "autoGenOgpImg");
        assert_eq!(config.output.content_root, PathBuf::from("content"));
    }

    #[test]
    fn load_config_invalid_toml_is_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join(CONFIG_FILE_NAME);
        fs::write(&path, "this is not valid toml [[[").unwrap();

        let result = load_config(&path);
        assert!(matches!(result, Err(ConfigError::Toml(_))));
    }

    #[test]
    fn load_required_config_missing_file_is_error() {
        let tmp = TempDir::new().unwrap();
        let result = load_required_config(&tmp.path().join("nope.toml"));
        assert!(matches!(result, Err(ConfigError::NotFound(_))));
    }

    #[test]
    fn load_config_reads_chrome_path() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join(CONFIG_FILE_NAME);
        fs::write(&path, "[browser]\nchrome_path = \"/opt/chrome/chrome\"\n").unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(
            config.browser.chrome_path,
            Some(PathBuf::from("/opt/chrome/chrome"))
        );
        assert_eq!(config.browser.timeout_secs, 30);
    }

    // =========================================================================
    // merge tests
    // =========================================================================

    #[test]
    fn merge_toml_scalar_override() {
        let base: toml::Value = toml::from_str("a = 1\nb = 2").unwrap();
        let overlay: toml::Value = toml::from_str("b = 3").unwrap();
        let merged = merge_toml(base, overlay);
        assert_eq!(merged["a"].as_integer(), Some(1));
        assert_eq!(merged["b"].as_integer(), Some(3));
    }

    #[test]
    fn merge_toml_nested_tables() {
        let base = stock_defaults_value().unwrap();
        let overlay: toml::Value = toml::from_str("[image]\nheight = 400").unwrap();
        let merged = merge_toml(base, overlay);
        assert_eq!(merged["image"]["height"].as_integer(), Some(400));
        assert_eq!(merged["image"]["width"].as_integer(), Some(1200));
        assert_eq!(merged["gate"]["key"].as_str(), Some("autoGenOgpImg"));
    }

    // =========================================================================
    // Unknown keys and validation
    // =========================================================================

    #[test]
    fn unknown_key_rejected() {
        let result: Result<Config, _> = toml::from_str("tempalte = \"x.svg\"");
        assert!(result.is_err());
    }

    #[test]
    fn unknown_nested_key_rejected() {
        let result: Result<Config, _> = toml::from_str("[image]\nwidht = 10");
        assert!(result.is_err());
    }

    #[test]
    fn validate_default_config_passes() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn validate_zero_width() {
        let mut config = Config::default();
        config.image.width = 0;
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn validate_negative_inset() {
        let mut config = Config::default();
        config.image.inset = -1.0;
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn validate_empty_placeholder() {
        let mut config = Config::default();
        config.placeholder.clear();
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn validate_empty_gate_key() {
        let mut config = Config::default();
        config.gate.key = " ".into();
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn validate_zero_timeout() {
        let mut config = Config::default();
        config.browser.timeout_secs = 0;
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn load_config_validates_values() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join(CONFIG_FILE_NAME);
        fs::write(&path, "[image]\nheight = 0\n").unwrap();
        assert!(matches!(
            load_config(&path),
            Err(ConfigError::Validation(_))
        ));
    }

    // =========================================================================
    // Stock config
    // =========================================================================

    #[test]
    fn stock_config_toml_roundtrips_to_defaults() {
        let parsed: Config = toml::from_str(stock_config_toml()).unwrap();
        assert_eq!(parsed, Config::default());
    }

    #[test]
    fn stock_config_toml_contains_all_sections() {
        let content = stock_config_toml();
        for section in ["[image]", "[gate]", "[output]", "[browser]", "[logging]"] {
            assert!(content.contains(section), "missing {section}");
        }
    }
}
