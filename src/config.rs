//! Slicer configuration module.
//!
//! Handles loading, validating, and merging a `config.toml`. User files are
//! sparse: they are merged on top of the stock defaults, so a file only needs
//! the keys it wants to change.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [slicing]
//! aspect_ratio = [3, 4]     # slice width:height
//! standard_width = 1080     # slice width in standard mode
//! min_slices = 2            # never fewer slices than this
//!
//! [output]
//! quality = 95              # JPEG quality (1-100)
//! archive_name = "instagram_carousel_slices.zip"
//!
//! [full_view]
//! margin = 0.08             # fraction of the tile width on each side
//! background = "#FFFFFF"
//! border = "#EEEEEE"
//!
//! [processing]
//! max_processes = 4         # Max parallel encoders (omit for auto = CPU cores)
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::imaging::{LayoutParams, Quality, RenderConfig};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("TOML serialize error: {0}")]
    TomlSer(#[from] toml::ser::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Slicer configuration loaded from `config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SlicerConfig {
    /// Slice geometry.
    pub slicing: SlicingConfig,
    /// Encoding and archive settings.
    pub output: OutputConfig,
    /// Full-view composite appearance.
    pub full_view: FullViewConfig,
    /// Parallel encoding settings.
    pub processing: ProcessingConfig,
}

impl SlicerConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let [aw, ah] = self.slicing.aspect_ratio;
        if aw == 0 || ah == 0 {
            return Err(ConfigError::Validation(
                "slicing.aspect_ratio values must be non-zero".into(),
            ));
        }
        if self.slicing.standard_width == 0 {
            return Err(ConfigError::Validation(
                "slicing.standard_width must be positive".into(),
            ));
        }
        if self.layout_params().standard_height() == 0 {
            return Err(ConfigError::Validation(
                "slicing.standard_width is too small for the aspect ratio".into(),
            ));
        }
        if self.slicing.min_slices == 0 {
            return Err(ConfigError::Validation(
                "slicing.min_slices must be at least 1".into(),
            ));
        }
        if !(1..=100).contains(&self.output.quality) {
            return Err(ConfigError::Validation(
                "output.quality must be 1-100".into(),
            ));
        }
        if !self.output.archive_name.ends_with(".zip") {
            return Err(ConfigError::Validation(
                "output.archive_name must end in .zip".into(),
            ));
        }
        if !(0.0..0.5).contains(&self.full_view.margin) {
            return Err(ConfigError::Validation(
                "full_view.margin must be in [0, 0.5)".into(),
            ));
        }
        parse_hex_color(&self.full_view.background)?;
        parse_hex_color(&self.full_view.border)?;
        Ok(())
    }

    /// Calculator constants.
    pub fn layout_params(&self) -> LayoutParams {
        let [aw, ah] = self.slicing.aspect_ratio;
        LayoutParams {
            aspect: (aw, ah),
            standard_width: self.slicing.standard_width,
            min_slices: self.slicing.min_slices,
        }
    }

    /// Render settings; colors must already be validated.
    pub fn render_config(&self) -> Result<RenderConfig, ConfigError> {
        Ok(RenderConfig {
            quality: Quality::new(self.output.quality),
            margin: self.full_view.margin,
            background: parse_hex_color(&self.full_view.background)?,
            border: parse_hex_color(&self.full_view.border)?,
        })
    }
}

/// Slice geometry settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SlicingConfig {
    /// Aspect ratio as `[width, height]`; `[3, 4]` is a portrait carousel tile.
    pub aspect_ratio: [u32; 2],
    /// Slice width in standard mode. The height follows from the aspect ratio.
    pub standard_width: u32,
    /// Minimum number of slices per panorama.
    pub min_slices: u32,
}

impl Default for SlicingConfig {
    fn default() -> Self {
        let layout = LayoutParams::default();
        Self {
            aspect_ratio: [layout.aspect.0, layout.aspect.1],
            standard_width: layout.standard_width,
            min_slices: layout.min_slices,
        }
    }
}

/// Output settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputConfig {
    /// JPEG encoding quality (1 = worst, 100 = best).
    pub quality: u32,
    /// Filename of the downloaded archive.
    pub archive_name: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            quality: 95,
            archive_name: crate::naming::ARCHIVE_NAME.to_string(),
        }
    }
}

/// Full-view composite settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FullViewConfig {
    /// Margin on each side, as a fraction of the tile width.
    pub margin: f64,
    /// Canvas fill color (`#RRGGBB`).
    pub background: String,
    /// Hairline color around the panorama (`#RRGGBB`).
    pub border: String,
}

impl Default for FullViewConfig {
    fn default() -> Self {
        Self {
            margin: 0.08,
            background: "#FFFFFF".to_string(),
            border: "#EEEEEE".to_string(),
        }
    }
}

/// Parallel processing settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Maximum number of parallel JPEG encoders.
    /// When absent, defaults to the number of CPU cores.
    /// Values larger than the core count are clamped down.
    pub max_processes: Option<usize>,
}

/// Number of encoder threads: `max_processes` clamped to `1..=cores`, or all
/// cores when unset.
pub fn effective_threads(config: &ProcessingConfig) -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    config
        .max_processes
        .map(|n| n.clamp(1, cores))
        .unwrap_or(cores)
}

/// Parse `#RRGGBB` into RGB bytes.
pub fn parse_hex_color(value: &str) -> Result<[u8; 3], ConfigError> {
    let invalid = || ConfigError::Validation(format!("invalid color '{value}', expected #RRGGBB"));
    let hex = value.strip_prefix('#').ok_or_else(invalid)?;
    if hex.len() != 6 || !hex.is_ascii() {
        return Err(invalid());
    }
    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| invalid());
    Ok([channel(0)?, channel(2)?, channel(4)?])
}

// =============================================================================
// Loading
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    Ok(toml::Value::try_from(SlicerConfig::default())?)
}

/// Deep-merge `overlay` into `base`. Tables merge per key; any other overlay
/// value replaces the base value outright.
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

/// Parse user TOML, merge it over the stock defaults and validate.
pub fn parse_config(content: &str) -> Result<SlicerConfig, ConfigError> {
    let overlay: toml::Value = toml::from_str(content)?;
    let merged = merge_toml(stock_defaults_value()?, overlay);
    let config: SlicerConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load the config file at `path`, or the stock defaults when `path` is `None`.
pub fn load_config(path: Option<&Path>) -> Result<SlicerConfig, ConfigError> {
    match path {
        Some(path) => {
            let content = fs::read_to_string(path)?;
            parse_config(&content)
        }
        None => Ok(SlicerConfig::default()),
    }
}

/// Returns a fully-commented stock `config.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# Panorama Slicer Configuration
# =============================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults. Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Slice geometry
# ---------------------------------------------------------------------------
[slicing]
# Slice aspect ratio as [width, height]. [3, 4] matches portrait carousel posts.
aspect_ratio = [3, 4]

# Slice width in standard mode; the height follows from the aspect ratio
# (1080 x 1440 with the defaults). High-res mode uses the panorama's own height.
standard_width = 1080

# A panorama is always cut into at least this many slices.
min_slices = 2

# ---------------------------------------------------------------------------
# Output
# ---------------------------------------------------------------------------
[output]
# JPEG quality (1 = worst, 100 = best).
quality = 95

# Filename of the zip archive.
archive_name = "instagram_carousel_slices.zip"

# ---------------------------------------------------------------------------
# Full-view composite (slice_00_full_view.jpg)
# ---------------------------------------------------------------------------
[full_view]
# Margin on each side as a fraction of the tile width.
margin = 0.08

# Canvas fill and hairline border colors.
background = "#FFFFFF"
border = "#EEEEEE"

# ---------------------------------------------------------------------------
# Processing
# ---------------------------------------------------------------------------
[processing]
# Maximum parallel JPEG encoders.
# Omit or comment out to auto-detect (= number of CPU cores).
# max_processes = 4
"##
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn zero_height_slices_rejected() {
        // 1 / (4/1) rounds to a 0px standard slice
        let result = parse_config("[slicing]\naspect_ratio = [4, 1]\nstandard_width = 1\n");
        assert!(matches!(result, Err(ConfigError::Validation(_))));
        assert!(parse_config("[slicing]\naspect_ratio = [4, 1]\nstandard_width = 2\n").is_ok());
    }

    #[test]
    fn default_config_matches_layout_constants() {
        let config = SlicerConfig::default();
        assert_eq!(config.slicing.aspect_ratio, [3, 4]);
        assert_eq!(config.slicing.standard_width, 1080);
        assert_eq!(config.slicing.min_slices, 2);
        assert_eq!(config.layout_params(), LayoutParams::default());
    }

    #[test]
    fn default_config_render_settings() {
        let render = SlicerConfig::default().render_config().unwrap();
        assert_eq!(render, RenderConfig::default());
    }

    #[test]
    fn default_config_validates() {
        SlicerConfig::default().validate().unwrap();
    }

    #[test]
    fn stock_toml_parses_to_defaults() {
        let config = parse_config(stock_config_toml()).unwrap();
        assert_eq!(config, SlicerConfig::default());
    }

    #[test]
    fn parse_partial_config() {
        let config = parse_config(
            r#"
[output]
quality = 80
"#,
        )
        .unwrap();
        assert_eq!(config.output.quality, 80);
        // Default values preserved
        assert_eq!(config.output.archive_name, "instagram_carousel_slices.zip");
        assert_eq!(config.slicing.standard_width, 1080);
    }

    #[test]
    fn unknown_keys_rejected() {
        let result = parse_config(
            r#"
[slicing]
standard_widht = 1200
"#,
        );
        assert!(matches!(result, Err(ConfigError::Toml(_))));
    }

    #[test]
    fn zero_aspect_rejected() {
        let result = parse_config("[slicing]\naspect_ratio = [0, 4]\n");
        assert!(matches!(result, Err(ConfigError::Validation(_))));
    }

    #[test]
    fn quality_out_of_range_rejected() {
        assert!(parse_config("[output]\nquality = 0\n").is_err());
        assert!(parse_config("[output]\nquality = 101\n").is_err());
    }

    #[test]
    fn bad_archive_name_rejected() {
        assert!(parse_config("[output]\narchive_name = \"slices.tar\"\n").is_err());
    }

    #[test]
    fn bad_margin_rejected() {
        assert!(parse_config("[full_view]\nmargin = 0.5\n").is_err());
        assert!(parse_config("[full_view]\nmargin = -0.1\n").is_err());
    }

    #[test]
    fn hex_colors() {
        assert_eq!(parse_hex_color("#FFFFFF").unwrap(), [255, 255, 255]);
        assert_eq!(parse_hex_color("#0a1B2c").unwrap(), [0x0a, 0x1b, 0x2c]);
        assert!(parse_hex_color("FFFFFF").is_err());
        assert!(parse_hex_color("#FFF").is_err());
        assert!(parse_hex_color("#GGGGGG").is_err());
    }

    #[test]
    fn merge_overlay_wins() {
        let base: toml::Value = toml::from_str("[a]\nx = 1\ny = 2\n").unwrap();
        let overlay: toml::Value = toml::from_str("[a]\ny = 3\n").unwrap();
        let merged = merge_toml(base, overlay);
        assert_eq!(merged["a"]["x"].as_integer(), Some(1));
        assert_eq!(merged["a"]["y"].as_integer(), Some(3));
    }

    #[test]
    fn load_config_from_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");
        fs::write(&path, "[full_view]\nborder = \"#000000\"\n").unwrap();

        let config = load_config(Some(&path)).unwrap();
        assert_eq!(config.full_view.border, "#000000");
        assert_eq!(config.render_config().unwrap().border, [0, 0, 0]);
    }

    #[test]
    fn load_config_missing_file_errors() {
        let result = load_config(Some(Path::new("/nonexistent/config.toml")));
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }

    #[test]
    fn load_config_without_path_uses_defaults() {
        assert_eq!(load_config(None).unwrap(), SlicerConfig::default());
    }

    #[test]
    fn effective_threads_clamps_to_cores() {
        let cores = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);
        let config = ProcessingConfig {
            max_processes: Some(10_000),
        };
        assert_eq!(effective_threads(&config), cores);
        assert_eq!(effective_threads(&ProcessingConfig::default()), cores);
        let one = ProcessingConfig {
            max_processes: Some(1),
        };
        assert_eq!(effective_threads(&one), 1);
    }
}
