//! Configuration management.
//!
//! Supports configuration from:
//! - Named presets (`strict`, `moderate`, `lenient`)
//! - TOML config files
//! - Environment variables
//! - CLI arguments (for the `shield` binary)

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, ShieldError};

/// Default threat-history capacity
pub const DEFAULT_HISTORY_CAPACITY: usize = 50;

/// Named protection preset
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SecurityPreset {
    /// Reject anything suspicious, block submissions
    Strict,
    /// Flag and sanitize, never block
    #[default]
    Moderate,
    /// Minimal interference for trusted back-office input
    Lenient,
}

impl SecurityPreset {
    /// All presets, strictest first
    pub const ALL: [SecurityPreset; 3] = [
        SecurityPreset::Strict,
        SecurityPreset::Moderate,
        SecurityPreset::Lenient,
    ];

    /// Expand into the full preset bundle
    pub fn config(self) -> PresetConfig {
        match self {
            SecurityPreset::Strict => PresetConfig {
                detection: DetectionConfig {
                    log_threats: true,
                },
                sanitization: SanitizationConfig {
                    enabled: true,
                    strip_markup: true,
                },
                validation: ValidationConfig {
                    enabled: true,
                    strict_mode: true,
                    max_length: 100,
                    allow_special_chars: false,
                },
                handlers: HandlerConfig {
                    block_submission: true,
                },
            },
            SecurityPreset::Moderate => PresetConfig {
                detection: DetectionConfig {
                    log_threats: true,
                },
                sanitization: SanitizationConfig {
                    enabled: true,
                    strip_markup: true,
                },
                validation: ValidationConfig {
                    enabled: true,
                    strict_mode: false,
                    max_length: 255,
                    allow_special_chars: true,
                },
                handlers: HandlerConfig {
                    block_submission: false,
                },
            },
            SecurityPreset::Lenient => PresetConfig {
                detection: DetectionConfig {
                    log_threats: false,
                },
                sanitization: SanitizationConfig {
                    enabled: true,
                    strip_markup: false,
                },
                validation: ValidationConfig {
                    enabled: true,
                    strict_mode: false,
                    max_length: 1000,
                    allow_special_chars: true,
                },
                handlers: HandlerConfig {
                    block_submission: false,
                },
            },
        }
    }
}

impl std::fmt::Display for SecurityPreset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SecurityPreset::Strict => write!(f, "strict"),
            SecurityPreset::Moderate => write!(f, "moderate"),
            SecurityPreset::Lenient => write!(f, "lenient"),
        }
    }
}

impl std::str::FromStr for SecurityPreset {
    type Err = ShieldError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "strict" => Ok(SecurityPreset::Strict),
            "moderate" => Ok(SecurityPreset::Moderate),
            "lenient" => Ok(SecurityPreset::Lenient),
            other => Err(ShieldError::UnknownPreset(other.to_string())),
        }
    }
}

/// Detection reporting.
///
/// The detector itself always runs; only what happens to its findings is
/// configurable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetectionConfig {
    /// Log threat events through `tracing`
    pub log_threats: bool,
}

/// Sanitization toggles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SanitizationConfig {
    /// Forward sanitized values instead of the originals
    pub enabled: bool,
    /// Also run the general-purpose markup stripper on forwarded values
    pub strip_markup: bool,
}

/// Validation toggles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationConfig {
    /// Run the validator
    pub enabled: bool,
    /// Treat any unsafe detection as a validation error
    pub strict_mode: bool,
    /// Maximum accepted length in characters
    pub max_length: usize,
    /// Accept inputs with many special characters
    pub allow_special_chars: bool,
}

/// Handler toggles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandlerConfig {
    /// Refuse form submission when any field carries threats
    pub block_submission: bool,
}

/// Everything a preset sets at once
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PresetConfig {
    /// Detection toggles
    pub detection: DetectionConfig,
    /// Sanitization toggles
    pub sanitization: SanitizationConfig,
    /// Validation toggles
    pub validation: ValidationConfig,
    /// Handler toggles
    pub handlers: HandlerConfig,
}

/// Per-call-site protection options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProtectionOptions {
    /// Forward sanitized values
    pub sanitize: bool,
    /// Run the validator
    pub validate: bool,
    /// Escalate unsafe detections to validation errors
    pub strict_mode: bool,
    /// Maximum accepted length in characters
    pub max_length: usize,
    /// Accept inputs with many special characters
    pub allow_special_chars: bool,
    /// Log threat events
    pub log_threats: bool,
    /// Block form submission on threats
    pub block_submission: bool,
    /// Also strip markup from forwarded values
    pub strip_markup: bool,
}

impl Default for ProtectionOptions {
    fn default() -> Self {
        Self::preset(SecurityPreset::default())
    }
}

impl From<PresetConfig> for ProtectionOptions {
    fn from(config: PresetConfig) -> Self {
        Self {
            sanitize: config.sanitization.enabled,
            validate: config.validation.enabled,
            strict_mode: config.validation.strict_mode,
            max_length: config.validation.max_length,
            allow_special_chars: config.validation.allow_special_chars,
            log_threats: config.detection.log_threats,
            block_submission: config.handlers.block_submission,
            strip_markup: config.sanitization.strip_markup,
        }
    }
}

impl ProtectionOptions {
    /// Options for a named preset
    pub fn preset(preset: SecurityPreset) -> Self {
        preset.config().into()
    }

    /// Set strict mode
    pub fn with_strict_mode(mut self, strict: bool) -> Self {
        self.strict_mode = strict;
        self
    }

    /// Set length limit
    pub fn with_max_length(mut self, max_length: usize) -> Self {
        self.max_length = max_length;
        self
    }

    /// Set submission blocking
    pub fn with_blocking(mut self, block: bool) -> Self {
        self.block_submission = block;
        self
    }
}

/// Overrides applied on top of a preset
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Overrides {
    /// Maximum accepted length
    pub max_length: Option<usize>,
    /// Strict mode
    pub strict_mode: Option<bool>,
    /// Special-character tolerance
    pub allow_special_chars: Option<bool>,
    /// Threat logging
    pub log_threats: Option<bool>,
    /// Submission blocking
    pub block_submission: Option<bool>,
    /// Markup stripping
    pub strip_markup: Option<bool>,
}

/// Main configuration struct
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShieldConfig {
    /// Base preset
    pub preset: SecurityPreset,
    /// Field-level overrides
    pub overrides: Overrides,
    /// Capacity of the threat history kept by consumers
    pub history_capacity: usize,
}

impl Default for ShieldConfig {
    fn default() -> Self {
        Self {
            preset: SecurityPreset::default(),
            overrides: Overrides::default(),
            history_capacity: DEFAULT_HISTORY_CAPACITY,
        }
    }
}

impl ShieldConfig {
    /// Default config file location (`<config dir>/shield/config.toml`)
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("shield").join("config.toml"))
    }

    /// Load configuration from a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse configuration from TOML text
    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through a variable lookup
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(preset) = lookup("SHIELD_PRESET") {
            match preset.parse() {
                Ok(preset) => config.preset = preset,
                Err(e) => tracing::warn!("Ignoring SHIELD_PRESET: {e}"),
            }
        }
        if let Some(val) = lookup("SHIELD_MAX_LENGTH") {
            if let Ok(val) = val.trim().parse() {
                config.overrides.max_length = Some(val);
            }
        }
        if let Some(val) = lookup("SHIELD_STRICT_MODE") {
            config.overrides.strict_mode = parse_flag(&val);
        }
        if let Some(val) = lookup("SHIELD_LOG_THREATS") {
            config.overrides.log_threats = parse_flag(&val);
        }
        if let Some(val) = lookup("SHIELD_HISTORY_CAPACITY") {
            if let Ok(val) = val.trim().parse() {
                config.history_capacity = val;
            }
        }

        config
    }

    /// Merge with another config (other takes precedence)
    pub fn merge(self, other: Self) -> Self {
        let defaults = Self::default();
        Self {
            preset: if other.preset == defaults.preset {
                self.preset
            } else {
                other.preset
            },
            overrides: Overrides {
                max_length: other.overrides.max_length.or(self.overrides.max_length),
                strict_mode: other.overrides.strict_mode.or(self.overrides.strict_mode),
                allow_special_chars: other
                    .overrides
                    .allow_special_chars
                    .or(self.overrides.allow_special_chars),
                log_threats: other.overrides.log_threats.or(self.overrides.log_threats),
                block_submission: other
                    .overrides
                    .block_submission
                    .or(self.overrides.block_submission),
                strip_markup: other.overrides.strip_markup.or(self.overrides.strip_markup),
            },
            history_capacity: if other.history_capacity == defaults.history_capacity {
                self.history_capacity
            } else {
                other.history_capacity
            },
        }
    }

    /// Resolve preset and overrides into call-site options
    pub fn protection_options(&self) -> ProtectionOptions {
        let base = ProtectionOptions::preset(self.preset);
        let o = &self.overrides;
        ProtectionOptions {
            max_length: o.max_length.unwrap_or(base.max_length),
            strict_mode: o.strict_mode.unwrap_or(base.strict_mode),
            allow_special_chars: o.allow_special_chars.unwrap_or(base.allow_special_chars),
            log_threats: o.log_threats.unwrap_or(base.log_threats),
            block_submission: o.block_submission.unwrap_or(base.block_submission),
            strip_markup: o.strip_markup.unwrap_or(base.strip_markup),
            ..base
        }
    }
}

fn parse_flag(val: &str) -> Option<bool> {
    match val.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
