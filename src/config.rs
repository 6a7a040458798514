//! Client configuration
//!
//! Settings are plain values with sensible defaults. The binary reads
//! overrides from `REMOTIA_*` environment variables.

use std::time::Duration;

use log::debug;

use crate::compositor::{LayoutContext, ScalingContext};
use crate::renderer::SurfaceStrategy;

/// Configuration errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {value:?}")]
    InvalidValue { key: &'static str, value: String },
    #[error("{key} must be a finite number greater than zero, got {value:?}")]
    InvalidRatio { key: &'static str, value: String },
}

/// Client-side settings
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    /// User zoom applied on top of host logical units
    pub user_scaling_ratio: f64,
    /// Device pixel ratio of the local display
    pub device_pixel_ratio: f64,
    /// Buffering strategy for window surfaces
    pub surface_strategy: SurfaceStrategy,
    /// Theme header height in host units
    pub header_height: f64,
    /// Border thickness in host units
    pub border_thickness: f64,
    /// Time between frame ticks
    pub frame_interval: Duration,
    /// Screen background color (ARGB)
    pub background_color: u32,
    /// Header fill color (ARGB)
    pub header_color: u32,
    /// Border fill color (ARGB)
    pub border_color: u32,
}

impl ClientConfig {
    pub const USER_SCALING: &'static str = "REMOTIA_USER_SCALING";
    pub const DEVICE_PIXEL_RATIO: &'static str = "REMOTIA_DEVICE_PIXEL_RATIO";
    pub const DOUBLE_BUFFERING: &'static str = "REMOTIA_DOUBLE_BUFFERING";
    pub const HEADER_HEIGHT: &'static str = "REMOTIA_HEADER_HEIGHT";
    pub const BORDER_THICKNESS: &'static str = "REMOTIA_BORDER_THICKNESS";
    pub const FRAME_INTERVAL_MS: &'static str = "REMOTIA_FRAME_INTERVAL_MS";

    /// Create a configuration with default values
    pub fn new() -> Self {
        Self {
            user_scaling_ratio: 1.0,
            device_pixel_ratio: 1.0,
            surface_strategy: SurfaceStrategy::DoubleBuffered,
            header_height: 28.0,
            border_thickness: 4.0,
            frame_interval: Duration::from_millis(16),
            background_color: 0xFF2B_2B2B,
            header_color: 0xFF3C_3F41,
            border_color: 0xFF55_5555,
        }
    }

    /// Read overrides from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read overrides through an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::new();

        if let Some(value) = lookup(Self::USER_SCALING) {
            config.user_scaling_ratio = parse_ratio(Self::USER_SCALING, &value)?;
        }
        if let Some(value) = lookup(Self::DEVICE_PIXEL_RATIO) {
            config.device_pixel_ratio = parse_ratio(Self::DEVICE_PIXEL_RATIO, &value)?;
        }
        if let Some(value) = lookup(Self::DOUBLE_BUFFERING) {
            config.surface_strategy = if parse_bool(Self::DOUBLE_BUFFERING, &value)? {
                SurfaceStrategy::DoubleBuffered
            } else {
                SurfaceStrategy::Direct
            };
        }
        if let Some(value) = lookup(Self::HEADER_HEIGHT) {
            config.header_height = parse_length(Self::HEADER_HEIGHT, &value)?;
        }
        if let Some(value) = lookup(Self::BORDER_THICKNESS) {
            config.border_thickness = parse_length(Self::BORDER_THICKNESS, &value)?;
        }
        if let Some(value) = lookup(Self::FRAME_INTERVAL_MS) {
            let millis = value
                .trim()
                .parse::<u64>()
                .map_err(|_| ConfigError::InvalidValue {
                    key: Self::FRAME_INTERVAL_MS,
                    value: value.clone(),
                })?;
            config.frame_interval = Duration::from_millis(millis);
        }

        debug!("Client configuration: {:?}", config);
        Ok(config)
    }

    pub fn with_user_scaling_ratio(mut self, ratio: f64) -> Self {
        self.user_scaling_ratio = ratio;
        self
    }

    pub fn with_device_pixel_ratio(mut self, ratio: f64) -> Self {
        self.device_pixel_ratio = ratio;
        self
    }

    pub fn with_surface_strategy(mut self, strategy: SurfaceStrategy) -> Self {
        self.surface_strategy = strategy;
        self
    }

    pub fn with_header_height(mut self, height: f64) -> Self {
        self.header_height = height;
        self
    }

    pub fn with_border_thickness(mut self, thickness: f64) -> Self {
        self.border_thickness = thickness;
        self
    }

    pub fn with_frame_interval(mut self, interval: Duration) -> Self {
        self.frame_interval = interval;
        self
    }

    /// Layout parameters derived from this configuration
    pub fn layout(&self) -> LayoutContext {
        LayoutContext {
            scaling: ScalingContext::new(self.user_scaling_ratio, self.device_pixel_ratio),
            default_header_height: self.header_height,
            border_thickness: self.border_thickness,
        }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Check that a scaling ratio is usable
pub fn validate_ratio(key: &'static str, ratio: f64) -> Result<f64, ConfigError> {
    if ratio.is_finite() && ratio > 0.0 {
        Ok(ratio)
    } else {
        Err(ConfigError::InvalidRatio {
            key,
            value: ratio.to_string(),
        })
    }
}

fn parse_ratio(key: &'static str, value: &str) -> Result<f64, ConfigError> {
    let ratio = value.trim().parse::<f64>().map_err(|_| ConfigError::InvalidRatio {
        key,
        value: value.to_string(),
    })?;
    validate_ratio(key, ratio)
}

fn parse_length(key: &'static str, value: &str) -> Result<f64, ConfigError> {
    match value.trim().parse::<f64>() {
        Ok(length) if length.is_finite() && length >= 0.0 => Ok(length),
        _ => Err(ConfigError::InvalidValue {
            key,
            value: value.to_string(),
        }),
    }
}

fn parse_bool(key: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            key,
            value: value.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = ClientConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, ClientConfig::default());
        assert_eq!(config.surface_strategy, SurfaceStrategy::DoubleBuffered);
    }

    #[test]
    fn test_overrides() {
        let config = ClientConfig::from_lookup(lookup(&[
            (ClientConfig::USER_SCALING, "1.25"),
            (ClientConfig::DEVICE_PIXEL_RATIO, "2"),
            (ClientConfig::DOUBLE_BUFFERING, "off"),
            (ClientConfig::HEADER_HEIGHT, "32"),
            (ClientConfig::FRAME_INTERVAL_MS, "8"),
        ]))
        .unwrap();

        assert_eq!(config.user_scaling_ratio, 1.25);
        assert_eq!(config.device_pixel_ratio, 2.0);
        assert_eq!(config.surface_strategy, SurfaceStrategy::Direct);
        assert_eq!(config.header_height, 32.0);
        assert_eq!(config.frame_interval, Duration::from_millis(8));
        assert_eq!(config.layout().scaling.pixel_ratio(), 2.5);
    }

    #[test]
    fn test_invalid_ratio() {
        let err = ClientConfig::from_lookup(lookup(&[(ClientConfig::USER_SCALING, "0")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidRatio { .. }));

        let err = ClientConfig::from_lookup(lookup(&[(ClientConfig::DEVICE_PIXEL_RATIO, "NaN")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidRatio { .. }));
    }

    #[test]
    fn test_invalid_values() {
        let err = ClientConfig::from_lookup(lookup(&[(ClientConfig::DOUBLE_BUFFERING, "maybe")]))
            .unwrap_err();
        assert_eq!(
            err,
            ConfigError::InvalidValue {
                key: ClientConfig::DOUBLE_BUFFERING,
                value: "maybe".to_string()
            }
        );

        assert!(ClientConfig::from_lookup(lookup(&[(ClientConfig::BORDER_THICKNESS, "-1")])).is_err());
    }
}
