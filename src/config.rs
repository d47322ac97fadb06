// src/config.rs

//! Configuration for the KMS context driver and its demo frontend.
//!
//! Deserialized from a JSON file named by `KMS_CONTEXT_CONFIG`; every section
//! and field falls back to its default when missing.

use crate::display::types::GfxApi;
use anyhow::{Context, Result};
use log::{info, warn};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Environment variable naming the configuration file.
pub const CONFIG_PATH_ENV: &str = "KMS_CONTEXT_CONFIG";

/// Global configuration, loaded on first access.
pub static CONFIG: Lazy<Config> = Lazy::new(Config::from_env);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub video: VideoConfig,
    pub input: InputConfig,
    pub egl: EglConfig,
    pub demo: DemoConfig,
}

impl Config {
    /// Read and parse a configuration file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        serde_json::from_str(&text)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }

    /// Load the file named by `KMS_CONTEXT_CONFIG`, or defaults if unset or unreadable.
    pub fn from_env() -> Self {
        let Some(path) = std::env::var_os(CONFIG_PATH_ENV) else {
            return Config::default();
        };
        match Config::load(Path::new(&path)) {
            Ok(config) => {
                info!("Configuration loaded from {}", Path::new(&path).display());
                config
            }
            Err(e) => {
                warn!("{:#}. Using default configuration.", e);
                Config::default()
            }
        }
    }
}

// --- Video ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VideoConfig {
    /// Identifier of the video driver the frontend runs ("gl", "glcore", ...).
    pub driver: String,
    /// Rendering API to bind.
    pub api: GfxApi,
    pub api_major: u32,
    pub api_minor: u32,
    pub swap_interval: i32,
    /// Requested mode. The KMS driver always uses its fixed panel size.
    pub width: u32,
    pub height: u32,
    pub fullscreen: bool,
    /// Ask for a core-profile GL context.
    pub core_context: bool,
}

impl Default for VideoConfig {
    fn default() -> Self {
        VideoConfig {
            driver: "gl".to_string(),
            api: GfxApi::OpenGlEs,
            api_major: 2,
            api_minor: 0,
            swap_interval: 1,
            width: 640,
            height: 480,
            fullscreen: true,
            core_context: false,
        }
    }
}

// --- Input ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    pub driver: String,
    pub joypad_driver: String,
}

impl Default for InputConfig {
    fn default() -> Self {
        InputConfig {
            driver: "udev".to_string(),
            joypad_driver: "udev".to_string(),
        }
    }
}

// --- EGL ---

/// Client APIs and extensions the platform's EGL provides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EglConfig {
    pub opengl: bool,
    pub opengl_es: bool,
    pub openvg: bool,
    /// `EGL_KHR_create_context` is available.
    pub khr_create_context: bool,
}

impl Default for EglConfig {
    fn default() -> Self {
        // Mali-G31 blobs on RK3326 handhelds: GLES only.
        EglConfig {
            opengl: false,
            opengl_es: true,
            openvg: false,
            khr_create_context: true,
        }
    }
}

// --- Demo loop ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DemoConfig {
    /// Stop after this many frames. `None` runs until a shutdown signal.
    pub max_frames: Option<u64>,
    pub frame_interval_ms: u64,
}

impl Default for DemoConfig {
    fn default() -> Self {
        DemoConfig {
            max_frames: None,
            frame_interval_ms: 16,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn it_should_fill_missing_fields_with_defaults() -> Result<()> {
        let config: Config =
            serde_json::from_str(r#"{ "video": { "driver": "glcore", "api": "opengl" } }"#)?;
        assert_eq!(config.video.driver, "glcore");
        assert_eq!(config.video.api, GfxApi::OpenGl);
        assert_eq!(config.video.swap_interval, 1);
        assert_eq!(config.input, InputConfig::default());
        assert_eq!(config.egl, EglConfig::default());
        Ok(())
    }

    #[test]
    fn it_should_report_the_path_of_a_missing_file() {
        let err = Config::load(Path::new("/nonexistent/kms-context.json")).unwrap_err();
        assert!(format!("{:#}", err).contains("/nonexistent/kms-context.json"));
    }

    #[test]
    fn it_should_load_a_config_file_from_disk() -> Result<()> {
        let path = std::env::temp_dir().join(format!("kms-context-{}.json", std::process::id()));
        std::fs::write(
            &path,
            r#"{ "input": { "driver": "x" }, "demo": { "max_frames": 3 } }"#,
        )?;

        let config = Config::load(&path)?;
        assert_eq!(config.input.driver, "x");
        assert_eq!(config.input.joypad_driver, "udev");
        assert_eq!(config.demo.max_frames, Some(3));

        std::fs::remove_file(&path)?;
        Ok(())
    }
}
