// src/platform/frontend.rs

//! Services the emulator frontend provides to context drivers.

use crate::config::Config;
use crate::platform::os::signals;
use log::warn;

/// Frontend hooks a context driver calls back into.
pub trait Frontend {
    /// Arrange for shutdown signals to be turned into a quit request.
    fn install_signal_handler(&self);

    /// Whether a shutdown signal has been received.
    fn shutdown_requested(&self) -> bool;

    /// Identifier of the active video driver (e.g. "gl", "glcore").
    fn video_driver_ident(&self) -> &str;

    /// Name of the configured input driver (e.g. "udev", "x").
    fn input_driver_name(&self) -> &str;
}

/// Frontend backed by real process signals and the loaded configuration.
#[derive(Debug, Clone)]
pub struct SystemFrontend {
    video_driver: String,
    input_driver: String,
}

impl SystemFrontend {
    pub fn new(config: &Config) -> Self {
        SystemFrontend {
            video_driver: config.video.driver.clone(),
            input_driver: config.input.driver.clone(),
        }
    }
}

impl Frontend for SystemFrontend {
    fn install_signal_handler(&self) {
        if let Err(e) = signals::install_shutdown_handler() {
            warn!("Could not install shutdown signal handler: {:#}", e);
        }
    }

    fn shutdown_requested(&self) -> bool {
        signals::shutdown_requested()
    }

    fn video_driver_ident(&self) -> &str {
        &self.video_driver
    }

    fn input_driver_name(&self) -> &str {
        &self.input_driver
    }
}
