// src/display/manager.rs
//! VideoContext - frontend-side slot holding the active context driver.
//!
//! The frontend drives whichever `ContextDriver` was selected through this
//! slot. An empty slot (init failed, or the driver was destroyed) answers every
//! call with the neutral value instead of failing.

use crate::display::driver::ContextDriver;
use crate::display::types::{ContextFlags, FrameInfo, GfxApi, ProcAddress, WindowStatus};
use crate::input::InputDriver;
use anyhow::Result;
use log::{error, info};

#[derive(Default)]
pub struct VideoContext {
    driver: Option<Box<dyn ContextDriver>>,
}

impl VideoContext {
    pub fn new(driver: Box<dyn ContextDriver>) -> Self {
        info!("VideoContext: using '{}' context driver", driver.ident());
        VideoContext {
            driver: Some(driver),
        }
    }

    /// Wrap the outcome of a driver's init; a failed init leaves the slot empty.
    pub fn from_init(result: Result<Box<dyn ContextDriver>>) -> Self {
        match result {
            Ok(driver) => Self::new(driver),
            Err(e) => {
                error!("VideoContext: context driver init failed: {:#}", e);
                Self::default()
            }
        }
    }

    pub fn is_active(&self) -> bool {
        self.driver.is_some()
    }

    /// Destroy the driver and empty the slot.
    pub fn destroy(&mut self) {
        if let Some(mut driver) = self.driver.take() {
            driver.destroy();
            info!("VideoContext: '{}' context driver destroyed", driver.ident());
        }
    }

    pub fn ident(&self) -> Option<&'static str> {
        self.driver.as_ref().map(|driver| driver.ident())
    }

    pub fn get_api(&self) -> GfxApi {
        self.driver
            .as_ref()
            .map_or(GfxApi::None, |driver| driver.get_api())
    }

    pub fn bind_api(&mut self, api: GfxApi, major: u32, minor: u32) -> bool {
        self.driver
            .as_mut()
            .is_some_and(|driver| driver.bind_api(api, major, minor))
    }

    pub fn swap_interval(&mut self, interval: i32) {
        if let Some(driver) = self.driver.as_mut() {
            driver.swap_interval(interval);
        }
    }

    pub fn set_video_mode(&mut self, width: u32, height: u32, fullscreen: bool) -> bool {
        self.driver
            .as_mut()
            .is_some_and(|driver| driver.set_video_mode(width, height, fullscreen))
    }

    /// `None` when there is no driver to ask.
    pub fn get_video_size(&self) -> Option<(u32, u32)> {
        self.driver.as_ref().map(|driver| driver.get_video_size())
    }

    pub fn get_refresh_rate(&self) -> f32 {
        self.driver
            .as_ref()
            .map_or(0.0, |driver| driver.get_refresh_rate())
    }

    pub fn check_window(&self) -> WindowStatus {
        self.driver
            .as_ref()
            .map(|driver| driver.check_window())
            .unwrap_or_default()
    }

    pub fn has_focus(&self) -> bool {
        self.driver.as_ref().is_some_and(|driver| driver.has_focus())
    }

    pub fn suppress_screensaver(&mut self, enable: bool) -> bool {
        self.driver
            .as_mut()
            .is_some_and(|driver| driver.suppress_screensaver(enable))
    }

    pub fn swap_buffers(&mut self, frame: &FrameInfo) {
        if let Some(driver) = self.driver.as_mut() {
            driver.swap_buffers(frame);
        }
    }

    pub fn input_driver_fallback(&self, joypad_name: &str) -> Option<Box<dyn InputDriver>> {
        self.driver
            .as_ref()
            .and_then(|driver| driver.input_driver_fallback(joypad_name))
    }

    pub fn get_proc_address(&self, symbol: &str) -> Option<ProcAddress> {
        self.driver
            .as_ref()
            .and_then(|driver| driver.get_proc_address(symbol))
    }

    pub fn get_flags(&self) -> ContextFlags {
        self.driver
            .as_ref()
            .map_or(ContextFlags::empty(), |driver| driver.get_flags())
    }

    pub fn set_flags(&mut self, flags: ContextFlags) {
        if let Some(driver) = self.driver.as_mut() {
            driver.set_flags(flags);
        }
    }

    pub fn bind_hw_render(&mut self, enable: bool) {
        if let Some(driver) = self.driver.as_mut() {
            driver.bind_hw_render(enable);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::drivers::KmsContext;
    use crate::platform::backends::headless::{BackendCall, HeadlessBackend, HeadlessEgl};
    use crate::platform::frontend::Frontend;
    use anyhow::anyhow;
    use test_log::test;

    struct QuietFrontend;

    impl Frontend for QuietFrontend {
        fn install_signal_handler(&self) {}

        fn shutdown_requested(&self) -> bool {
            false
        }

        fn video_driver_ident(&self) -> &str {
            "gl"
        }

        fn input_driver_name(&self) -> &str {
            "udev"
        }
    }

    #[test]
    fn it_should_answer_neutrally_when_empty() {
        let mut video = VideoContext::from_init(Err(anyhow!("no KMS device")));

        assert!(!video.is_active());
        assert_eq!(video.ident(), None);
        assert_eq!(video.get_api(), GfxApi::None);
        assert!(!video.bind_api(GfxApi::OpenGlEs, 2, 0));
        assert!(!video.set_video_mode(480, 320, true));
        assert_eq!(video.get_video_size(), None);
        assert_eq!(video.check_window(), WindowStatus::default());
        assert!(!video.has_focus());
        assert_eq!(video.get_flags(), ContextFlags::empty());
        assert!(video.get_proc_address("glClear").is_none());
        video.swap_interval(1);
        video.swap_buffers(&FrameInfo::default());
        video.destroy();
    }

    #[test]
    fn it_should_drive_the_kms_driver_end_to_end() -> Result<()> {
        let backend = HeadlessBackend::new();
        let log = backend.call_log();
        let driver = KmsContext::init(backend, HeadlessEgl::new(), Box::new(QuietFrontend))?;
        let mut video = VideoContext::new(Box::new(driver));

        assert_eq!(video.ident(), Some("kms"));
        assert!(video.bind_api(GfxApi::OpenGlEs, 2, 0));
        assert!(video.set_video_mode(320, 240, false));
        assert_eq!(video.get_video_size(), Some((480, 320)));
        video.swap_buffers(&FrameInfo { frame_count: 1 });
        video.destroy();

        assert!(!video.is_active());
        let calls = log.borrow();
        assert!(calls.iter().any(|call| matches!(call, BackendCall::Post { .. })));
        assert_eq!(
            calls[calls.len() - 3..],
            [
                BackendCall::DestroyContext,
                BackendCall::DestroyPresenter,
                BackendCall::DestroyDisplay,
            ]
        );
        Ok(())
    }

    #[test]
    fn it_should_tolerate_repeated_destroy() -> Result<()> {
        let backend = HeadlessBackend::new();
        let log = backend.call_log();
        let driver = KmsContext::init(backend, HeadlessEgl::new(), Box::new(QuietFrontend))?;
        let mut video = VideoContext::new(Box::new(driver));

        video.destroy();
        let after_first = log.borrow().len();
        video.destroy();

        assert_eq!(log.borrow().len(), after_first);
        Ok(())
    }
}
