// src/display/drivers/kms.rs
//! KMS/DRM context driver, running without any window manager.
//!
//! The panel is a fixed 480x320 surface scanned out rotated by 270 degrees
//! (the physical panel is mounted portrait). Requested mode sizes are ignored.

use crate::display::driver::ContextDriver;
use crate::display::types::{
    ContextAttributes, ContextFlags, FrameInfo, GfxApi, PanelOrientation, PixelFormat,
    ProcAddress, Rotation, WindowStatus,
};
use crate::input::{self, InputDriver, InputProber, SystemInputProber};
use crate::platform::backends::{EglApi, EglLayer, PresentationBackend};
use crate::platform::frontend::Frontend;
use anyhow::{Context, Result};
use log::{debug, info, trace, warn};

pub const KMS_IDENT: &str = "kms";

pub const FB_WIDTH: u32 = 480;
pub const FB_HEIGHT: u32 = 320;

pub const PRESENTER_FORMAT: PixelFormat = PixelFormat::Rgb565;
pub const PRESENTER_BACKGROUND: u32 = 0xff08_0808;

pub const PANEL_ORIENTATION: PanelOrientation =
    PanelOrientation::new(FB_WIDTH, FB_HEIGHT, Rotation::Degrees270);

pub const CONTEXT_ATTRIBUTES: ContextAttributes = ContextAttributes {
    major: 3,
    minor: 2,
    red_bits: 8,
    green_bits: 8,
    blue_bits: 8,
    alpha_bits: 8,
    depth_bits: 0,
    stencil_bits: 0,
};

/// Video driver identifier whose shaders are cross-compiled from slang.
const SLANG_VIDEO_DRIVER: &str = "glcore";

/// Highest swap interval the presenter honours.
const MAX_SWAP_INTERVAL: i32 = 1;

pub struct KmsContext<B: PresentationBackend, E: EglLayer> {
    backend: B,
    egl: E,
    frontend: Box<dyn Frontend>,
    input_prober: Box<dyn InputProber>,
    display: Option<B::Display>,
    presenter: Option<B::Presenter>,
    context: Option<B::Context>,
    api: GfxApi,
    api_version: (u32, u32),
    interval: i32,
    fb_width: u32,
    fb_height: u32,
    core_hw_context_enable: bool,
}

impl<B: PresentationBackend, E: EglLayer> KmsContext<B, E> {
    /// Open the display and create the presenter.
    ///
    /// The render context is created later, by the first `set_video_mode`.
    pub fn init(mut backend: B, egl: E, frontend: Box<dyn Frontend>) -> Result<Self> {
        let display = backend
            .create_display()
            .context("Failed to open KMS display")?;

        let presenter =
            match backend.create_presenter(&display, PRESENTER_FORMAT, PRESENTER_BACKGROUND) {
                Ok(presenter) => presenter,
                Err(e) => {
                    backend.destroy_display(display);
                    return Err(e).context("Failed to create KMS presenter");
                }
            };

        info!(
            "KmsContext: display and presenter ready ({:?}, background {:#010x})",
            PRESENTER_FORMAT, PRESENTER_BACKGROUND
        );

        Ok(KmsContext {
            backend,
            egl,
            frontend,
            input_prober: Box::new(SystemInputProber::new()),
            display: Some(display),
            presenter: Some(presenter),
            context: None,
            api: GfxApi::None,
            api_version: (0, 0),
            interval: 0,
            fb_width: 0,
            fb_height: 0,
            core_hw_context_enable: false,
        })
    }

    /// Replace the prober used by `input_driver_fallback`.
    pub fn with_input_prober(mut self, prober: Box<dyn InputProber>) -> Self {
        self.input_prober = prober;
        self
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn egl(&self) -> &E {
        &self.egl
    }

    /// Version passed to the last `bind_api`.
    pub fn api_version(&self) -> (u32, u32) {
        self.api_version
    }

    pub fn interval(&self) -> i32 {
        self.interval
    }

    pub fn core_hw_context_enabled(&self) -> bool {
        self.core_hw_context_enable
    }

    pub fn has_display(&self) -> bool {
        self.display.is_some()
    }

    pub fn has_presenter(&self) -> bool {
        self.presenter.is_some()
    }

    pub fn has_context(&self) -> bool {
        self.context.is_some()
    }

    fn uses_egl(&self) -> bool {
        EglApi::for_api(self.api).is_some()
    }

    fn present(&mut self, frame: &FrameInfo) {
        let (Some(context), Some(presenter)) = (self.context.as_ref(), self.presenter.as_ref())
        else {
            warn!(
                "KmsContext: swap_buffers before a context exists (frame {})",
                frame.frame_count
            );
            return;
        };

        self.backend.swap_buffers(context);

        let surface = match self.backend.lock_surface(context) {
            Ok(surface) => surface,
            Err(e) => {
                warn!("KmsContext: frame {} dropped: {:#}", frame.frame_count, e);
                return;
            }
        };

        let orientation = PANEL_ORIENTATION;
        if let Err(e) = self.backend.post(
            presenter,
            &surface,
            orientation.src,
            orientation.dst,
            orientation.rotation,
        ) {
            warn!("KmsContext: post failed for frame {}: {:#}", frame.frame_count, e);
        }

        self.backend.unlock_surface(context, surface);
        trace!("KmsContext: presented frame {}", frame.frame_count);
    }
}

impl<B: PresentationBackend, E: EglLayer> ContextDriver for KmsContext<B, E> {
    fn destroy(&mut self) {
        if let Some(context) = self.context.take() {
            self.backend.destroy_context(context);
            debug!("KmsContext: render context destroyed");
        }
        if let Some(presenter) = self.presenter.take() {
            self.backend.destroy_presenter(presenter);
            debug!("KmsContext: presenter destroyed");
        }
        if let Some(display) = self.display.take() {
            self.backend.destroy_display(display);
            info!("KmsContext: display closed");
        }
    }

    fn get_api(&self) -> GfxApi {
        self.api
    }

    fn bind_api(&mut self, api: GfxApi, major: u32, minor: u32) -> bool {
        // Recorded even when binding fails below.
        self.api = api;
        self.api_version = (major, minor);

        let Some(egl_api) = EglApi::for_api(api) else {
            debug!("KmsContext: {:?} cannot be bound on KMS", api);
            return false;
        };

        if !self.egl.supports(egl_api) {
            warn!("KmsContext: EGL does not provide {:?}", api);
            return false;
        }

        if !self.egl.has_create_context() {
            let needs_create_context = match api {
                GfxApi::OpenGl => major.saturating_mul(1000).saturating_add(minor) >= 3001,
                GfxApi::OpenGlEs => major >= 3,
                _ => false,
            };
            if needs_create_context {
                warn!(
                    "KmsContext: {:?} {}.{} requires EGL_KHR_create_context",
                    api, major, minor
                );
                return false;
            }
        }

        let bound = self.egl.bind_api(egl_api);
        info!("KmsContext: bind {:?} {}.{} -> {}", api, major, minor, bound);
        bound
    }

    fn swap_interval(&mut self, interval: i32) {
        if interval > MAX_SWAP_INTERVAL {
            warn!(
                "[KMS]: Swap intervals > {} currently not supported. Will use swap interval of {}.",
                MAX_SWAP_INTERVAL, MAX_SWAP_INTERVAL
            );
        }
        self.interval = interval.min(MAX_SWAP_INTERVAL);
    }

    fn set_video_mode(&mut self, width: u32, height: u32, fullscreen: bool) -> bool {
        let Some(display) = self.display.as_ref() else {
            warn!("KmsContext: set_video_mode on a destroyed context");
            return false;
        };

        self.frontend.install_signal_handler();

        debug!(
            "KmsContext: mode {}x{} (fullscreen={}) requested, using {}x{}",
            width, height, fullscreen, FB_WIDTH, FB_HEIGHT
        );
        self.fb_width = FB_WIDTH;
        self.fb_height = FB_HEIGHT;

        if self.context.is_none() {
            match self
                .backend
                .create_context(display, FB_WIDTH, FB_HEIGHT, &CONTEXT_ATTRIBUTES)
            {
                Ok(context) => self.context = Some(context),
                Err(e) => {
                    warn!("KmsContext: failed to create render context: {:#}", e);
                    return false;
                }
            }
        }

        if let Some(context) = self.context.as_ref() {
            self.backend.make_current(context);
        }
        self.backend.clear_color_buffer();

        true
    }

    fn get_video_size(&self) -> (u32, u32) {
        (self.fb_width, self.fb_height)
    }

    fn get_refresh_rate(&self) -> f32 {
        self.display
            .as_ref()
            .and_then(|display| self.backend.refresh_rate(display))
            .unwrap_or(0.0)
    }

    fn check_window(&self) -> WindowStatus {
        WindowStatus {
            quit: self.frontend.shutdown_requested(),
            resize: false,
        }
    }

    fn has_focus(&self) -> bool {
        true
    }

    fn suppress_screensaver(&mut self, _enable: bool) -> bool {
        false
    }

    fn has_windowed(&self) -> bool {
        false
    }

    fn swap_buffers(&mut self, frame: &FrameInfo) {
        if self.uses_egl() {
            self.present(frame);
        } else {
            warn!("KmsContext: unhandled swap_buffers for {:?}", self.api);
        }
    }

    fn input_driver_fallback(&self, joypad_name: &str) -> Option<Box<dyn InputDriver>> {
        input::select_fallback(
            self.frontend.input_driver_name(),
            joypad_name,
            self.input_prober.as_ref(),
        )
    }

    fn get_proc_address(&self, symbol: &str) -> Option<ProcAddress> {
        if !self.uses_egl() {
            return None;
        }
        self.egl.get_proc_address(symbol)
    }

    fn ident(&self) -> &'static str {
        KMS_IDENT
    }

    fn get_flags(&self) -> ContextFlags {
        let mut flags = ContextFlags::CUSTOMIZABLE_SWAPCHAIN_IMAGES;

        if self.core_hw_context_enable {
            flags |= ContextFlags::GL_CORE_CONTEXT;
        }

        if self.frontend.video_driver_ident() == SLANG_VIDEO_DRIVER {
            flags |= ContextFlags::SHADERS_SLANG;
        } else {
            flags |= ContextFlags::SHADERS_GLSL;
        }

        flags
    }

    fn set_flags(&mut self, flags: ContextFlags) {
        if flags.contains(ContextFlags::GL_CORE_CONTEXT) {
            self.core_hw_context_enable = true;
        }
    }

    fn bind_hw_render(&mut self, enable: bool) {
        if self.uses_egl() {
            self.egl.bind_hw_render(enable);
        }
    }
}

impl<B: PresentationBackend, E: EglLayer> Drop for KmsContext<B, E> {
    fn drop(&mut self) {
        self.destroy();
    }
}
