// src/platform/backends/mod.rs

//! Defines the `PresentationBackend` and `EglLayer` traits that the KMS
//! context driver sits on, plus their implementations:
//! - `go2`: libgo2 + libEGL on real hardware (feature `go2`)
//! - `headless`: recording backend with no hardware behind it

use crate::display::types::{ContextAttributes, GfxApi, PixelFormat, ProcAddress, Rect, Rotation};
use anyhow::Result;

#[cfg(feature = "go2")]
pub mod egl;
#[cfg(feature = "go2")]
pub mod go2;
pub mod headless;

// EGL client API enums (EGL 1.4, table 3.1).
pub const EGL_OPENGL_ES_API: u32 = 0x30A0;
pub const EGL_OPENVG_API: u32 = 0x30A1;
pub const EGL_OPENGL_API: u32 = 0x30A2;

/// Client APIs EGL can bind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EglApi {
    OpenGl,
    OpenGlEs,
    OpenVg,
}

impl EglApi {
    /// The EGL client API backing a frontend API, if there is one.
    pub fn for_api(api: GfxApi) -> Option<Self> {
        match api {
            GfxApi::OpenGl => Some(EglApi::OpenGl),
            GfxApi::OpenGlEs => Some(EglApi::OpenGlEs),
            GfxApi::OpenVg => Some(EglApi::OpenVg),
            GfxApi::None | GfxApi::Vulkan => None,
        }
    }

    pub fn as_raw(self) -> u32 {
        match self {
            EglApi::OpenGl => EGL_OPENGL_API,
            EglApi::OpenGlEs => EGL_OPENGL_ES_API,
            EglApi::OpenVg => EGL_OPENVG_API,
        }
    }
}

/// The EGL helper layer: API selection, symbol lookup and hardware-render binding.
pub trait EglLayer {
    /// Whether this build/platform can provide the given client API at all.
    fn supports(&self, api: EglApi) -> bool;

    /// Whether `EGL_KHR_create_context` is available, which is required for
    /// desktop GL >= 3.1 and GLES >= 3.0.
    fn has_create_context(&self) -> bool;

    fn bind_api(&mut self, api: EglApi) -> bool;

    fn get_proc_address(&self, symbol: &str) -> Option<ProcAddress>;

    fn bind_hw_render(&mut self, enable: bool);
}

/// Display, presenter and render-context primitives.
///
/// Handles are plain owned values; the caller hands them back to the matching
/// `destroy_*` method exactly once. A context and a presenter must be destroyed
/// before the display they were created on.
pub trait PresentationBackend {
    type Display;
    type Presenter;
    type Context;
    type Surface;

    fn create_display(&mut self) -> Result<Self::Display>;

    fn destroy_display(&mut self, display: Self::Display);

    fn refresh_rate(&self, display: &Self::Display) -> Option<f32>;

    fn create_presenter(
        &mut self,
        display: &Self::Display,
        format: PixelFormat,
        background: u32,
    ) -> Result<Self::Presenter>;

    fn destroy_presenter(&mut self, presenter: Self::Presenter);

    /// Queue `surface` for scan-out. The surface must be locked.
    fn post(
        &mut self,
        presenter: &Self::Presenter,
        surface: &Self::Surface,
        src: Rect,
        dst: Rect,
        rotation: Rotation,
    ) -> Result<()>;

    fn create_context(
        &mut self,
        display: &Self::Display,
        width: u32,
        height: u32,
        attributes: &ContextAttributes,
    ) -> Result<Self::Context>;

    fn destroy_context(&mut self, context: Self::Context);

    fn make_current(&mut self, context: &Self::Context);

    /// Clear the color buffer of the current context.
    fn clear_color_buffer(&mut self);

    fn swap_buffers(&mut self, context: &Self::Context);

    /// Lock the context's front surface for posting.
    fn lock_surface(&mut self, context: &Self::Context) -> Result<Self::Surface>;

    fn unlock_surface(&mut self, context: &Self::Context, surface: Self::Surface);
}
