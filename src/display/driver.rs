// src/display/driver.rs
//! ContextDriver trait - the entry points a video frontend calls on a context driver.
//!
//! ## Lifecycle
//! 1. Construction - backend handles are acquired (display, presenter).
//! 2. `bind_api` - select the rendering API and version.
//! 3. `set_video_mode` - create the render context on first call and make it current.
//! 4. `swap_buffers` once per frame.
//! 5. `destroy` - release everything; later calls are no-ops.
//!
//! All methods are called from the frontend's render thread.

use crate::display::types::{ContextFlags, FrameInfo, GfxApi, ProcAddress, WindowStatus};
use crate::input::InputDriver;

pub trait ContextDriver {
    /// Release the render context, presenter and display, in that order.
    /// Must be safe to call more than once.
    fn destroy(&mut self);

    /// The API recorded by the last `bind_api` call.
    fn get_api(&self) -> GfxApi;

    /// Bind a rendering API at the given version. Returns false if the
    /// combination is unsupported; the frontend may try another.
    fn bind_api(&mut self, api: GfxApi, major: u32, minor: u32) -> bool;

    /// Negative intervals request adaptive vsync where the driver supports it.
    fn swap_interval(&mut self, interval: i32);

    fn set_video_mode(&mut self, width: u32, height: u32, fullscreen: bool) -> bool;

    fn get_video_size(&self) -> (u32, u32);

    /// Refresh rate in Hz, or 0.0 when unknown.
    fn get_refresh_rate(&self) -> f32;

    fn check_window(&self) -> WindowStatus;

    fn has_focus(&self) -> bool;

    fn suppress_screensaver(&mut self, enable: bool) -> bool;

    fn has_windowed(&self) -> bool;

    fn swap_buffers(&mut self, frame: &FrameInfo);

    /// Pick an input driver when the configured one cannot work with this
    /// context (e.g. X11 input without an X server).
    fn input_driver_fallback(&self, joypad_name: &str) -> Option<Box<dyn InputDriver>>;

    fn get_proc_address(&self, symbol: &str) -> Option<ProcAddress>;

    fn ident(&self) -> &'static str;

    fn get_flags(&self) -> ContextFlags;

    fn set_flags(&mut self, flags: ContextFlags);

    fn bind_hw_render(&mut self, enable: bool);
}
