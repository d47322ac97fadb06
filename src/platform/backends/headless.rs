// src/platform/backends/headless.rs
//! Headless presentation backend and EGL layer.
//!
//! Nothing reaches a screen. Every backend call is appended to a shared call
//! log so the driver's sequencing can be inspected, and the surface lock
//! protocol is enforced (posting an unlocked surface is an error).

use crate::display::types::{ContextAttributes, PixelFormat, ProcAddress, Rect, Rotation};
use crate::platform::backends::{EglApi, EglLayer, PresentationBackend};
use anyhow::{anyhow, bail, Result};
use log::{debug, info, trace};
use std::cell::RefCell;
use std::collections::HashSet;
use std::ffi::c_void;
use std::ptr::NonNull;
use std::rc::Rc;

/// One call made against the headless backend.
#[derive(Debug, Clone, PartialEq)]
pub enum BackendCall {
    CreateDisplay,
    CreatePresenter { format: PixelFormat, background: u32 },
    CreateContext {
        width: u32,
        height: u32,
        attributes: ContextAttributes,
    },
    MakeCurrent,
    ClearColorBuffer,
    SwapBuffers,
    LockSurface,
    Post { src: Rect, dst: Rect, rotation: Rotation },
    UnlockSurface,
    DestroyContext,
    DestroyPresenter,
    DestroyDisplay,
}

pub type CallLog = Rc<RefCell<Vec<BackendCall>>>;

/// Opaque handle id handed out by the headless backend.
#[derive(Debug, PartialEq, Eq)]
pub struct HeadlessHandle(u32);

/// Refresh rate the headless display reports.
pub const HEADLESS_REFRESH_RATE: f32 = 60.0;

#[derive(Debug, Default)]
pub struct HeadlessBackend {
    log: CallLog,
    next_handle: u32,
    locked_surface: Option<u32>,
    frames_posted: u64,
    fail_display: bool,
    fail_presenter: bool,
    fail_context: bool,
}

impl HeadlessBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `create_display` fail.
    pub fn failing_display(mut self) -> Self {
        self.fail_display = true;
        self
    }

    /// Make `create_presenter` fail.
    pub fn failing_presenter(mut self) -> Self {
        self.fail_presenter = true;
        self
    }

    /// Make `create_context` fail.
    pub fn failing_context(mut self) -> Self {
        self.fail_context = true;
        self
    }

    /// Shared handle on the call log; stays valid after the backend is moved or dropped.
    pub fn call_log(&self) -> CallLog {
        Rc::clone(&self.log)
    }

    pub fn calls(&self) -> Vec<BackendCall> {
        self.log.borrow().clone()
    }

    pub fn frames_posted(&self) -> u64 {
        self.frames_posted
    }

    fn record(&self, call: BackendCall) {
        trace!("HeadlessBackend: {:?}", call);
        self.log.borrow_mut().push(call);
    }

    fn next_handle(&mut self) -> HeadlessHandle {
        self.next_handle = self.next_handle.wrapping_add(1);
        HeadlessHandle(self.next_handle)
    }
}

impl PresentationBackend for HeadlessBackend {
    type Display = HeadlessHandle;
    type Presenter = HeadlessHandle;
    type Context = HeadlessHandle;
    type Surface = HeadlessHandle;

    fn create_display(&mut self) -> Result<HeadlessHandle> {
        if self.fail_display {
            bail!("headless display unavailable");
        }
        self.record(BackendCall::CreateDisplay);
        info!("HeadlessBackend: display created");
        Ok(self.next_handle())
    }

    fn destroy_display(&mut self, _display: HeadlessHandle) {
        self.record(BackendCall::DestroyDisplay);
    }

    fn refresh_rate(&self, _display: &HeadlessHandle) -> Option<f32> {
        Some(HEADLESS_REFRESH_RATE)
    }

    fn create_presenter(
        &mut self,
        _display: &HeadlessHandle,
        format: PixelFormat,
        background: u32,
    ) -> Result<HeadlessHandle> {
        if self.fail_presenter {
            bail!("headless presenter unavailable");
        }
        self.record(BackendCall::CreatePresenter { format, background });
        Ok(self.next_handle())
    }

    fn destroy_presenter(&mut self, _presenter: HeadlessHandle) {
        self.record(BackendCall::DestroyPresenter);
    }

    fn post(
        &mut self,
        _presenter: &HeadlessHandle,
        surface: &HeadlessHandle,
        src: Rect,
        dst: Rect,
        rotation: Rotation,
    ) -> Result<()> {
        if self.locked_surface != Some(surface.0) {
            bail!("surface {} posted without being locked", surface.0);
        }
        self.record(BackendCall::Post { src, dst, rotation });
        self.frames_posted += 1;
        Ok(())
    }

    fn create_context(
        &mut self,
        _display: &HeadlessHandle,
        width: u32,
        height: u32,
        attributes: &ContextAttributes,
    ) -> Result<HeadlessHandle> {
        if self.fail_context {
            bail!("headless context creation refused");
        }
        self.record(BackendCall::CreateContext {
            width,
            height,
            attributes: *attributes,
        });
        debug!("HeadlessBackend: context {}x{} {:?}", width, height, attributes);
        Ok(self.next_handle())
    }

    fn destroy_context(&mut self, _context: HeadlessHandle) {
        self.record(BackendCall::DestroyContext);
    }

    fn make_current(&mut self, _context: &HeadlessHandle) {
        self.record(BackendCall::MakeCurrent);
    }

    fn clear_color_buffer(&mut self) {
        self.record(BackendCall::ClearColorBuffer);
    }

    fn swap_buffers(&mut self, _context: &HeadlessHandle) {
        self.record(BackendCall::SwapBuffers);
    }

    fn lock_surface(&mut self, _context: &HeadlessHandle) -> Result<HeadlessHandle> {
        if let Some(id) = self.locked_surface {
            return Err(anyhow!("surface {} is still locked", id));
        }
        let surface = self.next_handle();
        self.locked_surface = Some(surface.0);
        self.record(BackendCall::LockSurface);
        Ok(surface)
    }

    fn unlock_surface(&mut self, _context: &HeadlessHandle, surface: HeadlessHandle) {
        if self.locked_surface == Some(surface.0) {
            self.locked_surface = None;
        }
        self.record(BackendCall::UnlockSurface);
    }
}

extern "C" fn headless_gl_entry_point() {}

/// EGL layer stand-in with configurable capabilities.
#[derive(Debug, Clone)]
pub struct HeadlessEgl {
    supported: HashSet<EglApi>,
    create_context: bool,
    bound: Option<EglApi>,
    hw_render: Option<bool>,
}

impl Default for HeadlessEgl {
    fn default() -> Self {
        HeadlessEgl {
            supported: [EglApi::OpenGl, EglApi::OpenGlEs, EglApi::OpenVg]
                .into_iter()
                .collect(),
            create_context: true,
            bound: None,
            hw_render: None,
        }
    }
}

impl HeadlessEgl {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict the client APIs reported as available.
    pub fn with_supported(mut self, apis: &[EglApi]) -> Self {
        self.supported = apis.iter().copied().collect();
        self
    }

    pub fn with_create_context(mut self, available: bool) -> Self {
        self.create_context = available;
        self
    }

    /// The API passed to the last successful `bind_api`.
    pub fn bound(&self) -> Option<EglApi> {
        self.bound
    }

    /// The value passed to the last `bind_hw_render`.
    pub fn hw_render(&self) -> Option<bool> {
        self.hw_render
    }
}

impl EglLayer for HeadlessEgl {
    fn supports(&self, api: EglApi) -> bool {
        self.supported.contains(&api)
    }

    fn has_create_context(&self) -> bool {
        self.create_context
    }

    fn bind_api(&mut self, api: EglApi) -> bool {
        if !self.supports(api) {
            return false;
        }
        self.bound = Some(api);
        true
    }

    fn get_proc_address(&self, symbol: &str) -> Option<ProcAddress> {
        if self.bound.is_none() || !symbol.starts_with("gl") {
            return None;
        }
        NonNull::new(headless_gl_entry_point as extern "C" fn() as *mut c_void)
    }

    fn bind_hw_render(&mut self, enable: bool) {
        self.hw_render = Some(enable);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::types::PanelOrientation;
    use test_log::test;

    #[test]
    fn it_should_reject_posting_a_surface_that_is_not_locked() -> Result<()> {
        let mut backend = HeadlessBackend::new();
        let display = backend.create_display()?;
        let presenter = backend.create_presenter(&display, PixelFormat::Rgb565, 0)?;
        let orientation = PanelOrientation::new(480, 320, Rotation::Degrees270);

        let stray = HeadlessHandle(99);
        let result = backend.post(
            &presenter,
            &stray,
            orientation.src,
            orientation.dst,
            orientation.rotation,
        );
        assert!(result.is_err());
        assert_eq!(backend.frames_posted(), 0);
        Ok(())
    }

    #[test]
    fn it_should_refuse_a_second_lock_until_unlocked() -> Result<()> {
        let mut backend = HeadlessBackend::new();
        let display = backend.create_display()?;
        let attributes = ContextAttributes {
            major: 2,
            minor: 0,
            red_bits: 8,
            green_bits: 8,
            blue_bits: 8,
            alpha_bits: 8,
            depth_bits: 0,
            stencil_bits: 0,
        };
        let context = backend.create_context(&display, 480, 320, &attributes)?;

        let surface = backend.lock_surface(&context)?;
        assert!(backend.lock_surface(&context).is_err());
        backend.unlock_surface(&context, surface);
        assert!(backend.lock_surface(&context).is_ok());
        Ok(())
    }

    #[test]
    fn it_should_keep_presenting_after_surface_ids_wrap() -> Result<()> {
        let mut backend = HeadlessBackend {
            next_handle: u32::MAX - 1,
            ..HeadlessBackend::default()
        };
        let display = backend.create_display()?;
        let presenter = backend.create_presenter(&display, PixelFormat::Rgb565, 0)?;
        let context = backend.create_context(
            &display,
            480,
            320,
            &ContextAttributes {
                major: 2,
                minor: 0,
                red_bits: 8,
                green_bits: 8,
                blue_bits: 8,
                alpha_bits: 8,
                depth_bits: 0,
                stencil_bits: 0,
            },
        )?;
        let orientation = PanelOrientation::new(480, 320, Rotation::Degrees270);

        for _ in 0..4 {
            let surface = backend.lock_surface(&context)?;
            backend.post(
                &presenter,
                &surface,
                orientation.src,
                orientation.dst,
                orientation.rotation,
            )?;
            backend.unlock_surface(&context, surface);
        }

        assert_eq!(backend.frames_posted(), 4);
        Ok(())
    }

    #[test]
    fn it_should_only_resolve_gl_symbols_once_an_api_is_bound() {
        let mut egl = HeadlessEgl::new();
        assert!(egl.get_proc_address("glClear").is_none());
        assert!(egl.bind_api(EglApi::OpenGlEs));
        assert!(egl.get_proc_address("glClear").is_some());
        assert!(egl.get_proc_address("vkCreateInstance").is_none());
    }
}
