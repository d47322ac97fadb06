// src/platform/backends/go2.rs
//! libgo2 presentation backend.
//!
//! libgo2 owns the DRM/GBM plumbing: the display wraps the KMS device, the
//! presenter runs the page-flip thread, and a context is an EGL context with
//! its own GBM surface.

use crate::display::types::{ContextAttributes, PixelFormat, Rect, Rotation};
use crate::platform::backends::PresentationBackend;
use anyhow::{Context as _, Result};
use log::{debug, info};
use std::ptr::NonNull;

#[allow(non_camel_case_types)]
mod ffi {
    use libc::{c_int, c_uint};

    #[repr(C)]
    pub struct go2_display_t {
        _private: [u8; 0],
    }
    #[repr(C)]
    pub struct go2_presenter_t {
        _private: [u8; 0],
    }
    #[repr(C)]
    pub struct go2_context_t {
        _private: [u8; 0],
    }
    #[repr(C)]
    pub struct go2_surface_t {
        _private: [u8; 0],
    }

    #[repr(C)]
    pub struct go2_context_attributes_t {
        pub major: c_int,
        pub minor: c_int,
        pub red_bits: c_int,
        pub green_bits: c_int,
        pub blue_bits: c_int,
        pub alpha_bits: c_int,
        pub depth_bits: c_int,
        pub stencil_bits: c_int,
    }

    pub type go2_rotation_t = c_int;
    pub const GO2_ROTATION_DEGREES_0: go2_rotation_t = 0;
    pub const GO2_ROTATION_DEGREES_90: go2_rotation_t = 1;
    pub const GO2_ROTATION_DEGREES_180: go2_rotation_t = 2;
    pub const GO2_ROTATION_DEGREES_270: go2_rotation_t = 3;

    pub const GL_COLOR_BUFFER_BIT: c_uint = 0x0000_4000;

    extern "C" {
        pub fn go2_display_create() -> *mut go2_display_t;
        pub fn go2_display_destroy(display: *mut go2_display_t);

        pub fn go2_presenter_create(
            display: *mut go2_display_t,
            format: u32,
            background_color: u32,
        ) -> *mut go2_presenter_t;
        pub fn go2_presenter_destroy(presenter: *mut go2_presenter_t);
        pub fn go2_presenter_post(
            presenter: *mut go2_presenter_t,
            surface: *mut go2_surface_t,
            src_x: c_int,
            src_y: c_int,
            src_width: c_int,
            src_height: c_int,
            dst_x: c_int,
            dst_y: c_int,
            dst_width: c_int,
            dst_height: c_int,
            rotation: go2_rotation_t,
        );

        pub fn go2_context_create(
            display: *mut go2_display_t,
            width: c_int,
            height: c_int,
            attributes: *const go2_context_attributes_t,
        ) -> *mut go2_context_t;
        pub fn go2_context_destroy(context: *mut go2_context_t);
        pub fn go2_context_make_current(context: *mut go2_context_t);
        pub fn go2_context_swap_buffers(context: *mut go2_context_t);
        pub fn go2_context_surface_lock(context: *mut go2_context_t) -> *mut go2_surface_t;
        pub fn go2_context_surface_unlock(context: *mut go2_context_t, surface: *mut go2_surface_t);

        pub fn glClear(mask: c_uint);
    }
}

pub struct Go2Display(NonNull<ffi::go2_display_t>);
pub struct Go2Presenter(NonNull<ffi::go2_presenter_t>);
pub struct Go2Context(NonNull<ffi::go2_context_t>);
pub struct Go2Surface(NonNull<ffi::go2_surface_t>);

fn rotation_to_ffi(rotation: Rotation) -> ffi::go2_rotation_t {
    match rotation {
        Rotation::Degrees0 => ffi::GO2_ROTATION_DEGREES_0,
        Rotation::Degrees90 => ffi::GO2_ROTATION_DEGREES_90,
        Rotation::Degrees180 => ffi::GO2_ROTATION_DEGREES_180,
        Rotation::Degrees270 => ffi::GO2_ROTATION_DEGREES_270,
    }
}

fn to_c_int(value: u32) -> Result<libc::c_int> {
    libc::c_int::try_from(value).with_context(|| format!("{} does not fit a C int", value))
}

/// Backend over libgo2. Stateless; all state lives in the handles.
#[derive(Debug, Default)]
pub struct Go2Backend;

impl Go2Backend {
    pub fn new() -> Self {
        Go2Backend
    }
}

impl PresentationBackend for Go2Backend {
    type Display = Go2Display;
    type Presenter = Go2Presenter;
    type Context = Go2Context;
    type Surface = Go2Surface;

    fn create_display(&mut self) -> Result<Go2Display> {
        // SAFETY: FFI call with no arguments; a null return signals failure.
        let raw = unsafe { ffi::go2_display_create() };
        let display = NonNull::new(raw).context("go2_display_create returned null")?;
        info!("Go2Backend: display opened");
        Ok(Go2Display(display))
    }

    fn destroy_display(&mut self, display: Go2Display) {
        // SAFETY: the handle came from go2_display_create and is consumed here.
        unsafe { ffi::go2_display_destroy(display.0.as_ptr()) };
    }

    fn refresh_rate(&self, _display: &Go2Display) -> Option<f32> {
        // libgo2 does not expose the active mode.
        None
    }

    fn create_presenter(
        &mut self,
        display: &Go2Display,
        format: PixelFormat,
        background: u32,
    ) -> Result<Go2Presenter> {
        // SAFETY: display is a live handle owned by the caller.
        let raw = unsafe {
            ffi::go2_presenter_create(display.0.as_ptr(), format.fourcc(), background)
        };
        let presenter = NonNull::new(raw).context("go2_presenter_create returned null")?;
        debug!(
            "Go2Backend: presenter created (format {:?}, background {:#010x})",
            format, background
        );
        Ok(Go2Presenter(presenter))
    }

    fn destroy_presenter(&mut self, presenter: Go2Presenter) {
        // SAFETY: the handle came from go2_presenter_create and is consumed here.
        unsafe { ffi::go2_presenter_destroy(presenter.0.as_ptr()) };
    }

    fn post(
        &mut self,
        presenter: &Go2Presenter,
        surface: &Go2Surface,
        src: Rect,
        dst: Rect,
        rotation: Rotation,
    ) -> Result<()> {
        let (src_x, src_y, src_w, src_h) = (
            to_c_int(src.x)?,
            to_c_int(src.y)?,
            to_c_int(src.width)?,
            to_c_int(src.height)?,
        );
        let (dst_x, dst_y, dst_w, dst_h) = (
            to_c_int(dst.x)?,
            to_c_int(dst.y)?,
            to_c_int(dst.width)?,
            to_c_int(dst.height)?,
        );
        // SAFETY: both handles are live; the surface is locked by the caller.
        unsafe {
            ffi::go2_presenter_post(
                presenter.0.as_ptr(),
                surface.0.as_ptr(),
                src_x,
                src_y,
                src_w,
                src_h,
                dst_x,
                dst_y,
                dst_w,
                dst_h,
                rotation_to_ffi(rotation),
            )
        };
        Ok(())
    }

    fn create_context(
        &mut self,
        display: &Go2Display,
        width: u32,
        height: u32,
        attributes: &ContextAttributes,
    ) -> Result<Go2Context> {
        let attr = ffi::go2_context_attributes_t {
            major: to_c_int(attributes.major)?,
            minor: to_c_int(attributes.minor)?,
            red_bits: to_c_int(attributes.red_bits)?,
            green_bits: to_c_int(attributes.green_bits)?,
            blue_bits: to_c_int(attributes.blue_bits)?,
            alpha_bits: to_c_int(attributes.alpha_bits)?,
            depth_bits: to_c_int(attributes.depth_bits)?,
            stencil_bits: to_c_int(attributes.stencil_bits)?,
        };
        // SAFETY: display is live and attr outlives the call.
        let raw = unsafe {
            ffi::go2_context_create(display.0.as_ptr(), to_c_int(width)?, to_c_int(height)?, &attr)
        };
        let context = NonNull::new(raw).context("go2_context_create returned null")?;
        info!(
            "Go2Backend: context {}.{} created ({}x{})",
            attributes.major, attributes.minor, width, height
        );
        Ok(Go2Context(context))
    }

    fn destroy_context(&mut self, context: Go2Context) {
        // SAFETY: the handle came from go2_context_create and is consumed here.
        unsafe { ffi::go2_context_destroy(context.0.as_ptr()) };
    }

    fn make_current(&mut self, context: &Go2Context) {
        // SAFETY: context is a live handle.
        unsafe { ffi::go2_context_make_current(context.0.as_ptr()) };
    }

    fn clear_color_buffer(&mut self) {
        // SAFETY: only reached after make_current, so a GL context is bound.
        unsafe { ffi::glClear(ffi::GL_COLOR_BUFFER_BIT) };
    }

    fn swap_buffers(&mut self, context: &Go2Context) {
        // SAFETY: context is a live handle.
        unsafe { ffi::go2_context_swap_buffers(context.0.as_ptr()) };
    }

    fn lock_surface(&mut self, context: &Go2Context) -> Result<Go2Surface> {
        // SAFETY: context is a live handle; null means no front buffer is available.
        let raw = unsafe { ffi::go2_context_surface_lock(context.0.as_ptr()) };
        let surface = NonNull::new(raw).context("go2_context_surface_lock returned null")?;
        Ok(Go2Surface(surface))
    }

    fn unlock_surface(&mut self, context: &Go2Context, surface: Go2Surface) {
        // SAFETY: surface was locked on this context and is consumed here.
        unsafe { ffi::go2_context_surface_unlock(context.0.as_ptr(), surface.0.as_ptr()) };
    }
}
