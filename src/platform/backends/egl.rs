// src/platform/backends/egl.rs
//! EGL layer over the system libEGL.

use crate::config::EglConfig;
use crate::display::types::ProcAddress;
use crate::platform::backends::{EglApi, EglLayer};
use log::{debug, warn};
use std::ffi::{c_void, CString};
use std::ptr::NonNull;

#[allow(non_camel_case_types)]
mod ffi {
    use libc::{c_char, c_uint, c_void};

    pub type EGLBoolean = c_uint;
    pub type EGLenum = c_uint;
    pub const EGL_TRUE: EGLBoolean = 1;

    extern "C" {
        pub fn eglBindAPI(api: EGLenum) -> EGLBoolean;
        pub fn eglGetProcAddress(procname: *const c_char) -> *mut c_void;
        pub fn eglGetError() -> i32;
    }
}

pub struct SystemEgl {
    config: EglConfig,
    use_hw_context: bool,
}

impl SystemEgl {
    pub fn new(config: EglConfig) -> Self {
        SystemEgl {
            config,
            use_hw_context: false,
        }
    }
}

impl EglLayer for SystemEgl {
    fn supports(&self, api: EglApi) -> bool {
        match api {
            EglApi::OpenGl => self.config.opengl,
            EglApi::OpenGlEs => self.config.opengl_es,
            EglApi::OpenVg => self.config.openvg,
        }
    }

    fn has_create_context(&self) -> bool {
        self.config.khr_create_context
    }

    fn bind_api(&mut self, api: EglApi) -> bool {
        // SAFETY: eglBindAPI takes a plain enum and only touches thread-local EGL state.
        let ok = unsafe { ffi::eglBindAPI(api.as_raw()) } == ffi::EGL_TRUE;
        if !ok {
            // SAFETY: no arguments; reads the thread's last EGL error.
            let error = unsafe { ffi::eglGetError() };
            warn!("SystemEgl: eglBindAPI({:?}) failed, error {:#x}", api, error);
        }
        ok
    }

    fn get_proc_address(&self, symbol: &str) -> Option<ProcAddress> {
        let name = CString::new(symbol).ok()?;
        // SAFETY: name is NUL-terminated and outlives the call.
        let raw: *mut c_void = unsafe { ffi::eglGetProcAddress(name.as_ptr()) };
        NonNull::new(raw)
    }

    fn bind_hw_render(&mut self, enable: bool) {
        // libgo2 owns the only EGL context, so there is no separate shared
        // context to switch to; the request is only recorded.
        if self.use_hw_context != enable {
            debug!("SystemEgl: hardware render context {}", enable);
        }
        self.use_hw_context = enable;
    }
}
