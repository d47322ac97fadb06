// src/display/types.rs
//! Plain data shared between the frontend, the driver and the backends.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use std::ffi::c_void;
use std::ptr::NonNull;

/// Rendering API a context driver can be bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum GfxApi {
    #[default]
    #[serde(rename = "none")]
    None,
    #[serde(rename = "opengl")]
    OpenGl,
    #[serde(rename = "opengl_es")]
    OpenGlEs,
    #[serde(rename = "openvg")]
    OpenVg,
    /// Known to the frontend, never provided by the KMS driver.
    #[serde(rename = "vulkan")]
    Vulkan,
}

bitflags! {
    /// Capability bits negotiated between the frontend and a context driver.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ContextFlags: u32 {
        const GL_CORE_CONTEXT = 1 << 1;
        const MULTISAMPLING = 1 << 2;
        const CUSTOMIZABLE_SWAPCHAIN_IMAGES = 1 << 3;
        const HARD_SYNC = 1 << 4;
        const BLACK_FRAME_INSERTION = 1 << 5;
        const MENU_FRAME_FILTERING = 1 << 6;
        const ADAPTIVE_VSYNC = 1 << 7;
        const SHADERS_GLSL = 1 << 8;
        const SHADERS_CG = 1 << 9;
        const SHADERS_SLANG = 1 << 10;
        const SHADERS_HLSL = 1 << 11;
    }
}

/// Pixel formats understood by the presenter, as DRM fourcc codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PixelFormat {
    Rgb565,
}

const fn fourcc(code: &[u8; 4]) -> u32 {
    (code[0] as u32) | (code[1] as u32) << 8 | (code[2] as u32) << 16 | (code[3] as u32) << 24
}

impl PixelFormat {
    pub const fn fourcc(self) -> u32 {
        match self {
            PixelFormat::Rgb565 => fourcc(b"RG16"),
        }
    }
}

/// Clockwise rotation applied by the presenter when scanning out a surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Rotation {
    Degrees0,
    Degrees90,
    Degrees180,
    Degrees270,
}

impl Rotation {
    /// Whether the rotation swaps the horizontal and vertical axes.
    pub const fn swaps_axes(self) -> bool {
        matches!(self, Rotation::Degrees90 | Rotation::Degrees270)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    pub const fn from_size(width: u32, height: u32) -> Self {
        Rect {
            x: 0,
            y: 0,
            width,
            height,
        }
    }
}

/// Source rectangle, destination rectangle and rotation of a present.
///
/// The destination is derived from the source and the rotation, so the two
/// cannot disagree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PanelOrientation {
    pub src: Rect,
    pub dst: Rect,
    pub rotation: Rotation,
}

impl PanelOrientation {
    pub const fn new(width: u32, height: u32, rotation: Rotation) -> Self {
        let dst = if rotation.swaps_axes() {
            Rect::from_size(height, width)
        } else {
            Rect::from_size(width, height)
        };
        PanelOrientation {
            src: Rect::from_size(width, height),
            dst,
            rotation,
        }
    }
}

/// Attributes requested when creating a render context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContextAttributes {
    pub major: u32,
    pub minor: u32,
    pub red_bits: u32,
    pub green_bits: u32,
    pub blue_bits: u32,
    pub alpha_bits: u32,
    pub depth_bits: u32,
    pub stencil_bits: u32,
}

/// Per-frame information handed to `swap_buffers`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FrameInfo {
    pub frame_count: u64,
}

/// Result of polling the window state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WindowStatus {
    pub quit: bool,
    pub resize: bool,
}

/// Address of a resolved graphics API entry point.
pub type ProcAddress = NonNull<c_void>;
