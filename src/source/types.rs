// SPDX-License-Identifier: GPL-3.0-only

//! Frame types shared between sources and decoders

use std::sync::Arc;
use std::time::Instant;

/// Pixel format of a frame's data buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelFormat {
    /// RGBA - 32-bit with alpha (4 bytes per pixel).
    /// The canonical format handed to decoders.
    Rgba,
    /// 8-bit greyscale (1 byte per pixel).
    /// Sources that already produce luma can skip conversion.
    Luma8,
}

impl PixelFormat {
    /// Bytes per pixel for this format
    pub fn bytes_per_pixel(&self) -> u32 {
        match self {
            PixelFormat::Rgba => 4,
            PixelFormat::Luma8 => 1,
        }
    }
}

/// Rotation hint for a captured frame, in degrees clockwise
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Rotation {
    #[default]
    Deg0,
    Deg90,
    Deg180,
    Deg270,
}

/// A single captured frame
///
/// Immutable once produced. The pixel buffer is shared, so cloning a
/// frame is cheap; the buffer is released when the last clone drops.
#[derive(Debug, Clone)]
pub struct Frame {
    pub width: u32,
    pub height: u32,
    /// Pixel data in `format`, row-major with `stride` bytes per row
    pub data: Arc<[u8]>,
    /// Pixel format of the data
    pub format: PixelFormat,
    /// Row stride in bytes (may include padding beyond width * bpp)
    pub stride: u32,
    /// Monotonic timestamp of capture
    pub captured_at: Instant,
    /// Sensor rotation hint
    pub rotation: Rotation,
}

impl Frame {
    /// Build an RGBA frame from a tightly packed buffer
    pub fn from_rgba(width: u32, height: u32, data: Vec<u8>) -> Self {
        Self {
            width,
            height,
            data: Arc::from(data.into_boxed_slice()),
            format: PixelFormat::Rgba,
            stride: width * 4,
            captured_at: Instant::now(),
            rotation: Rotation::default(),
        }
    }

    /// Build a greyscale frame from a tightly packed buffer
    pub fn from_luma(width: u32, height: u32, data: Vec<u8>) -> Self {
        Self {
            width,
            height,
            data: Arc::from(data.into_boxed_slice()),
            format: PixelFormat::Luma8,
            stride: width,
            captured_at: Instant::now(),
            rotation: Rotation::default(),
        }
    }
}
