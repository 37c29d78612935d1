// SPDX-License-Identifier: GPL-3.0-only

//! QR code decoder backed by rqrr
//!
//! Converts frames to greyscale, downscales large frames for faster
//! processing, and runs grid detection in a blocking task so decode
//! latency never stalls the async runtime.

use crate::constants::decoder::DEFAULT_MAX_DIMENSION;
use crate::decoder::{DecodeResult, Decoder, Point, Symbol, Symbology};
use crate::errors::DecodeError;
use crate::source::{Frame, PixelFormat};
use futures::future::BoxFuture;
use rqrr::PreparedImage;
use std::collections::HashSet;
use tracing::{debug, trace};

/// QR code decoder
///
/// Stateless between calls. Construct with the symbology allow-list the
/// caller wants; this decoder only produces `Symbology::QrCode`, so an
/// allow-list without it yields empty results.
pub struct QrDecoder {
    allowed: HashSet<Symbology>,
    /// Maximum dimension for processing; larger frames are downscaled
    max_dimension: u32,
}

impl Default for QrDecoder {
    fn default() -> Self {
        Self::new([Symbology::QrCode])
    }
}

impl QrDecoder {
    /// Create a decoder restricted to the given symbologies
    pub fn new<I>(allowed: I) -> Self
    where
        I: IntoIterator<Item = Symbology>,
    {
        Self {
            allowed: allowed.into_iter().collect(),
            max_dimension: DEFAULT_MAX_DIMENSION,
        }
    }

    /// Override the maximum processing dimension
    pub fn with_max_dimension(mut self, max_dimension: u32) -> Self {
        self.max_dimension = max_dimension;
        self
    }
}

impl Decoder for QrDecoder {
    fn decode(&self, frame: Frame) -> BoxFuture<'_, Result<DecodeResult, DecodeError>> {
        let max_dimension = self.max_dimension;
        let enabled = self.allowed.contains(&Symbology::QrCode);

        Box::pin(async move {
            let captured_at = frame.captured_at;

            if !enabled {
                return Ok(DecodeResult::empty(captured_at));
            }

            // Grid detection is CPU-bound; keep it off the async runtime
            let symbols = tokio::task::spawn_blocking(move || decode_sync(&frame, max_dimension))
                .await
                .map_err(|e| DecodeError::Failed(format!("decode task panicked: {}", e)))?;

            Ok(DecodeResult {
                symbols,
                captured_at,
            })
        })
    }
}

/// Synchronous QR detection (runs in a blocking task)
fn decode_sync(frame: &Frame, max_dimension: u32) -> Vec<Symbol> {
    let start = std::time::Instant::now();

    let grey = to_greyscale(frame);
    let width = frame.width as usize;
    let height = frame.height as usize;

    // Downscale for speed when the frame exceeds the processing budget;
    // polygons are scaled back to original frame coordinates afterwards.
    let (grey, proc_width, proc_height, scale) =
        if frame.width > max_dimension || frame.height > max_dimension {
            let scale = (frame.width as f32 / max_dimension as f32)
                .max(frame.height as f32 / max_dimension as f32);
            let new_width = (frame.width as f32 / scale) as usize;
            let new_height = (frame.height as f32 / scale) as usize;
            let downscaled = downscale_grey(&grey, width, height, new_width, new_height);
            (downscaled, new_width, new_height, scale)
        } else {
            (grey, width, height, 1.0)
        };

    let conversion_time = start.elapsed();
    trace!(
        proc_width,
        proc_height,
        scale,
        conversion_ms = conversion_time.as_millis() as u64,
        "Prepared greyscale image for detection"
    );

    let mut prepared =
        PreparedImage::prepare_from_greyscale(proc_width, proc_height, |x, y| {
            grey[y * proc_width + x]
        });
    let grids = prepared.detect_grids();

    let mut symbols = Vec::with_capacity(grids.len());

    for grid in grids {
        let (_, content) = match grid.decode() {
            Ok(decoded) => decoded,
            Err(e) => {
                debug!(error = %e, "Failed to decode detected QR grid");
                continue;
            }
        };

        // Grid corners back in original frame coordinates
        let polygon = grid
            .bounds
            .iter()
            .map(|p| Point {
                x: p.x as f32 * scale,
                y: p.y as f32 * scale,
            })
            .collect();

        debug!(content = %content, "Decoded QR code");
        symbols.push(Symbol::new(content, Symbology::QrCode, polygon));
    }

    if !symbols.is_empty() {
        debug!(
            count = symbols.len(),
            total_ms = start.elapsed().as_millis() as u64,
            "QR detection found symbols"
        );
    }

    symbols
}

/// Convert a frame to a tightly packed greyscale buffer
fn to_greyscale(frame: &Frame) -> Vec<u8> {
    let width = frame.width as usize;
    let height = frame.height as usize;
    let stride = frame.stride as usize;

    match frame.format {
        PixelFormat::Luma8 => {
            let mut grey = Vec::with_capacity(width * height);
            for y in 0..height {
                let row = y * stride;
                grey.extend_from_slice(&frame.data[row..row + width]);
            }
            grey
        }
        PixelFormat::Rgba => {
            let mut grey = Vec::with_capacity(width * height);
            for y in 0..height {
                let row = y * stride;
                for x in 0..width {
                    let base = row + x * 4;
                    let r = frame.data[base] as u32;
                    let g = frame.data[base + 1] as u32;
                    let b = frame.data[base + 2] as u32;
                    // ITU-R BT.601 luminance with integer weights
                    grey.push(((77 * r + 150 * g + 29 * b) >> 8) as u8);
                }
            }
            grey
        }
    }
}

/// Downscale a greyscale buffer using bilinear interpolation
fn downscale_grey(
    src: &[u8],
    src_width: usize,
    src_height: usize,
    dst_width: usize,
    dst_height: usize,
) -> Vec<u8> {
    let mut result = Vec::with_capacity(dst_width * dst_height);

    let x_ratio = src_width as f32 / dst_width as f32;
    let y_ratio = src_height as f32 / dst_height as f32;

    for y in 0..dst_height {
        for x in 0..dst_width {
            let src_x = x as f32 * x_ratio;
            let src_y = y as f32 * y_ratio;

            let x0 = src_x as usize;
            let y0 = src_y as usize;
            let x1 = (x0 + 1).min(src_width - 1);
            let y1 = (y0 + 1).min(src_height - 1);

            let x_frac = src_x - x0 as f32;
            let y_frac = src_y - y0 as f32;

            let p00 = src[y0 * src_width + x0] as f32;
            let p01 = src[y0 * src_width + x1] as f32;
            let p10 = src[y1 * src_width + x0] as f32;
            let p11 = src[y1 * src_width + x1] as f32;

            let value = p00 * (1.0 - x_frac) * (1.0 - y_frac)
                + p01 * x_frac * (1.0 - y_frac)
                + p10 * (1.0 - x_frac) * y_frac
                + p11 * x_frac * y_frac;

            result.push(value as u8);
        }
    }

    result
}
