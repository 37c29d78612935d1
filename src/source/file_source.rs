// SPDX-License-Identifier: GPL-3.0-only

//! File-backed frame source
//!
//! Replays a list of image files as frames at a fixed interval, standing
//! in for a camera in the CLI and in tests. The sequence ends when the
//! list is exhausted unless looping is enabled.

use crate::errors::SourceError;
use crate::source::types::Frame;
use crate::source::{FrameSource, StreamSource};
use futures::future::BoxFuture;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

/// Load an image file and convert it to an RGBA frame
///
/// Supports the formats the `image` crate knows: PNG, JPEG, GIF, BMP,
/// WebP. An unreadable file maps to `SourceError::Unavailable`, the
/// file-source analogue of a disconnected device.
pub fn load_image_as_frame(path: &Path) -> Result<Frame, SourceError> {
    let img = image::open(path).map_err(|e| {
        SourceError::Unavailable(format!("failed to load image '{}': {}", path.display(), e))
    })?;

    let rgba = img.to_rgba8();
    let width = rgba.width();
    let height = rgba.height();

    debug!(path = %path.display(), width, height, "Loaded image as frame");

    Ok(Frame::from_rgba(width, height, rgba.into_raw()))
}

/// Frame source that replays image files at a fixed interval
pub struct FileFrameSource {
    inner: StreamSource,
}

impl FileFrameSource {
    /// Create a source replaying `paths` every `interval`
    ///
    /// With `looping` the list restarts from the beginning after the
    /// last file; otherwise the source closes once the list is drained.
    pub fn new(paths: Vec<PathBuf>, interval: Duration, looping: bool) -> Self {
        info!(
            count = paths.len(),
            interval_ms = interval.as_millis() as u64,
            looping,
            "Starting file frame source"
        );

        let stream = async_stream::stream! {
            if paths.is_empty() {
                return;
            }

            let mut ticker = tokio::time::interval(interval);
            let mut index = 0usize;

            loop {
                ticker.tick().await;

                match load_image_as_frame(&paths[index]) {
                    Ok(frame) => yield Ok(frame),
                    Err(e) => {
                        yield Err(e);
                        return;
                    }
                }

                index += 1;
                if index == paths.len() {
                    if looping {
                        index = 0;
                    } else {
                        return;
                    }
                }
            }
        };

        Self {
            inner: StreamSource::new(stream),
        }
    }
}

impl FrameSource for FileFrameSource {
    fn next_frame(&mut self) -> BoxFuture<'_, Result<Frame, SourceError>> {
        self.inner.next_frame()
    }

    fn close(&mut self) {
        self.inner.close();
    }
}
