// SPDX-License-Identifier: GPL-3.0-only

//! Frame acquisition
//!
//! A [`FrameSource`] produces a lazy, effectively infinite sequence of
//! timestamped frames, abstracting whatever capture device sits behind
//! it. The pipeline assumes an already-open source; permission handling
//! and device enumeration live with the embedder.

pub mod file_source;
pub mod types;

pub use file_source::FileFrameSource;
pub use types::{Frame, PixelFormat, Rotation};

use crate::errors::SourceError;
use futures::future::BoxFuture;
use futures::stream::BoxStream;
use futures::StreamExt;

/// A source of captured frames
///
/// `next_frame` suspends until a frame is available. The sequence is
/// non-restartable: after `Err(SourceError::Closed)` or
/// `Err(SourceError::Unavailable)` no further frames will be produced.
/// `Unavailable` means the underlying device disconnected; it is fatal
/// to the consuming session and is not retried here.
///
/// Implementations release capture resources on drop; `close` exists for
/// callers that want release before drop and must be idempotent.
pub trait FrameSource: Send {
    /// Produce the next frame, suspending until one is available
    fn next_frame(&mut self) -> BoxFuture<'_, Result<Frame, SourceError>>;

    /// Release underlying capture resources. Idempotent; subsequent
    /// `next_frame` calls yield `Err(SourceError::Closed)`.
    fn close(&mut self);
}

/// Adapter exposing any frame stream as a [`FrameSource`]
///
/// Useful for embedders whose capture layer already speaks
/// `futures::Stream` (async-stream generators, channel receivers).
/// A finished stream yields `Err(SourceError::Closed)`.
pub struct StreamSource {
    stream: Option<BoxStream<'static, Result<Frame, SourceError>>>,
}

impl StreamSource {
    pub fn new<S>(stream: S) -> Self
    where
        S: futures::Stream<Item = Result<Frame, SourceError>> + Send + 'static,
    {
        Self {
            stream: Some(stream.boxed()),
        }
    }
}

impl FrameSource for StreamSource {
    fn next_frame(&mut self) -> BoxFuture<'_, Result<Frame, SourceError>> {
        Box::pin(async move {
            match self.stream.as_mut() {
                Some(stream) => match stream.next().await {
                    Some(item) => item,
                    None => {
                        self.stream = None;
                        Err(SourceError::Closed)
                    }
                },
                None => Err(SourceError::Closed),
            }
        })
    }

    fn close(&mut self) {
        self.stream = None;
    }
}
