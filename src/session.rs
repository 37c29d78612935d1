// SPDX-License-Identifier: GPL-3.0-only

//! Scan session orchestration
//!
//! A [`ScanSession`] owns the whole pipeline: a producer task pulls
//! frames from the source, a decode task runs at most one decode at a
//! time, and stabilized detections are published through a watch channel
//! for the overlay/UI consumer.
//!
//! Frame handoff is a single-slot-drop link, not a queue: the newest
//! undispatched frame always wins and older ones are dropped, so a slow
//! decoder bounds latency instead of growing a backlog.

use crate::config::SessionConfig;
use crate::decoder::{DecodeResult, Decoder};
use crate::errors::{ScanError, ScanResult, SessionError, SourceError};
use crate::source::{Frame, FrameSource};
use crate::stabilizer::{Detection, ResultStabilizer};
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Lifecycle phase of a scan session
///
/// `Closed` is terminal and reachable from every other phase.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SessionPhase {
    #[default]
    Idle,
    Running,
    Paused,
    Closed,
}

/// State shared between the session handle and its tasks
struct Shared {
    phase: watch::Sender<SessionPhase>,
    /// Bumped on every pause/resume/close. A decode dispatched under an
    /// older epoch is stale: its result is discarded and the stabilizer
    /// resets, so cleared detections are never resurrected.
    epoch: AtomicU64,
    published: watch::Sender<Option<Detection>>,
    error: Mutex<Option<SourceError>>,
}

impl Shared {
    fn bump_epoch(&self) {
        self.epoch.fetch_add(1, Ordering::AcqRel);
    }

    /// Transition to Closed, clearing the published detection first
    fn enter_closed(&self) {
        self.bump_epoch();
        let _ = self.published.send(None);
        let _ = self.phase.send(SessionPhase::Closed);
    }
}

/// Orchestrates frame acquisition, decoding, and result stabilization
///
/// Constructed Idle; `start` spawns the pipeline tasks on the ambient
/// tokio runtime. Dropping the session closes it.
pub struct ScanSession {
    shared: Arc<Shared>,
    phase_rx: watch::Receiver<SessionPhase>,
    published_rx: watch::Receiver<Option<Detection>>,
    config: SessionConfig,
    // Held until start() hands them to the pipeline tasks
    source: Option<Box<dyn FrameSource>>,
    decoder: Option<Arc<dyn Decoder>>,
    producer: Option<JoinHandle<()>>,
    decode_task: Option<JoinHandle<()>>,
}

impl ScanSession {
    /// Create an idle session over the given source and decoder
    pub fn new(
        source: Box<dyn FrameSource>,
        decoder: Arc<dyn Decoder>,
        config: SessionConfig,
    ) -> Self {
        let (phase_tx, phase_rx) = watch::channel(SessionPhase::Idle);
        let (published_tx, published_rx) = watch::channel(None);

        Self {
            shared: Arc::new(Shared {
                phase: phase_tx,
                epoch: AtomicU64::new(0),
                published: published_tx,
                error: Mutex::new(None),
            }),
            phase_rx,
            published_rx,
            config,
            source: Some(source),
            decoder: Some(decoder),
            producer: None,
            decode_task: None,
        }
    }

    /// Current lifecycle phase
    pub fn state(&self) -> SessionPhase {
        *self.phase_rx.borrow()
    }

    /// Watch lifecycle phase changes
    pub fn watch_state(&self) -> watch::Receiver<SessionPhase> {
        self.phase_rx.clone()
    }

    /// Watch published stabilized detections
    ///
    /// The receiver always holds the latest value; `None` means no
    /// stable detection.
    pub fn detections(&self) -> watch::Receiver<Option<Detection>> {
        self.published_rx.clone()
    }

    /// The terminal source error, if the session closed because the
    /// source became unavailable
    pub fn last_error(&self) -> Option<ScanError> {
        self.shared
            .error
            .lock()
            .ok()
            .and_then(|guard| guard.clone())
            .map(ScanError::Source)
    }

    /// Begin scanning: Idle -> Running
    ///
    /// Must be called within a tokio runtime. Spawns the producer and
    /// decode tasks.
    pub fn start(&mut self) -> ScanResult<()> {
        match self.state() {
            SessionPhase::Idle => {}
            SessionPhase::Closed => return Err(SessionError::Closed.into()),
            _ => return Err(SessionError::AlreadyStarted.into()),
        }

        let source = self
            .source
            .take()
            .ok_or(ScanError::Session(SessionError::AlreadyStarted))?;
        let decoder = self
            .decoder
            .take()
            .ok_or(ScanError::Session(SessionError::AlreadyStarted))?;

        info!("Starting scan session");
        let _ = self.shared.phase.send(SessionPhase::Running);

        // Single-slot handoff: watch retains only the newest frame
        let (slot_tx, slot_rx) = watch::channel(None::<Frame>);

        self.producer = Some(tokio::spawn(producer_loop(
            source,
            slot_tx,
            Arc::clone(&self.shared),
        )));
        self.decode_task = Some(tokio::spawn(decode_loop(
            slot_rx,
            decoder,
            Arc::clone(&self.shared),
            self.config,
        )));

        Ok(())
    }

    /// Stop dispatching frames and clear the overlay: Running -> Paused
    ///
    /// The published detection is `None` before this returns; a decode
    /// completing afterwards is discarded.
    pub fn pause(&self) -> ScanResult<()> {
        match self.state() {
            SessionPhase::Running => {}
            SessionPhase::Closed => return Err(SessionError::Closed.into()),
            _ => return Err(SessionError::NotRunning.into()),
        }

        debug!("Pausing scan session");
        // Epoch first: any in-flight decode becomes stale before the
        // cleared detection is visible
        self.shared.bump_epoch();
        let _ = self.shared.phase.send(SessionPhase::Paused);
        let _ = self.shared.published.send(None);
        Ok(())
    }

    /// Resume scanning with a fresh stabilizer: Paused -> Running
    pub fn resume(&self) -> ScanResult<()> {
        match self.state() {
            SessionPhase::Paused => {}
            SessionPhase::Closed => return Err(SessionError::Closed.into()),
            _ => return Err(SessionError::NotPaused.into()),
        }

        debug!("Resuming scan session");
        self.shared.bump_epoch();
        let _ = self.shared.phase.send(SessionPhase::Running);
        Ok(())
    }

    /// Close the session from any state; idempotent, non-blocking
    ///
    /// Any in-flight decode is abandoned fire-and-forget; source
    /// resources release when the producer task drops the source.
    pub fn close(&mut self) {
        if self.state() == SessionPhase::Closed {
            return;
        }

        info!("Closing scan session");
        self.shared.enter_closed();

        if let Some(handle) = self.producer.take() {
            handle.abort();
        }
        if let Some(handle) = self.decode_task.take() {
            handle.abort();
        }
        // Never started: release the source here instead
        if let Some(mut source) = self.source.take() {
            source.close();
        }
        self.decoder = None;
    }
}

impl Drop for ScanSession {
    fn drop(&mut self) {
        self.close();
    }
}

/// Producer task: pull frames continuously and write the slot
///
/// Runs until the source ends or the session closes. While paused,
/// frames are still drained from the source and discarded so capture
/// never sees backpressure.
async fn producer_loop(
    mut source: Box<dyn FrameSource>,
    slot: watch::Sender<Option<Frame>>,
    shared: Arc<Shared>,
) {
    loop {
        match source.next_frame().await {
            Ok(frame) => match *shared.phase.borrow() {
                SessionPhase::Running => {
                    // Replaces any undispatched frame: newest wins
                    if slot.send(Some(frame)).is_err() {
                        break;
                    }
                }
                SessionPhase::Paused => {
                    // Drained and discarded
                }
                SessionPhase::Idle | SessionPhase::Closed => break,
            },
            Err(SourceError::Closed) => {
                info!("Frame source ended, closing session");
                shared.enter_closed();
                break;
            }
            Err(err @ SourceError::Unavailable(_)) => {
                warn!(error = %err, "Frame source unavailable, closing session");
                if let Ok(mut guard) = shared.error.lock() {
                    *guard = Some(err);
                }
                shared.enter_closed();
                break;
            }
        }
    }

    source.close();
    // Dropping the slot sender wakes and ends the decode task
}

/// Decode task: at most one decode in flight, results fed to the
/// stabilizer in completion order
async fn decode_loop(
    mut slot: watch::Receiver<Option<Frame>>,
    decoder: Arc<dyn Decoder>,
    shared: Arc<Shared>,
    config: SessionConfig,
) {
    let mut stabilizer = ResultStabilizer::new(config.stabilizer);
    let mut seen_epoch = shared.epoch.load(Ordering::Acquire);

    loop {
        if slot.changed().await.is_err() {
            break;
        }
        let Some(frame) = slot.borrow_and_update().clone() else {
            continue;
        };
        if *shared.phase.borrow() != SessionPhase::Running {
            continue;
        }

        // A pause/resume since the last frame invalidates streak state
        let epoch = shared.epoch.load(Ordering::Acquire);
        if epoch != seen_epoch {
            stabilizer.reset();
            seen_epoch = epoch;
        }

        let captured_at = frame.captured_at;
        let result = match decoder.decode(frame).await {
            Ok(result) => result,
            Err(err) => {
                // Non-fatal: a failed decode is a frame with no symbols
                debug!(error = %err, "Decode failed, treating as miss");
                DecodeResult::empty(captured_at)
            }
        };

        // Stale if pause/resume/close happened while decoding; the
        // result must not resurrect a cleared detection
        if shared.epoch.load(Ordering::Acquire) != seen_epoch {
            continue;
        }

        let detection = stabilizer.observe(&result).cloned();
        // Re-check the epoch under the channel lock: pause()/close()
        // bump the epoch before publishing None, so whichever writer
        // the lock admits second leaves the cleared value in place
        shared.published.send_if_modified(|slot| {
            if shared.epoch.load(Ordering::Acquire) != seen_epoch {
                return false;
            }
            *slot = detection;
            true
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decoder::QrDecoder;
    use crate::source::StreamSource;

    fn idle_session() -> ScanSession {
        let source = StreamSource::new(futures::stream::pending());
        ScanSession::new(
            Box::new(source),
            Arc::new(QrDecoder::default()),
            SessionConfig::default(),
        )
    }

    #[tokio::test]
    async fn test_lifecycle_guards() {
        let mut session = idle_session();
        assert_eq!(session.state(), SessionPhase::Idle);

        // Control calls before start are rejected
        assert!(session.pause().is_err());
        assert!(session.resume().is_err());

        session.start().unwrap();
        assert_eq!(session.state(), SessionPhase::Running);
        assert!(matches!(
            session.start(),
            Err(ScanError::Session(SessionError::AlreadyStarted))
        ));

        session.pause().unwrap();
        assert_eq!(session.state(), SessionPhase::Paused);
        assert!(session.pause().is_err());

        session.resume().unwrap();
        assert_eq!(session.state(), SessionPhase::Running);
    }

    #[tokio::test]
    async fn test_close_is_idempotent_from_any_state() {
        let mut session = idle_session();
        session.close();
        assert_eq!(session.state(), SessionPhase::Closed);
        session.close();
        assert_eq!(session.state(), SessionPhase::Closed);

        // Control calls after close are rejected with the terminal state
        assert!(matches!(
            session.pause(),
            Err(ScanError::Session(SessionError::Closed))
        ));
        assert!(matches!(
            session.resume(),
            Err(ScanError::Session(SessionError::Closed))
        ));
        assert!(matches!(
            session.start(),
            Err(ScanError::Session(SessionError::Closed))
        ));
    }

    #[tokio::test]
    async fn test_pause_publishes_none_before_returning() {
        let mut session = idle_session();
        session.start().unwrap();
        session.pause().unwrap();
        assert!(session.detections().borrow().is_none());
    }
}
