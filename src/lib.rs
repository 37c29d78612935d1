// SPDX-License-Identifier: GPL-3.0-only

//! barscan - a continuous barcode scanning pipeline
//!
//! This library provides the core of a live barcode scanner: frame
//! acquisition, per-frame decode attempts, temporal result stabilization
//! (so detections don't flicker across noisy frames), and a session
//! orchestrator with pause/resume/close controls.
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - [`source`]: frame acquisition abstraction and file-backed sources
//! - [`decoder`]: decode capability, symbol model, rqrr-backed QR decoder
//! - [`stabilizer`]: hysteresis over noisy per-frame results
//! - [`session`]: pipeline orchestration and lifecycle
//! - [`config`]: session configuration
//! - [`errors`]: error types

pub mod config;
pub mod constants;
pub mod decoder;
pub mod errors;
pub mod session;
pub mod source;
pub mod stabilizer;

// Re-export commonly used types
pub use config::{SessionConfig, StabilizerConfig};
pub use decoder::{DecodeResult, Decoder, QrDecoder, Symbol, SymbolPayload, Symbology};
pub use errors::{DecodeError, ScanError, ScanResult, SessionError, SourceError};
pub use session::{ScanSession, SessionPhase};
pub use source::{FileFrameSource, Frame, FrameSource, PixelFormat, StreamSource};
pub use stabilizer::{Detection, ResultStabilizer};
