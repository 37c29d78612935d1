// SPDX-License-Identifier: GPL-3.0-only

//! Barcode decoding
//!
//! A [`Decoder`] is a stateless capability: given one frame it locates
//! and decodes zero or more barcode symbols. Calls may be slow and may
//! fail; the session treats a failed call as a frame with no symbols.

pub mod payload;
pub mod qr;

pub use payload::{SymbolPayload, WifiEncryption};
pub use qr::QrDecoder;

use crate::errors::DecodeError;
use crate::source::Frame;
use futures::future::BoxFuture;
use std::time::Instant;

/// Barcode symbology tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Symbology {
    Codabar,
    QrCode,
    Other,
}

/// A 2D point in frame pixel coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

/// One decoded barcode symbol
///
/// Two symbols are considered the same detection when their
/// (symbology, text) identity matches; the polygon is position data and
/// takes no part in identity.
#[derive(Debug, Clone, PartialEq)]
pub struct Symbol {
    /// Raw decoded text value
    pub text: String,
    /// Symbology the symbol was decoded as
    pub symbology: Symbology,
    /// Bounding polygon in frame pixel coordinates, ordered
    pub polygon: Vec<Point>,
    /// Semantic payload parsed from the text
    pub payload: SymbolPayload,
}

impl Symbol {
    /// Create a symbol, parsing the semantic payload from its text
    pub fn new(text: String, symbology: Symbology, polygon: Vec<Point>) -> Self {
        let payload = SymbolPayload::parse(&text);
        Self {
            text,
            symbology,
            polygon,
            payload,
        }
    }

    /// Identity key for same/different comparison
    pub fn identity(&self) -> (Symbology, &str) {
        (self.symbology, &self.text)
    }

    /// Whether another symbol carries the same identity
    pub fn same_identity(&self, other: &Symbol) -> bool {
        self.identity() == other.identity()
    }
}

/// Decode output for one frame
///
/// Immutable once produced. Symbols keep decoder order; the first entry
/// is what the stabilizer tracks.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodeResult {
    /// Decoded symbols, in decoder order
    pub symbols: Vec<Symbol>,
    /// Capture timestamp of the frame this result belongs to
    pub captured_at: Instant,
}

impl DecodeResult {
    /// A result with no symbols for a frame captured at `captured_at`
    pub fn empty(captured_at: Instant) -> Self {
        Self {
            symbols: Vec::new(),
            captured_at,
        }
    }

    /// Whether the result carries no symbols
    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }
}

/// A barcode decoding capability
///
/// Stateless between calls; safe to treat as a pure function of the
/// frame. Latency is unbounded but assumed finite — the session's
/// single-slot handoff keeps a slow decoder from backing up frame
/// production.
pub trait Decoder: Send + Sync {
    /// Attempt to decode barcode symbols from one frame
    fn decode(&self, frame: Frame) -> BoxFuture<'_, Result<DecodeResult, DecodeError>>;
}
