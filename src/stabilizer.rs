// SPDX-License-Identifier: GPL-3.0-only

//! Temporal result stabilization
//!
//! Raw per-frame decode results flicker: a physically present symbol
//! fails to decode on some frames from motion blur or partial occlusion.
//! The stabilizer applies asymmetric hysteresis — a new symbol surfaces
//! on its first positive frame, but an active detection only clears
//! after `miss_threshold` consecutive empty results.

use crate::config::StabilizerConfig;
use crate::decoder::{DecodeResult, Symbol};
use std::time::Instant;
use tracing::{debug, trace};

/// An active stabilized detection
#[derive(Debug, Clone, PartialEq)]
pub struct Detection {
    /// The tracked symbol; polygon follows the newest frame
    pub symbol: Symbol,
    /// Capture time of the frame that first carried this identity
    pub first_seen_at: Instant,
    /// Capture time of the newest frame that carried this identity
    pub last_seen_at: Instant,
    /// Frames in a row this identity has been seen. Never decreases
    /// within a streak; resets only on replacement or loss.
    pub consecutive_hits: u32,
}

/// Debounces per-frame decode results into a stable current detection
///
/// `observe` is the sole mutation entry point. No other component may
/// touch stabilizer state.
#[derive(Debug)]
pub struct ResultStabilizer {
    config: StabilizerConfig,
    current: Option<Detection>,
    miss_streak: u32,
}

impl ResultStabilizer {
    pub fn new(config: StabilizerConfig) -> Self {
        Self {
            config,
            current: None,
            miss_streak: 0,
        }
    }

    /// Fold one decode result into the stabilized state and return the
    /// state after the update
    pub fn observe(&mut self, result: &DecodeResult) -> Option<&Detection> {
        match result.symbols.first() {
            Some(symbol) => self.observe_hit(symbol, result.captured_at),
            None => self.observe_miss(),
        }
        self.current.as_ref()
    }

    /// The current stabilized detection without observing anything
    pub fn current(&self) -> Option<&Detection> {
        self.current.as_ref()
    }

    /// Clear all state, as if freshly constructed
    pub fn reset(&mut self) {
        self.current = None;
        self.miss_streak = 0;
    }

    fn observe_hit(&mut self, symbol: &Symbol, captured_at: Instant) {
        self.miss_streak = 0;

        match &mut self.current {
            Some(detection) if detection.symbol.same_identity(symbol) => {
                // Same identity: extend the streak and track position
                detection.consecutive_hits += 1;
                detection.last_seen_at = captured_at;
                detection.symbol.polygon = symbol.polygon.clone();
                trace!(
                    text = %symbol.text,
                    hits = detection.consecutive_hits,
                    "Detection streak extended"
                );
            }
            _ => {
                // New or different identity replaces immediately; only
                // disappearance is debounced
                debug!(text = %symbol.text, symbology = ?symbol.symbology, "Detection acquired");
                self.current = Some(Detection {
                    symbol: symbol.clone(),
                    first_seen_at: captured_at,
                    last_seen_at: captured_at,
                    consecutive_hits: 1,
                });
            }
        }
    }

    fn observe_miss(&mut self) {
        if self.current.is_none() {
            return;
        }

        self.miss_streak += 1;
        if self.miss_streak >= self.config.miss_threshold {
            if let Some(detection) = self.current.take() {
                debug!(
                    text = %detection.symbol.text,
                    misses = self.miss_streak,
                    "Detection lost"
                );
            }
            self.miss_streak = 0;
        }
    }
}
