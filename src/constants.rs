// SPDX-License-Identifier: GPL-3.0-only

//! Pipeline-wide constants

use std::time::Duration;

/// Result stabilization defaults
pub mod stabilizer {
    /// Consecutive empty results required before an active detection is
    /// cleared. One dropped frame must never make a detection vanish.
    pub const DEFAULT_MISS_THRESHOLD: u32 = 3;
}

/// Decoder tuning
pub mod decoder {
    /// Maximum dimension for decode processing; larger frames are
    /// downscaled to this before detection. Barcodes are typically large
    /// enough in the frame to survive 640px processing.
    pub const DEFAULT_MAX_DIMENSION: u32 = 640;
}

/// File frame source timing
pub mod file_source {
    use super::Duration;

    /// Default replay rate for file-backed frame sources
    pub const DEFAULT_FRAME_INTERVAL: Duration = Duration::from_millis(100);
}
