// SPDX-License-Identifier: GPL-3.0-only

//! Integration tests for result stabilization
//!
//! These drive the stabilizer through the published sequences a live
//! scanner produces: noisy streaks, single-frame dropouts, and identity
//! switches.

use barscan::decoder::{DecodeResult, Symbol, Symbology};
use barscan::{ResultStabilizer, StabilizerConfig};
use std::time::Instant;

fn qr(text: &str) -> Symbol {
    Symbol::new(text.to_string(), Symbology::QrCode, Vec::new())
}

/// Build a result sequence from a compact script: Some(text) is a frame
/// bearing that symbol, None is an empty frame
fn script(entries: &[Option<&str>]) -> Vec<DecodeResult> {
    entries
        .iter()
        .map(|entry| match entry {
            Some(text) => DecodeResult {
                symbols: vec![qr(text)],
                captured_at: Instant::now(),
            },
            None => DecodeResult::empty(Instant::now()),
        })
        .collect()
}

/// Run a script through a fresh stabilizer, collecting the published
/// identity (or None) after each observation
fn run(miss_threshold: u32, entries: &[Option<&str>]) -> Vec<Option<String>> {
    let mut stabilizer = ResultStabilizer::new(StabilizerConfig { miss_threshold });
    script(entries)
        .iter()
        .map(|result| {
            stabilizer
                .observe(result)
                .map(|d| d.symbol.text.clone())
        })
        .collect()
}

#[test]
fn test_flicker_scenario() {
    // Spec scenario: [A, A, {}, A, {}, {}, {}] with threshold 3
    let out = run(
        3,
        &[
            Some("A"),
            Some("A"),
            None,
            Some("A"),
            None,
            None,
            None,
        ],
    );
    let expected: Vec<Option<String>> = vec![
        Some("A".into()),
        Some("A".into()),
        Some("A".into()),
        Some("A".into()),
        Some("A".into()),
        Some("A".into()),
        None,
    ];
    assert_eq!(out, expected);
}

#[test]
fn test_identity_switch_scenario() {
    // Spec scenario: [{}, A, B, B] -> [None, A, B, B], no appearance delay
    let out = run(3, &[None, Some("A"), Some("B"), Some("B")]);
    let expected: Vec<Option<String>> = vec![
        None,
        Some("A".into()),
        Some("B".into()),
        Some("B".into()),
    ];
    assert_eq!(out, expected);
}

#[test]
fn test_appearance_has_no_delay() {
    // The first positive frame surfaces immediately, whatever preceded it
    for prefix_len in 0..4 {
        let mut entries: Vec<Option<&str>> = vec![None; prefix_len];
        entries.push(Some("code"));
        let out = run(3, &entries);
        assert_eq!(out.last().unwrap().as_deref(), Some("code"));
    }
}

#[test]
fn test_clears_exactly_at_threshold_not_before() {
    for threshold in 1..=5u32 {
        let mut entries = vec![Some("A")];
        entries.extend(std::iter::repeat_n(None, threshold as usize));
        let out = run(threshold, &entries);

        // Active through the (threshold-1)th miss, cleared on the last
        for step in &out[..out.len() - 1] {
            assert!(step.is_some(), "cleared early at threshold {}", threshold);
        }
        assert!(out.last().unwrap().is_none());
    }
}

#[test]
fn test_single_dropout_is_tolerated() {
    // One empty frame between two hits never clears when threshold >= 2
    for threshold in 2..=5 {
        let out = run(threshold, &[Some("A"), None, Some("A")]);
        assert!(out.iter().all(|step| step.as_deref() == Some("A")));
    }
}

#[test]
fn test_recovery_after_loss() {
    let out = run(2, &[Some("A"), None, None, Some("A")]);
    let expected: Vec<Option<String>> = vec![
        Some("A".into()),
        Some("A".into()),
        None,
        Some("A".into()),
    ];
    assert_eq!(out, expected);
}

#[test]
fn test_miss_streak_resets_on_hit() {
    // Two misses, a hit, then two more misses must not clear at
    // threshold 3: the hit reset the miss streak
    let out = run(3, &[Some("A"), None, None, Some("A"), None, None]);
    assert!(out.iter().all(|step| step.is_some()));
}

#[test]
fn test_switch_during_miss_streak() {
    // A different symbol appearing mid-dropout replaces immediately
    let out = run(3, &[Some("A"), None, Some("B")]);
    assert_eq!(out[2].as_deref(), Some("B"));
}

#[test]
fn test_consecutive_hits_monotonic_within_streak() {
    let mut stabilizer = ResultStabilizer::new(StabilizerConfig { miss_threshold: 3 });
    let results = script(&[Some("A"), Some("A"), Some("A")]);

    let mut last_hits = 0;
    for result in &results {
        let hits = stabilizer.observe(result).unwrap().consecutive_hits;
        assert!(hits > last_hits);
        last_hits = hits;
    }
}
