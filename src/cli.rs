// SPDX-License-Identifier: GPL-3.0-only

//! CLI command implementations
//!
//! This module provides command-line functionality for:
//! - Replaying image files through the full scan pipeline
//! - One-shot decoding of a single image

use barscan::decoder::payload::WifiEncryption;
use barscan::source::file_source::load_image_as_frame;
use barscan::{
    Detection, FileFrameSource, QrDecoder, ScanSession, SessionConfig, SessionPhase,
    StabilizerConfig, Symbol, SymbolPayload, Symbology,
};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// Replay interval for the requested rate, or the stock interval when
/// no rate was given
fn frame_interval(fps: Option<u32>) -> Duration {
    match fps {
        Some(fps) => Duration::from_secs_f64(1.0 / f64::from(fps.max(1))),
        None => barscan::constants::file_source::DEFAULT_FRAME_INTERVAL,
    }
}

/// Replay image files through the scan pipeline, printing stabilized
/// detection transitions until the list ends or Ctrl-C
pub fn scan(
    images: Vec<PathBuf>,
    fps: Option<u32>,
    miss_threshold: u32,
    looping: bool,
    config_path: Option<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = match config_path {
        Some(path) => SessionConfig::load(&path)?,
        None => {
            let config = SessionConfig {
                stabilizer: StabilizerConfig { miss_threshold },
            };
            config.validate()?;
            config
        }
    };

    let source = FileFrameSource::new(images, frame_interval(fps), looping);
    let decoder = Arc::new(QrDecoder::new([Symbology::QrCode]));

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(async move {
        let mut session = ScanSession::new(Box::new(source), decoder, config);
        session.start()?;

        let mut detections = session.detections();
        let mut state = session.watch_state();
        let mut last_identity: Option<(Symbology, String)> = None;

        loop {
            tokio::select! {
                _ = tokio::signal::ctrl_c() => {
                    println!("Interrupted.");
                    break;
                }
                changed = state.changed() => {
                    if changed.is_err() || *state.borrow_and_update() == SessionPhase::Closed {
                        break;
                    }
                }
                changed = detections.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    let current = detections.borrow_and_update().clone();
                    report_transition(&mut last_identity, current.as_ref());
                }
            }
        }

        session.close();
        match session.last_error() {
            Some(err) => Err(err.into()),
            None => Ok(()),
        }
    })
}

/// Decode a single image and print its symbols
pub fn decode(image: PathBuf) -> Result<(), Box<dyn std::error::Error>> {
    use barscan::Decoder;

    let frame = load_image_as_frame(&image)?;
    let decoder = QrDecoder::default();

    let runtime = tokio::runtime::Runtime::new()?;
    let result = runtime.block_on(decoder.decode(frame))?;

    if result.is_empty() {
        println!("No symbols found.");
        return Ok(());
    }

    for symbol in &result.symbols {
        print_symbol(symbol);
    }
    Ok(())
}

/// Print acquired/lost transitions, suppressing repeat publications of
/// the same identity
fn report_transition(
    last_identity: &mut Option<(Symbology, String)>,
    current: Option<&Detection>,
) {
    match current {
        Some(detection) => {
            let identity = (detection.symbol.symbology, detection.symbol.text.clone());
            if last_identity.as_ref() != Some(&identity) {
                print_symbol(&detection.symbol);
                *last_identity = Some(identity);
            }
        }
        None => {
            if last_identity.take().is_some() {
                println!("Detection lost.");
            }
        }
    }
}

fn print_symbol(symbol: &Symbol) {
    let kind = match symbol.symbology {
        Symbology::Codabar => "Codabar",
        Symbology::QrCode => "QR",
        Symbology::Other => "barcode",
    };
    println!("[{}] {}", kind, symbol.text);

    match &symbol.payload {
        SymbolPayload::Wifi {
            ssid,
            password,
            encryption,
        } => {
            let security = match encryption {
                WifiEncryption::Open => "open",
                WifiEncryption::Wep => "WEP",
                WifiEncryption::Wpa => "WPA",
            };
            match password {
                Some(_) => println!("    WiFi network '{}' ({})", ssid, security),
                None => println!("    WiFi network '{}' (open)", ssid),
            }
        }
        SymbolPayload::Url { title, url } => match title {
            Some(title) => println!("    URL: {} ({})", url, title),
            None => println!("    URL: {}", url),
        },
        SymbolPayload::PlainText => {}
        SymbolPayload::Unknown => println!("    (unrecognized structured content)"),
    }
}
