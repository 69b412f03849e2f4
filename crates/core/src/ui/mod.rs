//! User interface surfaces for screenlens.
//!
//! Two surfaces live here: the fullscreen region-selection overlay and the
//! conversation window.
//!
//! # Architecture
//!
//! The module is split into focused submodules:
//! - [`state`]: the overlay state machine, free of any window handle
//! - [`rendering`]: drawing utilities for the dim layer and selection border
//! - [`overlay`]: the eframe app driving the state machine
//! - [`chat`]: the conversation window
//! - [`settings`]: user preferences and persistence
//!
//! # Usage
//!
//! ```ignore
//! use screenlens_core::ui;
//!
//! // Block until the user drags out a region or cancels.
//! if let Some(region) = ui::select_region()? {
//!     // capture strictly after the overlay is gone
//! }
//! ```

pub mod chat;
mod overlay;
mod rendering;
pub mod settings;
pub mod state;

// Public API exports
pub use overlay::HIDE_SETTLE_DELAY;
pub use settings::Settings;
pub use state::{OverlayPhase, OverlayState, SelectionOutcome};

use crate::config::Config;
use crate::error::{AppError, Result};
use crate::hotkey::CaptureRequested;
use crate::region::Region;
use chat::ChatApp;
use eframe::egui;
use overlay::OverlayApp;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};

// Transparent, undecorated, topmost surface covering the primary display.
// Multi-monitor policy: the overlay covers the primary display only, and
// captures are clamped to it.
fn overlay_options(visible: bool) -> eframe::NativeOptions {
    eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_fullscreen(true)
            .with_decorations(false)
            .with_transparent(true)
            .with_always_on_top()
            .with_visible(visible),
        ..Default::default()
    }
}

/// Shows the selection overlay once and blocks until it is dismissed.
///
/// Returns the finalized region, or `None` when the user cancelled with
/// escape or a zero-area release. The overlay window has fully closed by
/// the time this returns, so the caller may capture immediately.
///
/// Must run on the main thread (OS windowing requirement).
pub fn select_region() -> Result<Option<Region>> {
    let result = Arc::new(Mutex::new(None));
    let app_result = Arc::clone(&result);

    eframe::run_native(
        "screenlens selection",
        overlay_options(true),
        Box::new(move |_cc| Ok(Box::new(OverlayApp::one_shot(app_result)) as Box<dyn eframe::App>)),
    )
    .map_err(|e| AppError::ui(format!("Failed to run selection overlay: {}", e)))?;

    let region = *result
        .lock()
        .map_err(|_| AppError::ui("Failed to acquire selection result"))?;
    Ok(region)
}

/// Runs the persistent daemon overlay until `shutdown` is set.
///
/// The surface starts hidden; each [`CaptureRequested`] on `requests` makes
/// it appear for one selection. A finalized region is handed to `on_region`
/// on a background thread, after the surface has been hidden and a short
/// settle delay has passed ([`HIDE_SETTLE_DELAY`]).
///
/// Blocks the calling (main) thread for the lifetime of the daemon.
pub fn run_daemon_overlay(
    requests: kanal::Receiver<CaptureRequested>,
    on_region: Arc<dyn Fn(Region) + Send + Sync>,
    shutdown: Arc<AtomicBool>,
) -> Result<()> {
    eframe::run_native(
        "screenlens selection",
        overlay_options(false),
        Box::new(move |_cc| {
            Ok(Box::new(OverlayApp::daemon(requests, on_region, shutdown)) as Box<dyn eframe::App>)
        }),
    )
    .map_err(|e| AppError::ui(format!("Failed to run selection overlay: {}", e)))
}

/// Opens the conversation window and blocks until it is closed.
///
/// `hotkey_rx` optionally feeds global hotkey presses into the window as
/// capture triggers; pass `None` when hotkey registration failed and the
/// window should run without it.
pub fn run_chat(
    config: Config,
    hotkey_rx: Option<kanal::Receiver<CaptureRequested>>,
) -> Result<()> {
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("screenlens")
            .with_inner_size([1100.0, 700.0])
            .with_min_inner_size([640.0, 400.0]),
        ..Default::default()
    };

    eframe::run_native(
        "screenlens",
        options,
        Box::new(move |_cc| Ok(Box::new(ChatApp::new(config, hotkey_rx)) as Box<dyn eframe::App>)),
    )
    .map_err(|e| AppError::ui(format!("Failed to run chat window: {}", e)))
}
