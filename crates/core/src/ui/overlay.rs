//! Fullscreen selection overlay surface.
//!
//! `OverlayApp` drives [`OverlayState`] from egui input. It runs in two
//! ways: one-shot (appear, take a single selection, close, hand the region
//! back to the caller) and daemon (a persistent invisible viewport that the
//! hotkey channel wakes up, handing each region to a pipeline callback on a
//! background thread).
//!
//! In both modes the surface is gone before any capture starts: one-shot
//! captures happen after the event loop has exited, and the daemon sends
//! `Visible(false)` and waits out a short settle delay before invoking the
//! pipeline.

use super::rendering::{draw_idle_overlay, draw_selection_border, draw_selection_overlay, DIM_ALPHA};
use super::state::{OverlayPhase, OverlayState, SelectionOutcome};
use crate::hotkey::CaptureRequested;
use crate::region::Region;
use eframe::egui;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

/// Pause between commanding the surface away and starting the capture, so
/// the compositor has actually removed it from the screen.
pub const HIDE_SETTLE_DELAY: Duration = Duration::from_millis(100);

/// How the overlay hands results back.
pub(super) enum OverlayDriver {
    /// Store the region and close the event loop.
    OneShot {
        result: Arc<Mutex<Option<Region>>>,
    },
    /// Stay resident; hide the surface and call the pipeline per region.
    Daemon {
        requests: kanal::Receiver<CaptureRequested>,
        on_region: Arc<dyn Fn(Region) + Send + Sync>,
        shutdown: Arc<AtomicBool>,
    },
}

pub(super) struct OverlayApp {
    state: OverlayState,
    driver: OverlayDriver,
}

impl OverlayApp {
    pub(super) fn one_shot(result: Arc<Mutex<Option<Region>>>) -> Self {
        let mut state = OverlayState::new();
        state.request_show();
        Self {
            state,
            driver: OverlayDriver::OneShot { result },
        }
    }

    pub(super) fn daemon(
        requests: kanal::Receiver<CaptureRequested>,
        on_region: Arc<dyn Fn(Region) + Send + Sync>,
        shutdown: Arc<AtomicBool>,
    ) -> Self {
        Self {
            state: OverlayState::new(),
            driver: OverlayDriver::Daemon {
                requests,
                on_region,
                shutdown,
            },
        }
    }

    /// Handles hotkey wakeups and shutdown in daemon mode. Returns false
    /// when the app should stop updating this frame.
    fn poll_daemon(&mut self, ctx: &egui::Context) -> bool {
        let OverlayDriver::Daemon {
            requests, shutdown, ..
        } = &self.driver
        else {
            return true;
        };

        if shutdown.load(Ordering::SeqCst) {
            ctx.send_viewport_cmd(egui::ViewportCommand::Close);
            return false;
        }

        let mut requested = false;
        while let Ok(Some(CaptureRequested)) = requests.try_recv() {
            requested = true;
        }

        // A show request while the overlay is already up is a no-op.
        if requested && self.state.request_show() {
            ctx.send_viewport_cmd(egui::ViewportCommand::Visible(true));
            ctx.send_viewport_cmd(egui::ViewportCommand::Fullscreen(true));
            ctx.send_viewport_cmd(egui::ViewportCommand::Focus);
        }

        // Keep polling the channel while nothing else repaints us.
        ctx.request_repaint_after(Duration::from_millis(100));
        true
    }

    /// Dismisses the surface and routes a finalized region onward.
    ///
    /// The hide command goes out before the pipeline sees the region;
    /// captures must not include the overlay.
    fn finish(&mut self, ctx: &egui::Context, outcome: SelectionOutcome) {
        match &self.driver {
            OverlayDriver::OneShot { result } => {
                if let SelectionOutcome::Finalized(region) = outcome {
                    if let Ok(mut slot) = result.lock() {
                        *slot = Some(region);
                    }
                }
                ctx.send_viewport_cmd(egui::ViewportCommand::Close);
            }
            OverlayDriver::Daemon { on_region, .. } => {
                ctx.send_viewport_cmd(egui::ViewportCommand::Visible(false));

                if let SelectionOutcome::Finalized(region) = outcome {
                    let on_region = Arc::clone(on_region);
                    thread::spawn(move || {
                        thread::sleep(HIDE_SETTLE_DELAY);
                        on_region(region);
                    });
                } else {
                    tracing::debug!("selection cancelled");
                }
            }
        }
    }
}

impl eframe::App for OverlayApp {
    fn clear_color(&self, _visuals: &egui::Visuals) -> [f32; 4] {
        egui::Rgba::TRANSPARENT.to_array()
    }

    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if !self.poll_daemon(ctx) {
            return;
        }

        let panel_frame = egui::Frame::default()
            .fill(egui::Color32::TRANSPARENT)
            .inner_margin(egui::Margin::same(0))
            .outer_margin(egui::Margin::same(0));

        egui::CentralPanel::default()
            .frame(panel_frame)
            .show(ctx, |ui| {
                if self.state.is_hidden() {
                    return;
                }

                ctx.output_mut(|o| o.cursor_icon = egui::CursorIcon::Crosshair);

                let rect = ui.max_rect();
                let response = ui.interact(rect, ui.id(), egui::Sense::drag());

                if response.drag_started() {
                    if let Some(pos) = response.interact_pointer_pos() {
                        self.state.pointer_down(pos);
                    }
                } else if response.dragged() {
                    if let Some(pos) = response.interact_pointer_pos() {
                        self.state.pointer_moved(pos);
                    }
                } else if response.drag_stopped() {
                    if let Some(pos) = response.interact_pointer_pos() {
                        self.state.pointer_moved(pos);
                    }
                    if let OverlayPhase::Selecting { current, .. } = self.state.phase() {
                        let ppp = ctx.pixels_per_point();
                        if let Some(outcome) = self.state.pointer_up(current, ppp) {
                            self.finish(ctx, outcome);
                            return;
                        }
                    }
                }

                if ctx.input(|i| i.key_pressed(egui::Key::Escape)) && self.state.escape() {
                    self.finish(ctx, SelectionOutcome::Cancelled);
                    return;
                }

                match self.state.selection_rect() {
                    Some(selection) => {
                        draw_selection_overlay(ui.painter(), rect, selection, DIM_ALPHA);
                        draw_selection_border(ui.painter(), selection, 2.0, egui::Color32::WHITE);
                    }
                    None => draw_idle_overlay(ui.painter(), rect, DIM_ALPHA),
                }
            });
    }
}
