//! Conversation window.
//!
//! Shows the current capture next to a running transcript. Captures and
//! inference requests both run on background threads; their results come
//! back through an mpsc channel and are applied to UI state inside
//! `update`, never from the worker threads themselves.

use super::settings::Settings;
use crate::capture::{CapturedImage, ScreenCapturer, PRE_CAPTURE_DELAY};
use crate::config::Config;
use crate::conversation::ConversationStore;
use crate::hotkey::CaptureRequested;
use crate::image_processing::ImageProcessor;
use crate::inference::{InferenceClient, SUPPORTED_MODELS};
use eframe::egui;
use egui_commonmark::{CommonMarkCache, CommonMarkViewer};
use std::sync::mpsc::{channel, Receiver, Sender};
use std::thread;

/// Results marshaled back from worker threads.
enum ChatEvent {
    /// A screen grab finished.
    Captured(Box<CapturedImage>),
    /// The grab failed; message is shown as a status line.
    CaptureFailed(String),
    /// An analysis finished (the text already includes failure wording).
    Response { prompt: String, text: String },
}

pub struct ChatApp {
    store: ConversationStore,

    // Image display
    texture: Option<egui::TextureHandle>,
    pending_upload: Option<egui::ColorImage>,

    // Input state
    prompt_input: String,
    awaiting_response: bool,
    capture_in_flight: bool,
    status: Option<String>,

    // Cross-thread handoff
    rx: Receiver<ChatEvent>,
    tx: Sender<ChatEvent>,
    hotkey_rx: Option<kanal::Receiver<CaptureRequested>>,

    markdown_cache: CommonMarkCache,
    settings: Settings,
    config: Config,
}

impl ChatApp {
    pub fn new(config: Config, hotkey_rx: Option<kanal::Receiver<CaptureRequested>>) -> Self {
        let (tx, rx) = channel();
        let settings = Settings::load(&config.model_name);

        Self {
            store: ConversationStore::new(),
            texture: None,
            pending_upload: None,
            prompt_input: String::new(),
            awaiting_response: false,
            capture_in_flight: false,
            status: None,
            rx,
            tx,
            hotkey_rx,
            markdown_cache: CommonMarkCache::default(),
            settings,
            config,
        }
    }

    fn effective_endpoint(&self) -> String {
        if self.settings.endpoint.is_empty() {
            self.config.endpoint.clone()
        } else {
            self.settings.endpoint.clone()
        }
    }

    /// Grabs the whole screen on a background thread after the usual delay,
    /// so the user can bring the right window forward first.
    fn trigger_capture(&mut self, ctx: &egui::Context) {
        if self.capture_in_flight {
            return;
        }
        self.capture_in_flight = true;
        self.status = Some("Capturing screen...".to_string());

        let tx = self.tx.clone();
        let ctx = ctx.clone();
        thread::spawn(move || {
            thread::sleep(PRE_CAPTURE_DELAY);
            let event = ScreenCapturer::new()
                .and_then(|capturer| capturer.capture(None))
                .map(|captured| ChatEvent::Captured(Box::new(captured)))
                .unwrap_or_else(|e| ChatEvent::CaptureFailed(e.to_string()));
            let _ = tx.send(event);
            ctx.request_repaint();
        });
    }

    /// Sends the current prompt about the current image to the model.
    fn submit_prompt(&mut self, ctx: &egui::Context) {
        let prompt = self.prompt_input.trim().to_string();
        self.prompt_input.clear();

        let Some(captured) = self.store.image() else {
            self.store
                .append_turn(prompt, "Please provide an image first.");
            return;
        };

        if let Err(e) = self.settings.save() {
            tracing::warn!(error = %e, "failed to save settings");
        }

        self.awaiting_response = true;

        let tx = self.tx.clone();
        let ctx = ctx.clone();
        let image = captured.image.clone();
        let model = self.settings.model.clone();
        let endpoint = self.effective_endpoint();

        // Spawn background thread for async work
        thread::spawn(move || {
            let text = match tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
            {
                Ok(rt) => rt.block_on(async {
                    match ImageProcessor::to_base64_png(&image) {
                        Ok(encoded) => {
                            let client = InferenceClient::with_endpoint(endpoint);
                            client.analyze(&encoded, &model, &prompt).await.display_text()
                        }
                        Err(e) => format!("Error: {}", e),
                    }
                }),
                Err(e) => format!("Error: failed to create async runtime: {}", e),
            };

            let _ = tx.send(ChatEvent::Response { prompt, text });
            ctx.request_repaint();
        });
    }

    fn process_events(&mut self) {
        while let Ok(event) = self.rx.try_recv() {
            match event {
                ChatEvent::Captured(captured) => {
                    let buffer = captured.image.to_rgba8();
                    let size = [captured.image.width() as usize, captured.image.height() as usize];
                    let pixels = buffer.as_flat_samples();
                    self.pending_upload = Some(egui::ColorImage::from_rgba_unmultiplied(
                        size,
                        pixels.as_slice(),
                    ));
                    self.store.set_image(*captured);
                    self.capture_in_flight = false;
                    self.status = None;
                }
                ChatEvent::CaptureFailed(message) => {
                    self.capture_in_flight = false;
                    self.status = Some(format!("Capture failed: {}", message));
                }
                ChatEvent::Response { prompt, text } => {
                    self.store.append_turn(prompt, text);
                    self.awaiting_response = false;
                }
            }
        }
    }

    fn render_toolbar(&mut self, ui: &mut egui::Ui, ctx: &egui::Context) {
        ui.horizontal(|ui| {
            if ui
                .add_enabled(!self.capture_in_flight, egui::Button::new("📸 Capture screen"))
                .clicked()
            {
                self.trigger_capture(ctx);
            }

            egui::ComboBox::from_label("Model")
                .selected_text(&self.settings.model)
                .show_ui(ui, |ui| {
                    for model in SUPPORTED_MODELS {
                        ui.selectable_value(&mut self.settings.model, model.to_string(), *model);
                    }
                });

            if ui.button("🗑 Clear chat").clicked() {
                self.store.clear();
            }

            if let Some(status) = &self.status {
                ui.label(egui::RichText::new(status).italics());
            }
        });
    }

    fn render_transcript(&mut self, ui: &mut egui::Ui) {
        egui::ScrollArea::vertical()
            .stick_to_bottom(true)
            .show(ui, |ui| {
                for (i, turn) in self.store.turns().iter().enumerate() {
                    ui.label(egui::RichText::new(&turn.prompt).strong());
                    ui.push_id(i, |ui| {
                        CommonMarkViewer::new().show(ui, &mut self.markdown_cache, &turn.response);
                    });
                    ui.separator();
                }

                if self.awaiting_response {
                    ui.horizontal(|ui| {
                        ui.spinner();
                        ui.label("Analyzing...");
                    });
                }
            });
    }
}

impl eframe::App for ChatApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        ctx.set_visuals(egui::Visuals::dark());

        // Hotkey presses arrive over the channel; the listener thread never
        // touches UI state itself.
        if let Some(hotkey_rx) = &self.hotkey_rx {
            let mut requested = false;
            while let Ok(Some(CaptureRequested)) = hotkey_rx.try_recv() {
                requested = true;
            }
            if requested {
                self.trigger_capture(ctx);
            }
            ctx.request_repaint_after(std::time::Duration::from_millis(100));
        }

        self.process_events();

        // Upload new capture texture using pre-converted data
        if let Some(color_image) = self.pending_upload.take() {
            self.texture =
                Some(ctx.load_texture("capture", color_image, egui::TextureOptions::LINEAR));
        }

        egui::TopBottomPanel::top("toolbar").show(ctx, |ui| {
            self.render_toolbar(ui, ctx);
        });

        egui::TopBottomPanel::bottom("prompt").show(ctx, |ui| {
            ui.horizontal(|ui| {
                let response = ui.add(
                    egui::TextEdit::singleline(&mut self.prompt_input)
                        .desired_width(ui.available_width() - 80.0)
                        .hint_text("Ask a question about the image"),
                );

                let enter_pressed =
                    response.has_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
                let ask_clicked = ui
                    .add_enabled(!self.awaiting_response, egui::Button::new("🔍 Ask"))
                    .clicked();

                if (ask_clicked || enter_pressed) && !self.awaiting_response {
                    self.submit_prompt(ctx);
                }
            });
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.columns(2, |columns| {
                match &self.texture {
                    Some(texture) => {
                        columns[0].add(egui::Image::new(texture).shrink_to_fit());
                    }
                    None => {
                        columns[0].centered_and_justified(|ui| {
                            ui.label("No capture yet. Press Capture screen or the hotkey");
                        });
                    }
                }

                self.render_transcript(&mut columns[1]);
            });
        });
    }
}
