//! ScreenLens Core Library
//!
//! This library provides the core functionality for the screenlens capture
//! assistant: screen capture, region selection, and analysis through a
//! locally hosted vision-language model.
//!
//! # Overview
//!
//! ScreenLens lets users grab all or part of the screen, via a global
//! hotkey or a UI action, and ask a local vision model about it. The
//! library handles:
//!
//! - **Screen Capture**: primary display or clamped sub-region via [`capture`]
//! - **Region Selection**: fullscreen overlay state machine via [`ui`]
//! - **Inference**: the local endpoint's JSON contract via [`inference`]
//! - **Delivery**: clipboard + notification via [`delivery`], or a running
//!   transcript via [`conversation`]
//! - **Hotkey**: debounced process-wide capture combo via [`hotkey`]
//!
//! # Quick Start
//!
//! The simplest way to use the library is through the [`ScreenLens`] facade:
//!
//! ```ignore
//! use screenlens_core::ScreenLens;
//!
//! // Initialize with environment configuration
//! let app = ScreenLens::new()?;
//!
//! // List available monitors
//! for monitor in app.list_monitors() {
//!     println!("{}", monitor);
//! }
//!
//! // Select a region, capture it, ask the model about it
//! if let Some(region) = screenlens_core::ui::select_region()? {
//!     let captured = app.capture(Some(region))?;
//!     let result = app.analyze(&captured, "What is this?").await?;
//!     println!("{}", result.display_text());
//! }
//! ```
//!
//! # Module Structure
//!
//! - [`capture`]: screen capture
//! - [`config`]: configuration loading and management
//! - [`conversation`]: in-memory transcript
//! - [`delivery`]: clipboard + notification sink
//! - [`error`]: error types and result aliases
//! - [`hotkey`]: global capture hotkey
//! - [`image_processing`]: image encoding utilities
//! - [`inference`]: vision-inference endpoint client
//! - [`region`]: normalized selection rectangles
//! - [`ui`]: overlay and conversation window

pub mod capture;
pub mod config;
pub mod conversation;
pub mod delivery;
pub mod error;
pub mod hotkey;
pub mod image_processing;
pub mod inference;
pub mod region;
pub mod ui;

// Re-export primary types for convenience
pub use capture::{CapturedImage, ScreenCapturer};
pub use config::Config;
pub use conversation::{ConversationStore, ConversationTurn};
pub use delivery::NotificationSink;
pub use error::{AppError, Result};
pub use hotkey::HotkeyListener;
pub use inference::{AnalysisResult, FailureKind, InferenceClient};
pub use region::Region;

use image_processing::ImageProcessor;

/// Main entry point for the screenlens application.
///
/// This struct provides a facade over the various subsystems, handling
/// initialization and orchestration. It's the recommended way to use the
/// library for most use cases.
///
/// # Example
///
/// ```ignore
/// use screenlens_core::ScreenLens;
///
/// let app = ScreenLens::new()?;
/// let captured = app.capture(None)?;
/// ```
pub struct ScreenLens {
    config: Config,
    capturer: ScreenCapturer,
}

impl ScreenLens {
    /// Creates a new instance with environment-based configuration.
    ///
    /// Loads configuration from environment variables (including `.env`
    /// files) and initializes the screen capturer.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or screen capture
    /// initialization fails (e.g., no display available).
    pub fn new() -> Result<Self> {
        let config = Config::load()?;
        let capturer = ScreenCapturer::new()?;
        Ok(Self { config, capturer })
    }

    /// Creates an instance with custom configuration.
    ///
    /// Use this when you need to override environment-based configuration,
    /// such as specifying a different model or endpoint.
    ///
    /// # Errors
    ///
    /// Returns an error if screen capture initialization fails.
    pub fn with_config(config: Config) -> Result<Self> {
        let capturer = ScreenCapturer::new()?;
        Ok(Self { config, capturer })
    }

    /// Lists available monitors with their dimensions.
    pub fn list_monitors(&self) -> Vec<String> {
        self.capturer.list_screens()
    }

    /// Returns the number of available monitors.
    pub fn monitor_count(&self) -> usize {
        self.capturer.screen_count()
    }

    /// Captures the primary display or a sub-region of it.
    ///
    /// `None` grabs the whole display; a region is clamped to the display
    /// bounds first.
    pub fn capture(&self, region: Option<Region>) -> Result<CapturedImage> {
        self.capturer.capture(region)
    }

    /// Captures a whole specific monitor by index.
    ///
    /// # Arguments
    /// * `monitor_index` - Zero-based index of the monitor to capture
    pub fn capture_monitor(&self, monitor_index: usize) -> Result<CapturedImage> {
        self.capturer.capture_screen_by_index(monitor_index)
    }

    /// Encodes a capture and asks the configured model about it.
    ///
    /// Convenience wrapper over [`ImageProcessor`] and [`InferenceClient`]:
    /// the capture is encoded as base64 PNG and submitted in one request.
    /// A blank prompt falls back to the default description request.
    ///
    /// # Errors
    ///
    /// Only image encoding can error here; endpoint failures come back as
    /// an [`AnalysisResult::Failure`] value.
    pub async fn analyze(&self, captured: &CapturedImage, prompt: &str) -> Result<AnalysisResult> {
        let encoded = ImageProcessor::to_base64_png(&captured.image)?;
        let client = InferenceClient::new(&self.config);
        Ok(client.analyze(&encoded, &self.config.model_name, prompt).await)
    }

    /// Returns a reference to the current configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Returns a mutable reference to the configuration.
    ///
    /// Allows modifying settings like the model name after initialization.
    pub fn config_mut(&mut self) -> &mut Config {
        &mut self.config
    }
}
