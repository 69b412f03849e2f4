//! Screen capture functionality.
//!
//! This module provides cross-platform screen capture capabilities,
//! supporting both X11 and Wayland on Linux, as well as Windows and macOS.
//!
//! # Example
//!
//! ```ignore
//! use screenlens_core::capture::ScreenCapturer;
//! use screenlens_core::region::Region;
//!
//! let capturer = ScreenCapturer::new()?;
//!
//! // Full primary display
//! let full = capturer.capture(None)?;
//!
//! // A specific area, clamped to the display bounds
//! let area = capturer.capture(Some(Region::from_points(100, 100, 500, 400)))?;
//! ```

use crate::error::{AppError, Result};
use crate::region::Region;
use image::DynamicImage;
use screenshots::Screen;
use std::time::Duration;

/// Delay before an unattended full-screen grab, giving the user time to
/// bring the window they care about to the front. Must never be awaited on
/// the UI thread.
pub const PRE_CAPTURE_DELAY: Duration = Duration::from_millis(500);

/// A screen grab together with the area it came from.
///
/// `region` is `None` for full-display captures. The image is never mutated
/// after capture; the pipeline that produced it owns it until it is handed
/// to the inference client.
pub struct CapturedImage {
    pub image: DynamicImage,
    pub region: Option<Region>,
}

impl CapturedImage {
    /// Pixel dimensions of the captured bitmap.
    pub fn dimensions(&self) -> (u32, u32) {
        (self.image.width(), self.image.height())
    }
}

/// Screen capturer that provides multi-monitor screenshot capabilities.
///
/// This struct wraps the `screenshots` crate and provides a convenient API
/// for capturing entire displays or clamped sub-regions.
pub struct ScreenCapturer {
    screens: Vec<Screen>,
}

impl ScreenCapturer {
    /// Initializes the screen capturer by detecting available screens.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::ScreenCapture`] if:
    /// - Screen enumeration fails (e.g., no display server available)
    /// - No screens are detected
    pub fn new() -> Result<Self> {
        let screens = Screen::all()
            .map_err(|e| AppError::capture(format!("Failed to enumerate screens: {}", e)))?;

        if screens.is_empty() {
            return Err(AppError::capture("No screens detected"));
        }

        Ok(Self { screens })
    }

    /// Lists available screens with their dimensions and metadata.
    pub fn list_screens(&self) -> Vec<String> {
        self.screens
            .iter()
            .enumerate()
            .map(|(i, s)| {
                format!(
                    "Monitor {}: {}x{} (scale: {})",
                    i, s.display_info.width, s.display_info.height, s.display_info.scale_factor
                )
            })
            .collect()
    }

    /// Returns the number of available screens.
    pub fn screen_count(&self) -> usize {
        self.screens.len()
    }

    /// Gets the pixel dimensions of the primary screen.
    pub fn primary_dimensions(&self) -> Option<(u32, u32)> {
        self.screens
            .first()
            .map(|s| (s.display_info.width, s.display_info.height))
    }

    /// Captures the primary display, or a sub-region of it.
    ///
    /// `None` grabs the whole display. A region is clamped to the display
    /// bounds first, so a drag that ended off-screen is cut back rather
    /// than rejected.
    ///
    /// # Errors
    ///
    /// - [`AppError::EmptySelection`] when nothing remains after clamping
    /// - [`AppError::ScreenCapture`] when the OS refuses the grab
    ///   (e.g. missing screen-recording permission)
    pub fn capture(&self, region: Option<Region>) -> Result<CapturedImage> {
        let screen = self
            .screens
            .first()
            .ok_or_else(|| AppError::capture("No screens available"))?;

        match region {
            None => {
                let image = Self::grab_full(screen)?;
                Ok(CapturedImage {
                    image,
                    region: None,
                })
            }
            Some(requested) => {
                let (width, height) = (screen.display_info.width, screen.display_info.height);
                let clamped = requested
                    .clamped(width, height)
                    .ok_or(AppError::EmptySelection)?;

                tracing::debug!(
                    x1 = clamped.x1,
                    y1 = clamped.y1,
                    w = clamped.width(),
                    h = clamped.height(),
                    "capturing region"
                );

                let image =
                    Self::grab_area(screen, clamped.x1, clamped.y1, clamped.width(), clamped.height())?;
                Ok(CapturedImage {
                    image,
                    region: Some(clamped),
                })
            }
        }
    }

    /// Captures a specific screen by its index.
    ///
    /// # Errors
    ///
    /// Returns:
    /// - [`AppError::ScreenNotFound`] if the index is out of bounds
    /// - [`AppError::ScreenCapture`] if the capture operation fails
    pub fn capture_screen_by_index(&self, index: usize) -> Result<CapturedImage> {
        let screen = self
            .screens
            .get(index)
            .ok_or(AppError::ScreenNotFound(index))?;

        let image = Self::grab_full(screen)?;
        Ok(CapturedImage {
            image,
            region: None,
        })
    }

    fn grab_full(screen: &Screen) -> Result<DynamicImage> {
        let captured = screen
            .capture()
            .map_err(|e| AppError::capture(format!("Failed to capture screen: {}", e)))?;

        Self::to_dynamic(captured)
    }

    fn grab_area(screen: &Screen, x: i32, y: i32, width: u32, height: u32) -> Result<DynamicImage> {
        let captured = screen
            .capture_area(x, y, width, height)
            .map_err(|e| AppError::capture(format!("Failed to capture region: {}", e)))?;

        Self::to_dynamic(captured)
    }

    // Convert screenshots::Image to image::DynamicImage
    fn to_dynamic(captured: screenshots::image::RgbaImage) -> Result<DynamicImage> {
        let width = captured.width();
        let height = captured.height();
        let rgba_data = captured.into_raw();

        let img_buffer = image::ImageBuffer::from_raw(width, height, rgba_data)
            .ok_or_else(|| AppError::capture("Failed to create image buffer"))?;

        Ok(DynamicImage::ImageRgba8(img_buffer))
    }
}
