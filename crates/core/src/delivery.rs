//! Result delivery: clipboard plus desktop notification.
//!
//! The daemon has no terminal to print to, so analysis results land on the
//! system clipboard with a toast summarizing the first part of the text.
//! Failures are surfaced in the toast as well; nothing is swallowed.

use crate::error::{AppError, Result};
use crate::inference::AnalysisResult;
use notify_rust::{Notification, Timeout};

/// Maximum characters of response text shown in a notification body.
pub const PREVIEW_LEN: usize = 100;

/// How long a notification stays on screen.
const NOTIFICATION_TIMEOUT_MS: u32 = 5000;

/// Delivers analysis results to the clipboard and notification surface.
pub struct NotificationSink {
    title: String,
}

impl NotificationSink {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
        }
    }

    /// Delivers one result.
    ///
    /// Success: the full text goes on the clipboard and a truncated preview
    /// into a notification. Failure: the failure message is shown directly,
    /// and the clipboard is left alone.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Delivery`] when the clipboard or the notification
    /// daemon is unavailable.
    pub fn deliver(&self, result: &AnalysisResult) -> Result<()> {
        match result {
            AnalysisResult::Success(text) => {
                let mut clipboard = arboard::Clipboard::new()
                    .map_err(|e| AppError::delivery(format!("clipboard unavailable: {}", e)))?;
                clipboard
                    .set_text(text.clone())
                    .map_err(|e| AppError::delivery(format!("clipboard write failed: {}", e)))?;

                self.notify(&format!("Analysis copied to clipboard:\n{}", preview(text)))
            }
            AnalysisResult::Failure { message, .. } => {
                self.notify(&format!("Error: {}", message))
            }
        }
    }

    fn notify(&self, body: &str) -> Result<()> {
        Notification::new()
            .summary(&self.title)
            .body(body)
            .timeout(Timeout::Milliseconds(NOTIFICATION_TIMEOUT_MS))
            .show()
            .map_err(|e| AppError::delivery(format!("notification failed: {}", e)))?;
        Ok(())
    }
}

/// First [`PREVIEW_LEN`] characters of `text`, with an ellipsis when there
/// was more. Counts characters, not bytes, so multibyte text never splits.
pub fn preview(text: &str) -> String {
    let mut iter = text.char_indices();
    match iter.nth(PREVIEW_LEN) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_text_passes_through() {
        assert_eq!(preview("a cat"), "a cat");
    }

    #[test]
    fn exactly_preview_len_is_not_truncated() {
        let text = "x".repeat(PREVIEW_LEN);
        assert_eq!(preview(&text), text);
    }

    #[test]
    fn long_text_is_cut_with_ellipsis() {
        let text = "y".repeat(PREVIEW_LEN + 40);
        let got = preview(&text);
        assert_eq!(got.chars().count(), PREVIEW_LEN + 3);
        assert!(got.ends_with("..."));
    }

    #[test]
    fn truncation_respects_char_boundaries() {
        // 3-byte chars; a byte-indexed cut would panic or split a char.
        let text = "画".repeat(PREVIEW_LEN + 5);
        let got = preview(&text);
        assert!(got.ends_with("..."));
        assert_eq!(got.chars().count(), PREVIEW_LEN + 3);
    }
}
