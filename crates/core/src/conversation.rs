//! In-memory conversation transcript.
//!
//! One store holds the turns asked about the currently loaded capture.
//! Nothing is persisted across restarts; replacing the image deliberately
//! leaves the transcript alone so the caller can decide when to wipe it.

use crate::capture::CapturedImage;

/// One prompt/response pair.
#[derive(Debug, Clone, PartialEq)]
pub struct ConversationTurn {
    pub prompt: String,
    pub response: String,
}

/// Ordered transcript plus the capture it is about.
#[derive(Default)]
pub struct ConversationStore {
    turns: Vec<ConversationTurn>,
    current_image: Option<CapturedImage>,
}

impl ConversationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a turn. Arrival order, no deduplication.
    pub fn append_turn(&mut self, prompt: impl Into<String>, response: impl Into<String>) {
        self.turns.push(ConversationTurn {
            prompt: prompt.into(),
            response: response.into(),
        });
    }

    /// Empties the transcript. The current image is untouched.
    pub fn clear(&mut self) {
        self.turns.clear();
    }

    pub fn turns(&self) -> &[ConversationTurn] {
        &self.turns
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// Replaces the current image without clearing the transcript.
    pub fn set_image(&mut self, image: CapturedImage) {
        self.current_image = Some(image);
    }

    pub fn image(&self) -> Option<&CapturedImage> {
        self.current_image.as_ref()
    }

    pub fn has_image(&self) -> bool {
        self.current_image.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::DynamicImage;

    fn dummy_image() -> CapturedImage {
        CapturedImage {
            image: DynamicImage::new_rgba8(2, 2),
            region: None,
        }
    }

    #[test]
    fn clear_then_append_yields_single_turn() {
        let mut store = ConversationStore::new();
        store.append_turn("old", "stale");
        store.clear();
        store.append_turn("what is this?", "a cat");

        assert_eq!(
            store.turns(),
            &[ConversationTurn {
                prompt: "what is this?".to_string(),
                response: "a cat".to_string(),
            }]
        );
    }

    #[test]
    fn turns_keep_arrival_order_without_dedup() {
        let mut store = ConversationStore::new();
        store.append_turn("p", "r");
        store.append_turn("p", "r");
        store.append_turn("q", "s");

        let prompts: Vec<_> = store.turns().iter().map(|t| t.prompt.as_str()).collect();
        assert_eq!(prompts, ["p", "p", "q"]);
    }

    #[test]
    fn replacing_image_keeps_transcript() {
        let mut store = ConversationStore::new();
        store.set_image(dummy_image());
        store.append_turn("p", "r");
        store.set_image(dummy_image());

        assert_eq!(store.turns().len(), 1);
        assert!(store.has_image());
    }

    #[test]
    fn clear_keeps_current_image() {
        let mut store = ConversationStore::new();
        store.set_image(dummy_image());
        store.append_turn("p", "r");
        store.clear();

        assert!(store.is_empty());
        assert!(store.has_image());
    }
}
