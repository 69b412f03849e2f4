//! Process-wide capture hotkey.
//!
//! Wraps the OS global hotkey hook behind a channel: a background thread
//! consumes raw key events, debounces them, and forwards one
//! [`CaptureRequested`] per discrete press. The receiving loop (the UI)
//! owns every state change that follows; the listener thread never touches
//! UI state directly.
//!
//! The hook is a process-wide singleton resource. It is acquired once at
//! startup and released by [`HotkeyListener::unregister`] or on drop,
//! whichever comes first.

use crate::error::{AppError, Result};
use global_hotkey::{
    hotkey::HotKey, GlobalHotKeyEvent, GlobalHotKeyManager, HotKeyState,
};
use std::thread;

/// Message emitted once per physical press of the capture combo.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaptureRequested;

/// Collapses key auto-repeat into one event per press.
///
/// The combo counts as pressed only on the transition from not-down to
/// down; holding it emits nothing further until a release is seen.
#[derive(Default)]
pub struct Debouncer {
    down: bool,
}

impl Debouncer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feeds one raw event; returns true when the callback should fire.
    pub fn observe(&mut self, state: HotKeyState) -> bool {
        match state {
            HotKeyState::Pressed => {
                if self.down {
                    false
                } else {
                    self.down = true;
                    true
                }
            }
            HotKeyState::Released => {
                self.down = false;
                false
            }
        }
    }
}

/// Owns the global hotkey hook for the lifetime of the process.
pub struct HotkeyListener {
    manager: GlobalHotKeyManager,
    hotkey: Option<HotKey>,
}

impl HotkeyListener {
    /// Installs the OS hook and registers `combo` (e.g. `"alt+shift+KeyC"`).
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Registration`] when the combo string does not
    /// parse or the OS denies the hook; the rest of the application keeps
    /// working without a hotkey in that case.
    pub fn register(combo: &str) -> Result<Self> {
        let hotkey: HotKey = combo
            .parse()
            .map_err(|e| AppError::registration(format!("invalid hotkey '{}': {}", combo, e)))?;

        let manager = GlobalHotKeyManager::new()
            .map_err(|e| AppError::registration(format!("could not install hook: {}", e)))?;

        manager
            .register(hotkey)
            .map_err(|e| AppError::registration(format!("could not register '{}': {}", combo, e)))?;

        tracing::info!(combo, "global capture hotkey registered");

        Ok(Self {
            manager,
            hotkey: Some(hotkey),
        })
    }

    /// Spawns the background listening loop.
    ///
    /// Forwards one [`CaptureRequested`] per discrete press over `sender`.
    /// The loop ends on its own once every receiver is gone.
    pub fn spawn_listener(&self, sender: kanal::Sender<CaptureRequested>) {
        let Some(hotkey) = self.hotkey else {
            return;
        };
        let id = hotkey.id();

        thread::spawn(move || {
            let receiver = GlobalHotKeyEvent::receiver();
            let mut debouncer = Debouncer::new();

            while let Ok(event) = receiver.recv() {
                if event.id != id {
                    continue;
                }
                if !debouncer.observe(event.state) {
                    continue;
                }
                tracing::debug!("capture hotkey pressed");
                if sender.send(CaptureRequested).is_err() {
                    break;
                }
            }
        });
    }

    /// Releases the hook. Safe to call repeatedly, including after drop
    /// paths have already run it.
    pub fn unregister(&mut self) -> Result<()> {
        if let Some(hotkey) = self.hotkey.take() {
            self.manager
                .unregister(hotkey)
                .map_err(|e| AppError::registration(format!("unregister failed: {}", e)))?;
            tracing::info!("global capture hotkey released");
        }
        Ok(())
    }
}

impl Drop for HotkeyListener {
    fn drop(&mut self) {
        let _ = self.unregister();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fires_once_per_discrete_press() {
        let mut debouncer = Debouncer::new();

        // Press with OS auto-repeat while held.
        assert!(debouncer.observe(HotKeyState::Pressed));
        assert!(!debouncer.observe(HotKeyState::Pressed));
        assert!(!debouncer.observe(HotKeyState::Pressed));

        // Release, then a second discrete press.
        assert!(!debouncer.observe(HotKeyState::Released));
        assert!(debouncer.observe(HotKeyState::Pressed));
    }

    #[test]
    fn release_without_press_is_silent() {
        let mut debouncer = Debouncer::new();
        assert!(!debouncer.observe(HotKeyState::Released));
        assert!(debouncer.observe(HotKeyState::Pressed));
    }
}
