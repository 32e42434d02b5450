use crate::input::keys::VK_F1;
use crate::input::VirtualKey;
use crate::runtime::ShutdownSignal;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Install a Ctrl+C handler that triggers `shutdown`.
///
/// Only one handler can be installed per process.
pub fn install_ctrlc_handler(shutdown: Arc<ShutdownSignal>) -> Result<(), ctrlc::Error> {
    ctrlc::set_handler(move || {
        info!("Received shutdown signal, stopping...");
        shutdown.trigger();
    })
}

/// The console key code for `key`, if the console can report it
pub fn console_key_code(key: VirtualKey) -> Option<KeyCode> {
    let code = key.code();
    let named = match code {
        0x08 => KeyCode::Backspace,
        0x09 => KeyCode::Tab,
        0x0D => KeyCode::Enter,
        0x1B => KeyCode::Esc,
        0x20 => KeyCode::Char(' '),
        0x21 => KeyCode::PageUp,
        0x22 => KeyCode::PageDown,
        0x23 => KeyCode::End,
        0x24 => KeyCode::Home,
        0x25 => KeyCode::Left,
        0x26 => KeyCode::Up,
        0x27 => KeyCode::Right,
        0x28 => KeyCode::Down,
        0x2D => KeyCode::Insert,
        0x2E => KeyCode::Delete,
        c @ (0x30..=0x39 | 0x41..=0x5A) => {
            KeyCode::Char(char::from(c as u8).to_ascii_lowercase())
        }
        c if (VK_F1..VK_F1 + 24).contains(&c) => KeyCode::F((c - VK_F1 + 1) as u8),
        _ => return None,
    };
    Some(named)
}

/// Watches the console for the exit key on the calling thread
pub struct ExitWatcher {
    key: VirtualKey,
    code: Option<KeyCode>,
    interval: Duration,
}

impl ExitWatcher {
    pub fn new(key: VirtualKey, interval: Duration) -> Self {
        ExitWatcher {
            key,
            code: console_key_code(key),
            interval,
        }
    }

    /// Block until `shutdown` is triggered, triggering it when the exit key
    /// is pressed.
    ///
    /// Without a usable console only Ctrl+C (or another trigger) ends the wait.
    pub fn run(&self, shutdown: &ShutdownSignal) {
        let Some(code) = self.code else {
            warn!("Exit key {} cannot be read from the console; use Ctrl+C", self.key);
            return wait_for(shutdown, self.interval);
        };

        debug!(key = %self.key, "Exit watcher started");
        while !shutdown.is_shutdown() {
            match event::poll(self.interval) {
                Ok(true) => {
                    if let Ok(Event::Key(key_event)) = event::read() {
                        if is_exit_event(&key_event, code) {
                            info!("Exit key {} pressed, stopping...", self.key);
                            shutdown.trigger();
                        }
                    }
                }
                Ok(false) => {}
                Err(e) => {
                    warn!("Console input unavailable ({}); use Ctrl+C to exit", e);
                    return wait_for(shutdown, self.interval);
                }
            }
        }
        debug!("Exit watcher stopped");
    }
}

fn wait_for(shutdown: &ShutdownSignal, interval: Duration) {
    while !shutdown.wait(interval) {}
}

fn is_exit_event(event: &KeyEvent, code: KeyCode) -> bool {
    if event.kind != KeyEventKind::Press {
        return false;
    }
    match (event.code, code) {
        (KeyCode::Char(pressed), KeyCode::Char(wanted)) => pressed.eq_ignore_ascii_case(&wanted),
        (pressed, wanted) => pressed == wanted,
    }
}
