//! Terminal notifier used by the CLI.

use std::io::Write;
use std::path::PathBuf;
use std::sync::Mutex;

use tracing::{debug, warn};

use super::{Modal, Notification, Notifier};
use crate::error::NotifyError;
use crate::storage::NotificationsConfig;

/// Writes notifications as text lines and optionally plays a sound.
///
/// With a sound file configured, the file is opened with the system's
/// default player; otherwise the terminal bell is rung.
pub struct ConsoleNotifier<W: Write + Send> {
    out: Mutex<W>,
    sound: bool,
    sound_file: Option<PathBuf>,
}

impl ConsoleNotifier<std::io::Stderr> {
    pub fn stderr(config: &NotificationsConfig) -> Self {
        Self::new(std::io::stderr(), config)
    }
}

impl<W: Write + Send> ConsoleNotifier<W> {
    pub fn new(out: W, config: &NotificationsConfig) -> Self {
        Self {
            out: Mutex::new(out),
            sound: config.sound,
            sound_file: config.sound_file.as_ref().map(PathBuf::from),
        }
    }

    pub fn into_inner(self) -> W {
        match self.out.into_inner() {
            Ok(out) => out,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn write(&self, text: &str, bell: bool) -> Result<(), NotifyError> {
        let mut out = match self.out.lock() {
            Ok(out) => out,
            Err(poisoned) => poisoned.into_inner(),
        };
        writeln!(out, "{text}")?;
        if bell {
            out.write_all(b"\x07")?;
        }
        out.flush()?;
        Ok(())
    }

    /// Returns true when the bell should be rung instead.
    fn play_sound(&self) -> bool {
        if !self.sound {
            return false;
        }
        let Some(path) = &self.sound_file else {
            return true;
        };
        match open::that_detached(path) {
            Ok(()) => {
                debug!(path = %path.display(), "playing notification sound");
                false
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "could not play sound file");
                true
            }
        }
    }
}

impl<W: Write + Send> Notifier for ConsoleNotifier<W> {
    fn notify(&self, notification: &Notification) -> Result<(), NotifyError> {
        let bell = notification.require_interaction && self.play_sound();
        self.write(
            &format!("🔔 {}: {}", notification.title, notification.body),
            bell,
        )
    }

    fn show_modal(&self, modal: &Modal) -> Result<(), NotifyError> {
        let title = format!("⏰ Timer {} Complete!", modal.timer.number());
        let rule = "═".repeat(40);
        self.write(&format!("{rule}\n{title}\n{}\n{rule}", modal.message), false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::monitor::TimerSlot;

    fn quiet() -> NotificationsConfig {
        NotificationsConfig {
            enabled: true,
            sound: false,
            sound_file: None,
        }
    }

    #[test]
    fn writes_notification_line() {
        let notifier = ConsoleNotifier::new(Vec::new(), &quiet());
        notifier
            .notify(&Notification::new("WiFi Connected", "Connected to Home.", "connection"))
            .unwrap();
        let text = String::from_utf8(notifier.into_inner()).unwrap();
        assert_eq!(text, "🔔 WiFi Connected: Connected to Home.\n");
    }

    #[test]
    fn sticky_notification_rings_bell_without_sound_file() {
        let config = NotificationsConfig {
            sound: true,
            ..quiet()
        };
        let notifier = ConsoleNotifier::new(Vec::new(), &config);
        notifier
            .notify(&Notification::new("t", "b", "timer1").sticky())
            .unwrap();
        let bytes = notifier.into_inner();
        assert_eq!(bytes.last(), Some(&0x07));
    }

    #[test]
    fn modal_is_framed() {
        let notifier = ConsoleNotifier::new(Vec::new(), &quiet());
        notifier
            .show_modal(&Modal {
                timer: TimerSlot::Timer2,
                message: "done".into(),
            })
            .unwrap();
        let text = String::from_utf8(notifier.into_inner()).unwrap();
        assert!(text.contains("⏰ Timer 2 Complete!\ndone\n"));
    }
}
