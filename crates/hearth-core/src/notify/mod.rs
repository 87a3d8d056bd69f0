//! Notification sinks and the event dispatcher.
//!
//! Sinks are collaborators: every failure surfaces as a [`NotifyError`]
//! which the [`Dispatcher`] logs and drops. Nothing here touches pantry or
//! timer state.

mod console;
mod dispatch;
mod telegram;
mod voice;

use serde::{Deserialize, Serialize};

use crate::error::NotifyError;
use crate::monitor::TimerSlot;

pub use console::ConsoleNotifier;
pub use dispatch::Dispatcher;
pub use telegram::TelegramSender;
pub use voice::CommandSpeaker;

/// A desktop-style notification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub title: String,
    pub body: String,
    /// Notifications sharing a tag replace each other.
    pub tag: String,
    /// Stay on screen until dismissed.
    #[serde(default)]
    pub require_interaction: bool,
}

impl Notification {
    pub fn new(title: impl Into<String>, body: impl Into<String>, tag: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
            tag: tag.into(),
            require_interaction: false,
        }
    }

    pub fn sticky(mut self) -> Self {
        self.require_interaction = true;
        self
    }
}

/// Blocking alert shown when a timer fires.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Modal {
    pub timer: TimerSlot,
    pub message: String,
}

/// Something that can put a notification in front of the user.
pub trait Notifier: Send + Sync {
    fn notify(&self, notification: &Notification) -> Result<(), NotifyError>;

    fn show_modal(&self, modal: &Modal) -> Result<(), NotifyError>;
}

/// Text-to-speech output.
pub trait Speaker: Send + Sync {
    fn speak(&self, text: &str) -> Result<(), NotifyError>;
}
