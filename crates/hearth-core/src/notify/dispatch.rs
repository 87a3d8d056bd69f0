//! Turn [`Event`]s into notifications, modals, speech and Telegram messages.

use std::sync::Arc;

use tracing::{debug, info, warn};

use super::{CommandSpeaker, Modal, Notification, Notifier, Speaker, TelegramSender};
use crate::announce::{content, telegram};
use crate::events::Event;
use crate::monitor::MonitorConfig;
use crate::storage::Config;

/// Fans events out to the configured sinks.
///
/// Cloning is cheap; the watch loop hands a clone to each spawned send.
/// Sink failures are logged and swallowed.
#[derive(Clone)]
pub struct Dispatcher {
    notifier: Arc<dyn Notifier>,
    speaker: Option<Arc<dyn Speaker>>,
    telegram: Option<TelegramSender>,
    notifications_enabled: bool,
    monitor: MonitorConfig,
}

impl Dispatcher {
    pub fn new(notifier: Arc<dyn Notifier>, monitor: MonitorConfig) -> Self {
        Self {
            notifier,
            speaker: None,
            telegram: None,
            notifications_enabled: true,
            monitor,
        }
    }

    /// Wire every sink the config enables. Telegram is left out when it is
    /// disabled or missing credentials.
    pub fn from_config(config: &Config, notifier: Arc<dyn Notifier>) -> Self {
        let mut dispatcher = Self::new(notifier, config.monitor.monitor_config())
            .with_notifications(config.notifications.enabled);
        if config.voice.enabled {
            if let Some(speaker) = CommandSpeaker::from_command_line(&config.voice.command) {
                dispatcher = dispatcher.with_speaker(Arc::new(speaker));
            }
        }
        match TelegramSender::from_config(&config.telegram) {
            Ok(sender) => dispatcher = dispatcher.with_telegram(sender),
            Err(e) => debug!(reason = %e, "telegram delivery off"),
        }
        dispatcher
    }

    pub fn with_speaker(mut self, speaker: Arc<dyn Speaker>) -> Self {
        self.speaker = Some(speaker);
        self
    }

    pub fn with_telegram(mut self, sender: TelegramSender) -> Self {
        self.telegram = Some(sender);
        self
    }

    pub fn with_notifications(mut self, enabled: bool) -> Self {
        self.notifications_enabled = enabled;
        self
    }

    pub fn has_speaker(&self) -> bool {
        self.speaker.is_some()
    }

    pub fn has_telegram(&self) -> bool {
        self.telegram.is_some()
    }

    /// Handle the synchronous side of an event (notification, modal,
    /// speech) and return the Telegram message it calls for, if any.
    pub fn notify(&self, event: &Event) -> Option<(String, bool)> {
        match event {
            Event::FirstConnection { ssid, .. } => {
                info!(%ssid, "first connection of the day");
                self.show(&Notification::new(
                    "WiFi Connected",
                    format!("Connected to {ssid}. Timers started!"),
                    "connection",
                ));
                None
            }
            Event::TimerFired { timer, .. } => {
                let body = telegram::timer_body(self.monitor.duration(*timer));
                info!(%timer, "timer fired");
                self.show(
                    &Notification::new(
                        format!("WiFi Monitor - Timer {}", timer.number()),
                        body.clone(),
                        timer.as_str(),
                    )
                    .sticky(),
                );
                let modal = Modal {
                    timer: *timer,
                    message: body.clone(),
                };
                if let Err(e) = self.notifier.show_modal(&modal) {
                    warn!(%timer, error = %e, "failed to show timer modal");
                }
                Some((telegram::timer_fired(*timer, &body), false))
            }
            Event::RestockNeeded { missing_items, .. } => {
                self.show(
                    &Notification::new(
                        "Critical Stock Alert",
                        "No meals can be prepared with current stock!",
                        "restock",
                    )
                    .sticky(),
                );
                self.speak(&content::critical_restock(missing_items));
                Some((telegram::critical_restock(missing_items), false))
            }
            _ => None,
        }
    }

    /// Deliver everything an event calls for, awaiting the Telegram send.
    pub async fn dispatch(&self, event: &Event) {
        if let Some((text, silent)) = self.notify(event) {
            self.send_telegram(&text, silent).await;
        }
    }

    fn show(&self, notification: &Notification) {
        if !self.notifications_enabled {
            debug!(tag = %notification.tag, "notifications disabled");
            return;
        }
        if let Err(e) = self.notifier.notify(notification) {
            warn!(tag = %notification.tag, error = %e, "failed to show notification");
        }
    }

    /// Speak `text` if a speaker is configured. Returns whether speech
    /// was started.
    pub fn speak(&self, text: &str) -> bool {
        let Some(speaker) = &self.speaker else {
            return false;
        };
        match speaker.speak(text) {
            Ok(()) => true,
            Err(e) => {
                warn!(error = %e, "voice announcement failed");
                false
            }
        }
    }

    /// Send `text` if Telegram is configured. Returns whether it was
    /// delivered.
    pub async fn send_telegram(&self, text: &str, silent: bool) -> bool {
        let Some(sender) = &self.telegram else {
            return false;
        };
        match sender.send_message(text, silent).await {
            Ok(()) => true,
            Err(e) => {
                warn!(error = %e, "telegram send failed");
                false
            }
        }
    }
}
