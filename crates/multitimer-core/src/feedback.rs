//! Expiry feedback: sound and desktop notifications.
//!
//! Platform work lives behind [`Notifier`] and [`AudioPlayer`]. This module
//! only decides when to call them.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::events::Event;
use crate::storage::FeedbackConfig;

#[async_trait]
pub trait Notifier: Send + Sync {
    fn is_supported(&self) -> bool;

    fn permission_granted(&self) -> bool;

    /// Ask the user. Only called when notifications are switched on.
    async fn request_permission(&self) -> bool;

    fn fire(&self, message: &str);
}

pub trait AudioPlayer {
    fn play(&self);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationStatus {
    Enabled,
    Disabled,
    Unsupported,
    /// The user refused. Further toggles do not ask again.
    Denied,
}

#[derive(Debug)]
pub struct Feedback<N, A> {
    notifier: N,
    audio: A,
    sound_enabled: bool,
    audio_unlocked: bool,
    notifications: NotificationStatus,
}

impl<N: Notifier, A: AudioPlayer> Feedback<N, A> {
    /// Notifications configured on are only honoured if permission was
    /// already granted; startup never prompts.
    pub fn new(notifier: N, audio: A, config: &FeedbackConfig) -> Self {
        let notifications = if !config.notifications_enabled {
            NotificationStatus::Disabled
        } else if !notifier.is_supported() {
            NotificationStatus::Unsupported
        } else if notifier.permission_granted() {
            NotificationStatus::Enabled
        } else {
            NotificationStatus::Disabled
        };
        Self {
            notifier,
            audio,
            sound_enabled: config.sound_enabled,
            audio_unlocked: false,
            notifications,
        }
    }

    pub fn sound_enabled(&self) -> bool {
        self.sound_enabled
    }

    pub fn notifications(&self) -> NotificationStatus {
        self.notifications
    }

    /// Switching sound on plays once, the first time only, so platforms
    /// that gate audio behind a user gesture are unlocked early.
    pub fn set_sound_enabled(&mut self, enabled: bool) {
        if enabled && !self.sound_enabled && !self.audio_unlocked {
            self.audio.play();
            self.audio_unlocked = true;
        }
        self.sound_enabled = enabled;
    }

    pub async fn set_notifications_enabled(&mut self, enabled: bool) -> NotificationStatus {
        self.notifications = match (enabled, self.notifications) {
            (false, NotificationStatus::Enabled) => NotificationStatus::Disabled,
            (false, status) => status,
            (true, NotificationStatus::Denied) => NotificationStatus::Denied,
            (true, _) if !self.notifier.is_supported() => NotificationStatus::Unsupported,
            (true, _) if self.notifier.permission_granted() => NotificationStatus::Enabled,
            (true, _) => {
                if self.notifier.request_permission().await {
                    NotificationStatus::Enabled
                } else {
                    tracing::info!("notification permission denied");
                    NotificationStatus::Denied
                }
            }
        };
        self.notifications
    }

    /// React to a sequence event. Only expiries produce feedback.
    pub fn handle(&self, event: &Event) {
        let Event::TimerExpired { index, .. } = event else {
            return;
        };
        if self.sound_enabled {
            self.audio.play();
        }
        if self.notifications == NotificationStatus::Enabled {
            self.notifier.fire(&format!("Timer {} finished", index + 1));
        }
    }
}
