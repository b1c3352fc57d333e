//! Time-limited error notices.
//!
//! A failed backend call does not end the session; it posts a notice that is
//! shown until it expires. Posting a new notice replaces the current one.

use chrono::{DateTime, Duration, Utc};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notice {
    pub message: String,
    pub posted_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl Notice {
    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }
}

#[derive(Clone, Debug)]
pub struct NoticeBoard {
    ttl: Duration,
    current: Option<Notice>,
}

impl NoticeBoard {
    pub fn new(ttl: Duration) -> Self {
        Self { ttl, current: None }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Posts `message` at `now`, replacing any current notice.
    pub fn notify_at(&mut self, message: impl Into<String>, now: DateTime<Utc>) -> &Notice {
        self.current.insert(Notice {
            message: message.into(),
            posted_at: now,
            expires_at: now + self.ttl,
        })
    }

    pub fn notify(&mut self, message: impl Into<String>) -> &Notice {
        self.notify_at(message, Utc::now())
    }

    /// The current notice, if it has not expired at `now`.
    pub fn active_at(&self, now: DateTime<Utc>) -> Option<&Notice> {
        self.current.as_ref().filter(|notice| notice.is_active(now))
    }

    pub fn active(&self) -> Option<&Notice> {
        self.active_at(Utc::now())
    }

    /// Drops the current notice if it has expired at `now`.
    pub fn clear_expired(&mut self, now: DateTime<Utc>) {
        if self.current.as_ref().is_some_and(|n| !n.is_active(now)) {
            self.current = None;
        }
    }

    pub fn dismiss(&mut self) {
        self.current = None;
    }
}
