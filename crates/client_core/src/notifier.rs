//! Single-slot, self-expiring status toast.

use std::time::{Duration, Instant};

use shared::domain::{ToastKind, ToastMessage};

pub const TOAST_TTL: Duration = Duration::from_secs(3);

#[derive(Debug, Clone)]
struct ActiveToast {
    toast: ToastMessage,
    expires_at: Instant,
    generation: u64,
}

/// Holds at most one toast. A new `show` replaces the current one and restarts
/// the expiry window; there is no queue.
#[derive(Debug, Clone)]
pub struct Notifier {
    current: Option<ActiveToast>,
    ttl: Duration,
    generation: u64,
}

impl Default for Notifier {
    fn default() -> Self {
        Self::new()
    }
}

impl Notifier {
    pub fn new() -> Self {
        Self::with_ttl(TOAST_TTL)
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            current: None,
            ttl,
            generation: 0,
        }
    }

    pub fn show(&mut self, message: impl Into<String>, kind: ToastKind) -> u64 {
        self.show_at(message, kind, Instant::now())
    }

    pub fn show_at(&mut self, message: impl Into<String>, kind: ToastKind, now: Instant) -> u64 {
        self.generation = self.generation.wrapping_add(1);
        let toast = ToastMessage {
            message: message.into(),
            kind,
        };
        tracing::debug!(kind = ?toast.kind, generation = self.generation, "toast shown");
        self.current = Some(ActiveToast {
            toast,
            expires_at: now + self.ttl,
            generation: self.generation,
        });
        self.generation
    }

    pub fn success(&mut self, message: impl Into<String>) -> u64 {
        self.show(message, ToastKind::Success)
    }

    pub fn error(&mut self, message: impl Into<String>) -> u64 {
        self.show(message, ToastKind::Error)
    }

    /// Clears the toast only if `generation` is still the one on screen.
    pub fn expire(&mut self, generation: u64) -> bool {
        match &self.current {
            Some(active) if active.generation == generation => {
                self.current = None;
                true
            }
            _ => false,
        }
    }

    /// Drops the toast once its window has elapsed.
    pub fn prune(&mut self, now: Instant) {
        if let Some(active) = &self.current {
            if now >= active.expires_at {
                self.current = None;
            }
        }
    }

    pub fn visible(&self, now: Instant) -> Option<&ToastMessage> {
        self.current
            .as_ref()
            .filter(|active| now < active.expires_at)
            .map(|active| &active.toast)
    }

    pub fn current(&self) -> Option<&ToastMessage> {
        self.visible(Instant::now())
    }

    /// Time left before the visible toast expires, for scheduling a repaint.
    pub fn remaining(&self, now: Instant) -> Option<Duration> {
        self.current
            .as_ref()
            .and_then(|active| active.expires_at.checked_duration_since(now))
            .filter(|left| !left.is_zero())
    }
}

#[cfg(test)]
#[path = "tests/notifier_tests.rs"]
mod tests;
