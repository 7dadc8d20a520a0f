//! Transient user notifications ("toasts").

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use crate::history::push_capped;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastLevel {
    Info,
    Loading,
    Success,
    Error,
}

#[derive(Debug, Clone)]
pub struct Toast {
    pub id: u64,
    pub level: ToastLevel,
    pub message: String,
    pub created: Instant,
}

/// Capped queue of toasts that expire after `ttl`.
///
/// A loading toast can be replaced in place by its id, the way a download request turns
/// into its success or error message.
pub struct NotificationCenter {
    toasts: VecDeque<Toast>,
    ttl: Duration,
    cap: usize,
    next_id: u64,
}

impl NotificationCenter {
    pub fn new(ttl: Duration, cap: usize) -> Self {
        Self {
            toasts: VecDeque::with_capacity(cap),
            ttl,
            cap,
            next_id: 1,
        }
    }

    pub fn push(&mut self, level: ToastLevel, message: impl Into<String>) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        let message = message.into();
        match level {
            ToastLevel::Error => tracing::warn!("notify: {}", message),
            _ => tracing::info!("notify: {}", message),
        }
        push_capped(
            &mut self.toasts,
            Toast {
                id,
                level,
                message,
                created: Instant::now(),
            },
            self.cap,
        );
        id
    }

    pub fn info(&mut self, message: impl Into<String>) -> u64 {
        self.push(ToastLevel::Info, message)
    }

    pub fn loading(&mut self, message: impl Into<String>) -> u64 {
        self.push(ToastLevel::Loading, message)
    }

    pub fn success(&mut self, message: impl Into<String>) -> u64 {
        self.push(ToastLevel::Success, message)
    }

    pub fn error(&mut self, message: impl Into<String>) -> u64 {
        self.push(ToastLevel::Error, message)
    }

    /// Replace toast `id` (if still shown) with a new level and message; otherwise push.
    pub fn update(&mut self, id: u64, level: ToastLevel, message: impl Into<String>) {
        let message = message.into();
        if let Some(t) = self.toasts.iter_mut().find(|t| t.id == id) {
            t.level = level;
            t.message = message;
            t.created = Instant::now();
        } else {
            self.push(level, message);
        }
    }

    /// Drop expired toasts. Loading toasts stay until updated.
    pub fn prune(&mut self, now: Instant) {
        let ttl = self.ttl;
        self.toasts.retain(|t| {
            t.level == ToastLevel::Loading || now.saturating_duration_since(t.created) < ttl
        });
    }

    pub fn visible(&self) -> impl Iterator<Item = &Toast> {
        self.toasts.iter().rev()
    }

    pub fn len(&self) -> usize {
        self.toasts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.toasts.is_empty()
    }
}

impl Default for NotificationCenter {
    fn default() -> Self {
        Self::new(Duration::from_secs(4), 5)
    }
}
