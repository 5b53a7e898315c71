//! Toast content for data-action outcomes.
//!
//! The data layer only reports results; which notice to show for them is
//! decided here.

use std::sync::{Arc, Mutex};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Variant {
    #[default]
    Default,
    Destructive,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notice {
    pub title: &'static str,
    pub description: &'static str,
    pub variant: Variant,
}

impl Notice {
    const fn info(title: &'static str, description: &'static str) -> Self {
        Self {
            title,
            description,
            variant: Variant::Default,
        }
    }

    const fn destructive(title: &'static str, description: &'static str) -> Self {
        Self {
            title,
            description,
            variant: Variant::Destructive,
        }
    }

    pub const fn fetch_failed() -> Self {
        Self::destructive(
            "Failed to load recommendations",
            "Could not retrieve your personalized recommendations.",
        )
    }

    pub const fn generated() -> Self {
        Self::info(
            "Recommendations Generated",
            "New personalized recommendations are ready for you.",
        )
    }

    pub const fn generate_failed() -> Self {
        Self::destructive(
            "Failed to Generate Recommendations",
            "An error occurred while creating recommendations.",
        )
    }

    pub const fn deleted() -> Self {
        Self::info(
            "Recommendations Deleted",
            "The recommendation set has been removed.",
        )
    }

    pub const fn delete_failed() -> Self {
        Self::destructive(
            "Failed to Delete Recommendations",
            "An error occurred while deleting the recommendations.",
        )
    }

    pub fn is_error(&self) -> bool {
        self.variant == Variant::Destructive
    }
}

/// Sink for notices; the UI renders them as toasts.
pub trait Notifier {
    fn notify(&self, notice: Notice);
}

/// Shared, append-only record of emitted notices.
#[derive(Clone, Debug, Default)]
pub struct NoticeLog {
    entries: Arc<Mutex<Vec<Notice>>>,
}

impl NoticeLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<Notice> {
        self.entries.lock().expect("notice log poisoned").clone()
    }

    pub fn last(&self) -> Option<Notice> {
        self.entries
            .lock()
            .expect("notice log poisoned")
            .last()
            .cloned()
    }

    /// Remove and return everything recorded so far.
    pub fn drain(&self) -> Vec<Notice> {
        std::mem::take(&mut *self.entries.lock().expect("notice log poisoned"))
    }
}

impl Notifier for NoticeLog {
    fn notify(&self, notice: Notice) {
        self.entries.lock().expect("notice log poisoned").push(notice);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failures_are_destructive() {
        assert!(Notice::fetch_failed().is_error());
        assert!(Notice::generate_failed().is_error());
        assert!(Notice::delete_failed().is_error());
        assert!(!Notice::generated().is_error());
        assert!(!Notice::deleted().is_error());
    }

    #[test]
    fn log_drains_in_order() {
        let log = NoticeLog::new();
        log.notify(Notice::generated());
        log.notify(Notice::deleted());
        assert_eq!(log.last(), Some(Notice::deleted()));
        assert_eq!(log.drain(), vec![Notice::generated(), Notice::deleted()]);
        assert!(log.entries().is_empty());
    }
}
