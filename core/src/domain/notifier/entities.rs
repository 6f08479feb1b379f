use std::fmt;

use super::services::Notifier;

/// Named change channels shared by every surface that shows local data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Topic {
    SavedRecipesChanged,
    HistoryChanged,
}

impl Topic {
    pub fn as_str(&self) -> &'static str {
        match self {
            Topic::SavedRecipesChanged => "saved_recipes_changed",
            Topic::HistoryChanged => "history_changed",
        }
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Handle returned by [`Notifier::subscribe`].
///
/// The handler stays registered until the handle is passed to
/// [`Subscription::unsubscribe`] or dropped.
#[must_use = "dropping a Subscription unsubscribes its handler immediately"]
pub struct Subscription {
    pub(super) id: u64,
    pub(super) topic: Topic,
    pub(super) notifier: Notifier,
}

impl Subscription {
    pub fn unsubscribe(self) {
        // Drop does the work.
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.notifier.release(self.id);
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("topic", &self.topic)
            .finish()
    }
}
