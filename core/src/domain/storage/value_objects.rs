use std::fmt;

/// Every key this crate reads or writes in the key-value store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StorageKey {
    SavedRecipes,
    SearchHistory,
    HistoryRestore,
    AnalyticsQueue,
    AnalyticsSession,
}

impl StorageKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            StorageKey::SavedRecipes => "saved_recipes",
            StorageKey::SearchHistory => "search_history",
            StorageKey::HistoryRestore => "history_restore",
            StorageKey::AnalyticsQueue => "analytics_queue_v1",
            StorageKey::AnalyticsSession => "analytics_session_v1",
        }
    }
}

impl fmt::Display for StorageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
