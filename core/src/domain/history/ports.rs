use std::future::Future;

use crate::domain::{
    common::entities::app_errors::CoreError,
    history::entities::{HistoryEntry, RestoreRequest},
    recipe::entities::Recipe,
};

/// Most-recent-first log of past generations plus the restore hand-off slot.
pub trait HistoryService: Send + Sync {
    /// Record a generation. Only the first recipes are summarized.
    fn append_history(
        &self,
        ingredients: Vec<String>,
        recipes: &[Recipe],
    ) -> impl Future<Output = Result<HistoryEntry, CoreError>> + Send;

    fn list_history(&self) -> impl Future<Output = Result<Vec<HistoryEntry>, CoreError>> + Send;

    fn get_history_entry(
        &self,
        id: &str,
    ) -> impl Future<Output = Result<Option<HistoryEntry>, CoreError>> + Send;

    fn remove_history_entry(&self, id: &str) -> impl Future<Output = Result<(), CoreError>> + Send;

    fn clear_history(&self) -> impl Future<Output = Result<(), CoreError>> + Send;

    /// Put an entry's ingredients in the slot for the generation surface.
    fn stage_restore(
        &self,
        entry: &HistoryEntry,
    ) -> impl Future<Output = Result<(), CoreError>> + Send;

    /// Put a bare ingredient list back in the slot, e.g. after a consumer
    /// took it but could not use it.
    fn stage_restore_ingredients(
        &self,
        ingredients: Vec<String>,
    ) -> impl Future<Output = Result<(), CoreError>> + Send;

    /// Read and clear the slot in one step.
    fn take_restore(
        &self,
    ) -> impl Future<Output = Result<Option<RestoreRequest>, CoreError>> + Send;
}
