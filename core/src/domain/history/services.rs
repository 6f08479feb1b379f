use tokio::sync::OwnedMutexGuard;
use tracing::{debug, instrument, warn};

use crate::domain::{
    analytics::ports::AnalyticsTransport,
    common::{entities::app_errors::CoreError, services::Service},
    generation::{ports::RecipeGenerator, value_objects::IngredientSelection},
    history::{
        entities::{HistoryEntry, RestoreRequest},
        ports::HistoryService,
        value_objects::{MAX_HISTORY_LEN, normalize_history},
    },
    notifier::Topic,
    recipe::entities::Recipe,
    storage::{
        KeyValueStore, StorageKey,
        services::{heal_document, read_document, write_document},
    },
};

impl<S, G, T> Service<S, G, T>
where
    S: KeyValueStore,
    G: RecipeGenerator,
    T: AnalyticsTransport,
{
    async fn load_history(&self) -> Result<(OwnedMutexGuard<()>, Vec<HistoryEntry>), CoreError> {
        let guard = self.locks.lock(StorageKey::SearchHistory).await;
        let (raw, document) = read_document(&*self.store, StorageKey::SearchHistory).await?;
        let entries = normalize_history(document);

        if let Err(e) =
            heal_document(&*self.store, StorageKey::SearchHistory, raw.as_deref(), &entries).await
        {
            warn!(error = %e, "failed to rewrite normalized history");
        }
        Ok((guard, entries))
    }

    async fn store_history(
        &self,
        guard: OwnedMutexGuard<()>,
        entries: &[HistoryEntry],
    ) -> Result<(), CoreError> {
        write_document(&*self.store, StorageKey::SearchHistory, entries).await?;
        drop(guard);
        self.notifier.publish(Topic::HistoryChanged);
        Ok(())
    }
}

impl<S, G, T> HistoryService for Service<S, G, T>
where
    S: KeyValueStore,
    G: RecipeGenerator,
    T: AnalyticsTransport,
{
    #[instrument(skip(self, recipes), fields(recipes = recipes.len()))]
    async fn append_history(
        &self,
        ingredients: Vec<String>,
        recipes: &[Recipe],
    ) -> Result<HistoryEntry, CoreError> {
        let entry = HistoryEntry::new(ingredients, recipes);
        let (guard, mut entries) = self.load_history().await?;

        entries.insert(0, entry.clone());
        entries.truncate(MAX_HISTORY_LEN);

        self.store_history(guard, &entries).await?;
        debug!(id = %entry.id, stored = entries.len(), "history entry appended");
        Ok(entry)
    }

    async fn list_history(&self) -> Result<Vec<HistoryEntry>, CoreError> {
        let (_guard, entries) = self.load_history().await?;
        Ok(entries)
    }

    async fn get_history_entry(&self, id: &str) -> Result<Option<HistoryEntry>, CoreError> {
        let (_guard, entries) = self.load_history().await?;
        Ok(entries.into_iter().find(|entry| entry.id == id))
    }

    #[instrument(skip(self))]
    async fn remove_history_entry(&self, id: &str) -> Result<(), CoreError> {
        let (guard, mut entries) = self.load_history().await?;
        entries.retain(|entry| entry.id != id);
        self.store_history(guard, &entries).await
    }

    #[instrument(skip(self))]
    async fn clear_history(&self) -> Result<(), CoreError> {
        let guard = self.locks.lock(StorageKey::SearchHistory).await;
        self.store.remove(StorageKey::SearchHistory.as_str()).await?;
        drop(guard);
        self.notifier.publish(Topic::HistoryChanged);
        Ok(())
    }

    #[instrument(skip(self, entry), fields(id = %entry.id))]
    async fn stage_restore(&self, entry: &HistoryEntry) -> Result<(), CoreError> {
        self.stage_restore_ingredients(entry.ingredients.clone()).await
    }

    async fn stage_restore_ingredients(&self, ingredients: Vec<String>) -> Result<(), CoreError> {
        let request = RestoreRequest { ingredients };
        let _guard = self.locks.lock(StorageKey::HistoryRestore).await;
        write_document(&*self.store, StorageKey::HistoryRestore, &request).await
    }

    #[instrument(skip(self))]
    async fn take_restore(&self) -> Result<Option<RestoreRequest>, CoreError> {
        let _guard = self.locks.lock(StorageKey::HistoryRestore).await;
        let Some(raw) = self.store.get(StorageKey::HistoryRestore.as_str()).await? else {
            return Ok(None);
        };
        self.store.remove(StorageKey::HistoryRestore.as_str()).await?;

        let request = match serde_json::from_str::<RestoreRequest>(&raw) {
            Ok(request) => request,
            Err(e) => {
                warn!(error = %e, "discarding unreadable restore slot");
                return Ok(None);
            }
        };

        let selection: IngredientSelection = request.ingredients.into_iter().collect();
        if selection.is_empty() {
            return Ok(None);
        }
        Ok(Some(RestoreRequest {
            ingredients: selection.into_vec(),
        }))
    }
}
