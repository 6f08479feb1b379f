use std::collections::{HashMap, HashSet};

use serde_json::json;
use tokio::sync::OwnedMutexGuard;
use tracing::{debug, instrument, warn};

use crate::domain::{
    analytics::{
        entities::AnalyticsEventName,
        ports::{AnalyticsService, AnalyticsTransport},
        value_objects::properties,
    },
    common::{entities::app_errors::CoreError, services::Service},
    generation::ports::RecipeGenerator,
    notifier::Topic,
    recipe::{
        entities::Recipe,
        normalizer::{dedupe_by_key, normalize_saved, recipe_key},
        ports::SavedRecipeService,
        value_objects::RecipeFilter,
    },
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
    /// Take the collection lock and load the normalized saved set, rewriting
    /// the payload when it was not already in canonical form.
    async fn load_saved(&self) -> Result<(OwnedMutexGuard<()>, Vec<Recipe>), CoreError> {
        let guard = self.locks.lock(StorageKey::SavedRecipes).await;
        let (raw, document) = read_document(&*self.store, StorageKey::SavedRecipes).await?;
        let recipes = normalize_saved(document);

        if let Err(e) =
            heal_document(&*self.store, StorageKey::SavedRecipes, raw.as_deref(), &recipes).await
        {
            warn!(error = %e, "failed to rewrite normalized saved recipes");
        }
        Ok((guard, recipes))
    }

    async fn store_saved(
        &self,
        guard: OwnedMutexGuard<()>,
        recipes: &[Recipe],
    ) -> Result<(), CoreError> {
        write_document(&*self.store, StorageKey::SavedRecipes, recipes).await?;
        drop(guard);
        self.notifier.publish(Topic::SavedRecipesChanged);
        Ok(())
    }

    async fn track_recipe_save(&self, name: &str, action: &str) {
        self.track(
            AnalyticsEventName::RecipeSave,
            properties(json!({ "name": name, "action": action })),
        )
        .await;
    }
}

impl<S, G, T> SavedRecipeService for Service<S, G, T>
where
    S: KeyValueStore,
    G: RecipeGenerator,
    T: AnalyticsTransport,
{
    #[instrument(skip(self, recipes), fields(count = recipes.len()))]
    async fn merge_generated(&self, recipes: Vec<Recipe>) -> Result<Vec<Recipe>, CoreError> {
        let (guard, current) = self.load_saved().await?;

        let favorites: HashMap<String, bool> = current
            .iter()
            .map(|recipe| (recipe.key(), recipe.is_favorite))
            .collect();

        let candidates = recipes
            .into_iter()
            .chain(current)
            .map(|mut recipe| {
                recipe.is_favorite = favorites.get(&recipe.key()).copied().unwrap_or(false);
                recipe
            })
            .collect();
        let merged = dedupe_by_key(candidates);

        self.store_saved(guard, &merged).await?;
        debug!(stored = merged.len(), "merged generated recipes");
        Ok(merged)
    }

    #[instrument(skip(self, recipe), fields(name = %recipe.name))]
    async fn add_recipe(&self, recipe: Recipe) -> Result<bool, CoreError> {
        let key = recipe.key();
        if key.is_empty() {
            return Ok(false);
        }

        let (guard, mut current) = self.load_saved().await?;
        if current.iter().any(|existing| existing.key() == key) {
            return Ok(false);
        }

        let name = recipe.name.clone();
        current.insert(0, recipe);
        self.store_saved(guard, &current).await?;
        self.track_recipe_save(&name, "add").await;
        Ok(true)
    }

    #[instrument(skip(self))]
    async fn remove_recipe(&self, name: &str) -> Result<(), CoreError> {
        let key = recipe_key(name);
        let (guard, mut current) = self.load_saved().await?;
        current.retain(|recipe| recipe.key() != key);

        self.store_saved(guard, &current).await?;
        self.track_recipe_save(name, "remove").await;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn remove_recipes(&self, names: &[String]) -> Result<usize, CoreError> {
        let keys: HashSet<String> = names.iter().map(|name| recipe_key(name)).collect();
        let (guard, mut current) = self.load_saved().await?;

        let before = current.len();
        current.retain(|recipe| !keys.contains(&recipe.key()));
        let removed = before - current.len();

        self.store_saved(guard, &current).await?;
        for name in names {
            self.track_recipe_save(name, "remove").await;
        }
        Ok(removed)
    }

    #[instrument(skip(self))]
    async fn toggle_favorite(&self, name: &str) -> Result<Option<bool>, CoreError> {
        let key = recipe_key(name);
        let (guard, mut current) = self.load_saved().await?;

        let Some(recipe) = current.iter_mut().find(|recipe| recipe.key() == key) else {
            return Ok(None);
        };
        recipe.is_favorite = !recipe.is_favorite;
        let favorite = recipe.is_favorite;

        self.store_saved(guard, &current).await?;
        Ok(Some(favorite))
    }

    async fn list_recipes(&self, filter: RecipeFilter) -> Result<Vec<Recipe>, CoreError> {
        let (_guard, mut recipes) = self.load_saved().await?;
        if filter.favorites_only {
            recipes.retain(|recipe| recipe.is_favorite);
        }
        Ok(recipes)
    }

    async fn find_recipe(&self, name: &str) -> Result<Option<Recipe>, CoreError> {
        let key = recipe_key(name);
        let (_guard, recipes) = self.load_saved().await?;
        Ok(recipes.into_iter().find(|recipe| recipe.key() == key))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use serde_json::Value;

    use crate::domain::{
        analytics::ports::MockAnalyticsTransport, common::services::ServiceSettings,
        generation::ports::MockRecipeGenerator, notifier::Notifier,
    };
    use crate::infrastructure::storage::InMemoryKeyValueStore;

    use super::*;

    type TestService = Service<InMemoryKeyValueStore, MockRecipeGenerator, MockAnalyticsTransport>;

    fn service_over(store: InMemoryKeyValueStore) -> TestService {
        Service::new(
            store,
            MockRecipeGenerator::new(),
            MockAnalyticsTransport::new(),
            Notifier::new(),
            ServiceSettings::default(),
        )
    }

    fn service() -> TestService {
        service_over(InMemoryKeyValueStore::new())
    }

    fn publish_counter(service: &TestService) -> (Arc<AtomicUsize>, crate::domain::notifier::Subscription) {
        let count = Arc::new(AtomicUsize::new(0));
        let c = count.clone();
        let subscription = service
            .notifier()
            .subscribe(Topic::SavedRecipesChanged, move || {
                c.fetch_add(1, Ordering::SeqCst);
            });
        (count, subscription)
    }

    fn names(recipes: &[Recipe]) -> Vec<&str> {
        recipes.iter().map(|recipe| recipe.name.as_str()).collect()
    }

    #[tokio::test]
    async fn test_merge_keeps_favorites_and_order() {
        let service = service();
        let mut bolo = Recipe::new("Bolo de Banana");
        bolo.is_favorite = true;
        service.add_recipe(bolo).await.unwrap();

        let mut regenerated = Recipe::new("Bolo de Banana");
        regenerated.ingredients = vec!["banana".to_string()];
        let merged = service
            .merge_generated(vec![regenerated, Recipe::new("Omelete")])
            .await
            .unwrap();

        assert_eq!(names(&merged), vec!["Bolo de Banana", "Omelete"]);
        assert_eq!(merged[0].ingredients, vec!["banana"]);
        assert!(merged[0].is_favorite);
        assert!(!merged[1].is_favorite);
        assert_eq!(
            service.list_recipes(RecipeFilter::default()).await.unwrap(),
            merged
        );
    }

    #[tokio::test]
    async fn test_merge_appends_older_entries_after_new() {
        let service = service();
        service
            .merge_generated(vec![Recipe::new("Omelete"), Recipe::new("Salada")])
            .await
            .unwrap();

        let merged = service
            .merge_generated(vec![Recipe::new("Panqueca"), Recipe::new("salada")])
            .await
            .unwrap();

        assert_eq!(names(&merged), vec!["Panqueca", "salada", "Omelete"]);
    }

    #[tokio::test]
    async fn test_merge_never_stores_duplicate_keys() {
        let service = service();
        for _ in 0..3 {
            service
                .merge_generated(vec![
                    Recipe::new("Omelete"),
                    Recipe::new("OMELETE"),
                    Recipe::new("Arroz com Ovo"),
                ])
                .await
                .unwrap();
        }

        let stored = service.list_recipes(RecipeFilter::default()).await.unwrap();
        let keys: HashSet<String> = stored.iter().map(Recipe::key).collect();
        assert_eq!(stored.len(), 2);
        assert_eq!(keys.len(), stored.len());
    }

    #[tokio::test]
    async fn test_merge_ignores_incoming_favorite_flag() {
        let service = service();
        let mut incoming = Recipe::new("Salada");
        incoming.is_favorite = true;

        let merged = service.merge_generated(vec![incoming]).await.unwrap();
        assert!(!merged[0].is_favorite);
    }

    #[tokio::test]
    async fn test_add_recipe_prepends_once() {
        let service = service();
        let (published, _sub) = publish_counter(&service);

        assert!(service.add_recipe(Recipe::new("Omelete")).await.unwrap());
        assert!(service.add_recipe(Recipe::new("Panqueca")).await.unwrap());
        assert!(!service.add_recipe(Recipe::new(" omelete")).await.unwrap());
        assert!(!service.add_recipe(Recipe::new("   ")).await.unwrap());

        let stored = service.list_recipes(RecipeFilter::default()).await.unwrap();
        assert_eq!(names(&stored), vec!["Panqueca", "Omelete"]);
        assert_eq!(published.load(Ordering::SeqCst), 2);

        let events = service.pending_events().await.unwrap();
        assert_eq!(events.len(), 2);
        assert!(events.iter().all(|e| e.name == AnalyticsEventName::RecipeSave));
        assert_eq!(events[0].properties.as_ref().unwrap()["action"], "add");
    }

    #[tokio::test]
    async fn test_remove_twice_is_noop() {
        let service = service();
        service.add_recipe(Recipe::new("Omelete")).await.unwrap();

        service.remove_recipe("OMELETE").await.unwrap();
        service.remove_recipe("Omelete").await.unwrap();

        assert!(service
            .list_recipes(RecipeFilter::default())
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_remove_recipes_single_publish() {
        let service = service();
        service
            .merge_generated(vec![
                Recipe::new("Omelete"),
                Recipe::new("Panqueca"),
                Recipe::new("Salada"),
            ])
            .await
            .unwrap();
        let (published, _sub) = publish_counter(&service);

        let removed = service
            .remove_recipes(&["omelete".to_string(), "Missing".to_string(), "Salada".to_string()])
            .await
            .unwrap();

        assert_eq!(removed, 2);
        assert_eq!(published.load(Ordering::SeqCst), 1);
        let stored = service.list_recipes(RecipeFilter::default()).await.unwrap();
        assert_eq!(names(&stored), vec!["Panqueca"]);
    }

    #[tokio::test]
    async fn test_toggle_favorite() {
        let service = service();
        service.add_recipe(Recipe::new("Omelete")).await.unwrap();
        let (published, _sub) = publish_counter(&service);

        assert_eq!(service.toggle_favorite("omelete").await.unwrap(), Some(true));
        let favorites = service.list_recipes(RecipeFilter::favorites()).await.unwrap();
        assert_eq!(names(&favorites), vec!["Omelete"]);

        assert_eq!(service.toggle_favorite("Omelete").await.unwrap(), Some(false));
        assert!(service
            .list_recipes(RecipeFilter::favorites())
            .await
            .unwrap()
            .is_empty());
        assert_eq!(published.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_toggle_missing_does_not_publish() {
        let service = service();
        let (published, _sub) = publish_counter(&service);

        assert_eq!(service.toggle_favorite("Nada").await.unwrap(), None);
        assert_eq!(published.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_find_recipe_by_key() {
        let service = service();
        service.add_recipe(Recipe::new("Arroz com Ovo")).await.unwrap();

        let found = service.find_recipe("  arroz com ovo").await.unwrap();
        assert_eq!(found.map(|r| r.name), Some("Arroz com Ovo".to_string()));
        assert_eq!(service.find_recipe("Bolo").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_legacy_payload_self_heals() {
        let store = InMemoryKeyValueStore::new();
        let legacy = json!([
            "Omelete",
            {"nome": "Bolo de Banana", "tempo_minutos": "25", "favorita": true,
             "ingredientes": [{"nome": "banana"}, "ovo"]},
            {"name": "omelete", "steps": ["bater"]},
            42
        ]);
        store
            .set(StorageKey::SavedRecipes.as_str(), legacy.to_string())
            .await
            .unwrap();
        let service = service_over(store);

        let stored = service.list_recipes(RecipeFilter::default()).await.unwrap();
        assert_eq!(names(&stored), vec!["Omelete", "Bolo de Banana"]);
        assert!(stored[1].is_favorite);
        assert_eq!(stored[1].time_minutes, Some(25));
        assert_eq!(stored[1].ingredients, vec!["banana", "ovo"]);

        let raw = service
            .store
            .get(StorageKey::SavedRecipes.as_str())
            .await
            .unwrap()
            .unwrap();
        let rewritten: Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(rewritten[1]["name"], "Bolo de Banana");
        assert_eq!(rewritten[1]["isFavorite"], true);
        assert_eq!(rewritten.as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_garbage_payload_reads_empty() {
        let store = InMemoryKeyValueStore::new();
        store
            .set(StorageKey::SavedRecipes.as_str(), "{{{".to_string())
            .await
            .unwrap();
        let service = service_over(store);

        assert!(service
            .list_recipes(RecipeFilter::default())
            .await
            .unwrap()
            .is_empty());
        assert_eq!(
            service.store.get(StorageKey::SavedRecipes.as_str()).await.unwrap(),
            Some("[]".to_string())
        );
    }
}
