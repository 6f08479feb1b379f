use std::future::Future;

use crate::domain::{
    common::entities::app_errors::CoreError,
    recipe::{entities::Recipe, value_objects::RecipeFilter},
};

/// The saved/recent recipe collection shared by every surface.
///
/// Every mutation persists the whole collection and then publishes
/// `Topic::SavedRecipesChanged`.
pub trait SavedRecipeService: Send + Sync {
    /// Fold freshly generated recipes into the stored set: new entries first,
    /// favorite flags carried over by key, duplicates collapsed. Returns the
    /// stored list.
    fn merge_generated(
        &self,
        recipes: Vec<Recipe>,
    ) -> impl Future<Output = Result<Vec<Recipe>, CoreError>> + Send;

    /// Prepend `recipe` unless its key is already stored. Returns whether it
    /// was added.
    fn add_recipe(&self, recipe: Recipe) -> impl Future<Output = Result<bool, CoreError>> + Send;

    /// Remove by key. Removing a missing recipe is a no-op.
    fn remove_recipe(&self, name: &str) -> impl Future<Output = Result<(), CoreError>> + Send;

    /// Bulk variant of [`SavedRecipeService::remove_recipe`]. Returns how
    /// many entries were removed.
    fn remove_recipes(
        &self,
        names: &[String],
    ) -> impl Future<Output = Result<usize, CoreError>> + Send;

    /// Flip the favorite flag. `None` when no recipe has that key.
    fn toggle_favorite(
        &self,
        name: &str,
    ) -> impl Future<Output = Result<Option<bool>, CoreError>> + Send;

    fn list_recipes(
        &self,
        filter: RecipeFilter,
    ) -> impl Future<Output = Result<Vec<Recipe>, CoreError>> + Send;

    fn find_recipe(
        &self,
        name: &str,
    ) -> impl Future<Output = Result<Option<Recipe>, CoreError>> + Send;
}
