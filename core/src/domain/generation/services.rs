use std::time::Instant;

use chrono::Local;
use serde_json::json;
use tracing::{error, info, instrument, warn};

use crate::domain::{
    analytics::{
        entities::AnalyticsEventName,
        ports::{AnalyticsService, AnalyticsTransport},
        value_objects::properties,
    },
    common::{entities::app_errors::CoreError, services::Service},
    generation::{
        entities::{GenerationContext, GenerationOutcome, GenerationRequest, Season},
        ports::{GenerationService, RecipeGenerator},
        value_objects::{GenerateRecipesInput, IngredientSelection},
    },
    history::ports::HistoryService,
    recipe::ports::SavedRecipeService,
    storage::KeyValueStore,
};

impl<S, G, T> GenerationService for Service<S, G, T>
where
    S: KeyValueStore,
    G: RecipeGenerator,
    T: AnalyticsTransport,
{
    #[instrument(skip(self, input))]
    async fn generate_recipes(
        &self,
        input: GenerateRecipesInput,
    ) -> Result<GenerationOutcome, CoreError> {
        let selection: IngredientSelection = input.ingredients.iter().collect();
        if selection.is_empty() {
            return Err(CoreError::EmptySelection);
        }
        let options = input
            .options
            .unwrap_or_else(|| self.settings.generation_defaults.clone());

        self.track(
            AnalyticsEventName::GenerateRecipesStart,
            properties(json!({
                "ingredients": selection.as_slice(),
                "countSelected": selection.len(),
            })),
        )
        .await;

        let request = GenerationRequest {
            ingredients: selection.as_slice().to_vec(),
            context: GenerationContext {
                season: Season::infer(&options.region, Local::now().date_naive()),
                locale: options.locale,
                region: options.region,
                max_minutes: options.max_minutes,
                utensils: options.utensils,
            },
        };

        let started = Instant::now();
        let result = self.generator.generate(request).await;
        let duration_ms = started.elapsed().as_millis() as u64;

        let result = match result {
            Ok(result) => result,
            Err(e) => {
                error!(error = %e, duration_ms, "recipe generation failed");
                self.track(
                    AnalyticsEventName::GenerateRecipesError,
                    properties(json!({ "durationMs": duration_ms, "message": e.to_string() })),
                )
                .await;
                self.flush().await;
                return Err(e);
            }
        };

        info!(
            recipes = result.recipes.len(),
            duration_ms, "recipes generated"
        );

        if let Err(e) = self.merge_generated(result.recipes.clone()).await {
            warn!(error = %e, "failed to store generated recipes");
        }

        let history_entry = match self
            .append_history(selection.into_vec(), &result.recipes)
            .await
        {
            Ok(entry) => Some(entry),
            Err(e) => {
                warn!(error = %e, "failed to record history entry");
                None
            }
        };

        self.track(
            AnalyticsEventName::GenerateRecipesSuccess,
            properties(json!({
                "durationMs": duration_ms,
                "recipesCount": result.recipes.len(),
            })),
        )
        .await;
        self.flush().await;

        Ok(GenerationOutcome {
            recipes: result.recipes,
            follow_up_question: result.follow_up_question,
            icv_score: result.icv_score,
            history_entry,
        })
    }
}
