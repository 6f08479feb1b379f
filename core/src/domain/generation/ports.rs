use std::future::Future;

use crate::domain::{
    common::entities::app_errors::CoreError,
    generation::{
        entities::{GenerationOutcome, GenerationRequest, GenerationResult},
        value_objects::GenerateRecipesInput,
    },
};

/// The remote recipe generator.
#[cfg_attr(test, mockall::automock)]
pub trait RecipeGenerator: Send + Sync {
    /// Fails with [`CoreError::GenerationTimeout`] when the exchange exceeds
    /// the configured deadline and [`CoreError::GenerationFailed`] on a
    /// non-success status.
    fn generate(
        &self,
        request: GenerationRequest,
    ) -> impl Future<Output = Result<GenerationResult, CoreError>> + Send;
}

pub trait GenerationService: Send + Sync {
    /// Run one generation end to end: validate the selection, call the
    /// generator, fold the results into the saved set and record history.
    fn generate_recipes(
        &self,
        input: GenerateRecipesInput,
    ) -> impl Future<Output = Result<GenerationOutcome, CoreError>> + Send;
}
