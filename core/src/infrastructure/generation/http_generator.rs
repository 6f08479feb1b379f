use std::time::Duration;

use reqwest::Client;
use tracing::{debug, error};

use crate::domain::{
    common::{DEFAULT_GENERATION_TIMEOUT, entities::app_errors::CoreError},
    generation::{
        entities::{GenerationRequest, GenerationResult},
        ports::RecipeGenerator,
    },
};

use super::mappers::parse_body;

#[derive(Debug, Clone)]
pub struct HttpRecipeGenerator {
    endpoint: String,
    timeout: Duration,
    client: Client,
}

impl HttpRecipeGenerator {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            timeout: DEFAULT_GENERATION_TIMEOUT,
            client: Client::new(),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    async fn exchange(&self, request: &GenerationRequest) -> Result<String, CoreError> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(request)
            .send()
            .await
            .map_err(|e| {
                error!("Recipe generation request failed: {}", e);
                if e.is_timeout() {
                    CoreError::GenerationTimeout
                } else {
                    CoreError::ExternalServiceError(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            error!("Recipe generation error: {} - {}", status, error_text);
            return Err(CoreError::GenerationFailed(status.as_u16()));
        }

        response.text().await.map_err(|e| {
            error!("Failed to read recipe generation response: {}", e);
            CoreError::ExternalServiceError(e.to_string())
        })
    }
}

impl RecipeGenerator for HttpRecipeGenerator {
    async fn generate(&self, request: GenerationRequest) -> Result<GenerationResult, CoreError> {
        if self.endpoint.is_empty() {
            return Err(CoreError::InvalidConfig(
                "generation endpoint is not configured".to_string(),
            ));
        }

        debug!(
            endpoint = %self.endpoint,
            ingredients = request.ingredients.len(),
            season = %request.context.season,
            "requesting recipes"
        );

        let body = tokio::time::timeout(self.timeout, self.exchange(&request))
            .await
            .map_err(|_| {
                error!("Recipe generation timed out after {:?}", self.timeout);
                CoreError::GenerationTimeout
            })??;

        GenerationResult::try_from(parse_body(&body)?)
    }
}

#[cfg(test)]
mod tests {
    use mockito::Matcher;
    use serde_json::json;

    use crate::domain::generation::entities::{GenerationContext, Season};

    use super::*;

    fn request() -> GenerationRequest {
        GenerationRequest {
            ingredients: vec!["ovo".into(), "arroz".into()],
            context: GenerationContext {
                locale: "pt-BR".into(),
                region: "BR".into(),
                season: Season::Summer,
                max_minutes: 30,
                utensils: vec![],
            },
        }
    }

    #[tokio::test]
    async fn test_generate_maps_response() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/gerar-receitas")
            .match_body(Matcher::PartialJson(json!({
                "ingredients": ["ovo", "arroz"],
                "context": {"region": "BR", "season": "summer", "maxMinutes": 30}
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                json!({
                    "recipes": [{
                        "title": "Arroz com Ovo",
                        "timeMinutes": 15,
                        "ingredients": [{"name": "ovo"}, {"name": "arroz"}],
                        "steps": ["misturar", "fritar"]
                    }],
                    "followUpQuestion": "Tem cebola?"
                })
                .to_string(),
            )
            .create_async()
            .await;

        let generator = HttpRecipeGenerator::new(format!("{}/gerar-receitas", server.url()));
        let result = generator.generate(request()).await.unwrap();

        mock.assert_async().await;
        assert_eq!(result.recipes.len(), 1);
        let recipe = &result.recipes[0];
        assert_eq!(recipe.name, "Arroz com Ovo");
        assert_eq!(recipe.time_minutes, Some(15));
        assert_eq!(recipe.ingredients, vec!["ovo", "arroz"]);
        assert_eq!(recipe.steps, vec!["misturar", "fritar"]);
        assert_eq!(result.follow_up_question.as_deref(), Some("Tem cebola?"));
    }

    #[tokio::test]
    async fn test_generate_non_success_status() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/")
            .with_status(502)
            .with_body("bad gateway")
            .create_async()
            .await;

        let generator = HttpRecipeGenerator::new(server.url());
        assert_eq!(
            generator.generate(request()).await,
            Err(CoreError::GenerationFailed(502))
        );
    }

    #[tokio::test]
    async fn test_generate_tolerates_fenced_body() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/")
            .with_status(200)
            .with_body("```json\n{\"receitas\": [{\"nome\": \"Omelete\"}]}\n```")
            .create_async()
            .await;

        let generator = HttpRecipeGenerator::new(server.url());
        let result = generator.generate(request()).await.unwrap();
        assert_eq!(result.recipes[0].name, "Omelete");
    }

    #[tokio::test]
    async fn test_generate_rejects_garbage_body() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/")
            .with_status(200)
            .with_body("internal error")
            .create_async()
            .await;

        let generator = HttpRecipeGenerator::new(server.url());
        assert!(matches!(
            generator.generate(request()).await,
            Err(CoreError::InvalidResponse(_))
        ));
    }

    #[tokio::test]
    async fn test_generate_times_out() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        // Accept and hold the connection without ever answering.
        let server = tokio::spawn(async move {
            let (socket, _) = listener.accept().await.unwrap();
            tokio::time::sleep(Duration::from_secs(5)).await;
            drop(socket);
        });

        let generator = HttpRecipeGenerator::new(format!("http://{addr}/"))
            .with_timeout(Duration::from_millis(100));
        assert_eq!(
            generator.generate(request()).await,
            Err(CoreError::GenerationTimeout)
        );
        server.abort();
    }

    #[tokio::test]
    async fn test_generate_requires_endpoint() {
        let generator = HttpRecipeGenerator::new("");
        assert!(matches!(
            generator.generate(request()).await,
            Err(CoreError::InvalidConfig(_))
        ));
    }

    #[tokio::test]
    async fn test_generate_unreachable() {
        let generator = HttpRecipeGenerator::new("http://127.0.0.1:1/");
        assert!(matches!(
            generator.generate(request()).await,
            Err(CoreError::ExternalServiceError(_))
        ));
    }
}
