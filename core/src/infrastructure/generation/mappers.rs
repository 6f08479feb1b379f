use serde_json::{Map, Value};

use crate::domain::{
    common::entities::app_errors::CoreError, generation::entities::GenerationResult,
    recipe::normalizer::normalize_recipe,
};

const RECIPES_FIELDS: &[&str] = &["recipes", "receitas"];
const ICV_FIELDS: &[&str] = &["icvScore", "icv_score", "icv"];
const FOLLOW_UP_FIELDS: &[&str] = &["followUpQuestion", "follow_up_question", "pergunta"];

fn first_field<'a>(body: &'a Map<String, Value>, names: &[&str]) -> Option<&'a Value> {
    names
        .iter()
        .filter_map(|name| body.get(*name))
        .find(|value| !value.is_null())
}

/// Parse a response body, tolerating markdown fences and prose around the
/// JSON object.
pub fn parse_body(text: &str) -> Result<Value, CoreError> {
    if let Ok(value) = serde_json::from_str(text.trim()) {
        return Ok(value);
    }

    let unfenced = text.replace("```json", "").replace("```", "");
    let start = unfenced.find('{');
    let end = unfenced.rfind('}');
    match (start, end) {
        (Some(start), Some(end)) if start < end => serde_json::from_str(&unfenced[start..=end])
            .map_err(|e| CoreError::InvalidResponse(e.to_string())),
        _ => Err(CoreError::InvalidResponse(
            "response does not contain a JSON object".to_string(),
        )),
    }
}

impl TryFrom<Value> for GenerationResult {
    type Error = CoreError;

    fn try_from(body: Value) -> Result<Self, Self::Error> {
        let Value::Object(body) = body else {
            return Err(CoreError::InvalidResponse(
                "expected a JSON object".to_string(),
            ));
        };

        let recipes = match first_field(&body, RECIPES_FIELDS) {
            Some(Value::Array(items)) => items
                .iter()
                .cloned()
                .filter_map(normalize_recipe)
                .map(|mut recipe| {
                    recipe.is_favorite = false;
                    recipe
                })
                .collect(),
            _ => Vec::new(),
        };

        let icv_score = first_field(&body, ICV_FIELDS)
            .and_then(|value| match value {
                Value::Object(detail) => detail.get("score").and_then(Value::as_f64),
                other => other.as_f64(),
            })
            .filter(|score| score.is_finite());

        let follow_up_question = first_field(&body, FOLLOW_UP_FIELDS)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|question| !question.is_empty())
            .map(str::to_string);

        Ok(GenerationResult {
            recipes,
            follow_up_question,
            icv_score,
        })
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::domain::recipe::entities::Recipe;

    use super::*;

    #[test]
    fn test_maps_canonical_response() {
        let result = GenerationResult::try_from(json!({
            "recipes": [{
                "title": "Arroz com Ovo",
                "timeMinutes": 15,
                "ingredients": [{"name": "ovo"}, {"name": "arroz"}],
                "steps": ["misturar", "fritar"]
            }]
        }))
        .unwrap();

        let mut expected = Recipe::new("Arroz com Ovo");
        expected.time_minutes = Some(15);
        expected.ingredients = vec!["ovo".into(), "arroz".into()];
        expected.steps = vec!["misturar".into(), "fritar".into()];
        assert_eq!(result.recipes, vec![expected]);
        assert_eq!(result.follow_up_question, None);
        assert_eq!(result.icv_score, None);
    }

    #[test]
    fn test_maps_legacy_response() {
        let result = GenerationResult::try_from(json!({
            "receitas": [
                {"nome": "Omelete", "ingredientes": ["ovo"], "modo_preparo": ["bater", 3], "favorita": true},
                {"tempo_minutos": 10}
            ],
            "icv": {"score": 71.5},
            "pergunta": " Quer algo doce? "
        }))
        .unwrap();

        assert_eq!(result.recipes.len(), 1);
        assert_eq!(result.recipes[0].steps, vec!["bater"]);
        assert!(!result.recipes[0].is_favorite);
        assert_eq!(result.icv_score, Some(71.5));
        assert_eq!(result.follow_up_question.as_deref(), Some("Quer algo doce?"));
    }

    #[test]
    fn test_missing_recipes_default_empty() {
        let result = GenerationResult::try_from(json!({"icvScore": 90})).unwrap();
        assert!(result.recipes.is_empty());
        assert_eq!(result.icv_score, Some(90.0));
    }

    #[test]
    fn test_non_object_is_invalid() {
        assert!(matches!(
            GenerationResult::try_from(json!([1, 2])),
            Err(CoreError::InvalidResponse(_))
        ));
    }

    #[test]
    fn test_parse_body_strips_fences() {
        let body = "Aqui está:\n```json\n{\"recipes\": []}\n```";
        assert_eq!(parse_body(body).unwrap(), json!({"recipes": []}));
        assert!(matches!(
            parse_body("sem json"),
            Err(CoreError::InvalidResponse(_))
        ));
    }
}
