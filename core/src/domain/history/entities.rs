use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::domain::{
    common::{generate_timestamped_id, now_millis},
    recipe::{
        entities::Recipe,
        normalizer::{positive_minutes, string_list},
    },
};

use super::value_objects::MAX_SUMMARIES;

/// One past generation request: what was selected and what came back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub id: String,
    #[serde(alias = "created_at")]
    pub created_at: i64,
    #[serde(default, alias = "alimentos", deserialize_with = "lenient_strings")]
    pub ingredients: Vec<String>,
    #[serde(
        default,
        alias = "receitasResumo",
        alias = "receitas",
        deserialize_with = "lenient_summaries"
    )]
    pub recipe_summaries: Vec<RecipeSummary>,
}

fn lenient_strings<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(string_list(&value, &[]))
}

/// Summaries written by older versions carry whole recipes with loosely
/// typed fields; unreadable items are skipped rather than failing the entry.
fn lenient_summaries<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Vec<RecipeSummary>, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(value
        .as_array()
        .map(|items| items.iter().filter_map(RecipeSummary::from_value).collect())
        .unwrap_or_default())
}

impl HistoryEntry {
    pub fn new(ingredients: Vec<String>, recipes: &[Recipe]) -> Self {
        Self {
            id: generate_timestamped_id(),
            created_at: now_millis(),
            ingredients,
            recipe_summaries: recipes
                .iter()
                .take(MAX_SUMMARIES)
                .map(RecipeSummary::from)
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeSummary {
    #[serde(alias = "nome")]
    pub name: String,
    #[serde(
        default,
        alias = "tempo_minutos",
        skip_serializing_if = "Option::is_none"
    )]
    pub time_minutes: Option<u32>,
}

const SUMMARY_NAME_FIELDS: &[&str] = &["name", "nome", "title"];
const SUMMARY_TIME_FIELDS: &[&str] = &["timeMinutes", "tempo_minutos", "time_minutes"];

impl RecipeSummary {
    fn from_value(value: &Value) -> Option<Self> {
        let item = value.as_object()?;
        let field = |names: &[&str]| {
            names
                .iter()
                .filter_map(|name| item.get(*name))
                .find(|value| !value.is_null())
        };

        let name = field(SUMMARY_NAME_FIELDS)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|name| !name.is_empty())?;

        Some(Self {
            name: name.to_string(),
            time_minutes: field(SUMMARY_TIME_FIELDS).and_then(positive_minutes),
        })
    }
}

impl From<&Recipe> for RecipeSummary {
    fn from(recipe: &Recipe) -> Self {
        Self {
            name: recipe.name.clone(),
            time_minutes: recipe.time_minutes,
        }
    }
}

/// Contents of the one-shot restore slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RestoreRequest {
    #[serde(default, alias = "alimentos")]
    pub ingredients: Vec<String>,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_new_entry_keeps_top_summaries() {
        let recipes: Vec<Recipe> = (0..12).map(|i| Recipe::new(format!("Receita {i}"))).collect();
        let entry = HistoryEntry::new(vec!["ovo".into()], &recipes);

        assert_eq!(entry.recipe_summaries.len(), MAX_SUMMARIES);
        assert_eq!(entry.recipe_summaries[0].name, "Receita 0");
        assert!(entry.created_at > 0);
        assert!(entry.id.contains('-'));
    }

    #[test]
    fn test_legacy_entry_shape() {
        let entry: HistoryEntry = serde_json::from_value(json!({
            "id": "1700000000000-abc",
            "createdAt": 1_700_000_000_000_i64,
            "alimentos": ["ovo", "arroz"],
            "receitas": [{"nome": "Arroz com Ovo", "tempo_minutos": 15, "modo_preparo": []}]
        }))
        .unwrap();

        assert_eq!(entry.ingredients, vec!["ovo", "arroz"]);
        assert_eq!(entry.recipe_summaries[0].name, "Arroz com Ovo");
        assert_eq!(entry.recipe_summaries[0].time_minutes, Some(15));
    }

    #[test]
    fn test_loose_summary_fields_keep_the_entry() {
        let entry: HistoryEntry = serde_json::from_value(json!({
            "id": "1-a",
            "createdAt": 1,
            "alimentos": ["ovo", 7, "arroz"],
            "receitas": [
                {"nome": "Omelete", "tempo_minutos": 12.5},
                {"nome": "Arroz", "tempo_minutos": "20"},
                {"tempo_minutos": 5},
                "Bolo"
            ]
        }))
        .unwrap();

        assert_eq!(entry.ingredients, vec!["ovo", "arroz"]);
        assert_eq!(
            entry.recipe_summaries,
            vec![
                RecipeSummary {
                    name: "Omelete".into(),
                    time_minutes: Some(13),
                },
                RecipeSummary {
                    name: "Arroz".into(),
                    time_minutes: Some(20),
                },
            ]
        );
    }

    #[test]
    fn test_serializes_camel_case() {
        let entry = HistoryEntry {
            id: "1-a".into(),
            created_at: 1,
            ingredients: vec![],
            recipe_summaries: vec![RecipeSummary {
                name: "Omelete".into(),
                time_minutes: Some(10),
            }],
        };
        let value = serde_json::to_value(&entry).unwrap();
        assert_eq!(value["createdAt"], 1);
        assert_eq!(value["recipeSummaries"][0]["timeMinutes"], 10);
    }
}
