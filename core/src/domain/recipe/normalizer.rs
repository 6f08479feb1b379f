//! Coercion of persisted or remote JSON into [`Recipe`] values.
//!
//! Nothing read from storage or from the network is trusted as-is: records
//! are classified into a [`StoredRecipe`], malformed entries are dropped,
//! collections default to empty and duplicates collapse onto the first
//! occurrence of their key.

use std::collections::HashSet;

use serde_json::{Map, Value};

use super::entities::{Icv, Nutrition, Recipe};

const NAME_FIELDS: &[&str] = &["name", "nome", "title"];
const TIME_FIELDS: &[&str] = &["timeMinutes", "tempo_minutos", "time_minutes"];
const INGREDIENT_FIELDS: &[&str] = &["ingredients", "ingredientes"];
const STEP_FIELDS: &[&str] = &["steps", "modo_preparo"];
const NUTRITION_FIELDS: &[&str] = &["nutrition", "nutricao"];
const FAVORITE_FIELDS: &[&str] = &["isFavorite", "favorita", "is_favorite"];
const ITEM_NAME_FIELDS: &[&str] = &["name", "nome"];

/// Lower-cased, trimmed name used as the deduplication key.
pub fn recipe_key(name: &str) -> String {
    name.trim().to_lowercase()
}

/// The shapes a recipe record has been stored or served in.
#[derive(Debug, Clone, PartialEq)]
pub enum StoredRecipe {
    /// Oldest format: the saved list held bare names.
    LegacyName(String),
    /// An object that does not deserialize as a canonical recipe: legacy
    /// field names, wrong types, `{name}` ingredient objects.
    Partial(PartialRecipe),
    Canonical(Recipe),
}

impl StoredRecipe {
    pub fn classify(value: Value) -> Option<Self> {
        match value {
            Value::String(name) => Some(StoredRecipe::LegacyName(name)),
            Value::Object(map) => match serde_json::from_value::<Recipe>(Value::Object(map.clone()))
            {
                Ok(recipe) => Some(StoredRecipe::Canonical(recipe)),
                Err(_) => Some(StoredRecipe::Partial(PartialRecipe(map))),
            },
            _ => None,
        }
    }

    pub fn into_recipe(self) -> Option<Recipe> {
        let recipe = match self {
            StoredRecipe::LegacyName(name) => Recipe::new(name),
            StoredRecipe::Partial(partial) => partial.into_recipe()?,
            StoredRecipe::Canonical(mut recipe) => {
                recipe.time_minutes = recipe.time_minutes.filter(|m| *m > 0);
                recipe
            }
        };

        if recipe.name.trim().is_empty() {
            return None;
        }
        Some(recipe)
    }
}

/// Field-by-field view over an untrusted recipe object.
#[derive(Debug, Clone, PartialEq)]
pub struct PartialRecipe(pub Map<String, Value>);

impl PartialRecipe {
    fn field(&self, names: &[&str]) -> Option<&Value> {
        names
            .iter()
            .filter_map(|name| self.0.get(*name))
            .find(|value| !value.is_null())
    }

    pub fn name(&self) -> Option<String> {
        self.field(NAME_FIELDS)
            .and_then(Value::as_str)
            .filter(|name| !name.trim().is_empty())
            .map(str::to_string)
    }

    pub fn into_recipe(self) -> Option<Recipe> {
        let name = self.name()?;

        Some(Recipe {
            name,
            time_minutes: self.field(TIME_FIELDS).and_then(positive_minutes),
            ingredients: self
                .field(INGREDIENT_FIELDS)
                .map(|v| string_list(v, ITEM_NAME_FIELDS))
                .unwrap_or_default(),
            steps: self
                .field(STEP_FIELDS)
                .map(|v| string_list(v, &[]))
                .unwrap_or_default(),
            nutrition: self
                .field(NUTRITION_FIELDS)
                .and_then(|v| serde_json::from_value::<Nutrition>(v.clone()).ok()),
            icv: self
                .field(&["icv"])
                .and_then(|v| serde_json::from_value::<Icv>(v.clone()).ok()),
            is_favorite: self.field(FAVORITE_FIELDS).is_some_and(truthy),
        })
    }
}

pub(crate) fn positive_minutes(value: &Value) -> Option<u32> {
    let minutes = match value {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite() && *f > 0.0).map(|f| f.round() as u64)),
        Value::String(s) => s.trim().parse::<u64>().ok(),
        _ => None,
    }?;

    u32::try_from(minutes).ok().filter(|m| *m > 0)
}

/// Strings from an array; object items contribute the first string found
/// under `object_fields`. Anything else is skipped.
pub(crate) fn string_list(value: &Value, object_fields: &[&str]) -> Vec<String> {
    let Some(items) = value.as_array() else {
        return Vec::new();
    };

    items
        .iter()
        .filter_map(|item| match item {
            Value::String(s) => Some(s.as_str()),
            Value::Object(map) => object_fields
                .iter()
                .find_map(|field| map.get(*field).and_then(Value::as_str)),
            _ => None,
        })
        .filter(|s| !s.trim().is_empty())
        .map(str::to_string)
        .collect()
}

fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

pub fn normalize_recipe(value: Value) -> Option<Recipe> {
    StoredRecipe::classify(value)?.into_recipe()
}

/// Keep the first recipe for every key, in order.
pub fn dedupe_by_key(recipes: Vec<Recipe>) -> Vec<Recipe> {
    let mut seen = HashSet::new();
    recipes
        .into_iter()
        .filter(|recipe| {
            let key = recipe.key();
            !key.is_empty() && seen.insert(key)
        })
        .collect()
}

/// Normalize a whole saved-recipes document. Anything but an array reads
/// as an empty collection.
pub fn normalize_saved(document: Value) -> Vec<Recipe> {
    let Value::Array(items) = document else {
        return Vec::new();
    };

    dedupe_by_key(items.into_iter().filter_map(normalize_recipe).collect())
}
