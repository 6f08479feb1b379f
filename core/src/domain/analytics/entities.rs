use std::fmt;
use std::str::FromStr;

use chrono::{Local, Offset};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::domain::common::{DeviceInfo, generate_uuid_v7, now_millis};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalyticsEventName {
    AppOpen,
    SessionStart,
    SessionEnd,
    IngredientSearch,
    IngredientAdd,
    IngredientRemove,
    GenerateRecipesStart,
    GenerateRecipesSuccess,
    GenerateRecipesError,
    RecipeOpen,
    RecipeSave,
    FeedbackRecipe,
}

impl AnalyticsEventName {
    pub const ALL: [AnalyticsEventName; 12] = [
        AnalyticsEventName::AppOpen,
        AnalyticsEventName::SessionStart,
        AnalyticsEventName::SessionEnd,
        AnalyticsEventName::IngredientSearch,
        AnalyticsEventName::IngredientAdd,
        AnalyticsEventName::IngredientRemove,
        AnalyticsEventName::GenerateRecipesStart,
        AnalyticsEventName::GenerateRecipesSuccess,
        AnalyticsEventName::GenerateRecipesError,
        AnalyticsEventName::RecipeOpen,
        AnalyticsEventName::RecipeSave,
        AnalyticsEventName::FeedbackRecipe,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AnalyticsEventName::AppOpen => "app_open",
            AnalyticsEventName::SessionStart => "session_start",
            AnalyticsEventName::SessionEnd => "session_end",
            AnalyticsEventName::IngredientSearch => "ingredient_search",
            AnalyticsEventName::IngredientAdd => "ingredient_add",
            AnalyticsEventName::IngredientRemove => "ingredient_remove",
            AnalyticsEventName::GenerateRecipesStart => "generate_recipes_start",
            AnalyticsEventName::GenerateRecipesSuccess => "generate_recipes_success",
            AnalyticsEventName::GenerateRecipesError => "generate_recipes_error",
            AnalyticsEventName::RecipeOpen => "recipe_open",
            AnalyticsEventName::RecipeSave => "recipe_save",
            AnalyticsEventName::FeedbackRecipe => "feedback_recipe",
        }
    }
}

impl fmt::Display for AnalyticsEventName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AnalyticsEventName {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|name| name.as_str() == s)
            .ok_or_else(|| format!("unknown analytics event: {s}"))
    }
}

/// Device and locale facts captured when an event is created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventContext {
    pub platform: String,
    #[serde(default)]
    pub app_version: Option<String>,
    #[serde(default)]
    pub device_model: Option<String>,
    #[serde(default)]
    pub os_version: Option<String>,
    /// UTC minus local time, in minutes (positive west of Greenwich).
    #[serde(default, alias = "timezoneOffsetMin")]
    pub timezone_offset_minutes: i32,
}

impl EventContext {
    pub fn capture(device: &DeviceInfo) -> Self {
        let local_minus_utc = Local::now().offset().fix().local_minus_utc();

        Self {
            platform: device.platform.clone(),
            app_version: device.app_version.clone(),
            device_model: device.device_model.clone(),
            os_version: device.os_version.clone(),
            timezone_offset_minutes: -local_minus_utc / 60,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsEvent {
    pub id: String,
    pub name: AnalyticsEventName,
    #[serde(alias = "ts")]
    pub timestamp: i64,
    #[serde(default, alias = "props", skip_serializing_if = "Option::is_none")]
    pub properties: Option<Map<String, Value>>,
    pub context: EventContext,
    #[serde(default)]
    pub session_id: String,
}

impl AnalyticsEvent {
    pub fn new(
        name: AnalyticsEventName,
        properties: Option<Map<String, Value>>,
        context: EventContext,
        session_id: String,
    ) -> Self {
        Self {
            id: generate_uuid_v7().to_string(),
            name,
            timestamp: now_millis(),
            properties,
            context,
            session_id,
        }
    }
}
