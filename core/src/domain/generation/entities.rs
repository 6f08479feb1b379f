use std::fmt;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::domain::{history::entities::HistoryEntry, recipe::entities::Recipe};

/// Regions whose seasons run opposite to the northern calendar.
const SOUTHERN_REGIONS: &[&str] = &["BR", "AR", "CL", "UY", "PY", "BO", "PE", "ZA", "AU", "NZ"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Season {
    Summer,
    Autumn,
    Winter,
    Spring,
}

impl Season {
    /// Meteorological season for `date` in `region` (ISO 3166 alpha-2).
    pub fn infer(region: &str, date: NaiveDate) -> Self {
        let northern = match date.month() {
            12 | 1 | 2 => Season::Winter,
            3..=5 => Season::Spring,
            6..=8 => Season::Summer,
            _ => Season::Autumn,
        };

        let southern = SOUTHERN_REGIONS
            .iter()
            .any(|code| code.eq_ignore_ascii_case(region.trim()));
        if southern {
            northern.opposite()
        } else {
            northern
        }
    }

    pub fn opposite(self) -> Self {
        match self {
            Season::Summer => Season::Winter,
            Season::Autumn => Season::Spring,
            Season::Winter => Season::Summer,
            Season::Spring => Season::Autumn,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Season::Summer => "summer",
            Season::Autumn => "autumn",
            Season::Winter => "winter",
            Season::Spring => "spring",
        }
    }
}

impl fmt::Display for Season {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Body sent to the generation endpoint.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenerationRequest {
    pub ingredients: Vec<String>,
    pub context: GenerationContext,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationContext {
    pub locale: String,
    pub region: String,
    pub season: Season,
    pub max_minutes: u32,
    pub utensils: Vec<String>,
}

/// What the generation endpoint returned, already in canonical shape.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct GenerationResult {
    pub recipes: Vec<Recipe>,
    pub follow_up_question: Option<String>,
    pub icv_score: Option<f64>,
}

/// A completed generation as seen by the caller: the fresh recipes plus the
/// history entry recorded for them, if recording succeeded.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationOutcome {
    pub recipes: Vec<Recipe>,
    pub follow_up_question: Option<String>,
    pub icv_score: Option<f64>,
    pub history_entry: Option<HistoryEntry>,
}
