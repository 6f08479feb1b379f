use serde::{Deserialize, Serialize};

use super::normalizer::recipe_key;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recipe {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_minutes: Option<u32>,
    #[serde(default)]
    pub ingredients: Vec<String>,
    #[serde(default)]
    pub steps: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nutrition: Option<Nutrition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icv: Option<Icv>,
    #[serde(default)]
    pub is_favorite: bool,
}

impl Recipe {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            time_minutes: None,
            ingredients: Vec::new(),
            steps: Vec::new(),
            nutrition: None,
            icv: None,
            is_favorite: false,
        }
    }

    /// Identity used for equality and deduplication.
    pub fn key(&self) -> String {
        recipe_key(&self.name)
    }

    /// The nutri-score as a plain number, whichever shape it was stored in.
    pub fn icv_score(&self) -> Option<f64> {
        self.icv.as_ref().and_then(Icv::score)
    }
}

/// Nutri-score as produced by the different server generations: either a
/// bare number or an object carrying a `score`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Icv {
    Score(f64),
    Detailed {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        score: Option<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        label: Option<String>,
    },
}

impl Icv {
    pub fn score(&self) -> Option<f64> {
        let score = match self {
            Icv::Score(score) => Some(*score),
            Icv::Detailed { score, .. } => *score,
        };
        score.filter(|s| s.is_finite())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Nutrition {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub macros: Option<Macros>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub micros: Option<Micros>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Macros {
    #[serde(default, alias = "proteina_g", skip_serializing_if = "Option::is_none")]
    pub protein_g: Option<f64>,
    #[serde(default, alias = "carboidrato_g", skip_serializing_if = "Option::is_none")]
    pub carb_g: Option<f64>,
    #[serde(default, alias = "gordura_g", skip_serializing_if = "Option::is_none")]
    pub fat_g: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Micros {
    #[serde(default, alias = "fibras_g", skip_serializing_if = "Option::is_none")]
    pub fiber_g: Option<f64>,
    #[serde(default, alias = "ferro_mg", skip_serializing_if = "Option::is_none")]
    pub iron_mg: Option<f64>,
    #[serde(default, alias = "calcio_mg", skip_serializing_if = "Option::is_none")]
    pub calcium_mg: Option<f64>,
    #[serde(
        default,
        rename = "vitaminA_mcg",
        alias = "vitamina_a_mcg",
        skip_serializing_if = "Option::is_none"
    )]
    pub vitamin_a_mcg: Option<f64>,
    #[serde(
        default,
        rename = "vitaminC_mg",
        alias = "vitamina_c_mg",
        skip_serializing_if = "Option::is_none"
    )]
    pub vitamin_c_mg: Option<f64>,
}
