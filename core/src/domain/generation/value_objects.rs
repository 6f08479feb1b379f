use crate::domain::common::{DEFAULT_MAX_MINUTES, GenerationConfig};

/// Per-request knobs sent in the generation context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationOptions {
    pub locale: String,
    pub region: String,
    pub max_minutes: u32,
    pub utensils: Vec<String>,
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            locale: "pt-BR".to_string(),
            region: "BR".to_string(),
            max_minutes: DEFAULT_MAX_MINUTES,
            utensils: Vec::new(),
        }
    }
}

impl From<&GenerationConfig> for GenerationOptions {
    fn from(config: &GenerationConfig) -> Self {
        Self {
            locale: config.locale.clone(),
            region: config.region.clone(),
            max_minutes: config.max_minutes,
            utensils: config.utensils.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct GenerateRecipesInput {
    pub ingredients: Vec<String>,
    /// Falls back to the service's configured defaults.
    pub options: Option<GenerationOptions>,
}

/// Ordered set of selected ingredients: trimmed, lower-cased, no blanks and
/// no repeats.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct IngredientSelection {
    items: Vec<String>,
}

impl IngredientSelection {
    pub fn new() -> Self {
        Self::default()
    }

    fn normalize(item: &str) -> Option<String> {
        let item = item.trim().to_lowercase();
        (!item.is_empty()).then_some(item)
    }

    /// Returns whether the ingredient was added.
    pub fn add(&mut self, item: &str) -> bool {
        match Self::normalize(item) {
            Some(item) if !self.items.contains(&item) => {
                self.items.push(item);
                true
            }
            _ => false,
        }
    }

    /// Returns whether the ingredient was present.
    pub fn remove(&mut self, item: &str) -> bool {
        let Some(item) = Self::normalize(item) else {
            return false;
        };
        let before = self.items.len();
        self.items.retain(|existing| *existing != item);
        self.items.len() != before
    }

    /// Add when absent, remove when present. Returns whether it is now selected.
    pub fn toggle(&mut self, item: &str) -> bool {
        if self.remove(item) {
            false
        } else {
            self.add(item)
        }
    }

    pub fn contains(&self, item: &str) -> bool {
        Self::normalize(item).is_some_and(|item| self.items.contains(&item))
    }

    pub fn as_slice(&self) -> &[String] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn into_vec(self) -> Vec<String> {
        self.items
    }
}

impl<S: AsRef<str>> FromIterator<S> for IngredientSelection {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut selection = Self::new();
        for item in iter {
            selection.add(item.as_ref());
        }
        selection
    }
}
