use super::{entities::Recipe, value_objects::IcvBand};

/// Average unit price, in BRL, for common pantry items.
const REFERENCE_PRICES: &[(&str, f64)] = &[
    ("arroz", 1.5),
    ("feijão", 1.8),
    ("ovo", 1.2),
    ("frango", 4.5),
    ("carne moída", 5.5),
    ("batata", 1.0),
    ("cenoura", 0.8),
    ("cebola", 0.6),
    ("alho", 0.4),
    ("tomate", 1.2),
    ("abobrinha", 1.3),
    ("banana", 0.7),
    ("mandioca", 1.6),
    ("abóbora", 1.4),
];

const UNKNOWN_ITEM_PRICE: f64 = 1.0;

const SHARE_SIGNATURE: &str =
    "Feito no app U - Mais rápido que delivery. Mais saudável. Mais Barato";

/// Rough cost of a recipe: each ingredient is priced by the first reference
/// item its name contains, or at a flat rate when none matches.
pub fn estimated_cost(ingredients: &[String]) -> f64 {
    ingredients
        .iter()
        .map(|ingredient| {
            let lower = ingredient.to_lowercase();
            REFERENCE_PRICES
                .iter()
                .find(|(item, _)| lower.contains(item))
                .map(|(_, price)| *price)
                .unwrap_or(UNKNOWN_ITEM_PRICE)
        })
        .sum()
}

/// Plain-text rendering of a recipe for the share sheet.
pub fn format_for_sharing(recipe: &Recipe) -> String {
    let mut lines = vec![format!("🍳 {}", recipe.name)];

    if let Some(minutes) = recipe.time_minutes {
        lines.push(format!("⏱ {minutes} min"));
    }
    if let Some(score) = recipe.icv_score() {
        lines.push(format!("{} {}/100", IcvBand::from_score(score).label(), score.round()));
    }
    if !recipe.ingredients.is_empty() {
        lines.push(format!("💰 R$ {:.2}", estimated_cost(&recipe.ingredients)));
    }
    lines.push(String::new());

    if !recipe.ingredients.is_empty() {
        lines.push("Ingredientes:".to_string());
        lines.extend(recipe.ingredients.iter().map(|i| format!("• {i}")));
        lines.push(String::new());
    }
    if !recipe.steps.is_empty() {
        lines.push("Modo de preparo:".to_string());
        lines.extend(
            recipe
                .steps
                .iter()
                .enumerate()
                .map(|(n, step)| format!("{}. {step}", n + 1)),
        );
        lines.push(String::new());
    }

    lines.push(SHARE_SIGNATURE.to_string());
    lines.join("\n")
}
