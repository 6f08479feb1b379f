use anyhow::{Context, bail};
use larder_core::{
    application::LarderService,
    domain::{
        analytics::{
            entities::AnalyticsEventName, ports::AnalyticsService, value_objects::FlushOutcome,
        },
        common::entities::app_errors::CoreError,
        generation::{
            ports::GenerationService,
            value_objects::{GenerateRecipesInput, GenerationOptions},
        },
        history::ports::HistoryService,
        notifier::{Notifier, Subscription, Topic},
        recipe::{
            entities::Recipe, helpers::format_for_sharing, ports::SavedRecipeService,
            value_objects::RecipeFilter,
        },
    },
};
use serde_json::{Map, Value, json};
use tracing::{debug, info, warn};

use crate::args::{AnalyticsCommand, Command, HistoryCommand, SavedCommand, SessionCommand};

/// Log every change notification so cross-surface updates are visible at
/// debug level.
fn watch_changes(notifier: &Notifier) -> Vec<Subscription> {
    [Topic::SavedRecipesChanged, Topic::HistoryChanged]
        .into_iter()
        .map(|topic| notifier.subscribe(topic, move || debug!(%topic, "collection changed")))
        .collect()
}

fn print_json(value: &impl serde::Serialize) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn parse_props(props: &[String]) -> anyhow::Result<Option<Map<String, Value>>> {
    let mut map = Map::new();
    for prop in props {
        let Some((key, value)) = prop.split_once('=') else {
            bail!("property {prop:?} is not in key=value form");
        };
        let value = serde_json::from_str(value).unwrap_or_else(|_| Value::String(value.to_string()));
        map.insert(key.trim().to_string(), value);
    }
    Ok((!map.is_empty()).then_some(map))
}

pub async fn run(service: &LarderService, command: Command) -> anyhow::Result<()> {
    let _subscriptions = watch_changes(service.notifier());

    match command {
        Command::Generate {
            ingredients,
            max_minutes,
            utensils,
        } => generate(service, ingredients, max_minutes, utensils).await,
        Command::Saved { action } => saved(service, action).await,
        Command::History { action } => history(service, action).await,
        Command::Analytics { action } => analytics(service, action).await,
        Command::Session { action } => session(service, action).await,
    }
}

async fn generate(
    service: &LarderService,
    mut ingredients: Vec<String>,
    max_minutes: Option<u32>,
    utensils: Vec<String>,
) -> anyhow::Result<()> {
    let mut restored = None;
    if ingredients.is_empty() {
        match service.take_restore().await? {
            Some(restore) => {
                info!(ingredients = ?restore.ingredients, "using restored selection");
                ingredients = restore.ingredients.clone();
                restored = Some(restore.ingredients);
            }
            None => return Err(CoreError::EmptySelection.into()),
        }
    }

    let defaults = service.settings().generation_defaults.clone();
    let options = GenerationOptions {
        max_minutes: max_minutes.unwrap_or(defaults.max_minutes),
        utensils: if utensils.is_empty() {
            defaults.utensils.clone()
        } else {
            utensils
        },
        ..defaults
    };

    let result = service
        .generate_recipes(GenerateRecipesInput {
            ingredients,
            options: Some(options),
        })
        .await;

    if let (Err(_), Some(ingredients)) = (&result, restored) {
        if let Err(e) = service.stage_restore_ingredients(ingredients).await {
            warn!(error = %e, "failed to put restored selection back");
        }
    }

    let outcome = match result {
        Ok(outcome) => outcome,
        Err(e) if e.is_generation_failure() => {
            return Err(anyhow::Error::new(e).context("could not generate recipes"));
        }
        Err(e) => return Err(e.into()),
    };

    for recipe in &outcome.recipes {
        println!("{}\n", format_for_sharing(recipe));
    }
    if let Some(score) = outcome.icv_score {
        println!("ICV: {score:.0}");
    }
    if let Some(question) = outcome.follow_up_question {
        println!("{question}");
    }
    Ok(())
}

async fn saved(service: &LarderService, action: SavedCommand) -> anyhow::Result<()> {
    match action {
        SavedCommand::List { favorites } => {
            let filter = if favorites {
                RecipeFilter::favorites()
            } else {
                RecipeFilter::default()
            };
            print_json(&service.list_recipes(filter).await?)
        }
        SavedCommand::Show { name } => {
            let recipe = service
                .find_recipe(&name)
                .await?
                .with_context(|| format!("no saved recipe named {name:?}"))?;
            service
                .track(
                    AnalyticsEventName::RecipeOpen,
                    Some(Map::from_iter([("name".to_string(), json!(recipe.name))])),
                )
                .await;
            println!("{}", format_for_sharing(&recipe));
            Ok(())
        }
        SavedCommand::Add {
            name,
            time,
            ingredients,
            steps,
        } => {
            let recipe = Recipe {
                time_minutes: time.filter(|t| *t > 0),
                ingredients,
                steps,
                ..Recipe::new(name.trim())
            };
            if service.add_recipe(recipe).await? {
                println!("saved {name}");
            } else {
                println!("{name} is already saved");
            }
            Ok(())
        }
        SavedCommand::Remove { names } => {
            let removed = service.remove_recipes(&names).await?;
            println!("removed {removed}");
            Ok(())
        }
        SavedCommand::Favorite { name } => {
            match service.toggle_favorite(&name).await? {
                Some(true) => println!("{name} is now a favorite"),
                Some(false) => println!("{name} is no longer a favorite"),
                None => bail!("no saved recipe named {name:?}"),
            }
            Ok(())
        }
    }
}

async fn history(service: &LarderService, action: HistoryCommand) -> anyhow::Result<()> {
    match action {
        HistoryCommand::List => print_json(&service.list_history().await?),
        HistoryCommand::Remove { id } => Ok(service.remove_history_entry(&id).await?),
        HistoryCommand::Clear => Ok(service.clear_history().await?),
        HistoryCommand::Restore { id } => {
            let entry = service
                .get_history_entry(&id)
                .await?
                .with_context(|| format!("no history entry {id:?}"))?;
            service.stage_restore(&entry).await?;
            println!("staged {} ingredients", entry.ingredients.len());
            Ok(())
        }
    }
}

async fn analytics(service: &LarderService, action: AnalyticsCommand) -> anyhow::Result<()> {
    match action {
        AnalyticsCommand::Track { event, props } => {
            let name: AnalyticsEventName = event.parse().map_err(anyhow::Error::msg)?;
            service.track(name, parse_props(&props)?).await;
            Ok(())
        }
        AnalyticsCommand::Flush => {
            match service.flush().await {
                FlushOutcome::Disabled => println!("analytics is disabled"),
                FlushOutcome::Empty => println!("nothing to send"),
                FlushOutcome::Delivered(n) => println!("delivered {n} events"),
                FlushOutcome::Retained(n) => println!("delivery failed, {n} events kept"),
                FlushOutcome::Unavailable => println!("queue could not be read"),
            }
            Ok(())
        }
        AnalyticsCommand::Pending => print_json(&service.pending_events().await?),
        AnalyticsCommand::ResetSession => Ok(service.reset_session().await?),
    }
}

async fn session(service: &LarderService, action: SessionCommand) -> anyhow::Result<()> {
    match action {
        SessionCommand::Start => {
            service.start_session().await;
            println!("{}", service.session_id().await?);
        }
        SessionCommand::End { duration_ms } => {
            service.end_session(duration_ms).await;
            service.flush().await;
        }
    }
    Ok(())
}
