use std::path::PathBuf;
use std::time::Duration;

use clap::{ArgAction, Parser, Subcommand};
use larder_core::domain::common::{
    AnalyticsConfig, DeviceInfo, GenerationConfig, LarderConfig, StorageConfig,
};

#[derive(Debug, Clone, Parser)]
#[command(name = "larder", version, about = "Saved recipes, search history and telemetry for Larder")]
pub struct Args {
    #[command(flatten)]
    pub storage: StorageArgs,

    #[command(flatten)]
    pub generation: GenerationArgs,

    #[command(flatten)]
    pub analytics: AnalyticsArgs,

    #[command(flatten)]
    pub device: DeviceArgs,

    /// Emit logs as JSON lines
    #[arg(long, env = "LARDER_LOG_JSON", global = true)]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, clap::Args)]
pub struct StorageArgs {
    #[arg(long, env = "LARDER_DATA_DIR", default_value = ".larder", global = true)]
    pub data_dir: PathBuf,
}

#[derive(Debug, Clone, clap::Args)]
pub struct GenerationArgs {
    #[arg(long, env = "LARDER_GENERATION_URL", default_value = "", global = true)]
    pub generation_url: String,

    #[arg(long, env = "LARDER_GENERATION_TIMEOUT_SECS", default_value_t = 30, global = true)]
    pub generation_timeout_secs: u64,

    #[arg(long, env = "LARDER_LOCALE", default_value = "pt-BR", global = true)]
    pub locale: String,

    /// ISO 3166 alpha-2 code, used to infer the season
    #[arg(long, env = "LARDER_REGION", default_value = "BR", global = true)]
    pub region: String,

    #[arg(long, env = "LARDER_MAX_MINUTES", default_value_t = 30, global = true)]
    pub default_max_minutes: u32,

    /// Comma-separated utensils sent with every generation
    #[arg(long = "utensils", env = "LARDER_UTENSILS", value_delimiter = ',', global = true)]
    pub default_utensils: Vec<String>,
}

#[derive(Debug, Clone, clap::Args)]
pub struct AnalyticsArgs {
    #[arg(long, env = "LARDER_ANALYTICS_URL", default_value = "", global = true)]
    pub analytics_url: String,

    #[arg(
        long,
        env = "LARDER_ANALYTICS_ENABLED",
        default_value_t = true,
        action = ArgAction::Set,
        global = true
    )]
    pub analytics_enabled: bool,

    /// Seconds to wait for the analytics endpoint before keeping the queue
    #[arg(
        long,
        env = "LARDER_ANALYTICS_TIMEOUT_SECS",
        default_value_t = 10,
        global = true
    )]
    pub analytics_timeout_secs: u64,
}

#[derive(Debug, Clone, clap::Args)]
pub struct DeviceArgs {
    #[arg(long, env = "LARDER_APP_VERSION", global = true)]
    pub app_version: Option<String>,

    #[arg(long, env = "LARDER_DEVICE_MODEL", global = true)]
    pub device_model: Option<String>,

    #[arg(long, env = "LARDER_OS_VERSION", global = true)]
    pub os_version: Option<String>,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Generate recipes from the given ingredients, or from a staged history
    /// restore when none are given
    Generate {
        ingredients: Vec<String>,

        #[arg(long)]
        max_minutes: Option<u32>,

        #[arg(long = "utensil")]
        utensils: Vec<String>,
    },

    /// Saved and favorite recipes
    Saved {
        #[command(subcommand)]
        action: SavedCommand,
    },

    /// Past generations
    History {
        #[command(subcommand)]
        action: HistoryCommand,
    },

    /// Local telemetry queue
    Analytics {
        #[command(subcommand)]
        action: AnalyticsCommand,
    },

    Session {
        #[command(subcommand)]
        action: SessionCommand,
    },
}

#[derive(Debug, Clone, Subcommand)]
pub enum SavedCommand {
    List {
        #[arg(long)]
        favorites: bool,
    },
    /// Print a recipe ready for sharing
    Show { name: String },
    Add {
        name: String,

        #[arg(long)]
        time: Option<u32>,

        #[arg(long = "ingredient")]
        ingredients: Vec<String>,

        #[arg(long = "step")]
        steps: Vec<String>,
    },
    Remove {
        #[arg(required = true)]
        names: Vec<String>,
    },
    /// Toggle the favorite flag
    Favorite { name: String },
}

#[derive(Debug, Clone, Subcommand)]
pub enum HistoryCommand {
    List,
    Remove { id: String },
    Clear,
    /// Stage an entry's ingredients for the next `generate`
    Restore { id: String },
}

#[derive(Debug, Clone, Subcommand)]
pub enum AnalyticsCommand {
    Track {
        event: String,

        /// `key=value`; values that parse as JSON are sent as JSON
        #[arg(long = "prop")]
        props: Vec<String>,
    },
    Flush,
    Pending,
    ResetSession,
}

#[derive(Debug, Clone, Subcommand)]
pub enum SessionCommand {
    Start,
    End {
        #[arg(long)]
        duration_ms: u64,
    },
}

impl From<&Args> for LarderConfig {
    fn from(args: &Args) -> Self {
        Self {
            storage: StorageConfig {
                data_dir: args.storage.data_dir.clone(),
            },
            generation: GenerationConfig {
                endpoint: args.generation.generation_url.clone(),
                timeout: Duration::from_secs(args.generation.generation_timeout_secs),
                locale: args.generation.locale.clone(),
                region: args.generation.region.clone(),
                max_minutes: args.generation.default_max_minutes,
                utensils: args.generation.default_utensils.clone(),
            },
            analytics: AnalyticsConfig {
                endpoint: args.analytics.analytics_url.clone(),
                enabled: args.analytics.analytics_enabled,
                timeout: Duration::from_secs(args.analytics.analytics_timeout_secs),
            },
            device: DeviceInfo {
                app_version: args.device.app_version.clone(),
                device_model: args.device.device_model.clone(),
                os_version: args.device.os_version.clone(),
                ..DeviceInfo::default()
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_into_config() {
        let args = Args::try_parse_from([
            "larder",
            "--data-dir",
            "/tmp/larder",
            "--region",
            "PT",
            "--utensils",
            "forno,airfryer",
            "--analytics-enabled",
            "false",
            "saved",
            "list",
            "--favorites",
        ])
        .unwrap();

        let config = LarderConfig::from(&args);
        assert_eq!(config.storage.data_dir, PathBuf::from("/tmp/larder"));
        assert_eq!(config.generation.region, "PT");
        assert_eq!(config.generation.utensils, vec!["forno", "airfryer"]);
        assert_eq!(config.generation.timeout, Duration::from_secs(30));
        assert!(!config.analytics.enabled);
        assert!(matches!(
            args.command,
            Command::Saved {
                action: SavedCommand::List { favorites: true }
            }
        ));
    }

    #[test]
    fn test_generate_flags() {
        let args = Args::try_parse_from([
            "larder", "generate", "ovo", "arroz", "--max-minutes", "15", "--utensil", "panela",
        ])
        .unwrap();

        match args.command {
            Command::Generate {
                ingredients,
                max_minutes,
                utensils,
            } => {
                assert_eq!(ingredients, vec!["ovo", "arroz"]);
                assert_eq!(max_minutes, Some(15));
                assert_eq!(utensils, vec!["panela"]);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
