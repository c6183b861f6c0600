mod commands;
mod errors;
mod gateway;
mod state;
#[cfg(test)]
mod testing;

use clap::{Args, Parser, Subcommand};
use errors::{ErrorPolicy, ErrorSink};
use parley_channels::discord::DiscordChannel;
use parley_core::config::{self, DiscordConfig, TranslateConfig};
use parley_providers::google::GoogleTranslator;
use state::{store::spawn_writer, AppState, LocaleCatalog, SettingsStore};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

#[derive(Parser)]
#[command(
    name = "parley",
    version,
    about = "Per-member live translation for Discord"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to the settings file.
    #[arg(short, long, default_value = "settings.toml", global = true)]
    settings: String,

    #[command(flatten)]
    translate: TranslateArgs,
}

#[derive(Args)]
struct TranslateArgs {
    /// Google Cloud project that owns the Translation API.
    #[arg(long, env = "GOOGLE_CLOUD_PROJECT", global = true)]
    project: Option<String>,

    /// Translation API location.
    #[arg(long, default_value_t = config::default_location(), global = true)]
    location: String,

    /// Static OAuth access token. When unset, Application Default Credentials
    /// are used if present, otherwise the GCE metadata server.
    #[arg(long, env = "GOOGLE_ACCESS_TOKEN", hide_env_values = true, global = true)]
    access_token: Option<String>,

    /// Per-request timeout for translation calls, in seconds.
    #[arg(long, default_value_t = config::default_timeout_secs(), global = true)]
    timeout_secs: u64,
}

#[derive(Subcommand)]
enum Commands {
    /// Connect to Discord and start translating.
    Start {
        /// Discord bot token.
        #[arg(long, env = "DISCORD_TOKEN", hide_env_values = true)]
        discord_token: String,
    },
    /// Print the locales the translation provider supports.
    Locales,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Start { ref discord_token } => {
            // Settings decide the default log level, so they load before tracing starts.
            let settings = config::load(&cli.settings)?;
            init_tracing(settings.verbose);

            let translator = Arc::new(build_translator(&cli.translate)?);
            let catalog = LocaleCatalog::load(translator.as_ref()).await?;

            let (errors, reported) = ErrorSink::new(ErrorPolicy::from_settings(&settings));
            let (writes, writer) = spawn_writer(PathBuf::from(&cli.settings));
            let state = AppState::new(SettingsStore::new(settings, writes), catalog);

            let channel = Arc::new(DiscordChannel::new(DiscordConfig {
                token: discord_token.clone(),
            }));

            info!("Parley starting with settings from {}", cli.settings);
            let gw = gateway::Gateway::new(channel, translator, state, errors, reported, Some(writer));
            gw.run().await?;
        }
        Commands::Locales => {
            init_tracing(false);

            let translator = build_translator(&cli.translate)?;
            let catalog = LocaleCatalog::load(&translator).await?;
            for (code, name) in catalog.iter() {
                println!("{code}\t{name}");
            }
        }
    }

    Ok(())
}

/// `RUST_LOG` wins; otherwise `info` when verbose, `warn` when quiet.
fn init_tracing(verbose: bool) {
    let default = if verbose { "info" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default)),
        )
        .init();
}

fn build_translator(args: &TranslateArgs) -> anyhow::Result<GoogleTranslator> {
    let Some(project) = args.project.as_deref().filter(|p| !p.is_empty()) else {
        anyhow::bail!(
            "no Google Cloud project configured. \
             Pass --project or set GOOGLE_CLOUD_PROJECT."
        );
    };
    let config = TranslateConfig {
        location: args.location.clone(),
        access_token: args.access_token.clone(),
        timeout_secs: args.timeout_secs,
        ..TranslateConfig::new(project)
    };
    Ok(GoogleTranslator::from_config(&config)?)
}
