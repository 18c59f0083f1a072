mod api;
mod commands;
mod gateway;
mod provider_builder;
mod replies;
mod report;

#[cfg(test)]
mod testing;

use clap::{Parser, Subcommand};
use funil_channels::WhatsAppCloudChannel;
use funil_core::{
    catalog::Catalog,
    config::{self, Config},
    context::Context,
    traits::{Channel, Provider},
};
use funil_memory::Store;
use funil_providers::OpenAiProvider;
use std::collections::HashMap;
use std::sync::Arc;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(
    name = "funil",
    version,
    about = "Funil — WhatsApp sales assistant"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to config file.
    #[arg(short, long, default_value = "config.toml")]
    config: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the bot.
    Start,
    /// Check configuration and service availability.
    Status,
    /// Send a one-shot message to the completion service.
    Ask {
        /// The message to send.
        #[arg(trailing_var_arg = true)]
        message: Vec<String>,
    },
    /// Decrypt a report received from the bot.
    DecryptReport {
        /// Base64 report blob.
        blob: String,
    },
}

/// Stdout logging, plus a daily rolling file under `{data_dir}/logs` when
/// `to_file` is set. The returned guard must live as long as the process.
fn init_logging(cfg: &Config, to_file: bool) -> anyhow::Result<Option<WorkerGuard>> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cfg.bot.log_level));
    let stdout = tracing_subscriber::fmt::layer();

    if !to_file {
        tracing_subscriber::registry()
            .with(filter)
            .with(stdout)
            .init();
        return Ok(None);
    }

    let logs_dir = cfg.bot.logs_dir();
    std::fs::create_dir_all(&logs_dir)?;
    let (writer, guard) =
        tracing_appender::non_blocking(tracing_appender::rolling::daily(&logs_dir, "funil.log"));
    tracing_subscriber::registry()
        .with(filter)
        .with(stdout)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_ansi(false),
        )
        .init();
    Ok(Some(guard))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Secrets usually live in a .env next to the binary.
    dotenvy::dotenv().ok();
    let cfg = config::load(&cli.config)?;

    match cli.command {
        Commands::Start => {
            let _log_guard = init_logging(&cfg, true)?;

            let services = provider_builder::build_services(&cfg)?;

            let mut channels: HashMap<String, Arc<dyn Channel>> = HashMap::new();
            if let Some(ref wa) = cfg.channel.whatsapp {
                if wa.enabled {
                    if wa.access_token.is_empty() || wa.phone_number_id.is_empty() {
                        anyhow::bail!(
                            "WhatsApp is enabled but access_token or phone_number_id is empty. \
                             Set them in config.toml or the WHATSAPP_ACCESS_TOKEN / \
                             WHATSAPP_PHONE_NUMBER_ID env vars."
                        );
                    }
                    channels.insert(
                        "whatsapp".to_string(),
                        Arc::new(WhatsAppCloudChannel::new(wa.clone())),
                    );
                }
            }

            if channels.is_empty() {
                anyhow::bail!("No channels enabled. Enable at least one channel in config.toml.");
            }

            let store = Store::new(&cfg.funnel);
            let catalog = Catalog::load(&cfg.catalog.products);

            println!("Funil — Starting sales bot...");
            let gw = Arc::new(gateway::Gateway::new(
                services, channels, store, catalog, &cfg,
            ));
            gw.run().await?;
        }
        Commands::Status => {
            let _ = init_logging(&cfg, false)?;
            println!("Funil — Status Check\n");
            println!("Config: {}", cli.config);
            println!("Data dir: {}", cfg.bot.data_path().display());
            println!();

            let openai = OpenAiProvider::from_config(&cfg.provider.openai);
            println!(
                "  completion ({}): {}",
                cfg.provider.openai.model,
                if openai.is_available().await {
                    "available"
                } else if cfg.provider.openai.api_key.is_empty() {
                    "missing api key"
                } else {
                    "unreachable"
                }
            );
            let configured = |key: &str| if key.is_empty() { "missing key" } else { "configured" };
            println!("  huggingface: {}", configured(&cfg.provider.huggingface.api_token));
            println!("  vision: {}", configured(&cfg.provider.vision.api_key));
            println!("  speech: {}", configured(&cfg.provider.speech.api_key));
            println!();

            match cfg.channel.whatsapp {
                Some(ref wa) => println!(
                    "  whatsapp: {}",
                    if wa.enabled && !wa.access_token.is_empty() && !wa.phone_number_id.is_empty() {
                        "configured"
                    } else if wa.enabled {
                        "enabled but missing credentials"
                    } else {
                        "disabled"
                    }
                ),
                None => println!("  whatsapp: not configured"),
            }
            println!(
                "  api: {}",
                if cfg.api.enabled {
                    format!("{}:{}", cfg.api.host, cfg.api.port)
                } else {
                    "disabled".to_string()
                }
            );
            println!(
                "  report: {}",
                if !cfg.report.enabled {
                    "disabled"
                } else if cfg.report.secret.is_empty() || cfg.report.recipient.is_empty() {
                    "missing secret or recipient"
                } else {
                    "configured"
                }
            );
            println!(
                "  catalog: {} products",
                Catalog::load(&cfg.catalog.products).len()
            );
        }
        Commands::Ask { message } => {
            let _ = init_logging(&cfg, false)?;
            if message.is_empty() {
                anyhow::bail!("no message provided. Usage: funil ask <message>");
            }

            let prompt = message.join(" ");
            let provider = OpenAiProvider::from_config(&cfg.provider.openai);
            if cfg.provider.openai.api_key.is_empty() {
                anyhow::bail!("OPENAI_API_KEY is not set");
            }

            let context = Context {
                system_prompt: cfg.provider.openai.system_prompt.clone(),
                ..Context::new(&prompt)
            };
            let response = provider.complete(&context).await?;
            println!("{}", response.text);
        }
        Commands::DecryptReport { blob } => {
            if cfg.report.secret.is_empty() {
                anyhow::bail!("report secret is empty. Set report.secret or REPORT_SECRET.");
            }
            println!("{}", report::decrypt_report(&cfg.report.secret, &blob)?);
        }
    }

    Ok(())
}
