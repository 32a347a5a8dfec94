use std::path::PathBuf;
use std::sync::Arc;

use tokio::io::AsyncBufReadExt;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use easel_bot::config::BotConfig;
use easel_bot::console::{self, ConsoleSink};
use easel_bot::orchestrator::Orchestrator;
use easel_bot::sink::Trigger;
use easel_core::access::OriginScope;
use easel_core::lang::LanguageStore;
use easel_core::types::{CallerId, ChannelId, GuildId};
use easel_inference::api::QueueApi;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "easel_bot=info,easel_inference=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = Arc::new(BotConfig::from_env());
    tracing::info!(api_base_url = %config.api_base_url, "Loaded configuration");

    // --- Components ---
    let backend = Arc::new(QueueApi::new(config.api_base_url.clone()));
    let languages = Arc::new(LanguageStore::new(config.default_language));
    let sink = Arc::new(ConsoleSink::new(PathBuf::from("outputs")));
    let orchestrator = Orchestrator::new(backend, sink, config, languages);

    println!("easel console. Try: draw <prompt> | edit <file> <prompt> | status <job_id> | queue | system | language <code> | quit");

    // The console session is modeled as an unrestricted group scope so
    // an empty allow-list configuration permits local use (a direct
    // message would be denied by default).
    let origin = OriginScope::Guild(GuildId(0));

    // --- Input loop ---
    let mut lines = tokio::io::BufReader::new(tokio::io::stdin()).lines();
    let mut tasks = Vec::new();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line.eq_ignore_ascii_case("quit") || line.eq_ignore_ascii_case("exit") {
            break;
        }
        match console::parse_line(line) {
            Ok(command) => {
                tasks.push(orchestrator.spawn(Trigger {
                    origin,
                    channel: ChannelId(0),
                    caller: CallerId(0),
                    command,
                }));
            }
            Err(usage) => eprintln!("{usage}"),
        }
    }

    // Let in-flight jobs finish before exiting.
    let pending = tasks.iter().filter(|t| !t.is_finished()).count();
    if pending > 0 {
        tracing::info!(pending, "Waiting for in-flight requests");
    }
    for task in tasks {
        let _ = task.await;
    }

    Ok(())
}
