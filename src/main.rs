use anyhow::Result;
use pitchsync::channel::WsChannel;
use pitchsync::config::{apply_env_overrides, load_config, PitchsyncConfig};
use pitchsync::dispatch::Session;
use tracing::info;

const CONFIG_VAR: &str = "PITCHSYNC_CONFIG";

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing subscriber
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pitchsync=info".into()),
        )
        .init();

    info!("Pitchsync starting...");

    let config_path = std::env::args()
        .nth(1)
        .or_else(|| std::env::var(CONFIG_VAR).ok());

    let mut config = match config_path {
        Some(path) => {
            info!(path = %path, "Loading configuration");
            load_config(&path)?
        }
        None => {
            info!("No config file given, using defaults");
            PitchsyncConfig::default()
        }
    };
    apply_env_overrides(&mut config);

    let mut channel = WsChannel::connect(&config.channel).await?;
    let mut session = Session::new(&config);

    let metrics = session.run(&mut channel).await;
    info!(
        total_events = metrics.total_events,
        event_rate = metrics.event_rate,
        "Pitchsync stopped"
    );

    Ok(())
}
