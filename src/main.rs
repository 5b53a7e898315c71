use finsight::app::{AppServices, install};
use finsight::config::{ClientConfig, load_dotenv};
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("finsight=info"));
    // the UI runtime may already have installed a subscriber
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

fn main() -> anyhow::Result<()> {
    load_dotenv();
    init_tracing();

    if cfg!(not(any(feature = "web", feature = "desktop", feature = "mobile"))) {
        anyhow::bail!("built without a renderer; run with `--features desktop` (or web, mobile)");
    }

    let config = ClientConfig::from_env()?;
    tracing::info!(api_base = %config.api_base, "starting finsight");
    install(AppServices::from_config(config)?)?;

    dioxus::launch(finsight::ui::App);
    Ok(())
}
