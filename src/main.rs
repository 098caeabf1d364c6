use route_forge::config::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file if it exists
    dotenvy::dotenv().ok();

    // RUST_LOG overrides the default
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = AppConfig::load()?;
    log::info!(
        "Configuration loaded: server={}, history_limit={}, session_ttl={}s",
        config.server_address(),
        config.editor.history_limit,
        config.editor.session_ttl_secs
    );

    route_forge::run_server(config).await
}
