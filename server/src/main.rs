use clap::Parser;
use sitesmith_server::ServerConfig;

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    let config = ServerConfig::parse();
    log::info!("Sitesmith starting...");

    if let Err(e) = sitesmith_server::serve(config).await {
        log::error!("Server stopped: {}", e);
        std::process::exit(1);
    }
}
