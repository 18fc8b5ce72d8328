use recordstore::{web, StoreConfig};
use tracing::{error, info};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    info!("recordstore starting...");

    let config = match StoreConfig::from_env() {
        Ok(c) => c,
        Err(e) => {
            error!("Failed to load configuration: {:#}", e);
            std::process::exit(1);
        }
    };

    let store = config.build_store();

    if let Err(e) = web::run_web_server(&config.web_addr, store).await {
        error!("Web server error: {:#}", e);
        std::process::exit(1);
    }
}
