use std::sync::Arc;

use agent_curve::config::{setup_https_config, ServiceConfig};
use agent_curve::engine::{LogSink, MemoryStore, TradingEngine};
use agent_curve::handlers::{router, SharedEngine};
use anyhow::Result;
use dotenv::dotenv;
use log::info;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = ServiceConfig::from_env()?;
    let addr = config.socket_addr()?;

    let store = Arc::new(MemoryStore::new());
    let engine: SharedEngine = Arc::new(TradingEngine::new(store.clone(), store, Arc::new(LogSink)));
    let app = router(engine);

    match &config.certificate_dir {
        Some(cert_dir) => {
            let tls = setup_https_config(cert_dir).await?;
            info!("Listening on https://{}", addr);
            axum_server::tls_rustls::bind_rustls(addr, tls)
                .serve(app.into_make_service())
                .await?;
        }
        None => {
            info!("Listening on http://{}", addr);
            axum_server::bind(addr).serve(app.into_make_service()).await?;
        }
    }

    Ok(())
}
