use anyhow::Context;
use cotacao::cli::{self, CliOptions};
use cotacao::config::ServerConfig;
use cotacao::service::{self, RateService};
use cotacao::store::RateStore;
use log::{error, info};
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let matches = cli::build_cli("cotacao-server", "USD-BRL quote service").get_matches();
    let opts = CliOptions::from_matches(&matches);

    cli::init_logging(opts.log_level.as_deref());

    if opts.version {
        println!("cotacao-server {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    let cfg = ServerConfig::from_env().map_err(anyhow::Error::msg)?;
    let store = Arc::new(
        RateStore::open(&cfg.db_path)
            .with_context(|| format!("opening database {}", cfg.db_path.display()))?,
    );
    let rate_service = Arc::new(RateService::new(&cfg, Arc::clone(&store))?);

    let listener = tokio::net::TcpListener::bind(cfg.listen_addr)
        .await
        .with_context(|| format!("binding {}", cfg.listen_addr))?;

    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("unable to listen for shutdown signal: {}", e);
            std::future::pending::<()>().await;
        }
        info!("shutdown requested");
    };
    service::serve(listener, rate_service, shutdown).await?;

    // Last owner: dropping it closes the connection.
    drop(store);
    info!("server stopped");
    Ok(())
}
