use cotacao::cli::{self, CliOptions};
use cotacao::client::RateClient;
use cotacao::config::ClientConfig;
use log::{error, info};

#[tokio::main(flavor = "current_thread")] // single request, no concurrency
async fn main() -> anyhow::Result<()> {
    let matches = cli::build_cli("cotacao-client", "Fetch the USD-BRL quote and save it").get_matches();
    let opts = CliOptions::from_matches(&matches);

    cli::init_logging(opts.log_level.as_deref());

    if opts.version {
        println!("cotacao-client {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    let cfg = ClientConfig::from_env().map_err(anyhow::Error::msg)?;
    let client = RateClient::new(cfg)?;
    match client.run().await {
        Ok(_) => {
            info!(
                "exchange rate successfully saved in {}",
                client.output_path().display()
            );
            Ok(())
        }
        Err(e) => {
            error!("Error fetching exchange rate: {}", e);
            std::process::exit(1);
        }
    }
}
