use anyhow::Context;
use rl_app::cli;
use rl_app::config_loader;
use rl_app::driver;
use rl_app::tracing_setup;
use rl_http::GatedClient;
use tokio_util::sync::CancellationToken;
use tracing::debug;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _guard = tracing_setup::init_with_stdout("rl_driver", "logs", tracing::Level::INFO);

    let config = config_loader::load_driver_config_or_default(&cli::config_path("driver.toml"));
    config.validate().context("invalid driver configuration")?;

    let client = GatedClient::builder()
        .base_url(config.base_url.clone())
        .rate_limit(config.requests_per_second)
        .build()
        .context("failed to build gated client")?;

    let cancel = CancellationToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("Shutdown signal received");
                cancel.cancel();
            }
        });
    }

    info!(
        "Sending {} requests to {}{} at {}/s with parallelism {}",
        config.total_requests, config.base_url, config.request_path, config.requests_per_second, config.max_parallelism
    );

    let path = config.request_path.clone();
    let report = driver::run_batch(config.total_requests, config.max_parallelism, &cancel, |index| {
        let path = path.clone();
        let cancel = cancel.clone();
        let client = &client;
        async move {
            let response = client.get(&path, &cancel).await?;
            debug!("Request {index} -> {}", response.status());
            Ok::<(), rl_http::HttpError>(())
        }
    })
    .await
    .context("batch did not complete")?;

    info!("Sent {} requests in {:.0?}", report.completed, report.elapsed);

    Ok(())
}
