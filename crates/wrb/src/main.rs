use std::sync::Arc;

use wrb_core::{
    activity::{ActivityFile, ActivityLog, TracingActivityLog},
    config::Config,
    dispatch::CommandDispatcher,
    roast::RoastGenerator,
};
use wrb_groq::GroqClient;
use wrb_market::{CoinGeckoClient, EtherscanClient};

#[tokio::main]
async fn main() -> Result<(), wrb_core::Error> {
    let cfg = Arc::new(Config::load()?);
    wrb_core::logging::init("wrb")?;

    let prices = Arc::new(CoinGeckoClient::new(cfg.coingecko_api_url.clone()));
    let balances = Arc::new(EtherscanClient::with_base_url(
        cfg.etherscan_api_key.clone(),
        cfg.etherscan_api_url.clone(),
    ));
    let groq = GroqClient::new(cfg.groq_api_key.clone())
        .with_model(cfg.groq_model.clone())
        .with_url(cfg.groq_api_url.clone());
    let roaster = RoastGenerator::new(Arc::new(groq), cfg.system_prompt.clone());

    let activity: Arc<dyn ActivityLog> = match &cfg.activity_log_path {
        Some(path) => {
            tracing::info!(path = %path.display(), "mirroring activity to file");
            Arc::new(TracingActivityLog::with_file(ActivityFile::new(
                path.clone(),
                cfg.activity_log_json,
            )))
        }
        None => Arc::new(TracingActivityLog::new()),
    };

    let dispatcher = Arc::new(CommandDispatcher::new(prices, balances, roaster, activity));

    wrb_telegram::router::run_polling(cfg, dispatcher)
        .await
        .map_err(|e| wrb_core::Error::External(format!("telegram bot failed: {e}")))?;

    Ok(())
}
