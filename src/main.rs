use color_eyre::eyre::{Result, WrapErr};
use dotenv::dotenv;
use rosterdesk_api::config::ApiConfig;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    dotenv().ok();

    let config = ApiConfig::from_env().wrap_err("invalid server configuration")?;
    rosterdesk_api::start_server(config).await
}
