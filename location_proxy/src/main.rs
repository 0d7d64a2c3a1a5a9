use location_kit::Config;

#[tokio::main]
async fn main() -> Result<(), location_proxy::Error> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Config::from_env()?;
    log::debug!("{config:?}");

    location_proxy::run(&config).await
}
