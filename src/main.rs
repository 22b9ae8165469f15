use log::error;

#[tokio::main]
async fn main() {
    env_logger::init();

    let config = storefront_lib::config::Config::new()
        .expect("Failed to load service configuration. Please check your 'config' folder");

    if let Err(why) = storefront_lib::start_server(config).await {
        error!("server error: {}", why);
        std::process::exit(1);
    }
}
