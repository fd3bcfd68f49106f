use std::net::SocketAddr;

// This main function is the entry point when running `cargo run -p web-server`.
// It loads the default policy (plus TALLY__* overrides) and serves on port 3000.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let _guard = configuration::init_tracing(None)?;

    let config = configuration::load_config(None)?;
    let addr = SocketAddr::from(([0, 0, 0, 0], 3000));
    web_server::run_server(addr, &config).await
}
