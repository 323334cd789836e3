// Entry point for `cargo run -p web-server`. Loads settings, starts logging,
// and hands off to `run_server`.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = configuration::load_config()?;
    let _guard = configuration::init_tracing(&settings.logging, settings.application.environment)?;
    web_server::run_server(settings).await
}
