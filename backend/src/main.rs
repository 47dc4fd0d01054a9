//! Standalone health server, for deployments that probe the bot host
//! separately from the bot process.

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    dotenvy::dotenv().ok();

    let port = backend::port_from_env(std::env::var("PORT").ok().as_deref());
    backend::serve(port).await?;
    Ok(())
}
