use clap::Parser;
use jsonform::cli::Cli;
use jsonform::config::Settings;
use std::net::SocketAddr;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let settings = Settings::new_with_cli(&cli)?;

    // An unreadable schema stops the server before anything is served.
    let state = jsonform::build_state(&settings)?;
    info!(
        "Saving history to {}",
        settings.form.history_path.display()
    );

    let app = jsonform::create_app(state);

    let addr: SocketAddr = format!("{}:{}", settings.server.host, settings.server.port).parse()?;
    info!("Listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
