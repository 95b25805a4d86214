use std::net::SocketAddr;

use clap::Parser;
use tracing_subscriber::{prelude::*, EnvFilter};

use tabbycat_server::{app_with_state, commands::Command, config::read_config, state::AppState};


#[derive(Parser)]
#[command(version, about = "Debate tournament tab server")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    let config = read_config();

    let filter = EnvFilter::try_new(&config.logging_config).unwrap_or_else(|e| {
        eprintln!("Warning: Invalid logging config: {}", e);
        EnvFilter::new("info")
    });
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let state = AppState::new(&config).await?;

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => {
            let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
            tracing::info!("Listening on {}", addr);
            axum::Server::bind(&addr)
                .serve(app_with_state(state).await.into_make_service())
                .await?;
        },
        command => command.run(state).await?,
    }

    Ok(())
}
