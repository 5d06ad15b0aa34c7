//! CupomHub - coupon and deal listing
//!
//! Architecture:
//! - SeaORM for the deals table (SQLite)
//! - Axum for the deal API, admin gate and HTML pages
//! - Product Advertising API as an optional offer source
//! - Clap for the admin console and listing clients

mod catalog;
mod console;
mod entity;
mod error;
mod model;
mod paapi;
mod plugins;
mod prelude;
mod state;
mod sv;
mod utils;

use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing_subscriber::{
  EnvFilter, layer::SubscriberExt, util::SubscriberInitExt,
};

use crate::{
  plugins::server,
  prelude::*,
  state::{AppState, Config},
};

#[derive(Debug, Parser)]
#[command(version, about = "Coupons and deals, with an admin console")]
struct Cli {
  #[command(subcommand)]
  command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
  /// Run the HTTP server
  Serve,
  /// Manage deals
  Admin(console::AdminArgs),
  /// Show the public listing
  Browse(console::BrowseArgs),
  /// Print an offer's code and count a use
  Copy(console::OfferArgs),
  /// Print an offer's link and count a use
  Visit(console::OfferArgs),
}

async fn serve() -> anyhow::Result<()> {
  let config = Config::from_env();
  info!("Starting CupomHub v{}", env!("CARGO_PKG_VERSION"));

  let app = Arc::new(AppState::new(config).await?);
  let _plugins = plugins::App::new().register(server::Plugin).run(app);

  tokio::signal::ctrl_c().await.context("Failed to listen for shutdown")?;
  info!("Shutting down");
  Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  dotenvy::dotenv().ok();
  let cli = Cli::parse();

  // clients keep stdout for their output
  let default_filter = match cli.command {
    Command::Serve => "cupomhub=debug,tower_http=debug,sea_orm=warn",
    _ => "cupomhub=warn",
  };
  tracing_subscriber::registry()
    .with(
      EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default_filter.into()),
    )
    .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
    .init();

  match cli.command {
    Command::Serve => serve().await,
    Command::Admin(args) => console::admin(args).await,
    Command::Browse(args) => console::browse(args).await,
    Command::Copy(args) => console::copy(args).await,
    Command::Visit(args) => console::visit(args).await,
  }
}
