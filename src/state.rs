use std::env;

use migration::Migrator;

use crate::{paapi, prelude::*, sv};

#[derive(Debug, Clone)]
pub struct Config {
  pub port: u16,
  pub database_url: String,
  /// Shared secret for the admin gate, `None` locks the admin paths.
  pub admin_password: Option<String>,
  pub paapi: paapi::Config,
}

impl Default for Config {
  fn default() -> Self {
    Self {
      port: 3000,
      database_url: String::from("sqlite:cupomhub.db?mode=rwc"),
      admin_password: None,
      paapi: paapi::Config::default(),
    }
  }
}

/// Reads a variable, treating empty values as unset.
pub fn var(key: &str) -> Option<String> {
  env::var(key).ok().filter(|v| !v.trim().is_empty())
}

impl Config {
  pub fn from_env() -> Self {
    let default = Self::default();

    Self {
      port: var("PORT").and_then(|p| p.parse().ok()).unwrap_or(default.port),
      database_url: var("DATABASE_URL").unwrap_or(default.database_url),
      admin_password: var("ADMIN_PASSWORD"),
      paapi: paapi::Config::from_env(),
    }
  }
}

pub struct Services<'a> {
  pub deal: sv::Deal<'a>,
}

pub struct AppState {
  pub db: DatabaseConnection,
  pub config: Config,
  pub paapi: paapi::Client,
}

impl AppState {
  pub async fn new(config: Config) -> anyhow::Result<Self> {
    info!("Connecting to database...");
    let db = Database::connect(&config.database_url)
      .await
      .context("Failed to connect to database")?;

    info!("Running migrations...");
    Migrator::up(&db, None).await.context("Failed to run migrations")?;

    Ok(Self::with_db(db, config))
  }

  pub fn with_db(db: DatabaseConnection, config: Config) -> Self {
    if config.admin_password.is_none() {
      warn!("ADMIN_PASSWORD not set, admin paths will reject every request");
    }

    let paapi = paapi::Client::new(config.paapi.clone());
    Self { db, config, paapi }
  }

  pub fn sv(&self) -> Services<'_> {
    Services { deal: sv::Deal::new(&self.db) }
  }
}

#[cfg(test)]
pub(crate) mod tests {
  use super::*;

  pub async fn setup_test_db() -> DatabaseConnection {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    Migrator::up(&db, None).await.unwrap();
    db
  }

  pub async fn setup_test_app(admin_password: &str) -> AppState {
    let config = Config {
      admin_password: Some(admin_password.to_string()),
      ..Config::default()
    };
    AppState::with_db(setup_test_db().await, config)
  }
}
