pub mod server;

use std::sync::Arc;

use tokio::task::JoinSet;

use crate::{prelude::*, state::AppState};

/// A long-running service sharing the application state.
#[async_trait]
pub trait Plugin: Send + Sync {
  fn name(&self) -> &'static str {
    std::any::type_name::<Self>()
  }

  async fn start(&self, app: Arc<AppState>) -> anyhow::Result<()>;
}

/// Runs every registered plugin and restarts the ones that stop.
pub struct App {
  plugins: Vec<Arc<dyn Plugin>>,
}

impl App {
  pub fn new() -> Self {
    Self { plugins: Vec::new() }
  }

  pub fn register<P: Plugin + 'static>(mut self, plugin: P) -> Self {
    self.plugins.push(Arc::new(plugin));
    self
  }

  /// Dropping the returned set shuts every plugin down.
  pub fn run(self, app: Arc<AppState>) -> JoinSet<()> {
    let mut set = JoinSet::new();

    for plugin in self.plugins {
      let app = app.clone();

      set.spawn(async move {
        let name = plugin.name();
        info!("SYSTEM: Service `{name}` initialized");

        loop {
          let app = app.clone();
          let plugin = plugin.clone();

          let handle = tokio::spawn(async move { plugin.start(app).await });

          match handle.await {
            Ok(Ok(())) => warn!("Service `{name}` stopped unexpectedly (Ok)."),
            Ok(Err(err)) => error!("Service `{name}` crashed with error: {err:#}."),
            Err(join_err) if join_err.is_cancelled() => {
              info!("Service `{name}` shutdown.");
              break;
            }
            Err(_) => error!("Service `{name}` PANICKED!"),
          }

          time::sleep(Duration::from_secs(5)).await;
          info!("SYSTEM: Restarting service `{name}`...");
        }
      });
    }

    set
  }
}
