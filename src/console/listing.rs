//! Client side of the public listing.

use std::sync::{
  Arc,
  atomic::{AtomicU64, Ordering},
};

use tokio::sync::RwLock;

use super::client::DealsClient;
use crate::{
  catalog::{self, Offer, seed},
  entity::deal,
  prelude::*,
};

/// Where the listing gets its offers from.
#[async_trait]
pub trait OfferSource: Send + Sync {
  async fn published_deals(&self) -> anyhow::Result<Vec<deal::Model>>;

  async fn external_offers(&self) -> anyhow::Result<Vec<Offer>>;
}

#[async_trait]
impl OfferSource for DealsClient {
  async fn published_deals(&self) -> anyhow::Result<Vec<deal::Model>> {
    self.list(true).await
  }

  async fn external_offers(&self) -> anyhow::Result<Vec<Offer>> {
    self.coupons(None).await
  }
}

/// The loaded offers. Every load takes a ticket and only the newest ticket
/// may replace the offers, so a slow stale response never wins.
pub struct Listing<S> {
  source: S,
  external: bool,
  generation: AtomicU64,
  offers: RwLock<Arc<Vec<Offer>>>,
}

impl<S: OfferSource> Listing<S> {
  /// Starts out with the seed offers until the first load lands.
  pub fn new(source: S, external: bool) -> Self {
    Self {
      source,
      external,
      generation: AtomicU64::new(0),
      offers: RwLock::new(Arc::new(seed::offers(Utc::now()))),
    }
  }

  async fn load_external(&self) -> Vec<Offer> {
    if !self.external {
      return Vec::new();
    }
    self.source.external_offers().await.unwrap_or_else(|err| {
      warn!("External offers unavailable: {err:#}");
      Vec::new()
    })
  }

  /// Reloads deals and external offers. Returns `false` when a newer load
  /// started in the meantime and this result was dropped.
  pub async fn refresh(&self) -> bool {
    let ticket = self.generation.fetch_add(1, Ordering::SeqCst) + 1;

    let deals = async {
      self
        .source
        .published_deals()
        .await
        .inspect_err(|err| warn!("Falling back to seed offers: {err:#}"))
        .ok()
    };
    let (deals, external) = tokio::join!(deals, self.load_external());

    let mut offers = catalog::live_or_seed(deals);
    offers.extend(external);

    let mut current = self.offers.write().await;
    if self.generation.load(Ordering::SeqCst) != ticket {
      debug!("Dropping stale load #{ticket}");
      return false;
    }

    *current = Arc::new(offers);
    true
  }

  pub async fn offers(&self) -> Arc<Vec<Offer>> {
    self.offers.read().await.clone()
  }

  pub async fn find(&self, id: &str) -> Option<Offer> {
    self.offers().await.iter().find(|offer| offer.id == id).cloned()
  }
}
