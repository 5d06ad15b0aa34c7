//! Command line clients: the admin console and the public listing.

pub mod admin;
pub mod client;
pub mod listing;

use std::path::PathBuf;

use clap::Args;

pub use self::client::DealsClient;
use self::listing::Listing;
use crate::{
  catalog::{self, Filters, Offer, Sort, StoreFilter, UsageStore},
  prelude::*,
};

#[derive(Debug, Args)]
pub struct Remote {
  /// Base url of the CupomHub server
  #[arg(long, env = "CUPOMHUB_URL", default_value = "http://localhost:3000")]
  pub server: String,
}

#[derive(Debug, Args)]
pub struct AdminArgs {
  #[command(flatten)]
  pub remote: Remote,
  /// Shared admin password
  #[arg(long, env = "ADMIN_PASSWORD", hide_env_values = true)]
  pub password: String,
  #[command(subcommand)]
  pub action: admin::Action,
}

#[derive(Debug, Args)]
pub struct ListingArgs {
  #[command(flatten)]
  pub remote: Remote,
  /// Also show offers from the product search API
  #[arg(long)]
  pub external: bool,
  /// Local usage counters
  #[arg(long, env = "CUPOMHUB_USAGE_FILE", default_value = "coupon-uses.json")]
  pub usage_file: PathBuf,
}

#[derive(Debug, Args)]
pub struct BrowseArgs {
  #[command(flatten)]
  pub listing: ListingArgs,
  /// Search in title, description, tags, store and code
  #[arg(short, long, default_value = "")]
  pub query: String,
  /// Store label, or `all`
  #[arg(long, default_value = "all")]
  pub store: StoreFilter,
  #[arg(long, value_enum, default_value_t)]
  pub sort: Sort,
}

#[derive(Debug, Args)]
pub struct OfferArgs {
  /// Offer id as shown by `browse`
  pub id: String,
  #[command(flatten)]
  pub listing: ListingArgs,
}

pub fn card(offer: &Offer) -> String {
  let tag = offer.tags.first().map_or("Cupom", String::as_str);
  let mut out = format!("{} [{}] ({tag})", offer.title, offer.store);

  if let Some(description) = &offer.description {
    out.push_str(&format!("\n  {description}"));
  }
  if offer.has_code() {
    out.push_str(&format!("\n  Código: {}", offer.code));
  } else {
    out.push_str("\n  Oferta sem código");
  }
  out.push_str(&format!(
    "\n  Verificado {} • Usos: {} · Expira: {}\n  id: {}",
    utils::format_date(offer.verified_at),
    offer.uses,
    utils::format_date(offer.expires_at),
    offer.id,
  ));
  out
}

async fn load(args: &ListingArgs) -> anyhow::Result<Listing<DealsClient>> {
  let client = DealsClient::new(&args.remote.server, None)?;
  let listing = Listing::new(client, args.external);
  listing.refresh().await;
  Ok(listing)
}

async fn find(args: &OfferArgs) -> anyhow::Result<Offer> {
  load(&args.listing)
    .await?
    .find(&args.id)
    .await
    .with_context(|| format!("No offer with id `{}`", args.id))
}

pub async fn browse(args: BrowseArgs) -> anyhow::Result<()> {
  let listing = load(&args.listing).await?;
  let usage = UsageStore::open(&args.listing.usage_file).await;

  let filters =
    Filters { query: args.query, store: args.store, sort: args.sort };
  let data = catalog::view(&listing.offers().await, usage.counts(), &filters);

  if data.is_empty() {
    println!("Nenhuma oferta encontrada.");
  }
  for offer in &data {
    println!("{}\n", card(offer));
  }
  Ok(())
}

/// Code of the offer, counted as a use. Offers without a code are left alone.
async fn take_code(args: &OfferArgs) -> anyhow::Result<String> {
  let offer = find(args).await?;
  if !offer.has_code() {
    anyhow::bail!("Offer `{}` has no code, use `visit` instead", offer.id);
  }

  UsageStore::open(&args.listing.usage_file).await.record(&offer.id).await?;
  Ok(offer.code)
}

/// Destination link of the offer, counted as a use.
async fn take_link(args: &OfferArgs) -> anyhow::Result<String> {
  let offer = find(args).await?;

  UsageStore::open(&args.listing.usage_file).await.record(&offer.id).await?;
  Ok(utils::normalize_url(&offer.url))
}

pub async fn copy(args: OfferArgs) -> anyhow::Result<()> {
  println!("{}", take_code(&args).await?);
  Ok(())
}

pub async fn visit(args: OfferArgs) -> anyhow::Result<()> {
  println!("{}", take_link(&args).await?);
  Ok(())
}

pub async fn admin(args: AdminArgs) -> anyhow::Result<()> {
  let client = DealsClient::new(&args.remote.server, Some(args.password))?;
  admin::run(&client, args.action).await
}
