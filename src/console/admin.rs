//! Admin console: deal management through the deal API.

use clap::Subcommand;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

use super::client::DealsClient;
use crate::{
  entity::deal,
  model::{DealPatch, NewDeal},
  prelude::*,
};

#[derive(Debug, Subcommand)]
pub enum Action {
  /// List every deal, drafts included
  List,
  /// Save a new deal as a draft
  Create {
    #[arg(long)]
    title: String,
    /// Destination link
    #[arg(long)]
    url: String,
    #[arg(long)]
    code: Option<String>,
    #[arg(long)]
    subtitle: Option<String>,
  },
  /// Change some fields of a deal
  Edit {
    id: String,
    #[arg(long)]
    title: Option<String>,
    #[arg(long)]
    url: Option<String>,
    #[arg(long, conflicts_with = "clear_code")]
    code: Option<String>,
    #[arg(long)]
    clear_code: bool,
    #[arg(long, conflicts_with = "clear_subtitle")]
    subtitle: Option<String>,
    #[arg(long)]
    clear_subtitle: bool,
  },
  /// Show a deal on the public listing
  Publish { id: String },
  /// Hide a deal from the public listing
  Unpublish { id: String },
  /// Delete a deal for good
  Delete {
    id: String,
    /// Skip the confirmation prompt
    #[arg(long, short)]
    yes: bool,
  },
}

/// `Some(None)` when asked to clear, `Some(value)` when a value was given.
fn edit(value: Option<String>, clear: bool) -> Option<Option<String>> {
  if clear { Some(None) } else { value.map(Some) }
}

pub fn describe(deal: &deal::Model) -> String {
  let mut out = format!("{}\n  {}", deal.title, deal.deal_url);
  if let Some(code) = &deal.coupon_code {
    out.push_str(&format!("\n  Coupon: {code}"));
  }
  if let Some(subtitle) = &deal.subtitle {
    out.push_str(&format!("\n  {subtitle}"));
  }
  let status = if deal.published { "Published" } else { "Draft" };
  out.push_str(&format!("\n  Status: {status} · id {}", deal.id));
  out
}

async fn confirm(question: &str) -> anyhow::Result<bool> {
  let mut stdout = tokio::io::stdout();
  stdout.write_all(format!("{question} [y/N] ").as_bytes()).await?;
  stdout.flush().await?;

  let mut answer = String::new();
  BufReader::new(tokio::io::stdin()).read_line(&mut answer).await?;
  Ok(matches!(answer.trim(), "y" | "Y" | "yes"))
}

pub async fn run(client: &DealsClient, action: Action) -> anyhow::Result<()> {
  match action {
    Action::List => {
      let deals = client.list(false).await.context("Failed to load deals")?;
      if deals.is_empty() {
        println!("No deals yet.");
      }
      for deal in &deals {
        println!("{}", describe(deal));
      }
    }
    Action::Create { title, url, code, subtitle } => {
      let new = NewDeal { title, deal_url: url, coupon_code: code, subtitle };
      let deal = client.create(&new).await.context("Create failed")?;
      println!("Saved as draft:\n{}", describe(&deal));
    }
    Action::Edit { id, title, url, code, clear_code, subtitle, clear_subtitle } => {
      let patch = DealPatch {
        title,
        deal_url: url,
        coupon_code: edit(code, clear_code),
        subtitle: edit(subtitle, clear_subtitle),
        published: None,
      };
      let deal = client.update(&id, &patch).await.context("Update failed")?;
      println!("{}", describe(&deal));
    }
    Action::Publish { id } => {
      let deal = client
        .update(&id, &DealPatch::published(true))
        .await
        .context("Publish failed")?;
      println!("{}", describe(&deal));
    }
    Action::Unpublish { id } => {
      let deal = client
        .update(&id, &DealPatch::published(false))
        .await
        .context("Unpublish failed")?;
      println!("{}", describe(&deal));
    }
    Action::Delete { id, yes } => {
      if !yes && !confirm("Delete this deal?").await? {
        println!("Kept {id}.");
        return Ok(());
      }
      client.delete(&id).await.context("Delete failed")?;
      println!("Deleted {id}.");
    }
  }

  Ok(())
}
