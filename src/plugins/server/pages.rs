//! Server-rendered HTML for the public catalog and the admin overview.

use std::{fmt::Write, sync::Arc};

use axum::{
  extract::{Query, State},
  response::Html,
};
use serde::Deserialize;

use crate::{
  catalog::{self, Filters, Offer, Sort, Store, StoreFilter, UsageCounts},
  entity::deal,
  prelude::*,
  state::AppState,
  utils::escape_html as esc,
};

const STYLE: &str = "body{font-family:system-ui,sans-serif;max-width:72rem;\
                     margin:0 auto;padding:1rem}article,li{border:1px solid \
                     #ddd;border-radius:1rem;padding:1rem;margin:.5rem 0}\
                     code{letter-spacing:.1em}small{color:#666}";

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Source {
  /// Merge offers from the product search API
  pub external: bool,
}

fn page(title: &str, body: &str) -> Html<String> {
  Html(format!(
    "<!doctype html><html lang=\"pt-BR\"><head><meta charset=\"utf-8\">\
     <title>{}</title><style>{STYLE}</style></head><body>{body}</body></html>",
    esc(title)
  ))
}

fn selected(yes: bool) -> &'static str {
  if yes { " selected" } else { "" }
}

fn controls(filters: &Filters) -> String {
  let mut html = format!(
    "<form method=\"get\"><input name=\"q\" value=\"{}\" \
     placeholder=\"Buscar cupom, loja, tag...\"><select name=\"store\">\
     <option value=\"all\"{}>Todas</option>",
    esc(&filters.query),
    selected(filters.store == StoreFilter::All)
  );

  for store in Store::ALL {
    let _ = write!(
      html,
      "<option{}>{}</option>",
      selected(filters.store == StoreFilter::Only(store)),
      esc(store.label())
    );
  }

  let sorts = [
    (Sort::Recent, "recent", "Mais recentes"),
    (Sort::Popular, "popular", "Mais usados"),
    (Sort::Expiring, "expiring", "Vencendo antes"),
  ];
  html.push_str("</select><select name=\"sort\">");
  for (sort, value, label) in sorts {
    let _ = write!(
      html,
      "<option value=\"{value}\"{}>{label}</option>",
      selected(filters.sort == sort)
    );
  }
  html.push_str("</select><button>Atualizar</button></form>");
  html
}

fn card(offer: &Offer) -> String {
  let tag = offer.tags.first().map_or("Cupom", String::as_str);
  let description = offer
    .description
    .as_deref()
    .map(|d| format!("<p>{}</p>", esc(d)))
    .unwrap_or_default();
  let code = if offer.has_code() {
    format!("<code>{}</code>", esc(&offer.code))
  } else {
    "Oferta sem código".to_string()
  };

  format!(
    "<article><h3>{}</h3><small>{} · {}</small>{description}<p>{code} \
     <a href=\"{}\" target=\"_blank\" rel=\"noopener noreferrer\">Ver oferta\
     </a></p><small>Verificado {} • Usos: {} · Expira: {}</small></article>",
    esc(&offer.title),
    esc(offer.store.label()),
    esc(tag),
    esc(&utils::normalize_url(&offer.url)),
    utils::format_date(offer.verified_at),
    offer.uses,
    utils::format_date(offer.expires_at),
  )
}

pub async fn catalog(
  State(app): State<Arc<AppState>>,
  Query(filters): Query<Filters>,
  Query(source): Query<Source>,
) -> Html<String> {
  let deals = async {
    app
      .sv()
      .deal
      .list(true)
      .await
      .inspect_err(|err| warn!("Falling back to seed offers: {err}"))
      .ok()
  };
  let external = async {
    if source.external { app.paapi.search(None).await } else { Vec::new() }
  };
  let (deals, external) = tokio::join!(deals, external);

  let mut offers = catalog::live_or_seed(deals);
  offers.extend(external);

  // usage counters belong to the visitor, the server only knows base counts
  let data = catalog::view(&offers, &UsageCounts::default(), &filters);

  let mut body = format!("<h1>CupomHub</h1>{}", controls(&filters));
  for offer in &data {
    body.push_str(&card(offer));
  }
  if data.is_empty() {
    body.push_str("<p>Nenhuma oferta encontrada.</p>");
  }

  page("CupomHub", &body)
}

fn admin_row(deal: &deal::Model) -> String {
  let code = deal
    .coupon_code
    .as_deref()
    .map(|c| format!("<div>Coupon: {}</div>", esc(c)))
    .unwrap_or_default();
  let subtitle = deal
    .subtitle
    .as_deref()
    .map(|s| format!("<div>{}</div>", esc(s)))
    .unwrap_or_default();

  format!(
    "<li><strong>{}</strong><div><small>{}</small></div>{code}{subtitle}\
     <small>Status: {} · id {}</small></li>",
    esc(&deal.title),
    esc(&deal.deal_url),
    if deal.published { "Published" } else { "Draft" },
    esc(&deal.id),
  )
}

pub async fn admin(State(app): State<Arc<AppState>>) -> Result<Html<String>> {
  let deals = app.sv().deal.list(false).await?;

  let mut body = format!("<h1>Admin – Deals</h1><p>{} deals</p><ul>", deals.len());
  for deal in &deals {
    body.push_str(&admin_row(deal));
  }
  body.push_str("</ul>");

  Ok(page("Admin – Deals", &body))
}
