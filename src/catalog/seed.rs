//! Static offers shown when live deals cannot be loaded.

use chrono::NaiveDate;

use super::{Offer, Store, Timestamp};

fn day(year: i32, month: u32, day: u32) -> Option<Timestamp> {
  NaiveDate::from_ymd_opt(year, month, day)
    .and_then(|date| date.and_hms_opt(0, 0, 0))
    .map(|date| date.and_utc())
}

fn tags(tags: &[&str]) -> Vec<String> {
  tags.iter().map(|tag| tag.to_string()).collect()
}

pub fn offers(now: Timestamp) -> Vec<Offer> {
  vec![
    Offer {
      id: "nike-10off".into(),
      store: Store::Nike,
      title: "10% OFF em itens selecionados".into(),
      code: "NIKE10".into(),
      description: Some(
        "Válido em produtos selecionados. Veja regras no site.".into(),
      ),
      url: "https://www.nike.com/br".into(),
      expires_at: day(2025, 9, 30),
      verified_at: Some(now),
      tags: tags(&["Seleção", "Outlet"]),
      uses: 124,
    },
    Offer {
      id: "adidas-frete-gratis".into(),
      store: Store::Adidas,
      title: "Frete grátis acima de R$299".into(),
      code: String::new(),
      description: Some("Aplicado automaticamente no checkout.".into()),
      url: "https://www.adidas.com.br".into(),
      expires_at: None,
      verified_at: Some(now),
      tags: tags(&["Frete grátis"]),
      uses: 342,
    },
    Offer {
      id: "ishop-iphone-5off".into(),
      store: Store::IShop,
      title: "5% OFF à vista em iPhone selecionado".into(),
      code: "ISHOP5".into(),
      description: None,
      url: "https://www.ishop.com.br".into(),
      expires_at: day(2025, 10, 15),
      verified_at: Some(now),
      tags: tags(&["Apple", "iPhone"]),
      uses: 67,
    },
    Offer {
      id: "insider-15off".into(),
      store: Store::InsiderStore,
      title: "15% OFF na primeira compra".into(),
      code: "INSIDER15".into(),
      description: None,
      url: "https://www.insiderstore.com.br".into(),
      expires_at: day(2025, 12, 31),
      verified_at: Some(now),
      tags: tags(&["Primeira compra"]),
      uses: 201,
    },
  ]
}
