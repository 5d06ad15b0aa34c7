use chrono::FixedOffset;

use crate::catalog::Timestamp;

/// Short preview of a secret for logs: first and last four characters.
pub fn mask(secret: Option<&str>) -> String {
  match secret {
    None | Some("") => "(missing)".to_string(),
    Some(s) => {
      let chars: Vec<char> = s.chars().collect();
      let head: String = chars.iter().take(4).collect();
      let tail: String = chars[chars.len().saturating_sub(4)..].iter().collect();
      format!("{head}...{tail}")
    }
  }
}

/// Formats a date as `dd/mm/yyyy` in Brazil time.
pub fn format_date(date: Option<Timestamp>) -> String {
  // America/Sao_Paulo has no DST since 2019
  let brt = FixedOffset::west_opt(3 * 3600);

  match (date, brt) {
    (Some(date), Some(brt)) => {
      date.with_timezone(&brt).format("%d/%m/%Y").to_string()
    }
    _ => "—".to_string(),
  }
}

/// Prefixes `https://` unless the link already carries an http(s) scheme.
pub fn normalize_url(url: &str) -> String {
  let url = url.trim();
  let has_scheme = ["http://", "https://"].iter().any(|scheme| {
    url
      .get(..scheme.len())
      .is_some_and(|prefix| prefix.eq_ignore_ascii_case(scheme))
  });

  if has_scheme { url.to_string() } else { format!("https://{url}") }
}

pub fn escape_html(text: &str) -> String {
  let mut out = String::with_capacity(text.len());
  for ch in text.chars() {
    match ch {
      '&' => out.push_str("&amp;"),
      '<' => out.push_str("&lt;"),
      '>' => out.push_str("&gt;"),
      '"' => out.push_str("&quot;"),
      '\'' => out.push_str("&#39;"),
      _ => out.push(ch),
    }
  }
  out
}
