//! AWS Signature Version 4 for the Product Advertising API.

use std::collections::BTreeMap;

use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};

use crate::catalog::Timestamp;

const ALGORITHM: &str = "AWS4-HMAC-SHA256";

/// Lower-cased header names mapped to their values, sorted by name.
pub type Headers = BTreeMap<String, String>;

pub struct Signer<'a> {
  pub access_key: &'a str,
  pub secret_key: &'a str,
  pub region: &'a str,
  pub service: &'a str,
}

fn hmac(key: &[u8], data: &str) -> Vec<u8> {
  let mut mac = Hmac::<Sha256>::new_from_slice(key)
    .expect("HMAC accepts keys of any length");
  mac.update(data.as_bytes());
  mac.finalize().into_bytes().to_vec()
}

fn sha256_hex(data: &[u8]) -> String {
  hex::encode(Sha256::digest(data))
}

impl Signer<'_> {
  fn signing_key(&self, date: &str) -> Vec<u8> {
    let key = hmac(format!("AWS4{}", self.secret_key).as_bytes(), date);
    let key = hmac(&key, self.region);
    let key = hmac(&key, self.service);
    hmac(&key, "aws4_request")
  }

  /// Adds `x-amz-date` and `authorization` to `headers`. Every header
  /// already present is signed. Requests carry no query string.
  pub fn sign(
    &self,
    method: &str,
    path: &str,
    headers: &mut Headers,
    body: &[u8],
    at: Timestamp,
  ) {
    let amz_date = at.format("%Y%m%dT%H%M%SZ").to_string();
    let date = at.format("%Y%m%d").to_string();
    headers.insert("x-amz-date".into(), amz_date.clone());

    let canonical_headers: String = headers
      .iter()
      .map(|(name, value)| format!("{name}:{}\n", value.trim()))
      .collect();
    let signed_headers =
      headers.keys().map(String::as_str).collect::<Vec<_>>().join(";");

    let canonical_request = format!(
      "{method}\n{path}\n\n{canonical_headers}\n{signed_headers}\n{}",
      sha256_hex(body)
    );

    let scope =
      format!("{date}/{}/{}/aws4_request", self.region, self.service);
    let string_to_sign = format!(
      "{ALGORITHM}\n{amz_date}\n{scope}\n{}",
      sha256_hex(canonical_request.as_bytes())
    );

    let signature =
      hex::encode(hmac(&self.signing_key(&date), &string_to_sign));

    headers.insert(
      "authorization".into(),
      format!(
        "{ALGORITHM} Credential={}/{scope}, SignedHeaders={signed_headers}, \
         Signature={signature}",
        self.access_key
      ),
    );
  }
}
