//! Best-effort extraction of vehicle listings from the inventory page.
//!
//! The page structure is not stable, so the card heuristics here are
//! deliberately loose: any `div`/`article` whose class hints at a vehicle
//! card is considered, and a card only counts when its text mentions one of
//! the monitored model names. The rest of the bot depends solely on the
//! [`Extractor`] contract, never on these heuristics.

use crate::model::VehicleRecord;
use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use sha2::{Digest, Sha256};
use std::collections::HashSet;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";
/// Bound on the inventory fetch so a hung request cannot stall the loop.
const FETCH_TIMEOUT: Duration = Duration::from_secs(30);
const DETAILS_MAX_CHARS: usize = 200;
const CARD_CLASS_HINTS: &[&str] = &["vehicle", "car", "inventory", "product"];

static CARD_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("div[class], article[class]").expect("valid selector"));
static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid regex"));

/// Transient extraction failure. Distinct from a legitimately empty result,
/// which is `Ok(vec![])` — the caller must never treat a failure as "the
/// source has zero vehicles".
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("source returned status {0}")]
    Status(reqwest::StatusCode),
}

#[async_trait]
pub trait Extractor: Send + Sync {
    async fn fetch_inventory(&self) -> Result<Vec<VehicleRecord>, FetchError>;
}

pub struct TeslaExtractor {
    http: reqwest::Client,
    url: String,
    models: Vec<String>,
}

impl TeslaExtractor {
    pub fn new(url: String, models: Vec<String>) -> Result<Self, FetchError> {
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(FETCH_TIMEOUT)
            .build()?;
        Ok(Self { http, url, models })
    }
}

#[async_trait]
impl Extractor for TeslaExtractor {
    async fn fetch_inventory(&self) -> Result<Vec<VehicleRecord>, FetchError> {
        let response = self.http.get(&self.url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status));
        }
        let body = response.text().await?;
        let records = parse_inventory(&body, &self.url, &self.models);
        debug!(count = records.len(), "extracted inventory records");
        Ok(records)
    }
}

/// Pull vehicle records out of a fetched page. Pure, so the heuristics can
/// be exercised against fixtures without a network.
pub fn parse_inventory(html: &str, source_url: &str, models: &[String]) -> Vec<VehicleRecord> {
    let document = Html::parse_document(html);
    let mut seen: HashSet<String> = HashSet::new();
    let mut records = Vec::new();

    for card in document.select(&CARD_SELECTOR) {
        if !card_looks_relevant(&card) {
            continue;
        }
        let text = normalized_text(&card);
        let Some(model) = models.iter().find(|m| text.contains(m.as_str())) else {
            continue;
        };
        let id = vehicle_id(model, &text);
        if !seen.insert(id.clone()) {
            continue;
        }
        records.push(VehicleRecord {
            id,
            model: model.clone(),
            details: truncate_chars(&text, DETAILS_MAX_CHARS),
            url: source_url.to_string(),
        });
    }
    records
}

fn card_looks_relevant(card: &ElementRef<'_>) -> bool {
    let Some(class) = card.value().attr("class") else {
        return false;
    };
    let class = class.to_ascii_lowercase();
    CARD_CLASS_HINTS.iter().any(|hint| class.contains(hint))
}

fn normalized_text(card: &ElementRef<'_>) -> String {
    let joined = card.text().collect::<Vec<_>>().join(" ");
    WHITESPACE.replace_all(joined.trim(), " ").into_owned()
}

/// Deterministic listing id: the matched model name plus a short digest of
/// the normalized card text, so identical listings map to the same id
/// across polls and across restarts.
fn vehicle_id(model: &str, text: &str) -> String {
    let digest = hex::encode(Sha256::digest(text.as_bytes()));
    format!("{}_{}", model, &digest[..8])
}

fn truncate_chars(text: &str, max: usize) -> String {
    text.chars().take(max).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn models() -> Vec<String> {
        vec!["Model 3".to_string(), "Model Y".to_string()]
    }

    const PAGE: &str = r#"
        <html><body>
          <div class="header-nav">Tesla Türkiye</div>
          <article class="inventory-card">
            <h3>Model 3</h3>
            <span>Long Range   AWD</span>
            <span>1.250.000 TL</span>
          </article>
          <div class="product-tile">
            <h2>Model Y</h2>
            <span>Performance</span>
          </div>
          <div class="footer">Model 3 mentioned outside any card class</div>
        </body></html>
    "#;

    #[test]
    fn extracts_cards_matching_monitored_models() {
        let records = parse_inventory(PAGE, "https://example.test/inventory", &models());
        let found: Vec<&str> = records.iter().map(|r| r.model.as_str()).collect();
        assert_eq!(found, vec!["Model 3", "Model Y"]);
        assert!(records[0].details.contains("Long Range AWD"));
        assert_eq!(records[0].url, "https://example.test/inventory");
    }

    #[test]
    fn ids_are_deterministic_across_polls() {
        let first = parse_inventory(PAGE, "u", &models());
        let second = parse_inventory(PAGE, "u", &models());
        let first_ids: Vec<&str> = first.iter().map(|r| r.id.as_str()).collect();
        let second_ids: Vec<&str> = second.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(first_ids, second_ids);
        assert!(first_ids[0].starts_with("Model 3_"));
    }

    #[test]
    fn distinct_listings_get_distinct_ids() {
        let records = parse_inventory(PAGE, "u", &models());
        assert_ne!(records[0].id, records[1].id);
    }

    #[test]
    fn unmonitored_models_are_skipped() {
        let records = parse_inventory(PAGE, "u", &["Model S".to_string()]);
        assert!(records.is_empty());
    }

    #[test]
    fn unrelated_markup_yields_nothing() {
        let records = parse_inventory("<html><body><p>hi</p></body></html>", "u", &models());
        assert!(records.is_empty());
    }

    #[test]
    fn details_are_truncated() {
        let long = "x".repeat(500);
        let page = format!(r#"<div class="vehicle-card">Model 3 {long}</div>"#);
        let records = parse_inventory(&page, "u", &models());
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].details.chars().count(), 200);
    }

    #[test]
    fn whitespace_is_normalized_in_details() {
        let page = "<div class=\"car-listing\">Model Y\n\t  Standard   Range</div>";
        let records = parse_inventory(page, "u", &models());
        assert_eq!(records[0].details, "Model Y Standard Range");
    }
}
