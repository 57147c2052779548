//! User-facing message formatting. Outbound text uses Telegram HTML markup;
//! anything sourced from the scraped page goes through `html::escape`.

use crate::config::Config;
use crate::extractor::FetchError;
use crate::model::{InventoryState, VehicleRecord};
use teloxide::utils::html;

/// Listings shown in full in a manual-search reply; the rest collapse into
/// an overflow count.
pub const SEARCH_PREVIEW_LIMIT: usize = 5;

pub fn vehicle_notification(vehicle: &VehicleRecord) -> String {
    format!(
        "🚗 <b>New Tesla listed!</b>\n\n\
         <b>Model:</b> {}\n\
         <b>Details:</b> {}\n\n\
         <a href=\"{}\">View inventory</a>",
        html::escape(&vehicle.model),
        html::escape(&vehicle.details),
        vehicle.url,
    )
}

pub fn startup(cfg: &Config) -> String {
    format!(
        "🤖 Tesla inventory watch started!\n\n\
         📊 Monitored models: {}\n\
         ⏰ Check interval: {} s",
        cfg.models.join(", "),
        cfg.check_interval,
    )
}

pub fn help() -> String {
    "Commands:\n\
     /status — monitoring state and known inventory\n\
     /list_models — monitored model names\n\
     /search — check the inventory right now\n\
     /stop — pause automatic checks\n\
     /resume — resume automatic checks\n\
     /ping — liveness check"
        .to_string()
}

pub fn status(cfg: &Config, monitoring: bool, state: &InventoryState) -> String {
    let last = state
        .last_update
        .map(|t| t.format("%Y-%m-%d %H:%M:%S UTC").to_string())
        .unwrap_or_else(|| "never".to_string());
    format!(
        "Monitoring: {}\n\
         Models: {}\n\
         Check interval: {} s\n\
         Known vehicles: {}\n\
         Last update: {}",
        if monitoring { "enabled ✅" } else { "paused ⏸" },
        cfg.models.join(", "),
        cfg.check_interval,
        state.known.len(),
        last,
    )
}

pub fn model_list(models: &[String]) -> String {
    let mut out = String::from("Monitored models:");
    for model in models {
        out.push_str("\n• ");
        out.push_str(model);
    }
    out
}

pub fn stopped() -> &'static str {
    "Monitoring paused. Send /resume to pick it back up."
}

pub fn resumed() -> &'static str {
    "Monitoring resumed."
}

pub fn pong() -> &'static str {
    "pong 🏓"
}

pub fn unknown_command() -> &'static str {
    "Unknown command. Send /help for the list."
}

pub fn search_summary(vehicles: &[VehicleRecord]) -> String {
    if vehicles.is_empty() {
        return "🔍 No matching vehicles in the inventory right now.".to_string();
    }
    let mut out = format!("🔍 Found {} vehicle(s):\n", vehicles.len());
    for vehicle in vehicles.iter().take(SEARCH_PREVIEW_LIMIT) {
        out.push_str(&format!(
            "\n• <b>{}</b> — {}",
            html::escape(&vehicle.model),
            html::escape(&vehicle.details),
        ));
    }
    let overflow = vehicles.len().saturating_sub(SEARCH_PREVIEW_LIMIT);
    if overflow > 0 {
        out.push_str(&format!("\n\n…and {overflow} more."));
    }
    out
}

pub fn search_failed(err: &FetchError) -> String {
    format!("⚠️ Search failed: {err}")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vehicle(id: &str, details: &str) -> VehicleRecord {
        VehicleRecord {
            id: id.to_string(),
            model: "Model 3".into(),
            details: details.to_string(),
            url: "https://example.test".into(),
        }
    }

    #[test]
    fn notification_escapes_scraped_text() {
        let msg = vehicle_notification(&vehicle("a", "1 < 2 & more"));
        assert!(msg.contains("1 &lt; 2 &amp; more"));
        assert!(msg.contains("<a href=\"https://example.test\">"));
    }

    #[test]
    fn empty_search_reports_no_matches() {
        assert!(search_summary(&[]).contains("No matching vehicles"));
    }

    #[test]
    fn search_summary_caps_preview_and_counts_overflow() {
        let vehicles: Vec<VehicleRecord> = (0..8)
            .map(|i| vehicle(&format!("id{i}"), &format!("trim {i}")))
            .collect();
        let msg = search_summary(&vehicles);
        assert!(msg.contains("Found 8 vehicle(s)"));
        assert!(msg.contains("trim 4"));
        assert!(!msg.contains("trim 5"));
        assert!(msg.contains("…and 3 more."));
    }

    #[test]
    fn short_search_has_no_overflow_line() {
        let msg = search_summary(&[vehicle("a", "one")]);
        assert!(!msg.contains("more."));
    }
}
