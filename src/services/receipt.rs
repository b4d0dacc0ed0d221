//! Receipt rendering for an occupied seat: identifier, plain-text body and a
//! WhatsApp deep link carrying that body.

use chrono::{DateTime, NaiveDate};
use rand::Rng;
use serde::Serialize;

use crate::config::LibraryConfig;
use crate::models::Seat;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Receipt {
    pub receipt_id: String,
    pub text: String,
    pub whatsapp_url: Option<String>,
}

/// `{prefix}-{seat}-{NNNN}` with a random four digit suffix. Uniqueness is not enforced.
pub fn generate_receipt_id(prefix: &str, seat_number: u32) -> String {
    let suffix: u16 = rand::thread_rng().gen_range(1000..=9999);
    format!("{}-{}-{}", prefix, seat_number, suffix)
}

/// Builds the receipt for the seat's current occupant, or `None` for a free seat.
///
/// `issued_at` is the client's issue time when known; the server's assignment time
/// is used otherwise.
pub fn build_receipt(library: &LibraryConfig, seat: &Seat, issued_at: Option<&str>) -> Option<Receipt> {
    let occupant = seat.occupant.as_ref()?;
    let issued = match issued_at {
        Some(raw) => format_timestamp(raw),
        None => format_timestamp(&occupant.assigned_at.to_rfc3339()),
    };

    let lines = [
        format!("{} - Digital Receipt", library.name),
        library.tagline.clone(),
        String::new(),
        format!("Receipt ID: {}", occupant.receipt_id),
        format!("Issued: {}", issued),
        format!("Student Name: {}", occupant.student_name),
        format!("Seat Number: {}", seat.number),
        format!("Plan: {}", occupant.plan),
        format!(
            "Duration: {} to {}",
            format_date(&occupant.start_date),
            format_date(&occupant.end_date)
        ),
        format!("Amount: {}", format_inr(occupant.amount)),
        String::new(),
        format!("Regards: {} ({})", library.owner, library.phone),
        format!("Address: {}", library.address),
        format!("Map: {}", library.map_url),
        library.hours.clone(),
    ];
    let text = lines.join("\n");

    Some(Receipt {
        receipt_id: occupant.receipt_id.clone(),
        whatsapp_url: whatsapp_url(&occupant.phone_number, &text),
        text,
    })
}

pub fn whatsapp_url(phone: &str, text: &str) -> Option<String> {
    let digits: String = phone.chars().filter(char::is_ascii_digit).collect();
    if digits.is_empty() {
        return None;
    }
    let query = serde_urlencoded::to_string([("text", text)]).ok()?;
    Some(format!("https://wa.me/{}?{}", digits, query))
}

/// Rupees with Indian digit grouping, e.g. `₹1,23,456.50`. Absent amounts render as `—`.
pub fn format_inr(amount: Option<f64>) -> String {
    let Some(amount) = amount else {
        return "—".to_string();
    };
    let paise = (amount.abs() * 100.0).round() as u64;
    let rupees = (paise / 100).to_string();
    let sign = if amount < 0.0 && paise > 0 { "-" } else { "" };

    let grouped = if rupees.len() <= 3 {
        rupees
    } else {
        let (head, tail) = rupees.split_at(rupees.len() - 3);
        let mut groups: Vec<&str> = Vec::new();
        let mut end = head.len();
        while end > 0 {
            let start = end.saturating_sub(2);
            groups.push(&head[start..end]);
            end = start;
        }
        groups.reverse();
        format!("{},{}", groups.join(","), tail)
    };
    format!("{}₹{}.{:02}", sign, grouped, paise % 100)
}

fn format_date(raw: &str) -> String {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map(|d| d.format("%-d %b %Y").to_string())
        .unwrap_or_else(|_| raw.to_string())
}

fn format_timestamp(raw: &str) -> String {
    DateTime::parse_from_rfc3339(raw)
        .map(|t| t.format("%-d %b %Y, %-I:%M %p").to_string())
        .unwrap_or_else(|_| raw.to_string())
}
