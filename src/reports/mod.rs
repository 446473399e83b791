//! Presentation helpers: money and date formatting, CSV export of order listings.
//!
//! Everything here is stateless. Amounts arrive unrounded and are rounded once, here.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::{models::PurchaseOrderStatus, services::po_totals::round_for_display};

const CSV_DELIMITER: char = ',';
const CSV_HEADERS: [&str; 8] = [
    "PO Number",
    "Supplier",
    "Branch",
    "Status",
    "Ordered",
    "Expected",
    "Total",
    "Received",
];

/// One line of the purchase order export.
#[derive(Debug, Clone, Serialize)]
pub struct PurchaseOrderExportRow {
    pub po_number: String,
    pub supplier: String,
    pub branch: String,
    pub status: PurchaseOrderStatus,
    pub ordered_at: NaiveDate,
    pub expected_date: Option<NaiveDate>,
    pub total_amount: Decimal,
    pub received_total: Decimal,
}

/// `1234.5` -> `1,234.50`
pub fn format_amount(amount: Decimal) -> String {
    let rounded = round_for_display(amount);
    let negative = rounded.is_sign_negative() && !rounded.is_zero();
    let text = format!("{:.2}", rounded.abs());
    let (whole, fraction) = text.split_once('.').unwrap_or((text.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    if negative {
        format!("-{grouped}.{fraction}")
    } else {
        format!("{grouped}.{fraction}")
    }
}

pub fn format_currency(amount: Decimal, currency: &str) -> String {
    format!("{} {}", currency, format_amount(amount))
}

pub fn format_date(date: NaiveDate) -> String {
    date.format("%d %b %Y").to_string()
}

/// Missing dates render as a dash.
pub fn format_optional_date(date: Option<NaiveDate>) -> String {
    date.map(format_date).unwrap_or_else(|| "-".to_string())
}

pub fn purchase_orders_csv(rows: &[PurchaseOrderExportRow]) -> String {
    let mut out = String::new();
    push_record(&mut out, CSV_HEADERS.iter().map(|h| h.to_string()));

    for row in rows {
        push_record(
            &mut out,
            [
                row.po_number.clone(),
                row.supplier.clone(),
                row.branch.clone(),
                row.status.to_string(),
                row.ordered_at.format("%Y-%m-%d").to_string(),
                row.expected_date
                    .map(|d| d.format("%Y-%m-%d").to_string())
                    .unwrap_or_default(),
                format!("{:.2}", round_for_display(row.total_amount)),
                format!("{:.2}", round_for_display(row.received_total)),
            ]
            .into_iter(),
        );
    }
    out
}

fn push_record(out: &mut String, fields: impl Iterator<Item = String>) {
    let line = fields
        .map(|field| escape_field(&field, CSV_DELIMITER))
        .collect::<Vec<_>>()
        .join(&CSV_DELIMITER.to_string());
    out.push_str(&line);
    out.push('\n');
}

fn escape_field(value: &str, delimiter: char) -> String {
    if value.contains(delimiter) || value.contains('"') || value.contains('\n') {
        let escaped = value.replace('"', "\"\"");
        format!("\"{escaped}\"")
    } else {
        value.to_string()
    }
}
