//! Invoice history as CSV, one row per invoice.

use std::path::{Path, PathBuf};

use log::info;

use crate::error::Result;
use crate::models::Invoice;
use crate::totals::{additional_total, invoice_total, outstanding_balance};

const HEADER: [&str; 20] = [
    "invoiceId",
    "invoiceNumber",
    "loadNumber",
    "broker",
    "driver",
    "truckNumber",
    "rate",
    "additionalTotal",
    "total",
    "status",
    "paidAmount",
    "balanceDue",
    "paymentMethod",
    "paymentDate",
    "pickupLocation",
    "deliveryLocation",
    "pickupDate",
    "deliveryDate",
    "notes",
    "createdAt",
];

fn csv_escape_field(input: &str) -> String {
    let needs_quotes = input.contains([',', '"', '\n', '\r']);
    if !needs_quotes {
        return input.to_string();
    }
    format!("\"{}\"", input.replace('"', "\"\""))
}

fn csv_join_row<S: AsRef<str>>(fields: &[S]) -> String {
    fields
        .iter()
        .map(|f| csv_escape_field(f.as_ref()))
        .collect::<Vec<_>>()
        .join(",")
}

/// Plain decimal with two places, no currency symbol or grouping.
fn format_money_csv(v: f64) -> String {
    format!("{:.2}", v)
}

pub fn invoices_csv(invoices: &[Invoice]) -> String {
    let mut lines = vec![csv_join_row(&HEADER)];
    for inv in invoices {
        let row = [
            inv.id.clone(),
            inv.invoice_number.clone(),
            inv.load_number.clone(),
            inv.broker.clone(),
            inv.driver.clone(),
            inv.truck_number.clone(),
            format_money_csv(inv.rate),
            format_money_csv(additional_total(inv.additional_costs())),
            format_money_csv(invoice_total(inv)),
            inv.status.to_string(),
            inv.paid_amount.map(format_money_csv).unwrap_or_default(),
            format_money_csv(outstanding_balance(inv)),
            inv.payment_method.clone().unwrap_or_default(),
            inv.payment_date.clone().unwrap_or_default(),
            inv.pickup_location.clone(),
            inv.delivery_location.clone(),
            inv.pickup_date.clone(),
            inv.delivery_date.clone(),
            inv.notes.clone(),
            inv.created_at.clone(),
        ];
        lines.push(csv_join_row(&row));
    }
    let mut out = lines.join("\r\n");
    out.push_str("\r\n");
    out
}

pub async fn export_invoices_csv(invoices: &[Invoice], path: &Path) -> Result<PathBuf> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(path, invoices_csv(invoices)).await?;
    info!("wrote {} invoice(s) to {}", invoices.len(), path.display());
    Ok(path.to_path_buf())
}
