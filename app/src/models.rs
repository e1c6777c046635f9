use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::Error;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DriverStatus {
    Active,
    Inactive,
}

impl DriverStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DriverStatus::Active => "active",
            DriverStatus::Inactive => "inactive",
        }
    }
}

impl Default for DriverStatus {
    fn default() -> Self {
        DriverStatus::Active
    }
}

impl FromStr for DriverStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let v = s.trim();
        if v.eq_ignore_ascii_case("active") {
            Ok(DriverStatus::Active)
        } else if v.eq_ignore_ascii_case("inactive") {
            Ok(DriverStatus::Inactive)
        } else {
            Err(Error::validation(format!("Unknown driver status: {v}")))
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Driver {
    pub id: String,
    pub name: String,
    pub truck_number: String,
    #[serde(default)]
    pub license_number: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub status: DriverStatus,
    pub created_at: String,
}

/// Driver form state, validated before a `Driver` is built from it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewDriver {
    pub name: String,
    pub truck_number: String,
    #[serde(default)]
    pub license_number: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub status: DriverStatus,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriverPatch {
    pub name: Option<String>,
    pub truck_number: Option<String>,
    pub license_number: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub status: Option<DriverStatus>,
}

/// A named line item billed on top of the base rate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdditionalCost {
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub amount: f64,
}

impl AdditionalCost {
    pub fn new(description: impl Into<String>, amount: f64) -> Self {
        Self {
            description: description.into(),
            amount,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum InvoiceStatus {
    Unpaid,
    Paid,
    Partial,
}

impl InvoiceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            InvoiceStatus::Unpaid => "unpaid",
            InvoiceStatus::Paid => "paid",
            InvoiceStatus::Partial => "partial",
        }
    }
}

impl fmt::Display for InvoiceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for InvoiceStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "unpaid" => Ok(InvoiceStatus::Unpaid),
            "paid" => Ok(InvoiceStatus::Paid),
            "partial" => Ok(InvoiceStatus::Partial),
            other => Err(Error::validation(format!("Unknown invoice status: {other}"))),
        }
    }
}

fn default_invoice_status() -> InvoiceStatus {
    InvoiceStatus::Unpaid
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Invoice {
    pub id: String,
    pub invoice_number: String,
    pub load_number: String,
    pub broker: String,
    /// Driver name as it was when the invoice was created.
    pub driver: String,
    pub truck_number: String,
    pub rate: f64,
    #[serde(default)]
    pub pickup_location: String,
    #[serde(default)]
    pub delivery_location: String,
    #[serde(default)]
    pub pickup_date: String,
    #[serde(default)]
    pub delivery_date: String,
    #[serde(default)]
    pub notes: String,
    #[serde(default = "default_invoice_status")]
    pub status: InvoiceStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_method: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paid_amount: Option<f64>,
    pub created_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub additional_costs: Option<Vec<AdditionalCost>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub include_route_info: Option<bool>,
}

impl Invoice {
    pub fn additional_costs(&self) -> &[AdditionalCost] {
        self.additional_costs.as_deref().unwrap_or(&[])
    }

    pub fn shows_route_info(&self) -> bool {
        self.include_route_info.unwrap_or(false)
    }

    /// Route details hang off the locations; dates alone are not a route.
    pub fn has_route_details(&self) -> bool {
        !self.pickup_location.trim().is_empty() || !self.delivery_location.trim().is_empty()
    }
}

/// Invoice form state. `rate` stays optional so a missing value can be
/// reported instead of silently becoming zero.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewInvoice {
    pub load_number: String,
    pub broker: String,
    pub driver_id: String,
    pub rate: Option<f64>,
    #[serde(default)]
    pub pickup_location: String,
    #[serde(default)]
    pub delivery_location: String,
    #[serde(default)]
    pub pickup_date: String,
    #[serde(default)]
    pub delivery_date: String,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub additional_costs: Vec<AdditionalCost>,
    #[serde(default)]
    pub include_route_info: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentUpdate {
    pub status: InvoiceStatus,
    #[serde(default)]
    pub method: String,
    #[serde(default)]
    pub date: String,
    pub amount: Option<f64>,
}

/// Which invoices an invoice-history query returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusFilter {
    #[default]
    All,
    Only(InvoiceStatus),
}

impl FromStr for StatusFilter {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("all") {
            Ok(StatusFilter::All)
        } else {
            s.parse::<InvoiceStatus>().map(StatusFilter::Only)
        }
    }
}
