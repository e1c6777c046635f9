use std::sync::Arc;

use log::{info, warn};
use serde::Serialize;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::brokers::BrokerDirectory;
use crate::drivers::DriverService;
use crate::error::{Error, Result};
use crate::models::{Invoice, InvoiceStatus, NewInvoice, PaymentUpdate, StatusFilter};
use crate::numbering::{invoice_number, local_now};
use crate::store::{CollectionStore, CollectionStoreExt, INVOICES};
use crate::totals::{invoice_total, is_qualifying, outstanding_balance};

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceSummary {
    pub invoice_count: usize,
    pub outstanding_count: usize,
    pub outstanding_total: f64,
    pub collected_total: f64,
}

pub struct InvoiceService {
    store: Arc<dyn CollectionStore>,
    drivers: DriverService,
    brokers: BrokerDirectory,
}

impl InvoiceService {
    pub fn new(store: Arc<dyn CollectionStore>) -> Self {
        Self {
            drivers: DriverService::new(store.clone()),
            brokers: BrokerDirectory::new(store.clone()),
            store,
        }
    }

    pub fn list(&self) -> Result<Vec<Invoice>> {
        self.store.load_all(INVOICES)
    }

    pub fn get(&self, id: &str) -> Result<Option<Invoice>> {
        Ok(self.list()?.into_iter().find(|i| i.id == id))
    }

    /// Looks up by id first, then by invoice number. Numbers are not unique,
    /// so the earliest invoice carrying it wins.
    pub fn find(&self, id_or_number: &str) -> Result<Option<Invoice>> {
        let invoices = self.list()?;
        if let Some(inv) = invoices.iter().find(|i| i.id == id_or_number) {
            return Ok(Some(inv.clone()));
        }
        Ok(invoices
            .into_iter()
            .find(|i| i.invoice_number == id_or_number))
    }

    pub fn create(&self, input: NewInvoice) -> Result<Invoice> {
        self.create_at(input, local_now())
    }

    /// Validates the form, snapshots the driver, stamps the number from `now`
    /// and appends the invoice. New brokers are remembered for autocomplete.
    pub fn create_at(&self, input: NewInvoice, now: OffsetDateTime) -> Result<Invoice> {
        let rate = validate_new_invoice(&input)?;

        let driver = self.drivers.snapshot(&input.driver_id)?;
        let number = invoice_number(&input.load_number, now.date());
        let costs: Vec<_> = input
            .additional_costs
            .into_iter()
            .filter(is_qualifying)
            .collect();

        let created = Invoice {
            id: Uuid::now_v7().to_string(),
            invoice_number: number,
            load_number: input.load_number,
            broker: input.broker,
            driver: driver.name,
            truck_number: driver.truck_number,
            rate,
            pickup_location: input.pickup_location,
            delivery_location: input.delivery_location,
            pickup_date: input.pickup_date,
            delivery_date: input.delivery_date,
            notes: input.notes,
            status: InvoiceStatus::Unpaid,
            payment_method: None,
            payment_date: None,
            paid_amount: None,
            created_at: now.format(&Rfc3339)?,
            additional_costs: if costs.is_empty() { None } else { Some(costs) },
            include_route_info: Some(input.include_route_info),
        };

        let mut invoices = self.list()?;
        invoices.push(created.clone());
        self.store.save_all(INVOICES, &invoices)?;
        self.brokers.add_if_new(&created.broker)?;

        info!(
            "invoice {} created for {} ({:.2})",
            created.invoice_number,
            created.broker,
            invoice_total(&created)
        );
        Ok(created)
    }

    /// Case-insensitive search over number, load, broker and driver, then a
    /// status filter. An empty term matches everything.
    pub fn search(&self, term: &str, filter: StatusFilter) -> Result<Vec<Invoice>> {
        let needle = term.trim().to_lowercase();
        Ok(self
            .list()?
            .into_iter()
            .filter(|inv| {
                needle.is_empty()
                    || [&inv.invoice_number, &inv.load_number, &inv.broker, &inv.driver]
                        .iter()
                        .any(|f| f.to_lowercase().contains(&needle))
            })
            .filter(|inv| match filter {
                StatusFilter::All => true,
                StatusFilter::Only(s) => inv.status == s,
            })
            .collect())
    }

    /// What the payment dialog starts from: paid in full, today.
    pub fn payment_defaults(&self, invoice: &Invoice) -> PaymentUpdate {
        PaymentUpdate {
            status: InvoiceStatus::Paid,
            method: String::new(),
            date: crate::today_ymd(),
            amount: Some(invoice_total(invoice)),
        }
    }

    /// Records a payment. Unknown ids are a lookup miss, not an error.
    pub fn update_payment(&self, id: &str, update: PaymentUpdate) -> Result<Option<Invoice>> {
        let invoices = self.list()?;
        let Some(existing) = invoices.iter().find(|i| i.id == id) else {
            warn!("payment update for unknown invoice {id}");
            return Ok(None);
        };

        let paid_amount = match (update.status, update.amount) {
            (InvoiceStatus::Unpaid, _) => {
                return Err(Error::validation(
                    "Payment status must be paid or partial.",
                ))
            }
            (_, Some(a)) if !a.is_finite() => {
                return Err(Error::validation("Amount paid must be a number."))
            }
            (_, Some(a)) => a,
            (InvoiceStatus::Paid, None) => invoice_total(existing),
            (InvoiceStatus::Partial, None) => {
                return Err(Error::validation(
                    "A partial payment needs the amount paid.",
                ))
            }
        };

        let date = if update.date.trim().is_empty() {
            crate::today_ymd()
        } else {
            update.date.trim().to_string()
        };

        let mut updated = existing.clone();
        updated.status = update.status;
        updated.payment_method = Some(update.method.trim().to_string());
        updated.payment_date = Some(date);
        updated.paid_amount = Some(paid_amount);

        let next: Vec<Invoice> = invoices
            .into_iter()
            .map(|i| if i.id == id { updated.clone() } else { i })
            .collect();
        self.store.save_all(INVOICES, &next)?;

        info!(
            "invoice {} marked {} ({:.2} paid)",
            updated.invoice_number, updated.status, paid_amount
        );
        Ok(Some(updated))
    }

    pub fn summary(&self) -> Result<InvoiceSummary> {
        let invoices = self.list()?;
        let mut s = InvoiceSummary {
            invoice_count: invoices.len(),
            ..Default::default()
        };
        for inv in &invoices {
            let balance = outstanding_balance(inv);
            if inv.status != InvoiceStatus::Paid {
                s.outstanding_count += 1;
                s.outstanding_total += balance;
            }
            s.collected_total += match inv.status {
                InvoiceStatus::Unpaid => 0.0,
                InvoiceStatus::Partial => inv.paid_amount.unwrap_or(0.0),
                InvoiceStatus::Paid => inv.paid_amount.unwrap_or_else(|| invoice_total(inv)),
            };
        }
        Ok(s)
    }
}

fn validate_new_invoice(input: &NewInvoice) -> Result<f64> {
    let mut missing: Vec<&str> = Vec::new();
    if input.load_number.trim().is_empty() {
        missing.push("load number");
    }
    if input.broker.trim().is_empty() {
        missing.push("broker");
    }
    if input.driver_id.trim().is_empty() {
        missing.push("driver");
    }
    let rate = input.rate.filter(|r| r.is_finite());
    if rate.is_none() {
        missing.push("rate");
    }

    match rate {
        Some(r) if missing.is_empty() => Ok(r),
        _ => {
            warn!("invoice rejected: missing {}", missing.join(", "));
            Err(Error::validation(format!(
                "Please fill in all required fields (missing: {}).",
                missing.join(", ")
            )))
        }
    }
}
