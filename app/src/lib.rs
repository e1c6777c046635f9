//! Freight invoicing for small trucking outfits: drivers, invoices with extra
//! charges, payment tracking and PDF export, persisted as JSON collections in
//! SQLite.

pub mod auth;
pub mod brokers;
pub mod csv_export;
pub mod drivers;
pub mod error;
pub mod export;
pub mod invoices;
pub mod models;
pub mod numbering;
pub mod pdf;
pub mod settings;
pub mod store;
pub mod totals;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

pub use auth::{AuthService, Identity, Role};
pub use brokers::BrokerDirectory;
pub use drivers::{DriverService, DriverSnapshot};
pub use error::{Error, Result};
pub use invoices::{InvoiceService, InvoiceSummary};
pub use models::{
    AdditionalCost, Driver, DriverPatch, DriverStatus, Invoice, InvoiceStatus, NewDriver,
    NewInvoice, PaymentUpdate, StatusFilter,
};
pub use pdf::DocumentTemplate;
pub use settings::{Settings, SettingsPatch};
pub use store::{CollectionStore, CollectionStoreExt, MemoryStore, SqliteStore};

pub(crate) fn now_iso() -> String {
    OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .unwrap_or_else(|_| "1970-01-01T00:00:00Z".to_string())
}

/// Local date as `YYYY-MM-DD`.
pub(crate) fn today_ymd() -> String {
    let d = numbering::today();
    format!("{:04}-{:02}-{:02}", d.year(), u8::from(d.month()), d.day())
}

/// One store shared by every service. Built once at startup and handed to
/// whatever needs it.
pub struct HaulIt {
    store: Arc<dyn CollectionStore>,
    pub auth: AuthService,
    pub drivers: DriverService,
    pub brokers: BrokerDirectory,
    pub invoices: InvoiceService,
}

impl HaulIt {
    pub fn new(store: Arc<dyn CollectionStore>) -> Self {
        Self {
            auth: AuthService::new(store.clone()),
            drivers: DriverService::new(store.clone()),
            brokers: BrokerDirectory::new(store.clone()),
            invoices: InvoiceService::new(store.clone()),
            store,
        }
    }

    /// Opens (or creates) the SQLite database at `path`, or at the resolved
    /// default location when `path` is `None`.
    pub fn open(path: Option<&Path>) -> Result<Self> {
        let db_path = store::resolve_db_path(path);
        log::info!("using database {}", db_path.display());
        Ok(Self::new(Arc::new(SqliteStore::open(&db_path)?)))
    }

    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()))
    }

    pub fn store(&self) -> &dyn CollectionStore {
        self.store.as_ref()
    }

    pub fn settings(&self) -> Result<Settings> {
        settings::load_settings(self.store())
    }

    pub fn update_settings(&self, patch: SettingsPatch) -> Result<Settings> {
        settings::update_settings(self.store(), patch)
    }

    pub fn template(&self) -> Result<DocumentTemplate> {
        Ok(DocumentTemplate::from_settings(&self.settings()?))
    }

    /// Exports `invoice` as PDF into `out_dir`, or the configured download
    /// directory when `None`.
    pub async fn export_invoice(&self, invoice: &Invoice, out_dir: Option<&Path>) -> Result<PathBuf> {
        let settings = self.settings()?;
        let dir = export::resolve_download_dir(out_dir, &settings);
        export::export_invoice_pdf(invoice, &DocumentTemplate::from_settings(&settings), &dir).await
    }

    /// First start: default admin account plus the seeded drivers and brokers.
    pub fn bootstrap(&self) -> Result<()> {
        self.auth.ensure_bootstrap_user()?;
        self.drivers.seed_demo_drivers_if_missing()?;
        self.brokers.seed_defaults_if_missing()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn today_is_zero_padded() {
        let s = today_ymd();
        assert_eq!(s.len(), 10);
        assert_eq!(&s[4..5], "-");
        assert_eq!(&s[7..8], "-");
    }

    #[test]
    fn bootstrap_is_idempotent() {
        let app = HaulIt::in_memory();
        app.bootstrap().unwrap();
        app.bootstrap().unwrap();
        assert_eq!(app.auth.users().unwrap().len(), 1);
        assert_eq!(app.drivers.list().unwrap().len(), 5);
        assert_eq!(app.brokers.suggest("freight").unwrap(), vec!["Express Freight".to_string()]);
        assert_eq!(app.brokers.list().unwrap().len(), 4);
    }

    #[test]
    fn services_share_one_store() {
        let app = HaulIt::in_memory();
        app.update_settings(SettingsPatch {
            issuer_name: Some("Lone Star Haulers".into()),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(app.template().unwrap().issuer_name, "Lone Star Haulers");

        let d = app
            .drivers
            .create(NewDriver {
                name: "Lisa Anderson".into(),
                truck_number: "TRK-005".into(),
                ..Default::default()
            })
            .unwrap();
        let inv = app
            .invoices
            .create(NewInvoice {
                load_number: "88121".into(),
                broker: "Quick Haul Inc".into(),
                driver_id: d.id,
                rate: Some(1200.0),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(inv.driver, "Lisa Anderson");
        assert_eq!(app.brokers.list().unwrap(), vec!["Quick Haul Inc".to_string()]);
    }
}
