use std::sync::Arc;

use log::{info, warn};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::models::{Driver, DriverPatch, DriverStatus, NewDriver};
use crate::store::{CollectionStore, CollectionStoreExt, DRIVERS};

/// Name and truck copied onto an invoice at creation time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DriverSnapshot {
    pub name: String,
    pub truck_number: String,
}

pub struct DriverService {
    store: Arc<dyn CollectionStore>,
}

impl DriverService {
    pub fn new(store: Arc<dyn CollectionStore>) -> Self {
        Self { store }
    }

    pub fn list(&self) -> Result<Vec<Driver>> {
        self.store.load_all(DRIVERS)
    }

    pub fn get(&self, id: &str) -> Result<Option<Driver>> {
        Ok(self.list()?.into_iter().find(|d| d.id == id))
    }

    /// Unknown ids resolve to an empty snapshot rather than an error.
    pub fn snapshot(&self, id: &str) -> Result<DriverSnapshot> {
        Ok(self
            .get(id)?
            .map(|d| DriverSnapshot {
                name: d.name,
                truck_number: d.truck_number,
            })
            .unwrap_or_default())
    }

    pub fn create(&self, input: NewDriver) -> Result<Driver> {
        validate_driver_fields(&input.name, &input.truck_number)?;

        let created = Driver {
            id: Uuid::now_v7().to_string(),
            name: input.name.trim().to_string(),
            truck_number: input.truck_number.trim().to_string(),
            license_number: input.license_number.trim().to_string(),
            phone: input.phone.trim().to_string(),
            email: input.email.trim().to_string(),
            status: input.status,
            created_at: crate::now_iso(),
        };

        let mut drivers = self.list()?;
        drivers.push(created.clone());
        self.store.save_all(DRIVERS, &drivers)?;
        info!("driver {} added ({})", created.name, created.truck_number);
        Ok(created)
    }

    pub fn update(&self, id: &str, patch: DriverPatch) -> Result<Option<Driver>> {
        let drivers = self.list()?;
        let Some(existing) = drivers.iter().find(|d| d.id == id) else {
            return Ok(None);
        };

        let mut updated = existing.clone();
        if let Some(v) = patch.name {
            updated.name = v.trim().to_string();
        }
        if let Some(v) = patch.truck_number {
            updated.truck_number = v.trim().to_string();
        }
        if let Some(v) = patch.license_number {
            updated.license_number = v.trim().to_string();
        }
        if let Some(v) = patch.phone {
            updated.phone = v.trim().to_string();
        }
        if let Some(v) = patch.email {
            updated.email = v.trim().to_string();
        }
        if let Some(v) = patch.status {
            updated.status = v;
        }
        validate_driver_fields(&updated.name, &updated.truck_number)?;

        let next: Vec<Driver> = drivers
            .into_iter()
            .map(|d| if d.id == id { updated.clone() } else { d })
            .collect();
        self.store.save_all(DRIVERS, &next)?;
        info!("driver {} updated", updated.id);
        Ok(Some(updated))
    }

    pub fn delete(&self, id: &str) -> Result<bool> {
        let drivers = self.list()?;
        let before = drivers.len();
        let next: Vec<Driver> = drivers.into_iter().filter(|d| d.id != id).collect();
        if next.len() == before {
            return Ok(false);
        }
        self.store.save_all(DRIVERS, &next)?;
        info!("driver {id} removed");
        Ok(true)
    }

    pub fn active(&self) -> Result<Vec<Driver>> {
        Ok(self
            .list()?
            .into_iter()
            .filter(|d| d.status == DriverStatus::Active)
            .collect())
    }

    /// Fills an untouched driver list with a demo roster. An existing list,
    /// even an empty one, is left alone.
    pub fn seed_demo_drivers_if_missing(&self) -> Result<bool> {
        if self.store.contains(DRIVERS)? {
            return Ok(false);
        }
        let now = crate::now_iso();
        let roster = [
            ("John Smith", "TRK-001", "CDL123456", "(555) 123-4567", "john.smith@email.com"),
            ("Mike Johnson", "TRK-002", "CDL789012", "(555) 234-5678", "mike.johnson@email.com"),
            ("Sarah Davis", "TRK-003", "CDL345678", "(555) 345-6789", "sarah.davis@email.com"),
            ("Robert Wilson", "TRK-004", "CDL901234", "(555) 456-7890", "robert.wilson@email.com"),
            ("Lisa Anderson", "TRK-005", "CDL567890", "(555) 567-8901", "lisa.anderson@email.com"),
        ];
        let drivers: Vec<Driver> = roster
            .iter()
            .map(|(name, truck, license, phone, email)| Driver {
                id: Uuid::now_v7().to_string(),
                name: name.to_string(),
                truck_number: truck.to_string(),
                license_number: license.to_string(),
                phone: phone.to_string(),
                email: email.to_string(),
                status: DriverStatus::Active,
                created_at: now.clone(),
            })
            .collect();
        self.store.save_all(DRIVERS, &drivers)?;
        info!("seeded {} demo drivers", drivers.len());
        Ok(true)
    }
}

fn validate_driver_fields(name: &str, truck_number: &str) -> Result<()> {
    if name.trim().is_empty() || truck_number.trim().is_empty() {
        warn!("driver rejected: missing name or truck number");
        return Err(Error::validation(
            "Please fill in at least the name and truck number.",
        ));
    }
    Ok(())
}
