use log::info;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::store::{CollectionStore, CollectionStoreExt, SETTINGS};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    pub issuer_name: String,
    #[serde(default)]
    pub issuer_tagline: String,
    #[serde(default)]
    pub issuer_address: String,
    #[serde(default)]
    pub issuer_phone: String,
    #[serde(default)]
    pub issuer_email: String,
    #[serde(default = "default_currency_symbol")]
    pub currency_symbol: String,
    #[serde(default = "default_payment_terms")]
    pub payment_terms: String,
    /// `data:image/...;base64,...` as pasted by the user; empty for none.
    #[serde(default)]
    pub logo_url: String,
    /// Optional TTF used instead of the built-in Helvetica.
    #[serde(default)]
    pub font_path: String,
    #[serde(default)]
    pub download_dir: String,
    #[serde(default = "default_true")]
    pub show_route_info: bool,
    #[serde(default = "default_true")]
    pub show_payment_status: bool,
    #[serde(default = "default_true")]
    pub show_notes: bool,
}

fn default_true() -> bool {
    true
}

fn default_currency_symbol() -> String {
    "$".to_string()
}

fn default_payment_terms() -> String {
    "Payment Terms: Net 30 Days".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            issuer_name: "HAUL-IT PRO".to_string(),
            issuer_tagline: "Professional Trucking Services".to_string(),
            issuer_address: String::new(),
            issuer_phone: String::new(),
            issuer_email: String::new(),
            currency_symbol: default_currency_symbol(),
            payment_terms: default_payment_terms(),
            logo_url: String::new(),
            font_path: String::new(),
            download_dir: String::new(),
            show_route_info: true,
            show_payment_status: true,
            show_notes: true,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsPatch {
    pub issuer_name: Option<String>,
    pub issuer_tagline: Option<String>,
    pub issuer_address: Option<String>,
    pub issuer_phone: Option<String>,
    pub issuer_email: Option<String>,
    pub currency_symbol: Option<String>,
    pub payment_terms: Option<String>,
    pub logo_url: Option<String>,
    pub font_path: Option<String>,
    pub download_dir: Option<String>,
    pub show_route_info: Option<bool>,
    pub show_payment_status: Option<bool>,
    pub show_notes: Option<bool>,
}

impl Settings {
    pub fn apply(&mut self, patch: SettingsPatch) {
        if let Some(v) = patch.issuer_name {
            self.issuer_name = v;
        }
        if let Some(v) = patch.issuer_tagline {
            self.issuer_tagline = v;
        }
        if let Some(v) = patch.issuer_address {
            self.issuer_address = v;
        }
        if let Some(v) = patch.issuer_phone {
            self.issuer_phone = v;
        }
        if let Some(v) = patch.issuer_email {
            self.issuer_email = v;
        }
        if let Some(v) = patch.currency_symbol {
            self.currency_symbol = v;
        }
        if let Some(v) = patch.payment_terms {
            self.payment_terms = v;
        }
        if let Some(v) = patch.logo_url {
            self.logo_url = v.trim().to_string();
        }
        if let Some(v) = patch.font_path {
            self.font_path = v.trim().to_string();
        }
        if let Some(v) = patch.download_dir {
            self.download_dir = v.trim().to_string();
        }
        if let Some(v) = patch.show_route_info {
            self.show_route_info = v;
        }
        if let Some(v) = patch.show_payment_status {
            self.show_payment_status = v;
        }
        if let Some(v) = patch.show_notes {
            self.show_notes = v;
        }
    }
}

pub fn load_settings(store: &dyn CollectionStore) -> Result<Settings> {
    Ok(store.load_value::<Settings>(SETTINGS)?.unwrap_or_default())
}

pub fn update_settings(store: &dyn CollectionStore, patch: SettingsPatch) -> Result<Settings> {
    let mut settings = load_settings(store)?;
    settings.apply(patch);
    store.save_value(SETTINGS, &settings)?;
    info!("settings updated");
    Ok(settings)
}
