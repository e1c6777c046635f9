//! Invoice PDF export: a pure layout pass (`layout`) followed by painting
//! with printpdf (`render`).

pub mod format;
pub mod layout;
mod render;

use std::path::PathBuf;

use crate::error::Result;
use crate::models::Invoice;
use crate::settings::Settings;

pub use layout::{plan_invoice, BlockKind, DocumentLayout, PlacedBlock};

/// Which optional blocks may appear. A block enabled here still needs
/// content on the invoice to be drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SectionToggles {
    pub route_info: bool,
    pub payment_status: bool,
    pub notes: bool,
}

impl Default for SectionToggles {
    fn default() -> Self {
        Self {
            route_info: true,
            payment_status: true,
            notes: true,
        }
    }
}

/// Sizes are in points, distances in millimeters, grays in 0.0 (black) to 1.0.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StyleTokens {
    pub title_size: f32,
    pub heading_size: f32,
    pub body_size: f32,
    pub small_size: f32,
    pub label_size: f32,
    pub label_gray: f32,
    pub muted_gray: f32,
    pub rule_gray: f32,
    pub line_height: f32,
    pub block_gap: f32,
}

impl Default for StyleTokens {
    fn default() -> Self {
        Self {
            title_size: 24.0,
            heading_size: 12.0,
            body_size: 10.0,
            small_size: 9.0,
            label_size: 8.0,
            label_gray: 0.39,
            muted_gray: 0.59,
            rule_gray: 0.78,
            line_height: 6.0,
            block_gap: 10.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DocumentTemplate {
    pub issuer_name: String,
    pub issuer_tagline: String,
    /// Address, phone and email lines that are set, in that order.
    pub contact_lines: Vec<String>,
    pub currency_symbol: String,
    pub payment_terms: String,
    pub logo_url: Option<String>,
    pub font_path: Option<PathBuf>,
    pub sections: SectionToggles,
    pub style: StyleTokens,
}

fn non_empty(s: &str) -> Option<String> {
    let t = s.trim();
    (!t.is_empty()).then(|| t.to_string())
}

impl DocumentTemplate {
    pub fn from_settings(settings: &Settings) -> Self {
        let contact_lines = [
            &settings.issuer_address,
            &settings.issuer_phone,
            &settings.issuer_email,
        ]
        .into_iter()
        .filter_map(|s| non_empty(s))
        .collect();

        Self {
            issuer_name: settings.issuer_name.trim().to_string(),
            issuer_tagline: settings.issuer_tagline.trim().to_string(),
            contact_lines,
            currency_symbol: settings.currency_symbol.clone(),
            payment_terms: settings.payment_terms.trim().to_string(),
            logo_url: non_empty(&settings.logo_url),
            font_path: non_empty(&settings.font_path).map(PathBuf::from),
            sections: SectionToggles {
                route_info: settings.show_route_info,
                payment_status: settings.show_payment_status,
                notes: settings.show_notes,
            },
            style: StyleTokens::default(),
        }
    }

    pub fn money(&self, v: f64) -> String {
        format::format_currency(&self.currency_symbol, v)
    }
}

impl Default for DocumentTemplate {
    fn default() -> Self {
        Self::from_settings(&Settings::default())
    }
}

/// `Invoice-{invoiceNumber}.pdf`, made safe for the filesystem.
pub fn invoice_filename(invoice: &Invoice) -> String {
    format::sanitize_filename(&format!("Invoice-{}.pdf", invoice.invoice_number))
}

/// Lays out and paints `invoice`, returning the PDF bytes.
pub fn render_invoice_pdf(invoice: &Invoice, template: &DocumentTemplate) -> Result<Vec<u8>> {
    let layout = plan_invoice(invoice, template);
    render::paint(&layout, template, &invoice.invoice_number)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn template_follows_settings() {
        let settings = Settings {
            issuer_address: "12 Depot Rd, Tulsa OK".into(),
            issuer_email: " billing@haulit.test ".into(),
            show_notes: false,
            currency_symbol: "€".into(),
            ..Settings::default()
        };
        let t = DocumentTemplate::from_settings(&settings);
        assert_eq!(t.issuer_name, "HAUL-IT PRO");
        assert_eq!(
            t.contact_lines,
            vec!["12 Depot Rd, Tulsa OK".to_string(), "billing@haulit.test".to_string()]
        );
        assert!(!t.sections.notes);
        assert!(t.sections.route_info);
        assert_eq!(t.logo_url, None);
        assert_eq!(t.font_path, None);
        assert_eq!(t.money(1234.5), "€1,234.50");
    }

    #[test]
    fn filename_uses_invoice_number() {
        let mut inv = crate::pdf::layout::tests::sample_invoice();
        assert_eq!(invoice_filename(&inv), "Invoice-INV-2508-76430.pdf");
        inv.invoice_number = "INV-2508-A/7".into();
        assert_eq!(invoice_filename(&inv), "Invoice-INV-2508-A_7.pdf");
    }
}
