use std::path::{Path, PathBuf};

use log::{error, info};

use crate::error::Result;
use crate::models::Invoice;
use crate::pdf::{invoice_filename, render_invoice_pdf, DocumentTemplate};
use crate::settings::Settings;

/// Where exports land: an explicit directory, then the configured one, then
/// the user's Downloads folder, then the working directory.
pub fn resolve_download_dir(explicit: Option<&Path>, settings: &Settings) -> PathBuf {
    if let Some(dir) = explicit {
        return dir.to_path_buf();
    }
    let configured = settings.download_dir.trim();
    if !configured.is_empty() {
        return PathBuf::from(configured);
    }
    let home = std::env::var_os("HOME").or_else(|| std::env::var_os("USERPROFILE"));
    if let Some(downloads) = home.map(|h| PathBuf::from(h).join("Downloads")) {
        if downloads.is_dir() {
            return downloads;
        }
    }
    std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
}

/// Renders `invoice` and writes it to `out_dir/Invoice-{number}.pdf`. Resolves
/// once the file is on disk.
pub async fn export_invoice_pdf(
    invoice: &Invoice,
    template: &DocumentTemplate,
    out_dir: &Path,
) -> Result<PathBuf> {
    let inv = invoice.clone();
    let tpl = template.clone();
    let bytes = tokio::task::spawn_blocking(move || render_invoice_pdf(&inv, &tpl))
        .await?
        .map_err(|e| {
            error!("rendering invoice {} failed: {e}", invoice.invoice_number);
            e
        })?;

    tokio::fs::create_dir_all(out_dir).await?;
    let path = out_dir.join(invoice_filename(invoice));
    tokio::fs::write(&path, &bytes).await?;

    info!(
        "exported invoice {} to {} ({} bytes)",
        invoice.invoice_number,
        path.display(),
        bytes.len()
    );
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pdf::layout::tests::sample_invoice;

    #[tokio::test]
    async fn export_writes_named_pdf() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("exports");
        let path = export_invoice_pdf(&sample_invoice(), &DocumentTemplate::default(), &out)
            .await
            .unwrap();

        assert_eq!(path, out.join("Invoice-INV-2508-76430.pdf"));
        let bytes = tokio::fs::read(&path).await.unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[tokio::test]
    async fn export_propagates_render_errors() {
        let dir = tempfile::tempdir().unwrap();
        let mut template = DocumentTemplate::default();
        template.font_path = Some(dir.path().join("nope.ttf"));
        let res = export_invoice_pdf(&sample_invoice(), &template, dir.path()).await;
        assert!(res.is_err());
        assert!(!dir.path().join("Invoice-INV-2508-76430.pdf").exists());
    }

    #[test]
    fn download_dir_prefers_explicit_then_settings() {
        let settings = Settings {
            download_dir: "/srv/invoices".into(),
            ..Settings::default()
        };
        assert_eq!(
            resolve_download_dir(Some(Path::new("/tmp/x")), &settings),
            PathBuf::from("/tmp/x")
        );
        assert_eq!(
            resolve_download_dir(None, &settings),
            PathBuf::from("/srv/invoices")
        );
    }
}
