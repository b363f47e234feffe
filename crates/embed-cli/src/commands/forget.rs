//! `embed forget` – drop one cached entry

use anyhow::Result;
use colored::Colorize;
use embed_core::ContentService;
use std::io::Write;

/// Unset the cached content for one request.
///
/// # Errors
///
/// Returns an error if the request cannot be resolved from configuration or
/// writing fails.
pub fn execute<W: Write>(
    service: &ContentService,
    path: &str,
    selector: &str,
    base_url: &str,
    mut writer: W,
) -> Result<()> {
    service.forget(base_url, path, selector)?;
    writeln!(
        writer,
        "{} Forgot cached content for \"{base_url}{path}\" and selector \"{selector}\"",
        "✓".green()
    )?;
    Ok(())
}
