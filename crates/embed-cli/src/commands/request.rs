//! `embed request` – fetch content and print it between delimiter lines

use anyhow::Result;
use embed_core::{Content, ContentService, RequestSpec};
use serde_json::json;
use std::collections::BTreeMap;
use std::io::Write;

use crate::cli::OutputFormat;

/// Line printed before and after the extracted content.
pub const DELIMITER: &str = "###############";

/// Fetch content for `request` and write it to `writer`.
///
/// # Errors
///
/// Returns an error for configuration problems or when writing fails.
/// Upstream failures are not errors; they show up as empty content.
pub async fn execute<W: Write>(
    service: &ContentService,
    request: &RequestSpec,
    format: OutputFormat,
    mut writer: W,
) -> Result<Content> {
    let content = service.fetch_content(request).await?;

    match format {
        OutputFormat::Text => {
            writeln!(
                writer,
                "Result of your request to \"{}\" and selector \"{}\":",
                request.target(),
                request.selector()
            )?;
            writeln!(writer, "{DELIMITER}")?;
            writeln!(writer, "{}", content.value)?;
            writeln!(writer, "{DELIMITER}")?;
        },
        OutputFormat::Json => {
            let payload = json!({
                "target": request.target(),
                "selector": request.selector(),
                "content": content.value,
                "cached": content.cached,
                "warnings": content.warnings,
            });
            writeln!(writer, "{}", serde_json::to_string_pretty(&payload)?)?;
        },
    }

    Ok(content)
}

/// Build a request from CLI arguments.
pub fn build_request(
    path: &str,
    selector: &str,
    base_url: &str,
    params: &[(String, String)],
) -> RequestSpec {
    let parameters: BTreeMap<String, String> = params.iter().cloned().collect();
    RequestSpec::new(base_url, path, selector).with_parameters(parameters)
}
