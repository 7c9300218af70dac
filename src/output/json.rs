//! JSON emission for crawl results

use crate::output::types::CrawlResult;
use crate::Result;
use std::io::Write;
use std::path::Path;

/// Serializes a crawl result to a JSON string
pub fn result_to_json(result: &CrawlResult, pretty: bool) -> Result<String> {
    let json = if pretty {
        serde_json::to_string_pretty(result)?
    } else {
        serde_json::to_string(result)?
    };
    Ok(json)
}

/// Writes a crawl result as JSON to the given writer, with a trailing
/// newline
pub fn write_result<W: Write>(result: &CrawlResult, writer: &mut W, pretty: bool) -> Result<()> {
    let json = result_to_json(result, pretty)?;
    writer.write_all(json.as_bytes())?;
    writer.write_all(b"\n")?;
    Ok(())
}

/// Writes a crawl result as JSON to a file
pub fn write_result_to_file(result: &CrawlResult, path: &Path, pretty: bool) -> Result<()> {
    let mut file = std::fs::File::create(path)?;
    write_result(result, &mut file, pretty)?;
    tracing::info!("Result written to {}", path.display());
    Ok(())
}
