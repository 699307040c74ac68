//! Load-run artifacts: the CLI transcript and the placeholder HTML
//! report written when the worker fails to produce a real one. Both
//! always exist after a run so the CI job has something to archive.

use anyhow::{Context, Result};
use chrono::Local;
use std::path::Path;
use tokio::fs;

pub fn escape_html(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Writes the worker's captured output as a plain-text transcript.
pub async fn write_transcript(path: &Path, stdout: &str, stderr: &str) -> Result<()> {
    let contents = format!(
        "captured at {}\n=== WORKER STDOUT ===\n{stdout}\n=== WORKER STDERR ===\n{stderr}\n",
        Local::now().to_rfc3339(),
    );
    fs::write(path, contents)
        .await
        .with_context(|| format!("failed to write transcript to {}", path.display()))
}

/// Writes a minimal HTML report embedding the escaped transcript, used
/// when the worker exits badly or produces no report of its own.
pub async fn synthesize_placeholder(
    path: &Path,
    exit_code: Option<i32>,
    transcript: &str,
) -> Result<()> {
    let code = exit_code
        .map(|c| c.to_string())
        .unwrap_or_else(|| "unknown".to_string());
    let html = format!(
        "<html><head><title>Load report</title></head><body>\
         <h1>Load run did not produce an HTML report</h1>\
         <p>Return code: {code}</p>\
         <h2>CLI output</h2><pre>{}</pre>\
         </body></html>",
        escape_html(transcript)
    );
    fs::write(path, html)
        .await
        .with_context(|| format!("failed to write placeholder report to {}", path.display()))
}
