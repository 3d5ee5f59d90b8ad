//! One-shot CLI modes
//!
//! `--extract` prints the events found in ICS files; `--analyze` runs the
//! whole upload batch through the LLM and prints the report.

use aical_calendar::upload::UNSUPPORTED_FILES_WARNING;
use aical_calendar::{extract_events, process_uploads, FileKind, UploadFile};
use aical_core::prompt::NO_DATA_MESSAGE;
use aical_core::{render_error_html, render_html, LlmClient};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Read files in order. Unreadable files become per-file error messages.
async fn read_uploads(paths: &[PathBuf]) -> (Vec<UploadFile>, Vec<String>) {
    let mut files = Vec::with_capacity(paths.len());
    let mut errors = Vec::new();

    for path in paths {
        let name = display_name(path);
        match tokio::fs::read(path).await {
            Ok(bytes) => files.push(UploadFile::new(name, bytes)),
            Err(e) => errors.push(format!("Error processing {}: {}", name, e)),
        }
    }

    (files, errors)
}

/// Print events from the given `.ics` files as one JSON array
pub async fn run_extract(paths: &[PathBuf]) -> anyhow::Result<()> {
    let (files, errors) = read_uploads(paths).await;
    for error in &errors {
        eprintln!("{}", error);
    }

    let mut events = Vec::new();
    let mut ignored = false;

    for file in &files {
        if FileKind::classify(&file.name) == FileKind::Calendar {
            events.extend(extract_events(&String::from_utf8_lossy(&file.bytes)));
        } else {
            warn!("Skipping {}: not an .ics file", file.name);
            ignored = true;
        }
    }

    if ignored {
        eprintln!("{}", UNSUPPORTED_FILES_WARNING);
    }

    info!("Extracted {} events from {} files", events.len(), files.len());
    println!("{}", serde_json::to_string_pretty(&events)?);

    Ok(())
}

/// Analyse the given files and print the model's report
pub async fn run_analyze(
    llm: &LlmClient,
    paths: &[PathBuf],
    prompt: Option<String>,
    html: bool,
) -> anyhow::Result<()> {
    let (files, read_errors) = read_uploads(paths).await;
    let outcome = process_uploads(&files, llm).await;

    for message in read_errors.iter().chain(&outcome.errors).chain(&outcome.warnings) {
        eprintln!("{}", message);
    }

    let request = outcome.analysis_request(prompt.unwrap_or_default());
    if !request.has_data() {
        anyhow::bail!(NO_DATA_MESSAGE);
    }

    match llm.generate(&request.compose()).await {
        Ok(text) if html => println!("{}", render_html(&text)),
        Ok(text) => println!("{}", text.trim()),
        Err(e) => {
            if html {
                println!("{}", render_error_html(&e.to_string()));
            }
            anyhow::bail!("Could not get analysis. {}", e);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_read_uploads_records_missing_files() {
        let dir = tempfile::tempdir().unwrap();
        let present = dir.path().join("work.ics");
        std::fs::write(&present, "BEGIN:VEVENT\nSUMMARY:Sync\nEND:VEVENT\n").unwrap();
        let missing = dir.path().join("missing.ics");

        let (files, errors) = read_uploads(&[present, missing]).await;

        assert_eq!(files.len(), 1);
        assert_eq!(files[0].name, "work.ics");
        assert_eq!(errors.len(), 1);
        assert!(errors[0].starts_with("Error processing missing.ics: "));
    }

    #[tokio::test]
    async fn test_run_extract_skips_unsupported() {
        let dir = tempfile::tempdir().unwrap();
        let ics = dir.path().join("a.ics");
        let txt = dir.path().join("notes.txt");
        std::fs::write(&ics, "BEGIN:VEVENT\nUID:1\nEND:VEVENT\n").unwrap();
        std::fs::write(&txt, "not a calendar").unwrap();

        assert!(run_extract(&[ics, txt]).await.is_ok());
    }
}
