//! Pull command - Download the usage export from the Cursor dashboard

use anyhow::{bail, Context, Result};
use std::path::PathBuf;
use std::time::Duration;

use super::utils;
use cursor_usage::config;
use cursor_usage::error::PullError;
use cursor_usage::recent::RecentFiles;
use cursor_usage::remote::{PullOutcome, Puller};
use cursor_usage::session::{SessionCredential, SessionStore};
use cursor_usage::table;

/// Options for pull command
#[derive(Debug, Default)]
pub struct PullOptions {
    /// Destination file (defaults to the data directory)
    pub output: Option<PathBuf>,
    /// Use this cookie instead of the stored session
    pub cookie: Option<String>,
    /// Export URL override
    pub url: Option<String>,
    /// Timeout in seconds
    pub timeout: Option<u64>,
}

/// Result of a pull, for display
#[derive(Debug)]
pub struct PullSummary {
    pub outcome: PullOutcome,
    pub record_count: usize,
    pub parse_errors: usize,
}

/// Pull the export, then parse it and record it as recently opened
pub fn execute(
    options: &PullOptions,
    store: &SessionStore,
    recent: &RecentFiles,
) -> Result<PullSummary> {
    let credential = match &options.cookie {
        Some(cookie) => SessionCredential::parse(cookie)?,
        None => match store.load().context("Failed to read stored session")? {
            Some(credential) => credential,
            None => bail!("Not logged in. Run `cursor-usage login` first."),
        },
    };

    let destination = match &options.output {
        Some(path) => path.clone(),
        None => config::default_pull_destination()?,
    };
    let url = config::export_url(options.url.as_deref())?;
    let timeout = options
        .timeout
        .map(Duration::from_secs)
        .unwrap_or(config::DEFAULT_PULL_TIMEOUT);

    let puller = Puller::new(url, timeout)?;
    let outcome = puller
        .pull(&credential, &destination)
        .map_err(with_hint)?;

    let parsed = table::parse(&outcome.content);
    let record_count = parsed.table.records().len();
    utils::remember(recent, &outcome.path, outcome.size, record_count);

    Ok(PullSummary {
        record_count,
        parse_errors: parsed.errors.len(),
        outcome,
    })
}

fn with_hint(err: PullError) -> anyhow::Error {
    let hint = match &err {
        PullError::Unauthorized => {
            "The dashboard rejected the session; run `cursor-usage login` with a fresh cookie"
        }
        PullError::InProgress(_) => "Wait for the other pull to finish",
        _ => "Pull failed",
    };
    anyhow::Error::new(err).context(hint)
}

/// One-line summary of a finished pull
pub fn format_summary(summary: &PullSummary) -> String {
    let mut line = format!(
        "{} records ({}) saved to {}",
        summary.record_count,
        utils::format_size(summary.outcome.size),
        summary.outcome.path.display()
    );
    if summary.parse_errors > 0 {
        line.push_str(&format!(", {} rows with parse problems", summary.parse_errors));
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::utils::testutil::USAGE_CSV;
    use std::io::{BufRead, BufReader, Write};
    use std::net::TcpListener;
    use std::thread;

    fn serve(status: &'static str, body: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut reader = BufReader::new(stream.try_clone().unwrap());
            let mut line = String::new();
            while reader.read_line(&mut line).unwrap() > 0 && line != "\r\n" {
                line.clear();
            }
            let response = format!(
                "HTTP/1.1 {}\r\nContent-Type: text/csv\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status,
                body.len(),
                body
            );
            stream.write_all(response.as_bytes()).unwrap();
        });
        format!("http://{}/export", addr)
    }

    #[test]
    fn test_pull_requires_login() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::new(dir.path().join("session.json"));
        let recent = RecentFiles::new(dir.path().join("recent.json"));
        let options = PullOptions {
            output: Some(dir.path().join("usage.csv")),
            url: Some("http://127.0.0.1:9/export".to_string()),
            ..Default::default()
        };
        let err = execute(&options, &store, &recent).unwrap_err();
        assert!(err.to_string().contains("Not logged in"));
    }

    #[test]
    fn test_pull_saves_and_remembers() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::new(dir.path().join("session.json"));
        store
            .save(&SessionCredential::parse("tok").unwrap())
            .unwrap();
        let recent = RecentFiles::new(dir.path().join("recent.json"));
        let output = dir.path().join("usage.csv");

        let options = PullOptions {
            output: Some(output.clone()),
            url: Some(serve("200 OK", USAGE_CSV)),
            timeout: Some(5),
            ..Default::default()
        };
        let summary = execute(&options, &store, &recent).unwrap();

        assert_eq!(summary.record_count, 4);
        assert_eq!(summary.parse_errors, 0);
        assert_eq!(std::fs::read_to_string(&output).unwrap(), USAGE_CSV);
        assert_eq!(recent.list().unwrap()[0].record_count, 4);
        assert!(format_summary(&summary).starts_with("4 records"));
    }

    #[test]
    fn test_pull_unauthorized_hint() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::new(dir.path().join("session.json"));
        let recent = RecentFiles::new(dir.path().join("recent.json"));

        let options = PullOptions {
            output: Some(dir.path().join("usage.csv")),
            cookie: Some("expired".to_string()),
            url: Some(serve("403 Forbidden", "")),
            timeout: Some(5),
        };
        let err = execute(&options, &store, &recent).unwrap_err();
        assert!(err.to_string().contains("cursor-usage login"));
        assert!(recent.list().unwrap().is_empty());
    }
}
