//! Pull the usage-event export from the Cursor dashboard
//!
//! The export is fetched with the stored session cookie, written to a temp
//! file next to the destination and renamed into place only after the whole
//! body arrived. A lock file beside the destination keeps a second pull from
//! writing to it at the same time.

use chrono::{DateTime, Utc};
use reqwest::blocking::Client;
use reqwest::header::{ACCEPT, COOKIE};
use reqwest::StatusCode;
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

use crate::error::PullError;
use crate::session::SessionCredential;
use crate::storage::write_atomic;

/// A completed pull
#[derive(Debug)]
pub struct PullOutcome {
    pub path: PathBuf,
    pub content: String,
    pub size: u64,
    pub synced_at: DateTime<Utc>,
}

/// Fetches the dashboard export over HTTP
pub struct Puller {
    client: Client,
    url: Url,
    timeout: Duration,
}

impl Puller {
    pub fn new(url: Url, timeout: Duration) -> Result<Self, PullError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("cursor-usage/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| PullError::Network(e.to_string()))?;
        Ok(Self {
            client,
            url,
            timeout,
        })
    }

    /// Download the export to `destination`
    ///
    /// On any failure the previous file at `destination` is left as it was.
    pub fn pull(
        &self,
        credential: &SessionCredential,
        destination: &Path,
    ) -> Result<PullOutcome, PullError> {
        let _lock = PullLock::acquire(destination)?;

        tracing::info!(url = %self.url, "pulling usage export");
        let content = self.fetch(credential)?;

        write_atomic(destination, content.as_bytes())?;
        tracing::info!(path = %destination.display(), bytes = content.len(), "export saved");

        Ok(PullOutcome {
            path: destination.to_path_buf(),
            size: content.len() as u64,
            content,
            synced_at: Utc::now(),
        })
    }

    fn fetch(&self, credential: &SessionCredential) -> Result<String, PullError> {
        let response = self
            .client
            .get(self.url.clone())
            .header(COOKIE, credential.cookie_header())
            .header(ACCEPT, "text/csv")
            .timeout(self.timeout)
            .send()
            .map_err(|e| self.classify(e))?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(PullError::Unauthorized);
        }
        if !status.is_success() {
            return Err(PullError::Network(format!("server returned {}", status)));
        }

        let body = response.text().map_err(|e| self.classify(e))?;
        check_csv_body(&body)?;
        Ok(body)
    }

    fn classify(&self, err: reqwest::Error) -> PullError {
        if err.is_timeout() {
            PullError::Timeout(self.timeout)
        } else {
            PullError::Network(err.to_string())
        }
    }
}

/// Reject bodies that are not a CSV export
///
/// An expired session gets the dashboard's HTML login page with a 200.
fn check_csv_body(body: &str) -> Result<(), PullError> {
    let head = body.trim_start_matches('\u{feff}').trim_start();
    if head.is_empty() {
        return Err(PullError::Network("empty response".to_string()));
    }
    if head.starts_with('<') {
        return Err(PullError::Unauthorized);
    }
    Ok(())
}

/// Exclusive claim on a pull destination, released on drop
#[derive(Debug)]
struct PullLock {
    path: PathBuf,
}

impl PullLock {
    fn acquire(destination: &Path) -> Result<Self, PullError> {
        let path = lock_path(destination);
        if let Some(dir) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(dir)?;
        }

        match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(mut file) => {
                // Owner pid, for anyone inspecting a stale lock
                let _ = writeln!(file, "{}", std::process::id());
                Ok(Self { path })
            }
            Err(e) if e.kind() == ErrorKind::AlreadyExists => Err(PullError::InProgress(
                destination.display().to_string(),
            )),
            Err(e) => Err(e.into()),
        }
    }
}

impl Drop for PullLock {
    fn drop(&mut self) {
        if let Err(e) = fs::remove_file(&self.path) {
            tracing::warn!(path = %self.path.display(), "failed to remove pull lock: {}", e);
        }
    }
}

fn lock_path(destination: &Path) -> PathBuf {
    let mut name = destination
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".lock");
    destination.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{BufRead, BufReader};
    use std::net::TcpListener;
    use std::thread;

    /// Serve one canned HTTP response on localhost, returning the URL
    fn serve_once(response: String) -> (Url, thread::JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut reader = BufReader::new(stream.try_clone().unwrap());
            let mut request = String::new();
            loop {
                let mut line = String::new();
                if reader.read_line(&mut line).unwrap() == 0 || line == "\r\n" {
                    break;
                }
                request.push_str(&line);
            }
            stream.write_all(response.as_bytes()).unwrap();
            request
        });
        let url = Url::parse(&format!("http://{}/export.csv", addr)).unwrap();
        (url, handle)
    }

    fn http(status: &str, content_type: &str, body: &str) -> String {
        format!(
            "HTTP/1.1 {}\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            status,
            content_type,
            body.len(),
            body
        )
    }

    fn credential() -> SessionCredential {
        SessionCredential::parse("tok123").unwrap()
    }

    #[test]
    fn test_pull_writes_destination_and_sends_cookie() {
        let body = "Date,Model,Cost\n2025-10-01,gpt-4,$1.00\n";
        let (url, server) = serve_once(http("200 OK", "text/csv", body));
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("usage.csv");

        let puller = Puller::new(url, Duration::from_secs(5)).unwrap();
        let outcome = puller.pull(&credential(), &dest).unwrap();

        assert_eq!(outcome.content, body);
        assert_eq!(outcome.size, body.len() as u64);
        assert_eq!(fs::read_to_string(&dest).unwrap(), body);
        assert!(!lock_path(&dest).exists());

        let request = server.join().unwrap().to_lowercase();
        assert!(request.contains("cookie: workoscursorsessiontoken=tok123"));
    }

    #[test]
    fn test_unauthorized_keeps_existing_file() {
        let (url, server) = serve_once(http("401 Unauthorized", "text/plain", "no"));
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("usage.csv");
        fs::write(&dest, "old,data\n").unwrap();

        let puller = Puller::new(url, Duration::from_secs(5)).unwrap();
        let err = puller.pull(&credential(), &dest).unwrap_err();
        server.join().unwrap();

        assert!(matches!(err, PullError::Unauthorized));
        assert_eq!(fs::read_to_string(&dest).unwrap(), "old,data\n");
        assert!(!lock_path(&dest).exists());
    }

    #[test]
    fn test_login_page_is_unauthorized() {
        let (url, server) = serve_once(http("200 OK", "text/html", "<!DOCTYPE html><html>"));
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("usage.csv");

        let puller = Puller::new(url, Duration::from_secs(5)).unwrap();
        let err = puller.pull(&credential(), &dest).unwrap_err();
        server.join().unwrap();

        assert!(matches!(err, PullError::Unauthorized));
        assert!(!dest.exists());
    }

    #[test]
    fn test_server_error_is_network() {
        let (url, server) = serve_once(http("500 Internal Server Error", "text/plain", "x"));
        let dir = tempfile::tempdir().unwrap();
        let puller = Puller::new(url, Duration::from_secs(5)).unwrap();
        let err = puller
            .pull(&credential(), &dir.path().join("usage.csv"))
            .unwrap_err();
        server.join().unwrap();
        assert!(matches!(err, PullError::Network(_)));
    }

    #[test]
    fn test_slow_server_times_out() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let server = thread::spawn(move || {
            let (stream, _) = listener.accept().unwrap();
            thread::sleep(Duration::from_millis(1500));
            drop(stream);
        });

        let url = Url::parse(&format!("http://{}/export.csv", addr)).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("usage.csv");
        fs::write(&dest, "old\n").unwrap();

        let puller = Puller::new(url, Duration::from_millis(200)).unwrap();
        let err = puller.pull(&credential(), &dest).unwrap_err();
        server.join().unwrap();

        assert!(matches!(err, PullError::Timeout(_)));
        assert_eq!(fs::read_to_string(&dest).unwrap(), "old\n");
    }

    #[test]
    fn test_second_pull_rejected_while_locked() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("usage.csv");

        let held = PullLock::acquire(&dest).unwrap();
        let err = PullLock::acquire(&dest).unwrap_err();
        assert!(matches!(err, PullError::InProgress(_)));

        drop(held);
        assert!(PullLock::acquire(&dest).is_ok());
    }

    #[test]
    fn test_check_csv_body() {
        assert!(check_csv_body("a,b\n1,2\n").is_ok());
        assert!(matches!(check_csv_body("  \n"), Err(PullError::Network(_))));
        assert!(matches!(
            check_csv_body("\n<html>"),
            Err(PullError::Unauthorized)
        ));
    }

    #[test]
    fn test_lock_path() {
        assert_eq!(
            lock_path(Path::new("/tmp/usage.csv")),
            PathBuf::from("/tmp/usage.csv.lock")
        );
    }
}
