//! Login and logout commands - Store or forget the dashboard session cookie

use anyhow::{Context, Result};
use owo_colors::OwoColorize;
use std::io::{self, BufRead, Write};

use super::utils;
use cursor_usage::session::{SessionCredential, SessionStore, SESSION_COOKIE};

/// Save a session cookie, prompting for it when not given
pub fn execute(cookie: Option<String>, store: &SessionStore) -> Result<()> {
    let input = match cookie {
        Some(value) => value,
        None => prompt_cookie(io::stdin().lock())?,
    };
    save(&input, store)?;
    println!("{} session saved", "Logged in:".green());
    Ok(())
}

fn prompt_cookie(mut input: impl BufRead) -> Result<String> {
    eprintln!(
        "Paste the value of the {} cookie from a logged-in cursor.com browser tab.",
        SESSION_COOKIE.bold()
    );
    eprint!("Cookie: ");
    io::stderr().flush()?;

    let mut line = String::new();
    input
        .read_line(&mut line)
        .context("Failed to read cookie from stdin")?;
    Ok(line)
}

fn save(input: &str, store: &SessionStore) -> Result<SessionCredential> {
    let credential = SessionCredential::parse(input)?;
    store.save(&credential).context("Failed to save session")?;
    tracing::debug!("session credential stored");
    Ok(credential)
}

/// Remove the stored session cookie
pub fn logout(store: &SessionStore) -> Result<()> {
    if store.clear()? {
        println!("{} session removed", "Logged out:".green());
    } else {
        println!("No stored session");
    }
    Ok(())
}

/// Report whether a session cookie is stored and when it was saved
pub fn status(store: &SessionStore) -> Result<String> {
    let stored = store.load().context("Failed to read stored session")?;
    Ok(match stored {
        Some(credential) => format!(
            "{} session saved {}",
            "Logged in:".green(),
            utils::format_timestamp(credential.saved_at)
        ),
        None => "Not logged in. Run `cursor-usage login` to store a session.".to_string(),
    })
}
