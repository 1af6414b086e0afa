//! Interactive prompts on the terminal.
//!
//! Prompts go to stderr so stdout only carries page output.

use std::io::{self, BufRead, Write};

use labsite_client::delete::Confirm;
use url::Url;

/// Yes/no confirmation read from stdin. Anything but `y`/`yes` is a no.
#[derive(Debug, Default)]
pub struct StdinConfirm;

impl Confirm for StdinConfirm {
    fn confirm(&mut self, prompt: &str) -> bool {
        ask(&format!("{prompt} [y/N] "))
            .map(|answer| is_yes(&answer))
            .unwrap_or(false)
    }
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

/// Read the shared admin password.
///
/// The input is echoed; this mode is not a security boundary.
pub fn read_password() -> io::Result<String> {
    ask("Admin password: ").map(|line| line.trim_end_matches(['\r', '\n']).to_owned())
}

/// Tell the admin where to sign in.
pub fn announce_sign_in(url: &Url) {
    let mut err = io::stderr().lock();
    let _ = writeln!(err, "Open this URL in a browser to sign in:\n\n    {url}\n");
    let _ = writeln!(err, "Waiting for the sign-in to complete (Ctrl+C to cancel)...");
}

fn ask(prompt: &str) -> io::Result<String> {
    let mut err = io::stderr().lock();
    write!(err, "{prompt}")?;
    err.flush()?;

    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line)
}
