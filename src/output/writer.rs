//! Plain text email list output

use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Joins emails with newlines, without a trailing newline
pub fn format_emails(emails: &[String]) -> String {
    emails.join("\n")
}

/// Writes one email per line to `path`, replacing any existing file
///
/// A leading `~` in the path is expanded to the home directory.
///
/// # Returns
///
/// * `Ok(PathBuf)` - The path actually written
/// * `Err(io::Error)` - The file could not be created or written
pub fn write_emails(path: &Path, emails: &[String]) -> io::Result<PathBuf> {
    let path = expand_home(path);

    let mut file = File::create(&path)?;
    file.write_all(format_emails(emails).as_bytes())?;
    file.flush()?;

    Ok(path)
}

/// Replaces a leading `~` component with the user's home directory
///
/// Paths without one, or platforms with no known home directory, are
/// returned unchanged.
pub fn expand_home(path: &Path) -> PathBuf {
    let Ok(rest) = path.strip_prefix("~") else {
        return path.to_path_buf();
    };

    match dirs::home_dir() {
        Some(home) => home.join(rest),
        None => path.to_path_buf(),
    }
}
