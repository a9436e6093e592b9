//! Stable anonymous guest identity, persisted in local storage.

use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use tracing::{debug, warn};
use uuid::Uuid;

/// Return this client's stable guest identifier, generating one on first use.
///
/// The identifier is read from the file at `path`; when absent a fresh
/// `guest-<suffix>` is generated and persisted, so every later call (and
/// every later run sharing the same storage) returns the same value. A failed
/// write is not fatal: the generated identifier is still returned and used
/// for the lifetime of the process. Guests have no logout, so the identity is
/// never destroyed here.
pub fn get_or_create_guest_id(path: &Path) -> String {
    match fs::read_to_string(path) {
        Ok(contents) => {
            let existing = contents.trim();
            if !existing.is_empty() {
                return existing.to_string();
            }
        }
        Err(err) if err.kind() == ErrorKind::NotFound => {}
        Err(err) => warn!(
            path = %path.display(),
            error = %err,
            "failed to read guest identity; generating a new one"
        ),
    }

    let guest_id = format!("guest-{}", Uuid::new_v4().simple());
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        let _ = fs::create_dir_all(parent);
    }
    match fs::write(path, &guest_id) {
        Ok(()) => debug!(path = %path.display(), "persisted new guest identity"),
        Err(err) => warn!(
            path = %path.display(),
            error = %err,
            "failed to persist guest identity; continuing with an in-memory one"
        ),
    }
    guest_id
}
