pub mod auth;
pub mod config;
pub mod monitor;
pub mod task;

use taskmaster_core::TaskDb;

/// The signed-in owner, or a readable error if nobody is.
pub fn require_session(db: &TaskDb) -> Result<String, Box<dyn std::error::Error>> {
    db.session_owner()?
        .ok_or_else(|| "not signed in (run `taskmaster-cli auth login <user>`)".into())
}
