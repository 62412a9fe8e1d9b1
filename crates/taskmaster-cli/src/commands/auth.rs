//! Session commands for CLI.
//!
//! A thin stand-in for the managed auth backend: the signed-in owner is
//! recorded locally, and every task operation is scoped to it.

use clap::Subcommand;
use taskmaster_core::TaskDb;

#[derive(Subcommand)]
pub enum AuthAction {
    /// Sign in as the given user
    Login {
        /// User identifier
        owner: String,
    },
    /// Sign out
    Logout,
    /// Print the signed-in user
    Whoami,
}

pub fn run(action: AuthAction) -> Result<(), Box<dyn std::error::Error>> {
    let db = TaskDb::open()?;

    match action {
        AuthAction::Login { owner } => {
            let owner = owner.trim();
            if owner.is_empty() {
                return Err("user identifier must not be empty".into());
            }
            db.set_session_owner(owner)?;
            println!("Signed in as {owner}");
        }
        AuthAction::Logout => {
            db.clear_session()?;
            println!("Signed out");
        }
        AuthAction::Whoami => match db.session_owner()? {
            Some(owner) => println!("{owner}"),
            None => println!("not signed in"),
        },
    }
    Ok(())
}
