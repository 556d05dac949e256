//! Session state: who is signed in, and the account directory behind the mock authentication.

mod accounts;
mod manager;

pub use accounts::AccountDirectory;
pub use manager::{AuthOutcome, SessionManager, SessionSnapshot};
