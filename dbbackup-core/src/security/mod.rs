//! Credential handling.
//!
//! Passwords are held in `Zeroizing` containers and never appear in logs,
//! error messages, or `Debug` output.

mod credentials;

pub use credentials::Credentials;
