//! Credential container with automatic memory zeroing.
//!
//! # Security
//! - Username and password live in `Zeroizing<String>` containers
//! - Memory is cleared when the credentials go out of scope
//! - `Debug` output never includes the password

use zeroize::{Zeroize, Zeroizing};

/// Database login collected from flags, environment, or the prompt.
///
/// An empty password is a valid password (the prompt default), so
/// `has_password()` reports whether anything was typed rather than whether
/// the field exists.
///
/// # Example
///
/// ```rust
/// use dbbackup_core::security::Credentials;
///
/// let creds = Credentials::new("root".to_string(), "secret".to_string());
/// assert_eq!(creds.username(), "root");
/// assert!(creds.has_password());
/// assert!(!format!("{:?}", creds).contains("secret"));
/// ```
#[derive(Clone, Zeroize)]
#[zeroize(drop)]
pub struct Credentials {
    username: Zeroizing<String>,
    password: Zeroizing<String>,
}

impl Credentials {
    /// Creates new credentials with automatic memory zeroing.
    pub fn new(username: String, password: String) -> Self {
        Self {
            username: Zeroizing::new(username),
            password: Zeroizing::new(password),
        }
    }

    /// Gets the username.
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Gets the password for handing to a driver. Never log the result.
    pub fn password(&self) -> &str {
        &self.password
    }

    /// Checks if a non-empty password is present without exposing it.
    pub fn has_password(&self) -> bool {
        !self.password.is_empty()
    }
}

impl Default for Credentials {
    fn default() -> Self {
        Self::new("root".to_string(), String::new())
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username())
            .field("password", &if self.has_password() { "****" } else { "" })
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credentials_new() {
        let creds = Credentials::new("testuser".to_string(), "testpass".to_string());
        assert_eq!(creds.username(), "testuser");
        assert_eq!(creds.password(), "testpass");
        assert!(creds.has_password());
    }

    #[test]
    fn test_credentials_empty_password() {
        let creds = Credentials::new("testuser".to_string(), String::new());
        assert!(!creds.has_password());
        assert_eq!(creds.password(), "");
    }

    #[test]
    fn test_credentials_default_matches_prompt_defaults() {
        let creds = Credentials::default();
        assert_eq!(creds.username(), "root");
        assert!(!creds.has_password());
    }

    #[test]
    fn test_credentials_debug_masks_password() {
        let creds = Credentials::new("admin".to_string(), "hunter2".to_string());
        let debug = format!("{:?}", creds);

        assert!(debug.contains("admin"));
        assert!(debug.contains("****"));
        assert!(!debug.contains("hunter2"));
    }
}
