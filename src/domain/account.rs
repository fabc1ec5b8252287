//! Account credentials for the vendor portal

use std::fmt;

use serde::Deserialize;

/// Account credentials supplied by the host harness
#[derive(Clone, Deserialize)]
pub struct AccountFields {
    pub login: String,
    pub password: String,
}

impl AccountFields {
    pub fn new(login: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            login: login.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for AccountFields {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccountFields")
            .field("login", &self.login)
            .field("password", &"***")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_output_hides_password() {
        let fields = AccountFields::new("jane", "hunter2");
        let printed = format!("{:?}", fields);
        assert!(printed.contains("jane"));
        assert!(!printed.contains("hunter2"));
    }
}
