use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum UserError {
    #[error("user name cannot be empty")]
    EmptyName,
}

/// The single local learner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    name: String,
    registered_at: DateTime<Utc>,
}

impl User {
    /// # Errors
    ///
    /// Returns `UserError::EmptyName` if the trimmed name is empty.
    pub fn new(name: impl AsRef<str>, registered_at: DateTime<Utc>) -> Result<Self, UserError> {
        let name = name.as_ref().trim();
        if name.is_empty() {
            return Err(UserError::EmptyName);
        }
        Ok(Self {
            name: name.to_owned(),
            registered_at,
        })
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn registered_at(&self) -> DateTime<Utc> {
        self.registered_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::fixed_now;

    #[test]
    fn name_is_trimmed_and_required() {
        let user = User::new("  Aiko ", fixed_now()).unwrap();
        assert_eq!(user.name(), "Aiko");
        assert_eq!(User::new("\t", fixed_now()).unwrap_err(), UserError::EmptyName);
    }
}
