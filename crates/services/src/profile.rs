use std::sync::Arc;

use storage::repository::ProgressStore;
use vocab_core::Clock;
use vocab_core::model::User;

use crate::error::ProfileError;

/// Registration and data reset for the single local learner.
#[derive(Clone)]
pub struct ProfileService {
    clock: Clock,
    store: Arc<dyn ProgressStore>,
}

impl ProfileService {
    #[must_use]
    pub fn new(clock: Clock, store: Arc<dyn ProgressStore>) -> Self {
        Self { clock, store }
    }

    /// Register the learner, replacing any earlier registration.
    ///
    /// # Errors
    ///
    /// `ProfileError::User` for a blank name, `ProfileError::Storage` if saving fails.
    pub async fn register(&self, name: &str) -> Result<User, ProfileError> {
        let user = User::new(name, self.clock.now())?;
        self.store.save_user(&user).await?;
        tracing::info!(name = user.name(), "registered user");
        Ok(user)
    }

    /// # Errors
    ///
    /// Returns `ProfileError::Storage` if the store cannot be read.
    pub async fn current_user(&self) -> Result<Option<User>, ProfileError> {
        Ok(self.store.load_user().await?)
    }

    /// Drop the registration together with every score and mastery entry.
    ///
    /// # Errors
    ///
    /// Returns `ProfileError::Storage` if the delete fails.
    pub async fn clear_all(&self) -> Result<(), ProfileError> {
        self.store.clear_all().await?;
        tracing::info!("cleared all learner data");
        Ok(())
    }
}
