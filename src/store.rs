//! Persistent user accounts backed by a fjall keyspace

use std::path::Path;
use std::sync::Arc;

use fjall::Keyspace;
use tokio::sync::Mutex;
use tokio::task;

use crate::AppError;
use crate::models::{NewUser, User};

/// Persistent user accounts, keyed by normalized email
#[derive(Clone)]
pub struct UserStore {
    users: Keyspace,
    // Serializes the check-then-insert of sign-ups
    write_lock: Arc<Mutex<()>>,
}

fn get_from_store(store: Keyspace, key: Vec<u8>) -> Result<Option<Vec<u8>>, AppError> {
    Ok(store.get(key)?.map(|v| v.to_vec()))
}

impl UserStore {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, AppError> {
        let db = fjall::Database::builder(path.as_ref()).open()?;
        let users = db.keyspace("users", fjall::KeyspaceCreateOptions::default)?;
        Ok(Self {
            users,
            write_lock: Arc::new(Mutex::new(())),
        })
    }

    #[tracing::instrument(name = "find_user", level = "debug", skip(self))]
    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let store = self.users.clone();
        let key = User::key_for(email).into_bytes();

        let maybe_bytes = task::spawn_blocking(move || get_from_store(store, key))
            .await
            .map_err(|e| AppError::storage(format!("lookup task failed: {e}")))??;

        match maybe_bytes {
            Some(bytes) => Ok(Some(postcard::from_bytes(&bytes)?)),
            None => {
                tracing::debug!("User not found");
                Ok(None)
            }
        }
    }

    /// Store a new account; a second account for the same email is rejected.
    #[tracing::instrument(name = "insert_user", level = "debug", skip(self, new_user), fields(email = %new_user.email))]
    pub async fn insert(&self, new_user: NewUser) -> Result<User, AppError> {
        let _guard = self.write_lock.lock().await;

        if self.find_by_email(&new_user.email).await?.is_some() {
            return Err(AppError::validation("Email already exists."));
        }

        let user = User::from(new_user);
        let key = User::key_for(&user.email).into_bytes();
        let bytes = postcard::to_stdvec(&user)?;
        let store = self.users.clone();

        task::spawn_blocking(move || store.insert(key, bytes))
            .await
            .map_err(|e| AppError::storage(format!("insert task failed: {e}")))??;

        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_user(email: &str) -> NewUser {
        NewUser {
            email: email.to_string(),
            first_name: "Ada".to_string(),
            password_hash: "sha256$salt$digest".to_string(),
        }
    }

    #[tokio::test]
    async fn test_insert_and_find() {
        let dir = tempfile::tempdir().unwrap();
        let store = UserStore::open(dir.path()).unwrap();

        assert!(store.find_by_email("ada@example.com").await.unwrap().is_none());

        store.insert(new_user("ada@example.com")).await.unwrap();
        let found = store.find_by_email("Ada@Example.com ").await.unwrap().unwrap();
        assert_eq!(found.email, "ada@example.com");
        assert_eq!(found.first_name, "Ada");
    }

    #[tokio::test]
    async fn test_duplicate_email_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let store = UserStore::open(dir.path()).unwrap();

        store.insert(new_user("ada@example.com")).await.unwrap();
        let err = store.insert(new_user("ADA@example.com")).await.unwrap_err();
        assert!(matches!(err, AppError::Validation { .. }));
        assert_eq!(err.message(), "Email already exists.");
    }
}
