use serde::Serialize;
use tracing::{debug, warn};

use crate::client::BookishClient;
use crate::engine::StorageEngine;
use crate::model::{Account, Book};
use crate::{BookishError, Result};

/// The books a reader has read and wants to read
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadingProfile {
    /// books from the reading history, in catalog order
    pub read: Vec<Book>,
    /// books from the want-to-read list, in catalog order
    pub want_to_read: Vec<Book>,
}

/// Tracks which account is logged in on top of a [`BookishClient`].
///
/// Only the account id is remembered; the account itself is fetched again on demand.
#[derive(Debug, Clone)]
pub struct Session<E: StorageEngine> {
    client: BookishClient<E>,
    user_id: Option<String>,
}

impl<E: StorageEngine> Session<E> {
    /// a logged-out session
    pub fn new(client: BookishClient<E>) -> Self {
        Session {
            client,
            user_id: None,
        }
    }

    /// a session for an account id remembered from earlier. The id is only checked when the
    /// account is next fetched.
    pub fn resume(client: BookishClient<E>, user_id: impl Into<String>) -> Self {
        Session {
            client,
            user_id: Some(user_id.into()),
        }
    }

    /// the client this session talks through
    pub fn client(&self) -> &BookishClient<E> {
        &self.client
    }

    /// the id of the logged in account
    pub fn user_id(&self) -> Option<&str> {
        self.user_id.as_deref()
    }

    /// logs in and remembers the account
    pub fn login(&mut self, username: &str, password: &str) -> Result<Account> {
        let account = self.client.login(username, password)?;
        self.user_id = Some(account.id().to_string());
        debug!("logged in as {}", account.username());
        Ok(account)
    }

    /// registers a reader and logs in as them
    pub fn register(&mut self, username: &str, password: &str) -> Result<Account> {
        let user = self.client.register(username, password)?;
        self.user_id = Some(user.id.clone());
        Ok(Account::Regular(user))
    }

    /// forgets the logged in account
    pub fn logout(&mut self) {
        self.user_id = None;
    }

    /// Fetches the logged in account. If it can no longer be fetched the session is cleared
    /// and `None` is returned.
    pub fn current_user(&mut self) -> Option<Account> {
        let id = self.user_id.clone()?;
        match self.client.fetch_user_by_id(&id) {
            Ok(account) => Some(account),
            Err(e) => {
                warn!("Session check failed: {}", e);
                self.user_id = None;
                None
            }
        }
    }

    /// true if the logged in account is an admin
    pub fn is_admin(&mut self) -> bool {
        matches!(self.current_user(), Some(Account::Admin(_)))
    }

    /// returns the logged in admin account
    ///
    /// # Errors
    /// `BookishError::Unauthorized` if nobody is logged in or the account is a reader
    pub fn require_admin(&mut self) -> Result<Account> {
        match self.current_user() {
            Some(account @ Account::Admin(_)) => Ok(account),
            Some(Account::Regular(_)) => Err(BookishError::Unauthorized(
                "Admin access required".to_string(),
            )),
            None => Err(BookishError::Unauthorized("Not logged in".to_string())),
        }
    }

    /// Resolves the logged in reader's lists into books. Admin accounts have no lists and
    /// get an empty profile.
    ///
    /// # Errors
    /// `BookishError::Unauthorized` if nobody is logged in
    pub fn reading_profile(&mut self) -> Result<ReadingProfile> {
        match self.current_user() {
            Some(Account::Regular(user)) => Ok(ReadingProfile {
                read: self.client.fetch_books_by_ids(&user.reading_history)?,
                want_to_read: self.client.fetch_books_by_ids(&user.want_to_read)?,
            }),
            Some(Account::Admin(_)) => Ok(ReadingProfile::default()),
            None => Err(BookishError::Unauthorized("Not logged in".to_string())),
        }
    }
}
