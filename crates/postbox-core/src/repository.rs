//! Port traits implemented by the infrastructure layer.
//!
//! Uses native async fn in traits (`impl Future` returns, no async_trait
//! macro). Stores are opened per invocation and consumed on close, so the
//! handlers cannot forget to release the connection on any path.

use std::future::Future;

use postbox_types::credentials::DbCredentials;
use postbox_types::error::{RepositoryError, SecretError};
use postbox_types::message::{Message, NewMessage};

/// One open session against the messages store.
pub trait MessageStore: Send {
    /// Fetch all messages, or only the message with the given id.
    fn fetch(
        &mut self,
        id: Option<u64>,
    ) -> impl Future<Output = Result<Vec<Message>, RepositoryError>> + Send;

    /// Insert one message inside an explicit transaction.
    ///
    /// Implementations commit on success and roll back before returning
    /// the error on failure.
    fn insert(
        &mut self,
        message: &NewMessage,
    ) -> impl Future<Output = Result<(), RepositoryError>> + Send;

    /// Close the underlying connection.
    fn close(self) -> impl Future<Output = Result<(), RepositoryError>> + Send;
}

/// Opens one [`MessageStore`] per invocation.
///
/// Acquisition covers credential retrieval plus connection establishment,
/// and happens only after request validation has passed.
pub trait MessageStoreFactory: Send + Sync {
    type Store: MessageStore;

    fn acquire(&self) -> impl Future<Output = Result<Self::Store, RepositoryError>> + Send;
}

/// Resolves a secret id to database credentials.
pub trait CredentialSource: Send + Sync {
    fn fetch(
        &self,
        secret_id: &str,
    ) -> impl Future<Output = Result<DbCredentials, SecretError>> + Send;
}
