//! Per-invocation MySQL message store.
//!
//! One connection is opened per invocation after validation passes and is
//! consumed by `close()`, so release is guaranteed on every path. There is
//! no pooling and no retry. The POST insert runs inside an explicit
//! transaction: commit on success, rollback before the error propagates.

use chrono::{DateTime, Utc};
use sqlx::mysql::{MySqlConnectOptions, MySqlConnection, MySqlRow};
use sqlx::{ConnectOptions, Connection, Row};

use postbox_core::repository::{CredentialSource, MessageStore, MessageStoreFactory};
use postbox_types::credentials::DbCredentials;
use postbox_types::error::RepositoryError;
use postbox_types::message::{Message, NewMessage};

const SELECT_ALL: &str = "SELECT id, content, user_id, created_at FROM messages";
const SELECT_BY_ID: &str = "SELECT id, content, user_id, created_at FROM messages WHERE id = ?";
const INSERT: &str = "INSERT INTO messages (content, user_id) VALUES (?, ?)";

/// One open MySQL session against the messages table.
pub struct MysqlMessageStore {
    conn: MySqlConnection,
}

impl MysqlMessageStore {
    /// Open a single connection with the given credentials.
    pub async fn connect(creds: &DbCredentials) -> Result<Self, RepositoryError> {
        let options = MySqlConnectOptions::new()
            .host(&creds.host)
            .port(creds.port_number()?)
            .username(&creds.username)
            .password(&creds.password)
            .database(&creds.dbname);
        let conn = options
            .connect()
            .await
            .map_err(|e| RepositoryError::Connection(e.to_string()))?;
        Ok(Self { conn })
    }
}

impl MessageStore for MysqlMessageStore {
    async fn fetch(&mut self, id: Option<u64>) -> Result<Vec<Message>, RepositoryError> {
        let rows = match id {
            Some(id) => {
                sqlx::query(SELECT_BY_ID)
                    .bind(id)
                    .fetch_all(&mut self.conn)
                    .await
            }
            None => sqlx::query(SELECT_ALL).fetch_all(&mut self.conn).await,
        }
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        rows.iter().map(message_from_row).collect()
    }

    async fn insert(&mut self, message: &NewMessage) -> Result<(), RepositoryError> {
        let mut tx = self
            .conn
            .begin()
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;
        let inserted = sqlx::query(INSERT)
            .bind(&message.content)
            .bind(&message.user_id)
            .execute(&mut *tx)
            .await;
        match inserted {
            Ok(_) => tx
                .commit()
                .await
                .map_err(|e| RepositoryError::Query(e.to_string())),
            Err(e) => {
                if let Err(rollback_err) = tx.rollback().await {
                    tracing::warn!(error = %rollback_err, "transaction rollback failed");
                }
                Err(RepositoryError::Query(e.to_string()))
            }
        }
    }

    async fn close(self) -> Result<(), RepositoryError> {
        self.conn
            .close()
            .await
            .map_err(|e| RepositoryError::Connection(e.to_string()))
    }
}

fn message_from_row(row: &MySqlRow) -> Result<Message, RepositoryError> {
    Ok(Message {
        id: row
            .try_get::<u64, _>("id")
            .map_err(|e| RepositoryError::Query(e.to_string()))?,
        content: row
            .try_get("content")
            .map_err(|e| RepositoryError::Query(e.to_string()))?,
        user_id: row
            .try_get("user_id")
            .map_err(|e| RepositoryError::Query(e.to_string()))?,
        created_at: row
            .try_get::<DateTime<Utc>, _>("created_at")
            .map_err(|e| RepositoryError::Query(e.to_string()))?,
    })
}

/// Opens one [`MysqlMessageStore`] per invocation: fetch the connection
/// secret, then connect.
pub struct MysqlStoreFactory<C: CredentialSource> {
    credentials: C,
    secret_id: String,
}

impl<C: CredentialSource> MysqlStoreFactory<C> {
    pub fn new(credentials: C, secret_id: impl Into<String>) -> Self {
        Self {
            credentials,
            secret_id: secret_id.into(),
        }
    }
}

impl<C: CredentialSource> MessageStoreFactory for MysqlStoreFactory<C> {
    type Store = MysqlMessageStore;

    async fn acquire(&self) -> Result<MysqlMessageStore, RepositoryError> {
        let creds = self.credentials.fetch(&self.secret_id).await?;
        MysqlMessageStore::connect(&creds).await
    }
}
