// SQLite-backed store for users and their elements

use crate::credentials::{generate_token, password_matches};
use crate::error::{Result, TrackerError};
use crate::models::{Element, ElementId, ElementState, NewElement, Token, User, UserId};
use crate::record::Record;
use crate::sorter;
use chrono::NaiveDate;
use rusqlite::{Connection, ErrorCode, OptionalExtension, Transaction, TransactionBehavior, params};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info, warn};

const CURRENT_VERSION: u32 = 1;
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Persistent store of users and elements.
///
/// Holds only the database path. Every operation opens its own connection and
/// drops it before returning, so nothing is cached between calls.
#[derive(Debug, Clone)]
pub struct Store {
    db_path: PathBuf,
}

impl Store {
    /// Open or create a store backed by the database file at `path`
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let db_path = path.as_ref().to_path_buf();

        if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let store = Self { db_path };
        store.initialize()?;
        Ok(store)
    }

    /// Path of the backing database file
    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    fn connect(&self) -> Result<Connection> {
        let conn = Connection::open(&self.db_path)?;
        conn.busy_timeout(BUSY_TIMEOUT)?;
        conn.pragma_update(None, "foreign_keys", true)?;
        Ok(conn)
    }

    /// Create the schema if missing. Existing data is left untouched.
    pub fn initialize(&self) -> Result<()> {
        debug!(path = ?self.db_path, "Creating database schema");
        let conn = self.connect()?;

        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS users (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                username TEXT NOT NULL UNIQUE,
                password TEXT NOT NULL,
                token TEXT NOT NULL UNIQUE
            );

            CREATE TABLE IF NOT EXISTS elements (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                type TEXT NOT NULL,
                lesson TEXT NOT NULL,
                date TEXT NOT NULL,
                comment TEXT,
                state TEXT NOT NULL,
                owner_id INTEGER NOT NULL,
                FOREIGN KEY (owner_id) REFERENCES users(id) ON DELETE CASCADE
            );

            CREATE INDEX IF NOT EXISTS idx_elements_owner ON elements(owner_id);
            "#,
        )?;

        let version: u32 = conn.pragma_query_value(None, "user_version", |row| row.get(0))?;
        if version == 0 {
            conn.pragma_update(None, "user_version", CURRENT_VERSION)?;
        } else if version != CURRENT_VERSION {
            warn!(version, expected = CURRENT_VERSION, "Unexpected schema version");
        }

        Ok(())
    }

    // ========================================================================
    // Users and tokens
    // ========================================================================

    /// Register a new user and return the token issued for it
    pub fn register_user(&self, username: &str, password: &str) -> Result<Token> {
        let mut conn = self.connect()?;
        let tx = Self::begin_write(&mut conn)?;

        let exists: bool = tx.query_row(
            "SELECT EXISTS(SELECT 1 FROM users WHERE username = ?1)",
            [username],
            |row| row.get(0),
        )?;
        if exists {
            return Err(TrackerError::DuplicateUser(username.to_string()));
        }

        let token = generate_token();
        tx.execute(
            "INSERT INTO users (username, password, token) VALUES (?1, ?2, ?3)",
            params![username, password, token.as_str()],
        )
        .map_err(|e| match e.sqlite_error_code() {
            Some(ErrorCode::ConstraintViolation) => TrackerError::DuplicateUser(username.to_string()),
            _ => TrackerError::Storage(e),
        })?;
        let user_id = tx.last_insert_rowid();
        tx.commit()?;

        info!(user_id, "Registered user");
        Ok(token)
    }

    /// Token of the user whose username and password both match
    pub fn token_for_credentials(&self, username: &str, password: &str) -> Result<Token> {
        let conn = self.connect()?;
        let user = Self::user_for_credentials(&conn, username, password)?;
        Ok(user.token)
    }

    /// True iff the token belongs to an existing user. A missing token is just invalid.
    pub fn is_token_valid(&self, token: Option<&str>) -> Result<bool> {
        let Some(token) = token else {
            return Ok(false);
        };

        let conn = self.connect()?;
        let exists: bool = conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM users WHERE token = ?1)",
            [token],
            |row| row.get(0),
        )?;
        Ok(exists)
    }

    /// Resolve a token to its user id
    pub fn user_id_for_token(&self, token: &str) -> Result<UserId> {
        let conn = self.connect()?;
        Self::resolve_owner(&conn, token)
    }

    /// Delete the user owning `token` together with all of its elements
    pub fn delete_user(&self, token: &str) -> Result<()> {
        let mut conn = self.connect()?;
        let tx = Self::begin_write(&mut conn)?;

        let user_id = Self::resolve_owner(&tx, token)?;
        Self::remove_user(&tx, user_id)?;
        tx.commit()?;

        Ok(())
    }

    /// Delete an account after checking the credentials belong to `token`
    pub fn delete_account(&self, username: &str, password: &str, token: &str) -> Result<()> {
        let mut conn = self.connect()?;
        let tx = Self::begin_write(&mut conn)?;

        let user_id = Self::resolve_owner(&tx, token)?;
        let user = Self::user_for_credentials(&tx, username, password)?;
        if user.id != user_id {
            warn!("delete_account: credentials do not match token");
            return Err(TrackerError::InvalidCredentials);
        }
        Self::remove_user(&tx, user_id)?;
        tx.commit()?;

        Ok(())
    }

    // ========================================================================
    // Elements
    // ========================================================================

    /// Insert an element owned by the token's user and return its id
    pub fn add_element(&self, element: &NewElement, token: &str) -> Result<ElementId> {
        let mut conn = self.connect()?;
        let tx = Self::begin_write(&mut conn)?;

        let owner_id = Self::resolve_owner(&tx, token)?;
        tx.execute(
            "INSERT INTO elements (type, lesson, date, comment, state, owner_id)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                element.kind,
                element.lesson,
                element.date,
                element.comment,
                element.state,
                owner_id
            ],
        )?;
        let element_id = tx.last_insert_rowid();
        tx.commit()?;

        debug!(owner_id, element_id, "Added element");
        Ok(element_id)
    }

    /// Set the state of one of the token owner's elements
    pub fn change_element_state(&self, state: ElementState, element_id: ElementId, token: &str) -> Result<()> {
        let mut conn = self.connect()?;
        let tx = Self::begin_write(&mut conn)?;

        let owner_id = Self::resolve_owner(&tx, token)?;
        let changed = tx.execute(
            "UPDATE elements SET state = ?1 WHERE id = ?2 AND owner_id = ?3",
            params![state, element_id, owner_id],
        )?;
        if changed == 0 {
            return Err(TrackerError::NotFound { element_id });
        }
        tx.commit()?;

        debug!(owner_id, element_id, %state, "Changed element state");
        Ok(())
    }

    /// Delete one of the token owner's elements
    pub fn delete_element(&self, token: &str, element_id: ElementId) -> Result<()> {
        let mut conn = self.connect()?;
        let tx = Self::begin_write(&mut conn)?;

        let owner_id = Self::resolve_owner(&tx, token)?;
        let removed = tx.execute(
            "DELETE FROM elements WHERE id = ?1 AND owner_id = ?2",
            params![element_id, owner_id],
        )?;
        if removed == 0 {
            return Err(TrackerError::NotFound { element_id });
        }
        tx.commit()?;

        debug!(owner_id, element_id, "Deleted element");
        Ok(())
    }

    /// All elements of the token's user, in insertion order
    pub fn elements_for_token(&self, token: &str) -> Result<Vec<Element>> {
        let conn = self.connect()?;
        let owner_id = Self::resolve_owner(&conn, token)?;

        let mut stmt = conn.prepare(&format!("{} WHERE owner_id = ?1 ORDER BY id", Element::select_sql()))?;
        let rows = stmt.query_map([owner_id], Element::from_row)?;

        let mut results = Vec::new();
        for row_result in rows {
            results.push(row_result?);
        }

        debug!(owner_id, count = results.len(), "Listed elements");
        Ok(results)
    }

    /// Elements of the token's user in display order
    pub fn sorted_elements_for_token(&self, token: &str, today: NaiveDate, window_days: u64) -> Result<Vec<Element>> {
        let elements = self.elements_for_token(token)?;
        sorter::sort_elements_within(&elements, today, window_days)
    }

    // ========================================================================
    // Helper methods
    // ========================================================================

    // Take the write lock up front so a read-then-write never has to upgrade
    fn begin_write(conn: &mut Connection) -> Result<Transaction<'_>> {
        Ok(conn.transaction_with_behavior(TransactionBehavior::Immediate)?)
    }

    fn remove_user(conn: &Connection, user_id: UserId) -> Result<()> {
        let removed = conn.execute("DELETE FROM elements WHERE owner_id = ?1", [user_id])?;
        conn.execute("DELETE FROM users WHERE id = ?1", [user_id])?;

        info!(user_id, removed, "Deleted user");
        Ok(())
    }

    fn user_for_credentials(conn: &Connection, username: &str, password: &str) -> Result<User> {
        match Self::user_by_username(conn, username)? {
            Some(user) if password_matches(&user.password, password) => Ok(user),
            _ => {
                debug!("user_for_credentials: no match");
                Err(TrackerError::InvalidCredentials)
            }
        }
    }

    fn resolve_owner(conn: &Connection, token: &str) -> Result<UserId> {
        conn.query_row("SELECT id FROM users WHERE token = ?1", [token], |row| row.get(0))
            .optional()?
            .ok_or(TrackerError::InvalidToken)
    }

    fn user_by_username(conn: &Connection, username: &str) -> Result<Option<User>> {
        let user = conn
            .query_row(
                &format!("{} WHERE username = ?1", User::select_sql()),
                [username],
                User::from_row,
            )
            .optional()?;
        Ok(user)
    }
}
