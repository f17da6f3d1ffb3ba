// Row mapping for tables the store reads back

use crate::models::{Element, Token, User};
use rusqlite::Row;

/// Core trait that any table-backed model must implement
pub trait Record: Sized {
    /// Table holding this record type
    fn table_name() -> &'static str;

    /// Columns selected for `from_row`, in decoding order
    fn columns() -> &'static str;

    /// Decode one row selected with `columns()`
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self>;

    /// `SELECT <columns> FROM <table>` prefix for queries
    fn select_sql() -> String {
        format!("SELECT {} FROM {}", Self::columns(), Self::table_name())
    }
}

impl Record for User {
    fn table_name() -> &'static str {
        "users"
    }

    fn columns() -> &'static str {
        "id, username, password, token"
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(User {
            id: row.get(0)?,
            username: row.get(1)?,
            password: row.get(2)?,
            token: Token::new(row.get::<_, String>(3)?),
        })
    }
}

impl Record for Element {
    fn table_name() -> &'static str {
        "elements"
    }

    fn columns() -> &'static str {
        "id, type, lesson, date, comment, state, owner_id"
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Element {
            id: row.get(0)?,
            kind: row.get(1)?,
            lesson: row.get(2)?,
            date: row.get(3)?,
            comment: row.get(4)?,
            state: row.get(5)?,
            owner_id: row.get(6)?,
        })
    }
}
