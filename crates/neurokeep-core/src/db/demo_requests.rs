//! Demo request database operations.

use rusqlite::{params, Row};

use super::{Database, DbResult};
use crate::models::DemoRequest;

fn demo_request_from_row(row: &Row<'_>) -> rusqlite::Result<DemoRequest> {
    Ok(DemoRequest {
        id: row.get(0)?,
        name: row.get(1)?,
        phone: row.get(2)?,
        email: row.get(3)?,
        role: row.get(4)?,
        created_at: row.get(5)?,
    })
}

impl Database {
    pub fn insert_demo_request(&self, request: &DemoRequest) -> DbResult<()> {
        self.conn.execute(
            r#"
            INSERT INTO demo_requests (id, name, phone, email, role, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
            params![
                request.id,
                request.name,
                request.phone,
                request.email,
                request.role,
                request.created_at,
            ],
        )?;
        Ok(())
    }

    /// All demo requests, newest first.
    pub fn list_demo_requests(&self) -> DbResult<Vec<DemoRequest>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT id, name, phone, email, role, created_at FROM demo_requests
            ORDER BY created_at DESC, rowid DESC
            "#,
        )?;

        let rows = stmt.query_map([], demo_request_from_row)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }
}
