use crate::Database;
use crate::models::UserRow;
use anyhow::Result;
use rusqlite::Connection;

impl Database {
    // -- Users --

    pub fn create_user(
        &self,
        id: &str,
        name: &str,
        email: Option<&str>,
        password_hash: Option<&str>,
        provider: &str,
        subject: Option<&str>,
    ) -> Result<()> {
        self.with_conn_mut(|conn| {
            conn.execute(
                "INSERT INTO users (id, name, email, password, provider, subject)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                rusqlite::params![id, name, email, password_hash, provider, subject],
            )?;
            Ok(())
        })
    }

    pub fn get_user_by_email(&self, email: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| {
            query_user(
                conn,
                &format!("SELECT {USER_COLUMNS} FROM users WHERE email = ?1"),
                [email],
            )
        })
    }

    pub fn get_user_by_id(&self, id: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| {
            query_user(
                conn,
                &format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1"),
                [id],
            )
        })
    }

    pub fn get_user_by_subject(&self, provider: &str, subject: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| {
            query_user(
                conn,
                &format!("SELECT {USER_COLUMNS} FROM users WHERE provider = ?1 AND subject = ?2"),
                [provider, subject],
            )
        })
    }

    pub fn update_user_name(&self, id: &str, name: &str) -> Result<bool> {
        self.with_conn_mut(|conn| {
            let changed = conn.execute("UPDATE users SET name = ?1 WHERE id = ?2", [name, id])?;
            Ok(changed > 0)
        })
    }
}

const USER_COLUMNS: &str = "id, name, email, password, provider, subject, email_verified, created_at";

fn query_user<P: rusqlite::Params>(
    conn: &Connection,
    sql: &str,
    params: P,
) -> Result<Option<UserRow>> {
    let mut stmt = conn.prepare(sql)?;

    let row = stmt
        .query_row(params, |row| {
            Ok(UserRow {
                id: row.get(0)?,
                name: row.get(1)?,
                email: row.get(2)?,
                password: row.get(3)?,
                provider: row.get(4)?,
                subject: row.get(5)?,
                email_verified: row.get::<_, i64>(6)? != 0,
                created_at: row.get(7)?,
            })
        })
        .optional()?;

    Ok(row)
}

/// Extension trait for optional query results
pub(crate) trait OptionalExt<T> {
    fn optional(self) -> Result<Option<T>>;
}

impl<T> OptionalExt<T> for std::result::Result<T, rusqlite::Error> {
    fn optional(self) -> Result<Option<T>> {
        match self {
            Ok(val) => Ok(Some(val)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::Database;

    #[test]
    fn create_and_fetch_user() {
        let db = Database::open_in_memory().unwrap();
        db.create_user(
            "u1",
            "Grace",
            Some("grace@example.com"),
            Some("$argon2id$fake"),
            "email",
            None,
        )
        .unwrap();

        let user = db.get_user_by_email("grace@example.com").unwrap().unwrap();
        assert_eq!(user.id, "u1");
        assert_eq!(user.name, "Grace");
        assert!(!user.email_verified);

        assert!(db.get_user_by_email("nobody@example.com").unwrap().is_none());
    }

    #[test]
    fn duplicate_email_is_rejected() {
        let db = Database::open_in_memory().unwrap();
        db.create_user("u1", "A", Some("a@example.com"), Some("h"), "email", None)
            .unwrap();
        let err = db.create_user("u2", "B", Some("a@example.com"), Some("h"), "email", None);
        assert!(err.is_err());
    }

    #[test]
    fn social_user_keyed_by_provider_subject() {
        let db = Database::open_in_memory().unwrap();
        db.create_user("u1", "Hope", None, None, "phone", Some("+15550001111"))
            .unwrap();

        let user = db.get_user_by_subject("phone", "+15550001111").unwrap().unwrap();
        assert_eq!(user.id, "u1");
        assert!(user.email.is_none());
        assert!(db.get_user_by_subject("google", "+15550001111").unwrap().is_none());
    }

    #[test]
    fn update_user_name_reports_missing_rows() {
        let db = Database::open_in_memory().unwrap();
        db.create_user("u1", "A", Some("a@example.com"), Some("h"), "email", None)
            .unwrap();
        assert!(db.update_user_name("u1", "Amy").unwrap());
        assert!(!db.update_user_name("ghost", "X").unwrap());
        assert_eq!(db.get_user_by_id("u1").unwrap().unwrap().name, "Amy");
    }
}
