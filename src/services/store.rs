//! SQLite user store
//!
//! Backs the users endpoints. Timestamps are stored as fixed-width RFC 3339
//! text (`2024-05-01T09:00:00.000Z`) so range filters compare lexically.

use crate::model::pagination::total_pages;
use crate::model::table::PageResponse;
use crate::model::user::{NewUser, User};
use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::types::Value as SqlValue;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;

pub const DEFAULT_PAGE_SIZE: usize = 50;
pub const MAX_PAGE_SIZE: usize = 500;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),
    #[error("user with id {0} not found")]
    NotFound(i64),
    #[error("{0}")]
    Validation(String),
    #[error("invalid query parameter {name}: {value}")]
    InvalidQuery { name: String, value: String },
}

// ═══════════════════════════════════════════════════════════════════════════════
// Query
// ═══════════════════════════════════════════════════════════════════════════════

/// Columns the users endpoint can order by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
    #[default]
    Id,
    Name,
    Email,
    Language,
    Country,
    CreatedAt,
}

impl SortKey {
    fn parse(key: &str) -> Option<Self> {
        match key {
            "id" => Some(SortKey::Id),
            "name" => Some(SortKey::Name),
            "email" => Some(SortKey::Email),
            "language" => Some(SortKey::Language),
            "country" => Some(SortKey::Country),
            "createdAt" => Some(SortKey::CreatedAt),
            _ => None,
        }
    }

    fn column(&self) -> &'static str {
        match self {
            SortKey::Id => "id",
            SortKey::Name => "name",
            SortKey::Email => "email",
            SortKey::Language => "language",
            SortKey::Country => "country",
            SortKey::CreatedAt => "created_at",
        }
    }
}

/// A parsed read request against the users table
#[derive(Debug, Clone, PartialEq)]
pub struct UserQuery {
    pub page: usize,
    pub page_size: usize,
    pub name: Option<String>,
    /// Exact match; several values are comma-separated
    pub languages: Vec<String>,
    pub created_from: Option<DateTime<Utc>>,
    pub created_to: Option<DateTime<Utc>>,
    pub sort: SortKey,
    pub descending: bool,
}

impl Default for UserQuery {
    fn default() -> Self {
        Self {
            page: 0,
            page_size: DEFAULT_PAGE_SIZE,
            name: None,
            languages: Vec::new(),
            created_from: None,
            created_to: None,
            sort: SortKey::Id,
            descending: true,
        }
    }
}

fn invalid(name: &str, value: &str) -> StoreError {
    StoreError::InvalidQuery {
        name: name.to_string(),
        value: value.to_string(),
    }
}

fn parse_timestamp(name: &str, value: &str) -> Result<DateTime<Utc>, StoreError> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| invalid(name, value))
}

impl UserQuery {
    /// Build a query from URL parameters. Empty values count as absent.
    pub fn from_params(params: &HashMap<String, String>) -> Result<Self, StoreError> {
        let get = |key: &str| params.get(key).map(|v| v.trim()).filter(|v| !v.is_empty());
        let mut query = UserQuery::default();

        if let Some(page) = get("page") {
            query.page = page.parse().map_err(|_| invalid("page", page))?;
        }
        if let Some(size) = get("pageSize") {
            let size: usize = size.parse().map_err(|_| invalid("pageSize", size))?;
            query.page_size = size.clamp(1, MAX_PAGE_SIZE);
        }
        query.name = get("name").map(str::to_string);
        if let Some(languages) = get("language") {
            query.languages = languages
                .split(',')
                .map(str::trim)
                .filter(|l| !l.is_empty())
                .map(str::to_string)
                .collect();
        }
        if let Some(from) = get("createdAtFrom") {
            query.created_from = Some(parse_timestamp("createdAtFrom", from)?);
        }
        if let Some(to) = get("createdAtTo") {
            query.created_to = Some(parse_timestamp("createdAtTo", to)?);
        }
        if let Some(sort) = get("sortBy") {
            query.sort = SortKey::parse(sort).ok_or_else(|| invalid("sortBy", sort))?;
        }
        if let Some(order) = get("sortOrder") {
            query.descending = match order {
                "asc" => false,
                "desc" => true,
                _ => return Err(invalid("sortOrder", order)),
            };
        }
        Ok(query)
    }

    /// WHERE clause and its bound values
    fn where_clause(&self) -> (String, Vec<SqlValue>) {
        let mut clauses = Vec::new();
        let mut values = Vec::new();

        if let Some(name) = &self.name {
            clauses.push("name LIKE ? ESCAPE '\\'".to_string());
            values.push(SqlValue::Text(format!("%{}%", escape_like(name))));
        }
        if !self.languages.is_empty() {
            let marks = vec!["?"; self.languages.len()].join(", ");
            clauses.push(format!("language IN ({})", marks));
            values.extend(self.languages.iter().cloned().map(SqlValue::Text));
        }
        if let Some(from) = self.created_from {
            clauses.push("created_at >= ?".to_string());
            values.push(SqlValue::Text(format_timestamp(&from)));
        }
        if let Some(to) = self.created_to {
            clauses.push("created_at <= ?".to_string());
            values.push(SqlValue::Text(format_timestamp(&to)));
        }

        if clauses.is_empty() {
            (String::new(), values)
        } else {
            (format!(" WHERE {}", clauses.join(" AND ")), values)
        }
    }
}

fn escape_like(s: &str) -> String {
    s.replace('\\', "\\\\").replace('%', "\\%").replace('_', "\\_")
}

pub fn format_timestamp(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Millis, true)
}

// ═══════════════════════════════════════════════════════════════════════════════
// Store
// ═══════════════════════════════════════════════════════════════════════════════

const USER_COLUMNS: &str =
    "id, name, email, phone, address, country, avatar, language, city, company, created_at";

pub struct UserStore {
    conn: Connection,
}

impl UserStore {
    /// Open (and create if needed) the database file
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        conn.pragma_update_and_check(None, "journal_mode", "WAL", |_| Ok(()))?;
        Self::with_connection(conn)
    }

    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self, StoreError> {
        conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS users (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                email TEXT NOT NULL UNIQUE,
                phone TEXT NOT NULL DEFAULT '',
                address TEXT NOT NULL DEFAULT '',
                country TEXT NOT NULL DEFAULT '',
                avatar TEXT NOT NULL DEFAULT '',
                language TEXT NOT NULL DEFAULT 'English',
                city TEXT NOT NULL DEFAULT '',
                company TEXT NOT NULL DEFAULT '',
                created_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_users_created_at ON users(created_at);
            CREATE INDEX IF NOT EXISTS idx_users_language ON users(language);
            ",
        )?;
        Ok(Self { conn })
    }

    fn row_to_user(row: &Row<'_>) -> rusqlite::Result<User> {
        let created: String = row.get(10)?;
        let created_at = DateTime::parse_from_rfc3339(&created)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(10, rusqlite::types::Type::Text, Box::new(e)))?;
        Ok(User {
            id: row.get(0)?,
            name: row.get(1)?,
            email: row.get(2)?,
            phone: row.get(3)?,
            address: row.get(4)?,
            country: row.get(5)?,
            avatar: row.get(6)?,
            language: row.get(7)?,
            city: row.get(8)?,
            company: row.get(9)?,
            created_at,
        })
    }

    pub fn count(&self) -> Result<usize, StoreError> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    /// One page of users matching the query
    pub fn query_page(&self, query: &UserQuery) -> Result<PageResponse<User>, StoreError> {
        let (where_sql, values) = query.where_clause();

        let total_count: i64 = self.conn.query_row(
            &format!("SELECT COUNT(*) FROM users{}", where_sql),
            params_from_iter(values.iter()),
            |row| row.get(0),
        )?;
        let total_count = total_count as usize;

        // secondary key keeps pages stable when the sort column has ties
        let order = if query.descending { "DESC" } else { "ASC" };
        let sql = format!(
            "SELECT {} FROM users{} ORDER BY {} {}, id {} LIMIT ? OFFSET ?",
            USER_COLUMNS,
            where_sql,
            query.sort.column(),
            order,
            order
        );

        let mut bound = values;
        bound.push(SqlValue::Integer(query.page_size as i64));
        bound.push(SqlValue::Integer((query.page * query.page_size) as i64));

        let mut stmt = self.conn.prepare(&sql)?;
        let data = stmt
            .query_map(params_from_iter(bound.iter()), Self::row_to_user)?
            .collect::<Result<Vec<_>, _>>()?;

        let total_pages = if total_count == 0 {
            0
        } else {
            total_pages(total_count, query.page_size)
        };

        Ok(PageResponse {
            data,
            total_pages,
            total_count,
            current_page: query.page,
            page_size: query.page_size,
        })
    }

    pub fn get(&self, id: i64) -> Result<Option<User>, StoreError> {
        let user = self
            .conn
            .query_row(
                &format!("SELECT {} FROM users WHERE id = ?1", USER_COLUMNS),
                params![id],
                Self::row_to_user,
            )
            .optional()?;
        Ok(user)
    }

    /// Insert a user stamped with the current time
    pub fn create(&self, user: &NewUser) -> Result<User, StoreError> {
        self.create_at(user, Utc::now())
    }

    pub fn create_at(&self, user: &NewUser, created_at: DateTime<Utc>) -> Result<User, StoreError> {
        if !user.has_required() {
            return Err(StoreError::Validation("name and email required".to_string()));
        }
        self.conn.execute(
            "INSERT INTO users (name, email, phone, address, country, avatar, language, city, company, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            params![
                user.name.trim(),
                user.email.trim(),
                user.phone.as_deref().unwrap_or(""),
                user.address.as_deref().unwrap_or(""),
                user.country.as_deref().unwrap_or(""),
                user.avatar.as_deref().unwrap_or(""),
                user.language_or_default(),
                user.city.as_deref().unwrap_or(""),
                user.company.as_deref().unwrap_or(""),
                format_timestamp(&created_at),
            ],
        )?;
        let id = self.conn.last_insert_rowid();
        self.get(id)?.ok_or(StoreError::NotFound(id))
    }

    /// Replace every editable field of an existing user
    pub fn update(&self, id: i64, user: &NewUser) -> Result<User, StoreError> {
        if !user.has_required() {
            return Err(StoreError::Validation("name and email required".to_string()));
        }
        let changed = self.conn.execute(
            "UPDATE users SET name = ?1, email = ?2, phone = ?3, address = ?4, country = ?5,
                    avatar = ?6, language = ?7, city = ?8, company = ?9
             WHERE id = ?10",
            params![
                user.name.trim(),
                user.email.trim(),
                user.phone.as_deref().unwrap_or(""),
                user.address.as_deref().unwrap_or(""),
                user.country.as_deref().unwrap_or(""),
                user.avatar.as_deref().unwrap_or(""),
                user.language_or_default(),
                user.city.as_deref().unwrap_or(""),
                user.company.as_deref().unwrap_or(""),
                id,
            ],
        )?;
        if changed == 0 {
            return Err(StoreError::NotFound(id));
        }
        self.get(id)?.ok_or(StoreError::NotFound(id))
    }

    pub fn delete(&self, id: i64) -> Result<(), StoreError> {
        let changed = self.conn.execute("DELETE FROM users WHERE id = ?1", params![id])?;
        if changed == 0 {
            return Err(StoreError::NotFound(id));
        }
        Ok(())
    }

    /// Insert many users in one transaction, skipping duplicate emails.
    ///
    /// Returns the number of rows actually inserted.
    pub fn insert_batch(&mut self, users: &[(NewUser, DateTime<Utc>)]) -> Result<usize, StoreError> {
        let tx = self.conn.transaction()?;
        let mut inserted = 0;
        {
            let mut stmt = tx.prepare(
                "INSERT OR IGNORE INTO users (name, email, phone, address, country, avatar, language, city, company, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            )?;
            for (user, created_at) in users {
                if !user.has_required() {
                    continue;
                }
                inserted += stmt.execute(params![
                    user.name,
                    user.email,
                    user.phone.as_deref().unwrap_or(""),
                    user.address.as_deref().unwrap_or(""),
                    user.country.as_deref().unwrap_or(""),
                    user.avatar.as_deref().unwrap_or(""),
                    user.language_or_default(),
                    user.city.as_deref().unwrap_or(""),
                    user.company.as_deref().unwrap_or(""),
                    format_timestamp(created_at),
                ])?;
            }
        }
        tx.commit()?;
        Ok(inserted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn new_user(name: &str, email: &str, language: &str) -> NewUser {
        NewUser {
            name: name.to_string(),
            email: email.to_string(),
            language: Some(language.to_string()),
            ..Default::default()
        }
    }

    fn day(d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, d, 12, 0, 0).unwrap()
    }

    fn seeded() -> UserStore {
        let mut store = UserStore::open_in_memory().unwrap();
        store
            .insert_batch(&[
                (new_user("John", "john@x.io", "English"), day(1)),
                (new_user("Amy", "amy@x.io", "German"), day(2)),
                (new_user("Joanna", "joanna@x.io", "German"), day(3)),
                (new_user("Bob", "bob@x.io", "Arabic"), day(4)),
                (new_user("Carla", "carla@x.io", "French"), day(5)),
            ])
            .unwrap();
        store
    }

    fn params(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_first_page_is_newest_ids() {
        let store = seeded();
        let query = UserQuery::from_params(&params(&[("page", "0"), ("pageSize", "2")])).unwrap();
        let page = store.query_page(&query).unwrap();

        let ids: Vec<i64> = page.data.iter().map(|u| u.id).collect();
        assert_eq!(ids, vec![5, 4]);
        assert_eq!(page.total_pages, 3);
        assert_eq!(page.total_count, 5);
        assert_eq!(page.current_page, 0);
    }

    #[test]
    fn test_name_filter_is_case_insensitive_substring() {
        let store = seeded();
        let query = UserQuery::from_params(&params(&[("name", "jo")])).unwrap();
        let page = store.query_page(&query).unwrap();
        let names: Vec<&str> = page.data.iter().map(|u| u.name.as_str()).collect();
        assert_eq!(names, vec!["Joanna", "John"]);
    }

    #[test]
    fn test_like_wildcards_are_literal() {
        let store = seeded();
        let query = UserQuery::from_params(&params(&[("name", "%")])).unwrap();
        assert_eq!(store.query_page(&query).unwrap().total_count, 0);
    }

    #[test]
    fn test_language_and_date_range() {
        let store = seeded();
        let query = UserQuery::from_params(&params(&[
            ("language", "German"),
            ("createdAtFrom", "2024-03-03T00:00:00.000Z"),
            ("createdAtTo", "2024-03-03T23:59:59.999Z"),
        ]))
        .unwrap();
        let page = store.query_page(&query).unwrap();
        assert_eq!(page.total_count, 1);
        assert_eq!(page.data[0].name, "Joanna");
    }

    #[test]
    fn test_multiple_languages() {
        let store = seeded();
        let query = UserQuery::from_params(&params(&[("language", "Arabic,French")])).unwrap();
        assert_eq!(store.query_page(&query).unwrap().total_count, 2);
    }

    #[test]
    fn test_sort_by_name_ascending() {
        let store = seeded();
        let query = UserQuery::from_params(&params(&[("sortBy", "name"), ("sortOrder", "asc")])).unwrap();
        let page = store.query_page(&query).unwrap();
        assert_eq!(page.data[0].name, "Amy");
    }

    #[test]
    fn test_bad_parameters_are_rejected() {
        assert!(matches!(
            UserQuery::from_params(&params(&[("page", "x")])),
            Err(StoreError::InvalidQuery { .. })
        ));
        assert!(UserQuery::from_params(&params(&[("createdAtFrom", "yesterday")])).is_err());
        assert!(UserQuery::from_params(&params(&[("sortBy", "password")])).is_err());
        assert!(UserQuery::from_params(&params(&[("sortOrder", "up")])).is_err());
    }

    #[test]
    fn test_page_size_is_clamped() {
        let query = UserQuery::from_params(&params(&[("pageSize", "100000")])).unwrap();
        assert_eq!(query.page_size, MAX_PAGE_SIZE);
        let query = UserQuery::from_params(&params(&[("pageSize", "0")])).unwrap();
        assert_eq!(query.page_size, 1);
    }

    #[test]
    fn test_empty_table_has_zero_pages() {
        let store = UserStore::open_in_memory().unwrap();
        let page = store.query_page(&UserQuery::default()).unwrap();
        assert_eq!(page.total_pages, 0);
        assert!(page.data.is_empty());
    }

    #[test]
    fn test_create_requires_name_and_email() {
        let store = UserStore::open_in_memory().unwrap();
        let result = store.create(&NewUser {
            email: "a@b.com".to_string(),
            ..Default::default()
        });
        assert!(matches!(result, Err(StoreError::Validation(_))));
        assert_eq!(store.count().unwrap(), 0);
    }

    #[test]
    fn test_create_defaults() {
        let store = UserStore::open_in_memory().unwrap();
        let user = store
            .create(&NewUser {
                name: "Ann".to_string(),
                email: "ann@x.io".to_string(),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(user.language, "English");
        assert_eq!(user.phone, "");
    }

    #[test]
    fn test_update_and_delete() {
        let store = seeded();
        let mut edit = new_user("Johnny", "john@x.io", "Spanish");
        edit.city = Some("Oslo".to_string());
        let updated = store.update(1, &edit).unwrap();
        assert_eq!(updated.name, "Johnny");
        assert_eq!(updated.city, "Oslo");
        assert_eq!(updated.created_at, day(1));

        store.delete(1).unwrap();
        assert!(store.get(1).unwrap().is_none());
        assert!(matches!(store.delete(1), Err(StoreError::NotFound(1))));
        assert!(matches!(store.update(1, &edit), Err(StoreError::NotFound(1))));
    }

    #[test]
    fn test_batch_skips_duplicate_emails() {
        let mut store = seeded();
        let inserted = store
            .insert_batch(&[
                (new_user("Again", "john@x.io", "English"), day(6)),
                (new_user("New", "new@x.io", "English"), day(6)),
            ])
            .unwrap();
        assert_eq!(inserted, 1);
        assert_eq!(store.count().unwrap(), 6);
    }

    #[test]
    fn test_open_file_database() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("users.db");
        {
            let store = UserStore::open(&path).unwrap();
            store.create(&new_user("Ann", "ann@x.io", "English")).unwrap();
        }
        let store = UserStore::open(&path).unwrap();
        assert_eq!(store.count().unwrap(), 1);
    }
}
