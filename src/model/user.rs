//! User records

use super::column::{Column, Record, RowId};
use super::filter::{DateMode, FilterConfig, FilterOption};
use super::value::Value;
use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize};
use std::sync::LazyLock;

/// Languages assigned by the seeder and offered by the language filter
pub const LANGUAGES: [&str; 6] = ["English", "Spanish", "French", "German", "Arabic", "Chinese"];

/// A row of the `users` table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub country: String,
    #[serde(default)]
    pub avatar: String,
    #[serde(default)]
    pub language: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub company: String,
    pub created_at: DateTime<Utc>,
}

impl Record for User {
    const KEYS: &'static [&'static str] = &[
        "id",
        "name",
        "email",
        "phone",
        "address",
        "country",
        "avatar",
        "language",
        "city",
        "company",
        "createdAt",
    ];

    fn row_id(&self) -> RowId {
        self.id
    }

    fn value(&self, key: &str) -> Value {
        match key {
            "id" => Value::Int(self.id),
            "name" => Value::text(&self.name),
            "email" => Value::text(&self.email),
            "phone" => Value::text(&self.phone),
            "address" => Value::text(&self.address),
            "country" => Value::text(&self.country),
            "avatar" => Value::text(&self.avatar),
            "language" => Value::text(&self.language),
            "city" => Value::text(&self.city),
            "company" => Value::text(&self.company),
            "createdAt" => Value::Date(self.created_at),
            _ => Value::Null,
        }
    }
}

/// Payload for creating or replacing a user
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NewUser {
    #[serde(deserialize_with = "null_as_empty")]
    pub name: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub email: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub country: Option<String>,
    pub avatar: Option<String>,
    pub language: Option<String>,
    pub city: Option<String>,
    pub company: Option<String>,
}

/// A JSON `null` reads as a missing required field, not a type error
fn null_as_empty<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

impl NewUser {
    /// Both `name` and `email` must be present and non-blank
    pub fn has_required(&self) -> bool {
        !self.name.trim().is_empty() && !self.email.trim().is_empty()
    }

    /// Form-level validation; returns the first problem found
    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("Name is required".to_string());
        }
        if !is_valid_email(self.email.trim()) {
            return Err("Invalid email address".to_string());
        }
        Ok(())
    }

    pub fn language_or_default(&self) -> String {
        match self.language.as_deref().map(str::trim) {
            Some(lang) if !lang.is_empty() => lang.to_string(),
            _ => "English".to_string(),
        }
    }

    /// Pre-fill from an existing user (edit form)
    pub fn from_user(user: &User) -> Self {
        let opt = |s: &str| (!s.is_empty()).then(|| s.to_string());
        Self {
            name: user.name.clone(),
            email: user.email.clone(),
            phone: opt(&user.phone),
            address: opt(&user.address),
            country: opt(&user.country),
            avatar: opt(&user.avatar),
            language: opt(&user.language),
            city: opt(&user.city),
            company: opt(&user.company),
        }
    }
}

/// Regex for a loose `local@domain.tld` address
static EMAIL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap()
});

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_REGEX.is_match(email)
}

// ─────────────────────────────────────────────────────────────────────────────
// Table Definitions
// ─────────────────────────────────────────────────────────────────────────────

fn render_name(user: &User) -> String {
    match user.name.chars().next() {
        Some(initial) => format!("({}) {}", initial, user.name),
        None => String::new(),
    }
}

fn render_created(user: &User) -> String {
    user.created_at.format("%Y-%m-%d").to_string()
}

/// Columns for user tables: inferred from the record keys minus `avatar`,
/// with an initial badge on names and date-only creation timestamps
pub fn user_columns() -> Vec<Column<User>> {
    Column::<User>::infer()
        .into_iter()
        .filter(|c| c.key != "avatar")
        .map(|c| match c.key.as_str() {
            "id" => Column::new("id", "ID"),
            "name" => c.with_render(render_name),
            "createdAt" => c.with_render(render_created),
            // the users endpoint only sorts by the whitelisted keys
            "phone" | "address" | "city" | "company" => c.unsortable(),
            _ => c,
        })
        .collect()
}

fn language_options() -> Vec<FilterOption> {
    let mut languages = vec![FilterOption::new("All Language", "")];
    languages.extend(LANGUAGES.iter().map(|l| FilterOption::new(*l, *l)));
    languages
}

/// Filters offered over the server-paginated users table
pub fn user_filters() -> Vec<FilterConfig> {
    vec![
        FilterConfig::text("name", "Name").with_placeholder("Filter names..."),
        FilterConfig::select("language", "Language", language_options(), false),
        FilterConfig::date("createdAt", "Created", DateMode::Range),
    ]
}

/// Filters offered over the locally held All Users snapshot, which picks
/// a single creation day
pub fn all_users_filters() -> Vec<FilterConfig> {
    vec![
        FilterConfig::text("name", "Name").with_placeholder("Filter names..."),
        FilterConfig::select("language", "Language", language_options(), false),
        FilterConfig::date("createdAt", "Created on", DateMode::Single),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::filter::{FilterKind, FilterValue};
    use crate::model::table::TableState;
    use chrono::{NaiveDate, TimeZone};

    fn sample() -> User {
        User {
            id: 3,
            name: "Joanna".to_string(),
            email: "jo@example.com".to_string(),
            phone: String::new(),
            address: String::new(),
            country: "Norway".to_string(),
            avatar: "https://example.com/a.png".to_string(),
            language: "German".to_string(),
            city: String::new(),
            company: String::new(),
            created_at: Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap(),
        }
    }

    #[test]
    fn test_user_json_is_camel_case() {
        let json = serde_json::to_value(sample()).unwrap();
        assert!(json.get("createdAt").is_some());
        assert!(json.get("created_at").is_none());
    }

    #[test]
    fn test_columns_exclude_avatar() {
        let columns = user_columns();
        assert!(columns.iter().all(|c| c.key != "avatar"));
        assert_eq!(columns[0].label, "ID");
        assert_eq!(columns.last().map(|c| c.label.as_str()), Some("Created At"));
    }

    #[test]
    fn test_renderers_do_not_change_raw_values() {
        let columns = user_columns();
        let name = columns.iter().find(|c| c.key == "name").unwrap();
        let created = columns.iter().find(|c| c.key == "createdAt").unwrap();
        assert_eq!(name.cell_text(&sample()), "(J) Joanna");
        assert_eq!(name.raw(&sample()), Value::text("Joanna"));
        assert_eq!(created.cell_text(&sample()), "2024-05-01");
    }

    #[test]
    fn test_new_user_validation() {
        let mut user = NewUser {
            email: "a@b.com".to_string(),
            ..Default::default()
        };
        assert!(!user.has_required());
        assert_eq!(user.validate(), Err("Name is required".to_string()));

        user.name = "Ann".to_string();
        assert!(user.validate().is_ok());

        user.email = "not-an-email".to_string();
        assert!(user.validate().is_err());
    }

    #[test]
    fn test_language_defaults_to_english() {
        assert_eq!(NewUser::default().language_or_default(), "English");
        let user = NewUser {
            language: Some("French".to_string()),
            ..Default::default()
        };
        assert_eq!(user.language_or_default(), "French");
    }

    #[test]
    fn test_from_user_roundtrip_fields() {
        let new = NewUser::from_user(&sample());
        assert_eq!(new.country.as_deref(), Some("Norway"));
        assert_eq!(new.phone, None);
    }

    #[test]
    fn test_language_filter_has_all_sentinel() {
        let filters = user_filters();
        match &filters[1].kind {
            crate::model::filter::FilterKind::Select { options, multi } => {
                assert!(!multi);
                assert!(options[0].is_all());
                assert_eq!(options.len(), LANGUAGES.len() + 1);
            }
            other => panic!("unexpected kind {:?}", other),
        }
    }

    #[test]
    fn test_single_day_filter_keeps_that_day_only() {
        let created = [
            Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2024, 3, 1, 23, 59, 59).unwrap(),
            Utc.with_ymd_and_hms(2024, 3, 2, 0, 0, 0).unwrap(),
        ];
        let rows = created
            .iter()
            .enumerate()
            .map(|(i, at)| User {
                id: i as i64 + 1,
                created_at: *at,
                ..sample()
            })
            .collect();
        let mut table = TableState::client(user_columns(), rows, 10).with_filters(all_users_filters());

        let day = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        table.set_filter("createdAt", Some(FilterValue::Date(day)));
        let ids: Vec<i64> = table.filtered_rows().iter().map(|u| u.id).collect();
        assert_eq!(ids, vec![1, 2]);

        table.set_filter("createdAt", None);
        assert_eq!(table.filtered_rows().len(), 3);
    }

    #[test]
    fn test_all_users_date_filter_is_single_day() {
        let created = all_users_filters().into_iter().find(|f| f.column == "createdAt").unwrap();
        assert_eq!(created.kind, FilterKind::Date(DateMode::Single));
    }
}
