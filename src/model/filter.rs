//! Column filters
//!
//! Filter declarations, filter values, the per-table filter mapping and the
//! default match semantics used when a table filters rows in memory.

use super::value::Value;
use chrono::{NaiveDate, NaiveTime, TimeZone, Utc};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

// ═══════════════════════════════════════════════════════════════════════════════
// Declarations
// ═══════════════════════════════════════════════════════════════════════════════

/// Date filter mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateMode {
    Single,
    Range,
}

/// An option of a select filter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterOption {
    pub label: String,
    pub value: String,
}

impl FilterOption {
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
        }
    }

    /// An empty value stands for "All" (no filter)
    pub fn is_all(&self) -> bool {
        self.value.is_empty()
    }
}

/// Kind of control rendered for a filter
#[derive(Debug, Clone, PartialEq)]
pub enum FilterKind {
    Text,
    Select {
        options: Vec<FilterOption>,
        multi: bool,
    },
    Date(DateMode),
    Number,
}

/// Callback fired after a filter changes, with the new value and the full mapping
pub type FilterCallback = Arc<dyn Fn(Option<&FilterValue>, &FilterState) + Send + Sync>;

/// Declaration of one filter control
#[derive(Clone)]
pub struct FilterConfig {
    /// Column key the filter applies to
    pub column: String,
    pub label: String,
    pub placeholder: Option<String>,
    pub kind: FilterKind,
    pub on_change: Option<FilterCallback>,
}

impl FilterConfig {
    pub fn new(column: impl Into<String>, label: impl Into<String>, kind: FilterKind) -> Self {
        Self {
            column: column.into(),
            label: label.into(),
            placeholder: None,
            kind,
            on_change: None,
        }
    }

    pub fn text(column: &str, label: &str) -> Self {
        Self::new(column, label, FilterKind::Text)
    }

    pub fn select(column: &str, label: &str, options: Vec<FilterOption>, multi: bool) -> Self {
        Self::new(column, label, FilterKind::Select { options, multi })
    }

    pub fn date(column: &str, label: &str, mode: DateMode) -> Self {
        Self::new(column, label, FilterKind::Date(mode))
    }

    pub fn number(column: &str, label: &str) -> Self {
        Self::new(column, label, FilterKind::Number)
    }

    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = Some(placeholder.into());
        self
    }

    pub fn with_on_change(mut self, callback: FilterCallback) -> Self {
        self.on_change = Some(callback);
        self
    }
}

impl fmt::Debug for FilterConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilterConfig")
            .field("column", &self.column)
            .field("label", &self.label)
            .field("kind", &self.kind)
            .field("on_change", &self.on_change.is_some())
            .finish()
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Values
// ═══════════════════════════════════════════════════════════════════════════════

/// An active filter value
#[derive(Debug, Clone, PartialEq)]
pub enum FilterValue {
    Text(String),
    Choice(String),
    Choices(Vec<String>),
    Number(f64),
    Date(NaiveDate),
    Range {
        from: NaiveDate,
        to: Option<NaiveDate>,
    },
}

impl FilterValue {
    /// Short human-readable form for the filter bar
    pub fn summary(&self) -> String {
        match self {
            FilterValue::Text(s) | FilterValue::Choice(s) => s.clone(),
            FilterValue::Choices(values) => values.join(", "),
            FilterValue::Number(n) => n.to_string(),
            FilterValue::Date(d) => d.to_string(),
            FilterValue::Range { from, to: Some(to) } => format!("{} → {}", from, to),
            FilterValue::Range { from, to: None } => format!("{} → …", from),
        }
    }
}

/// Normalize a text input: the empty string clears the filter
pub fn text_input(input: &str) -> Option<FilterValue> {
    if input.is_empty() {
        None
    } else {
        Some(FilterValue::Text(input.to_string()))
    }
}

/// Normalize a single-select choice: `None` or the "All" sentinel clears the filter
pub fn select_choice(choice: Option<&FilterOption>) -> Option<FilterValue> {
    match choice {
        Some(option) if !option.is_all() => Some(FilterValue::Choice(option.value.clone())),
        _ => None,
    }
}

/// Toggle a value in a multi-select filter; an empty set clears the filter
pub fn toggle_choice(current: Option<&FilterValue>, value: &str) -> Option<FilterValue> {
    let mut values = match current {
        Some(FilterValue::Choices(values)) => values.clone(),
        Some(FilterValue::Choice(v)) => vec![v.clone()],
        _ => Vec::new(),
    };

    if let Some(pos) = values.iter().position(|v| v == value) {
        values.remove(pos);
    } else {
        values.push(value.to_string());
    }

    if values.is_empty() {
        None
    } else {
        Some(FilterValue::Choices(values))
    }
}

/// Coerce a number input; empty or non-numeric input clears the filter
pub fn number_input(input: &str) -> Option<FilterValue> {
    input
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|n| n.is_finite())
        .map(FilterValue::Number)
}

/// Parse a `YYYY-MM-DD` day; empty input clears the filter
pub fn parse_day(input: &str) -> Result<Option<NaiveDate>, String> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .map(Some)
        .map_err(|_| format!("Invalid date '{}', expected YYYY-MM-DD", trimmed))
}

/// Build a date range value. `to` may be absent while a range is being picked.
pub fn date_range(from: Option<NaiveDate>, to: Option<NaiveDate>) -> Option<FilterValue> {
    from.map(|from| FilterValue::Range { from, to })
}

// ═══════════════════════════════════════════════════════════════════════════════
// Filter State
// ═══════════════════════════════════════════════════════════════════════════════

/// Mapping of column key to active filter value
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterState {
    values: HashMap<String, FilterValue>,
}

impl FilterState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set or clear the filter for a column
    pub fn set(&mut self, column: &str, value: Option<FilterValue>) {
        match value {
            Some(v) => {
                self.values.insert(column.to_string(), v);
            }
            None => {
                self.values.remove(column);
            }
        }
    }

    pub fn get(&self, column: &str) -> Option<&FilterValue> {
        self.values.get(column)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &FilterValue)> {
        self.values.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn clear(&mut self) {
        self.values.clear();
    }

    /// Expand active filters into query parameters.
    ///
    /// Ranges become `<column>From` / `<column>To` ISO-8601 timestamps covering
    /// whole days. Pairs are sorted by key so requests are reproducible.
    pub fn to_query_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::new();
        for (column, value) in &self.values {
            match value {
                FilterValue::Text(s) | FilterValue::Choice(s) => {
                    pairs.push((column.clone(), s.clone()));
                }
                FilterValue::Choices(values) => {
                    pairs.push((column.clone(), values.join(",")));
                }
                FilterValue::Number(n) => {
                    pairs.push((column.clone(), n.to_string()));
                }
                FilterValue::Date(day) => {
                    pairs.push((column.clone(), start_of_day(*day)));
                }
                FilterValue::Range { from, to } => {
                    pairs.push((format!("{}From", column), start_of_day(*from)));
                    if let Some(to) = to {
                        pairs.push((format!("{}To", column), end_of_day(*to)));
                    }
                }
            }
        }
        pairs.sort();
        pairs
    }
}

fn start_of_day(day: NaiveDate) -> String {
    Utc.from_utc_datetime(&day.and_time(NaiveTime::MIN))
        .to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}

fn end_of_day(day: NaiveDate) -> String {
    let end = NaiveTime::from_hms_milli_opt(23, 59, 59, 999).unwrap_or(NaiveTime::MIN);
    Utc.from_utc_datetime(&day.and_time(end))
        .to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}

// ═══════════════════════════════════════════════════════════════════════════════
// Matching
// ═══════════════════════════════════════════════════════════════════════════════

/// Default match semantics per filter value type
pub fn default_match(cell: &Value, filter: &FilterValue) -> bool {
    match filter {
        FilterValue::Text(needle) => cell
            .to_string()
            .to_lowercase()
            .contains(&needle.to_lowercase()),
        FilterValue::Choice(choice) => cell.to_string() == *choice,
        FilterValue::Choices(choices) => {
            let text = cell.to_string();
            choices.iter().any(|c| *c == text)
        }
        FilterValue::Number(n) => cell.as_f64().is_some_and(|v| v == *n),
        FilterValue::Date(day) => cell.calendar_day() == Some(*day),
        FilterValue::Range { from, to } => match cell.calendar_day() {
            Some(day) => day >= *from && to.map_or(true, |to| day <= to),
            None => false,
        },
    }
}
