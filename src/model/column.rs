//! Records and column definitions
//!
//! A table is bound to one record type. Columns reference the record's
//! declared keys and pick their filter and render behavior when built.

use super::filter::FilterValue;
use super::value::Value;

/// Stable identifier of a row
pub type RowId = i64;

/// A row type that can be displayed in a data table
pub trait Record: Clone {
    /// Column keys the record exposes, in declaration order
    const KEYS: &'static [&'static str];

    fn row_id(&self) -> RowId;

    /// Raw value for a column key; unknown keys yield `Value::Null`
    fn value(&self, key: &str) -> Value;
}

/// Synthetic column kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    /// A column backed by a record key
    Data,
    /// Row selection checkboxes
    Select,
    /// Per-row action menu
    Actions,
}

/// How a column matches filter values
#[derive(Clone, Copy)]
pub enum FilterMatch {
    Default,
    Custom(fn(&Value, &FilterValue) -> bool),
}

/// How a column renders its cells
pub enum CellRender<R> {
    Default,
    Custom(fn(&R) -> String),
}

// fn pointers are Copy for any R, derive would demand R: Clone
impl<R> Clone for CellRender<R> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<R> Copy for CellRender<R> {}

/// Declaration of a table column
pub struct Column<R> {
    pub key: String,
    pub label: String,
    pub kind: ColumnKind,
    pub sortable: bool,
    pub filter: FilterMatch,
    pub render: CellRender<R>,
}

impl<R> Clone for Column<R> {
    fn clone(&self) -> Self {
        Self {
            key: self.key.clone(),
            label: self.label.clone(),
            kind: self.kind,
            sortable: self.sortable,
            filter: self.filter,
            render: self.render,
        }
    }
}

impl<R: Record> Column<R> {
    pub fn new(key: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
            kind: ColumnKind::Data,
            sortable: true,
            filter: FilterMatch::Default,
            render: CellRender::Default,
        }
    }

    pub fn select() -> Self {
        Self {
            key: "select".to_string(),
            label: String::new(),
            kind: ColumnKind::Select,
            sortable: false,
            filter: FilterMatch::Default,
            render: CellRender::Default,
        }
    }

    pub fn actions() -> Self {
        Self {
            key: "actions".to_string(),
            label: "Actions".to_string(),
            kind: ColumnKind::Actions,
            sortable: false,
            filter: FilterMatch::Default,
            render: CellRender::Default,
        }
    }

    /// Build one data column per declared record key, labels title-cased
    pub fn infer() -> Vec<Self> {
        R::KEYS
            .iter()
            .map(|key| Self::new(*key, title_case(key)))
            .collect()
    }

    pub fn with_render(mut self, render: fn(&R) -> String) -> Self {
        self.render = CellRender::Custom(render);
        self
    }

    pub fn with_filter(mut self, matcher: fn(&Value, &FilterValue) -> bool) -> Self {
        self.filter = FilterMatch::Custom(matcher);
        self
    }

    pub fn unsortable(mut self) -> Self {
        self.sortable = false;
        self
    }

    pub fn is_data(&self) -> bool {
        self.kind == ColumnKind::Data
    }

    /// Raw value of this column for a record
    pub fn raw(&self, record: &R) -> Value {
        match self.kind {
            ColumnKind::Data => record.value(&self.key),
            _ => Value::Null,
        }
    }

    /// Display text of a cell, through the custom renderer if one is set
    pub fn cell_text(&self, record: &R) -> String {
        match self.render {
            CellRender::Custom(render) => render(record),
            CellRender::Default => self.raw(record).to_string(),
        }
    }

    /// Whether a record passes this column's filter
    pub fn matches(&self, record: &R, filter: &FilterValue) -> bool {
        let cell = self.raw(record);
        match self.filter {
            FilterMatch::Custom(matcher) => matcher(&cell, filter),
            FilterMatch::Default => super::filter::default_match(&cell, filter),
        }
    }
}

/// `createdAt` -> `Created At`, `name` -> `Name`
pub fn title_case(key: &str) -> String {
    let mut out = String::with_capacity(key.len() + 4);
    for (i, c) in key.chars().enumerate() {
        if i == 0 {
            out.extend(c.to_uppercase());
        } else if c.is_uppercase() {
            out.push(' ');
            out.push(c);
        } else if c == '_' {
            out.push(' ');
        } else {
            out.push(c);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone)]
    struct Item {
        id: i64,
        name: String,
        qty: i64,
    }

    impl Record for Item {
        const KEYS: &'static [&'static str] = &["id", "name", "qty"];

        fn row_id(&self) -> RowId {
            self.id
        }

        fn value(&self, key: &str) -> Value {
            match key {
                "id" => Value::Int(self.id),
                "name" => Value::text(&self.name),
                "qty" => Value::Int(self.qty),
                _ => Value::Null,
            }
        }
    }

    fn item() -> Item {
        Item {
            id: 7,
            name: "Widget".to_string(),
            qty: 3,
        }
    }

    #[test]
    fn test_infer_uses_declared_keys() {
        let columns = Column::<Item>::infer();
        let keys: Vec<&str> = columns.iter().map(|c| c.key.as_str()).collect();
        assert_eq!(keys, vec!["id", "name", "qty"]);
        assert_eq!(columns[1].label, "Name");
    }

    #[test]
    fn test_title_case() {
        assert_eq!(title_case("createdAt"), "Created At");
        assert_eq!(title_case("zip_code"), "Zip code");
    }

    #[test]
    fn test_custom_render_leaves_raw_value() {
        let column = Column::<Item>::new("name", "Name").with_render(|i| format!("** {} **", i.name));
        assert_eq!(column.cell_text(&item()), "** Widget **");
        assert_eq!(column.raw(&item()), Value::text("Widget"));
    }

    #[test]
    fn test_custom_filter_wins() {
        let column = Column::<Item>::new("qty", "Qty").with_filter(|cell, filter| match filter {
            FilterValue::Number(min) => cell.as_f64().is_some_and(|v| v >= *min),
            _ => false,
        });
        assert!(column.matches(&item(), &FilterValue::Number(2.0)));
        assert!(!column.matches(&item(), &FilterValue::Number(4.0)));
    }

    #[test]
    fn test_synthetic_columns_have_no_values() {
        assert_eq!(Column::<Item>::actions().raw(&item()), Value::Null);
        assert!(!Column::<Item>::select().sortable);
    }
}
