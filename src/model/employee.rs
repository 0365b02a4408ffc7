//! Employee directory records

use super::column::{Column, Record, RowId};
use super::filter::{default_match, FilterConfig, FilterOption, FilterValue};
use super::value::Value;
use serde::{Deserialize, Serialize};

/// Companies listed in the bundled directory, offered by the company filter
pub const COMPANIES: [&str; 6] = [
    "Adventure Works",
    "Contoso Ltd",
    "Fabrikam Inc",
    "Northwind Traders",
    "Tailspin Toys",
    "Wide World Importers",
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Employee {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub company: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub pabx: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub image: String,
}

/// Shape of the directory file and of `GET /api/employee`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EmployeeDirectory {
    pub employees: Vec<Employee>,
}

impl Record for Employee {
    const KEYS: &'static [&'static str] = &["id", "name", "company", "email", "phone", "pabx", "image"];

    fn row_id(&self) -> RowId {
        self.id
    }

    fn value(&self, key: &str) -> Value {
        match key {
            "id" => Value::Int(self.id),
            "name" => Value::text(&self.name),
            "company" => Value::text(&self.company),
            "email" => Value::text(&self.email),
            "phone" => Value::text(&self.phone),
            "pabx" => Value::text(&self.pabx),
            "image" => Value::text(&self.image),
            _ => Value::Null,
        }
    }
}

/// Company names are hand-typed in the directory file, so choices match
/// regardless of case and surrounding whitespace
fn match_company(cell: &Value, filter: &FilterValue) -> bool {
    let company = cell.to_string().trim().to_lowercase();
    match filter {
        FilterValue::Choice(choice) => company == choice.to_lowercase(),
        FilterValue::Choices(choices) => choices.iter().any(|c| company == c.to_lowercase()),
        other => default_match(cell, other),
    }
}

pub fn employee_columns() -> Vec<Column<Employee>> {
    vec![
        Column::new("id", "ID"),
        Column::new("name", "Name"),
        Column::new("company", "Company").with_filter(match_company),
        Column::new("email", "Email"),
        Column::new("phone", "Phone"),
        Column::new("pabx", "PABX"),
    ]
}

pub fn employee_filters() -> Vec<FilterConfig> {
    let companies = COMPANIES.iter().map(|c| FilterOption::new(*c, *c)).collect();

    vec![
        FilterConfig::text("name", "Name"),
        FilterConfig::select("company", "Company", companies, true),
        FilterConfig::number("id", "ID"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::filter::FilterKind;
    use crate::model::table::TableState;

    fn employee(id: i64, name: &str, company: &str) -> Employee {
        Employee {
            id,
            name: name.to_string(),
            company: company.to_string(),
            phone: String::new(),
            pabx: String::new(),
            email: String::new(),
            image: String::new(),
        }
    }

    fn directory_table() -> TableState<Employee> {
        let rows = vec![
            employee(1, "Ada", "Contoso Ltd"),
            employee(2, "Bo", "contoso ltd "),
            employee(3, "Cy", "Tailspin Toys"),
            employee(4, "Di", "Fabrikam Inc"),
        ];
        TableState::client(employee_columns(), rows, 10).with_filters(employee_filters())
    }

    fn ids(table: &TableState<Employee>) -> Vec<i64> {
        table.filtered_rows().iter().map(|e| e.id).collect()
    }

    #[test]
    fn test_company_filter_is_multi_select() {
        let company = employee_filters().into_iter().find(|f| f.column == "company").unwrap();
        assert!(matches!(company.kind, FilterKind::Select { multi: true, ref options } if options.len() == COMPANIES.len()));
    }

    #[test]
    fn test_company_choices_match_any_ignoring_case() {
        let mut table = directory_table();
        table.set_filter(
            "company",
            Some(FilterValue::Choices(vec![
                "Contoso Ltd".to_string(),
                "Tailspin Toys".to_string(),
            ])),
        );
        assert_eq!(ids(&table), vec![1, 2, 3]);

        table.set_filter("company", Some(FilterValue::Choices(vec!["Fabrikam Inc".to_string()])));
        assert_eq!(ids(&table), vec![4]);

        table.set_filter("company", None);
        assert_eq!(ids(&table), vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_company_choices_combine_with_name() {
        let mut table = directory_table();
        table.set_filter("company", Some(FilterValue::Choices(vec!["Contoso Ltd".to_string()])));
        table.set_filter("name", Some(FilterValue::Text("b".to_string())));
        assert_eq!(ids(&table), vec![2]);
    }

    #[test]
    fn test_directory_parses_with_missing_optional_fields() {
        let json = r#"{"employees":[{"id":1,"name":"Ada","pabx":"201"}]}"#;
        let dir: EmployeeDirectory = serde_json::from_str(json).unwrap();
        assert_eq!(dir.employees.len(), 1);
        assert_eq!(dir.employees[0].pabx, "201");
        assert_eq!(dir.employees[0].company, "");
    }

    #[test]
    fn test_columns_skip_image() {
        assert!(employee_columns().iter().all(|c| c.key != "image"));
    }
}
