//! Form schemas
//!
//! A schema describes a form's fields, which of them are required and the
//! validation rules per field. The registration schema is served by the API
//! and rendered as a form by the terminal UI.

use super::user::is_valid_email;
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::HashMap;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormSchema {
    pub title: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub required: Vec<String>,
    pub properties: FieldMap,
    #[serde(default)]
    pub layout: FormLayout,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldSchema {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    pub title: String,
    #[serde(default)]
    pub placeholder: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class: Option<String>,
    pub ui: FieldUi,
    #[serde(default)]
    pub validation: Validation,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldUi {
    /// `input` or `password`
    pub component: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Validation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<bool>,
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormLayout {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub form_class: Option<String>,
    #[serde(default)]
    pub actions: Vec<FormAction>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormAction {
    #[serde(rename = "type")]
    pub kind: String,
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class: Option<String>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Ordered field map
// ─────────────────────────────────────────────────────────────────────────────

/// Field declarations in the order they appear in the JSON object
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldMap(pub Vec<(String, FieldSchema)>);

impl FieldMap {
    pub fn get(&self, name: &str) -> Option<&FieldSchema> {
        self.0.iter().find(|(n, _)| n == name).map(|(_, f)| f)
    }

    pub fn iter(&self) -> impl Iterator<Item = &(String, FieldSchema)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Serialize for FieldMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (name, field) in &self.0 {
            map.serialize_entry(name, field)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for FieldMap {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct FieldMapVisitor;

        impl<'de> Visitor<'de> for FieldMapVisitor {
            type Value = FieldMap;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of field names to field schemas")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<FieldMap, A::Error> {
                let mut fields = Vec::new();
                while let Some((name, field)) = access.next_entry::<String, FieldSchema>()? {
                    fields.push((name, field));
                }
                Ok(FieldMap(fields))
            }
        }

        deserializer.deserialize_map(FieldMapVisitor)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Registration schema
// ─────────────────────────────────────────────────────────────────────────────

fn input_field(title: &str, placeholder: &str, class: &str, component: &str, validation: Validation) -> FieldSchema {
    FieldSchema {
        kind: "string".to_string(),
        format: None,
        title: title.to_string(),
        placeholder: placeholder.to_string(),
        class: Some(class.to_string()),
        ui: FieldUi {
            component: component.to_string(),
        },
        validation,
    }
}

impl FormSchema {
    /// The user registration form
    pub fn register() -> Self {
        let username = input_field(
            "Username",
            "Enter your username",
            "sm:col-span-3",
            "input",
            Validation {
                min: Some(3),
                email: None,
                message: "Username must be at least 3 characters".to_string(),
            },
        );
        let mut email = input_field(
            "Email",
            "you@example.com",
            "sm:col-span-3",
            "input",
            Validation {
                min: None,
                email: Some(true),
                message: "Invalid email address".to_string(),
            },
        );
        email.format = Some("email".to_string());
        let password = input_field(
            "Password",
            "••••••••",
            "col-span-full",
            "password",
            Validation {
                min: Some(6),
                email: None,
                message: "Password must be at least 6 characters".to_string(),
            },
        );

        Self {
            title: "User Registration".to_string(),
            kind: "object".to_string(),
            required: vec!["username".to_string(), "email".to_string(), "password".to_string()],
            properties: FieldMap(vec![
                ("username".to_string(), username),
                ("email".to_string(), email),
                ("password".to_string(), password),
            ]),
            layout: FormLayout {
                form_class: Some("mt-10 grid grid-cols-1 gap-x-6 gap-y-6 sm:grid-cols-6".to_string()),
                actions: vec![FormAction {
                    kind: "submit".to_string(),
                    label: "Register".to_string(),
                    class: Some("w-full".to_string()),
                }],
            },
        }
    }

    pub fn is_required(&self, field: &str) -> bool {
        self.required.iter().any(|r| r == field)
    }

    /// Label of the submit action, falling back to "Submit"
    pub fn submit_label(&self) -> &str {
        self.layout
            .actions
            .iter()
            .find(|a| a.kind == "submit")
            .map(|a| a.label.as_str())
            .unwrap_or("Submit")
    }

    /// Validate submitted values; returns one message per failing field
    pub fn validate(&self, values: &HashMap<String, String>) -> HashMap<String, String> {
        let mut errors = HashMap::new();
        for (name, field) in self.properties.iter() {
            let value = values.get(name).map(|v| v.trim()).unwrap_or("");

            if value.is_empty() {
                if self.is_required(name) {
                    errors.insert(name.clone(), format!("{} is required", field.title));
                }
                continue;
            }

            let rules = &field.validation;
            let too_short = rules.min.is_some_and(|min| value.chars().count() < min);
            let bad_email = rules.email == Some(true) && !is_valid_email(value);
            if too_short || bad_email {
                errors.insert(name.clone(), rules.message.clone());
            }
        }
        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn values(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_register_schema_json_shape() {
        let json = serde_json::to_value(FormSchema::register()).unwrap();
        assert_eq!(json["title"], "User Registration");
        assert_eq!(json["type"], "object");
        assert_eq!(json["properties"]["email"]["format"], "email");
        assert_eq!(json["properties"]["password"]["ui"]["component"], "password");
        assert_eq!(json["properties"]["username"]["validation"]["min"], 3);
        assert_eq!(json["layout"]["actions"][0]["label"], "Register");
    }

    #[test]
    fn test_field_order_survives_roundtrip() {
        let text = serde_json::to_string(&FormSchema::register()).unwrap();
        let parsed: FormSchema = serde_json::from_str(&text).unwrap();
        let names: Vec<&str> = parsed.properties.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["username", "email", "password"]);
        assert_eq!(parsed.submit_label(), "Register");
    }

    #[test]
    fn test_validation_rules() {
        let schema = FormSchema::register();
        let errors = schema.validate(&values(&[("username", "ab"), ("email", "nope"), ("password", "123456")]));
        assert_eq!(
            errors.get("username").map(String::as_str),
            Some("Username must be at least 3 characters")
        );
        assert_eq!(errors.get("email").map(String::as_str), Some("Invalid email address"));
        assert!(!errors.contains_key("password"));
    }

    #[test]
    fn test_missing_required_fields() {
        let errors = FormSchema::register().validate(&HashMap::new());
        assert_eq!(errors.len(), 3);
        assert_eq!(errors.get("email").map(String::as_str), Some("Email is required"));
    }

    #[test]
    fn test_valid_submission() {
        let errors = FormSchema::register().validate(&values(&[
            ("username", "alice"),
            ("email", "alice@example.com"),
            ("password", "hunter22"),
        ]));
        assert!(errors.is_empty());
    }
}
