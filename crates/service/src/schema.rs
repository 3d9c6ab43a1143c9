//! Static field schemas of the three entity kinds.
//!
//! Each [`EntitySchema`] is the whole per-entity configuration of the generic
//! CRUD component: collection and URL naming, the declared fields with their
//! kind and default, the two sort keys and the not-found message.

use std::collections::HashMap;

use serde_json::Value;

use crate::{errors::ServiceError, record::Document};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Integer,
    /// Text restricted to a fixed set of symbolic values.
    Enum(&'static [&'static str]),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FieldDef {
    pub name: &'static str,
    pub kind: FieldKind,
    /// Must be non-empty when validated strictly.
    pub required: bool,
}

impl FieldDef {
    pub const fn text(name: &'static str) -> Self {
        Self { name, kind: FieldKind::Text, required: false }
    }

    pub const fn integer(name: &'static str) -> Self {
        Self { name, kind: FieldKind::Integer, required: false }
    }

    pub const fn one_of(name: &'static str, values: &'static [&'static str]) -> Self {
        Self { name, kind: FieldKind::Enum(values), required: false }
    }

    pub const fn required(self) -> Self {
        Self { required: true, ..self }
    }

    /// Value stored when the input omits the field: `0` for integers, `""` otherwise.
    pub fn default_value(&self) -> Value {
        match self.kind {
            FieldKind::Integer => Value::from(0),
            FieldKind::Text | FieldKind::Enum(_) => Value::from(""),
        }
    }

    /// Integer fields accept numeric strings (form inputs, query strings) and
    /// store them as numbers. Everything else passes through untouched.
    pub fn normalize(&self, value: Value) -> Value {
        match (self.kind, &value) {
            (FieldKind::Integer, Value::String(s)) => match s.trim().parse::<i64>() {
                Ok(n) => Value::from(n),
                Err(_) => value,
            },
            _ => value,
        }
    }

    /// Strict check of a single value against kind, enum set and `required`.
    pub fn check(&self, value: &Value) -> Result<(), String> {
        match self.kind {
            FieldKind::Text => {
                let s = value.as_str().ok_or_else(|| format!("{} must be a string", self.name))?;
                if self.required && s.trim().is_empty() {
                    return Err(format!("{} is required", self.name));
                }
            }
            FieldKind::Integer => {
                if value.as_i64().is_none() {
                    return Err(format!("{} must be an integer", self.name));
                }
            }
            FieldKind::Enum(allowed) => {
                let s = value.as_str().ok_or_else(|| format!("{} must be a string", self.name))?;
                if s.is_empty() && !self.required {
                    return Ok(());
                }
                if !allowed.contains(&s) {
                    return Err(format!("{} must be one of: {}", self.name, allowed.join(", ")));
                }
            }
        }
        Ok(())
    }
}

#[derive(Debug)]
pub struct EntitySchema {
    /// Display name of the entity kind, e.g. `Dozent`.
    pub kind: &'static str,
    /// Name of the storage collection.
    pub collection: &'static str,
    /// Canonical URL prefix; also used for `Location` headers and `_links`.
    pub path: &'static str,
    /// Further URL prefixes routed to the same collection.
    pub aliases: &'static [&'static str],
    pub fields: &'static [FieldDef],
    /// Ascending sort applied by `search`.
    pub sort_keys: [&'static str; 2],
    pub not_found_message: &'static str,
}

pub const LECTURER_STATUS: &[&str] = &["intern", "extern"];

pub static LECTURER: EntitySchema = EntitySchema {
    kind: "Dozent",
    collection: "dozenten",
    path: "/dozent",
    aliases: &[],
    fields: &[
        FieldDef::text("vorname").required(),
        FieldDef::text("nachname").required(),
        FieldDef::text("fakultaet"),
        FieldDef::text("email"),
        FieldDef::one_of("status", LECTURER_STATUS).required(),
    ],
    sort_keys: ["vorname", "nachname"],
    not_found_message: "Dozent nicht gefunden",
};

pub static COURSE: EntitySchema = EntitySchema {
    kind: "Kurs",
    collection: "kurse",
    path: "/kurs",
    aliases: &["/kurse"],
    fields: &[
        FieldDef::text("name").required(),
        FieldDef::text("pruefungsform"),
        FieldDef::integer("ects"),
    ],
    sort_keys: ["name", "pruefungsform"],
    not_found_message: "Kein Kurs mit dieser ID",
};

pub static STUDENT: EntitySchema = EntitySchema {
    kind: "Studierender",
    collection: "studierende",
    path: "/studierender",
    aliases: &[],
    fields: &[
        FieldDef::text("vorname").required(),
        FieldDef::text("nachname").required(),
        FieldDef::integer("alter"),
        FieldDef::text("matrikelnr"),
        FieldDef::text("email"),
    ],
    sort_keys: ["vorname", "nachname"],
    not_found_message: "Studierender wurde nicht gefunden",
};

/// Every entity kind served by the application.
pub fn all() -> [&'static EntitySchema; 3] {
    [&LECTURER, &COURSE, &STUDENT]
}

impl EntitySchema {
    pub fn field(&self, name: &str) -> Option<&FieldDef> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Build a complete record from arbitrary input: declared fields only,
    /// falsy or missing values replaced by the field default.
    pub fn build(&self, input: &Document) -> Document {
        self.fields
            .iter()
            .map(|f| {
                let value = input
                    .get(f.name)
                    .filter(|v| crate::record::is_truthy(v))
                    .map(|v| f.normalize(v.clone()))
                    .unwrap_or_else(|| f.default_value());
                (f.name.to_string(), value)
            })
            .collect()
    }

    /// Turn raw query-string pairs into a filter document. Values of declared
    /// fields are normalized; unknown keys are kept as strings and simply match nothing.
    pub fn filter_from_query(&self, query: &HashMap<String, String>) -> Document {
        query
            .iter()
            .map(|(k, v)| {
                let raw = Value::from(v.as_str());
                let value = match self.field(k) {
                    Some(f) => f.normalize(raw),
                    None => raw,
                };
                (k.clone(), value)
            })
            .collect()
    }

    /// Strict validation of a complete record.
    pub fn validate_record(&self, record: &Document) -> Result<(), ServiceError> {
        for f in self.fields {
            let value = record.get(f.name).cloned().unwrap_or_else(|| f.default_value());
            f.check(&value).map_err(ServiceError::Validation)?;
        }
        Ok(())
    }

    /// Strict validation of the fields a patch is about to apply.
    pub fn validate_patch(&self, patch: &Document) -> Result<(), ServiceError> {
        for (name, value) in patch {
            if let Some(f) = self.field(name) {
                f.check(value).map_err(ServiceError::Validation)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(v: Value) -> Document {
        v.as_object().cloned().unwrap()
    }

    #[test]
    fn build_defaults_missing_and_falsy_fields() {
        let built = COURSE.build(&doc(json!({"name": "Mathematik", "ects": 0, "dozent": "x"})));
        assert_eq!(Value::Object(built), json!({"name": "Mathematik", "pruefungsform": "", "ects": 0}));

        let built = LECTURER.build(&Document::new());
        assert_eq!(built.len(), 5);
        assert!(built.values().all(|v| v == ""));
    }

    #[test]
    fn build_coerces_numeric_strings() {
        let built = STUDENT.build(&doc(json!({"vorname": "Johanna", "alter": "22", "matrikelnr": "01761272"})));
        assert_eq!(built["alter"], json!(22));
        // text fields keep leading zeros
        assert_eq!(built["matrikelnr"], json!("01761272"));
    }

    #[test]
    fn filter_from_query_normalizes_declared_fields() {
        let mut q = HashMap::new();
        q.insert("ects".to_string(), "6".to_string());
        q.insert("name".to_string(), "Mathematik".to_string());
        q.insert("unknown".to_string(), "7".to_string());
        let f = COURSE.filter_from_query(&q);
        assert_eq!(f["ects"], json!(6));
        assert_eq!(f["name"], json!("Mathematik"));
        assert_eq!(f["unknown"], json!("7"));
    }

    #[test]
    fn lecturer_status_must_be_intern_or_extern() {
        let ok = LECTURER.build(&doc(json!({"vorname": "Anna", "nachname": "Muster", "status": "intern"})));
        assert!(LECTURER.validate_record(&ok).is_ok());

        let bad = LECTURER.build(&doc(json!({"vorname": "Anna", "nachname": "Muster", "status": "gast"})));
        assert!(matches!(LECTURER.validate_record(&bad), Err(ServiceError::Validation(_))));

        let missing = LECTURER.build(&doc(json!({"vorname": "Anna", "nachname": "Muster"})));
        assert!(LECTURER.validate_record(&missing).is_err());
    }

    #[test]
    fn required_names_are_enforced() {
        let rec = STUDENT.build(&doc(json!({"nachname": "Meier"})));
        let err = STUDENT.validate_record(&rec).unwrap_err();
        assert!(err.to_string().contains("vorname"));
    }

    #[test]
    fn patch_validation_checks_types_only_for_present_fields() {
        assert!(COURSE.validate_patch(&doc(json!({"ects": 8}))).is_ok());
        assert!(COURSE.validate_patch(&doc(json!({"ects": "acht"}))).is_err());
        assert!(COURSE.validate_patch(&doc(json!({"name": 5}))).is_err());
        assert!(COURSE.validate_patch(&Document::new()).is_ok());
    }

    #[test]
    fn schemas_have_distinct_paths_and_declared_sort_keys() {
        let mut paths: Vec<&str> = all().iter().flat_map(|s| std::iter::once(s.path).chain(s.aliases.iter().copied())).collect();
        paths.sort();
        paths.dedup();
        assert_eq!(paths.len(), 4);
        for s in all() {
            for key in s.sort_keys {
                assert!(s.field(key).is_some(), "{} sorts by undeclared {key}", s.kind);
            }
        }
    }
}
