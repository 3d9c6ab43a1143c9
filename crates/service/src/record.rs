use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

/// Field map of one stored record, without its identifier.
pub type Document = Map<String, Value>;

/// A stored record: server-assigned `_id` plus the declared fields.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Record {
    #[serde(rename = "_id")]
    pub id: Uuid,
    #[serde(flatten)]
    pub fields: Document,
}

impl Record {
    pub fn new(id: Uuid, fields: Document) -> Self { Self { id, fields } }

    pub fn get(&self, field: &str) -> Option<&Value> { self.fields.get(field) }
}

/// JavaScript-style truthiness: `null`, `false`, `0`, `NaN` and `""` are falsy,
/// everything else (including empty arrays and objects) is truthy.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn truthiness_follows_js() {
        for v in [json!(null), json!(false), json!(0), json!(0.0), json!("")] {
            assert!(!is_truthy(&v), "{v} should be falsy");
        }
        for v in [json!(true), json!(1), json!(-2.5), json!("0"), json!(" "), json!([]), json!({})] {
            assert!(is_truthy(&v), "{v} should be truthy");
        }
    }

    #[test]
    fn record_serializes_flat_with_underscore_id() {
        let id = Uuid::new_v4();
        let mut fields = Document::new();
        fields.insert("name".into(), json!("Mathematik"));
        fields.insert("ects".into(), json!(6));
        let rec = Record::new(id, fields);

        let v = serde_json::to_value(&rec).unwrap();
        assert_eq!(v, json!({"_id": id.to_string(), "name": "Mathematik", "ects": 6}));

        let back: Record = serde_json::from_value(v).unwrap();
        assert_eq!(back, rec);
    }
}
