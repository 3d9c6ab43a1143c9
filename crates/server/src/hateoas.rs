//! Hypermedia links attached to every record returned by the API.

use serde::Serialize;
use service::Record;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, ToSchema, PartialEq, Eq)]
pub struct Link {
    pub url: String,
    pub method: String,
}

#[derive(Debug, Clone, Serialize, ToSchema, PartialEq, Eq)]
pub struct Links {
    pub read: Link,
    pub update: Link,
    pub patch: Link,
    pub delete: Link,
}

impl Links {
    /// Links of record `id` under the canonical `prefix`, e.g. `/dozent`.
    pub fn for_record(prefix: &str, id: Uuid) -> Self {
        let url = format!("{prefix}/{id}");
        let link = |method: &str| Link { url: url.clone(), method: method.to_string() };
        Self { read: link("GET"), update: link("PUT"), patch: link("PATCH"), delete: link("DELETE") }
    }
}

/// A record as sent to clients: `_id`, fields and `_links`.
#[derive(Debug, Clone, Serialize)]
pub struct Resource {
    #[serde(flatten)]
    pub record: Record,
    #[serde(rename = "_links")]
    pub links: Links,
}

impl Resource {
    pub fn new(prefix: &str, record: Record) -> Self {
        let links = Links::for_record(prefix, record.id);
        Self { record, links }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn resource_serializes_fields_and_four_links() {
        let id = Uuid::new_v4();
        let mut fields = service::Document::new();
        fields.insert("name".into(), json!("Mathematik"));
        let v = serde_json::to_value(Resource::new("/kurs", Record::new(id, fields))).unwrap();

        let url = format!("/kurs/{id}");
        assert_eq!(v["_id"], json!(id.to_string()));
        assert_eq!(v["name"], json!("Mathematik"));
        assert_eq!(
            v["_links"],
            json!({
                "read": {"url": url, "method": "GET"},
                "update": {"url": url, "method": "PUT"},
                "patch": {"url": url, "method": "PATCH"},
                "delete": {"url": url, "method": "DELETE"},
            })
        );
    }
}
