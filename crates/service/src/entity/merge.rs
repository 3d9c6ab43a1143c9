use serde_json::Value;

use crate::{record::{is_truthy, Document}, schema::EntitySchema};

/// Which values of an update patch overwrite stored fields.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum MergePolicy {
    /// Only truthy values are applied; `""`, `0`, `false` and `null` keep the stored value.
    #[default]
    Truthy,
    /// Every non-null value is applied, so `""` and `0` clear a field.
    Present,
}

impl MergePolicy {
    pub fn applies(self, value: &Value) -> bool {
        match self {
            Self::Truthy => is_truthy(value),
            Self::Present => !value.is_null(),
        }
    }

    /// The declared fields of `patch` this policy lets through, normalized.
    pub fn select(self, schema: &EntitySchema, patch: &Document) -> Document {
        schema
            .fields
            .iter()
            .filter_map(|f| {
                let value = patch.get(f.name).filter(|v| self.applies(v))?;
                Some((f.name.to_string(), f.normalize(value.clone())))
            })
            .collect()
    }
}

impl From<configs::MergePolicySetting> for MergePolicy {
    fn from(setting: configs::MergePolicySetting) -> Self {
        match setting {
            configs::MergePolicySetting::Truthy => Self::Truthy,
            configs::MergePolicySetting::Present => Self::Present,
        }
    }
}
