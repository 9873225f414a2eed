//! Forum member model.
//!
//! Invision nests profile fields as `group id -> { name, fields: field id ->
//! { name, value } }`. The model re-keys both levels by display name, which
//! is what callers look fields up by, and keeps the ids for writes.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};

/// One profile field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomField {
    pub id: String,
    pub value: Option<String>,
}

/// A named group of profile fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct FieldGroup {
    pub id: String,
    pub fields: BTreeMap<String, CustomField>,
}

/// A forum account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForumMember {
    pub id: String,
    pub name: String,
    /// Keyed by group name.
    pub custom_fields: BTreeMap<String, FieldGroup>,
}

impl ForumMember {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            custom_fields: BTreeMap::new(),
        }
    }

    /// Add (or replace) a field, creating its group on first use.
    pub fn with_field(
        mut self,
        group_id: &str,
        group: &str,
        field_id: &str,
        field: &str,
        value: Option<&str>,
    ) -> Self {
        let entry = self
            .custom_fields
            .entry(group.to_string())
            .or_insert_with(|| FieldGroup {
                id: group_id.to_string(),
                fields: BTreeMap::new(),
            });
        entry.fields.insert(
            field.to_string(),
            CustomField {
                id: field_id.to_string(),
                value: value.map(str::to_string),
            },
        );
        self
    }

    pub fn group(&self, group: &str) -> Option<&FieldGroup> {
        self.custom_fields.get(group)
    }

    pub fn field(&self, group: &str, field: &str) -> Option<&CustomField> {
        self.group(group).and_then(|g| g.fields.get(field))
    }

    /// Value of a field, `None` when the field is absent or empty.
    pub fn field_value(&self, group: &str, field: &str) -> Option<&str> {
        self.field(group, field).and_then(|f| f.value.as_deref())
    }

    /// Overwrite an existing field's value. Returns false if the field does not exist.
    pub fn set_field(&mut self, group: &str, field: &str, value: impl Into<String>) -> bool {
        match self
            .custom_fields
            .get_mut(group)
            .and_then(|g| g.fields.get_mut(field))
        {
            Some(existing) => {
                existing.value = Some(value.into());
                true
            }
            None => false,
        }
    }

    /// `(field id, value)` for every field that holds a value.
    pub fn field_values(&self) -> Vec<(String, String)> {
        self.custom_fields
            .values()
            .flat_map(|g| g.fields.values())
            .filter_map(|f| f.value.as_ref().map(|v| (f.id.clone(), v.clone())))
            .collect()
    }
}

/// PHP renders an empty map as `[]`.
#[derive(Deserialize)]
#[serde(untagged)]
enum MapOrList<T> {
    Map(HashMap<String, T>),
    List(Vec<Value>),
}

impl<T> Default for MapOrList<T> {
    fn default() -> Self {
        Self::List(Vec::new())
    }
}

impl<T> MapOrList<T> {
    fn into_map(self) -> HashMap<String, T> {
        match self {
            Self::Map(map) => map,
            Self::List(_) => HashMap::new(),
        }
    }
}

#[derive(Deserialize)]
struct RawField {
    name: String,
    #[serde(default)]
    value: Value,
}

#[derive(Deserialize)]
struct RawGroup {
    name: String,
    #[serde(default)]
    fields: MapOrList<RawField>,
}

/// Member as returned by `GET /core/members/{id}`.
#[derive(Deserialize)]
pub(crate) struct RawMember {
    id: Value,
    name: String,
    #[serde(rename = "customFields", default)]
    custom_fields: MapOrList<RawGroup>,
}

fn scalar_to_string(value: Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s),
        other => Some(other.to_string()),
    }
}

impl From<RawMember> for ForumMember {
    fn from(raw: RawMember) -> Self {
        let custom_fields = raw
            .custom_fields
            .into_map()
            .into_iter()
            .map(|(group_id, group)| {
                let fields = group
                    .fields
                    .into_map()
                    .into_iter()
                    .map(|(field_id, field)| {
                        (
                            field.name,
                            CustomField {
                                id: field_id,
                                value: scalar_to_string(field.value),
                            },
                        )
                    })
                    .collect();
                (group.name, FieldGroup { id: group_id, fields })
            })
            .collect();

        Self {
            id: scalar_to_string(raw.id).unwrap_or_default(),
            name: raw.name,
            custom_fields,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(value: Value) -> ForumMember {
        serde_json::from_value::<RawMember>(value).unwrap().into()
    }

    #[test]
    fn test_parse_nested_custom_fields() {
        let member = parse(json!({
            "id": 21,
            "name": "alice",
            "email": "alice@example.com",
            "customFields": {
                "3": {
                    "name": "Discord",
                    "fields": {
                        "7": { "name": "Verification Code", "value": "abcdEFGH1234" },
                        "8": { "name": "Discord Username", "value": null },
                        "9": { "name": "Discord ID", "value": "" }
                    }
                }
            }
        }));

        assert_eq!(member.id, "21");
        assert_eq!(member.name, "alice");
        assert_eq!(member.group("Discord").unwrap().id, "3");
        assert_eq!(
            member.field_value("Discord", "Verification Code"),
            Some("abcdEFGH1234")
        );
        assert_eq!(member.field("Discord", "Discord Username").unwrap().id, "8");
        assert_eq!(member.field_value("Discord", "Discord Username"), None);
        assert_eq!(member.field_value("Discord", "Discord ID"), Some(""));
    }

    #[test]
    fn test_empty_custom_fields_list() {
        let member = parse(json!({ "id": "5", "name": "bob", "customFields": [] }));
        assert!(member.custom_fields.is_empty());
        assert!(member.group("Discord").is_none());

        let member = parse(json!({ "id": 6, "name": "carol" }));
        assert!(member.custom_fields.is_empty());
    }

    #[test]
    fn test_set_field_only_touches_existing() {
        let mut member = ForumMember::new("21", "alice").with_field(
            "3",
            "Discord",
            "8",
            "Discord Username",
            None,
        );

        assert!(member.set_field("Discord", "Discord Username", "alice"));
        assert!(!member.set_field("Discord", "Discord ID", "1001"));
        assert!(!member.set_field("Other", "Discord Username", "x"));
        assert_eq!(
            member.field_values(),
            vec![("8".to_string(), "alice".to_string())]
        );
    }
}
