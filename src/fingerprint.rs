use std::{collections::BTreeMap, fmt};

use serde_json::{Map, Value as JsonValue};

use crate::ApiRequest;

/// Canonical key identifying a logical request.
///
/// Built from method, path, query and body. Query keys are serialized in
/// sorted order, so the order of distinct keys does not change the key. A
/// repeated key keeps all of its values, in the order they were added.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Fingerprint(String);

impl Fingerprint {
    pub fn of(request: &ApiRequest) -> Self {
        let params = if request.query.is_empty() {
            String::new()
        } else {
            let mut grouped: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
            for (key, value) in &request.query {
                grouped.entry(key.as_str()).or_default().push(value.as_str());
            }
            let map: Map<String, JsonValue> = grouped
                .into_iter()
                .map(|(key, values)| {
                    let value = match values.as_slice() {
                        [single] => JsonValue::String((*single).to_owned()),
                        many => many.iter().map(|value| JsonValue::from(*value)).collect(),
                    };
                    (key.to_owned(), value)
                })
                .collect();
            JsonValue::Object(map).to_string()
        };
        let data = request
            .body
            .as_ref()
            .map(JsonValue::to_string)
            .unwrap_or_default();
        Self(format!(
            "{}:{}:{}:{}",
            request.method, request.path, params, data
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
