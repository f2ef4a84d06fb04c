//! Common types and utilities for the NIOS WAPI

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Envelope of every response requested with `_return_as_object=1`
#[derive(Debug, Deserialize)]
pub struct WapiResult<T> {
    pub result: T,
}

/// One page of a paged list call
#[derive(Debug, Deserialize)]
pub struct WapiPage<T> {
    pub result: Vec<T>,
    #[serde(default)]
    pub next_page_id: Option<String>,
}

/// Error body returned by WAPI, e.g.
/// `{"Error": "AdmConDataNotFound: ...", "code": "Client.Ibap.Data.NotFound", "text": "..."}`
#[derive(Debug, Clone, Deserialize, thiserror::Error)]
#[error("{code}: {text}")]
pub struct ApiErrorResponse {
    #[serde(rename = "Error", default)]
    pub error: String,
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub text: String,
}

impl ApiErrorResponse {
    pub fn is_not_found(&self) -> bool {
        self.code.ends_with("NotFound")
    }
}

/// Wire form of one extensible attribute value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtAttr {
    pub value: serde_json::Value,
    /// Set by the server when the value is inherited from a parent object
    #[serde(default, skip_serializing)]
    pub inheritance_source: Option<serde_json::Value>,
}

impl ExtAttr {
    pub fn new(value: impl Into<serde_json::Value>) -> Self {
        Self {
            value: value.into(),
            inheritance_source: None,
        }
    }

    pub fn is_inherited(&self) -> bool {
        self.inheritance_source.is_some()
    }
}

pub type ExtAttrs = HashMap<String, ExtAttr>;

#[derive(Debug, Clone, Default)]
pub struct ApiQueryParams {
    params: Vec<(String, String)>,
}

impl ApiQueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add<K: Into<String>, V: ToString>(mut self, key: K, value: V) -> Self {
        self.params.push((key.into(), value.to_string()));
        self
    }

    /// `_return_fields+=<fields>&_return_as_object=1`
    pub fn return_fields(self, fields: &str) -> Self {
        let params = if fields.is_empty() {
            self
        } else {
            self.add("_return_fields+", fields)
        };
        params.add("_return_as_object", 1)
    }

    pub fn to_query_string(&self) -> String {
        if self.params.is_empty() {
            String::new()
        } else {
            format!(
                "?{}",
                self.params
                    .iter()
                    .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
                    .collect::<Vec<_>>()
                    .join("&")
            )
        }
    }
}

/// WAPI returns some integers as strings depending on the object version
pub mod string_or_u32 {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &Option<u32>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(v) => serializer.serialize_some(v),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum StringOrU32 {
            String(String),
            U32(u32),
        }

        match Option::<StringOrU32>::deserialize(deserializer)? {
            Some(StringOrU32::String(s)) => {
                s.parse::<u32>().map(Some).map_err(serde::de::Error::custom)
            }
            Some(StringOrU32::U32(u)) => Ok(Some(u)),
            None => Ok(None),
        }
    }
}
