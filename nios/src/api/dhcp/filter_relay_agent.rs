//! Relay agent filter (`filterrelayagent`)

use crate::api::common::ExtAttrs;
use crate::api::object::WapiObject;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterRelayAgent {
    #[serde(rename = "_ref", default, skip_serializing)]
    pub reference: Option<String>,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    /// `ANY`, `MATCHES_VALUE` or `NOT_SET`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_circuit_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub circuit_id_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_circuit_id_substring: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub circuit_id_substring_offset: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub circuit_id_substring_length: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_remote_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remote_id_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_remote_id_substring: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remote_id_substring_offset: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remote_id_substring_length: Option<u32>,
    #[serde(rename = "extattrs", default, skip_serializing_if = "Option::is_none")]
    pub ext_attrs: Option<ExtAttrs>,
}

impl WapiObject for FilterRelayAgent {
    const OBJECT_TYPE: &'static str = "filterrelayagent";
    const RETURN_FIELDS: &'static str = "name,comment,is_circuit_id,circuit_id_name,\
is_circuit_id_substring,circuit_id_substring_offset,circuit_id_substring_length,\
is_remote_id,remote_id_name,is_remote_id_substring,remote_id_substring_offset,\
remote_id_substring_length,extattrs";

    fn reference(&self) -> Option<&str> {
        self.reference.as_deref()
    }

    fn ext_attrs(&self) -> Option<&ExtAttrs> {
        self.ext_attrs.as_ref()
    }

    fn set_ext_attrs(&mut self, ext_attrs: Option<ExtAttrs>) {
        self.ext_attrs = ext_attrs;
    }
}
