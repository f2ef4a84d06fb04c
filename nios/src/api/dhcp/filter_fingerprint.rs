//! DHCP fingerprint filter (`filterfingerprint`)

use crate::api::common::ExtAttrs;
use crate::api::object::WapiObject;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterFingerprint {
    #[serde(rename = "_ref", default, skip_serializing)]
    pub reference: Option<String>,
    pub name: String,
    /// Names of the fingerprints matched by this filter
    #[serde(default)]
    pub fingerprint: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(rename = "extattrs", default, skip_serializing_if = "Option::is_none")]
    pub ext_attrs: Option<ExtAttrs>,
}

impl WapiObject for FilterFingerprint {
    const OBJECT_TYPE: &'static str = "filterfingerprint";
    const RETURN_FIELDS: &'static str = "name,fingerprint,comment,extattrs";

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
