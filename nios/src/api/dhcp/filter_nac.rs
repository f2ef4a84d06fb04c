//! NAC filter (`filternac`)

use super::DhcpOption;
use crate::api::common::ExtAttrs;
use crate::api::object::WapiObject;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterNac {
    #[serde(rename = "_ref", default, skip_serializing)]
    pub reference: Option<String>,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expression: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lease_time: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<DhcpOption>>,
    #[serde(rename = "extattrs", default, skip_serializing_if = "Option::is_none")]
    pub ext_attrs: Option<ExtAttrs>,
}

impl WapiObject for FilterNac {
    const OBJECT_TYPE: &'static str = "filternac";
    const RETURN_FIELDS: &'static str = "name,comment,expression,lease_time,options,extattrs";

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
