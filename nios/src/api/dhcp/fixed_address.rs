//! IPv4 fixed address (`fixedaddress`)

use super::DhcpOption;
use crate::api::common::ExtAttrs;
use crate::api::object::WapiObject;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FixedAddress {
    #[serde(rename = "_ref", default, skip_serializing)]
    pub reference: Option<String>,
    pub ipv4addr: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mac: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub match_client: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dhcp_client_identifier: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent_circuit_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent_remote_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub network_view: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disable: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<DhcpOption>>,
    #[serde(rename = "extattrs", default, skip_serializing_if = "Option::is_none")]
    pub ext_attrs: Option<ExtAttrs>,
}

impl WapiObject for FixedAddress {
    const OBJECT_TYPE: &'static str = "fixedaddress";
    const RETURN_FIELDS: &'static str = "ipv4addr,mac,match_client,dhcp_client_identifier,\
agent_circuit_id,agent_remote_id,name,comment,network_view,disable,options,extattrs";

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
