//! IPv6 range template (`ipv6rangetemplate`)
//!
//! Templates carry no extensible attributes.

use super::DhcpMember;
use crate::api::object::WapiObject;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Ipv6RangeTemplate {
    #[serde(rename = "_ref", default, skip_serializing)]
    pub reference: Option<String>,
    pub name: String,
    pub number_of_addresses: u32,
    pub offset: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server_association_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub member: Option<DhcpMember>,
}

impl WapiObject for Ipv6RangeTemplate {
    const OBJECT_TYPE: &'static str = "ipv6rangetemplate";
    const RETURN_FIELDS: &'static str =
        "name,number_of_addresses,offset,comment,server_association_type,member";
    const EXT_ATTRS: bool = false;

    fn reference(&self) -> Option<&str> {
        self.reference.as_deref()
    }
}
