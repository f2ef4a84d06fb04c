//! IPv6 DHCP range (`ipv6range`)

use super::DhcpMember;
use crate::api::common::{string_or_u32, ExtAttrs};
use crate::api::object::WapiObject;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Ipv6Range {
    #[serde(rename = "_ref", default, skip_serializing)]
    pub reference: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub network: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_addr: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_addr: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ipv6_start_prefix: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ipv6_end_prefix: Option<String>,
    #[serde(
        default,
        with = "string_or_u32",
        skip_serializing_if = "Option::is_none"
    )]
    pub ipv6_prefix_bits: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub network_view: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disable: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server_association_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub member: Option<DhcpMember>,
    #[serde(rename = "extattrs", default, skip_serializing_if = "Option::is_none")]
    pub ext_attrs: Option<ExtAttrs>,
}

impl WapiObject for Ipv6Range {
    const OBJECT_TYPE: &'static str = "ipv6range";
    const RETURN_FIELDS: &'static str = "network,start_addr,end_addr,address_type,\
ipv6_start_prefix,ipv6_end_prefix,ipv6_prefix_bits,name,comment,network_view,disable,\
server_association_type,member,extattrs";

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
