//! DHCP option definition (`dhcpoptiondefinition`)

use crate::api::object::WapiObject;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OptionDefinition {
    #[serde(rename = "_ref", default, skip_serializing)]
    pub reference: Option<String>,
    pub name: String,
    pub code: u32,
    /// Value type, e.g. `string` or `array of ip-address`
    pub r#type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub space: Option<String>,
}

impl WapiObject for OptionDefinition {
    const OBJECT_TYPE: &'static str = "dhcpoptiondefinition";
    const RETURN_FIELDS: &'static str = "name,code,type,space";
    const EXT_ATTRS: bool = false;

    fn reference(&self) -> Option<&str> {
        self.reference.as_deref()
    }
}
