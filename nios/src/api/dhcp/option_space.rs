//! DHCP option space (`dhcpoptionspace`)

use crate::api::object::WapiObject;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OptionSpace {
    #[serde(rename = "_ref", default, skip_serializing)]
    pub reference: Option<String>,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    /// References of the option definitions in this space, maintained by the server
    #[serde(default, skip_serializing)]
    pub option_definitions: Vec<String>,
}

impl WapiObject for OptionSpace {
    const OBJECT_TYPE: &'static str = "dhcpoptionspace";
    const RETURN_FIELDS: &'static str = "name,comment,option_definitions";
    const EXT_ATTRS: bool = false;

    fn reference(&self) -> Option<&str> {
        self.reference.as_deref()
    }
}
