//! Wire structs for the DHCP object types

pub mod filter_fingerprint;
pub mod filter_mac;
pub mod filter_nac;
pub mod filter_relay_agent;
pub mod fixed_address;
pub mod ipv6_range;
pub mod ipv6_range_template;
pub mod option_definition;
pub mod option_space;
pub mod shared_network;

pub use filter_fingerprint::FilterFingerprint;
pub use filter_mac::FilterMac;
pub use filter_nac::FilterNac;
pub use filter_relay_agent::FilterRelayAgent;
pub use fixed_address::FixedAddress;
pub use ipv6_range::Ipv6Range;
pub use ipv6_range_template::Ipv6RangeTemplate;
pub use option_definition::OptionDefinition;
pub use option_space::OptionSpace;
pub use shared_network::SharedNetwork;

use serde::{Deserialize, Serialize};

/// One DHCP option carried by ranges, fixed addresses and filters
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DhcpOption {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub num: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vendor_class: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub use_option: Option<bool>,
}

/// Grid member serving a range
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DhcpMember {
    #[serde(rename = "_struct", default = "DhcpMember::struct_name")]
    pub struct_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ipv4addr: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ipv6addr: Option<String>,
}

impl DhcpMember {
    fn struct_name() -> String {
        "dhcpmember".to_string()
    }

    pub fn named(name: impl Into<String>) -> Self {
        Self {
            struct_name: Self::struct_name(),
            name: Some(name.into()),
            ipv4addr: None,
            ipv6addr: None,
        }
    }
}
