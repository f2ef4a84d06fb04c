//! DHCP object models

pub mod common;
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
