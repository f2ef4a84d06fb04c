//! `nios_dhcp_fixed_address`

use super::common::{expand_options, flatten_options, is_valid_mac, options_attribute, validate_options};
use crate::api::dhcp::FixedAddress;
use crate::resources::convert::{check_one_of, check_required_when, ObjectReader, ObjectWriter};
use crate::resources::NiosModel;
use std::net::Ipv4Addr;
use tfplug::schema::{Attribute, AttributeBuilder, AttributeType};
use tfplug::types::Diagnostic;

const MATCH_CLIENT_VALUES: &[&str] = &[
    "MAC_ADDRESS",
    "CLIENT_ID",
    "RESERVED",
    "CIRCUIT_ID",
    "REMOTE_ID",
];

impl NiosModel for FixedAddress {
    const TYPE_NAME: &'static str = "nios_dhcp_fixed_address";
    const DESCRIPTION: &'static str = "Manages an IPv4 DHCP fixed address";

    fn attributes() -> Vec<Attribute> {
        vec![
            AttributeBuilder::new("ipv4addr", AttributeType::String)
                .description("The IPv4 address of the fixed address, or a func:nextavailableip expression")
                .required()
                .build(),
            AttributeBuilder::new("mac", AttributeType::String)
                .description("The MAC address of the client")
                .optional()
                .computed()
                .build(),
            AttributeBuilder::new("match_client", AttributeType::String)
                .description("How the client is matched: MAC_ADDRESS, CLIENT_ID, RESERVED, CIRCUIT_ID or REMOTE_ID")
                .optional()
                .computed()
                .build(),
            AttributeBuilder::new("dhcp_client_identifier", AttributeType::String)
                .description("The DHCP client ID, used when match_client is CLIENT_ID")
                .optional()
                .build(),
            AttributeBuilder::new("agent_circuit_id", AttributeType::String)
                .description("The agent circuit ID, used when match_client is CIRCUIT_ID")
                .optional()
                .build(),
            AttributeBuilder::new("agent_remote_id", AttributeType::String)
                .description("The agent remote ID, used when match_client is REMOTE_ID")
                .optional()
                .build(),
            AttributeBuilder::new("name", AttributeType::String)
                .description("The name of the fixed address")
                .optional()
                .build(),
            AttributeBuilder::new("comment", AttributeType::String)
                .description("Comment for the fixed address")
                .optional()
                .build(),
            AttributeBuilder::new("network_view", AttributeType::String)
                .description("The network view the fixed address belongs to")
                .optional()
                .computed()
                .build(),
            AttributeBuilder::new("disable", AttributeType::Bool)
                .description("Whether the fixed address is disabled")
                .optional()
                .computed()
                .build(),
            options_attribute(),
        ]
    }

    fn expand(config: &ObjectReader<'_>) -> Result<Self, Diagnostic> {
        Ok(Self {
            reference: None,
            ipv4addr: config.required_string("ipv4addr")?,
            mac: config.string("mac")?,
            match_client: config.string("match_client")?,
            dhcp_client_identifier: config.string("dhcp_client_identifier")?,
            agent_circuit_id: config.string("agent_circuit_id")?,
            agent_remote_id: config.string("agent_remote_id")?,
            name: config.string("name")?,
            comment: config.string("comment")?,
            network_view: config.string("network_view")?,
            disable: config.bool("disable")?,
            options: expand_options(config)?,
            ext_attrs: None,
        })
    }

    fn flatten(&self, out: &mut ObjectWriter) {
        out.set("ipv4addr", self.ipv4addr.clone())
            .set("mac", self.mac.clone())
            .set("match_client", self.match_client.clone())
            .set("dhcp_client_identifier", self.dhcp_client_identifier.clone())
            .set("agent_circuit_id", self.agent_circuit_id.clone())
            .set("agent_remote_id", self.agent_remote_id.clone())
            .set("name", self.name.clone())
            .set("comment", self.comment.clone())
            .set("network_view", self.network_view.clone())
            .set("disable", self.disable)
            .set("options", flatten_options(self.options.as_ref()));
    }

    fn validate(config: &ObjectReader<'_>) -> Vec<Diagnostic> {
        let mut diagnostics = validate_options(config);

        if let Ok(Some(addr)) = config.string("ipv4addr") {
            if !addr.starts_with("func:") && addr.parse::<Ipv4Addr>().is_err() {
                diagnostics.push(
                    Diagnostic::error(
                        "Invalid IPv4 address",
                        format!("'{}' is not a valid IPv4 address", addr),
                    )
                    .with_attribute(config.path("ipv4addr")),
                );
            }
        }

        if let Ok(Some(mac)) = config.string("mac") {
            if !is_valid_mac(&mac) {
                diagnostics.push(
                    Diagnostic::error(
                        "Invalid MAC address",
                        format!("'{}' is not a valid MAC address", mac),
                    )
                    .with_attribute(config.path("mac")),
                );
            }
        }

        diagnostics.extend(check_one_of(config, "match_client", MATCH_CLIENT_VALUES));

        let companion = match config.string("match_client") {
            Ok(Some(mode)) => match mode.as_str() {
                "MAC_ADDRESS" => Some("mac"),
                "CLIENT_ID" => Some("dhcp_client_identifier"),
                "CIRCUIT_ID" => Some("agent_circuit_id"),
                "REMOTE_ID" => Some("agent_remote_id"),
                _ => None,
            },
            _ => None,
        };
        if let Some(field) = companion {
            let reason = format!(
                "match_client is {}",
                config.string("match_client").ok().flatten().unwrap_or_default()
            );
            diagnostics.extend(check_required_when(config, field, &reason));
        }

        diagnostics
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::dhcp::DhcpOption;
    use crate::resources::dhcp::test_support::{round_trip, validate};
    use tfplug::types::Dynamic;

    #[test]
    fn round_trip_preserves_writable_fields() {
        let fixed = FixedAddress {
            ipv4addr: "10.0.0.5".to_string(),
            mac: Some("00:11:22:33:44:55".to_string()),
            match_client: Some("MAC_ADDRESS".to_string()),
            name: Some("printer".to_string()),
            comment: Some("2nd floor".to_string()),
            network_view: Some("default".to_string()),
            disable: Some(false),
            options: Some(vec![DhcpOption {
                name: Some("routers".to_string()),
                value: Some("10.0.0.1".to_string()),
                ..Default::default()
            }]),
            ..Default::default()
        };

        assert_eq!(round_trip(&fixed), fixed);
    }

    #[test]
    fn mac_match_requires_mac() {
        let diags = validate::<FixedAddress>(vec![
            ("ipv4addr", Dynamic::from("10.0.0.5")),
            ("match_client", Dynamic::from("MAC_ADDRESS")),
        ]);

        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].attribute.as_ref().unwrap().to_string(), "mac");
    }

    #[test]
    fn client_id_match_requires_identifier() {
        let diags = validate::<FixedAddress>(vec![
            ("ipv4addr", Dynamic::from("10.0.0.5")),
            ("match_client", Dynamic::from("CLIENT_ID")),
        ]);

        assert_eq!(diags.len(), 1);
        assert!(diags[0].detail.contains("dhcp_client_identifier"));
    }

    #[test]
    fn rejects_bad_address_mac_and_mode() {
        let diags = validate::<FixedAddress>(vec![
            ("ipv4addr", Dynamic::from("10.0.0.300")),
            ("mac", Dynamic::from("00:11:22")),
            ("match_client", Dynamic::from("SERIAL")),
        ]);

        assert_eq!(diags.len(), 3);
    }

    #[test]
    fn accepts_next_available_function() {
        let diags = validate::<FixedAddress>(vec![
            ("ipv4addr", Dynamic::from("func:nextavailableip:10.0.0.0/24")),
            ("match_client", Dynamic::from("RESERVED")),
        ]);

        assert!(diags.is_empty());
    }
}
