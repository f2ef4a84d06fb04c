//! `nios_dhcp_ipv6range`

use super::common::{
    expand_member, flatten_member, member_attribute, member_cleared_value,
    SERVER_ASSOCIATION_TYPES,
};
use crate::api::dhcp::Ipv6Range;
use crate::resources::convert::{check_one_of, check_required_when, ObjectReader, ObjectWriter};
use crate::resources::NiosModel;
use std::net::Ipv6Addr;
use tfplug::schema::{Attribute, AttributeBuilder, AttributeType};
use tfplug::types::Diagnostic;

const ADDRESS_TYPES: &[&str] = &["ADDRESS", "PREFIX", "BOTH"];

impl NiosModel for Ipv6Range {
    const TYPE_NAME: &'static str = "nios_dhcp_ipv6range";
    const DESCRIPTION: &'static str = "Manages an IPv6 DHCP range";

    fn attributes() -> Vec<Attribute> {
        vec![
            AttributeBuilder::new("network", AttributeType::String)
                .description("The network the range belongs to, in CIDR format")
                .optional()
                .computed()
                .build(),
            AttributeBuilder::new("start_addr", AttributeType::String)
                .description("The first IPv6 address of the range")
                .optional()
                .build(),
            AttributeBuilder::new("end_addr", AttributeType::String)
                .description("The last IPv6 address of the range")
                .optional()
                .build(),
            AttributeBuilder::new("address_type", AttributeType::String)
                .description("ADDRESS, PREFIX or BOTH")
                .optional()
                .computed()
                .build(),
            AttributeBuilder::new("ipv6_start_prefix", AttributeType::String)
                .description("The first prefix of a prefix delegation range")
                .optional()
                .build(),
            AttributeBuilder::new("ipv6_end_prefix", AttributeType::String)
                .description("The last prefix of a prefix delegation range")
                .optional()
                .build(),
            AttributeBuilder::new("ipv6_prefix_bits", AttributeType::Number)
                .description("Prefix length of the delegated prefixes")
                .optional()
                .build(),
            AttributeBuilder::new("name", AttributeType::String)
                .description("The name of the range")
                .optional()
                .build(),
            AttributeBuilder::new("comment", AttributeType::String)
                .description("Comment for the range")
                .optional()
                .build(),
            AttributeBuilder::new("network_view", AttributeType::String)
                .description("The network view the range belongs to")
                .optional()
                .computed()
                .build(),
            AttributeBuilder::new("disable", AttributeType::Bool)
                .description("Whether the range is disabled")
                .optional()
                .computed()
                .build(),
            AttributeBuilder::new("server_association_type", AttributeType::String)
                .description("NONE or MEMBER")
                .optional()
                .computed()
                .build(),
            member_attribute(),
        ]
    }

    fn expand(config: &ObjectReader<'_>) -> Result<Self, Diagnostic> {
        Ok(Self {
            reference: None,
            network: config.string("network")?,
            start_addr: config.string("start_addr")?,
            end_addr: config.string("end_addr")?,
            address_type: config.string("address_type")?,
            ipv6_start_prefix: config.string("ipv6_start_prefix")?,
            ipv6_end_prefix: config.string("ipv6_end_prefix")?,
            ipv6_prefix_bits: config.u32("ipv6_prefix_bits")?,
            name: config.string("name")?,
            comment: config.string("comment")?,
            network_view: config.string("network_view")?,
            disable: config.bool("disable")?,
            server_association_type: config.string("server_association_type")?,
            member: expand_member(config)?,
            ext_attrs: None,
        })
    }

    fn flatten(&self, out: &mut ObjectWriter) {
        out.set("network", self.network.clone())
            .set("start_addr", self.start_addr.clone())
            .set("end_addr", self.end_addr.clone())
            .set("address_type", self.address_type.clone())
            .set("ipv6_start_prefix", self.ipv6_start_prefix.clone())
            .set("ipv6_end_prefix", self.ipv6_end_prefix.clone())
            .set("ipv6_prefix_bits", self.ipv6_prefix_bits)
            .set("name", self.name.clone())
            .set("comment", self.comment.clone())
            .set("network_view", self.network_view.clone())
            .set("disable", self.disable)
            .set("server_association_type", self.server_association_type.clone())
            .set("member", flatten_member(self.member.as_ref()));
    }

    fn cleared_value(attribute: &Attribute) -> serde_json::Value {
        member_cleared_value(attribute)
    }

    fn validate(config: &ObjectReader<'_>) -> Vec<Diagnostic> {
        let mut diagnostics = Vec::new();

        diagnostics.extend(check_one_of(config, "address_type", ADDRESS_TYPES));
        diagnostics.extend(check_one_of(
            config,
            "server_association_type",
            SERVER_ASSOCIATION_TYPES,
        ));

        for field in ["start_addr", "end_addr"] {
            if let Ok(Some(addr)) = config.string(field) {
                if addr.parse::<Ipv6Addr>().is_err() {
                    diagnostics.push(
                        Diagnostic::error(
                            "Invalid IPv6 address",
                            format!("'{}' is not a valid IPv6 address", addr),
                        )
                        .with_attribute(config.path(field)),
                    );
                }
            }
        }

        // The server defaults to ADDRESS
        if !config.is_unknown("address_type") {
            let address_type = config
                .string("address_type")
                .ok()
                .flatten()
                .unwrap_or_else(|| "ADDRESS".to_string());
            let reason = format!("address_type is {}", address_type);
            if matches!(address_type.as_str(), "ADDRESS" | "BOTH") {
                for field in ["start_addr", "end_addr"] {
                    diagnostics.extend(check_required_when(config, field, &reason));
                }
            }
            if matches!(address_type.as_str(), "PREFIX" | "BOTH") {
                for field in ["ipv6_start_prefix", "ipv6_end_prefix", "ipv6_prefix_bits"] {
                    diagnostics.extend(check_required_when(config, field, &reason));
                }
            }
        }

        if let Ok(Some(bits)) = config.u32("ipv6_prefix_bits") {
            if !(1..=128).contains(&bits) {
                diagnostics.push(
                    Diagnostic::error(
                        "Invalid prefix length",
                        format!("ipv6_prefix_bits must be between 1 and 128, got {}", bits),
                    )
                    .with_attribute(config.path("ipv6_prefix_bits")),
                );
            }
        }

        if let Ok(Some(association)) = config.string("server_association_type") {
            if association == "MEMBER" {
                diagnostics.extend(check_required_when(
                    config,
                    "member",
                    "server_association_type is MEMBER",
                ));
            }
        }

        diagnostics
    }
}
