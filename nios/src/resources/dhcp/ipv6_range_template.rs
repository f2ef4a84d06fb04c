//! `nios_dhcp_ipv6rangetemplate`

use super::common::{
    expand_member, flatten_member, member_attribute, member_cleared_value,
    SERVER_ASSOCIATION_TYPES,
};
use crate::api::dhcp::Ipv6RangeTemplate;
use crate::resources::convert::{check_one_of, check_required_when, ObjectReader, ObjectWriter};
use crate::resources::NiosModel;
use tfplug::schema::{Attribute, AttributeBuilder, AttributeType};
use tfplug::types::Diagnostic;

impl NiosModel for Ipv6RangeTemplate {
    const TYPE_NAME: &'static str = "nios_dhcp_ipv6rangetemplate";
    const DESCRIPTION: &'static str = "Manages an IPv6 DHCP range template";

    fn attributes() -> Vec<Attribute> {
        vec![
            AttributeBuilder::new("name", AttributeType::String)
                .description("The name of the template")
                .required()
                .build(),
            AttributeBuilder::new("number_of_addresses", AttributeType::Number)
                .description("Number of addresses in ranges created from the template")
                .required()
                .build(),
            AttributeBuilder::new("offset", AttributeType::Number)
                .description("Offset of the range from the start of the network")
                .required()
                .build(),
            AttributeBuilder::new("comment", AttributeType::String)
                .description("Comment for the template")
                .optional()
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
            name: config.required_string("name")?,
            number_of_addresses: config.required_u32("number_of_addresses")?,
            offset: config.required_u32("offset")?,
            comment: config.string("comment")?,
            server_association_type: config.string("server_association_type")?,
            member: expand_member(config)?,
        })
    }

    fn flatten(&self, out: &mut ObjectWriter) {
        out.set("name", self.name.clone())
            .set("number_of_addresses", self.number_of_addresses)
            .set("offset", self.offset)
            .set("comment", self.comment.clone())
            .set("server_association_type", self.server_association_type.clone())
            .set("member", flatten_member(self.member.as_ref()));
    }

    fn cleared_value(attribute: &Attribute) -> serde_json::Value {
        member_cleared_value(attribute)
    }

    fn validate(config: &ObjectReader<'_>) -> Vec<Diagnostic> {
        let mut diagnostics = Vec::new();
        diagnostics.extend(check_one_of(
            config,
            "server_association_type",
            SERVER_ASSOCIATION_TYPES,
        ));
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
