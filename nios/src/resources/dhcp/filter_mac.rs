//! `nios_dhcp_filtermac`

use super::common::{expand_options, flatten_options, options_attribute, validate_options};
use crate::api::dhcp::FilterMac;
use crate::resources::convert::{ObjectReader, ObjectWriter};
use crate::resources::NiosModel;
use tfplug::schema::{Attribute, AttributeBuilder, AttributeType};
use tfplug::types::Diagnostic;

impl NiosModel for FilterMac {
    const TYPE_NAME: &'static str = "nios_dhcp_filtermac";
    const DESCRIPTION: &'static str = "Manages a DHCP MAC address filter";

    fn attributes() -> Vec<Attribute> {
        vec![
            AttributeBuilder::new("name", AttributeType::String)
                .description("The name of the MAC filter")
                .required()
                .build(),
            AttributeBuilder::new("comment", AttributeType::String)
                .description("Comment for the MAC filter")
                .optional()
                .build(),
            AttributeBuilder::new("default_mac_address_expiration", AttributeType::Number)
                .description("Default expiration, in seconds, of MAC addresses added to the filter")
                .optional()
                .computed()
                .build(),
            AttributeBuilder::new("never_expires", AttributeType::Bool)
                .description("Whether MAC addresses in the filter never expire")
                .optional()
                .computed()
                .build(),
            AttributeBuilder::new("enforce_expiration_times", AttributeType::Bool)
                .description("Whether expiration times are enforced")
                .optional()
                .computed()
                .build(),
            AttributeBuilder::new("lease_time", AttributeType::Number)
                .description("Lease time, in seconds, for matching clients")
                .optional()
                .build(),
            options_attribute(),
        ]
    }

    fn expand(config: &ObjectReader<'_>) -> Result<Self, Diagnostic> {
        Ok(Self {
            reference: None,
            name: config.required_string("name")?,
            comment: config.string("comment")?,
            default_mac_address_expiration: config.u32("default_mac_address_expiration")?,
            never_expires: config.bool("never_expires")?,
            enforce_expiration_times: config.bool("enforce_expiration_times")?,
            lease_time: config.u32("lease_time")?,
            options: expand_options(config)?,
            ext_attrs: None,
        })
    }

    fn flatten(&self, out: &mut ObjectWriter) {
        out.set("name", self.name.clone())
            .set("comment", self.comment.clone())
            .set("default_mac_address_expiration", self.default_mac_address_expiration)
            .set("never_expires", self.never_expires)
            .set("enforce_expiration_times", self.enforce_expiration_times)
            .set("lease_time", self.lease_time)
            .set("options", flatten_options(self.options.as_ref()));
    }

    fn validate(config: &ObjectReader<'_>) -> Vec<Diagnostic> {
        let mut diagnostics = validate_options(config);

        if config.bool("never_expires").ok().flatten() == Some(true)
            && config.is_set("default_mac_address_expiration")
        {
            diagnostics.push(
                Diagnostic::error(
                    "Conflicting attributes",
                    "default_mac_address_expiration cannot be set when never_expires is true",
                )
                .with_attribute(config.path("default_mac_address_expiration")),
            );
        }

        diagnostics
    }
}
