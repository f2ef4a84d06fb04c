//! `nios_dhcp_filternac`

use super::common::{expand_options, flatten_options, options_attribute, validate_options};
use crate::api::dhcp::FilterNac;
use crate::resources::convert::{ObjectReader, ObjectWriter};
use crate::resources::NiosModel;
use tfplug::schema::{Attribute, AttributeBuilder, AttributeType};
use tfplug::types::Diagnostic;

impl NiosModel for FilterNac {
    const TYPE_NAME: &'static str = "nios_dhcp_filternac";
    const DESCRIPTION: &'static str = "Manages a DHCP NAC filter";

    fn attributes() -> Vec<Attribute> {
        vec![
            AttributeBuilder::new("name", AttributeType::String)
                .description("The name of the NAC filter")
                .required()
                .build(),
            AttributeBuilder::new("comment", AttributeType::String)
                .description("Comment for the NAC filter")
                .optional()
                .build(),
            AttributeBuilder::new("expression", AttributeType::String)
                .description("The match expression of the filter")
                .optional()
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
            expression: config.string("expression")?,
            lease_time: config.u32("lease_time")?,
            options: expand_options(config)?,
            ext_attrs: None,
        })
    }

    fn flatten(&self, out: &mut ObjectWriter) {
        out.set("name", self.name.clone())
            .set("comment", self.comment.clone())
            .set("expression", self.expression.clone())
            .set("lease_time", self.lease_time)
            .set("options", flatten_options(self.options.as_ref()));
    }

    fn validate(config: &ObjectReader<'_>) -> Vec<Diagnostic> {
        validate_options(config)
    }
}
