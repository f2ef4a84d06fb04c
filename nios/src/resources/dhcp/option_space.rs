//! `nios_dhcp_optionspace`

use crate::api::dhcp::OptionSpace;
use crate::resources::convert::{string_list, ObjectReader, ObjectWriter};
use crate::resources::NiosModel;
use tfplug::schema::{Attribute, AttributeBuilder, AttributeType};
use tfplug::types::Diagnostic;

impl NiosModel for OptionSpace {
    const TYPE_NAME: &'static str = "nios_dhcp_optionspace";
    const DESCRIPTION: &'static str = "Manages a DHCP option space";

    fn attributes() -> Vec<Attribute> {
        vec![
            AttributeBuilder::new("name", AttributeType::String)
                .description("The name of the option space")
                .required()
                .build(),
            AttributeBuilder::new("comment", AttributeType::String)
                .description("Comment for the option space")
                .optional()
                .build(),
            AttributeBuilder::new(
                "option_definitions",
                AttributeType::list_of(AttributeType::String),
            )
            .description("Names of the option definitions in the space")
            .computed()
            .build(),
        ]
    }

    fn expand(config: &ObjectReader<'_>) -> Result<Self, Diagnostic> {
        Ok(Self {
            reference: None,
            name: config.required_string("name")?,
            comment: config.string("comment")?,
            option_definitions: config.string_list("option_definitions")?.unwrap_or_default(),
        })
    }

    fn flatten(&self, out: &mut ObjectWriter) {
        out.set("name", self.name.clone())
            .set("comment", self.comment.clone())
            .set("option_definitions", string_list(&self.option_definitions));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::dhcp::test_support::round_trip;

    #[test]
    fn round_trip_preserves_fields() {
        let space = OptionSpace {
            name: "vendor-pxe".to_string(),
            comment: Some("PXE vendor options".to_string()),
            option_definitions: vec!["boot-server".to_string()],
            ..Default::default()
        };

        assert_eq!(round_trip(&space), space);
    }

    #[test]
    fn option_definitions_not_sent() {
        let space = OptionSpace {
            name: "vendor-pxe".to_string(),
            option_definitions: vec!["boot-server".to_string()],
            ..Default::default()
        };

        let body = serde_json::to_value(&space).unwrap();

        assert_eq!(body, serde_json::json!({"name": "vendor-pxe"}));
    }
}
