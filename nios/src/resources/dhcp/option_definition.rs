//! `nios_dhcp_optiondefinition`

use crate::api::dhcp::OptionDefinition;
use crate::resources::convert::{check_one_of, ObjectReader, ObjectWriter};
use crate::resources::NiosModel;
use tfplug::schema::{Attribute, AttributeBuilder, AttributeType};
use tfplug::types::Diagnostic;

const OPTION_TYPES: &[&str] = &[
    "16-bit signed integer",
    "16-bit unsigned integer",
    "32-bit signed integer",
    "32-bit unsigned integer",
    "64-bit unsigned integer",
    "8-bit signed integer",
    "8-bit unsigned integer",
    "8-bit unsigned integer (1,2,4,8)",
    "array of 16-bit integer",
    "array of 16-bit unsigned integer",
    "array of 32-bit integer",
    "array of 32-bit unsigned integer",
    "array of 64-bit unsigned integer",
    "array of 8-bit integer",
    "array of 8-bit unsigned integer",
    "array of ip-address",
    "array of ip-address pair",
    "array of string",
    "binary",
    "boolean",
    "boolean array of ip-address",
    "boolean-text",
    "domain-list",
    "domain-name",
    "encapsulated",
    "ip-address",
    "string",
    "text",
];

impl NiosModel for OptionDefinition {
    const TYPE_NAME: &'static str = "nios_dhcp_optiondefinition";
    const DESCRIPTION: &'static str = "Manages a DHCP option definition";

    fn attributes() -> Vec<Attribute> {
        vec![
            AttributeBuilder::new("name", AttributeType::String)
                .description("The name of the option")
                .required()
                .build(),
            AttributeBuilder::new("code", AttributeType::Number)
                .description("The option code, between 1 and 254")
                .required()
                .build(),
            AttributeBuilder::new("type", AttributeType::String)
                .description("The data type of the option value")
                .required()
                .build(),
            AttributeBuilder::new("space", AttributeType::String)
                .description("The option space the definition belongs to")
                .optional()
                .computed()
                .build(),
        ]
    }

    fn expand(config: &ObjectReader<'_>) -> Result<Self, Diagnostic> {
        Ok(Self {
            reference: None,
            name: config.required_string("name")?,
            code: config.required_u32("code")?,
            r#type: config.required_string("type")?,
            space: config.string("space")?,
        })
    }

    fn flatten(&self, out: &mut ObjectWriter) {
        out.set("name", self.name.clone())
            .set("code", self.code)
            .set("type", self.r#type.clone())
            .set("space", self.space.clone());
    }

    fn validate(config: &ObjectReader<'_>) -> Vec<Diagnostic> {
        let mut diagnostics = Vec::new();

        match config.u32("code") {
            Ok(Some(code)) if !(1..=254).contains(&code) => diagnostics.push(
                Diagnostic::error(
                    "Invalid option code",
                    format!("code must be between 1 and 254, got {}", code),
                )
                .with_attribute(config.path("code")),
            ),
            Ok(_) => {}
            Err(diag) => diagnostics.push(diag),
        }
        diagnostics.extend(check_one_of(config, "type", OPTION_TYPES));

        diagnostics
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::dhcp::test_support::{round_trip, validate};
    use tfplug::types::Dynamic;

    #[test]
    fn round_trip_preserves_writable_fields() {
        let definition = OptionDefinition {
            name: "boot-server".to_string(),
            code: 150,
            r#type: "ip-address".to_string(),
            space: Some("vendor-pxe".to_string()),
            ..Default::default()
        };

        assert_eq!(round_trip(&definition), definition);
    }

    #[test]
    fn code_range_enforced() {
        for (code, expected) in [(0.0, 1), (1.0, 0), (254.0, 0), (255.0, 1)] {
            let diags = validate::<OptionDefinition>(vec![
                ("name", Dynamic::from("boot-server")),
                ("code", Dynamic::Number(code)),
                ("type", Dynamic::from("string")),
            ]);
            assert_eq!(diags.len(), expected, "code {}", code);
        }
    }

    #[test]
    fn type_must_be_known() {
        let diags = validate::<OptionDefinition>(vec![
            ("name", Dynamic::from("boot-server")),
            ("code", Dynamic::Number(150.0)),
            ("type", Dynamic::from("float")),
        ]);

        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].attribute.as_ref().unwrap().to_string(), "type");
    }
}
