//! `nios_dhcp_filterfingerprint`

use crate::api::dhcp::FilterFingerprint;
use crate::resources::convert::{string_list, ObjectReader, ObjectWriter};
use crate::resources::NiosModel;
use tfplug::schema::{Attribute, AttributeBuilder, AttributeType};
use tfplug::types::Diagnostic;

impl NiosModel for FilterFingerprint {
    const TYPE_NAME: &'static str = "nios_dhcp_filterfingerprint";
    const DESCRIPTION: &'static str = "Manages a DHCP fingerprint filter";

    fn attributes() -> Vec<Attribute> {
        vec![
            AttributeBuilder::new("name", AttributeType::String)
                .description("The name of the fingerprint filter")
                .required()
                .build(),
            AttributeBuilder::new("fingerprint", AttributeType::list_of(AttributeType::String))
                .description("Names of the DHCP fingerprints the filter matches")
                .required()
                .build(),
            AttributeBuilder::new("comment", AttributeType::String)
                .description("Comment for the fingerprint filter")
                .optional()
                .build(),
        ]
    }

    fn expand(config: &ObjectReader<'_>) -> Result<Self, Diagnostic> {
        Ok(Self {
            reference: None,
            name: config.required_string("name")?,
            fingerprint: config.string_list("fingerprint")?.unwrap_or_default(),
            comment: config.string("comment")?,
            ext_attrs: None,
        })
    }

    fn flatten(&self, out: &mut ObjectWriter) {
        out.set("name", self.name.clone())
            .set("fingerprint", string_list(&self.fingerprint))
            .set("comment", self.comment.clone());
    }

    fn validate(config: &ObjectReader<'_>) -> Vec<Diagnostic> {
        match config.string_list("fingerprint") {
            Ok(Some(fingerprints)) if fingerprints.is_empty() => vec![Diagnostic::error(
                "Invalid attribute value",
                "A fingerprint filter must match at least one fingerprint",
            )
            .with_attribute(config.path("fingerprint"))],
            Ok(_) => vec![],
            Err(diag) => vec![diag],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::dhcp::test_support::{round_trip, validate};
    use tfplug::types::Dynamic;

    #[test]
    fn round_trip_preserves_writable_fields() {
        let filter = FilterFingerprint {
            name: "printers".to_string(),
            fingerprint: vec!["HP Printer".to_string(), "Brother Printer".to_string()],
            comment: Some("office printers".to_string()),
            ..Default::default()
        };

        assert_eq!(round_trip(&filter), filter);
    }

    #[test]
    fn empty_fingerprint_list_rejected() {
        let diags = validate::<FilterFingerprint>(vec![
            ("name", Dynamic::from("printers")),
            ("fingerprint", Dynamic::List(vec![])),
        ]);
        assert_eq!(diags.len(), 1);

        let diags = validate::<FilterFingerprint>(vec![
            ("name", Dynamic::from("printers")),
            ("fingerprint", Dynamic::List(vec![Dynamic::Number(1.0)])),
        ]);
        assert_eq!(diags.len(), 1);
        assert_eq!(
            diags[0].attribute.as_ref().unwrap().to_string(),
            "fingerprint[0]"
        );
    }
}
