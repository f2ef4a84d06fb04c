//! `nios_dhcp_shared_network`

use super::common::{expand_options, flatten_options, options_attribute, validate_options};
use crate::api::dhcp::shared_network::NetworkRef;
use crate::api::dhcp::SharedNetwork;
use crate::resources::convert::{string_list, ObjectReader, ObjectWriter};
use crate::resources::NiosModel;
use tfplug::schema::{Attribute, AttributeBuilder, AttributeType};
use tfplug::types::Diagnostic;

impl NiosModel for SharedNetwork {
    const TYPE_NAME: &'static str = "nios_dhcp_shared_network";
    const DESCRIPTION: &'static str = "Manages an IPv4 DHCP shared network";

    fn attributes() -> Vec<Attribute> {
        vec![
            AttributeBuilder::new("name", AttributeType::String)
                .description("The name of the shared network")
                .required()
                .build(),
            AttributeBuilder::new("networks", AttributeType::list_of(AttributeType::String))
                .description("References of the networks belonging to the shared network")
                .required()
                .build(),
            AttributeBuilder::new("comment", AttributeType::String)
                .description("Comment for the shared network")
                .optional()
                .build(),
            AttributeBuilder::new("network_view", AttributeType::String)
                .description("The network view the shared network belongs to")
                .optional()
                .computed()
                .build(),
            AttributeBuilder::new("disable", AttributeType::Bool)
                .description("Whether the shared network is disabled")
                .optional()
                .computed()
                .build(),
            options_attribute(),
        ]
    }

    fn expand(config: &ObjectReader<'_>) -> Result<Self, Diagnostic> {
        let networks = config
            .string_list("networks")?
            .unwrap_or_default()
            .into_iter()
            .map(|reference| NetworkRef { reference })
            .collect();

        Ok(Self {
            reference: None,
            name: config.required_string("name")?,
            networks,
            comment: config.string("comment")?,
            network_view: config.string("network_view")?,
            disable: config.bool("disable")?,
            options: expand_options(config)?,
            ext_attrs: None,
        })
    }

    fn flatten(&self, out: &mut ObjectWriter) {
        let networks: Vec<String> = self.networks.iter().map(|n| n.reference.clone()).collect();
        out.set("name", self.name.clone())
            .set("networks", string_list(&networks))
            .set("comment", self.comment.clone())
            .set("network_view", self.network_view.clone())
            .set("disable", self.disable)
            .set("options", flatten_options(self.options.as_ref()));
    }

    fn validate(config: &ObjectReader<'_>) -> Vec<Diagnostic> {
        let mut diagnostics = validate_options(config);

        if let Ok(Some(networks)) = config.string_list("networks") {
            if networks.is_empty() {
                diagnostics.push(
                    Diagnostic::error(
                        "Invalid attribute value",
                        "A shared network must contain at least one network",
                    )
                    .with_attribute(config.path("networks")),
                );
            }
        }

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
        let shared = SharedNetwork {
            name: "campus".to_string(),
            networks: vec![
                NetworkRef {
                    reference: "network/ZG5z:10.0.0.0/24/default".to_string(),
                },
                NetworkRef {
                    reference: "network/ZG5z:10.0.1.0/24/default".to_string(),
                },
            ],
            comment: Some("building A".to_string()),
            disable: Some(true),
            ..Default::default()
        };

        assert_eq!(round_trip(&shared), shared);
    }

    #[test]
    fn empty_network_list_rejected() {
        let diags = validate::<SharedNetwork>(vec![
            ("name", Dynamic::from("campus")),
            ("networks", Dynamic::List(vec![])),
        ]);

        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].attribute.as_ref().unwrap().to_string(), "networks");
    }
}
