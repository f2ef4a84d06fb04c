//! `nios_dhcp_filterrelayagent`

use crate::api::dhcp::FilterRelayAgent;
use crate::resources::convert::{check_one_of, check_required_when, ObjectReader, ObjectWriter};
use crate::resources::NiosModel;
use tfplug::schema::{Attribute, AttributeBuilder, AttributeType};
use tfplug::types::Diagnostic;

const MATCH_MODES: &[&str] = &["ANY", "MATCHES_VALUE", "NOT_SET"];

fn optional(name: &str, kind: AttributeType, description: &str) -> Attribute {
    AttributeBuilder::new(name, kind)
        .description(description)
        .optional()
        .build()
}

impl NiosModel for FilterRelayAgent {
    const TYPE_NAME: &'static str = "nios_dhcp_filterrelayagent";
    const DESCRIPTION: &'static str = "Manages a DHCP relay agent filter";

    fn attributes() -> Vec<Attribute> {
        vec![
            AttributeBuilder::new("name", AttributeType::String)
                .description("The name of the relay agent filter")
                .required()
                .build(),
            optional("comment", AttributeType::String, "Comment for the filter"),
            AttributeBuilder::new("is_circuit_id", AttributeType::String)
                .description("Circuit ID match mode: ANY, MATCHES_VALUE or NOT_SET")
                .optional()
                .computed()
                .build(),
            optional("circuit_id_name", AttributeType::String, "Circuit ID to match"),
            optional(
                "is_circuit_id_substring",
                AttributeType::Bool,
                "Whether only a substring of the circuit ID is matched",
            ),
            optional(
                "circuit_id_substring_offset",
                AttributeType::Number,
                "Offset of the matched circuit ID substring",
            ),
            optional(
                "circuit_id_substring_length",
                AttributeType::Number,
                "Length of the matched circuit ID substring",
            ),
            AttributeBuilder::new("is_remote_id", AttributeType::String)
                .description("Remote ID match mode: ANY, MATCHES_VALUE or NOT_SET")
                .optional()
                .computed()
                .build(),
            optional("remote_id_name", AttributeType::String, "Remote ID to match"),
            optional(
                "is_remote_id_substring",
                AttributeType::Bool,
                "Whether only a substring of the remote ID is matched",
            ),
            optional(
                "remote_id_substring_offset",
                AttributeType::Number,
                "Offset of the matched remote ID substring",
            ),
            optional(
                "remote_id_substring_length",
                AttributeType::Number,
                "Length of the matched remote ID substring",
            ),
        ]
    }

    fn expand(config: &ObjectReader<'_>) -> Result<Self, Diagnostic> {
        Ok(Self {
            reference: None,
            name: config.required_string("name")?,
            comment: config.string("comment")?,
            is_circuit_id: config.string("is_circuit_id")?,
            circuit_id_name: config.string("circuit_id_name")?,
            is_circuit_id_substring: config.bool("is_circuit_id_substring")?,
            circuit_id_substring_offset: config.u32("circuit_id_substring_offset")?,
            circuit_id_substring_length: config.u32("circuit_id_substring_length")?,
            is_remote_id: config.string("is_remote_id")?,
            remote_id_name: config.string("remote_id_name")?,
            is_remote_id_substring: config.bool("is_remote_id_substring")?,
            remote_id_substring_offset: config.u32("remote_id_substring_offset")?,
            remote_id_substring_length: config.u32("remote_id_substring_length")?,
            ext_attrs: None,
        })
    }

    fn flatten(&self, out: &mut ObjectWriter) {
        out.set("name", self.name.clone())
            .set("comment", self.comment.clone())
            .set("is_circuit_id", self.is_circuit_id.clone())
            .set("circuit_id_name", self.circuit_id_name.clone())
            .set("is_circuit_id_substring", self.is_circuit_id_substring)
            .set("circuit_id_substring_offset", self.circuit_id_substring_offset)
            .set("circuit_id_substring_length", self.circuit_id_substring_length)
            .set("is_remote_id", self.is_remote_id.clone())
            .set("remote_id_name", self.remote_id_name.clone())
            .set("is_remote_id_substring", self.is_remote_id_substring)
            .set("remote_id_substring_offset", self.remote_id_substring_offset)
            .set("remote_id_substring_length", self.remote_id_substring_length);
    }

    fn validate(config: &ObjectReader<'_>) -> Vec<Diagnostic> {
        let mut diagnostics = Vec::new();

        for (mode, name) in [
            ("is_circuit_id", "circuit_id_name"),
            ("is_remote_id", "remote_id_name"),
        ] {
            diagnostics.extend(check_one_of(config, mode, MATCH_MODES));
            if config.string(mode).ok().flatten().as_deref() == Some("MATCHES_VALUE") {
                diagnostics.extend(check_required_when(
                    config,
                    name,
                    &format!("{} is MATCHES_VALUE", mode),
                ));
            }
        }

        diagnostics
    }
}
