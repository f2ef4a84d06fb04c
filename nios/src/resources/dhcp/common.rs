//! Attributes shared by several DHCP object types

use crate::api::dhcp::{DhcpMember, DhcpOption};
use crate::resources::cleared_value_by_type;
use crate::resources::convert::{ObjectReader, ObjectWriter};
use regex::Regex;
use std::sync::OnceLock;
use tfplug::schema::{Attribute, AttributeBuilder, AttributeType};
use tfplug::types::{Diagnostic, Dynamic};

fn option_fields() -> Vec<Attribute> {
    vec![
        AttributeBuilder::new("name", AttributeType::String)
            .description("The name of the DHCP option")
            .optional()
            .computed()
            .build(),
        AttributeBuilder::new("num", AttributeType::Number)
            .description("The code of the DHCP option")
            .optional()
            .computed()
            .build(),
        AttributeBuilder::new("value", AttributeType::String)
            .description("The value of the DHCP option")
            .optional()
            .computed()
            .build(),
        AttributeBuilder::new("vendor_class", AttributeType::String)
            .description("The option space the option belongs to")
            .optional()
            .computed()
            .build(),
        AttributeBuilder::new("use_option", AttributeType::Bool)
            .description("Only applies to special options that are displayed separately from other options")
            .optional()
            .computed()
            .build(),
    ]
}

pub fn options_attribute() -> Attribute {
    AttributeBuilder::new(
        "options",
        AttributeType::list_of(AttributeType::object_of(&option_fields())),
    )
    .description("An array of DHCP option structs")
    .optional()
    .computed()
    .build()
}

pub fn expand_options(config: &ObjectReader<'_>) -> Result<Option<Vec<DhcpOption>>, Diagnostic> {
    let Some(items) = config.objects("options")? else {
        return Ok(None);
    };

    items
        .iter()
        .map(|item| {
            Ok(DhcpOption {
                name: item.string("name")?,
                num: item.u32("num")?,
                value: item.string("value")?,
                vendor_class: item.string("vendor_class")?,
                use_option: item.bool("use_option")?,
            })
        })
        .collect::<Result<Vec<_>, Diagnostic>>()
        .map(Some)
}

pub fn flatten_options(options: Option<&Vec<DhcpOption>>) -> Dynamic {
    let Some(options) = options else {
        return Dynamic::Null;
    };

    Dynamic::List(
        options
            .iter()
            .map(|option| {
                let mut out = ObjectWriter::new();
                out.set("name", option.name.clone())
                    .set("num", option.num)
                    .set("value", option.value.clone())
                    .set("vendor_class", option.vendor_class.clone())
                    .set("use_option", option.use_option);
                out.finish()
            })
            .collect(),
    )
}

/// An option must be identified by its name or its code
pub fn validate_options(config: &ObjectReader<'_>) -> Vec<Diagnostic> {
    let Ok(Some(items)) = config.objects("options") else {
        return Vec::new();
    };

    items
        .iter()
        .enumerate()
        .filter(|(_, item)| {
            !item.is_set("name")
                && !item.is_set("num")
                && !item.is_unknown("name")
                && !item.is_unknown("num")
        })
        .map(|(i, _)| {
            Diagnostic::error(
                "Invalid DHCP option",
                format!("Option {} must set either 'name' or 'num'", i),
            )
            .with_attribute(config.path("options").index(i as i64))
        })
        .collect()
}

pub fn member_attribute() -> Attribute {
    AttributeBuilder::new("member", AttributeType::String)
        .description("The name of the grid member serving the range")
        .optional()
        .build()
}

pub fn expand_member(config: &ObjectReader<'_>) -> Result<Option<DhcpMember>, Diagnostic> {
    Ok(config.string("member")?.map(DhcpMember::named))
}

pub fn flatten_member(member: Option<&DhcpMember>) -> Option<String> {
    member.and_then(|m| m.name.clone())
}

/// `member` is a struct on the wire and resets to null
pub fn member_cleared_value(attribute: &Attribute) -> serde_json::Value {
    if attribute.name == "member" {
        serde_json::Value::Null
    } else {
        cleared_value_by_type(attribute)
    }
}

pub const SERVER_ASSOCIATION_TYPES: &[&str] = &["NONE", "MEMBER"];

fn mac_regex() -> Option<&'static Regex> {
    static MAC: OnceLock<Option<Regex>> = OnceLock::new();
    MAC.get_or_init(|| Regex::new(r"^([0-9A-Fa-f]{2}[:-]){5}[0-9A-Fa-f]{2}$").ok())
        .as_ref()
}

pub fn is_valid_mac(mac: &str) -> bool {
    mac_regex().is_some_and(|re| re.is_match(mac))
}
