//! Extensible attribute reconciliation
//!
//! Terraform state keeps two views of an object's extensible attributes:
//! `extattrs`, the subset the user declared, and `extattrs_all`, everything
//! the server reports (declared, inherited from parent objects, and the
//! internal correlation ID). The functions here move values between the two
//! views and the wire representation.

use crate::api::common::{ExtAttr, ExtAttrs};
use serde_json::Value;
use std::collections::HashMap;
use thiserror::Error;

/// Reserved extensible attribute tagging every object this provider creates
pub const INTERNAL_ID_EXT_ATTR: &str = "Terraform Internal ID";

/// Extensible attributes as Terraform sees them: name to string value
pub type ExtAttrMap = HashMap<String, String>;

#[derive(Debug, Error, PartialEq)]
pub enum ExtAttrError {
    #[error("extensible attribute '{name}' has a {kind} value, which cannot be represented as a string")]
    UnsupportedValue { name: String, kind: &'static str },
}

/// Returns `declared` with the internal ID added when it is not already set
pub fn add_internal_id_to_ext_attrs(declared: Option<ExtAttrMap>) -> ExtAttrMap {
    let mut ext_attrs = declared.unwrap_or_default();
    ext_attrs
        .entry(INTERNAL_ID_EXT_ATTR.to_string())
        .or_insert_with(|| uuid::Uuid::new_v4().to_string());
    ext_attrs
}

/// Merges every attribute of `all` that the user did not declare into
/// `declared`; declared values win
pub fn add_inherited_ext_attrs(
    declared: Option<ExtAttrMap>,
    all: Option<&ExtAttrMap>,
) -> Option<ExtAttrMap> {
    let Some(all) = all else {
        return declared;
    };

    let mut merged = declared.unwrap_or_default();
    for (name, value) in all {
        merged
            .entry(name.clone())
            .or_insert_with(|| value.clone());
    }
    Some(merged)
}

/// Splits a server-returned attribute map into the declared view and the
/// full view
///
/// The declared view keeps only keys present in `declared`, with the
/// server's values. It is `None` when nothing was declared.
pub fn remove_inherited_ext_attrs(
    declared: Option<&ExtAttrMap>,
    returned: &ExtAttrs,
) -> Result<(Option<ExtAttrMap>, ExtAttrMap), ExtAttrError> {
    let all = from_wire(returned)?;

    let filtered = declared.map(|declared| {
        all.iter()
            .filter(|(name, _)| declared.contains_key(*name))
            .map(|(name, value)| (name.clone(), value.clone()))
            .collect()
    });

    Ok((filtered, all))
}

/// Attributes set directly on the object, i.e. neither inherited nor the
/// internal ID
pub fn local_ext_attrs(returned: &ExtAttrs) -> Result<ExtAttrMap, ExtAttrError> {
    returned
        .iter()
        .filter(|(name, attr)| !attr.is_inherited() && name.as_str() != INTERNAL_ID_EXT_ATTR)
        .map(|(name, attr)| Ok((name.clone(), render_value(name, &attr.value)?)))
        .collect()
}

/// The internal ID carried by a server object, if any
pub fn internal_id(returned: Option<&ExtAttrs>) -> Option<String> {
    returned?
        .get(INTERNAL_ID_EXT_ATTR)
        .and_then(|attr| attr.value.as_str())
        .map(str::to_string)
}

pub fn to_wire(ext_attrs: &ExtAttrMap) -> ExtAttrs {
    ext_attrs
        .iter()
        .map(|(name, value)| (name.clone(), ExtAttr::new(value.as_str())))
        .collect()
}

pub fn from_wire(returned: &ExtAttrs) -> Result<ExtAttrMap, ExtAttrError> {
    returned
        .iter()
        .map(|(name, attr)| Ok((name.clone(), render_value(name, &attr.value)?)))
        .collect()
}

/// Renders a wire value as Terraform string; numbers and booleans use their
/// JSON text
pub fn render_value(name: &str, value: &Value) -> Result<String, ExtAttrError> {
    let kind = match value {
        Value::String(s) => return Ok(s.clone()),
        Value::Number(n) => return Ok(n.to_string()),
        Value::Bool(b) => return Ok(b.to_string()),
        Value::Null => "null",
        Value::Array(_) => "list",
        Value::Object(_) => "object",
    };
    Err(ExtAttrError::UnsupportedValue {
        name: name.to_string(),
        kind,
    })
}
