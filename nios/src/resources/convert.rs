//! Conversions between Terraform object values and typed fields

use std::collections::HashMap;
use tfplug::types::{AttributePath, Diagnostic, Dynamic, DynamicValue};

/// Typed, path-aware read access to one Terraform object
///
/// Null and unknown attributes read as `None`.
#[derive(Clone)]
pub struct ObjectReader<'a> {
    attrs: Option<&'a HashMap<String, Dynamic>>,
    path: AttributePath,
}

impl<'a> ObjectReader<'a> {
    pub fn new(value: &'a DynamicValue) -> Self {
        Self::nested(&value.value, AttributePath::root())
    }

    fn nested(value: &'a Dynamic, path: AttributePath) -> Self {
        Self {
            attrs: value.as_map(),
            path,
        }
    }

    pub fn path(&self, name: &str) -> AttributePath {
        self.path.clone().attribute(name)
    }

    fn value(&self, name: &str) -> Option<&'a Dynamic> {
        self.attrs?.get(name).filter(|v| !v.is_absent())
    }

    pub fn is_unknown(&self, name: &str) -> bool {
        matches!(self.attrs.and_then(|a| a.get(name)), Some(Dynamic::Unknown))
    }

    pub fn is_set(&self, name: &str) -> bool {
        self.value(name).is_some()
    }

    /// Explicitly null or missing, but not unknown
    pub fn is_null(&self, name: &str) -> bool {
        !self.is_set(name) && !self.is_unknown(name)
    }

    fn mismatch(&self, name: &str, expected: &str, actual: &Dynamic) -> Diagnostic {
        Diagnostic::error(
            "Invalid attribute type",
            format!(
                "Attribute '{}' must be a {}, got {}",
                self.path(name),
                expected,
                actual.type_name()
            ),
        )
        .with_attribute(self.path(name))
    }

    pub fn string(&self, name: &str) -> Result<Option<String>, Diagnostic> {
        match self.value(name) {
            None => Ok(None),
            Some(Dynamic::String(s)) => Ok(Some(s.clone())),
            Some(other) => Err(self.mismatch(name, "string", other)),
        }
    }

    pub fn required_string(&self, name: &str) -> Result<String, Diagnostic> {
        self.string(name)?.ok_or_else(|| self.missing(name))
    }

    pub fn bool(&self, name: &str) -> Result<Option<bool>, Diagnostic> {
        match self.value(name) {
            None => Ok(None),
            Some(Dynamic::Bool(b)) => Ok(Some(*b)),
            Some(other) => Err(self.mismatch(name, "bool", other)),
        }
    }

    pub fn u32(&self, name: &str) -> Result<Option<u32>, Diagnostic> {
        match self.value(name) {
            None => Ok(None),
            Some(Dynamic::Number(n)) => {
                if n.fract() != 0.0 || *n < 0.0 || *n > f64::from(u32::MAX) {
                    Err(Diagnostic::error(
                        "Invalid number",
                        format!(
                            "Attribute '{}' must be a whole number between 0 and {}, got {}",
                            self.path(name),
                            u32::MAX,
                            n
                        ),
                    )
                    .with_attribute(self.path(name)))
                } else {
                    Ok(Some(*n as u32))
                }
            }
            Some(other) => Err(self.mismatch(name, "number", other)),
        }
    }

    pub fn required_u32(&self, name: &str) -> Result<u32, Diagnostic> {
        self.u32(name)?.ok_or_else(|| self.missing(name))
    }

    pub fn string_list(&self, name: &str) -> Result<Option<Vec<String>>, Diagnostic> {
        match self.value(name) {
            None => Ok(None),
            Some(Dynamic::List(items)) => items
                .iter()
                .enumerate()
                .map(|(i, item)| match item {
                    Dynamic::String(s) => Ok(s.clone()),
                    other => Err(Diagnostic::error(
                        "Invalid attribute type",
                        format!(
                            "Element {} of '{}' must be a string, got {}",
                            i,
                            self.path(name),
                            other.type_name()
                        ),
                    )
                    .with_attribute(self.path(name).index(i as i64))),
                })
                .collect::<Result<Vec<_>, _>>()
                .map(Some),
            Some(other) => Err(self.mismatch(name, "list", other)),
        }
    }

    pub fn string_map(&self, name: &str) -> Result<Option<HashMap<String, String>>, Diagnostic> {
        match self.value(name) {
            None => Ok(None),
            Some(Dynamic::Map(entries)) => entries
                .iter()
                .filter(|(_, value)| !value.is_absent())
                .map(|(key, value)| match value {
                    Dynamic::String(s) => Ok((key.clone(), s.clone())),
                    other => Err(Diagnostic::error(
                        "Invalid attribute type",
                        format!(
                            "Value of '{}[\"{}\"]' must be a string, got {}",
                            self.path(name),
                            key,
                            other.type_name()
                        ),
                    )
                    .with_attribute(self.path(name).key(key))),
                })
                .collect::<Result<HashMap<_, _>, _>>()
                .map(Some),
            Some(other) => Err(self.mismatch(name, "map", other)),
        }
    }

    /// Readers for each element of a list of objects
    pub fn objects(&self, name: &str) -> Result<Option<Vec<ObjectReader<'a>>>, Diagnostic> {
        match self.value(name) {
            None => Ok(None),
            Some(Dynamic::List(items)) => Ok(Some(
                items
                    .iter()
                    .enumerate()
                    .map(|(i, item)| ObjectReader::nested(item, self.path(name).index(i as i64)))
                    .collect(),
            )),
            Some(other) => Err(self.mismatch(name, "list", other)),
        }
    }

    fn missing(&self, name: &str) -> Diagnostic {
        Diagnostic::error(
            "Missing required attribute",
            format!("Attribute '{}' is required", self.path(name)),
        )
        .with_attribute(self.path(name))
    }
}

/// Builds one Terraform object value
#[derive(Default)]
pub struct ObjectWriter {
    attrs: HashMap<String, Dynamic>,
}

impl ObjectWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, name: &str, value: impl Into<Dynamic>) -> &mut Self {
        self.attrs.insert(name.to_string(), value.into());
        self
    }

    pub fn finish(self) -> Dynamic {
        Dynamic::Map(self.attrs)
    }
}

pub fn string_list(values: &[String]) -> Dynamic {
    Dynamic::List(values.iter().map(|v| Dynamic::String(v.clone())).collect())
}

pub fn string_map(values: &HashMap<String, String>) -> Dynamic {
    Dynamic::Map(
        values
            .iter()
            .map(|(k, v)| (k.clone(), Dynamic::String(v.clone())))
            .collect(),
    )
}

/// Error diagnostic for a value outside an enumeration
pub fn check_one_of(
    reader: &ObjectReader<'_>,
    name: &str,
    allowed: &[&str],
) -> Option<Diagnostic> {
    let value = reader.string(name).ok()??;
    if allowed.contains(&value.as_str()) {
        return None;
    }
    Some(
        Diagnostic::error(
            "Invalid attribute value",
            format!(
                "Attribute '{}' must be one of {}, got \"{}\"",
                reader.path(name),
                allowed.join(", "),
                value
            ),
        )
        .with_attribute(reader.path(name)),
    )
}

/// Error diagnostic when `name` is unset while `reason` requires it
pub fn check_required_when(
    reader: &ObjectReader<'_>,
    name: &str,
    reason: &str,
) -> Option<Diagnostic> {
    if reader.is_set(name) || reader.is_unknown(name) {
        return None;
    }
    Some(
        Diagnostic::error(
            "Missing required attribute",
            format!("Attribute '{}' is required when {}", reader.path(name), reason),
        )
        .with_attribute(reader.path(name)),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(pairs: Vec<(&str, Dynamic)>) -> DynamicValue {
        DynamicValue::new(Dynamic::Map(
            pairs
                .into_iter()
                .map(|(k, v)| (k.to_string(), v))
                .collect(),
        ))
    }

    #[test]
    fn reads_typed_values_and_treats_unknown_as_unset() {
        let value = config(vec![
            ("name", Dynamic::from("office")),
            ("lease_time", Dynamic::Number(3600.0)),
            ("disable", Dynamic::Bool(true)),
            ("comment", Dynamic::Unknown),
            ("mac", Dynamic::Null),
        ]);
        let reader = ObjectReader::new(&value);

        assert_eq!(reader.required_string("name").unwrap(), "office");
        assert_eq!(reader.u32("lease_time").unwrap(), Some(3600));
        assert_eq!(reader.bool("disable").unwrap(), Some(true));
        assert_eq!(reader.string("comment").unwrap(), None);
        assert!(reader.is_unknown("comment"));
        assert!(!reader.is_null("comment"));
        assert!(reader.is_null("mac"));
        assert!(reader.is_null("missing"));
        assert!(!reader.is_null("name"));
        assert_eq!(reader.string("mac").unwrap(), None);
        assert_eq!(reader.string("missing").unwrap(), None);
    }

    #[test]
    fn type_mismatch_reports_attribute_path() {
        let value = config(vec![("name", Dynamic::Bool(true))]);
        let reader = ObjectReader::new(&value);

        let diag = reader.string("name").unwrap_err();

        assert_eq!(diag.attribute, Some(AttributePath::new("name")));
        assert!(diag.detail.contains("must be a string, got bool"));
    }

    #[test]
    fn fractional_and_negative_numbers_rejected() {
        let value = config(vec![
            ("a", Dynamic::Number(1.5)),
            ("b", Dynamic::Number(-1.0)),
        ]);
        let reader = ObjectReader::new(&value);

        assert!(reader.u32("a").is_err());
        assert!(reader.u32("b").is_err());
    }

    #[test]
    fn nested_object_paths_include_index() {
        let value = config(vec![(
            "options",
            Dynamic::List(vec![Dynamic::Map(HashMap::from([(
                "num".to_string(),
                Dynamic::from("three"),
            )]))]),
        )]);
        let reader = ObjectReader::new(&value);

        let options = reader.objects("options").unwrap().unwrap();
        let diag = options[0].u32("num").unwrap_err();

        assert_eq!(diag.attribute.unwrap().to_string(), "options[0].num");
    }

    #[test]
    fn string_map_and_list_round_trip_through_writer() {
        let mut writer = ObjectWriter::new();
        writer
            .set("fingerprint", string_list(&["Windows".to_string()]))
            .set(
                "extattrs",
                string_map(&HashMap::from([("Site".to_string(), "DC1".to_string())])),
            );
        let value = DynamicValue::new(writer.finish());
        let reader = ObjectReader::new(&value);

        assert_eq!(
            reader.string_list("fingerprint").unwrap(),
            Some(vec!["Windows".to_string()])
        );
        assert_eq!(
            reader.string_map("extattrs").unwrap().unwrap()["Site"],
            "DC1"
        );
    }

    #[test]
    fn enumeration_check() {
        let value = config(vec![("match_client", Dynamic::from("MAC"))]);
        let reader = ObjectReader::new(&value);

        assert!(check_one_of(&reader, "match_client", &["MAC_ADDRESS"]).is_some());
        assert!(check_one_of(&reader, "match_client", &["MAC"]).is_none());
        assert!(check_one_of(&reader, "unset", &["MAC"]).is_none());
    }
}
