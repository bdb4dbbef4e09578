//! Declarative tag schemas.
//!
//! Every tag kind is described by a [`TagSchema`] loaded from the bundled
//! `tag-info.json`. Schemas drive the generic tag and container matchers;
//! there is one parametric matcher per class, not one type per kind.

use std::collections::{BTreeMap, BTreeSet};

use serde::Deserialize;

use crate::args::TagArgs;
use crate::error::Error;

/// Which matcher a tag kind is handled by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TagClass {
    /// Self-contained single-line tag: `{kind key="value"}`.
    Tag,
    /// Balanced open/close pair spanning blocks: `{kind}` … `{kind end}`.
    Container,
    /// Inline span using link syntax: `[text](glossary:term)`.
    Inline,
    /// The numbered-heading override for `#`-style headings.
    Heading,
}

/// Declared parameters and template for one tag kind.
#[derive(Debug, Clone, Deserialize)]
pub struct TagSchema {
    /// Matcher class for this kind.
    pub class: TagClass,
    /// Template name rendered for a match. `None` discards the match
    /// (used by `comment`).
    #[serde(default)]
    pub template: Option<String>,
    /// Parameters that must be present.
    #[serde(default)]
    pub required: BTreeSet<String>,
    /// Optional parameters mapped to their governing parameters: a
    /// dependent parameter is only allowed when every governor is present.
    #[serde(default)]
    pub optional: BTreeMap<String, BTreeSet<String>>,
    /// Closed value sets for enum-like parameters.
    #[serde(default)]
    pub values: BTreeMap<String, BTreeSet<String>>,
}

impl TagSchema {
    /// Validate parsed arguments against this schema for tag kind `tag`.
    ///
    /// Checks, in order: every required parameter is present, every
    /// dependent parameter has its governors, and every enum-constrained
    /// value is within its declared set.
    pub fn validate(&self, tag: &str, args: &TagArgs) -> Result<(), Error> {
        for required in &self.required {
            if !args.contains(required) {
                return Err(Error::MissingArgument {
                    tag: tag.to_owned(),
                    argument: required.clone(),
                });
            }
        }

        for (param, governors) in &self.optional {
            if !args.contains(param) {
                continue;
            }
            for governor in governors {
                if !args.contains(governor) {
                    return Err(Error::InvalidArgument {
                        tag: tag.to_owned(),
                        argument: param.clone(),
                        reason: format!("requires '{governor}' to also be given"),
                    });
                }
            }
        }

        for (param, allowed) in &self.values {
            if let Some(value) = args.get(param) {
                if !allowed.contains(value) {
                    return Err(Error::InvalidArgument {
                        tag: tag.to_owned(),
                        argument: param.clone(),
                        reason: format!(
                            "value '{value}' is not one of {}",
                            allowed
                                .iter()
                                .map(String::as_str)
                                .collect::<Vec<_>>()
                                .join(", ")
                        ),
                    });
                }
            }
        }

        Ok(())
    }
}

/// Load the full kind → schema table from a JSON document.
pub fn load_schemas(json: &str) -> Result<BTreeMap<String, TagSchema>, Error> {
    Ok(serde_json::from_str(json)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn image_schema() -> TagSchema {
        serde_json::from_str(
            r#"{
                "class": "tag",
                "template": "image",
                "required": ["file-path"],
                "optional": {
                    "caption": [],
                    "caption-link": ["caption"],
                    "alignment": []
                },
                "values": { "alignment": ["left", "right", "center"] }
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn required_present_passes() {
        let schema = image_schema();
        let args = TagArgs::parse(r#"file-path="a.png""#);
        assert!(schema.validate("image", &args).is_ok());
    }

    #[test]
    fn missing_required_names_first_missing_key() {
        let schema = image_schema();
        let args = TagArgs::parse(r#"caption="hi""#);
        let err = schema.validate("image", &args).unwrap_err();
        match err {
            Error::MissingArgument { tag, argument } => {
                assert_eq!(tag, "image");
                assert_eq!(argument, "file-path");
            }
            other => panic!("expected MissingArgument, got {other:?}"),
        }
    }

    #[test]
    fn dependent_without_governor_fails() {
        let schema = image_schema();
        let args = TagArgs::parse(r#"file-path="a.png" caption-link="https://x""#);
        let err = schema.validate("image", &args).unwrap_err();
        match err {
            Error::InvalidArgument { argument, .. } => assert_eq!(argument, "caption-link"),
            other => panic!("expected InvalidArgument, got {other:?}"),
        }
    }

    #[test]
    fn dependent_with_governor_passes() {
        let schema = image_schema();
        let args =
            TagArgs::parse(r#"file-path="a.png" caption="Cats" caption-link="https://x""#);
        assert!(schema.validate("image", &args).is_ok());
    }

    #[test]
    fn enum_value_outside_set_fails() {
        let schema = image_schema();
        let args = TagArgs::parse(r#"file-path="a.png" alignment="justified""#);
        let err = schema.validate("image", &args).unwrap_err();
        match err {
            Error::InvalidArgument { argument, reason, .. } => {
                assert_eq!(argument, "alignment");
                assert!(reason.contains("justified"));
            }
            other => panic!("expected InvalidArgument, got {other:?}"),
        }
    }

    #[test]
    fn enum_value_inside_set_passes() {
        let schema = image_schema();
        let args = TagArgs::parse(r#"file-path="a.png" alignment="left""#);
        assert!(schema.validate("image", &args).is_ok());
    }

    #[test]
    fn bundled_schema_file_parses() {
        let schemas = load_schemas(tagdown_templates::TAG_INFO).unwrap();
        assert!(schemas.contains_key("panel"));
        assert!(schemas.contains_key("image"));
        assert_eq!(schemas["panel"].class, TagClass::Container);
        assert_eq!(schemas["image"].class, TagClass::Tag);
        assert_eq!(schemas["glossary-link"].class, TagClass::Inline);
    }
}
