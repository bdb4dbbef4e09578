//! Template store.
//!
//! Wraps a [`minijinja::Environment`] holding the bundled default templates
//! overlaid with any per-kind user overrides. Rendering is a pure function
//! of template name and context.

use std::collections::BTreeMap;
use std::fmt::Write as _;

use minijinja::value::Value;
use minijinja::{AutoEscape, Environment, Output, State};

use crate::error::Error;

/// Context mapping passed to a template.
pub(crate) type TemplateContext = BTreeMap<String, Value>;

/// Compiled templates for every tag kind.
#[derive(Debug)]
pub(crate) struct TemplateStore {
    env: Environment<'static>,
}

impl TemplateStore {
    /// Build the store from the bundled defaults plus `overrides`.
    ///
    /// An override replaces the default template of the same name; override
    /// names without a bundled counterpart are accepted so custom tag
    /// schemas can bring their own templates.
    pub(crate) fn new(overrides: &BTreeMap<String, String>) -> Result<Self, Error> {
        let mut env = Environment::new();
        env.set_auto_escape_callback(|_| AutoEscape::Html);
        env.set_formatter(format_value);

        for (name, source) in tagdown_templates::iter() {
            if !overrides.contains_key(name) {
                env.add_template(name, source)?;
            }
        }
        for (name, source) in overrides {
            env.add_template_owned(name.clone(), source.clone())?;
        }

        Ok(Self { env })
    }

    /// Render the named template against a context mapping.
    pub(crate) fn render(&self, name: &str, context: &TemplateContext) -> Result<String, Error> {
        let template = self.env.get_template(name)?;
        let html = template.render(context)?;
        Ok(html.trim_end().to_owned())
    }
}

/// Escape string values for HTML output, leaving other values to the
/// default formatter.
///
/// minijinja's stock HTML escaping also rewrites `/` as `&#x2f;`, which
/// mangles the path and URL values most of these templates carry. Only
/// `&`, `<`, `>`, `"` and `'` need escaping in attribute and text
/// positions, so slashes pass through untouched.
fn format_value(
    out: &mut Output<'_>,
    state: &State<'_, '_>,
    value: &Value,
) -> Result<(), minijinja::Error> {
    if matches!(state.auto_escape(), AutoEscape::Html) && !value.is_safe() {
        if let Some(raw) = value.as_str() {
            return escape_html(out, raw);
        }
    }
    minijinja::escape_formatter(out, state, value)
}

fn escape_html(out: &mut Output<'_>, raw: &str) -> Result<(), minijinja::Error> {
    for c in raw.chars() {
        match c {
            '&' => out.write_str("&amp;")?,
            '<' => out.write_str("&lt;")?,
            '>' => out.write_str("&gt;")?,
            '"' => out.write_str("&quot;")?,
            '\'' => out.write_str("&#x27;")?,
            _ => out.write_char(c)?,
        }
    }
    Ok(())
}
