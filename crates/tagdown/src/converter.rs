//! The document converter.
//!
//! Owns the schema table, the active processor set, the compiled
//! templates and the per-document state, and drives the block pipeline:
//! marker blocks dispatch to their class matcher, prose blocks run the
//! inline patterns and then the Markdown parser, and container bodies
//! re-enter the same loop recursively.

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use minijinja::value::Value;
use pulldown_cmark::Options;

use crate::args::TagArgs;
use crate::error::Error;
use crate::heading::HeadingNode;
use crate::pipeline::{self, Block, Marker};
use crate::registry::GlossaryUsage;
use crate::schema::{self, TagClass, TagSchema};
use crate::tags::{DocumentState, container, inline, tag};
use crate::templates::{TemplateContext, TemplateStore};

/// Builder-style configuration for a [`Converter`].
///
/// # Example
///
/// ```
/// use tagdown::ConverterOptions;
///
/// let mut converter = ConverterOptions::new()
///     .processors(["heading", "panel", "image"])
///     .template("image", r#"<img src="{{ file_path }}">"#)
///     .build()
///     .unwrap();
/// let result = converter.convert("# Hello\n").unwrap();
/// assert_eq!(result.title.as_deref(), Some("Hello"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct ConverterOptions {
    processors: Option<BTreeSet<String>>,
    html_templates: BTreeMap<String, String>,
    extensions: Vec<String>,
}

impl ConverterOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict conversion to the named tag kinds. Unlisted kinds are
    /// left in the output as literal text.
    #[must_use]
    pub fn processors<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.processors = Some(names.into_iter().map(Into::into).collect());
        self
    }

    /// Override the HTML template for one tag kind.
    #[must_use]
    pub fn template(mut self, name: impl Into<String>, source: impl Into<String>) -> Self {
        self.html_templates.insert(name.into(), source.into());
        self
    }

    /// Enable one Markdown extension by name. When none are given, all
    /// supported extensions are enabled.
    #[must_use]
    pub fn extension(mut self, name: impl Into<String>) -> Self {
        self.extensions.push(name.into());
        self
    }

    /// Build the converter.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownProcessor`] for an allowlisted kind with no
    /// schema, or a template error for an override that fails to compile.
    pub fn build(self) -> Result<Converter, Error> {
        Converter::with_options(self)
    }
}

/// Everything produced by one conversion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionResult {
    /// The rendered HTML fragment.
    pub html: String,
    /// Text of the first heading, if the document had one.
    pub title: Option<String>,
    /// Referenced asset files, keyed by category (`images`,
    /// `interactives`, `page_scripts`).
    pub required_files: BTreeMap<String, BTreeSet<String>>,
    /// The heading outline as a forest in document order.
    pub heading_tree: Vec<HeadingNode>,
    /// Glossary terms used, each with its `(link text, anchor id)` usage
    /// sites in document order.
    pub required_glossary_terms: BTreeMap<String, Vec<GlossaryUsage>>,
}

/// A reusable Markdown-with-tags to HTML converter.
///
/// Conversion state is fully reset at the start of every
/// [`convert`](Converter::convert) call, so one converter can process a
/// whole document collection sequentially.
#[derive(Debug)]
pub struct Converter {
    schemas: BTreeMap<String, TagSchema>,
    active: BTreeSet<String>,
    overrides: BTreeMap<String, String>,
    templates: TemplateStore,
    markdown_options: Options,
    state: DocumentState,
}

impl Converter {
    /// A converter with every tag kind active and default templates.
    pub fn new() -> Result<Self, Error> {
        Self::with_options(ConverterOptions::new())
    }

    /// A converter configured from `options`.
    pub fn with_options(options: ConverterOptions) -> Result<Self, Error> {
        let schemas = schema::load_schemas(tagdown_templates::TAG_INFO)?;

        let active = match options.processors {
            Some(names) => {
                for name in &names {
                    if !schemas.contains_key(name) {
                        return Err(Error::UnknownProcessor { name: name.clone() });
                    }
                }
                names
            }
            None => schemas.keys().cloned().collect(),
        };

        let templates = TemplateStore::new(&options.html_templates)?;

        Ok(Self {
            schemas,
            active,
            overrides: options.html_templates,
            templates,
            markdown_options: pipeline::markdown_options(&options.extensions),
            state: DocumentState::default(),
        })
    }

    /// Convert one document.
    ///
    /// # Errors
    ///
    /// Any [`Error`] aborts the conversion; no partial result is
    /// produced and the converter stays usable for the next document.
    pub fn convert(&mut self, source: &str) -> Result<ConversionResult, Error> {
        self.state.clear();

        let mut blocks: VecDeque<Block> = pipeline::split_blocks(source).into();
        tracing::debug!(blocks = blocks.len(), "source split into blocks");

        let html = process_blocks(
            &mut blocks,
            &self.schemas,
            &self.active,
            &self.templates,
            self.markdown_options,
            &mut self.state,
        )?;

        Ok(ConversionResult {
            html: pipeline::beautify(&html),
            title: self.state.headings.title().map(ToOwned::to_owned),
            required_files: self.state.registry.asset_snapshot(),
            heading_tree: self.state.headings.tree(),
            required_glossary_terms: self.state.registry.glossary_snapshot(),
        })
    }

    /// Replace the active processor set.
    pub fn update_processors<I, S>(&mut self, names: I) -> Result<(), Error>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names: BTreeSet<String> = names.into_iter().map(Into::into).collect();
        for name in &names {
            if !self.schemas.contains_key(name) {
                return Err(Error::UnknownProcessor { name: name.clone() });
            }
        }
        self.active = names;
        Ok(())
    }

    /// The currently active tag kinds.
    #[must_use]
    pub fn active_processors(&self) -> &BTreeSet<String> {
        &self.active
    }

    /// Add or replace template overrides, keeping existing ones.
    pub fn update_templates(&mut self, templates: BTreeMap<String, String>) -> Result<(), Error> {
        let mut merged = self.overrides.clone();
        merged.extend(templates);
        // Compile before committing so a bad override leaves the
        // converter unchanged.
        self.templates = TemplateStore::new(&merged)?;
        self.overrides = merged;
        Ok(())
    }

    /// Drop all template overrides, restoring the bundled defaults.
    pub fn clear_templates(&mut self) -> Result<(), Error> {
        self.templates = TemplateStore::new(&BTreeMap::new())?;
        self.overrides.clear();
        Ok(())
    }
}

/// Run the block loop over one stream. Container bodies recurse here.
fn process_blocks(
    blocks: &mut VecDeque<Block>,
    schemas: &BTreeMap<String, TagSchema>,
    active: &BTreeSet<String>,
    store: &TemplateStore,
    options: Options,
    state: &mut DocumentState,
) -> Result<String, Error> {
    let mut fragments: Vec<String> = Vec::new();
    let mut prose = String::new();

    while let Some(block) = blocks.pop_front() {
        if let Some((level, text)) = pipeline::parse_heading(&block.text) {
            if active.contains("heading") {
                flush_prose(&mut prose, &mut fragments, active, store, options, state)?;
                let event = state.headings.observe(text, level, &mut state.slugs);
                let mut context = TemplateContext::new();
                context.insert("level".to_owned(), Value::from(level));
                context.insert("text".to_owned(), Value::from(text));
                context.insert("slug".to_owned(), Value::from(event.slug));
                context.insert("number".to_owned(), Value::from(event.number));
                fragments.push(store.render("heading", &context)?);
            } else {
                push_prose(&mut prose, &block.text);
            }
            continue;
        }

        let Some(marker) = Marker::parse(&block.text) else {
            push_prose(&mut prose, &block.text);
            continue;
        };

        let kind = marker.kind().to_owned();
        let schema = schemas.get(&kind).filter(|_| active.contains(&kind));
        match (schema, marker) {
            (Some(schema), Marker::Open { raw_args, .. })
                if schema.class == TagClass::Container =>
            {
                flush_prose(&mut prose, &mut fragments, active, store, options, state)?;
                let args = TagArgs::parse(&raw_args);
                schema.validate(&kind, &args)?;
                let body = container::collect_body(&kind, block.line, blocks)?;

                if let Some(template) = schema.template.as_deref() {
                    let mut body: VecDeque<Block> = body.into();
                    let content =
                        process_blocks(&mut body, schemas, active, store, options, state)?;
                    let mut context = tag::base_context(&args);
                    context.insert("content".to_owned(), Value::from(content));
                    fragments.push(store.render(template, &context)?);
                }
                // A template-less container (comment) discards its body
                // without processing it.
            }
            (Some(schema), Marker::Close { .. }) if schema.class == TagClass::Container => {
                return Err(Error::UnmatchedTag {
                    tag: kind,
                    line: block.line,
                });
            }
            (Some(schema), Marker::Open { raw_args, .. }) if schema.class == TagClass::Tag => {
                flush_prose(&mut prose, &mut fragments, active, store, options, state)?;
                let args = TagArgs::parse(&raw_args);
                if let Some(html) = tag::render_tag(&kind, schema, &args, state, store)? {
                    fragments.push(html);
                }
            }
            _ => push_prose(&mut prose, &block.text),
        }
    }
    flush_prose(&mut prose, &mut fragments, active, store, options, state)?;

    Ok(fragments.join("\n"))
}

/// Append one block's text to the prose buffer as its own paragraph.
fn push_prose(prose: &mut String, text: &str) {
    if !prose.is_empty() {
        prose.push('\n');
    }
    prose.push_str(text);
    if !text.ends_with('\n') {
        prose.push('\n');
    }
}

/// Run inline patterns and the Markdown parser over buffered prose.
fn flush_prose(
    prose: &mut String,
    fragments: &mut Vec<String>,
    active: &BTreeSet<String>,
    store: &TemplateStore,
    options: Options,
    state: &mut DocumentState,
) -> Result<(), Error> {
    if prose.trim().is_empty() {
        prose.clear();
        return Ok(());
    }
    let text = std::mem::take(prose);
    let text = inline::apply(&text, active, state, store)?;
    fragments.push(pipeline::render_markdown(&text, options).trim_end().to_owned());
    Ok(())
}
