//! Inline span matching.
//!
//! Two link-shaped patterns run over prose before the Markdown pass:
//! glossary references `[text](glossary:term)` and internal links
//! `[text](relative/path)`. Both render straight to inline HTML, which
//! the Markdown parser passes through untouched. Lines inside fenced
//! code blocks are never touched.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use minijinja::value::Value;
use regex::Regex;

use crate::error::Error;
use crate::pipeline::FenceTracker;
use crate::tags::DocumentState;
use crate::templates::{TemplateContext, TemplateStore};

static GLOSSARY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\[([^\[\]]+)\]\(glossary:([^()\s"]+)(?:\s+"([^"]*)")?\)"#).unwrap()
});

static LINK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(!?)\[([^\[\]]*)\]\(([^()\s]+)\)").unwrap());

static EXTERNAL_TARGET_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:[a-zA-Z][a-zA-Z0-9+.-]*:|#|//)").unwrap());

/// Apply the active inline patterns to one prose chunk.
pub(crate) fn apply(
    text: &str,
    active: &BTreeSet<String>,
    state: &mut DocumentState,
    store: &TemplateStore,
) -> Result<String, Error> {
    let mut out = String::with_capacity(text.len());
    let mut fences = FenceTracker::default();

    for line in text.lines() {
        let was_in_fence = fences.in_fence();
        fences.update(line);
        if was_in_fence || fences.in_fence() {
            out.push_str(line);
            out.push('\n');
            continue;
        }

        let mut processed = if active.contains("glossary-link") {
            replace_glossary_links(line, state, store)?
        } else {
            line.to_owned()
        };
        if active.contains("internal-link") {
            processed = replace_internal_links(&processed, store)?;
        }
        out.push_str(&processed);
        out.push('\n');
    }

    Ok(out)
}

/// Replace `[text](glossary:term)` spans, registering each usage.
///
/// The anchor id draws from the document-wide slug registry, so repeated
/// uses of a term get `glossary-term`, `glossary-term-2`, … and can never
/// collide with a heading slug.
fn replace_glossary_links(
    line: &str,
    state: &mut DocumentState,
    store: &TemplateStore,
) -> Result<String, Error> {
    let mut out = String::with_capacity(line.len());
    let mut last = 0;

    for captures in GLOSSARY_RE.captures_iter(line) {
        let whole = captures.get(0).map_or(0..0, |m| m.range());
        let link_text = &captures[1];
        let term = &captures[2];

        let anchor_id = state.slugs.slugify(&format!("glossary-{term}"));
        state
            .registry
            .register_glossary_usage(term, link_text, &anchor_id);
        tracing::trace!(term, anchor_id, "glossary reference");

        let mut context = TemplateContext::new();
        context.insert("term".to_owned(), Value::from(term));
        context.insert("text".to_owned(), Value::from(link_text));
        context.insert("anchor_id".to_owned(), Value::from(anchor_id));
        if let Some(reference) = captures.get(3) {
            context.insert("reference".to_owned(), Value::from(reference.as_str()));
        }

        out.push_str(&line[last..whole.start]);
        out.push_str(&store.render("glossary-link", &context)?);
        last = whole.end;
    }
    out.push_str(&line[last..]);
    Ok(out)
}

/// Rewrite relative link targets through the `internal-link` template.
///
/// Targets with a URI scheme, protocol-relative `//`, or a bare `#`
/// fragment are left for the Markdown parser, as are image links.
fn replace_internal_links(line: &str, store: &TemplateStore) -> Result<String, Error> {
    let mut out = String::with_capacity(line.len());
    let mut last = 0;

    for captures in LINK_RE.captures_iter(line) {
        let whole = captures.get(0).map_or(0..0, |m| m.range());
        let is_image = !captures[1].is_empty();
        let link_text = &captures[2];
        let target = &captures[3];

        if is_image || EXTERNAL_TARGET_RE.is_match(target) {
            continue;
        }

        let mut context = TemplateContext::new();
        context.insert("link_text".to_owned(), Value::from(link_text));
        context.insert("link_path".to_owned(), Value::from(target));

        out.push_str(&line[last..whole.start]);
        out.push_str(&store.render("internal-link", &context)?);
        last = whole.end;
    }
    out.push_str(&line[last..]);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn all_active() -> BTreeSet<String> {
        ["glossary-link", "internal-link"]
            .into_iter()
            .map(ToOwned::to_owned)
            .collect()
    }

    fn run(text: &str, state: &mut DocumentState) -> String {
        let store = TemplateStore::new(&BTreeMap::new()).unwrap();
        apply(text, &all_active(), state, &store).unwrap()
    }

    #[test]
    fn glossary_link_renders_and_registers() {
        let mut state = DocumentState::default();
        let out = run("An [algorithm](glossary:algorithm) is a recipe.\n", &mut state);
        assert!(out.contains(r#"data-glossary-term="algorithm""#));
        assert!(out.contains(r#"id="glossary-algorithm""#));
        assert!(out.contains(">algorithm</a>"));

        let glossary = state.registry.glossary_snapshot();
        assert_eq!(
            glossary["algorithm"],
            vec![("algorithm".to_owned(), "glossary-algorithm".to_owned())]
        );
    }

    #[test]
    fn repeated_term_gets_suffixed_anchor() {
        let mut state = DocumentState::default();
        let out = run(
            "[first](glossary:pixel) and [second](glossary:pixel)\n",
            &mut state,
        );
        assert!(out.contains(r#"id="glossary-pixel""#));
        assert!(out.contains(r#"id="glossary-pixel-2""#));

        let usages = &state.registry.glossary_snapshot()["pixel"];
        assert_eq!(usages[0].0, "first");
        assert_eq!(usages[1].0, "second");
    }

    #[test]
    fn glossary_reference_text_is_carried() {
        let mut state = DocumentState::default();
        let out = run(
            "[bits](glossary:bit \"Binary digits\")\n",
            &mut state,
        );
        assert!(out.contains(r#"data-reference-text="Binary digits""#));
    }

    #[test]
    fn internal_link_is_rewritten() {
        let mut state = DocumentState::default();
        let out = run("See [the next chapter](chapters/algorithms.md).\n", &mut state);
        assert_eq!(
            out,
            "See <a href=\"chapters/algorithms.md\">the next chapter</a>.\n"
        );
    }

    #[test]
    fn external_and_fragment_links_are_left_alone() {
        let mut state = DocumentState::default();
        let text = "[a](https://example.com) [b](#anchor) [c](mailto:x@y.z)\n";
        assert_eq!(run(text, &mut state), text);
    }

    #[test]
    fn image_links_are_left_alone() {
        let mut state = DocumentState::default();
        let text = "![alt text](pictures/cat.png)\n";
        assert_eq!(run(text, &mut state), text);
    }

    #[test]
    fn fenced_code_is_untouched() {
        let mut state = DocumentState::default();
        let text = "```\n[x](glossary:term)\n```\n";
        assert_eq!(run(text, &mut state), text);
        assert!(state.registry.glossary_snapshot().is_empty());
    }

    #[test]
    fn inactive_patterns_do_nothing() {
        let mut state = DocumentState::default();
        let store = TemplateStore::new(&BTreeMap::new()).unwrap();
        let text = "[a](glossary:x) [b](local/path)\n";
        let out = apply(text, &BTreeSet::new(), &mut state, &store).unwrap();
        assert_eq!(out, text);
    }
}
