//! Single-line tag rendering.
//!
//! Handles `{kind key="value"}` occurrences that stand alone on a line.
//! Most kinds render their template directly from the parsed arguments;
//! `image`, `video` and `interactive` carry extra side effects (asset
//! registration, embed resolution) before rendering.

use std::sync::LazyLock;

use minijinja::value::Value;
use regex::Regex;

use crate::args::TagArgs;
use crate::error::Error;
use crate::schema::TagSchema;
use crate::tags::DocumentState;
use crate::templates::{TemplateContext, TemplateStore};

static YOUTUBE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:youtube\.com/(?:watch\?[^ ]*v=|embed/)|youtu\.be/)([A-Za-z0-9_-]{6,})")
        .unwrap()
});

static VIMEO_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"vimeo\.com/(?:video/)?(\d+)").unwrap());

/// Validate and render one single-line tag occurrence.
///
/// Returns `Ok(None)` when the schema declares no template, which
/// discards the match outright.
pub(crate) fn render_tag(
    kind: &str,
    schema: &TagSchema,
    args: &TagArgs,
    state: &mut DocumentState,
    store: &TemplateStore,
) -> Result<Option<String>, Error> {
    schema.validate(kind, args)?;
    let Some(template) = schema.template.as_deref() else {
        return Ok(None);
    };

    let mut context = base_context(args);
    match kind {
        "image" => prepare_image(args, state, store, &mut context)?,
        "video" => prepare_video(args, store, &mut context)?,
        "interactive" => prepare_interactive(args, state, &mut context),
        _ => {}
    }

    tracing::debug!(kind, "rendering tag");
    store.render(template, &context).map(Some)
}

/// Argument keys become template variables with hyphens mapped to
/// underscores, e.g. `file-path` binds as `file_path`.
pub(crate) fn base_context(args: &TagArgs) -> TemplateContext {
    args.iter()
        .map(|(key, value)| (key.replace('-', "_"), Value::from(value)))
        .collect()
}

fn is_external(path: &str) -> bool {
    path.starts_with("http://") || path.starts_with("https://") || path.starts_with("//")
}

/// Internal image paths are registered as required files and rewritten
/// through the `relative-file-link` template; external URLs pass through.
fn prepare_image(
    args: &TagArgs,
    state: &mut DocumentState,
    store: &TemplateStore,
    context: &mut TemplateContext,
) -> Result<(), Error> {
    let file_path = args.get("file-path").unwrap_or_default();
    if !is_external(file_path) {
        state.registry.register_asset("images", file_path);
        let mut link_context = TemplateContext::new();
        link_context.insert("file_path".to_owned(), Value::from(file_path));
        // Already escaped by the template pass; mark safe so the image
        // template does not escape it a second time.
        let rewritten = store.render("relative-file-link", &link_context)?;
        context.insert("file_path".to_owned(), Value::from_safe_string(rewritten));
    }

    if let Some(source) = args.get("source") {
        context.remove("source");
        context.insert("source_link".to_owned(), Value::from(source));
    }
    Ok(())
}

/// Resolve the embed fragment for the video's host.
fn prepare_video(
    args: &TagArgs,
    store: &TemplateStore,
    context: &mut TemplateContext,
) -> Result<(), Error> {
    let url = args.get("url").unwrap_or_default();
    let (embed_template, identifier) = identify_video(url).ok_or_else(|| {
        Error::InvalidArgument {
            tag: "video".to_owned(),
            argument: "url".to_owned(),
            reason: format!("no video identifier recognized in '{url}'"),
        }
    })?;

    let mut embed_context = TemplateContext::new();
    embed_context.insert("identifier".to_owned(), Value::from(identifier));
    let embed = store.render(embed_template, &embed_context)?;
    context.insert("embed".to_owned(), Value::from(embed));
    Ok(())
}

/// Extract `(embed template, video identifier)` from a supported URL.
fn identify_video(url: &str) -> Option<(&'static str, String)> {
    if let Some(captures) = YOUTUBE_RE.captures(url) {
        return Some(("video-youtube", captures[1].to_owned()));
    }
    if let Some(captures) = VIMEO_RE.captures(url) {
        return Some(("video-vimeo", captures[1].to_owned()));
    }
    None
}

/// Register the interactive's assets by embed type.
///
/// Every interactive registers its name; `in-page` additionally needs its
/// page script, `whole-page` its thumbnail image.
fn prepare_interactive(args: &TagArgs, state: &mut DocumentState, context: &mut TemplateContext) {
    let name = args.get("name").unwrap_or_default();
    state.registry.register_asset("interactives", name);

    match args.get("type") {
        Some("in-page") => {
            state
                .registry
                .register_asset("page_scripts", format!("interactives/{name}/js/{name}.js"));
        }
        Some("whole-page") => {
            let thumbnail = args
                .get("thumbnail")
                .map_or_else(|| format!("interactives/{name}/img/thumbnail.png"), ToOwned::to_owned);
            if !is_external(&thumbnail) {
                state.registry.register_asset("images", &thumbnail);
            }
            context.insert("thumbnail".to_owned(), Value::from(thumbnail));
        }
        _ => {}
    }
}
