//! Default HTML templates and tag schema data for the tagdown engine.
//!
//! Templates are compiled into the binary with `include_str!` and looked up
//! by tag kind. The engine overlays user-supplied template overrides on top
//! of these defaults; this crate only provides the raw template sources.

/// Declarative description of every known tag kind: required and optional
/// parameters, parameter dependencies, allowed values, and template names.
pub const TAG_INFO: &str = include_str!("../tag-info.json");

/// Default templates, keyed by template name.
const TEMPLATES: &[(&str, &str)] = &[
    ("boxed-text", include_str!("../templates/boxed-text.html")),
    ("button-link", include_str!("../templates/button-link.html")),
    ("glossary-link", include_str!("../templates/glossary-link.html")),
    ("heading", include_str!("../templates/heading.html")),
    ("image", include_str!("../templates/image.html")),
    ("interactive", include_str!("../templates/interactive.html")),
    ("internal-link", include_str!("../templates/internal-link.html")),
    ("panel", include_str!("../templates/panel.html")),
    (
        "relative-file-link",
        include_str!("../templates/relative-file-link.html"),
    ),
    ("video", include_str!("../templates/video.html")),
    ("video-vimeo", include_str!("../templates/video-vimeo.html")),
    ("video-youtube", include_str!("../templates/video-youtube.html")),
];

/// Get a default template source by name.
///
/// Returns `None` if no template with that name is bundled.
#[must_use]
pub fn get(name: &str) -> Option<&'static str> {
    TEMPLATES
        .iter()
        .find(|(key, _)| *key == name)
        .map(|(_, source)| *source)
}

/// Iterate all bundled template names and sources.
pub fn iter() -> impl Iterator<Item = (&'static str, &'static str)> {
    TEMPLATES.iter().copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_known_template() {
        let panel = get("panel").unwrap();
        assert!(panel.contains("panel"));
    }

    #[test]
    fn get_unknown_template() {
        assert!(get("no-such-template").is_none());
    }

    #[test]
    fn iter_yields_all_templates() {
        assert_eq!(iter().count(), TEMPLATES.len());
    }

    #[test]
    fn tag_info_is_nonempty_json() {
        assert!(TAG_INFO.trim_start().starts_with('{'));
    }

    #[test]
    fn every_template_name_is_unique() {
        let mut names: Vec<_> = iter().map(|(name, _)| name).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), TEMPLATES.len());
    }
}
