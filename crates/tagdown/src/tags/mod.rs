//! The parametric tag matchers.
//!
//! There is one matcher per tag class, driven by the declarative schemas
//! in `tag-info.json`: [`tag::render_tag`] for single-line tags,
//! [`container::collect_body`] for balanced open/close pairs, and
//! [`inline::apply`] for link-shaped inline spans.

pub(crate) mod container;
pub(crate) mod inline;
pub(crate) mod tag;

use crate::heading::HeadingTracker;
use crate::registry::DocumentRegistry;
use crate::slugify::UniqueSlugifier;

/// Mutable per-conversion state threaded through every matcher.
///
/// Heading slugs and glossary anchors draw from the same slug registry,
/// so an anchor can never collide with a heading id.
#[derive(Debug, Default)]
pub(crate) struct DocumentState {
    pub(crate) slugs: UniqueSlugifier,
    pub(crate) headings: HeadingTracker,
    pub(crate) registry: DocumentRegistry,
}

impl DocumentState {
    /// Reset for the next conversion.
    pub(crate) fn clear(&mut self) {
        self.slugs.clear();
        self.headings.clear();
        self.registry.clear();
    }
}
