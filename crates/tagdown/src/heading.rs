//! Heading outline tracking, slug assignment, and section numbering.

use crate::slugify::UniqueSlugifier;

/// One heading in the document outline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeadingNode {
    /// Heading text with markup stripped.
    pub title: String,
    /// Globally-unique URL slug for this heading.
    pub title_slug: String,
    /// Heading level, 1–6.
    pub level: u8,
    /// Child headings in document order.
    pub children: Vec<HeadingNode>,
}

/// Data rendered for one observed heading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeadingEvent {
    /// Slug assigned to the heading.
    pub slug: String,
    /// Dotted section number, e.g. `2.1.3`.
    pub number: String,
}

/// Builds the heading forest incrementally as headings are observed in
/// document order.
///
/// A heading of level `L` closes every open heading of level ≥ `L` and
/// attaches to the nearest open heading of level < `L`, or becomes a new
/// root when none is open. The first heading observed also sets the
/// document title.
#[derive(Debug, Default)]
pub struct HeadingTracker {
    roots: Vec<HeadingNode>,
    /// Path of (child index, level) pairs into `roots` for the currently
    /// open ancestor chain.
    stack: Vec<(usize, u8)>,
    counters: [u32; 6],
    title: Option<String>,
}

impl HeadingTracker {
    /// Record a heading, assign its slug, and update section numbering.
    ///
    /// `level` must be in 1–6; values outside that range are clamped.
    pub fn observe(
        &mut self,
        title: &str,
        level: u8,
        slugs: &mut UniqueSlugifier,
    ) -> HeadingEvent {
        let level = level.clamp(1, 6);

        while let Some(&(_, open_level)) = self.stack.last() {
            if open_level >= level {
                self.stack.pop();
            } else {
                break;
            }
        }

        let slug = slugs.slugify(title);
        let node = HeadingNode {
            title: title.to_owned(),
            title_slug: slug.clone(),
            level,
            children: Vec::new(),
        };

        let index = if self.stack.is_empty() {
            self.roots.push(node);
            self.roots.len() - 1
        } else {
            let parent = self.open_node();
            parent.children.push(node);
            parent.children.len() - 1
        };
        self.stack.push((index, level));

        let depth = usize::from(level);
        self.counters[depth - 1] += 1;
        for counter in &mut self.counters[depth..] {
            *counter = 0;
        }
        let number = self.counters[..depth]
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(".");

        if self.title.is_none() {
            self.title = Some(title.to_owned());
        }

        HeadingEvent { slug, number }
    }

    /// The innermost currently-open heading.
    ///
    /// Must only be called with a non-empty stack.
    fn open_node(&mut self) -> &mut HeadingNode {
        let mut entries = self.stack.iter();
        let &(first, _) = entries.next().unwrap_or(&(0, 0));
        let mut node = &mut self.roots[first];
        for &(index, _) in entries {
            node = &mut node.children[index];
        }
        node
    }

    /// The document title: text of the first heading observed, if any.
    #[must_use]
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    /// Snapshot of the completed heading forest.
    #[must_use]
    pub fn tree(&self) -> Vec<HeadingNode> {
        self.roots.clone()
    }

    /// Reset all per-conversion state.
    pub fn clear(&mut self) {
        self.roots.clear();
        self.stack.clear();
        self.counters = [0; 6];
        self.title = None;
    }
}
