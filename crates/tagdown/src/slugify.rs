//! Globally-unique slug generation.

use std::collections::BTreeSet;

/// Produces URL-safe slugs that are unique for the lifetime of one
/// document conversion.
///
/// The first use of a base slug yields the base itself; later collisions
/// yield `base-2`, `base-3`, … in first-seen order. Generated suffixed
/// slugs are themselves reserved, so a later heading that normalizes to
/// `base-2` cannot collide with one that was generated.
///
/// # Example
///
/// ```
/// use tagdown::UniqueSlugifier;
///
/// let mut slugs = UniqueSlugifier::default();
/// assert_eq!(slugs.slugify("The FAQ"), "the-faq");
/// assert_eq!(slugs.slugify("The FAQ"), "the-faq-2");
/// assert_eq!(slugs.slugify("The FAQ"), "the-faq-3");
/// ```
#[derive(Debug, Default)]
pub struct UniqueSlugifier {
    issued: BTreeSet<String>,
}

impl UniqueSlugifier {
    /// Derive a unique slug from raw text.
    pub fn slugify(&mut self, raw: &str) -> String {
        let base = normalize(raw);
        let mut candidate = base.clone();
        let mut count = 1;
        while self.issued.contains(&candidate) {
            count += 1;
            candidate = format!("{base}-{count}");
        }
        self.issued.insert(candidate.clone());
        candidate
    }

    /// Forget every issued slug. Called between conversions.
    pub fn clear(&mut self) {
        self.issued.clear();
    }
}

/// Lowercase, collapse non-alphanumeric runs to a single hyphen, trim
/// edge hyphens.
fn normalize(raw: &str) -> String {
    let mut slug = String::with_capacity(raw.len());
    let mut pending_hyphen = false;
    for c in raw.chars() {
        if c.is_alphanumeric() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.extend(c.to_lowercase());
        } else {
            pending_hyphen = true;
        }
    }
    if slug.is_empty() {
        // Headings with no alphanumeric content still need an anchor
        slug.push_str("section");
    }
    slug
}
