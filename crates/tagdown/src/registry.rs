//! Document-scoped asset and glossary registries.

use std::collections::{BTreeMap, BTreeSet};

/// A glossary usage site: the text that referenced the term and the anchor
/// id emitted at the reference.
pub type GlossaryUsage = (String, String);

/// Accumulates asset references and glossary usage for one conversion.
///
/// Owned by the converter and passed by reference to every processor;
/// cleared (not recreated) between conversions so that the asset category
/// keys survive a reset with empty sets.
#[derive(Debug, Default)]
pub struct DocumentRegistry {
    assets: BTreeMap<String, BTreeSet<String>>,
    glossary: BTreeMap<String, Vec<GlossaryUsage>>,
}

impl DocumentRegistry {
    /// Record a referenced asset file under a category. Idempotent.
    pub fn register_asset(&mut self, category: &str, path: impl Into<String>) {
        self.assets
            .entry(category.to_owned())
            .or_default()
            .insert(path.into());
    }

    /// Record one glossary term usage, preserving first-seen order per term.
    pub fn register_glossary_usage(
        &mut self,
        term: &str,
        context_label: impl Into<String>,
        anchor_id: impl Into<String>,
    ) {
        self.glossary
            .entry(term.to_owned())
            .or_default()
            .push((context_label.into(), anchor_id.into()));
    }

    /// Read-only copy of the asset categories for the conversion result.
    #[must_use]
    pub fn asset_snapshot(&self) -> BTreeMap<String, BTreeSet<String>> {
        self.assets.clone()
    }

    /// Read-only copy of the glossary usages for the conversion result.
    #[must_use]
    pub fn glossary_snapshot(&self) -> BTreeMap<String, Vec<GlossaryUsage>> {
        self.glossary.clone()
    }

    /// Empty every category and term without dropping category keys.
    pub fn clear(&mut self) {
        for paths in self.assets.values_mut() {
            paths.clear();
        }
        self.glossary.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn asset_registration_is_idempotent() {
        let mut registry = DocumentRegistry::default();
        registry.register_asset("images", "cats.png");
        registry.register_asset("images", "cats.png");
        registry.register_asset("images", "dogs.png");

        let snapshot = registry.asset_snapshot();
        assert_eq!(snapshot["images"].len(), 2);
        assert!(snapshot["images"].contains("cats.png"));
    }

    #[test]
    fn glossary_usages_preserve_order() {
        let mut registry = DocumentRegistry::default();
        registry.register_glossary_usage("algorithm", "first use", "glossary-algorithm");
        registry.register_glossary_usage("algorithm", "second use", "glossary-algorithm-2");

        let snapshot = registry.glossary_snapshot();
        assert_eq!(
            snapshot["algorithm"],
            vec![
                ("first use".to_owned(), "glossary-algorithm".to_owned()),
                ("second use".to_owned(), "glossary-algorithm-2".to_owned()),
            ]
        );
    }

    #[test]
    fn clear_keeps_category_keys_with_empty_sets() {
        let mut registry = DocumentRegistry::default();
        registry.register_asset("images", "cats.png");
        registry.register_glossary_usage("algorithm", "ctx", "glossary-algorithm");
        registry.clear();

        let assets = registry.asset_snapshot();
        assert!(assets.contains_key("images"));
        assert!(assets["images"].is_empty());
        assert!(registry.glossary_snapshot().is_empty());
    }
}
