//! Custom bracket-tag extension layer over a Markdown-to-HTML converter.
//!
//! Documents are ordinary Markdown plus `{tag key="value"}` occurrences:
//! single-line tags (`image`, `video`, `interactive`, `button-link`),
//! balanced containers (`{panel ...}` … `{panel end}`), inline
//! link-shaped spans (glossary and internal links), and a numbered
//! heading override. Each tag kind renders through an overridable
//! `minijinja` template declared in a bundled schema table.
//!
//! Beyond HTML, a conversion collects side-channel metadata: the document
//! title, a slugged heading outline, the referenced asset files by
//! category, and every glossary term usage.
//!
//! # Example
//!
//! ```
//! use tagdown::Converter;
//!
//! let source = "\
//! ## Binary numbers
//!
//! {image file-path=\"cards.png\" alt=\"Binary cards\"}
//! ";
//!
//! let mut converter = Converter::new().unwrap();
//! let result = converter.convert(source).unwrap();
//!
//! assert_eq!(result.title.as_deref(), Some("Binary numbers"));
//! assert!(result.html.contains("src=\"files/cards.png\""));
//! assert!(result.required_files["images"].contains("cards.png"));
//! ```

mod args;
mod converter;
mod error;
mod heading;
mod pipeline;
mod registry;
mod schema;
mod slugify;
mod tags;
mod templates;

pub use args::TagArgs;
pub use converter::{ConversionResult, Converter, ConverterOptions};
pub use error::Error;
pub use heading::{HeadingEvent, HeadingNode, HeadingTracker};
pub use registry::{DocumentRegistry, GlossaryUsage};
pub use schema::{TagClass, TagSchema, load_schemas};
pub use slugify::UniqueSlugifier;
