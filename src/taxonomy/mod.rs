//! Two-level action catalog: primary kinds, optionally expanding into a sub-catalog.

pub mod catalog;
pub mod handball;

pub use catalog::{
    composite_label, composite_type, ActionCategory, ActionKind, Catalog, CatalogError,
    ResolvedAction, SubActionKind,
};
