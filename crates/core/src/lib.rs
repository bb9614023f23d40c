//! triage-core: the static knowledge base of the triage engine.
//!
//! Holds the diagnostic rule catalog, disease metadata and the symptom
//! vocabulary. A catalog is read from JSON into raw definitions
//! ([`CatalogDef`]), validated once by [`build_knowledge_base`] and frozen
//! into a [`KnowledgeBase`] that exposes read-only lookups only.
//!
//! # Public API
//!
//! - [`build_knowledge_base()`] -- validate raw definitions, freeze the catalog
//! - [`builtin_knowledge_base()`] -- the catalog shipped in `data/catalog.json`
//! - [`KnowledgeBaseBuilder`] -- incremental construction (tests, loaders)
//! - [`Rule`], [`DiseaseInfo`], [`SymptomInfo`], [`Severity`] -- catalog records
//! - [`CatalogError`] -- build and load errors

/// Catalog document format version understood by this crate.
pub const CATALOG_FORMAT_VERSION: &str = "1.0";

pub mod catalog;
pub mod error;
pub mod knowledge_base;
pub mod rule;

pub use catalog::{
    builtin_catalog, load_catalog, parse_catalog, CatalogDef, DiseaseDef, RuleDef, SymptomDef,
    BUILTIN_CATALOG,
};
pub use error::CatalogError;
pub use knowledge_base::{
    build_knowledge_base, builtin_knowledge_base, KnowledgeBase, KnowledgeBaseBuilder,
};
pub use rule::{normalize_symptom, DiseaseInfo, Rule, Severity, SymptomInfo};
