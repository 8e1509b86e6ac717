//! core
//!
//! Package layout, document models and configuration.
//!
//! # Modules
//!
//! - [`paths`] - Document locations inside an extracted package
//! - [`xml`] - Shared XML reading, namespaces and writing helpers
//! - [`catalog`] - Master catalog model and entry removal
//! - [`rels`] - Relationship index model and filtering
//! - [`config`] - Configuration schema and loading
//!
//! # Design Principles
//!
//! - Models are parsed once and never mutated; rewriting works on the
//!   source text so untouched content is carried through as written
//! - Schemas are strict and self-describing
//! - Nothing in this layer prints

pub mod catalog;
pub mod config;
pub mod paths;
pub mod rels;
pub mod xml;
