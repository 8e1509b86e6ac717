//! vsdx-shrink - Remove unused master shapes from Visio drawings
//!
//! A `.vsdx` drawing is a ZIP container of XML documents. Its master
//! catalog often carries far more masters than its pages use. This crate
//! finds the masters no page references and removes them, keeping the
//! catalog, its relationship index and the container's file set consistent.
//!
//! # Architecture
//!
//! The codebase follows a strict layered architecture:
//!
//! - [`cli`] - Command-line interface layer (parses args, delegates to engine)
//! - [`engine`] - Orchestrates Extract → Gate → Scan → Plan → Execute → Build
//! - [`core`] - Package layout, document models, rewriting and configuration
//! - [`archive`] - ZIP extraction, rebuilding and the ephemeral working tree
//! - [`ui`] - Output utilities
//!
//! # Correctness Invariants
//!
//! 1. Drawings are modified only after they pass validation
//! 2. All mutations of an extracted package flow through a single executor
//! 3. No retained master ever points at a removed relationship or file
//! 4. The original drawing is replaced only by a complete archive

pub mod archive;
pub mod cli;
pub mod core;
pub mod engine;
pub mod ui;
