//! Pipeline stages for paper-to-Markdown conversion.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ extract ──▶ postprocess ──▶ classify ──▶ postprocess
//! (URL/path) (pdfium)    (normalise)    (per line)    (tidy)
//!                                          │
//!                           paragraph ─────┤
//!                           equation ──────┤
//!                           table ─────────┘
//! ```
//!
//! 1. [`input`]: canonicalise the user-supplied path or URL to a local
//!    PDF or pre-extracted text file
//! 2. [`extract`]: page text and container properties; runs in
//!    `spawn_blocking` because pdfium is not async-safe
//! 3. [`postprocess`]: line-ending and invisible-character normalisation
//!    before classification, optional whitespace tidy after assembly
//! 4. [`classify`]: the single-pass line classifier; owns the document
//!    state and drives the helpers below
//! 5. [`paragraph`], [`equation`], [`table`]: per-category helpers

pub mod classify;
pub mod equation;
pub mod extract;
pub mod input;
pub mod paragraph;
pub mod postprocess;
pub mod table;
