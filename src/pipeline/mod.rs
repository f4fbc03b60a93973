//! Pipeline stages for PDF structure reconstruction.
//!
//! Each submodule implements exactly one transformation step. Every stage
//! after extraction is a pure function of its inputs, so each one can be
//! tested in isolation with hand-built blocks.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ extract ──▶ classify ──▶ layout ──▶ render ──▶ postprocess
//! (path)    (spans)     (per page)   (groups)   (+restore)  (cleanup)
//!             │
//!          normalize
//! ```
//!
//! 1. [`input`]     — reject missing files and non-PDFs before opening them
//! 2. [`extract`]   — merge each source block's spans into one normalised
//!    text block; page failures become diagnostics, not errors
//! 3. [`normalize`] — control characters, glued words, typographic glyphs
//! 4. [`classify`]  — ordered rule table over per-page font context
//! 5. [`layout`]    — split the block sequence at page changes and large gaps
//! 6. [`render`]    — Markdown fragments; calls [`restore`] with a vocabulary
//!    from the surrounding groups
//! 7. [`postprocess`] — deterministic rules fixing seams between fragments

pub mod classify;
pub mod extract;
pub mod input;
pub mod layout;
pub mod normalize;
pub mod postprocess;
pub mod render;
pub mod restore;
