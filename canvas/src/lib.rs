//! State model and interaction rules for the pinboard canvas editor.
//!
//! This crate owns everything about the editor that does not depend on a
//! rendering surface: the ordered collection of placed items, the live
//! viewport, the pixel-to-percentage coordinate math, and the strategies that
//! turn pointer gestures into store mutations. The host layer is responsible
//! only for painting snapshots, hit-testing, decoding files, and feeding
//! events in as [`engine::Command`]s.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`engine`] | Command vocabulary and the [`engine::EngineCore`] that applies it |
//! | [`doc`] | Item types, snapshots, and the in-memory [`doc::ItemStore`] |
//! | [`viewport`] | Pixel ↔ percentage conversion against the live viewport |
//! | [`input`] | Hit targets and the pluggable interaction strategies |
//! | [`report`] | Per-item geometry report |
//! | [`consts`] | Shared numeric constants (rotation step, minimum size) |

pub mod consts;
pub mod doc;
pub mod engine;
pub mod input;
pub mod report;
pub mod viewport;
