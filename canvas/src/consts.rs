//! Shared numeric constants for the canvas crate.

// ── Rotation ────────────────────────────────────────────────────

/// Degrees added by a single rotate operation.
pub const QUARTER_TURN_DEG: u16 = 90;

/// Degrees in a full turn; rotations are stored modulo this value.
pub const FULL_TURN_DEG: u16 = 360;

// ── Sizing ──────────────────────────────────────────────────────

/// Smallest width or height, in pixels, a resize can produce.
pub const MIN_ITEM_SIZE_PX: f64 = 10.0;

// ── Report ──────────────────────────────────────────────────────

/// Header line logged before the per-item report lines.
pub const REPORT_HEADER: &str = "Item positions relative to the screen size:";
