//! Document model: placed items, their content, and the in-memory store.
//!
//! This module defines what is on the canvas (`Item`, `ItemContent`,
//! `ImageStatus`), the immutable read view handed to renderers (`Snapshot`),
//! and the store that owns all live items (`ItemStore`).
//!
//! Items are kept in an `Arc<Vec<Item>>` and mutated copy-on-write: a
//! `Snapshot` taken before a mutation keeps seeing the old sequence, and every
//! applied change bumps the store revision so the host can detect staleness
//! with a single integer compare.
//!
//! Every mutation addressed by id treats a missing id as a no-op returning
//! `false`. Decode completions can arrive after the item was removed, so a
//! miss is normal traffic, not an error.

#[cfg(test)]
#[path = "doc_test.rs"]
mod doc_test;

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

use crate::consts::{FULL_TURN_DEG, MIN_ITEM_SIZE_PX, QUARTER_TURN_DEG};
use crate::report::{self, ReportEntry};
use crate::viewport::{self, Percent, Point, Viewport, ViewportError};

/// Unique identifier for a placed item.
///
/// UUID v7: a millisecond timestamp followed by random bits, so ids sort
/// roughly by creation time and never collide within a session.
pub type ItemId = Uuid;

/// The kind of a placed item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    Image,
    Text,
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Image => f.write_str("image"),
            Self::Text => f.write_str("text"),
        }
    }
}

/// Raw file handed in by the host file picker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    /// File name as reported by the picker. Informational only.
    pub name: String,
    /// Undecoded file contents.
    pub bytes: Arc<[u8]>,
}

impl SourceFile {
    #[must_use]
    pub fn new(name: impl Into<String>, bytes: impl Into<Arc<[u8]>>) -> Self {
        Self { name: name.into(), bytes: bytes.into() }
    }
}

/// A decode the host must run for a freshly added image item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodeTask {
    pub id: ItemId,
    pub file: SourceFile,
}

/// Renderable image data produced by a successful decode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImagePayload {
    /// `data:<mime>;base64,...` URL the host can hand straight to an image element.
    pub data_url: Arc<str>,
    /// MIME type sniffed from the file contents.
    pub mime: String,
    /// Decoded width in pixels.
    pub natural_width: u32,
    /// Decoded height in pixels.
    pub natural_height: u32,
}

/// Decode progress for an image item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ImageStatus {
    /// Decode scheduled but not finished; the item renders with an empty payload.
    Pending,
    /// Decode finished successfully.
    Ready(ImagePayload),
    /// The file could not be decoded. The item stays on the canvas.
    Failed { reason: String },
}

/// Content of an image item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageContent {
    pub file_name: String,
    pub status: ImageStatus,
}

impl ImageContent {
    /// The decoded payload, once available.
    #[must_use]
    pub fn payload(&self) -> Option<&ImagePayload> {
        match &self.status {
            ImageStatus::Ready(payload) => Some(payload),
            ImageStatus::Pending | ImageStatus::Failed { .. } => None,
        }
    }
}

/// What an item shows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ItemContent {
    Image(ImageContent),
    Text { text: String },
}

/// Pixel dimensions of an image item. `0 x 0` means "not resized yet";
/// the host renders the natural size in that case.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    #[must_use]
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Whether the user has never resized this item.
    #[must_use]
    pub fn is_unset(self) -> bool {
        self.width <= 0.0 && self.height <= 0.0
    }
}

/// Clockwise rotation in whole quarter turns, stored in `[0, 360)` degrees.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Rotation(u16);

impl Rotation {
    /// Build a rotation from degrees, normalizing into `[0, 360)`.
    #[must_use]
    pub fn from_degrees(degrees: u16) -> Self {
        Self(degrees % FULL_TURN_DEG)
    }

    /// This rotation advanced by one quarter turn.
    #[must_use]
    pub fn quarter_turn(self) -> Self {
        Self::from_degrees(self.0 + QUARTER_TURN_DEG)
    }

    #[must_use]
    pub fn degrees(self) -> u16 {
        self.0
    }
}

/// Transient per-item interaction flags. Independent of one another.
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ItemFlags {
    pub dragging: bool,
    pub hovered: bool,
    pub selected: bool,
}

/// A placed object on the canvas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    pub content: ItemContent,
    /// Top-left corner as percentages of the viewport.
    pub position: Percent,
    pub size: Size,
    pub rotation: Rotation,
    pub flags: ItemFlags,
}

impl Item {
    /// A new text item at the origin.
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self::with_content(ItemContent::Text { text: text.into() })
    }

    /// A new image item at the origin with a pending decode.
    #[must_use]
    pub fn pending_image(file_name: impl Into<String>) -> Self {
        Self::with_content(ItemContent::Image(ImageContent {
            file_name: file_name.into(),
            status: ImageStatus::Pending,
        }))
    }

    fn with_content(content: ItemContent) -> Self {
        Self {
            id: Uuid::now_v7(),
            content,
            position: Percent::default(),
            size: Size::default(),
            rotation: Rotation::default(),
            flags: ItemFlags::default(),
        }
    }

    #[must_use]
    pub fn kind(&self) -> ItemKind {
        match self.content {
            ItemContent::Image(_) => ItemKind::Image,
            ItemContent::Text { .. } => ItemKind::Text,
        }
    }

    /// Image content, or `None` for text items.
    #[must_use]
    pub fn image(&self) -> Option<&ImageContent> {
        match &self.content {
            ItemContent::Image(image) => Some(image),
            ItemContent::Text { .. } => None,
        }
    }

    /// Label text, or `None` for image items.
    #[must_use]
    pub fn label(&self) -> Option<&str> {
        match &self.content {
            ItemContent::Text { text } => Some(text),
            ItemContent::Image(_) => None,
        }
    }

    /// Size used for layout: the explicit size once resized, otherwise the
    /// decoded natural size (or zero while the decode is pending).
    #[must_use]
    pub fn effective_size(&self) -> Size {
        if !self.size.is_unset() {
            return self.size;
        }
        self.image()
            .and_then(ImageContent::payload)
            .map_or_else(Size::default, |p| {
                Size::new(f64::from(p.natural_width), f64::from(p.natural_height))
            })
    }
}

/// Immutable, revision-stamped view of the store for rendering.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    revision: u64,
    viewport: Viewport,
    items: Arc<Vec<Item>>,
}

impl Snapshot {
    /// Items in insertion order.
    #[must_use]
    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Item> {
        self.items.iter()
    }

    #[must_use]
    pub fn get(&self, id: &ItemId) -> Option<&Item> {
        self.items.iter().find(|item| item.id == *id)
    }

    /// Items in paint order: insertion order with the selected item moved last.
    #[must_use]
    pub fn paint_order(&self) -> Vec<&Item> {
        let mut ordered: Vec<&Item> = self.items.iter().filter(|item| !item.flags.selected).collect();
        ordered.extend(self.items.iter().filter(|item| item.flags.selected));
        ordered
    }

    #[must_use]
    pub fn selected(&self) -> Option<&Item> {
        self.items.iter().find(|item| item.flags.selected)
    }

    #[must_use]
    pub fn revision(&self) -> u64 {
        self.revision
    }

    #[must_use]
    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// The report for exactly this snapshot.
    #[must_use]
    pub fn report(&self) -> Vec<ReportEntry> {
        report::report(&self.items)
    }
}

impl<'a> IntoIterator for &'a Snapshot {
    type Item = &'a Item;
    type IntoIter = std::slice::Iter<'a, Item>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// In-memory store of placed items plus the live viewport.
#[derive(Debug, Default)]
pub struct ItemStore {
    items: Arc<Vec<Item>>,
    viewport: Viewport,
    revision: u64,
}

impl ItemStore {
    /// Create an empty store with a degenerate (unknown) viewport.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty store sized to the given viewport.
    #[must_use]
    pub fn with_viewport(viewport: Viewport) -> Self {
        Self { viewport, ..Self::default() }
    }

    // --- Creation ---

    /// Append one pending image item per file and return the decodes the host
    /// must run. Items keep their ids regardless of decode completion order.
    pub fn add_images(&mut self, files: Vec<SourceFile>) -> Vec<DecodeTask> {
        if files.is_empty() {
            return Vec::new();
        }
        let items = Arc::make_mut(&mut self.items);
        let tasks: Vec<DecodeTask> = files
            .into_iter()
            .map(|file| {
                let item = Item::pending_image(file.name.clone());
                let task = DecodeTask { id: item.id, file };
                items.push(item);
                task
            })
            .collect();
        self.revision += 1;
        tasks
    }

    /// Append a text item at the origin. Empty text is allowed.
    pub fn add_text(&mut self, text: impl Into<String>) -> ItemId {
        let item = Item::text(text);
        let id = item.id;
        Arc::make_mut(&mut self.items).push(item);
        self.revision += 1;
        id
    }

    /// Record the outcome of an image decode. Ignored for unknown ids and
    /// text items.
    pub fn apply_decoded(&mut self, id: &ItemId, outcome: Result<ImagePayload, String>) -> bool {
        let status = match outcome {
            Ok(payload) => ImageStatus::Ready(payload),
            Err(reason) => ImageStatus::Failed { reason },
        };
        self.update(id, |item| match &mut item.content {
            ItemContent::Image(image) => {
                image.status = status;
                true
            }
            ItemContent::Text { .. } => false,
        })
    }

    // --- Geometry ---

    /// Move an item to an absolute pixel offset, converted against the
    /// current viewport.
    ///
    /// # Errors
    ///
    /// Returns a [`ViewportError`] when the conversion is impossible; the
    /// item is left where it was.
    pub fn move_to(&mut self, id: &ItemId, pixel: Point) -> Result<bool, ViewportError> {
        if self.position_of(id).is_none() {
            return Ok(false);
        }
        let position = viewport::to_percentage(pixel, self.viewport)?;
        Ok(self.update(id, |item| {
            item.position = position;
            true
        }))
    }

    /// Set the pixel size of an image item. Dimensions below
    /// [`MIN_ITEM_SIZE_PX`] are raised to it; non-finite input is rejected.
    ///
    /// Sizing is one-way: once resized, an item never returns to the unset
    /// state that falls back to the decoded natural size. `resize(id, 0, 0)`
    /// yields the minimum size, not the natural one.
    pub fn resize(&mut self, id: &ItemId, width: f64, height: f64) -> bool {
        if !(width.is_finite() && height.is_finite()) {
            warn!(%id, width, height, "resize rejected: non-finite size");
            return false;
        }
        let size = Size::new(width.max(MIN_ITEM_SIZE_PX), height.max(MIN_ITEM_SIZE_PX));
        self.update(id, |item| {
            if item.kind() != ItemKind::Image {
                return false;
            }
            item.size = size;
            true
        })
    }

    /// Rotate an item by one quarter turn clockwise.
    pub fn rotate(&mut self, id: &ItemId) -> bool {
        self.update(id, |item| {
            item.rotation = item.rotation.quarter_turn();
            true
        })
    }

    // --- Flags ---

    /// Make `id` the only selected item, or clear the selection with `None`.
    /// An unknown id changes nothing.
    pub fn select(&mut self, id: Option<&ItemId>) -> bool {
        let current = self.items.iter().position(|item| item.flags.selected);
        let target = match id {
            Some(id) => match self.position_of(id) {
                Some(idx) => Some(idx),
                None => return false,
            },
            None => None,
        };
        if current == target {
            return false;
        }
        let items = Arc::make_mut(&mut self.items);
        for (idx, item) in items.iter_mut().enumerate() {
            item.flags.selected = Some(idx) == target;
        }
        self.revision += 1;
        true
    }

    pub fn set_hovered(&mut self, id: &ItemId, hovered: bool) -> bool {
        self.update(id, |item| {
            let changed = item.flags.hovered != hovered;
            item.flags.hovered = hovered;
            changed
        })
    }

    pub fn set_dragging(&mut self, id: &ItemId, dragging: bool) -> bool {
        self.update(id, |item| {
            let changed = item.flags.dragging != dragging;
            item.flags.dragging = dragging;
            changed
        })
    }

    // --- Removal ---

    /// Remove an item, returning it if it was present.
    pub fn remove(&mut self, id: &ItemId) -> Option<Item> {
        let idx = self.position_of(id)?;
        let removed = Arc::make_mut(&mut self.items).remove(idx);
        self.revision += 1;
        Some(removed)
    }

    // --- Viewport ---

    /// Record the host's current viewport. Later moves convert against it.
    pub fn set_viewport(&mut self, viewport: Viewport) -> bool {
        if self.viewport == viewport {
            return false;
        }
        if viewport.is_degenerate() {
            warn!(width = viewport.width, height = viewport.height, "degenerate viewport reported");
        }
        self.viewport = viewport;
        self.revision += 1;
        true
    }

    // --- Queries ---

    #[must_use]
    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    #[must_use]
    pub fn revision(&self) -> u64 {
        self.revision
    }

    #[must_use]
    pub fn get(&self, id: &ItemId) -> Option<&Item> {
        self.items.iter().find(|item| item.id == *id)
    }

    /// The id of the selected item, if any.
    #[must_use]
    pub fn selected(&self) -> Option<ItemId> {
        self.items.iter().find(|item| item.flags.selected).map(|item| item.id)
    }

    /// Cheap immutable view of the current state.
    #[must_use]
    pub fn snapshot(&self) -> Snapshot {
        Snapshot { revision: self.revision, viewport: self.viewport, items: Arc::clone(&self.items) }
    }

    /// Derived geometry of every item, in store order.
    #[must_use]
    pub fn report(&self) -> Vec<ReportEntry> {
        report::report(&self.items)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    fn position_of(&self, id: &ItemId) -> Option<usize> {
        self.items.iter().position(|item| item.id == *id)
    }

    /// Apply `f` to the item with `id`. `f` returns whether it changed
    /// anything; only then is the revision bumped.
    fn update<F>(&mut self, id: &ItemId, f: F) -> bool
    where
        F: FnOnce(&mut Item) -> bool,
    {
        let Some(idx) = self.position_of(id) else {
            return false;
        };
        let Some(item) = Arc::make_mut(&mut self.items).get_mut(idx) else {
            return false;
        };
        let changed = f(item);
        if changed {
            self.revision += 1;
        }
        changed
    }
}
