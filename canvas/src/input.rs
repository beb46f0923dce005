//! Input model: hit targets, mouse buttons, and the interaction strategies.
//!
//! The host performs hit-testing against what it painted and reports a
//! [`Hit`] (or a background press) together with the pointer position in
//! viewport pixels. An [`Interaction`] strategy tracks the gesture between
//! pointer-down and pointer-up and turns it into store [`Command`]s.
//!
//! Two strategies exist and they differ only in how gestures map to
//! commands; both end up moving items through `Command::Move` with an
//! absolute pixel offset, so the store never knows which one is active.
//!
//! - [`HelperDrag`] reports the item position continuously while dragging,
//!   optionally clamped to the viewport rectangle.
//! - [`NativeDrag`] mirrors native drag-and-drop: the item is committed once
//!   on drop, and hover, selection, resize, and rotate are supported.

#[cfg(test)]
#[path = "input_test.rs"]
mod input_test;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::doc::{ItemId, ItemStore, Size};
use crate::engine::Command;
use crate::viewport::{Point, to_pixels};

/// Which part of an item the pointer landed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitPart {
    Body,
    ResizeHandle,
    RotateHandle,
}

/// Result of the host's hit test.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hit {
    pub item_id: ItemId,
    pub part: HitPart,
}

impl Hit {
    #[must_use]
    pub fn body(item_id: ItemId) -> Self {
        Self { item_id, part: HitPart::Body }
    }
}

/// Mouse button identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Button {
    /// Left mouse button (or single-finger tap).
    Primary,
    /// Middle mouse button (scroll wheel click).
    Middle,
    /// Right mouse button (or two-finger tap).
    Secondary,
}

/// Selects an interaction strategy.
///
/// Names are matched case-insensitively, both by [`FromStr`] and when
/// deserializing; they always serialize in lowercase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum InteractionKind {
    /// Continuous drag helper. See [`HelperDrag`].
    #[default]
    Helper,
    /// Native drag-and-drop with hover, select, resize, and rotate. See [`NativeDrag`].
    Native,
}

impl InteractionKind {
    /// Construct the strategy for this kind.
    #[must_use]
    pub fn build(self, clamp_to_viewport: bool) -> Box<dyn Interaction> {
        match self {
            Self::Helper => Box::new(HelperDrag::new(clamp_to_viewport)),
            Self::Native => Box::new(NativeDrag::new()),
        }
    }
}

/// Error returned when parsing an unknown [`InteractionKind`] name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown interaction mode: {0} (expected `helper` or `native`)")]
pub struct UnknownInteraction(pub String);

impl FromStr for InteractionKind {
    type Err = UnknownInteraction;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "helper" => Ok(Self::Helper),
            "native" => Ok(Self::Native),
            other => Err(UnknownInteraction(other.to_owned())),
        }
    }
}

impl TryFrom<String> for InteractionKind {
    type Error = UnknownInteraction;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl fmt::Display for InteractionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Helper => f.write_str("helper"),
            Self::Native => f.write_str("native"),
        }
    }
}

/// Translates host pointer events into store commands.
///
/// Implementations read the store to learn where an item currently sits but
/// never mutate it; the engine applies the returned commands in order.
pub trait Interaction: fmt::Debug + Send {
    fn kind(&self) -> InteractionKind;

    /// Pointer pressed. `target` is `None` for a press on the background.
    fn pointer_down(&mut self, target: Option<Hit>, screen: Point, button: Button, store: &ItemStore) -> Vec<Command>;

    fn pointer_move(&mut self, screen: Point, store: &ItemStore) -> Vec<Command>;

    fn pointer_up(&mut self, screen: Point, store: &ItemStore) -> Vec<Command>;

    fn pointer_enter(&mut self, _id: ItemId) -> Vec<Command> {
        Vec::new()
    }

    fn pointer_leave(&mut self, _id: ItemId) -> Vec<Command> {
        Vec::new()
    }

    /// The gesture currently being tracked.
    fn gesture(&self) -> &Gesture;
}

/// Gesture tracked between pointer-down and pointer-up.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Gesture {
    /// No gesture in progress; waiting for the next pointer-down.
    #[default]
    Idle,
    /// Continuous drag: the item follows the pointer on every move.
    Dragging {
        id: ItemId,
        /// Pointer position at pointer-down.
        start: Point,
        /// Item top-left in pixels at pointer-down.
        origin: Point,
    },
    /// Native drag: the item is only committed on drop.
    Carrying {
        id: ItemId,
        /// Pointer offset from the item's top-left at pointer-down.
        grab: Point,
        /// Whether the pointer has moved, turning the press into a drag.
        started: bool,
    },
    /// Resize-handle drag.
    Resizing {
        id: ItemId,
        start: Point,
        /// Item size at pointer-down.
        orig: Size,
    },
}

/// Commands that end an abandoned gesture. Only drags raise a flag that
/// must be lowered again.
fn release(gesture: Gesture) -> Vec<Command> {
    match gesture {
        Gesture::Dragging { id, .. } | Gesture::Carrying { id, started: true, .. } => {
            vec![Command::SetDragging { id, dragging: false }]
        }
        Gesture::Idle | Gesture::Carrying { started: false, .. } | Gesture::Resizing { .. } => Vec::new(),
    }
}

fn item_origin(store: &ItemStore, id: &ItemId) -> Option<Point> {
    store.get(id).map(|item| to_pixels(item.position, store.viewport()))
}

// =============================================================
// HelperDrag
// =============================================================

/// Continuous drag helper: every pointer move repositions the item.
#[derive(Debug, Default)]
pub struct HelperDrag {
    clamp_to_viewport: bool,
    gesture: Gesture,
}

impl HelperDrag {
    #[must_use]
    pub fn new(clamp_to_viewport: bool) -> Self {
        Self { clamp_to_viewport, gesture: Gesture::Idle }
    }

    fn constrain(&self, pt: Point, store: &ItemStore) -> Point {
        let viewport = store.viewport();
        if !self.clamp_to_viewport || viewport.is_degenerate() {
            return pt;
        }
        Point::new(pt.x.clamp(0.0, viewport.width), pt.y.clamp(0.0, viewport.height))
    }
}

impl Interaction for HelperDrag {
    fn kind(&self) -> InteractionKind {
        InteractionKind::Helper
    }

    fn pointer_down(&mut self, target: Option<Hit>, screen: Point, button: Button, store: &ItemStore) -> Vec<Command> {
        let mut commands = release(std::mem::take(&mut self.gesture));
        if button != Button::Primary {
            return commands;
        }
        let Some(Hit { item_id: id, part: HitPart::Body }) = target else {
            return commands;
        };
        let Some(origin) = item_origin(store, &id) else {
            return commands;
        };
        self.gesture = Gesture::Dragging { id, start: screen, origin };
        commands.push(Command::SetDragging { id, dragging: true });
        commands
    }

    fn pointer_move(&mut self, screen: Point, store: &ItemStore) -> Vec<Command> {
        let Gesture::Dragging { id, start, origin } = self.gesture else {
            return Vec::new();
        };
        let to = Point::new(origin.x + screen.x - start.x, origin.y + screen.y - start.y);
        vec![Command::Move { id, to: self.constrain(to, store) }]
    }

    fn pointer_up(&mut self, _screen: Point, _store: &ItemStore) -> Vec<Command> {
        release(std::mem::take(&mut self.gesture))
    }

    fn gesture(&self) -> &Gesture {
        &self.gesture
    }
}

// =============================================================
// NativeDrag
// =============================================================

/// Native drag-and-drop: commit on drop, plus hover/select/resize/rotate.
#[derive(Debug, Default)]
pub struct NativeDrag {
    gesture: Gesture,
}

impl NativeDrag {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl Interaction for NativeDrag {
    fn kind(&self) -> InteractionKind {
        InteractionKind::Native
    }

    fn pointer_down(&mut self, target: Option<Hit>, screen: Point, button: Button, store: &ItemStore) -> Vec<Command> {
        let mut commands = release(std::mem::take(&mut self.gesture));
        if button != Button::Primary {
            return commands;
        }
        let Some(hit) = target else {
            commands.push(Command::Select { id: None });
            return commands;
        };
        let Some(item) = store.get(&hit.item_id) else {
            return commands;
        };
        let id = item.id;
        commands.push(Command::Select { id: Some(id) });

        match hit.part {
            HitPart::Body => {
                let origin = to_pixels(item.position, store.viewport());
                let grab = Point::new(screen.x - origin.x, screen.y - origin.y);
                self.gesture = Gesture::Carrying { id, grab, started: false };
            }
            HitPart::ResizeHandle => {
                self.gesture = Gesture::Resizing { id, start: screen, orig: item.effective_size() };
            }
            HitPart::RotateHandle => commands.push(Command::Rotate { id }),
        }
        commands
    }

    fn pointer_move(&mut self, screen: Point, _store: &ItemStore) -> Vec<Command> {
        match &mut self.gesture {
            Gesture::Carrying { id, started, .. } if !*started => {
                *started = true;
                vec![Command::SetDragging { id: *id, dragging: true }]
            }
            Gesture::Resizing { id, start, orig } => vec![Command::Resize {
                id: *id,
                width: orig.width + screen.x - start.x,
                height: orig.height + screen.y - start.y,
            }],
            _ => Vec::new(),
        }
    }

    fn pointer_up(&mut self, screen: Point, _store: &ItemStore) -> Vec<Command> {
        match std::mem::take(&mut self.gesture) {
            Gesture::Carrying { id, grab, started: true } => vec![
                Command::Move { id, to: Point::new(screen.x - grab.x, screen.y - grab.y) },
                Command::SetDragging { id, dragging: false },
            ],
            _ => Vec::new(),
        }
    }

    fn pointer_enter(&mut self, id: ItemId) -> Vec<Command> {
        vec![Command::SetHovered { id, hovered: true }]
    }

    fn pointer_leave(&mut self, id: ItemId) -> Vec<Command> {
        vec![Command::SetHovered { id, hovered: false }]
    }

    fn gesture(&self) -> &Gesture {
        &self.gesture
    }
}
