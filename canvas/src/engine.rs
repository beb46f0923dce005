use tracing::{debug, info, warn};

use crate::doc::{DecodeTask, ImagePayload, ItemId, ItemStore, Snapshot, SourceFile};
use crate::input::{Button, Hit, Interaction, InteractionKind};
use crate::report::ReportEntry;
use crate::viewport::{Point, Viewport};

#[cfg(test)]
#[path = "engine_test.rs"]
mod engine_test;

/// A single mutation request. Every host event, and every decode completion,
/// reaches the store as one of these, applied strictly in arrival order.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    AddImages { files: Vec<SourceFile> },
    AddText { text: String },
    /// Move an item to an absolute pixel offset within the viewport.
    Move { id: ItemId, to: Point },
    Resize { id: ItemId, width: f64, height: f64 },
    Rotate { id: ItemId },
    Select { id: Option<ItemId> },
    SetHovered { id: ItemId, hovered: bool },
    SetDragging { id: ItemId, dragging: bool },
    SetViewport(Viewport),
    Remove { id: ItemId },
    ImageDecoded { id: ItemId, payload: ImagePayload },
    ImageDecodeFailed { id: ItemId, reason: String },
}

/// Actions returned from command handlers for the host to process.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Decode this file and send the outcome back as `ImageDecoded` or
    /// `ImageDecodeFailed`.
    DecodeRequested(DecodeTask),
    /// The store changed; re-render from a fresh snapshot.
    RenderNeeded,
}

/// Core engine state: the item store plus the active interaction strategy.
#[derive(Debug)]
pub struct EngineCore {
    pub store: ItemStore,
    interaction: Box<dyn Interaction>,
}

impl Default for EngineCore {
    fn default() -> Self {
        Self::new(Viewport::default(), InteractionKind::default(), false)
    }
}

impl EngineCore {
    #[must_use]
    pub fn new(viewport: Viewport, kind: InteractionKind, clamp_to_viewport: bool) -> Self {
        Self { store: ItemStore::with_viewport(viewport), interaction: kind.build(clamp_to_viewport) }
    }

    /// Swap the interaction strategy. Any in-progress gesture is dropped.
    pub fn set_interaction(&mut self, interaction: Box<dyn Interaction>) {
        debug!(from = %self.interaction.kind(), to = %interaction.kind(), "interaction strategy changed");
        self.interaction = interaction;
    }

    #[must_use]
    pub fn interaction(&self) -> &dyn Interaction {
        self.interaction.as_ref()
    }

    // --- Commands ---

    /// Apply one command to completion.
    pub fn apply(&mut self, command: Command) -> Vec<Action> {
        match command {
            Command::AddImages { files } => {
                let tasks = self.store.add_images(files);
                if tasks.is_empty() {
                    return Vec::new();
                }
                info!(count = tasks.len(), "image items added");
                let mut actions: Vec<Action> = tasks.into_iter().map(Action::DecodeRequested).collect();
                actions.push(Action::RenderNeeded);
                actions
            }
            Command::AddText { text } => {
                let id = self.store.add_text(text);
                info!(%id, "text item added");
                vec![Action::RenderNeeded]
            }
            Command::Move { id, to } => match self.store.move_to(&id, to) {
                Ok(changed) => self.changed(changed, &id, "move"),
                Err(e) => {
                    warn!(%id, error = %e, "move rejected; position unchanged");
                    Vec::new()
                }
            },
            Command::Resize { id, width, height } => {
                let changed = self.store.resize(&id, width, height);
                self.changed(changed, &id, "resize")
            }
            Command::Rotate { id } => {
                let changed = self.store.rotate(&id);
                self.changed(changed, &id, "rotate")
            }
            Command::Select { id } => {
                if self.store.select(id.as_ref()) {
                    vec![Action::RenderNeeded]
                } else {
                    Vec::new()
                }
            }
            Command::SetHovered { id, hovered } => {
                let changed = self.store.set_hovered(&id, hovered);
                self.changed(changed, &id, "hover")
            }
            Command::SetDragging { id, dragging } => {
                let changed = self.store.set_dragging(&id, dragging);
                self.changed(changed, &id, "dragging")
            }
            Command::SetViewport(viewport) => {
                if self.store.set_viewport(viewport) {
                    debug!(width = viewport.width, height = viewport.height, "viewport updated");
                    vec![Action::RenderNeeded]
                } else {
                    Vec::new()
                }
            }
            Command::Remove { id } => {
                if self.store.remove(&id).is_some() {
                    info!(%id, "item removed");
                    vec![Action::RenderNeeded]
                } else {
                    debug!(%id, "remove ignored; unknown item");
                    Vec::new()
                }
            }
            Command::ImageDecoded { id, payload } => {
                let changed = self.store.apply_decoded(&id, Ok(payload));
                self.changed(changed, &id, "decode")
            }
            Command::ImageDecodeFailed { id, reason } => {
                warn!(%id, %reason, "image decode failed");
                let changed = self.store.apply_decoded(&id, Err(reason));
                self.changed(changed, &id, "decode")
            }
        }
    }

    /// Apply a batch of commands in order and merge their actions.
    pub fn apply_all(&mut self, commands: Vec<Command>) -> Vec<Action> {
        let mut actions = Vec::new();
        for command in commands {
            for action in self.apply(command) {
                if action == Action::RenderNeeded && actions.contains(&Action::RenderNeeded) {
                    continue;
                }
                actions.push(action);
            }
        }
        actions
    }

    fn changed(&self, changed: bool, id: &ItemId, op: &'static str) -> Vec<Action> {
        if changed {
            vec![Action::RenderNeeded]
        } else {
            if self.store.get(id).is_none() {
                debug!(%id, op, "ignored; unknown item");
            }
            Vec::new()
        }
    }

    // --- Pointer input ---

    pub fn on_pointer_down(&mut self, target: Option<Hit>, screen: Point, button: Button) -> Vec<Action> {
        let commands = self.interaction.pointer_down(target, screen, button, &self.store);
        self.apply_all(commands)
    }

    pub fn on_pointer_move(&mut self, screen: Point) -> Vec<Action> {
        let commands = self.interaction.pointer_move(screen, &self.store);
        self.apply_all(commands)
    }

    pub fn on_pointer_up(&mut self, screen: Point) -> Vec<Action> {
        let commands = self.interaction.pointer_up(screen, &self.store);
        self.apply_all(commands)
    }

    pub fn on_pointer_enter(&mut self, id: ItemId) -> Vec<Action> {
        let commands = self.interaction.pointer_enter(id);
        self.apply_all(commands)
    }

    pub fn on_pointer_leave(&mut self, id: ItemId) -> Vec<Action> {
        let commands = self.interaction.pointer_leave(id);
        self.apply_all(commands)
    }

    // --- Queries ---

    #[must_use]
    pub fn snapshot(&self) -> Snapshot {
        self.store.snapshot()
    }

    #[must_use]
    pub fn report(&self) -> Vec<ReportEntry> {
        self.store.report()
    }

    /// The currently selected item, if any.
    #[must_use]
    pub fn selection(&self) -> Option<ItemId> {
        self.store.selected()
    }
}
