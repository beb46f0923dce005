//! Editor session: single-consumer event loop around the engine core.
//!
//! DESIGN
//! ======
//! Every host event is a [`SessionMessage`] on one bounded mpsc queue. A
//! single task owns the [`EngineCore`] and applies messages strictly in
//! arrival order, so the store never needs a lock.
//!
//! Image decodes run on the blocking pool, at most `decode_concurrency` at a
//! time, tracked in a `JoinSet` owned by the loop. The loop selects over the
//! queue and the set, so completions are applied by the same task as host
//! events. They may arrive in any order; each one patches exactly the item it
//! was issued for, and a completion for a removed item is dropped.
//!
//! After each message that changes the store, the loop publishes a fresh
//! [`Snapshot`] on a watch channel. Once every [`EditorHandle`] is dropped
//! the loop applies the rest of the queue, waits for every outstanding
//! decode (including ones started by that tail), then stops.

#[cfg(test)]
#[path = "session_test.rs"]
mod session_test;

use std::sync::Arc;

use canvas::consts::REPORT_HEADER;
use canvas::doc::{DecodeTask, ImagePayload, ItemId, Snapshot, SourceFile};
use canvas::engine::{Action, Command, EngineCore};
use canvas::input::{Button, Hit};
use canvas::report::ReportEntry;
use canvas::viewport::{Point, Viewport};
use tokio::sync::{Semaphore, mpsc, oneshot, watch};
use tokio::task::{JoinError, JoinHandle, JoinSet};
use tracing::{debug, info, warn};

use crate::config::EditorConfig;
use crate::decode::ImageDecoder;

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    #[error("editor session closed")]
    Closed,
}

/// Messages consumed by the session loop.
#[derive(Debug)]
pub enum SessionMessage {
    Command(Command),
    PointerDown { target: Option<Hit>, screen: Point, button: Button },
    PointerMove { screen: Point },
    PointerUp { screen: Point },
    PointerEnter { id: ItemId },
    PointerLeave { id: ItemId },
    /// Log the position report and send it back.
    Report { reply: oneshot::Sender<Vec<ReportEntry>> },
    /// Reply with the snapshot as of this point in the queue.
    Snapshot { reply: oneshot::Sender<Snapshot> },
}

/// Cloneable producer side of a running session.
#[derive(Debug, Clone)]
pub struct EditorHandle {
    tx: mpsc::Sender<SessionMessage>,
    snapshots: watch::Receiver<Snapshot>,
}

/// Spawn the session loop. Returns the producer handle and the loop's join
/// handle; the loop ends after every handle clone is dropped.
#[must_use]
pub fn spawn_session(config: &EditorConfig, decoder: Arc<dyn ImageDecoder>) -> (EditorHandle, JoinHandle<()>) {
    let (tx, rx) = mpsc::channel(config.queue_capacity.max(1));
    let core = EngineCore::new(config.initial_viewport, config.interaction, config.clamp_drag_to_viewport);
    let (snapshot_tx, snapshot_rx) = watch::channel(core.snapshot());

    let session = SessionLoop {
        core,
        decoder,
        permits: Arc::new(Semaphore::new(config.decode_concurrency.max(1))),
        decodes: JoinSet::new(),
        snapshots: snapshot_tx,
    };
    info!(
        interaction = %config.interaction,
        queue_capacity = config.queue_capacity,
        decode_concurrency = config.decode_concurrency,
        "editor session started"
    );
    let join = tokio::spawn(session.run(rx));
    (EditorHandle { tx, snapshots: snapshot_rx }, join)
}

impl EditorHandle {
    async fn send(&self, message: SessionMessage) -> Result<(), SessionError> {
        self.tx.send(message).await.map_err(|_| SessionError::Closed)
    }

    async fn command(&self, command: Command) -> Result<(), SessionError> {
        self.send(SessionMessage::Command(command)).await
    }

    /// Queue one pending image item per file. Decoding starts once the loop
    /// applies the command.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Closed`] if the session loop has stopped.
    pub async fn add_images(&self, files: Vec<SourceFile>) -> Result<(), SessionError> {
        self.command(Command::AddImages { files }).await
    }

    /// # Errors
    ///
    /// Returns [`SessionError::Closed`] if the session loop has stopped.
    pub async fn add_text(&self, text: impl Into<String>) -> Result<(), SessionError> {
        self.command(Command::AddText { text: text.into() }).await
    }

    /// Move an item to a pixel offset in the viewport current at apply time.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Closed`] if the session loop has stopped.
    pub async fn move_item(&self, id: ItemId, to: Point) -> Result<(), SessionError> {
        self.command(Command::Move { id, to }).await
    }

    /// # Errors
    ///
    /// Returns [`SessionError::Closed`] if the session loop has stopped.
    pub async fn resize(&self, id: ItemId, width: f64, height: f64) -> Result<(), SessionError> {
        self.command(Command::Resize { id, width, height }).await
    }

    /// # Errors
    ///
    /// Returns [`SessionError::Closed`] if the session loop has stopped.
    pub async fn rotate(&self, id: ItemId) -> Result<(), SessionError> {
        self.command(Command::Rotate { id }).await
    }

    /// # Errors
    ///
    /// Returns [`SessionError::Closed`] if the session loop has stopped.
    pub async fn select(&self, id: Option<ItemId>) -> Result<(), SessionError> {
        self.command(Command::Select { id }).await
    }

    /// # Errors
    ///
    /// Returns [`SessionError::Closed`] if the session loop has stopped.
    pub async fn set_hovered(&self, id: ItemId, hovered: bool) -> Result<(), SessionError> {
        self.command(Command::SetHovered { id, hovered }).await
    }

    /// # Errors
    ///
    /// Returns [`SessionError::Closed`] if the session loop has stopped.
    pub async fn set_dragging(&self, id: ItemId, dragging: bool) -> Result<(), SessionError> {
        self.command(Command::SetDragging { id, dragging }).await
    }

    /// # Errors
    ///
    /// Returns [`SessionError::Closed`] if the session loop has stopped.
    pub async fn set_viewport(&self, width: f64, height: f64) -> Result<(), SessionError> {
        self.command(Command::SetViewport(Viewport::new(width, height))).await
    }

    /// # Errors
    ///
    /// Returns [`SessionError::Closed`] if the session loop has stopped.
    pub async fn remove(&self, id: ItemId) -> Result<(), SessionError> {
        self.command(Command::Remove { id }).await
    }

    /// # Errors
    ///
    /// Returns [`SessionError::Closed`] if the session loop has stopped.
    pub async fn pointer_down(&self, target: Option<Hit>, screen: Point, button: Button) -> Result<(), SessionError> {
        self.send(SessionMessage::PointerDown { target, screen, button }).await
    }

    /// # Errors
    ///
    /// Returns [`SessionError::Closed`] if the session loop has stopped.
    pub async fn pointer_move(&self, screen: Point) -> Result<(), SessionError> {
        self.send(SessionMessage::PointerMove { screen }).await
    }

    /// # Errors
    ///
    /// Returns [`SessionError::Closed`] if the session loop has stopped.
    pub async fn pointer_up(&self, screen: Point) -> Result<(), SessionError> {
        self.send(SessionMessage::PointerUp { screen }).await
    }

    /// # Errors
    ///
    /// Returns [`SessionError::Closed`] if the session loop has stopped.
    pub async fn pointer_enter(&self, id: ItemId) -> Result<(), SessionError> {
        self.send(SessionMessage::PointerEnter { id }).await
    }

    /// # Errors
    ///
    /// Returns [`SessionError::Closed`] if the session loop has stopped.
    pub async fn pointer_leave(&self, id: ItemId) -> Result<(), SessionError> {
        self.send(SessionMessage::PointerLeave { id }).await
    }

    /// Log and return the position report, ordered after every message this
    /// handle sent earlier.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Closed`] if the session loop has stopped.
    pub async fn report(&self) -> Result<Vec<ReportEntry>, SessionError> {
        let (reply, rx) = oneshot::channel();
        self.send(SessionMessage::Report { reply }).await?;
        rx.await.map_err(|_| SessionError::Closed)
    }

    /// Snapshot after every message this handle sent earlier has been applied.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Closed`] if the session loop has stopped.
    pub async fn fresh_snapshot(&self) -> Result<Snapshot, SessionError> {
        let (reply, rx) = oneshot::channel();
        self.send(SessionMessage::Snapshot { reply }).await?;
        rx.await.map_err(|_| SessionError::Closed)
    }

    /// Most recently published snapshot, without waiting on the queue.
    #[must_use]
    pub fn snapshot(&self) -> Snapshot {
        self.snapshots.borrow().clone()
    }

    /// Receiver that wakes on every published snapshot.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Snapshot> {
        self.snapshots.clone()
    }
}

/// Outcome of one decode: the item it was issued for and either the payload
/// or the failure reason.
type DecodeOutcome = (ItemId, Result<ImagePayload, String>);

struct SessionLoop {
    core: EngineCore,
    decoder: Arc<dyn ImageDecoder>,
    permits: Arc<Semaphore>,
    decodes: JoinSet<DecodeOutcome>,
    snapshots: watch::Sender<Snapshot>,
}

impl SessionLoop {
    async fn run(mut self, mut rx: mpsc::Receiver<SessionMessage>) {
        let mut open = true;
        loop {
            tokio::select! {
                message = rx.recv(), if open => match message {
                    Some(message) => self.handle(message),
                    None => {
                        debug!(pending = self.decodes.len(), "all handles dropped; draining decodes");
                        open = false;
                    }
                },
                Some(joined) = self.decodes.join_next(), if !self.decodes.is_empty() => self.finish_decode(joined),
                else => break,
            }
        }
        info!(items = self.core.store.len(), "editor session stopped");
    }

    fn handle(&mut self, message: SessionMessage) {
        let actions = match message {
            SessionMessage::Command(command) => self.core.apply(command),
            SessionMessage::PointerDown { target, screen, button } => self.core.on_pointer_down(target, screen, button),
            SessionMessage::PointerMove { screen } => self.core.on_pointer_move(screen),
            SessionMessage::PointerUp { screen } => self.core.on_pointer_up(screen),
            SessionMessage::PointerEnter { id } => self.core.on_pointer_enter(id),
            SessionMessage::PointerLeave { id } => self.core.on_pointer_leave(id),
            SessionMessage::Report { reply } => {
                let report = self.core.report();
                info!("{REPORT_HEADER}");
                for entry in &report {
                    info!("{entry}");
                }
                if reply.send(report).is_err() {
                    debug!("report requester went away");
                }
                return;
            }
            SessionMessage::Snapshot { reply } => {
                if reply.send(self.core.snapshot()).is_err() {
                    debug!("snapshot requester went away");
                }
                return;
            }
        };
        self.dispatch(actions);
    }

    fn dispatch(&mut self, actions: Vec<Action>) {
        let mut render = false;
        for action in actions {
            match action {
                Action::DecodeRequested(task) => self.spawn_decode(task),
                Action::RenderNeeded => render = true,
            }
        }
        if render {
            self.snapshots.send_replace(self.core.snapshot());
        }
    }

    fn spawn_decode(&mut self, task: DecodeTask) {
        let decoder = Arc::clone(&self.decoder);
        let permits = Arc::clone(&self.permits);

        self.decodes.spawn(async move {
            let id = task.id;
            let outcome = match permits.acquire_owned().await {
                Ok(permit) => {
                    let joined = tokio::task::spawn_blocking(move || {
                        let _permit = permit;
                        decoder.decode(&task.file)
                    })
                    .await;
                    match joined {
                        Ok(result) => result.map_err(|e| e.to_string()),
                        Err(e) => Err(format!("decode task failed: {e}")),
                    }
                }
                Err(e) => Err(format!("decode permits closed: {e}")),
            };
            (id, outcome)
        });
    }

    fn finish_decode(&mut self, joined: Result<DecodeOutcome, JoinError>) {
        let (id, outcome) = match joined {
            Ok(done) => done,
            Err(e) => {
                warn!(error = %e, "decode task lost");
                return;
            }
        };
        let command = match outcome {
            Ok(payload) => {
                debug!(%id, width = payload.natural_width, height = payload.natural_height, "image decoded");
                Command::ImageDecoded { id, payload }
            }
            Err(reason) => Command::ImageDecodeFailed { id, reason },
        };
        let actions = self.core.apply(command);
        self.dispatch(actions);
    }
}
