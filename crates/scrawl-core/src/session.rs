//! Drawing session.
//!
//! The engine facade. Owns the store, router, scheduler and local tool
//! state, and wires them together:
//!
//! - input → [`InteractionState`] → record → store (+ paint) → router
//! - transport → router → store (+ paint)
//! - scheduler → sweep → store
//!
//! Every mutating entry point asks [`SessionPolicy`] first. Nothing here
//! panics or blocks; collaborator trouble becomes a log line and a no-op.

use crate::actor::Actor;
use crate::broadcast::{BroadcastRouter, RouteOutcome};
use crate::clock::{Clock, SystemClock, Timestamp};
use crate::color::{HostColor, RgbColor};
use crate::config::{ConfigError, SessionConfig};
use crate::drawing::{
    DrawingId, DrawingRecord, Geometry, LineTexture, SymbolGeometry, SymbolSize,
};
use crate::expiry::{Cadence, ExpiryScheduler, sweep};
use crate::input::{ActivationKeys, KeyEvent, PointerEvent, ToolIntent};
use crate::paint::{Variant, geometry_ops};
use crate::policy::SessionPolicy;
use crate::store::DrawingStore;
use crate::surface::{DrawSurface, ShapeHandle, place, release};
use crate::tools::{InteractionState, ToolMode, ToolOption, ToolSettings};
use crate::transport::Transport;
use kurbo::Point;
use std::fmt;
use thiserror::Error;

/// A permission-gated action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Draw,
    EraseAll,
    EraseOwn,
    TimedErase,
    Persist,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Action::Draw => "draw",
            Action::EraseAll => "erase all drawings",
            Action::EraseOwn => "erase own drawings",
            Action::TimedErase => "toggle timed erase",
            Action::Persist => "persist drawings",
        };
        f.write_str(name)
    }
}

/// A declined action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("Not allowed to {action}")]
pub struct Denied {
    pub action: Action,
}

/// Short status messages for the host UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notice {
    PermissionDenied(Action),
    ErasedAll,
    ErasedOwn,
    /// Timed erase switched on (`true`) or off.
    TimedErase(bool),
}

/// Something the host may want to react to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    Notice(Notice),
    DrawingAdded(DrawingId),
    DrawingRemoved(DrawingId),
}

/// The shared annotation layer as seen by one participant.
pub struct DrawingSession<S: DrawSurface> {
    actor: Actor,
    config: SessionConfig,
    policy: SessionPolicy,
    store: DrawingStore<S>,
    router: BroadcastRouter,
    clock: Box<dyn Clock>,
    scheduler: ExpiryScheduler,
    interaction: InteractionState,
    settings: ToolSettings,
    keys: ActivationKeys,
    timed_erase: bool,
    /// Translucent shape for the symbol cursor or the in-progress stroke.
    preview: Option<ShapeHandle>,
    events: Vec<SessionEvent>,
}

impl<S: DrawSurface> DrawingSession<S> {
    /// A local-only session on the system clock. Use
    /// [`with_transport`](Self::with_transport) to share drawings.
    pub fn new(actor: Actor, config: SessionConfig, surface: S) -> Self {
        let clock: Box<dyn Clock> = Box::new(SystemClock);
        let mut scheduler = ExpiryScheduler::from_config(&config);
        scheduler.start(clock.now(), Cadence::Slow);

        let settings = ToolSettings {
            width: config.clamp_width(config.default_stroke_width),
            color: actor.color,
            ..ToolSettings::default()
        };

        let mut router = BroadcastRouter::new(actor.id.clone(), None);
        router.set_width_bounds(&config);

        Self {
            router,
            policy: SessionPolicy::from_config(&config),
            keys: ActivationKeys::from_config(&config),
            store: DrawingStore::new(surface),
            interaction: InteractionState::default(),
            timed_erase: false,
            preview: None,
            events: Vec::new(),
            actor,
            config,
            clock,
            scheduler,
            settings,
        }
    }

    pub fn with_transport(mut self, transport: Box<dyn Transport>) -> Self {
        self.router.set_transport(Some(transport));
        self
    }

    /// Swap the clock. The sweep deadline restarts from the new clock's now.
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self.scheduler.start(self.clock.now(), self.cadence());
        self
    }

    pub fn actor(&self) -> &Actor {
        &self.actor
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn policy(&self) -> &SessionPolicy {
        &self.policy
    }

    pub fn store(&self) -> &DrawingStore<S> {
        &self.store
    }

    pub fn router(&self) -> &BroadcastRouter {
        &self.router
    }

    pub fn scheduler(&self) -> &ExpiryScheduler {
        &self.scheduler
    }

    pub fn interaction(&self) -> &InteractionState {
        &self.interaction
    }

    pub fn settings(&self) -> &ToolSettings {
        &self.settings
    }

    pub fn is_armed(&self) -> bool {
        self.interaction.is_armed()
    }

    pub fn is_timed_erase(&self) -> bool {
        self.timed_erase
    }

    /// Whether the local actor may turn drawings into permanent scene
    /// content. The conversion itself is up to the host.
    pub fn can_persist(&self) -> bool {
        self.policy.can_persist(&self.actor)
    }

    /// Drain queued events.
    pub fn take_events(&mut self) -> Vec<SessionEvent> {
        std::mem::take(&mut self.events)
    }

    // --- tool activation ---

    /// Arm the tool.
    pub fn arm(&mut self) -> Result<(), Denied> {
        self.require(Action::Draw)?;
        if self.interaction.arm() {
            log::debug!("Re-armed while drawing, discarded stroke");
        }
        self.refresh_preview();
        Ok(())
    }

    /// Disarm, committing an in-progress stroke or box.
    pub fn disarm(&mut self) -> Option<DrawingId> {
        let geometry = self.interaction.disarm();
        self.clear_preview();
        geometry.and_then(|geometry| self.commit(geometry))
    }

    /// Abort the in-progress stroke or box. The tool stays armed.
    pub fn cancel(&mut self) {
        self.interaction.cancel();
        self.refresh_preview();
    }

    /// Feed a pointer event in world coordinates. Returns the id of a record
    /// committed by it, if any.
    pub fn handle_pointer(&mut self, event: PointerEvent) -> Option<DrawingId> {
        match event {
            PointerEvent::Move { position } => {
                if self.interaction.pointer_moved(position) {
                    self.refresh_preview();
                }
                None
            }
            PointerEvent::Down { position } => match self.interaction.pointer_down(position) {
                Some(at) => self.stamp(at),
                None => {
                    self.refresh_preview();
                    None
                }
            },
            PointerEvent::Up { position } => {
                let geometry = self.interaction.pointer_up(position)?;
                self.refresh_preview();
                self.commit(geometry)
            }
        }
    }

    /// Feed a key event through the activation-key adapter.
    pub fn handle_key(&mut self, event: &KeyEvent) -> Option<DrawingId> {
        match self.keys.handle(event, self.interaction.is_armed())? {
            ToolIntent::Arm => {
                // Denial is already queued as a notice.
                let _ = self.arm();
                None
            }
            ToolIntent::Disarm => self.disarm(),
            ToolIntent::Cancel => {
                self.cancel();
                None
            }
        }
    }

    fn stamp(&mut self, at: Point) -> Option<DrawingId> {
        let ToolMode::Symbol(symbol) = self.interaction.mode() else {
            return None;
        };
        match SymbolGeometry::new(at, symbol, self.settings.symbol_size) {
            Ok(geometry) => self.commit(Geometry::Symbol(geometry)),
            Err(e) => {
                log::debug!("Dropping symbol: {}", e);
                None
            }
        }
    }

    /// Turn finished geometry into a record: store, paint, broadcast.
    fn commit(&mut self, geometry: Geometry) -> Option<DrawingId> {
        if self.require(Action::Draw).is_err() {
            return None;
        }
        let now = self.clock.now();
        let record = match DrawingRecord::new(
            DrawingId::generate(),
            self.actor.id.clone(),
            self.actor.display_name.clone(),
            geometry,
            self.settings.style(),
            now,
            self.expiry_for(now),
        ) {
            Ok(record) => record,
            Err(e) => {
                log::debug!("Discarding drawing: {}", e);
                return None;
            }
        };

        let id = record.id().clone();
        if !self.store.insert(record) {
            return None;
        }
        if let Some(record) = self.store.get(&id) {
            self.router.announce_created(record);
        }
        self.events.push(SessionEvent::DrawingAdded(id.clone()));
        Some(id)
    }

    fn expiry_for(&self, now: Timestamp) -> Option<Timestamp> {
        if self.timed_erase {
            Some(now.saturating_add(self.config.timed_erase_timeout()))
        } else {
            self.config.drawing_timeout().map(|timeout| now.saturating_add(timeout))
        }
    }

    // --- toolbar ---

    /// Change mode. Discards an in-progress stroke or box.
    pub fn set_mode(&mut self, mode: ToolMode) {
        if self.interaction.set_mode(mode) {
            log::debug!("Mode changed mid-stroke, discarded");
        }
        self.refresh_preview();
    }

    pub fn set_symbol_size(&mut self, size: SymbolSize) {
        self.settings.symbol_size = size;
        self.refresh_preview();
    }

    /// Set the line width, clamped to the configured range.
    pub fn set_width(&mut self, width: u32) {
        self.settings.width = self.config.clamp_width(width);
        self.refresh_preview();
    }

    pub fn set_color(&mut self, color: RgbColor) {
        self.settings.color = color;
        self.refresh_preview();
    }

    /// Set the color from a host encoding, alpha included. Returns `false`
    /// (and changes nothing) if the color can't be read.
    pub fn set_host_color(&mut self, color: &HostColor) -> bool {
        let Some((rgb, alpha)) = color.normalize() else {
            log::debug!("Ignoring unreadable color {:?}", color);
            return false;
        };
        self.settings.color = rgb;
        self.settings.alpha = alpha;
        self.refresh_preview();
        true
    }

    pub fn set_alpha(&mut self, alpha: u8) {
        self.settings.alpha = alpha;
    }

    pub fn set_texture(&mut self, texture: LineTexture) {
        self.settings.texture = texture;
        self.refresh_preview();
    }

    /// Whether a toolbar toggle should show as active.
    pub fn is_active(&self, option: ToolOption) -> bool {
        match option {
            ToolOption::Mode(mode) => self.interaction.mode() == mode,
            ToolOption::SymbolSize(size) => self.settings.symbol_size == size,
            ToolOption::Texture(texture) => self.settings.texture == texture,
            ToolOption::TimedErase => self.timed_erase,
        }
    }

    // --- erasing ---

    /// Remove every drawing, here and on every other client.
    pub fn erase_all(&mut self) -> Result<usize, Denied> {
        self.require(Action::EraseAll)?;
        let removed = self.store.remove_all();
        self.router.announce_deleted(&self.actor.id, true);
        self.note_removed(&removed);
        self.notify(Notice::ErasedAll);
        log::info!("Erased all {} drawing(s)", removed.len());
        Ok(removed.len())
    }

    /// Remove the local actor's drawings, here and on every other client.
    pub fn erase_own(&mut self) -> Result<usize, Denied> {
        self.require(Action::EraseOwn)?;
        let removed = self.store.remove_by_owner(&self.actor.id);
        self.router.announce_deleted(&self.actor.id, false);
        self.note_removed(&removed);
        self.notify(Notice::ErasedOwn);
        Ok(removed.len())
    }

    /// Flip timed erase. New drawings get the short timeout and the sweep
    /// runs fast while it is on. Returns the new state.
    pub fn toggle_timed_erase(&mut self) -> Result<bool, Denied> {
        self.require(Action::TimedErase)?;
        self.set_timed_erase(!self.timed_erase);
        Ok(self.timed_erase)
    }

    fn set_timed_erase(&mut self, on: bool) {
        self.timed_erase = on;
        self.scheduler.reconfigure(self.clock.now(), self.cadence());
        self.notify(Notice::TimedErase(on));
    }

    fn cadence(&self) -> Cadence {
        if self.timed_erase { Cadence::Fast } else { Cadence::Slow }
    }

    // --- lifecycle ---

    /// Cooperative pump: apply received messages, flush queued outbound
    /// ones, paint anything the surface wasn't ready for, then sweep if due.
    pub fn tick(&mut self) {
        for outcome in self.router.receive(&mut self.store) {
            match outcome {
                RouteOutcome::Inserted(id) => self.events.push(SessionEvent::DrawingAdded(id)),
                RouteOutcome::Removed(ids) => {
                    self.events.extend(ids.into_iter().map(SessionEvent::DrawingRemoved));
                }
                RouteOutcome::SelfEcho | RouteOutcome::Duplicate | RouteOutcome::Malformed => {}
            }
        }
        self.router.flush();
        self.store.paint_pending();

        let now = self.clock.now();
        if self.scheduler.fire(now) {
            let removed = sweep(&mut self.store, now, &self.actor, &self.policy, self.timed_erase);
            self.note_removed(&removed);
        }
    }

    /// Scene change: drop every drawing locally. Nothing is broadcast;
    /// every client sees the scene change for itself.
    pub fn clear(&mut self) {
        self.interaction.cancel();
        self.clear_preview();
        let removed = self.store.remove_all();
        self.note_removed(&removed);
    }

    /// Tear down: clear, stop the sweep and detach the transport.
    pub fn shutdown(&mut self) {
        self.interaction.disarm_without_commit();
        self.clear();
        self.scheduler.stop();
        self.router.set_transport(None);
    }

    /// Apply a new configuration. Permissions, key binding, sweep rates and
    /// the width range take effect immediately; a tool that may no longer
    /// draw is disarmed without committing.
    pub fn update_config(&mut self, config: SessionConfig) -> Result<(), ConfigError> {
        let config = config.validated()?;
        let now = self.clock.now();
        self.policy = SessionPolicy::from_config(&config);
        self.keys.rebind(&config);
        self.scheduler
            .set_intervals(now, config.slow_sweep_interval(), config.fast_sweep_interval());
        self.settings.width = config.clamp_width(self.settings.width);
        self.router.set_width_bounds(&config);
        self.config = config;

        if self.interaction.is_armed() && !self.policy.can_draw(&self.actor) {
            log::info!("Drawing no longer allowed, disarming");
            self.interaction.disarm_without_commit();
            self.clear_preview();
        }
        if self.timed_erase && !self.policy.can_erase_own(&self.actor) {
            self.set_timed_erase(false);
        }
        Ok(())
    }

    // --- helpers ---

    fn require(&mut self, action: Action) -> Result<(), Denied> {
        let allowed = match action {
            Action::Draw => self.policy.can_draw(&self.actor),
            Action::EraseAll => self.policy.can_erase_all(&self.actor),
            Action::EraseOwn | Action::TimedErase => self.policy.can_erase_own(&self.actor),
            Action::Persist => self.policy.can_persist(&self.actor),
        };
        if allowed {
            Ok(())
        } else {
            log::debug!("{} denied for {}", action, self.actor.id);
            self.notify(Notice::PermissionDenied(action));
            Err(Denied { action })
        }
    }

    fn notify(&mut self, notice: Notice) {
        self.events.push(SessionEvent::Notice(notice));
    }

    fn note_removed(&mut self, removed: &[DrawingRecord]) {
        self.events
            .extend(removed.iter().map(|record| SessionEvent::DrawingRemoved(record.id().clone())));
    }

    fn clear_preview(&mut self) {
        if let Some(handle) = self.preview.take() {
            release(self.store.surface_mut(), handle);
        }
    }

    /// Replace the preview shape with one for the current state.
    fn refresh_preview(&mut self) {
        self.clear_preview();
        if let Some(geometry) = self.interaction.preview(self.settings.symbol_size) {
            let ops = geometry_ops(&geometry, &self.settings.style(), Variant::Preview);
            self.preview = place(self.store.surface_mut(), ops);
        }
    }
}

impl<S: DrawSurface> fmt::Debug for DrawingSession<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DrawingSession")
            .field("actor", &self.actor)
            .field("drawings", &self.store.len())
            .field("phase", &self.interaction.phase())
            .field("timed_erase", &self.timed_erase)
            .field("router", &self.router)
            .finish()
    }
}
