//! Tool state for the local participant.
//!
//! [`InteractionState`] is the arm / draw / commit state machine. It only
//! deals in geometry: permissions, record building and broadcasting are the
//! session's job.

use crate::color::RgbColor;
use crate::drawing::{
    BoxGeometry, DrawingStyle, Geometry, LineTexture, StrokeGeometry, SymbolGeometry, SymbolSize,
    SymbolType,
};
use kurbo::{Point, Vec2};
use serde::{Deserialize, Serialize};

/// What pointer input produces while armed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolMode {
    #[default]
    Stroke,
    Symbol(SymbolType),
    Box,
}

/// Coarse phase of the interaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolPhase {
    Idle,
    Armed,
    Drawing,
}

/// A toggle the toolbar may want to highlight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToolOption {
    Mode(ToolMode),
    SymbolSize(SymbolSize),
    Texture(LineTexture),
    TimedErase,
}

/// Style choices applied to the next committed drawing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToolSettings {
    pub symbol_size: SymbolSize,
    pub width: u32,
    pub color: RgbColor,
    pub alpha: u8,
    pub texture: LineTexture,
}

impl Default for ToolSettings {
    fn default() -> Self {
        let style = DrawingStyle::default();
        Self {
            symbol_size: SymbolSize::default(),
            width: style.width,
            color: style.color,
            alpha: style.alpha,
            texture: style.texture,
        }
    }
}

impl ToolSettings {
    pub fn style(&self) -> DrawingStyle {
        DrawingStyle {
            width: self.width,
            color: self.color,
            alpha: self.alpha,
            texture: self.texture,
        }
    }
}

/// Accumulated input for a stroke or box that has not been committed yet.
#[derive(Debug, Clone, PartialEq)]
enum InProgress {
    Stroke { anchor: Point, points: Vec<Vec2> },
    Box { anchor: Point, corner: Option<Point> },
}

impl InProgress {
    fn start(mode: ToolMode, at: Point) -> Option<Self> {
        match mode {
            ToolMode::Stroke => Some(InProgress::Stroke {
                anchor: at,
                points: vec![Vec2::ZERO],
            }),
            ToolMode::Box => Some(InProgress::Box { anchor: at, corner: None }),
            ToolMode::Symbol(_) => None,
        }
    }

    /// Feed a pointer position. Returns whether anything changed.
    fn push(&mut self, at: Point) -> bool {
        match self {
            InProgress::Stroke { anchor, points } => {
                let offset = at - *anchor;
                if points.last() == Some(&offset) {
                    return false;
                }
                points.push(offset);
                true
            }
            InProgress::Box { corner, .. } => {
                if *corner == Some(at) {
                    return false;
                }
                *corner = Some(at);
                true
            }
        }
    }

    fn geometry(&self) -> Option<Geometry> {
        match self {
            InProgress::Stroke { anchor, points } => StrokeGeometry::new(*anchor, points.clone())
                .ok()
                .map(Geometry::Stroke),
            InProgress::Box { anchor, corner } => {
                let corner = (*corner)?;
                BoxGeometry::new(*anchor, corner).ok().map(Geometry::Box)
            }
        }
    }
}

/// Local arm / draw / commit state machine.
///
/// `Idle` → `Armed` on [`arm`](Self::arm); `Armed` → `Drawing` on the first
/// pointer move in stroke or box mode; `Drawing` → `Armed` on pointer-up and
/// → `Idle` on [`disarm`](Self::disarm), both of which commit.
#[derive(Debug, Clone, Default)]
pub struct InteractionState {
    armed: bool,
    mode: ToolMode,
    in_progress: Option<InProgress>,
    last_pointer: Option<Point>,
}

impl InteractionState {
    pub fn new(mode: ToolMode) -> Self {
        Self {
            mode,
            ..Self::default()
        }
    }

    pub fn is_armed(&self) -> bool {
        self.armed
    }

    pub fn mode(&self) -> ToolMode {
        self.mode
    }

    pub fn phase(&self) -> ToolPhase {
        match (self.armed, &self.in_progress) {
            (false, _) => ToolPhase::Idle,
            (true, None) => ToolPhase::Armed,
            (true, Some(_)) => ToolPhase::Drawing,
        }
    }

    pub fn is_drawing(&self) -> bool {
        self.in_progress.is_some()
    }

    /// Last finite pointer position seen, armed or not.
    pub fn last_pointer(&self) -> Option<Point> {
        self.last_pointer
    }

    /// Switch mode. Returns `true` if an in-progress stroke or box was
    /// discarded.
    pub fn set_mode(&mut self, mode: ToolMode) -> bool {
        if self.mode == mode {
            return false;
        }
        self.mode = mode;
        self.cancel()
    }

    /// Arm the tool. Arming while already drawing discards the stroke.
    /// Returns `true` if something was discarded.
    pub fn arm(&mut self) -> bool {
        let discarded = self.cancel();
        self.armed = true;
        discarded
    }

    /// Disarm, committing any in-progress stroke or box first.
    pub fn disarm(&mut self) -> Option<Geometry> {
        let committed = self.commit();
        self.armed = false;
        committed
    }

    /// Disarm and drop any in-progress stroke or box.
    pub fn disarm_without_commit(&mut self) {
        self.in_progress = None;
        self.armed = false;
    }

    /// Throw away any in-progress stroke or box. Returns whether there was one.
    pub fn cancel(&mut self) -> bool {
        self.in_progress.take().is_some()
    }

    /// Pointer moved to a world position. Returns `true` if the in-progress
    /// shape (or the symbol preview position) changed.
    pub fn pointer_moved(&mut self, at: Point) -> bool {
        if !at.is_finite() {
            log::debug!("Dropping non-finite pointer position");
            return false;
        }
        let moved = self.last_pointer != Some(at);
        self.last_pointer = Some(at);
        if !self.armed {
            return false;
        }
        if let Some(in_progress) = &mut self.in_progress {
            return in_progress.push(at);
        }
        match InProgress::start(self.mode, at) {
            Some(started) => {
                self.in_progress = Some(started);
                true
            }
            None => moved,
        }
    }

    /// Pointer pressed. In symbol mode this is the commit point and the
    /// stamp position is returned; otherwise it acts as a move.
    pub fn pointer_down(&mut self, at: Point) -> Option<Point> {
        if !at.is_finite() {
            log::debug!("Dropping non-finite pointer position");
            return None;
        }
        match self.mode {
            ToolMode::Symbol(_) => {
                self.last_pointer = Some(at);
                self.armed.then_some(at)
            }
            ToolMode::Stroke | ToolMode::Box => {
                self.pointer_moved(at);
                None
            }
        }
    }

    /// Pointer released: commit the current stroke or box, stay armed.
    pub fn pointer_up(&mut self, at: Point) -> Option<Geometry> {
        if self.in_progress.is_none() {
            return None;
        }
        self.pointer_moved(at);
        self.commit()
    }

    /// End the current stroke or box. Under-specified input (fewer than two
    /// distinct points) is discarded and yields `None`.
    pub fn commit(&mut self) -> Option<Geometry> {
        let mut in_progress = self.in_progress.take()?;
        if let Some(at) = self.last_pointer {
            in_progress.push(at);
        }
        let geometry = in_progress.geometry();
        if geometry.is_none() {
            log::debug!("Discarding under-specified {:?}", self.mode);
        }
        geometry
    }

    /// Geometry to show as a translucent preview, if any.
    pub fn preview(&self, symbol_size: SymbolSize) -> Option<Geometry> {
        if !self.armed {
            return None;
        }
        match (&self.in_progress, self.mode) {
            (Some(in_progress), _) => in_progress.geometry(),
            (None, ToolMode::Symbol(symbol)) => {
                let at = self.last_pointer?;
                SymbolGeometry::new(at, symbol, symbol_size).ok().map(Geometry::Symbol)
            }
            (None, _) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stroke_points(geometry: &Geometry) -> Vec<(f64, f64)> {
        match geometry {
            Geometry::Stroke(stroke) => stroke.points().iter().map(|v| (v.x, v.y)).collect(),
            other => panic!("expected stroke, got {other:?}"),
        }
    }

    #[test]
    fn test_phases() {
        let mut state = InteractionState::default();
        assert_eq!(state.phase(), ToolPhase::Idle);
        state.arm();
        assert_eq!(state.phase(), ToolPhase::Armed);
        state.pointer_moved(Point::new(1.0, 1.0));
        assert_eq!(state.phase(), ToolPhase::Drawing);
        state.disarm();
        assert_eq!(state.phase(), ToolPhase::Idle);
    }

    #[test]
    fn test_moves_while_disarmed_only_track_pointer() {
        let mut state = InteractionState::default();
        assert!(!state.pointer_moved(Point::new(3.0, 4.0)));
        assert!(!state.is_drawing());
        assert_eq!(state.last_pointer(), Some(Point::new(3.0, 4.0)));
    }

    #[test]
    fn test_stroke_relative_to_anchor() {
        let mut state = InteractionState::default();
        state.arm();
        state.pointer_moved(Point::new(5.0, 5.0));
        state.pointer_moved(Point::new(15.0, 5.0));
        state.pointer_moved(Point::new(15.0, 15.0));
        let geometry = state.disarm().unwrap();
        assert_eq!(stroke_points(&geometry), vec![(0.0, 0.0), (10.0, 0.0), (10.0, 10.0)]);
        match geometry {
            Geometry::Stroke(stroke) => assert_eq!(stroke.anchor(), Point::new(5.0, 5.0)),
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_duplicate_points_skipped() {
        let mut state = InteractionState::default();
        state.arm();
        state.pointer_moved(Point::new(0.0, 0.0));
        assert!(state.pointer_moved(Point::new(1.0, 0.0)));
        assert!(!state.pointer_moved(Point::new(1.0, 0.0)));
        let geometry = state.disarm().unwrap();
        assert_eq!(stroke_points(&geometry).len(), 2);
    }

    #[test]
    fn test_single_point_commit_is_noop() {
        let mut state = InteractionState::default();
        state.arm();
        state.pointer_moved(Point::new(2.0, 2.0));
        assert!(state.disarm().is_none());
        assert!(!state.is_drawing());
    }

    #[test]
    fn test_non_finite_dropped() {
        let mut state = InteractionState::default();
        state.arm();
        state.pointer_moved(Point::new(0.0, 0.0));
        assert!(!state.pointer_moved(Point::new(f64::NAN, 1.0)));
        assert!(!state.pointer_moved(Point::new(1.0, f64::INFINITY)));
        assert_eq!(state.last_pointer(), Some(Point::new(0.0, 0.0)));
        assert!(state.disarm().is_none());
    }

    #[test]
    fn test_box_uses_latest_corner() {
        let mut state = InteractionState::new(ToolMode::Box);
        state.arm();
        state.pointer_moved(Point::new(10.0, 10.0));
        state.pointer_moved(Point::new(20.0, 30.0));
        state.pointer_moved(Point::new(40.0, 50.0));
        match state.disarm() {
            Some(Geometry::Box(b)) => {
                assert_eq!(b.start(), Point::new(10.0, 10.0));
                assert_eq!(b.end(), Point::new(40.0, 50.0));
            }
            other => panic!("expected box, got {other:?}"),
        }
    }

    #[test]
    fn test_box_needs_second_corner() {
        let mut state = InteractionState::new(ToolMode::Box);
        state.arm();
        state.pointer_moved(Point::new(10.0, 10.0));
        assert!(state.preview(SymbolSize::Medium).is_none());
        assert!(state.disarm().is_none());
    }

    #[test]
    fn test_pointer_up_commits_and_stays_armed() {
        let mut state = InteractionState::default();
        state.arm();
        state.pointer_down(Point::new(0.0, 0.0));
        state.pointer_moved(Point::new(4.0, 0.0));
        let geometry = state.pointer_up(Point::new(8.0, 0.0)).unwrap();
        assert_eq!(stroke_points(&geometry), vec![(0.0, 0.0), (4.0, 0.0), (8.0, 0.0)]);
        assert_eq!(state.phase(), ToolPhase::Armed);
        assert!(state.pointer_up(Point::new(9.0, 0.0)).is_none());
    }

    #[test]
    fn test_symbol_commits_on_down() {
        let mut state = InteractionState::new(ToolMode::Symbol(SymbolType::Dot));
        assert!(state.pointer_down(Point::new(1.0, 1.0)).is_none());
        state.arm();
        assert!(!state.is_drawing());
        assert_eq!(state.pointer_down(Point::new(7.0, 8.0)), Some(Point::new(7.0, 8.0)));
        assert_eq!(state.phase(), ToolPhase::Armed);
    }

    #[test]
    fn test_symbol_preview_follows_pointer() {
        let mut state = InteractionState::new(ToolMode::Symbol(SymbolType::Plus));
        state.pointer_moved(Point::new(1.0, 1.0));
        assert!(state.preview(SymbolSize::Small).is_none());
        state.arm();
        assert!(state.pointer_moved(Point::new(5.0, 5.0)));
        match state.preview(SymbolSize::Small) {
            Some(Geometry::Symbol(s)) => assert_eq!(s.at(), Point::new(5.0, 5.0)),
            other => panic!("expected symbol preview, got {other:?}"),
        }
    }

    #[test]
    fn test_rearm_cancels_stroke() {
        let mut state = InteractionState::default();
        state.arm();
        state.pointer_moved(Point::new(0.0, 0.0));
        state.pointer_moved(Point::new(5.0, 0.0));
        assert!(state.arm());
        assert_eq!(state.phase(), ToolPhase::Armed);
    }

    #[test]
    fn test_mode_change_cancels() {
        let mut state = InteractionState::default();
        state.arm();
        state.pointer_moved(Point::new(0.0, 0.0));
        assert!(state.set_mode(ToolMode::Box));
        assert!(!state.is_drawing());
        assert!(!state.set_mode(ToolMode::Box));
    }

    #[test]
    fn test_settings_style() {
        let settings = ToolSettings {
            width: 9,
            texture: LineTexture::Dotted,
            ..ToolSettings::default()
        };
        let style = settings.style();
        assert_eq!(style.width, 9);
        assert_eq!(style.texture, LineTexture::Dotted);
    }
}
