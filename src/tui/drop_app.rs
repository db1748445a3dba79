//! Ball-drop TUI application state and logic.
//!
//! This module contains the testable state and logic for the ball-drop TUI.
//! Terminal I/O is handled by the binary, but all state management lives here.

use std::f64::consts::PI;

use crate::commentary::{Commentator, CommentaryTask};
use crate::config::DropConfig;
use crate::engine::DropEngine;
use crate::error::PiResult;
use crossterm::event::KeyCode;
use tracing::warn;

/// Batch sizes selectable with keys `1` to `4`.
pub const BATCH_SIZES: [u64; 4] = [1, 10, 100, 1000];

/// Shown before any commentary has been requested.
pub const COMMENTARY_HINT: &str = "Press [C] for commentary on the current estimate.";

/// Shown while a commentary request is in flight.
pub const COMMENTARY_PENDING: &str = "Thinking...";

/// Ball positions for one frame, split by how they are drawn.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BallLayers {
    /// Landed inside the inscribed square.
    pub in_square: Vec<(f64, f64)>,
    /// Landed outside the square.
    pub outside: Vec<(f64, f64)>,
    /// Still falling, at their interpolated position.
    pub falling: Vec<(f64, f64)>,
}

/// Application state for the ball-drop TUI.
#[derive(Debug)]
pub struct DropApp {
    /// The simulation.
    pub engine: DropEngine,
    /// Balls dropped per drop action.
    pub batch_size: u64,
    /// Whether ticking is paused.
    pub paused: bool,
    /// Frame counter.
    pub frame_count: u64,
    /// Whether the app should quit.
    pub should_quit: bool,
    /// Latest commentary line.
    pub commentary: String,
    /// Last rejected action, shown until the next successful one.
    pub last_error: Option<String>,
    commentator: Commentator,
    pending: Option<CommentaryTask>,
}

impl DropApp {
    /// Create the app from the embedded configuration.
    ///
    /// # Errors
    ///
    /// Returns error if the embedded configuration is invalid.
    pub fn new() -> PiResult<Self> {
        Self::from_config(&DropConfig::embedded()?)
    }

    /// Create the app from a configuration.
    ///
    /// # Errors
    ///
    /// Returns error if the configuration is invalid.
    pub fn from_config(config: &DropConfig) -> PiResult<Self> {
        Ok(Self::with_engine(
            DropEngine::new(config)?,
            Commentator::from_config(&config.commentary),
        ))
    }

    /// Create the app around an engine and commentator.
    #[must_use]
    pub fn with_engine(engine: DropEngine, commentator: Commentator) -> Self {
        Self {
            engine,
            batch_size: BATCH_SIZES[0],
            paused: false,
            frame_count: 0,
            should_quit: false,
            commentary: COMMENTARY_HINT.to_string(),
            last_error: None,
            commentator,
            pending: None,
        }
    }

    /// Drop one batch of the selected size.
    pub fn drop_batch(&mut self) {
        match self.engine.drop_balls(self.batch_size) {
            Ok(_) => self.last_error = None,
            Err(e) => {
                warn!(error = %e, "drop rejected");
                self.last_error = Some(e.to_string());
            }
        }
    }

    /// Clear the simulation and abandon any pending commentary.
    pub fn reset(&mut self) {
        self.engine.reset();
        self.pending = None;
        self.commentary = COMMENTARY_HINT.to_string();
        self.last_error = None;
        self.frame_count = 0;
    }

    /// Ask for commentary on the current statistics.
    ///
    /// Ignored while a request is already in flight.
    pub fn request_commentary(&mut self) {
        if self.pending.is_some() {
            return;
        }
        self.pending = Some(self.commentator.spawn(*self.engine.stats()));
        self.commentary = COMMENTARY_PENDING.to_string();
    }

    /// Whether a commentary request is in flight.
    #[must_use]
    pub const fn commentary_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Collect a finished commentary request, if any.
    pub fn poll_commentary(&mut self) {
        if let Some(text) = self.pending.as_ref().and_then(CommentaryTask::poll) {
            self.commentary = text;
            self.pending = None;
        }
    }

    /// Update the app for one frame.
    pub fn update(&mut self) {
        self.poll_commentary();
        if self.paused {
            return;
        }
        self.engine.tick();
        self.frame_count += 1;
    }

    /// Handle a key press.
    pub fn handle_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::Char('q') | KeyCode::Esc => self.should_quit = true,
            KeyCode::Char(' ') => self.paused = !self.paused,
            KeyCode::Char('r') => self.reset(),
            KeyCode::Char('d') | KeyCode::Enter => self.drop_batch(),
            KeyCode::Char('c') => self.request_commentary(),
            KeyCode::Char(c @ '1'..='4') => {
                let slot = (c as usize) - ('1' as usize);
                self.batch_size = BATCH_SIZES[slot];
            }
            _ => {}
        }
    }

    /// Ball positions to draw on this frame.
    #[must_use]
    pub fn ball_layers(&self) -> BallLayers {
        let mut layers = BallLayers::default();
        for ball in self.engine.balls() {
            let p = self.engine.visual_position(ball);
            let layer = if !ball.is_landed() {
                &mut layers.falling
            } else if ball.in_square() {
                &mut layers.in_square
            } else {
                &mut layers.outside
            };
            layer.push((p.x, p.y));
        }
        layers
    }

    /// Convergence series as chart coordinates.
    #[must_use]
    pub fn chart_data(&self) -> Vec<(f64, f64)> {
        self.engine.history().chart_data()
    }

    /// Chart axis bounds `(x, y)` covering the history and the π line.
    #[must_use]
    pub fn chart_bounds(&self) -> ([f64; 2], [f64; 2]) {
        let data = self.chart_data();
        let x_min = data.first().map_or(0.0, |p| p.0);
        let x_max = data.last().map_or(1.0, |p| p.0).max(x_min + 1.0);

        let (lo, hi) = data
            .iter()
            .fold((PI, PI), |(lo, hi), &(_, y)| (lo.min(y), hi.max(y)));
        let margin = ((hi - lo) * 0.1).max(0.05);
        ([x_min, x_max], [lo - margin, hi + margin])
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn app() -> DropApp {
        DropApp::from_config(&DropConfig::default()).unwrap()
    }

    fn settle(app: &mut DropApp) {
        let ticks = app.engine.animator().ticks_to_land();
        for _ in 0..ticks {
            app.update();
        }
    }

    #[test]
    fn test_new_app() {
        let app = DropApp::new().unwrap();
        assert!(!app.paused);
        assert!(!app.should_quit);
        assert_eq!(app.frame_count, 0);
        assert_eq!(app.batch_size, 1);
        assert_eq!(app.commentary, COMMENTARY_HINT);
        assert!(app.engine.balls().is_empty());
    }

    #[test]
    fn test_drop_keys() {
        let mut app = app();
        app.handle_key(KeyCode::Char('d'));
        app.handle_key(KeyCode::Enter);
        assert_eq!(app.engine.balls().len(), 2);
        assert_eq!(app.engine.falling(), 2);
    }

    #[test]
    fn test_batch_size_keys() {
        let mut app = app();
        for (key, size) in ['1', '2', '3', '4'].into_iter().zip(BATCH_SIZES) {
            app.handle_key(KeyCode::Char(key));
            assert_eq!(app.batch_size, size);
        }
        app.handle_key(KeyCode::Char('5'));
        assert_eq!(app.batch_size, 1000);

        app.handle_key(KeyCode::Char('d'));
        assert_eq!(app.engine.balls().len(), 1000);
    }

    #[test]
    fn test_balls_land_through_updates() {
        let mut app = app();
        app.handle_key(KeyCode::Char('3'));
        app.drop_batch();
        settle(&mut app);

        assert!(app.engine.is_settled());
        assert_eq!(app.engine.stats().total_in_circle, 100);
        assert!(!app.chart_data().is_empty());
    }

    #[test]
    fn test_pause_stops_ticks() {
        let mut app = app();
        app.drop_batch();
        app.handle_key(KeyCode::Char(' '));
        assert!(app.paused);

        app.update();
        assert_eq!(app.frame_count, 0);
        assert!(app.engine.balls()[0].progress().abs() < f64::EPSILON);

        app.handle_key(KeyCode::Char(' '));
        app.update();
        assert_eq!(app.frame_count, 1);
        assert!(app.engine.balls()[0].progress() > 0.0);
    }

    #[test]
    fn test_reset_key() {
        let mut app = app();
        app.handle_key(KeyCode::Char('4'));
        app.drop_batch();
        settle(&mut app);
        app.request_commentary();

        app.handle_key(KeyCode::Char('r'));
        assert!(app.engine.balls().is_empty());
        assert_eq!(app.engine.stats().total_in_circle, 0);
        assert!(app.engine.history().is_empty());
        assert_eq!(app.frame_count, 0);
        assert!(!app.commentary_pending());
        assert_eq!(app.commentary, COMMENTARY_HINT);
    }

    #[test]
    fn test_rejected_drop_reports_error() {
        let config = DropConfig::builder().max_batch(50).build();
        let mut app = DropApp::from_config(&config).unwrap();
        app.handle_key(KeyCode::Char('3'));
        app.drop_batch();
        assert!(app.engine.balls().is_empty());
        assert!(app.last_error.is_some());

        app.handle_key(KeyCode::Char('2'));
        app.drop_batch();
        assert_eq!(app.engine.balls().len(), 10);
        assert!(app.last_error.is_none());
    }

    #[test]
    fn test_commentary_disabled_resolves_to_fallback() {
        let mut app = app();
        app.handle_key(KeyCode::Char('c'));
        assert!(app.commentary_pending());

        let deadline = std::time::Instant::now() + std::time::Duration::from_secs(5);
        while app.commentary_pending() && std::time::Instant::now() < deadline {
            app.update();
            std::thread::sleep(std::time::Duration::from_millis(5));
        }
        assert!(!app.commentary_pending());
        assert_eq!(app.commentary, DropConfig::default().commentary.fallback);
    }

    #[test]
    fn test_ball_layers() {
        let mut app = app();
        app.handle_key(KeyCode::Char('3'));
        app.drop_batch();

        let layers = app.ball_layers();
        assert_eq!(layers.falling.len(), 100);
        assert!(layers.in_square.is_empty());
        // Falling balls start above the disc.
        let top = app.engine.disc().top().y;
        assert!(layers.falling.iter().all(|&(_, y)| y > top));

        settle(&mut app);
        let layers = app.ball_layers();
        assert!(layers.falling.is_empty());
        assert_eq!(
            layers.in_square.len() as u64,
            app.engine.stats().total_in_square
        );
        assert_eq!(layers.in_square.len() + layers.outside.len(), 100);
    }

    #[test]
    fn test_chart_bounds_include_pi() {
        let app = app();
        let ([x0, x1], [y0, y1]) = app.chart_bounds();
        assert!(x1 > x0);
        assert!(y0 < PI && PI < y1);

        let mut app = app;
        app.handle_key(KeyCode::Char('4'));
        app.drop_batch();
        settle(&mut app);
        let ([x0, x1], [y0, y1]) = app.chart_bounds();
        assert!(x1 > x0);
        for (x, y) in app.chart_data() {
            assert!(x >= x0 && x <= x1);
            assert!(y >= y0 && y <= y1);
        }
    }

    #[test]
    fn test_quit_keys() {
        let mut app = app();
        app.handle_key(KeyCode::Char('q'));
        assert!(app.should_quit);

        let mut app = DropApp::new().unwrap();
        app.handle_key(KeyCode::Esc);
        assert!(app.should_quit);
    }

    #[test]
    fn test_unknown_key_ignored() {
        let mut app = app();
        app.handle_key(KeyCode::Char('x'));
        assert!(!app.paused);
        assert!(!app.should_quit);
        assert!(app.engine.balls().is_empty());
    }
}
