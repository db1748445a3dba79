//! Integration tests for TUI module.
//!
//! These tests drive the app through a whole session with key presses only.

#![allow(clippy::unwrap_used)]

use super::drop_app::DropApp;
use crate::domains::tracker::Stats;
use crossterm::event::KeyCode;

fn press(app: &mut DropApp, keys: &str) {
    for c in keys.chars() {
        app.handle_key(KeyCode::Char(c));
    }
}

#[test]
fn test_drop_app_lifecycle() {
    let mut app = DropApp::new().unwrap();

    // 500 + 500 balls
    press(&mut app, "3ddddd");
    for _ in 0..3 {
        app.update();
    }
    press(&mut app, "ddddd");
    assert_eq!(app.engine.balls().len(), 1000);

    while !app.engine.is_settled() {
        app.update();
    }
    let stats = *app.engine.stats();
    assert_eq!(stats.total_in_circle, 1000);
    assert!(stats.total_in_square <= stats.total_in_circle);
    assert!(stats.estimated_pi > 2.5 && stats.estimated_pi < 4.0);

    // Paused frames change nothing
    press(&mut app, " ");
    let frames = app.frame_count;
    app.update();
    assert_eq!(app.frame_count, frames);
    press(&mut app, " ");

    press(&mut app, "r");
    assert_eq!(*app.engine.stats(), Stats::ZERO);
    assert!(app.engine.history().is_empty());

    press(&mut app, "q");
    assert!(app.should_quit);
}

#[test]
fn test_reset_replays_same_landings() {
    let mut app = DropApp::new().unwrap();
    press(&mut app, "4d");
    while !app.engine.is_settled() {
        app.update();
    }
    let first = app.engine.snapshot();

    press(&mut app, "r4d");
    while !app.engine.is_settled() {
        app.update();
    }
    assert_eq!(app.engine.snapshot(), first);
}
