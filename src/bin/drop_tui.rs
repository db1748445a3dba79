//! pidrop Ball-Drop Demo - Terminal User Interface
//!
//! Drops balls into a disc and charts the π estimate as they land.
//! App logic lives in `pidrop::tui::drop_app`.

#![forbid(unsafe_code)]

#[cfg(feature = "tui")]
fn main() -> std::io::Result<()> {
    use pidrop::tui::drop_app::DropApp;
    use std::io;

    if let Ok(path) = std::env::var("PIDROP_LOG_FILE") {
        pidrop::logging::init_file(std::path::Path::new(&path))
            .map_err(|e| io::Error::other(e.to_string()))?;
    }
    let app = DropApp::new().map_err(|e| io::Error::other(e.to_string()))?;
    tui::run(app)
}

#[cfg(not(feature = "tui"))]
fn main() {
    eprintln!("TUI feature not enabled. Run with --features tui");
    std::process::exit(1);
}

#[cfg(feature = "tui")]
mod tui {
    use crossterm::{
        event::{self, Event, KeyEventKind},
        execute,
        terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    };
    use pidrop::tui::drop_app::DropApp;
    use ratatui::{
        backend::CrosstermBackend,
        layout::{Constraint, Direction, Layout, Rect},
        style::{Color, Modifier, Style},
        symbols::Marker,
        text::{Line, Span},
        widgets::{
            canvas::{Canvas, Circle, Points, Rectangle},
            Axis, Block, Borders, Chart, Dataset, GraphType, Paragraph, Wrap,
        },
        Frame, Terminal,
    };
    use std::f64::consts::PI;
    use std::io;
    use std::time::Instant;

    /// Run the TUI application.
    pub fn run(mut app: DropApp) -> io::Result<()> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        let tick_rate = app.engine.clock().tick_duration();

        loop {
            let start = Instant::now();
            terminal.draw(|f| ui(f, &app))?;

            let timeout = tick_rate.saturating_sub(start.elapsed());
            if event::poll(timeout)? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        app.handle_key(key.code);
                    }
                }
            }

            if app.should_quit {
                break;
            }

            app.update();
        }

        disable_raw_mode()?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
        terminal.show_cursor()?;

        Ok(())
    }

    fn ui(f: &mut Frame, app: &DropApp) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Min(12),
                Constraint::Length(10),
                Constraint::Length(4),
            ])
            .split(f.area());

        let middle = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(65), Constraint::Percentage(35)])
            .split(chunks[1]);

        render_title(f, chunks[0], app);
        render_disc(f, middle[0], app);
        render_counters(f, middle[1], app);
        render_chart(f, chunks[2], app);
        render_commentary(f, chunks[3], app);
    }

    fn render_title(f: &mut Frame, area: Rect, app: &DropApp) {
        let title = Paragraph::new(vec![Line::from(vec![
            Span::styled(
                " PIDROP ",
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw(" | "),
            Span::styled(
                if app.paused { "[PAUSED]" } else { "[RUNNING]" },
                Style::default().fg(if app.paused {
                    Color::Yellow
                } else {
                    Color::Green
                }),
            ),
            Span::raw(" | "),
            Span::styled(
                format!("Batch: {}", app.batch_size),
                Style::default().fg(Color::White),
            ),
        ])])
        .block(Block::default().borders(Borders::ALL).title(
            "Controls: [D] Drop  [1-4] Batch  [C] Commentary  [Space] Pause  [R] Reset  [Q] Quit",
        ));
        f.render_widget(title, area);
    }

    fn render_disc(f: &mut Frame, area: Rect, app: &DropApp) {
        let disc = app.engine.disc();
        let center = disc.center();
        let radius = disc.radius();
        let half = disc.square_half_side();
        let pad = radius * 0.05;
        let top = disc.top().y + app.engine.animator().drop_height();
        let layers = app.ball_layers();

        let canvas = Canvas::default()
            .block(Block::default().borders(Borders::ALL).title("Disc"))
            .marker(Marker::Braille)
            .x_bounds([center.x - radius - pad, center.x + radius + pad])
            .y_bounds([center.y - radius - pad, top + pad])
            .paint(|ctx| {
                ctx.draw(&Circle {
                    x: center.x,
                    y: center.y,
                    radius,
                    color: Color::DarkGray,
                });
                ctx.draw(&Rectangle {
                    x: center.x - half,
                    y: center.y - half,
                    width: 2.0 * half,
                    height: 2.0 * half,
                    color: Color::Gray,
                });
                ctx.layer();
                ctx.draw(&Points {
                    coords: &layers.outside,
                    color: Color::Blue,
                });
                ctx.draw(&Points {
                    coords: &layers.in_square,
                    color: Color::Green,
                });
                ctx.layer();
                ctx.draw(&Points {
                    coords: &layers.falling,
                    color: Color::Yellow,
                });
            });

        f.render_widget(canvas, area);
    }

    fn render_counters(f: &mut Frame, area: Rect, app: &DropApp) {
        let stats = app.engine.stats();
        let row = |label: &'static str, value: String, color: Color| {
            Line::from(vec![
                Span::styled(label, Style::default().fg(Color::Gray)),
                Span::styled(value, Style::default().fg(color)),
            ])
        };

        let mut lines = vec![
            row(
                "In circle:   ",
                stats.total_in_circle.to_string(),
                Color::Blue,
            ),
            row(
                "In square:   ",
                stats.total_in_square.to_string(),
                Color::Green,
            ),
            row(
                "Estimate π̂:  ",
                format!("{:.6}", stats.estimated_pi),
                Color::Cyan,
            ),
            row("True π:      ", format!("{PI:.6}"), Color::White),
            row(
                "Error:       ",
                format!("{:.4}%", stats.error * 100.0),
                if stats.error < 0.01 {
                    Color::Green
                } else {
                    Color::Yellow
                },
            ),
            Line::from(""),
            row(
                "Falling:     ",
                app.engine.falling().to_string(),
                Color::Yellow,
            ),
            row(
                "Tick:        ",
                app.engine.clock().tick_count().to_string(),
                Color::White,
            ),
        ];
        if let Some(error) = &app.last_error {
            lines.push(Line::from(""));
            lines.push(Line::from(Span::styled(
                error.clone(),
                Style::default().fg(Color::Red),
            )));
        }

        let counters = Paragraph::new(lines)
            .wrap(Wrap { trim: true })
            .block(Block::default().borders(Borders::ALL).title("Statistics"));
        f.render_widget(counters, area);
    }

    fn render_chart(f: &mut Frame, area: Rect, app: &DropApp) {
        let data = app.chart_data();
        let ([x0, x1], [y0, y1]) = app.chart_bounds();
        let reference = [(x0, PI), (x1, PI)];

        let datasets = vec![
            Dataset::default()
                .name("π")
                .marker(Marker::Braille)
                .graph_type(GraphType::Line)
                .style(Style::default().fg(Color::DarkGray))
                .data(&reference),
            Dataset::default()
                .name("π̂")
                .marker(Marker::Braille)
                .graph_type(GraphType::Line)
                .style(Style::default().fg(Color::Cyan))
                .data(&data),
        ];

        let chart = Chart::new(datasets)
            .block(Block::default().borders(Borders::ALL).title("Convergence"))
            .x_axis(
                Axis::default()
                    .title("balls")
                    .style(Style::default().fg(Color::Gray))
                    .bounds([x0, x1])
                    .labels([format!("{x0:.0}"), format!("{x1:.0}")]),
            )
            .y_axis(
                Axis::default()
                    .style(Style::default().fg(Color::Gray))
                    .bounds([y0, y1])
                    .labels([format!("{y0:.3}"), format!("{y1:.3}")]),
            );
        f.render_widget(chart, area);
    }

    fn render_commentary(f: &mut Frame, area: Rect, app: &DropApp) {
        let style = if app.commentary_pending() {
            Style::default()
                .fg(Color::DarkGray)
                .add_modifier(Modifier::ITALIC)
        } else {
            Style::default().fg(Color::White)
        };
        let commentary = Paragraph::new(Span::styled(app.commentary.as_str(), style))
            .wrap(Wrap { trim: true })
            .block(Block::default().borders(Borders::ALL).title("Commentary"));
        f.render_widget(commentary, area);
    }
}
