use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    style::{Color, Style},
    symbols,
    text::Span,
    widgets::{Axis, Block, Chart, Dataset, GraphType},
    Frame, Terminal,
};
use std::{
    error::Error,
    io,
    time::{Duration, Instant},
};

/// One radar frame: blip positions in chart coordinates (user at the
/// origin, north up) plus a status line for the chart title.
pub struct RadarFrame {
    pub tracked: Vec<(f64, f64)>,
    pub locked: Vec<(f64, f64)>,
    pub status: String,
}

impl Default for RadarFrame {
    fn default() -> Self {
        RadarFrame {
            tracked: vec![],
            locked: vec![],
            status: "SCANNING".to_string(),
        }
    }
}

type FrameGenerator = Box<dyn FnMut() -> RadarFrame>;

struct App {
    frame_generator: FrameGenerator,
    frame: RadarFrame,
}

impl App {
    fn new(frame_generator: FrameGenerator) -> App {
        App {
            frame_generator,
            frame: RadarFrame::default(),
        }
    }

    fn on_tick(&mut self) {
        self.frame = (self.frame_generator)();
    }
}

pub fn engage_gui(frame_generator: FrameGenerator, chart_bound: f64) -> Result<(), Box<dyn Error>> {
    // setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // create app and run it
    let tick_rate = Duration::from_millis(250);
    let app = App::new(frame_generator);
    let res = run_app(&mut terminal, app, tick_rate, chart_bound);

    // restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        println!("{:?}", err)
    }

    Ok(())
}

fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    mut app: App,
    tick_rate: Duration,
    chart_bound: f64,
) -> io::Result<()> {
    let mut last_tick = Instant::now();
    loop {
        terminal.draw(|f| ui(f, &mut app, chart_bound))?;

        let timeout = tick_rate
            .checked_sub(last_tick.elapsed())
            .unwrap_or_else(|| Duration::from_secs(0));
        if crossterm::event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                if let KeyCode::Char('q') = key.code {
                    return Ok(());
                }
            }
        }
        if last_tick.elapsed() >= tick_rate {
            app.on_tick();
            last_tick = Instant::now();
        }
    }
}

fn ui(f: &mut Frame, app: &mut App, chart_bound: f64) {
    let labels: Vec<Span> = [-chart_bound, -chart_bound / 2.0, 0.0, chart_bound / 2.0, chart_bound]
        .iter()
        .map(|v| Span::from(format!("{:.0}", v)))
        .collect();

    let chart = Chart::new(vec![
        Dataset::default()
            .name("Tracked")
            .marker(symbols::Marker::Dot)
            .graph_type(GraphType::Scatter)
            .style(Style::default().fg(Color::Cyan))
            .data(&app.frame.tracked),
        Dataset::default()
            .name("Locked")
            .marker(symbols::Marker::Dot)
            .graph_type(GraphType::Scatter)
            .style(Style::default().fg(Color::Red))
            .data(&app.frame.locked),
    ])
    .block(Block::default().title(app.frame.status.clone()))
    .x_axis(
        Axis::default()
            .title(Span::styled("W - E", Style::default().fg(Color::White)))
            .style(Style::default().fg(Color::White))
            .bounds([-chart_bound, chart_bound])
            .labels(labels.clone()),
    )
    .y_axis(
        Axis::default()
            .title(Span::styled("S - N", Style::default().fg(Color::White)))
            .style(Style::default().fg(Color::White))
            .bounds([-chart_bound, chart_bound])
            .labels(labels),
    );

    f.render_widget(chart, f.size());
}
