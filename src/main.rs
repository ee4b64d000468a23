use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use std::{
    error::Error,
    io::{self, stdin, Stdout},
    time::Duration,
};
use tracing::{error, info};

use nomires::{
    app::App,
    app_dirs::AppDirs,
    assets::load_sprite_or_placeholder,
    audio::{AudioSink, Silent, TerminalBell},
    config::{Config, ConfigStore, FileConfigStore},
    game::Game,
    highscores::FileHighScoreStore,
    logging,
    perception::{AlwaysOpenSource, LandmarkProcessSource, PerceptionSource},
    runtime::{Clock, CrosstermEventSource, FixedTicker, Runner, SystemClock},
    ui::TerminalRenderer,
};

fn main() -> Result<(), Box<dyn Error>> {
    if let Some(path) = AppDirs::log_path() {
        logging::init(&path);
    }

    let config = FileConfigStore::new().load();
    info!(
        player = %config.player_name,
        tick_rate_hz = config.tick_rate_hz,
        detector = config.detector_command.is_some(),
        "starting"
    );

    if !stdin().is_tty() {
        return Err("stdin must be a tty".into());
    }

    let mut source = open_perception(&config)?;

    let audio: Box<dyn AudioSink> = if config.sound {
        Box::new(TerminalBell::stdout())
    } else {
        Box::new(Silent)
    };
    let mut app = App::new(
        &config,
        Game::default(),
        Box::new(FileHighScoreStore::new()),
        audio,
        load_sprite_or_placeholder(config.sprite_path.as_deref()),
    );

    let terminal = match setup_terminal() {
        Ok(terminal) => terminal,
        Err(e) => {
            source.release();
            let _ = disable_raw_mode();
            return Err(e.into());
        }
    };
    let mut renderer = TerminalRenderer::new(terminal);

    let result = start_tui(&mut renderer, &mut app, source.as_mut(), config.tick_interval());
    if let Err(e) = &result {
        error!(error = %e, "game loop failed");
    }

    source.release();
    restore_terminal(renderer.terminal_mut())?;
    info!("bye");

    result.map_err(Into::into)
}

/// A configured detector that won't start is fatal; no detector at all
/// means eyes are always open.
fn open_perception(config: &Config) -> Result<Box<dyn PerceptionSource>, Box<dyn Error>> {
    match &config.detector_command {
        Some(command) => {
            let source = LandmarkProcessSource::spawn(command, config.detector_read_timeout())
                .map_err(|e| {
                    error!(error = %e, "eye detector unavailable");
                    e
                })?;
            Ok(Box::new(source))
        }
        None => {
            info!("no eye detector configured, eyes count as open");
            Ok(Box::new(AlwaysOpenSource))
        }
    }
}

fn setup_terminal() -> io::Result<Terminal<CrosstermBackend<Stdout>>> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    Terminal::new(backend)
}

fn restore_terminal<B: Backend + io::Write>(terminal: &mut Terminal<B>) -> io::Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()
}

fn start_tui<B: Backend>(
    renderer: &mut TerminalRenderer<B>,
    app: &mut App,
    source: &mut dyn PerceptionSource,
    interval: Duration,
) -> io::Result<()> {
    let runner = Runner::new(CrosstermEventSource::new(), FixedTicker::new(interval));
    let clock = SystemClock::new();

    loop {
        let events = runner.drain_tick();
        if !app.run_frame(&events, source, renderer, clock.now(), interval)? {
            break;
        }
    }

    Ok(())
}
