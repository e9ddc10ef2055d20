use clap::{Parser, ValueEnum};
use crossterm::terminal;
use log::{info, LevelFilter};
use simplelog::{Config, WriteLogger};
use std::error::Error;
use std::fs::File;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use torus_snake::{CliRenderer, Game, GameConfig, Input, Position, Renderer};

#[derive(Parser, Debug)]
#[command(name = "torus-snake", about = "Snake on a wrap-around grid")]
struct Args {
    /// Side of the square grid
    #[arg(long, default_value_t = 20)]
    grid_size: i32,

    /// Starting head cell, as X,Y
    #[arg(long, value_parser = parse_position, default_value = "2,2")]
    head: Position,

    /// Starting food cell, as X,Y
    #[arg(long, value_parser = parse_position, default_value = "10,10")]
    food: Position,

    /// 1 moves every 400ms, 2 every 200ms, ...
    #[arg(long, default_value_t = 1)]
    speed: u32,

    /// Explicit tick period in milliseconds (overrides --speed)
    #[arg(long)]
    tick_ms: Option<u64>,

    /// Seed for food placement
    #[arg(long)]
    seed: Option<u64>,

    /// Write logs to this file (nothing is logged otherwise)
    #[arg(long)]
    log_file: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = LogLevel::Info)]
    log_level: LogLevel,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

impl Args {
    fn game_config(&self) -> GameConfig {
        let config = GameConfig::new(self.grid_size)
            .with_head(self.head)
            .with_food(self.food)
            .with_speed(self.speed);

        match self.tick_ms {
            Some(ms) => config.with_tick_interval(Duration::from_millis(ms)),
            None => config,
        }
    }
}

fn parse_position(s: &str) -> Result<Position, String> {
    let (x, y) = s
        .split_once(',')
        .ok_or_else(|| format!("expected X,Y but got `{}`", s))?;
    let x = x.trim().parse::<i32>().map_err(|e| format!("bad x in `{}`: {}", s, e))?;
    let y = y.trim().parse::<i32>().map_err(|e| format!("bad y in `{}`: {}", s, e))?;
    Ok(Position::new(x, y))
}

fn init_logging(args: &Args) -> Result<(), Box<dyn Error>> {
    // The terminal is in raw mode on the alternate screen, so logs only go to a file
    if let Some(path) = &args.log_file {
        WriteLogger::init(args.log_level.into(), Config::default(), File::create(path)?)?;
    }
    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    init_logging(&args)?;

    let config = args.game_config();
    let mut game = match args.seed {
        Some(seed) => Game::with_seed(config, seed)?,
        None => Game::new(config)?,
    };

    // Each cell is 2 chars wide, plus 4 lines at the bottom for info display
    let (term_width, term_height) = terminal::size()?;
    let grid_size = game.config().grid_size;
    if grid_size * 2 > i32::from(term_width) || grid_size + 4 > i32::from(term_height) {
        return Err(format!(
            "a {}x{} grid needs a {}x{} terminal, this one is {}x{}",
            grid_size,
            grid_size,
            grid_size * 2,
            grid_size + 4,
            term_width,
            term_height
        )
        .into());
    }

    let tick_interval = game.config().tick_interval;
    info!("starting {}x{} game, tick every {:?}", grid_size, grid_size, tick_interval);

    let mut renderer = CliRenderer::new();
    renderer.init()?;

    let mut snapshot = game.snapshot();
    let mut last_tick = Instant::now();

    loop {
        if let Some(input) = renderer.poll_input()? {
            match input {
                Input::Direction(direction) => {
                    game.set_direction(direction);
                }
                Input::Quit => {
                    break;
                }
                Input::Restart => {
                    game.reset();
                }
                Input::Tap if snapshot.is_over() => {
                    game.reset();
                }
                Input::Tap => {}
            }
            snapshot = game.snapshot();
        }

        // One clock drives the game at a fixed rate
        if last_tick.elapsed() >= tick_interval {
            game.tick();
            last_tick = Instant::now();
            snapshot = game.snapshot();
        }

        // Let renderer decide when to actually render
        renderer.render(&snapshot)?;
    }

    renderer.cleanup()?;
    info!("quit with score {}", game.score());
    Ok(())
}
