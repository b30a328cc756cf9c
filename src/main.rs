mod app;
mod camera;
mod command;
mod config;
mod consts;
mod engine;
mod game;
mod logging;
mod util;
mod warning;
use crate::app::App;
use crate::camera::{FaceJoystick, LumaDetector, NoCamera, SimulatedCamera};
use crate::config::{CameraKind, Config, ConfigError, LogLevel};
use crate::engine::face::Camera;
use crate::engine::Engine;
use crate::game::Game;
use crate::warning::Warning;
use lexopt::{Arg, Parser, ValueExt};
use std::io::{self, ErrorKind};
use std::path::PathBuf;
use std::process::ExitCode;

const USAGE: &str = "\
Usage: revivesnake [-c|--config <PATH>] [--log-level <LEVEL>]

Play snake in the terminal.  When the snake dies, answer a math question or
move your face from left to right to bring it back.

Options:
  -c, --config <PATH>    Read configuration from the given file
      --log-level <LEVEL>
                         Log at the given level (trace, debug, info, warn,
                         error) instead of the configured one
  -h, --help             Show this help and exit
  -V, --version          Show the program version and exit
";

#[derive(Clone, Debug, Eq, PartialEq)]
enum Invocation {
    Run {
        config: Option<PathBuf>,
        log_level: Option<LogLevel>,
    },
    Help,
    Version,
}

impl Invocation {
    fn from_parser(mut parser: Parser) -> Result<Invocation, lexopt::Error> {
        let mut config = None;
        let mut log_level = None;
        while let Some(arg) = parser.next()? {
            match arg {
                Arg::Short('c') | Arg::Long("config") => {
                    config = Some(PathBuf::from(parser.value()?));
                }
                Arg::Long("log-level") => log_level = Some(parser.value()?.parse::<LogLevel>()?),
                Arg::Short('h') | Arg::Long("help") => return Ok(Invocation::Help),
                Arg::Short('V') | Arg::Long("version") => return Ok(Invocation::Version),
                _ => return Err(arg.unexpected()),
            }
        }
        Ok(Invocation::Run { config, log_level })
    }
}

fn main() -> ExitCode {
    match Invocation::from_parser(Parser::from_env()) {
        Ok(Invocation::Run { config, log_level }) => run(config, log_level),
        Ok(Invocation::Help) => {
            print!("{USAGE}");
            ExitCode::SUCCESS
        }
        Ok(Invocation::Version) => {
            println!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("revivesnake: {e}");
            eprint!("{USAGE}");
            ExitCode::from(2)
        }
    }
}

fn run(config_path: Option<PathBuf>, log_level: Option<LogLevel>) -> ExitCode {
    // Problems found before the terminal is taken over are shown in pop-ups
    // once the game starts
    let mut warnings = Vec::new();
    let mut config = load_config(config_path).unwrap_or_else(|e| {
        warnings.push(Warning::from(e));
        Config::default()
    });
    if let Some(level) = log_level {
        config.log.level = level;
    }
    match logging::init(&config.log) {
        Ok(Some(path)) => tracing::info!(
            log_file = %path.display(),
            camera = ?config.camera,
            version = env!("CARGO_PKG_VERSION"),
            "starting up"
        ),
        Ok(None) => (),
        Err(e) => warnings.push(Warning::from(e)),
    }
    let (camera, joystick): (Box<dyn Camera>, Option<FaceJoystick>) = match config.camera {
        CameraKind::Simulated => {
            let (camera, joystick) = SimulatedCamera::new();
            (Box::new(camera), Some(joystick))
        }
        CameraKind::None => (Box::new(NoCamera), None),
    };
    let mut game = Game::new(Engine::new(camera, Box::new(LumaDetector)), joystick);
    for w in warnings {
        game.push_warning(w);
    }
    let terminal = ratatui::init();
    let r = App::new(game).run(terminal);
    ratatui::restore();
    tracing::info!("shutting down");
    io_exit(r)
}

/// Load the configuration file given on the command line, or else the one at
/// the default path if there is one
fn load_config(path: Option<PathBuf>) -> Result<Config, ConfigError> {
    match path {
        Some(p) => Config::load(&p, false),
        None => Config::load(&Config::default_path()?, true),
    }
}

fn io_exit(r: io::Result<()>) -> ExitCode {
    match r {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) if e.kind() == ErrorKind::BrokenPipe => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "terminal I/O failed");
            eprintln!("{e}");
            ExitCode::from(2)
        }
    }
}
