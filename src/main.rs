//! GoldenEyes - face-tracked eyeball overlay
//!
//! Main entry point for the CLI application.

use clap::Parser;
use std::path::PathBuf;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, error, info, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use goldeneyes::{
    audio::{SilentBackend, SoundBackend, TapOutcome},
    config::{Config, TrackingProtocol},
    demo::{self, console::HELP, Command, DemoScreen, Screen},
    tracking::{SessionFrame, UdpFaceTracker},
};

/// GoldenEyes - two eyeballs that follow your face
#[derive(Parser, Debug)]
#[command(name = "goldeneyes", version, about, long_about = None)]
struct Args {
    /// Configuration file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Open this screen directly (1/reality-composer or 2/pure-code)
    #[arg(short, long)]
    screen: Option<Screen>,

    /// Tracking protocol: vmc or mediapipe (overrides config)
    #[arg(long, value_parser = parse_protocol)]
    protocol: Option<TrackingProtocol>,

    /// Tracking UDP port (overrides config)
    #[arg(short, long)]
    port: Option<u16>,

    /// Disable the tap sound
    #[arg(long)]
    no_audio: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn parse_protocol(s: &str) -> Result<TrackingProtocol, String> {
    match s.to_lowercase().as_str() {
        "vmc" | "osc" => Ok(TrackingProtocol::Vmc),
        "mediapipe" | "mp" => Ok(TrackingProtocol::MediaPipe),
        other => Err(format!("unknown protocol '{}', expected vmc or mediapipe", other)),
    }
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let log_level = if args.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(
            EnvFilter::builder()
                .with_default_directive(log_level.into())
                .from_env_lossy(),
        )
        .init();

    info!("Starting {} v{}", goldeneyes::NAME, goldeneyes::VERSION);

    let config = load_config(&args)?;

    // Scene, session and audio output all live on this one thread
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    runtime.block_on(run(config))?;

    info!("GoldenEyes stopped");
    Ok(())
}

/// Load configuration and apply CLI overrides
fn load_config(args: &Args) -> anyhow::Result<Config> {
    let mut config = if let Some(ref path) = args.config {
        Config::from_file(path)?
    } else {
        Config::load()?
    };

    if let Some(protocol) = args.protocol {
        config.tracking.protocol = protocol;
    }
    if let Some(port) = args.port {
        config.tracking.port = port;
    }
    if args.no_audio {
        config.audio.enabled = false;
    }
    if let Some(screen) = args.screen {
        config.app.start_screen = Some(screen);
    }

    config.validate()?;

    info!(
        "Tracking: {:?} on {}:{}",
        config.tracking.protocol, config.tracking.listen_address, config.tracking.port
    );
    info!("Tap sound: {}", config.audio.enabled);

    Ok(config)
}

async fn run(config: Config) -> anyhow::Result<()> {
    let mut tracker = UdpFaceTracker::new(&config.tracking);
    let mut app = App::new(config);

    print!("{}", demo::render_menu());
    if let Some(screen) = app.config.app.start_screen {
        app.open(screen, &mut tracker)?;
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else {
                    debug!("stdin closed");
                    break;
                };
                if !app.handle_line(&line, &mut tracker)? {
                    break;
                }
            }
            Some(frame) = tracker.recv() => {
                app.on_frame(&frame);
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Shutdown signal received");
                break;
            }
        }
    }

    app.close_screen(&mut tracker);
    Ok(())
}

/// Navigation state: the menu, or one open screen
struct App {
    config: Config,
    screen: Option<DemoScreen<Box<dyn SoundBackend>>>,
}

impl App {
    fn new(config: Config) -> Self {
        Self {
            config,
            screen: None,
        }
    }

    /// Handle one console line; returns false to quit
    fn handle_line(&mut self, line: &str, tracker: &mut UdpFaceTracker) -> anyhow::Result<bool> {
        if line.trim().is_empty() {
            return Ok(true);
        }

        let command = match line.parse::<Command>() {
            Ok(command) => command,
            Err(e) => {
                println!("{}", e);
                return Ok(true);
            }
        };

        match command {
            Command::Menu => print!("{}", demo::render_menu()),
            Command::Open(screen) => self.open(screen, tracker)?,
            Command::Back => {
                self.close_screen(tracker);
                print!("{}", demo::render_menu());
            }
            Command::Toggle => match self.screen.as_mut() {
                Some(screen) => {
                    let visibility = screen.toggle(tracker)?;
                    println!("{:?} (button: {})", visibility, visibility.button_label());
                }
                None => println!("No screen open"),
            },
            Command::Tap { x, y } => match self.screen.as_mut().map(|s| s.tap(x, y)) {
                Some(Some(TapOutcome::Miss)) => println!("Nothing there"),
                Some(Some(TapOutcome::Played(entity))) => println!("Click! ({:?})", entity),
                Some(Some(TapOutcome::Silent(entity))) => println!("Hit {:?} (no sound)", entity),
                Some(None) => println!("Taps are not handled on this screen"),
                None => println!("No screen open"),
            },
            Command::Status => match &self.screen {
                Some(screen) => println!("{}", screen.status()),
                None => println!("{}", demo::MENU_TITLE),
            },
            Command::Help => println!("{}", HELP),
            Command::Quit => return Ok(false),
        }

        Ok(true)
    }

    /// Open a screen, replacing the current one. Tracking failure is fatal.
    fn open(&mut self, screen: Screen, tracker: &mut UdpFaceTracker) -> anyhow::Result<()> {
        self.close_screen(tracker);

        let backend = make_backend(&self.config);
        let opened = DemoScreen::open(screen, &self.config, tracker, backend).map_err(|e| {
            error!("Cannot start face tracking: {}", e);
            e
        })?;

        println!("{} (button: {})", screen.title(), opened.visibility().button_label());
        self.screen = Some(opened);
        Ok(())
    }

    fn close_screen(&mut self, tracker: &mut UdpFaceTracker) {
        if let Some(screen) = self.screen.take() {
            screen.close(tracker);
        }
    }

    fn on_frame(&mut self, frame: &SessionFrame) {
        match self.screen.as_mut() {
            Some(screen) => {
                screen.on_frame(frame);
            }
            None => tracing::trace!("Frame with no screen open"),
        }
    }
}

/// Sound backend for the tap click, if sound is enabled
fn make_backend(config: &Config) -> Option<Box<dyn SoundBackend>> {
    if !config.audio.enabled {
        return None;
    }

    #[cfg(feature = "playback")]
    {
        match goldeneyes::audio::RodioBackend::new(&config.audio.sounds_dir) {
            Ok(backend) => return Some(Box::new(backend)),
            Err(e) => tracing::warn!("{}, clicks will only be logged", e),
        }
    }

    Some(Box::new(SilentBackend::new(&config.audio.sounds_dir)))
}
