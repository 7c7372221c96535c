use anyhow::{Context, Result};
use clap::Parser;
use grid_snake::game::GameConfig;
use grid_snake::modes::PlayMode;
use grid_snake::persistence::{DEFAULT_HIGH_SCORE_FILE, HighScoreStore};
use grid_snake::session::SessionController;
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "grid_snake")]
#[command(version, about = "Snake in the terminal")]
struct Cli {
    /// JSON file with game options; flags below override it
    #[arg(long)]
    config: Option<PathBuf>,

    /// Grid width
    #[arg(long)]
    width: Option<usize>,

    /// Grid height
    #[arg(long)]
    height: Option<usize>,

    /// Initial game speed
    #[arg(long)]
    speed: Option<u32>,

    /// Lowest selectable speed
    #[arg(long)]
    min_speed: Option<u32>,

    /// Highest selectable speed
    #[arg(long)]
    max_speed: Option<u32>,

    /// Points for ordinary food
    #[arg(long)]
    ordinary_points: Option<u32>,

    /// Points for bonus food
    #[arg(long)]
    bonus_points: Option<u32>,

    /// Chance (0-1) that new food is bonus food
    #[arg(long)]
    bonus_probability: Option<f64>,

    /// RNG seed for reproducible games
    #[arg(long)]
    seed: Option<u64>,

    /// Where the high score is kept
    #[arg(long, default_value = DEFAULT_HIGH_SCORE_FILE)]
    high_score_file: PathBuf,

    /// Log file (the terminal is taken over by the game)
    #[arg(long, default_value = "grid_snake.log")]
    log_file: PathBuf,
}

impl Cli {
    /// Defaults, then the config file, then individual flags
    fn game_config(&self) -> Result<GameConfig> {
        let mut config = match &self.config {
            Some(path) => GameConfig::from_json_file(path)?,
            None => GameConfig::default(),
        };

        if let Some(width) = self.width {
            config.grid_width = width;
        }
        if let Some(height) = self.height {
            config.grid_height = height;
        }
        if let Some(speed) = self.speed {
            config.initial_speed = speed;
        }
        if let Some(min_speed) = self.min_speed {
            config.min_speed = min_speed;
        }
        if let Some(max_speed) = self.max_speed {
            config.max_speed = max_speed;
        }
        if let Some(points) = self.ordinary_points {
            config.ordinary_points = points;
        }
        if let Some(points) = self.bonus_points {
            config.bonus_points = points;
        }
        if let Some(probability) = self.bonus_probability {
            config.bonus_probability = probability;
        }
        if self.seed.is_some() {
            config.seed = self.seed;
        }

        Ok(config)
    }
}

fn init_logging(path: &Path) {
    let file = match OpenOptions::new().create(true).append(true).open(path) {
        Ok(file) => file,
        Err(err) => {
            eprintln!("Logging disabled, cannot open {:?}: {}", path, err);
            return;
        }
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.log_file);

    let config = cli.game_config()?;
    info!(?config, "starting grid_snake v{}", env!("CARGO_PKG_VERSION"));

    let store = HighScoreStore::new(&cli.high_score_file);
    let session = SessionController::new(config, store).context("Invalid game configuration")?;

    let mut play_mode = PlayMode::new(session);
    play_mode.run().await?;

    let session = play_mode.session();
    println!(
        "Game Over! Your score: {}, High Score: {}",
        session.score(),
        session.high_score()
    );

    Ok(())
}
