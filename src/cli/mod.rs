//! Command-line interface for the tracking pipeline.

use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use log::{error, info, warn};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::config::PipelineConfig;
use crate::core::loaders::{self, FrameKey, GameInfo};

#[derive(Parser)]
#[command(name = "gridiron-tracking")]
#[command(about = "Nearest-opponent distances and plots for football tracking data", version)]
pub struct Cli {
    /// Path to YAML config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Increase verbosity
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute the nearest opponent of every player in every frame
    Nearest {
        /// Tracking CSV file, or a directory of weekly tracking files
        input_path: PathBuf,
        /// Output directory for result CSVs (defaults to the input directory)
        #[arg(short, long)]
        output_dir: Option<PathBuf>,
        /// Games CSV, needed when tracking files label players by club
        #[arg(long)]
        games: Option<PathBuf>,
        /// Mirror left-moving plays so offense moves toward increasing x
        #[arg(long)]
        normalize: bool,
        /// Process frames on a single thread
        #[arg(long)]
        sequential: bool,
    },

    /// Summarize nearest-opponent distances per play, joined with play data
    Summarize {
        /// Tracking CSV file
        tracking: PathBuf,
        /// Plays CSV with possession team and pass result
        #[arg(long)]
        plays: PathBuf,
        /// Games CSV, needed when tracking files label players by club
        #[arg(long)]
        games: Option<PathBuf>,
        /// Output CSV (defaults to <tracking stem>_play_summary.csv)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Plot one frame of a play as PNG
    Plot {
        /// Tracking CSV file
        tracking: PathBuf,
        #[arg(long)]
        game: u64,
        #[arg(long)]
        play: u32,
        #[arg(long)]
        frame: u32,
        /// Games CSV, needed when tracking files label players by club
        #[arg(long)]
        games: Option<PathBuf>,
        /// Output PNG (defaults to <game>_<play>_<frame>.png next to the input)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Do not draw links to nearest opponents
        #[arg(long)]
        no_links: bool,
    },

    /// Animate every frame of a play as GIF
    Animate {
        /// Tracking CSV file
        tracking: PathBuf,
        #[arg(long)]
        game: u64,
        #[arg(long)]
        play: u32,
        /// Games CSV, needed when tracking files label players by club
        #[arg(long)]
        games: Option<PathBuf>,
        /// Output GIF (defaults to <game>_<play>.gif next to the input)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Delay between frames in milliseconds
        #[arg(long)]
        delay: Option<u32>,
    },
}

/// Create a spinner for indeterminate operations
fn create_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}

/// Create a bar for a known number of files
fn create_progress_bar(len: u64) -> ProgressBar {
    let pb = ProgressBar::new(len);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{bar:40.cyan/blue} {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );
    pb
}

/// Print a summary box
fn print_summary(title: &str, items: &[(&str, String)]) {
    println!();
    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║ {:<60} ║", title);
    println!("╠══════════════════════════════════════════════════════════════╣");
    for (key, value) in items {
        let display_value = if value.chars().count() > 37 {
            let head: String = value.chars().take(34).collect();
            format!("{}...", head)
        } else {
            value.clone()
        };
        println!("║ {:<20}: {:<37} ║", key, display_value);
    }
    println!("╚══════════════════════════════════════════════════════════════╝");
    println!();
}

/// Log the error and exit with status 1.
fn fail(context: &str, e: impl std::fmt::Display) -> ! {
    error!("{}: {}", context, e);
    std::process::exit(1);
}

fn load_games(path: Option<&Path>) -> Option<HashMap<u64, GameInfo>> {
    let path = path?;
    match loaders::load_games_csv(path) {
        Ok(games) => {
            info!("Loaded {} games from {}", games.len(), path.display());
            Some(games)
        }
        Err(e) => fail("Failed to load games", e),
    }
}

fn default_output(input: &Path, file_name: String) -> PathBuf {
    input.parent().unwrap_or(Path::new(".")).join(file_name)
}

pub fn run() {
    let cli = Cli::parse();

    // Initialize logging based on verbosity (must come first)
    env_logger::Builder::new()
        .filter_level(match cli.verbose {
            0 => log::LevelFilter::Warn,
            1 => log::LevelFilter::Info,
            _ => log::LevelFilter::Debug,
        })
        .format_timestamp_secs()
        .init();

    // Load config
    let config = match &cli.config {
        Some(path) => match PipelineConfig::from_yaml(path) {
            Ok(cfg) => {
                info!("Loaded config from: {}", path.display());
                cfg
            }
            Err(e) => {
                warn!("Failed to load config from {}: {}, using defaults", path.display(), e);
                PipelineConfig::default()
            }
        },
        None => PipelineConfig::default(),
    };

    // Dispatch to subcommands
    match cli.command {
        Commands::Nearest {
            input_path,
            output_dir,
            games,
            normalize,
            sequential,
        } => {
            cmd_nearest(
                &input_path,
                output_dir,
                games,
                normalize,
                sequential,
                config,
            );
        }
        Commands::Summarize {
            tracking,
            plays,
            games,
            output,
        } => {
            cmd_summarize(&tracking, &plays, games, output, &config);
        }
        Commands::Plot {
            tracking,
            game,
            play,
            frame,
            games,
            output,
            no_links,
        } => {
            let key = FrameKey {
                game_id: game,
                play_id: play,
                frame_id: frame,
            };
            cmd_plot(&tracking, key, games, output, no_links, config);
        }
        Commands::Animate {
            tracking,
            game,
            play,
            games,
            output,
            delay,
        } => {
            cmd_animate(&tracking, game, play, games, output, delay, config);
        }
    }
}

fn cmd_nearest(
    input_path: &Path,
    output_dir: Option<PathBuf>,
    games: Option<PathBuf>,
    normalize: bool,
    sequential: bool,
    mut config: PipelineConfig,
) {
    use crate::processors::{discovery, proximity};

    let start = Instant::now();

    // CLI flags override config
    config.ingest.normalize_direction |= normalize;
    if sequential {
        config.proximity.parallel = false;
    }

    let games = load_games(games.as_deref());

    let inputs = if input_path.is_dir() {
        match discovery::find_tracking_files(input_path) {
            Ok(files) if files.is_empty() => {
                fail("No tracking files found", input_path.display())
            }
            Ok(files) => files,
            Err(e) => fail("Failed to scan directory", e),
        }
    } else {
        vec![input_path.to_path_buf()]
    };

    println!("Computing nearest opponents...");
    println!("Input files: {}", inputs.len());
    println!("Normalize direction: {}", config.ingest.normalize_direction);
    println!("Parallel: {}", config.proximity.parallel);

    let bar = create_progress_bar(inputs.len() as u64);
    let mut outputs = Vec::with_capacity(inputs.len());
    let mut total_results = 0usize;
    let mut total_skipped = 0usize;
    let mut total_frames = 0usize;

    for path in &inputs {
        bar.set_message(
            path.file_name()
                .map(|s| s.to_string_lossy().to_string())
                .unwrap_or_default(),
        );

        match proximity::process_tracking_csv(
            path,
            output_dir.as_deref(),
            games.as_ref(),
            &config,
        ) {
            Ok((csv_path, report)) => {
                total_results += report.results.len();
                total_skipped += report.skipped_no_opponent;
                total_frames += report.groups;
                outputs.push(csv_path);
            }
            Err(e) => {
                bar.finish_and_clear();
                fail("Nearest-opponent computation failed", format!("{:#}", e));
            }
        }
        bar.inc(1);
    }
    bar.finish_and_clear();

    let output_files: Vec<String> = outputs.iter().map(|p| p.display().to_string()).collect();

    print_summary(
        "Nearest Opponent Complete",
        &[
            ("Input", input_path.display().to_string()),
            ("Output files", output_files.join(", ")),
            ("Frames", total_frames.to_string()),
            ("Results", total_results.to_string()),
            ("No opponent", total_skipped.to_string()),
            ("Duration", format!("{:.2?}", start.elapsed())),
        ],
    );
}

fn cmd_summarize(
    tracking: &Path,
    plays_path: &Path,
    games: Option<PathBuf>,
    output: Option<PathBuf>,
    config: &PipelineConfig,
) {
    use crate::core::{transforms, writers};
    use crate::processors::proximity;

    let start = Instant::now();

    let games = load_games(games.as_deref());
    let plays = match loaders::load_plays_csv(plays_path) {
        Ok(plays) => plays,
        Err(e) => fail("Failed to load plays", e),
    };

    let output_path = output.unwrap_or_else(|| {
        let stem = tracking
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default();
        default_output(tracking, format!("{}_play_summary.csv", stem))
    });

    println!("Summarizing nearest-opponent distances per play...");
    println!("Tracking: {}", tracking.display());
    println!("Plays: {}", plays_path.display());
    println!("Output: {}", output_path.display());

    let spinner = create_spinner("Computing nearest opponents...");

    let loaded = proximity::load_player_positions(tracking, games.as_ref(), &config.ingest);
    let (records, _) = match loaded {
        Ok(loaded) => loaded,
        Err(e) => {
            spinner.finish_and_clear();
            fail("Failed to load tracking data", format!("{:#}", e));
        }
    };

    let computer = proximity::NearestOpponentComputer::new(config.proximity.clone());
    let report = match computer.compute(&records) {
        Ok(report) => report,
        Err(e) => {
            spinner.finish_and_clear();
            fail("Nearest-opponent computation failed", e);
        }
    };

    spinner.set_message("Writing play summaries...");
    let summaries = transforms::summarize_by_play(&report.results, &plays);
    let matched = summaries
        .iter()
        .filter(|s| s.possession_team.is_some())
        .count();

    if let Err(e) = writers::write_play_summary_csv(&output_path, &summaries) {
        spinner.finish_and_clear();
        fail("Failed to write summary", e);
    }
    spinner.finish_and_clear();

    print_summary(
        "Play Summary Complete",
        &[
            ("Tracking file", tracking.display().to_string()),
            ("Output CSV", output_path.display().to_string()),
            ("Plays", summaries.len().to_string()),
            ("Matched in plays", matched.to_string()),
            ("No opponent", report.skipped_no_opponent.to_string()),
            ("Parallel", computer.config().parallel.to_string()),
            ("Duration", format!("{:.2?}", start.elapsed())),
        ],
    );
}

fn cmd_plot(
    tracking: &Path,
    key: FrameKey,
    games: Option<PathBuf>,
    output: Option<PathBuf>,
    no_links: bool,
    mut config: PipelineConfig,
) {
    use crate::core::transforms;
    use crate::processors::proximity;
    use crate::visualization;

    let start = Instant::now();

    if no_links {
        config.plot.draw_links = false;
    }

    let output_path = output.unwrap_or_else(|| {
        default_output(
            tracking,
            format!("{}_{}_{}.png", key.game_id, key.play_id, key.frame_id),
        )
    });

    println!("Plotting frame...");
    println!("Input: {}", tracking.display());
    println!("Output: {}", output_path.display());

    let spinner = create_spinner("Loading tracking data...");

    let games = load_games(games.as_deref());
    let loaded = proximity::load_player_positions(tracking, games.as_ref(), &config.ingest);
    let records = match loaded {
        Ok((records, _)) => transforms::select_play(&records, key.game_id, key.play_id),
        Err(e) => {
            spinner.finish_and_clear();
            fail("Failed to load tracking data", format!("{:#}", e));
        }
    };

    spinner.set_message("Computing nearest opponents...");
    let computer = proximity::NearestOpponentComputer::new(config.proximity.clone());
    let report = match computer.compute(&records) {
        Ok(report) => report,
        Err(e) => {
            spinner.finish_and_clear();
            fail("Nearest-opponent computation failed", e);
        }
    };

    spinner.set_message("Generating plot...");
    match visualization::plot_frame(&output_path, &records, &report.results, key, &config.plot) {
        Ok(()) => {
            spinner.finish_and_clear();
            let players = records.iter().filter(|r| r.frame_key() == key).count();

            print_summary(
                "Frame Plot Complete",
                &[
                    ("Input file", tracking.display().to_string()),
                    ("Output PNG", output_path.display().to_string()),
                    ("Frame", format!("{}/{}/{}", key.game_id, key.play_id, key.frame_id)),
                    ("Players", players.to_string()),
                    ("Duration", format!("{:.2?}", start.elapsed())),
                ],
            );
        }
        Err(e) => {
            spinner.finish_and_clear();
            fail("Plot failed", e);
        }
    }
}

fn cmd_animate(
    tracking: &Path,
    game_id: u64,
    play_id: u32,
    games: Option<PathBuf>,
    output: Option<PathBuf>,
    delay: Option<u32>,
    mut config: PipelineConfig,
) {
    use crate::core::transforms;
    use crate::processors::proximity;
    use crate::visualization;

    let start = Instant::now();

    if let Some(delay) = delay {
        config.plot.frame_delay_ms = delay;
    }

    let output_path = output
        .unwrap_or_else(|| default_output(tracking, format!("{}_{}.gif", game_id, play_id)));

    println!("Animating play...");
    println!("Input: {}", tracking.display());
    println!("Output: {}", output_path.display());
    println!("Frame delay: {} ms", config.plot.frame_delay_ms);

    let spinner = create_spinner("Loading tracking data...");

    let games = load_games(games.as_deref());
    let loaded = proximity::load_player_positions(tracking, games.as_ref(), &config.ingest);
    let records = match loaded {
        Ok((records, _)) => transforms::select_play(&records, game_id, play_id),
        Err(e) => {
            spinner.finish_and_clear();
            fail("Failed to load tracking data", format!("{:#}", e));
        }
    };

    spinner.set_message("Computing nearest opponents...");
    let computer = proximity::NearestOpponentComputer::new(config.proximity.clone());
    let report = match computer.compute(&records) {
        Ok(report) => report,
        Err(e) => {
            spinner.finish_and_clear();
            fail("Nearest-opponent computation failed", e);
        }
    };

    spinner.set_message("Rendering frames...");
    match visualization::animate_play(
        &output_path,
        &records,
        &report.results,
        game_id,
        play_id,
        &config.plot,
    ) {
        Ok(frames) => {
            spinner.finish_and_clear();

            print_summary(
                "Animation Complete",
                &[
                    ("Input file", tracking.display().to_string()),
                    ("Output GIF", output_path.display().to_string()),
                    ("Play", format!("{}/{}", game_id, play_id)),
                    ("Frames", frames.to_string()),
                    ("Duration", format!("{:.2?}", start.elapsed())),
                ],
            );
        }
        Err(e) => {
            spinner.finish_and_clear();
            fail("Animation failed", e);
        }
    }
}
