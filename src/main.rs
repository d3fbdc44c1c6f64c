mod ui;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use egui::Vec2;
use itertools::Itertools;
use log::{error, info};

use mapty::form::list_entry;
use mapty::geolocation::{FixedPosition, GeolocationRequest};
use mapty::{AppConfig, Coords, FileStore, MaptyError, WorkoutLog, WorkoutStorage};
use ui::MaptyApp;
use ui::tile_map::TileMap;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
struct Args {
    /// Directory holding the workout store
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Open the map (default)
    Run {
        #[arg(long, requires = "lon", allow_negative_numbers = true)]
        lat: Option<f64>,

        #[arg(long, requires = "lat", allow_negative_numbers = true)]
        lon: Option<f64>,
    },
    /// Print the stored workouts
    List,
    /// Delete every stored workout
    Reset,
    /// Write a config file with default values if there is none and print its path
    Config,
}

fn open_storage(
    data_dir: Option<PathBuf>,
    config: &AppConfig,
) -> Result<WorkoutStorage, MaptyError> {
    let store = match data_dir.or_else(|| config.data_dir.clone()) {
        Some(path) => FileStore::new(path)?,
        None => FileStore::new_default()?,
    };
    info!("Using workout store in {:?}", store.storage_path());
    Ok(WorkoutStorage::new(store))
}

fn run(
    position: Option<Coords>,
    storage: WorkoutStorage,
    config: AppConfig,
) -> Result<(), MaptyError> {
    let geolocation =
        GeolocationRequest::spawn(FixedPosition::new(position.or(config.home_position)));
    let log = WorkoutLog::new(TileMap::new(config.attribution_url.clone()), storage, &config);

    let mut native_options = eframe::NativeOptions::default();
    native_options.viewport = native_options
        .viewport
        .with_title("mapty")
        .with_inner_size(Vec2::new(1280., 800.));

    eframe::run_native(
        "mapty",
        native_options,
        Box::new(|cc| Ok(Box::new(MaptyApp::new(log, geolocation, cc)))),
    )
    .map_err(|e| MaptyError::UiStartError {
        reason: e.to_string(),
    })
}

fn list(storage: &WorkoutStorage) {
    let workouts = storage.load();
    if workouts.is_empty() {
        println!("No workouts stored");
        return;
    }
    for workout in &workouts {
        let entry = list_entry(workout);
        println!(
            "{}  {:<24} {}  [{}]",
            entry.id,
            entry.title,
            entry
                .details
                .iter()
                .map(|d| format!("{} {}", d.value, d.unit))
                .join(", "),
            workout.coords()
        );
    }
}

fn init_config(config: &AppConfig) -> Result<(), MaptyError> {
    let path = AppConfig::config_path()?;
    if !path.exists() {
        config.save()?;
    }
    println!("{}", path.display());
    Ok(())
}

fn main() {
    #[cfg(debug_assertions)]
    colog::init();

    let cli = Args::parse();
    if let Err(e) = ctrlc::set_handler(move || {
        println!("Exiting...");
        std::process::exit(0);
    }) {
        error!("Could not set Ctrl-C handler: {}", e);
    }

    let config = AppConfig::from_local_file().unwrap_or_default();
    let command = cli.command.unwrap_or(Commands::Run {
        lat: None,
        lon: None,
    });

    let result = match command {
        Commands::Run { lat, lon } => {
            let position = lat.zip(lon).map(|(lat, lon)| Coords::new(lat, lon));
            open_storage(cli.data_dir, &config).and_then(|storage| run(position, storage, config))
        }
        Commands::List => open_storage(cli.data_dir, &config).map(|storage| list(&storage)),
        Commands::Reset => open_storage(cli.data_dir, &config)
            .and_then(|mut storage| storage.reset())
            .map(|_| println!("Stored workouts cleared")),
        Commands::Config => init_config(&config),
    };

    if let Err(e) = result {
        error!("{}", e);
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
