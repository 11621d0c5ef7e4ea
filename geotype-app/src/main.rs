use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use geotype::provider::{DirectionsOptions, TravelMode};
use geotype::{Document, MapsConfig, MapsService};
use serde::Serialize;

/// Geocoding, directions and place lookups against Google Maps
#[derive(Parser)]
#[command(name = "geotype-app")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// API key; read from GOOGLE_MAPS_API_KEY when omitted
    #[arg(short = 'k', long, global = true)]
    api_key: Option<String>,

    /// Response language
    #[arg(short, long, global = true)]
    language: Option<String>,

    /// Region bias (ccTLD code)
    #[arg(short, long, global = true)]
    region: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Look up the location of an address
    Geocode {
        address: String,
    },

    /// Look up the address at a coordinate
    Reverse {
        /// Latitude in decimal degrees
        #[arg(long, allow_negative_numbers = true)]
        lat: f64,

        /// Longitude in decimal degrees
        #[arg(long, allow_negative_numbers = true)]
        lng: f64,
    },

    /// Compute a route between two places
    Directions {
        origin: String,
        destination: String,

        #[arg(short, long, value_enum, default_value_t = Mode::Driving)]
        mode: Mode,

        /// Intermediate stop, repeatable
        #[arg(short, long = "via")]
        waypoints: Vec<String>,

        #[arg(long)]
        avoid_tolls: bool,

        #[arg(long)]
        avoid_highways: bool,

        /// Ask for alternative routes
        #[arg(long)]
        alternatives: bool,
    },

    /// Fetch details for a place id
    Place {
        place_id: String,

        /// Fields to request, comma separated
        #[arg(short, long, value_delimiter = ',')]
        fields: Vec<String>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Mode {
    Driving,
    Walking,
    Bicycling,
    Transit,
}

impl From<Mode> for TravelMode {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::Driving => TravelMode::Driving,
            Mode::Walking => TravelMode::Walking,
            Mode::Bicycling => TravelMode::Bicycling,
            Mode::Transit => TravelMode::Transit,
        }
    }
}

fn config_from(cli: &Cli) -> Result<MapsConfig> {
    let mut config = match &cli.api_key {
        Some(key) => MapsConfig::new(key.clone()),
        None => MapsConfig::from_env().context("no API key given")?,
    };
    if let Some(language) = &cli.language {
        config = config.with_language(language.clone());
    }
    if let Some(region) = &cli.region {
        config = config.with_region(region.clone());
    }
    Ok(config)
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let config = config_from(&cli)?;
    log::debug!("using {:?}", config);

    let service = MapsService::new(config, Document::new());

    match cli.command {
        Commands::Geocode { address } => {
            let results = service
                .geocode_address(&address)
                .await
                .with_context(|| format!("could not geocode {:?}", address))?;
            print_json(&results)
        }
        Commands::Reverse { lat, lng } => {
            let results = service
                .reverse_geocode(lat, lng)
                .await
                .with_context(|| format!("could not reverse geocode {},{}", lat, lng))?;
            print_json(&results)
        }
        Commands::Directions {
            origin,
            destination,
            mode,
            waypoints,
            avoid_tolls,
            avoid_highways,
            alternatives,
        } => {
            let options = waypoints.into_iter().fold(
                DirectionsOptions::default()
                    .travel_mode(mode.into())
                    .avoid_tolls(avoid_tolls)
                    .avoid_highways(avoid_highways)
                    .alternatives(alternatives),
                |options, stop| options.waypoint(stop),
            );
            let directions = service
                .get_directions(origin.as_str(), destination.as_str(), options)
                .await
                .context("could not compute directions")?;

            for route in &directions.routes {
                log::info!(
                    "{}: {:.1} km, {:.0} min",
                    route.summary,
                    route.distance_meters() / 1000.0,
                    route.duration_seconds() / 60.0
                );
            }
            print_json(&directions)
        }
        Commands::Place { place_id, fields } => {
            let fields: Vec<&str> = fields.iter().map(String::as_str).collect();
            let details = service
                .get_place_details(
                    &place_id,
                    (!fields.is_empty()).then_some(fields.as_slice()),
                )
                .await
                .with_context(|| format!("could not fetch place {}", place_id))?;
            print_json(&details)
        }
    }
}
