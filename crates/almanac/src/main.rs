use almanac::calendar::EventFile;
use almanac::forecast::{ApiKey, DEFAULT_BASE_URL, ForecastClient, Units};
use almanac::time::{HOUR_MS, Instant};
use almanac::{Forecast, Location};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(name = "almanac", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug, Clone)]
enum Commands {
    /// Fetch a forecast and summarise each block
    Forecast {
        /// Forecast API key
        #[arg(short = 'k', long, env = "ANNULUS_WEATHER__API_KEY")]
        key: String,

        #[arg(long, allow_hyphen_values = true)]
        lat: f64,

        #[arg(long, allow_hyphen_values = true)]
        lon: f64,

        #[arg(long, default_value = DEFAULT_BASE_URL)]
        base_url: String,

        /// Print the raw deserialised forecast as JSON
        #[arg(long)]
        json: bool,
    },
    /// List the events an events file yields for the next 24 hours
    Events {
        path: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Forecast {
            key,
            lat,
            lon,
            base_url,
            json,
        } => {
            let client = ForecastClient::new(
                base_url,
                ApiKey::new(key),
                Units::default(),
                Duration::from_secs(30),
            )?;
            let forecast = client.fetch(Location::new(lat, lon)).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&forecast)?);
            } else {
                print_forecast(&forecast);
            }
            Ok(())
        }
        Commands::Events { path } => {
            let now = Instant::now();
            let events = EventFile::new(path).fetch_events(now).await?;
            for event in &events {
                let marker = if event.overlaps(now, now.plus_millis(HOUR_MS)) {
                    "*"
                } else {
                    " "
                };
                println!(
                    "{} {} .. {}  {}",
                    marker,
                    event.begin.to_local(*chrono::Local::now().offset()),
                    event.end.to_local(*chrono::Local::now().offset()),
                    event.title
                );
            }
            Ok(())
        }
    }
}

fn print_forecast(forecast: &Forecast) {
    if let Some(current) = &forecast.currently {
        println!(
            "now: {} C, {} hPa, wind {} m/s",
            fmt_opt(current.temperature),
            fmt_opt(current.pressure),
            fmt_opt(current.wind_speed)
        );
    } else {
        println!("now: (no current conditions)");
    }
    println!("minutely points: {}", forecast.minutely_points().len());
    println!("hourly points:   {}", forecast.hourly_points().len());
    println!("daily points:    {}", forecast.daily_points().len());

    let wettest = forecast
        .minutely_points()
        .iter()
        .map(|p| p.precip_expectation())
        .fold(0.0, f64::max);
    println!("max expected precipitation next hour: {:.2} mm/h", wettest);
}

fn fmt_opt(v: Option<f64>) -> String {
    v.map(|v| format!("{:.1}", v)).unwrap_or_else(|| "-".to_string())
}
