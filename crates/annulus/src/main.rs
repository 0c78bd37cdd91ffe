use almanac::Instant;
use annulus::config::{self, Config, DisplayMode};
use annulus::engine::Engine;
use annulus::events::AppEvent;
use annulus::refresh::Refresher;
use annulus::render::Renderer;
use annulus::sources::{CalendarFetch, WeatherFetch};
use annulus::sys::runtime;
use annulus::sys::status::StatusBoard;
use anyhow::Context;
use chrono::Local;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(version, about = "Analog watch face showing weather and calendar data")]
struct Args {
    /// Write the default config file and exit
    #[arg(long)]
    write_config: bool,
    /// Start in this display mode (weather or calendar)
    #[arg(long)]
    mode: Option<DisplayMode>,
    /// Start in ambient mode
    #[arg(long)]
    ambient: bool,
    /// PNG file each frame is written to (needs the png feature)
    #[arg(long)]
    output: Option<PathBuf>,
}

impl Args {
    fn apply(&self, config: &mut Config) {
        if let Some(mode) = self.mode {
            config.display.mode = mode;
        }
        if self.ambient {
            config.display.ambient = true;
        }
        if let Some(output) = &self.output {
            config.display.output = Some(output.clone());
        }
    }
}

type Face = Engine<CalendarFetch, WeatherFetch>;

fn reload(args: &Args, engine: &mut Face, renderer: &mut Renderer) -> anyhow::Result<()> {
    let mut config = config::load_config()?;
    args.apply(&mut config);

    let weather = WeatherFetch::from_config(&config.weather)?;
    let calendar = CalendarFetch::from_config(&config.calendar);
    engine.reconfigure(&config, calendar, weather);
    *renderer = Renderer::new(config.display.size, config.display.output.clone());
    Ok(())
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    if args.write_config {
        let path = config::write_default_config().context("Failed to write default config")?;
        println!("{}", path.display());
        return Ok(());
    }

    let mut config = config::load_or_default();
    args.apply(&mut config);

    let status = Arc::new(StatusBoard::default());
    let (tx, rx) = async_channel::bounded(32);

    // Start Background Services
    let rt = runtime::start_background_services(tx, Arc::clone(&status))
        .context("Failed to start background services")?;

    let mut engine: Face = Engine::new(
        Refresher::new(
            "calendar",
            CalendarFetch::from_config(&config.calendar),
            config.calendar.policy(),
            rt.handle().clone(),
        ),
        Refresher::new(
            "weather",
            WeatherFetch::from_config(&config.weather)?,
            config.weather.policy(),
            rt.handle().clone(),
        ),
        &config,
    );
    let mut renderer = Renderer::new(config.display.size, config.display.output.clone());
    status.publish(engine.status());

    while let Ok(event) = rx.recv_blocking() {
        let now = Instant::now();
        match event {
            AppEvent::Tick => {}
            AppEvent::Tap => engine.tap(now),
            AppEvent::Ambient(on) => engine.set_ambient(on),
            AppEvent::ConfigReload => match reload(&args, &mut engine, &mut renderer) {
                Ok(()) => log::info!("Config reloaded"),
                Err(e) => log::error!("Failed to reload config: {}", e),
            },
        }

        let ops = engine.frame(now, *Local::now().offset());
        if let Err(e) = renderer.render(&ops) {
            log::error!("Render failed: {}", e);
        }
        status.publish(engine.status());
    }

    drop(rt);
    Ok(())
}
