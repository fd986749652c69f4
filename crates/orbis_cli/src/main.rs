mod output;

use std::fmt::Display;
use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use orbis_angle::{AngleTracker, angular_distance, normalize_degrees, signed_delta};
use orbis_config::Settings;
use orbis_core::{
    Body, CachedProvider, GeoLocation, MeanElementsProvider, Provider, SiderealHorizon, TimeWindow,
    parse_iso_utc,
};
use orbis_search::{
    HorizonEvent, NatalContext, RiseSetConfig, extract_visibility_windows,
    find_all_returns_in_window, find_return_instant, find_rise_set, find_transit, scan_returns,
};
use serde::Serialize;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use crate::output::{Clock, print_json};

/// Default TT − UTC for converting command-line dates, seconds.
const DEFAULT_DELTA_T_SECONDS: f64 = 69.2;

#[derive(Parser)]
#[command(name = "orbis", version, about = "Angular event search: returns, rise/set, visibility")]
struct Cli {
    /// Settings file (TOML)
    #[arg(long, env = "ORBIS_CONFIG", global = true)]
    config: Option<PathBuf>,
    /// Print a compact text table instead of JSON
    #[arg(long, global = true)]
    text: bool,
    /// TT − UTC in seconds, applied to input and output dates
    #[arg(long, global = true, default_value_t = DEFAULT_DELTA_T_SECONDS)]
    delta_t: f64,
    /// More logging (-v debug, -vv trace); RUST_LOG overrides
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// First return of a body to a longitude
    Return {
        body: Body,
        #[command(flatten)]
        target: TargetArgs,
        #[command(flatten)]
        window: WindowArgs,
        /// Refinement tolerance, seconds
        #[arg(long)]
        tolerance: Option<f64>,
    },
    /// Every return of a body to a longitude
    Returns {
        body: Body,
        #[command(flatten)]
        target: TargetArgs,
        #[command(flatten)]
        window: WindowArgs,
        /// Refinement tolerance, seconds
        #[arg(long)]
        tolerance: Option<f64>,
    },
    /// Returns of several bodies to their natal longitudes, with houses and aspects
    Scan {
        /// Birth instant (UTC, YYYY-MM-DDThh:mm[:ss]Z)
        #[arg(long)]
        natal: String,
        #[command(flatten)]
        window: WindowArgs,
        /// Bodies to scan (default from [scan])
        #[arg(long, value_delimiter = ',')]
        bodies: Vec<Body>,
        /// Natal points for aspects
        #[arg(long, value_delimiter = ',')]
        points: Vec<Body>,
        #[command(flatten)]
        observer: ObserverArgs,
        /// Hours east of UTC for local times
        #[arg(long, allow_hyphen_values = true)]
        utc_offset: Option<f64>,
    },
    /// Rise and set of a body on a date
    RiseSet {
        body: Body,
        /// Date (UTC), YYYY-MM-DD
        #[arg(long)]
        date: String,
        #[command(flatten)]
        observer: ObserverArgs,
        /// Solar event; sets the threshold, and text output shows only that crossing
        #[arg(long, value_enum)]
        event: Option<EventArg>,
    },
    /// Upper transit of a body on a date
    Transit {
        body: Body,
        /// Date (UTC), YYYY-MM-DD
        #[arg(long)]
        date: String,
        #[command(flatten)]
        observer: ObserverArgs,
    },
    /// Windows in which a body is observable
    Visibility {
        body: Body,
        #[command(flatten)]
        window: WindowArgs,
        #[command(flatten)]
        observer: ObserverArgs,
        /// Minimum altitude of the body, degrees
        #[arg(long, allow_hyphen_values = true)]
        min_alt: Option<f64>,
        /// Maximum altitude of the Sun, degrees
        #[arg(long, allow_hyphen_values = true)]
        max_sun_alt: Option<f64>,
        /// Minimum separation from the Sun, degrees
        #[arg(long)]
        min_sun_sep: Option<f64>,
        /// Sampling step, minutes
        #[arg(long)]
        step_minutes: Option<f64>,
    },
    /// Angle helpers
    Angle {
        #[command(subcommand)]
        op: AngleOp,
    },
}

#[derive(Subcommand)]
enum AngleOp {
    /// Reduce to [0, 360)
    Normalize {
        #[arg(allow_hyphen_values = true)]
        deg: f64,
    },
    /// Signed shortest rotation from `from` to `to`, in [-180, 180)
    Delta {
        #[arg(allow_hyphen_values = true)]
        from: f64,
        #[arg(allow_hyphen_values = true)]
        to: f64,
    },
    /// Unsigned separation, in [0, 180]
    Distance {
        #[arg(allow_hyphen_values = true)]
        a: f64,
        #[arg(allow_hyphen_values = true)]
        b: f64,
    },
    /// Remove 360° wraps from a series of longitudes
    Unwrap {
        #[arg(allow_hyphen_values = true, required = true)]
        values: Vec<f64>,
    },
}

#[derive(Args)]
struct TargetArgs {
    /// Target ecliptic longitude, degrees
    #[arg(long, allow_hyphen_values = true)]
    target: Option<f64>,
    /// Use the body's longitude at this instant as the target
    #[arg(long, conflicts_with = "target")]
    natal: Option<String>,
}

#[derive(Args)]
struct WindowArgs {
    /// Window start (UTC)
    #[arg(long)]
    start: String,
    /// Window end (UTC)
    #[arg(long, conflicts_with = "days")]
    end: Option<String>,
    /// Window length in days (default 366)
    #[arg(long)]
    days: Option<f64>,
}

#[derive(Args)]
struct ObserverArgs {
    /// Observer latitude, degrees north
    #[arg(long, allow_hyphen_values = true, requires = "lon")]
    lat: Option<f64>,
    /// Observer longitude, degrees east
    #[arg(long, allow_hyphen_values = true, requires = "lat")]
    lon: Option<f64>,
    /// Observer altitude, meters
    #[arg(long, default_value_t = 0.0)]
    alt: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, ValueEnum)]
enum EventArg {
    Sunrise,
    Sunset,
    CivilDawn,
    CivilDusk,
    NauticalDawn,
    NauticalDusk,
    AstronomicalDawn,
    AstronomicalDusk,
}

impl EventArg {
    fn horizon_event(self) -> HorizonEvent {
        match self {
            Self::Sunrise => HorizonEvent::Sunrise,
            Self::Sunset => HorizonEvent::Sunset,
            Self::CivilDawn => HorizonEvent::CivilDawn,
            Self::CivilDusk => HorizonEvent::CivilDusk,
            Self::NauticalDawn => HorizonEvent::NauticalDawn,
            Self::NauticalDusk => HorizonEvent::NauticalDusk,
            Self::AstronomicalDawn => HorizonEvent::AstronomicalDawn,
            Self::AstronomicalDusk => HorizonEvent::AstronomicalDusk,
        }
    }
}

#[derive(Serialize)]
struct AngleResult {
    op: &'static str,
    input: Vec<f64>,
    result: Vec<f64>,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn fail(msg: impl Display) -> ! {
    eprintln!("error: {msg}");
    std::process::exit(1);
}

fn or_exit<T, E: Display>(result: Result<T, E>, what: &str) -> T {
    result.unwrap_or_else(|e| fail(format!("{what}: {e}")))
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_settings(path: Option<&PathBuf>) -> Settings {
    match path {
        Some(p) => {
            let s = or_exit(Settings::load(p), "failed to load settings");
            info!(path = %p.display(), "settings loaded");
            s
        }
        None => Settings::default(),
    }
}

fn build_provider(settings: &Settings) -> Box<dyn Provider> {
    if settings.cache.enabled {
        let cached = or_exit(
            CachedProvider::new(MeanElementsProvider, settings.cache.capacity),
            "invalid cache settings",
        );
        Box::new(cached)
    } else {
        Box::new(MeanElementsProvider)
    }
}

fn parse_instant(text: &str, clock: Clock) -> f64 {
    clock.to_provider(or_exit(parse_iso_utc(text), "invalid date"))
}

fn parse_window(args: &WindowArgs, clock: Clock) -> TimeWindow {
    let start = parse_instant(&args.start, clock);
    let window = match (&args.end, args.days) {
        (Some(end), _) => TimeWindow::new(start, parse_instant(end, clock)),
        (None, days) => TimeWindow::from_duration(start, days.unwrap_or(366.0)),
    };
    or_exit(window, "invalid window")
}

fn resolve_observer(args: &ObserverArgs, settings: &Settings) -> Option<GeoLocation> {
    match (args.lat, args.lon) {
        (Some(lat), Some(lon)) => Some(GeoLocation::new(lat, lon, args.alt)),
        _ => settings.observer,
    }
}

fn require_observer(args: &ObserverArgs, settings: &Settings) -> GeoLocation {
    resolve_observer(args, settings)
        .unwrap_or_else(|| fail("an observer is required: pass --lat/--lon or set [observer]"))
}

fn resolve_target(provider: &dyn Provider, body: Body, args: &TargetArgs, clock: Clock) -> f64 {
    match (args.target, &args.natal) {
        (Some(t), _) => t,
        (None, Some(natal)) => {
            let jd = parse_instant(natal, clock);
            or_exit(provider.sample(body, jd), "natal position").longitude_deg
        }
        (None, None) => fail("pass --target <deg> or --natal <date>"),
    }
}

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let settings = load_settings(cli.config.as_ref());
    let provider = build_provider(&settings);
    let provider = provider.as_ref();
    let clock = Clock {
        delta_t_seconds: cli.delta_t,
    };
    let horizon = SiderealHorizon::with_delta_t(cli.delta_t);
    debug!(delta_t = cli.delta_t, cache = settings.cache.enabled, "starting");

    match cli.command {
        Commands::Return {
            body,
            target,
            window,
            tolerance,
        } => {
            let mut config = settings.returns;
            if let Some(t) = tolerance {
                config.tolerance_seconds = t;
            }
            let target = resolve_target(provider, body, &target, clock);
            let window = parse_window(&window, clock);
            let outcome = or_exit(
                find_return_instant(provider, body, target, &window, &config),
                "return search failed",
            );
            if cli.text {
                println!("{}", output::outcome_text(&outcome, clock));
            } else {
                print_json(&outcome);
            }
        }

        Commands::Returns {
            body,
            target,
            window,
            tolerance,
        } => {
            let mut config = settings.returns;
            if let Some(t) = tolerance {
                config.tolerance_seconds = t;
            }
            let target = resolve_target(provider, body, &target, clock);
            let window = parse_window(&window, clock);
            let hits = or_exit(
                find_all_returns_in_window(provider, body, target, &window, &config),
                "return search failed",
            );
            if cli.text {
                for hit in &hits {
                    println!("{}", output::return_line(hit, clock));
                }
            } else {
                print_json(&hits);
            }
        }

        Commands::Scan {
            natal,
            window,
            bodies,
            points,
            observer,
            utc_offset,
        } => {
            let window = parse_window(&window, clock);
            let mut natal_ctx = NatalContext::new(parse_instant(&natal, clock));
            natal_ctx.location = resolve_observer(&observer, &settings);
            natal_ctx.points = if points.is_empty() {
                settings.scan.bodies.clone()
            } else {
                points
            };
            let bodies = if bodies.is_empty() {
                settings.scan.bodies.clone()
            } else {
                bodies
            };
            let mut options = settings.scan_options();
            options.delta_t_seconds = cli.delta_t;
            if natal_ctx.location.is_some() {
                options.location = natal_ctx.location;
            }
            if utc_offset.is_some() {
                options.utc_offset_hours = utc_offset;
            }
            let hits = or_exit(
                scan_returns(provider, &bodies, &window, &natal_ctx, &options),
                "scan failed",
            );
            if cli.text {
                for hit in &hits {
                    println!("{}", output::return_line(hit, clock));
                }
            } else {
                print_json(&hits);
            }
        }

        Commands::RiseSet {
            body,
            date,
            observer,
            event,
        } => {
            let here = require_observer(&observer, &settings);
            let day = parse_instant(&date, clock);
            let config = match event {
                Some(e) => RiseSetConfig {
                    threshold_altitude_deg: Some(e.horizon_event().altitude_deg()),
                    ..settings.rise_set
                },
                None => settings.rise_set,
            };
            let events = or_exit(
                find_rise_set(provider, &horizon, body, day, &here, &config),
                "rise/set search failed",
            );
            match (event, cli.text) {
                (Some(e), true) => {
                    let e = e.horizon_event();
                    println!("{}", output::event_text(e, events.instant_of(e), clock));
                }
                (None, true) => println!("{}", output::riseset_text(&events, clock)),
                (_, false) => print_json(&events),
            }
        }

        Commands::Transit {
            body,
            date,
            observer,
        } => {
            let here = require_observer(&observer, &settings);
            let day = parse_instant(&date, clock);
            let transit = or_exit(
                find_transit(provider, &horizon, body, day, &here, &settings.rise_set),
                "transit search failed",
            );
            if cli.text {
                println!("{}", output::transit_text(transit.as_ref(), clock));
            } else {
                print_json(&transit);
            }
        }

        Commands::Visibility {
            body,
            window,
            observer,
            min_alt,
            max_sun_alt,
            min_sun_sep,
            step_minutes,
        } => {
            let here = require_observer(&observer, &settings);
            let range = parse_window(&window, clock);
            let mut vis = settings.visibility;
            if let Some(v) = min_alt {
                vis.min_altitude_deg = v;
            }
            if max_sun_alt.is_some() {
                vis.max_solar_altitude_deg = max_sun_alt;
            }
            if min_sun_sep.is_some() {
                vis.min_solar_separation_deg = min_sun_sep;
            }
            if let Some(m) = step_minutes {
                vis.step_minutes = m;
            }
            let constraints = vis.constraints(here);
            let windows = or_exit(
                extract_visibility_windows(
                    provider,
                    &horizon,
                    body,
                    &range,
                    vis.step_days(),
                    &constraints,
                ),
                "visibility search failed",
            );
            if cli.text {
                println!("{}", output::visibility_text(&windows, clock));
            } else {
                print_json(&windows);
            }
        }

        Commands::Angle { op } => {
            let result = match op {
                AngleOp::Normalize { deg } => AngleResult {
                    op: "normalize",
                    input: vec![deg],
                    result: vec![normalize_degrees(deg)],
                },
                AngleOp::Delta { from, to } => AngleResult {
                    op: "delta",
                    input: vec![from, to],
                    result: vec![signed_delta(to - from)],
                },
                AngleOp::Distance { a, b } => AngleResult {
                    op: "distance",
                    input: vec![a, b],
                    result: vec![angular_distance(a, b)],
                },
                AngleOp::Unwrap { values } => {
                    let mut tracker = AngleTracker::new();
                    let result = values.iter().map(|&v| tracker.update(v)).collect();
                    AngleResult {
                        op: "unwrap",
                        input: values,
                        result,
                    }
                }
            };
            if cli.text {
                let line: Vec<String> = result.result.iter().map(|v| format!("{v:.6}")).collect();
                println!("{}", line.join(" "));
            } else {
                print_json(&result);
            }
        }
    }
}
