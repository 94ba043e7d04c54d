use crate::{
    calendar,
    config::PlannerConfig,
    itinerary::{ItineraryPlanner, ItineraryRequest},
    server,
    session::DEFAULT_DAY_COUNT,
};
use anyhow::Context;
use chrono::NaiveDate;
use clap::{Arg, ArgAction, ArgMatches, Command};
use std::{path::PathBuf, time::Duration};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

const DEFAULT_LOG_FILTER: &str = "trip_planner_rs=info,trip_planner=info,tower_http=info";

fn command() -> Command {
    Command::new("trip-planner")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Plan a day-by-day trip with a web-searching LLM agent and export it as iCalendar")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("model")
                .short('m')
                .long("model")
                .value_name("MODEL")
                .global(true)
                .help("Chat model to use (or set PLANNER_MODEL)"),
        )
        .arg(
            Arg::new("base-url")
                .short('u')
                .long("base-url")
                .value_name("URL")
                .global(true)
                .help("OpenAI-compatible base URL (or set DASHSCOPE_BASE_URL / OPENAI_BASE_URL)"),
        )
        .arg(
            Arg::new("timeout")
                .short('t')
                .long("timeout")
                .value_name("SECONDS")
                .global(true)
                .value_parser(clap::value_parser!(u64))
                .help("Timeout for each chat completion call"),
        )
        .arg(
            Arg::new("max-iterations")
                .short('i')
                .long("max-iterations")
                .value_name("COUNT")
                .global(true)
                .value_parser(clap::value_parser!(usize))
                .help("Maximum model turns per generation"),
        )
        .arg(
            Arg::new("no-stream")
                .long("no-stream")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Request whole responses instead of streaming them"),
        )
        .subcommand(
            Command::new("plan")
                .about("Generate an itinerary and print it")
                .arg(
                    Arg::new("destination")
                        .help("Where the trip goes")
                        .required(true)
                        .index(1),
                )
                .arg(
                    Arg::new("days")
                        .short('d')
                        .long("days")
                        .value_name("N")
                        .value_parser(clap::value_parser!(u32))
                        .default_value("7")
                        .help("Trip length in days (1-30)"),
                )
                .arg(
                    Arg::new("interests")
                        .long("interests")
                        .value_name("TEXT")
                        .help("Interests and preferences to plan around"),
                )
                .arg(
                    Arg::new("start-date")
                        .long("start-date")
                        .value_name("YYYY-MM-DD")
                        .value_parser(parse_date)
                        .help("First day of the trip for the calendar export (default: today)"),
                )
                .arg(
                    Arg::new("ics")
                        .long("ics")
                        .value_name("PATH")
                        .num_args(0..=1)
                        .default_missing_value("")
                        .help("Also write an .ics file (default name derived from the destination)"),
                )
                .arg(
                    Arg::new("trace")
                        .long("trace")
                        .action(ArgAction::SetTrue)
                        .help("Print the agent's step trace after the itinerary"),
                ),
        )
        .subcommand(
            Command::new("serve")
                .about("Run the JSON HTTP service")
                .arg(
                    Arg::new("host")
                        .long("host")
                        .value_name("HOST")
                        .help("Bind address (or set PLANNER_HOST)"),
                )
                .arg(
                    Arg::new("port")
                        .short('p')
                        .long("port")
                        .value_name("PORT")
                        .value_parser(clap::value_parser!(u16))
                        .help("Bind port (or set PLANNER_PORT)"),
                ),
        )
}

fn parse_date(value: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|err| format!("expected YYYY-MM-DD: {}", err))
}

fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Flags override whatever the environment resolved
fn apply_overrides(config: &mut PlannerConfig, matches: &ArgMatches) {
    if let Some(model) = matches.get_one::<String>("model") {
        config.model = model.clone();
    }
    if let Some(base_url) = matches.get_one::<String>("base-url") {
        config.llm_base_url = base_url.clone();
    }
    if let Some(seconds) = matches.get_one::<u64>("timeout") {
        config.request_timeout = Duration::from_secs(*seconds);
    }
    if let Some(max_iterations) = matches.get_one::<usize>("max-iterations") {
        config.max_iterations = *max_iterations;
    }
    if matches.get_flag("no-stream") {
        config.stream = false;
    }
}

/// CLI entry point for the trip-planner binary
pub async fn run() -> anyhow::Result<()> {
    let mut config = PlannerConfig::from_env()?;
    init_tracing();

    let matches = command().get_matches();

    match matches.subcommand() {
        Some(("plan", sub)) => {
            apply_overrides(&mut config, sub);
            plan(config, sub).await
        }
        Some(("serve", sub)) => {
            apply_overrides(&mut config, sub);
            if let Some(host) = sub.get_one::<String>("host") {
                config.host = host.clone();
            }
            if let Some(port) = sub.get_one::<u16>("port") {
                config.port = *port;
            }
            server::serve(config).await
        }
        _ => anyhow::bail!("a subcommand is required"),
    }
}

async fn plan(config: PlannerConfig, matches: &ArgMatches) -> anyhow::Result<()> {
    let destination = matches
        .get_one::<String>("destination")
        .cloned()
        .unwrap_or_default();
    let days = matches
        .get_one::<u32>("days")
        .copied()
        .unwrap_or(DEFAULT_DAY_COUNT);
    let interests = matches.get_one::<String>("interests").cloned();

    let request = ItineraryRequest::new(destination, days, interests)?;
    let planner = ItineraryPlanner::from_config(&config)?;

    info!("Planning a {}-day trip to {}", request.day_count(), request.destination());
    info!("Using model: {}", config.model);

    let result = planner
        .plan_trip_traced(&request)
        .await
        .context("Agent execution failed")?;

    println!("{}", result.output);

    if matches.get_flag("trace") {
        eprintln!("\n{}", result.replay());
    }

    if let Some(path) = matches.get_one::<String>("ics") {
        let path = if path.is_empty() {
            PathBuf::from(calendar::download_file_name(request.destination()))
        } else {
            PathBuf::from(path)
        };
        let start_date = matches.get_one::<NaiveDate>("start-date").copied();

        match export_calendar(&result.output, start_date, &path) {
            Ok(()) => info!("Calendar written to {}", path.display()),
            Err(err) => {
                error!("Failed to generate calendar file: {:#}", err);
                eprintln!("Failed to generate calendar file: {:#}", err);
            }
        }
    }

    Ok(())
}

fn export_calendar(
    itinerary: &str,
    start_date: Option<NaiveDate>,
    path: &std::path::Path,
) -> anyhow::Result<()> {
    let bytes = calendar::convert(itinerary, start_date)?;
    std::fs::write(path, bytes).with_context(|| format!("writing {}", path.display()))?;
    Ok(())
}
