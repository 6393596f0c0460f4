use clap::{App, AppSettings, Arg, ArgMatches, SubCommand};
use sitewright::build::{build_site, fetch_posts};
use sitewright::config::Config;
use std::path::{Path, PathBuf};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

fn main() {
    let project_arg = Arg::with_name("project")
        .long("project")
        .short("p")
        .takes_value(true)
        .value_name("DIR")
        .help("Directory to search (with its parents) for sitewright.yaml; defaults to the working directory");
    let verbose_arg = Arg::with_name("verbose")
        .long("verbose")
        .short("v")
        .help("Logs every page written");

    let matches = App::new("sitewright")
        .version(env!("CARGO_PKG_VERSION"))
        .about(env!("CARGO_PKG_DESCRIPTION"))
        .setting(AppSettings::SubcommandRequiredElseHelp)
        .subcommand(
            SubCommand::with_name("build")
                .about("Fetches the posts and builds the site")
                .arg(project_arg.clone())
                .arg(verbose_arg.clone())
                .arg(
                    Arg::with_name("output")
                        .long("output")
                        .short("o")
                        .takes_value(true)
                        .value_name("DIR")
                        .help("Overrides the configured output directory"),
                )
                .arg(
                    Arg::with_name("seed")
                        .long("seed")
                        .takes_value(true)
                        .value_name("N")
                        .help("Seeds related-post sampling for a reproducible build"),
                ),
        )
        .subcommand(
            SubCommand::with_name("fetch")
                .about("Fetches the posts (saving the configured snapshot) without building")
                .arg(project_arg)
                .arg(verbose_arg),
        )
        .get_matches();

    let result = match matches.subcommand() {
        ("build", Some(args)) => run_build(args),
        ("fetch", Some(args)) => run_fetch(args),
        _ => unreachable!("clap requires a subcommand"),
    };

    if let Err(e) = result {
        error!("{}", e);
        std::process::exit(1);
    }
}

fn init_logging(args: &ArgMatches) {
    let filter = if args.is_present("verbose") {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn load_config(args: &ArgMatches) -> Result<Config, Box<dyn std::error::Error>> {
    let dir = match args.value_of("project") {
        Some(dir) => PathBuf::from(dir),
        None => std::env::current_dir()?,
    };
    Ok(Config::from_directory(&dir)?)
}

fn run_build(args: &ArgMatches) -> Result<(), Box<dyn std::error::Error>> {
    init_logging(args);
    let mut config = load_config(args)?;
    if let Some(output) = args.value_of("output") {
        config.site.output_root = Path::new(output).to_owned();
    }
    if let Some(seed) = args.value_of("seed") {
        config.site.related_seed = Some(seed.parse()?);
    }
    let pages = build_site(&config)?;
    info!("done: {} pages", pages);
    Ok(())
}

fn run_fetch(args: &ArgMatches) -> Result<(), Box<dyn std::error::Error>> {
    init_logging(args);
    let config = load_config(args)?;
    let posts = fetch_posts(&config)?;
    info!("done: {} posts", posts);
    Ok(())
}
