use anyhow::{Context, Result};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use listing_core::ListingConfig;
use listing_sim::{run, Scenario};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

fn cli() -> Command {
    let config_arg = Arg::new("config")
        .long("config")
        .value_parser(value_parser!(PathBuf))
        .help("Listing configuration (TOML); defaults apply when omitted");
    let json_arg = Arg::new("json")
        .long("json")
        .action(ArgAction::SetTrue)
        .help("Output as JSON");

    Command::new("listing-sim")
        .version(listing_sim::VERSION)
        .about("Replay listing draft scenarios against in-memory services")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            Command::new("run")
                .about("Run a scenario; exit 0 on DONE, 2 on PARTIAL_SUCCESS, 1 otherwise")
                .arg(
                    Arg::new("scenario")
                        .required(true)
                        .value_parser(value_parser!(PathBuf))
                        .help("Scenario file (TOML)"),
                )
                .arg(config_arg.clone())
                .arg(json_arg.clone()),
        )
        .subcommand(
            Command::new("limits")
                .about("Print the effective staging limits")
                .arg(config_arg)
                .arg(json_arg),
        )
}

fn load_config(args: &ArgMatches) -> Result<ListingConfig> {
    match args.get_one::<PathBuf>("config") {
        Some(path) => ListingConfig::load(path).with_context(|| format!("loading {}", path.display())),
        None => Ok(ListingConfig::default()),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let matches = cli().get_matches();

    match matches.subcommand() {
        Some(("run", args)) => {
            let config = load_config(args)?;
            let path = args
                .get_one::<PathBuf>("scenario")
                .context("scenario path is required")?;
            let scenario = Scenario::load(path)?;

            tracing::info!(scenario = %path.display(), "running scenario");
            let outcome = run(&scenario, &config).await;

            if args.get_flag("json") {
                println!("{}", serde_json::to_string_pretty(&outcome)?);
            } else {
                print!("{}", outcome.render_text());
            }
            std::process::exit(outcome.exit_code());
        }
        Some(("limits", args)) => {
            let config = load_config(args)?;
            if args.get_flag("json") {
                println!("{}", serde_json::to_string_pretty(&config)?);
            } else {
                println!("Max attachments: {}", config.max_attachments);
                println!("Max image size: {} bytes", config.max_image_bytes);
                println!("Entry image types: {}", config.entry_image_types.join(", "));
                println!("Avatar image types: {}", config.avatar_image_types.join(", "));
                println!("Notice lifetime: {} ms", config.notice_ttl_ms);
            }
        }
        _ => {}
    }
    Ok(())
}
