//! Command-line interface for md2aditor
//! Converts markdown notes into aditor documents and manages the notes settings file.
//!
//! Usage:
//!   md2aditor convert `<path>` [--base-path `<dir>`] [--intercept `<segment>`] [--stdout]
//!   md2aditor tokens `<path>` [--format `<format>`]     - Dump the token stream
//!   md2aditor settings [--file `<file>`] list|get|set|remove

use clap::{Arg, ArgAction, ArgMatches, Command};
use md2aditor::aditor::config::{ConverterConfig, Loader};
use md2aditor::aditor::loader::{convert_file, Converter, DocumentLoader};
use md2aditor::aditor::settings::Settings;
use tracing_subscriber::EnvFilter;

const DEFAULT_SETTINGS_FILE: &str = "egbenz.config.cfg";

fn main() {
    let matches = Command::new("md2aditor")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Converts markdown notes into aditor documents")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .help("Log debug output to stderr")
                .global(true)
                .action(ArgAction::SetTrue),
        )
        .subcommand(
            Command::new("convert")
                .about("Convert a markdown file into an .ai document")
                .arg(
                    Arg::new("path")
                        .help("Path to the markdown file")
                        .required(true)
                        .index(1),
                )
                .arg(
                    Arg::new("config")
                        .long("config")
                        .short('c')
                        .help("Converter configuration file (TOML)"),
                )
                .arg(
                    Arg::new("settings")
                        .long("settings")
                        .help("Notes settings file; its working directory becomes the base path"),
                )
                .arg(
                    Arg::new("base-path")
                        .long("base-path")
                        .help("Directory local image URLs are resolved against"),
                )
                .arg(
                    Arg::new("intercept")
                        .long("intercept")
                        .help("URL segment after which image paths are local"),
                )
                .arg(
                    Arg::new("offline")
                        .long("offline")
                        .help("Never fetch remote images")
                        .action(ArgAction::SetTrue),
                )
                .arg(
                    Arg::new("stdout")
                        .long("stdout")
                        .help("Print the document instead of writing the .ai file")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(
            Command::new("tokens")
                .about("Print the token stream of a markdown file")
                .arg(
                    Arg::new("path")
                        .help("Path to the markdown file")
                        .required(true)
                        .index(1),
                )
                .arg(
                    Arg::new("format")
                        .long("format")
                        .short('f')
                        .help("Output format: token-json or token-simple")
                        .default_value("token-json"),
                ),
        )
        .subcommand(
            Command::new("settings")
                .about("Read or change the notes settings file")
                .subcommand_required(true)
                .arg(
                    Arg::new("file")
                        .long("file")
                        .help("Settings file")
                        .default_value(DEFAULT_SETTINGS_FILE),
                )
                .subcommand(Command::new("list").about("List all settings"))
                .subcommand(
                    Command::new("get")
                        .about("Print one setting")
                        .arg(Arg::new("key").required(true).index(1)),
                )
                .subcommand(
                    Command::new("set")
                        .about("Change one setting")
                        .arg(Arg::new("key").required(true).index(1))
                        .arg(Arg::new("value").required(true).index(2)),
                )
                .subcommand(
                    Command::new("remove")
                        .about("Delete one setting")
                        .arg(Arg::new("key").required(true).index(1)),
                ),
        )
        .get_matches();

    init_logging(matches.get_flag("verbose"));

    match matches.subcommand() {
        Some(("convert", convert_matches)) => handle_convert_command(convert_matches),
        Some(("tokens", tokens_matches)) => {
            let path = tokens_matches
                .get_one::<String>("path")
                .expect("path is required");
            let format = tokens_matches
                .get_one::<String>("format")
                .expect("format has a default");
            handle_tokens_command(path, format);
        }
        Some(("settings", settings_matches)) => handle_settings_command(settings_matches),
        _ => unreachable!(),
    }
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn fail(message: impl std::fmt::Display) -> ! {
    eprintln!("Error: {}", message);
    std::process::exit(1);
}

fn load_config(matches: &ArgMatches) -> ConverterConfig {
    let mut loader = Loader::new();
    if let Some(file) = matches.get_one::<String>("config") {
        loader = loader.with_file(file);
    }

    let settings_dir = matches.get_one::<String>("settings").map(|file| {
        let settings = Settings::open(file).unwrap_or_else(|e| fail(e));
        settings.working_directory().map(str::to_string)
    });
    let base_path = matches
        .get_one::<String>("base-path")
        .cloned()
        .or(settings_dir.flatten());

    let mut overrides: Vec<(&str, config::ValueKind)> = Vec::new();
    if let Some(base_path) = base_path {
        overrides.push(("assets.base_path", base_path.into()));
    }
    if let Some(intercept) = matches.get_one::<String>("intercept") {
        overrides.push(("assets.intercept", intercept.as_str().into()));
    }
    if matches.get_flag("offline") {
        overrides.push(("assets.fetch_remote", false.into()));
    }
    for (key, value) in overrides {
        loader = loader.set_override(key, value).unwrap_or_else(|e| fail(e));
    }

    loader.build().unwrap_or_else(|e| fail(e))
}

/// Handle the convert command
fn handle_convert_command(matches: &ArgMatches) {
    let path = matches
        .get_one::<String>("path")
        .expect("path is required");
    let converter = Converter::new(load_config(matches));

    if matches.get_flag("stdout") {
        let loader = DocumentLoader::from_path(path).unwrap_or_else(|e| fail(e));
        let doc = loader.convert(&converter);
        let json = converter.to_json(&doc).unwrap_or_else(|e| fail(e));
        println!("{}", json);
    } else {
        let doc = convert_file(path, &converter).unwrap_or_else(|e| fail(e));
        tracing::info!(path = %path, blocks = doc.children.len(), "converted");
    }
}

/// Handle the tokens command
fn handle_tokens_command(path: &str, format: &str) {
    let tokens = DocumentLoader::from_path(path)
        .unwrap_or_else(|e| fail(e))
        .tokenize();

    let formatted = match format {
        "token-json" => serde_json::to_string_pretty(&tokens).unwrap_or_else(|e| fail(e)),
        "token-simple" => tokens
            .iter()
            .map(|token| token.to_string())
            .collect::<Vec<_>>()
            .join("\n"),
        other => {
            eprintln!("Format '{}' not supported for tokens", other);
            eprintln!("Available formats: token-json, token-simple");
            std::process::exit(1);
        }
    };

    println!("{}", formatted);
}

/// Handle the settings command
fn handle_settings_command(matches: &ArgMatches) {
    let file = matches
        .get_one::<String>("file")
        .expect("file has a default");
    let mut settings = Settings::open(file).unwrap_or_else(|e| fail(e));

    match matches.subcommand() {
        Some(("list", _)) => {
            for (key, value) in settings.entries() {
                println!("{} = {}", key, value);
            }
        }
        Some(("get", get_matches)) => {
            let key = get_matches.get_one::<String>("key").expect("key is required");
            match settings.get(key) {
                Some(value) => println!("{}", value),
                None => fail(format!("no setting named {:?}", key)),
            }
        }
        Some(("set", set_matches)) => {
            let key = set_matches.get_one::<String>("key").expect("key is required");
            let value = set_matches
                .get_one::<String>("value")
                .expect("value is required");
            settings.set(key, value).unwrap_or_else(|e| fail(e));
        }
        Some(("remove", remove_matches)) => {
            let key = remove_matches
                .get_one::<String>("key")
                .expect("key is required");
            settings.remove(key).unwrap_or_else(|e| fail(e));
        }
        _ => unreachable!(),
    }
}
