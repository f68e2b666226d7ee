use anyhow::{anyhow, Context, Result};
use clap::{App, AppSettings, Arg, ArgMatches, SubCommand};
use listing_wizard::api::{Client, LookupKind};
use listing_wizard::config::Config;
use listing_wizard::draft::{Category, Draft};
use listing_wizard::logger;
use listing_wizard::rehydrate;
use listing_wizard::store::{DraftStore, FileStore};
use listing_wizard::wizard::Wizard;
use log::*;
use std::fs;
use std::path::PathBuf;

fn cli<'a, 'b>() -> App<'a, 'b> {
    App::new("listing-wizard")
        .version(env!("CARGO_PKG_VERSION"))
        .about(env!("CARGO_PKG_DESCRIPTION"))
        .setting(AppSettings::SubcommandRequiredElseHelp)
        .arg(
            Arg::with_name("config")
                .short("c")
                .long("config")
                .value_name("DIR")
                .help("Directory holding config.yml")
                .takes_value(true),
        )
        .subcommand(
            SubCommand::with_name("rehydrate")
                .about("Load a stored listing JSON file as an edit draft")
                .arg(
                    Arg::with_name("category")
                        .short("k")
                        .long("category")
                        .takes_value(true)
                        .required(true)
                        .possible_values(&["car", "bike", "spare"]),
                )
                .arg(Arg::with_name("FILE").required(true).index(1))
                .arg(
                    Arg::with_name("save")
                        .long("save")
                        .help("Write the draft to the configured draft file"),
                ),
        )
        .subcommand(
            SubCommand::with_name("lookups")
                .about("Fetch and print a lookup list")
                .arg(Arg::with_name("KIND").required(true).index(1))
                .arg(
                    Arg::with_name("param")
                        .short("p")
                        .long("param")
                        .value_name("KEY=VALUE")
                        .takes_value(true)
                        .multiple(true)
                        .number_of_values(1),
                ),
        )
        .subcommand(
            SubCommand::with_name("check")
                .about("Report the state of the saved draft")
                .arg(Arg::with_name("FILE").index(1)),
        )
}

fn main() -> Result<()> {
    let matches = cli().get_matches();

    let mut config = Config::new();
    config.load(matches.value_of("config"))?;
    logger::init(config.level_filter(), Box::new(|line: String| eprintln!("{}", line)))?;

    match matches.subcommand() {
        ("rehydrate", Some(sub)) => rehydrate_file(&config, sub),
        ("lookups", Some(sub)) => print_lookups(&config, sub),
        ("check", Some(sub)) => check_draft(&config, sub),
        _ => Err(anyhow!("No command given; see --help")),
    }
}

fn rehydrate_file(config: &Config, matches: &ArgMatches) -> Result<()> {
    let category: Category = matches.value_of("category").unwrap_or("car").parse()?;
    let path = matches.value_of("FILE").ok_or_else(|| anyhow!("FILE is required"))?;
    let contents = fs::read_to_string(path).with_context(|| format!("Failed to read {}", path))?;
    let raw: serde_json::Value = serde_json::from_str(&contents)?;

    // Accept either a bare entity or a full detail response
    let entity = if raw.get("_id").is_none() && raw.get("data").is_some() {
        raw["data"].clone()
    } else {
        raw
    };
    let draft = rehydrate::rehydrate(category, &entity)?;
    let wizard = Wizard::resume(&draft);
    info!("Edit draft resumes at {}.", wizard.current());

    if matches.is_present("save") {
        let draft_file = config.draft_file()?;
        let mut store = FileStore::open(&draft_file, category)?;
        store.replace_all(draft.clone())?;
        info!("Saved edit draft to {}.", draft_file.display());
    }
    print!("{}", serde_yaml::to_string(&draft)?);
    Ok(())
}

fn print_lookups(config: &Config, matches: &ArgMatches) -> Result<()> {
    let kind: LookupKind = matches.value_of("KIND").unwrap_or_default().parse()?;
    let params: Vec<(String, String)> = matches
        .values_of("param")
        .map(|values| {
            values
                .filter_map(|pair| pair.split_once('='))
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect()
        })
        .unwrap_or_default();

    let client = Client::new(config.token()?, &config.api_base_url)?;
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    let entities = runtime.block_on(async {
        let params: Vec<(&str, &str)> = params
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();
        client.lookups(kind, &params).await
    })?;

    for entity in entities {
        let marker = if entity.is_others { " (others)" } else { "" };
        println!("{}\t{}{}", entity.id, entity.name, marker);
    }
    Ok(())
}

fn check_draft(config: &Config, matches: &ArgMatches) -> Result<()> {
    let path = match matches.value_of("FILE") {
        Some(path) => PathBuf::from(path),
        None => config.draft_file()?,
    };
    let draft: Draft = match FileStore::load(&path)? {
        Some(draft) => draft,
        None => {
            println!("No saved draft at {}", path.display());
            return Ok(());
        }
    };

    let wizard = Wizard::resume(&draft);
    println!("category: {}", draft.category());
    println!("editing: {}", draft.envelope.is_edit);
    println!("resumes at: {}", wizard.current());
    for step in wizard.steps() {
        match Wizard::validate_step(draft.category(), *step, &draft) {
            Ok(()) => println!("  [x] {}", step),
            Err(e) => println!("  [ ] {}: {}", step, e),
        }
    }
    println!("submittable: {}", draft.is_submittable());
    Ok(())
}
