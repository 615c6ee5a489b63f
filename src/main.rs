use std::env;
use std::io::{self, Read};
use std::path::Path;

use anyhow::{Context, Result};
use clap::Parser;
use simple_log::LogConfigBuilder;
use simple_log::info;
use wordtrie::script::{demo_commands, parse_script, read_script, run, run_folder};
use wordtrie::{Command, Outcome, Trie};

#[derive(Parser, Debug)]
#[command(version, about = "Run insert/search/delete scripts against a word trie", long_about = None)]
struct DriverArgs {
    /// Script to run, `-` for stdin. Without a script the built-in demo runs.
    #[arg(long, conflicts_with = "script_folder")]
    script: Option<String>,
    /// Run every `*.trie` script in this folder, each on a fresh trie.
    #[arg(long)]
    script_folder: Option<String>,
    #[arg(long)]
    json: bool,
    #[arg(long)]
    debug: bool,
    #[arg(long)]
    log_path: Option<String>,
}

fn setup_debug_logging(log_path: Option<String>) {
    let log_path = log_path.unwrap_or_else(|| {
        let mut temp_dir = env::temp_dir();
        temp_dir.push("wordtrie.log");
        temp_dir.display().to_string()
    });
    let config = LogConfigBuilder::builder().path(&log_path).build();
    if let Err(e) = simple_log::new(config) {
        eprintln!("fail to setup log {}: {:?}", log_path, e);
    }
}

fn read_commands(script: &str) -> Result<Vec<Command>> {
    if script == "-" {
        let mut text = String::new();
        io::stdin()
            .read_to_string(&mut text)
            .context("failed to read script from stdin")?;
        return Ok(parse_script(&text)?);
    }
    read_script(Path::new(script)).with_context(|| format!("cannot run script {}", script))
}

fn print_outcomes(outcomes: &[Outcome], json: bool) {
    for outcome in outcomes {
        if json {
            println!("{}", outcome.to_json());
        } else {
            println!("{}", outcome);
        }
    }
}

fn print_folder(folder: &str, json: bool) -> Result<()> {
    let results =
        run_folder(folder).with_context(|| format!("cannot run scripts in {}", folder))?;
    for (path, outcomes) in results {
        if !json {
            println!("== {}", path.display());
        }
        print_outcomes(&outcomes, json);
    }
    Ok(())
}

fn main() -> Result<()> {
    let args = DriverArgs::parse();

    if args.debug {
        setup_debug_logging(args.log_path.clone());
    }

    if let Some(folder) = &args.script_folder {
        return print_folder(folder, args.json);
    }

    let commands = match &args.script {
        Some(script) => read_commands(script)?,
        None => demo_commands(),
    };
    let mut trie = Trie::new();
    let outcomes = run(&mut trie, &commands);
    print_outcomes(&outcomes, args.json);
    info!(
        "ran {} commands, {} nodes left",
        outcomes.len(),
        trie.node_count()
    );
    Ok(())
}
