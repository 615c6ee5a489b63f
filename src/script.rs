use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use glob::glob;
use regex::Regex;
use serde_json::{json, Value};
use simple_log::{error, info, warn};
use thiserror::Error;

use crate::trie::Trie;

#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("line {number}: unrecognised command {text:?}")]
    InvalidCommand { number: usize, text: String },
    #[error("failed to read script {path}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid script folder pattern")]
    Pattern(#[from] glob::PatternError),
    #[error("invalid command pattern")]
    CommandPattern(#[from] regex::Error),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Insert(String),
    Search(String),
    Delete(String),
    Clear,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Inserted(String),
    Rejected { word: String, reason: String },
    Found { word: String, found: bool },
    Deleted(String),
    Cleared,
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Inserted(word) => write!(f, "Insert word: {}", word),
            Outcome::Rejected { word, reason } => write!(f, "Reject word {:?}: {}", word, reason),
            Outcome::Found { word, found } => write!(f, "Search word {}: {}", word, found),
            Outcome::Deleted(word) => write!(f, "Delete word: {}", word),
            Outcome::Cleared => write!(f, "Clear trie"),
        }
    }
}

impl Outcome {
    pub fn to_json(&self) -> Value {
        match self {
            Outcome::Inserted(word) => json!({ "op": "insert", "word": word }),
            Outcome::Rejected { word, reason } => {
                json!({ "op": "insert", "word": word, "error": reason })
            }
            Outcome::Found { word, found } => json!({ "op": "search", "word": word, "found": found }),
            Outcome::Deleted(word) => json!({ "op": "delete", "word": word }),
            Outcome::Cleared => json!({ "op": "clear" }),
        }
    }
}

fn command_pattern() -> Result<&'static Regex, ScriptError> {
    static PATTERN: OnceLock<Result<Regex, regex::Error>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r"^(insert|search|delete|clear)(?:\s+(\S+))?$"))
        .as_ref()
        .map_err(|e| ScriptError::CommandPattern(e.clone()))
}

/// Parses one script line. Blank lines and `#` comments yield `None`; a verb
/// without an argument addresses the empty word.
pub fn parse_line(number: usize, line: &str) -> Result<Option<Command>, ScriptError> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }

    let invalid = || ScriptError::InvalidCommand {
        number,
        text: line.to_string(),
    };
    let captures = command_pattern()?.captures(line).ok_or_else(invalid)?;
    let word = captures.get(2).map(|m| m.as_str().to_string());
    let command = match (&captures[1], word) {
        ("clear", None) => Command::Clear,
        ("clear", Some(_)) => return Err(invalid()),
        ("insert", word) => Command::Insert(word.unwrap_or_default()),
        ("search", word) => Command::Search(word.unwrap_or_default()),
        (_, word) => Command::Delete(word.unwrap_or_default()),
    };
    Ok(Some(command))
}

pub fn parse_script(text: &str) -> Result<Vec<Command>, ScriptError> {
    let mut commands = Vec::new();
    for (i, line) in text.lines().enumerate() {
        if let Some(command) = parse_line(i + 1, line)? {
            commands.push(command);
        }
    }
    Ok(commands)
}

pub fn read_script(path: &Path) -> Result<Vec<Command>, ScriptError> {
    let text = fs::read_to_string(path).map_err(|source| ScriptError::Io {
        path: path.display().to_string(),
        source,
    })?;
    parse_script(&text)
}

/// Every `*.trie` file directly inside `folder`, sorted by path.
pub fn load_scripts(folder: &str) -> Result<Vec<PathBuf>, ScriptError> {
    let target = format!("{}/*.trie", folder);
    let mut scripts = Vec::new();
    for entry in glob(&target)? {
        match entry {
            Ok(path) => scripts.push(path),
            Err(e) => {
                error!("{:?}", e);
            }
        }
    }
    scripts.sort();
    info!("found {} scripts in {}", scripts.len(), folder);
    Ok(scripts)
}

/// Runs every script in `folder`, each on a fresh trie. The first script that
/// cannot be read or parsed stops the run.
pub fn run_folder(folder: &str) -> Result<Vec<(PathBuf, Vec<Outcome>)>, ScriptError> {
    let mut results = Vec::new();
    for path in load_scripts(folder)? {
        let commands = match read_script(&path) {
            Ok(commands) => commands,
            Err(e) => {
                error!("cannot run {}: {}", path.display(), e);
                return Err(e);
            }
        };
        info!("running {} ({} commands)", path.display(), commands.len());
        let mut trie = Trie::new();
        let outcomes = run(&mut trie, &commands);
        results.push((path, outcomes));
    }
    Ok(results)
}

pub fn execute(trie: &mut Trie, command: &Command) -> Outcome {
    match command {
        Command::Insert(word) => match trie.insert(word.as_str()) {
            Ok(()) => Outcome::Inserted(word.clone()),
            Err(e) => {
                warn!("insert {:?} rejected: {}", word, e);
                Outcome::Rejected {
                    word: word.clone(),
                    reason: e.to_string(),
                }
            }
        },
        Command::Search(word) => Outcome::Found {
            word: word.clone(),
            found: trie.search(word.as_str()),
        },
        Command::Delete(word) => {
            trie.delete(word.as_str());
            Outcome::Deleted(word.clone())
        }
        Command::Clear => {
            trie.clear();
            Outcome::Cleared
        }
    }
}

pub fn run(trie: &mut Trie, commands: &[Command]) -> Vec<Outcome> {
    commands
        .iter()
        .map(|command| execute(trie, command))
        .collect()
}

fn searches(words: &[&str]) -> Vec<Command> {
    words
        .iter()
        .map(|word| Command::Search(word.to_string()))
        .collect()
}

/// The walkthrough run when no script is given: build a small trie, then
/// repeatedly put the last removed word back and delete another one.
pub fn demo_commands() -> Vec<Command> {
    let mut commands = vec![
        Command::Insert("a".to_string()),
        Command::Delete("a".to_string()),
    ];
    for word in ["ant", "anti", "antio", "in", "is", "and", "andy", "an", "an"] {
        commands.push(Command::Insert(word.to_string()));
    }
    commands.extend(searches(&["ant", "anti", "antio"]));

    let ant_family: &[&str] = &["ant", "anti", "antio"];
    let rounds: [(Option<&str>, &str, &[&str]); 5] = [
        (None, "ant", ant_family),
        (Some("ant"), "anti", ant_family),
        (Some("anti"), "antio", ant_family),
        (Some("antio"), "in", &["in", "is"]),
        (
            Some("in"),
            "an",
            &["a", "an", "and", "andy", "ant", "anti", "antio"],
        ),
    ];
    for (restored, removed, probes) in rounds {
        if let Some(word) = restored {
            commands.push(Command::Insert(word.to_string()));
        }
        commands.push(Command::Delete(removed.to_string()));
        commands.extend(searches(probes));
    }
    commands
}
