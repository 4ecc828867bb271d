//! Parsing of shell input lines into [`Command`]s.
//!
//! Input is trimmed and split on whitespace; the first word selects the
//! command through the [`CommandCatalog`]. Paths stay as typed and are
//! resolved against the working directory at dispatch time.

use super::catalog::{CommandCatalog, CommandKind};

/// A parsed shell command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// List a directory, the working directory if `path` is `None`.
    List {
        path: Option<String>,
        recursive: bool,
    },
    /// Create an empty file.
    Touch(String),
    /// Create a directory, parents included.
    MakeDir(String),
    /// Delete a file or directory recursively.
    Remove(String),
    /// Change directory; `None` means the root.
    ChangeDir(Option<String>),
    Back,
    Forward,
    Pwd,
    Cat(String),
    /// Replace a file's content with the given text.
    Write { path: String, content: String },
    Hash(String),
    /// Run a duplicate scan.
    Dups {
        path: Option<String>,
        json: bool,
        all: bool,
    },
    Help,
    Exit,
}

/// Why a line could not be turned into a [`Command`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    /// The first word is not a known command.
    #[error("Invalid command: {0}")]
    Unknown(String),

    /// Arguments are missing or surplus.
    #[error("Usage: {0}")]
    Usage(&'static str),

    /// A `-flag` the command does not accept.
    #[error("Unknown option {flag}. Usage: {usage}")]
    UnknownFlag { flag: String, usage: &'static str },
}

/// Parses one input line. Blank lines yield `Ok(None)`.
///
/// # Errors
///
/// See [`ParseError`].
pub fn parse(catalog: &CommandCatalog, line: &str) -> Result<Option<Command>, ParseError> {
    let mut words = line.split_whitespace();
    let Some(name) = words.next() else {
        return Ok(None);
    };
    let args: Vec<&str> = words.collect();
    let descriptor = catalog
        .lookup(name)
        .ok_or_else(|| ParseError::Unknown(name.to_string()))?;
    let usage = descriptor.usage;

    let command = match descriptor.kind {
        CommandKind::List => {
            let (flags, positional) = split_flags(&args, &["-r"], usage)?;
            Command::List {
                path: at_most_one(&positional, usage)?,
                recursive: flags.contains(&"-r"),
            }
        }
        CommandKind::Tree => Command::List {
            path: at_most_one(&args, usage)?,
            recursive: true,
        },
        CommandKind::Touch => Command::Touch(exactly_one(&args, usage)?),
        CommandKind::MakeDir => Command::MakeDir(exactly_one(&args, usage)?),
        CommandKind::Remove => Command::Remove(exactly_one(&args, usage)?),
        CommandKind::ChangeDir => Command::ChangeDir(at_most_one(&args, usage)?),
        CommandKind::Back => no_args(&args, usage, Command::Back)?,
        CommandKind::Forward => no_args(&args, usage, Command::Forward)?,
        CommandKind::Pwd => no_args(&args, usage, Command::Pwd)?,
        CommandKind::Cat => Command::Cat(exactly_one(&args, usage)?),
        CommandKind::Write => match args.split_first() {
            Some((path, text)) if !text.is_empty() => Command::Write {
                path: (*path).to_string(),
                content: text.join(" "),
            },
            _ => return Err(ParseError::Usage(usage)),
        },
        CommandKind::Hash => Command::Hash(exactly_one(&args, usage)?),
        CommandKind::Dups => {
            let (flags, positional) = split_flags(&args, &["--json", "--all"], usage)?;
            Command::Dups {
                path: at_most_one(&positional, usage)?,
                json: flags.contains(&"--json"),
                all: flags.contains(&"--all"),
            }
        }
        CommandKind::Help => Command::Help,
        CommandKind::Exit => Command::Exit,
    };
    Ok(Some(command))
}

/// Separates `-`-prefixed words (which must be in `allowed`) from the rest.
fn split_flags<'a>(
    args: &[&'a str],
    allowed: &[&str],
    usage: &'static str,
) -> Result<(Vec<&'a str>, Vec<&'a str>), ParseError> {
    let (flags, positional): (Vec<&str>, Vec<&str>) =
        args.iter().copied().partition(|a| a.starts_with('-') && a.len() > 1);
    if let Some(bad) = flags.iter().find(|f| !allowed.contains(f)) {
        return Err(ParseError::UnknownFlag {
            flag: (*bad).to_string(),
            usage,
        });
    }
    Ok((flags, positional))
}

fn exactly_one(args: &[&str], usage: &'static str) -> Result<String, ParseError> {
    match args {
        [one] => Ok((*one).to_string()),
        _ => Err(ParseError::Usage(usage)),
    }
}

fn at_most_one(args: &[&str], usage: &'static str) -> Result<Option<String>, ParseError> {
    match args {
        [] => Ok(None),
        [one] => Ok(Some((*one).to_string())),
        _ => Err(ParseError::Usage(usage)),
    }
}

fn no_args(args: &[&str], usage: &'static str, command: Command) -> Result<Command, ParseError> {
    if args.is_empty() {
        Ok(command)
    } else {
        Err(ParseError::Usage(usage))
    }
}
