use crate::session_store::default_session_path;
use anyhow::{Context, Result, bail};
use std::path::PathBuf;

pub const USAGE: &str = "\
Usage: tocbar --toc <file> [options]

Options:
  --toc <file>            Table of contents: book sidebar HTML, or JSON (*.json)
  --root-path <path>      Prefix from the current page to the book root (default: empty)
  --location <url>        Page being viewed (default: index.html)
  --session-file <path>   Where the session slots are kept
  --print                 Print the mounted sidebar as text and exit
  --html                  Print the mounted sidebar markup and exit
  -h, --help              Show this message";

/// Page assumed when no location is given: the book's index
pub const DEFAULT_LOCATION: &str = "index.html";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputMode {
    #[default]
    Interactive,
    Print,
    Html,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CliOptions {
    pub toc_file: PathBuf,
    pub root_path: String,
    pub location: String,
    pub session_file: PathBuf,
    pub mode: OutputMode,
}

/// What the command line asked for
#[derive(Debug, PartialEq, Eq)]
pub enum Command {
    Run(CliOptions),
    Help,
}

impl CliOptions {
    /// Parse the arguments after the program name
    pub fn parse<I>(args: I) -> Result<Command>
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        let mut toc_file = None;
        let mut root_path = String::new();
        let mut location = DEFAULT_LOCATION.to_string();
        let mut session_file = None;
        let mut mode = OutputMode::Interactive;

        let mut args = args.into_iter().map(Into::into);
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "-h" | "--help" => return Ok(Command::Help),
                "--toc" => toc_file = Some(PathBuf::from(value_for(&arg, args.next())?)),
                "--root-path" => root_path = value_for(&arg, args.next())?,
                "--location" => location = value_for(&arg, args.next())?,
                "--session-file" => {
                    session_file = Some(PathBuf::from(value_for(&arg, args.next())?))
                }
                "--print" | "--html" => {
                    if mode != OutputMode::Interactive {
                        bail!("--print and --html cannot be combined\n\n{USAGE}");
                    }
                    mode = if arg == "--print" {
                        OutputMode::Print
                    } else {
                        OutputMode::Html
                    };
                }
                other => bail!("Unknown argument: {other}\n\n{USAGE}"),
            }
        }

        let toc_file = toc_file.with_context(|| format!("Missing --toc <file>\n\n{USAGE}"))?;

        Ok(Command::Run(CliOptions {
            toc_file,
            root_path,
            location,
            session_file: session_file.unwrap_or_else(default_session_path),
            mode,
        }))
    }
}

fn value_for(flag: &str, value: Option<String>) -> Result<String> {
    match value {
        Some(value) if !value.starts_with("--") => Ok(value),
        _ => bail!("{flag} expects a value\n\n{USAGE}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(args: &[&str]) -> CliOptions {
        match CliOptions::parse(args.iter().copied()).unwrap() {
            Command::Run(options) => options,
            Command::Help => panic!("Expected run options"),
        }
    }

    #[test]
    fn test_defaults() {
        let options = run(&["--toc", "book/toc.html"]);
        assert_eq!(options.toc_file, PathBuf::from("book/toc.html"));
        assert_eq!(options.root_path, "");
        assert_eq!(options.location, DEFAULT_LOCATION);
        assert_eq!(options.session_file, default_session_path());
        assert_eq!(options.mode, OutputMode::Interactive);
    }

    #[test]
    fn test_all_options() {
        let options = run(&[
            "--root-path",
            "../",
            "--toc",
            "toc.json",
            "--location",
            "https://docs.example.com/book/b/b1.html",
            "--session-file",
            "/tmp/s.json",
            "--html",
        ]);
        assert_eq!(options.root_path, "../");
        assert_eq!(options.location, "https://docs.example.com/book/b/b1.html");
        assert_eq!(options.session_file, PathBuf::from("/tmp/s.json"));
        assert_eq!(options.mode, OutputMode::Html);
    }

    #[test]
    fn test_help() {
        assert_eq!(
            CliOptions::parse(["--toc", "x.html", "--help"]).unwrap(),
            Command::Help
        );
    }

    #[test]
    fn test_errors() {
        assert!(CliOptions::parse(Vec::<String>::new()).is_err());
        assert!(CliOptions::parse(["--toc"]).is_err());
        assert!(CliOptions::parse(["--toc", "--print"]).is_err());
        assert!(CliOptions::parse(["--toc", "a.html", "--print", "--html"]).is_err());

        let err = CliOptions::parse(["--toc", "a.html", "--verbose"]).unwrap_err();
        assert!(err.to_string().starts_with("Unknown argument: --verbose"));
    }
}
