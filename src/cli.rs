//! Command-line arguments for the `fanlog` binary.
//!
//! The CLI is also a figment provider: flags that add handlers are adjoined
//! to the handlers loaded from the configuration file.

use crate::config::HandlerConfig;
use crate::context::{Context, Value};
use crate::level::Level;
use clap::Parser;
use figment::{
    providers::Serialized,
    value::{Dict, Map},
    Error, Metadata, Profile, Provider,
};
use std::path::PathBuf;

/// Emit one log event through the configured handlers.
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to the TOML configuration file.
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Severity of the event.
    #[arg(short, long, default_value = "INFO")]
    pub level: Level,

    /// Logger name to stamp on the event.
    #[arg(short, long)]
    pub name: Option<String>,

    /// Also write the event as JSON to stdout.
    #[arg(long)]
    pub json: bool,

    /// The message to log.
    pub message: String,

    /// Context fields as KEY=VALUE.
    #[arg(value_name = "KEY=VALUE", value_parser = parse_field)]
    pub fields: Vec<(String, Value)>,
}

impl Cli {
    pub fn context(&self) -> Context {
        self.fields.iter().cloned().collect()
    }
}

/// Parses `key=value`; the value is typed with [`Value::parse_loose`].
pub fn parse_field(s: &str) -> Result<(String, Value), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got {:?}", s))?;
    if key.is_empty() {
        return Err(format!("empty key in {:?}", s));
    }
    Ok((key.to_string(), Value::parse_loose(value)))
}

impl Provider for Cli {
    fn metadata(&self) -> Metadata {
        Metadata::named("Command-Line Arguments")
    }

    fn data(&self) -> Result<Map<Profile, Dict>, Error> {
        let mut handlers = Vec::new();
        if self.json {
            handlers.push(HandlerConfig::Structured {
                min_level: Level::Debug,
                output: "stdout".to_string(),
            });
        }
        if handlers.is_empty() {
            return Ok(Map::new());
        }
        Serialized::default("handlers", handlers).data()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_field() {
        assert_eq!(
            parse_field("user=ada").unwrap(),
            ("user".to_string(), Value::from("ada"))
        );
        assert_eq!(
            parse_field("n=3").unwrap(),
            ("n".to_string(), Value::Int(3))
        );
        assert_eq!(
            parse_field("eq=a=b").unwrap(),
            ("eq".to_string(), Value::from("a=b"))
        );
        assert!(parse_field("novalue").is_err());
        assert!(parse_field("=x").is_err());
    }

    #[test]
    fn test_parse_args() {
        let cli = Cli::parse_from([
            "fanlog", "--level", "warning", "--name", "svc", "disk low", "free=12",
        ]);
        assert_eq!(cli.level, Level::Warning);
        assert_eq!(cli.name.as_deref(), Some("svc"));
        assert_eq!(cli.message, "disk low");
        assert_eq!(cli.context().get("free"), Some(&Value::Int(12)));
    }
}
