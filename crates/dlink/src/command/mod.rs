//! The `dl` command router.
//!
//! Command lines are parsed into a [`Command`] before any socket is opened,
//! so malformed arguments never cause netlink traffic. Keywords match by
//! prefix (`sh` is `show`), trying candidates in declaration order; an
//! omitted verb means `show`.

mod run;

pub use run::{run, usage};

use std::fmt;

use crate::devlink::PortType;
use crate::netlink::error::{Error, Result};

/// Objects, in match priority order.
const OBJECTS: &[&str] = &["help", "dev", "port", "monitor"];
/// `dev` verbs, in match priority order.
const DEV_VERBS: &[&str] = &["help", "show", "set"];
/// `port` verbs, in match priority order.
const PORT_VERBS: &[&str] = &["help", "show", "set", "split", "unsplit"];

/// Which usage text to print.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HelpTopic {
    Main,
    Dev,
    Port,
}

/// A `DEV/PORT_INDEX` argument before name resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortArg {
    pub dev: String,
    pub port_index: u32,
}

impl PortArg {
    /// Split on the first `/`; the port index must fit in an `int`.
    pub fn parse(token: &str) -> Result<Self> {
        let (dev, port) = token.split_once('/').ok_or_else(|| {
            Error::Parse(
                "Wrong port identification string format. Expected \"device/port_index\"".into(),
            )
        })?;
        let port_index = parse_uint(port)
            .ok_or_else(|| Error::Parse(format!("Port index \"{}\" is not a number", port)))?;
        Ok(Self {
            dev: dev.to_string(),
            port_index,
        })
    }
}

impl fmt::Display for PortArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.dev, self.port_index)
    }
}

/// A parsed command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Help(HelpTopic),
    DevShow {
        dev: Option<String>,
    },
    DevSet {
        dev: String,
        name: Option<String>,
    },
    PortShow {
        port: Option<PortArg>,
    },
    PortSet {
        port: PortArg,
        port_type: Option<PortType>,
    },
    PortSplit {
        port: PortArg,
        count: u32,
    },
    PortUnsplit {
        port: PortArg,
    },
    Monitor,
}

impl Command {
    /// Whether running the command needs a devlink session.
    pub fn needs_connection(&self) -> bool {
        !matches!(self, Self::Help(_))
    }
}

/// Whether `token` abbreviates `keyword`. An empty token matches anything.
pub fn matches_keyword(token: &str, keyword: &str) -> bool {
    token.len() <= keyword.len() && keyword.starts_with(token)
}

/// First keyword in `table` that `token` abbreviates.
fn lookup(token: &str, table: &[&'static str]) -> Option<&'static str> {
    table.iter().copied().find(|kw| matches_keyword(token, kw))
}

/// Parse the object/verb tokens that follow the global options.
pub fn parse<S: AsRef<str>>(args: &[S]) -> Result<Command> {
    let mut args = Args::new(args);

    let Some(object) = args.next() else {
        return Ok(Command::Help(HelpTopic::Main));
    };

    match lookup(object, OBJECTS) {
        Some("help") => Ok(Command::Help(HelpTopic::Main)),
        Some("dev") => parse_dev(&mut args),
        Some("port") => parse_port(&mut args),
        Some("monitor") => {
            args.ignore_rest();
            Ok(Command::Monitor)
        }
        _ => Err(Error::UnknownCommand {
            kind: "Object",
            token: object.to_string(),
        }),
    }
}

fn parse_dev<S: AsRef<str>>(args: &mut Args<'_, S>) -> Result<Command> {
    let verb = match args.next() {
        None => "show",
        Some(token) => lookup(token, DEV_VERBS).ok_or_else(|| unknown_verb(token))?,
    };

    match verb {
        "help" => Ok(Command::Help(HelpTopic::Dev)),
        "show" => {
            let dev = args.next().map(str::to_string);
            args.expect_end()?;
            Ok(Command::DevShow { dev })
        }
        _ => {
            let dev = args.required("Device name expected")?.to_string();
            let mut name = None;
            while let Some(token) = args.next() {
                if matches_keyword(token, "name") {
                    name = Some(args.required("Name argument expected")?.to_string());
                } else {
                    tracing::warn!(token, "ignoring unknown dev set argument");
                }
            }
            Ok(Command::DevSet { dev, name })
        }
    }
}

fn parse_port<S: AsRef<str>>(args: &mut Args<'_, S>) -> Result<Command> {
    let verb = match args.next() {
        None => "show",
        Some(token) => lookup(token, PORT_VERBS).ok_or_else(|| unknown_verb(token))?,
    };

    match verb {
        "help" => Ok(Command::Help(HelpTopic::Port)),
        "show" => {
            let port = args.next().map(PortArg::parse).transpose()?;
            args.expect_end()?;
            Ok(Command::PortShow { port })
        }
        "set" => {
            let port = args.port()?;
            let mut port_type = None;
            while let Some(token) = args.next() {
                if matches_keyword(token, "type") {
                    port_type = Some(args.required("Type argument expected")?.parse()?);
                } else {
                    tracing::warn!(token, "ignoring unknown port set argument");
                }
            }
            Ok(Command::PortSet { port, port_type })
        }
        "split" => {
            let port = args.port()?;
            let count = args.required("Unsigned number expected")?;
            let count = parse_uint(count)
                .ok_or_else(|| Error::Parse(format!("\"{}\" is not a number", count)))?;
            args.expect_end()?;
            Ok(Command::PortSplit { port, count })
        }
        _ => {
            let port = args.port()?;
            args.expect_end()?;
            Ok(Command::PortUnsplit { port })
        }
    }
}

fn unknown_verb(token: &str) -> Error {
    Error::UnknownCommand {
        kind: "Command",
        token: token.to_string(),
    }
}

/// Decimal digits only, at most `i32::MAX`.
fn parse_uint(s: &str) -> Option<u32> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse::<u32>()
        .ok()
        .filter(|v| *v <= i32::MAX as u32)
}

/// Cursor over the remaining tokens.
struct Args<'a, S> {
    rest: &'a [S],
}

impl<'a, S: AsRef<str>> Args<'a, S> {
    fn new(rest: &'a [S]) -> Self {
        Self { rest }
    }

    fn next(&mut self) -> Option<&'a str> {
        let (first, rest) = self.rest.split_first()?;
        self.rest = rest;
        Some(first.as_ref())
    }

    fn required(&mut self, missing: &str) -> Result<&'a str> {
        self.next().ok_or_else(|| Error::Parse(missing.to_string()))
    }

    fn port(&mut self) -> Result<PortArg> {
        PortArg::parse(self.required("Port identification (\"device/port_index\") expected")?)
    }

    fn expect_end(&mut self) -> Result<()> {
        match self.next() {
            Some(extra) => Err(Error::Parse(format!("Unexpected argument \"{}\"", extra))),
            None => Ok(()),
        }
    }

    fn ignore_rest(&mut self) {
        while let Some(token) = self.next() {
            tracing::warn!(token, "ignoring extra argument");
        }
    }
}
