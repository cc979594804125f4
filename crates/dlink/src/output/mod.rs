//! Output formatting (text/JSON) for devlink records.

mod records;

pub use records::write_hex_dump;

use std::io::Write;

use crate::devlink::IndexMap;
use crate::netlink::error::Result;

/// Output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Plain text output.
    #[default]
    Text,
    /// JSON output, one object per record.
    Json,
}

/// Text output detail, from 1 (default) to 4.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Verbosity(u8);

impl Verbosity {
    pub const DEFAULT: Self = Self(1);
    pub const MAX: Self = Self(4);

    /// Verbosity after `count` `-v` flags.
    pub fn from_flag_count(count: u8) -> Self {
        Self(count.saturating_add(1).min(Self::MAX.0))
    }

    pub fn level(self) -> u8 {
        self.0
    }

    /// Whether output tagged with `level` is shown.
    pub fn shows(self, level: u8) -> bool {
        level <= self.0
    }
}

impl Default for Verbosity {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Output format options.
#[derive(Debug, Clone, Copy, Default)]
pub struct OutputOptions {
    /// Text output detail.
    pub verbosity: Verbosity,
    /// Pretty print (for JSON).
    pub pretty: bool,
}

/// Trait for records that can be printed.
///
/// Device names are resolved through the session's [`IndexMap`].
pub trait Printable {
    /// Print as plain text.
    fn print_text<W: Write>(
        &self,
        w: &mut W,
        opts: &OutputOptions,
        names: &IndexMap,
    ) -> std::io::Result<()>;

    /// Convert to JSON value.
    fn to_json(&self, names: &IndexMap) -> serde_json::Result<serde_json::Value>;

    /// Print in the specified format.
    fn print<W: Write>(
        &self,
        w: &mut W,
        format: OutputFormat,
        opts: &OutputOptions,
        names: &IndexMap,
    ) -> Result<()> {
        match format {
            OutputFormat::Text => self.print_text(w, opts, names)?,
            OutputFormat::Json => {
                let json = self.to_json(names)?;
                if opts.pretty {
                    serde_json::to_writer_pretty(&mut *w, &json)?;
                } else {
                    serde_json::to_writer(&mut *w, &json)?;
                }
                writeln!(w)?;
            }
        }
        Ok(())
    }
}

/// Writes records to an output stream with fixed format and options.
pub struct Printer<W: Write> {
    out: W,
    format: OutputFormat,
    opts: OutputOptions,
}

impl<W: Write> Printer<W> {
    pub fn new(out: W, format: OutputFormat, opts: OutputOptions) -> Self {
        Self { out, format, opts }
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }

    pub fn options(&self) -> &OutputOptions {
        &self.opts
    }

    /// Print one record and flush, so monitor output appears as it arrives.
    pub fn print<P: Printable>(&mut self, item: &P, names: &IndexMap) -> Result<()> {
        item.print(&mut self.out, self.format, &self.opts, names)?;
        self.out.flush()?;
        Ok(())
    }

    /// Print every record in order.
    pub fn print_all<P: Printable>(&mut self, items: &[P], names: &IndexMap) -> Result<()> {
        for item in items {
            item.print(&mut self.out, self.format, &self.opts, names)?;
        }
        self.out.flush()?;
        Ok(())
    }

    /// Write plain text regardless of format (usage text).
    pub fn write_text(&mut self, text: &str) -> Result<()> {
        self.out.write_all(text.as_bytes())?;
        self.out.flush()?;
        Ok(())
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}
