//! Rendering of command results: styled text for a terminal, or one
//! `{"status": .., "data": ..}` envelope per command with `--json`

use anyhow::Result;
use console::style;
use serde::Serialize;
use std::fmt::Display;
use std::io::{self, Write};
use tabled::{settings::Style, Table, Tabled};

#[derive(Serialize)]
struct Envelope<'a, T: Serialize + ?Sized> {
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<&'a T>,
}

#[derive(Debug, Clone, Copy)]
pub struct Output {
    json: bool,
}

impl Output {
    pub fn new(json: bool) -> Self {
        Self { json }
    }

    pub fn is_json(&self) -> bool {
        self.json
    }

    /// The result of a command. JSON mode prints the envelope around `data`,
    /// otherwise `human` renders it.
    pub fn report<T, F>(&self, data: &T, human: F) -> Result<()>
    where
        T: Serialize + ?Sized,
        F: FnOnce(&Self) -> Result<()>,
    {
        if self.json {
            return envelope(&Envelope { status: "success", message: None, data: Some(data) });
        }
        human(self)
    }

    /// Rows as a table, or as a JSON array of records
    pub fn records<T: Tabled + Serialize>(&self, rows: Vec<T>) -> Result<()> {
        if self.json {
            return envelope(&Envelope { status: "success", message: None, data: Some(&rows) });
        }
        let mut stdout = io::stdout().lock();
        if rows.is_empty() {
            writeln!(stdout, "{}", style("(none)").dim())?;
        } else {
            let mut table = Table::new(rows);
            table.with(Style::rounded());
            writeln!(stdout, "{}", table)?;
        }
        Ok(())
    }

    /// A finished action, e.g. a deleted working set
    pub fn done(&self, message: impl Display) -> Result<()> {
        let message = message.to_string();
        if self.json {
            return envelope(&Envelope::<()> { status: "success", message: Some(&message), data: None });
        }
        writeln!(io::stdout().lock(), "{} {}", style("✓").green().bold(), message)?;
        Ok(())
    }

    /// Warnings go to stderr so stdout stays parseable
    pub fn warn(&self, message: impl Display) {
        let message = message.to_string();
        if self.json {
            let warning = Envelope::<()> { status: "warning", message: Some(&message), data: None };
            eprintln!("{}", serde_json::to_string(&warning).unwrap_or_default());
        } else {
            eprintln!("{} {}", style("⚠").yellow().bold(), message);
        }
    }

    pub fn note(&self, message: impl Display) -> Result<()> {
        writeln!(io::stdout().lock(), "{} {}", style("ℹ").blue().bold(), message)?;
        Ok(())
    }

    pub fn heading(&self, title: impl Display) -> Result<()> {
        writeln!(io::stdout().lock(), "\n{}", style(title).bold().underlined())?;
        Ok(())
    }

    pub fn field(&self, key: impl Display, value: impl Display) -> Result<()> {
        writeln!(io::stdout().lock(), "{}: {}", style(key).bold(), value)?;
        Ok(())
    }

    /// Indented JSON for nested values in human output
    pub fn pretty<T: Serialize + ?Sized>(&self, value: &T) -> Result<()> {
        let mut stdout = io::stdout().lock();
        serde_json::to_writer_pretty(&mut stdout, value)?;
        writeln!(stdout)?;
        Ok(())
    }

    /// One compact JSON document per line, for streamed events
    pub fn json_line<T: Serialize + ?Sized>(&self, value: &T) -> Result<()> {
        let line = serde_json::to_string(value)?;
        let mut stdout = io::stdout().lock();
        writeln!(stdout, "{}", line)?;
        stdout.flush()?;
        Ok(())
    }
}

fn envelope<T: Serialize + ?Sized>(envelope: &Envelope<'_, T>) -> Result<()> {
    let mut stdout = io::stdout().lock();
    serde_json::to_writer_pretty(&mut stdout, envelope)?;
    writeln!(stdout)?;
    Ok(())
}
