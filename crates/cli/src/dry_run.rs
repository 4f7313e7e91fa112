//! An enforcer that only reports what it would install.

use clap::ValueEnum;
use policy::{Enforcer, PolicySpec};
use std::io::{self, Write};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Format {
    Text,
    Json,
}

/// Writes each grant instead of enforcing it.
pub struct DryRun<W> {
    out: W,
    format: Format,
}

impl<W: Write> DryRun<W> {
    pub fn new(out: W, format: Format) -> Self {
        Self { out, format }
    }
}

impl<W: Write> Enforcer for DryRun<W> {
    type Error = io::Error;

    fn install(&mut self, policy: &PolicySpec) -> io::Result<()> {
        match self.format {
            Format::Text => {
                for grant in policy {
                    writeln!(self.out, "{grant}")?;
                }
            }
            Format::Json => {
                serde_json::to_writer_pretty(&mut self.out, policy)?;
                writeln!(self.out)?;
            }
        }
        self.out.flush()
    }
}
