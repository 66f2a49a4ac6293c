//! Human-in-the-loop gate between discovery and extraction

use crate::crawler::coordinator::Discovery;
use std::io::{self, BufRead, StdinLock, Stdout, Write};

/// Decides whether a discovered catalog should be extracted
pub trait Confirm {
    fn confirm(&mut self, discovery: &Discovery) -> bool;
}

impl<F> Confirm for F
where
    F: FnMut(&Discovery) -> bool,
{
    fn confirm(&mut self, discovery: &Discovery) -> bool {
        self(discovery)
    }
}

/// Approves every discovery without asking (`--yes`)
#[derive(Debug, Clone, Copy, Default)]
pub struct AutoApprove;

impl Confirm for AutoApprove {
    fn confirm(&mut self, discovery: &Discovery) -> bool {
        tracing::info!(
            "Proceeding with {} accidents for {} without confirmation",
            discovery.total,
            discovery.year
        );
        true
    }
}

/// Asks on the console; only `y` or `Y` proceeds
pub struct ConsolePrompt<R, W> {
    input: R,
    output: W,
}

impl ConsolePrompt<StdinLock<'static>, Stdout> {
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> ConsolePrompt<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    fn ask(&mut self, discovery: &Discovery) -> io::Result<bool> {
        writeln!(
            self.output,
            "\nFound {} total accidents across {} pages for {}",
            discovery.total,
            discovery.pages.len(),
            discovery.year
        )?;
        write!(self.output, "Proceed with scraping all accidents? (y/n): ")?;
        self.output.flush()?;

        let mut answer = String::new();
        self.input.read_line(&mut answer)?;
        Ok(answer.trim().eq_ignore_ascii_case("y"))
    }
}

impl<R: BufRead, W: Write> Confirm for ConsolePrompt<R, W> {
    fn confirm(&mut self, discovery: &Discovery) -> bool {
        match self.ask(discovery) {
            Ok(true) => true,
            Ok(false) => {
                let _ = writeln!(self.output, "Scraping cancelled");
                false
            }
            Err(e) => {
                tracing::warn!("Could not read confirmation: {}", e);
                false
            }
        }
    }
}
