//! Player input for the battle loop.

use crate::battle::BattleEvent;
use std::io::{self, BufRead, ErrorKind, Write};

/// A numbered menu. Options are shown as `1) label` lines above the message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub header: Option<String>,
    pub options: Vec<String>,
    pub message: String,
}

impl Prompt {
    pub fn new(message: impl Into<String>, options: Vec<String>) -> Self {
        Self {
            header: None,
            options,
            message: message.into(),
        }
    }

    pub fn with_header(mut self, header: impl Into<String>) -> Self {
        self.header = Some(header.into());
        self
    }

    /// Highest selectable option number.
    pub fn max(&self) -> usize {
        self.options.len()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Choice {
    /// 1-based option number
    Selected(usize),
    Cancelled,
}

/// Where the battle asks for decisions and reports what happened.
pub trait Prompter {
    /// Ask until a valid choice or a cancel comes back. Invalid input is
    /// handled here and never reaches the caller.
    fn prompt_choice(&mut self, prompt: &Prompt) -> io::Result<Choice>;

    /// Called for every battle event as it happens.
    fn notify(&mut self, _event: &BattleEvent) {}
}

/// Read one answer. `c` cancels, `y` and `n` stand for 1 and 2.
pub fn parse_choice(input: &str, max: usize) -> Option<Choice> {
    let input = input.trim().to_lowercase();
    match input.as_str() {
        "c" => return Some(Choice::Cancelled),
        "y" if max >= 1 => return Some(Choice::Selected(1)),
        "n" if max >= 2 => return Some(Choice::Selected(2)),
        _ => {}
    }
    input
        .parse::<usize>()
        .ok()
        .filter(|choice| (1..=max).contains(choice))
        .map(Choice::Selected)
}

/// Line-oriented prompter over any reader and writer, stdin/stdout in the
/// binary.
pub struct LinePrompter<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> LinePrompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    pub fn into_output(self) -> W {
        self.output
    }

    /// Show `message` and read one free-form line. `None` once input closes.
    pub fn read_command(&mut self, message: &str) -> io::Result<Option<String>> {
        write!(self.output, "{}", message)?;
        self.output.flush()?;
        match self.read_line() {
            Ok(line) => Ok(Some(line.trim().to_string())),
            Err(err) if err.kind() == ErrorKind::UnexpectedEof => Ok(None),
            Err(err) => Err(err),
        }
    }

    fn read_line(&mut self) -> io::Result<String> {
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Err(io::Error::new(ErrorKind::UnexpectedEof, "input closed"));
        }
        Ok(line)
    }
}

impl<R: BufRead, W: Write> Prompter for LinePrompter<R, W> {
    fn prompt_choice(&mut self, prompt: &Prompt) -> io::Result<Choice> {
        let max = prompt.max();
        if max == 0 {
            return Ok(Choice::Cancelled);
        }

        if let Some(header) = &prompt.header {
            writeln!(self.output, "{}", header)?;
        }
        for (number, option) in prompt.options.iter().enumerate() {
            writeln!(self.output, "{}) {}", number + 1, option)?;
        }

        loop {
            write!(self.output, "{}", prompt.message)?;
            self.output.flush()?;
            let line = self.read_line()?;
            if let Some(choice) = parse_choice(&line, max) {
                return Ok(choice);
            }
            writeln!(self.output, "Enter 1-{}, y/n, or c to cancel.", max)?;
        }
    }

    fn notify(&mut self, event: &BattleEvent) {
        if let Some(text) = event.format() {
            if let Err(err) = writeln!(self.output, "{}", text) {
                log::warn!("could not write battle event: {}", err);
            }
        }
    }
}
