//! Line-oriented prompts

use std::io::{self, BufRead, Write};

/// Interactive question/answer over any reader and writer
pub struct Prompter<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Prompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    pub fn output(&mut self) -> &mut W {
        &mut self.output
    }

    /// Print `question` and read one trimmed line; `None` at end of input
    pub fn ask(&mut self, question: &str) -> io::Result<Option<String>> {
        write!(self.output, "{question}")?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }

    /// Ask a yes/no question; only "y" or "yes" count as yes
    pub fn confirm(&mut self, question: &str) -> io::Result<bool> {
        Ok(self
            .ask(question)?
            .is_some_and(|answer| matches!(answer.to_ascii_lowercase().as_str(), "y" | "yes")))
    }
}
