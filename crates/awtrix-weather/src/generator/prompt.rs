//! Line-oriented prompts with defaults and re-prompt on invalid input.

use std::io::{BufRead, Write};

use crate::validation::ValidationError;

use super::GeneratorError;

/// Reads answers from `input`, writes prompts and errors to `output`.
pub struct Prompter<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Prompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Print a line of text.
    pub fn say(&mut self, text: &str) -> Result<(), GeneratorError> {
        writeln!(self.output, "{}", text)?;
        Ok(())
    }

    /// Ask once and return the trimmed answer. Closed input is an error.
    pub fn ask(&mut self, prompt: &str, default: Option<&str>) -> Result<String, GeneratorError> {
        match default {
            Some(default) => write!(self.output, "{} (Default: {}): ", prompt, default)?,
            None => write!(self.output, "{}: ", prompt)?,
        }
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Err(GeneratorError::InputClosed);
        }
        let answer = line.trim();
        Ok(match default {
            Some(default) if answer.is_empty() => default.to_string(),
            _ => answer.to_string(),
        })
    }

    /// Ask until `parse` accepts the answer, printing each validation error.
    pub fn ask_valid<T>(
        &mut self,
        prompt: &str,
        default: Option<&str>,
        parse: impl Fn(&str) -> Result<T, ValidationError>,
    ) -> Result<T, GeneratorError> {
        loop {
            let answer = self.ask(prompt, default)?;
            match parse(&answer) {
                Ok(value) => return Ok(value),
                Err(e) => self.say(&e.to_string())?,
            }
        }
    }

    pub fn into_output(self) -> W {
        self.output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::parse_port;
    use std::io::Cursor;

    fn prompter(input: &str) -> Prompter<Cursor<Vec<u8>>, Vec<u8>> {
        Prompter::new(Cursor::new(input.as_bytes().to_vec()), Vec::new())
    }

    #[test]
    fn test_ask_uses_default_on_empty_answer() {
        let mut p = prompter("\n  host.local  \n");
        assert_eq!(p.ask("Host", Some("127.0.0.1")).unwrap(), "127.0.0.1");
        assert_eq!(p.ask("Host", Some("127.0.0.1")).unwrap(), "host.local");
        let out = String::from_utf8(p.into_output()).unwrap();
        assert!(out.starts_with("Host (Default: 127.0.0.1): "));
    }

    #[test]
    fn test_ask_valid_reprompts_until_valid() {
        let mut p = prompter("abc\n70000\n1884\n");
        assert_eq!(p.ask_valid("Port", Some("1883"), parse_port).unwrap(), 1884);
        let out = String::from_utf8(p.into_output()).unwrap();
        assert_eq!(out.matches("Port (Default: 1883): ").count(), 3);
        assert_eq!(out.matches("Port must be a number").count(), 2);
    }

    #[test]
    fn test_closed_input_is_an_error() {
        let mut p = prompter("abc\n");
        let result = p.ask_valid("Port", None, parse_port);
        assert!(matches!(result, Err(GeneratorError::InputClosed)));
    }
}
