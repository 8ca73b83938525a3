//! Prompting for interactive sessions
//!
//! [`Prompter`] is the seam between the batch-entry flow and the terminal.
//! Every method re-asks until the answer validates, so callers only ever see
//! accepted values or a hard I/O failure.

use console::style;
use dialoguer::{theme::ColorfulTheme, Input};
use miette::{IntoDiagnostic, Result};
use std::io::{BufRead, Write};

use crate::core::date::ShipmentDate;
use crate::core::selection::{parse_bounded_int, parse_measurement};

/// Source of validated answers for an interactive session
pub trait Prompter {
    /// Choose one of `options`, shown 1-indexed; returns the 0-based position
    fn select(&mut self, title: &str, options: &[String]) -> Result<usize>;

    /// A real calendar date in `ddMMyyyy` form
    fn date(&mut self, prompt: &str) -> Result<ShipmentDate>;

    /// A non-negative, finite resistance in ohms
    fn measurement(&mut self, prompt: &str) -> Result<f64>;

    /// Free text, trimmed and non-empty
    fn text(&mut self, prompt: &str) -> Result<String>;

    /// Tell the user something without asking for input
    fn notice(&mut self, message: &str) -> Result<()>;
}

const RULE: &str = "======================================================";

fn option_lines(options: &[String]) -> Vec<String> {
    options
        .iter()
        .enumerate()
        .map(|(i, name)| format!("{} - {}", i + 1, name))
        .collect()
}

fn select_prompt(options: &[String]) -> String {
    format!("Select [1-{}]", options.len())
}

/// Terminal prompts via dialoguer
pub struct TerminalPrompter {
    theme: ColorfulTheme,
}

impl TerminalPrompter {
    pub fn new() -> Self {
        Self {
            theme: ColorfulTheme::default(),
        }
    }
}

impl Default for TerminalPrompter {
    fn default() -> Self {
        Self::new()
    }
}

impl Prompter for TerminalPrompter {
    fn select(&mut self, title: &str, options: &[String]) -> Result<usize> {
        println!();
        println!("{}", style(title).bold());
        println!("{}", style(RULE).dim());
        for line in option_lines(options) {
            println!("{}", line);
        }
        println!("{}", style(RULE).dim());

        let max = options.len() as i64;
        let raw: String = Input::with_theme(&self.theme)
            .with_prompt(select_prompt(options))
            .validate_with(move |input: &String| -> std::result::Result<(), String> {
                parse_bounded_int(input, 1, max)
                    .map(|_| ())
                    .map_err(|e| e.to_string())
            })
            .interact_text()
            .into_diagnostic()?;

        let choice = parse_bounded_int(&raw, 1, max).into_diagnostic()?;
        Ok((choice - 1) as usize)
    }

    fn date(&mut self, prompt: &str) -> Result<ShipmentDate> {
        let raw: String = Input::with_theme(&self.theme)
            .with_prompt(prompt)
            .validate_with(move |input: &String| -> std::result::Result<(), String> {
                ShipmentDate::parse(input).map(|_| ()).map_err(|e| e.to_string())
            })
            .interact_text()
            .into_diagnostic()?;

        ShipmentDate::parse(&raw).into_diagnostic()
    }

    fn measurement(&mut self, prompt: &str) -> Result<f64> {
        let raw: String = Input::with_theme(&self.theme)
            .with_prompt(prompt)
            .validate_with(move |input: &String| -> std::result::Result<(), String> {
                parse_measurement(input).map(|_| ()).map_err(|e| e.to_string())
            })
            .interact_text()
            .into_diagnostic()?;

        parse_measurement(&raw).into_diagnostic()
    }

    fn text(&mut self, prompt: &str) -> Result<String> {
        let raw: String = Input::with_theme(&self.theme)
            .with_prompt(prompt)
            .validate_with(move |input: &String| -> std::result::Result<(), &'static str> {
                if input.trim().is_empty() {
                    Err("a value is required")
                } else {
                    Ok(())
                }
            })
            .interact_text()
            .into_diagnostic()?;

        Ok(raw.trim().to_string())
    }

    fn notice(&mut self, message: &str) -> Result<()> {
        println!("{}", message);
        Ok(())
    }
}

/// Line-oriented prompts over any reader and writer
///
/// Used when stdin is not a terminal. Each answer is one line; invalid
/// answers are reported on `output` and asked again.
pub struct LinePrompter<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> LinePrompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Give back the writer, e.g. to inspect what was shown
    pub fn into_output(self) -> W {
        self.output
    }

    fn ask(&mut self, prompt: &str) -> Result<String> {
        write!(self.output, "{}: ", prompt).into_diagnostic()?;
        self.output.flush().into_diagnostic()?;

        let mut line = String::new();
        let read = self.input.read_line(&mut line).into_diagnostic()?;
        // Answers are not echoed, so end the prompt line ourselves
        writeln!(self.output).into_diagnostic()?;
        if read == 0 {
            return Err(miette::miette!(
                code = "rqc::prompt::eof",
                "input ended before the session was complete"
            ));
        }
        Ok(line.trim_end_matches(['\n', '\r']).to_string())
    }

    fn ask_until<T, E: std::fmt::Display>(
        &mut self,
        prompt: &str,
        parse: impl Fn(&str) -> std::result::Result<T, E>,
    ) -> Result<T> {
        loop {
            let raw = self.ask(prompt)?;
            match parse(&raw) {
                Ok(value) => return Ok(value),
                Err(e) => writeln!(self.output, "{}", e).into_diagnostic()?,
            }
        }
    }
}

impl<R: BufRead, W: Write> Prompter for LinePrompter<R, W> {
    fn select(&mut self, title: &str, options: &[String]) -> Result<usize> {
        writeln!(self.output, "{}", title).into_diagnostic()?;
        writeln!(self.output, "{}", RULE).into_diagnostic()?;
        for line in option_lines(options) {
            writeln!(self.output, "{}", line).into_diagnostic()?;
        }
        writeln!(self.output, "{}", RULE).into_diagnostic()?;

        let max = options.len() as i64;
        let choice = self.ask_until(&select_prompt(options), |raw| parse_bounded_int(raw, 1, max))?;
        Ok((choice - 1) as usize)
    }

    fn date(&mut self, prompt: &str) -> Result<ShipmentDate> {
        self.ask_until(prompt, ShipmentDate::parse)
    }

    fn measurement(&mut self, prompt: &str) -> Result<f64> {
        self.ask_until(prompt, parse_measurement)
    }

    fn text(&mut self, prompt: &str) -> Result<String> {
        self.ask_until(prompt, |raw| {
            let trimmed = raw.trim();
            if trimmed.is_empty() {
                Err("a value is required")
            } else {
                Ok(trimmed.to_string())
            }
        })
    }

    fn notice(&mut self, message: &str) -> Result<()> {
        writeln!(self.output, "{}", message).into_diagnostic()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn prompter(input: &str) -> LinePrompter<Cursor<Vec<u8>>, Vec<u8>> {
        LinePrompter::new(Cursor::new(input.as_bytes().to_vec()), Vec::new())
    }

    fn options() -> Vec<String> {
        vec!["One".to_string(), "Two".to_string(), "Three".to_string()]
    }

    #[test]
    fn test_select_returns_zero_based_index() {
        let mut p = prompter("2\n");
        assert_eq!(p.select("Pick", &options()).unwrap(), 1);
        let shown = String::from_utf8(p.into_output()).unwrap();
        assert!(shown.contains("1 - One"));
        assert!(shown.contains("3 - Three"));
    }

    #[test]
    fn test_select_reasks_on_invalid_input() {
        let mut p = prompter("x\n0\n4\n3\n");
        assert_eq!(p.select("Pick", &options()).unwrap(), 2);
        let shown = String::from_utf8(p.into_output()).unwrap();
        assert!(shown.contains("only defined integer values"));
        assert!(shown.contains("4 is not an option"));
    }

    #[test]
    fn test_date_reasks_until_valid() {
        let mut p = prompter("29022019\n2902\n29022020\n");
        let date = p.date("Date").unwrap();
        assert_eq!(date.to_string(), "29022020");
    }

    #[test]
    fn test_measurement_reasks_on_negative() {
        let mut p = prompter("-5\nabc\n1000.5\n");
        assert_eq!(p.measurement("Value").unwrap(), 1000.5);
    }

    #[test]
    fn test_text_trims_and_requires_value() {
        let mut p = prompter("\n  qc-log  \n");
        assert_eq!(p.text("Name").unwrap(), "qc-log");
    }

    #[test]
    fn test_eof_is_an_error() {
        let mut p = prompter("");
        assert!(p.select("Pick", &options()).is_err());
    }

    #[test]
    fn test_windows_line_endings() {
        let mut p = prompter("1\r\n");
        assert_eq!(p.select("Pick", &options()).unwrap(), 0);
    }
}
