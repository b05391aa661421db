use console::style;
use serde::Serialize;

use crate::error::Result;

pub fn emit_json<T: Serialize>(value: &T) -> Result<()> {
    let payload = serde_json::to_string_pretty(value)?;
    println!("{payload}");
    Ok(())
}

pub struct HumanLayout {
    lines: Vec<String>,
    key_width: usize,
    wrap_width: usize,
}

impl Default for HumanLayout {
    fn default() -> Self {
        Self::new()
    }
}

impl HumanLayout {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            lines: Vec::new(),
            key_width: 18,
            wrap_width: 0,
        }
    }

    /// Wrap `paragraph` and `numbered` text at `width` columns; 0 disables.
    #[must_use]
    pub const fn with_wrap(mut self, width: usize) -> Self {
        self.wrap_width = width;
        self
    }

    pub fn title(&mut self, text: &str) -> &mut Self {
        self.lines.push(style(text).bold().to_string());
        self.lines.push(String::new());
        self
    }

    pub fn section(&mut self, text: &str) -> &mut Self {
        self.lines.push(style(text).bold().to_string());
        self.lines.push("-".repeat(text.chars().count().max(3)));
        self
    }

    pub fn kv(&mut self, key: &str, value: &str) -> &mut Self {
        let padded = format!("{key:width$}", width = self.key_width);
        self.lines
            .push(format!("{} {value}", style(padded).dim()));
        self
    }

    pub fn bullet(&mut self, text: &str) -> &mut Self {
        self.lines.push(format!("- {text}"));
        self
    }

    /// `N. text`, continuation lines indented under the text.
    pub fn numbered(&mut self, number: usize, text: &str) -> &mut Self {
        let label = format!("{number}. ");
        let indent = " ".repeat(label.len());
        self.push_wrapped(text, &label, &indent);
        self
    }

    pub fn paragraph(&mut self, text: &str) -> &mut Self {
        self.push_wrapped(text, "", "");
        self
    }

    pub fn note(&mut self, text: &str) -> &mut Self {
        self.lines.push(style(text).dim().italic().to_string());
        self
    }

    pub fn blank(&mut self) -> &mut Self {
        self.lines.push(String::new());
        self
    }

    pub fn push_line(&mut self, line: impl Into<String>) -> &mut Self {
        self.lines.push(line.into());
        self
    }

    #[must_use]
    pub fn build(self) -> String {
        self.lines.join("\n")
    }

    fn push_wrapped(&mut self, text: &str, first: &str, rest: &str) {
        if self.wrap_width == 0 {
            self.lines.push(format!("{first}{text}"));
            return;
        }
        let options = textwrap::Options::new(self.wrap_width)
            .initial_indent(first)
            .subsequent_indent(rest);
        self.lines
            .extend(textwrap::wrap(text, options).into_iter().map(String::from));
    }
}

pub fn emit_human(layout: HumanLayout) {
    println!("{}", layout.build());
}

/// `[#####.....]` for a fraction in `[0, 1]`.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
pub fn progress_bar(fraction: f64, width: usize) -> String {
    let filled = (fraction.clamp(0.0, 1.0) * width as f64).round() as usize;
    format!("[{}{}]", "#".repeat(filled), ".".repeat(width - filled))
}

/// Whole-number percentage.
#[must_use]
pub fn percent(value: f64) -> String {
    format!("{:.0}%", value * 100.0)
}
