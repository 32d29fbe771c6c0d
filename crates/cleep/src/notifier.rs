//! Terminal notifier: panel notices on stderr.
//!
//! `loading` starts a spinner that the next notice replaces.

use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use owo_colors::OwoColorize;

use cleep_core::Notifier;

pub struct ConsoleNotifier {
    quiet: bool,
    color: bool,
    spinner: Mutex<Option<ProgressBar>>,
}

impl ConsoleNotifier {
    pub fn new(quiet: bool, color: bool) -> Self {
        Self {
            quiet,
            color,
            spinner: Mutex::new(None),
        }
    }

    fn finish_spinner(&self) {
        let spinner = self
            .spinner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(spinner) = spinner {
            spinner.finish_and_clear();
        }
    }

    fn line(&self, symbol: &str, message: &str, paint: fn(&str) -> String) {
        self.finish_spinner();
        if self.quiet {
            return;
        }
        if self.color {
            eprintln!("{} {message}", paint(symbol));
        } else {
            eprintln!("{symbol} {message}");
        }
    }
}

impl Notifier for ConsoleNotifier {
    fn info(&self, message: &str) {
        self.line("i", message, |s| s.cyan().to_string());
    }

    fn success(&self, message: &str) {
        self.line("✓", message, |s| s.green().to_string());
    }

    fn loading(&self, message: &str) {
        self.finish_spinner();
        if self.quiet {
            return;
        }
        let spinner = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::with_template("{spinner} {msg}") {
            spinner.set_style(style);
        }
        spinner.set_message(message.to_owned());
        spinner.enable_steady_tick(Duration::from_millis(100));
        *self.spinner.lock().unwrap_or_else(PoisonError::into_inner) = Some(spinner);
    }

    fn error(&self, message: &str) {
        // Errors are shown even in quiet mode.
        self.finish_spinner();
        if self.color {
            eprintln!("{} {message}", "✗".red());
        } else {
            eprintln!("✗ {message}");
        }
    }
}

impl Drop for ConsoleNotifier {
    fn drop(&mut self) {
        self.finish_spinner();
    }
}
