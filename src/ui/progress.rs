use crate::ui::progress_message::ProgressMessage;
use crate::ui::{phase, theme, Icons};
use indicatif::{HumanDuration, ProgressBar};
use owo_colors::OwoColorize;
use std::time::Duration;

pub struct Spinner {
    pb: ProgressBar,
}

impl Spinner {
    pub fn new(message: &str) -> Self {
        let pb = if console::Term::stdout().is_term() {
            ProgressBar::new_spinner()
        } else {
            ProgressBar::hidden()
        };
        pb.set_message(message.to_string());
        if !pb.is_hidden() {
            pb.enable_steady_tick(Duration::from_millis(100));
        }
        Self { pb }
    }

    pub fn set_message(&self, msg: &str) {
        self.pb.set_message(msg.to_string());
    }

    pub fn finish_and_clear(&self) {
        self.pb.finish_and_clear();
    }

    pub fn println(&self, line: &str) {
        if self.pb.is_hidden() {
            println!("{}", line);
        } else {
            self.pb.println(line);
        }
    }
}

/// Renders pipeline progress messages for a human at a terminal
pub struct RunProgress {
    spinner: Spinner,
}

impl RunProgress {
    pub fn new() -> Self {
        Self {
            spinner: Spinner::new("Starting"),
        }
    }

    pub fn handle(&self, msg: ProgressMessage) {
        match msg {
            ProgressMessage::PhaseStarted { phase: p, .. } => {
                self.spinner.pb.suspend(|| phase(p));
            }
            ProgressMessage::Executing {
                phase,
                table,
                current,
                total,
            } => {
                self.spinner
                    .set_message(&format!("[{}/{}] {} {}", current, total, phase, table));
            }
            ProgressMessage::Executed { table, elapsed, .. } => {
                self.spinner.println(&format!(
                    "  {} {} {}",
                    Icons::CHECK.style(theme().success.clone()),
                    table,
                    format!("({})", HumanDuration(elapsed)).style(theme().dim.clone())
                ));
            }
            ProgressMessage::Failed { table, error, .. } => {
                self.spinner.println(&format!(
                    "  {} {} {}",
                    Icons::CROSS.style(theme().error.clone()),
                    table,
                    error.style(theme().error.clone())
                ));
                self.spinner.finish_and_clear();
            }
            ProgressMessage::Finished { .. } => {
                self.spinner.finish_and_clear();
            }
        }
    }
}

impl Default for RunProgress {
    fn default() -> Self {
        Self::new()
    }
}
