use crate::queries::Phase;
use crate::ui::{phase_icon, theme, Icons};
use owo_colors::OwoColorize;

pub fn header(text: &str) {
    println!("{} {}", Icons::ROCKET, text.style(theme().header.clone()));
}

pub fn success(label: &str) {
    println!("{} {}", Icons::CHECK, label.style(theme().success.clone()));
}

pub fn warn(label: &str) {
    eprintln!("{} {}", Icons::WARN, label.style(theme().warn.clone()));
}

pub fn info(label: &str, value: &str) {
    println!(
        "{} {}: {}",
        Icons::INFO.style(theme().info.clone()),
        label.style(theme().dim.clone()),
        value
    );
}

pub fn section(title: &str) {
    println!();
    println!("━{}━", title.style(theme().header.clone()));
}

pub fn phase(phase: Phase) {
    println!();
    println!(
        "{} {}",
        phase_icon(phase),
        phase.as_str().to_uppercase().style(theme().header.clone())
    );
}

/// Print a statement with a `-- label` comment above it
pub fn sql_block(label: &str, sql: &str) {
    println!("{}", format!("-- {}", label).style(theme().dim.clone()));
    println!("{}", sql.trim().style(theme().sql.clone()));
    println!();
}

pub fn summary_row(label: &str, value: &str) {
    println!("  {} {}", label.style(theme().dim.clone()), value);
}
