use is_terminal::IsTerminal;
use owo_colors::OwoColorize;

use crate::cli::MigrationCommand;

/// Minimum Jaro-Winkler score for an unknown argument to earn a suggestion.
const SUGGESTION_THRESHOLD: f64 = 0.8;

/// Print the command listing for a missing or unrecognized argument.
pub fn run(unknown: Option<&str>) {
    let use_color = std::io::stdout().is_terminal();
    print!("{}", render(unknown, use_color));
}

/// Render the listing. `unknown` is the argument that failed to match, if any.
pub fn render(unknown: Option<&str>, use_color: bool) -> String {
    let mut out = String::new();

    if let Some(arg) = unknown {
        out.push_str(&format!("Unknown command '{}'", arg));
        if let Some(candidate) = closest_command(arg) {
            out.push_str(&format!(" (did you mean '{}'?)", candidate));
        }
        out.push_str("\n\n");
    }

    let names: Vec<&str> = MigrationCommand::ALL.iter().map(|c| c.name()).collect();
    out.push_str(&format!("Available commands: {}:\n\n", names.join(", ")));

    let entries: Vec<String> = MigrationCommand::ALL
        .iter()
        .map(|cmd| {
            let name = if use_color {
                cmd.name().bold().to_string()
            } else {
                cmd.name().to_string()
            };
            format!("    {}:\n        {}", name, cmd.description())
        })
        .collect();
    out.push_str(&entries.join("\n\n"));
    out.push('\n');
    out
}

fn closest_command(arg: &str) -> Option<&'static str> {
    let mut best: Option<(&'static str, f64)> = None;
    for cmd in MigrationCommand::ALL {
        let score = strsim::jaro_winkler(arg, cmd.name());
        if score >= SUGGESTION_THRESHOLD && best.is_none_or(|(_, s)| score > s) {
            best = Some((cmd.name(), score));
        }
    }
    best.map(|(name, _)| name)
}
