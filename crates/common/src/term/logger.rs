use std::fmt::Display;

use cliclack::{intro as cliclack_intro, log, outro as cliclack_outro, Theme, ThemeState};
use console::{style, Emoji, Term};
use serde::Serialize;

use crate::prompt::CliclackTheme;

const S_BAR: Emoji = Emoji("│", "|");

fn term_write(msg: impl Display) {
    let msg = &format!("{}", msg);
    Term::stderr().write_str(msg).unwrap();
}

pub fn intro() {
    cliclack_intro(style(" EVVM Scaffold ").on_cyan().black()).unwrap();
}

pub fn outro(msg: impl Display) {
    cliclack_outro(msg).unwrap();
}

pub fn info(msg: impl Display) {
    log::info(msg).unwrap();
}

pub fn debug(msg: impl Display) {
    let msg = &format!("{}", msg);
    let log = CliclackTheme.format_log(msg, style("⚙").dim().to_string().as_str());
    term_write(log);
}

pub fn warn(msg: impl Display) {
    log::warning(msg).unwrap();
}

pub fn error(msg: impl Display) {
    log::error(style(msg).red()).unwrap();
}

pub fn success(msg: impl Display) {
    log::success(msg).unwrap();
}

pub fn step(msg: impl Display) {
    log::step(msg).unwrap();
}

pub fn raw(msg: impl Display) {
    term_write(msg);
}

pub fn note(msg: impl Display, content: impl Display) {
    cliclack::note(msg, content).unwrap();
}

pub fn error_note(msg: &str, content: &str) {
    let symbol = CliclackTheme.state_symbol(&ThemeState::Submit);
    let note = CliclackTheme
        .format_note(msg, content)
        .replace(&symbol, &CliclackTheme.error_symbol());
    term_write(note);
}

pub fn object_to_string(obj: impl Serialize) -> String {
    let json = serde_json::to_value(obj).unwrap_or_default();

    fn print_object(key: &str, value: &str, indentation: usize) -> String {
        format!(
            "{:indent$}∙ {} {}\n",
            "",
            style(format!("{key}:")).bold(),
            style(value),
            indent = indentation
        )
    }

    fn print_header(header: &str, indentation: usize) -> String {
        format!(
            "{:indent$}∙ {}\n",
            "",
            style(format!("{header}:")).bold(),
            indent = indentation
        )
    }

    fn traverse_json(json: &serde_json::Value, indent: usize) -> String {
        let mut values = String::new();

        if let serde_json::Value::Object(obj) = json {
            for (key, value) in obj {
                match value {
                    serde_json::Value::Object(_) => {
                        values.push_str(&print_header(key, indent));
                        values.push_str(&traverse_json(value, indent + 2));
                    }
                    serde_json::Value::String(s) => {
                        values.push_str(&print_object(key, s, indent))
                    }
                    _ => values.push_str(&print_object(key, &value.to_string(), indent)),
                }
            }
        }

        values
    }

    traverse_json(&json, 2)
}

pub fn new_empty_line() {
    term_write("\n");
}

pub fn new_line() {
    term_write(format!(
        "{}\n",
        CliclackTheme.bar_color(&ThemeState::Submit).apply_to(S_BAR)
    ))
}

#[cfg(test)]
mod tests {
    use serde::Serialize;

    #[derive(Serialize)]
    struct Nested {
        chain_id: u64,
    }

    #[derive(Serialize)]
    struct Summary {
        evvm: String,
        network: Nested,
    }

    #[test]
    fn object_to_string_lists_nested_keys() {
        console::set_colors_enabled(false);
        let out = super::object_to_string(Summary {
            evvm: "0xabc".into(),
            network: Nested { chain_id: 31337 },
        });
        assert!(out.contains("∙ evvm: 0xabc"));
        assert!(out.contains("∙ network:"));
        assert!(out.contains("    ∙ chain_id: 31337"));
    }
}
