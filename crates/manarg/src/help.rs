//! Man-page style help and version text.

use std::collections::BTreeSet;

use crate::parser::ParserSettings;
use crate::registry::Registry;
use crate::spec::{Action, Arity, DEFAULT_SECTION, ParameterSpec};
use crate::value::format_list;

const TAB: &str = "       ";
const PARAM_INDENT: &str = "   ";

/// Render the help page.
///
/// Parameters are listed by short name; `-V`/`-h` go to an `Info` block and
/// the remaining ones are grouped by section, `Others` first.
pub fn render_help(prog: &str, settings: &ParserSettings, registry: &Registry) -> String {
    let mut params: Vec<&ParameterSpec> = registry.iter().filter(|p| !p.hidden()).collect();
    params.sort_by_key(|p| p.short());

    let mut sections: Vec<String> = Vec::new();

    let mut name = format!("NAME\n{TAB}{prog}");
    if let Some(short) = settings.short_description.as_deref() {
        name.push_str(" - ");
        name.push_str(short);
    }
    name.push('\n');
    sections.push(name);

    let mut description = String::from("DESCRIPTION\n");
    if let Some(text) = settings.description.as_deref() {
        description.push_str(&indent(TAB, text));
        description.push('\n');
    }
    description.push_str(&info_block(&params));
    description.push_str(&section_blocks(&params));
    sections.push(description);

    if let Some(bugs) = settings.bugs.as_deref() {
        sections.push(format!("REPORTING BUGS\n{TAB}Report bugs to {bugs}\n"));
    }
    if let Some(epilog) = settings.epilog.as_deref() {
        sections.push(epilog.to_string());
    }

    format!("\n{}\n", sections.join("\n"))
}

/// `"<prog> <version>"`, or just the program name without a version.
pub fn render_version(prog: &str, version: Option<&str>) -> String {
    match version.map(str::trim).filter(|v| !v.is_empty()) {
        Some(version) => format!("{prog} {version}"),
        None => prog.to_string(),
    }
}

fn info_block(params: &[&ParameterSpec]) -> String {
    let version = params.iter().find(|p| p.action() == Action::Version);
    let help = params.iter().find(|p| p.action() == Action::Help);
    if version.is_none() && help.is_none() {
        return String::new();
    }

    let entries: Vec<String> = version
        .into_iter()
        .chain(help)
        .map(|p| format!("{}\n{}\n", param_tab(&flags(p)), help_text(p)))
        .collect();
    format!("\n{TAB}Info:\n{}", entries.join("\n"))
}

fn section_blocks(params: &[&ParameterSpec]) -> String {
    let listed: Vec<&ParameterSpec> = params
        .iter()
        .copied()
        .filter(|p| !matches!(p.action(), Action::Help | Action::Version))
        .collect();

    let mut names: Vec<&str> = listed
        .iter()
        .map(|p| p.section())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    if let Some(pos) = names.iter().position(|s| *s == DEFAULT_SECTION) {
        let others = names.remove(pos);
        names.insert(0, others);
    }

    let mut out = String::new();
    for section in names {
        out.push_str(&format!("\n{TAB}{section}:"));
        for p in listed.iter().filter(|p| p.section() == section) {
            out.push('\n');
            out.push_str(&param_tab(&format!("{}{}", flags(p), value_hint(p))));
            out.push('\n');
            out.push_str(&help_text(p));
            out.push('\n');
        }
    }
    out
}

fn flags(p: &ParameterSpec) -> String {
    match p.long_flag() {
        Some(long) => format!("{}, {long}", p.short_flag()),
        None => p.short_flag(),
    }
}

fn value_hint(p: &ParameterSpec) -> String {
    let dest = p.dest().to_ascii_uppercase();
    let choices = p.choices().map(|c| format!("choices: {}", format_list(c)));
    match p.arity() {
        Arity::Optional => {
            let mut details = choices.map(|c| format!("{c}, ")).unwrap_or_default();
            details.push_str(&format!("default: {}", p.default_value()));
            if let Some(c) = p.const_value() {
                details.push_str(&format!(", const: {c}"));
            }
            format!(" [{dest}] ({details})")
        }
        Arity::OneOrMore => format!(" <{dest}> [{dest} ...]{}", parenthesized(choices)),
        Arity::ZeroOrMore => format!(" [{dest} ...]{}", parenthesized(choices)),
        Arity::Exactly(0) => String::new(),
        Arity::Exactly(1) => format!(" <{dest}>{}", parenthesized(choices)),
        Arity::Exactly(n) => {
            let choices = choices.map(|c| format!(", {c}")).unwrap_or_default();
            format!(" <{dest} ...> (num: {n}{choices})")
        }
    }
}

fn parenthesized(text: Option<String>) -> String {
    text.map(|t| format!(" ({t})")).unwrap_or_default()
}

fn param_tab(line: &str) -> String {
    format!("{TAB}{PARAM_INDENT}{line}")
}

fn help_text(p: &ParameterSpec) -> String {
    indent(&format!("{TAB}{PARAM_INDENT}{PARAM_INDENT}"), p.help())
}

fn indent(prefix: &str, text: &str) -> String {
    text.lines()
        .map(|line| format!("{prefix}{line}"))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spec::{DefaultValue, Options};
    use crate::value::ValueType;

    fn registry() -> Registry {
        let mut registry = Registry::default();
        registry.insert(ParameterSpec::builtin('h', "help", Action::Help, "Show this help and exit"));
        registry
            .register(
                "-o",
                Some("--opt"),
                Options {
                    value_type: ValueType::Int,
                    arity: Some(Arity::Optional),
                    default: DefaultValue::Value("10".to_string()),
                    const_value: Some("1".to_string()),
                    help: Some("An optional\nvalue".to_string()),
                    ..Default::default()
                },
            )
            .unwrap();
        registry
            .register(
                "-i",
                Some("--integers"),
                Options {
                    value_type: ValueType::Int,
                    arity: Some(Arity::OneOrMore),
                    required: true,
                    help: Some("Integers to sum".to_string()),
                    ..Default::default()
                },
            )
            .unwrap();
        registry
            .register(
                "-m",
                None,
                Options {
                    choices: Some(vec!["fast".to_string(), "slow".to_string()]),
                    section: Some("Mode".to_string()),
                    ..Default::default()
                },
            )
            .unwrap();
        registry
            .register(
                "-s",
                Some("--secret"),
                Options {
                    hidden: true,
                    ..Default::default()
                },
            )
            .unwrap();
        registry
    }

    #[test]
    fn renders_man_sections() {
        let settings = ParserSettings {
            short_description: Some("sum integers".to_string()),
            description: Some("Adds numbers.\nPrints the sum.".to_string()),
            bugs: Some("bugs@example.org".to_string()),
            epilog: Some("That is all.".to_string()),
            ..Default::default()
        };
        let text = render_help("sum", &settings, &registry());

        assert!(text.starts_with("\nNAME\n       sum - sum integers\n"));
        assert!(text.contains("DESCRIPTION\n       Adds numbers.\n       Prints the sum.\n"));
        assert!(text.contains("       Info:\n          -h, --help\n             Show this help and exit\n"));
        assert!(text.contains("REPORTING BUGS\n       Report bugs to bugs@example.org\n"));
        assert!(text.trim_end().ends_with("That is all."));
        assert!(!text.contains("--secret"));
    }

    #[test]
    fn sections_put_others_first_and_sort_the_rest() {
        let text = render_help("sum", &ParserSettings::default(), &registry());
        let others = text.find("Others:").unwrap();
        let mode = text.find("Mode:").unwrap();
        let required = text.find("Required:").unwrap();
        assert!(others < mode && mode < required);
    }

    #[test]
    fn value_hints_follow_arity() {
        let text = render_help("sum", &ParserSettings::default(), &registry());
        assert!(text.contains("-o, --opt [OPT] (default: 10, const: 1)"));
        assert!(text.contains("             An optional\n             value"));
        assert!(text.contains("-i, --integers <INTEGERS> [INTEGERS ...]"));
        assert!(text.contains("-m <M> (choices: [fast, slow])"));
    }

    #[test]
    fn version_line() {
        assert_eq!(render_version("sum", Some("1.2.0")), "sum 1.2.0");
        assert_eq!(render_version("sum", None), "sum");
    }
}
