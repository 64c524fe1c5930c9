//! Post-scan validation and default completion.

use tracing::trace;

use crate::constraints::ConstraintGraph;
use crate::error::{ParameterError, ParseResult};
use crate::matches::Matches;
use crate::registry::Registry;
use crate::value::format_list;

/// Run the required, incompatibility and dependency checks in that order,
/// then fill defaults for every dest still absent.
pub(crate) fn finalize(
    registry: &Registry,
    graph: &ConstraintGraph,
    matches: &mut Matches,
) -> ParseResult<()> {
    check_required(registry, matches)?;
    check_incompatible(graph, matches)?;
    check_dependencies(graph, matches)?;
    fill_defaults(registry, matches)
}

fn check_required(registry: &Registry, matches: &Matches) -> ParseResult<()> {
    let missing: Vec<&str> = registry
        .iter()
        .filter(|spec| spec.required() && !matches.contains(spec.dest()))
        .map(|spec| spec.dest())
        .collect();
    if missing.is_empty() {
        return Ok(());
    }
    Err(ParameterError::general(format!(
        "missing required parameters {}",
        format_list(&missing)
    )))
}

fn check_incompatible(graph: &ConstraintGraph, matches: &Matches) -> ParseResult<()> {
    for (param, excluded) in graph.incompatibilities() {
        if !matches.was_resolved(param) {
            continue;
        }
        let conflicts: Vec<String> = excluded
            .iter()
            .filter(|c| matches.was_resolved(**c))
            .map(|c| format!("-{c}"))
            .collect();
        if !conflicts.is_empty() {
            return Err(ParameterError::parameter(
                param.to_string(),
                format!("incompatible parameters {}", format_list(&conflicts)),
            ));
        }
    }
    Ok(())
}

fn check_dependencies(graph: &ConstraintGraph, matches: &Matches) -> ParseResult<()> {
    for (param, required) in graph.dependencies() {
        if !matches.was_resolved(param) {
            continue;
        }
        let missing: Vec<String> = required
            .iter()
            .filter(|c| !matches.was_resolved(**c))
            .map(|c| format!("-{c}"))
            .collect();
        if !missing.is_empty() {
            return Err(ParameterError::parameter(
                param.to_string(),
                format!("missing required parameters {}", format_list(&missing)),
            ));
        }
    }
    Ok(())
}

fn fill_defaults(registry: &Registry, matches: &mut Matches) -> ParseResult<()> {
    for spec in registry {
        if matches.contains(spec.dest()) {
            continue;
        }
        if let Some(value) = spec.default_entry()? {
            trace!(dest = spec.dest(), value = %value, "filled default");
            matches.push_default(spec.dest(), value);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constraints::Relation;
    use crate::spec::{Action, DefaultValue, Options};
    use crate::value::{ParsedValue, Value, ValueType};

    fn registry() -> Registry {
        let mut registry = Registry::default();
        for short in ["-a", "-b", "-c"] {
            registry
                .register(
                    short,
                    None,
                    Options {
                        action: Action::StoreTrue,
                        ..Default::default()
                    },
                )
                .unwrap();
        }
        registry
            .register(
                "-n",
                Some("--count"),
                Options {
                    value_type: ValueType::Int,
                    default: DefaultValue::Value("3".to_string()),
                    ..Default::default()
                },
            )
            .unwrap();
        registry
            .register(
                "-q",
                None,
                Options {
                    default: DefaultValue::Suppressed,
                    ..Default::default()
                },
            )
            .unwrap();
        registry
    }

    fn resolved(shorts: &[char]) -> Matches {
        let mut m = Matches::default();
        for c in shorts {
            m.push_resolved(*c);
            m.push_explicit(&c.to_string(), ParsedValue::Scalar(Value::Bool(true)));
        }
        m
    }

    #[test]
    fn required_parameters_are_aggregated() {
        let mut registry = Registry::default();
        for (short, long) in [("-i", "--input"), ("-o", "--output")] {
            registry
                .register(
                    short,
                    Some(long),
                    Options {
                        required: true,
                        ..Default::default()
                    },
                )
                .unwrap();
        }
        let mut m = Matches::default();
        let err = finalize(&registry, &ConstraintGraph::default(), &mut m).unwrap_err();
        assert_eq!(err.to_string(), "missing required parameters [input, output]");
    }

    #[test]
    fn incompatibility_checked_before_dependency() {
        let registry = registry();
        let mut graph = ConstraintGraph::default();
        graph.declare(&registry, Relation::Requires, ["-a"], ["-c"]).unwrap();
        graph.declare(&registry, Relation::Excludes, ["-a"], ["-b"]).unwrap();

        let err = finalize(&registry, &graph, &mut resolved(&['a', 'b'])).unwrap_err();
        assert_eq!(err.to_string(), "parameter a: incompatible parameters [-b]");

        let err = finalize(&registry, &graph, &mut resolved(&['a'])).unwrap_err();
        assert_eq!(err.to_string(), "parameter a: missing required parameters [-c]");

        finalize(&registry, &graph, &mut resolved(&['a', 'c'])).unwrap();
        finalize(&registry, &graph, &mut resolved(&['b'])).unwrap();
    }

    #[test]
    fn defaults_fill_absent_dests_only() {
        let registry = registry();
        let mut m = resolved(&['a']);
        finalize(&registry, &ConstraintGraph::default(), &mut m).unwrap();

        assert!(m.is_explicit("a"));
        assert_eq!(m.get_bool("b"), Some(false));
        assert!(m.is_defaulted("b"));
        assert_eq!(m.get_int("count"), Some(3));
        assert!(!m.contains("q"));
    }
}
