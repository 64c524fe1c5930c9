use manarg::{ParameterSpec, Parser};
use serde::Serialize;

use crate::schema::LoadedSchema;

#[derive(Debug, Serialize)]
pub struct CheckReport {
    pub schema: String,
    pub prog: String,
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub parameters: Vec<ParameterReport>,
    pub dependencies: Vec<ConstraintReport>,
    pub incompatibilities: Vec<ConstraintReport>,
}

#[derive(Debug, Serialize)]
pub struct ParameterReport {
    pub short: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub long: Option<String>,
    pub dest: String,
    #[serde(rename = "type")]
    pub value_type: String,
    pub action: String,
    pub nargs: String,
    pub default: String,
    pub section: String,
    pub required: bool,
    pub hidden: bool,
}

#[derive(Debug, Serialize)]
pub struct ConstraintReport {
    pub param: String,
    pub targets: Vec<String>,
}

/// Build the parser described by `loaded` and describe what it registered.
///
/// A configuration error produces an invalid report instead of failing.
pub fn check_schema(loaded: &LoadedSchema) -> CheckReport {
    let schema = loaded.path.display().to_string();
    match loaded.schema.build() {
        Ok(parser) => describe(schema, &parser),
        Err(err) => CheckReport {
            schema,
            prog: loaded.prog(),
            valid: false,
            error: Some(err.to_string()),
            parameters: Vec::new(),
            dependencies: Vec::new(),
            incompatibilities: Vec::new(),
        },
    }
}

fn describe(schema: String, parser: &Parser) -> CheckReport {
    let parameters = parser.registry().iter().map(parameter_report).collect();
    let constraints = parser.constraints();
    let dependencies = constraints
        .dependencies()
        .map(|(param, targets)| constraint_report(param, targets.iter().copied()))
        .collect();
    let incompatibilities = constraints
        .incompatibilities()
        .map(|(param, targets)| constraint_report(param, targets.iter().copied()))
        .collect();

    CheckReport {
        schema,
        prog: parser.prog().to_string(),
        valid: true,
        error: None,
        parameters,
        dependencies,
        incompatibilities,
    }
}

fn parameter_report(spec: &ParameterSpec) -> ParameterReport {
    ParameterReport {
        short: spec.short_flag(),
        long: spec.long_flag(),
        dest: spec.dest().to_string(),
        value_type: spec.value_type().to_string(),
        action: spec.action().as_str().to_string(),
        nargs: spec.arity().to_string(),
        default: spec.default_value().to_string(),
        section: spec.section().to_string(),
        required: spec.required(),
        hidden: spec.hidden(),
    }
}

fn constraint_report(param: char, targets: impl Iterator<Item = char>) -> ConstraintReport {
    ConstraintReport {
        param: format!("-{param}"),
        targets: targets.map(|c| format!("-{c}")).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use manarg_schema::ParserSchema;
    use std::path::PathBuf;

    fn loaded(json: &str) -> LoadedSchema {
        LoadedSchema {
            path: PathBuf::from("/tmp/tool.json"),
            schema: ParserSchema::from_json(json).unwrap(),
        }
    }

    #[test]
    fn valid_schema_lists_parameters_and_constraints() {
        let report = check_schema(&loaded(
            r#"{
                "prog": "tool",
                "parameters": [
                    { "short": "-a", "long": "--all", "action": "store_true" },
                    { "short": "-b", "type": "int", "nargs": 2, "required": true },
                    { "short": "-c", "default": "x" }
                ],
                "dependencies": [ { "params": ["-a"], "requires": ["-b"] } ],
                "incompatibilities": [ { "params": ["-a"], "excludes": ["-c"] } ]
            }"#,
        ));

        assert!(report.valid);
        assert!(report.error.is_none());
        assert_eq!(report.prog, "tool");
        let shorts: Vec<&str> = report.parameters.iter().map(|p| p.short.as_str()).collect();
        assert_eq!(shorts, ["-h", "-a", "-b", "-c"]);

        let all = &report.parameters[1];
        assert_eq!(all.long.as_deref(), Some("--all"));
        assert_eq!(all.action, "store_true");
        assert_eq!(all.nargs, "0");
        assert_eq!(all.default, "false");

        let b = &report.parameters[2];
        assert_eq!(b.value_type, "int");
        assert_eq!(b.nargs, "2");
        assert_eq!(b.section, "Required");
        assert_eq!(b.default, "none");

        assert_eq!(report.dependencies[0].param, "-a");
        assert_eq!(report.dependencies[0].targets, ["-b"]);
        assert_eq!(report.incompatibilities[0].targets, ["-c"]);
    }

    #[test]
    fn configuration_error_is_reported() {
        let report = check_schema(&loaded(
            r#"{ "parameters": [ { "short": "-a" }, { "short": "-a" } ] }"#,
        ));
        assert!(!report.valid);
        assert_eq!(report.prog, "tool");
        assert_eq!(report.error.as_deref(), Some("'a' duplicated as short command"));
        assert!(report.parameters.is_empty());
    }
}
