use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use std::time::{SystemTime, UNIX_EPOCH};

const SUM_SCHEMA: &str = r#"{
  "prog": "sum",
  "short-description": "sum the integers at the command line",
  "version": "1.0",
  "bugs": "bugs@example.org",
  "parameters": [
    { "short": "-i", "long": "--integers", "type": "int", "nargs": "+",
      "required": true, "help": "list of integers to be summed" },
    { "short": "-o", "long": "--offset", "type": "int", "nargs": "?",
      "default": 10, "const": 1 },
    { "short": "-a", "action": "store_true" },
    { "short": "-b", "action": "store_true" },
    { "short": "-c", "action": "store_true" },
    { "short": "-s", "long": "--secret", "hidden": true, "suppress-default": true }
  ],
  "dependencies": [ { "params": ["-a"], "requires": ["-b"] } ],
  "incompatibilities": [ { "params": ["-b"], "excludes": ["-c"] } ]
}"#;

fn make_temp_dir(prefix: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system clock is before UNIX_EPOCH")
        .as_nanos();
    let pid = std::process::id();
    let dir = std::env::temp_dir().join(format!("manarg-integ-{prefix}-{pid}-{nanos}"));
    fs::create_dir_all(&dir).expect("failed to create temp dir");
    dir
}

fn write_schema(dir: &Path, contents: &str) -> PathBuf {
    let path = dir.join("schema.json");
    fs::write(&path, contents).expect("failed to write schema");
    path
}

fn manarg() -> Command {
    Command::new(env!("CARGO_BIN_EXE_manarg"))
}

fn run_parse(schema: &Path, tokens: &[&str]) -> Output {
    manarg()
        .arg("parse")
        .arg("--compact")
        .arg("--schema")
        .arg(schema)
        .arg("--")
        .args(tokens)
        .output()
        .expect("failed to run manarg parse")
}

fn stdout_json(out: &Output) -> serde_json::Value {
    assert!(
        out.status.success(),
        "manarg failed:\nstatus: {}\nstderr:\n{}",
        out.status,
        String::from_utf8_lossy(&out.stderr),
    );
    serde_json::from_slice(&out.stdout).expect("stdout is not JSON")
}

#[test]
fn help_works() {
    let out = manarg()
        .arg("--help")
        .output()
        .expect("failed to run manarg --help");
    assert!(out.status.success());
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(
        stdout.contains("parse") && stdout.contains("check"),
        "unexpected help output:\n{stdout}"
    );
}

#[test]
fn parse_prints_matches_with_defaults() {
    let dir = make_temp_dir("parse-ok");
    let schema = write_schema(&dir, SUM_SCHEMA);

    let json = stdout_json(&run_parse(&schema, &["-i", "1", "2", "3"]));
    assert_eq!(json["integers"], serde_json::json!([1, 2, 3]));
    assert_eq!(json["offset"], 10);
    assert_eq!(json["a"], false);
    assert!(json.get("secret").is_none());
    assert!(json.get("help").is_none());

    let json = stdout_json(&run_parse(&schema, &["-abi", "-5", "-o"]));
    assert_eq!(json["a"], true);
    assert_eq!(json["b"], true);
    assert_eq!(json["integers"], serde_json::json!([-5]));
    assert_eq!(json["offset"], 1);

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn parse_errors_exit_with_status_two() {
    let dir = make_temp_dir("parse-errors");
    let schema = write_schema(&dir, SUM_SCHEMA);

    let cases: &[(&[&str], &str)] = &[
        (&[], "sum: error: missing required parameters [integers]"),
        (&["-i", "1", "-x"], "sum: error: '-x' not a valid parameter"),
        (&["-i", "1", "-a"], "sum: error: parameter a: missing required parameters [-b]"),
        (&["-i", "1", "-bc"], "sum: error: parameter b: incompatible parameters [-c]"),
        (&["-i", "one"], "sum: error: parameter i: 'one' is not int"),
    ];
    for (tokens, expected) in cases {
        let out = run_parse(&schema, tokens);
        assert_eq!(out.status.code(), Some(2), "tokens: {tokens:?}");
        let stderr = String::from_utf8_lossy(&out.stderr);
        assert!(
            stderr.contains(expected),
            "tokens {tokens:?}: expected {expected:?} in stderr:\n{stderr}"
        );
        assert!(out.stdout.is_empty());
    }

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn parse_help_and_version_exit_zero() {
    let dir = make_temp_dir("parse-info");
    let schema = write_schema(&dir, SUM_SCHEMA);

    let out = run_parse(&schema, &["-h"]);
    assert!(out.status.success());
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("NAME\n       sum - sum the integers at the command line"));
    assert!(stdout.contains("-i, --integers <INTEGERS> [INTEGERS ...]"));
    assert!(stdout.contains("Report bugs to bugs@example.org"));
    assert!(!stdout.contains("--secret"));

    let out = run_parse(&schema, &["-V"]);
    assert!(out.status.success());
    assert_eq!(String::from_utf8_lossy(&out.stdout).trim(), "sum 1.0");

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn help_subcommand_renders_schema_help() {
    let dir = make_temp_dir("help");
    let schema = write_schema(&dir, SUM_SCHEMA);

    let out = manarg()
        .arg("help")
        .arg("--schema")
        .arg(&schema)
        .output()
        .expect("failed to run manarg help");
    assert!(out.status.success());
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("DESCRIPTION"));
    assert!(stdout.contains("Required:"));

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn check_reports_registry_as_json() {
    let dir = make_temp_dir("check");
    let schema = write_schema(&dir, SUM_SCHEMA);

    let out = manarg()
        .arg("check")
        .arg("--json")
        .arg("--schema")
        .arg(&schema)
        .output()
        .expect("failed to run manarg check");
    let report = stdout_json(&out);
    assert_eq!(report["valid"], true);
    assert_eq!(report["prog"], "sum");
    let shorts: Vec<&str> = report["parameters"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["short"].as_str().unwrap())
        .collect();
    assert_eq!(shorts, ["-h", "-V", "-i", "-o", "-a", "-b", "-c", "-s"]);
    assert_eq!(report["dependencies"][0]["targets"], serde_json::json!(["-b"]));

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn check_reports_configuration_errors() {
    let dir = make_temp_dir("check-invalid");
    let schema = write_schema(
        &dir,
        r#"{ "prog": "bad", "parameters": [
            { "short": "-n", "type": "int", "default": "ten" }
        ] }"#,
    );

    let out = manarg()
        .arg("check")
        .arg("--json")
        .arg("--schema")
        .arg(&schema)
        .output()
        .expect("failed to run manarg check");
    assert_eq!(out.status.code(), Some(2));
    let report: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(report["valid"], false);
    assert!(
        report["error"].as_str().unwrap().contains("default value 'ten' is not int"),
        "unexpected report: {report}"
    );

    let out = run_parse(&schema, &[]);
    assert_eq!(out.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&out.stderr).starts_with("bad: error: "));

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn missing_schema_fails() {
    let dir = make_temp_dir("missing");
    let out = manarg()
        .arg("help")
        .arg("--schema")
        .arg(dir.join("absent.json"))
        .output()
        .expect("failed to run manarg help");
    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("schema not found"));

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn inspecting_a_schema_leaves_default_files_alone() {
    let dir = make_temp_dir("keep-default");
    let log = dir.join("out.log");
    fs::write(&log, "precious data").expect("failed to write log");
    let schema = write_schema(
        &dir,
        &format!(
            r#"{{ "prog": "logger", "parameters": [
                {{ "short": "-o", "type": "file", "mode": "w", "default": {} }}
            ] }}"#,
            serde_json::to_string(log.to_str().unwrap()).unwrap()
        ),
    );

    for command in ["check", "help"] {
        let out = manarg()
            .arg(command)
            .arg("--schema")
            .arg(&schema)
            .output()
            .expect("failed to run manarg");
        assert!(out.status.success(), "manarg {command} failed");
        assert_eq!(
            fs::read_to_string(&log).unwrap(),
            "precious data",
            "manarg {command} modified the default file"
        );
    }

    let other = dir.join("other.log");
    let json = stdout_json(&run_parse(&schema, &["-o", other.to_str().unwrap()]));
    assert_eq!(json["o"], other.to_str().unwrap());
    assert_eq!(fs::read_to_string(&log).unwrap(), "precious data");

    let _ = fs::remove_dir_all(&dir);
}
