//! The parser front end: setup, scanning and process-level behaviour.

use std::fmt;
use std::io::Write;
use std::path::Path;

use tracing::{debug, trace};

use crate::consumer::{self, Step};
use crate::constraints::{ConstraintGraph, Relation};
use crate::error::{EXIT_ERROR, ParseResult};
use crate::finalize::finalize;
use crate::help::{render_help, render_version};
use crate::matcher;
use crate::matches::Matches;
use crate::registry::Registry;
use crate::spec::{Action, Options, ParameterSpec};

/// Program-level settings, mostly used for help rendering.
#[derive(Debug, Clone)]
pub struct ParserSettings {
    /// Program name; defaults to the file name of the running executable.
    pub prog: Option<String>,
    pub short_description: Option<String>,
    pub description: Option<String>,
    /// Where to report bugs (shown in help).
    pub bugs: Option<String>,
    pub epilog: Option<String>,
    /// Register `-h/--help`.
    pub add_help: bool,
    /// Register `-V/--version` printing this string.
    pub version: Option<String>,
}

impl Default for ParserSettings {
    fn default() -> Self {
        Self {
            prog: None,
            short_description: None,
            description: None,
            bugs: None,
            epilog: None,
            add_help: true,
            version: None,
        }
    }
}

#[derive(Debug, Clone)]
pub enum ParseOutcome {
    Matches(Matches),
    Help(String),
    Version(String),
}

/// A parameter registry plus its constraints.
///
/// Setup (`add_parameter`, `dependency_params`, `incompatible_params`) must be
/// finished before parsing; every `parse` call works on a fresh result set.
#[derive(Debug, Clone)]
pub struct Parser {
    prog: String,
    settings: ParserSettings,
    registry: Registry,
    constraints: ConstraintGraph,
}

impl Parser {
    pub fn new(settings: ParserSettings) -> Self {
        let prog = settings.prog.clone().unwrap_or_else(default_prog);
        let mut registry = Registry::default();
        if settings.add_help {
            registry.insert(ParameterSpec::builtin(
                'h',
                "help",
                Action::Help,
                "Show this help and exit",
            ));
        }
        if settings.version.is_some() {
            registry.insert(ParameterSpec::builtin(
                'V',
                "version",
                Action::Version,
                "Show the version and exit",
            ));
        }
        Self {
            prog,
            settings,
            registry,
            constraints: ConstraintGraph::default(),
        }
    }

    pub fn prog(&self) -> &str {
        &self.prog
    }

    pub fn settings(&self) -> &ParserSettings {
        &self.settings
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn constraints(&self) -> &ConstraintGraph {
        &self.constraints
    }

    /// Register a parameter, e.g. `add_parameter("-i", Some("--integers"), options)`.
    pub fn add_parameter(
        &mut self,
        short: &str,
        long: Option<&str>,
        options: Options,
    ) -> ParseResult<&ParameterSpec> {
        self.registry.register(short, long, options)
    }

    /// Every parameter in `params` requires all of `requires`.
    pub fn dependency_params<P, R>(&mut self, params: P, requires: R) -> ParseResult<()>
    where
        P: IntoIterator,
        P::Item: AsRef<str>,
        R: IntoIterator,
        R::Item: AsRef<str>,
    {
        self.constraints
            .declare(&self.registry, Relation::Requires, params, requires)
    }

    /// No parameter in `params` may be used together with any of `excludes`.
    pub fn incompatible_params<P, E>(&mut self, params: P, excludes: E) -> ParseResult<()>
    where
        P: IntoIterator,
        P::Item: AsRef<str>,
        E: IntoIterator,
        E::Item: AsRef<str>,
    {
        self.constraints
            .declare(&self.registry, Relation::Excludes, params, excludes)
    }

    /// Parse `tokens` (without the program name).
    ///
    /// The scan is linear: each flag token is resolved, its parameters consume
    /// the values that follow, and the first error aborts. `-h`/`-V` stop the
    /// scan and return the rendered text instead of matches.
    pub fn parse<S: AsRef<str>>(&self, tokens: &[S]) -> ParseResult<ParseOutcome> {
        debug!(prog = %self.prog, tokens = tokens.len(), "parsing parameters");
        let mut matches = Matches::default();

        let mut index = 0;
        while index < tokens.len() {
            let token = tokens[index].as_ref();
            let mut cursor = index;
            for spec in matcher::resolve(&self.registry, token)? {
                trace!(token, param = %spec.short_flag(), "resolved flag");
                matches.push_resolved(spec.short());
                match consumer::consume(spec, tokens, cursor, &mut matches)? {
                    Step::Consumed(n) => cursor += n - 1,
                    Step::Help => return Ok(ParseOutcome::Help(self.help())),
                    Step::Version => return Ok(ParseOutcome::Version(self.version())),
                }
            }
            index = cursor + 1;
        }

        finalize(&self.registry, &self.constraints, &mut matches)?;
        debug!(values = matches.len(), "parse finished");
        Ok(ParseOutcome::Matches(matches))
    }

    /// Parse `tokens`, printing help/version and exiting with status 0, or
    /// printing the error and exiting with status 2.
    pub fn parse_or_exit<S: AsRef<str>>(&self, tokens: &[S]) -> Matches {
        match self.parse(tokens) {
            Ok(ParseOutcome::Matches(m)) => m,
            Ok(ParseOutcome::Help(text)) | Ok(ParseOutcome::Version(text)) => {
                match write_text(&mut std::io::stdout().lock(), &text) {
                    Ok(()) => std::process::exit(0),
                    Err(err) => {
                        debug!(error = %err, "failed to write to stdout");
                        std::process::exit(1);
                    }
                }
            }
            Err(err) => self.exit_with_error(err),
        }
    }

    /// Parse the arguments of the current process.
    pub fn parse_env(&self) -> Matches {
        let tokens: Vec<String> = std::env::args().skip(1).collect();
        self.parse_or_exit(&tokens)
    }

    /// Unwrap a setup result, exiting with status 2 on error.
    pub fn or_exit<T>(&self, result: ParseResult<T>) -> T {
        result.unwrap_or_else(|err| self.exit_with_error(err))
    }

    pub fn help(&self) -> String {
        render_help(&self.prog, &self.settings, &self.registry)
    }

    pub fn version(&self) -> String {
        render_version(&self.prog, self.settings.version.as_deref())
    }

    /// `"<prog>: error: <message>"`
    pub fn format_error(&self, message: impl fmt::Display) -> String {
        format!("{}: error: {message}", self.prog)
    }

    /// Report a caller-detected error the same way parse errors are reported.
    pub fn exit_with_error(&self, message: impl fmt::Display) -> ! {
        eprintln!("{}", self.format_error(message));
        std::process::exit(EXIT_ERROR);
    }
}

impl Default for Parser {
    fn default() -> Self {
        Self::new(ParserSettings::default())
    }
}

/// Write help or version text followed by a newline, and flush.
fn write_text(out: &mut impl Write, text: &str) -> std::io::Result<()> {
    writeln!(out, "{text}")?;
    out.flush()
}

fn default_prog() -> String {
    std::env::args()
        .next()
        .as_deref()
        .and_then(|arg0| Path::new(arg0).file_name())
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| env!("CARGO_PKG_NAME").to_string())
}
