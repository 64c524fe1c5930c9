//! Declarative command-line parameter parsing with man-style help.
//!
//! Parameters are registered up front with a short flag, an optional long
//! flag, a value type and an arity. Parsing scans the tokens once:
//! - short flags may be bundled (`-abc` is `-a -b -c`)
//! - each parameter consumes the values its arity asks for
//! - values are coerced and checked against choices as they are consumed
//! - required, incompatible and dependent parameters are checked after the scan
//! - defaults fill whatever the command line left out
//!
//! ```
//! use manarg::{Arity, Options, ParseOutcome, Parser, ParserSettings, ValueType};
//!
//! let mut parser = Parser::new(ParserSettings {
//!     prog: Some("sum".to_string()),
//!     ..Default::default()
//! });
//! parser
//!     .add_parameter(
//!         "-i",
//!         Some("--integers"),
//!         Options {
//!             value_type: ValueType::Int,
//!             arity: Some(Arity::OneOrMore),
//!             help: Some("integers to be summed".to_string()),
//!             ..Default::default()
//!         },
//!     )
//!     .unwrap();
//!
//! let ParseOutcome::Matches(m) = parser.parse(&["-i", "1", "2", "3"]).unwrap() else {
//!     panic!("expected matches");
//! };
//! assert_eq!(m.get_ints("integers"), Some(vec![1, 2, 3]));
//! ```

pub mod constraints;
mod consumer;
pub mod error;
mod finalize;
pub mod help;
pub mod matcher;
pub mod matches;
pub mod parser;
pub mod registry;
pub mod spec;
pub mod value;

pub use consumer::is_candidate_value;
pub use constraints::{ConstraintGraph, Relation};
pub use error::{EXIT_ERROR, ParameterError, ParseResult};
pub use matches::{Matches, Origin};
pub use parser::{ParseOutcome, Parser, ParserSettings};
pub use registry::Registry;
pub use spec::{Action, Arity, DefaultValue, Options, ParameterSpec};
pub use value::{FileMode, FileValue, ParsedValue, Value, ValueType};
