//! Dependency and incompatibility constraints between parameters.
//!
//! Both graphs are keyed by short name. A pair of parameters may appear in
//! at most one of them, in either direction.

use indexmap::{IndexMap, IndexSet};
use tracing::debug;

use crate::error::{ParameterError, ParseResult};
use crate::registry::Registry;

/// Which graph a declaration goes into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relation {
    Requires,
    Excludes,
}

impl Relation {
    fn method(self) -> &'static str {
        match self {
            Self::Requires => "dependency_params",
            Self::Excludes => "incompatible_params",
        }
    }

    fn opposite(self) -> Self {
        match self {
            Self::Requires => Self::Excludes,
            Self::Excludes => Self::Requires,
        }
    }
}

type Adjacency = IndexMap<char, IndexSet<char>>;

#[derive(Debug, Clone, Default)]
pub struct ConstraintGraph {
    requires: Adjacency,
    excludes: Adjacency,
}

impl ConstraintGraph {
    /// Declare that every parameter in `params` requires (or excludes) every
    /// parameter in `targets`.
    ///
    /// Identifiers are `-x` or `--name` flags. The declaration is validated as
    /// a whole before anything is inserted.
    pub fn declare<P, T>(
        &mut self,
        registry: &Registry,
        relation: Relation,
        params: P,
        targets: T,
    ) -> ParseResult<()>
    where
        P: IntoIterator,
        P::Item: AsRef<str>,
        T: IntoIterator,
        T::Item: AsRef<str>,
    {
        let method = relation.method();
        let resolve = |id: &str| {
            registry
                .by_flag(id)
                .map(|spec| spec.short())
                .ok_or_else(|| ParameterError::general(format!("{method}: '{id}' not exists")))
        };

        let targets: IndexSet<char> = targets
            .into_iter()
            .map(|id| resolve(id.as_ref()))
            .collect::<ParseResult<_>>()?;
        let params: Vec<(String, char)> = params
            .into_iter()
            .map(|id| {
                let id = id.as_ref();
                resolve(id).map(|c| (id.to_string(), c))
            })
            .collect::<ParseResult<_>>()?;

        if params.is_empty() || targets.is_empty() {
            return Err(ParameterError::general(format!(
                "{method}: it needs two parameters at least"
            )));
        }

        let opposite = self.graph(relation.opposite());
        for (id, param) in &params {
            if targets.contains(param) {
                return Err(ParameterError::general(format!(
                    "{method}: '{id}' cannot be a restriction to itself"
                )));
            }
            if let Some(target) = targets.iter().find(|t| has_pair(opposite, *param, **t)) {
                return Err(ParameterError::general(format!(
                    "{method}: '{id}' cannot be a dependency and incompatibility to the same param -{target}"
                )));
            }
        }

        let graph = self.graph_mut(relation);
        for (_, param) in params {
            graph.entry(param).or_default().extend(targets.iter().copied());
            debug!(param = %param, relation = method, targets = ?targets, "declared constraint");
        }
        Ok(())
    }

    /// Targets `param` requires, in declaration order.
    pub fn requires(&self, param: char) -> Option<&IndexSet<char>> {
        self.requires.get(&param)
    }

    /// Targets `param` excludes, in declaration order.
    pub fn excludes(&self, param: char) -> Option<&IndexSet<char>> {
        self.excludes.get(&param)
    }

    pub fn dependencies(&self) -> impl Iterator<Item = (char, &IndexSet<char>)> {
        self.requires.iter().map(|(k, v)| (*k, v))
    }

    pub fn incompatibilities(&self) -> impl Iterator<Item = (char, &IndexSet<char>)> {
        self.excludes.iter().map(|(k, v)| (*k, v))
    }

    fn graph(&self, relation: Relation) -> &Adjacency {
        match relation {
            Relation::Requires => &self.requires,
            Relation::Excludes => &self.excludes,
        }
    }

    fn graph_mut(&mut self, relation: Relation) -> &mut Adjacency {
        match relation {
            Relation::Requires => &mut self.requires,
            Relation::Excludes => &mut self.excludes,
        }
    }
}

fn has_pair(graph: &Adjacency, a: char, b: char) -> bool {
    graph.get(&a).is_some_and(|set| set.contains(&b))
        || graph.get(&b).is_some_and(|set| set.contains(&a))
}
