//! Compiled shapes as seen by the validator
//!
//! A [`Schema`] is the closed set of shapes a run evaluates. Each shape owns
//! a set of predicates that are closed together once the shape is visited;
//! no predicate may be owned by two shapes.

use hashbrown::HashMap;
use std::collections::BTreeSet;
use std::sync::Arc;

use crate::error::{Result, ValidationError};
use crate::pattern::RulePattern;

/// A query plus the rule pattern its solutions ground
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    pub id: Arc<str>,
    pub pattern: RulePattern,
    /// Query text handed to the executor verbatim
    pub sparql: Arc<str>,
}

impl Query {
    pub fn new(id: impl Into<Arc<str>>, pattern: RulePattern, sparql: impl Into<Arc<str>>) -> Self {
        Self {
            id: id.into(),
            pattern,
            sparql: sparql.into(),
        }
    }
}

/// One disjunct of a shape: a min query and its max (violation) queries
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conjunction {
    pub id: Arc<str>,
    pub min_query: Query,
    pub max_queries: Vec<Query>,
}

impl Conjunction {
    pub fn queries(&self) -> impl Iterator<Item = &Query> + '_ {
        std::iter::once(&self.min_query).chain(self.max_queries.iter())
    }
}

/// A compiled shape
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Shape {
    pub id: Arc<str>,
    /// Seeds target literals; not grounded into rules
    pub target_query: Option<Query>,
    pub conjunctions: Vec<Conjunction>,
    /// Patterns grounded against every solution of this shape's queries
    pub rule_patterns: Vec<RulePattern>,
    /// Predicates closed when this shape is visited
    pub predicates: BTreeSet<Arc<str>>,
}

impl Shape {
    /// A shape with no conjunctions that owns only its own id as predicate
    pub fn new(id: impl Into<Arc<str>>) -> Self {
        let id = id.into();
        Self {
            predicates: BTreeSet::from([id.clone()]),
            id,
            target_query: None,
            conjunctions: Vec::new(),
            rule_patterns: Vec::new(),
        }
    }

    pub fn with_target_query(mut self, query: Query) -> Self {
        self.target_query = Some(query);
        self
    }

    pub fn with_conjunction(mut self, conjunction: Conjunction) -> Self {
        self.conjunctions.push(conjunction);
        self
    }

    pub fn with_rule_pattern(mut self, pattern: RulePattern) -> Self {
        self.rule_patterns.push(pattern);
        self
    }

    pub fn with_predicate(mut self, predicate: impl Into<Arc<str>>) -> Self {
        self.predicates.insert(predicate.into());
        self
    }

    /// Min and max queries of every conjunction, in declaration order
    pub fn queries(&self) -> impl Iterator<Item = &Query> + '_ {
        self.conjunctions.iter().flat_map(Conjunction::queries)
    }
}

/// Ordered shapes with a predicate → owning shape index
#[derive(Debug, Clone, Default)]
pub struct Schema {
    shapes: Vec<Shape>,
    by_id: HashMap<Arc<str>, usize>,
    owners: HashMap<Arc<str>, usize>,
}

impl Schema {
    pub fn new<I: IntoIterator<Item = Shape>>(shapes: I) -> Result<Self> {
        let mut schema = Self::default();
        for shape in shapes {
            schema.push(shape)?;
        }
        Ok(schema)
    }

    fn push(&mut self, shape: Shape) -> Result<()> {
        let idx = self.shapes.len();
        if self.by_id.contains_key(&shape.id) {
            return Err(ValidationError::DuplicateShape(shape.id.clone()));
        }
        let heads = shape
            .target_query
            .iter()
            .chain(shape.queries())
            .map(|q| &q.pattern)
            .chain(shape.rule_patterns.iter())
            .map(|p| &p.head().predicate);
        for predicate in heads {
            if !shape.predicates.contains(predicate) {
                return Err(ValidationError::UnownedPredicate {
                    shape: shape.id.clone(),
                    predicate: predicate.clone(),
                });
            }
        }
        for predicate in &shape.predicates {
            if let Some(&other) = self.owners.get(predicate) {
                return Err(ValidationError::DuplicatePredicate {
                    predicate: predicate.clone(),
                    first: self.shapes[other].id.clone(),
                    second: shape.id.clone(),
                });
            }
        }
        for predicate in &shape.predicates {
            self.owners.insert(predicate.clone(), idx);
        }
        self.by_id.insert(shape.id.clone(), idx);
        self.shapes.push(shape);
        Ok(())
    }

    pub fn shapes(&self) -> &[Shape] {
        &self.shapes
    }

    pub fn shape(&self, id: &str) -> Option<&Shape> {
        self.by_id.get(id).map(|&i| &self.shapes[i])
    }

    /// Shape owning `predicate`, if any
    pub fn owner_of(&self, predicate: &str) -> Option<&Shape> {
        self.owners.get(predicate).map(|&i| &self.shapes[i])
    }

    /// Shapes declaring a target query, in schema order
    pub fn target_shapes(&self) -> impl Iterator<Item = &Shape> + '_ {
        self.shapes.iter().filter(|s| s.target_query.is_some())
    }

    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }
}
