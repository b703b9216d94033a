//! Compilation of shape definitions into the engine's [`Schema`]
//!
//! For a shape `S` with disjuncts `S_d1 .. S_dk`, each conjunction `c` yields:
//!
//! - a min query with pattern `c_pos(x) :- T(v1), .., T(vn)` where each `T` is
//!   the shape referenced by a min constraint (or `T(x)` for a local shape ref)
//! - one max query per max constraint, with pattern
//!   `c_max_i(x) :- T(w1), .., T(w{n+1})`, a witness of `n + 1` values
//! - the rule `c(x) :- c_pos(x), !c_max_1(x), ..`
//!
//! and the shape gets one rule `S(x) :- c(x)` per disjunct. Every predicate
//! generated for `S` is owned by `S`, so they are all closed when `S` is
//! visited.
//!
//! Query text comes from a [`QueryWriter`]; the compiler only decides ids,
//! variables and rule patterns.

use std::collections::HashSet;
use std::sync::Arc;

use shacl_rule_engine::{Conjunction, LiteralTemplate, Query, RulePattern, Schema, Shape};

use crate::constraint::{
    normalize_conjunction, Cardinality, LocalConstraint, NormalizedConjunction, ShapeDef,
};
use crate::error::{Result, SchemaError};
use crate::vars::{VariableGenerator, VariableKind};

/// A cardinality constraint with the variables projected for its values
#[derive(Debug, Clone)]
pub struct BoundConstraint {
    pub constraint: Cardinality,
    pub variables: Vec<Arc<str>>,
}

/// Everything a writer needs to produce one min or max query
#[derive(Debug, Clone, Copy)]
pub struct QuerySpec<'a> {
    pub id: &'a str,
    pub shape: &'a ShapeDef,
    /// Variable bound to the focus node
    pub focus: &'a str,
    /// Constraints whose values must be projected
    pub constraints: &'a [BoundConstraint],
    /// Constraints checked inside the query only
    pub local: &'a [LocalConstraint],
}

/// Renders SPARQL for compiled queries
///
/// Every solution must bind the focus variable and each variable of
/// [`QuerySpec::constraints`]; a solution missing one is not grounded.
pub trait QueryWriter {
    /// Query selecting the target nodes of `shape`, projected on the focus variable
    fn write_target(&self, shape: &ShapeDef) -> String;

    /// Query selecting focus nodes satisfying the local and min constraints
    fn write_min(&self, query: &QuerySpec<'_>) -> String;

    /// Query selecting focus nodes with more than `bound` values for the single
    /// constraint in `query.constraints`
    fn write_max(&self, query: &QuerySpec<'_>) -> String;
}

/// Shape definitions to [`Schema`] compiler
#[derive(Debug, Default)]
pub struct SchemaCompiler {
    vars: VariableGenerator,
}

impl SchemaCompiler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compile `defs` with a fresh variable context
    pub fn compile<W: QueryWriter + ?Sized>(defs: &[ShapeDef], writer: &W) -> Result<Schema> {
        Self::new().compile_all(defs, writer)
    }

    pub fn compile_all<W: QueryWriter + ?Sized>(
        &mut self,
        defs: &[ShapeDef],
        writer: &W,
    ) -> Result<Schema> {
        let span = tracing::debug_span!("compile_schema", shapes = defs.len());
        let _guard = span.enter();

        check_definitions(defs)?;
        let shapes = defs
            .iter()
            .map(|def| self.compile_shape(def, writer))
            .collect::<Result<Vec<_>>>()?;
        Ok(Schema::new(shapes)?)
    }

    fn compile_shape<W: QueryWriter + ?Sized>(&mut self, def: &ShapeDef, writer: &W) -> Result<Shape> {
        let focus = self.vars.focus();
        let mut shape = Shape::new(def.id.clone());

        if def.target.is_some() {
            let pattern = RulePattern::new(LiteralTemplate::positive(def.id.clone(), focus.clone()), vec![]);
            shape = shape.with_target_query(Query::new(
                format!("{}_target", def.id),
                pattern,
                writer.write_target(def),
            ));
        }

        for (i, conj) in def.disjuncts.iter().enumerate() {
            let normalized = normalize_conjunction(&format!("{}_d{}", def.id, i + 1), conj)?;
            let compiled = self.compile_conjunction(def, &normalized, writer);
            shape = shape
                .with_predicate(compiled.conjunction.id.clone())
                .with_rule_pattern(compiled.rule)
                .with_rule_pattern(RulePattern::new(
                    LiteralTemplate::positive(def.id.clone(), focus.clone()),
                    vec![LiteralTemplate::positive(compiled.conjunction.id.clone(), focus.clone())],
                ));
            for query in compiled.conjunction.queries() {
                shape = shape.with_predicate(query.pattern.head().predicate.clone());
            }
            shape = shape.with_conjunction(compiled.conjunction);
        }

        tracing::debug!(
            shape = %def.id,
            conjunctions = shape.conjunctions.len(),
            predicates = shape.predicates.len(),
            "compiled shape"
        );
        Ok(shape)
    }

    fn compile_conjunction<W: QueryWriter + ?Sized>(
        &mut self,
        def: &ShapeDef,
        conj: &NormalizedConjunction,
        writer: &W,
    ) -> CompiledConjunction {
        let focus = self.vars.focus();
        let pos = format!("{}_pos", conj.id);

        let bound: Vec<BoundConstraint> = conj
            .min
            .iter()
            .map(|c| BoundConstraint {
                variables: self.vars.fresh_n(VariableKind::Validation, c.bound as usize),
                constraint: c.clone(),
            })
            .collect();
        let mut body: Vec<LiteralTemplate> = bound.iter().flat_map(value_literals).collect();
        for l in &conj.local {
            if let (None, Some(target)) = (&l.constraint.path, &l.constraint.shape_ref) {
                body.push(LiteralTemplate::new(target.clone(), focus.clone(), l.constraint.positive));
            }
        }
        let min_query = Query::new(
            pos.as_str(),
            RulePattern::new(LiteralTemplate::positive(pos.as_str(), focus.clone()), body),
            writer.write_min(&QuerySpec {
                id: &pos,
                shape: def,
                focus: &focus,
                constraints: &bound,
                local: &conj.local,
            }),
        );

        let mut max_queries = Vec::with_capacity(conj.max.len());
        for (i, c) in conj.max.iter().enumerate() {
            let id = format!("{}_max_{}", conj.id, i + 1);
            let witness = [BoundConstraint {
                variables: self
                    .vars
                    .fresh_n(VariableKind::Violation, c.bound as usize + 1),
                constraint: c.clone(),
            }];
            let mut pattern = RulePattern::new(
                LiteralTemplate::positive(id.as_str(), focus.clone()),
                value_literals(&witness[0]).collect(),
            );
            if c.shape_ref.is_none() {
                pattern = pattern.with_variables(witness[0].variables.iter().cloned());
            }
            let sparql = writer.write_max(&QuerySpec {
                id: &id,
                shape: def,
                focus: &focus,
                constraints: &witness,
                local: &[],
            });
            max_queries.push(Query::new(id, pattern, sparql));
        }

        let mut rule_body = vec![LiteralTemplate::positive(pos.as_str(), focus.clone())];
        rule_body.extend(
            max_queries
                .iter()
                .map(|q| LiteralTemplate::negative(q.pattern.head().predicate.clone(), focus.clone())),
        );

        CompiledConjunction {
            rule: RulePattern::new(LiteralTemplate::positive(conj.id.clone(), focus), rule_body),
            conjunction: Conjunction {
                id: conj.id.clone(),
                min_query,
                max_queries,
            },
        }
    }
}

struct CompiledConjunction {
    conjunction: Conjunction,
    /// `c(x) :- c_pos(x), !c_max_i(x)..`
    rule: RulePattern,
}

/// `T(v)` for each value variable, empty without a shape reference
fn value_literals(bound: &BoundConstraint) -> impl Iterator<Item = LiteralTemplate> + '_ {
    let c = &bound.constraint;
    bound.variables.iter().filter_map(move |v| {
        c.shape_ref
            .as_ref()
            .map(|s| LiteralTemplate::new(s.clone(), v.clone(), c.positive))
    })
}

fn check_definitions(defs: &[ShapeDef]) -> Result<()> {
    let mut ids: HashSet<&str> = HashSet::with_capacity(defs.len());
    for def in defs {
        if !ids.insert(def.id.as_ref()) {
            return Err(SchemaError::DuplicateShape(def.id.clone()));
        }
        if def.disjuncts.is_empty() {
            return Err(SchemaError::EmptyDisjunction(def.id.clone()));
        }
    }
    for def in defs {
        if let Some(unknown) = def.references().find(|r| !ids.contains(&***r)) {
            return Err(SchemaError::UnknownShapeReference {
                referrer: def.id.clone(),
                referenced: unknown.clone(),
            });
        }
    }
    Ok(())
}
