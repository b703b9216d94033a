//! Shape definitions and their normalization into atomic constraints
//!
//! A [`ConstraintDef`] may carry both cardinalities, a value, a datatype and a
//! shape reference at once. Compilation only deals with three closed kinds:
//!
//! - [`AtomicConstraint::Min`]: at least `n` values conforming to a shape
//! - [`AtomicConstraint::Max`]: at most `n` values (conforming to a shape, if any)
//! - [`AtomicConstraint::Local`]: checked by the query alone, no shape propagated
//!
//! A constraint with both `min` and `max` is split into one `Min` and one `Max`.

use std::sync::Arc;

use crate::error::{Result, SchemaError};

/// A single constraint as written in a shape definition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstraintDef {
    /// Property path; `None` constrains the focus node itself
    pub path: Option<Arc<str>>,
    pub min: Option<u32>,
    pub max: Option<u32>,
    pub datatype: Option<Arc<str>>,
    pub value: Option<Arc<str>>,
    /// Shape the path values (or the focus node) must conform to
    pub shape_ref: Option<Arc<str>>,
    /// False when the shape reference or datatype is negated
    pub positive: bool,
}

impl ConstraintDef {
    /// Constraint over the values of `path`
    pub fn path(path: impl Into<Arc<str>>) -> Self {
        Self {
            path: Some(path.into()),
            ..Self::local()
        }
    }

    /// Constraint on the focus node itself
    pub fn local() -> Self {
        Self {
            path: None,
            min: None,
            max: None,
            datatype: None,
            value: None,
            shape_ref: None,
            positive: true,
        }
    }

    pub fn min(mut self, n: u32) -> Self {
        self.min = Some(n);
        self
    }

    pub fn max(mut self, n: u32) -> Self {
        self.max = Some(n);
        self
    }

    pub fn datatype(mut self, datatype: impl Into<Arc<str>>) -> Self {
        self.datatype = Some(datatype.into());
        self
    }

    pub fn value(mut self, value: impl Into<Arc<str>>) -> Self {
        self.value = Some(value.into());
        self
    }

    pub fn shape(mut self, shape: impl Into<Arc<str>>) -> Self {
        self.shape_ref = Some(shape.into());
        self
    }

    pub fn negated(mut self) -> Self {
        self.positive = false;
        self
    }
}

/// Alternatives of a shape are conjunctions of constraints
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConjunctionDef {
    pub constraints: Vec<ConstraintDef>,
}

impl ConjunctionDef {
    pub fn new<I: IntoIterator<Item = ConstraintDef>>(constraints: I) -> Self {
        Self {
            constraints: constraints.into_iter().collect(),
        }
    }
}

/// A shape definition: a disjunction of conjunctions plus an optional target
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShapeDef {
    pub id: Arc<str>,
    /// Target declaration handed to the query writer (e.g. a class IRI)
    pub target: Option<Arc<str>>,
    pub disjuncts: Vec<ConjunctionDef>,
}

impl ShapeDef {
    pub fn new(id: impl Into<Arc<str>>) -> Self {
        Self {
            id: id.into(),
            target: None,
            disjuncts: Vec::new(),
        }
    }

    pub fn with_target(mut self, target: impl Into<Arc<str>>) -> Self {
        self.target = Some(target.into());
        self
    }

    pub fn with_disjunct<I: IntoIterator<Item = ConstraintDef>>(mut self, constraints: I) -> Self {
        self.disjuncts.push(ConjunctionDef::new(constraints));
        self
    }

    /// Every shape referenced by any constraint
    pub fn references(&self) -> impl Iterator<Item = &Arc<str>> + '_ {
        self.disjuncts
            .iter()
            .flat_map(|d| d.constraints.iter())
            .filter_map(|c| c.shape_ref.as_ref())
    }
}

/// A min or max cardinality constraint over a path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cardinality {
    pub id: Arc<str>,
    pub path: Arc<str>,
    pub bound: u32,
    pub datatype: Option<Arc<str>>,
    pub value: Option<Arc<str>>,
    pub shape_ref: Option<Arc<str>>,
    pub positive: bool,
}

/// A constraint evaluated by the query alone
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalConstraint {
    pub id: Arc<str>,
    pub constraint: ConstraintDef,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AtomicConstraint {
    Min(Cardinality),
    Max(Cardinality),
    Local(LocalConstraint),
}

impl AtomicConstraint {
    pub fn id(&self) -> &Arc<str> {
        match self {
            AtomicConstraint::Min(c) | AtomicConstraint::Max(c) => &c.id,
            AtomicConstraint::Local(l) => &l.id,
        }
    }
}

/// One conjunction with its constraints grouped by kind
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NormalizedConjunction {
    pub id: Arc<str>,
    pub min: Vec<Cardinality>,
    pub max: Vec<Cardinality>,
    pub local: Vec<LocalConstraint>,
}

/// Split `def` into atomic constraints
///
/// Returns an empty list for a trivially satisfied constraint (`min = 0`
/// with no `max`).
pub fn normalize(id: &str, def: &ConstraintDef) -> Result<Vec<AtomicConstraint>> {
    let Some(path) = &def.path else {
        if def.min.is_some() || def.max.is_some() {
            return Err(SchemaError::invalid_constraint(id, "cardinality requires a path"));
        }
        if def.datatype.is_none() && def.value.is_none() && def.shape_ref.is_none() {
            return Err(SchemaError::invalid_constraint(id, "constraint is empty"));
        }
        return Ok(vec![local(id, def.clone())]);
    };

    if def.min.is_none() && def.max.is_none() {
        if def.value.is_none() {
            return Err(SchemaError::invalid_constraint(
                id,
                "min or max cardinality expected with a path",
            ));
        }
        if def.shape_ref.is_some() {
            return Err(SchemaError::invalid_constraint(
                id,
                "a value constraint cannot reference a shape",
            ));
        }
        return Ok(vec![local(id, def.clone())]);
    }

    let split = def.min.is_some() && def.max.is_some();
    let cardinality = |suffix: &str, bound: u32| Cardinality {
        id: if split {
            Arc::from(format!("{id}{suffix}"))
        } else {
            Arc::from(id)
        },
        path: path.clone(),
        bound,
        datatype: def.datatype.clone(),
        value: def.value.clone(),
        shape_ref: def.shape_ref.clone(),
        positive: def.positive,
    };

    let mut atoms = Vec::with_capacity(2);
    if let Some(min) = def.min.filter(|&n| n > 0) {
        let c = cardinality("_1", min);
        if c.shape_ref.is_some() {
            atoms.push(AtomicConstraint::Min(c));
        } else {
            atoms.push(local(&c.id, ConstraintDef { max: None, ..def.clone() }));
        }
    }
    if let Some(max) = def.max {
        atoms.push(AtomicConstraint::Max(cardinality("_2", max)));
    }
    Ok(atoms)
}

fn local(id: &str, constraint: ConstraintDef) -> AtomicConstraint {
    AtomicConstraint::Local(LocalConstraint {
        id: Arc::from(id),
        constraint,
    })
}

/// Normalize every constraint of a conjunction, numbering them `{id}_c{n}`
pub fn normalize_conjunction(id: &str, def: &ConjunctionDef) -> Result<NormalizedConjunction> {
    let mut out = NormalizedConjunction {
        id: Arc::from(id),
        ..Default::default()
    };
    for (n, c) in def.constraints.iter().enumerate() {
        for atom in normalize(&format!("{id}_c{}", n + 1), c)? {
            match atom {
                AtomicConstraint::Min(c) => out.min.push(c),
                AtomicConstraint::Max(c) => out.max.push(c),
                AtomicConstraint::Local(l) => out.local.push(l),
            }
        }
    }
    Ok(out)
}
