//! The set of decided literals

use hashbrown::HashSet;

use crate::literal::Literal;

/// Every literal proved true so far, positive or negative
///
/// Grows monotonically during a run and never holds a literal together with
/// its negation.
#[derive(Debug, Clone, Default)]
pub struct Assignment {
    literals: HashSet<Literal>,
}

impl Assignment {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `lit` as decided. Returns false if it already was.
    ///
    /// # Panics
    ///
    /// Panics if the negation of `lit` is already decided. That can only
    /// happen through a grounding or pass-ordering bug.
    pub fn insert(&mut self, lit: Literal) -> bool {
        assert!(
            !self.literals.contains(&lit.negation()),
            "assignment would contain both {} and {}",
            lit,
            lit.negation()
        );
        self.literals.insert(lit)
    }

    pub fn contains(&self, lit: &Literal) -> bool {
        self.literals.contains(lit)
    }

    /// True if every literal of `lits` is decided
    pub fn contains_all<'a, I>(&self, lits: I) -> bool
    where
        I: IntoIterator<Item = &'a Literal>,
    {
        lits.into_iter().all(|l| self.literals.contains(l))
    }

    /// True if the literal or its negation is decided
    pub fn is_decided(&self, lit: &Literal) -> bool {
        self.literals.contains(lit) || self.literals.contains(&lit.negation())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Literal> + '_ {
        self.literals.iter()
    }

    pub fn len(&self) -> usize {
        self.literals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.literals.is_empty()
    }
}
