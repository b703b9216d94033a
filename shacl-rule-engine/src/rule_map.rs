//! Pending ground rules, indexed by head.
//!
//! Bodies under one head are alternatives (disjunction); the literals inside a
//! body are a conjunction. A head stays in the map only while its truth value
//! is undetermined.

use hashbrown::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

use crate::literal::Literal;

/// An immutable conjunction of ground literals
///
/// Stored sorted and de-duplicated so that two bodies with the same literals
/// compare (and hash) equal regardless of grounding order. The empty body is
/// trivially satisfied.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RuleBody(Arc<[Literal]>);

impl RuleBody {
    pub fn new(mut literals: Vec<Literal>) -> Self {
        literals.sort();
        literals.dedup();
        Self(literals.into())
    }

    /// The empty body
    pub fn fact() -> Self {
        Self(Arc::from(Vec::new()))
    }

    pub fn literals(&self) -> &[Literal] {
        &self.0
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Literal> {
        self.0.iter()
    }

    pub fn contains(&self, lit: &Literal) -> bool {
        self.0.binary_search(lit).is_ok()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<Literal> for RuleBody {
    fn from_iter<T: IntoIterator<Item = Literal>>(iter: T) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a RuleBody {
    type Item = &'a Literal;
    type IntoIter = std::slice::Iter<'a, Literal>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl fmt::Display for RuleBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, lit) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{lit}")?;
        }
        Ok(())
    }
}

/// Multimap from ground head to its alternative ground bodies
#[derive(Debug, Clone, Default)]
pub struct RuleMap {
    rules: HashMap<Literal, HashSet<RuleBody>>,
    rule_count: usize,
}

impl RuleMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `head :- body`. Returns false if the exact rule was already present.
    pub fn add_rule(&mut self, head: Literal, body: RuleBody) -> bool {
        let added = self.rules.entry(head).or_default().insert(body);
        if added {
            self.rule_count += 1;
        }
        added
    }

    /// Add every body for `head` at once
    pub fn add_rules<I>(&mut self, head: Literal, bodies: I)
    where
        I: IntoIterator<Item = RuleBody>,
    {
        let entry = self.rules.entry(head).or_default();
        for body in bodies {
            if entry.insert(body) {
                self.rule_count += 1;
            }
        }
    }

    /// Lazily enumerate every literal of every retained body, across all heads
    ///
    /// Duplicates are not removed. Calling again restarts the enumeration.
    pub fn body_literals(&self) -> impl Iterator<Item = &Literal> + '_ {
        self.rules
            .values()
            .flat_map(|bodies| bodies.iter())
            .flat_map(|body| body.iter())
    }

    /// Number of retained `(head, body)` pairs
    pub fn rule_count(&self) -> usize {
        self.rule_count
    }

    /// All undetermined heads
    pub fn heads(&self) -> impl Iterator<Item = &Literal> + '_ {
        self.rules.keys()
    }

    pub fn contains_head(&self, head: &Literal) -> bool {
        self.rules.contains_key(head)
    }

    pub fn bodies(&self, head: &Literal) -> Option<&HashSet<RuleBody>> {
        self.rules.get(head)
    }

    /// Drop `head` with all its bodies
    pub fn remove(&mut self, head: &Literal) -> Option<HashSet<RuleBody>> {
        let removed = self.rules.remove(head);
        if let Some(bodies) = &removed {
            self.rule_count -= bodies.len();
        }
        removed
    }

    /// Replace the whole map (used when compacting retained rules)
    pub fn replace(&mut self, other: RuleMap) -> RuleMap {
        std::mem::replace(self, other)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Literal, &HashSet<RuleBody>)> + '_ {
        self.rules.iter()
    }

    /// Number of distinct heads
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl IntoIterator for RuleMap {
    type Item = (Literal, HashSet<RuleBody>);
    type IntoIter = hashbrown::hash_map::IntoIter<Literal, HashSet<RuleBody>>;

    fn into_iter(self) -> Self::IntoIter {
        self.rules.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lit(p: &str, a: &str) -> Literal {
        Literal::positive(p, a)
    }

    #[test]
    fn test_body_is_order_insensitive() {
        let b1 = RuleBody::new(vec![lit("B", "n1"), lit("A", "n1"), lit("A", "n1")]);
        let b2: RuleBody = vec![lit("A", "n1"), lit("B", "n1")].into_iter().collect();
        assert_eq!(b1, b2);
        assert_eq!(b1.len(), 2);
        assert!(b1.contains(&lit("B", "n1")));
        assert!(!b1.contains(&Literal::negative("B", "n1")));
    }

    #[test]
    fn test_add_rule_idempotent() {
        let mut map = RuleMap::new();
        let body = RuleBody::new(vec![lit("B", "n1")]);
        assert!(map.add_rule(lit("A", "n1"), body.clone()));
        assert!(!map.add_rule(lit("A", "n1"), body));
        assert_eq!(map.rule_count(), 1);
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn test_disjunctive_bodies_counted() {
        let mut map = RuleMap::new();
        map.add_rule(lit("A", "n1"), RuleBody::new(vec![lit("B", "n1")]));
        map.add_rule(lit("A", "n1"), RuleBody::new(vec![lit("C", "n1")]));
        map.add_rule(lit("D", "n2"), RuleBody::fact());
        assert_eq!(map.rule_count(), 3);
        assert_eq!(map.bodies(&lit("A", "n1")).map(|b| b.len()), Some(2));

        let mut body_lits: Vec<String> = map.body_literals().map(|l| l.to_string()).collect();
        body_lits.sort();
        assert_eq!(body_lits, vec!["B(n1)", "C(n1)"]);
        // restartable
        assert_eq!(map.body_literals().count(), 2);
    }

    #[test]
    fn test_remove_and_replace() {
        let mut map = RuleMap::new();
        map.add_rule(lit("A", "n1"), RuleBody::new(vec![lit("B", "n1")]));
        map.add_rule(lit("A", "n1"), RuleBody::new(vec![lit("C", "n1")]));
        map.add_rule(lit("D", "n1"), RuleBody::fact());

        assert_eq!(map.remove(&lit("A", "n1")).map(|b| b.len()), Some(2));
        assert_eq!(map.rule_count(), 1);
        assert!(!map.contains_head(&lit("A", "n1")));

        let old = map.replace(RuleMap::new());
        assert!(map.is_empty());
        assert_eq!(map.rule_count(), 0);
        assert!(old.contains_head(&lit("D", "n1")));
    }
}
