//! Rule patterns: templates grounded once per solution mapping.
//!
//! A pattern is only instantiated when the binding covers every variable it
//! declares. A coverage miss is not an error; it is how `OPTIONAL` solutions
//! that do not reach a pattern are filtered out.

use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use crate::binding::Binding;
use crate::error::MissingBinding;
use crate::literal::{Literal, LiteralTemplate};
use crate::rule_map::RuleBody;

/// A rule template `head :- body`, plus the variables a binding must provide
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RulePattern {
    head: LiteralTemplate,
    body: Vec<LiteralTemplate>,
    variables: BTreeSet<Arc<str>>,
}

impl RulePattern {
    /// Create a pattern whose required variables are those of its head and body
    pub fn new(head: LiteralTemplate, body: Vec<LiteralTemplate>) -> Self {
        let variables = std::iter::once(&head)
            .chain(body.iter())
            .map(|t| t.variable.clone())
            .collect();
        Self {
            head,
            body,
            variables,
        }
    }

    /// Require additional variables that do not occur in any literal
    ///
    /// Used when a solution must exist for some variable without a constraint
    /// being propagated on its value.
    pub fn with_variables<I, V>(mut self, vars: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Arc<str>>,
    {
        self.variables.extend(vars.into_iter().map(Into::into));
        self
    }

    pub fn head(&self) -> &LiteralTemplate {
        &self.head
    }

    pub fn body(&self) -> &[LiteralTemplate] {
        &self.body
    }

    pub fn variables(&self) -> &BTreeSet<Arc<str>> {
        &self.variables
    }

    /// Ground the head and body, or `None` if `binding` misses a variable
    pub fn instantiate(&self, binding: &Binding) -> Option<(Literal, RuleBody)> {
        if !binding.covers(&self.variables) {
            return None;
        }
        let head = instantiate_literal(&self.head, binding).ok()?;
        let body = self
            .body
            .iter()
            .map(|t| instantiate_literal(t, binding))
            .collect::<Result<RuleBody, _>>()
            .ok()?;
        Some((head, body))
    }
}

impl fmt::Display for RulePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} :- ", self.head)?;
        for (i, lit) in self.body.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{lit}")?;
        }
        Ok(())
    }
}

/// Substitute the template's variable with its bound value
pub fn instantiate_literal(
    template: &LiteralTemplate,
    binding: &Binding,
) -> Result<Literal, MissingBinding> {
    let value = binding.get(&template.variable).ok_or_else(|| MissingBinding {
        variable: template.variable.clone(),
    })?;
    Ok(Literal::new(
        template.predicate.clone(),
        value.clone(),
        template.positive,
    ))
}
