//! Signed ground facts and their templates.

use std::fmt;
use std::sync::Arc;

/// A signed ground fact `predicate(argument)`.
///
/// Equality covers all three fields, so a literal and its negation are
/// distinct values.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Literal {
    predicate: Arc<str>,
    argument: Arc<str>,
    positive: bool,
}

impl Literal {
    pub fn new(predicate: impl Into<Arc<str>>, argument: impl Into<Arc<str>>, positive: bool) -> Self {
        Self {
            predicate: predicate.into(),
            argument: argument.into(),
            positive,
        }
    }

    /// `predicate(argument)`
    pub fn positive(predicate: impl Into<Arc<str>>, argument: impl Into<Arc<str>>) -> Self {
        Self::new(predicate, argument, true)
    }

    /// `!predicate(argument)`
    pub fn negative(predicate: impl Into<Arc<str>>, argument: impl Into<Arc<str>>) -> Self {
        Self::new(predicate, argument, false)
    }

    pub fn predicate(&self) -> &Arc<str> {
        &self.predicate
    }

    pub fn argument(&self) -> &Arc<str> {
        &self.argument
    }

    pub fn is_positive(&self) -> bool {
        self.positive
    }

    /// Same predicate and argument, opposite polarity
    pub fn negation(&self) -> Literal {
        Literal {
            predicate: self.predicate.clone(),
            argument: self.argument.clone(),
            positive: !self.positive,
        }
    }

    /// The positive literal over the same predicate and argument
    pub fn atom(&self) -> Literal {
        if self.positive {
            self.clone()
        } else {
            self.negation()
        }
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.positive {
            f.write_str("!")?;
        }
        write!(f, "{}({})", self.predicate, self.argument)
    }
}

/// A literal whose argument is a variable name, instantiated per solution mapping
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LiteralTemplate {
    pub predicate: Arc<str>,
    pub variable: Arc<str>,
    pub positive: bool,
}

impl LiteralTemplate {
    pub fn new(predicate: impl Into<Arc<str>>, variable: impl Into<Arc<str>>, positive: bool) -> Self {
        Self {
            predicate: predicate.into(),
            variable: variable.into(),
            positive,
        }
    }

    pub fn positive(predicate: impl Into<Arc<str>>, variable: impl Into<Arc<str>>) -> Self {
        Self::new(predicate, variable, true)
    }

    pub fn negative(predicate: impl Into<Arc<str>>, variable: impl Into<Arc<str>>) -> Self {
        Self::new(predicate, variable, false)
    }
}

impl fmt::Display for LiteralTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.positive {
            f.write_str("!")?;
        }
        write!(f, "{}(?{})", self.predicate, self.variable)
    }
}
