//! Solution mappings returned by the query executor

use hashbrown::HashMap;
use std::sync::Arc;

/// A single solution mapping: variable name -> bound RDF term (as a string)
///
/// Variables left unbound by the query (e.g. under `OPTIONAL`) are simply
/// absent from the map.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Binding {
    values: HashMap<Arc<str>, Arc<str>>,
}

impl Binding {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `var` to `value`, builder style
    pub fn with(mut self, var: impl Into<Arc<str>>, value: impl Into<Arc<str>>) -> Self {
        self.insert(var, value);
        self
    }

    pub fn insert(&mut self, var: impl Into<Arc<str>>, value: impl Into<Arc<str>>) {
        self.values.insert(var.into(), value.into());
    }

    /// Get the value bound to `var`
    pub fn get(&self, var: &str) -> Option<&Arc<str>> {
        self.values.get(var)
    }

    pub fn is_bound(&self, var: &str) -> bool {
        self.values.contains_key(var)
    }

    /// Names of all bound variables
    pub fn variables(&self) -> impl Iterator<Item = &Arc<str>> {
        self.values.keys()
    }

    /// True if every variable in `vars` is bound
    pub fn covers<'a, I>(&self, vars: I) -> bool
    where
        I: IntoIterator<Item = &'a Arc<str>>,
    {
        vars.into_iter().all(|v| self.values.contains_key(v.as_ref()))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for Binding
where
    K: Into<Arc<str>>,
    V: Into<Arc<str>>,
{
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut binding = Binding::new();
        for (k, v) in iter {
            binding.insert(k, v);
        }
        binding
    }
}
