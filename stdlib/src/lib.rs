pub mod io;
pub mod list;
pub mod math;
pub mod string;
pub mod time;

#[cfg(test)]
mod registry_test;

use once_cell::sync::Lazy;
use std::collections::BTreeMap;

/// A built-in group: a named scope exposing variables, functions with their
/// parameter names, and nested groups. Accessed from scripts through
/// `use <name>;` and `::`-qualified chains.
#[derive(Debug, Clone, Default)]
pub struct Group {
    variables: Vec<&'static str>,
    functions: BTreeMap<&'static str, Vec<&'static str>>,
    groups: BTreeMap<&'static str, Group>,
}

impl Group {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn variable(mut self, name: &'static str) -> Self {
        self.variables.push(name);
        self
    }

    pub fn function(mut self, name: &'static str, parameters: &[&'static str]) -> Self {
        self.functions.insert(name, parameters.to_vec());
        self
    }

    pub fn nested(mut self, name: &'static str, group: Group) -> Self {
        self.groups.insert(name, group);
        self
    }

    pub fn variables(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.variables.iter().copied()
    }

    pub fn functions(&self) -> impl Iterator<Item = (&'static str, &[&'static str])> + '_ {
        self.functions.iter().map(|(name, params)| (*name, params.as_slice()))
    }

    pub fn groups(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.groups.keys().copied()
    }

    /// Nested-group lookup, one chain segment at a time.
    pub fn group(&self, name: &str) -> Option<&Group> {
        self.groups.get(name)
    }

    /// Parameter names of an exposed function.
    pub fn function_parameters(&self, name: &str) -> Option<&[&'static str]> {
        self.functions.get(name).map(Vec::as_slice)
    }

    pub fn has_variable(&self, name: &str) -> bool {
        self.variables.contains(&name)
    }
}

static GROUPS: Lazy<BTreeMap<&'static str, Group>> = Lazy::new(|| {
    BTreeMap::from([
        ("math", math::group()),
        ("str", string::group()),
        ("list", list::group()),
        ("io", io::group()),
        ("time", time::group()),
    ])
});

/// Global native functions, addressed with a leading `@` sigil in source.
/// Keys carry no sigil.
static NATIVE_FUNCTIONS: Lazy<BTreeMap<&'static str, Vec<&'static str>>> = Lazy::new(|| {
    BTreeMap::from([
        ("print", vec!["value"]),
        ("println", vec!["value"]),
        ("input", vec!["prompt"]),
        ("len", vec!["collection"]),
        ("str", vec!["value"]),
        ("num", vec!["value"]),
        ("typeof", vec!["value"]),
        ("range", vec!["start", "end"]),
    ])
});

pub fn builtin_groups() -> &'static BTreeMap<&'static str, Group> {
    &GROUPS
}

pub fn lookup_group(name: &str) -> Option<&'static Group> {
    GROUPS.get(name)
}

pub fn native_functions() -> &'static BTreeMap<&'static str, Vec<&'static str>> {
    &NATIVE_FUNCTIONS
}

pub fn native_function(name: &str) -> Option<&'static [&'static str]> {
    NATIVE_FUNCTIONS.get(name).map(Vec::as_slice)
}
