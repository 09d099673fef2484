//! Scoped name environments used to resolve references.

use std::collections::HashMap;

use phf::{Map, phf_map};

use crate::ast::Node;
use crate::error::CompileError;

/// Names bound in every context built by [`Context::with_builtins`].
static BUILTINS: Map<&'static str, Node> = phf_map! {
    "digit" => Node::Digit,
    "letter" => Node::Letter,
    "whitespace" => Node::Whitespace,
};

/// A mapping from names to nodes, chained to an optional parent scope.
///
/// Lookups check the local names first and then walk up the parents.
/// A child never changes its parent.
#[derive(Debug, Default)]
pub struct Context<'p> {
    names: HashMap<String, Node>,
    parent: Option<&'p Context<'p>>,
}

impl Context<'static> {
    /// An empty root context.
    pub fn new() -> Self {
        Self::default()
    }

    /// A root context holding the built-in names `digit`, `letter` and
    /// `whitespace`.
    pub fn with_builtins() -> Self {
        let names = BUILTINS
            .entries()
            .map(|(name, node)| (name.to_string(), node.clone()))
            .collect();
        Self {
            names,
            parent: None,
        }
    }
}

impl<'p> Context<'p> {
    /// A new, empty scope whose parent is `self`.
    pub fn child(&self) -> Context<'_> {
        Context {
            names: HashMap::new(),
            parent: Some(self),
        }
    }

    /// Bind `name` in this scope, returning the node it replaces here.
    pub fn define(&mut self, name: impl Into<String>, node: Node) -> Option<Node> {
        self.names.insert(name.into(), node)
    }

    /// Find `name` here or in any parent.
    pub fn get(&self, name: &str) -> Option<&Node> {
        self.names
            .get(name)
            .or_else(|| self.parent.and_then(|parent| parent.get(name)))
    }

    /// Like [`get`](Self::get), but absence is an error.
    pub fn lookup(&self, name: &str) -> Result<&Node, CompileError> {
        self.get(name)
            .ok_or_else(|| CompileError::Unresolved(name.to_string()))
    }
}
