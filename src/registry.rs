// Copyright (c) 2025 - Cowboy AI, Inc.

//! Registration tree of handler units
//!
//! The tree mirrors a handler directory layout:
//!
//! ```text
//! handlers/                  HandlerTree root
//!   communication/           service directory
//!     send                   unit
//!     shared                 unit declaring itself Shared
//!     export/                package, loaded through its `mod` unit
//!       mod
//!   _drafts/                 skipped
//! ```
//!
//! Each unit is produced by a loader function, so nothing is constructed
//! until the resolver walks the tree.

use std::fmt;
use std::sync::Arc;

use crate::handler::{Arguments, EntryPoint, IntoReturned};

/// Name of the unit that is the entry point of a package
pub const PACKAGE_ENTRY: &str = "mod";

/// Loader producing a handler unit on demand
pub type Loader = Arc<dyn Fn() -> HandlerUnit + Send + Sync>;

/// What a unit contributes to the mapping
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Declaration {
    /// Shared code for sibling units, no handler
    Shared,
    /// Reacts to the automated event named `service.action`
    Automated(String),
    /// A command named after the unit's path
    Manual,
}

/// A loaded handler unit
#[derive(Debug, Clone)]
pub struct HandlerUnit {
    declaration: Declaration,
    entry: Option<EntryPoint>,
}

impl HandlerUnit {
    pub fn shared() -> Self {
        Self {
            declaration: Declaration::Shared,
            entry: None,
        }
    }

    pub fn automated(event: impl Into<String>) -> Self {
        Self {
            declaration: Declaration::Automated(event.into()),
            entry: None,
        }
    }

    pub fn manual() -> Self {
        Self {
            declaration: Declaration::Manual,
            entry: None,
        }
    }

    /// Attach the entry point
    pub fn handler<A, R, F, Fut>(mut self, handler: F) -> Self
    where
        A: Arguments,
        R: IntoReturned,
        F: Fn(A) -> Fut + Send + Sync + 'static,
        Fut: std::future::Future<Output = anyhow::Result<R>> + Send + 'static,
    {
        self.entry = Some(EntryPoint::new(handler));
        self
    }

    pub fn with_entry(mut self, entry: EntryPoint) -> Self {
        self.entry = Some(entry);
        self
    }

    pub fn declaration(&self) -> &Declaration {
        &self.declaration
    }

    pub fn entry(&self) -> Option<&EntryPoint> {
        self.entry.as_ref()
    }

    pub(crate) fn into_parts(self) -> (Declaration, Option<EntryPoint>) {
        (self.declaration, self.entry)
    }
}

/// An entry of the tree
#[derive(Clone)]
pub enum Node {
    Directory { name: String, children: Vec<Node> },
    Unit { name: String, loader: Loader },
}

impl Node {
    pub fn directory(name: impl Into<String>, children: Vec<Node>) -> Self {
        Node::Directory {
            name: name.into(),
            children,
        }
    }

    pub fn unit<L>(name: impl Into<String>, loader: L) -> Self
    where
        L: Fn() -> HandlerUnit + Send + Sync + 'static,
    {
        Node::Unit {
            name: name.into(),
            loader: Arc::new(loader),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Node::Directory { name, .. } | Node::Unit { name, .. } => name,
        }
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Node::Directory { name, children } => f
                .debug_struct("Directory")
                .field("name", name)
                .field("children", children)
                .finish(),
            Node::Unit { name, .. } => f.debug_struct("Unit").field("name", name).finish(),
        }
    }
}

/// The root of a handler layout
#[derive(Debug, Clone)]
pub struct HandlerTree {
    root: String,
    nodes: Vec<Node>,
}

impl HandlerTree {
    pub fn new(root: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            nodes: Vec::new(),
        }
    }

    /// Add a service directory
    pub fn service(mut self, name: impl Into<String>, children: Vec<Node>) -> Self {
        self.nodes.push(Node::directory(name, children));
        self
    }

    /// Add any node at the root
    pub fn node(mut self, node: Node) -> Self {
        self.nodes.push(node);
        self
    }

    pub fn root(&self) -> &str {
        &self.root
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }
}

/// Whether a name is a lowercase module identifier
pub fn is_unit_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_lowercase() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("send", true)]
    #[test_case("on_sign_up", true)]
    #[test_case("_util", true)]
    #[test_case("export2", true)]
    #[test_case("README", false)]
    #[test_case("send.py", false)]
    #[test_case("2fa", false)]
    #[test_case("", false)]
    fn test_unit_names(name: &str, valid: bool) {
        assert_eq!(is_unit_name(name), valid);
    }

    #[test]
    fn test_tree_builder_keeps_order() {
        let tree = HandlerTree::new("handlers")
            .service(
                "communication",
                vec![
                    Node::unit("send", HandlerUnit::manual),
                    Node::unit("shared", HandlerUnit::shared),
                ],
            )
            .service("integrations", vec![]);

        let names: Vec<_> = tree.nodes().iter().map(Node::name).collect();
        assert_eq!(names, vec!["communication", "integrations"]);
        assert_eq!(tree.root(), "handlers");
    }

    #[test]
    fn test_units_are_built_lazily() {
        let node = Node::unit("on_sign_up", || {
            HandlerUnit::automated("authentication.sign_up")
        });
        match node {
            Node::Unit { loader, .. } => assert_eq!(
                loader().declaration(),
                &Declaration::Automated("authentication.sign_up".to_string())
            ),
            Node::Directory { .. } => unreachable!(),
        }
    }
}
