//! A generic parse tree: an arena of nodes addressed by stable index, so AST
//! nodes can hold a cheap, non-owning back-reference for diagnostics without
//! creating ownership cycles (Design Notes §9).

use crate::location::CodeLocation;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ParseNodeId(pub usize);

#[derive(Debug, Clone)]
pub struct ParseNode {
    /// The grammar rule (or token) this node came from, e.g. `"ifStatement"`.
    pub rule_name: &'static str,
    pub location: CodeLocation,
    pub children: Vec<ParseNodeId>,
}

/// Owns every parse node produced for one compilation job. Outlives the AST
/// built from it.
#[derive(Debug, Default)]
pub struct ParseArena {
    nodes: Vec<ParseNode>,
}

impl ParseArena {
    pub fn new() -> Self {
        ParseArena { nodes: Vec::new() }
    }

    pub fn push(&mut self, rule_name: &'static str, location: CodeLocation) -> ParseNodeId {
        let id = ParseNodeId(self.nodes.len());
        self.nodes.push(ParseNode { rule_name, location, children: Vec::new() });
        id
    }

    pub fn add_child(&mut self, parent: ParseNodeId, child: ParseNodeId) {
        self.nodes[parent.0].children.push(child);
    }

    pub fn get(&self, id: ParseNodeId) -> &ParseNode {
        &self.nodes[id.0]
    }
}
