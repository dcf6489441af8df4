//! Variations-table row generation.
//!
//! A row describes the choices available *at* one node of the root path: the
//! main continuation plus the sibling alternatives, each labelled with its
//! movetext and deep-link address. [`rows_for`] yields one row per node from
//! the root down to the addressed node, lazily; the iterator is `Clone`, so a
//! consumer can restart it at no cost.

use serde::Serialize;
use shakmaty::Color;

use crate::tree::{Address, GameTree, Node, NodeId};

/// Displayed alternatives are capped; anything beyond the cap is reported in
/// [`Row::hidden_alternatives`] and rendered as an explicit "+N more"
/// indicator by the presentation layer, never dropped silently.
pub const MAX_ALTERNATIVES: usize = 8;

/// One selectable move: its bare SAN, display movetext and node address.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct MoveCell {
    pub san: String,
    pub movetext: String,
    pub address: Address,
}

impl MoveCell {
    fn new(node: &Node) -> Option<MoveCell> {
        node.ply().map(|ply| MoveCell {
            san: ply.san.clone(),
            movetext: ply.movetext.clone(),
            address: node.address(),
        })
    }
}

/// The choices at one position along the root path.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Row {
    /// Fullmove number of the ply being chosen in this row.
    pub number: u32,
    /// `true` when it is white's choice.
    pub white_to_move: bool,
    /// Main-line continuation; `None` at a terminal position.
    pub mainline: Option<MoveCell>,
    /// Up to [`MAX_ALTERNATIVES`] alternatives, in source order.
    pub alternatives: Vec<MoveCell>,
    /// How many further alternatives were not included.
    pub hidden_alternatives: usize,
}

impl Row {
    fn at(tree: &GameTree, node: &Node) -> Row {
        let alternatives = node.alternatives();
        let shown = alternatives.len().min(MAX_ALTERNATIVES);
        Row {
            number: node.next_number,
            white_to_move: node.to_move == Color::White,
            mainline: node.main().and_then(|id| MoveCell::new(tree.node(id))),
            alternatives: alternatives[..shown]
                .iter()
                .filter_map(|&id| MoveCell::new(tree.node(id)))
                .collect(),
            hidden_alternatives: alternatives.len() - shown,
        }
    }
}

/// Lazy iterator of [`Row`]s for the path from the root to `node`,
/// root first. Bounded by the node's depth plus one.
#[derive(Clone)]
pub struct Rows<'a> {
    tree: &'a GameTree,
    path: Vec<NodeId>,
    next: usize,
}

impl<'a> Rows<'a> {
    pub fn len(&self) -> usize {
        self.path.len() - self.next
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<'a> Iterator for Rows<'a> {
    type Item = Row;

    fn next(&mut self) -> Option<Row> {
        let id = *self.path.get(self.next)?;
        self.next += 1;
        Some(Row::at(self.tree, self.tree.node(id)))
    }
}

pub fn rows_for<'a>(tree: &'a GameTree, node: &Node) -> Rows<'a> {
    Rows {
        tree,
        path: tree.path_to(node.id()),
        next: 0,
    }
}
