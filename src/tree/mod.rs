//! The variation tree: an arena of position nodes built once per repertoire
//! load and queried read-only afterwards.
//!
//! Nodes live in a flat `Vec` and refer to each other by [`NodeId`] index,
//! never by pointer, so the whole tree is a single owned value that can be
//! swapped atomically behind an `Arc`. Every node carries a stable
//! [`Address`] `(depth, variation)` suitable for a `/node/{depth}/{variation}`
//! deep link; resolution is a two-level index lookup, not a tree walk.

mod builder;

use serde::Serialize;
use shakmaty::{Color, Square};

use crate::error::{LoadError, QueryError};
use crate::pgn::parser;

/// Index of a node within its [`GameTree`]'s arena. Only meaningful for the
/// tree that issued it.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct NodeId(u32);

impl NodeId {
    pub(crate) const ROOT: NodeId = NodeId(0);

    fn index(self) -> usize {
        self.0 as usize
    }
}

/// Stable deep-link address of a node: ply depth from the game start and a
/// per-depth variation index. `(0,0)` is always the root.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize)]
pub struct Address {
    pub depth: u32,
    pub variation: u32,
}

impl Address {
    pub const ROOT: Address = Address { depth: 0, variation: 0 };

    pub fn new(depth: u32, variation: u32) -> Self {
        Address { depth, variation }
    }

    /// The URL path segment form used by the presentation layer.
    pub fn path(&self) -> String {
        format!("/node/{}/{}", self.depth, self.variation)
    }
}

/// The move that produced a node, with its display data and comments.
/// The root has none.
#[derive(Clone, Debug)]
pub struct PlyData {
    pub san: String,
    /// Display movetext: `3. Nf3` for white plies, `3...Nf6` for black ones.
    pub movetext: String,
    pub number: u32,
    pub color: Color,
    pub check_square: Option<Square>,
    pub last_move: (Square, Square),
    pub pre_comment: String,
    pub post_comment: String,
}

/// One reachable position. Immutable after construction.
#[derive(Debug)]
pub struct Node {
    id: NodeId,
    parent: Option<NodeId>,
    main: Option<NodeId>,
    alternatives: Vec<NodeId>,
    address: Address,
    /// FEN of this position.
    pub fen: String,
    /// Side to move here.
    pub to_move: Color,
    /// Fullmove number of the next ply played from here.
    pub next_number: u32,
    ply: Option<PlyData>,
}

impl Node {
    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// The main-line continuation, if this position is not terminal.
    pub fn main(&self) -> Option<NodeId> {
        self.main
    }

    /// Alternative continuations in order of first appearance in the source.
    pub fn alternatives(&self) -> &[NodeId] {
        &self.alternatives
    }

    pub fn is_terminal(&self) -> bool {
        self.main.is_none() && self.alternatives.is_empty()
    }

    /// The move that led here; `None` for the root.
    pub fn ply(&self) -> Option<&PlyData> {
        self.ply.as_ref()
    }

    pub fn depth(&self) -> u32 {
        self.address.depth
    }
}

/// A fully built repertoire tree. All methods are pure reads; share freely.
pub struct GameTree {
    nodes: Vec<Node>,
    /// `index[depth][variation]` resolves an [`Address`] in O(1).
    index: Vec<Vec<NodeId>>,
}

impl GameTree {
    /// Parses and builds in one shot. Fails without side effects.
    pub fn from_pgn(source: &str) -> Result<GameTree, LoadError> {
        let game = parser::parse(source)?;
        builder::build(game)
    }

    pub fn root(&self) -> &Node {
        &self.nodes[NodeId::ROOT.index()]
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    /// Address lookup. `(0,0)` always succeeds and returns the root.
    pub fn resolve(&self, address: Address) -> Result<&Node, QueryError> {
        self.index
            .get(address.depth as usize)
            .and_then(|level| level.get(address.variation as usize))
            .map(|&id| self.node(id))
            .ok_or(QueryError::AddressNotFound {
                depth: address.depth,
                variation: address.variation,
            })
    }

    /// Node ids from the root to `id`, inclusive, in play order.
    pub fn path_to(&self, id: NodeId) -> Vec<NodeId> {
        let mut path = Vec::with_capacity(self.node(id).depth() as usize + 1);
        let mut current = Some(id);
        while let Some(id) = current {
            path.push(id);
            current = self.node(id).parent;
        }
        path.reverse();
        path
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        // A built tree always has at least the root.
        false
    }

    /// Deepest populated ply.
    pub fn max_depth(&self) -> u32 {
        (self.index.len() - 1) as u32
    }

    pub fn iter(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter()
    }
}
