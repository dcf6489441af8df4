//! Variation tree and node addressing engine for PGN chess repertoires.
//!
//! A repertoire arrives as PGN movetext with arbitrarily nested variations.
//! This crate parses it (checking move legality along the way), builds an
//! immutable arena tree of positions, gives every position a stable
//! `(depth, variation)` deep-link address, and answers the queries a
//! variations-table page needs: the table rows for a node, and the render
//! context (FEN, board-image descriptor, comments) for it.
//!
//! ```
//! use repertoire_tree::{rows_for, render_context, Address, BoardConfig, Repertoire};
//!
//! let repertoire = Repertoire::new();
//! repertoire.load_str("1. e4 {open games} (1. d4) 1... e5").unwrap();
//!
//! let tree = repertoire.snapshot().unwrap();
//! let node = tree.resolve(Address::new(1, 0)).unwrap();
//! let rows: Vec<_> = rows_for(&tree, node).collect();
//! assert_eq!(rows.len(), 2);
//! assert_eq!(render_context(node, &BoardConfig::default()).movetext, "1. e4");
//! ```

pub mod error;
pub mod pgn;
pub mod render;
pub mod report;
pub mod repertoire;
pub mod table;
pub mod tree;

pub use error::{LoadError, QueryError};
pub use render::{render_context, BoardConfig, BoardImageRequest, Orientation, RenderContext};
pub use report::TreeReport;
pub use repertoire::Repertoire;
pub use table::{rows_for, MoveCell, Row, Rows, MAX_ALTERNATIVES};
pub use tree::{Address, GameTree, Node, NodeId};
