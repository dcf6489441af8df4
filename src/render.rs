//! Per-node render context: everything the page needs besides the table.
//!
//! The board image is described, not fetched: [`BoardImageRequest`] carries
//! the fields an external diagram service needs (FEN, highlight squares,
//! check square, orientation, theme, size) and the presentation layer
//! assembles the actual URL from it. All text fields are plain displayable
//! strings, empty rather than absent, so templates need no null branches.

use serde::Serialize;
use shakmaty::Color;

use crate::tree::Node;

/// Which side sits at the bottom of the rendered diagram.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Orientation {
    WhiteAtBottom,
    BlackAtBottom,
    /// Flip so the side to move is at the bottom.
    AutoBySideToMove,
}

/// Presentation knobs for the diagram request. The defaults match the
/// service's: white at the bottom, 360px, brown theme.
#[derive(Clone, Debug, Serialize)]
pub struct BoardConfig {
    pub orientation: Orientation,
    pub size: u32,
    pub colors: String,
}

impl Default for BoardConfig {
    fn default() -> Self {
        BoardConfig {
            orientation: Orientation::WhiteAtBottom,
            size: 360,
            colors: "brown".to_owned(),
        }
    }
}

/// Descriptor for one board-image fetch. Square fields use coordinate names
/// (`e1`); the URL itself is assembled outside this crate.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct BoardImageRequest {
    pub fen: String,
    /// Origin and destination of the move that produced the position.
    pub last_move: Option<(String, String)>,
    /// Square of the king in check, if the position is check.
    pub check: Option<String>,
    /// Resolved orientation: never `auto` at this point.
    pub orientation: Orientation,
    pub size: u32,
    pub colors: String,
}

/// The bound variables of the variations-table page for one node.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RenderContext {
    pub fen: String,
    pub board_image: BoardImageRequest,
    pub pre_comment: String,
    pub movetext: String,
    pub post_comment: String,
}

fn resolve_orientation(config: &BoardConfig, node: &Node) -> Orientation {
    match config.orientation {
        Orientation::AutoBySideToMove => {
            if node.to_move == Color::Black {
                Orientation::BlackAtBottom
            } else {
                Orientation::WhiteAtBottom
            }
        }
        fixed => fixed,
    }
}

pub fn render_context(node: &Node, config: &BoardConfig) -> RenderContext {
    let ply = node.ply();
    RenderContext {
        fen: node.fen.clone(),
        board_image: BoardImageRequest {
            fen: node.fen.clone(),
            last_move: ply.map(|ply| {
                let (from, to) = ply.last_move;
                (from.to_string(), to.to_string())
            }),
            check: ply
                .and_then(|ply| ply.check_square)
                .map(|square| square.to_string()),
            orientation: resolve_orientation(config, node),
            size: config.size,
            colors: config.colors.clone(),
        },
        pre_comment: ply.map(|ply| ply.pre_comment.clone()).unwrap_or_default(),
        movetext: ply.map(|ply| ply.movetext.clone()).unwrap_or_default(),
        post_comment: ply.map(|ply| ply.post_comment.clone()).unwrap_or_default(),
    }
}
