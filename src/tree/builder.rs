//! Tree construction from the parsed movetext stream.
//!
//! A cursor walks the arena while a stack mirrors variation nesting: a ply
//! outside parentheses extends the main line and advances the cursor; `(`
//! re-points the cursor at the parent of the move just played, so the
//! variation's first ply lands as a sibling alternative of that move; `)`
//! restores the cursor saved at the matching `(`. Addresses are assigned
//! afterwards in level order, which puts the all-main path at variation
//! index 0 on every depth.

use crate::error::LoadError;
use crate::pgn::parser::{MovetextItem, ParsedGame, Ply};

use super::{Address, GameTree, Node, NodeId, PlyData};

fn format_movetext(ply: &Ply) -> String {
    match ply.color {
        shakmaty::Color::White => format!("{}. {}", ply.number, ply.san),
        shakmaty::Color::Black => format!("{}...{}", ply.number, ply.san),
    }
}

fn make_node(id: NodeId, parent: NodeId, ply: Ply) -> Node {
    let movetext = format_movetext(&ply);
    Node {
        id,
        parent: Some(parent),
        main: None,
        alternatives: Vec::new(),
        address: Address::ROOT, // placeholder until assignment
        fen: ply.fen_after,
        to_move: ply.to_move,
        next_number: ply.next_number,
        ply: Some(PlyData {
            movetext,
            san: ply.san,
            number: ply.number,
            color: ply.color,
            check_square: ply.check_square,
            last_move: ply.last_move,
            pre_comment: ply.pre_comment,
            post_comment: ply.post_comment,
        }),
    }
}

pub(super) fn build(game: ParsedGame) -> Result<GameTree, LoadError> {
    let has_moves = game
        .items
        .iter()
        .any(|item| matches!(item, MovetextItem::Ply(_)));
    if !has_moves {
        return Err(LoadError::EmptyRepertoire);
    }

    let mut nodes = vec![Node {
        id: NodeId::ROOT,
        parent: None,
        main: None,
        alternatives: Vec::new(),
        address: Address::ROOT,
        fen: game.start_fen,
        to_move: game.start_to_move,
        next_number: game.start_number,
        ply: None,
    }];

    let mut cursor = NodeId::ROOT;
    let mut saved: Vec<NodeId> = Vec::new();
    let mut pending_alternative = false;

    for item in game.items {
        match item {
            MovetextItem::Ply(ply) => {
                let offset = ply.offset;
                let id = NodeId(nodes.len() as u32);
                let node = make_node(id, cursor, ply);
                nodes.push(node);
                let cursor_node = &mut nodes[cursor.index()];
                if pending_alternative {
                    cursor_node.alternatives.push(id);
                    pending_alternative = false;
                } else if cursor_node.main.is_none() {
                    cursor_node.main = Some(id);
                } else {
                    // The parser's position stack rules this out.
                    return Err(LoadError::MalformedPgn {
                        offset,
                        detail: "continuation of a line that already has one".to_owned(),
                    });
                }
                cursor = id;
            }
            MovetextItem::EnterVariation => {
                let parent = match nodes[cursor.index()].parent {
                    Some(parent) => parent,
                    None => return Err(LoadError::UnbalancedVariation { offset: 0 }),
                };
                saved.push(cursor);
                cursor = parent;
                pending_alternative = true;
            }
            MovetextItem::ExitVariation => {
                cursor = match saved.pop() {
                    Some(saved) => saved,
                    None => return Err(LoadError::UnbalancedVariation { offset: 0 }),
                };
                pending_alternative = false;
            }
        }
    }

    let index = assign_addresses(&mut nodes);
    Ok(GameTree { nodes, index })
}

/// Level-order address assignment: for each depth, parents are scanned by
/// ascending variation index and each contributes its main child first, then
/// its alternatives in appearance order. Deterministic for a given source.
fn assign_addresses(nodes: &mut [Node]) -> Vec<Vec<NodeId>> {
    let mut index: Vec<Vec<NodeId>> = vec![vec![NodeId::ROOT]];

    let mut level = 0;
    while level < index.len() {
        let mut next: Vec<NodeId> = Vec::new();
        for &parent_id in &index[level] {
            let parent = &nodes[parent_id.index()];
            next.extend(parent.main);
            next.extend(parent.alternatives.iter().copied());
        }
        if !next.is_empty() {
            index.push(next);
        }
        level += 1;
    }

    for (depth, level_nodes) in index.iter().enumerate() {
        for (variation, &id) in level_nodes.iter().enumerate() {
            nodes[id.index()].address = Address {
                depth: depth as u32,
                variation: variation as u32,
            };
        }
    }

    index
}
