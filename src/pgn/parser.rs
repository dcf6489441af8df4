//! Movetext grammar layer.
//!
//! Drives the [lexer](super::lexer) over a repertoire's PGN text and emits a
//! flat stream of [`MovetextItem`]s: plies and variation boundaries, in
//! source order. A stack of running [`shakmaty::Chess`] positions mirrors the
//! variation nesting, so every SAN token is checked for legality right here
//! and each emitted ply carries the data the tree will want later (resulting
//! FEN, check state, last-move squares) computed while the position was at
//! hand. Only the first game of a multi-game file is parsed; a `FEN` header
//! overrides the starting position.

use shakmaty::fen::Fen;
use shakmaty::san::San;
use shakmaty::{CastlingMode, Chess, Color, EnPassantMode, Position, Square};

use super::lexer::{Spanned, Token, Tokens};
use crate::error::LoadError;

/// One half-move as written in the source, plus everything derived from the
/// running position at parse time. Immutable once produced.
#[derive(Clone, Debug)]
pub struct Ply {
    /// SAN exactly as it will be displayed, e.g. `Nf3` or `exd8=Q+`.
    pub san: String,
    /// Fullmove number of this ply.
    pub number: u32,
    /// Side that played it.
    pub color: Color,
    /// FEN of the position after the move.
    pub fen_after: String,
    /// Side to move in the resulting position.
    pub to_move: Color,
    /// Fullmove number of the ply that would follow.
    pub next_number: u32,
    /// Square of the king in check in the resulting position, if any.
    pub check_square: Option<Square>,
    /// Origin and destination squares, for board highlighting.
    pub last_move: (Square, Square),
    pub pre_comment: String,
    pub post_comment: String,
    /// Byte offset of the token in the source, for diagnostics.
    pub offset: usize,
}

#[derive(Clone, Debug)]
pub enum MovetextItem {
    Ply(Ply),
    EnterVariation,
    ExitVariation,
}

/// Output of a successful parse: the starting position and the ordered
/// movetext stream, nesting preserved.
pub struct ParsedGame {
    pub start_fen: String,
    pub start_to_move: Color,
    pub start_number: u32,
    pub items: Vec<MovetextItem>,
}

#[derive(Clone)]
struct Frame {
    pos: Chess,
    /// Position before the most recent move of this line; a `(` branches
    /// from here, never from the move itself.
    before: Option<Chess>,
}

fn snippet(source: &str, offset: usize) -> String {
    let tail = &source.as_bytes()[offset.min(source.len())..];
    let end = tail.len().min(16);
    format!(
        "unrecognized token near {:?}",
        String::from_utf8_lossy(&tail[..end]).trim_end()
    )
}

fn fen_of(pos: &Chess) -> String {
    Fen::from_position(pos.clone(), EnPassantMode::Legal).to_string()
}

fn append_comment(target: &mut String, text: &[u8]) {
    let text = String::from_utf8_lossy(text);
    let text = text.trim();
    if text.is_empty() {
        return;
    }
    if !target.is_empty() {
        target.push(' ');
    }
    target.push_str(text);
}

/// Parses the first game's movetext out of `source`.
pub fn parse(source: &str) -> Result<ParsedGame, LoadError> {
    let mut items: Vec<MovetextItem> = Vec::new();
    let mut stack: Vec<Frame> = Vec::new();
    let mut initial = Chess::default();
    let mut current = Frame { pos: initial.clone(), before: None };

    let mut pending_pre = String::new();
    // Index into `items` of the ply that trailing comments attach to.
    let mut attach_post: Option<usize> = None;
    let mut saw_movetext = false;

    for lexed in Tokens::new(source.as_bytes()) {
        let Spanned { offset, token } = lexed.map_err(|failure| LoadError::MalformedPgn {
            offset: failure.offset,
            detail: snippet(source, failure.offset),
        })?;

        match token {
            Token::Tag(key, value) => {
                if saw_movetext {
                    // Headers of the second game; the repertoire is game #1.
                    break;
                }
                if key.eq_ignore_ascii_case(b"fen") {
                    let fen: Fen = String::from_utf8_lossy(value).parse().map_err(|_| {
                        LoadError::MalformedPgn {
                            offset,
                            detail: "invalid FEN header".to_owned(),
                        }
                    })?;
                    initial = fen.into_position(CastlingMode::Standard).map_err(|_| {
                        LoadError::MalformedPgn {
                            offset,
                            detail: "FEN header is not a legal position".to_owned(),
                        }
                    })?;
                    current = Frame { pos: initial.clone(), before: None };
                }
            }
            Token::San(bytes) => {
                saw_movetext = true;
                let san_text = String::from_utf8_lossy(bytes).into_owned();
                let san: San = san_text.parse().map_err(|_| LoadError::MalformedPgn {
                    offset,
                    detail: format!("bad SAN {:?}", san_text),
                })?;
                let m = san.to_move(&current.pos).map_err(|_| LoadError::IllegalMove {
                    san: san_text.clone(),
                    offset,
                })?;

                let number = current.pos.fullmoves().get();
                let color = current.pos.turn();
                let last_move = match m.from() {
                    Some(from) => (from, m.to()),
                    None => (m.to(), m.to()),
                };

                current.before = Some(current.pos.clone());
                current.pos.play_unchecked(&m);

                let check_square = if current.pos.is_check() {
                    current.pos.board().king_of(current.pos.turn())
                } else {
                    None
                };

                items.push(MovetextItem::Ply(Ply {
                    san: san_text,
                    number,
                    color,
                    fen_after: fen_of(&current.pos),
                    to_move: current.pos.turn(),
                    next_number: current.pos.fullmoves().get(),
                    check_square,
                    last_move,
                    pre_comment: std::mem::take(&mut pending_pre),
                    post_comment: String::new(),
                    offset,
                }));
                attach_post = Some(items.len() - 1);
            }
            Token::StartVariation => {
                let before = current.before.clone().ok_or(LoadError::MalformedPgn {
                    offset,
                    detail: "variation with no preceding move".to_owned(),
                })?;
                stack.push(current.clone());
                current = Frame { pos: before, before: None };
                attach_post = None;
                items.push(MovetextItem::EnterVariation);
            }
            Token::EndVariation => {
                current = stack
                    .pop()
                    .ok_or(LoadError::UnbalancedVariation { offset })?;
                attach_post = None;
                items.push(MovetextItem::ExitVariation);
            }
            Token::Comment(bytes) => match attach_post {
                Some(index) => {
                    if let MovetextItem::Ply(ply) = &mut items[index] {
                        append_comment(&mut ply.post_comment, bytes);
                    }
                }
                None => append_comment(&mut pending_pre, bytes),
            },
            Token::Nag(_) | Token::Annotation(_) => {}
            Token::GameResult(_) => break,
        }
    }

    if !stack.is_empty() {
        return Err(LoadError::UnbalancedVariation {
            offset: source.len(),
        });
    }

    // A comment with no ply left to precede belongs to the last move played.
    if !pending_pre.is_empty() {
        let last = items.iter_mut().rev().find_map(|item| match item {
            MovetextItem::Ply(ply) => Some(ply),
            _ => None,
        });
        if let Some(ply) = last {
            append_comment(&mut ply.post_comment, pending_pre.as_bytes());
        }
    }

    Ok(ParsedGame {
        start_fen: fen_of(&initial),
        start_to_move: initial.turn(),
        start_number: initial.fullmoves().get(),
        items,
    })
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::{parse, MovetextItem};
    use crate::error::LoadError;

    fn sans(pgn: &str) -> Vec<String> {
        parse(pgn)
            .unwrap()
            .items
            .iter()
            .filter_map(|item| match item {
                MovetextItem::Ply(ply) => Some(ply.san.clone()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn simple_line() {
        assert_eq!(sans("1. e4 e5 2. Nf3 Nc6"), ["e4", "e5", "Nf3", "Nc6"]);
    }

    #[test]
    fn nested_variations_in_order() {
        assert_eq!(
            sans("1. e4 (1. d4 d5 (1... Nf6)) 1... e5"),
            ["e4", "d4", "d5", "Nf6", "e5"]
        );
    }

    #[test]
    fn ply_metadata() {
        let game = parse("1. e4 e5").unwrap();
        match &game.items[1] {
            MovetextItem::Ply(ply) => {
                assert_eq!(ply.number, 1);
                assert_eq!(ply.color, shakmaty::Color::Black);
                assert_eq!(ply.next_number, 2);
                assert_eq!(
                    ply.fen_after,
                    "rnbqkbnr/pppp1ppp/8/4p3/4P3/8/PPPP1PPP/RNBQKBNR w KQkq - 0 2"
                );
            }
            other => panic!("expected ply, got {:?}", other),
        }
    }

    #[test]
    fn comments_attach_around_moves() {
        let game = parse("{opening thoughts} 1. e4 {strong} (1. d4 {also fine}) e5").unwrap();
        match &game.items[0] {
            MovetextItem::Ply(ply) => {
                assert_eq!(ply.pre_comment, "opening thoughts");
                assert_eq!(ply.post_comment, "strong");
            }
            other => panic!("expected ply, got {:?}", other),
        }
        match &game.items[2] {
            MovetextItem::Ply(ply) => {
                assert_eq!(ply.san, "d4");
                assert_eq!(ply.post_comment, "also fine");
            }
            other => panic!("expected ply, got {:?}", other),
        }
    }

    #[test]
    fn trailing_comment_attaches_to_the_last_ply() {
        let game = parse("1. e4 (1. d4) {transposes elsewhere}").unwrap();
        match &game.items[2] {
            MovetextItem::Ply(ply) => {
                assert_eq!(ply.san, "d4");
                assert_eq!(ply.post_comment, "transposes elsewhere");
            }
            other => panic!("expected ply, got {:?}", other),
        }
    }

    #[test]
    fn check_square_is_the_attacked_king() {
        let game = parse("1. e4 e5 2. Qh5 Nc6 3. Qxf7+").unwrap();
        match game.items.last().unwrap() {
            MovetextItem::Ply(ply) => {
                assert_eq!(ply.check_square, Some(shakmaty::Square::E8));
            }
            other => panic!("expected ply, got {:?}", other),
        }
    }

    #[test]
    fn fen_header_sets_start() {
        let game = parse(
            "[FEN \"rnbqkbnr/pppp1ppp/8/4p3/4P3/8/PPPP1PPP/RNBQKBNR w KQkq - 0 2\"]\n\n2. Nf3",
        )
        .unwrap();
        assert_eq!(game.start_to_move, shakmaty::Color::White);
        assert_eq!(game.start_number, 2);
        assert_eq!(sans("[FEN \"rnbqkbnr/pppp1ppp/8/4p3/4P3/8/PPPP1PPP/RNBQKBNR w KQkq - 0 2\"]\n\n2. Nf3"), ["Nf3"]);
    }

    #[test]
    fn illegal_move_is_detected() {
        match parse("1. e4 Ke7") {
            Err(LoadError::IllegalMove { san, .. }) => assert_eq!(san, "Ke7"),
            other => panic!("expected IllegalMove, got {:?}", other.err()),
        }
    }

    #[test]
    fn excess_close_paren() {
        assert!(matches!(
            parse("1. e4 e5) d4"),
            Err(LoadError::UnbalancedVariation { .. })
        ));
    }

    #[test]
    fn unclosed_variation() {
        assert!(matches!(
            parse("1. e4 (1. d4 d5"),
            Err(LoadError::UnbalancedVariation { .. })
        ));
    }

    #[test]
    fn second_game_is_ignored() {
        assert_eq!(sans("1. e4 e5 *\n\n[Event \"two\"]\n\n1. d4 d5"), ["e4", "e5"]);
    }

    #[test]
    fn variation_before_any_move() {
        assert!(matches!(
            parse("(1. d4) 1. e4"),
            Err(LoadError::MalformedPgn { .. })
        ));
    }
}
