// The nom predicate-matcher approach follows the rust-pgn-tokenizer library,
// Copyright (C) 2017 Lakin Wecker <lakin@wecker.ca>, GPL-3.0-or-later.

//! Byte-level tokenizer for PGN movetext and tag pairs.
//!
//! Operates on a byte slice and streams [`Token`]s borrowing from it. Move
//! numbers, periods and whitespace are consumed silently; everything the
//! grammar layer cares about (moves, comments, NAGs, variation parentheses,
//! tag pairs, results) comes out as a token with its byte offset. Legality of
//! the moves is not this module's business.

use std::fmt;

use nom::error::{ErrorKind, ParseError};
use nom::Err::Error;
use nom::IResult;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Token<'a> {
    /// A SAN move, including any trailing `+`/`#`.
    San(&'a [u8]),
    /// `$n` numeric annotation glyph (digits only, `$` stripped).
    Nag(&'a [u8]),
    /// Suffix annotation such as `!?` or `??`.
    Annotation(&'a [u8]),
    /// `{...}` commentary, braces stripped.
    Comment(&'a [u8]),
    /// Game termination: `1-0`, `0-1`, `1/2-1/2` or `*`.
    GameResult(&'a [u8]),
    /// A `[Symbol "value"]` header pair.
    Tag(&'a [u8], &'a [u8]),
    StartVariation,
    EndVariation,
}

impl<'a> fmt::Display for Token<'a> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Token::San(x) => write!(f, "San({})", String::from_utf8_lossy(x)),
            Token::Nag(x) => write!(f, "Nag({})", String::from_utf8_lossy(x)),
            Token::Annotation(x) => write!(f, "Annotation({})", String::from_utf8_lossy(x)),
            Token::Comment(x) => write!(f, "Comment({})", String::from_utf8_lossy(x)),
            Token::GameResult(x) => write!(f, "GameResult({})", String::from_utf8_lossy(x)),
            Token::Tag(k, v) => write!(
                f,
                "Tag({}, {})",
                String::from_utf8_lossy(k),
                String::from_utf8_lossy(v)
            ),
            Token::StartVariation => write!(f, "StartVariation"),
            Token::EndVariation => write!(f, "EndVariation"),
        }
    }
}

#[derive(Debug, PartialEq)]
pub enum LexError<I> {
    PawnMove,
    PieceMove,
    Castles,
    Empty,
    BadCharacter,
    Integer,
    Nag,
    Annotation,
    Comment,
    TagPair,
    GameResult,
    Variation,
    Nom(I, ErrorKind),
}

impl<I> ParseError<I> for LexError<I> {
    fn from_error_kind(input: I, kind: ErrorKind) -> Self {
        LexError::Nom(input, kind)
    }

    fn append(_: I, _: ErrorKind, other: Self) -> Self {
        other
    }
}

/// A token paired with the byte offset of its first character in the source.
#[derive(Clone, Copy, Debug)]
pub struct Spanned<'a> {
    pub offset: usize,
    pub token: Token<'a>,
}

/// Raised when bytes remain but no token matches; `offset` locates them.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LexFailure {
    pub offset: usize,
}

fn is_digit(i: u8) -> bool {
    i.is_ascii_digit()
}
fn is_file(i: u8) -> bool {
    (b'a'..=b'h').contains(&i)
}
fn is_rank(i: u8) -> bool {
    (b'1'..=b'8').contains(&i)
}
fn is_piece(i: u8) -> bool {
    i == b'R' || i == b'N' || i == b'B' || i == b'Q' || i == b'K'
}
fn is_capture(i: u8) -> bool {
    i == b'x'
}
fn is_equals(i: u8) -> bool {
    i == b'='
}
fn is_check(i: u8) -> bool {
    i == b'+' || i == b'#'
}
fn is_dash(i: u8) -> bool {
    i == b'-'
}
fn is_o(i: u8) -> bool {
    i == b'O'
}
fn is_period(i: u8) -> bool {
    i == b'.'
}
fn is_symbol_char(i: u8) -> bool {
    i.is_ascii_alphanumeric() || i == b'_'
}
fn is_whitespace(i: u8) -> bool {
    i == b' ' || i == b'\n' || i == b'\r' || i == b'\t'
}

/// Matches a fixed sequence of single-byte predicates, yielding its length.
macro_rules! match_bytes {
    ($name:ident, $($pred:ident),+) => {
        fn $name(input: &[u8]) -> Option<usize> {
            let mut n: usize = 0;
            $(
                {
                    if input.len() <= n || !$pred(input[n]) {
                        return None;
                    }
                    n += 1;
                }
            )*
            Some(n)
        }
    };
}

match_bytes![check_suffix, is_check];
match_bytes![promotion_suffix, is_equals, is_piece];

// dxe4
match_bytes![pawn_capture, is_capture, is_file, is_rank];
// e4 (first file byte is consumed by the caller)
match_bytes![pawn_push, is_rank];

// Ng1xf3 / N1xf3 / Ngxf3 / Nxf3 / Ng1f3 / N1f3 / Ngf3 / Nf3
match_bytes![piece_full_capture, is_file, is_rank, is_capture, is_file, is_rank];
match_bytes![piece_rank_capture, is_rank, is_capture, is_file, is_rank];
match_bytes![piece_file_capture, is_file, is_capture, is_file, is_rank];
match_bytes![piece_capture, is_capture, is_file, is_rank];
match_bytes![piece_full_move, is_file, is_rank, is_file, is_rank];
match_bytes![piece_rank_move, is_rank, is_file, is_rank];
match_bytes![piece_file_move, is_file, is_file, is_rank];
match_bytes![piece_move, is_file, is_rank];

match_bytes![short_castles, is_dash, is_o];
match_bytes![long_castles, is_dash, is_o, is_dash, is_o];

match_bytes![result_white, is_digit, is_dash, is_digit];
match_bytes![result_draw, is_digit, slash, is_digit, is_dash, is_digit, slash, is_digit];

fn slash(i: u8) -> bool {
    i == b'/'
}

fn with_check(i: &[u8], length: usize) -> usize {
    length + check_suffix(&i[length..]).unwrap_or(0)
}

fn san_pawn_move(i: &[u8]) -> IResult<&[u8], &[u8], LexError<&[u8]>> {
    let rest = &i[1..];
    let body = pawn_capture(rest).or_else(|| pawn_push(rest));
    match body {
        Some(length) => {
            let length = length + promotion_suffix(&rest[length..]).unwrap_or(0);
            let length = 1 + with_check(rest, length);
            Ok((&i[length..], &i[..length]))
        }
        None => Err(Error(LexError::PawnMove)),
    }
}

fn san_piece_move(i: &[u8]) -> IResult<&[u8], &[u8], LexError<&[u8]>> {
    let rest = &i[1..];
    let body = piece_full_capture(rest)
        .or_else(|| piece_rank_capture(rest))
        .or_else(|| piece_file_capture(rest))
        .or_else(|| piece_capture(rest))
        .or_else(|| piece_full_move(rest))
        .or_else(|| piece_rank_move(rest))
        .or_else(|| piece_file_move(rest))
        .or_else(|| piece_move(rest));
    match body {
        Some(length) => {
            let length = 1 + with_check(rest, length);
            Ok((&i[length..], &i[..length]))
        }
        None => Err(Error(LexError::PieceMove)),
    }
}

fn san_castles(i: &[u8]) -> IResult<&[u8], &[u8], LexError<&[u8]>> {
    let rest = &i[1..];
    let body = long_castles(rest).or_else(|| short_castles(rest));
    match body {
        Some(length) => {
            let length = 1 + with_check(rest, length);
            Ok((&i[length..], &i[..length]))
        }
        None => Err(Error(LexError::Castles)),
    }
}

pub fn san_move(i: &[u8]) -> IResult<&[u8], Token, LexError<&[u8]>> {
    if i.is_empty() {
        return Err(Error(LexError::Empty));
    }
    let result = match i[0] {
        b'R' | b'N' | b'B' | b'Q' | b'K' => san_piece_move(i),
        b'a'..=b'h' => san_pawn_move(i),
        b'O' => san_castles(i),
        _ => Err(Error(LexError::BadCharacter)),
    };
    result.map(|(rest, san)| (rest, Token::San(san)))
}

fn integer(i: &[u8]) -> IResult<&[u8], &[u8], LexError<&[u8]>> {
    let length = i.iter().take_while(|&&b| is_digit(b)).count();
    if length == 0 {
        Err(Error(LexError::Integer))
    } else {
        Ok((&i[length..], &i[..length]))
    }
}

fn nag(i: &[u8]) -> IResult<&[u8], Token, LexError<&[u8]>> {
    if i.first() != Some(&b'$') {
        return Err(Error(LexError::Nag));
    }
    match integer(&i[1..]) {
        Ok((rest, digits)) => Ok((rest, Token::Nag(digits))),
        Err(_) => Err(Error(LexError::Nag)),
    }
}

const MAX_ANNOTATION_LENGTH: usize = 2;

fn annotation(i: &[u8]) -> IResult<&[u8], Token, LexError<&[u8]>> {
    if i.is_empty() || (i[0] != b'!' && i[0] != b'?') {
        return Err(Error(LexError::Annotation));
    }
    let mut length = 1;
    while length < i.len() && length < MAX_ANNOTATION_LENGTH && (i[length] == b'!' || i[length] == b'?') {
        length += 1;
    }
    Ok((&i[length..], Token::Annotation(&i[..length])))
}

fn comment(i: &[u8]) -> IResult<&[u8], Token, LexError<&[u8]>> {
    if i.first() != Some(&b'{') {
        return Err(Error(LexError::Comment));
    }
    // Braces do not nest in PGN; the comment runs to the first '}'.
    match i.iter().position(|&b| b == b'}') {
        Some(end) => Ok((&i[end + 1..], Token::Comment(&i[1..end]))),
        None => Err(Error(LexError::Comment)),
    }
}

fn game_result(i: &[u8]) -> IResult<&[u8], Token, LexError<&[u8]>> {
    if i.first() == Some(&b'*') {
        return Ok((&i[1..], Token::GameResult(&i[..1])));
    }
    let matched = result_draw(i).or_else(|| result_white(i));
    match matched {
        // "1-0", "0-1" and "1/2-1/2" only; anything else digit-led is a move number.
        Some(length) if i[..length] == b"1-0"[..] || i[..length] == b"0-1"[..] || i[..length] == b"1/2-1/2"[..] => {
            Ok((&i[length..], Token::GameResult(&i[..length])))
        }
        _ => Err(Error(LexError::GameResult)),
    }
}

fn quoted_string(i: &[u8]) -> IResult<&[u8], &[u8], LexError<&[u8]>> {
    if i.first() != Some(&b'"') {
        return Err(Error(LexError::TagPair));
    }
    let mut n = 1;
    while n < i.len() {
        match i[n] {
            b'"' => return Ok((&i[n + 1..], &i[1..n])),
            b'\\' => n += 2,
            _ => n += 1,
        }
    }
    Err(Error(LexError::TagPair))
}

fn tag_pair(i: &[u8]) -> IResult<&[u8], Token, LexError<&[u8]>> {
    if i.first() != Some(&b'[') {
        return Err(Error(LexError::TagPair));
    }
    let rest = skip_whitespace(&i[1..]);
    let symbol_length = rest.iter().take_while(|&&b| is_symbol_char(b)).count();
    if symbol_length == 0 {
        return Err(Error(LexError::TagPair));
    }
    let (symbol, rest) = rest.split_at(symbol_length);
    let rest = skip_whitespace(rest);
    let (rest, value) = quoted_string(rest)?;
    let rest = skip_whitespace(rest);
    if rest.first() != Some(&b']') {
        return Err(Error(LexError::TagPair));
    }
    Ok((&rest[1..], Token::Tag(symbol, value)))
}

fn variation(i: &[u8]) -> IResult<&[u8], Token, LexError<&[u8]>> {
    match i.first() {
        Some(&b'(') => Ok((&i[1..], Token::StartVariation)),
        Some(&b')') => Ok((&i[1..], Token::EndVariation)),
        _ => Err(Error(LexError::Variation)),
    }
}

fn skip_whitespace(i: &[u8]) -> &[u8] {
    let n = i.iter().take_while(|&&b| is_whitespace(b)).count();
    &i[n..]
}

/// Skips a move-number indication (`12.`, `12...`) if one is present.
fn skip_move_number(i: &[u8]) -> &[u8] {
    match integer(i) {
        Ok((rest, _)) => {
            let rest = skip_whitespace(rest);
            let periods = rest.iter().take_while(|&&b| is_period(b)).count().min(3);
            skip_whitespace(&rest[periods..])
        }
        Err(_) => i,
    }
}

/// Skips a `%`-escaped line (only meaningful at line starts; tolerated anywhere).
fn skip_escape_line(i: &[u8]) -> &[u8] {
    if i.first() == Some(&b'%') {
        let n = i.iter().take_while(|&&b| b != b'\n').count();
        &i[n..]
    } else {
        i
    }
}

fn or_else<'a, Op>(
    res: IResult<&'a [u8], Token<'a>, LexError<&'a [u8]>>,
    op: Op,
) -> IResult<&'a [u8], Token<'a>, LexError<&'a [u8]>>
where
    Op: FnOnce() -> IResult<&'a [u8], Token<'a>, LexError<&'a [u8]>>,
{
    match res {
        Ok(ok) => Ok(ok),
        Err(_) => op(),
    }
}

/// Streaming tokenizer over a PGN byte slice.
pub struct Tokens<'a> {
    source: &'a [u8],
    rest: &'a [u8],
}

impl<'a> Tokens<'a> {
    pub fn new(source: &'a [u8]) -> Self {
        Tokens { source, rest: source }
    }

    fn offset_of(&self, slice: &'a [u8]) -> usize {
        self.source.len() - slice.len()
    }
}

impl<'a> Iterator for Tokens<'a> {
    type Item = Result<Spanned<'a>, LexFailure>;

    fn next(&mut self) -> Option<Self::Item> {
        let mut i = skip_whitespace(self.rest);
        // Escape lines may follow one another; skip until nothing moves.
        loop {
            let skipped = skip_whitespace(skip_escape_line(i));
            if skipped.len() == i.len() {
                break;
            }
            i = skipped;
        }
        if i.is_empty() {
            self.rest = i;
            return None;
        }

        // Game results must be tried before move numbers eat their digits.
        let offset = self.offset_of(i);
        let mut result = tag_pair(i);
        result = or_else(result, || game_result(i));
        result = or_else(result, || {
            let after_number = skip_move_number(i);
            san_move(after_number)
        });
        result = or_else(result, || variation(i));
        result = or_else(result, || comment(i));
        result = or_else(result, || nag(i));
        result = or_else(result, || annotation(i));

        match result {
            Ok((rest, token)) => {
                self.rest = rest;
                Some(Ok(Spanned { offset, token }))
            }
            Err(_) => {
                // Do not loop on the same bad bytes forever.
                self.rest = &i[i.len()..];
                Some(Err(LexFailure { offset }))
            }
        }
    }
}
