//! End-to-end checks of the engine's observable guarantees: every address
//! resolves back to its node, every FEN is reachable by replaying the root
//! path under the rules of chess, and table rows stay within their caps.

use pretty_assertions::assert_eq;
use shakmaty::fen::Fen;
use shakmaty::san::San;
use shakmaty::{Chess, EnPassantMode, Position};

use repertoire_tree::{rows_for, Address, GameTree, QueryError, Repertoire};

const REPERTOIRE: &str = "\
[Event \"demo repertoire\"]

1. e4 {king's pawn} e5 (1... c5 {the sicilian} 2. Nf3 (2. c3 d5) 2... d6 3. d4)
(1... e6 2. d4 d5) 2. Nf3 Nc6 (2... Nf6 {petroff} 3. Nxe5 d6) 3. Bb5 a6
(3... Nf6) 4. Ba4 *
";

fn fen_of(pos: &Chess) -> String {
    Fen::from_position(pos.clone(), EnPassantMode::Legal).to_string()
}

#[test]
fn every_fen_is_reachable_by_replaying_the_root_path() {
    let tree = GameTree::from_pgn(REPERTOIRE).unwrap();

    for node in tree.iter() {
        let mut pos = Chess::default();
        for id in tree.path_to(node.id()) {
            if let Some(ply) = tree.node(id).ply() {
                let san: San = ply.san.parse().unwrap();
                let m = san.to_move(&pos).unwrap();
                pos.play_unchecked(&m);
            }
        }
        assert_eq!(fen_of(&pos), node.fen, "at {}", node.address().path());
    }
}

#[test]
fn address_round_trip_for_every_node() {
    let tree = GameTree::from_pgn(REPERTOIRE).unwrap();
    for node in tree.iter() {
        assert_eq!(tree.resolve(node.address()).unwrap().id(), node.id());
    }
}

#[test]
fn reset_address_is_the_initial_position() {
    for pgn in ["1. e4", REPERTOIRE, "1. d4 d5 2. c4"] {
        let tree = GameTree::from_pgn(pgn).unwrap();
        let root = tree.resolve(Address::new(0, 0)).unwrap();
        assert_eq!(root.address(), Address::ROOT);
        assert_eq!(
            root.fen,
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1"
        );
    }
}

#[test]
fn rows_never_exceed_the_alternative_cap() {
    let tree = GameTree::from_pgn(REPERTOIRE).unwrap();
    for node in tree.iter() {
        for row in rows_for(&tree, node) {
            assert!(row.alternatives.len() <= repertoire_tree::MAX_ALTERNATIVES);
            for cell in &row.alternatives {
                assert!(tree.resolve(cell.address).is_ok());
            }
        }
    }
}

#[test]
fn row_count_is_shown_plus_hidden() {
    let tree = GameTree::from_pgn(
        "1. e4 (1. d4) (1. c4) (1. Nf3) (1. b3) (1. g3) (1. f4) (1. Nc3) (1. b4) (1. d3) e5",
    )
    .unwrap();
    let row = rows_for(&tree, tree.root()).next().unwrap();
    assert_eq!(row.alternatives.len() + row.hidden_alternatives, 9);
    assert_eq!(row.alternatives.len(), 8);
    assert_eq!(row.hidden_alternatives, 1);
}

#[test]
fn reload_of_unchanged_source_is_structurally_identical() {
    let a = GameTree::from_pgn(REPERTOIRE).unwrap();
    let b = GameTree::from_pgn(REPERTOIRE).unwrap();
    assert_eq!(a.len(), b.len());
    for (left, right) in a.iter().zip(b.iter()) {
        assert_eq!(left.address(), right.address());
        assert_eq!(left.fen, right.fen);
    }
}

#[test]
fn first_alternative_is_a_sibling_of_the_main_move() {
    let tree = GameTree::from_pgn("1. e4 (1. d4) 1... e5").unwrap();
    let e4 = tree.resolve(Address::new(1, 0)).unwrap();
    assert_eq!(e4.ply().unwrap().san, "e4");
    let d4 = tree.node(tree.root().alternatives()[0]);
    assert_eq!(d4.ply().unwrap().san, "d4");
    assert_eq!(d4.address().depth, 1);
    assert_ne!(d4.address().variation, 0);
    let e5 = tree.node(e4.main().unwrap());
    assert_eq!(e5.ply().unwrap().san, "e5");
}

#[test]
fn malformed_load_keeps_previous_tree_queryable() {
    let repertoire = Repertoire::new();
    repertoire.load_str(REPERTOIRE).unwrap();
    let version = repertoire.version();

    assert!(repertoire.load_str("1. e4 (1. d4 d5").is_err());

    assert_eq!(repertoire.version(), version);
    let tree = repertoire.snapshot().unwrap();
    let e4 = tree.resolve(Address::new(1, 0)).unwrap();
    assert_eq!(e4.ply().unwrap().san, "e4");
}

#[test]
fn out_of_bounds_addresses_are_errors_not_panics() {
    let tree = GameTree::from_pgn(REPERTOIRE).unwrap();
    assert_eq!(
        tree.resolve(Address::new(999, 0)).unwrap_err(),
        QueryError::AddressNotFound { depth: 999, variation: 0 }
    );
    assert_eq!(
        tree.resolve(Address::new(1, 999)).unwrap_err(),
        QueryError::AddressNotFound { depth: 1, variation: 999 }
    );
}

#[test]
fn concurrent_readers_across_a_reload() {
    use std::sync::Arc;

    let repertoire = Arc::new(Repertoire::new());
    repertoire.load_str(REPERTOIRE).unwrap();

    let readers: Vec<_> = (0..4)
        .map(|_| {
            let repertoire = Arc::clone(&repertoire);
            std::thread::spawn(move || {
                for _ in 0..200 {
                    let tree = repertoire.snapshot().unwrap();
                    let root = tree.resolve(Address::ROOT).unwrap();
                    assert_eq!(root.address(), Address::ROOT);
                    let _ = rows_for(&tree, root).count();
                }
            })
        })
        .collect();

    for _ in 0..20 {
        repertoire.load_str("1. d4 d5 2. c4 (2. Nf3)").unwrap();
        repertoire.load_str(REPERTOIRE).unwrap();
    }

    for reader in readers {
        reader.join().unwrap();
    }
}
