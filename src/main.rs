use std::process::exit;

use repertoire_tree::{render_context, rows_for, Address, BoardConfig, Repertoire};

fn usage() -> ! {
    eprintln!("usage: repertoire-tree <pgn-file> [depth variation]");
    exit(2);
}

fn main() {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let path = match args.next() {
        Some(path) => path,
        None => usage(),
    };
    let address = match (args.next(), args.next()) {
        (Some(depth), Some(variation)) => match (depth.parse(), variation.parse()) {
            (Ok(depth), Ok(variation)) => Address::new(depth, variation),
            _ => usage(),
        },
        (None, _) => Address::ROOT,
        _ => usage(),
    };

    let pgn = match std::fs::read_to_string(&path) {
        Ok(pgn) => pgn,
        Err(err) => {
            eprintln!("cannot read {}: {}", path, err);
            exit(1);
        }
    };

    let repertoire = Repertoire::new();
    if let Err(err) = repertoire.load_str(&pgn) {
        eprintln!("cannot load {}: {}", path, err);
        exit(1);
    }
    let tree = match repertoire.snapshot() {
        Some(tree) => tree,
        None => unreachable!("load_str succeeded"),
    };

    // A stale or truncated deep link falls back to the root.
    let node = tree.resolve(address).unwrap_or_else(|err| {
        eprintln!("{}; showing the initial position", err);
        tree.root()
    });

    let context = render_context(node, &BoardConfig::default());
    println!("{}  {}", node.address().path(), context.fen);
    if !context.movetext.is_empty() {
        println!("{} {}", context.movetext, context.post_comment);
    }
    println!();

    for row in rows_for(&tree, node) {
        let mainline = row
            .mainline
            .as_ref()
            .map(|cell| format!("{} -> {}", cell.movetext, cell.address.path()))
            .unwrap_or_else(|| "(end of line)".to_owned());
        print!("{:<32}", mainline);
        for cell in &row.alternatives {
            print!("  {} -> {}", cell.movetext, cell.address.path());
        }
        if row.hidden_alternatives > 0 {
            print!("  +{} more", row.hidden_alternatives);
        }
        println!();
    }
}
