//! SimpleDB CLI - an interactive shell for the embeddable SQL engine.

use simpledb::executor::Executor;
use simpledb::repl::Repl;
use simpledb::storage::Database;

fn main() {
    let mut args = std::env::args().skip(1);
    let db_file = args.next().unwrap_or_else(|| "simpledb.json".to_string());

    let db = match Database::open(&db_file) {
        Ok(db) => db,
        Err(e) => {
            eprintln!("Failed to open '{}': {}", db_file, e);
            std::process::exit(1);
        }
    };

    Repl::new(Executor::new(db)).run();
}
