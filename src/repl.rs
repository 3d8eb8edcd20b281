//! Interactive SQL shell: reads statements from stdin until a
//! terminating `;`, executes them, and prints results as an ASCII
//! table or a status message.

use std::io::{self, BufRead, Write};

use crate::executor::{ExecResult, Executor};
use crate::storage::Row;

const HELP_TEXT: &str = "\nSimpleDB REPL Commands:\n  \
    .exit, .quit     - Exit the REPL\n  \
    .tables          - List all tables\n  \
    .schema <table>  - Show table schema\n  \
    .help            - Show this help message\n\nSQL Commands:\n  \
    CREATE TABLE ... - Create a new table\n  \
    DROP TABLE ...   - Drop a table\n  \
    INSERT INTO ...  - Insert a row\n  \
    SELECT ...       - Query data\n  \
    UPDATE ...       - Update rows\n  \
    DELETE FROM ...  - Delete rows\n\nEnd SQL statements with a semicolon (;)";

/// Drives the shell's read-eval-print loop against one [`Executor`].
pub struct Repl {
    executor: Executor,
    running: bool,
}

impl Repl {
    pub fn new(executor: Executor) -> Self {
        Self {
            executor,
            running: true,
        }
    }

    pub fn run(&mut self) {
        println!("{}", "=".repeat(60));
        println!("SimpleDB - Interactive SQL Shell");
        println!("{}", "=".repeat(60));
        println!("Type .help for help, .exit to quit");
        println!();

        let stdin = io::stdin();
        let mut buffer: Vec<String> = Vec::new();

        loop {
            if !self.running {
                break;
            }

            let prompt = if buffer.is_empty() { "SimpleDB> " } else { "    ...> " };
            print!("{}", prompt);
            let _ = io::stdout().flush();

            let mut input = String::new();
            match stdin.lock().read_line(&mut input) {
                Ok(0) => {
                    println!("\nGoodbye!");
                    break;
                }
                Ok(_) => {}
                Err(e) => {
                    eprintln!("Unexpected error: {}", e);
                    buffer.clear();
                    continue;
                }
            }

            let line = input.trim().to_string();
            if line.is_empty() {
                continue;
            }

            if line.starts_with('.') {
                if !buffer.is_empty() {
                    println!("Error: Cannot use special commands in multi-line mode");
                    buffer.clear();
                    continue;
                }
                self.execute_special_command(&line);
                continue;
            }

            let is_terminated = line.ends_with(';');
            buffer.push(line);

            if is_terminated {
                let sql = buffer.join(" ");
                buffer.clear();

                match self.executor.execute(&sql) {
                    ExecResult::Rows { columns, rows, .. } => print_table(&columns, &rows),
                    ExecResult::Message(msg) => println!("{}", msg),
                    ExecResult::Error(err) => println!("Error: {}", err),
                }
                println!();
            }
        }
    }

    /// Handle a `.`-prefixed shell command. Returns whether it was
    /// recognized (every unrecognized line is silently ignored, same
    /// as falling through to nothing happening).
    fn execute_special_command(&mut self, command: &str) -> bool {
        let command = command.trim();

        if command == ".exit" || command == ".quit" {
            println!("Goodbye!");
            self.running = false;
            return true;
        }

        if command == ".tables" {
            let tables = self.executor.database().list_tables();
            if tables.is_empty() {
                println!("No tables found.");
            } else {
                println!("Tables:");
                for table in tables {
                    println!("  - {}", table);
                }
            }
            return true;
        }

        if let Some(rest) = command.strip_prefix(".schema") {
            let table_name = rest.trim();
            if table_name.is_empty() {
                println!("Usage: .schema <table_name>");
                return true;
            }
            match self.executor.database().get_table(table_name) {
                Ok(table) => {
                    println!("\nTable: {}", table.name);
                    println!("Columns:");
                    for col in &table.columns {
                        let mut def = format!("  - {} {}", col.name, col.data_type);
                        if col.data_type == crate::types::DataType::Varchar {
                            def.push_str(&format!("({})", col.varchar_length()));
                        }
                        if !col.constraints.is_empty() {
                            let constraints: Vec<String> =
                                col.constraints.iter().map(|c| c.to_string()).collect();
                            def.push_str(&format!(" [{}]", constraints.join(", ")));
                        }
                        println!("{}", def);
                    }
                }
                Err(err) => println!("Error: {}", err),
            }
            return true;
        }

        if command == ".help" {
            println!("{}", HELP_TEXT);
            return true;
        }

        false
    }
}

fn print_table(columns: &[String], rows: &[Row]) {
    if rows.is_empty() {
        println!("0 row(s) selected.");
        return;
    }

    let mut widths: Vec<usize> = columns.iter().map(|c| c.chars().count()).collect();
    let rendered: Vec<Vec<String>> = rows
        .iter()
        .map(|row| {
            columns
                .iter()
                .map(|col| match row.get(col) {
                    Some(value) if !value.is_null() => value.render(),
                    _ => "NULL".to_string(),
                })
                .collect()
        })
        .collect();

    for row in &rendered {
        for (i, cell) in row.iter().enumerate() {
            widths[i] = widths[i].max(cell.chars().count());
        }
    }

    let border = format!(
        "+{}+",
        widths
            .iter()
            .map(|w| "-".repeat(w + 2))
            .collect::<Vec<_>>()
            .join("+")
    );

    println!("{}", border);
    let header = columns
        .iter()
        .zip(&widths)
        .map(|(c, w)| format!(" {:<width$} ", c, width = w))
        .collect::<Vec<_>>()
        .join("|");
    println!("|{}|", header);
    println!("{}", border);

    for row in &rendered {
        let line = row
            .iter()
            .zip(&widths)
            .map(|(cell, w)| format!(" {:<width$} ", cell, width = w))
            .collect::<Vec<_>>()
            .join("|");
        println!("|{}|", line);
    }

    println!("{}", border);
    println!("{} row(s) selected.", rows.len());
}
