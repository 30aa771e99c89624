//! Colored terminal output helpers.
//!
//! All user-facing output goes through these functions so we get
//! consistent styling across every command.  `ConsoleReporter` is the
//! reporter the `rotate` command wires into the coordinator; every
//! write is best-effort so a broken terminal can never abort a
//! rotation.

use std::time::Duration;

use comfy_table::{ContentArrangement, Table};
use console::{style, Term};

use crate::errors::RotaVaultError;
use crate::report::RotationReporter;
use crate::store::RecordMetadata;

/// Print a green success message: "check_mark {msg}"
pub fn success(msg: &str) {
    println!("{} {}", style("\u{2713}").green().bold(), msg);
}

/// Print a red error message: "x_mark {msg}"
pub fn error(msg: &str) {
    eprintln!("{} {}", style("\u{2717}").red().bold(), msg);
}

/// Print a yellow warning: "warning_sign {msg}"
pub fn warning(msg: &str) {
    eprintln!("{} {}", style("\u{26a0}").yellow().bold(), msg);
}

/// Print a blue info message: "info_sign {msg}"
pub fn info(msg: &str) {
    println!("{} {}", style("\u{2139}").blue().bold(), msg);
}

/// Print a dim tip/hint: "arrow {msg}"
pub fn tip(msg: &str) {
    println!("{} {}", style("\u{2192}").dim(), style(msg).dim());
}

/// Print a table of record metadata (Id, Label, Created, Updated).
pub fn print_records_table(records: &[RecordMetadata]) {
    if records.is_empty() {
        info("No records in this store yet.");
        tip("Run `rotavault add <LABEL>` to add your first record.");
        return;
    }

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Id", "Label", "Created", "Updated"]);

    for r in records {
        table.add_row(vec![
            r.id.to_string(),
            r.label.clone(),
            r.created_at.format("%Y-%m-%d %H:%M:%S").to_string(),
            r.updated_at.format("%Y-%m-%d %H:%M:%S").to_string(),
        ]);
    }

    println!("{table}");
}

/// Reporter that renders rotation progress on stderr.
pub struct ConsoleReporter;

impl RotationReporter for ConsoleReporter {
    fn on_progress(&self, processed: u64, total: u64) {
        let term = Term::stderr();
        let _ = term.clear_line();
        let _ = term.write_str(&format!("Re-encrypting records… {processed}/{total}"));
    }

    fn on_completed(&self, total: u64, elapsed: Duration) {
        let term = Term::stderr();
        let _ = term.clear_line();
        success(&format!(
            "Rotation complete: {total} records re-encrypted in {elapsed:.2?}"
        ));
    }

    fn on_aborted(&self, err: &RotaVaultError) {
        let term = Term::stderr();
        let _ = term.clear_line();
        error(&format!("Rotation aborted ({}): {err}", err.kind()));
    }
}
