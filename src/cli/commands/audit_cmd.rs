//! `rotavault audit` — view the audit log.

use crate::cli::Cli;
use crate::errors::{Result, RotaVaultError};

/// Execute the `audit` command.
#[cfg(feature = "audit-log")]
pub fn execute(cli: &Cli, last: usize, since: Option<&str>) -> Result<()> {
    use comfy_table::{ContentArrangement, Table};

    use crate::audit::AuditLog;
    use crate::cli::output;

    let cwd = std::env::current_dir()?;
    let store_dir = cwd.join(&cli.store_dir);

    let audit = AuditLog::open(&store_dir).ok_or_else(|| {
        RotaVaultError::AuditError(format!(
            "could not open audit database in {}",
            store_dir.display()
        ))
    })?;

    let since_ts = since.map(parse_since).transpose()?;
    let entries = audit.query(last, since_ts)?;

    if entries.is_empty() {
        output::info("No audit entries found.");
        return Ok(());
    }

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Time", "Operation", "Store", "Record", "Details"]);

    for e in &entries {
        table.add_row(vec![
            e.timestamp.format("%Y-%m-%d %H:%M:%S").to_string(),
            e.operation.clone(),
            e.store.clone(),
            e.record_label.clone().unwrap_or_default(),
            e.details.clone().unwrap_or_default(),
        ]);
    }

    println!("{table}");
    Ok(())
}

#[cfg(not(feature = "audit-log"))]
pub fn execute(_cli: &Cli, _last: usize, _since: Option<&str>) -> Result<()> {
    Err(RotaVaultError::AuditError(
        "this binary was compiled without the audit-log feature".into(),
    ))
}

/// Parse a relative duration like `7d`, `24h`, or `30m` into the
/// corresponding cutoff timestamp.
#[cfg(feature = "audit-log")]
fn parse_since(spec: &str) -> Result<chrono::DateTime<chrono::Utc>> {
    use chrono::{Duration, Utc};

    let spec = spec.trim();
    let (number, unit) = spec.split_at(spec.len().saturating_sub(1));
    let amount: i64 = number
        .parse()
        .map_err(|_| RotaVaultError::CommandFailed(format!("invalid duration '{spec}'")))?;

    let duration = match unit {
        "d" => Duration::days(amount),
        "h" => Duration::hours(amount),
        "m" => Duration::minutes(amount),
        _ => {
            return Err(RotaVaultError::CommandFailed(format!(
                "invalid duration '{spec}' — use a number followed by d, h, or m"
            )))
        }
    };

    Ok(Utc::now() - duration)
}
