//! # Commands
//!
//! One module per subcommand.
//!
//! ```text
//! commands/
//! ├── mod.rs      ◄─── shared summary printer
//! ├── import.rs   ◄─── feed export → SQLite
//! ├── scan.rs     ◄─── detect, summary, .txt / JSON
//! └── purge.rs    ◄─── delete selected duplicates, scan again
//! ```
//!
//! Every command writes operator output to the `out` it is given and logs
//! through `tracing`, which goes to stderr.

mod import;
mod purge;
mod scan;

pub use import::{import, ImportSummary, RecordKind, SkippedRecord};
pub use purge::purge;
pub use scan::{detect, scan};

use std::io::Write;

use saleguard_core::DuplicateDetectionResult;

/// Prints totals and one line per group, numbered as `purge --group` expects.
pub fn print_summary(out: &mut dyn Write, result: &DuplicateDetectionResult) -> std::io::Result<()> {
    writeln!(out, "Vendas analisadas: {}", result.total_sales)?;
    writeln!(out, "Grupos de duplicatas: {}", result.duplicate_groups.len())?;
    writeln!(out, "Duplicatas: {}", result.total_duplicates)?;
    writeln!(out, "Perda estimada: {}", result.estimated_loss)?;

    for (index, group) in result.duplicate_groups.iter().enumerate() {
        let ids: Vec<&str> = group.duplicates.iter().map(|s| s.id.as_str()).collect();
        writeln!(
            out,
            "  {}. [{}] {} ({}) -> {}",
            index + 1,
            group.confidence,
            group.original_sale.id,
            group.original_sale.total(),
            ids.join(", ")
        )?;
    }

    Ok(())
}
