//! CSV export of the coalition table.
//!
//! One block per analysis iteration: `Coalition ID`, one payoff column per
//! player, `Value(Coalition)`, rows sorted by coalition id ascending. Only
//! the first block carries the header; every later block is preceded by a
//! blank separator row. Output is deterministic, so identical runs produce
//! byte-identical files.

use std::fs::OpenOptions;
use std::path::Path;

use anyhow::{Context, Result};
use cft_core::CipId;

use crate::evaluator::Evaluation;

/// Write (or append) one iteration block of the coalition table.
///
/// With `first_block` the file is truncated and the header written;
/// otherwise the block is appended behind a blank separator row.
pub fn append_coalition_csv(path: &Path, eval: &Evaluation, first_block: bool) -> Result<()> {
    let file = if first_block {
        OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(path)
    } else {
        OpenOptions::new().append(true).open(path)
    }
    .with_context(|| format!("opening CSV file {}", path.display()))?;

    // Separator rows are shorter than data rows, so the writer must accept
    // varying record lengths.
    let mut wtr = csv::WriterBuilder::new().flexible(true).from_writer(file);
    let n = eval.num_players();

    if first_block {
        let mut header = vec!["Coalition ID".to_string()];
        for p in 0..n {
            header.push(format!("Payoff(CIP {p})"));
        }
        header.push("Value(Coalition)".to_string());
        wtr.write_record(&header).context("writing CSV header")?;
    } else {
        wtr.write_record(vec![""; n + 1])
            .context("writing CSV block separator")?;
    }

    for (id, info) in &eval.infos {
        let mut record = vec![id.value().to_string()];
        for p in 0..n {
            record.push(info.payoff_of(CipId(p)).unwrap_or(0.0).to_string());
        }
        record.push(info.value.to_string());
        wtr.write_record(&record).context("writing CSV record")?;
    }

    wtr.flush().context("flushing CSV writer")?;
    Ok(())
}
