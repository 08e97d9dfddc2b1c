use anyhow::Result;
use std::io::Write;

use crate::config::{Polarity, RunParams};
use crate::index::records::SeqRecord;
use crate::mem::MemReport;
use crate::sink::finalize::MemHit;

/// Renders a [`MemReport`] in MUMmer's match-list format.
///
/// Every query record gets a header (`> name`, optionally ` Reverse` and
/// ` Len = n`), followed by one line per match with 1-based positions.
/// The reference name column is printed when the reference holds more than
/// one record or when four-column output is forced.
pub struct MummerWriter<W: Write> {
    out: W,
    four_col: bool,
    rel_query_pos: bool,
    len_in_header: bool,
}

impl<W: Write> MummerWriter<W> {
    pub fn new(out: W, params: &RunParams) -> Self {
        Self::with_options(out, params.four_col, params.rel_query_pos, params.len_in_header)
    }

    pub fn with_options(out: W, four_col: bool, rel_query_pos: bool, len_in_header: bool) -> Self {
        Self { out, four_col, rel_query_pos, len_in_header }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    pub fn write_report(&mut self, report: &MemReport) -> Result<()> {
        let four_col = self.four_col || report.references.len() != 1;
        let mut cursors = vec![0usize; report.strands.len()];

        for (qi, query) in report.queries.iter().enumerate() {
            for (strand, cursor) in report.strands.iter().zip(cursors.iter_mut()) {
                self.write_header(query, strand.polarity)?;
                while let Some(hit) = strand.hits.get(*cursor).filter(|h| h.query_record == qi) {
                    let name = &report.references.get(hit.ref_record).name;
                    self.write_hit(hit, name, query, strand.polarity, four_col)?;
                    *cursor += 1;
                }
            }
        }
        self.out.flush()?;
        Ok(())
    }

    fn write_header(&mut self, query: &SeqRecord, polarity: Polarity) -> Result<()> {
        write!(self.out, "> {}", query.name)?;
        if polarity == Polarity::Reverse {
            write!(self.out, " Reverse")?;
        }
        if self.len_in_header {
            write!(self.out, " Len = {}", query.len)?;
        }
        writeln!(self.out)?;
        Ok(())
    }

    fn write_hit(
        &mut self,
        hit: &MemHit,
        ref_name: &str,
        query: &SeqRecord,
        polarity: Polarity,
        four_col: bool,
    ) -> Result<()> {
        let ref_pos = hit.ref_start + 1;
        let query_pos = if polarity == Polarity::Reverse && self.rel_query_pos {
            query.len - hit.query_start
        } else {
            hit.query_start + 1
        };
        if four_col {
            writeln!(self.out, " {:<30}{:<15}{:<15}{:<15}", ref_name, ref_pos, query_pos, hit.len)?;
        } else {
            writeln!(self.out, " {:>15}{:>15}{:>15}", ref_pos, query_pos, hit.len)?;
        }
        Ok(())
    }
}
