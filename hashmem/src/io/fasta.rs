use anyhow::{Context, Result};
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use crate::index::records::{RecordTable, SeqRecord, SEPARATOR_BASES};
use crate::util::dna;

/// Bases written per line when emitting FASTA.
const LINE_WIDTH: usize = 60;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FastaEvent {
    /// Header line, with the leading '>' removed.
    Header(String),
    /// One line of sequence, upper-cased, without whitespace.
    Bases(Vec<u8>),
}

#[derive(Debug, Clone)]
pub struct FastaRecord {
    pub id: String,
    pub desc: Option<String>,
    pub seq: Vec<u8>,
}

pub struct FastaReader<R: BufRead> {
    reader: R,
    buf: String,
    done: bool,
    peek_header: Option<String>,
}

impl FastaReader<BufReader<File>> {
    pub fn open(path: &Path) -> Result<Self> {
        let fh = File::open(path)
            .with_context(|| format!("cannot open FASTA file '{}'", path.display()))?;
        Ok(Self::new(BufReader::new(fh)))
    }
}

impl<R: BufRead> FastaReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            buf: String::new(),
            done: false,
            peek_header: None,
        }
    }

    /// Next header or sequence line. Empty lines are skipped.
    pub fn next_event(&mut self) -> Result<Option<FastaEvent>> {
        loop {
            if self.done {
                return Ok(None);
            }
            self.buf.clear();
            let n = self.reader.read_line(&mut self.buf)?;
            if n == 0 {
                self.done = true;
                return Ok(None);
            }
            if let Some(header) = self.buf.strip_prefix('>') {
                return Ok(Some(FastaEvent::Header(header.trim().to_string())));
            }
            let mut line = Vec::with_capacity(self.buf.len());
            for &b in self.buf.as_bytes() {
                match b {
                    b'\n' | b'\r' | b' ' | b'\t' => {}
                    _ => line.push(b.to_ascii_uppercase()),
                }
            }
            if !line.is_empty() {
                return Ok(Some(FastaEvent::Bases(line)));
            }
        }
    }

    pub fn next_record(&mut self) -> Result<Option<FastaRecord>> {
        // Find header line
        let header = match self.peek_header.take() {
            Some(h) => h,
            None => loop {
                match self.next_event()? {
                    None => return Ok(None),
                    Some(FastaEvent::Header(h)) => break h,
                    // sequence before the first header is ignored
                    Some(FastaEvent::Bases(_)) => {}
                }
            },
        };

        let (id, desc) = split_header(&header);

        let mut seq: Vec<u8> = Vec::new();
        while let Some(ev) = self.next_event()? {
            match ev {
                FastaEvent::Header(h) => {
                    self.peek_header = Some(h);
                    break;
                }
                FastaEvent::Bases(line) => seq.extend_from_slice(&line),
            }
        }

        Ok(Some(FastaRecord { id, desc, seq }))
    }
}

/// Split a header into id (first whitespace-delimited token) and description.
pub fn split_header(header: &str) -> (String, Option<String>) {
    let mut parts = header.splitn(2, char::is_whitespace);
    let id = parts.next().unwrap_or("").to_string();
    let desc = parts
        .next()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty());
    (id, desc)
}

/// Shape of a FASTA file as seen by the chunked encoder.
#[derive(Debug, Clone)]
pub struct SeqLayout {
    /// Upper bound on encoded bases: file size plus one separator per record.
    pub size_hint: u64,
    pub records: RecordTable,
}

impl SeqLayout {
    pub fn num_records(&self) -> u64 {
        self.records.len() as u64
    }
}

/// Walk a FASTA file once, collecting its size estimate and record-position table.
pub fn scan_layout(path: &Path) -> Result<SeqLayout> {
    let file_len = std::fs::metadata(path)
        .with_context(|| format!("cannot open FASTA file '{}'", path.display()))?
        .len();
    let mut reader = FastaReader::open(path)?;

    let mut records = Vec::new();
    let mut next_start = 0u64;
    while let Some(rec) = reader.next_record()? {
        let len = rec.seq.len() as u64;
        records.push(SeqRecord {
            name: rec.id,
            start: dna::bases_to_bits(next_start),
            len,
        });
        next_start += len + SEPARATOR_BASES;
    }

    let size_hint = file_len + records.len() as u64 * SEPARATOR_BASES;
    Ok(SeqLayout { size_hint, records: RecordTable::new(records) })
}

/// Write every record of `src` reverse-complemented to `dst`, keeping order and names.
pub fn write_revcomp(src: &Path, dst: &Path) -> Result<()> {
    let mut reader = FastaReader::open(src)?;
    let out = File::create(dst)
        .with_context(|| format!("cannot create reverse complement file '{}'", dst.display()))?;
    let mut out = BufWriter::new(out);

    while let Some(rec) = reader.next_record()? {
        match &rec.desc {
            Some(d) => writeln!(out, ">{} {}", rec.id, d)?,
            None => writeln!(out, ">{}", rec.id)?,
        }
        let rc = dna::revcomp(&rec.seq);
        for line in rc.chunks(LINE_WIDTH) {
            out.write_all(line)?;
            out.write_all(b"\n")?;
        }
    }
    out.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn parse_simple_fasta() {
        let data = b">chr1 first\nACgTNN\n>chr2\nAAA\n";
        let cursor = Cursor::new(&data[..]);
        let mut r = FastaReader::new(cursor);

        let r1 = r.next_record().unwrap().unwrap();
        assert_eq!(r1.id, "chr1");
        assert_eq!(r1.desc.as_deref(), Some("first"));
        assert_eq!(r1.seq, b"ACGTNN");

        let r2 = r.next_record().unwrap().unwrap();
        assert_eq!(r2.id, "chr2");
        assert_eq!(r2.desc, None);
        assert_eq!(r2.seq, b"AAA");

        assert!(r.next_record().unwrap().is_none());
    }

    #[test]
    fn parse_fasta_with_crlf_and_whitespace() {
        let data = b">chr1 desc\r\nAC g t n\r\n acgt\r\n>chr2 \r\n N N N \r\n";
        let cursor = Cursor::new(&data[..]);
        let mut r = FastaReader::new(cursor);

        let r1 = r.next_record().unwrap().unwrap();
        assert_eq!(r1.id, "chr1");
        assert_eq!(r1.desc.as_deref(), Some("desc"));
        assert_eq!(r1.seq, b"ACGTNACGT");

        let r2 = r.next_record().unwrap().unwrap();
        assert_eq!(r2.id, "chr2");
        assert_eq!(r2.seq, b"NNN");

        assert!(r.next_record().unwrap().is_none());
    }

    #[test]
    fn events_skip_blank_lines() {
        let data = b"\n\n>chr1\n\nACGT\nTT\n";
        let mut r = FastaReader::new(Cursor::new(&data[..]));
        assert_eq!(r.next_event().unwrap(), Some(FastaEvent::Header("chr1".into())));
        assert_eq!(r.next_event().unwrap(), Some(FastaEvent::Bases(b"ACGT".to_vec())));
        assert_eq!(r.next_event().unwrap(), Some(FastaEvent::Bases(b"TT".to_vec())));
        assert_eq!(r.next_event().unwrap(), None);
        assert_eq!(r.next_event().unwrap(), None);
    }

    #[test]
    fn layout_places_records_behind_separators() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("ref.fa");
        std::fs::write(&path, ">a x\nACGTA\n>b\nCC\nGG\n").unwrap();

        let layout = scan_layout(&path).unwrap();
        assert_eq!(layout.num_records(), 2);
        let a = layout.records.get(0);
        let b = layout.records.get(1);
        assert_eq!((a.name.as_str(), a.start, a.len), ("a", 0, 5));
        assert_eq!((b.name.as_str(), b.start, b.len), ("b", 30, 4));
        let file_len = std::fs::metadata(&path).unwrap().len();
        assert_eq!(layout.size_hint, file_len + 20);
    }

    #[test]
    fn revcomp_file_keeps_record_order() {
        let dir = tempfile::TempDir::new().unwrap();
        let src = dir.path().join("q.fa");
        let dst = dir.path().join("q.rc.fa");
        std::fs::write(&src, ">q1 desc\nAACG\n>q2\nTTTN\n").unwrap();

        write_revcomp(&src, &dst).unwrap();
        let text = std::fs::read_to_string(&dst).unwrap();
        assert_eq!(text, ">q1 desc\nCGTT\n>q2\nNAAA\n");
    }
}
