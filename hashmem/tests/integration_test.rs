use std::path::{Path, PathBuf};

use hashmem::config::{MemOpt, Polarity, StrandMode};
use hashmem::io::mummer::MummerWriter;
use hashmem::mem::{find_mems, MemReport};
use hashmem::sink::finalize::MemHit;
use hashmem::util::dna;
use tempfile::TempDir;

fn random_bases(len: usize, seed: u32) -> Vec<u8> {
    let bases = [b'A', b'C', b'G', b'T'];
    let mut x = seed;
    (0..len)
        .map(|_| {
            x = x.wrapping_mul(1_103_515_245).wrapping_add(12_345);
            bases[(x >> 16) as usize % 4]
        })
        .collect()
}

fn write_fasta(dir: &Path, name: &str, records: &[(&str, &[u8])]) -> PathBuf {
    let path = dir.join(name);
    let mut text = String::new();
    for (id, seq) in records {
        text.push('>');
        text.push_str(id);
        text.push('\n');
        for line in seq.chunks(60) {
            text.push_str(std::str::from_utf8(line).unwrap());
            text.push('\n');
        }
    }
    std::fs::write(&path, text).unwrap();
    path
}

fn opt(tmp: &TempDir, min_len: u64) -> MemOpt {
    MemOpt { min_len, work_prefix: Some(tmp.path().to_path_buf()), ..Default::default() }
}

fn forward_hits(report: &MemReport) -> &[MemHit] {
    assert_eq!(report.strands[0].polarity, Polarity::Forward);
    &report.strands[0].hits
}

fn render(report: &MemReport, opt: &MemOpt) -> String {
    let params = opt.resolve().unwrap();
    let mut w = MummerWriter::new(Vec::new(), &params);
    w.write_report(report).unwrap();
    String::from_utf8(w.into_inner()).unwrap()
}

#[test]
fn identical_sequences_give_one_full_length_match() {
    let tmp = TempDir::new().unwrap();
    let seq = b"AAAAACCCCCGGGGGTTTTT";
    let r = write_fasta(tmp.path(), "ref.fa", &[("ref", seq)]);
    let q = write_fasta(tmp.path(), "qry.fa", &[("qry", seq)]);
    let o = MemOpt { seed_len: Some(4), ..opt(&tmp, 10) };

    let report = find_mems(&o, &r, &q).unwrap();
    let hits = forward_hits(&report);
    assert_eq!(hits, &[MemHit { ref_record: 0, query_record: 0, ref_start: 0, query_start: 0, len: 20 }]);
    assert_eq!(render(&report, &o), format!("> qry\n {:>15}{:>15}{:>15}\n", 1, 1, 20));
}

#[test]
fn unrelated_sequences_give_empty_output() {
    let tmp = TempDir::new().unwrap();
    let r = write_fasta(tmp.path(), "ref.fa", &[("ref", &[b'A'; 30])]);
    let q = write_fasta(tmp.path(), "qry.fa", &[("q1", &[b'C'; 30]), ("q2", &[b'G'; 12])]);
    let o = opt(&tmp, 10);

    let report = find_mems(&o, &r, &q).unwrap();
    assert_eq!(report.total_hits(), 0);
    assert_eq!(render(&report, &o), "> q1\n> q2\n");
}

#[test]
fn work_directory_is_removed_after_run() {
    let tmp = TempDir::new().unwrap();
    let r = write_fasta(tmp.path(), "ref.fa", &[("ref", &random_bases(100, 1))]);
    let q = write_fasta(tmp.path(), "qry.fa", &[("qry", &random_bases(100, 2))]);
    let o = MemOpt { strand: StrandMode::Both, ..opt(&tmp, 20) };
    find_mems(&o, &r, &q).unwrap();

    let leftovers: Vec<_> = std::fs::read_dir(tmp.path())
        .unwrap()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_name().to_string_lossy().ends_with("_tmp"))
        .collect();
    assert!(leftovers.is_empty());
}

/// 60 碱基的共享片段跨过参考序列的分块边界（base 107）
fn planted_pair(tmp: &TempDir) -> (PathBuf, PathBuf) {
    let planted = random_bases(60, 77);
    let mut r = random_bases(200, 3);
    let mut q = random_bases(200, 4);
    r[80..140].copy_from_slice(&planted);
    q[50..110].copy_from_slice(&planted);
    r[79] = b'A';
    q[49] = b'C';
    r[140] = b'A';
    q[110] = b'C';
    // 单行写出，使文件大小（进而块大小）固定
    let rp = tmp.path().join("ref.fa");
    let qp = tmp.path().join("qry.fa");
    std::fs::write(&rp, [b">r\n".as_slice(), &r, b"\n"].concat()).unwrap();
    std::fs::write(&qp, [b">q\n".as_slice(), &q, b"\n"].concat()).unwrap();
    (rp, qp)
}

#[test]
fn match_across_chunk_boundary_is_merged() {
    let tmp = TempDir::new().unwrap();
    let (r, q) = planted_pair(&tmp);
    let expected = [MemHit { ref_record: 0, query_record: 0, ref_start: 80, query_start: 50, len: 60 }];

    let whole = find_mems(&opt(&tmp, 20), &r, &q).unwrap();
    assert_eq!(forward_hits(&whole), &expected);

    let split = find_mems(&MemOpt { split: 2, ..opt(&tmp, 20) }, &r, &q).unwrap();
    assert_eq!(forward_hits(&split), &expected);
}

#[test]
fn masked_ns_split_a_match() {
    let tmp = TempDir::new().unwrap();
    let mut seq = random_bases(30, 11);
    seq.extend_from_slice(b"NNNNN");
    seq.extend_from_slice(&random_bases(30, 12));
    let r = write_fasta(tmp.path(), "ref.fa", &[("ref", &seq)]);
    let q = write_fasta(tmp.path(), "qry.fa", &[("qry", &seq)]);
    let o = MemOpt { mask_n: true, ..opt(&tmp, 20) };

    let report = find_mems(&o, &r, &q).unwrap();
    assert_eq!(
        forward_hits(&report),
        &[
            MemHit { ref_record: 0, query_record: 0, ref_start: 0, query_start: 0, len: 30 },
            MemHit { ref_record: 0, query_record: 0, ref_start: 35, query_start: 35, len: 30 },
        ]
    );
}

#[test]
fn match_reported_against_second_reference_record() {
    let tmp = TempDir::new().unwrap();
    let r1 = random_bases(40, 21);
    let r2 = random_bases(40, 22);
    let r = write_fasta(tmp.path(), "ref.fa", &[("chr1", &r1), ("chr2", &r2)]);
    let q = write_fasta(tmp.path(), "qry.fa", &[("read", &r2[5..35])]);
    let o = opt(&tmp, 20);

    let report = find_mems(&o, &r, &q).unwrap();
    assert_eq!(
        forward_hits(&report),
        &[MemHit { ref_record: 1, query_record: 0, ref_start: 5, query_start: 0, len: 30 }]
    );
    assert_eq!(render(&report, &o), format!("> read\n {:<30}{:<15}{:<15}{:<15}\n", "chr2", 6, 1, 30));
}

#[test]
fn reverse_complement_strand() {
    let tmp = TempDir::new().unwrap();
    let reference = random_bases(100, 31);
    let query = dna::revcomp(&reference[10..60]);
    let r = write_fasta(tmp.path(), "ref.fa", &[("ref", &reference)]);
    let q = write_fasta(tmp.path(), "qry.fa", &[("qry", &query)]);
    let o = MemOpt { strand: StrandMode::Both, rel_query_pos: true, len_in_header: true, ..opt(&tmp, 20) };

    let report = find_mems(&o, &r, &q).unwrap();
    assert_eq!(report.strands.len(), 2);
    assert_eq!(report.strands[1].polarity, Polarity::Reverse);
    let rc_hits = &report.strands[1].hits;
    assert!(rc_hits.contains(&MemHit { ref_record: 0, query_record: 0, ref_start: 10, query_start: 0, len: 50 }));

    let text = render(&report, &o);
    assert!(text.starts_with("> qry Len = 50\n"));
    assert!(text.contains("> qry Reverse Len = 50\n"));
    assert!(text.contains(&format!(" {:>15}{:>15}{:>15}\n", 11, 50, 50)));
}

/// 参考中取三段拼成查询，中间插入无关序列
fn mosaic_pair(tmp: &TempDir) -> (PathBuf, PathBuf) {
    let reference = random_bases(3000, 41);
    let mut query = reference[100..400].to_vec();
    query.extend_from_slice(&random_bases(50, 42));
    query.extend_from_slice(&reference[1000..1200]);
    query.extend_from_slice(&random_bases(50, 43));
    query.extend_from_slice(&reference[2500..2600]);
    let r = write_fasta(tmp.path(), "ref.fa", &[("ref", &reference)]);
    let q = write_fasta(tmp.path(), "qry.fa", &[("qry", &query)]);
    (r, q)
}

#[test]
fn thread_count_does_not_change_results() {
    let tmp = TempDir::new().unwrap();
    let (r, q) = mosaic_pair(&tmp);
    let single = find_mems(&opt(&tmp, 40), &r, &q).unwrap();
    let multi = find_mems(&MemOpt { threads: 3, ..opt(&tmp, 40) }, &r, &q).unwrap();
    assert!(single.total_hits() >= 3);
    assert_eq!(single.strands, multi.strands);
}

#[test]
fn splitting_does_not_change_results() {
    let tmp = TempDir::new().unwrap();
    let (r, q) = mosaic_pair(&tmp);
    let whole = find_mems(&opt(&tmp, 40), &r, &q).unwrap();
    let split = find_mems(&MemOpt { split: 3, threads: 2, ..opt(&tmp, 40) }, &r, &q).unwrap();
    assert_eq!(whole.strands, split.strands);
}

#[test]
fn configuration_errors_fail_before_reading_inputs() {
    let tmp = TempDir::new().unwrap();
    let missing = tmp.path().join("missing.fa");
    let bad = MemOpt { min_len: 1, ..opt(&tmp, 1) };
    let err = find_mems(&bad, &missing, &missing).unwrap_err();
    assert!(err.to_string().contains("minimum match length"));

    let err = find_mems(&opt(&tmp, 20), &missing, &missing).unwrap_err();
    assert!(err.to_string().contains("missing.fa"));
}
