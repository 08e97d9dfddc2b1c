use anyhow::{Context, Result};
use chrono::Utc;
use rayon::{ThreadPool, ThreadPoolBuilder};
use std::path::Path;
use tracing::{debug, info};

use super::scan::scan_chunk_pair;
use crate::config::{MemOpt, Polarity, RunParams};
use crate::index::encoded::EncodedSequence;
use crate::index::kmer_hash::KmerHashIndex;
use crate::index::records::RecordTable;
use crate::io::fasta::{scan_layout, write_revcomp, FastaReader, SeqLayout};
use crate::io::workdir::WorkDir;
use crate::sink::finalize::{restore, StrandHits};
use crate::sink::{shard_span, ChunkContext, ShardedRecordSink};

/// 模糊碱基随机替换所用的种子；参考与两条查询链各不相同，保证结果可复现
const REFERENCE_RNG_SEED: u64 = 0x5EED_0000_0000_0011;
const QUERY_RNG_SEED: u64 = 0x5EED_0000_0000_0022;
const REVERSE_QUERY_RNG_SEED: u64 = 0x5EED_0000_0000_0033;

/// 一次运行的全部结果
#[derive(Debug, Clone)]
pub struct MemReport {
    pub references: RecordTable,
    pub queries: RecordTable,
    /// 按输出顺序（正链在前）
    pub strands: Vec<StrandHits>,
}

impl MemReport {
    pub fn total_hits(&self) -> usize {
        self.strands.iter().map(|s| s.hits.len()).sum()
    }
}

struct Inputs<'a> {
    reference: &'a Path,
    ref_layout: &'a SeqLayout,
    query_layout: &'a SeqLayout,
}

/// 在参考序列与查询序列之间查找全部不短于最小长度的最大精确匹配。
pub fn find_mems(opt: &MemOpt, reference: &Path, query: &Path) -> Result<MemReport> {
    let params = opt.resolve()?;
    let started = Utc::now();
    info!(
        reference = %reference.display(),
        query = %query.display(),
        min_len = params.min_len_bases(),
        seed_len = params.seed_bits / 2,
        split = params.split,
        threads = params.threads,
        started = %started.to_rfc3339(),
        "searching for maximal exact matches"
    );

    let ref_layout = scan_layout(reference)?;
    let query_layout = scan_layout(query)?;
    info!(
        reference_records = ref_layout.num_records(),
        query_records = query_layout.num_records(),
        "inputs scanned"
    );

    let workdir = WorkDir::create(&params.work_prefix)?;
    let pool = ThreadPoolBuilder::new()
        .num_threads(params.threads)
        .build()
        .context("cannot build worker thread pool")?;

    let query_chunk_bases = query_layout.size_hint / params.split;
    let sink = ShardedRecordSink::create(
        workdir.path(),
        shard_span(query_chunk_bases, params.split, query_layout.num_records()),
        params.min_len_bits,
        params.is_parallel(),
        params.strand,
    )?;

    let inputs = Inputs { reference, ref_layout: &ref_layout, query_layout: &query_layout };
    for &polarity in params.strand.polarities() {
        let query_path = match polarity {
            Polarity::Forward => query.to_path_buf(),
            Polarity::Reverse => {
                let rc = workdir.path().join("query.rc.fa");
                write_revcomp(query, &rc)?;
                rc
            }
        };
        let reported = run_strand(&pool, &params, &inputs, &query_path, &sink, polarity)?;
        let merged = if params.is_parallel() { sink.merge_boundary(polarity)? } else { 0 };
        info!(?polarity, reported, boundary_merged = merged, "strand finished");
    }

    let strands: Vec<StrandHits> = sink
        .finalize()?
        .into_iter()
        .map(|(polarity, records)| {
            restore(polarity, &records, &ref_layout.records, &query_layout.records, params.min_len_bits)
        })
        .collect();
    drop(workdir);

    let report = MemReport { references: ref_layout.records, queries: query_layout.records, strands };
    let elapsed = Utc::now() - started;
    info!(
        matches = report.total_hits(),
        elapsed_ms = elapsed.num_milliseconds(),
        "done"
    );
    Ok(report)
}

/// 对一条查询链：逐个参考块建索引，再逐个查询块扫描
fn run_strand(
    pool: &ThreadPool,
    params: &RunParams,
    inputs: &Inputs<'_>,
    query_path: &Path,
    sink: &ShardedRecordSink,
    polarity: Polarity,
) -> Result<u64> {
    let query_seed = match polarity {
        Polarity::Forward => QUERY_RNG_SEED,
        Polarity::Reverse => REVERSE_QUERY_RNG_SEED,
    };
    let mut ref_seq = EncodedSequence::for_input(
        inputs.ref_layout.size_hint,
        inputs.ref_layout.num_records(),
        params.split,
        params.overlap_bases(),
        params.mask_n,
        REFERENCE_RNG_SEED,
    );
    let mut query_seq = EncodedSequence::for_input(
        inputs.query_layout.size_hint,
        inputs.query_layout.num_records(),
        params.split,
        params.overlap_bases(),
        params.mask_n,
        query_seed,
    );

    let mut ref_reader = FastaReader::open(inputs.reference)?;
    let mut reported = 0u64;
    while ref_seq.read_chunk(&mut ref_reader)? {
        let index = KmerHashIndex::build(&ref_seq, params.seed_bits, params.step_bits)?;
        debug!(
            offset = ref_seq.chunk_offset(),
            bases = ref_seq.total_bases(),
            n_blocks = ref_seq.n_blocks().len(),
            table_size = index.table_size(),
            distinct_seeds = index.occupied(),
            "reference chunk indexed"
        );

        query_seq.restart();
        let mut query_reader = FastaReader::open(query_path)?;
        while query_seq.read_chunk(&mut query_reader)? {
            let ctx = ChunkContext {
                ref_offset_bits: ref_seq.chunk_offset_bits(),
                ref_last_bit: ref_seq.last_bit(),
                query_offset_bits: query_seq.chunk_offset_bits(),
                query_last_bit: query_seq.last_bit(),
                polarity,
            };
            let n = scan_chunk_pair(pool, &index, &ref_seq, &query_seq, params, sink, &ctx)?;
            debug!(
                ref_offset = ref_seq.chunk_offset(),
                query_offset = query_seq.chunk_offset(),
                reported = n,
                "query chunk scanned"
            );
            reported += n;
        }
    }
    Ok(reported)
}
