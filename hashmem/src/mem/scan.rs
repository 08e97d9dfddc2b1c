use anyhow::Result;
use rayon::prelude::*;
use rayon::ThreadPool;
use std::ops::Range;

use super::dedup::{DedupTracker, ExtendDecision};
use super::extend::SeedExtender;
use crate::config::RunParams;
use crate::index::encoded::EncodedSequence;
use crate::index::kmer_hash::KmerHashIndex;
use crate::sink::{ChunkContext, ShardedRecordSink};

/// 查询块中可取种子的起点个数（以碱基计）
fn seed_positions(query: &EncodedSequence, seed_bits: u64) -> u64 {
    (query.total_bases() + 1).saturating_sub(seed_bits / 2)
}

/// 把 `0..n` 切成至多 `parts` 段连续区间
fn split_ranges(n: u64, parts: usize) -> Vec<Range<u64>> {
    let parts = parts.max(1) as u64;
    let per = (n + parts - 1) / parts;
    if per == 0 {
        return Vec::new();
    }
    (0..parts)
        .map(|i| i * per..((i + 1) * per).min(n))
        .filter(|r| !r.is_empty())
        .collect()
}

/// 扫描一段查询种子起点。每段拥有自己的扩展缓存与去重状态，起点在段内单调递增。
fn scan_range(
    range: Range<u64>,
    index: &KmerHashIndex,
    reference: &EncodedSequence,
    query: &EncodedSequence,
    params: &RunParams,
    sink: &ShardedRecordSink,
    ctx: &ChunkContext,
) -> Result<u64> {
    let seed_bits = params.seed_bits;
    let ref_last = reference.last_bit();
    let mut extender = SeedExtender::new(reference, query, seed_bits, params.min_len_bits);
    let mut dedup = DedupTracker::new(seed_bits);
    let mut reported = 0u64;

    for base in range {
        let pos = 2 * base;
        if query.seed_overlaps_n(pos, seed_bits) {
            continue;
        }
        let Some(hits) = index.lookup(query.seed_at(pos, seed_bits)) else {
            continue;
        };
        for &ref_pos in hits {
            if dedup.check(ref_pos, pos, ref_last) == ExtendDecision::Skip {
                continue;
            }
            if let Some(m) = extender.extend(ref_pos, pos) {
                sink.emit(&m, ctx)?;
                dedup.register(&m);
                reported += 1;
            }
        }
    }
    Ok(reported)
}

/// 用参考块的种子索引扫描整个查询块，返回报告的匹配数。
pub fn scan_chunk_pair(
    pool: &ThreadPool,
    index: &KmerHashIndex,
    reference: &EncodedSequence,
    query: &EncodedSequence,
    params: &RunParams,
    sink: &ShardedRecordSink,
    ctx: &ChunkContext,
) -> Result<u64> {
    if reference.is_empty() || query.is_empty() {
        return Ok(0);
    }
    let ranges = split_ranges(seed_positions(query, params.seed_bits), params.threads);
    let counts: Vec<u64> = pool.install(|| {
        ranges
            .into_par_iter()
            .map(|range| scan_range(range, index, reference, query, params, sink, ctx))
            .collect::<Result<Vec<u64>>>()
    })?;
    Ok(counts.iter().sum())
}
