//! 匹配结果的临时存储：
//! - 结果按查询起点分散到若干分片文件（bincode 定长记录），同时计算双链时分片数加倍；
//! - 分块或多线程运行时，触及块边界的结果先放入内存列表，每条链处理完后合并相邻片段；
//! - 收尾阶段读回分片、排序去重，再还原到各条记录内的坐标。

pub mod finalize;

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use tracing::debug;

use crate::config::{Polarity, StrandMode};
use crate::index::records::SEPARATOR_BASES;

/// 每条链的分片数
pub const SHARDS_PER_STRAND: usize = 24;

/// 单条记录序列化后的字节数
pub const RECORD_BYTES: usize = 32;

/// 一条最大精确匹配，坐标均为闭区间位坐标。
/// 字段顺序即排序键：先查询左端，再参考左端。
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MatchRecord {
    pub left_query: u64,
    pub left_ref: u64,
    pub right_query: u64,
    pub right_ref: u64,
}

impl MatchRecord {
    #[inline]
    pub fn len_bits(&self) -> u64 {
        self.right_ref - self.left_ref + 2
    }

    #[inline]
    pub fn len_bases(&self) -> u64 {
        self.len_bits() / 2
    }

    fn shifted(self, query_offset: u64, ref_offset: u64) -> Self {
        Self {
            left_query: self.left_query + query_offset,
            left_ref: self.left_ref + ref_offset,
            right_query: self.right_query + query_offset,
            right_ref: self.right_ref + ref_offset,
        }
    }
}

/// 当前处理的一对参考块与查询块
#[derive(Debug, Clone, Copy)]
pub struct ChunkContext {
    pub ref_offset_bits: u64,
    pub ref_last_bit: u64,
    pub query_offset_bits: u64,
    pub query_last_bit: u64,
    pub polarity: Polarity,
}

impl ChunkContext {
    /// 匹配是否贴着块边界，可能是某个跨块匹配的一段
    pub fn touches_boundary(&self, m: &MatchRecord) -> bool {
        (m.left_query == 0 && self.query_offset_bits != 0)
            || m.right_query == self.query_last_bit
            || (m.left_ref == 0 && self.ref_offset_bits != 0)
            || m.right_ref == self.ref_last_bit
    }
}

/// 每个分片覆盖的查询位坐标跨度
pub fn shard_span(query_chunk_bases: u64, split: u64, query_records: u64) -> u64 {
    let total = query_chunk_bases * split + query_records * SEPARATOR_BASES + split;
    (2 * total / SHARDS_PER_STRAND as u64).max(1)
}

fn lock<T>(m: &Mutex<T>) -> Result<MutexGuard<'_, T>> {
    m.lock().map_err(|_| anyhow!("match sink lock poisoned by a failed worker"))
}

pub struct ShardedRecordSink {
    dir: PathBuf,
    shards: Vec<Mutex<BufWriter<File>>>,
    boundary: Mutex<Vec<MatchRecord>>,
    span: u64,
    min_len_bits: u64,
    parallel: bool,
    strand: StrandMode,
}

impl ShardedRecordSink {
    /// 在 `dir` 下创建分片文件 `0..N`
    pub fn create(dir: &Path, span: u64, min_len_bits: u64, parallel: bool, strand: StrandMode) -> Result<Self> {
        let count = match strand {
            StrandMode::Both => 2 * SHARDS_PER_STRAND,
            _ => SHARDS_PER_STRAND,
        };
        let mut shards = Vec::with_capacity(count);
        for i in 0..count {
            let path = dir.join(i.to_string());
            let fh = File::create(&path)
                .with_context(|| format!("cannot create shard file '{}'", path.display()))?;
            shards.push(Mutex::new(BufWriter::new(fh)));
        }
        debug!(shards = count, span, "shard files created");
        Ok(Self {
            dir: dir.to_path_buf(),
            shards,
            boundary: Mutex::new(Vec::new()),
            span: span.max(1),
            min_len_bits,
            parallel,
            strand,
        })
    }

    pub fn shard_count(&self) -> usize {
        self.shards.len()
    }

    fn shard_index(&self, m: &MatchRecord, polarity: Polarity) -> usize {
        let idx = ((m.left_query / self.span) as usize).min(SHARDS_PER_STRAND - 1);
        if self.strand == StrandMode::Both && polarity == Polarity::Reverse {
            idx + SHARDS_PER_STRAND
        } else {
            idx
        }
    }

    fn write_direct(&self, m: &MatchRecord, polarity: Polarity) -> Result<()> {
        let idx = self.shard_index(m, polarity);
        let mut w = lock(&self.shards[idx])?;
        bincode::serialize_into(&mut *w, m)
            .with_context(|| format!("cannot write to shard file {}", idx))?;
        Ok(())
    }

    /// 记录一条块内坐标的匹配。
    pub fn emit(&self, m: &MatchRecord, ctx: &ChunkContext) -> Result<()> {
        let global = m.shifted(ctx.query_offset_bits, ctx.ref_offset_bits);
        if self.parallel && ctx.touches_boundary(m) {
            lock(&self.boundary)?.push(global);
            return Ok(());
        }
        self.write_direct(&global, ctx.polarity)
    }

    /// 合并边界列表中首尾相接的片段，并把结果写入分片。返回写出的条数。
    pub fn merge_boundary(&self, polarity: Polarity) -> Result<usize> {
        let mut pending = std::mem::take(&mut *lock(&self.boundary)?);
        let before = pending.len();
        merge_adjacent(&mut pending, self.min_len_bits);
        for m in &pending {
            self.write_direct(m, polarity)?;
        }
        debug!(before, after = pending.len(), "boundary matches merged");
        Ok(pending.len())
    }

    /// 读回全部分片。结果按链分组，组内按（查询，参考）位置升序；并行运行时去掉完全相同的记录。
    pub fn finalize(self) -> Result<Vec<(Polarity, Vec<MatchRecord>)>> {
        let mut per_shard = Vec::with_capacity(self.shards.len());
        for (i, shard) in self.shards.into_iter().enumerate() {
            let mut w = shard
                .into_inner()
                .map_err(|_| anyhow!("shard writer {} poisoned by a failed worker", i))?;
            w.flush().with_context(|| format!("cannot flush shard file {}", i))?;
            drop(w);

            let path = self.dir.join(i.to_string());
            let bytes = std::fs::read(&path)
                .with_context(|| format!("cannot read shard file '{}'", path.display()))?;
            let mut records = Vec::with_capacity(bytes.len() / RECORD_BYTES);
            for raw in bytes.chunks_exact(RECORD_BYTES) {
                let m: MatchRecord = bincode::deserialize(raw)
                    .with_context(|| format!("corrupt record in shard file '{}'", path.display()))?;
                records.push(m);
            }
            records.sort_unstable();
            if self.parallel {
                records.dedup();
            }
            std::fs::remove_file(&path)
                .with_context(|| format!("cannot remove shard file '{}'", path.display()))?;
            per_shard.push(records);
        }

        let mut out = Vec::new();
        for (group, &polarity) in per_shard.chunks(SHARDS_PER_STRAND).zip(self.strand.polarities()) {
            out.push((polarity, group.concat()));
        }
        Ok(out)
    }
}

/// 先按查询端、再按参考端寻找首尾重叠 `min_len - 1` 个碱基的片段对并合并，直到没有可合并的为止。
fn merge_adjacent(list: &mut Vec<MatchRecord>, min_len_bits: u64) {
    let gap = min_len_bits - 4;
    // 同一片段可能被相邻的两个扫描区间各找到一次
    list.sort_unstable();
    list.dedup();
    loop {
        list.sort_by_key(|m| (m.left_query, m.left_ref));
        let by_query = merge_once(list, gap, |m| m.left_query, |m| m.right_query, |m| m.left_ref, |m| m.right_ref);
        list.sort_by_key(|m| m.left_ref);
        let by_ref = merge_once(list, gap, |m| m.left_ref, |m| m.right_ref, |m| m.left_query, |m| m.right_query);
        if !by_query && !by_ref {
            break;
        }
    }
}

/// 在已按 `left` 排序的列表上做一次合并；`left/right` 为排序所用的一侧，`other_*` 为另一侧
fn merge_once(
    list: &mut Vec<MatchRecord>,
    gap: u64,
    left: impl Fn(&MatchRecord) -> u64,
    right: impl Fn(&MatchRecord) -> u64,
    other_left: impl Fn(&MatchRecord) -> u64,
    other_right: impl Fn(&MatchRecord) -> u64,
) -> bool {
    for i in 0..list.len().saturating_sub(1) {
        for j in i + 1..list.len() {
            let (it, dup) = (&list[i], &list[j]);
            if left(dup) + gap > right(it) {
                break;
            }
            if left(dup) + gap == right(it) && other_left(dup) + gap == other_right(it) {
                let dup = list.remove(j);
                let it = &mut list[i];
                it.right_query = dup.right_query;
                it.right_ref = dup.right_ref;
                return true;
            }
        }
    }
    false
}
