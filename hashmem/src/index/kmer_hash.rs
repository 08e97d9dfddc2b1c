use anyhow::{bail, Result};
use tracing::debug;

use super::encoded::EncodedSequence;
use super::primes::{select_table_size, TableSize};

#[derive(Debug, Clone, Default)]
struct Slot {
    kmer: u64,
    /// 空表示该槽未被占用
    positions: Vec<u64>,
}

/// 开放寻址的种子哈希表：种子值 → 参考序列中的位坐标列表。
/// - 主槽位为 `kmer % size`，冲突时以 `1 + kmer % prev` 为步长做双重散列；
/// - 插入与查找走同一探测序列，故查找结果与其他槽位的插入顺序无关；
/// - 每个参考块重新构建，构建期间不删除任何槽位。
#[derive(Debug)]
pub struct KmerHashIndex {
    slots: Vec<Slot>,
    table: TableSize,
    occupied: usize,
}

impl KmerHashIndex {
    /// 按预期种子数分配空表
    pub fn with_expected(expected: u64) -> Result<Self> {
        let table = select_table_size(expected)?;
        Ok(Self { slots: vec![Slot::default(); table.size as usize], table, occupied: 0 })
    }

    /// 每隔 `step_bits` 位采样一个长 `seed_bits` 位的种子，跳过与 N 块相交的种子。
    pub fn build(seq: &EncodedSequence, seed_bits: u64, step_bits: u64) -> Result<Self> {
        let seed_bases = seed_bits / 2;
        let step_bases = (step_bits / 2).max(1);
        let expected = (seq.total_bases() + 1).saturating_sub(seed_bases) / step_bases + 1;
        let mut index = Self::with_expected(expected)?;

        if seq.total_bases() >= seed_bases {
            let last = seq.last_bit();
            let mut pos = 0u64;
            while pos + seed_bits - 2 <= last {
                if !seq.seed_overlaps_n(pos, seed_bits) {
                    index.insert(seq.seed_at(pos, seed_bits), pos)?;
                }
                pos += step_bits;
            }
        }

        debug!(
            bases = seq.total_bases(),
            table_size = index.table.size,
            seeds = index.occupied,
            "seed index built"
        );
        Ok(index)
    }

    /// 探测 `kmer` 所在或应在的槽位；探测序列耗尽时返回 `None`
    fn probe(&self, kmer: u64) -> Option<usize> {
        let size = self.table.size;
        let step = 1 + kmer % self.table.prev;
        let mut key = kmer % size;
        for count in 1..=size {
            let slot = &self.slots[key as usize];
            if slot.positions.is_empty() || slot.kmer == kmer {
                return Some(key as usize);
            }
            key = ((key as u128 + count as u128 * step as u128) % size as u128) as u64;
        }
        None
    }

    pub fn insert(&mut self, kmer: u64, pos: u64) -> Result<()> {
        let Some(key) = self.probe(kmer) else {
            bail!("seed hash table of size {} is full", self.table.size);
        };
        let slot = &mut self.slots[key];
        if slot.positions.is_empty() {
            slot.kmer = kmer;
            self.occupied += 1;
        }
        slot.positions.push(pos);
        Ok(())
    }

    /// 种子在参考序列中的所有位坐标（按插入顺序）
    #[inline]
    pub fn lookup(&self, kmer: u64) -> Option<&[u64]> {
        let slot = &self.slots[self.probe(kmer)?];
        if slot.positions.is_empty() {
            None
        } else {
            Some(&slot.positions)
        }
    }

    pub fn table_size(&self) -> u64 {
        self.table.size
    }

    /// 不同种子的个数
    pub fn occupied(&self) -> usize {
        self.occupied
    }
}
