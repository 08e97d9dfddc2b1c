//! 2-bit 打包的核苷酸序列，按块（chunk）从 FASTA 流中填充。
//!
//! - 编码：`A→00, C→01, G→10, T→11`，每个 `u64` 存 32 个碱基，高位在前。
//! - 非 ACGT 字符替换为随机 2-bit 值；`mask_n` 打开时，其位区间记入 N 块。
//! - 相邻记录之间插入 10 个随机碱基作为分隔，阻断跨记录的伪匹配。
//! - 每块读取 `chunk_bases` 个碱基，外加 `overlap_bases`（= 最小 MEM 长度 − 1）的重叠，
//!   重叠部分留作下一块的开头，保证跨块的匹配不会丢失。
//!
//! 所有位置均为位坐标（碱基下标 × 2）。

use anyhow::Result;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::io::BufRead;

use crate::index::records::SEPARATOR_BASES;
use crate::io::fasta::{FastaEvent, FastaReader};
use crate::util::bits::{left_mask, WORD_BITS};
use crate::util::dna::{self, BASES_PER_WORD};

/// 记录分隔符；其中每个字符都按模糊碱基处理
const SEPARATOR: [u8; SEPARATOR_BASES as usize] = [b'N'; SEPARATOR_BASES as usize];

/// 位坐标闭区间 `[left, right]`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Interval {
    pub left: u64,
    pub right: u64,
}

impl Interval {
    #[inline]
    pub fn covers(&self, left: u64, right: u64) -> bool {
        self.left <= left && right <= self.right
    }

    /// 区间覆盖的位数（按碱基计为 `span_bits / 2`）
    #[inline]
    pub fn span_bits(&self) -> u64 {
        self.right.saturating_sub(self.left) + 2
    }
}

#[derive(Debug)]
pub struct EncodedSequence {
    words: Vec<u64>,
    total_bases: u64,
    n_blocks: Vec<Interval>,
    mask_n: bool,
    chunk_bases: u64,
    overlap_bases: u64,
    /// 已读入但属于下一块的原始字符
    carry: Vec<u8>,
    /// 当前未闭合 N 块的起始碱基
    n_run: Option<u64>,
    in_record: bool,
    chunks_read: u64,
    chunk_offset: u64,
    seed: u64,
    rng: StdRng,
}

impl EncodedSequence {
    pub fn new(chunk_bases: u64, overlap_bases: u64, mask_n: bool, seed: u64) -> Self {
        Self {
            words: Vec::new(),
            total_bases: 0,
            n_blocks: Vec::new(),
            mask_n,
            chunk_bases: chunk_bases.max(1),
            overlap_bases,
            carry: Vec::new(),
            n_run: None,
            in_record: false,
            chunks_read: 0,
            chunk_offset: 0,
            seed,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// 按输入规模分配字缓冲区：块大小为 `size_hint / split`，
    /// 字数为 `floor((chunk + num_records*10 + split) / 32 + 4)`。
    pub fn for_input(
        size_hint: u64,
        num_records: u64,
        split: u64,
        overlap_bases: u64,
        mask_n: bool,
        seed: u64,
    ) -> Self {
        let split = split.max(1);
        let chunk_bases = size_hint / split;
        let mut seq = Self::new(chunk_bases, overlap_bases, mask_n, seed);
        let capacity = (chunk_bases + num_records * SEPARATOR_BASES + split) / BASES_PER_WORD + 4;
        seq.words.reserve(capacity as usize);
        seq
    }

    /// 把一段内存中的序列编码为单独一块。
    pub fn from_bytes(seq: &[u8], mask_n: bool, seed: u64) -> Self {
        let mut enc = Self::new(seq.len() as u64, 0, mask_n, seed);
        enc.begin_chunk();
        enc.encode_chunk(seq);
        enc.finish_chunk();
        enc
    }

    #[inline]
    pub fn total_bases(&self) -> u64 {
        self.total_bases
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.total_bases == 0
    }

    /// 最后一个碱基的位坐标；空序列返回 0
    #[inline]
    pub fn last_bit(&self) -> u64 {
        dna::bases_to_bits(self.total_bases.saturating_sub(1))
    }

    /// 当前块在整个数据集中的起始碱基
    #[inline]
    pub fn chunk_offset(&self) -> u64 {
        self.chunk_offset
    }

    #[inline]
    pub fn chunk_offset_bits(&self) -> u64 {
        dna::bases_to_bits(self.chunk_offset)
    }

    pub fn words(&self) -> &[u64] {
        &self.words
    }

    pub fn n_blocks(&self) -> &[Interval] {
        &self.n_blocks
    }

    /// 把原始字符编码进当前块，返回 `(已用字数, 本次编码的碱基数)`。
    /// 超出块预算的字符进入 carry，重叠区内的字符既编码也进入 carry。
    pub fn encode_chunk(&mut self, raw: &[u8]) -> (usize, u64) {
        let limit = self.chunk_bases + self.overlap_bases;
        let before = self.total_bases;
        for &b in raw {
            if self.total_bases == limit {
                self.carry.push(b);
                continue;
            }
            if self.total_bases >= self.chunk_bases {
                self.carry.push(b);
            }
            self.encode_base(b);
        }
        let words_used = ((self.total_bases + BASES_PER_WORD - 1) / BASES_PER_WORD) as usize;
        (words_used, self.total_bases - before)
    }

    /// 读取下一块。输入耗尽时返回 `false`。
    pub fn read_chunk<R: BufRead>(&mut self, src: &mut FastaReader<R>) -> Result<bool> {
        self.begin_chunk();
        let pending = std::mem::take(&mut self.carry);
        self.encode_chunk(&pending);

        let limit = self.chunk_bases + self.overlap_bases;
        loop {
            if self.total_bases == limit {
                self.finish_chunk();
                self.chunks_read += 1;
                return Ok(true);
            }
            match src.next_event()? {
                Some(FastaEvent::Header(_)) => {
                    if self.in_record {
                        self.encode_chunk(&SEPARATOR);
                    }
                    self.in_record = true;
                }
                Some(FastaEvent::Bases(line)) => {
                    if self.in_record {
                        self.encode_chunk(&line);
                    }
                }
                None => {
                    self.finish_chunk();
                    if self.carry.is_empty() {
                        self.in_record = false;
                    }
                    if self.total_bases == 0 {
                        return Ok(false);
                    }
                    self.chunks_read += 1;
                    return Ok(true);
                }
            }
        }
    }

    /// 回到流的起点（用于为每个参考块重读查询序列）。
    /// 随机数发生器同时重置，重读得到的编码与第一遍完全相同。
    pub fn restart(&mut self) {
        self.rng = StdRng::seed_from_u64(self.seed);
        self.carry.clear();
        self.in_record = false;
        self.chunks_read = 0;
        self.begin_chunk();
    }

    fn begin_chunk(&mut self) {
        self.words.clear();
        self.total_bases = 0;
        self.n_blocks.clear();
        self.n_run = None;
        self.chunk_offset = self.chunks_read * self.chunk_bases;
    }

    fn finish_chunk(&mut self) {
        if let Some(start) = self.n_run.take() {
            self.close_n_run(start);
        }
    }

    fn encode_base(&mut self, b: u8) {
        let code = match dna::to_code(b) {
            Some(c) => {
                if let Some(start) = self.n_run.take() {
                    self.close_n_run(start);
                }
                c
            }
            None => {
                if self.n_run.is_none() {
                    self.n_run = Some(self.total_bases);
                }
                self.rng.gen_range(0..4u64)
            }
        };
        let word = (self.total_bases / BASES_PER_WORD) as usize;
        let shift = WORD_BITS - 2 - 2 * (self.total_bases % BASES_PER_WORD);
        // 始终多留一个全零字，跨字读取时不越界
        if self.words.len() < word + 2 {
            self.words.resize(word + 2, 0);
        }
        self.words[word] |= code << shift;
        self.total_bases += 1;
    }

    fn close_n_run(&mut self, start: u64) {
        if self.mask_n && self.total_bases > start {
            self.n_blocks.push(Interval {
                left: dna::bases_to_bits(start),
                right: dna::bases_to_bits(self.total_bases - 1),
            });
        }
    }

    /// 取出从 `pos` 开始、长 `seed_bits` 位的种子，左对齐存放；可跨越字边界。
    #[inline]
    pub fn seed_at(&self, pos: u64, seed_bits: u64) -> u64 {
        let offset = pos % WORD_BITS;
        let j = (pos / WORD_BITS) as usize;
        let kmer = self.words[j] << offset;
        if offset > WORD_BITS - seed_bits {
            let spill = seed_bits - (WORD_BITS - offset);
            kmer | ((self.words[j + 1] & left_mask(spill)) >> (WORD_BITS - offset))
        } else {
            kmer & left_mask(seed_bits)
        }
    }

    /// `pos` 之前、同一字内的碱基，右对齐；`pos` 恰在字首时返回前一整字。
    #[inline]
    pub fn bits_before(&self, pos: u64) -> u64 {
        let offset = pos % WORD_BITS;
        let i = (pos / WORD_BITS) as usize;
        if offset == 0 {
            self.words[i - 1]
        } else {
            self.words[i] >> (WORD_BITS - offset)
        }
    }

    /// 从 `pos` 开始到字尾的碱基，左对齐
    #[inline]
    pub fn bits_from(&self, pos: u64) -> u64 {
        self.words[(pos / WORD_BITS) as usize] << (pos % WORD_BITS)
    }

    /// 包含 `pos` 的无 N 区段。左端为 0 表示左侧没有 N 块。
    pub fn n_free_bounds(&self, pos: u64) -> Interval {
        let last = self.last_bit();
        if self.n_blocks.is_empty() {
            return Interval { left: 0, right: last };
        }
        let idx = self.n_blocks.partition_point(|b| b.left <= pos);
        let right = match self.n_blocks.get(idx) {
            Some(next) => next.left - 2,
            None => last,
        };
        if pos == 0 || idx == 0 {
            Interval { left: 0, right }
        } else {
            Interval { left: self.n_blocks[idx - 1].right + 2, right }
        }
    }

    /// 种子 `[pos, pos + seed_bits - 2]` 是否与任何 N 块相交
    #[inline]
    pub fn seed_overlaps_n(&self, pos: u64, seed_bits: u64) -> bool {
        if self.n_blocks.is_empty() {
            return false;
        }
        let end = pos + seed_bits - 2;
        let idx = self.n_blocks.partition_point(|b| b.right < pos);
        self.n_blocks.get(idx).is_some_and(|b| b.left <= end)
    }

    /// 解码回 ACGT 文本（N 位置上是随机替换后的碱基）
    pub fn decode(&self) -> Vec<u8> {
        (0..self.total_bases)
            .map(|i| {
                let word = self.words[(i / BASES_PER_WORD) as usize];
                let shift = WORD_BITS - 2 - 2 * (i % BASES_PER_WORD);
                dna::from_code(word >> shift)
            })
            .collect()
    }
}
