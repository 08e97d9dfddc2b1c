use anyhow::{bail, Result};
use std::path::PathBuf;

/// 允许的最长种子（碱基）
pub const MAX_SEED_BASES: u64 = 28;

/// 计算哪一条或哪几条查询链
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StrandMode {
    #[default]
    Forward,
    Reverse,
    Both,
}

/// 一次扫描所针对的查询链
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Polarity {
    Forward,
    Reverse,
}

impl StrandMode {
    /// 按输出顺序列出需要计算的链
    pub fn polarities(self) -> &'static [Polarity] {
        match self {
            StrandMode::Forward => &[Polarity::Forward],
            StrandMode::Reverse => &[Polarity::Reverse],
            StrandMode::Both => &[Polarity::Forward, Polarity::Reverse],
        }
    }
}

/// 用户可见的运行选项（碱基单位）
#[derive(Debug, Clone)]
pub struct MemOpt {
    /// 最小 MEM 长度
    pub min_len: u64,
    /// 种子长度；未指定时取 28 与 `min_len` 中较小者
    pub seed_len: Option<u64>,
    /// 把每个输入切成多少块
    pub split: u64,
    pub threads: usize,
    /// 把 N 视为不可匹配，而不是替换成随机碱基
    pub mask_n: bool,
    pub strand: StrandMode,
    /// 反向互补匹配的查询位置相对原始查询序列给出
    pub rel_query_pos: bool,
    /// 始终输出参考序列名（四列格式）
    pub four_col: bool,
    /// 在每个查询头部输出序列长度
    pub len_in_header: bool,
    /// 临时工作目录的父目录
    pub work_prefix: Option<PathBuf>,
}

impl Default for MemOpt {
    fn default() -> Self {
        Self {
            min_len: 50,
            seed_len: None,
            split: 1,
            threads: 1,
            mask_n: false,
            strand: StrandMode::Forward,
            rel_query_pos: false,
            four_col: false,
            len_in_header: false,
            work_prefix: None,
        }
    }
}

/// 校验后的运行参数，长度均换算为位（碱基数 × 2）。
#[derive(Debug, Clone)]
pub struct RunParams {
    pub min_len_bits: u64,
    pub seed_bits: u64,
    /// 参考序列种子采样间隔
    pub step_bits: u64,
    pub split: u64,
    pub threads: usize,
    pub mask_n: bool,
    pub strand: StrandMode,
    pub rel_query_pos: bool,
    pub four_col: bool,
    pub len_in_header: bool,
    pub work_prefix: PathBuf,
}

impl RunParams {
    pub fn min_len_bases(&self) -> u64 {
        self.min_len_bits / 2
    }

    /// 相邻两块之间保留的重叠碱基数
    pub fn overlap_bases(&self) -> u64 {
        self.min_len_bases() - 1
    }

    /// 是否启用了分块或多线程（需要边界合并与去重）
    pub fn is_parallel(&self) -> bool {
        self.split > 1 || self.threads > 1
    }
}

impl MemOpt {
    /// 校验选项并换算为位单位；任何文件被打开前调用。
    pub fn resolve(&self) -> Result<RunParams> {
        if self.min_len <= 1 {
            bail!("minimum match length must be greater than one (got {})", self.min_len);
        }
        let seed = match self.seed_len {
            Some(k) if k > self.min_len => bail!(
                "seed length {} cannot exceed the minimum match length {}",
                k,
                self.min_len
            ),
            Some(k) => k,
            None => MAX_SEED_BASES.min(self.min_len),
        };
        if seed == 0 || seed > MAX_SEED_BASES {
            bail!("seed length must be between 1 and {} bases (got {})", MAX_SEED_BASES, seed);
        }
        if self.split == 0 {
            bail!("split factor must be at least 1");
        }
        if self.threads == 0 {
            bail!("thread count must be at least 1");
        }
        if self.rel_query_pos && self.strand == StrandMode::Forward {
            bail!("relative query positions require reverse or both strands");
        }

        let min_len_bits = 2 * self.min_len;
        let seed_bits = 2 * seed;
        Ok(RunParams {
            min_len_bits,
            seed_bits,
            step_bits: min_len_bits - seed_bits + 2,
            split: self.split,
            threads: self.threads,
            mask_n: self.mask_n,
            strand: self.strand,
            rel_query_pos: self.rel_query_pos,
            four_col: self.four_col,
            len_in_header: self.len_in_header,
            work_prefix: self.work_prefix.clone().unwrap_or_else(std::env::temp_dir),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_resolve_to_bit_units() {
        let p = MemOpt::default().resolve().unwrap();
        assert_eq!(p.min_len_bits, 100);
        assert_eq!(p.seed_bits, 56);
        assert_eq!(p.step_bits, 46);
        assert_eq!(p.overlap_bases(), 49);
        assert!(!p.is_parallel());
    }

    #[test]
    fn implicit_seed_shrinks_to_min_len() {
        let opt = MemOpt { min_len: 10, ..Default::default() };
        let p = opt.resolve().unwrap();
        assert_eq!(p.seed_bits, 20);
        assert_eq!(p.step_bits, 2);
    }

    #[test]
    fn explicit_seed_longer_than_min_len_is_rejected() {
        let opt = MemOpt { min_len: 10, seed_len: Some(12), ..Default::default() };
        assert!(opt.resolve().is_err());
    }

    #[test]
    fn invalid_options_are_rejected() {
        let bad = [
            MemOpt { min_len: 1, ..Default::default() },
            MemOpt { seed_len: Some(0), ..Default::default() },
            MemOpt { seed_len: Some(29), ..Default::default() },
            MemOpt { split: 0, ..Default::default() },
            MemOpt { threads: 0, ..Default::default() },
            MemOpt { rel_query_pos: true, ..Default::default() },
        ];
        for opt in bad {
            assert!(opt.resolve().is_err(), "{:?} should be rejected", opt);
        }
        let ok = MemOpt { rel_query_pos: true, strand: StrandMode::Both, ..Default::default() };
        assert!(ok.resolve().is_ok());
    }

    #[test]
    fn both_strands_forward_first() {
        assert_eq!(StrandMode::Both.polarities(), &[Polarity::Forward, Polarity::Reverse]);
    }
}
