//! # hashmem
//!
//! 基于哈希种子的最大精确匹配（MEM）查找器，输出与 MUMmer 兼容。
//!
//! 本 crate 在参考序列与查询序列之间查找所有长度不小于给定阈值的最大精确匹配：
//!
//! - **2-bit 编码**：序列按 32 碱基/字打包，模糊碱基随机替换或标记为 N 块
//! - **种子索引**：对参考序列按固定步长采样种子，存入双重散列的开放寻址表
//! - **种子扩展**：以整字比较向两侧扩展，失配时二分定位到单个碱基
//! - **重复抑制**：跳过落在已报告匹配内部的种子
//! - **分片输出**：结果先写入分片文件，跨块片段合并后统一排序、还原坐标
//!
//! ## 快速示例
//!
//! ```rust,no_run
//! use hashmem::config::MemOpt;
//! use hashmem::io::mummer::MummerWriter;
//! use hashmem::mem::find_mems;
//! use std::path::Path;
//!
//! let opt = MemOpt { min_len: 20, ..Default::default() };
//! let report = find_mems(&opt, Path::new("ref.fa"), Path::new("query.fa"))?;
//! println!("found {} matches", report.total_hits());
//!
//! let params = opt.resolve()?;
//! let mut out = MummerWriter::new(std::io::stdout().lock(), &params);
//! out.write_report(&report)?;
//! # Ok::<(), anyhow::Error>(())
//! ```
//!
//! ## 模块说明
//!
//! - [`config`]：运行选项与校验
//! - [`io`]：FASTA 解析、MUMmer 格式输出、临时工作目录
//! - [`index`]：2-bit 序列、种子哈希表、记录位置表
//! - [`mem`]：种子扫描、扩展、去重与整体流程
//! - [`sink`]：分片存储、边界合并、坐标还原
//! - [`util`]：碱基编码与掩码表

pub mod config;
pub mod index;
pub mod io;
pub mod mem;
pub mod sink;
pub mod util;
