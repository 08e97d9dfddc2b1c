//! 演示如何在 library 模式下使用 hashmem 查找最大精确匹配。
//!
//! 运行方式：
//! ```bash
//! cargo run --example simple_mems
//! ```

use anyhow::Result;
use hashmem::config::MemOpt;
use hashmem::io::mummer::MummerWriter;
use hashmem::mem::find_mems;

fn main() -> Result<()> {
    // 1. 准备参考与查询序列（查询包含参考中的两段）
    let reference = "ACGTACGTAGCTGATCGTAGCTAGCTAGCTGATCGTAGCTAGCTAGCTGATTTGACCAGGTACCATGACGGATCAAGT";
    let query = "GGGGCTGATCGTAGCTAGCTAGCTGATCCCCCACCAGGTACCATGACGGATCA";
    println!("参考长度: {} bp", reference.len());
    println!("查询长度: {} bp", query.len());

    let dir = std::env::temp_dir().join(format!("hashmem_demo_{}", std::process::id()));
    std::fs::create_dir_all(&dir)?;
    let ref_path = dir.join("ref.fa");
    let query_path = dir.join("qry.fa");
    std::fs::write(&ref_path, format!(">chr1\n{}\n", reference))?;
    std::fs::write(&query_path, format!(">read1\n{}\n", query))?;

    // 2. 查找长度不小于 15 的最大精确匹配，两条链都搜索
    let opt = MemOpt {
        min_len: 15,
        strand: hashmem::config::StrandMode::Both,
        len_in_header: true,
        ..Default::default()
    };
    let report = find_mems(&opt, &ref_path, &query_path)?;
    println!("共找到 {} 个匹配\n", report.total_hits());

    // 3. 以 MUMmer 格式输出
    let params = opt.resolve()?;
    let mut writer = MummerWriter::new(std::io::stdout().lock(), &params);
    writer.write_report(&report)?;

    std::fs::remove_dir_all(&dir)?;
    Ok(())
}
