//! 最大精确匹配的查找：种子扫描、双向扩展、重复抑制与整体流程。

pub mod dedup;
pub mod extend;
pub mod pipeline;
pub mod scan;

pub use pipeline::{find_mems, MemReport};
