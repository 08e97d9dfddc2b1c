use std::collections::{BTreeMap, HashMap};

use crate::sink::MatchRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtendDecision {
    /// 种子落在已报告的匹配内部
    Skip,
    Extend,
}

/// 每个工作线程私有：记住已报告匹配的查询区间，避免同一匹配被其内部的其它种子重复扩展。
///
/// - `pending`：按（查询右端，查询左端）排序的区间，值为对应匹配的参考区间；
/// - `seen`：参考区间 → 查询区间，同一参考区间可能对应多个查询区间。
///
/// 查询位置在线程内单调递增，右端已落在种子之前的区间不会再覆盖后续种子，检查时即被清除。
#[derive(Debug)]
pub struct DedupTracker {
    seed_bits: u64,
    pending: BTreeMap<(u64, u64), Vec<(u64, u64)>>,
    seen: HashMap<(u64, u64), Vec<(u64, u64)>>,
}

impl DedupTracker {
    pub fn new(seed_bits: u64) -> Self {
        Self { seed_bits, pending: BTreeMap::new(), seen: HashMap::new() }
    }

    /// 判断查询位置 `query_pos` 与参考位置 `ref_pos` 上的种子是否需要扩展
    pub fn check(&mut self, ref_pos: u64, query_pos: u64, ref_last_bit: u64) -> ExtendDecision {
        let seed_end = query_pos + self.seed_bits - 2;
        while let Some(entry) = self.pending.first_entry() {
            if entry.key().0 >= seed_end {
                break;
            }
            let ((right, left), keys) = entry.remove_entry();
            for key in keys {
                self.release(key, (left, right));
            }
        }

        for &(right, left) in self.pending.keys() {
            if query_pos < left || seed_end > right {
                continue;
            }
            let rel_left = query_pos - left;
            if ref_pos < rel_left {
                continue;
            }
            let ref_right = (ref_pos + (right - query_pos)).min(ref_last_bit);
            let covered = self
                .seen
                .get(&(ref_pos - rel_left, ref_right))
                .is_some_and(|qs| qs.contains(&(left, right)));
            if covered {
                return ExtendDecision::Skip;
            }
        }
        ExtendDecision::Extend
    }

    /// 登记一条刚报告的匹配
    pub fn register(&mut self, m: &MatchRecord) {
        let ref_key = (m.left_ref, m.right_ref);
        self.seen.entry(ref_key).or_default().push((m.left_query, m.right_query));
        self.pending.entry((m.right_query, m.left_query)).or_default().push(ref_key);
    }

    fn release(&mut self, ref_key: (u64, u64), query: (u64, u64)) {
        if let Some(qs) = self.seen.get_mut(&ref_key) {
            if let Some(i) = qs.iter().position(|&q| q == query) {
                qs.swap_remove(i);
            }
            if qs.is_empty() {
                self.seen.remove(&ref_key);
            }
        }
    }
}
