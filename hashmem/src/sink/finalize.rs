use super::MatchRecord;
use crate::config::Polarity;
use crate::index::records::RecordTable;

/// 还原到记录内坐标的匹配（0 起始，碱基单位）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemHit {
    pub ref_record: usize,
    pub query_record: usize,
    pub ref_start: u64,
    pub query_start: u64,
    pub len: u64,
}

/// 一条查询链上的全部匹配，按查询记录分组、组内按查询位置升序
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StrandHits {
    pub polarity: Polarity,
    pub hits: Vec<MemHit>,
}

/// 把一侧的区间 `[l, r]` 裁剪到记录 `[s, e]` 内并转换为记录内坐标，
/// 另一侧 `[ol, or]` 同步调整。区间完全落在记录之前的分隔碱基中时返回 `None`。
fn clip_to_record(l: &mut u64, r: &mut u64, ol: &mut u64, or: &mut u64, s: u64, e: u64) -> Option<()> {
    match (s <= *l, e >= *r) {
        (true, true) => {
            *l -= s;
            *r -= s;
        }
        (false, true) => {
            if s > *r {
                return None;
            }
            *ol += s - *l;
            *l = 0;
            *r -= s;
        }
        (false, false) => {
            *ol += s - *l;
            *l = 0;
            *or = or.checked_sub(*r - e)?;
            *r = e - s;
        }
        (true, false) => {
            *or = or.checked_sub(*r - e)?;
            *l -= s;
            *r = e - s;
        }
    }
    Some(())
}

fn long_enough(l: u64, r: u64, min_len_bits: u64) -> bool {
    r.checked_sub(l).is_some_and(|d| d + 2 >= min_len_bits)
}

/// 拼接坐标 → 记录内坐标。先处理参考侧，再处理查询侧；
/// 任一侧裁剪后短于最小长度即丢弃。
pub fn translate(m: &MatchRecord, refs: &RecordTable, queries: &RecordTable, min_len_bits: u64) -> Option<MemHit> {
    let (mut l_ref, mut r_ref) = (m.left_ref, m.right_ref);
    let (mut l_que, mut r_que) = (m.left_query, m.right_query);
    if !long_enough(l_ref, r_ref, min_len_bits) {
        return None;
    }

    let ref_record = refs.locate(l_ref)?;
    let rec = refs.get(ref_record);
    clip_to_record(&mut l_ref, &mut r_ref, &mut l_que, &mut r_que, rec.start, rec.end()?)?;
    if !long_enough(l_ref, r_ref, min_len_bits) {
        return None;
    }

    let query_record = queries.locate_after(l_que)?;
    let rec = queries.get(query_record);
    clip_to_record(&mut l_que, &mut r_que, &mut l_ref, &mut r_ref, rec.start, rec.end()?)?;
    if !long_enough(l_ref, r_ref, min_len_bits) {
        return None;
    }

    Some(MemHit {
        ref_record,
        query_record,
        ref_start: l_ref / 2,
        query_start: l_que / 2,
        len: (r_ref - l_ref + 2) / 2,
    })
}

/// 还原一条链上已排序的全部匹配
pub fn restore(
    polarity: Polarity,
    records: &[MatchRecord],
    refs: &RecordTable,
    queries: &RecordTable,
    min_len_bits: u64,
) -> StrandHits {
    let mut hits: Vec<MemHit> = records
        .iter()
        .filter_map(|m| translate(m, refs, queries, min_len_bits))
        .collect();
    // 稳定排序，保持记录内的查询位置顺序
    hits.sort_by_key(|h| h.query_record);
    StrandHits { polarity, hits }
}
