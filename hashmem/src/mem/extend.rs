use crate::index::encoded::{EncodedSequence, Interval};
use crate::sink::MatchRecord;
use crate::util::bits::{left_mask, right_mask, WORD_BITS};

/// 失配后把比较宽度减半（向上取偶数），逐步逼近失配的确切位置
#[inline]
fn halve(size: u64) -> u64 {
    let half = size / 2;
    if half % 2 == 1 {
        half + 1
    } else {
        half
    }
}

/// 从一对相同的种子出发向两侧扩展，得到最大精确匹配。
///
/// 每次按整字（或到字边界、N 块边界的距离）比较；出现失配时用二分把比较宽度
/// 缩到单个碱基，从而在不逐位扫描的前提下精确定位失配。
/// 两条序列的无 N 区段在工作线程内缓存，只有游标越出缓存区间时才重新计算。
pub struct SeedExtender<'a> {
    reference: &'a EncodedSequence,
    query: &'a EncodedSequence,
    seed_bits: u64,
    min_len_bits: u64,
    ref_bounds: Interval,
    query_bounds: Interval,
}

impl<'a> SeedExtender<'a> {
    pub fn new(reference: &'a EncodedSequence, query: &'a EncodedSequence, seed_bits: u64, min_len_bits: u64) -> Self {
        Self {
            reference,
            query,
            seed_bits,
            min_len_bits,
            ref_bounds: Interval::default(),
            query_bounds: Interval::default(),
        }
    }

    /// 以参考位置 `ref_pos`、查询位置 `query_pos` 处的种子为起点扩展。
    /// 结果短于最小长度时返回 `None`。
    pub fn extend(&mut self, ref_pos: u64, query_pos: u64) -> Option<MatchRecord> {
        let (r, q) = (self.reference, self.query);
        let min_len = self.min_len_bits;
        let tot_r = r.last_bit();
        let tot_q = q.last_bit();

        let mut l_ref = ref_pos;
        let mut l_que = query_pos;
        // 种子之后的第一个碱基
        let mut r_ref = ref_pos + self.seed_bits;
        let mut r_que = query_pos + self.seed_bits;

        if !self.query_bounds.covers(l_que, r_que) {
            self.query_bounds = q.n_free_bounds(l_que);
        }
        if !self.ref_bounds.covers(l_ref, r_ref) {
            self.ref_bounds = r.n_free_bounds(l_ref);
        }
        let (rb, qb) = (self.ref_bounds, self.query_bounds);
        if rb.span_bits() < min_len || qb.span_bits() < min_len {
            return None;
        }

        // 向左
        let mut mismatch = false;
        let mut size = 0u64;
        let (mut cur_r, mut cur_q) = (0u64, 0u64);
        while l_ref > 0 && l_que > 0 && qb.left <= l_que && rb.left <= l_ref {
            if !mismatch {
                size = (l_ref % WORD_BITS).min(l_que % WORD_BITS);
                if size == 0 {
                    size = 2;
                }
                size = size.min(l_que - qb.left).min(l_ref - rb.left);
                if size == 0 {
                    break;
                }
                cur_r = r.bits_before(l_ref);
                cur_q = q.bits_before(l_que);
            }
            let mask = right_mask(size);
            if cur_r & mask != cur_q & mask {
                if size == 2 {
                    break;
                }
                mismatch = true;
                size = halve(size);
            } else {
                l_ref -= size;
                l_que -= size;
                if mismatch {
                    if size == 2 {
                        break;
                    }
                    cur_r >>= size;
                    cur_q >>= size;
                }
            }
        }

        if tot_r - l_ref + 2 < min_len || tot_q - l_que + 2 < min_len {
            return None;
        }

        // 向右
        mismatch = false;
        while r_ref <= tot_r && r_que <= tot_q && r_ref <= rb.right && r_que <= qb.right {
            if !mismatch {
                size = WORD_BITS - (r_ref % WORD_BITS).max(r_que % WORD_BITS);
                size = size
                    .min(tot_r - r_ref)
                    .min(tot_q - r_que)
                    .min(qb.right - r_que)
                    .min(rb.right - r_ref);
                if size == 0 {
                    size = 2;
                }
                cur_r = r.bits_from(r_ref);
                cur_q = q.bits_from(r_que);
            }
            let mask = left_mask(size);
            if cur_r & mask != cur_q & mask {
                if size == 2 {
                    r_ref -= 2;
                    r_que -= 2;
                    break;
                }
                mismatch = true;
                size = halve(size);
            } else {
                if mismatch && size == 2 {
                    break;
                }
                if r_ref == tot_r || r_que == tot_q {
                    break;
                }
                // 非二分状态下下一轮会重新取字
                if mismatch {
                    cur_r <<= size;
                    cur_q <<= size;
                }
                r_ref += size;
                r_que += size;
            }
        }

        // 越界时两侧同步回退
        if r_ref > rb.right {
            r_que = r_que.saturating_sub(r_ref - rb.right);
            r_ref = rb.right;
        }
        if r_que > qb.right {
            r_ref = r_ref.saturating_sub(r_que - qb.right);
            r_que = qb.right;
        }
        if r_ref > tot_r {
            r_que = r_que.saturating_sub(r_ref - tot_r);
            r_ref = tot_r;
        }
        if r_que > tot_q {
            r_ref = r_ref.saturating_sub(r_que - tot_q);
            r_que = tot_q;
        }

        if r_ref < l_ref || r_ref - l_ref + 2 < min_len {
            return None;
        }
        Some(MatchRecord { left_query: l_que, left_ref: l_ref, right_query: r_que, right_ref: r_ref })
    }
}
