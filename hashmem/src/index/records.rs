/// 相邻两条记录之间插入的随机分隔碱基数
pub const SEPARATOR_BASES: u64 = 10;

/// 单条输入记录在拼接序列中的位置。
/// `start` 为位坐标（碱基下标 × 2），`len` 为碱基数。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeqRecord {
    pub name: String,
    pub start: u64,
    pub len: u64,
}

impl SeqRecord {
    /// 最后一个碱基的位坐标（闭区间右端）。空记录返回 `None`。
    #[inline]
    pub fn end(&self) -> Option<u64> {
        if self.len == 0 {
            None
        } else {
            Some(self.start + 2 * self.len - 2)
        }
    }

    /// 右端之后第一个位坐标
    #[inline]
    fn end_exclusive(&self) -> u64 {
        self.start + 2 * self.len
    }
}

/// 记录位置表：按 `start` 升序，用于把拼接坐标还原为记录内坐标。
#[derive(Debug, Clone, Default)]
pub struct RecordTable {
    records: Vec<SeqRecord>,
}

impl RecordTable {
    pub fn new(records: Vec<SeqRecord>) -> Self {
        Self { records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, idx: usize) -> &SeqRecord {
        &self.records[idx]
    }

    pub fn iter(&self) -> std::slice::Iter<'_, SeqRecord> {
        self.records.iter()
    }

    /// 第一条右端 ≥ `pos` 的非空记录（即 `pos` 所在或其后最近的记录）。
    pub fn locate(&self, pos: u64) -> Option<usize> {
        let mut idx = self.records.partition_point(|r| r.end_exclusive() <= pos);
        while idx < self.records.len() && self.records[idx].len == 0 {
            idx += 1;
        }
        (idx < self.records.len()).then_some(idx)
    }

    /// 与 [`locate`](Self::locate) 相同，但要求右端严格大于 `pos`。
    pub fn locate_after(&self, pos: u64) -> Option<usize> {
        let mut idx = self.records.partition_point(|r| r.end_exclusive() <= pos + 2);
        while idx < self.records.len() && self.records[idx].len == 0 {
            idx += 1;
        }
        (idx < self.records.len()).then_some(idx)
    }
}
