//! 2-bit 打包序列上使用的掩码表。
//!
//! `MASK_RIGHT[i]` 保留最低 `2*(i+1)` 位，`MASK_LEFT[i]` 保留最高 `2*(i+1)` 位。
//! 两张表在编译期生成，运行期只读。

/// 一个字的位宽
pub const WORD_BITS: u64 = 64;

pub const MASK_RIGHT: [u64; 32] = build_right_masks();
pub const MASK_LEFT: [u64; 32] = build_left_masks();

const fn build_right_masks() -> [u64; 32] {
    let mut t = [0u64; 32];
    let mut i = 0;
    while i < 32 {
        t[i] = if i == 31 { u64::MAX } else { (1u64 << (2 * (i + 1))) - 1 };
        i += 1;
    }
    t
}

const fn build_left_masks() -> [u64; 32] {
    let mut t = [0u64; 32];
    let mut i = 0;
    while i < 32 {
        t[i] = if i == 31 { u64::MAX } else { !((1u64 << (WORD_BITS as usize - 2 * (i + 1))) - 1) };
        i += 1;
    }
    t
}

/// 取低 `bits` 位的掩码（`bits` 为 2..=64 的偶数）
#[inline]
pub fn right_mask(bits: u64) -> u64 {
    MASK_RIGHT[(bits / 2 - 1) as usize]
}

/// 取高 `bits` 位的掩码（`bits` 为 2..=64 的偶数）
#[inline]
pub fn left_mask(bits: u64) -> u64 {
    MASK_LEFT[(bits / 2 - 1) as usize]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mask_tables_match_known_values() {
        assert_eq!(MASK_RIGHT[0], 0x3);
        assert_eq!(MASK_RIGHT[15], 0xFFFF_FFFF);
        assert_eq!(MASK_RIGHT[27], 0x00FF_FFFF_FFFF_FFFF);
        assert_eq!(MASK_LEFT[0], 0xC000_0000_0000_0000);
        assert_eq!(MASK_LEFT[27], 0xFFFF_FFFF_FFFF_FF00);
        assert_eq!(MASK_LEFT[31], u64::MAX);
    }

    #[test]
    fn masks_are_complementary() {
        for bits in (2..64).step_by(2) {
            assert_eq!(left_mask(bits) | right_mask(64 - bits), u64::MAX);
            assert_eq!(left_mask(bits) & right_mask(64 - bits), 0);
            assert_eq!(right_mask(bits).count_ones() as u64, bits);
        }
    }
}
