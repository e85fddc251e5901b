//! Big-endian bit buffer primitives over arrays of 16-bit words.
//!
//! IPv6 arithmetic treats the eight address blocks as one 128-bit unsigned
//! integer, word 0 being the most significant.

const WORD_BITS: usize = 16;

/// Logical right shift by `bits`. Shifting by the buffer width or more zeroes it.
pub fn shift_right(buf: &mut [u16], bits: usize) {
    let len = buf.len();
    if bits >= len * WORD_BITS {
        buf.fill(0);
        return;
    }
    let words = bits / WORD_BITS;
    let rest = bits % WORD_BITS;

    for i in (0..len).rev() {
        let hi = if i >= words { buf[i - words] } else { 0 };
        let lo = if i > words { buf[i - words - 1] } else { 0 };
        buf[i] = if rest == 0 {
            hi
        } else {
            (hi >> rest) | (lo << (WORD_BITS - rest))
        };
    }
}

/// Logical left shift by `bits`. Shifting by the buffer width or more zeroes it.
pub fn shift_left(buf: &mut [u16], bits: usize) {
    let len = buf.len();
    if bits >= len * WORD_BITS {
        buf.fill(0);
        return;
    }
    let words = bits / WORD_BITS;
    let rest = bits % WORD_BITS;

    for i in 0..len {
        let lo = if i + words < len { buf[i + words] } else { 0 };
        let next = if i + words + 1 < len {
            buf[i + words + 1]
        } else {
            0
        };
        buf[i] = if rest == 0 {
            lo
        } else {
            (lo << rest) | (next >> (WORD_BITS - rest))
        };
    }
}

/// Add one, propagating the carry. Wraps to zero on overflow.
pub fn increase(buf: &mut [u16]) {
    for word in buf.iter_mut().rev() {
        let (v, carry) = word.overflowing_add(1);
        *word = v;
        if !carry {
            return;
        }
    }
}

/// Subtract one, propagating the borrow. Wraps to all ones on underflow.
pub fn decrease(buf: &mut [u16]) {
    for word in buf.iter_mut().rev() {
        let (v, borrow) = word.overflowing_sub(1);
        *word = v;
        if !borrow {
            return;
        }
    }
}

/// Number of trailing zero bits of the whole buffer.
pub fn trailing_zeros(buf: &[u16]) -> usize {
    let mut count = 0;
    for word in buf.iter().rev() {
        if *word == 0 {
            count += WORD_BITS;
        } else {
            return count + word.trailing_zeros() as usize;
        }
    }
    count
}

#[cfg(test)]
mod tests {
    use super::*;

    fn to_u128(buf: &[u16; 8]) -> u128 {
        buf.iter().fold(0u128, |acc, w| (acc << 16) | *w as u128)
    }

    fn from_u128(v: u128) -> [u16; 8] {
        let mut buf = [0u16; 8];
        for (i, w) in buf.iter_mut().enumerate() {
            *w = (v >> (112 - 16 * i)) as u16;
        }
        buf
    }

    #[test]
    fn test_shift_right_matches_u128() {
        let v: u128 = 0x2001_0db8_85a3_0000_0000_8a2e_0370_7334;
        for bits in [0usize, 1, 7, 15, 16, 17, 31, 64, 100, 127] {
            let mut buf = from_u128(v);
            shift_right(&mut buf, bits);
            assert_eq!(to_u128(&buf), v >> bits, "shift right by {bits}");
        }
    }

    #[test]
    fn test_shift_left_matches_u128() {
        let v: u128 = 0x2001_0db8_85a3_0000_0000_8a2e_0370_7334;
        for bits in [0usize, 1, 9, 16, 33, 48, 80, 127] {
            let mut buf = from_u128(v);
            shift_left(&mut buf, bits);
            assert_eq!(to_u128(&buf), v << bits, "shift left by {bits}");
        }
    }

    #[test]
    fn test_shift_full_width_zeroes() {
        let mut buf = [0xffffu16; 8];
        shift_right(&mut buf, 128);
        assert_eq!(buf, [0; 8]);
        let mut buf = [0xffffu16; 8];
        shift_left(&mut buf, 200);
        assert_eq!(buf, [0; 8]);
    }

    #[test]
    fn test_increase_carry_and_wrap() {
        let mut buf = [0, 0, 0, 0, 0, 0, 0, 0xffff];
        increase(&mut buf);
        assert_eq!(buf, [0, 0, 0, 0, 0, 0, 1, 0]);

        let mut buf = [0xffffu16; 8];
        increase(&mut buf);
        assert_eq!(buf, [0; 8]);
    }

    #[test]
    fn test_decrease_borrow_and_wrap() {
        let mut buf = [0, 0, 0, 0, 0, 0, 1, 0];
        decrease(&mut buf);
        assert_eq!(buf, [0, 0, 0, 0, 0, 0, 0, 0xffff]);

        let mut buf = [0u16; 8];
        decrease(&mut buf);
        assert_eq!(buf, [0xffff; 8]);
    }

    #[test]
    fn test_trailing_zeros() {
        assert_eq!(trailing_zeros(&[0u16; 8]), 128);
        assert_eq!(trailing_zeros(&[0, 0, 0, 0, 0, 0, 0x10, 0]), 20);
        assert_eq!(trailing_zeros(&[0, 0, 0, 0, 0, 0, 0, 1]), 0);
    }
}
