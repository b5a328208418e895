//! `mb_uint32`: big-endian base-128 integers with a continuation bit.
//!
//! Every byte but the last has its high bit set. `0x81 0x20` is `160`.

use crate::error::VarIntError;

/// Longest encoding of a `u32` (5 x 7 bits >= 32).
pub const MAX_LEN: usize = 5;

/// Decode a value starting at `cursor`, returning it with the cursor just
/// past the last byte read.
pub fn decode(bytes: &[u8], cursor: usize) -> Result<(u32, usize), VarIntError> {
    let mut value: u32 = 0;
    let mut pos = cursor;
    loop {
        let b = *bytes.get(pos).ok_or(VarIntError::Truncated)?;
        pos += 1;
        value = value
            .checked_mul(128)
            .and_then(|v| v.checked_add((b & 0x7f) as u32))
            .ok_or(VarIntError::Overflow)?;
        if b & 0x80 == 0 {
            return Ok((value, pos));
        }
    }
}

/// Append the minimal encoding of `value` to `out`.
pub fn write(mut value: u32, out: &mut Vec<u8>) {
    let mut tmp = [0u8; MAX_LEN];
    let mut i = MAX_LEN - 1;
    tmp[i] = (value & 0x7f) as u8;
    value >>= 7;
    while value > 0 {
        i -= 1;
        tmp[i] = 0x80 | (value & 0x7f) as u8;
        value >>= 7;
    }
    out.extend_from_slice(&tmp[i..]);
}

/// Minimal encoding of `value`.
pub fn encode(value: u32) -> Vec<u8> {
    let mut out = Vec::with_capacity(MAX_LEN);
    write(value, &mut out);
    out
}
