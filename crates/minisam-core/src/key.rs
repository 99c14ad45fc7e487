//! A [`Key`] packs a character in its 8 high bits and an index in the 56 low
//! bits, so `key('x', 1)` prints as `x1`.

use crate::KeyError;

pub type Key = u64;

const CHAR_BITS: u32 = 8;
const INDEX_BITS: u32 = u64::BITS - CHAR_BITS;
const INDEX_MASK: u64 = (1 << INDEX_BITS) - 1;

/// Build a key from a character and an index.
///
/// # Errors
///
/// Fails when `c` is not ASCII or `index` needs more than 56 bits.
///
/// # Example
///
/// ```rust
/// use minisam_core::{key, key_char, key_index, key_string};
///
/// let k = key('x', 12).unwrap();
/// assert_eq!(key_char(k), 'x');
/// assert_eq!(key_index(k), 12);
/// assert_eq!(key_string(k), "x12");
/// ```
pub fn key(c: char, index: u64) -> Result<Key, KeyError> {
    if !c.is_ascii() {
        return Err(KeyError::NonAsciiChar(c));
    }
    if index > INDEX_MASK {
        return Err(KeyError::IndexOverflow(index));
    }
    Ok((c as u64) << INDEX_BITS | index)
}

pub fn key_char(key: Key) -> char {
    ((key >> INDEX_BITS) as u8) as char
}

pub fn key_index(key: Key) -> u64 {
    key & INDEX_MASK
}

/// Human readable form of a key: `x12`, or the raw number when the
/// character byte is not printable.
pub fn key_string(key: Key) -> String {
    let c = key_char(key);
    if c.is_ascii_graphic() {
        format!("{}{}", c, key_index(key))
    } else {
        key.to_string()
    }
}
