//! The base62 alphabet shared by generators and short code validation.

/// Digits, then upper case, then lower case letters.
pub const ALPHABET: &[u8; 62] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz";

const BASE: u64 = ALPHABET.len() as u64;

/// Returns `true` if `c` belongs to the base62 alphabet.
pub fn is_base62(c: char) -> bool {
    c.is_ascii_alphanumeric()
}

/// Encodes `n` in its shortest base62 form. Zero encodes as `"0"`.
pub fn encode(mut n: u64) -> String {
    if n == 0 {
        return "0".to_string();
    }

    // u64::MAX needs 11 symbols
    let mut buf = Vec::with_capacity(11);
    while n > 0 {
        buf.push(ALPHABET[(n % BASE) as usize]);
        n /= BASE;
    }
    buf.reverse();

    // every byte comes from ALPHABET, which is ASCII
    buf.into_iter().map(char::from).collect()
}

/// Encodes `n` in base62, left-padded with `'0'` to at least `width` symbols.
pub fn encode_padded(n: u64, width: usize) -> String {
    let encoded = encode(n);
    if encoded.len() >= width {
        return encoded;
    }

    let mut padded = "0".repeat(width - encoded.len());
    padded.push_str(&encoded);
    padded
}
