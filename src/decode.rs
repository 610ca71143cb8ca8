//! Raw register decoding shared by the drivers

/// Compose little-endian register bytes (lowest address first) into an
/// unsigned value. At most four bytes are used.
pub fn compose_le(bytes: &[u8]) -> u32 {
    bytes
        .iter()
        .take(4)
        .enumerate()
        .fold(0u32, |acc, (i, b)| acc | (*b as u32) << (8 * i))
}

/// Interpret the low `bits` of `value` as a two's-complement number:
/// if bit `bits - 1` is set the result is `value - 2^bits`.
pub fn twos_complement(value: u32, bits: u32) -> i32 {
    debug_assert!((1..=32).contains(&bits));
    let value = value as i64 & ((1i64 << bits) - 1);
    if value & (1 << (bits - 1)) != 0 {
        (value - (1i64 << bits)) as i32
    } else {
        value as i32
    }
}

/// Signed 16-bit value from a little-endian byte pair
pub fn i16_from_le(low: u8, high: u8) -> i16 {
    twos_complement(compose_le(&[low, high]), 16) as i16
}

/// Signed 24-bit value from little-endian bytes (XL, L, H)
pub fn i24_from_le(xl: u8, l: u8, h: u8) -> i32 {
    twos_complement(compose_le(&[xl, l, h]), 24)
}

/// Round half away from zero to `places` decimal places
pub fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}
