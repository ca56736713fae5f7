//! CRC-32 checksum engine.
//!
//! The ZIP format records an IEEE 802.3 CRC-32 (the reflected variant with
//! polynomial 0xEDB88320, shared with gzip and PNG) for every entry's
//! uncompressed bytes. Readers use it to verify integrity after inflation.
//!
//! The implementation is the classic byte-at-a-time table walk. The 256-entry
//! table is built once at compile time and shared read-only by all calls.

/// Lookup table for polynomial 0xEDB88320 (reversed 0x04C11DB7).
///
/// Entry `i` starts from `i` and applies eight conditional shift-xor steps,
/// one per bit.
const CRC_TABLE: [u32; 256] = {
    let mut table = [0u32; 256];
    let mut i = 0;
    while i < 256 {
        let mut crc = i as u32;
        let mut j = 0;
        while j < 8 {
            if crc & 1 != 0 {
                crc = (crc >> 1) ^ 0xEDB88320;
            } else {
                crc >>= 1;
            }
            j += 1;
        }
        table[i] = crc;
        i += 1;
    }
    table
};

/// Compute the CRC-32 checksum of `data`.
///
/// Total over any finite byte sequence; the empty input yields `0` because
/// the initial and final inversions cancel.
#[inline]
pub fn crc32(data: &[u8]) -> u32 {
    let mut crc = 0xFFFFFFFF_u32;
    for &byte in data {
        let index = ((crc ^ byte as u32) & 0xFF) as usize;
        crc = (crc >> 8) ^ CRC_TABLE[index];
    }
    crc ^ 0xFFFFFFFF
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_crc32_empty() {
        assert_eq!(crc32(&[]), 0x00000000);
    }

    #[test]
    fn test_crc32_check_value() {
        // Standard check value: CRC-32 of "123456789" is 0xCBF43926
        assert_eq!(crc32(b"123456789"), 0xCBF43926);
    }

    #[test]
    fn test_crc32_single_byte() {
        // 'a' = 0x61; known value from the gzip/PNG CRC family
        assert_eq!(crc32(b"a"), 0xE8B7BE43);
    }
}
