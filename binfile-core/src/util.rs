use crc_any::CRCu32;

/// crc32 (ISO-3309) over all given parts in order
pub(crate) fn checksum_crc32(parts: &[&[u8]]) -> u32 {
    let mut hasher = CRCu32::crc32();
    for part in parts {
        hasher.digest(part);
    }
    hasher.get_crc()
}

/// bytes before the first NUL, or all bytes if there is none
#[inline]
pub(crate) fn trim_nul(bs: &[u8]) -> &[u8] {
    match bs.iter().position(|&b| b == 0) {
        Some(end) => &bs[..end],
        None => bs,
    }
}
