//! MD5-based Ketama placement.
//!
//! Each physical node contributes groups of four virtual-node positions.
//! A group's four positions come from the four little-endian `u32` windows
//! of the MD5 digest of `"{address}#{group}"`; key placement uses the same
//! windowing over the digest of the raw key with group 0.

/// Compute the 16-byte MD5 digest of `bytes`.
pub fn digest(bytes: &[u8]) -> [u8; 16] {
    md5::compute(bytes).0
}

/// Extract the `i`-th little-endian 32-bit window of a 16-byte digest.
///
/// `i` must be in `0..4`.
pub fn place(digest: &[u8; 16], i: usize) -> u32 {
    let o = i * 4;
    u32::from_le_bytes([digest[o], digest[o + 1], digest[o + 2], digest[o + 3]])
}

/// Digest used to place the group-`group`-th four virtual nodes of `address`.
pub fn group_digest(address: &str, group: usize) -> [u8; 16] {
    digest(format!("{address}#{group}").as_bytes())
}

/// Ring position of a client-facing key.
pub fn key_hash(key: &[u8]) -> u32 {
    place(&digest(key), 0)
}

/// Host portion of a `host:port` address, or the whole address if there is
/// no port separator.
pub fn host_of(address: &str) -> &str {
    match address.rsplit_once(':') {
        Some((host, _port)) => host,
        None => address,
    }
}
