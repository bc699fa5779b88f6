/// `glTF` in little-endian byte order.
pub const GLB_MAGIC: [u8; 4] = *b"glTF";
pub const GLB_HEADER_LEN: usize = 12;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GlbHeader {
    pub version: u32,
    /// Total file length declared by the header.
    pub length: u32,
}

/// Parse the 12-byte GLB header: magic, version, total length.
pub fn parse_header(bytes: &[u8]) -> Option<GlbHeader> {
    if bytes.len() < GLB_HEADER_LEN || bytes[..4] != GLB_MAGIC {
        return None;
    }

    let word = |i: usize| u32::from_le_bytes([bytes[i], bytes[i + 1], bytes[i + 2], bytes[i + 3]]);
    Some(GlbHeader {
        version: word(4),
        length: word(8),
    })
}

#[cfg(test)]
pub(crate) fn minimal_glb() -> Vec<u8> {
    let mut bytes = Vec::with_capacity(GLB_HEADER_LEN);
    bytes.extend_from_slice(&GLB_MAGIC);
    bytes.extend_from_slice(&2u32.to_le_bytes());
    bytes.extend_from_slice(&(GLB_HEADER_LEN as u32).to_le_bytes());
    bytes
}
