use crate::error::Result;
use crate::io::ImageSource;
use crate::types::{XFS_SUPERBLOCK_MAGIC, XFS_SUPERBLOCK_OFFSET};

/// Checks whether the image starts with the XFS superblock magic.
///
/// An image shorter than the magic is reported as a non-match. Only
/// genuine read failures are returned as errors.
pub fn detect_xfs_magic<S: ImageSource + ?Sized>(source: &mut S) -> Result<bool> {
    let mut magic = [0u8; XFS_SUPERBLOCK_MAGIC.len()];
    let n = source.read_chunk(XFS_SUPERBLOCK_OFFSET, &mut magic)?;
    let found = n == magic.len() && magic == XFS_SUPERBLOCK_MAGIC;
    tracing::debug!(found, bytes_read = n, "superblock magic check");
    Ok(found)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_detects_magic_at_start() {
        let mut image = b"XFSB".to_vec();
        image.resize(4096, 0);
        assert!(detect_xfs_magic(&mut Cursor::new(image)).unwrap());
    }

    #[test]
    fn test_exact_four_byte_image_matches() {
        assert!(detect_xfs_magic(&mut Cursor::new(b"XFSB".to_vec())).unwrap());
    }

    #[test]
    fn test_rejects_other_prefixes() {
        for prefix in [&b"XFSA"[..], b"xfsb", b"\x00XFS", b"IN\x81\xa4"] {
            let mut image = prefix.to_vec();
            image.resize(512, 0);
            assert!(!detect_xfs_magic(&mut Cursor::new(image)).unwrap());
        }
    }

    #[test]
    fn test_short_image_is_not_a_match() {
        assert!(!detect_xfs_magic(&mut Cursor::new(b"XFS".to_vec())).unwrap());
        assert!(!detect_xfs_magic(&mut Cursor::new(Vec::<u8>::new())).unwrap());
    }
}
