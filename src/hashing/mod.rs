use blake3::Hasher;

/// 32-byte cache key space for query results.
pub type QueryKey = [u8; 32];

/// Hashes canonical query bytes into a cache key.
#[inline]
pub fn hash_query_bytes(bytes: &[u8]) -> QueryKey {
    *blake3::hash(bytes).as_bytes()
}

/// Hashes a query's canonical form plus its page coordinates.
///
/// Identical filters + page + page size always produce the same key;
/// the page coordinates are length-prefixed separately so filter bytes
/// can never collide with them.
#[inline]
pub fn hash_query_page(canonical_query: &[u8], page: u32, page_size: u32) -> QueryKey {
    let mut hasher = Hasher::new();
    hasher.update(&(canonical_query.len() as u64).to_le_bytes());
    hasher.update(canonical_query);
    hasher.update(&page.to_le_bytes());
    hasher.update(&page_size.to_le_bytes());
    *hasher.finalize().as_bytes()
}
