//! Fixed-width text chunking

/// Split `text` into slices of at most `limit` characters
///
/// Counts Unicode scalar values and cuts at fixed positions, not at word
/// boundaries. Empty text yields no chunks.
pub fn chunk_text(text: &str, limit: usize) -> Vec<&str> {
    let limit = limit.max(1);
    let mut chunks = Vec::new();
    let mut start = 0;
    let mut count = 0;

    for (index, _) in text.char_indices() {
        if count == limit {
            chunks.push(&text[start..index]);
            start = index;
            count = 0;
        }
        count += 1;
    }
    if start < text.len() {
        chunks.push(&text[start..]);
    }
    chunks
}
