use uuid::Uuid;

/// Deterministic UUIDv5 over the identity of a chunk.
///
/// Re-indexing the same text for the same course, chapter and content type
/// overwrites the existing point instead of duplicating it.
pub fn stable_chunk_id(
    course_id: &str,
    chapter_id: Option<&str>,
    content_type: &str,
    content: &str,
) -> String {
    let key = format!(
        "{course_id}\u{1f}{}\u{1f}{content_type}\u{1f}{content}",
        chapter_id.unwrap_or_default()
    );
    Uuid::new_v5(&Uuid::NAMESPACE_URL, key.as_bytes()).to_string()
}
