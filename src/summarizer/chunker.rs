// Chunk boundaries are plain character offsets, not token or word
// boundaries. The generation model tolerates mid-word splits; what matters
// is that every chunk stays under the input limit of the remote model.

// Split a body into fixed-size character chunks covering it start to end
// with no gaps. Consecutive chunks overlap by `overlap` characters when
// configured; whitespace-only chunks are dropped.
pub fn split_into_chunks(body: &str, chunk_size: usize, overlap: usize) -> Vec<String> {
    if chunk_size == 0 {
        return Vec::new();
    }
    // The window must keep moving forward
    let overlap = overlap.min(chunk_size - 1);

    let characters: Vec<char> = body.chars().collect();
    let mut chunks = Vec::new();
    let mut start = 0;

    while start < characters.len() {
        let end = (start + chunk_size).min(characters.len());
        let chunk: String = characters[start..end].iter().collect();
        if !chunk.trim().is_empty() {
            chunks.push(chunk);
        }
        if end == characters.len() {
            break;
        }
        start = end - overlap;
    }

    chunks
}

// Cap a summary at `max_chars` characters, cutting at the last period at
// or before the cap so the text never stops mid-sentence. Only when the
// capped text contains no period at all does this fall back to a hard cut.
pub fn truncate_at_sentence(text: &str, max_chars: usize) -> String {
    let characters: Vec<char> = text.chars().collect();
    if characters.len() <= max_chars {
        return text.to_string();
    }

    let head = &characters[..max_chars];
    match head.iter().rposition(|c| *c == '.') {
        Some(position) => head[..=position].iter().collect(),
        None => head.iter().collect(),
    }
}
