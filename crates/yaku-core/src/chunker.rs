//! Size-bounded text chunking on sentence boundaries.
//!
//! Lengths are counted in chars, so a hard split never lands inside a
//! UTF-8 sequence.

/// One segment of a request text, tagged with its position
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    pub index: usize,
    pub text: String,
}

/// Ordered chunks derived from one text
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChunkSet {
    chunks: Vec<Chunk>,
}

impl ChunkSet {
    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Chunk> {
        self.chunks.iter()
    }

    pub fn texts(&self) -> Vec<&str> {
        self.chunks.iter().map(|c| c.text.as_str()).collect()
    }

    pub fn into_chunks(self) -> Vec<Chunk> {
        self.chunks
    }
}

fn is_terminator(c: char) -> bool {
    matches!(c, '.' | '!' | '?' | '。' | '！' | '？' | '…')
}

/// A sentence ends after a run of terminators. A trailing `.` only counts
/// when followed by whitespace or the end of text.
fn ends_sentence(c: char, next: Option<char>) -> bool {
    if !is_terminator(c) || next.is_some_and(is_terminator) {
        return false;
    }
    c != '.' || next.is_none_or(char::is_whitespace)
}

/// Take the longest run of whole sentences from the front of `text` that
/// fits in `max_chars`. Returns the trimmed chunk and the unconsumed rest.
/// A leading sentence longer than `max_chars` is cut at `max_chars`.
pub fn next_chunk(text: &str, max_chars: usize) -> Option<(&str, &str)> {
    let text = text.trim_start();
    if text.is_empty() {
        return None;
    }
    let max_chars = max_chars.max(1);

    let mut boundary = None;
    let mut hard_cut = text.len();
    let mut overflow = false;
    let mut count = 0;

    let mut chars = text.char_indices().peekable();
    while let Some((idx, c)) = chars.next() {
        count += 1;
        if count > max_chars {
            overflow = true;
            break;
        }

        let end = idx + c.len_utf8();
        if count == max_chars {
            hard_cut = end;
        }
        if ends_sentence(c, chars.peek().map(|&(_, n)| n)) {
            boundary = Some(end);
        }
    }

    if !overflow {
        return Some((text.trim_end(), ""));
    }

    let cut = boundary.unwrap_or(hard_cut);
    Some((text[..cut].trim_end(), &text[cut..]))
}

/// Split `text` into chunks of at most `max_chars`. Text that already fits
/// comes back as a single chunk equal to the input.
pub fn split(text: &str, max_chars: usize) -> ChunkSet {
    if text.chars().count() <= max_chars {
        return ChunkSet {
            chunks: vec![Chunk {
                index: 0,
                text: text.to_string(),
            }],
        };
    }

    let mut chunks = Vec::new();
    let mut rest = text;
    while let Some((chunk, remainder)) = next_chunk(rest, max_chars) {
        chunks.push(Chunk {
            index: chunks.len(),
            text: chunk.to_string(),
        });
        rest = remainder;
    }

    ChunkSet { chunks }
}

/// Concatenate chunks in index order with a single space
pub fn join<'a>(chunks: impl IntoIterator<Item = &'a Chunk>) -> String {
    let mut ordered: Vec<&Chunk> = chunks.into_iter().collect();
    ordered.sort_by_key(|c| c.index);
    ordered
        .iter()
        .map(|c| c.text.as_str())
        .collect::<Vec<_>>()
        .join(" ")
}
