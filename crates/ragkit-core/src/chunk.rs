//! Paragraph-boundary text chunker.
//!
//! Splits a source file's text into [`Chunk`]s that respect a configurable
//! `max_tokens` limit. Splitting occurs on paragraph boundaries (`\n\n`)
//! so each chunk stays semantically coherent; a single oversized paragraph
//! is hard-split at the nearest newline or space.
//!
//! Chunk ids are `<stem>-<n>` with `n` starting at 1, matching the naming
//! of the ingested-collection JSON. Each chunk also carries a SHA-256 hash
//! of its text so the ingest pipeline can detect unchanged chunks.

use sha2::{Digest, Sha256};

/// A chunk of source text ready to become a collection [`Document`](crate::models::Document).
#[derive(Debug, Clone)]
pub struct Chunk {
    pub id: String,
    pub text: String,
    pub hash: String,
}

/// Approximate characters-per-token ratio (4 chars ≈ 1 token).
const CHARS_PER_TOKEN: usize = 4;

/// Split `text` into chunks on paragraph boundaries, respecting `max_tokens`.
///
/// Returns an empty vector for empty or whitespace-only input. Otherwise:
/// - chunk ids are `<stem>-1`, `<stem>-2`, … in text order;
/// - chunks split on `\n\n` boundaries when possible;
/// - oversized paragraphs hard-split at newline/space boundaries.
pub fn chunk_text(stem: &str, text: &str, max_tokens: usize) -> Vec<Chunk> {
    let max_chars = max_tokens.max(1) * CHARS_PER_TOKEN;

    let mut pieces: Vec<String> = Vec::new();
    let mut buf = String::new();

    for para in text.split("\n\n") {
        let trimmed = para.trim();
        if trimmed.is_empty() {
            continue;
        }

        let would_be = if buf.is_empty() {
            trimmed.len()
        } else {
            buf.len() + 2 + trimmed.len()
        };

        if would_be > max_chars && !buf.is_empty() {
            pieces.push(std::mem::take(&mut buf));
        }

        if trimmed.len() > max_chars {
            if !buf.is_empty() {
                pieces.push(std::mem::take(&mut buf));
            }
            hard_split(trimmed, max_chars, &mut pieces);
            continue;
        }

        if !buf.is_empty() {
            buf.push_str("\n\n");
        }
        buf.push_str(trimmed);
    }

    if !buf.is_empty() {
        pieces.push(buf);
    }

    pieces
        .into_iter()
        .enumerate()
        .map(|(i, text)| make_chunk(stem, i + 1, text))
        .collect()
}

/// Split an oversized paragraph into `max_chars`-bounded pieces, preferring
/// newline then space boundaries, never splitting inside a UTF-8 character.
fn hard_split(paragraph: &str, max_chars: usize, out: &mut Vec<String>) {
    let mut remaining = paragraph;
    while !remaining.is_empty() {
        if remaining.len() <= max_chars {
            out.push(remaining.to_string());
            break;
        }

        let ceiling = snap_to_char_boundary(remaining, max_chars);
        let window = &remaining[..ceiling];
        let mut split_at = window
            .rfind('\n')
            .or_else(|| window.rfind(' '))
            .map(|pos| pos + 1)
            .unwrap_or(ceiling);
        split_at = snap_to_char_boundary(remaining, split_at);
        if split_at == 0 {
            // No boundary inside the window; take one whole character.
            split_at = remaining
                .char_indices()
                .nth(1)
                .map(|(i, _)| i)
                .unwrap_or(remaining.len());
        }

        let piece = remaining[..split_at].trim_end();
        if !piece.is_empty() {
            out.push(piece.to_string());
        }
        remaining = remaining[split_at..].trim_start();
    }
}

/// Largest char boundary at or below `at`.
fn snap_to_char_boundary(s: &str, at: usize) -> usize {
    let mut at = at.min(s.len());
    while at > 0 && !s.is_char_boundary(at) {
        at -= 1;
    }
    at
}

fn make_chunk(stem: &str, ordinal: usize, text: String) -> Chunk {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    let hash = format!("{:x}", hasher.finalize());
    Chunk {
        id: format!("{stem}-{ordinal}"),
        text,
        hash,
    }
}
