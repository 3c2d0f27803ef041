// /////////////////////////////////////////////////////////////////////////////
// Inquest
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Document Chunking
//!
//! Splits document text into indexable chunks for the vector store. Paragraph
//! chunking is preferred (natural semantic units, ≤ `max_chars` per chunk);
//! texts without paragraph structure fall back to fixed-size character
//! windows with overlap.

/// Preferred chunk ceiling for paragraph chunking.
pub const PARAGRAPH_MAX_CHARS: usize = 800;
/// Window size for the fixed-size fallback.
pub const WINDOW_CHARS: usize = 512;
/// Overlap between consecutive windows.
pub const WINDOW_OVERLAP: usize = 50;

/// Chunks by blank-line paragraphs, packing consecutive paragraphs up to
/// `max_chars` per chunk.
pub fn chunk_by_paragraphs(text: &str, max_chars: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current: Vec<&str> = Vec::new();
    let mut current_len = 0usize;

    for para in text.split("\n\n").map(str::trim).filter(|p| !p.is_empty()) {
        let para_len = para.chars().count();
        if current_len + para_len + 2 > max_chars && !current.is_empty() {
            chunks.push(current.join("\n\n"));
            current.clear();
            current_len = 0;
        }
        current.push(para);
        current_len += para_len + 2;
    }
    if !current.is_empty() {
        chunks.push(current.join("\n\n"));
    }
    chunks
}

/// Fixed-size character windows with overlap. Guaranteed forward progress
/// even when `overlap >= size` would otherwise stall the cursor.
pub fn chunk_windows(text: &str, size: usize, overlap: usize) -> Vec<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() || size == 0 {
        return Vec::new();
    }
    let chars: Vec<char> = trimmed.chars().collect();
    let step = if overlap < size { size - overlap } else { size };
    let mut chunks = Vec::new();
    let mut start = 0usize;
    while start < chars.len() {
        let end = (start + size).min(chars.len());
        let chunk: String = chars[start..end].iter().collect();
        let chunk = chunk.trim().to_string();
        if !chunk.is_empty() {
            chunks.push(chunk);
        }
        if end == chars.len() {
            break;
        }
        start += step;
    }
    chunks
}

/// The chunking policy used by the semantic linker: paragraphs first, fixed
/// windows when the text has no usable paragraph structure.
pub fn chunk_for_indexing(text: &str) -> Vec<String> {
    let trimmed = text.trim();
    if trimmed.len() < 20 {
        return Vec::new();
    }
    let chunks = chunk_by_paragraphs(trimmed, PARAGRAPH_MAX_CHARS);
    if chunks.is_empty() {
        chunk_windows(trimmed, WINDOW_CHARS, WINDOW_OVERLAP)
    } else {
        chunks
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paragraph_chunks_pack_up_to_limit() {
        let text = "aaa\n\nbbb\n\nccc";
        let chunks = chunk_by_paragraphs(text, 9);
        assert_eq!(chunks, vec!["aaa\n\nbbb".to_string(), "ccc".to_string()]);
    }

    #[test]
    fn oversized_paragraph_still_emitted() {
        let big = "x".repeat(1000);
        let chunks = chunk_by_paragraphs(&big, 800);
        assert_eq!(chunks.len(), 1);
    }

    #[test]
    fn windows_overlap() {
        let text = "abcdefghij";
        let chunks = chunk_windows(text, 4, 2);
        assert_eq!(chunks[0], "abcd");
        assert_eq!(chunks[1], "cdef");
    }

    #[test]
    fn windows_terminate_on_degenerate_overlap() {
        let chunks = chunk_windows("abcdef", 2, 5);
        assert!(chunks.len() <= 3);
    }

    #[test]
    fn indexing_skips_tiny_texts() {
        assert!(chunk_for_indexing("tiny").is_empty());
    }
}
