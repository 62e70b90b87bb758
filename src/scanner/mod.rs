//! Occurrence scanner: finds every occurrence of an entity's name in a
//! document body and extracts a bounded context window around each.
//!
//! Matching is case-insensitive and literal — the name is escaped before
//! compilation so regex metacharacters in names ("Smith (Jr.)") match
//! themselves. Overlapping windows are extracted independently; a keyword
//! sitting in the overlap region is counted once per window downstream.

use regex::RegexBuilder;
use tracing::warn;
use uuid::Uuid;

/// Characters of context captured on each side of a name occurrence.
pub const CONTEXT_WINDOW_RADIUS: usize = 250;

/// The slice of document text surrounding one occurrence of an entity's
/// name. Ephemeral: exists only during scoring, never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContextWindow {
    pub document_id: Uuid,
    pub entity_id: Uuid,
    pub text: String,
    /// Byte offset of the window start in the document content.
    pub start_offset: usize,
    /// Byte offset one past the window end.
    pub end_offset: usize,
}

impl ContextWindow {
    /// Window length in chars.
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }
}

/// Scans document bodies for entity-name occurrences.
#[derive(Debug, Clone, Copy)]
pub struct OccurrenceScanner {
    radius: usize,
}

impl OccurrenceScanner {
    pub fn new() -> Self {
        Self {
            radius: CONTEXT_WINDOW_RADIUS,
        }
    }

    /// Overrides the window radius (chars per side).
    pub fn with_radius(radius: usize) -> Self {
        Self { radius }
    }

    pub fn radius(&self) -> usize {
        self.radius
    }

    /// Returns one window per occurrence of `full_name` in `content`,
    /// in document order.
    ///
    /// Empty content, blank names, and names the regex engine rejects all
    /// yield zero windows — malformed input is recovered locally, never
    /// propagated.
    pub fn scan(
        &self,
        entity_id: Uuid,
        document_id: Uuid,
        full_name: &str,
        content: &str,
    ) -> Vec<ContextWindow> {
        let name = full_name.trim();
        if name.is_empty() || content.is_empty() {
            return Vec::new();
        }

        let pattern = match RegexBuilder::new(&regex::escape(name))
            .case_insensitive(true)
            .build()
        {
            Ok(p) => p,
            Err(e) => {
                warn!(%entity_id, error = %e, "entity name not matchable, skipping document");
                return Vec::new();
            }
        };

        pattern
            .find_iter(content)
            .map(|m| {
                let start_offset = chars_back(content, m.start(), self.radius);
                let end_offset = chars_forward(content, m.end(), self.radius);
                ContextWindow {
                    document_id,
                    entity_id,
                    text: content[start_offset..end_offset].to_string(),
                    start_offset,
                    end_offset,
                }
            })
            .collect()
    }
}

impl Default for OccurrenceScanner {
    fn default() -> Self {
        Self::new()
    }
}

/// Byte offset `n` chars before `idx`, clamped to the start of `content`.
fn chars_back(content: &str, idx: usize, n: usize) -> usize {
    if n == 0 {
        return idx;
    }
    content[..idx]
        .char_indices()
        .rev()
        .nth(n - 1)
        .map(|(i, _)| i)
        .unwrap_or(0)
}

/// Byte offset `n` chars after `idx`, clamped to the end of `content`.
fn chars_forward(content: &str, idx: usize, n: usize) -> usize {
    content[idx..]
        .char_indices()
        .nth(n)
        .map(|(i, _)| idx + i)
        .unwrap_or(content.len())
}
