//! Outbound text shaping: model labels and length-bounded chunking.

use crate::messaging::types::{CHUNK_LIMIT, MESSAGE_LIMIT};

/// Follow-ups sent after the edited placeholder; later chunks are dropped.
pub const MAX_FOLLOW_UPS: usize = 2;

const CONTINUED: &str = "...";

/// Length as Discord counts it for the message ceiling (characters, not bytes).
pub fn char_len(s: &str) -> usize {
    s.chars().count()
}

/// Split `text` into ordered pieces of at most `limit` characters.
///
/// Never splits inside a UTF-8 sequence. Newlines are kept as ordinary
/// characters. Empty input yields a single empty chunk.
pub fn split_chunks(text: &str, limit: usize) -> Vec<String> {
    let limit = limit.max(1);
    let mut out = Vec::new();
    let mut rest = text;

    loop {
        let (head, tail) = split_at_chars(rest, limit);
        out.push(head.to_string());
        if tail.is_empty() {
            break;
        }
        rest = tail;
    }
    out
}

fn split_at_chars(s: &str, n: usize) -> (&str, &str) {
    match s.char_indices().nth(n) {
        Some((idx, _)) => s.split_at(idx),
        None => (s, ""),
    }
}

pub fn model_label(model: &str) -> String {
    format!("🤖 **{model}** yanıtı:\n\n")
}

/// Messages for one `/ai` answer: the placeholder edit plus follow-ups.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChunkedReply {
    pub first: String,
    pub follow_ups: Vec<String>,
    /// Chunks beyond the follow-up cap that were not sent.
    pub dropped: usize,
}

impl ChunkedReply {
    /// Lay out `response` for a model-labeled reply.
    ///
    /// A response that fits in [`MESSAGE_LIMIT`] characters together with its
    /// label goes out as a single edit. Anything longer is split at
    /// [`CHUNK_LIMIT`]; the first chunk replaces the placeholder, the next
    /// [`MAX_FOLLOW_UPS`] become follow-ups, and each piece except the overall
    /// last carries a `...` continuation marker.
    pub fn for_model(model: &str, response: &str) -> Self {
        let label = model_label(model);

        if char_len(&label) + char_len(response) <= MESSAGE_LIMIT {
            return Self {
                first: format!("{label}{response}"),
                follow_ups: Vec::new(),
                dropped: 0,
            };
        }

        let chunks = split_chunks(response, CHUNK_LIMIT);
        let last = chunks.len() - 1;

        let first = format!("{label}{}{CONTINUED}", chunks[0]);
        let follow_ups = chunks
            .iter()
            .enumerate()
            .skip(1)
            .take(MAX_FOLLOW_UPS)
            .map(|(i, c)| {
                if i == last {
                    c.clone()
                } else {
                    format!("{c}{CONTINUED}")
                }
            })
            .collect::<Vec<_>>();
        let dropped = chunks.len().saturating_sub(1 + MAX_FOLLOW_UPS);

        Self {
            first,
            follow_ups,
            dropped,
        }
    }
}

/// Unknown latency (no heartbeat acknowledged yet) renders as `-1ms`.
pub fn format_latency(latency: Option<std::time::Duration>) -> String {
    match latency {
        Some(d) => format!("{}ms", d.as_millis()),
        None => "-1ms".to_string(),
    }
}
