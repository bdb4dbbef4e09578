//! Balanced container matching.
//!
//! A container opens with `{kind ...}` and closes with `{kind end}`.
//! Matching is block-scoped and counts depth per kind: only markers of
//! the *same* kind affect the depth, so a foreign container opening
//! inside the body passes through untouched and is resolved when the
//! body is processed recursively.

use std::collections::VecDeque;

use crate::error::Error;
use crate::pipeline::{Block, Marker};

/// Consume body blocks for a container whose open marker was just taken
/// from the stream.
///
/// Pops blocks until the balancing `{kind end}` (which is consumed but
/// not returned). Nested opens of the same kind increase depth. Running
/// out of blocks means the open marker at `open_line` was never closed.
pub(crate) fn collect_body(
    kind: &str,
    open_line: usize,
    blocks: &mut VecDeque<Block>,
) -> Result<Vec<Block>, Error> {
    let mut body = Vec::new();
    let mut depth = 1usize;

    while let Some(block) = blocks.pop_front() {
        if let Some(marker) = Marker::parse(&block.text) {
            if marker.kind() == kind {
                match marker {
                    Marker::Open { .. } => depth += 1,
                    Marker::Close { .. } => {
                        depth -= 1;
                        if depth == 0 {
                            tracing::trace!(kind, blocks = body.len(), "container closed");
                            return Ok(body);
                        }
                    }
                }
            }
        }
        body.push(block);
    }

    Err(Error::UnmatchedTag {
        tag: kind.to_owned(),
        line: open_line,
    })
}
