//! SSE transport for generation streams

use std::convert::Infallible;
use std::time::Instant;

use axum::response::sse::{Event, Sse};
use futures_util::{Stream, StreamExt};
use sitesmith_pipeline::{BundleAccumulator, ChunkStream, CodeBundle, RequestKind, StreamChunk};
use tokio::sync::OwnedSemaphorePermit;

/// Per-stream bookkeeping, logged when the stream is dropped
///
/// Holds the concurrency permit, so the slot is released only once the
/// client has received the whole stream or gone away.
pub struct StreamTracker {
    kind: RequestKind,
    started: Instant,
    bundle: BundleAccumulator,
    errors: usize,
    _permit: OwnedSemaphorePermit,
}

impl StreamTracker {
    pub fn new(kind: RequestKind, permit: OwnedSemaphorePermit, initial: CodeBundle) -> Self {
        Self {
            kind,
            started: Instant::now(),
            bundle: BundleAccumulator::with_initial(initial),
            errors: 0,
            _permit: permit,
        }
    }

    fn observe(&mut self, chunk: &StreamChunk) {
        match chunk {
            StreamChunk::TextDelta { text } => {
                self.bundle.push(text);
            }
            StreamChunk::ErrorEvent { .. } => self.errors += 1,
        }
    }
}

impl Drop for StreamTracker {
    fn drop(&mut self) {
        let bundle = self.bundle.bundle();
        log::info!(
            "Finished {} stream in {:.1}s: {} chunks, {} errors, bundle html={}B css={}B js={}B",
            self.kind.as_str(),
            self.started.elapsed().as_secs_f64(),
            self.bundle.deltas(),
            self.errors,
            bundle.html.len(),
            bundle.css.len(),
            bundle.js.len()
        );
    }
}

/// Wrap a chunk stream as `text/event-stream`, one `data:` line per chunk
pub fn sse_response(
    chunks: ChunkStream,
    mut tracker: StreamTracker,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let events = chunks.map(move |chunk| {
        tracker.observe(&chunk);
        Ok(Event::default().data(chunk.sse_data()))
    });
    Sse::new(events)
}
