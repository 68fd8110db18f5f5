//! Server-Sent Events framing.
//!
//! Each event frames as `id:<id>\n` (if set), `event:<name>\n` (if set),
//! `:<comment>\n` (if set) and `data:` followed by the payload, terminated
//! by `\r\n\r\n`. Every CRLF, CR or LF inside the comment is rewritten as
//! `\r\n:`, inside the payload as `\r\ndata:`, so a conformant client
//! reassembles the original bytes. UTF-8 throughout.
//!
//! Producers usually feed events through a coroutine channel pair:
//!
//! ```
//! use switchyard::body::sse::{self, SseEvent};
//!
//! let (sender, events) = sse::channel();
//! sender.send(SseEvent::new().event("tick").data("1"));
//! drop(sender);
//! let wire: Vec<u8> = sse::frame_events(events).flatten().collect();
//! assert_eq!(wire, b"event:tick\ndata:1\r\n\r\n");
//! ```

use crate::stream::Stream;
use bytes::{BufMut, Bytes, BytesMut};
use may::sync::mpsc;

/// Content type stamped on every SSE response.
pub const CONTENT_TYPE: &str = "text/event-stream;charset=utf-8";

const CR: u8 = b'\r';
const LF: u8 = b'\n';

/// One server-sent event.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SseEvent {
    id: Option<String>,
    event: Option<String>,
    comment: Option<String>,
    data: Option<Bytes>,
}

impl SseEvent {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn event(mut self, event: impl Into<String>) -> Self {
        self.event = Some(event.into());
        self
    }

    pub fn comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    pub fn data(mut self, data: impl Into<Bytes>) -> Self {
        self.data = Some(data.into());
        self
    }
}

/// Frame a stream of events into wire bytes. Events keep their source
/// order; one event's bytes are never interleaved with another's.
pub fn frame_events(events: Stream<SseEvent>) -> Stream<Bytes> {
    events.flat_map_sequential(|event| {
        let meta = Stream::once(frame_metadata(&event));
        let framed = match &event.data {
            Some(data) => meta.concat(Stream::once(escape_data(data))),
            None => meta,
        };
        framed.concat(Stream::once(Bytes::from_static(b"\r\n\r\n")))
    })
}

/// The metadata lines of one event, ending with the `data:` marker when the
/// event carries a payload.
fn frame_metadata(event: &SseEvent) -> Bytes {
    let mut meta = BytesMut::new();
    if let Some(id) = &event.id {
        meta.put_slice(b"id:");
        meta.put_slice(id.as_bytes());
        meta.put_u8(LF);
    }
    if let Some(name) = &event.event {
        meta.put_slice(b"event:");
        meta.put_slice(name.as_bytes());
        meta.put_u8(LF);
    }
    if let Some(comment) = &event.comment {
        meta.put_u8(b':');
        meta.put_slice(escape_line_breaks(comment.as_bytes(), b"\r\n:").as_ref());
        meta.put_u8(LF);
    }
    if event.data.is_some() {
        meta.put_slice(b"data:");
    }
    meta.freeze()
}

fn escape_data(data: &Bytes) -> Bytes {
    escape_line_breaks(data, b"\r\ndata:")
}

/// Rewrite every CRLF, CR or LF as the given continuation sequence.
fn escape_line_breaks(input: &[u8], continuation: &'static [u8]) -> Bytes {
    let mut out = BytesMut::with_capacity(input.len());
    let mut i = 0;
    while i < input.len() {
        match input[i] {
            CR => {
                if input.get(i + 1) == Some(&LF) {
                    i += 1;
                }
                out.put_slice(continuation);
            }
            LF => out.put_slice(continuation),
            byte => out.put_u8(byte),
        }
        i += 1;
    }
    out.freeze()
}

/// Producer half of an SSE channel. Clone to feed events from several
/// coroutines; sends after the consumer went away are no-ops.
#[derive(Clone)]
pub struct SseSender {
    tx: mpsc::Sender<SseEvent>,
}

impl SseSender {
    pub fn send(&self, event: SseEvent) {
        let _ = self.tx.send(event);
    }
}

/// Create an SSE channel: a sender plus the event stream to hand to
/// [`crate::body::ResponseBody::sse`]. The stream completes once every
/// sender is dropped.
pub fn channel() -> (SseSender, Stream<SseEvent>) {
    let (tx, rx) = mpsc::channel();
    (SseSender { tx }, Stream::from_channel(rx))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame_one(event: SseEvent) -> Vec<u8> {
        frame_events(Stream::once(event))
            .fold(Vec::new(), |mut acc, chunk| {
                acc.extend_from_slice(&chunk);
                acc
            })
    }

    #[test]
    fn test_full_event() {
        let framed = frame_one(SseEvent::new().id("42").event("tick").data("a"));
        assert_eq!(framed, b"id:42\nevent:tick\ndata:a\r\n\r\n");
    }

    #[test]
    fn test_data_line_breaks_become_data_lines() {
        let framed = frame_one(SseEvent::new().data("a\nb"));
        assert_eq!(framed, b"data:a\r\ndata:b\r\n\r\n");
        let framed = frame_one(SseEvent::new().data("a\r\nb\rc"));
        assert_eq!(framed, b"data:a\r\ndata:b\r\ndata:c\r\n\r\n");
    }

    #[test]
    fn test_comment_line_breaks() {
        let framed = frame_one(SseEvent::new().comment("x\ny"));
        assert_eq!(framed, b":x\r\n:y\n\r\n\r\n");
    }

    #[test]
    fn test_event_without_data_has_no_data_line() {
        let framed = frame_one(SseEvent::new().event("ping"));
        assert_eq!(framed, b"event:ping\n\r\n\r\n");
    }

    #[test]
    fn test_events_are_not_interleaved() {
        let events = Stream::from_iter([
            SseEvent::new().data("1"),
            SseEvent::new().data("2"),
        ]);
        let framed: Vec<u8> = frame_events(events).fold(Vec::new(), |mut acc, chunk| {
            acc.extend_from_slice(&chunk);
            acc
        });
        assert_eq!(framed, b"data:1\r\n\r\ndata:2\r\n\r\n");
    }

    #[test]
    fn test_channel_pair() {
        let (sender, events) = channel();
        sender.send(SseEvent::new().data("x"));
        drop(sender);
        let framed: Vec<u8> = frame_events(events).flatten().collect();
        assert_eq!(framed, b"data:x\r\n\r\n");
    }
}
