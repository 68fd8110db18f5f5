//! Response body assembly.
//!
//! A handler picks exactly one body variant: a raw payload (buffer or
//! stream), a server-sent event stream, or a resource. Selecting a second
//! variant fails. Once the handler returns, the transport assembles the
//! variant into an outbound byte stream plus the framing contract it
//! implies: a single known chunk yields `Content-Length`, anything open
//! ended yields chunked framing, and an explicit `Content-Length` set by the
//! handler is validated against the bytes actually emitted.

pub mod resource;
pub mod sse;

use crate::error::HttpError;
use crate::stream::Stream;
use bytes::{Bytes, BytesMut};

pub use resource::Resource;
pub use sse::{SseEvent, SseSender};

#[derive(Default)]
enum Variant {
    #[default]
    Unset,
    RawBuffer(Bytes),
    RawStream(Stream<Bytes>),
    Sse(Stream<SseEvent>),
    Resource(Resource),
}

/// Body builder attached to a response. Starts unset; handlers select one
/// variant at most.
#[derive(Default)]
pub struct ResponseBody {
    variant: Variant,
}

impl ResponseBody {
    /// Supply a literal payload.
    pub fn raw(&mut self, data: impl Into<Bytes>) -> Result<(), HttpError> {
        self.select(Variant::RawBuffer(data.into()))
    }

    /// Supply a streamed payload.
    pub fn raw_stream(&mut self, stream: Stream<Bytes>) -> Result<(), HttpError> {
        self.select(Variant::RawStream(stream))
    }

    /// Supply a server-sent event stream.
    pub fn sse(&mut self, events: Stream<SseEvent>) -> Result<(), HttpError> {
        self.select(Variant::Sse(events))
    }

    /// Serve a resource.
    pub fn resource(&mut self, resource: Resource) -> Result<(), HttpError> {
        self.select(Variant::Resource(resource))
    }

    pub fn is_set(&self) -> bool {
        !matches!(self.variant, Variant::Unset)
    }

    fn select(&mut self, variant: Variant) -> Result<(), HttpError> {
        if self.is_set() {
            return Err(HttpError::Internal("response body already set".into()));
        }
        self.variant = variant;
        Ok(())
    }
}

/// How the transport must frame the assembled body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Framing {
    /// No body bytes.
    Empty,
    /// Fixed size; the emitted byte count must equal it.
    ContentLength(u64),
    /// Open ended; HTTP/1.1 chunked transfer coding or HTTP/2 DATA frames.
    Chunked,
}

/// An assembled outbound body: headers to stamp (only where not already
/// set), the framing contract, and the byte stream itself.
#[derive(Debug)]
pub struct AssembledBody {
    pub headers: Vec<(&'static str, String)>,
    pub framing: Framing,
    pub data: Stream<Bytes>,
}

/// A fully drained body with its content-length contract enforced.
#[derive(Debug)]
pub struct CollectedBody {
    pub headers: Vec<(&'static str, String)>,
    pub framing: Framing,
    pub payload: Bytes,
}

impl AssembledBody {
    /// Drain the stream and enforce the content-length contract; a shortfall
    /// or overrun is a content length mismatch.
    pub fn collect(mut self) -> Result<CollectedBody, HttpError> {
        let mut buf = BytesMut::new();
        for chunk in &mut self.data {
            buf.extend_from_slice(&chunk);
        }
        if let Framing::ContentLength(expected) = self.framing {
            if buf.len() as u64 != expected {
                return Err(HttpError::Internal("content length mismatch".into()));
            }
        }
        Ok(CollectedBody {
            headers: self.headers,
            framing: self.framing,
            payload: buf.freeze(),
        })
    }
}

/// Turn the selected body variant into an outbound stream and framing.
///
/// `declared_content_length` is the value the handler wrote on the response,
/// if any; an inferable size that contradicts it fails immediately, an
/// open-ended stream is checked after draining.
pub fn assemble(
    body: ResponseBody,
    declared_content_length: Option<u64>,
) -> Result<AssembledBody, HttpError> {
    match body.variant {
        Variant::Unset => Ok(AssembledBody {
            headers: Vec::new(),
            framing: match declared_content_length {
                Some(expected) => Framing::ContentLength(expected),
                None => Framing::Empty,
            },
            data: Stream::empty(),
        }),
        Variant::RawBuffer(bytes) => {
            let framing = framing_for_size(bytes.len() as u64, declared_content_length)?;
            Ok(AssembledBody {
                headers: Vec::new(),
                framing,
                data: Stream::once(bytes),
            })
        }
        Variant::RawStream(mut stream) => {
            // a stream of exactly one chunk gets a content length, more
            // chunks fall back to chunked framing
            let first = stream.next();
            let Some(first) = first else {
                return Ok(AssembledBody {
                    headers: Vec::new(),
                    framing: framing_for_size(0, declared_content_length)?,
                    data: Stream::empty(),
                });
            };
            match stream.next() {
                None => {
                    let framing = framing_for_size(first.len() as u64, declared_content_length)?;
                    Ok(AssembledBody {
                        headers: Vec::new(),
                        framing,
                        data: Stream::once(first),
                    })
                }
                Some(second) => Ok(AssembledBody {
                    headers: Vec::new(),
                    framing: match declared_content_length {
                        Some(expected) => Framing::ContentLength(expected),
                        None => Framing::Chunked,
                    },
                    data: Stream::from_iter([first, second]).concat(stream),
                }),
            }
        }
        Variant::Sse(events) => Ok(AssembledBody {
            headers: vec![("content-type", sse::CONTENT_TYPE.to_string())],
            framing: Framing::Chunked,
            data: sse::frame_events(events),
        }),
        Variant::Resource(resource) => {
            let (meta, data) = resource.open()?;
            let framing = framing_for_size(meta.size, declared_content_length)?;
            Ok(AssembledBody {
                headers: vec![("content-type", meta.media_type.to_string())],
                framing,
                data,
            })
        }
    }
}

fn framing_for_size(size: u64, declared: Option<u64>) -> Result<Framing, HttpError> {
    match declared {
        Some(expected) if expected != size => {
            Err(HttpError::Internal("content length mismatch".into()))
        }
        _ => Ok(Framing::ContentLength(size)),
    }
}
