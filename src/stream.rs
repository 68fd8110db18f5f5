//! Minimal single-subscriber stream abstraction.
//!
//! Response bodies and SSE framing are expressed with a small set of pull
//! combinators instead of a full reactive library: `map`, `concat`,
//! `flat_map_sequential`, `do_on_complete` and `do_on_cancel`. A stream is
//! consumed by value, which makes the single-subscriber rule structural, and
//! demand is the pull itself: an item is only produced when the consumer
//! asks for the next one.
//!
//! Channel-backed sources ride on `may` coroutine channels; receiving
//! suspends the consuming coroutine until a producer sends or hangs up, and
//! cancelling drops the receiver so later sends fail and become no-ops on
//! the producer side.

use may::sync::mpsc;

/// Pull source behind a [`Stream`].
pub trait Source<T>: Send {
    /// Produce the next item, or `None` once the source is exhausted.
    fn pull(&mut self) -> Option<T>;

    /// Release the source early; later pulls must return `None`.
    fn cancel(&mut self) {}
}

enum State {
    Active,
    Completed,
    Cancelled,
}

/// A single-subscriber pull stream.
pub struct Stream<T: 'static> {
    source: Box<dyn Source<T>>,
    state: State,
    on_complete: Option<Box<dyn FnOnce() + Send>>,
    on_cancel: Option<Box<dyn FnOnce() + Send>>,
}

impl<T: 'static> std::fmt::Debug for Stream<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Stream").finish_non_exhaustive()
    }
}

impl<T: Send + 'static> Stream<T> {
    pub fn from_source(source: impl Source<T> + 'static) -> Self {
        Stream {
            source: Box::new(source),
            state: State::Active,
            on_complete: None,
            on_cancel: None,
        }
    }

    /// The empty stream: completes on the first pull.
    pub fn empty() -> Self {
        Self::from_iter(std::iter::empty())
    }

    /// A one-item stream.
    pub fn once(item: T) -> Self {
        Self::from_iter(std::iter::once(item))
    }

    pub fn from_iter<I>(iter: I) -> Self
    where
        I: IntoIterator<Item = T>,
        I::IntoIter: Send + 'static,
    {
        struct Iter<I>(I);
        impl<T, I: Iterator<Item = T> + Send> Source<T> for Iter<I> {
            fn pull(&mut self) -> Option<T> {
                self.0.next()
            }
        }
        Self::from_source(Iter(iter.into_iter()))
    }

    /// A stream fed by a `may` channel. Pulling suspends until an item is
    /// sent; the stream completes when every sender is dropped. Cancelling
    /// drops the receiver, turning later sends into no-ops.
    pub fn from_channel(receiver: mpsc::Receiver<T>) -> Self {
        struct Channel<T>(Option<mpsc::Receiver<T>>);
        impl<T: Send> Source<T> for Channel<T> {
            fn pull(&mut self) -> Option<T> {
                self.0.as_ref().and_then(|rx| rx.recv().ok())
            }
            fn cancel(&mut self) {
                self.0 = None;
            }
        }
        Self::from_source(Channel(Some(receiver)))
    }

    /// Pull the next item. Completion runs the `do_on_complete` callback
    /// exactly once; a completed or cancelled stream keeps returning `None`.
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> Option<T> {
        if !matches!(self.state, State::Active) {
            return None;
        }
        match self.source.pull() {
            Some(item) => Some(item),
            None => {
                self.state = State::Completed;
                if let Some(callback) = self.on_complete.take() {
                    callback();
                }
                None
            }
        }
    }

    /// Cancel the stream, propagating to the source and running the
    /// `do_on_cancel` callback. Idempotent; completion and cancellation are
    /// mutually exclusive.
    pub fn cancel(&mut self) {
        if matches!(self.state, State::Active) {
            self.state = State::Cancelled;
            self.source.cancel();
            if let Some(callback) = self.on_cancel.take() {
                callback();
            }
        }
    }

    /// Transform every item.
    pub fn map<U, F>(self, transform: F) -> Stream<U>
    where
        U: Send + 'static,
        F: FnMut(T) -> U + Send + 'static,
    {
        struct Map<T: 'static, F>(Stream<T>, F);
        impl<T: Send, U, F: FnMut(T) -> U + Send> Source<U> for Map<T, F> {
            fn pull(&mut self) -> Option<U> {
                self.0.next().map(&mut self.1)
            }
            fn cancel(&mut self) {
                self.0.cancel();
            }
        }
        Stream::from_source(Map(self, transform))
    }

    /// This stream followed by `other`.
    pub fn concat(self, other: Stream<T>) -> Stream<T> {
        struct Concat<T: 'static> {
            first: Option<Stream<T>>,
            second: Stream<T>,
        }
        impl<T: Send> Source<T> for Concat<T> {
            fn pull(&mut self) -> Option<T> {
                if let Some(first) = &mut self.first {
                    if let Some(item) = first.next() {
                        return Some(item);
                    }
                    self.first = None;
                }
                self.second.next()
            }
            fn cancel(&mut self) {
                if let Some(first) = &mut self.first {
                    first.cancel();
                }
                self.second.cancel();
            }
        }
        Stream::from_source(Concat {
            first: Some(self),
            second: other,
        })
    }

    /// Expand every item into a stream and drain the inner streams one at a
    /// time, in order. Inner items are never interleaved.
    pub fn flat_map_sequential<U, F>(self, expand: F) -> Stream<U>
    where
        U: Send + 'static,
        F: FnMut(T) -> Stream<U> + Send + 'static,
    {
        struct FlatMap<T: 'static, U: 'static, F> {
            outer: Stream<T>,
            current: Option<Stream<U>>,
            expand: F,
        }
        impl<T: Send, U: Send, F: FnMut(T) -> Stream<U> + Send> Source<U> for FlatMap<T, U, F> {
            fn pull(&mut self) -> Option<U> {
                loop {
                    if let Some(inner) = &mut self.current {
                        if let Some(item) = inner.next() {
                            return Some(item);
                        }
                        self.current = None;
                    }
                    let next = self.outer.next()?;
                    self.current = Some((self.expand)(next));
                }
            }
            fn cancel(&mut self) {
                if let Some(inner) = &mut self.current {
                    inner.cancel();
                }
                self.outer.cancel();
            }
        }
        Stream::from_source(FlatMap {
            outer: self,
            current: None,
            expand,
        })
    }

    /// Run a callback when the stream completes normally.
    pub fn do_on_complete(mut self, callback: impl FnOnce() + Send + 'static) -> Self {
        self.on_complete = match self.on_complete.take() {
            None => Some(Box::new(callback)),
            Some(existing) => Some(Box::new(move || {
                existing();
                callback();
            })),
        };
        self
    }

    /// Run a callback when the stream is cancelled (explicitly or by being
    /// dropped before completion).
    pub fn do_on_cancel(mut self, callback: impl FnOnce() + Send + 'static) -> Self {
        self.on_cancel = match self.on_cancel.take() {
            None => Some(Box::new(callback)),
            Some(existing) => Some(Box::new(move || {
                existing();
                callback();
            })),
        };
        self
    }

}

impl<T: Send + 'static> Iterator for Stream<T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        Stream::next(self)
    }
}

impl<T: 'static> Drop for Stream<T> {
    fn drop(&mut self) {
        // dropping an unfinished stream counts as cancellation so held
        // resources are released
        if matches!(self.state, State::Active) {
            self.state = State::Cancelled;
            self.source.cancel();
            if let Some(callback) = self.on_cancel.take() {
                callback();
            }
        }
    }
}
