//! Event navigation session.
//!
//! A [`Session`] owns an [`EventSource`], the index of the event on display
//! and that event's data. Navigation loads the target event first and only
//! then replaces the current one, so a failed load or an out-of-range
//! request leaves the session untouched.

use log::{info, warn};

use crate::{Error, Event, Result};

/// Anything that can hand out events by index.
pub trait EventSource {
    /// Number of events available.
    fn len(&self) -> usize;

    /// Returns true if the source holds no events.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Loads one event.
    ///
    /// # Errors
    /// Implementations return [`Error::EventOutOfRange`] for indices
    /// `>= len()` and [`Error::Source`] for backend failures.
    fn load(&self, index: usize) -> Result<Event>;
}

impl<T: EventSource + ?Sized> EventSource for Box<T> {
    fn len(&self) -> usize {
        (**self).len()
    }

    fn load(&self, index: usize) -> Result<Event> {
        (**self).load(index)
    }
}

impl EventSource for Vec<Event> {
    fn len(&self) -> usize {
        self.as_slice().len()
    }

    fn load(&self, index: usize) -> Result<Event> {
        self.get(index).cloned().ok_or(Error::EventOutOfRange {
            index,
            len: self.as_slice().len(),
        })
    }
}

/// Outcome of a navigation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
    /// A different event is now current.
    Moved { from: usize, to: usize },
    /// The request could not be honoured; the current event was kept.
    Unchanged,
}

/// The active event and the source it came from.
pub struct Session<S> {
    source: S,
    index: usize,
    event: Event,
}

impl<S: EventSource> Session<S> {
    /// Opens a session on `requested`, clamping to the last event if the
    /// source is shorter.
    ///
    /// # Errors
    /// Returns [`Error::NoEvents`] for an empty source, or the load error of
    /// the initial event.
    pub fn open(source: S, requested: usize) -> Result<Self> {
        let len = source.len();
        if len == 0 {
            return Err(Error::NoEvents);
        }
        let index = if requested >= len {
            warn!("requested event {requested} is beyond the {len} events in the file; showing event {}", len - 1);
            len - 1
        } else {
            requested
        };
        let event = source.load(index)?;
        info!("opened event {index} of {len} ({} hits)", event.len());
        Ok(Self {
            source,
            index,
            event,
        })
    }

    /// Index of the current event.
    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }

    /// Number of events in the source.
    #[must_use]
    pub fn len(&self) -> usize {
        self.source.len()
    }

    /// Always false: a session cannot be opened on an empty source.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.source.is_empty()
    }

    /// The current event.
    #[must_use]
    pub fn event(&self) -> &Event {
        &self.event
    }

    /// The underlying source.
    #[must_use]
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Moves to the following event.
    ///
    /// At the last event this is a no-op that logs a notice.
    ///
    /// # Errors
    /// Propagates load failures; the current event is kept.
    pub fn next(&mut self) -> Result<Navigation> {
        if self.index + 1 >= self.len() {
            warn!("at end of file, no more events to load");
            return Ok(Navigation::Unchanged);
        }
        self.replace(self.index + 1)
    }

    /// Moves to the preceding event.
    ///
    /// At the first event this is a no-op that logs a notice.
    ///
    /// # Errors
    /// Propagates load failures; the current event is kept.
    pub fn prev(&mut self) -> Result<Navigation> {
        if self.index == 0 {
            warn!("at start of file, no earlier events to load");
            return Ok(Navigation::Unchanged);
        }
        self.replace(self.index - 1)
    }

    /// Jumps to `index`. Out-of-range requests are a no-op with a notice.
    ///
    /// # Errors
    /// Propagates load failures; the current event is kept.
    pub fn goto(&mut self, index: usize) -> Result<Navigation> {
        let len = self.len();
        if index >= len {
            warn!("event {index} is beyond the {len} events in the file");
            return Ok(Navigation::Unchanged);
        }
        if index == self.index {
            return Ok(Navigation::Unchanged);
        }
        self.replace(index)
    }

    /// "Next event" with an optional typed event number: a typed number that
    /// differs from the current event and has a successor in the source is
    /// jumped to, otherwise the session advances by one. Typing the last
    /// event number therefore steps forward rather than jumping to it.
    ///
    /// # Errors
    /// Propagates load failures; the current event is kept.
    pub fn advance(&mut self, requested: Option<usize>) -> Result<Navigation> {
        match requested {
            Some(index) if index != self.index && index < self.len().saturating_sub(1) => {
                self.goto(index)
            }
            _ => self.next(),
        }
    }

    fn replace(&mut self, index: usize) -> Result<Navigation> {
        let event = self.source.load(index)?;
        let from = self.index;
        info!("loading event {index} ({} hits)", event.len());
        self.event = event;
        self.index = index;
        Ok(Navigation::Moved { from, to: index })
    }
}
