// Copyright 2025 the Geoscope Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Status reporting from the controller to its host.
//!
//! The controller never talks to a UI directly. Progress while overviews are
//! built, the header of a newly opened raster, cursor readouts, and
//! recoverable warnings are all published as [`StatusEvent`]s to a
//! [`StatusSink`] the host supplies.
//!
//! Sinks provided here:
//! - [`std::sync::mpsc::Sender<StatusEvent>`], to hand events to another thread.
//! - [`StatusLog`], which records everything (handy in tests and demos).
//! - [`NoStatus`], which drops everything.

use std::sync::mpsc;

use crate::readout::CursorReadout;

/// Something the host may want to show.
#[derive(Clone, Debug, PartialEq)]
pub enum StatusEvent {
    /// Overview build progress in percent.
    Progress(u8),
    /// A raster finished opening; `header` describes it.
    ImageOpened {
        /// Multi-line description of the raster.
        header: String,
    },
    /// What the cursor points at.
    Cursor(CursorReadout),
    /// A recoverable problem, such as an overview build failure.
    Warning(String),
}

/// Receives [`StatusEvent`]s.
pub trait StatusSink {
    /// Called for every event, in order.
    fn publish(&mut self, event: StatusEvent);
}

impl StatusSink for mpsc::Sender<StatusEvent> {
    fn publish(&mut self, event: StatusEvent) {
        // A dropped receiver means nobody is listening any more.
        let _ = self.send(event);
    }
}

/// Discards every event.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoStatus;

impl StatusSink for NoStatus {
    fn publish(&mut self, _event: StatusEvent) {}
}

/// Records every event in order.
#[derive(Clone, Debug, Default)]
pub struct StatusLog {
    events: Vec<StatusEvent>,
}

impl StatusLog {
    /// Creates an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// All events so far.
    #[must_use]
    pub fn events(&self) -> &[StatusEvent] {
        &self.events
    }

    /// Progress percentages so far.
    pub fn progress(&self) -> impl Iterator<Item = u8> + '_ {
        self.events.iter().filter_map(|e| match e {
            StatusEvent::Progress(p) => Some(*p),
            _ => None,
        })
    }

    /// The most recent cursor readout.
    #[must_use]
    pub fn last_cursor(&self) -> Option<&CursorReadout> {
        self.events.iter().rev().find_map(|e| match e {
            StatusEvent::Cursor(readout) => Some(readout),
            _ => None,
        })
    }

    /// Clears all recorded events.
    pub fn clear(&mut self) {
        self.events.clear();
    }
}

impl StatusSink for StatusLog {
    fn publish(&mut self, event: StatusEvent) {
        self.events.push(event);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::mpsc;

    use super::{StatusEvent, StatusLog, StatusSink};

    #[test]
    fn log_keeps_order_and_filters_progress() {
        let mut log = StatusLog::new();
        log.publish(StatusEvent::Progress(0));
        log.publish(StatusEvent::Warning("slow".into()));
        log.publish(StatusEvent::Progress(100));
        assert_eq!(log.progress().collect::<Vec<_>>(), [0, 100]);
        assert_eq!(log.events().len(), 3);
        assert!(log.last_cursor().is_none());
        log.clear();
        assert!(log.events().is_empty());
    }

    #[test]
    fn sender_forwards_and_survives_hangup() {
        let (mut tx, rx) = mpsc::channel();
        tx.publish(StatusEvent::Progress(42));
        assert_eq!(rx.recv().unwrap(), StatusEvent::Progress(42));
        drop(rx);
        tx.publish(StatusEvent::Progress(43));
    }
}
