//! Change notifications for whoever watches a run.
//!
//! Delivery is synchronous: `EventBus::emit` returns only after every observer
//! has seen the event, and observers are called in registration order.

use std::sync::mpsc::Sender;

use crate::counter::CounterSnapshot;
use crate::memory::RamFrame;
use crate::os::RunState;
use crate::workload::Command;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    StateChanged(RunState),
    CountersChanged(CounterSnapshot),
    FrameChanged(RamFrame),
    CommandFinished { index: usize, command: Command },
}

pub trait Observer {
    fn notify(&mut self, event: &Event);
}

impl<F> Observer for F
where
    F: FnMut(&Event),
{
    fn notify(&mut self, event: &Event) {
        self(event)
    }
}

/// Forwards events into a channel. A disconnected receiver is ignored so a
/// dropped listener never stalls the run.
impl Observer for Sender<Event> {
    fn notify(&mut self, event: &Event) {
        let _ = self.send(event.clone());
    }
}

#[derive(Default)]
pub struct EventBus {
    observers: Vec<Box<dyn Observer>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe<O: Observer + 'static>(&mut self, observer: O) {
        self.observers.push(Box::new(observer));
    }

    pub fn emit(&mut self, event: Event) {
        for observer in self.observers.iter_mut() {
            observer.notify(&event);
        }
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("observers", &self.observers.len())
            .finish()
    }
}
