use std::time::Duration;

use crossterm::event::{self, Event as CrosstermEvent, KeyEvent};
use futures::StreamExt;
use tokio::sync::mpsc;
use tokio::time::{self, Instant, MissedTickBehavior};

#[derive(Clone, Debug)]
pub enum Event {
    Key(KeyEvent),
    /// Redraw cadence; also ages out status messages.
    Tick,
    /// Time to list the current host again.
    Poll,
    Resize,
}

/// How often the UI redraws and how often it re-lists the current host.
#[derive(Clone, Copy, Debug)]
pub struct Cadence {
    pub tick: Duration,
    pub poll: Duration,
}

impl Cadence {
    /// One poll every `poll_every_ticks` ticks.
    pub fn new(tick: Duration, poll_every_ticks: u32) -> Self {
        let tick = tick.max(Duration::from_millis(1));
        Cadence {
            tick,
            poll: tick * poll_every_ticks.max(1),
        }
    }
}

pub struct EventHandler {
    rx: mpsc::UnboundedReceiver<Event>,
    _input: tokio::task::JoinHandle<()>,
    _timers: tokio::task::JoinHandle<()>,
}

impl EventHandler {
    pub fn new(cadence: Cadence) -> Self {
        let (tx, rx) = mpsc::unbounded_channel::<Event>();

        let input_tx = tx.clone();
        let input = tokio::spawn(async move {
            let mut reader = event::EventStream::new();
            while let Some(Ok(evt)) = reader.next().await {
                let mapped = match evt {
                    CrosstermEvent::Key(key) => Event::Key(key),
                    CrosstermEvent::Resize(_, _) => Event::Resize,
                    _ => continue,
                };
                if input_tx.send(mapped).is_err() {
                    break;
                }
            }
        });

        Self {
            rx,
            _input: input,
            _timers: spawn_timers(tx, cadence),
        }
    }

    pub async fn next(&mut self) -> Option<Event> {
        self.rx.recv().await
    }
}

/// Emits ticks and polls until the receiver goes away. The first poll waits a
/// full period since the app lists the host once at startup.
fn spawn_timers(tx: mpsc::UnboundedSender<Event>, cadence: Cadence) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticks = time::interval(cadence.tick);
        let mut polls = time::interval_at(Instant::now() + cadence.poll, cadence.poll);
        // a slow remote listing must not be followed by a burst of catch-up polls
        polls.set_missed_tick_behavior(MissedTickBehavior::Skip);
        ticks.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            let event = tokio::select! {
                _ = ticks.tick() => Event::Tick,
                _ = polls.tick() => Event::Poll,
            };
            if tx.send(event).is_err() {
                break;
            }
        }
    })
}
