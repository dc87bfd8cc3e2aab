//! Real-time runtime on tokio.
//!
//! Every interrupt source feeds one unbounded mpsc queue: alarm channels are
//! tokio tasks that sleep (one-shot) or tick (periodic) and post
//! [`RuntimeEvent::Alarm`], and key input posts press/release events. A
//! single dispatcher loop drains the queue into the [`AccessController`], so
//! handlers still run one at a time and to completion.
//!
//! Cancelling a channel aborts its task, but an expiry may already be queued.
//! Each arming gets a fresh generation number and the dispatcher drops
//! expiries whose generation is no longer current.

use std::time::Duration;

use keygate_access::CredentialStore;
use keygate_core::Symbol;
use keygate_hardware::mock::{MockKeypad, MockKeypadHandle};
use keygate_hardware::{AlarmChannel, AlarmMode, AlarmService, IndicatorPanel, Interrupt};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, info, trace};

use crate::config::DeviceConfig;
use crate::controller::AccessController;
use crate::error::{EmulatorError, Result};

/// One entry of the dispatcher queue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuntimeEvent {
    /// An alarm channel expired.
    Alarm { channel: AlarmChannel, generation: u64 },

    /// Keys pressed (and held) on the keypad.
    Press(Vec<Symbol>),

    /// Every key released.
    Release,

    /// Stop the dispatcher.
    Shutdown,
}

#[derive(Debug)]
struct ArmedTask {
    generation: u64,
    mode: AlarmMode,
    task: JoinHandle<()>,
}

/// Alarm service backed by tokio timers.
///
/// Must be used from within a tokio runtime.
#[derive(Debug)]
pub struct TokioAlarms {
    started: Instant,
    events: mpsc::UnboundedSender<RuntimeEvent>,
    slots: [Option<ArmedTask>; AlarmChannel::ALL.len()],
    generation: u64,
}

impl TokioAlarms {
    /// Create an alarm service posting expiries to `events`.
    pub fn new(events: mpsc::UnboundedSender<RuntimeEvent>) -> Self {
        Self {
            started: Instant::now(),
            events,
            slots: Default::default(),
            generation: 0,
        }
    }

    /// Check a dequeued expiry against the current arming.
    ///
    /// Returns `false` for a stale expiry. A current one-shot expiry
    /// disarms its channel.
    pub fn accept(&mut self, channel: AlarmChannel, generation: u64) -> bool {
        let slot = &mut self.slots[channel.index()];
        match slot {
            Some(armed) if armed.generation == generation => {
                if armed.mode == AlarmMode::OneShot {
                    *slot = None;
                }
                true
            }
            _ => {
                trace!(%channel, generation, "stale alarm dropped");
                false
            }
        }
    }

    /// Number of armed channels.
    pub fn armed_count(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }

    fn cancel_all(&mut self) {
        for slot in &mut self.slots {
            if let Some(armed) = slot.take() {
                armed.task.abort();
            }
        }
    }
}

impl AlarmService for TokioAlarms {
    fn now(&self) -> Duration {
        self.started.elapsed()
    }

    fn schedule(&mut self, channel: AlarmChannel, delay: Duration, mode: AlarmMode) -> keygate_hardware::Result<()> {
        self.check_schedule(channel, delay)?;
        self.cancel(channel);

        self.generation += 1;
        let generation = self.generation;
        let events = self.events.clone();

        let task = tokio::spawn(async move {
            let event = RuntimeEvent::Alarm { channel, generation };
            match mode {
                AlarmMode::OneShot => {
                    time::sleep(delay).await;
                    let _ = events.send(event);
                }
                AlarmMode::Periodic => {
                    let mut ticker = time::interval_at(Instant::now() + delay, delay);
                    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
                    loop {
                        ticker.tick().await;
                        if events.send(event.clone()).is_err() {
                            break;
                        }
                    }
                }
            }
        });

        self.slots[channel.index()] = Some(ArmedTask {
            generation,
            mode,
            task,
        });
        trace!(%channel, ?delay, ?mode, generation, "alarm armed");
        Ok(())
    }

    fn cancel(&mut self, channel: AlarmChannel) {
        if let Some(armed) = self.slots[channel.index()].take() {
            armed.task.abort();
            trace!(%channel, "alarm cancelled");
        }
    }

    fn is_armed(&self, channel: AlarmChannel) -> bool {
        self.slots[channel.index()].is_some()
    }
}

impl Drop for TokioAlarms {
    fn drop(&mut self) {
        self.cancel_all();
    }
}

/// Cloneable sender side of a running device.
#[derive(Debug, Clone)]
pub struct RuntimeHandle {
    events: mpsc::UnboundedSender<RuntimeEvent>,
}

impl RuntimeHandle {
    /// Press and hold a key.
    ///
    /// # Errors
    ///
    /// Returns an error if the dispatcher has stopped.
    pub fn press(&self, symbol: Symbol) -> Result<()> {
        self.send(RuntimeEvent::Press(vec![symbol]))
    }

    /// Press several keys at once.
    ///
    /// # Errors
    ///
    /// Returns an error if the dispatcher has stopped.
    pub fn press_keys(&self, symbols: &[Symbol]) -> Result<()> {
        self.send(RuntimeEvent::Press(symbols.to_vec()))
    }

    /// Release every key.
    ///
    /// # Errors
    ///
    /// Returns an error if the dispatcher has stopped.
    pub fn release(&self) -> Result<()> {
        self.send(RuntimeEvent::Release)
    }

    /// Press a key for `hold`, release it, then wait `gap`.
    ///
    /// # Errors
    ///
    /// Returns an error if the dispatcher has stopped.
    pub async fn tap(&self, symbol: Symbol, hold: Duration, gap: Duration) -> Result<()> {
        self.press(symbol)?;
        time::sleep(hold).await;
        self.release()?;
        time::sleep(gap).await;
        Ok(())
    }

    /// Ask the dispatcher to stop after the events already queued.
    ///
    /// # Errors
    ///
    /// Returns an error if the dispatcher has already stopped.
    pub fn shutdown(&self) -> Result<()> {
        self.send(RuntimeEvent::Shutdown)
    }

    fn send(&self, event: RuntimeEvent) -> Result<()> {
        self.events
            .send(event)
            .map_err(|error| EmulatorError::RuntimeStopped(format!("{:?}", error.0)))
    }
}

/// Controller type driven by the runtime.
pub type RuntimeController<L> = AccessController<MockKeypad, TokioAlarms, L>;

/// A device running in real time.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use keygate_access::CredentialStore;
/// use keygate_core::{Outcome, parse_symbols};
/// use keygate_emulator::{DeviceConfig, DeviceRuntime};
/// use keygate_hardware::mock::MockPanel;
///
/// # #[tokio::main(flavor = "current_thread", start_paused = true)]
/// # async fn main() {
/// let runtime = DeviceRuntime::new(
///     DeviceConfig::default(),
///     CredentialStore::with_default_users(),
///     MockPanel::new(),
/// );
/// let handle = runtime.handle();
/// let device = tokio::spawn(runtime.run());
///
/// for symbol in parse_symbols("DCBA654321").unwrap() {
///     handle
///         .tap(symbol, Duration::from_millis(150), Duration::from_millis(250))
///         .await
///         .unwrap();
/// }
/// handle.shutdown().unwrap();
///
/// let controller = device.await.unwrap().unwrap();
/// assert_eq!(controller.state().journal()[0].outcome, Outcome::Grant);
/// # }
/// ```
#[derive(Debug)]
pub struct DeviceRuntime<L> {
    controller: RuntimeController<L>,
    keypad: MockKeypadHandle,
    events: mpsc::UnboundedReceiver<RuntimeEvent>,
    sender: mpsc::UnboundedSender<RuntimeEvent>,
}

impl<L> DeviceRuntime<L>
where
    L: IndicatorPanel + Send + 'static,
{
    /// Build a device; nothing runs until [`run`](Self::run).
    pub fn new(config: DeviceConfig, credentials: CredentialStore, panel: L) -> Self {
        let (sender, events) = mpsc::unbounded_channel();
        let (port, keypad) = MockKeypad::new();
        let alarms = TokioAlarms::new(sender.clone());
        let controller = AccessController::new(port, alarms, panel, credentials, config);

        Self {
            controller,
            keypad,
            events,
            sender,
        }
    }

    /// Sender for key input and shutdown.
    pub fn handle(&self) -> RuntimeHandle {
        RuntimeHandle {
            events: self.sender.clone(),
        }
    }

    /// Power on and dispatch events until shutdown.
    ///
    /// Returns the controller so its state can be inspected.
    ///
    /// # Errors
    ///
    /// Returns the first handler error.
    pub async fn run(mut self) -> Result<RuntimeController<L>> {
        self.controller.start()?;
        info!("device runtime started");

        while let Some(event) = self.events.recv().await {
            match event {
                RuntimeEvent::Alarm { channel, generation } => {
                    if self.controller.alarms_mut().accept(channel, generation) {
                        self.controller.handle(Interrupt::Alarm(channel))?;
                    }
                }
                RuntimeEvent::Press(symbols) => {
                    debug!(keys = symbols.len(), "key press");
                    self.keypad.press_keys(&symbols);
                }
                RuntimeEvent::Release => self.keypad.release(),
                RuntimeEvent::Shutdown => break,
            }
            self.controller.poll_edge()?;
        }

        info!(attempts = self.controller.state().journal().len(), "device runtime stopped");
        Ok(self.controller)
    }
}
