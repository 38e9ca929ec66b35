// Transport - session state machine shared between recorder and player
//
// Recording and playing are mutually exclusive. There is exactly one mutator
// at a time, so the state itself is a single atomic word entered by
// compare-and-swap; no lock guards it. The condvar pair only backs the
// cancellable inter-entry wait: `request_stop` flips the flag and wakes any
// waiter immediately.

use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Arc, Condvar, Mutex};
use std::time::{Duration, Instant};

const STATE_IDLE: u8 = 0;
const STATE_RECORDING: u8 = 1;
const STATE_PLAYING: u8 = 2;

/// What the session is currently doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    Idle,
    Recording,
    Playing,
}

impl SessionState {
    pub fn is_idle(&self) -> bool {
        matches!(self, SessionState::Idle)
    }

    fn as_u8(self) -> u8 {
        match self {
            SessionState::Idle => STATE_IDLE,
            SessionState::Recording => STATE_RECORDING,
            SessionState::Playing => STATE_PLAYING,
        }
    }

    fn from_u8(value: u8) -> SessionState {
        match value {
            STATE_RECORDING => SessionState::Recording,
            STATE_PLAYING => SessionState::Playing,
            _ => SessionState::Idle,
        }
    }
}

/// A conflicting start was attempted while the session was busy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("session already active: {0:?}")]
pub struct AlreadyActive(pub SessionState);

/// Session state shared between the recorder, the player and whoever holds a
/// stop handle (UI thread, signal handler).
#[derive(Debug)]
pub struct SharedSession {
    state: AtomicU8,
    stop_flag: Mutex<bool>,
    stop_signal: Condvar,
}

impl SharedSession {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            state: AtomicU8::new(STATE_IDLE),
            stop_flag: Mutex::new(false),
            stop_signal: Condvar::new(),
        })
    }

    pub fn state(&self) -> SessionState {
        SessionState::from_u8(self.state.load(Ordering::Acquire))
    }

    /// Enter an active state from Idle. Fails with the current state when the
    /// session is already recording or playing.
    pub(crate) fn try_begin(&self, target: SessionState) -> Result<(), AlreadyActive> {
        debug_assert!(!target.is_idle());
        match self.state.compare_exchange(
            STATE_IDLE,
            target.as_u8(),
            Ordering::AcqRel,
            Ordering::Acquire,
        ) {
            Ok(_) => {
                *self.stop_flag.lock().unwrap() = false;
                Ok(())
            }
            Err(current) => Err(AlreadyActive(SessionState::from_u8(current))),
        }
    }

    /// Return to Idle.
    pub(crate) fn finish(&self) {
        self.state.store(STATE_IDLE, Ordering::Release);
    }

    /// Ask the active operation to stop. Idempotent; a no-op when nothing is
    /// active (the flag is cleared again on the next `try_begin`). Wakes a
    /// waiter stuck in [`wait_or_stop`] immediately.
    pub fn request_stop(&self) {
        *self.stop_flag.lock().unwrap() = true;
        self.stop_signal.notify_all();
    }

    /// Whether a stop was requested since the session last went active.
    pub fn stop_requested(&self) -> bool {
        *self.stop_flag.lock().unwrap()
    }

    /// Wait up to `duration`, returning early with `true` as soon as a stop
    /// is requested; `false` means the full time elapsed.
    pub(crate) fn wait_or_stop(&self, duration: Duration) -> bool {
        let deadline = Instant::now() + duration;
        let mut stopped = self.stop_flag.lock().unwrap();
        loop {
            if *stopped {
                return true;
            }
            let now = Instant::now();
            let Some(remaining) = deadline.checked_duration_since(now).filter(|d| !d.is_zero())
            else {
                return false;
            };
            let (guard, timeout) = self.stop_signal.wait_timeout(stopped, remaining).unwrap();
            stopped = guard;
            if timeout.timed_out() {
                return *stopped;
            }
        }
    }
}
