//! Agent that waits for a move delivered from the transport thread.

use std::sync::{Arc, Condvar, Mutex};
use std::time::Duration;

use crate::{AgentResponse, MoveAgent};

/// How long `generate` waits for a human move before giving up.
pub const DEFAULT_WAIT_TIMEOUT: Duration = Duration::from_secs(300);

#[derive(Debug, Default)]
struct MoveSlot {
    pending: Mutex<Option<String>>,
    signal: Condvar,
}

/// Move agent backed by a single-slot rendezvous.
///
/// The transport thread delivers a move through [`HumanMoveHandle::submit`];
/// `generate` drains any stale value, then blocks on the slot until a move
/// arrives or the timeout elapses. A timeout yields an empty move, which
/// every game rejects, so the normal invalid-move policy applies.
pub struct HumanAgent {
    model_name: String,
    slot: Arc<MoveSlot>,
    timeout: Duration,
}

impl HumanAgent {
    pub fn new() -> Self {
        Self::with_timeout(DEFAULT_WAIT_TIMEOUT)
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            model_name: "human".to_string(),
            slot: Arc::new(MoveSlot::default()),
            timeout,
        }
    }

    /// Handle the transport layer uses to deliver moves. Cheap to clone;
    /// this is the only state shared across threads.
    pub fn handle(&self) -> HumanMoveHandle {
        HumanMoveHandle {
            slot: Arc::clone(&self.slot),
        }
    }
}

impl Default for HumanAgent {
    fn default() -> Self {
        Self::new()
    }
}

impl MoveAgent for HumanAgent {
    fn generate(&self, system_prompt: &str, user_prompt: &str) -> AgentResponse {
        let mut pending = self
            .slot
            .pending
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        // Drain a stale move from a previous turn before arming the wait
        *pending = None;

        let (mut pending, _timeout) = self
            .slot
            .signal
            .wait_timeout_while(pending, self.timeout, |slot| slot.is_none())
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        let mv = pending.take().unwrap_or_default();
        AgentResponse::plain(mv, self.model_name.clone(), system_prompt, user_prompt)
    }

    fn model_name(&self) -> &str {
        &self.model_name
    }
}

/// Sender half of the rendezvous, cloned into the transport layer.
#[derive(Clone)]
pub struct HumanMoveHandle {
    slot: Arc<MoveSlot>,
}

impl HumanMoveHandle {
    /// Non-blocking delivery: overwrites any undelivered move and wakes the
    /// waiting agent.
    pub fn submit(&self, mv: impl Into<String>) {
        let mut pending = self
            .slot
            .pending
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *pending = Some(mv.into());
        self.slot.signal.notify_one();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn submitted_move_is_delivered() {
        let agent = HumanAgent::with_timeout(Duration::from_secs(5));
        let handle = agent.handle();

        let worker = thread::spawn(move || agent.generate("sys", "state"));
        // Give the agent a moment to arm its wait before submitting
        thread::sleep(Duration::from_millis(50));
        handle.submit("1,1");

        let resp = worker.join().expect("agent thread");
        assert_eq!(resp.content, "1,1");
        assert_eq!(resp.model_name, "human");
    }

    #[test]
    fn timeout_yields_an_empty_move() {
        let agent = HumanAgent::with_timeout(Duration::from_millis(50));
        let resp = agent.generate("sys", "state");
        assert_eq!(resp.content, "");
    }

    #[test]
    fn stale_move_is_drained_before_waiting() {
        let agent = HumanAgent::with_timeout(Duration::from_millis(50));
        let handle = agent.handle();
        // Delivered before the wait is armed: must not satisfy the next turn
        handle.submit("stale");
        let resp = agent.generate("sys", "state");
        assert_eq!(resp.content, "");
    }

    #[test]
    fn latest_submission_wins() {
        let agent = HumanAgent::with_timeout(Duration::from_secs(5));
        let handle = agent.handle();

        let worker = thread::spawn(move || agent.generate("sys", "state"));
        thread::sleep(Duration::from_millis(50));
        handle.submit("first");
        handle.submit("second");

        let resp = worker.join().expect("agent thread");
        // Either delivery is acceptable once the wait is armed, but the slot
        // holds at most one move, so nothing queues up for later turns
        assert!(resp.content == "first" || resp.content == "second");
    }
}
