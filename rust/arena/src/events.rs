use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};

use arena_agents::AgentMetrics;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

pub type MatchId = String;

// Bounded channel so a stalled subscriber cannot exhaust memory; events for
// slow subscribers are dropped (backpressure)
const EVENT_CHANNEL_BUFFER: usize = 1000;

pub type EventSender = mpsc::Sender<UpdateEvent>;
pub type EventReceiver = mpsc::Receiver<UpdateEvent>;

/// One orchestrator step, as delivered to the external sink. Fixed core
/// record plus a string-keyed extension map for game-specific fields
/// (`folded_cards`, `hand_result`, `is_hand_summary`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateEvent {
    pub board: serde_json::Value,
    pub turn: u32,
    pub message: String,
    pub current_player: String,
    /// Seat index of the acting player, -1 for system messages.
    pub current_player_idx: i64,
    pub current_symbol: String,
    pub is_thinking: bool,
    pub game_over: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub winner: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub winner_index: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metrics: Option<AgentMetrics>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_response: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thinking: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_prompt: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_prompt: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_by: Option<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

pub struct EventSubscription {
    bus: EventBus,
    match_id: MatchId,
    subscriber_id: usize,
    pub receiver: EventReceiver,
}

impl EventSubscription {
    pub fn receiver(&mut self) -> &mut EventReceiver {
        &mut self.receiver
    }
}

impl Drop for EventSubscription {
    fn drop(&mut self) {
        self.bus.unsubscribe(&self.match_id, self.subscriber_id);
    }
}

/// Per-match fan-out of update events to transport subscribers. Broadcast
/// never blocks the match thread: sends are `try_send` and dead receivers
/// are pruned on failure. Per-match emission order is preserved.
#[derive(Debug, Clone, Default)]
pub struct EventBus {
    inner: Arc<EventBusInner>,
}

#[derive(Debug, Default)]
struct EventBusInner {
    subscribers: RwLock<HashMap<MatchId, Vec<(usize, EventSender)>>>,
    next_id: AtomicUsize,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self, match_id: MatchId) -> EventSubscription {
        let (subscriber_id, receiver) = self.subscribe_raw(match_id.clone());
        EventSubscription {
            bus: self.clone(),
            match_id,
            subscriber_id,
            receiver,
        }
    }

    fn subscribe_raw(&self, match_id: MatchId) -> (usize, EventReceiver) {
        let (tx, rx) = mpsc::channel(EVENT_CHANNEL_BUFFER);
        let id = self.inner.next_id.fetch_add(1, Ordering::AcqRel);
        let mut guard = self
            .inner
            .subscribers
            .write()
            .expect("subscriber lock poisoned");
        guard.entry(match_id.clone()).or_default().push((id, tx));

        tracing::info!(
            match_id = %match_id,
            subscriber_id = id,
            "client subscribed to match events"
        );

        (id, rx)
    }

    pub fn broadcast(&self, match_id: &MatchId, event: UpdateEvent) {
        tracing::debug!(
            match_id = %match_id,
            turn = event.turn,
            message = %event.message,
            "broadcasting update event"
        );

        let subscribers = {
            let guard = self
                .inner
                .subscribers
                .read()
                .expect("subscriber lock poisoned");
            guard.get(match_id).cloned()
        };

        if let Some(list) = subscribers {
            let mut failed = Vec::new();
            for (id, sender) in list {
                // try_send keeps the match thread non-blocking; a full or
                // closed channel marks the subscriber for removal
                if let Err(e) = sender.try_send(event.clone()) {
                    tracing::warn!(
                        match_id = %match_id,
                        subscriber_id = id,
                        error = ?e,
                        "failed to send event to subscriber"
                    );
                    failed.push(id);
                }
            }
            if !failed.is_empty() {
                self.remove_subscribers(match_id, &failed);
            }
        }
    }

    pub fn unsubscribe(&self, match_id: &MatchId, subscriber_id: usize) {
        self.remove_subscribers(match_id, &[subscriber_id]);
    }

    pub fn drop_match(&self, match_id: &MatchId) {
        let mut guard = self
            .inner
            .subscribers
            .write()
            .expect("subscriber lock poisoned");
        guard.remove(match_id);
    }

    pub fn subscriber_count(&self) -> usize {
        let guard = self
            .inner
            .subscribers
            .read()
            .expect("subscriber lock poisoned");
        guard.values().map(|list| list.len()).sum()
    }

    fn remove_subscribers(&self, match_id: &MatchId, ids: &[usize]) {
        let mut guard = self
            .inner
            .subscribers
            .write()
            .expect("subscriber lock poisoned");
        if let Some(list) = guard.get_mut(match_id) {
            list.retain(|(id, _)| !ids.contains(id));
            if list.is_empty() {
                guard.remove(match_id);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ping(match_id: &str) -> UpdateEvent {
        UpdateEvent {
            board: serde_json::Value::Null,
            turn: 0,
            message: format!("ping {match_id}"),
            current_player: "System".to_string(),
            current_player_idx: -1,
            current_symbol: "S".to_string(),
            is_thinking: false,
            game_over: false,
            winner: None,
            winner_index: None,
            metrics: None,
            raw_response: None,
            thinking: None,
            system_prompt: None,
            user_prompt: None,
            error_by: None,
            extra: BTreeMap::new(),
        }
    }

    #[test]
    fn subscription_drop_unsubscribes() {
        let bus = EventBus::new();
        let m = "m".to_string();
        {
            let _sub = bus.subscribe(m.clone());
            assert_eq!(bus.subscriber_count(), 1);
        }
        assert_eq!(bus.subscriber_count(), 0);
    }

    #[test]
    fn broadcast_reaches_all_subscribers_in_order() {
        let bus = EventBus::new();
        let m = "m".to_string();
        let mut sub1 = bus.subscribe(m.clone());
        let mut sub2 = bus.subscribe(m.clone());

        bus.broadcast(&m, ping("a"));
        bus.broadcast(&m, ping("b"));

        assert_eq!(sub1.receiver.try_recv().unwrap().message, "ping a");
        assert_eq!(sub1.receiver.try_recv().unwrap().message, "ping b");
        assert_eq!(sub2.receiver.try_recv().unwrap().message, "ping a");
    }

    #[test]
    fn stale_receiver_is_pruned() {
        let bus = EventBus::new();
        let m = "m".to_string();
        let (id, rx) = bus.subscribe_raw(m.clone());
        drop(rx);
        bus.broadcast(&m, ping("gone"));
        assert_eq!(bus.subscriber_count(), 0);
        bus.unsubscribe(&m, id); // no panic after removal
    }

    #[test]
    fn extension_map_flattens_into_the_event_json() {
        let mut ev = ping("x");
        ev.extra
            .insert("is_hand_summary".to_string(), serde_json::json!(true));
        let json = serde_json::to_value(&ev).unwrap();
        assert_eq!(json["is_hand_summary"], serde_json::json!(true));
        assert_eq!(json["current_player"], "System");
        // Absent optionals are omitted entirely
        assert!(json.get("winner").is_none());
    }
}
