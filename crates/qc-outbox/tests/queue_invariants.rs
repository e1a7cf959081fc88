//! # Invariant Tests for the Outbox Queue
//!
//! These tests drive the public API the way a node does and try to break the
//! queue's guarantees.
//!
//! ## Test Categories
//!
//! 1. **Scenarios** - Enqueue/confirm/expire flows end to end
//! 2. **Concurrency** - Many threads against one queue
//! 3. **Properties** - Contiguity and expiry over generated inputs

use proptest::prelude::*;
use qc_outbox::{
    InMemoryMetrics, MessageQueue, MessageQueueApi, OutboundMessage, OutboxError, QueueStatus,
};
use std::collections::HashSet;
use std::sync::{Arc, Barrier};
use std::thread;

// =============================================================================
// TEST HELPERS
// =============================================================================

#[allow(dead_code)]
#[derive(Clone, Debug, PartialEq, Eq)]
struct SignedMessage {
    from: String,
    to: String,
    nonce: u64,
    method: String,
}

impl OutboundMessage for SignedMessage {
    type Sender = String;

    fn sender(&self) -> &String {
        &self.from
    }

    fn nonce(&self) -> u64 {
        self.nonce
    }
}

fn msg(from: &str, nonce: u64) -> SignedMessage {
    SignedMessage {
        from: from.to_string(),
        to: "actor".to_string(),
        nonce,
        method: "transfer".to_string(),
    }
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn make_outbox() -> (MessageQueue<SignedMessage>, Arc<InMemoryMetrics>) {
    init_tracing();
    let metrics = Arc::new(InMemoryMetrics::new());
    (MessageQueue::new(metrics.clone()), metrics)
}

fn nonces(outbox: &MessageQueue<SignedMessage>, from: &str) -> Vec<u64> {
    outbox
        .list(&from.to_string())
        .iter()
        .map(|q| q.nonce())
        .collect()
}

// =============================================================================
// SCENARIOS
// =============================================================================

#[test]
fn scenario_gap_is_rejected_and_queue_kept() {
    let (outbox, _) = make_outbox();

    outbox.enqueue(msg("A", 5), 10).unwrap();
    outbox.enqueue(msg("A", 6), 11).unwrap();
    let err = outbox.enqueue(msg("A", 8), 12).unwrap_err();

    assert_eq!(
        err,
        OutboxError::InvalidNonce {
            actual: 8,
            expected: 7
        }
    );
    assert_eq!(nonces(&outbox, "A"), vec![5, 6]);
}

#[test]
fn scenario_expire_whole_sender() {
    let (outbox, metrics) = make_outbox();

    outbox.enqueue(msg("A", 5), 10).unwrap();
    outbox.enqueue(msg("A", 6), 10).unwrap();
    let expired = outbox.expire_before(11);

    assert_eq!(expired.len(), 1);
    assert_eq!(expired["A"], vec![msg("A", 5), msg("A", 6)]);
    assert!(!outbox.queues().contains(&"A".to_string()));
    assert_eq!(metrics.counter("message_queue_expire"), 2);
}

#[test]
fn scenario_confirm_twice() {
    let (outbox, _) = make_outbox();
    let a = "A".to_string();

    outbox.enqueue(msg("A", 5), 10).unwrap();
    outbox.enqueue(msg("A", 6), 10).unwrap();

    assert_eq!(outbox.remove_next(&a, 5).unwrap(), Some(msg("A", 5)));
    assert_eq!(nonces(&outbox, "A"), vec![6]);

    assert_eq!(outbox.remove_next(&a, 5).unwrap(), None);
    assert_eq!(nonces(&outbox, "A"), vec![6]);
}

#[test]
fn scenario_skip_is_surfaced() {
    let (outbox, _) = make_outbox();
    let a = "A".to_string();

    outbox.enqueue(msg("A", 5), 10).unwrap();
    outbox.enqueue(msg("A", 6), 10).unwrap();

    let err = outbox.remove_next(&a, 7).unwrap_err();
    assert!(err.to_string().contains("\"A\""));
    assert_eq!(outbox.len(&a), 2);
}

#[test]
fn scenario_block_by_block() {
    let (outbox, metrics) = make_outbox();
    let (a, b) = ("A".to_string(), "B".to_string());

    // Height 100: both senders transmit
    for n in 0..3 {
        outbox.enqueue(msg("A", n), 100).unwrap();
    }
    outbox.enqueue(msg("B", 40), 100).unwrap();

    // Height 101: block includes A/0 and A/1
    assert!(outbox.remove_next(&a, 0).unwrap().is_some());
    assert!(outbox.remove_next(&a, 1).unwrap().is_some());
    assert_eq!(metrics.gauge("message_queue_size"), Some(1));

    // Height 102: B sends again
    outbox.enqueue(msg("B", 41), 102).unwrap();

    // Sweep with a window of one block: both heads are stamped 100
    let expired = outbox.expire_before(101);
    assert_eq!(expired[&a], vec![msg("A", 2)]);
    assert_eq!(expired[&b], vec![msg("B", 40), msg("B", 41)]);
    assert_eq!(outbox.status(), QueueStatus::default());
    assert_eq!(metrics.counter("message_queue_expire"), 3);
}

#[test]
fn scenario_producer_uses_largest_nonce() {
    let (outbox, _) = make_outbox();
    let a = "A".to_string();

    outbox.enqueue(msg("A", 20), 1).unwrap();
    for _ in 0..5 {
        let next = outbox.largest_nonce(&a).map_or(0, |n| n + 1);
        outbox.enqueue(msg("A", next), 1).unwrap();
    }

    assert_eq!(outbox.largest_nonce(&a), Some(25));
    assert_eq!(outbox.next_nonce(&a), Ok(Some(26)));
}

#[test]
fn scenario_shared_messages() {
    init_tracing();
    let outbox: MessageQueue<Arc<SignedMessage>> = MessageQueue::without_metrics();
    let shared = Arc::new(msg("A", 1));

    outbox.enqueue(shared.clone(), 1).unwrap();
    let removed = outbox.remove_next(&"A".to_string(), 1).unwrap().unwrap();

    assert!(Arc::ptr_eq(&removed, &shared));
}

// =============================================================================
// CONCURRENCY
// =============================================================================

#[test]
fn concurrent_senders_stay_contiguous() {
    let (outbox, _) = make_outbox();
    let outbox = Arc::new(outbox);
    let threads = 8;
    let per_thread = 200u64;
    let barrier = Arc::new(Barrier::new(threads));

    let handles: Vec<_> = (0..threads)
        .map(|t| {
            let outbox = outbox.clone();
            let barrier = barrier.clone();
            thread::spawn(move || {
                let sender = format!("sender-{}", t);
                barrier.wait();
                for n in 0..per_thread {
                    outbox.enqueue(msg(&sender, n), n).unwrap();
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(outbox.queues().len(), threads);
    for t in 0..threads {
        let listed = nonces(&outbox, &format!("sender-{}", t));
        assert_eq!(listed, (0..per_thread).collect::<Vec<_>>());
    }
}

#[test]
fn concurrent_producers_on_one_sender() {
    let (outbox, _) = make_outbox();
    let outbox = Arc::new(outbox);
    let a = "A".to_string();
    outbox.enqueue(msg("A", 0), 0).unwrap();

    // Every thread races for the next nonce; losers retry
    let handles: Vec<_> = (0..4)
        .map(|_| {
            let outbox = outbox.clone();
            let a = a.clone();
            thread::spawn(move || {
                let mut accepted = 0;
                while accepted < 50 {
                    let next = outbox.largest_nonce(&a).map_or(0, |n| n + 1);
                    match outbox.enqueue(msg("A", next), 0) {
                        Ok(()) => accepted += 1,
                        Err(OutboxError::InvalidNonce { .. }) => continue,
                        Err(e) => panic!("unexpected error: {}", e),
                    }
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(nonces(&outbox, "A"), (0..=200).collect::<Vec<_>>());
}

#[test]
fn concurrent_confirm_and_expire() {
    let (outbox, _) = make_outbox();
    let outbox = Arc::new(outbox);
    let a = "A".to_string();
    for n in 0..500 {
        outbox.enqueue(msg("A", n), 10).unwrap();
    }

    let confirmer = {
        let outbox = outbox.clone();
        let a = a.clone();
        thread::spawn(move || {
            let mut confirmed = Vec::new();
            for n in 0..500 {
                match outbox.remove_next(&a, n) {
                    Ok(Some(m)) => confirmed.push(m.nonce),
                    Ok(None) => break,
                    Err(e) => panic!("unexpected error: {}", e),
                }
            }
            confirmed
        })
    };
    let sweeper = {
        let outbox = outbox.clone();
        thread::spawn(move || outbox.expire_before(11))
    };

    let confirmed = confirmer.join().unwrap();
    let expired = sweeper.join().unwrap();
    let expired: Vec<u64> = expired
        .get(&a)
        .map(|msgs| msgs.iter().map(|m| m.nonce).collect())
        .unwrap_or_default();

    // Every message ends up exactly once in one of the two outcomes
    let mut all: Vec<u64> = confirmed.iter().chain(expired.iter()).copied().collect();
    all.sort_unstable();
    assert_eq!(all, (0..500).collect::<Vec<_>>());
    assert!(outbox.is_empty());
}

#[test]
fn api_trait_object_across_threads() {
    init_tracing();
    let outbox: Arc<dyn MessageQueueApi<SignedMessage>> =
        Arc::new(MessageQueue::<SignedMessage>::without_metrics());

    let writer = {
        let outbox = outbox.clone();
        thread::spawn(move || {
            for n in 0..100 {
                outbox.enqueue(msg("A", n), n).unwrap();
            }
        })
    };
    writer.join().unwrap();

    assert_eq!(outbox.list(&"A".to_string()).len(), 100);
    assert_eq!(outbox.largest_nonce(&"A".to_string()), Some(99));
}

// =============================================================================
// PROPERTIES
// =============================================================================

proptest! {
    #[test]
    fn prop_accepted_sequences_are_contiguous(
        start in 0u64..1_000,
        attempts in prop::collection::vec(0u64..1_010, 1..60),
    ) {
        let outbox: MessageQueue<SignedMessage> = MessageQueue::without_metrics();
        outbox.enqueue(msg("A", start), 0).unwrap();

        for nonce in attempts {
            let before = nonces(&outbox, "A");
            let expected = before.last().copied().unwrap() + 1;
            match outbox.enqueue(msg("A", nonce), 0) {
                Ok(()) => prop_assert_eq!(nonce, expected),
                Err(OutboxError::InvalidNonce { actual, expected: e }) => {
                    prop_assert_eq!(actual, nonce);
                    prop_assert_eq!(e, expected);
                    prop_assert_eq!(nonces(&outbox, "A"), before);
                }
                Err(other) => prop_assert!(false, "unexpected error {}", other),
            }
        }

        let listed = nonces(&outbox, "A");
        prop_assert!(listed.windows(2).all(|w| w[1] == w[0] + 1));
    }

    #[test]
    fn prop_expiry_removes_exactly_stale_heads(
        heads in prop::collection::vec((0u64..100, 1usize..5), 1..12),
        threshold in 0u64..100,
    ) {
        let outbox: MessageQueue<SignedMessage> = MessageQueue::without_metrics();
        for (i, (stamp, len)) in heads.iter().enumerate() {
            let sender = format!("s{}", i);
            for n in 0..*len as u64 {
                // Interior stamps are arbitrary; only the head's matters
                let s = if n == 0 { *stamp } else { 99 - *stamp };
                outbox.enqueue(msg(&sender, n), s).unwrap();
            }
        }

        let expired = outbox.expire_before(threshold);
        let remaining: HashSet<String> = outbox.queues().into_iter().collect();

        for (i, (stamp, len)) in heads.iter().enumerate() {
            let sender = format!("s{}", i);
            if *stamp < threshold {
                prop_assert!(!remaining.contains(&sender));
                let got: Vec<u64> = expired[&sender].iter().map(|m| m.nonce).collect();
                prop_assert_eq!(got, (0..*len as u64).collect::<Vec<_>>());
            } else {
                prop_assert!(!expired.contains_key(&sender));
                prop_assert_eq!(outbox.len(&sender), *len);
            }
        }
    }

    #[test]
    fn prop_remove_next_matches_head_only(
        start in 0u64..50,
        len in 1u64..10,
        expected in 0u64..70,
    ) {
        let outbox: MessageQueue<SignedMessage> = MessageQueue::without_metrics();
        let a = "A".to_string();
        for n in start..start + len {
            outbox.enqueue(msg("A", n), 0).unwrap();
        }

        let result = outbox.remove_next(&a, expected);
        if expected < start {
            prop_assert_eq!(result, Ok(None));
            prop_assert_eq!(outbox.len(&a), len as usize);
        } else if expected == start {
            prop_assert_eq!(result, Ok(Some(msg("A", start))));
            prop_assert_eq!(outbox.len(&a), (len - 1) as usize);
        } else {
            let is_out_of_order = matches!(result, Err(OutboxError::OutOfOrderRemoval { .. }));
            prop_assert!(is_out_of_order);
            prop_assert_eq!(outbox.len(&a), len as usize);
        }
    }
}
