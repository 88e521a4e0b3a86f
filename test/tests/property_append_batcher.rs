//! PROPERTY-BASED TESTS: output append batching
//!
//! Key invariants:
//! 1. Every appended byte is delivered exactly once
//! 2. Within a slot, chunks keep arrival order
//! 3. Slots are delivered in order of their first append

use std::sync::Arc;
use std::time::Duration;

use proptest::prelude::*;

use interlink_server::{AppendBatcher, AppendConfig};
use interlink_test::RecordingProcessListener;

fn appends_strategy() -> impl Strategy<Value = Vec<(usize, String)>> {
    prop::collection::vec((0usize..4, "[a-z]{0,5}"), 0..40)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_flush_concatenates_per_slot_in_first_arrival_order(appends in appends_strategy()) {
        let listener = Arc::new(RecordingProcessListener::new());
        let batcher = AppendBatcher::start(
            listener.clone(),
            AppendConfig {
                flush_interval: Duration::from_secs(3600),
                ..AppendConfig::default()
            },
        ).unwrap();

        let mut expected: Vec<(String, usize, String)> = Vec::new();
        for (slot, data) in &appends {
            batcher.append("n", &format!("p{}", slot), *slot, data);
            match expected.iter_mut().find(|(_, index, _)| index == slot) {
                Some((_, _, buffer)) => buffer.push_str(data),
                None => expected.push((format!("p{}", slot), *slot, data.clone())),
            }
        }
        batcher.shutdown();

        prop_assert_eq!(listener.appends(), expected);
    }

    #[test]
    fn prop_interleaved_flushes_lose_nothing(
        appends in appends_strategy(),
        flush_every in 1usize..8,
    ) {
        let listener = Arc::new(RecordingProcessListener::new());
        let batcher = AppendBatcher::start(
            listener.clone(),
            AppendConfig {
                flush_interval: Duration::from_secs(3600),
                ..AppendConfig::default()
            },
        ).unwrap();

        for (i, (slot, data)) in appends.iter().enumerate() {
            batcher.append("n", "p", *slot, data);
            if i % flush_every == 0 {
                batcher.flush();
            }
        }
        batcher.flush();

        for slot in 0..4 {
            let sent: String = appends
                .iter()
                .filter(|(index, _)| *index == slot)
                .map(|(_, data)| data.as_str())
                .collect();
            let delivered: String = listener
                .appends()
                .into_iter()
                .filter(|(_, index, _)| *index == slot)
                .map(|(_, _, chunk)| chunk)
                .collect();
            prop_assert_eq!(delivered, sent);
        }
    }
}
