// tests/property/recorder_test.rs

//! Property-based tests for the request recorder

use proptest::prelude::*;
use stubstatus::core::recorder::{CompletedRequest, RequestRecorder, UpstreamAttempt};
use stubstatus::core::state::{StatField, StatsState};
use stubstatus::core::window::WindowAggregator;

const START: u64 = 1_700_000_000;

fn attempt_strategy() -> impl Strategy<Value = UpstreamAttempt> {
    (
        prop_oneof![Just(0u16), 200u16..600],
        -5i64..30,
        -999i64..1_000,
        0u64..100_000,
    )
        .prop_map(|(status, response_sec, response_msec, response_length)| UpstreamAttempt {
            status,
            response_sec,
            response_msec,
            response_length,
        })
}

proptest! {
    #[test]
    fn test_recorded_totals_match_attempts(
        requests in prop::collection::vec(
            (
                100u16..600,
                0u64..1_000_000,
                prop::collection::vec(attempt_strategy(), 0..4),
            ),
            1..50
        )
    ) {
        let stats = StatsState::new(START);
        let window = WindowAggregator::default();

        let mut expected_requests = 0;
        let mut expected_sent = 0;
        let mut expected_recv = 0;
        let mut expected_time = 0;

        for (status, bytes_sent, upstream) in requests {
            if !upstream.is_empty() {
                expected_requests += 1;
                expected_sent += bytes_sent;
                expected_recv += upstream.iter().map(|a| a.response_length).sum::<u64>();
                expected_time += upstream
                    .iter()
                    .filter(|a| a.status != 0)
                    .map(|a| (a.response_sec * 1000 + a.response_msec).max(0) as u64)
                    .sum::<u64>();
            }
            let req = CompletedRequest { status, err_status: None, bytes_sent, upstream };
            // Clock stays inside the first window so nothing rolls over.
            RequestRecorder::record(&stats, &window, START + 30, &req);
        }

        prop_assert_eq!(stats.read(StatField::RequestsTotal), expected_requests);
        prop_assert_eq!(stats.read(StatField::WindowRequests), expected_requests);
        prop_assert_eq!(stats.read(StatField::BytesSentTotal), expected_sent);
        prop_assert_eq!(stats.read(StatField::UpstreamBytesRecvTotal), expected_recv);
        prop_assert_eq!(stats.read(StatField::WindowResponseTimeMs), expected_time);

        let classified = stats.read(StatField::Status20x)
            + stats.read(StatField::Status30x)
            + stats.read(StatField::Status40x)
            + stats.read(StatField::Status50x);
        prop_assert!(classified <= expected_requests);
    }
}
