// tests/property/classification_test.rs

//! Property-based tests for status classification

use proptest::prelude::*;
use stubstatus::core::recorder::StatusClass;

proptest! {
    #[test]
    fn test_only_first_ten_codes_of_each_class_are_tracked(status in 0u16..1000) {
        let expected = match (status / 100, status % 100) {
            (2, 0..=9) => Some(StatusClass::Ok20x),
            (3, 0..=9) => Some(StatusClass::Redirect30x),
            (4, 0..=9) => Some(StatusClass::ClientError40x),
            (5, 0..=9) => Some(StatusClass::ServerError50x),
            _ => None,
        };
        prop_assert_eq!(StatusClass::classify(status), expected);
    }

    #[test]
    fn test_error_status_wins_classification(
        status in 100u16..600,
        err_status in 400u16..410,
    ) {
        let req = stubstatus::core::CompletedRequest {
            status,
            err_status: Some(err_status),
            bytes_sent: 0,
            upstream: vec![],
        };
        prop_assert_eq!(
            StatusClass::classify(req.effective_status()),
            Some(StatusClass::ClientError40x)
        );
    }
}
