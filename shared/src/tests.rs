#[cfg(test)]
mod tests {
    use std::time::Duration;
    use time::OffsetDateTime;
    use crate::{
        expires_after, tally, validate_create_request, validate_vote_request, Counters, CreatePollRequest,
        ErrorCode, ErrorResponse, LabelCounts, Poll, ValidationError, VoteRequest,
    };

    const HOUR: Duration = Duration::from_secs(3600);

    fn poll(options: &[&str]) -> Poll {
        Poll::new(
            "abc1234",
            "Best color?",
            options.iter().map(|o| o.to_string()).collect(),
            OffsetDateTime::UNIX_EPOCH,
            HOUR,
        )
        .unwrap()
    }

    fn counters(pairs: &[(usize, u64)]) -> Counters {
        pairs.iter().copied().collect()
    }

    fn create_request(title: &str, options: &[&str]) -> CreatePollRequest {
        CreatePollRequest {
            title: title.into(),
            options: options.iter().map(|o| o.to_string()).collect(),
            ttl_seconds: None,
        }
    }

    #[test]
    fn test_poll_expiry_follows_ttl() {
        let p = poll(&["Red", "Blue"]);
        assert_eq!(p.expires_at - p.created_at, time::Duration::hours(1));
        assert_eq!(p.option_count(), 2);
    }

    #[test]
    fn test_unrepresentable_expiry_is_none() {
        let huge = Duration::from_secs(400_000_000_000);
        assert!(expires_after(OffsetDateTime::UNIX_EPOCH, huge).is_none());
        assert!(expires_after(OffsetDateTime::UNIX_EPOCH, Duration::MAX).is_none());
        assert!(Poll::new("abc1234", "Forever", vec!["A".into(), "B".into()], OffsetDateTime::UNIX_EPOCH, huge).is_none());
        assert_eq!(
            expires_after(OffsetDateTime::UNIX_EPOCH, HOUR),
            Some(OffsetDateTime::UNIX_EPOCH + time::Duration::hours(1))
        );
    }

    #[test]
    fn test_tally_counts_and_total() {
        let results = tally(poll(&["Red", "Blue"]), &counters(&[(0, 2), (1, 2)]));
        assert_eq!(results.votes.get("Red"), Some(2));
        assert_eq!(results.votes.get("Blue"), Some(2));
        assert_eq!(results.total, 4);
    }

    #[test]
    fn test_tally_missing_counters_read_zero() {
        let results = tally(poll(&["A", "B", "C"]), &Counters::new());
        assert_eq!(results.votes.iter().collect::<Vec<_>>(), vec![("A", 0), ("B", 0), ("C", 0)]);
        assert_eq!(results.total, 0);

        let partial = tally(poll(&["A", "B", "C"]), &counters(&[(1, 7)]));
        assert_eq!(partial.votes.get("A"), Some(0));
        assert_eq!(partial.votes.get("B"), Some(7));
        assert_eq!(partial.total, 7);
    }

    #[test]
    fn test_tally_ignores_unknown_indices() {
        let results = tally(poll(&["A", "B"]), &counters(&[(0, 1), (5, 100)]));
        assert_eq!(results.total, 1);
        assert_eq!(results.votes.len(), 2);
    }

    #[test]
    fn test_tally_duplicate_labels_collapse() {
        let results = tally(poll(&["Same", "Other", "Same"]), &counters(&[(0, 3), (1, 1), (2, 5)]));
        assert_eq!(results.votes.len(), 2);
        assert_eq!(results.votes.get("Same"), Some(5));
        assert_eq!(results.votes.iter().next(), Some(("Same", 5)));
        assert_eq!(results.total, 9);
    }

    #[test]
    fn test_label_counts_serialize_in_option_order() {
        let mut counts = LabelCounts::new();
        counts.set("Zebra", 1);
        counts.set("Apple", 2);
        counts.set("Mango", 3);
        let json = serde_json::to_string(&counts).unwrap();
        assert_eq!(json, r#"{"Zebra":1,"Apple":2,"Mango":3}"#);

        let back: LabelCounts = serde_json::from_str(&json).unwrap();
        assert_eq!(back, counts);
    }

    #[test]
    fn test_results_wire_format() {
        let results = tally(poll(&["Red", "Blue"]), &counters(&[(0, 1)]));
        let value = serde_json::to_value(&results).unwrap();
        assert_eq!(value["poll"]["id"], "abc1234");
        assert_eq!(value["poll"]["created_at"], "1970-01-01T00:00:00Z");
        assert_eq!(value["poll"]["expires_at"], "1970-01-01T01:00:00Z");
        assert_eq!(value["votes"]["Red"], 1);
        assert_eq!(value["total"], 1);
    }

    #[test]
    fn test_error_response_codes() {
        let body = ErrorResponse::with_message(ErrorCode::PollNotFound, "Poll not found or expired");
        assert_eq!(
            serde_json::to_string(&body).unwrap(),
            r#"{"error":"poll_not_found","message":"Poll not found or expired"}"#
        );
        let bare = serde_json::to_string(&ErrorResponse::new(ErrorCode::DuplicateOption)).unwrap();
        assert_eq!(bare, r#"{"error":"duplicate_option"}"#);
    }

    #[test]
    fn test_create_request_validation() {
        assert!(validate_create_request(&create_request("Best color?", &["Red", "Blue"]), 60).is_ok());
        assert_eq!(
            validate_create_request(&create_request("No", &["Red", "Blue"]), 60),
            Err(ValidationError::TitleTooShort)
        );
        assert_eq!(
            validate_create_request(&create_request(&"x".repeat(201), &["Red", "Blue"]), 60),
            Err(ValidationError::TitleTooLong)
        );
        assert_eq!(
            validate_create_request(&create_request("Best color?", &["Red"]), 60),
            Err(ValidationError::TooFewOptions)
        );
        let eleven: Vec<String> = (0..11).map(|i| i.to_string()).collect();
        let eleven: Vec<&str> = eleven.iter().map(String::as_str).collect();
        assert_eq!(
            validate_create_request(&create_request("Best color?", &eleven), 60),
            Err(ValidationError::TooManyOptions)
        );
        assert_eq!(
            validate_create_request(&create_request("Best color?", &["Red", ""]), 60),
            Err(ValidationError::EmptyOption(1))
        );
        let long = "y".repeat(101);
        assert_eq!(
            validate_create_request(&create_request("Best color?", &[&long, "Blue"]), 60),
            Err(ValidationError::OptionTooLong(0))
        );
    }

    #[test]
    fn test_title_length_counts_characters() {
        let title = "é".repeat(200);
        assert!(validate_create_request(&create_request(&title, &["a", "b"]), 60).is_ok());
    }

    #[test]
    fn test_ttl_validation() {
        let mut request = create_request("Best color?", &["Red", "Blue"]);
        request.ttl_seconds = Some(0);
        assert_eq!(validate_create_request(&request, 60), Err(ValidationError::TtlTooShort));
        request.ttl_seconds = Some(61);
        assert_eq!(validate_create_request(&request, 60), Err(ValidationError::TtlTooLong(60)));
        request.ttl_seconds = Some(60);
        assert!(validate_create_request(&request, 60).is_ok());
    }

    #[test]
    fn test_vote_request_validation() {
        assert_eq!(
            validate_vote_request(&VoteRequest { option_indices: vec![] }),
            Err(ValidationError::NoOptionsSelected)
        );
        assert!(validate_vote_request(&VoteRequest { option_indices: vec![-1] }).is_ok());
        assert!(validate_vote_request(&VoteRequest { option_indices: vec![0, 1] }).is_ok());
    }
}
