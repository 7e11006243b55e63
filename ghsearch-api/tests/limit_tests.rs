use ghsearch_api::limits::{check_body, check_head, LimitError, MAX_MESSAGE_BYTES};
use ghsearch_api::status::StatusCode;

#[test]
fn head_may_fill_the_whole_cap() {
    assert!(check_head(MAX_MESSAGE_BYTES).is_ok());
    let err = check_head(MAX_MESSAGE_BYTES + 1).expect_err("over the cap");
    assert_eq!(err, LimitError::HeadTooLarge { max: MAX_MESSAGE_BYTES });
    assert_eq!(err.status(), StatusCode::RequestEntityTooLarge);
}

#[test]
fn body_budget_is_what_the_head_left() {
    let head = 200;
    assert!(check_body(head, MAX_MESSAGE_BYTES - head).is_ok());
    let err = check_body(head, MAX_MESSAGE_BYTES - head + 1).expect_err("one byte over");
    assert_eq!(err, LimitError::BodyTooLarge { declared: MAX_MESSAGE_BYTES - head + 1, remaining: MAX_MESSAGE_BYTES - head });
}

#[test]
fn oversized_head_leaves_no_room_for_a_body() {
    assert!(check_body(MAX_MESSAGE_BYTES + 10, 0).is_ok());
    assert!(matches!(check_body(MAX_MESSAGE_BYTES + 10, 1), Err(LimitError::BodyTooLarge { remaining: 0, .. })));
}
