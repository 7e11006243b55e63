use ghsearch_query::{Page, SearchParams, Variables, PAGE_SIZE};

fn vars(pairs: &[(&str, &str)]) -> Variables {
    SearchParams::from_pairs(pairs.iter().map(|(k, v)| (*k, v.to_string())))
        .expect("valid params")
        .variables()
}

#[test]
fn no_cursor_requests_first_page_forward() {
    for q in ["rust", "location:berlin followers:>100", "a"] {
        let v = vars(&[("q", q)]);
        assert_eq!(v.q, q);
        assert_eq!(v.first, Some(12));
        assert_eq!(v.after, None);
        assert_eq!(v.last, None);
        assert_eq!(v.before, None);
    }
}

#[test]
fn next_cursor_pages_forward() {
    let v = vars(&[("q", "rust"), ("next", "Y3Vyc29yOjEy")]);
    assert_eq!(v.first, Some(PAGE_SIZE));
    assert_eq!(v.after.as_deref(), Some("Y3Vyc29yOjEy"));
    assert_eq!(v.last, None);
    assert_eq!(v.before, None);
}

#[test]
fn prev_cursor_pages_backward() {
    let v = vars(&[("q", "rust"), ("prev", "Y3Vyc29yOjEz")]);
    assert_eq!(v.first, None);
    assert_eq!(v.after, None);
    assert_eq!(v.last, Some(PAGE_SIZE));
    assert_eq!(v.before.as_deref(), Some("Y3Vyc29yOjEz"));
}

#[test]
fn next_takes_precedence_over_prev() {
    let p = SearchParams::from_pairs([("prev", "b".to_string()), ("q", "x".into()), ("next", "a".into())])
        .unwrap();
    assert_eq!(p.page, Page::After("a".into()));
    let v = p.variables();
    assert_eq!(v.first, Some(12));
    assert_eq!(v.after.as_deref(), Some("a"));
    assert_eq!(v.before, None);
}
