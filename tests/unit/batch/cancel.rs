use super::*;

#[test]
fn clones_share_the_flag() {
    let token = CancelToken::new();
    let handle = token.clone();
    assert!(!token.is_cancelled());
    handle.cancel();
    handle.cancel();
    assert!(token.is_cancelled());
}

#[test]
fn cancellation_is_visible_across_threads() {
    let token = CancelToken::new();
    let remote = token.clone();
    std::thread::spawn(move || remote.cancel()).join().unwrap();
    assert!(token.is_cancelled());
}
