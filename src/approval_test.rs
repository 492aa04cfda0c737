use super::*;

fn queue() -> ApprovalQueue<&'static str> {
    ApprovalQueue::new(vec!["ana", "bia", "caio"])
}

#[test]
fn starts_on_first_entry() {
    let q = queue();
    assert_eq!(q.current(), Some(&"ana"));
    assert_eq!(q.position(), Some(0));
    assert!(q.has_next());
    assert!(!q.has_previous());
}

#[test]
fn empty_queue_has_no_current() {
    let mut q: ApprovalQueue<&str> = ApprovalQueue::new(Vec::new());
    assert_eq!(q.current(), None);
    assert_eq!(q.position(), None);
    assert!(!q.has_next());
    assert!(!q.has_previous());
    assert_eq!(q.next(), None);
    assert_eq!(q.remove_current(), None);
}

#[test]
fn next_and_previous_stop_at_ends() {
    let mut q = queue();
    assert_eq!(q.next(), Some(&"bia"));
    assert_eq!(q.next(), Some(&"caio"));
    assert!(!q.has_next());
    assert_eq!(q.next(), Some(&"caio"));
    assert_eq!(q.previous(), Some(&"bia"));
    assert_eq!(q.previous(), Some(&"ana"));
    assert_eq!(q.previous(), Some(&"ana"));
}

#[test]
fn removing_middle_selects_previous() {
    let mut q = queue();
    q.next();
    assert_eq!(q.remove_current(), Some("bia"));
    assert_eq!(q.current(), Some(&"ana"));
    assert!(q.has_next());
    assert_eq!(q.len(), 2);
}

#[test]
fn removing_first_selects_new_first() {
    let mut q = queue();
    assert_eq!(q.remove_current(), Some("ana"));
    assert_eq!(q.current(), Some(&"bia"));
    assert!(!q.has_previous());
}

#[test]
fn removing_last_remaining_empties_queue() {
    let mut q = ApprovalQueue::new(vec!["solo"]);
    assert_eq!(q.remove_current(), Some("solo"));
    assert!(q.is_empty());
    assert_eq!(q.current(), None);
}

#[test]
fn removing_tail_keeps_cursor_in_range() {
    let mut q = queue();
    q.next();
    q.next();
    q.remove_current();
    assert_eq!(q.current(), Some(&"bia"));
    assert!(!q.has_next());
}

#[test]
fn select_where_jumps_to_match() {
    let mut q = queue();
    assert_eq!(q.select_where(|s| s.starts_with('c')), Some(&"caio"));
    assert_eq!(q.position(), Some(2));
    assert_eq!(q.select_where(|s| s.is_empty()), None);
    assert_eq!(q.position(), Some(2));
}
