// ── Collection reconciliation ──
//
// Minimal-diff synchronization of a local list against an authoritative list
// of identifiers. Entries present on both sides keep their `Arc`, so
// observers comparing by pointer see exactly what changed.

use std::collections::HashSet;
use std::sync::Arc;

/// An item that can be reconciled by identifier.
pub trait Keyed {
    fn key(&self) -> &str;
}

/// What a reconciliation pass changed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    pub added: Vec<String>,
    pub removed: Vec<String>,
}

impl ReconcileReport {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}

/// Bring `local` in line with `authoritative`.
///
/// Entries whose key is absent authoritatively are removed. Missing keys are
/// appended in authoritative order, built by `make`; a key repeated in the
/// authoritative list is appended once. Surviving entries are untouched and
/// keep their relative order.
pub fn reconcile<T, S, F>(local: &mut Vec<Arc<T>>, authoritative: &[S], mut make: F) -> ReconcileReport
where
    T: Keyed,
    S: AsRef<str>,
    F: FnMut(&str) -> T,
{
    let wanted: HashSet<&str> = authoritative.iter().map(AsRef::as_ref).collect();

    let mut report = ReconcileReport::default();
    local.retain(|entry| {
        let keep = wanted.contains(entry.key());
        if !keep {
            report.removed.push(entry.key().to_owned());
        }
        keep
    });

    let mut present: HashSet<String> = local.iter().map(|e| e.key().to_owned()).collect();
    for key in authoritative.iter().map(AsRef::as_ref) {
        if present.insert(key.to_owned()) {
            local.push(Arc::new(make(key)));
            report.added.push(key.to_owned());
        }
    }

    report
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[derive(Debug, PartialEq)]
    struct Item(String);

    impl Keyed for Item {
        fn key(&self) -> &str {
            &self.0
        }
    }

    fn item(key: &str) -> Item {
        Item(key.to_owned())
    }

    fn keys(list: &[Arc<Item>]) -> Vec<&str> {
        list.iter().map(|i| i.key()).collect()
    }

    #[test]
    fn keeps_common_entries_and_appends_new_ones() {
        let a = Arc::new(item("A"));
        let b = Arc::new(item("B"));
        let mut local = vec![a, Arc::clone(&b)];

        let report = reconcile(&mut local, &["B", "C"], item);

        assert_eq!(keys(&local), vec!["B", "C"]);
        assert!(Arc::ptr_eq(&local[0], &b));
        assert_eq!(report.added, vec!["C"]);
        assert_eq!(report.removed, vec!["A"]);
    }

    #[test]
    fn is_idempotent() {
        let mut local = Vec::new();
        reconcile(&mut local, &["x", "y"], item);
        let first: Vec<_> = local.clone();

        let report = reconcile(&mut local, &["x", "y"], item);

        assert!(report.is_empty());
        assert_eq!(local.len(), first.len());
        for (before, after) in first.iter().zip(&local) {
            assert!(Arc::ptr_eq(before, after));
        }
    }

    #[test]
    fn duplicate_identifiers_are_added_once() {
        let mut local = Vec::new();
        let report = reconcile(&mut local, &["x", "x", "y"], item);
        assert_eq!(keys(&local), vec!["x", "y"]);
        assert_eq!(report.added, vec!["x", "y"]);
    }

    #[test]
    fn new_entries_follow_authoritative_order() {
        let mut local = vec![Arc::new(item("m"))];
        reconcile(&mut local, &["z", "m", "a"], item);
        assert_eq!(keys(&local), vec!["m", "z", "a"]);
    }

    #[test]
    fn empty_authoritative_list_clears_local() {
        let mut local = vec![Arc::new(item("a")), Arc::new(item("b"))];
        let report = reconcile::<_, &str, _>(&mut local, &[], item);
        assert!(local.is_empty());
        assert_eq!(report.removed, vec!["a", "b"]);
    }
}
