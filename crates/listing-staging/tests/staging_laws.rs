use listing_model::{Attachment, LocalFile, NewAttachment, PersistedAttachment, Preview};
use listing_staging::{merge_order, Rejection, RejectionCode, StagingList, ValidationGate};
use pretty_assertions::assert_eq;
use proptest::prelude::*;

fn new_attachment(name: &str, size: usize) -> NewAttachment {
    NewAttachment::new(
        LocalFile::new(name, "image/jpeg", vec![0u8; size]),
        Preview::new(format!("data:image/jpeg;base64,{name}")),
    )
}

/// Build a list from flags: `true` = persisted, `false` = new
fn build(kinds: &[bool]) -> StagingList {
    let mut list = StagingList::new();
    for (i, persisted) in kinds.iter().enumerate() {
        if *persisted {
            list.add(PersistedAttachment::unresolved(format!("https://cdn/p{i}.jpg")));
        } else {
            list.add(new_attachment(&format!("n{i}.jpg"), i + 1));
        }
    }
    list
}

fn labels(list: &StagingList) -> Vec<String> {
    list.as_slice()
        .iter()
        .map(|a| a.display_url().to_string())
        .collect()
}

#[test]
fn ordering_law_persisted_then_new() {
    let mut list = StagingList::new();
    list.add(PersistedAttachment::resolved("A", "1"));
    list.add(new_attachment("c.jpg", 4));
    list.add(PersistedAttachment::resolved("B", "2"));

    let merged = list.snapshot().merge(vec!["C".to_string()]);
    assert_eq!(merged, vec!["A", "B", "C"]);
    assert_ne!(merged, vec!["A", "C", "B"]);
}

#[test]
fn staging_same_file_twice_is_rejected() {
    let gate = ValidationGate::default();
    let mut list = StagingList::new();
    let file = LocalFile::new("dup.jpg", "image/jpeg", vec![0u8; 64]);

    gate.check(&file, &list, None).unwrap();
    list.add(NewAttachment::new(file.clone(), Preview::new("data:")));

    let err = gate.check(&file, &list, None).unwrap_err();
    assert_eq!(err.code(), RejectionCode::DuplicateInSession);
    assert_eq!(list.len(), 1);
}

#[test]
fn sixth_attachment_exceeds_capacity() {
    let gate = ValidationGate::default();
    let list = build(&[true, false, true, false, false]);
    let err = gate
        .check(&LocalFile::new("six.jpg", "image/jpeg", vec![0u8; 1]), &list, None)
        .unwrap_err();
    assert_eq!(err, Rejection::CapacityExceeded { max: 5 });
    assert_eq!(list.len(), 5);
}

proptest! {
    #[test]
    fn prop_move_up_then_down_restores(kinds in prop::collection::vec(any::<bool>(), 1..8), seed in any::<usize>()) {
        let mut list = build(&kinds);
        let before = labels(&list);
        let i = seed % list.len();

        if list.move_up(i) {
            // the moved item now sits at i - 1
            prop_assert!(list.move_down(i - 1));
        }
        prop_assert_eq!(labels(&list), before);
    }

    #[test]
    fn prop_move_down_then_up_restores(kinds in prop::collection::vec(any::<bool>(), 1..8), seed in any::<usize>()) {
        let mut list = build(&kinds);
        let before = labels(&list);
        let i = seed % list.len();

        if list.move_down(i) {
            prop_assert!(list.move_up(i + 1));
        }
        prop_assert_eq!(labels(&list), before);
    }

    #[test]
    fn prop_reorders_preserve_membership(
        kinds in prop::collection::vec(any::<bool>(), 1..8),
        ops in prop::collection::vec((any::<bool>(), any::<usize>()), 0..20),
    ) {
        let mut list = build(&kinds);
        let mut expected = labels(&list);
        expected.sort();

        for (up, raw) in ops {
            let i = raw % (list.len() + 1);
            if up { list.move_up(i); } else { list.move_down(i); }
        }

        let mut after = labels(&list);
        after.sort();
        prop_assert_eq!(after, expected);

        let ordinals: Vec<usize> = list.iter().map(|(o, _)| o).collect();
        prop_assert_eq!(ordinals, (0..list.len()).collect::<Vec<_>>());
    }

    #[test]
    fn prop_merge_keeps_relative_order(kinds in prop::collection::vec(any::<bool>(), 0..8)) {
        let list = build(&kinds);
        let snapshot = list.snapshot();
        let uploaded: Vec<String> = snapshot
            .uploads()
            .iter()
            .map(|u| format!("https://cdn/{}", u.file.name()))
            .collect();

        let merged = snapshot.merge(uploaded.clone());

        let persisted: Vec<String> = list
            .as_slice()
            .iter()
            .filter_map(Attachment::remote_url)
            .map(ToString::to_string)
            .collect();

        prop_assert_eq!(merged.len(), list.len());
        prop_assert_eq!(&merged[..persisted.len()], &persisted[..]);
        prop_assert_eq!(&merged[persisted.len()..], &uploaded[..]);
        prop_assert_eq!(merged, merge_order(persisted, uploaded));
    }

    #[test]
    fn prop_remove_keeps_ordinals_dense(kinds in prop::collection::vec(any::<bool>(), 1..8), seed in any::<usize>()) {
        let mut list = build(&kinds);
        let len = list.len();
        let i = seed % len;

        prop_assert!(list.remove(i).is_ok());
        prop_assert_eq!(list.len(), len - 1);
        let ordinals: Vec<usize> = list.iter().map(|(o, _)| o).collect();
        prop_assert_eq!(ordinals, (0..len - 1).collect::<Vec<_>>());
    }
}
