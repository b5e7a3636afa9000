use proptest::prelude::*;
use rsvp_core::{
    EventId, GroupId, GuestRecord, GuestStore, IngestOptions, MemoryStore, ingest_rows,
    next_group_id, normalize::normalize_prefix, normalized,
};
use std::collections::HashSet;

fn arb_text() -> impl Strategy<Value = String> {
    prop_oneof![
        "[ \t]{0,3}[A-Za-z]{0,6}[ \t]{0,3}",
        Just("mr".to_string()),
        Just(" Mrs ".to_string()),
        Just("DR".to_string()),
        Just("Mdm.".to_string()),
    ]
}

fn arb_guest() -> impl Strategy<Value = GuestRecord> {
    (
        prop::option::of(arb_text()),
        "[ ]{0,2}[A-Za-z]{1,10}[ ]{0,2}",
        prop::option::of(arb_text()),
        1_i64..40,
    )
        .prop_map(|(prefix, first, last, group)| {
            let mut guest = GuestRecord::new(
                EventId::new(1),
                GroupId::new(group).unwrap_or(GroupId::FIRST),
                first,
            );
            guest.prefix = prefix;
            guest.last_name = last;
            guest
        })
}

proptest! {
    #![proptest_config(proptest::test_runner::Config::with_cases(512))]

    #[test]
    fn normalize_is_idempotent(guest in arb_guest()) {
        let once = normalized(guest);
        let twice = normalized(once.clone());
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn normalized_fields_have_no_outer_whitespace(guest in arb_guest()) {
        let out = normalized(guest);
        prop_assert_eq!(out.first_name.trim(), out.first_name.as_str());
        if let Some(prefix) = &out.prefix {
            prop_assert!(!prefix.is_empty());
            prop_assert_eq!(prefix.trim(), prefix.as_str());
        }
        if let Some(last) = &out.last_name {
            prop_assert!(!last.is_empty());
            prop_assert_eq!(last.trim(), last.as_str());
        }
    }

    #[test]
    fn only_abbreviations_gain_a_period(raw in arb_text()) {
        let stem = raw.trim().to_lowercase();
        match normalize_prefix(&raw) {
            None => prop_assert!(stem.is_empty()),
            Some(out) => {
                let abbreviated = ["mr", "mrs", "ms", "dr", "mdm"].contains(&stem.as_str());
                if abbreviated {
                    prop_assert_eq!(out, format!("{}.", raw.trim()));
                } else {
                    prop_assert_eq!(out, raw.trim().to_string());
                }
            }
        }
    }

    #[test]
    fn allocation_exceeds_every_stored_number(groups in prop::collection::vec(1_i64..500, 0..20)) {
        let event = EventId::new(9);
        let mut store = MemoryStore::new();
        for g in &groups {
            let group = GroupId::new(*g).unwrap_or(GroupId::FIRST);
            store
                .insert(GuestRecord::new(event, group, "Guest"))
                .map_err(|e| TestCaseError::fail(e.to_string()))?;
        }
        // A different event must not influence numbering.
        store
            .insert(GuestRecord::new(
                EventId::new(10),
                GroupId::new(900).unwrap_or(GroupId::FIRST),
                "Other",
            ))
            .map_err(|e| TestCaseError::fail(e.to_string()))?;

        let next = next_group_id(&store, Some(event))
            .map_err(|e| TestCaseError::fail(e.to_string()))?;
        let max = groups.iter().copied().max().unwrap_or(0);
        prop_assert_eq!(i64::from(next), max + 1);
    }

    #[test]
    fn ingested_numbers_are_contiguous(flags in prop::collection::vec(prop::bool::ANY, 1..15)) {
        let rows: Vec<String> = flags
            .iter()
            .enumerate()
            .map(|(i, extends)| format!(",Guest{i},Smith,0,{}", if *extends { "y" } else { "" }))
            .collect();
        let mut store = MemoryStore::new();
        let report = ingest_rows(&mut store, &rows, Some(EventId::new(1)), IngestOptions::default())
            .map_err(|e| TestCaseError::fail(e.to_string()))?;

        let numbers: Vec<u32> = report.guests.iter().map(|g| g.group_id.get()).collect();
        prop_assert_eq!(numbers[0], 1);
        for (pair, extends) in numbers.windows(2).zip(flags.iter().skip(1)) {
            let expected = if *extends { pair[0] } else { pair[0] + 1 };
            prop_assert_eq!(pair[1], expected);
        }
        let distinct: HashSet<u32> = numbers.iter().copied().collect();
        prop_assert_eq!(report.invitations_opened, distinct.len());
    }
}
