use chrono::{TimeZone, Utc};
use comiccon_core::db::open_db_in_memory;
use comiccon_core::{
    check_conflict, humanize, register, register_at, validate, Field, KeyValueStore,
    KvRegistrationStore, RegisterError, Registration, RegistrationInput, RegistrationService,
    RegistrationStore, SqliteKeyValueStore, CONFLICT_MESSAGE,
};

fn al_lee() -> RegistrationInput {
    RegistrationInput {
        attendee_name: "Al Lee".to_string(),
        email: "al@example.com".to_string(),
        session_title: "anime-evolution".to_string(),
        time_slot: "9-am".to_string(),
        ..RegistrationInput::default()
    }
}

#[test]
fn end_to_end_registration_then_conflict() {
    let conn = open_db_in_memory().unwrap();
    let store = KvRegistrationStore::new(SqliteKeyValueStore::try_new(&conn).unwrap());
    let service = RegistrationService::new(store);

    let created = service.submit(&al_lee()).unwrap();
    assert_eq!(created.attendee_name, "Al Lee");
    assert_eq!(service.list().unwrap().len(), 1);
    assert_eq!(
        humanize(&created.session_title),
        "Anime Evolution: Past to Present"
    );

    let second = RegistrationInput {
        attendee_name: "Bo Park".to_string(),
        email: "bo@example.com".to_string(),
        ..al_lee()
    };
    let err = service.submit(&second).unwrap_err();
    assert!(matches!(
        &err,
        RegisterError::Conflict { session_title, time_slot }
            if session_title == "anime-evolution" && time_slot == "9-am"
    ));
    assert_eq!(err.to_string(), CONFLICT_MESSAGE);
    assert_eq!(service.list().unwrap().len(), 1);
}

#[test]
fn validate_collects_every_failing_field() {
    let errors = validate(&RegistrationInput {
        attendee_name: " A ".to_string(),
        email: "not-an-email".to_string(),
        session_title: String::new(),
        ..RegistrationInput::default()
    })
    .unwrap_err();

    assert_eq!(errors.len(), 3);
    assert_eq!(
        errors.message_for(Field::AttendeeName),
        Some("Please enter your name (2+ chars)")
    );
    assert_eq!(
        errors.message_for(Field::Email),
        Some("Please enter a valid email")
    );
    assert_eq!(
        errors.message_for(Field::SessionTitle),
        Some("Please select a session")
    );
}

#[test]
fn name_length_counts_characters_not_bytes() {
    let with_name = |name: &str| RegistrationInput {
        attendee_name: name.to_string(),
        ..al_lee()
    };

    assert!(validate(&with_name("李雷")).is_ok());
    assert!(validate(&with_name("é")).unwrap_err().has(Field::AttendeeName));
    assert!(validate(&with_name(" 😀 ")).unwrap_err().has(Field::AttendeeName));
}

#[test]
fn validate_distinguishes_missing_email() {
    let errors = validate(&RegistrationInput {
        email: "   ".to_string(),
        ..al_lee()
    })
    .unwrap_err();

    assert_eq!(errors.len(), 1);
    assert_eq!(
        errors.message_for(Field::Email),
        Some("Please enter your email")
    );
}

#[test]
fn validate_trims_accepted_fields() {
    let fields = validate(&RegistrationInput {
        attendee_name: "  Al Lee ".to_string(),
        email: " al@example.com ".to_string(),
        cosplay_notes: "  cape  ".to_string(),
        ..al_lee()
    })
    .unwrap();

    assert_eq!(fields.attendee_name, "Al Lee");
    assert_eq!(fields.email, "al@example.com");
    assert_eq!(fields.cosplay_notes, "cape");
}

#[test]
fn invalid_submission_leaves_store_untouched() {
    let conn = open_db_in_memory().unwrap();
    let store = KvRegistrationStore::new(SqliteKeyValueStore::try_new(&conn).unwrap());
    let service = RegistrationService::new(store);

    let err = service
        .submit(&RegistrationInput {
            attendee_name: "A".to_string(),
            ..al_lee()
        })
        .unwrap_err();

    match err {
        RegisterError::Invalid(errors) => assert!(errors.has(Field::AttendeeName)),
        other => panic!("unexpected error: {other}"),
    }
    assert!(service.list().unwrap().is_empty());
    assert_eq!(service.store().last_id().unwrap(), None);
}

#[test]
fn conflict_requires_both_session_and_slot() {
    let existing = vec![register(&al_lee(), &[]).unwrap()];

    assert!(check_conflict("anime-evolution", "9-am", &existing));
    assert!(!check_conflict("anime-evolution", "11-am", &existing));
    assert!(!check_conflict("gaming-future", "9-am", &existing));
    assert!(!check_conflict("anime-evolution", "", &existing));
    assert!(!check_conflict("", "9-am", &existing));
}

#[test]
fn registrations_without_time_slot_never_conflict() {
    let no_slot = RegistrationInput {
        time_slot: String::new(),
        ..al_lee()
    };
    let first = register(&no_slot, &[]).unwrap();
    let second = register(&no_slot, &[first.clone()]).unwrap();

    assert_eq!(second.time_slot, "");
    assert_ne!(first.id, second.id);
}

#[test]
fn register_at_stamps_clock_and_optional_fields() {
    let now = Utc.with_ymd_and_hms(2024, 7, 25, 17, 0, 0).unwrap();
    let input = RegistrationInput {
        fandom_category: "anime".to_string(),
        cosplay_notes: "Spike Spiegel".to_string(),
        ..al_lee()
    };

    let created = register_at(&input, &[], None, now).unwrap();

    assert_eq!(created.id, now.timestamp_millis());
    assert_eq!(created.created_at, now);
    assert_eq!(created.fandom_category, "anime");
    assert_eq!(created.cosplay_notes, "Spike Spiegel");
}

#[test]
fn same_millisecond_submissions_get_distinct_increasing_ids() {
    let conn = open_db_in_memory().unwrap();
    let store = KvRegistrationStore::new(SqliteKeyValueStore::try_new(&conn).unwrap());
    let service = RegistrationService::new(store);
    let now = Utc.with_ymd_and_hms(2024, 7, 25, 17, 0, 0).unwrap();

    let first = service.submit_at(&al_lee(), now).unwrap();
    let second = service
        .submit_at(
            &RegistrationInput {
                time_slot: "11-am".to_string(),
                ..al_lee()
            },
            now,
        )
        .unwrap();

    assert_eq!(first.id, now.timestamp_millis());
    assert_eq!(second.id, first.id + 1);
    assert_eq!(service.store().last_id().unwrap(), Some(second.id));
}

#[test]
fn ids_are_not_reused_after_clear() {
    let conn = open_db_in_memory().unwrap();
    let store = KvRegistrationStore::new(SqliteKeyValueStore::try_new(&conn).unwrap());
    let service = RegistrationService::new(store);
    let now = Utc.with_ymd_and_hms(2024, 7, 25, 17, 0, 0).unwrap();

    let first = service.submit_at(&al_lee(), now).unwrap();
    service.clear_all().unwrap();
    let second = service.submit_at(&al_lee(), now).unwrap();

    assert!(second.id > first.id);
}

#[test]
fn remove_record_keeps_persisted_order() {
    let conn = open_db_in_memory().unwrap();
    let store = KvRegistrationStore::new(SqliteKeyValueStore::try_new(&conn).unwrap());
    let service = RegistrationService::new(store);

    let slots = ["5-pm", "9-am", "1-pm"];
    let created: Vec<Registration> = slots
        .iter()
        .map(|slot| {
            service
                .submit(&RegistrationInput {
                    time_slot: slot.to_string(),
                    ..al_lee()
                })
                .unwrap()
        })
        .collect();

    assert!(service.remove_record(&created[1]).unwrap());
    assert!(!service.remove_record(&created[1]).unwrap());

    let remaining: Vec<String> = service
        .list()
        .unwrap()
        .into_iter()
        .map(|r| r.time_slot)
        .collect();
    assert_eq!(remaining, vec!["5-pm", "1-pm"]);
}

#[test]
fn corrupt_max_last_id_does_not_repeat_ids() {
    let conn = open_db_in_memory().unwrap();
    let kv = SqliteKeyValueStore::try_new(&conn).unwrap();
    kv.set_item("comiccon_lastId", &i64::MAX.to_string()).unwrap();
    let service = RegistrationService::new(KvRegistrationStore::new(kv));
    let now = Utc.with_ymd_and_hms(2024, 7, 25, 17, 0, 0).unwrap();

    let first = service.submit_at(&al_lee(), now).unwrap();
    let second = service
        .submit_at(
            &RegistrationInput {
                time_slot: "11-am".to_string(),
                ..al_lee()
            },
            now,
        )
        .unwrap();

    assert_eq!(first.id, now.timestamp_millis());
    assert_eq!(second.id, first.id + 1);
    assert_eq!(service.store().last_id().unwrap(), Some(second.id));
}

#[test]
fn stored_max_id_rejects_new_registration() {
    let conn = open_db_in_memory().unwrap();
    let store = KvRegistrationStore::new(SqliteKeyValueStore::try_new(&conn).unwrap());
    let mut taken = register(&al_lee(), &[]).unwrap();
    taken.id = i64::MAX;
    store.save(&[taken]).unwrap();
    let service = RegistrationService::new(store);

    let err = service
        .submit(&RegistrationInput {
            time_slot: "11-am".to_string(),
            ..al_lee()
        })
        .unwrap_err();

    assert!(matches!(err, RegisterError::IdSpaceExhausted));
    assert_eq!(service.list().unwrap().len(), 1);
}
