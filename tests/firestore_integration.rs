// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Firestore integration tests.
//!
//! These tests require the Firestore emulator to be running and are skipped
//! when `FIRESTORE_EMULATOR_HOST` is not set. The emulator keeps data between
//! tests, so every test works under its own unique IDs.

use chrono::{Duration, Utc};
use usersms::db::{RatingStore, UserStore};
use usersms::models::{Filter, OptionalField, Rating, UserUpdate};

mod common;
use common::test_db;

/// Generate a unique ID for test isolation.
fn unique_id(prefix: &str) -> String {
    format!("{}-{}", prefix, uuid::Uuid::new_v4().simple())
}

fn rating(section: &str, for_user: &str, by_user: &str, value: f32, minutes: i64) -> Rating {
    let created = Utc::now() + Duration::minutes(minutes);
    Rating {
        id: uuid::Uuid::new_v4().to_string(),
        for_section: section.to_string(),
        for_user_id: for_user.to_string(),
        by_user_id: by_user.to_string(),
        rating: value,
        comment: String::new(),
        created,
        last_updated: created,
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// USER TESTS
// ═══════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn test_upsert_creates_then_updates_user() {
    require_emulator!();

    let db = test_db().await;
    let user_id = unique_id("user");

    let err = db.user_by_id(&user_id, None).await.unwrap_err();
    assert!(err.is_not_found(), "got {:?}", err);

    let mut update = UserUpdate::new(&user_id);
    update.name = OptionalField::set("Ann".to_string());
    update.gender = OptionalField::set("FEMALE".to_string());
    update.ice_phone = OptionalField::set("+254712345678".to_string());
    let created = db.upsert_user(update).await.unwrap();
    assert_eq!(created.name, "Ann");
    assert_eq!(created.created, created.last_updated);

    let mut update = UserUpdate::new(&user_id);
    update.ice_phone = OptionalField::clear();
    let updated = db.upsert_user(update).await.unwrap();
    assert_eq!(updated.name, "Ann");
    assert_eq!(updated.ice_phone, "");
    assert_eq!(updated.created, created.created);
    assert!(updated.last_updated >= created.last_updated);

    let fetched = db.user_by_id(&user_id, None).await.unwrap();
    assert_eq!(fetched, updated);
}

#[tokio::test]
async fn test_offset_update_date_hides_unchanged_user() {
    require_emulator!();

    let db = test_db().await;
    let user_id = unique_id("user");

    let mut update = UserUpdate::new(&user_id);
    update.name = OptionalField::set("Bob".to_string());
    update.gender = OptionalField::set("MALE".to_string());
    let saved = db.upsert_user(update).await.unwrap();

    let before = saved.last_updated - Duration::seconds(1);
    assert!(db.user_by_id(&user_id, Some(before)).await.is_ok());

    let err = db
        .user_by_id(&user_id, Some(saved.last_updated))
        .await
        .unwrap_err();
    assert!(err.is_not_found(), "got {:?}", err);
}

#[tokio::test]
async fn test_user_id_with_slash_round_trips() {
    require_emulator!();

    let db = test_db().await;
    let user_id = format!("team/{}", unique_id("user"));

    let err = db.user_by_id(&user_id, None).await.unwrap_err();
    assert!(err.is_not_found(), "got {:?}", err);

    let mut update = UserUpdate::new(&user_id);
    update.name = OptionalField::set("Cy".to_string());
    update.gender = OptionalField::set("OTHER".to_string());
    db.upsert_user(update).await.unwrap();

    let fetched = db.user_by_id(&user_id, None).await.unwrap();
    assert_eq!(fetched.id, user_id);
}

#[tokio::test]
async fn test_concurrent_updates_to_different_fields_both_survive() {
    require_emulator!();

    let db = test_db().await;
    let user_id = unique_id("user");

    let mut update = UserUpdate::new(&user_id);
    update.name = OptionalField::set("Ann".to_string());
    update.gender = OptionalField::set("FEMALE".to_string());
    db.upsert_user(update).await.unwrap();

    let mut rename = UserUpdate::new(&user_id);
    rename.name = OptionalField::set("Bo".to_string());
    let mut avatar = UserUpdate::new(&user_id);
    avatar.avatar_url = OptionalField::set("https://example.com/bo.png".to_string());

    // A transaction that loses the race may be aborted; it must never
    // overwrite the other field.
    let (renamed, avatared) = tokio::join!(db.upsert_user(rename), db.upsert_user(avatar));

    let fetched = db.user_by_id(&user_id, None).await.unwrap();
    if renamed.is_ok() {
        assert_eq!(fetched.name, "Bo");
    }
    if avatared.is_ok() {
        assert_eq!(fetched.avatar_url, "https://example.com/bo.png");
    }
    assert!(renamed.is_ok() || avatared.is_ok());
}

// ═══════════════════════════════════════════════════════════════════════════
// RATING TESTS
// ═══════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn test_duplicate_rating_conflicts() {
    require_emulator!();

    let db = test_db().await;
    let section = unique_id("section");
    let first = rating(&section, "u1", "u2", 4.0, 0);
    db.save_rating(&first).await.unwrap();

    let err = db
        .save_rating(&rating(&section, "u1", "u2", 1.0, 1))
        .await
        .unwrap_err();
    assert!(err.is_conflict(), "got {:?}", err);

    let stored = db.rating_by_key("u2", &section, "u1").await.unwrap();
    assert_eq!(stored.id, first.id);
    assert_eq!(stored.rating, 4.0);
}

#[tokio::test]
async fn test_filter_and_pagination() {
    require_emulator!();

    let db = test_db().await;
    let section = unique_id("section");
    for n in 0..3 {
        db.save_rating(&rating(&section, "u1", &format!("rater{}", n), 3.0, n))
            .await
            .unwrap();
    }
    db.save_rating(&rating(&section, "u2", "rater0", 5.0, 5))
        .await
        .unwrap();

    let filter = Filter {
        for_section: Some(section.clone()),
        for_user_id: Some("u1".to_string()),
        count: 2,
        ..Default::default()
    };
    let page = db.ratings_by_filter(&filter).await.unwrap();
    assert_eq!(page.len(), 2);
    assert_eq!(page[0].by_user_id, "rater0");
    assert_eq!(page[1].by_user_id, "rater1");

    let rest = db
        .ratings_by_filter(&Filter {
            offset: 2,
            ..filter.clone()
        })
        .await
        .unwrap();
    assert_eq!(rest.len(), 1);
    assert_eq!(rest[0].by_user_id, "rater2");

    let err = db
        .ratings_by_filter(&Filter {
            by_user_id: Some("nobody".to_string()),
            ..filter
        })
        .await
        .unwrap_err();
    assert!(err.is_not_found(), "got {:?}", err);
}

#[tokio::test]
async fn test_average_includes_new_ratee() {
    require_emulator!();

    let db = test_db().await;
    let section = unique_id("section");
    let ratee = unique_id("ratee");
    db.save_rating(&rating(&section, &ratee, "u2", 4.0, 0))
        .await
        .unwrap();
    db.save_rating(&rating(&section, &ratee, "u3", 1.0, 1))
        .await
        .unwrap();

    // Other tests share the emulator, so page until the ratee shows up.
    let mut offset = 0;
    let average = loop {
        let page = db.average_ratings_by_user(offset, 100).await.unwrap();
        if let Some(found) = page.iter().find(|a| a.user_id == ratee) {
            break found.clone();
        }
        offset += page.len() as i64;
    };

    assert_eq!(average.num_raters, 2);
    assert!((average.rating - 2.5).abs() < 1e-9);
}
