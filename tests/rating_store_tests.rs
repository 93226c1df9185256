// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Rating relation tests against the in-memory backend.
//!
//! These tests verify that:
//! 1. A rating identity (section, ratee, rater) can only be saved once
//! 2. Filters combine with AND and pagination is stable
//! 3. Empty results are reported as not found, never as an empty success

use chrono::{Duration, TimeZone, Utc};
use usersms::db::{MemoryStore, RatingStore};
use usersms::models::{Filter, Rating};

fn rating(n: i64, section: &str, for_user: &str, by_user: &str, value: f32) -> Rating {
    let created = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap() + Duration::minutes(n);
    Rating {
        id: format!("r{:03}", n),
        for_section: section.to_string(),
        for_user_id: for_user.to_string(),
        by_user_id: by_user.to_string(),
        rating: value,
        comment: String::new(),
        created,
        last_updated: created,
    }
}

#[tokio::test]
async fn test_duplicate_identity_conflicts() {
    let store = MemoryStore::new();
    let first = rating(1, "driving", "u1", "u2", 4.0);
    store.save_rating(&first).await.unwrap();

    let second = Rating {
        id: "another-id".to_string(),
        rating: 1.0,
        ..first.clone()
    };
    let err = store.save_rating(&second).await.unwrap_err();
    assert!(err.is_conflict(), "got {:?}", err);

    // The first rating is untouched.
    let stored = store.rating_by_key("u2", "driving", "u1").await.unwrap();
    assert_eq!(stored, first);
}

#[tokio::test]
async fn test_same_rater_may_rate_in_other_sections() {
    let store = MemoryStore::new();
    store
        .save_rating(&rating(1, "driving", "u1", "u2", 4.0))
        .await
        .unwrap();
    store
        .save_rating(&rating(2, "cooking", "u1", "u2", 2.0))
        .await
        .unwrap();

    let cooking = store.rating_by_key("u2", "cooking", "u1").await.unwrap();
    assert_eq!(cooking.rating, 2.0);
}

#[tokio::test]
async fn test_rating_by_key_not_found() {
    let store = MemoryStore::new();
    store
        .save_rating(&rating(1, "driving", "u1", "u2", 4.0))
        .await
        .unwrap();

    // Same parties, swapped roles.
    let err = store.rating_by_key("u1", "driving", "u2").await.unwrap_err();
    assert!(err.is_not_found(), "got {:?}", err);
}

#[tokio::test]
async fn test_empty_relation_is_not_found() {
    let store = MemoryStore::new();

    let err = store.ratings_by_filter(&Filter::default()).await.unwrap_err();
    assert!(err.is_not_found(), "got {:?}", err);

    let err = store.average_ratings_by_user(0, 10).await.unwrap_err();
    assert!(err.is_not_found(), "got {:?}", err);
}

#[tokio::test]
async fn test_filter_count_limits_page() {
    let store = MemoryStore::new();
    for n in 0..11 {
        store
            .save_rating(&rating(n, "driving", "u9", &format!("rater{}", n), 3.0))
            .await
            .unwrap();
    }
    store
        .save_rating(&rating(20, "driving", "u8", "rater0", 3.0))
        .await
        .unwrap();

    let filter = Filter {
        for_user_id: Some("u9".to_string()),
        offset: 0,
        count: 10,
        ..Default::default()
    };
    let page = store.ratings_by_filter(&filter).await.unwrap();

    assert_eq!(page.len(), 10);
    assert!(page.iter().all(|r| r.for_user_id == "u9"));
    // Ordered by creation time, so the 11th (latest) rating is the one left out.
    assert_eq!(page.first().unwrap().id, "r000");
    assert_eq!(page.last().unwrap().id, "r009");

    let next = store
        .ratings_by_filter(&Filter {
            offset: 10,
            ..filter.clone()
        })
        .await
        .unwrap();
    assert_eq!(next.len(), 1);
    assert_eq!(next[0].id, "r010");

    let err = store
        .ratings_by_filter(&Filter {
            offset: 11,
            ..filter
        })
        .await
        .unwrap_err();
    assert!(err.is_not_found(), "got {:?}", err);
}

#[tokio::test]
async fn test_filters_combine_with_and() {
    let store = MemoryStore::new();
    store
        .save_rating(&rating(1, "driving", "u1", "u2", 4.0))
        .await
        .unwrap();
    store
        .save_rating(&rating(2, "driving", "u1", "u3", 5.0))
        .await
        .unwrap();
    store
        .save_rating(&rating(3, "cooking", "u1", "u2", 1.0))
        .await
        .unwrap();

    let by_section = store
        .ratings_by_filter(&Filter {
            for_section: Some("driving".to_string()),
            for_user_id: Some("u1".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(by_section.len(), 2);
    assert!(by_section.iter().all(|r| r.for_section == "driving"));

    let exact = store
        .ratings_by_filter(&Filter {
            for_section: Some("cooking".to_string()),
            by_user_id: Some("u2".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(exact.len(), 1);
    assert_eq!(exact[0].id, "r003");
}

#[tokio::test]
async fn test_negative_pagination_is_client_error() {
    let store = MemoryStore::new();
    store
        .save_rating(&rating(1, "driving", "u1", "u2", 4.0))
        .await
        .unwrap();

    let err = store
        .ratings_by_filter(&Filter {
            offset: -1,
            ..Default::default()
        })
        .await
        .unwrap_err();
    assert!(err.is_client_error(), "got {:?}", err);

    let err = store.average_ratings_by_user(0, -5).await.unwrap_err();
    assert!(err.is_client_error(), "got {:?}", err);
}

#[tokio::test]
async fn test_average_ratings_group_by_ratee() {
    let store = MemoryStore::new();
    store
        .save_rating(&rating(1, "driving", "u1", "u2", 4.0))
        .await
        .unwrap();
    store
        .save_rating(&rating(2, "cooking", "u1", "u2", 2.0))
        .await
        .unwrap();
    store
        .save_rating(&rating(3, "driving", "u1", "u3", 3.0))
        .await
        .unwrap();
    store
        .save_rating(&rating(4, "driving", "u2", "u1", 5.0))
        .await
        .unwrap();

    let averages = store.average_ratings_by_user(0, 10).await.unwrap();
    assert_eq!(averages.len(), 2);

    assert_eq!(averages[0].user_id, "u1");
    assert_eq!(averages[0].num_raters, 3);
    assert!((averages[0].rating - 3.0).abs() < 1e-9);

    assert_eq!(averages[1].user_id, "u2");
    assert_eq!(averages[1].num_raters, 1);
    assert!((averages[1].rating - 5.0).abs() < 1e-9);

    // Pagination is over groups, not rows.
    let second_group = store.average_ratings_by_user(1, 1).await.unwrap();
    assert_eq!(second_group.len(), 1);
    assert_eq!(second_group[0].user_id, "u2");

    let err = store.average_ratings_by_user(2, 10).await.unwrap_err();
    assert!(err.is_not_found(), "got {:?}", err);
}
