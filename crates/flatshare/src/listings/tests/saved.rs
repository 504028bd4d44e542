use std::sync::Arc;
use std::thread;

use super::common::{build_service, owner, publish, stranger, DeletingOnFetch};
use crate::listings::domain::{GenderPreference, ListingId};
use crate::listings::error::ListingError;
use crate::listings::repository::ListingRepository;
use crate::listings::saved::SavedListingRegistry;

#[test]
fn saving_twice_keeps_a_single_edge() {
    let (service, store) = build_service();
    let listing = publish(&service, "Room", 10_000, GenderPreference::Any);
    let user = stranger();

    service.saved.save(&user, &listing.id).expect("first save");
    service.saved.save(&user, &listing.id).expect("second save");

    assert_eq!(store.saved_edge_count().expect("count"), 1);
    assert_eq!(service.saved.list(&user).expect("list").len(), 1);
}

#[test]
fn unsave_is_idempotent() {
    let (service, _) = build_service();
    let listing = publish(&service, "Room", 10_000, GenderPreference::Any);
    let user = stranger();

    service
        .saved
        .unsave(&user, &listing.id)
        .expect("unsave of unsaved listing");
    service.saved.save(&user, &listing.id).expect("save");
    service.saved.unsave(&user, &listing.id).expect("unsave");
    service.saved.unsave(&user, &listing.id).expect("unsave again");

    assert!(!service.saved.is_saved(&user, &listing.id).expect("lookup"));
}

#[test]
fn saving_a_missing_listing_is_not_found() {
    let (service, _) = build_service();

    let result = service
        .saved
        .save(&stranger(), &ListingId("gone".to_string()));

    assert!(matches!(result, Err(ListingError::NotFound(_))));
}

#[test]
fn list_returns_most_recently_saved_first() {
    let (service, _) = build_service();
    let first = publish(&service, "first", 10_000, GenderPreference::Any);
    let second = publish(&service, "second", 11_000, GenderPreference::Any);
    let user = stranger();

    service.saved.save(&user, &first.id).expect("save");
    service.saved.save(&user, &second.id).expect("save");

    let titles: Vec<_> = service
        .saved
        .list(&user)
        .expect("list")
        .into_iter()
        .map(|listing| listing.title)
        .collect();

    assert_eq!(titles, vec!["second", "first"]);
}

#[test]
fn bookmarks_are_per_user() {
    let (service, _) = build_service();
    let listing = publish(&service, "Room", 10_000, GenderPreference::Any);

    service.saved.save(&stranger(), &listing.id).expect("save");

    assert!(service.saved.list(&owner()).expect("list").is_empty());
    assert!(service
        .saved
        .is_saved(&stranger(), &listing.id)
        .expect("lookup"));
}

#[test]
fn list_reflects_current_listing_state() {
    let (service, _) = build_service();
    let listing = publish(&service, "Room", 10_000, GenderPreference::Any);
    let user = stranger();
    service.saved.save(&user, &listing.id).expect("save");

    service
        .listings
        .set_availability(Some(&owner()), &listing.id, false)
        .expect("toggle");

    let saved = service.saved.list(&user).expect("list");
    assert!(!saved[0].is_available);
}

#[test]
fn dangling_edges_are_skipped() {
    let (service, store) = build_service();
    let kept = publish(&service, "kept", 10_000, GenderPreference::Any);
    let doomed = publish(&service, "doomed", 11_000, GenderPreference::Any);
    let user = stranger();
    service.saved.save(&user, &kept.id).expect("save");
    service.saved.save(&user, &doomed.id).expect("save");
    ListingRepository::delete(store.as_ref(), &doomed.id).expect("raw delete");

    let saved = service.saved.list(&user).expect("list");

    assert_eq!(saved.len(), 1);
    assert_eq!(saved[0].id, kept.id);
    assert!(!service.saved.is_saved(&user, &doomed.id).expect("lookup"));
    assert!(service.saved.is_saved(&user, &kept.id).expect("lookup"));
}

#[test]
fn save_racing_a_delete_leaves_no_edge() {
    let (service, store) = build_service();
    let listing = publish(&service, "Room", 10_000, GenderPreference::Any);
    let user = stranger();
    let registry = SavedListingRegistry::new(
        Arc::new(DeletingOnFetch {
            store: store.clone(),
        }),
        store.clone(),
    );

    let result = registry.save(&user, &listing.id);

    assert!(matches!(result, Err(ListingError::NotFound(_))));
    assert_eq!(store.saved_edge_count().expect("count"), 0);
    assert!(!service.saved.is_saved(&user, &listing.id).expect("lookup"));
    assert!(service.saved.list(&user).expect("list").is_empty());
}

#[test]
fn concurrent_saves_keep_a_single_edge() {
    let (service, store) = build_service();
    let listing = publish(&service, "Room", 10_000, GenderPreference::Any);
    let service = Arc::new(service);
    let user = stranger();

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let service = Arc::clone(&service);
            let user = user.clone();
            let listing_id = listing.id.clone();
            thread::spawn(move || service.saved.save(&user, &listing_id))
        })
        .collect();
    for handle in handles {
        handle.join().expect("thread finished").expect("save");
    }

    assert_eq!(store.saved_edge_count().expect("count"), 1);
    assert!(service.saved.is_saved(&user, &listing.id).expect("lookup"));
}

#[test]
fn concurrent_unsaves_all_succeed() {
    let (service, store) = build_service();
    let listing = publish(&service, "Room", 10_000, GenderPreference::Any);
    let service = Arc::new(service);
    let user = stranger();
    service.saved.save(&user, &listing.id).expect("save");

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let service = Arc::clone(&service);
            let user = user.clone();
            let listing_id = listing.id.clone();
            thread::spawn(move || service.saved.unsave(&user, &listing_id))
        })
        .collect();
    for handle in handles {
        handle.join().expect("thread finished").expect("unsave");
    }

    assert_eq!(store.saved_edge_count().expect("count"), 0);
}
