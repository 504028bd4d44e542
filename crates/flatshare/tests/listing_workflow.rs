use std::io::Cursor;
use std::sync::Arc;

use flatshare::config::{ContactConfig, ListingConfig};
use flatshare::listings::{
    Amenity, ContactPrecondition, ContactVisibility, GenderPreference, InMemoryStore,
    ListingError, ListingFilter, ListingImporter, ListingQuery, MarketplaceService,
    ProfileUpdate, UserId,
};

const CSV: &str = "title,description,address,city,state,postal_code,rent_amount,number_of_flatmates,gender_preference,amenities,is_available
Cozy 3BHK in Koramangala,Close to Forum mall,\"123, 5th Cross\",Bengaluru,Karnataka,560034,12000,2,male,wifi;kitchen,true
Sunny room in Baner,Balcony with a view,7 Baner Road,Pune,Maharashtra,411045,9500,1,any,wifi;balcony,true
Studio near Andheri,Compact and furnished,22 Link Road,Mumbai,Maharashtra,400053,18000,1,female,wifi;parking;furnished,false
";

fn marketplace() -> MarketplaceService<InMemoryStore> {
    MarketplaceService::new(
        Arc::new(InMemoryStore::default()),
        ListingConfig::default(),
        ContactConfig::default(),
    )
}

fn seed(service: &MarketplaceService<InMemoryStore>, owner: &UserId) {
    for draft in ListingImporter::from_reader(Cursor::new(CSV)).expect("seed csv parses") {
        service
            .listings
            .create(Some(owner), draft)
            .expect("seed listing published");
    }
}

fn titles(listings: Vec<flatshare::listings::Listing>) -> Vec<String> {
    listings.into_iter().map(|listing| listing.title).collect()
}

#[test]
fn seekers_find_listings_through_combined_filters() {
    let service = marketplace();
    let owner = UserId::from("lister-1");
    seed(&service, &owner);

    let female_budget = ListingQuery::with_filter(ListingFilter {
        min_rent: Some(9_000),
        max_rent: Some(15_000),
        gender_preference: Some(GenderPreference::Female),
        ..ListingFilter::default()
    });
    assert_eq!(
        titles(service.listings.list(&female_budget).expect("search")),
        vec!["Sunny room in Baner"]
    );

    let mut wants_parking = ListingFilter::default();
    wants_parking.amenities.set(Amenity::Parking, true);
    wants_parking.is_available = Some(true);
    assert!(service
        .listings
        .list(&ListingQuery::with_filter(wants_parking))
        .expect("search")
        .is_empty());

    let in_maharashtra_cities = ListingQuery::with_filter(ListingFilter {
        city: Some("pUnE".to_string()),
        ..ListingFilter::default()
    });
    assert_eq!(
        service
            .listings
            .list(&in_maharashtra_cities)
            .expect("search")
            .len(),
        1
    );
}

#[test]
fn bookmarks_survive_until_the_listing_is_deleted() {
    let service = marketplace();
    let owner = UserId::from("lister-1");
    let seeker = UserId::from("seeker-1");
    seed(&service, &owner);

    let all = service.listings.list(&ListingQuery::default()).expect("list");
    let target = all[0].id.clone();

    service.saved.save(&seeker, &target).expect("save");
    service.saved.save(&seeker, &target).expect("save again");
    assert_eq!(service.saved.list(&seeker).expect("saved").len(), 1);

    service
        .listings
        .delete(Some(&owner), &target)
        .expect("owner deletes");

    assert!(service.saved.list(&seeker).expect("saved").is_empty());
    assert!(!service.saved.is_saved(&seeker, &target).expect("lookup"));
}

#[test]
fn private_lister_cannot_be_messaged() {
    let service = marketplace();
    let owner = UserId::from("lister-1");
    let seeker = UserId::from("seeker-1");
    service
        .profiles
        .upsert(
            Some(&owner),
            &owner,
            ProfileUpdate {
                name: Some("Arjun".to_string()),
                email: Some("arjun@example.com".to_string()),
                phone: Some("+91 99000 11122".to_string()),
                contact_visibility: Some(ContactVisibility {
                    show_phone: false,
                    show_email: true,
                    show_messaging: false,
                }),
                ..ProfileUpdate::default()
            },
        )
        .expect("profile saved");
    seed(&service, &owner);

    let listing = service
        .listings
        .list(&ListingQuery::default())
        .expect("list")
        .remove(0);

    let contact = flatshare::listings::resolve(&listing, Some(&seeker));
    assert_eq!(contact.name, "Arjun");
    assert_eq!(contact.phone, None);
    assert_eq!(contact.email.as_deref(), Some("arjun@example.com"));
    assert!(!contact.can_message);

    assert!(matches!(
        service.contact.initiate(&listing, Some(&seeker), None),
        Err(ListingError::Precondition(
            ContactPrecondition::MessagingDisabled(_)
        ))
    ));

    let owner_view = flatshare::listings::resolve(&listing, Some(&owner));
    assert!(owner_view.is_owner);
    assert!(owner_view.phone.is_some());
}

#[test]
fn public_lister_receives_a_whatsapp_handoff() {
    let service = marketplace();
    let owner = UserId::from("lister-1");
    service
        .profiles
        .upsert(
            Some(&owner),
            &owner,
            ProfileUpdate {
                name: Some("Meera".to_string()),
                phone: Some("+91 99000 11122".to_string()),
                ..ProfileUpdate::default()
            },
        )
        .expect("profile saved");
    seed(&service, &owner);

    let listing = service
        .listings
        .list(&ListingQuery::default())
        .expect("list")
        .remove(0);
    let handoff = service
        .contact
        .initiate(&listing, None, None)
        .expect("handoff prepared");

    assert_eq!(handoff.target, "919900011122");
    assert!(handoff.deep_link.starts_with("https://wa.me/919900011122?text="));
    assert_eq!(
        service
            .contact
            .history(Some(&owner), &listing.id)
            .expect("history")
            .len(),
        1
    );
}
