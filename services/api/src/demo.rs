use crate::infra::{in_memory_marketplace, parse_channel, Marketplace};
use clap::Args;
use flatshare::config::{ContactConfig, ListingConfig};
use flatshare::error::AppError;
use flatshare::listings::{
    resolve, Amenity, ContactVisibility, GenderPreference, Listing, ListingError, ListingFilter,
    ListingImporter, ListingOrder, ListingQuery, MessagingChannel, NewListing, ProfileUpdate,
    UserId,
};
use std::collections::BTreeMap;
use std::io::Cursor;
use std::path::PathBuf;

const SAMPLE_LISTINGS: &str = include_str!("../data/sample_listings.csv");

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Listing CSV to seed the demo with. Defaults to the bundled sample listings.
    #[arg(long)]
    pub(crate) csv: Option<PathBuf>,
    /// Messaging channel used for contact handoffs (whatsapp or sms).
    #[arg(long, value_parser = parse_channel)]
    pub(crate) channel: Option<MessagingChannel>,
}

#[derive(Args, Debug)]
pub(crate) struct ImportArgs {
    /// Listing CSV export to validate
    #[arg(long)]
    pub(crate) csv: PathBuf,
    /// User id that would own the imported listings
    #[arg(long)]
    pub(crate) owner: String,
}

pub(crate) fn run_import(args: ImportArgs) -> Result<(), AppError> {
    let ImportArgs { csv, owner } = args;
    let drafts = ListingImporter::from_path(&csv)?;
    let owner = UserId(owner);

    let marketplace = in_memory_marketplace(ListingConfig::default(), ContactConfig::default());
    let published = publish_all(&marketplace, &owner, drafts)?;

    println!("Listing import check: {}", csv.display());
    println!("- {} listings valid for owner {}", published.len(), owner);
    render_import_summary(&published);
    Ok(())
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs { csv, channel } = args;

    let drafts = match &csv {
        Some(path) => ListingImporter::from_path(path)?,
        None => ListingImporter::from_reader(Cursor::new(SAMPLE_LISTINGS))?,
    };

    let marketplace = in_memory_marketplace(ListingConfig::default(), ContactConfig::default());
    let open_lister = UserId::from("lister-priya");
    let private_lister = UserId::from("lister-arjun");
    let seeker = UserId::from("seeker-meera");

    register_lister(
        &marketplace,
        &open_lister,
        "Priya Sharma",
        "+91 98765-43210",
        ContactVisibility::default(),
    )?;
    register_lister(
        &marketplace,
        &private_lister,
        "Arjun Rao",
        "+91 99000 11122",
        ContactVisibility {
            show_phone: false,
            show_email: true,
            show_messaging: false,
        },
    )?;

    // alternate owners so both visibility profiles show up in the output
    let mut published = Vec::with_capacity(drafts.len());
    for (index, draft) in drafts.into_iter().enumerate() {
        let owner = if index % 2 == 0 {
            &open_lister
        } else {
            &private_lister
        };
        published.push(marketplace.listings.create(Some(owner), draft)?);
    }

    println!("Flatmate marketplace demo");
    match &csv {
        Some(path) => println!("Data source: {}", path.display()),
        None => println!("Data source: bundled sample listings"),
    }
    println!("Published {} listings", published.len());

    let all = marketplace.listings.list(&ListingQuery {
        order: ListingOrder::RentAsc,
        ..ListingQuery::default()
    })?;
    println!("\nAll listings (cheapest first)");
    for listing in &all {
        print_listing(listing);
    }

    let mut filter = ListingFilter {
        max_rent: Some(17_000),
        gender_preference: Some(GenderPreference::Female),
        is_available: Some(true),
        ..ListingFilter::default()
    };
    filter.amenities.set(Amenity::Wifi, true);
    let matches = marketplace
        .listings
        .list(&ListingQuery::with_filter(filter))?;
    println!("\nSearch: female-friendly, available, wifi, rent <= 17000");
    if matches.is_empty() {
        println!("- no listings match");
    }
    for listing in &matches {
        print_listing(listing);
    }

    for listing in &all {
        marketplace.saved.save(&seeker, &listing.id)?;
    }
    if let Some(first) = all.first() {
        marketplace.saved.save(&seeker, &first.id)?;
    }
    let saved = marketplace.saved.list(&seeker)?;
    println!(
        "\n{} saved {} listings (saving one twice keeps a single bookmark)",
        seeker,
        saved.len()
    );

    println!("\nContacting listers");
    for listing in saved.iter().take(2) {
        let contact = resolve(listing, Some(&seeker));
        println!(
            "- {} by {}: phone {} | email {} | messaging {}",
            listing.title,
            contact.name,
            contact.phone.as_deref().unwrap_or("hidden"),
            contact.email.as_deref().unwrap_or("hidden"),
            if contact.can_message { "on" } else { "off" }
        );

        match marketplace.contact.initiate(listing, Some(&seeker), channel) {
            Ok(handoff) => println!("  open {}: {}", handoff.channel, handoff.deep_link),
            Err(ListingError::Precondition(reason)) => println!("  cannot message: {reason}"),
            Err(err) => return Err(err.into()),
        }
    }

    if let Some(listing) = published.first() {
        let owner = listing.user_id.clone();
        let history = marketplace.contact.history(Some(&owner), &listing.id)?;
        println!(
            "\n{} sees {} contact attempt(s) on {}",
            owner,
            history.len(),
            listing.title
        );

        marketplace.listings.delete(Some(&owner), &listing.id)?;
        let remaining = marketplace.saved.list(&seeker)?;
        println!(
            "After {} deleted {}, {} has {} saved listings",
            owner,
            listing.title,
            seeker,
            remaining.len()
        );
    }

    Ok(())
}

fn register_lister(
    marketplace: &Marketplace,
    user_id: &UserId,
    name: &str,
    phone: &str,
    visibility: ContactVisibility,
) -> Result<(), AppError> {
    let email = format!("{}@example.com", user_id.as_str());
    marketplace.profiles.upsert(
        Some(user_id),
        user_id,
        ProfileUpdate {
            name: Some(name.to_string()),
            email: Some(email),
            phone: Some(phone.to_string()),
            contact_visibility: Some(visibility),
            ..ProfileUpdate::default()
        },
    )?;
    Ok(())
}

fn publish_all(
    marketplace: &Marketplace,
    owner: &UserId,
    drafts: Vec<NewListing>,
) -> Result<Vec<Listing>, AppError> {
    drafts
        .into_iter()
        .map(|draft| {
            marketplace
                .listings
                .create(Some(owner), draft)
                .map_err(AppError::from)
        })
        .collect()
}

fn print_listing(listing: &Listing) {
    let amenities: Vec<&str> = listing
        .amenities
        .required()
        .map(|amenity| amenity.key())
        .collect();
    println!(
        "- {} | {} | {} / month | {} flatmate(s) | {} | {}{}",
        listing.title,
        listing.location.city,
        listing.rent_amount,
        listing.number_of_flatmates,
        listing.gender_preference.label(),
        if amenities.is_empty() {
            "no amenities listed".to_string()
        } else {
            amenities.join(", ")
        },
        if listing.is_available { "" } else { " | taken" }
    );
}

fn render_import_summary(listings: &[Listing]) {
    if listings.is_empty() {
        return;
    }

    let mut by_city: BTreeMap<&str, usize> = BTreeMap::new();
    for listing in listings {
        *by_city.entry(listing.location.city.as_str()).or_default() += 1;
    }
    println!("Listings per city");
    for (city, count) in by_city {
        println!("  - {city}: {count}");
    }

    let rents = listings.iter().map(|listing| listing.rent_amount);
    let (min, max) = rents.fold((u32::MAX, 0), |(min, max), rent| {
        (min.min(rent), max.max(rent))
    });
    let available = listings.iter().filter(|listing| listing.is_available).count();
    println!("Rent range: {min} - {max} / month");
    println!("Available now: {available} of {}", listings.len());
}
