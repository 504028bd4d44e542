use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Router,
};
use serde::Deserialize;
use serde_json::json;
use tracing::error;

use super::domain::{
    Amenities, Amenity, GenderPreference, ListingId, ListingOrder, ListingPatch, NewListing,
    UserId,
};
use super::error::{AuthorizationError, ListingError};
use super::filter::{ListingFilter, ListingQuery};
use super::handoff::MessagingChannel;
use super::profiles::ProfileUpdate;
use super::service::{MarketplaceService, MarketplaceStore};
use super::validation::ValidationError;
use super::visibility::{resolve, ListingView};

/// Header carrying the authenticated user id set by the identity layer in front of us.
pub const USER_ID_HEADER: &str = "x-user-id";

/// Router builder exposing the marketplace endpoints.
pub fn listing_router<S>(service: Arc<MarketplaceService<S>>) -> Router
where
    S: MarketplaceStore + 'static,
{
    Router::new()
        .route(
            "/api/v1/listings",
            get(search_handler::<S>).post(create_handler::<S>),
        )
        .route(
            "/api/v1/listings/:listing_id",
            get(show_handler::<S>)
                .patch(update_handler::<S>)
                .delete(delete_handler::<S>),
        )
        .route(
            "/api/v1/listings/:listing_id/availability",
            put(availability_handler::<S>),
        )
        .route(
            "/api/v1/listings/:listing_id/contact-sync",
            post(resync_handler::<S>),
        )
        .route(
            "/api/v1/listings/:listing_id/contact",
            get(contact_handler::<S>).post(handoff_handler::<S>),
        )
        .route(
            "/api/v1/listings/:listing_id/messages",
            get(history_handler::<S>),
        )
        .route(
            "/api/v1/users/:user_id/listings",
            get(owner_listings_handler::<S>),
        )
        .route("/api/v1/me/saved", get(saved_list_handler::<S>))
        .route(
            "/api/v1/me/saved/:listing_id",
            put(save_handler::<S>).delete(unsave_handler::<S>),
        )
        .route(
            "/api/v1/me/profile",
            get(profile_handler::<S>).put(profile_update_handler::<S>),
        )
        .with_state(service)
}

/// Query string accepted by the search endpoint. `amenities` is a comma-separated list.
/// Enum-valued fields arrive as text so unknown values surface as validation failures.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SearchParams {
    min_rent: Option<u32>,
    max_rent: Option<u32>,
    city: Option<String>,
    gender_preference: Option<String>,
    number_of_flatmates: Option<u16>,
    is_available: Option<bool>,
    amenities: Option<String>,
    limit: Option<usize>,
    order: Option<String>,
}

impl SearchParams {
    fn into_query(self) -> Result<ListingQuery, ValidationError> {
        let amenities = match self.amenities.as_deref() {
            Some(raw) => raw
                .split(',')
                .map(str::trim)
                .filter(|key| !key.is_empty())
                .map(|key| key.parse::<Amenity>().map(|amenity| (amenity, true)))
                .collect::<Result<Amenities, _>>()?,
            None => Amenities::default(),
        };
        let gender_preference = self
            .gender_preference
            .as_deref()
            .map(str::parse::<GenderPreference>)
            .transpose()?;
        let order = self
            .order
            .as_deref()
            .map(str::parse::<ListingOrder>)
            .transpose()?
            .unwrap_or_default();

        Ok(ListingQuery {
            filter: ListingFilter {
                min_rent: self.min_rent,
                max_rent: self.max_rent,
                city: self.city,
                gender_preference,
                number_of_flatmates: self.number_of_flatmates,
                is_available: self.is_available,
                amenities,
            },
            limit: self.limit,
            order,
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct AvailabilityRequest {
    is_available: bool,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct HandoffParams {
    channel: Option<MessagingChannel>,
}

pub(crate) fn viewer_from_headers(headers: &HeaderMap) -> Option<UserId> {
    headers
        .get(USER_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(UserId::from)
}

/// HTTP status for each failure class.
pub fn error_status(error: &ListingError) -> StatusCode {
    match error {
        ListingError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
        ListingError::Authorization(AuthorizationError::Anonymous { .. }) => {
            StatusCode::UNAUTHORIZED
        }
        ListingError::Authorization(_) => StatusCode::FORBIDDEN,
        ListingError::NotFound(_) | ListingError::UserNotFound(_) => StatusCode::NOT_FOUND,
        ListingError::Precondition(_) => StatusCode::PRECONDITION_FAILED,
        ListingError::Repository(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

pub(crate) fn error_response(error: ListingError) -> Response {
    let status = error_status(&error);
    if status.is_server_error() {
        error!(%error, "listing request failed");
    }
    let payload = json!({ "error": error.to_string() });
    (status, axum::Json(payload)).into_response()
}

fn signed_in(viewer: Option<&UserId>, action: &'static str) -> Result<UserId, ListingError> {
    viewer
        .cloned()
        .ok_or_else(|| AuthorizationError::Anonymous { action }.into())
}

pub(crate) async fn search_handler<S>(
    State(service): State<Arc<MarketplaceService<S>>>,
    headers: HeaderMap,
    Query(params): Query<SearchParams>,
) -> Response
where
    S: MarketplaceStore + 'static,
{
    let viewer = viewer_from_headers(&headers);
    let query = match params.into_query() {
        Ok(query) => query,
        Err(err) => return error_response(err.into()),
    };

    match service.listings.list(&query) {
        Ok(listings) => {
            let views = ListingView::many(listings, viewer.as_ref());
            (StatusCode::OK, axum::Json(views)).into_response()
        }
        Err(err) => error_response(err),
    }
}

pub(crate) async fn create_handler<S>(
    State(service): State<Arc<MarketplaceService<S>>>,
    headers: HeaderMap,
    axum::Json(input): axum::Json<NewListing>,
) -> Response
where
    S: MarketplaceStore + 'static,
{
    let viewer = viewer_from_headers(&headers);
    match service.listings.create(viewer.as_ref(), input) {
        Ok(listing) => {
            let view = ListingView::new(listing, viewer.as_ref());
            (StatusCode::CREATED, axum::Json(view)).into_response()
        }
        Err(err) => error_response(err),
    }
}

pub(crate) async fn show_handler<S>(
    State(service): State<Arc<MarketplaceService<S>>>,
    headers: HeaderMap,
    Path(listing_id): Path<String>,
) -> Response
where
    S: MarketplaceStore + 'static,
{
    let viewer = viewer_from_headers(&headers);
    match service.listings.get(&ListingId(listing_id)) {
        Ok(listing) => {
            let view = ListingView::new(listing, viewer.as_ref());
            (StatusCode::OK, axum::Json(view)).into_response()
        }
        Err(err) => error_response(err),
    }
}

pub(crate) async fn update_handler<S>(
    State(service): State<Arc<MarketplaceService<S>>>,
    headers: HeaderMap,
    Path(listing_id): Path<String>,
    axum::Json(patch): axum::Json<ListingPatch>,
) -> Response
where
    S: MarketplaceStore + 'static,
{
    let viewer = viewer_from_headers(&headers);
    match service
        .listings
        .update(viewer.as_ref(), &ListingId(listing_id), patch)
    {
        Ok(listing) => {
            let view = ListingView::new(listing, viewer.as_ref());
            (StatusCode::OK, axum::Json(view)).into_response()
        }
        Err(err) => error_response(err),
    }
}

pub(crate) async fn delete_handler<S>(
    State(service): State<Arc<MarketplaceService<S>>>,
    headers: HeaderMap,
    Path(listing_id): Path<String>,
) -> Response
where
    S: MarketplaceStore + 'static,
{
    let viewer = viewer_from_headers(&headers);
    match service
        .listings
        .delete(viewer.as_ref(), &ListingId(listing_id))
    {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn availability_handler<S>(
    State(service): State<Arc<MarketplaceService<S>>>,
    headers: HeaderMap,
    Path(listing_id): Path<String>,
    axum::Json(request): axum::Json<AvailabilityRequest>,
) -> Response
where
    S: MarketplaceStore + 'static,
{
    let viewer = viewer_from_headers(&headers);
    match service.listings.set_availability(
        viewer.as_ref(),
        &ListingId(listing_id),
        request.is_available,
    ) {
        Ok(listing) => {
            let view = ListingView::new(listing, viewer.as_ref());
            (StatusCode::OK, axum::Json(view)).into_response()
        }
        Err(err) => error_response(err),
    }
}

pub(crate) async fn resync_handler<S>(
    State(service): State<Arc<MarketplaceService<S>>>,
    headers: HeaderMap,
    Path(listing_id): Path<String>,
) -> Response
where
    S: MarketplaceStore + 'static,
{
    let viewer = viewer_from_headers(&headers);
    match service
        .listings
        .resync_contact(viewer.as_ref(), &ListingId(listing_id))
    {
        Ok(listing) => {
            let view = ListingView::new(listing, viewer.as_ref());
            (StatusCode::OK, axum::Json(view)).into_response()
        }
        Err(err) => error_response(err),
    }
}

pub(crate) async fn contact_handler<S>(
    State(service): State<Arc<MarketplaceService<S>>>,
    headers: HeaderMap,
    Path(listing_id): Path<String>,
) -> Response
where
    S: MarketplaceStore + 'static,
{
    let viewer = viewer_from_headers(&headers);
    match service.listings.get(&ListingId(listing_id)) {
        Ok(listing) => {
            let contact = resolve(&listing, viewer.as_ref());
            (StatusCode::OK, axum::Json(contact)).into_response()
        }
        Err(err) => error_response(err),
    }
}

pub(crate) async fn handoff_handler<S>(
    State(service): State<Arc<MarketplaceService<S>>>,
    headers: HeaderMap,
    Path(listing_id): Path<String>,
    Query(params): Query<HandoffParams>,
) -> Response
where
    S: MarketplaceStore + 'static,
{
    let viewer = viewer_from_headers(&headers);
    match service
        .contact
        .initiate_for(&ListingId(listing_id), viewer.as_ref(), params.channel)
    {
        Ok(result) => (StatusCode::OK, axum::Json(result)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn history_handler<S>(
    State(service): State<Arc<MarketplaceService<S>>>,
    headers: HeaderMap,
    Path(listing_id): Path<String>,
) -> Response
where
    S: MarketplaceStore + 'static,
{
    let viewer = viewer_from_headers(&headers);
    match service
        .contact
        .history(viewer.as_ref(), &ListingId(listing_id))
    {
        Ok(attempts) => (StatusCode::OK, axum::Json(attempts)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn owner_listings_handler<S>(
    State(service): State<Arc<MarketplaceService<S>>>,
    headers: HeaderMap,
    Path(user_id): Path<String>,
) -> Response
where
    S: MarketplaceStore + 'static,
{
    let viewer = viewer_from_headers(&headers);
    match service.listings.list_by_owner(&UserId(user_id)) {
        Ok(listings) => {
            let views = ListingView::many(listings, viewer.as_ref());
            (StatusCode::OK, axum::Json(views)).into_response()
        }
        Err(err) => error_response(err),
    }
}

pub(crate) async fn saved_list_handler<S>(
    State(service): State<Arc<MarketplaceService<S>>>,
    headers: HeaderMap,
) -> Response
where
    S: MarketplaceStore + 'static,
{
    let viewer = viewer_from_headers(&headers);
    let result = signed_in(viewer.as_ref(), "view saved listings")
        .and_then(|user_id| service.saved.list(&user_id));
    match result {
        Ok(listings) => {
            let views = ListingView::many(listings, viewer.as_ref());
            (StatusCode::OK, axum::Json(views)).into_response()
        }
        Err(err) => error_response(err),
    }
}

pub(crate) async fn save_handler<S>(
    State(service): State<Arc<MarketplaceService<S>>>,
    headers: HeaderMap,
    Path(listing_id): Path<String>,
) -> Response
where
    S: MarketplaceStore + 'static,
{
    let viewer = viewer_from_headers(&headers);
    let result = signed_in(viewer.as_ref(), "save a listing")
        .and_then(|user_id| service.saved.save(&user_id, &ListingId(listing_id)));
    match result {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn unsave_handler<S>(
    State(service): State<Arc<MarketplaceService<S>>>,
    headers: HeaderMap,
    Path(listing_id): Path<String>,
) -> Response
where
    S: MarketplaceStore + 'static,
{
    let viewer = viewer_from_headers(&headers);
    let result = signed_in(viewer.as_ref(), "unsave a listing")
        .and_then(|user_id| service.saved.unsave(&user_id, &ListingId(listing_id)));
    match result {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn profile_handler<S>(
    State(service): State<Arc<MarketplaceService<S>>>,
    headers: HeaderMap,
) -> Response
where
    S: MarketplaceStore + 'static,
{
    let viewer = viewer_from_headers(&headers);
    let result = signed_in(viewer.as_ref(), "view a profile")
        .and_then(|user_id| service.profiles.get(&user_id));
    match result {
        Ok(profile) => (StatusCode::OK, axum::Json(profile)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn profile_update_handler<S>(
    State(service): State<Arc<MarketplaceService<S>>>,
    headers: HeaderMap,
    axum::Json(update): axum::Json<ProfileUpdate>,
) -> Response
where
    S: MarketplaceStore + 'static,
{
    let viewer = viewer_from_headers(&headers);
    let result = signed_in(viewer.as_ref(), "edit a profile")
        .and_then(|user_id| service.profiles.upsert(Some(&user_id), &user_id, update));
    match result {
        Ok(profile) => (StatusCode::OK, axum::Json(profile)).into_response(),
        Err(err) => error_response(err),
    }
}
