use super::domain::{ListingId, UserId};
use super::repository::RepositoryError;
use super::validation::ValidationError;

/// Caller is not allowed to perform the requested mutation.
#[derive(Debug, thiserror::Error)]
pub enum AuthorizationError {
    #[error("sign in required to {action}")]
    Anonymous { action: &'static str },
    #[error("only the owner may {action} listing {listing_id}")]
    NotOwner {
        listing_id: ListingId,
        action: &'static str,
    },
    #[error("profile {0} belongs to another user")]
    ForeignProfile(UserId),
}

/// Contact could not be handed off; the UI can offer another channel instead.
#[derive(Debug, thiserror::Error)]
pub enum ContactPrecondition {
    #[error("listing {0} is not contactable: the lister has disabled messaging")]
    MessagingDisabled(ListingId),
    #[error("listing {0} is not contactable: no phone number is available")]
    MissingPhone(ListingId),
}

/// Error raised by the listing services.
#[derive(Debug, thiserror::Error)]
pub enum ListingError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Authorization(#[from] AuthorizationError),
    #[error("listing {0} not found")]
    NotFound(ListingId),
    #[error("user {0} not found")]
    UserNotFound(UserId),
    #[error(transparent)]
    Precondition(#[from] ContactPrecondition),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
