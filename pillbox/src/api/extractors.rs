use axum::extract::rejection::QueryRejection;
use axum::extract::FromRequestParts;

use crate::error::PillboxError;

/// `Query` whose rejections render through the API envelope as
/// `400 invalid_request`.
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(PillboxError))]
pub struct AppQuery<T>(pub T);

impl From<QueryRejection> for PillboxError {
    fn from(rejection: QueryRejection) -> Self {
        match rejection {
            QueryRejection::FailedToDeserializeQueryString(err) => {
                PillboxError::Validation(format!("Invalid query string: {}", err.body_text()))
            }
            _ => PillboxError::Validation(rejection.body_text()),
        }
    }
}
