use axum::extract::FromRequestParts;

use crate::errors::AppError;

pub(crate) mod analysis;
pub(crate) mod health;
pub(crate) mod prices;

/// `Query` whose rejection is reported as an `AppError::Validation` JSON body.
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(AppError))]
pub struct ApiQuery<T>(pub T);
