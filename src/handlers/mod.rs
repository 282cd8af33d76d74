use axum::extract::FromRequest;

use crate::error::AppError;

pub mod admin;
pub mod auth;
pub mod dashboard;
pub mod driver;
pub mod mechanic;

/// JSON body extractor whose rejections use the service's error shape.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct AppJson<T>(pub T);
