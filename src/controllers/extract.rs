//! `Json` and `Path` extractors whose rejections use the API error envelope.

use axum::extract::{FromRequest, FromRequestParts};

use crate::controllers::error::ApiError;

#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(ApiError))]
pub struct ApiPath<T>(pub T);
