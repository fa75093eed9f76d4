//! Request extractors whose rejections use the structured error body.
//!
//! Axum's own `Json`, `Path` and `Query` reject malformed input with a
//! plain-text body (and `422` for JSON that does not match the DTO). These
//! wrappers route every rejection through [`GatewayError::InvalidRequest`]
//! so the caller always gets a `400` with the usual error envelope.

use axum::extract::{FromRequest, FromRequestParts};

use crate::error::GatewayError;

/// JSON body extractor rejecting with [`GatewayError::InvalidRequest`].
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(GatewayError))]
pub struct ApiJson<T>(pub T);

/// Path parameter extractor rejecting with [`GatewayError::InvalidRequest`].
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(GatewayError))]
pub struct ApiPath<T>(pub T);

/// Query string extractor rejecting with [`GatewayError::InvalidRequest`].
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(GatewayError))]
pub struct ApiQuery<T>(pub T);
