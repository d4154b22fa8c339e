use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

/// Company the request acts on, from `X-Company-Id`.
pub struct CompanyId(pub String);

/// Requesting user, from `X-User-Id`. Authentication happens upstream.
pub struct UserId(pub String);

#[derive(Debug)]
pub struct HeaderRejection(String);

impl IntoResponse for HeaderRejection {
    fn into_response(self) -> Response {
        let body = serde_json::json!({ "error": self.0 });
        (StatusCode::BAD_REQUEST, axum::Json(body)).into_response()
    }
}

fn required_header(parts: &Parts, name: &str) -> Result<String, HeaderRejection> {
    let header = parts
        .headers
        .get(name)
        .ok_or_else(|| HeaderRejection(format!("missing {name} header")))?;

    let value = header
        .to_str()
        .map_err(|_| HeaderRejection(format!("invalid {name} header value")))?
        .trim();

    if value.is_empty() {
        return Err(HeaderRejection(format!("empty {name} header")));
    }
    Ok(value.to_string())
}

impl<S: Send + Sync> FromRequestParts<S> for CompanyId {
    type Rejection = HeaderRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        required_header(parts, "X-Company-Id").map(CompanyId)
    }
}

impl<S: Send + Sync> FromRequestParts<S> for UserId {
    type Rejection = HeaderRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        required_header(parts, "X-User-Id").map(UserId)
    }
}
