//! Request extractors shared by the handlers.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::domain::AccountId;
use crate::error::GatewayError;

/// Header carrying the acting identity.
pub const CALLER_HEADER: &str = "x-caller";

/// The identity a request acts as, taken from the `X-Caller` header.
///
/// Authentication happens upstream; the ledger only checks that the named
/// identity holds the role an operation requires.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller(pub AccountId);

impl<S> FromRequestParts<S> for Caller
where
    S: Send + Sync,
{
    type Rejection = GatewayError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let raw = parts
            .headers
            .get(CALLER_HEADER)
            .ok_or_else(|| GatewayError::InvalidRequest("missing X-Caller header".to_string()))?
            .to_str()
            .map_err(|_| GatewayError::InvalidRequest("X-Caller header is not ASCII".to_string()))?;

        AccountId::new(raw)
            .map(Caller)
            .map_err(|err| GatewayError::InvalidRequest(format!("X-Caller header: {err}")))
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use axum::http::Request;

    use super::*;

    async fn extract(request: Request<()>) -> Result<Caller, GatewayError> {
        let (mut parts, ()) = request.into_parts();
        Caller::from_request_parts(&mut parts, &()).await
    }

    #[tokio::test]
    async fn reads_and_normalizes_header() {
        let Ok(request) = Request::builder().header("X-Caller", "0xABC").body(()) else {
            panic!("valid request");
        };
        let Ok(Caller(caller)) = extract(request).await else {
            panic!("header present");
        };
        assert_eq!(caller.as_str(), "0xabc");
    }

    #[tokio::test]
    async fn missing_header_is_invalid_request() {
        let Ok(request) = Request::builder().body(()) else {
            panic!("valid request");
        };
        assert!(matches!(
            extract(request).await,
            Err(GatewayError::InvalidRequest(_))
        ));
    }

    #[tokio::test]
    async fn blank_header_is_invalid_request() {
        let Ok(request) = Request::builder().header("X-Caller", "  ").body(()) else {
            panic!("valid request");
        };
        assert!(matches!(
            extract(request).await,
            Err(GatewayError::InvalidRequest(_))
        ));
    }

    #[tokio::test]
    async fn custody_identity_cannot_be_claimed() {
        let Ok(request) = Request::builder()
            .header("X-Caller", "Pool:00000000-0000-0000-0000-000000000000")
            .body(())
        else {
            panic!("valid request");
        };
        let Err(GatewayError::InvalidRequest(message)) = extract(request).await else {
            panic!("reserved identity must be rejected");
        };
        assert!(message.contains("reserved for pool custody"));
    }
}
