//! UCP version negotiation.

use axum::extract::Request;
use axum::middleware::Next;
use axum::response::Response;
use domain::UCP_VERSION;
use session::agent_version;

use super::{UCP_AGENT, header_str};
use crate::error::ApiError;

/// Rejects callers announcing a UCP version newer than this server's.
///
/// Versions are `YYYY-MM-DD` dates and compare as strings. Requests without
/// a version attribute pass through.
pub async fn negotiate(request: Request, next: Next) -> Result<Response, ApiError> {
    let unsupported = header_str(request.headers(), UCP_AGENT)
        .and_then(agent_version)
        .filter(|version| *version > UCP_VERSION)
        .map(str::to_string);

    if let Some(version) = unsupported {
        metrics::counter!("ucp_version_rejected_total").increment(1);
        return Err(ApiError::BadRequest(format!(
            "Unsupported UCP version: {version}"
        )));
    }

    Ok(next.run(request).await)
}
