//! Shared response plumbing for the provider clients.

/// Non-2xx response collapsed to its status and body text.
pub(crate) struct ApiFailure {
    pub status: u16,
    pub body: String,
}

/// Ensure the response has a success status code. Returns the response
/// unchanged on success, or an [`ApiFailure`] containing the status and
/// body text on failure.
pub(crate) async fn ensure_success(
    response: reqwest::Response,
) -> Result<reqwest::Response, ApiFailure> {
    let status = response.status();
    if !status.is_success() {
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "<unreadable body>".to_string());
        return Err(ApiFailure {
            status: status.as_u16(),
            body,
        });
    }
    Ok(response)
}
