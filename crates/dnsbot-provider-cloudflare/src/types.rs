//! Cloudflare API v4 wire types

use dnsbot_core::ProviderError;
use serde::Deserialize;

/// Standard response envelope
///
/// Missing `Option` fields decode as `None`. `#[serde(default)]` must stay off
/// `result`: it adds a `T: Default` bound to the derived impl.
#[derive(Debug, Deserialize)]
pub(crate) struct CloudflareResponse<T> {
    pub success: bool,
    pub result: Option<T>,
    pub errors: Option<Vec<CloudflareError>>,
    pub result_info: Option<ResultInfo>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CloudflareError {
    pub code: i64,
    pub message: String,
}

/// Pagination block of list responses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub(crate) struct ResultInfo {
    #[serde(default)]
    pub total_pages: u32,
    #[serde(default)]
    pub total_count: u32,
}

/// `result` of a DELETE
#[derive(Debug, Deserialize)]
pub(crate) struct DeletedRecord {
    pub id: String,
}

impl<T> CloudflareResponse<T> {
    /// Unwrap the envelope into its result and pagination block
    ///
    /// Success requires `success == true` and a `result`. Failures carry the
    /// first reported error's message and code.
    pub(crate) fn into_page(self) -> Result<(T, Option<ResultInfo>), ProviderError> {
        if !self.success {
            let first = self.errors.and_then(|errors| errors.into_iter().next());
            return Err(match first {
                Some(error) => ProviderError::with_code(error.code, error.message),
                None => ProviderError::new("Unknown Cloudflare API error"),
            });
        }

        let result = self
            .result
            .ok_or_else(|| ProviderError::new("Cloudflare response is missing the result field"))?;
        Ok((result, self.result_info))
    }
}

/// Error for a non-2xx response whose body is not an envelope
pub(crate) fn status_error(status: u16, body: &str) -> ProviderError {
    let message = match status {
        401 | 403 => format!(
            "Authentication failed: invalid credentials or insufficient permissions (status {})",
            status
        ),
        404 => format!("Resource not found (status {})", status),
        429 => format!("Rate limit exceeded, retry later (status {})", status),
        500..=599 => format!("Cloudflare server error (status {}): {}", status, body),
        _ => format!("Request failed (status {}): {}", status, body),
    };
    ProviderError::new(message)
}

/// Decode a response body into `T` and the pagination block, if any
///
/// Cloudflare answers most failures with an envelope, so the body is parsed
/// first and the status only matters when that fails.
pub(crate) fn decode_page<T: for<'de> Deserialize<'de>>(
    status: u16,
    body: &str,
) -> Result<(T, Option<ResultInfo>), ProviderError> {
    match serde_json::from_str::<CloudflareResponse<T>>(body) {
        Ok(envelope) => envelope.into_page(),
        Err(_) if !(200..300).contains(&status) => Err(status_error(status, body)),
        Err(e) => Err(ProviderError::new(format!(
            "Failed to parse Cloudflare response: {}",
            e
        ))),
    }
}
