//! Shared DTO types used across multiple endpoints.

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::Amount;
use crate::domain::amount::parse_amount;
use crate::error::GatewayError;

/// Pagination query parameters for list endpoints.
#[derive(Debug, Clone, Deserialize, IntoParams)]
pub struct PaginationParams {
    /// Page number (1-indexed). Defaults to 1.
    #[serde(default = "default_page")]
    pub page: u32,
    /// Items per page (max 100). Defaults to 20.
    #[serde(default = "default_per_page")]
    pub per_page: u32,
}

/// Pagination metadata included in list responses.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PaginationMeta {
    /// Current page number.
    pub page: u32,
    /// Items per page.
    pub per_page: u32,
    /// Total number of items.
    pub total: u32,
    /// Total number of pages.
    pub total_pages: u32,
}

fn default_page() -> u32 {
    1
}

fn default_per_page() -> u32 {
    20
}

impl PaginationParams {
    /// Clamps `per_page` to the allowed maximum of 100.
    #[must_use]
    pub fn clamped(&self) -> Self {
        Self {
            page: self.page.max(1),
            per_page: self.per_page.clamp(1, 100),
        }
    }

    /// Returns the requested page of `items` with its metadata.
    #[must_use]
    pub fn paginate<T>(&self, items: Vec<T>) -> (Vec<T>, PaginationMeta) {
        let params = self.clamped();
        let total = u32::try_from(items.len()).unwrap_or(u32::MAX);
        let total_pages = total.div_ceil(params.per_page);
        let start = (params.page.saturating_sub(1) as usize).saturating_mul(params.per_page as usize);

        let data = items
            .into_iter()
            .skip(start)
            .take(params.per_page as usize)
            .collect();
        let meta = PaginationMeta {
            page: params.page,
            per_page: params.per_page,
            total,
            total_pages,
        };
        (data, meta)
    }
}

/// Parses a string-encoded amount field, mapping failures to a 400.
///
/// # Errors
///
/// Returns [`GatewayError::InvalidRequest`] if `raw` is not a base-10 u128.
pub fn amount_field(field: &str, raw: &str) -> Result<Amount, GatewayError> {
    parse_amount(field, raw).map_err(GatewayError::InvalidRequest)
}
