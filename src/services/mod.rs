//! Service layer: read-transform logic between the HTTP handlers and
//! the repositories.

pub mod analysis;
pub mod merchant;
pub mod search_api;

pub use analysis::{AnalysisPage, AnalysisResultDto, AnalysisService};
pub use merchant::{
    normalize_phone, validate_batch_ids, MerchantCompleteDto, MerchantRequestError,
    MerchantService, MAX_BATCH_SIZE,
};
pub use search_api::{SearchApiClient, SearchApiError};
