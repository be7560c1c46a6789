//! Data models for Callsight.

mod analysis;
mod call;
mod merchant;

pub use analysis::{AnalysisRow, BaseAnalysisResult, IssueAnalysisResult, OrganizationMetadata};
pub use call::Call;
pub use merchant::{Merchant, MerchantPerson, MerchantTicket};
