//! Core business logic abstractions

pub mod abi;
pub mod cache;
pub mod campaign;
pub mod chain;
pub mod config;
pub mod log;
pub mod oracle;
pub mod progress;
pub mod transaction;
pub mod units;

// Re-export main types for cleaner imports
pub use campaign::{CampaignDetails, CampaignState, CampaignSummary, FundingSnapshot, Tier};
pub use chain::{CampaignField, ContractReader, FieldValue, SubmissionOutcome, TransactionSubmitter};
pub use oracle::{OraclePrice, RoundData};
pub use transaction::{TierMethod, TransactionRequest, ValidationError};
