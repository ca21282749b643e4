//! Contract read and transaction submission abstractions

use super::campaign::{CampaignState, CampaignSummary, Tier};
use super::oracle::RoundData;
use super::transaction::TransactionRequest;
use anyhow::Result;
use async_trait::async_trait;
use num_bigint::BigUint;
use serde::Serialize;
use std::fmt::Display;

/// A readable field of a campaign contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CampaignField {
    Name,
    Description,
    Deadline,
    Goal,
    Balance,
    Tiers,
    Owner,
    State,
}

impl CampaignField {
    /// Fields that never change once the campaign is deployed.
    pub fn is_immutable(&self) -> bool {
        matches!(
            self,
            CampaignField::Name
                | CampaignField::Description
                | CampaignField::Deadline
                | CampaignField::Goal
                | CampaignField::Owner
        )
    }
}

impl Display for CampaignField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                CampaignField::Name => "name",
                CampaignField::Description => "description",
                CampaignField::Deadline => "deadline",
                CampaignField::Goal => "goal",
                CampaignField::Balance => "balance",
                CampaignField::Tiers => "tiers",
                CampaignField::Owner => "owner",
                CampaignField::State => "state",
            }
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    Uint(BigUint),
    Address(String),
    State(CampaignState),
    Tiers(Vec<Tier>),
}

#[async_trait]
pub trait ContractReader: Send + Sync {
    async fn read(&self, contract: &str, field: CampaignField) -> Result<FieldValue>;

    async fn latest_round(&self, feed: &str) -> Result<RoundData>;

    async fn campaigns(&self, factory: &str) -> Result<Vec<CampaignSummary>>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SubmissionOutcome {
    Confirmed {
        tx_hash: String,
    },
    Rejected {
        tx_hash: Option<String>,
        reason: String,
    },
}

/// Hands a composed request to the chain.
///
/// `Err` is reserved for failing to reach the chain at all. Anything the node
/// or the contract refuses comes back as [`SubmissionOutcome::Rejected`].
#[async_trait]
pub trait TransactionSubmitter: Send + Sync {
    async fn submit(&self, contract: &str, request: &TransactionRequest)
    -> Result<SubmissionOutcome>;
}

#[cfg(test)]
pub(crate) mod mock {
    //! In-memory reader and submitter for command and loader tests.

    use super::*;
    use anyhow::anyhow;
    use std::collections::HashMap;
    use std::sync::Mutex;

    #[derive(Default)]
    pub struct MockReader {
        fields: HashMap<CampaignField, FieldValue>,
        round: Option<RoundData>,
        campaigns: Vec<CampaignSummary>,
    }

    impl MockReader {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with(mut self, field: CampaignField, value: FieldValue) -> Self {
            self.fields.insert(field, value);
            self
        }

        pub fn with_round(mut self, round: RoundData) -> Self {
            self.round = Some(round);
            self
        }

        pub fn with_campaigns(mut self, campaigns: Vec<CampaignSummary>) -> Self {
            self.campaigns = campaigns;
            self
        }
    }

    #[async_trait]
    impl ContractReader for MockReader {
        async fn read(&self, _contract: &str, field: CampaignField) -> Result<FieldValue> {
            self.fields
                .get(&field)
                .cloned()
                .ok_or_else(|| anyhow!("execution reverted"))
        }

        async fn latest_round(&self, _feed: &str) -> Result<RoundData> {
            self.round.clone().ok_or_else(|| anyhow!("no feed"))
        }

        async fn campaigns(&self, _factory: &str) -> Result<Vec<CampaignSummary>> {
            Ok(self.campaigns.clone())
        }
    }

    /// A round whose answer carries 8 decimals, e.g. `round(2_000_00000000)`.
    pub fn round(answer: i64) -> RoundData {
        RoundData {
            round_id: BigUint::from(1u8),
            answer: answer.into(),
            started_at: BigUint::from(1_700_000_000u32),
            updated_at: BigUint::from(1_700_000_000u32),
            answered_in_round: BigUint::from(1u8),
        }
    }

    pub struct RecordingSubmitter {
        outcome: SubmissionOutcome,
        submitted: Mutex<Vec<(String, TransactionRequest)>>,
    }

    impl RecordingSubmitter {
        pub fn confirming() -> Self {
            Self::answering(SubmissionOutcome::Confirmed {
                tx_hash: "0xfeed".to_string(),
            })
        }

        pub fn rejecting(reason: &str) -> Self {
            Self::answering(SubmissionOutcome::Rejected {
                tx_hash: None,
                reason: reason.to_string(),
            })
        }

        fn answering(outcome: SubmissionOutcome) -> Self {
            RecordingSubmitter {
                outcome,
                submitted: Mutex::new(Vec::new()),
            }
        }

        pub fn submitted(&self) -> Vec<(String, TransactionRequest)> {
            self.submitted.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl TransactionSubmitter for RecordingSubmitter {
        async fn submit(
            &self,
            contract: &str,
            request: &TransactionRequest,
        ) -> Result<SubmissionOutcome> {
            self.submitted
                .lock()
                .unwrap()
                .push((contract.to_string(), request.clone()));
            Ok(self.outcome.clone())
        }
    }
}
