//! Campaign data model and snapshot loading.
use super::chain::{CampaignField, ContractReader, FieldValue};
use super::progress::progress;
use anyhow::Result;
use chrono::{DateTime, Utc};
use num_bigint::BigUint;
use num_traits::ToPrimitive;
use serde::Serialize;
use std::fmt::Display;
use tracing::debug;

/// Lifecycle state reported by the campaign's `state()` getter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum CampaignState {
    Active,
    Successful,
    Failed,
    Unknown,
}

impl From<u64> for CampaignState {
    fn from(raw: u64) -> Self {
        match raw {
            0 => CampaignState::Active,
            1 => CampaignState::Successful,
            2 => CampaignState::Failed,
            _ => CampaignState::Unknown,
        }
    }
}

impl From<&BigUint> for CampaignState {
    fn from(raw: &BigUint) -> Self {
        raw.to_u64().map_or(CampaignState::Unknown, CampaignState::from)
    }
}

impl Display for CampaignState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                CampaignState::Active => "Active",
                CampaignState::Successful => "Successful",
                CampaignState::Failed => "Failed",
                CampaignState::Unknown => "Unknown",
            }
        )
    }
}

/// A funding level. `index` is the position in the latest tier list and
/// shifts when an earlier tier is removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tier {
    pub name: String,
    pub amount: BigUint,
    pub backers: BigUint,
    pub index: usize,
}

/// One entry of the factory's campaign registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CampaignSummary {
    pub address: String,
    pub owner: String,
    pub name: String,
}

/// Goal and balance read together; `None` while a read is pending.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FundingSnapshot {
    pub goal: Option<BigUint>,
    pub balance: Option<BigUint>,
}

impl FundingSnapshot {
    pub fn progress(&self) -> u8 {
        progress(self.goal.as_ref(), self.balance.as_ref())
    }
}

/// Everything shown for a single campaign. Each field is `None` until its
/// read resolves, which is different from an empty or zero value.
#[derive(Debug, Clone, Default)]
pub struct CampaignDetails {
    pub address: String,
    pub name: Option<String>,
    pub description: Option<String>,
    pub deadline: Option<DateTime<Utc>>,
    pub funding: FundingSnapshot,
    pub tiers: Option<Vec<Tier>>,
    pub owner: Option<String>,
    pub state: Option<CampaignState>,
}

impl CampaignDetails {
    pub fn has_deadline_passed(&self, now: DateTime<Utc>) -> Option<bool> {
        self.deadline.map(|deadline| deadline < now)
    }

    pub fn is_owned_by(&self, account: &str) -> bool {
        self.owner
            .as_deref()
            .is_some_and(|owner| owner.eq_ignore_ascii_case(account))
    }

    pub fn tier(&self, index: usize) -> Option<&Tier> {
        self.tiers.as_ref().and_then(|tiers| tiers.get(index))
    }
}

fn settle(field: CampaignField, result: Result<FieldValue>) -> Option<FieldValue> {
    match result {
        Ok(value) => Some(value),
        Err(e) => {
            debug!(%field, error = %e, "Read failed, leaving field pending");
            None
        }
    }
}

fn uint(field: CampaignField, result: Result<FieldValue>) -> Option<BigUint> {
    match settle(field, result)? {
        FieldValue::Uint(value) => Some(value),
        other => {
            debug!(%field, ?other, "Unexpected value type");
            None
        }
    }
}

fn text(field: CampaignField, result: Result<FieldValue>) -> Option<String> {
    match settle(field, result)? {
        FieldValue::Text(value) | FieldValue::Address(value) => Some(value),
        other => {
            debug!(%field, ?other, "Unexpected value type");
            None
        }
    }
}

/// Reads goal and balance of a campaign concurrently.
pub async fn load_funding(
    reader: &(dyn ContractReader + Send + Sync),
    address: &str,
) -> FundingSnapshot {
    let (goal, balance) = futures::join!(
        reader.read(address, CampaignField::Goal),
        reader.read(address, CampaignField::Balance),
    );
    FundingSnapshot {
        goal: uint(CampaignField::Goal, goal),
        balance: uint(CampaignField::Balance, balance),
    }
}

/// Reads every field of a campaign concurrently. Reads that fail are left
/// pending rather than failing the whole snapshot.
pub async fn load_campaign(
    reader: &(dyn ContractReader + Send + Sync),
    address: &str,
) -> CampaignDetails {
    let (name, description, deadline, funding, tiers, owner, state) = futures::join!(
        reader.read(address, CampaignField::Name),
        reader.read(address, CampaignField::Description),
        reader.read(address, CampaignField::Deadline),
        load_funding(reader, address),
        reader.read(address, CampaignField::Tiers),
        reader.read(address, CampaignField::Owner),
        reader.read(address, CampaignField::State),
    );

    let deadline = uint(CampaignField::Deadline, deadline)
        .and_then(|secs| secs.to_i64())
        .and_then(|secs| DateTime::from_timestamp(secs, 0));

    let tiers = match settle(CampaignField::Tiers, tiers) {
        Some(FieldValue::Tiers(tiers)) => Some(tiers),
        _ => None,
    };

    let state = match settle(CampaignField::State, state) {
        Some(FieldValue::State(state)) => Some(state),
        Some(FieldValue::Uint(raw)) => Some(CampaignState::from(&raw)),
        _ => None,
    };

    CampaignDetails {
        address: address.to_string(),
        name: text(CampaignField::Name, name),
        description: text(CampaignField::Description, description),
        deadline,
        funding,
        tiers,
        owner: text(CampaignField::Owner, owner),
        state,
    }
}
