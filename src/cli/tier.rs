//! Tier write commands: add, remove and fund.

use super::{price, ui};
use crate::core::abi::to_hex;
use crate::core::config::PriceFeedConfig;
use crate::core::progress::fiat_value;
use crate::core::transaction::{compose_add_tier, compose_fund_tier, compose_remove_tier};
use crate::core::units::{TOKEN_DECIMALS, to_decimal};
use crate::core::{
    CampaignField, ContractReader, FieldValue, SubmissionOutcome, TransactionRequest,
    TransactionSubmitter,
};
use anyhow::{Context, Result, bail};
use num_traits::Zero;
use serde::Serialize;
use tracing::{info, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TierAction {
    Add { name: String, amount: String },
    Remove { index: usize },
    Fund { index: usize },
}

/// What `--dry-run` prints.
#[derive(Serialize)]
struct PreparedCall<'a> {
    to: &'a str,
    #[serde(flatten)]
    request: &'a TransactionRequest,
    calldata: String,
}

/// Reads what the action needs from the chain and composes the call.
pub async fn prepare(
    reader: &(dyn ContractReader + Send + Sync),
    campaign: &str,
    action: &TierAction,
    feed: &PriceFeedConfig,
) -> Result<TransactionRequest> {
    match action {
        TierAction::Add { name, amount } => {
            let price = price::fetch_price(reader, feed).await;
            Ok(compose_add_tier(name, amount, &price)?)
        }
        TierAction::Remove { index } => Ok(compose_remove_tier(*index)),
        TierAction::Fund { index } => {
            let tiers = match reader
                .read(campaign, CampaignField::Tiers)
                .await
                .with_context(|| format!("Failed to read tiers of {campaign}"))?
            {
                FieldValue::Tiers(tiers) => tiers,
                other => bail!("Unexpected tiers value: {other:?}"),
            };
            let Some(tier) = tiers.get(*index) else {
                bail!(
                    "Tier {} does not exist; the campaign has {} tiers",
                    index,
                    tiers.len()
                );
            };
            info!(tier = %tier.name, amount = %tier.amount, "Funding tier");
            Ok(compose_fund_tier(*index, &tier.amount))
        }
    }
}

async fn warn_unless_owner(
    reader: &(dyn ContractReader + Send + Sync),
    campaign: &str,
    account: Option<&str>,
) {
    let Some(account) = account else {
        return;
    };
    match reader.read(campaign, CampaignField::Owner).await {
        Ok(FieldValue::Address(owner)) if !owner.eq_ignore_ascii_case(account) => {
            warn!(%owner, %account, "Account is not the campaign owner; the contract will likely reject this call");
        }
        Ok(_) => {}
        Err(e) => warn!(error = %e, "Could not read campaign owner"),
    }
}

fn render_outcome(outcome: &SubmissionOutcome) -> String {
    match outcome {
        SubmissionOutcome::Confirmed { tx_hash } => format!(
            "{} {tx_hash}",
            ui::style_text("Transaction confirmed:", ui::StyleType::Value)
        ),
        SubmissionOutcome::Rejected { tx_hash, reason } => {
            let mut text = format!(
                "{} {reason}",
                ui::style_text("Transaction rejected:", ui::StyleType::Error)
            );
            if let Some(tx_hash) = tx_hash {
                text.push_str(&format!(" ({tx_hash})"));
            }
            text
        }
    }
}

pub async fn run(
    reader: &(dyn ContractReader + Send + Sync),
    submitter: &(dyn TransactionSubmitter + Send + Sync),
    campaign: &str,
    action: &TierAction,
    feed: &PriceFeedConfig,
    account: Option<&str>,
    dry_run: bool,
) -> Result<()> {
    let request = prepare(reader, campaign, action, feed).await?;

    if request.method.is_owner_only() {
        warn_unless_owner(reader, campaign, account).await;
    }
    if !request.value.is_zero() {
        let price = price::fetch_price(reader, feed).await;
        eprintln!(
            "Sending {} ETH ({} {})",
            to_decimal(&request.value, TOKEN_DECIMALS),
            fiat_value(&request.value, TOKEN_DECIMALS, &price),
            feed.currency
        );
    }

    if dry_run {
        let prepared = PreparedCall {
            to: campaign,
            request: &request,
            calldata: to_hex(&request.calldata()?),
        };
        println!("{}", serde_json::to_string_pretty(&prepared)?);
        return Ok(());
    }

    let outcome = submitter.submit(campaign, &request).await?;
    println!("{}", render_outcome(&outcome));
    match outcome {
        SubmissionOutcome::Confirmed { .. } => Ok(()),
        SubmissionOutcome::Rejected { reason, .. } => bail!("Transaction rejected: {reason}"),
    }
}
