use super::{price, ui};
use crate::core::campaign::load_campaign;
use crate::core::config::PriceFeedConfig;
use crate::core::progress::fiat_value;
use crate::core::units::{TOKEN_DECIMALS, to_decimal};
use crate::core::{CampaignDetails, CampaignState, ContractReader, OraclePrice};
use anyhow::Result;
use chrono::{DateTime, Utc};
use comfy_table::Cell;
use tracing::warn;

const BAR_WIDTH: usize = 30;

fn state_text(state: Option<CampaignState>) -> String {
    match state {
        Some(CampaignState::Active) => ui::style_text("Active", ui::StyleType::Value),
        Some(CampaignState::Successful) => ui::style_text("Successful", ui::StyleType::Value),
        Some(CampaignState::Failed) => ui::style_text("Failed", ui::StyleType::Error),
        Some(CampaignState::Unknown) => ui::style_text("Unknown", ui::StyleType::Warning),
        None => ui::PENDING.to_string(),
    }
}

fn deadline_text(deadline: Option<DateTime<Utc>>, now: DateTime<Utc>) -> String {
    match deadline {
        Some(deadline) => {
            let date = deadline.format("%Y-%m-%d %H:%M UTC").to_string();
            if deadline < now {
                format!("{date} {}", ui::style_text("(ended)", ui::StyleType::Subtle))
            } else {
                date
            }
        }
        None => ui::PENDING.to_string(),
    }
}

impl CampaignDetails {
    pub fn display_as_table(&self, price: &OraclePrice, currency: &str, now: DateTime<Utc>) -> String {
        let title = self.name.as_deref().unwrap_or(&self.address);
        let mut output = format!(
            "Campaign: {}\n",
            ui::style_text(title, ui::StyleType::Title)
        );

        if let Some(description) = self.description.as_deref().filter(|d| !d.is_empty()) {
            output.push_str(&format!("{description}\n"));
        }
        output.push('\n');

        let field = |label: &str, value: &str| {
            format!(
                "{:<10} {value}\n",
                ui::style_text(&format!("{label}:"), ui::StyleType::Label)
            )
        };
        output.push_str(&field("Address", &self.address));
        output.push_str(&field(
            "Owner",
            self.owner.as_deref().unwrap_or(ui::PENDING),
        ));
        output.push_str(&field("State", &state_text(self.state)));
        output.push_str(&field("Deadline", &deadline_text(self.deadline, now)));

        let funding = &self.funding;
        output.push_str(&field(
            "Raised",
            &format!(
                "{} of {} ({})",
                fiat_value(funding.balance.as_ref(), TOKEN_DECIMALS, price),
                fiat_value(funding.goal.as_ref(), TOKEN_DECIMALS, price),
                currency
            ),
        ));
        output.push_str(&field(
            "Progress",
            &ui::progress_bar(funding.progress(), BAR_WIDTH),
        ));

        output.push('\n');
        match &self.tiers {
            None => output.push_str(&format!("Tiers: {}", ui::PENDING)),
            Some(tiers) if tiers.is_empty() => {
                output.push_str(&ui::style_text("No tiers yet.", ui::StyleType::Subtle))
            }
            Some(tiers) => {
                let mut table = ui::new_styled_table();
                table.set_header(vec![
                    ui::header_cell("Index"),
                    ui::header_cell("Tier"),
                    ui::header_cell(&format!("Amount ({currency})")),
                    ui::header_cell("Amount (ETH)"),
                    ui::header_cell("Backers"),
                ]);
                for tier in tiers {
                    table.add_row(vec![
                        Cell::new(tier.index),
                        Cell::new(&tier.name),
                        ui::amount_cell(&fiat_value(&tier.amount, TOKEN_DECIMALS, price)),
                        ui::amount_cell(&to_decimal(&tier.amount, TOKEN_DECIMALS)),
                        ui::amount_cell(&tier.backers.to_string()),
                    ]);
                }
                output.push_str(&table.to_string());
            }
        }

        output
    }
}

pub async fn run(
    reader: &(dyn ContractReader + Send + Sync),
    address: &str,
    feed: &PriceFeedConfig,
) -> Result<()> {
    let (details, price) = futures::join!(
        load_campaign(reader, address),
        price::fetch_price(reader, feed)
    );

    if details.name.is_none() && details.funding.goal.is_none() {
        warn!(%address, "Nothing could be read from this address; is it a campaign contract?");
    }

    println!("{}", details.display_as_table(&price, &feed.currency, Utc::now()));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{FundingSnapshot, Tier};
    use chrono::TimeZone;
    use console::strip_ansi_codes;
    use num_bigint::BigUint;

    fn eth(tenths: u32) -> BigUint {
        BigUint::from(tenths) * BigUint::from(10u8).pow(17)
    }

    fn details() -> CampaignDetails {
        CampaignDetails {
            address: "0x00000000000000000000000000000000000000c1".to_string(),
            name: Some("Save the Whales".to_string()),
            description: Some("Boats and buoys".to_string()),
            deadline: Some(Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap()),
            funding: FundingSnapshot {
                goal: Some(eth(10)),
                balance: Some(eth(5)),
            },
            tiers: Some(vec![
                Tier {
                    name: "Bronze".to_string(),
                    amount: eth(1),
                    backers: BigUint::from(3u8),
                    index: 0,
                },
                Tier {
                    name: "Gold".to_string(),
                    amount: eth(4),
                    backers: BigUint::from(1u8),
                    index: 1,
                },
            ]),
            owner: Some("0x00000000000000000000000000000000000000a1".to_string()),
            state: Some(CampaignState::Active),
        }
    }

    #[test]
    fn test_display_campaign() {
        let now = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        let output = details().display_as_table(&OraclePrice::new(2000.0), "USD", now);
        let output = strip_ansi_codes(&output);

        assert!(output.contains("Campaign: Save the Whales"));
        assert!(output.contains("Boats and buoys"));
        assert!(output.contains("Active"));
        assert!(output.contains("2025-03-01 12:00 UTC"));
        assert!(!output.contains("(ended)"));
        assert!(output.contains("$1,000.00 of $2,000.00 (USD)"));
        assert!(output.contains("[###############---------------] 50%"));
        assert!(output.contains("Bronze"));
        assert!(output.contains("$200.00"));
        assert!(output.contains("$800.00"));
        assert!(output.contains("0.4"));
    }

    #[test]
    fn test_display_pending_campaign() {
        let pending = CampaignDetails {
            address: "0x00000000000000000000000000000000000000c1".to_string(),
            ..Default::default()
        };
        let now = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        let output = pending.display_as_table(&OraclePrice::loading(), "USD", now);
        let output = strip_ansi_codes(&output);

        assert!(output.contains("Campaign: 0x00000000000000000000000000000000000000c1"));
        assert!(output.contains("$.... of $.... (USD)"));
        assert!(output.contains("[------------------------------] 0%"));
        assert!(output.contains("Tiers: ..."));
    }

    #[test]
    fn test_display_ended_campaign() {
        let now = Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap();
        let mut campaign = details();
        campaign.tiers = Some(Vec::new());
        campaign.state = Some(CampaignState::Failed);
        let output = campaign.display_as_table(&OraclePrice::new(2000.0), "USD", now);
        let output = strip_ansi_codes(&output);

        assert!(output.contains("(ended)"));
        assert!(output.contains("Failed"));
        assert!(output.contains("No tiers yet."));
    }
}
