use super::{price, ui};
use crate::core::campaign::load_funding;
use crate::core::config::PriceFeedConfig;
use crate::core::progress::fiat_value;
use crate::core::units::TOKEN_DECIMALS;
use crate::core::{CampaignSummary, ContractReader, FundingSnapshot, OraclePrice};
use anyhow::{Context, Result};
use comfy_table::Cell;
use futures::future::join_all;

struct CampaignRow {
    summary: CampaignSummary,
    funding: FundingSnapshot,
}

fn render_campaigns(rows: &[CampaignRow], price: &OraclePrice, currency: &str) -> String {
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("#"),
        ui::header_cell("Campaign"),
        ui::header_cell("Address"),
        ui::header_cell(&format!("Goal ({currency})")),
        ui::header_cell(&format!("Raised ({currency})")),
        ui::header_cell("Progress"),
    ]);

    for (i, row) in rows.iter().enumerate() {
        let funding = &row.funding;
        table.add_row(vec![
            Cell::new(i),
            Cell::new(&row.summary.name),
            Cell::new(&row.summary.address),
            ui::amount_cell(&fiat_value(funding.goal.as_ref(), TOKEN_DECIMALS, price)),
            ui::amount_cell(&fiat_value(funding.balance.as_ref(), TOKEN_DECIMALS, price)),
            ui::progress_cell(funding.progress()),
        ]);
    }

    format!(
        "{}\n\n{}",
        ui::style_text("Campaigns", ui::StyleType::Title),
        table
    )
}

pub async fn run(
    reader: &(dyn ContractReader + Send + Sync),
    factory: &str,
    feed: &PriceFeedConfig,
) -> Result<()> {
    let (campaigns, price) = futures::join!(
        reader.campaigns(factory),
        price::fetch_price(reader, feed)
    );
    let campaigns =
        campaigns.with_context(|| format!("Failed to list campaigns of factory {factory}"))?;

    if campaigns.is_empty() {
        println!("No campaigns found.");
        return Ok(());
    }

    let pb = ui::new_progress_bar(campaigns.len() as u64, true);
    pb.set_message("Reading campaigns...");

    let row_futures = campaigns.into_iter().map(|summary| {
        let pb_clone = pb.clone();
        async move {
            let funding = load_funding(reader, &summary.address).await;
            pb_clone.inc(1);
            CampaignRow { summary, funding }
        }
    });
    let rows = join_all(row_futures).await;
    pb.finish_and_clear();

    println!("{}", render_campaigns(&rows, &price, &feed.currency));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::chain::mock::{MockReader, round};
    use crate::core::{CampaignField, FieldValue};
    use console::strip_ansi_codes;
    use num_bigint::BigUint;

    fn summary(name: &str) -> CampaignSummary {
        CampaignSummary {
            address: "0x00000000000000000000000000000000000000c1".to_string(),
            owner: "0x00000000000000000000000000000000000000a1".to_string(),
            name: name.to_string(),
        }
    }

    #[test]
    fn test_render_campaigns() {
        let rows = vec![
            CampaignRow {
                summary: summary("Save the Whales"),
                funding: FundingSnapshot {
                    goal: Some(BigUint::from(10u8).pow(18)),
                    balance: Some(BigUint::from(10u8).pow(17) * 4u8),
                },
            },
            CampaignRow {
                summary: summary("Pending"),
                funding: FundingSnapshot::default(),
            },
        ];
        let output = render_campaigns(&rows, &OraclePrice::new(2000.0), "USD");
        let output = strip_ansi_codes(&output);

        assert!(output.contains("Goal (USD)"));
        assert!(output.contains("Save the Whales"));
        assert!(output.contains("$2,000.00"));
        assert!(output.contains("$800.00"));
        assert!(output.contains("40%"));
        assert!(output.contains("$...."));
        assert!(output.contains("0%"));
    }

    #[test]
    fn test_render_campaigns_without_price() {
        let rows = vec![CampaignRow {
            summary: summary("Save the Whales"),
            funding: FundingSnapshot {
                goal: Some(BigUint::from(1u8)),
                balance: Some(BigUint::from(1u8)),
            },
        }];
        let output = render_campaigns(&rows, &OraclePrice::loading(), "USD");
        let output = strip_ansi_codes(&output);
        assert!(output.contains("$...."));
        assert!(output.contains("100%"));
    }

    #[tokio::test]
    async fn test_run_lists_campaigns() {
        let reader = MockReader::new()
            .with_campaigns(vec![summary("Save the Whales")])
            .with_round(round(2000_00000000))
            .with(CampaignField::Goal, FieldValue::Uint(BigUint::from(100u8)))
            .with(CampaignField::Balance, FieldValue::Uint(BigUint::from(50u8)));

        run(&reader, "0xfactory", &PriceFeedConfig::default())
            .await
            .unwrap();
    }
}
