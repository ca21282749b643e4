use super::ui;
use crate::core::config::PriceFeedConfig;
use crate::core::oracle::{OraclePrice, RoundData, current_price};
use crate::core::progress::fiat_value;
use crate::core::units::TOKEN_DECIMALS;
use crate::core::ContractReader;
use anyhow::Result;
use num_bigint::BigUint;
use tracing::warn;

/// Latest round of the configured feed, or `None` when it cannot be read.
pub async fn fetch_round(
    reader: &(dyn ContractReader + Send + Sync),
    feed: &PriceFeedConfig,
) -> Option<RoundData> {
    match reader.latest_round(&feed.address).await {
        Ok(round) => Some(round),
        Err(e) => {
            warn!(feed = %feed.address, error = %e, "Could not read price feed");
            None
        }
    }
}

pub async fn fetch_price(
    reader: &(dyn ContractReader + Send + Sync),
    feed: &PriceFeedConfig,
) -> OraclePrice {
    current_price(fetch_round(reader, feed).await.as_ref())
}

fn render_price(round: Option<&RoundData>, currency: &str) -> String {
    let price = current_price(round);
    let one_token = BigUint::from(10u8).pow(TOKEN_DECIMALS);

    let mut output = format!(
        "{} {}",
        ui::style_text(&format!("1 ETH ({currency}):"), ui::StyleType::Label),
        ui::style_text(
            &fiat_value(&one_token, TOKEN_DECIMALS, &price),
            ui::StyleType::Value
        )
    );

    if let Some(updated) = round.and_then(RoundData::updated_at_utc) {
        output.push_str(&format!(
            "\n{}",
            ui::style_text(
                &format!("Updated {}", updated.format("%Y-%m-%d %H:%M:%S UTC")),
                ui::StyleType::Subtle
            )
        ));
    }
    if !price.is_loading && !price.is_available() {
        output.push_str(&format!(
            "\n{}",
            ui::style_text("Feed answer is not positive", ui::StyleType::Warning)
        ));
    }
    output
}

pub async fn run(reader: &(dyn ContractReader + Send + Sync), feed: &PriceFeedConfig) -> Result<()> {
    let round = fetch_round(reader, feed).await;
    println!("{}", render_price(round.as_ref(), &feed.currency));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::chain::mock::{MockReader, round};
    use console::strip_ansi_codes;

    #[tokio::test]
    async fn test_fetch_price() {
        let feed = PriceFeedConfig::default();
        let reader = MockReader::new().with_round(round(2_512_34600000));
        assert_eq!(fetch_price(&reader, &feed).await, OraclePrice::new(2512.346));

        let reader = MockReader::new();
        assert_eq!(fetch_price(&reader, &feed).await, OraclePrice::loading());
    }

    #[test]
    fn test_render_price() {
        let reading = round(2_512_34600000);
        let output = strip_ansi_codes(&render_price(Some(&reading), "USD")).to_string();
        assert!(output.contains("1 ETH (USD): $2,512.35"), "{output}");
        assert!(output.contains("Updated 2023-11-14 22:13:20 UTC"), "{output}");

        let output = strip_ansi_codes(&render_price(None, "USD")).to_string();
        assert!(output.contains("$...."), "{output}");
        assert!(!output.contains("Updated"));
    }

    #[test]
    fn test_render_negative_answer() {
        let reading = round(-1);
        let output = strip_ansi_codes(&render_price(Some(&reading), "USD")).to_string();
        assert!(output.contains("$...."), "{output}");
        assert!(output.contains("not positive"), "{output}");
    }
}
