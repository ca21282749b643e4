pub mod cli;
pub mod core;
pub mod providers;

use crate::cli::tier::TierAction;
use crate::core::abi::is_address;
use crate::core::cache::Cache;
use crate::core::config::AppConfig;
use crate::providers::RpcClient;
use anyhow::{Result, ensure};
use std::sync::Arc;
use tracing::{debug, info};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppCommand {
    Price,
    Campaigns,
    Show {
        campaign: String,
    },
    Tier {
        campaign: String,
        action: TierAction,
        dry_run: bool,
    },
}

impl AppCommand {
    fn campaign(&self) -> Option<&str> {
        match self {
            AppCommand::Show { campaign } | AppCommand::Tier { campaign, .. } => {
                Some(campaign.as_str())
            }
            AppCommand::Price | AppCommand::Campaigns => None,
        }
    }
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    info!("cfund starting...");

    if let Some(campaign) = command.campaign() {
        ensure!(is_address(campaign), "Invalid campaign address: '{campaign}'");
    }

    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");

    let cache = Arc::new(Cache::new());
    let rpc = RpcClient::new(&config.chain, cache)?
        .with_sender(config.account.clone(), config.confirmation.clone());

    match command {
        AppCommand::Price => cli::price::run(&rpc, &config.price_feed).await,
        AppCommand::Campaigns => {
            cli::campaigns::run(&rpc, &config.factory, &config.price_feed).await
        }
        AppCommand::Show { campaign } => {
            cli::campaign::run(&rpc, &campaign, &config.price_feed).await
        }
        AppCommand::Tier {
            campaign,
            action,
            dry_run,
        } => {
            let account = if dry_run {
                config.account.as_deref()
            } else {
                Some(config.require_account()?)
            };
            cli::tier::run(
                &rpc,
                &rpc,
                &campaign,
                &action,
                &config.price_feed,
                account,
                dry_run,
            )
            .await
        }
    }
}
