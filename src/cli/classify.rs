//! Classify command implementation

use crate::config::Config;
use crate::feed::{Announcement, RawAnnouncement};
use crate::signal::create_classifier;
use crate::storage::InMemoryStore;
use crate::strategy::{FixedPriceOracle, StrategyAnalyzer};
use chrono::Utc;
use clap::Args;
use std::sync::Arc;

#[derive(Args, Debug)]
pub struct ClassifyArgs {
    /// Announcement title
    #[arg(long)]
    pub title: String,

    /// Company name as listed on the exchange
    #[arg(long)]
    pub company: String,

    /// Announcement category
    #[arg(long, default_value = "")]
    pub category: String,
}

impl ClassifyArgs {
    /// Extraction result and trade decision as pretty JSON
    pub async fn render(&self, config: &Config) -> anyhow::Result<String> {
        let now = Utc::now();
        let raw = RawAnnouncement {
            date: now.format("%d-%m-%Y").to_string(),
            time: now.format("%H:%M:%S").to_string(),
            company_name: self.company.clone(),
            title: self.title.clone(),
            category: self.category.clone(),
            pdf_url: None,
        };
        let announcement = Announcement::from_raw(raw, now)
            .ok_or_else(|| anyhow::anyhow!("Title and company must not be blank"))?;

        let signal = create_classifier(&config.extractor).classify(&announcement);
        let analyzer = StrategyAnalyzer::new(
            config.strategy.clone(),
            &config.risk,
            Arc::new(InMemoryStore::new()),
            Arc::new(FixedPriceOracle::new(config.strategy.default_entry_price)),
        );
        let trade = if signal.is_tradeable {
            Some(analyzer.analyze(&signal).await)
        } else {
            None
        };

        let output = serde_json::json!({
            "signal": signal,
            "trade": trade,
        });
        Ok(serde_json::to_string_pretty(&output)?)
    }

    pub async fn execute(&self, config: &Config) -> anyhow::Result<()> {
        println!("{}", self.render(config).await?);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_render_tradeable() {
        let args = ClassifyArgs {
            title: "Company XYZ Secures Contract worth Rs. 120 crore".to_string(),
            company: "XYZ Limited".to_string(),
            category: String::new(),
        };
        let output = args.render(&Config::default()).await.unwrap();
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();

        assert_eq!(value["signal"]["is_tradeable"], true);
        assert_eq!(value["signal"]["symbol"], "XYZ");
        assert_eq!(value["trade"]["should_trade"], true);
        assert_eq!(value["trade"]["position_size"], 500);
    }

    #[tokio::test]
    async fn test_render_blank_rejected() {
        let args = ClassifyArgs {
            title: "  ".to_string(),
            company: "XYZ".to_string(),
            category: String::new(),
        };
        assert!(args.render(&Config::default()).await.is_err());
    }
}
