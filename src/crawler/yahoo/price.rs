use anyhow::{anyhow, Result};
use async_trait::async_trait;

use crate::{
    crawler::{
        yahoo::{chart, to_provider_symbol, Yahoo},
        StockInfo,
    },
    declare,
};

#[async_trait]
impl StockInfo for Yahoo {
    async fn get_stock_price(stock_symbol: &str) -> Result<f64> {
        let quotes = Self::get_stock_quotes(stock_symbol).await?;
        Ok(quotes.price)
    }

    async fn get_stock_quotes(stock_symbol: &str) -> Result<declare::StockQuotes> {
        let provider_symbol = to_provider_symbol(stock_symbol);
        let query = format!("{}?range=1d&interval=5m", provider_symbol);
        let result = chart::visit_chart_api(&query).await?;

        let price = result
            .meta
            .regular_market_price
            .ok_or_else(|| anyhow!("No market price for {}", stock_symbol))?;
        let previous_close = result.meta.chart_previous_close.unwrap_or(0.0);

        let change = if previous_close > 0.0 {
            price - previous_close
        } else {
            0.0
        };
        let change_percent = if previous_close > 0.0 {
            change / previous_close * 100.0
        } else {
            0.0
        };

        Ok(declare::StockQuotes {
            stock_symbol: stock_symbol.to_string(),
            price,
            change,
            change_percent,
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::logging;

    use super::*;

    #[tokio::test]
    #[ignore]
    async fn test_get_stock_quotes() {
        dotenv::dotenv().ok();
        logging::debug_file_async("開始 get_stock_quotes".to_string());

        match Yahoo::get_stock_quotes("PTT").await {
            Ok(e) => {
                dbg!(&e);
                logging::debug_file_async(format!("get_stock_quotes : {:#?}", e));
            }
            Err(why) => {
                logging::debug_file_async(format!("Failed to get_stock_quotes because {:?}", why));
            }
        }

        logging::debug_file_async("結束 get_stock_quotes".to_string());
    }
}
