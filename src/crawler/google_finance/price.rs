use anyhow::Result;
use async_trait::async_trait;
use scraper::Html;

use crate::{
    crawler::{
        google_finance::{GoogleFinance, HOST},
        StockInfo,
    },
    declare,
    util::{self, text},
};

#[async_trait]
impl StockInfo for GoogleFinance {
    async fn get_stock_price(stock_symbol: &str) -> Result<f64> {
        let quotes = Self::get_stock_quotes(stock_symbol).await?;
        Ok(quotes.price)
    }

    async fn get_stock_quotes(stock_symbol: &str) -> Result<declare::StockQuotes> {
        let url = &format!(
            "https://{host}/finance/quote/{symbol}:BKK",
            host = HOST,
            symbol = stock_symbol
        );
        let response = util::http::get(url, None).await?;
        let document = Html::parse_document(&response);

        let price = util::http::element::get_one_element(util::http::element::GetOneElementText {
            stock_symbol,
            document: document.clone(),
            selector: "main",
            element: r"div.YMlKec.fxKbKc",
            url,
        })?;
        let price = text::parse_f64(&price, None)?;

        // 跌的時候 class 帶 JNg9vd，漲的時候帶 HGwYTc
        let is_negative = util::http::element::get_one_element(
            util::http::element::GetOneElementText {
                stock_symbol,
                document: document.clone(),
                selector: "main",
                element: r"span.P2Luy.Ez2Ioe.JNg9vd",
                url,
            },
        )
        .is_ok();

        let change = util::http::element::get_one_element(util::http::element::GetOneElementText {
            stock_symbol,
            document: document.clone(),
            selector: "main",
            element: r"span.P2Luy.Ez2Ioe",
            url,
        });

        let mut change = match change {
            Ok(c) => text::parse_f64(&c, Some(vec!['+', '−'])).unwrap_or(0.0),
            Err(_) => 0.0,
        };

        if is_negative {
            change = -change.abs();
        }

        let previous_close = price - change;
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

        match GoogleFinance::get_stock_quotes("PTT").await {
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
