use anyhow::{anyhow, Result};
use scraper::{Html, Selector};

/// Extracts the text of the first element matched by `css_selector`
/// inside the given element. Returns `None` when the selector is invalid
/// or nothing matches.
pub fn parse_value(element: &scraper::ElementRef, css_selector: &str) -> Option<String> {
    match Selector::parse(css_selector) {
        Ok(s) => element
            .select(&s)
            .next()
            .map(|v| v.text().collect::<String>()),
        Err(_) => None,
    }
}

/// A structure that represents the information needed to extract text from a
/// particular HTML element.
#[derive(Debug, Clone)]
pub struct GetOneElementText<'a> {
    /// Stock symbol, used to identify the quote in error messages.
    pub stock_symbol: &'a str,
    /// The URL the HTML content was fetched from.
    pub url: &'a str,
    /// CSS selector that locates the containing element.
    pub selector: &'a str,
    /// CSS selector for the inner element whose text is wanted.
    pub element: &'a str,
    pub document: Html,
}

/// Locates one element in a parsed document and returns its text.
///
/// # Errors
/// 當 selector 無法解析或頁面上找不到目標元素時回傳錯誤。
pub fn get_one_element(target: GetOneElementText<'_>) -> Result<String> {
    let selector = Selector::parse(target.selector)
        .map_err(|why| anyhow!("Failed to Selector::parse because: {:?}", why))?;
    target
        .document
        .select(&selector)
        .next()
        .and_then(|element| parse_value(&element, target.element))
        .ok_or_else(|| {
            anyhow!(
                "The element not found for {} from {}",
                target.stock_symbol,
                target.url
            )
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_one_element() {
        let html = r#"<div class="quote"><span class="px">34.50</span></div>"#;
        let target = GetOneElementText {
            stock_symbol: "PTT",
            url: "http://localhost/",
            selector: "div.quote",
            element: "span.px",
            document: Html::parse_document(html),
        };

        assert_eq!(get_one_element(target).unwrap(), "34.50");
    }
}
