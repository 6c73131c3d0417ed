//! Applying locators to a fetched document.
//!
//! Everything here is synchronous: neither parsed form of the page is `Send`,
//! so a [`PageDocument`] must never be held across an await.

use scraper::{ElementRef, Html, Selector};
use tracing::{debug, warn};

use crate::error::{ExtractionError, LocatorError, LocatorResult, Result};
use crate::locator::XPathDocument;
use crate::traits::fetcher::FetchedPage;
use crate::types::locator::{ExtractionResults, Locator, LocatorKind};

/// A page parsed for CSS selection and, when needed, for XPath evaluation.
pub struct PageDocument {
    html: Html,
    xpath: Option<XPathDocument>,
}

impl PageDocument {
    /// Parse `body`. The XPath form is only built when a locator needs it.
    pub fn parse(body: &str, locators: &[Locator]) -> Self {
        let needs_xpath = locators.iter().any(|l| l.kind == LocatorKind::Xpath);
        let xpath = if needs_xpath {
            XPathDocument::parse(body)
                .map_err(|e| warn!(error = %e, "XPath locators will yield no results"))
                .ok()
        } else {
            None
        };

        Self {
            html: Html::parse_document(body),
            xpath,
        }
    }
}

/// Parse a fetched page and resolve every locator against it.
pub fn read_document(page: &FetchedPage, locators: &[Locator]) -> Result<ExtractionResults> {
    if !page.is_document() {
        return Err(ExtractionError::Parse {
            url: page.url.clone(),
            reason: format!(
                "unsupported content type {}",
                page.content_type.as_deref().unwrap_or_default()
            ),
        });
    }

    let document = PageDocument::parse(&page.body, locators);
    Ok(apply_locators(&document, locators))
}

/// One entry per locator, in input order. Failed or empty matches are `None`.
pub fn apply_locators(document: &PageDocument, locators: &[Locator]) -> ExtractionResults {
    locators
        .iter()
        .enumerate()
        .map(|(index, locator)| match resolve_locator(document, locator) {
            Ok(Some(text)) => Some(text),
            Ok(None) => {
                debug!(index, locator = %locator.value, "Locator matched no text");
                None
            }
            Err(e) => {
                warn!(index, error = %e, "Locator could not be applied");
                None
            }
        })
        .collect()
}

/// Concatenated, trimmed text of every node the locator matches.
pub fn resolve_locator(document: &PageDocument, locator: &Locator) -> LocatorResult<Option<String>> {
    let text: String = match locator.kind {
        LocatorKind::Css => {
            let selector =
                Selector::parse(&locator.value).map_err(|_| LocatorError::InvalidSelector {
                    selector: locator.value.clone(),
                })?;
            collect_text(document.html.select(&selector))
        }
        LocatorKind::Xpath => {
            let xpath = document
                .xpath
                .as_ref()
                .ok_or_else(|| LocatorError::XPathDocument {
                    reason: "page was not parsed for XPath".to_string(),
                })?;
            xpath.select_text(&locator.value)?.concat()
        }
    };

    let text = text.trim();
    Ok((!text.is_empty()).then(|| text.to_string()))
}

fn collect_text<'a>(elements: impl Iterator<Item = ElementRef<'a>>) -> String {
    elements.flat_map(|element| element.text()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"
        <html><body>
            <h1>  Title  </h1>
            <ul id="items"><li>a</li><li>b</li><li>c</li></ul>
            <p class="empty">   </p>
        </body></html>
    "#;

    fn parse(locators: &[Locator]) -> PageDocument {
        PageDocument::parse(PAGE, locators)
    }

    #[test]
    fn test_css_concatenates_matches() {
        let locators = [Locator::css("h1"), Locator::css("#items li")];
        let document = parse(&locators);
        let results = apply_locators(&document, &locators);
        assert_eq!(results, vec![Some("Title".to_string()), Some("abc".to_string())]);
    }

    #[test]
    fn test_xpath_locator() {
        let locators = [
            Locator::xpath("//*[@id='items']/li[2]"),
            Locator::xpath("//*[@id='items']/li"),
        ];
        let results = apply_locators(&parse(&locators), &locators);
        assert_eq!(results, vec![Some("b".to_string()), Some("abc".to_string())]);
    }

    #[test]
    fn test_failures_keep_alignment() {
        let locators = [
            Locator::css("h2"),
            Locator::css("p.empty"),
            Locator::css("li:::"),
            Locator::xpath("//li["),
            Locator::xpath("count(//li)"),
            Locator::css("h1"),
        ];
        let results = apply_locators(&parse(&locators), &locators);
        assert_eq!(results, vec![None, None, None, None, None, Some("Title".to_string())]);
    }

    #[test]
    fn test_invalid_selector_is_reported() {
        let err = resolve_locator(&parse(&[]), &Locator::css("[[")).unwrap_err();
        assert!(matches!(err, LocatorError::InvalidSelector { .. }));
    }

    #[test]
    fn test_xpath_skipped_without_xpath_locators() {
        let document = parse(&[Locator::css("h1")]);
        let err = resolve_locator(&document, &Locator::xpath("//h1")).unwrap_err();
        assert!(matches!(err, LocatorError::XPathDocument { .. }));
    }

    #[test]
    fn test_non_html_is_parse_error() {
        let page = FetchedPage::html("https://example.com/data", "{}")
            .with_content_type("application/json");
        let err = read_document(&page, &[Locator::css("h1")]).unwrap_err();
        assert!(matches!(err, ExtractionError::Parse { .. }));
    }
}
