//! Content distillation policy for candidate pages.

use crate::results::RenderedPage;

/// Text a candidate page contributes to the report.
///
/// A page contributes only when it rendered successfully and pruning left
/// something behind. Anything else contributes nothing; it is never an error.
pub fn distill(page: &RenderedPage) -> Option<&str> {
    if !page.success {
        ::log::debug!(
            "No content from {}: {}",
            page.url,
            page.error_message.as_deref().unwrap_or("render failed")
        );
        return None;
    }

    match page.distilled_text.as_deref() {
        Some(text) if !text.trim().is_empty() => Some(text),
        _ => {
            ::log::debug!("No content from {}: pruning removed everything", page.url);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_successful_page_contributes_text() {
        let page = RenderedPage::rendered("https://a.org", Vec::new(), "Some text".to_string());
        assert_eq!(distill(&page), Some("Some text"));
    }

    #[test]
    fn test_failed_page_contributes_nothing() {
        let page = RenderedPage::failed("https://a.org", Some("timeout".to_string()));
        assert_eq!(distill(&page), None);

        // Even if a failed page somehow carries text
        let mut page = RenderedPage::rendered("https://a.org", Vec::new(), "text".to_string());
        page.success = false;
        assert_eq!(distill(&page), None);
    }

    #[test]
    fn test_empty_distillation_contributes_nothing() {
        let page = RenderedPage::rendered("https://a.org", Vec::new(), String::new());
        assert_eq!(distill(&page), None);

        let page = RenderedPage::rendered("https://a.org", Vec::new(), " \n\n ".to_string());
        assert_eq!(distill(&page), None);

        let mut page = RenderedPage::rendered("https://a.org", Vec::new(), String::new());
        page.distilled_text = None;
        assert_eq!(distill(&page), None);
    }
}
