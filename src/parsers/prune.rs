use crate::config::{DistillationConfig, ThresholdMode};
use regex::Regex;
use scraper::{ElementRef, Html, Node, Selector};

/// Elements dropped before scoring
const EXCLUDED_TAGS: &[&str] = &[
    "script", "style", "noscript", "nav", "footer", "header", "aside", "form", "iframe", "svg",
];

/// Elements that are never scored on their own; they live or die with their block parent
const INLINE_TAGS: &[&str] = &[
    "a", "abbr", "b", "bdi", "bdo", "br", "cite", "code", "data", "dfn", "em", "i", "img", "kbd",
    "label", "mark", "q", "s", "samp", "small", "span", "strong", "sub", "sup", "time", "u",
    "var", "wbr",
];

const TEXT_DENSITY_WEIGHT: f64 = 0.4;
const LINK_DENSITY_WEIGHT: f64 = 0.2;
const TAG_WEIGHT: f64 = 0.2;
const CLASS_ID_WEIGHT: f64 = 0.1;
const TEXT_LENGTH_WEIGHT: f64 = 0.1;

/// Text statistics of one element, ignoring excluded descendants
#[derive(Debug, Default, Clone, PartialEq)]
pub(crate) struct NodeMetrics {
    /// Characters of trimmed text
    pub text_len: usize,
    /// Characters of markup inside the element
    pub tag_len: usize,
    /// Characters of trimmed text inside links
    pub link_text_len: usize,
    pub word_count: usize,
}

impl NodeMetrics {
    fn text_ratio(&self) -> f64 {
        if self.tag_len > 0 {
            self.text_len as f64 / self.tag_len as f64
        } else {
            0.0
        }
    }

    fn link_ratio(&self) -> f64 {
        if self.text_len > 0 {
            self.link_text_len as f64 / self.text_len as f64
        } else {
            0.0
        }
    }
}

/// Removes low-information blocks from a page and renders what survives
/// as lightweight markdown.
///
/// Every block-level element under `<body>` gets a composite score built from
/// text density, link density, tag importance, class/id hints and text length.
/// An element scoring under the cutoff is dropped together with its subtree.
/// In adaptive mode the cutoff is recalibrated for each element.
pub struct PruningFilter {
    threshold: f64,
    mode: ThresholdMode,
    min_words: usize,
    negative_patterns: Regex,
}

impl PruningFilter {
    pub fn new(config: &DistillationConfig) -> Self {
        Self {
            threshold: config.relevance_threshold,
            mode: config.threshold_mode,
            min_words: config.min_words_per_node,
            negative_patterns: Regex::new(
                r"(?i)^(?:nav|footer|header|sidebar|ads|comment|promo|advert|social|share)",
            )
            .expect("Negative class pattern should be valid"),
        }
    }

    /// Surviving content blocks in document order
    pub fn filter_content(&self, doc: &Html) -> Vec<String> {
        let body_selector = Selector::parse("body").unwrap();
        let Some(body) = doc.select(&body_selector).next() else {
            return Vec::new();
        };

        let mut blocks = Vec::new();
        let mut current = String::new();
        self.walk(body, &mut blocks, &mut current, "");
        flush(&mut blocks, &mut current, "");
        blocks
    }

    /// Surviving blocks separated by blank lines
    pub fn fit_markdown(&self, doc: &Html) -> String {
        self.filter_content(doc).join("\n\n")
    }

    /// `prefix` is the marker of the nearest prefixed ancestor block, applied
    /// to nested blocks that carry no marker of their own
    fn walk(
        &self,
        element: ElementRef,
        blocks: &mut Vec<String>,
        current: &mut String,
        prefix: &'static str,
    ) {
        let name = element.value().name();
        if EXCLUDED_TAGS.contains(&name) {
            return;
        }

        if INLINE_TAGS.contains(&name) {
            if name == "br" {
                current.push(' ');
            }
            self.walk_children(element, blocks, current, prefix);
            return;
        }

        if !self.keep(element) {
            ::log::trace!("Pruned <{}> block", name);
            return;
        }

        let own_prefix = match block_prefix(name) {
            "" => prefix,
            marker => marker,
        };
        flush(blocks, current, prefix);
        self.walk_children(element, blocks, current, own_prefix);
        flush(blocks, current, own_prefix);
    }

    fn walk_children(
        &self,
        element: ElementRef,
        blocks: &mut Vec<String>,
        current: &mut String,
        prefix: &'static str,
    ) {
        for child in element.children() {
            match child.value() {
                Node::Text(text) => current.push_str(text),
                Node::Element(_) => {
                    if let Some(child) = ElementRef::wrap(child) {
                        self.walk(child, blocks, current, prefix);
                    }
                }
                _ => {}
            }
        }
    }

    fn keep(&self, element: ElementRef) -> bool {
        let metrics = measure(element);
        let score = self.score(element, &metrics);
        score >= self.cutoff(element.value().name(), &metrics)
    }

    /// Weighted composite relevance; -1 for nodes under the word minimum
    pub(crate) fn score(&self, element: ElementRef, metrics: &NodeMetrics) -> f64 {
        if metrics.word_count < self.min_words {
            return -1.0;
        }

        let tag_weight = tag_importance(element.value().name()).unwrap_or(0.5);
        let text_length = ((metrics.text_len + 1) as f64).ln();

        let weighted = TEXT_DENSITY_WEIGHT * metrics.text_ratio()
            + LINK_DENSITY_WEIGHT * (1.0 - metrics.link_ratio())
            + TAG_WEIGHT * tag_weight
            + CLASS_ID_WEIGHT * self.class_id_weight(element)
            + TEXT_LENGTH_WEIGHT * text_length;

        weighted
            / (TEXT_DENSITY_WEIGHT
                + LINK_DENSITY_WEIGHT
                + TAG_WEIGHT
                + CLASS_ID_WEIGHT
                + TEXT_LENGTH_WEIGHT)
    }

    /// Score an element must reach to be kept
    pub(crate) fn cutoff(&self, tag: &str, metrics: &NodeMetrics) -> f64 {
        match self.mode {
            ThresholdMode::Fixed => self.threshold,
            ThresholdMode::Adaptive => {
                let mut threshold = self.threshold;
                if tag_importance(tag).unwrap_or(0.7) > 1.0 {
                    threshold *= 0.8;
                }
                if metrics.text_ratio() > 0.4 {
                    threshold *= 0.9;
                }
                let link_ratio = if metrics.text_len > 0 {
                    metrics.link_ratio()
                } else {
                    1.0
                };
                if link_ratio > 0.6 {
                    threshold *= 1.2;
                }
                threshold
            }
        }
    }

    /// Penalty for class or id values that look like page chrome
    pub(crate) fn class_id_weight(&self, element: ElementRef) -> f64 {
        ["class", "id"]
            .iter()
            .filter_map(|attr| element.value().attr(attr))
            .filter(|value| self.negative_patterns.is_match(value.trim()))
            .count() as f64
            * -0.5
    }
}

/// Collect text statistics for an element
pub(crate) fn measure(element: ElementRef) -> NodeMetrics {
    let mut metrics = NodeMetrics::default();
    let mut text = String::new();
    let mut excluded_len = 0;
    accumulate(element, false, &mut metrics, &mut text, &mut excluded_len);

    metrics.word_count = text.split_whitespace().count();
    metrics.tag_len = element.inner_html().len().saturating_sub(excluded_len);
    metrics
}

fn accumulate(
    element: ElementRef,
    in_link: bool,
    metrics: &mut NodeMetrics,
    text: &mut String,
    excluded_len: &mut usize,
) {
    for child in element.children() {
        match child.value() {
            Node::Text(t) => {
                let len = t.trim().chars().count();
                metrics.text_len += len;
                if in_link {
                    metrics.link_text_len += len;
                }
                text.push_str(t);
            }
            Node::Element(_) => {
                let Some(child) = ElementRef::wrap(child) else {
                    continue;
                };
                let name = child.value().name();
                if EXCLUDED_TAGS.contains(&name) {
                    *excluded_len += child.html().len();
                    continue;
                }
                if name == "br" {
                    text.push(' ');
                }
                accumulate(child, in_link || name == "a", metrics, text, excluded_len);
            }
            _ => {}
        }
    }
}

fn tag_importance(tag: &str) -> Option<f64> {
    match tag {
        "article" => Some(1.5),
        "main" | "h1" => Some(1.4),
        "section" | "h2" => Some(1.3),
        "p" | "h3" => Some(1.2),
        "div" => Some(0.7),
        "span" => Some(0.6),
        _ => None,
    }
}

fn block_prefix(tag: &str) -> &'static str {
    match tag {
        "h1" => "# ",
        "h2" => "## ",
        "h3" => "### ",
        "h4" => "#### ",
        "h5" => "##### ",
        "h6" => "###### ",
        "li" => "- ",
        "blockquote" => "> ",
        _ => "",
    }
}

/// Move the pending inline text into `blocks` as one normalized block
fn flush(blocks: &mut Vec<String>, current: &mut String, prefix: &str) {
    let text = current.split_whitespace().collect::<Vec<_>>().join(" ");
    current.clear();
    if !text.is_empty() {
        blocks.push(format!("{prefix}{text}"));
    }
}
