use regex::Regex;
use scraper::Html;

use super::chain::Strategy;
use super::document::{panel_entries, panel_image, spaced_text, top_paragraphs};
use super::sections::{find_heading, section_body, HeadingMatch};
use crate::slug::truncate_chars;

/// Panel entry whose label contains a keyword. Linked display text is
/// preferred over the plain value when `prefer_link` is set.
pub struct PanelValue {
    pub keywords: &'static [&'static str],
    pub prefer_link: bool,
}

impl PanelValue {
    pub const fn linked(keywords: &'static [&'static str]) -> Self {
        PanelValue {
            keywords,
            prefer_link: true,
        }
    }

    pub const fn plain(keywords: &'static [&'static str]) -> Self {
        PanelValue {
            keywords,
            prefer_link: false,
        }
    }
}

impl Strategy<String> for PanelValue {
    fn name(&self) -> &'static str {
        "panel_value"
    }

    fn attempt(&self, doc: &Html) -> Option<String> {
        let entry = panel_entries(doc)
            .into_iter()
            .find(|e| e.label_matches(self.keywords))?;
        let linked = if self.prefer_link {
            entry.linked_text().filter(|t| !t.is_empty())
        } else {
            None
        };
        linked
            .or_else(|| Some(entry.value_text()))
            .filter(|t| !t.is_empty())
    }
}

/// Target of the link inside a matching panel entry.
pub struct PanelLink {
    pub keywords: &'static [&'static str],
}

impl Strategy<String> for PanelLink {
    fn name(&self) -> &'static str {
        "panel_link"
    }

    fn attempt(&self, doc: &Html) -> Option<String> {
        panel_entries(doc)
            .into_iter()
            .find(|e| e.label_matches(self.keywords))?
            .linked_href()
            .filter(|h| !h.is_empty())
            .map(str::to_string)
    }
}

/// First panel value, under any label, that matches `pattern`.
pub struct PanelPattern {
    pub pattern: &'static Regex,
}

impl Strategy<String> for PanelPattern {
    fn name(&self) -> &'static str {
        "panel_pattern"
    }

    fn attempt(&self, doc: &Html) -> Option<String> {
        panel_entries(doc).into_iter().find_map(|e| {
            self.pattern
                .find(&e.value_text())
                .map(|m| m.as_str().to_string())
        })
    }
}

pub struct PanelImage;

impl Strategy<String> for PanelImage {
    fn name(&self) -> &'static str {
        "panel_image"
    }

    fn attempt(&self, doc: &Html) -> Option<String> {
        panel_image(doc)
    }
}

/// Regex over the first `take` top-level paragraphs. Yields capture group 1
/// when the pattern has one, else the whole match.
pub struct LeadingParagraphs {
    pub take: usize,
    pub pattern: &'static Regex,
}

impl Strategy<String> for LeadingParagraphs {
    fn name(&self) -> &'static str {
        "leading_paragraphs"
    }

    fn attempt(&self, doc: &Html) -> Option<String> {
        top_paragraphs(doc)
            .iter()
            .take(self.take)
            .find_map(|text| {
                let caps = self.pattern.captures(text)?;
                let m = caps.get(1).or_else(|| caps.get(0))?;
                Some(m.as_str().trim().to_string())
            })
            .filter(|v| !v.is_empty())
    }
}

/// First top-level paragraph longer than `min_chars`, cut to `cap`.
pub struct FirstParagraph {
    pub min_chars: usize,
    pub cap: usize,
}

impl Strategy<String> for FirstParagraph {
    fn name(&self) -> &'static str {
        "first_paragraph"
    }

    fn attempt(&self, doc: &Html) -> Option<String> {
        top_paragraphs(doc)
            .into_iter()
            .find(|t| t.chars().count() > self.min_chars)
            .map(|t| truncate_chars(&t, self.cap))
    }
}

/// Paragraphs under a matching heading, up to the next top-level heading.
/// Paragraphs longer than `min_chars` are joined with a space and cut to `cap`.
pub struct SectionParagraphs {
    pub heading: HeadingMatch,
    pub min_chars: usize,
    pub cap: usize,
}

impl Strategy<String> for SectionParagraphs {
    fn name(&self) -> &'static str {
        "section_paragraphs"
    }

    fn attempt(&self, doc: &Html) -> Option<String> {
        let heading = find_heading(doc, &self.heading)?;
        let parts: Vec<String> = section_body(heading)
            .into_iter()
            .filter(|el| el.value().name() == "p")
            .map(spaced_text)
            .filter(|t| t.chars().count() > self.min_chars)
            .collect();
        if parts.is_empty() {
            return None;
        }
        Some(truncate_chars(&parts.join(" "), self.cap))
    }
}
