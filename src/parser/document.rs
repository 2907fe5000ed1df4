use std::sync::LazyLock;

use scraper::{ElementRef, Html, Selector};
use url::Url;

static CONTENT_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("div.mw-parser-output").unwrap());
static INFOBOX_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("aside.portable-infobox").unwrap());
static PANEL_ITEM_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse(".pi-item").unwrap());
static PANEL_LABEL_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(".pi-data-label").unwrap());
static PANEL_VALUE_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(".pi-data-value").unwrap());
static IMG_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("img").unwrap());
static ANCHOR_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("a").unwrap());
static LINK_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("a[href]").unwrap());

/// Visible text with each text node trimmed and joined by a single space.
pub fn spaced_text(el: ElementRef) -> String {
    el.text()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Visible text with each text node trimmed and glued together.
pub fn compact_text(el: ElementRef) -> String {
    el.text().map(str::trim).collect()
}

/// The article body of a wiki page.
pub fn content(doc: &Html) -> Option<ElementRef<'_>> {
    doc.select(&CONTENT_SEL).next()
}

/// Direct element children of `parent` with tag `name`.
pub fn child_elements<'a>(parent: ElementRef<'a>, name: &'a str) -> impl Iterator<Item = ElementRef<'a>> + 'a {
    parent
        .children()
        .filter_map(ElementRef::wrap)
        .filter(move |el| el.value().name() == name)
}

/// Top-level paragraph texts of the article body, in order.
pub fn top_paragraphs(doc: &Html) -> Vec<String> {
    content(doc)
        .map(|c| child_elements(c, "p").map(spaced_text).collect())
        .unwrap_or_default()
}

pub fn first_link(el: ElementRef<'_>) -> Option<ElementRef<'_>> {
    el.select(&LINK_SEL).next()
}

pub fn links(el: ElementRef<'_>) -> impl Iterator<Item = ElementRef<'_>> {
    el.select(&LINK_SEL)
}

/// One label/value row of the metadata panel.
#[derive(Debug, Clone, Copy)]
pub struct PanelEntry<'a> {
    pub label: ElementRef<'a>,
    pub value: ElementRef<'a>,
}

impl<'a> PanelEntry<'a> {
    pub fn label_text(&self) -> String {
        compact_text(self.label).to_lowercase()
    }

    pub fn value_text(&self) -> String {
        spaced_text(self.value)
    }

    /// Display text of the first link in the value, if there is one.
    pub fn linked_text(&self) -> Option<String> {
        self.value.select(&ANCHOR_SEL).next().map(compact_text)
    }

    pub fn linked_href(&self) -> Option<&'a str> {
        self.value
            .select(&LINK_SEL)
            .next()
            .and_then(|a| a.value().attr("href"))
    }

    pub fn label_matches(&self, keywords: &[&str]) -> bool {
        let label = self.label_text();
        keywords.iter().any(|kw| label.contains(kw))
    }
}

pub fn infobox(doc: &Html) -> Option<ElementRef<'_>> {
    doc.select(&INFOBOX_SEL).next()
}

/// Rows of the metadata panel that carry both a label and a value.
pub fn panel_entries(doc: &Html) -> Vec<PanelEntry<'_>> {
    let Some(panel) = infobox(doc) else {
        return Vec::new();
    };
    panel
        .select(&PANEL_ITEM_SEL)
        .filter_map(|item| {
            let label = item.select(&PANEL_LABEL_SEL).next()?;
            let value = item.select(&PANEL_VALUE_SEL).next()?;
            Some(PanelEntry { label, value })
        })
        .collect()
}

/// `src` of the first image inside the metadata panel.
pub fn panel_image(doc: &Html) -> Option<String> {
    infobox(doc)?
        .select(&IMG_SEL)
        .next()
        .and_then(|img| img.value().attr("src"))
        .filter(|src| !src.is_empty())
        .map(str::to_string)
}

/// An in-wiki article link: `/wiki/...` with no namespace colon.
pub fn is_article_href(href: &str) -> bool {
    href.starts_with("/wiki/") && !href.contains(':')
}

pub fn absolute(base: &Url, href: &str) -> Option<String> {
    base.join(href).ok().map(String::from)
}
