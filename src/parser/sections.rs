use std::sync::LazyLock;

use scraper::{ElementRef, Html, Selector};

use super::document::{compact_text, content};

static H2_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("h2").unwrap());
static HEADLINE_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("span.mw-headline").unwrap());

/// How a section heading is recognised.
#[derive(Debug, Clone, Copy)]
pub enum HeadingMatch {
    /// Headline anchor id equals one of these exactly.
    Id(&'static [&'static str]),
    /// Lowercased headline id or text contains one of these.
    Contains(&'static [&'static str]),
}

impl HeadingMatch {
    fn matches(&self, h2: ElementRef) -> bool {
        let headline = h2.select(&HEADLINE_SEL).next();
        // Newer skins drop the headline span and put the id on the h2 itself.
        let anchor = headline.unwrap_or(h2);
        let id = anchor.value().id().unwrap_or("");
        match self {
            HeadingMatch::Id(ids) => ids.contains(&id),
            HeadingMatch::Contains(keywords) => {
                let id = id.to_lowercase();
                let text = compact_text(anchor).to_lowercase();
                keywords
                    .iter()
                    .any(|kw| id.contains(kw) || text.contains(kw))
            }
        }
    }
}

/// True for headings that close a top-level section.
pub fn is_top_heading(el: ElementRef) -> bool {
    matches!(el.value().name(), "h1" | "h2")
}

/// The first `h2` in the article body accepted by `heading`.
pub fn find_heading<'a>(doc: &'a Html, heading: &HeadingMatch) -> Option<ElementRef<'a>> {
    content(doc)?
        .select(&H2_SEL)
        .find(|h2| heading.matches(*h2))
}

/// Sibling elements after `heading` up to the next top-level heading.
pub fn section_body(heading: ElementRef<'_>) -> Vec<ElementRef<'_>> {
    heading
        .next_siblings()
        .filter_map(ElementRef::wrap)
        .take_while(|el| !is_top_heading(*el))
        .collect()
}

/// Sibling elements following any heading (h2/h3) whose text mentions one
/// of `keywords`, each run stopping at the next h2/h3.
pub fn keyword_sections<'a>(doc: &'a Html, keywords: &[&str]) -> Vec<ElementRef<'a>> {
    static HEADINGS_SEL: LazyLock<Selector> =
        LazyLock::new(|| Selector::parse("h2, h3").unwrap());

    let Some(body) = content(doc) else {
        return Vec::new();
    };
    let mut out = Vec::new();
    for heading in body.select(&HEADINGS_SEL) {
        let text = compact_text(heading).to_lowercase();
        if !keywords.iter().any(|kw| text.contains(kw)) {
            continue;
        }
        out.extend(
            heading
                .next_siblings()
                .filter_map(ElementRef::wrap)
                .take_while(|el| !matches!(el.value().name(), "h2" | "h3")),
        );
    }
    out
}
