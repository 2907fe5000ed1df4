use std::collections::{BTreeSet, HashSet};
use std::sync::LazyLock;

use scraper::{ElementRef, Html, Selector};
use url::Url;

use crate::model::Character;
use crate::parser::chain::{Chain, Strategy};
use crate::parser::document::{
    absolute, child_elements, compact_text, first_link, is_article_href, top_paragraphs,
};
use crate::parser::sections::{find_heading, section_body, HeadingMatch};
use crate::parser::strategies::{PanelImage, PanelValue};
use crate::slug::truncate_chars;

static DT_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("dt").unwrap());
static TR_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("tr").unwrap());
static CELL_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("td, th").unwrap());
static BOLD_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("b, strong").unwrap());

const CHARACTERS_HEADING: HeadingMatch = HeadingMatch::Contains(&["character"]);

pub const DESCRIPTION_MIN_CHARS: usize = 50;
pub const DESCRIPTION_CAP: usize = 600;
const CREDIT_SPAN: usize = 200;
const CREDIT_MARKERS: &[&str] = &[
    "(Japanese)",
    "(English)",
    "(Disney)",
    "(Streamline)",
    "voiced by",
    "voice actor",
];

/// How the Characters section of a catalog page is read.
#[derive(Debug, Clone, Copy)]
pub struct CharacterScan {
    /// Names in list entries containing one of these are navigation, not people.
    pub skip_words: &'static [&'static str],
    pub cap: usize,
}

impl CharacterScan {
    pub const FILM: CharacterScan = CharacterScan {
        skip_words: &[
            "film", "movie", "studio", "category", "ghibli", "miyazaki", "list", "main",
        ],
        cap: 20,
    };

    pub const SERIES: CharacterScan = CharacterScan {
        skip_words: &[
            "film", "movie", "studio", "category", "ghibli", "list", "main", "episode",
        ],
        cap: 20,
    };

    pub fn with_cap(self, cap: usize) -> Self {
        CharacterScan { cap, ..self }
    }
}

/// A character link found on a catalog page, before its own page is fetched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CharacterCandidate {
    pub name: String,
    pub url: String,
}

struct Collector<'b> {
    base: &'b Url,
    cap: usize,
    seen: HashSet<String>,
    found: Vec<CharacterCandidate>,
}

impl Collector<'_> {
    fn full(&self) -> bool {
        self.found.len() >= self.cap
    }

    fn offer(&mut self, name: String, href: &str) {
        if self.full() || !is_article_href(href) || name.chars().count() <= 1 {
            return;
        }
        let Some(url) = absolute(self.base, href) else {
            return;
        };
        if self.seen.insert(url.clone()) {
            self.found.push(CharacterCandidate { name, url });
        }
    }

    fn offer_link(&mut self, link: ElementRef<'_>) {
        if let Some(href) = link.value().attr("href") {
            self.offer(compact_text(link), href);
        }
    }
}

/// Character links from the page's Characters section. Reads lists,
/// definition lists, tables and bold-name paragraphs until the next
/// top-level heading or `scan.cap` accepted candidates.
pub fn discover(doc: &Html, base: &Url, scan: &CharacterScan) -> Vec<CharacterCandidate> {
    let Some(heading) = find_heading(doc, &CHARACTERS_HEADING) else {
        return Vec::new();
    };
    let mut collector = Collector {
        base,
        cap: scan.cap,
        seen: HashSet::new(),
        found: Vec::new(),
    };

    for el in section_body(heading) {
        if collector.full() {
            break;
        }
        match el.value().name() {
            "dl" => {
                for dt in el.select(&DT_SEL) {
                    if let Some(link) = first_link(dt) {
                        collector.offer_link(link);
                    }
                }
            }
            "ul" => {
                for li in child_elements(el, "li") {
                    let Some(link) = first_link(li) else {
                        continue;
                    };
                    let name = compact_text(link);
                    let low = name.to_lowercase();
                    if scan.skip_words.iter().any(|w| low.contains(w)) {
                        continue;
                    }
                    collector.offer_link(link);
                }
            }
            "table" => {
                for row in el.select(&TR_SEL) {
                    let Some(link) = row.select(&CELL_SEL).next().and_then(first_link) else {
                        continue;
                    };
                    if link.value().attr("href").is_some_and(|h| h.contains("List_of")) {
                        continue;
                    }
                    collector.offer_link(link);
                }
            }
            "p" => {
                for bold in el.select(&BOLD_SEL) {
                    let name = compact_text(bold);
                    if let Some(href) = link_after(el, bold).and_then(|a| a.value().attr("href")) {
                        collector.offer(name, href);
                    }
                }
            }
            // sub-headings such as "Principal cast" stay inside the section
            _ => {}
        }
    }

    collector.found
}

/// The link inside `bold`, or else the next link after it in the paragraph.
fn link_after<'a>(para: ElementRef<'a>, bold: ElementRef<'a>) -> Option<ElementRef<'a>> {
    para.descendants()
        .skip_while(|n| n.id() != bold.id())
        .filter_map(ElementRef::wrap)
        .find(|e| e.value().name() == "a" && e.value().attr("href").is_some())
}

/// Cast-credit lines ("Name (Japanese), Name (English), ...") are not
/// descriptions.
pub fn looks_like_credit(text: &str) -> bool {
    if text.chars().count() >= CREDIT_SPAN {
        return false;
    }
    let parens = text.matches('(').count();
    let commas = text.matches(',').count();
    (parens >= 2 && commas >= 2) || CREDIT_MARKERS.iter().any(|m| text.contains(m))
}

/// First top-level paragraph that reads like prose about the character.
pub struct CharacterDescription;

impl Strategy<String> for CharacterDescription {
    fn name(&self) -> &'static str {
        "character_description"
    }

    fn attempt(&self, doc: &Html) -> Option<String> {
        top_paragraphs(doc)
            .into_iter()
            .filter(|t| t.chars().count() >= DESCRIPTION_MIN_CHARS)
            .find(|t| !looks_like_credit(t))
            .map(|t| truncate_chars(&t, DESCRIPTION_CAP))
    }
}

/// What a character's own page adds to the name and link.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CharacterProfile {
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub age: Option<String>,
    pub gender: Option<String>,
}

pub struct CharacterPageExtractor {
    description: Chain<String>,
    image: Chain<String>,
    age: Chain<String>,
    gender: Chain<String>,
}

impl Default for CharacterPageExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl CharacterPageExtractor {
    pub fn new() -> Self {
        CharacterPageExtractor {
            description: Chain::new("character.description").then(CharacterDescription),
            image: Chain::new("character.image_url").then(PanelImage),
            age: Chain::new("character.age").then(PanelValue::plain(&["age"])),
            gender: Chain::new("character.gender").then(PanelValue::plain(&["gender"])),
        }
    }

    pub fn profile(&self, doc: &Html) -> CharacterProfile {
        CharacterProfile {
            description: self.description.run(doc),
            image_url: self.image.run(doc),
            age: self.age.run(doc),
            gender: self.gender.run(doc),
        }
    }
}

impl CharacterCandidate {
    /// A fragment recording that this character appears in `title`.
    pub fn into_fragment(self, profile: CharacterProfile, title: &str) -> Character {
        Character {
            name: self.name,
            url: Some(self.url),
            description: profile.description,
            image_url: profile.image_url,
            age: profile.age,
            gender: profile.gender,
            appears_in: BTreeSet::from([title.to_string()]),
        }
    }
}
