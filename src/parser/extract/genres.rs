use std::sync::LazyLock;

use regex::Regex;
use scraper::{Html, Selector};

use crate::parser::chain::{Chain, Strategy};
use crate::parser::document::{compact_text, content, panel_entries, spaced_text};

static SPLIT_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[,/;]").unwrap());
static CATLINK_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("div#mw-normal-catlinks a").unwrap());

const CATEGORY_KEYWORDS: &[&str] = &["adventure", "fantasy", "drama", "romance", "anime"];
const CATEGORY_EXCLUDES: &[&str] = &["films", "movies"];

/// Free-text keyword → genre, checked in this order.
const INFERENCE_RULES: &[(&[&str], &str)] = &[
    (&["adventure", "journey"], "Adventure"),
    (&["fantasy", "magic", "spirit"], "Fantasy"),
    (&["romance", "love"], "Romance"),
    (&["war", "battle"], "Drama"),
];

pub const ANIMATION: &str = "Animation";
pub const DEFAULT_GENRES: [&str; 2] = ["Animation", "Fantasy"];
const MAX_INFERRED: usize = 3;

/// Explicit genre rows in the panel, split on `,` `/` `;`.
pub struct PanelGenres;

impl Strategy<Vec<String>> for PanelGenres {
    fn name(&self) -> &'static str {
        "panel_genres"
    }

    fn attempt(&self, doc: &Html) -> Option<Vec<String>> {
        let genres: Vec<String> = panel_entries(doc)
            .into_iter()
            .filter(|e| e.label_matches(&["genre"]))
            .flat_map(|e| {
                SPLIT_RE
                    .split(&e.value_text())
                    .map(str::trim)
                    .filter(|g| !g.is_empty())
                    .map(str::to_string)
                    .collect::<Vec<_>>()
            })
            .collect();
        non_empty(genres)
    }
}

/// Category links that look like genres rather than catalog groupings.
pub struct CategoryGenres;

impl Strategy<Vec<String>> for CategoryGenres {
    fn name(&self) -> &'static str {
        "category_genres"
    }

    fn attempt(&self, doc: &Html) -> Option<Vec<String>> {
        let genres: Vec<String> = doc
            .select(&CATLINK_SEL)
            .map(compact_text)
            .filter(|cat| {
                let low = cat.to_lowercase();
                CATEGORY_KEYWORDS.iter().any(|kw| low.contains(kw))
                    && !CATEGORY_EXCLUDES.iter().any(|ex| low.contains(ex))
            })
            .collect();
        non_empty(genres)
    }
}

/// Genres guessed from keywords in the article text, plus Animation.
pub struct InferredGenres;

impl Strategy<Vec<String>> for InferredGenres {
    fn name(&self) -> &'static str {
        "inferred_genres"
    }

    fn attempt(&self, doc: &Html) -> Option<Vec<String>> {
        let text = spaced_text(content(doc)?).to_lowercase();
        let mut genres: Vec<String> = INFERENCE_RULES
            .iter()
            .filter(|(keywords, _)| keywords.iter().any(|kw| text.contains(kw)))
            .map(|(_, genre)| genre.to_string())
            .collect();
        if genres.is_empty() {
            return None;
        }
        genres.truncate(MAX_INFERRED - 1);
        if !genres.iter().any(|g| g.eq_ignore_ascii_case(ANIMATION)) {
            genres.push(ANIMATION.to_string());
        }
        Some(genres)
    }
}

pub struct DefaultGenres;

impl Strategy<Vec<String>> for DefaultGenres {
    fn name(&self) -> &'static str {
        "default_genres"
    }

    fn attempt(&self, _doc: &Html) -> Option<Vec<String>> {
        Some(DEFAULT_GENRES.iter().map(|g| g.to_string()).collect())
    }
}

fn non_empty(genres: Vec<String>) -> Option<Vec<String>> {
    if genres.is_empty() {
        None
    } else {
        Some(genres)
    }
}

/// Never misses: the last strategy always answers.
pub fn genre_chain() -> Chain<Vec<String>> {
    Chain::new("genres")
        .then(PanelGenres)
        .then(CategoryGenres)
        .then(InferredGenres)
        .then(DefaultGenres)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn genres(html: &str) -> (Vec<String>, &'static str) {
        genre_chain().run_traced(&Html::parse_document(html)).unwrap()
    }

    #[test]
    fn panel_genres_split() {
        let (g, by) = genres(
            r#"<aside class="portable-infobox"><div class="pi-item">
               <h3 class="pi-data-label">Genre</h3>
               <div class="pi-data-value">Fantasy / Adventure; Coming-of-age</div></div></aside>
               <div class="mw-parser-output"><p>magic everywhere</p></div>"#,
        );
        assert_eq!(by, "panel_genres");
        assert_eq!(g, vec!["Fantasy", "Adventure", "Coming-of-age"]);
    }

    #[test]
    fn categories_exclude_catalog_groupings() {
        let (g, by) = genres(
            r#"<div id="mw-normal-catlinks"><ul>
               <li><a href="/wiki/Category:Fantasy_films">Fantasy films</a></li>
               <li><a href="/wiki/Category:Romance">Romance</a></li>
               <li><a href="/wiki/Category:Characters">Characters</a></li></ul></div>"#,
        );
        assert_eq!(by, "category_genres");
        assert_eq!(g, vec!["Romance"]);
    }

    #[test]
    fn inference_always_adds_animation() {
        let (g, by) = genres(
            r#"<div class="mw-parser-output"><p>A journey through a spirit world
               at war, where love and magic meet.</p></div>"#,
        );
        assert_eq!(by, "inferred_genres");
        assert_eq!(g, vec!["Adventure", "Fantasy", "Animation"]);
    }

    #[test]
    fn nothing_matches_gives_default_pair() {
        let (g, by) = genres(r#"<div class="mw-parser-output"><p>A quiet film.</p></div>"#);
        assert_eq!(by, "default_genres");
        assert_eq!(g, vec!["Animation", "Fantasy"]);
    }
}
