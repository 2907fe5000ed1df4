use scraper::Html;
use url::Url;

use super::genres::genre_chain;
use super::{
    description_chain, first_year, poster_chain, resolve_href, synopsis_chain, DIRECTED_BY_RE,
    DIRECTOR_KEYWORDS, FILM_BY_RE, STANDARD_SYNOPSIS, YEAR_RE,
};
use crate::model::Film;
use crate::parser::chain::Chain;
use crate::parser::strategies::{LeadingParagraphs, PanelLink, PanelPattern, PanelValue};

/// Field chains for a feature-film page.
pub struct FilmExtractor {
    pub year: Chain<String>,
    pub director: Chain<String>,
    pub director_url: Chain<String>,
    pub duration: Chain<String>,
    pub description: Chain<String>,
    pub synopsis: Chain<String>,
    pub poster: Chain<String>,
    pub genres: Chain<Vec<String>>,
}

impl Default for FilmExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FilmExtractor {
    pub fn new() -> Self {
        FilmExtractor {
            year: Chain::new("film.release_year").then(PanelPattern { pattern: &YEAR_RE }),
            director: Chain::new("film.director")
                .then(PanelValue::linked(DIRECTOR_KEYWORDS))
                .then(LeadingParagraphs {
                    take: 3,
                    pattern: &DIRECTED_BY_RE,
                })
                .then(LeadingParagraphs {
                    take: 3,
                    pattern: &FILM_BY_RE,
                }),
            director_url: Chain::new("film.director_url").then(PanelLink {
                keywords: DIRECTOR_KEYWORDS,
            }),
            duration: Chain::new("film.duration").then(PanelValue::plain(&["running time"])),
            description: description_chain(),
            synopsis: synopsis_chain("film.synopsis", STANDARD_SYNOPSIS),
            poster: poster_chain(),
            genres: genre_chain(),
        }
    }

    /// Build the film record. Characters are filled in by the crawl once
    /// their own pages have been fetched.
    pub fn extract(&self, title: &str, url: &str, base: &Url, doc: &Html) -> Film {
        Film {
            title: title.to_string(),
            url: Some(url.to_string()),
            release_year: self.year.run(doc).as_deref().and_then(first_year),
            director: self.director.run(doc),
            director_url: resolve_href(base, self.director_url.run(doc)),
            duration: self.duration.run(doc),
            description: self.description.run(doc),
            synopsis: self.synopsis.run(doc),
            poster_url: self.poster.run(doc),
            genres: self.genres.run(doc).unwrap_or_default(),
            characters: Vec::new(),
        }
    }
}
