use scraper::Html;
use url::Url;

use super::{
    description_chain, first_year, poster_chain, resolve_href, synopsis_chain, DIRECTOR_KEYWORDS,
    RUNTIME_KEYWORDS, STANDARD_SYNOPSIS,
};
use crate::model::Short;
use crate::parser::chain::Chain;
use crate::parser::strategies::{PanelLink, PanelValue};

const RELEASE_KEYWORDS: &[&str] = &["release", "released", "premiere"];
const STUDIO_KEYWORDS: &[&str] = &["studio", "production"];

/// Field chains for a short-film page. Shorts rarely have prose worth
/// mining, so everything but the text fields comes from the panel.
pub struct ShortExtractor {
    pub director: Chain<String>,
    pub director_url: Chain<String>,
    pub release_date: Chain<String>,
    pub duration: Chain<String>,
    pub studio: Chain<String>,
    pub description: Chain<String>,
    pub plot: Chain<String>,
    pub poster: Chain<String>,
}

impl Default for ShortExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl ShortExtractor {
    pub fn new() -> Self {
        ShortExtractor {
            director: Chain::new("short.director").then(PanelValue::linked(DIRECTOR_KEYWORDS)),
            director_url: Chain::new("short.director_url").then(PanelLink {
                keywords: DIRECTOR_KEYWORDS,
            }),
            release_date: Chain::new("short.release_date")
                .then(PanelValue::linked(RELEASE_KEYWORDS)),
            duration: Chain::new("short.duration").then(PanelValue::linked(RUNTIME_KEYWORDS)),
            studio: Chain::new("short.studio").then(PanelValue::linked(STUDIO_KEYWORDS)),
            description: description_chain(),
            plot: synopsis_chain("short.plot", STANDARD_SYNOPSIS),
            poster: poster_chain(),
        }
    }

    pub fn extract(&self, title: &str, url: &str, base: &Url, doc: &Html) -> Short {
        let release_date = self.release_date.run(doc);
        Short {
            title: title.to_string(),
            url: Some(url.to_string()),
            director: self.director.run(doc),
            director_url: resolve_href(base, self.director_url.run(doc)),
            release_year: release_date.as_deref().and_then(first_year),
            release_date,
            duration: self.duration.run(doc),
            studio: self.studio.run(doc),
            description: self.description.run(doc),
            plot: self.plot.run(doc),
            poster_url: self.poster.run(doc),
        }
    }
}
