use scraper::Html;
use url::Url;

use super::{
    description_chain, first_number, first_year, poster_chain, resolve_href, synopsis_chain,
    DIRECTED_BY_EOL_RE, DIRECTOR_KEYWORDS, EPISODES_RE, RUNTIME_KEYWORDS, YEAR_RE,
};
use crate::model::Series;
use crate::parser::chain::Chain;
use crate::parser::sections::HeadingMatch;
use crate::parser::strategies::{LeadingParagraphs, PanelLink, PanelValue};

const RELEASE_KEYWORDS: &[&str] = &["release", "released", "aired", "original run", "premiered"];
const EPISODE_KEYWORDS: &[&str] = &["episodes", "no. of episodes", "episode"];
const STUDIO_KEYWORDS: &[&str] = &["studio", "production", "producer", "produced by"];
const PLOT_HEADING: HeadingMatch =
    HeadingMatch::Contains(&["plot", "synopsis", "story", "premise", "overview"]);

/// Field chains for a television-series page.
pub struct SeriesExtractor {
    pub director: Chain<String>,
    pub director_url: Chain<String>,
    pub release_date: Chain<String>,
    pub year: Chain<String>,
    pub episodes: Chain<String>,
    pub running_time: Chain<String>,
    pub studio: Chain<String>,
    pub description: Chain<String>,
    pub plot: Chain<String>,
    pub poster: Chain<String>,
}

impl Default for SeriesExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl SeriesExtractor {
    pub fn new() -> Self {
        SeriesExtractor {
            director: Chain::new("series.director")
                .then(PanelValue::linked(DIRECTOR_KEYWORDS))
                .then(LeadingParagraphs {
                    take: 3,
                    pattern: &DIRECTED_BY_EOL_RE,
                }),
            director_url: Chain::new("series.director_url").then(PanelLink {
                keywords: DIRECTOR_KEYWORDS,
            }),
            release_date: Chain::new("series.release_date")
                .then(PanelValue::linked(RELEASE_KEYWORDS)),
            year: Chain::new("series.release_year")
                .then(PanelValue::linked(RELEASE_KEYWORDS))
                .then(LeadingParagraphs {
                    take: 2,
                    pattern: &YEAR_RE,
                }),
            episodes: Chain::new("series.episodes")
                .then(PanelValue::linked(EPISODE_KEYWORDS))
                .then(LeadingParagraphs {
                    take: 3,
                    pattern: &EPISODES_RE,
                }),
            running_time: Chain::new("series.running_time")
                .then(PanelValue::linked(RUNTIME_KEYWORDS)),
            studio: Chain::new("series.studio").then(PanelValue::linked(STUDIO_KEYWORDS)),
            description: description_chain(),
            plot: synopsis_chain("series.plot", PLOT_HEADING),
            poster: poster_chain(),
        }
    }

    pub fn extract(&self, title: &str, url: &str, base: &Url, doc: &Html) -> Series {
        Series {
            title: title.to_string(),
            url: Some(url.to_string()),
            director: self.director.run(doc),
            director_url: resolve_href(base, self.director_url.run(doc)),
            release_date: self.release_date.run(doc),
            release_year: self.year.run(doc).as_deref().and_then(first_year),
            episodes: self.episodes.run(doc).as_deref().and_then(first_number),
            running_time: self.running_time.run(doc),
            studio: self.studio.run(doc),
            description: self.description.run(doc),
            plot: self.plot.run(doc),
            poster_url: self.poster.run(doc),
            characters: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Url {
        Url::parse("https://ghibli.fandom.com").unwrap()
    }

    #[test]
    fn conan_fixture() {
        let html = std::fs::read_to_string("tests/fixtures/future_boy_conan.html").unwrap();
        let doc = Html::parse_document(&html);
        let s = SeriesExtractor::new().extract(
            "Future Boy Conan",
            "https://ghibli.fandom.com/wiki/Future_Boy_Conan",
            &base(),
            &doc,
        );
        assert_eq!(s.director.as_deref(), Some("Hayao Miyazaki"));
        assert_eq!(
            s.director_url.as_deref(),
            Some("https://ghibli.fandom.com/wiki/Hayao_Miyazaki")
        );
        assert_eq!(s.release_date.as_deref(), Some("April 4, 1978 – October 31, 1978"));
        assert_eq!(s.release_year, Some(1978));
        assert_eq!(s.episodes, Some(26));
        assert_eq!(s.running_time.as_deref(), Some("25 minutes"));
        assert_eq!(s.studio.as_deref(), Some("Nippon Animation"));
        assert!(s.plot.as_deref().unwrap().starts_with("In the year 2008"));
        assert!(s.description.as_deref().unwrap().starts_with("Future Boy Conan"));
        assert!(s.has_substance());
    }

    #[test]
    fn bare_page_falls_back_to_prose() {
        let html = r#"<div class="mw-parser-output">
            <p>Ronja is a 2014 series directed by Goro Miyazaki</p>
            <p>It ran for 26 episodes on NHK.</p></div>"#;
        let doc = Html::parse_document(html);
        let fx = SeriesExtractor::new();
        let s = fx.extract("Ronja", "https://ghibli.fandom.com/wiki/Ronja", &base(), &doc);
        assert_eq!(s.director.as_deref(), Some("Goro Miyazaki"));
        assert_eq!(s.release_year, Some(2014));
        assert_eq!(s.episodes, Some(26));
        assert!(s.release_date.is_none());
        assert!(s.studio.is_none());
        assert_eq!(fx.episodes.run_traced(&doc).unwrap().1, "leading_paragraphs");
    }

    #[test]
    fn navigation_page_has_no_substance() {
        let doc = Html::parse_document(r#"<div class="mw-parser-output"><p>See also.</p></div>"#);
        let s = SeriesExtractor::new().extract("Index", "https://ghibli.fandom.com/wiki/Index", &base(), &doc);
        assert!(!s.has_substance());
    }
}
