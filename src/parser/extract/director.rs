use scraper::Html;

use super::{description_chain, first_year, synopsis_chain};
use crate::model::Director;
use crate::parser::chain::Chain;
use crate::parser::sections::HeadingMatch;
use crate::parser::strategies::PanelValue;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DirectorProfile {
    pub born: Option<String>,
    pub birth_year: Option<i32>,
    pub nationality: Option<String>,
    pub description: Option<String>,
    pub history: Option<String>,
}

impl DirectorProfile {
    /// A fragment for `name` carrying only what the page told us.
    pub fn into_fragment(self, name: &str) -> Director {
        Director {
            name: name.to_string(),
            born: self.born,
            birth_year: self.birth_year,
            nationality: self.nationality,
            description: self.description,
            history: self.history,
            ..Default::default()
        }
    }
}

/// Reads a director's own wiki page.
pub struct DirectorExtractor {
    born: Chain<String>,
    nationality: Chain<String>,
    description: Chain<String>,
    history: Chain<String>,
}

impl Default for DirectorExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl DirectorExtractor {
    pub fn new() -> Self {
        DirectorExtractor {
            born: Chain::new("director.born").then(PanelValue::plain(&["born", "birth"])),
            nationality: Chain::new("director.nationality")
                .then(PanelValue::linked(&["nationality"])),
            description: description_chain(),
            history: synopsis_chain(
                "director.history",
                HeadingMatch::Contains(&["history", "career", "biography"]),
            ),
        }
    }

    pub fn profile(&self, doc: &Html) -> DirectorProfile {
        let born = self.born.run(doc);
        DirectorProfile {
            birth_year: born.as_deref().and_then(first_year),
            born,
            nationality: self.nationality.run(doc),
            description: self.description.run(doc),
            history: self.history.run(doc),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_panel_and_lead() {
        let lead = "Isao Takahata was a Japanese director, screenwriter and producer who co-founded \
                    Studio Ghibli alongside Hayao Miyazaki.";
        let career = "He joined Toei Doga in 1959, where he first worked alongside Hayao Miyazaki.";
        let html = format!(
            r#"<aside class="portable-infobox">
              <div class="pi-item"><h3 class="pi-data-label">Born</h3>
                <div class="pi-data-value">October 29, 1935<br>Ise, Mie, Japan</div></div>
              <div class="pi-item"><h3 class="pi-data-label">Nationality</h3>
                <div class="pi-data-value"><a href="/wiki/Japan">Japanese</a></div></div>
            </aside>
            <div class="mw-parser-output"><p>Short.</p><p>{}</p>
            <h2><span class="mw-headline" id="Career">Career</span></h2>
            <p>{}</p></div>"#,
            lead, career
        );
        let p = DirectorExtractor::new().profile(&Html::parse_document(&html));
        assert_eq!(p.born.as_deref(), Some("October 29, 1935 Ise, Mie, Japan"));
        assert_eq!(p.birth_year, Some(1935));
        assert_eq!(p.nationality.as_deref(), Some("Japanese"));
        assert_eq!(p.description.as_deref(), Some(lead));
        assert_eq!(p.history.as_deref(), Some(career));

        let d = p.into_fragment("Isao Takahata");
        assert!(d.works.is_empty());
        assert_eq!(d.name, "Isao Takahata");
        assert_eq!(d.birth_year, Some(1935));
        assert_eq!(d.history.as_deref(), Some(career));
    }
}
