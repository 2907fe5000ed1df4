pub mod characters;
pub mod director;
pub mod film;
pub mod genres;
pub mod series;
pub mod short;

use std::sync::LazyLock;

use regex::Regex;
use url::Url;

use super::chain::Chain;
use super::sections::HeadingMatch;
use super::strategies::{FirstParagraph, PanelImage, SectionParagraphs};

pub use characters::{CharacterCandidate, CharacterScan};
pub use director::DirectorExtractor;
pub use film::FilmExtractor;
pub use series::SeriesExtractor;
pub use short::ShortExtractor;

pub const DESCRIPTION_MIN_CHARS: usize = 100;
pub const DESCRIPTION_CAP: usize = 800;
pub const SYNOPSIS_MIN_CHARS: usize = 40;
pub const SYNOPSIS_CAP: usize = 2000;

pub static YEAR_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?:19|20)\d{2}").unwrap());
static DIGITS_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d+").unwrap());

pub static DIRECTED_BY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)directed by ([A-Z][a-zA-Z\s]+?)(?:\.|,|\sand\s)").unwrap()
});
/// Same as [`DIRECTED_BY_RE`] but also accepts a name that ends the paragraph.
pub static DIRECTED_BY_EOL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)directed by ([A-Z][a-zA-Z\s]+?)(?:\sand\s|,|\.|$)").unwrap()
});
pub static FILM_BY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:a |the )?film by ([A-Z][a-zA-Z\s]+?)(?:\.|,|\sand\s)").unwrap()
});
pub static EPISODES_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(\d+)\s*episode").unwrap());

const DIRECTOR_KEYWORDS: &[&str] = &["director", "directed"];
const RUNTIME_KEYWORDS: &[&str] = &["running time", "runtime", "duration", "length"];
const STANDARD_SYNOPSIS: HeadingMatch = HeadingMatch::Id(&["Plot", "Synopsis", "Story"]);

/// First 19xx/20xx year in `text`. No range check beyond the pattern.
pub fn first_year(text: &str) -> Option<i32> {
    YEAR_RE.find(text)?.as_str().parse().ok()
}

/// First run of digits in `text`.
pub fn first_number(text: &str) -> Option<u32> {
    DIGITS_RE.find(text)?.as_str().parse().ok()
}

fn description_chain() -> Chain<String> {
    Chain::new("description").then(FirstParagraph {
        min_chars: DESCRIPTION_MIN_CHARS,
        cap: DESCRIPTION_CAP,
    })
}

fn synopsis_chain(field: &'static str, heading: HeadingMatch) -> Chain<String> {
    Chain::new(field).then(SectionParagraphs {
        heading,
        min_chars: SYNOPSIS_MIN_CHARS,
        cap: SYNOPSIS_CAP,
    })
}

fn poster_chain() -> Chain<String> {
    Chain::new("poster_url").then(PanelImage)
}

fn resolve_href(base: &Url, href: Option<String>) -> Option<String> {
    href.and_then(|h| base.join(&h).ok()).map(String::from)
}
