use std::collections::{BTreeSet, HashSet};

use anyhow::Result;
use tracing::{debug, info};

use crate::aggregate::Registry;
use crate::model::{
    CatalogKind, Character, Director, Film, FilmCatalog, Series, SeriesCatalog, Short,
    ShortCatalog,
};
use crate::settings::Settings;
use crate::slug::slugify;
use crate::store;

/// The three interchange files, as persisted by the crawl stage.
#[derive(Debug, Clone, Default)]
pub struct Catalogs {
    pub films: FilmCatalog,
    pub series: SeriesCatalog,
    pub shorts: ShortCatalog,
}

impl Catalogs {
    /// Missing files load as empty catalogs; a malformed file is an error.
    pub fn load(settings: &Settings) -> Result<Self> {
        Ok(Catalogs {
            films: store::load(&settings.films_path())?,
            series: store::load(&settings.series_path())?,
            shorts: store::load(&settings.shorts_path())?,
        })
    }
}

/// A link from one entity to a catalog title.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reference {
    pub kind: CatalogKind,
    pub slug: String,
}

impl Reference {
    pub fn new(kind: CatalogKind, title: &str) -> Self {
        Reference {
            kind,
            slug: slugify(title),
        }
    }

    /// Prefixed name, e.g. `series:sherlock_hound`.
    pub fn curie(&self) -> String {
        format!("{}:{}", self.kind.prefix(), self.slug)
    }
}

/// Title membership per catalog. Lookups are exact and case-sensitive;
/// there are no foreign keys, only titles.
#[derive(Debug, Clone, Default)]
pub struct CatalogIndex {
    films: HashSet<String>,
    series: HashSet<String>,
    shorts: HashSet<String>,
}

impl CatalogIndex {
    pub fn new(catalogs: &Catalogs) -> Self {
        CatalogIndex {
            films: catalogs.films.movies.iter().map(|f| f.title.clone()).collect(),
            series: catalogs.series.series.iter().map(|s| s.title.clone()).collect(),
            shorts: catalogs.shorts.shorts.iter().map(|s| s.title.clone()).collect(),
        }
    }

    /// Where a character appears: series, then film, else film.
    pub fn classify_appearance(&self, title: &str) -> CatalogKind {
        if self.series.contains(title) {
            CatalogKind::Series
        } else if self.films.contains(title) {
            CatalogKind::Film
        } else {
            unmatched(title, "appearance")
        }
    }

    /// What a director made: series, then short, else film.
    pub fn classify_work(&self, title: &str) -> CatalogKind {
        if self.series.contains(title) {
            CatalogKind::Series
        } else if self.shorts.contains(title) {
            CatalogKind::Short
        } else if self.films.contains(title) {
            CatalogKind::Film
        } else {
            unmatched(title, "work")
        }
    }
}

fn unmatched(title: &str, context: &'static str) -> CatalogKind {
    debug!(title, context, "title not in any catalog, defaulting to film");
    CatalogKind::Film
}

/// Everything the output document needs, joined across catalogs by slug.
/// Built fresh from the interchange files on every conversion.
#[derive(Debug, Clone)]
pub struct ResolvedGraph {
    pub films: Vec<Film>,
    pub series: Vec<Series>,
    pub shorts: Vec<Short>,
    pub characters: Vec<Character>,
    pub directors: Vec<Director>,
    pub genres: BTreeSet<String>,
    pub studios: BTreeSet<String>,
    index: CatalogIndex,
}

impl ResolvedGraph {
    pub fn resolve(catalogs: Catalogs) -> Self {
        let index = CatalogIndex::new(&catalogs);
        let Catalogs {
            films,
            series,
            shorts,
        } = catalogs;

        let characters: Registry<Character> = films
            .characters
            .into_iter()
            .chain(series.characters)
            .collect();

        let mut directors: Registry<Director> = films.directors.into_iter().collect();
        let credits = films
            .movies
            .iter()
            .map(|f| (&f.director, &f.director_url, &f.title))
            .chain(series.series.iter().map(|s| (&s.director, &s.director_url, &s.title)))
            .chain(shorts.shorts.iter().map(|s| (&s.director, &s.director_url, &s.title)));
        for (name, url, title) in credits {
            if let Some(name) = name.as_deref().filter(|n| !n.is_empty()) {
                directors.insert(Director::credited(name, url.clone(), title));
            }
        }

        let genres: BTreeSet<String> = films
            .movies
            .iter()
            .flat_map(|f| f.genres.iter().cloned())
            .collect();
        let studios: BTreeSet<String> = series
            .series
            .iter()
            .filter_map(|s| s.studio.clone())
            .chain(shorts.shorts.iter().filter_map(|s| s.studio.clone()))
            .collect();

        let graph = ResolvedGraph {
            films: films.movies,
            series: series.series,
            shorts: shorts.shorts,
            characters: characters.into_records(),
            directors: directors.into_records(),
            genres,
            studios,
            index,
        };
        info!(
            films = graph.films.len(),
            series = graph.series.len(),
            shorts = graph.shorts.len(),
            characters = graph.characters.len(),
            directors = graph.directors.len(),
            "Graph resolved"
        );
        graph
    }

    pub fn appearances(&self, character: &Character) -> Vec<Reference> {
        character
            .appears_in
            .iter()
            .map(|t| Reference::new(self.index.classify_appearance(t), t))
            .collect()
    }

    pub fn works(&self, director: &Director) -> Vec<Reference> {
        director
            .works
            .iter()
            .map(|t| Reference::new(self.index.classify_work(t), t))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn film(title: &str, director: Option<&str>, genres: &[&str]) -> Film {
        Film {
            title: title.into(),
            url: None,
            release_year: None,
            director: director.map(String::from),
            director_url: None,
            duration: None,
            description: None,
            synopsis: None,
            poster_url: None,
            genres: genres.iter().map(|g| g.to_string()).collect(),
            characters: Vec::new(),
        }
    }

    fn series(title: &str, director: Option<&str>, studio: Option<&str>) -> Series {
        Series {
            title: title.into(),
            url: None,
            director: director.map(String::from),
            director_url: None,
            release_date: None,
            release_year: None,
            episodes: Some(26),
            running_time: None,
            studio: studio.map(String::from),
            description: None,
            plot: None,
            poster_url: None,
            characters: Vec::new(),
        }
    }

    fn short(title: &str, director: Option<&str>, studio: Option<&str>) -> Short {
        Short {
            title: title.into(),
            url: None,
            director: director.map(String::from),
            director_url: None,
            release_date: None,
            release_year: None,
            duration: Some("14 minutes".into()),
            studio: studio.map(String::from),
            description: None,
            plot: None,
            poster_url: None,
        }
    }

    fn character(name: &str, titles: &[&str], description: Option<&str>) -> Character {
        Character {
            name: name.into(),
            description: description.map(String::from),
            appears_in: titles.iter().map(|t| t.to_string()).collect(),
            ..Default::default()
        }
    }

    fn sample() -> Catalogs {
        Catalogs {
            films: FilmCatalog {
                movies: vec![
                    film("Spirited Away", Some("Hayao Miyazaki"), &["Fantasy", "Animation"]),
                    film("Ocean Waves", Some("Tomomi Mochizuki"), &["Drama", "Animation"]),
                ],
                characters: vec![character("Chihiro Ogino", &["Spirited Away"], None)],
                directors: vec![Director {
                    born: Some("January 5, 1941".into()),
                    ..Director::credited("Hayao Miyazaki", None, "Spirited Away")
                }],
            },
            series: SeriesCatalog {
                series: vec![series(
                    "Future Boy Conan",
                    Some("Hayao Miyazaki"),
                    Some("Nippon Animation"),
                )],
                characters: vec![
                    character("Conan", &["Future Boy Conan"], None),
                    character("Chihiro Ogino", &["Future Boy Conan"], Some("Crossover cameo.")),
                ],
            },
            shorts: ShortCatalog {
                shorts: vec![short(
                    "Mei and the Kittenbus",
                    Some("Hayao Miyazaki"),
                    Some("Studio Ghibli"),
                )],
            },
        }
    }

    #[test]
    fn unknown_title_defaults_to_film() {
        let index = CatalogIndex::new(&sample());
        assert_eq!(index.classify_appearance("Nausicaä"), CatalogKind::Film);
        assert_eq!(index.classify_work("Nausicaä"), CatalogKind::Film);
        assert_eq!(index.classify_work("spirited away"), CatalogKind::Film);
        assert_eq!(
            Reference::new(index.classify_appearance("Nausicaä of the Valley"), "Nausicaä of the Valley").curie(),
            "movie:nausicaä_of_the_valley"
        );
    }

    #[test]
    fn lookup_order_per_context() {
        let mut catalogs = sample();
        // The same title in every catalog.
        catalogs.films.movies.push(film("Guru Guru", None, &[]));
        catalogs.series.series.push(series("Guru Guru", None, None));
        catalogs.shorts.shorts.push(short("Guru Guru", None, None));
        catalogs.shorts.shorts.push(short("Film B", None, None));
        catalogs.films.movies.push(film("Film B", None, &[]));
        let index = CatalogIndex::new(&catalogs);

        assert_eq!(index.classify_appearance("Guru Guru"), CatalogKind::Series);
        assert_eq!(index.classify_work("Guru Guru"), CatalogKind::Series);
        // Characters never resolve into shorts; directors prefer shorts over films.
        assert_eq!(index.classify_appearance("Film B"), CatalogKind::Film);
        assert_eq!(index.classify_work("Film B"), CatalogKind::Short);
        assert_eq!(index.classify_appearance("Mei and the Kittenbus"), CatalogKind::Film);
        assert_eq!(index.classify_work("Mei and the Kittenbus"), CatalogKind::Short);
    }

    #[test]
    fn directors_collect_works_from_every_catalog() {
        let graph = ResolvedGraph::resolve(sample());
        assert_eq!(graph.directors.len(), 2);

        let miyazaki = graph.directors.iter().find(|d| d.name == "Hayao Miyazaki").unwrap();
        assert_eq!(miyazaki.born.as_deref(), Some("January 5, 1941"));
        let works: Vec<String> = graph.works(miyazaki).iter().map(Reference::curie).collect();
        assert_eq!(
            works,
            vec![
                "series:future_boy_conan",
                "short:mei_and_the_kittenbus",
                "movie:spirited_away"
            ]
        );
    }

    #[test]
    fn characters_merge_across_catalogs() {
        let graph = ResolvedGraph::resolve(sample());
        assert_eq!(graph.characters.len(), 2);
        let chihiro = graph.characters.iter().find(|c| c.name == "Chihiro Ogino").unwrap();
        assert_eq!(chihiro.description.as_deref(), Some("Crossover cameo."));
        let refs: Vec<String> = graph.appearances(chihiro).iter().map(Reference::curie).collect();
        assert_eq!(refs, vec!["series:future_boy_conan", "movie:spirited_away"]);
    }

    #[test]
    fn genres_and_studios_are_sorted_sets() {
        let graph = ResolvedGraph::resolve(sample());
        assert_eq!(
            graph.genres.iter().collect::<Vec<_>>(),
            vec!["Animation", "Drama", "Fantasy"]
        );
        assert_eq!(
            graph.studios.iter().collect::<Vec<_>>(),
            vec!["Nippon Animation", "Studio Ghibli"]
        );
    }

    #[test]
    fn empty_catalogs_resolve_to_empty_graph() {
        let graph = ResolvedGraph::resolve(Catalogs::default());
        assert!(graph.films.is_empty());
        assert!(graph.characters.is_empty());
        assert!(graph.genres.is_empty());
    }
}
