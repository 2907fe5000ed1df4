use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Which catalog a title belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CatalogKind {
    Film,
    Series,
    Short,
}

impl CatalogKind {
    /// Namespace prefix used for subjects of this kind in the output document.
    pub fn prefix(self) -> &'static str {
        match self {
            CatalogKind::Film => "movie",
            CatalogKind::Series => "series",
            CatalogKind::Short => "short",
        }
    }

    pub fn rdf_type(self) -> &'static str {
        match self {
            CatalogKind::Film => "ghibli:Film",
            CatalogKind::Series => "ghibli:Series",
            CatalogKind::Short => "ghibli:ShortFilm",
        }
    }
}

// ── Catalog records ──

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Film {
    pub title: String,
    pub url: Option<String>,
    pub release_year: Option<i32>,
    pub director: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub director_url: Option<String>,
    pub duration: Option<String>,
    pub description: Option<String>,
    pub synopsis: Option<String>,
    pub poster_url: Option<String>,
    #[serde(default)]
    pub genres: Vec<String>,
    #[serde(default)]
    pub characters: Vec<Character>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Series {
    pub title: String,
    pub url: Option<String>,
    pub director: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub director_url: Option<String>,
    pub release_date: Option<String>,
    pub release_year: Option<i32>,
    pub episodes: Option<u32>,
    pub running_time: Option<String>,
    pub studio: Option<String>,
    pub description: Option<String>,
    pub plot: Option<String>,
    pub poster_url: Option<String>,
    #[serde(default)]
    pub characters: Vec<Character>,
}

impl Series {
    /// Listing pages link plenty of non-series articles; keep only pages
    /// that told us something.
    pub fn has_substance(&self) -> bool {
        self.director.is_some()
            || self.episodes.is_some()
            || self.description.is_some()
            || self.plot.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Short {
    pub title: String,
    pub url: Option<String>,
    pub director: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub director_url: Option<String>,
    pub release_date: Option<String>,
    pub release_year: Option<i32>,
    pub duration: Option<String>,
    pub studio: Option<String>,
    pub description: Option<String>,
    pub plot: Option<String>,
    pub poster_url: Option<String>,
}

impl Short {
    pub fn has_substance(&self) -> bool {
        self.duration.is_some() || self.director.is_some()
    }
}

// ── People ──

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Character {
    pub name: String,
    pub url: Option<String>,
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    #[serde(default)]
    pub appears_in: BTreeSet<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Director {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub born: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub birth_year: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nationality: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub history: Option<String>,
    #[serde(rename = "notable_works", default)]
    pub works: BTreeSet<String>,
}

impl Director {
    /// A fragment that only knows the director directed `title`.
    pub fn credited(name: &str, url: Option<String>, title: &str) -> Self {
        Director {
            name: name.to_string(),
            url,
            works: BTreeSet::from([title.to_string()]),
            ..Default::default()
        }
    }
}

// ── Interchange files ──

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilmCatalog {
    #[serde(default)]
    pub movies: Vec<Film>,
    #[serde(default)]
    pub characters: Vec<Character>,
    #[serde(default)]
    pub directors: Vec<Director>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SeriesCatalog {
    #[serde(default)]
    pub series: Vec<Series>,
    #[serde(default)]
    pub characters: Vec<Character>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ShortCatalog {
    #[serde(default)]
    pub shorts: Vec<Short>,
}
