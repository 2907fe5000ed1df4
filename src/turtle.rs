use std::fmt::Display;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use tracing::info;

use crate::model::CatalogKind;
use crate::resolve::ResolvedGraph;
use crate::slug::slugify;

pub const NAMESPACES: &[(&str, &str)] = &[
    ("ghibli", "http://ghibliwiki.org/ontology#"),
    ("movie", "http://ghibliwiki.org/movie/"),
    ("series", "http://ghibliwiki.org/series/"),
    ("short", "http://ghibliwiki.org/short/"),
    ("char", "http://ghibliwiki.org/character/"),
    ("director", "http://ghibliwiki.org/director/"),
    ("genre", "http://ghibliwiki.org/genre/"),
    ("studio", "http://ghibliwiki.org/studio/"),
    ("rdf", "http://www.w3.org/1999/02/22-rdf-syntax-ns#"),
    ("rdfs", "http://www.w3.org/2000/01/rdf-schema#"),
    ("xsd", "http://www.w3.org/2001/XMLSchema#"),
    ("owl", "http://www.w3.org/2002/07/owl#"),
];

/// Escape text for a double-quoted literal.
pub fn escape_literal(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            _ => out.push(ch),
        }
    }
    out
}

/// One subject with its predicate lines. Absent and empty values are
/// skipped; the last line is terminated with `.` instead of `;`.
struct Block {
    lines: Vec<String>,
}

impl Block {
    fn new(subject: String, rdf_type: &str) -> Self {
        Block {
            lines: vec![format!("{} a {} ;", subject, rdf_type)],
        }
    }

    fn push(&mut self, predicate: &str, object: String) {
        self.lines
            .push(format!("    ghibli:{} {} ;", predicate, object));
    }

    fn literal(&mut self, predicate: &str, value: Option<&str>) -> &mut Self {
        if let Some(v) = value.filter(|v| !v.is_empty()) {
            self.push(predicate, format!("\"{}\"", escape_literal(v)));
        }
        self
    }

    fn number(&mut self, predicate: &str, value: Option<impl Display>) -> &mut Self {
        if let Some(v) = value {
            self.push(predicate, v.to_string());
        }
        self
    }

    fn iri(&mut self, predicate: &str, value: Option<&str>) -> &mut Self {
        if let Some(v) = value.filter(|v| !v.is_empty()) {
            self.push(predicate, format!("<{}>", v));
        }
        self
    }

    /// A prefixed-name object, e.g. `director:hayao_miyazaki`.
    fn link(&mut self, predicate: &str, prefix: &str, name: &str) -> &mut Self {
        self.push(predicate, format!("{}:{}", prefix, slugify(name)));
        self
    }

    fn finish(self) -> String {
        let mut lines = self.lines;
        if let Some(last) = lines.last_mut() {
            if let Some(open) = last.strip_suffix(" ;") {
                *last = format!("{} .", open);
            }
        }
        lines.push(String::new());
        lines.join("\n")
    }
}

fn section(title: &str, blocks: Vec<String>) -> String {
    let mut out = vec![
        "# ==============================".to_string(),
        format!("# {}", title),
        "# ==============================\n".to_string(),
    ];
    out.extend(blocks);
    out.join("\n")
}

fn header(generated: DateTime<Local>) -> String {
    let mut lines = vec![
        "# Ghibli Wiki RDF Dataset".to_string(),
        format!("# Generated: {}", generated.format("%Y-%m-%d %H:%M:%S")),
        "# Source: Ghibli Fandom Wiki".to_string(),
        String::new(),
    ];
    lines.extend(
        NAMESPACES
            .iter()
            .map(|(prefix, uri)| format!("@prefix {}: <{}> .", prefix, uri)),
    );
    lines.push(String::new());
    lines.join("\n")
}

fn subject(kind: CatalogKind, title: &str) -> String {
    format!("{}:{}", kind.prefix(), slugify(title))
}

fn films(graph: &ResolvedGraph) -> Vec<String> {
    graph
        .films
        .iter()
        .map(|film| {
            let mut b = Block::new(subject(CatalogKind::Film, &film.title), CatalogKind::Film.rdf_type());
            b.literal("title", Some(film.title.as_str()))
                .number("releaseYear", film.release_year);
            if let Some(director) = film.director.as_deref().filter(|d| !d.is_empty()) {
                b.link("hasDirector", "director", director);
            }
            b.literal("duration", film.duration.as_deref())
                .literal("description", film.description.as_deref())
                .literal("synopsis", film.synopsis.as_deref())
                .iri("posterURL", film.poster_url.as_deref());
            for genre in &film.genres {
                b.link("hasGenre", "genre", genre);
            }
            for character in &film.characters {
                b.link("hasCharacter", "char", &character.name);
            }
            b.finish()
        })
        .collect()
}

fn series(graph: &ResolvedGraph) -> Vec<String> {
    graph
        .series
        .iter()
        .map(|s| {
            let mut b = Block::new(subject(CatalogKind::Series, &s.title), CatalogKind::Series.rdf_type());
            b.literal("title", Some(s.title.as_str()))
                .number("releaseYear", s.release_year)
                .literal("releaseDate", s.release_date.as_deref());
            if let Some(director) = s.director.as_deref().filter(|d| !d.is_empty()) {
                b.link("hasDirector", "director", director);
            }
            b.number("numberOfEpisodes", s.episodes)
                .literal("runningTime", s.running_time.as_deref());
            if let Some(studio) = s.studio.as_deref().filter(|d| !d.is_empty()) {
                b.link("producedBy", "studio", studio);
            }
            b.literal("description", s.description.as_deref())
                .literal("plot", s.plot.as_deref())
                .iri("posterURL", s.poster_url.as_deref());
            for character in &s.characters {
                b.link("hasCharacter", "char", &character.name);
            }
            b.finish()
        })
        .collect()
}

fn shorts(graph: &ResolvedGraph) -> Vec<String> {
    graph
        .shorts
        .iter()
        .map(|s| {
            let mut b = Block::new(subject(CatalogKind::Short, &s.title), CatalogKind::Short.rdf_type());
            b.literal("title", Some(s.title.as_str()))
                .number("releaseYear", s.release_year)
                .literal("releaseDate", s.release_date.as_deref());
            if let Some(director) = s.director.as_deref().filter(|d| !d.is_empty()) {
                b.link("hasDirector", "director", director);
            }
            b.literal("duration", s.duration.as_deref());
            if let Some(studio) = s.studio.as_deref().filter(|d| !d.is_empty()) {
                b.link("producedBy", "studio", studio);
            }
            b.literal("description", s.description.as_deref())
                .literal("plot", s.plot.as_deref())
                .iri("posterURL", s.poster_url.as_deref());
            b.finish()
        })
        .collect()
}

fn characters(graph: &ResolvedGraph) -> Vec<String> {
    graph
        .characters
        .iter()
        .map(|c| {
            let mut b = Block::new(format!("char:{}", slugify(&c.name)), "ghibli:Character");
            b.literal("name", Some(c.name.as_str()))
                .literal("age", c.age.as_deref())
                .literal("gender", c.gender.as_deref())
                .literal("description", c.description.as_deref())
                .iri("imageURL", c.image_url.as_deref());
            for reference in graph.appearances(c) {
                b.push("appearsIn", reference.curie());
            }
            b.finish()
        })
        .collect()
}

fn directors(graph: &ResolvedGraph) -> Vec<String> {
    graph
        .directors
        .iter()
        .map(|d| {
            let mut b = Block::new(format!("director:{}", slugify(&d.name)), "ghibli:Director");
            b.literal("name", Some(d.name.as_str()))
                .literal("born", d.born.as_deref())
                .number("birthYear", d.birth_year)
                .literal("nationality", d.nationality.as_deref())
                .literal("description", d.description.as_deref())
                .literal("history", d.history.as_deref())
                .iri("wikiURL", d.url.as_deref());
            for reference in graph.works(d) {
                b.push("directs", reference.curie());
            }
            b.finish()
        })
        .collect()
}

fn named(prefix: &str, rdf_type: &str, names: impl Iterator<Item = impl AsRef<str>>) -> Vec<String> {
    names
        .map(|name| {
            let name = name.as_ref();
            let mut b = Block::new(format!("{}:{}", prefix, slugify(name)), rdf_type);
            b.literal("name", Some(name));
            b.finish()
        })
        .collect()
}

/// The whole document. Catalog sections are left out when empty; the
/// people and vocabulary sections always carry their heading.
pub fn render(graph: &ResolvedGraph, generated: DateTime<Local>) -> String {
    let mut parts = vec![header(generated)];
    for (title, blocks) in [
        ("FILMS", films(graph)),
        ("TV SERIES", series(graph)),
        ("SHORT FILMS", shorts(graph)),
    ] {
        if !blocks.is_empty() {
            parts.push(section(title, blocks));
        }
    }
    parts.push(section("CHARACTERS", characters(graph)));
    parts.push(section("DIRECTORS", directors(graph)));
    parts.push(section(
        "GENRES",
        named("genre", "ghibli:Genre", graph.genres.iter()),
    ));
    parts.push(section(
        "STUDIOS",
        named("studio", "ghibli:Studio", graph.studios.iter()),
    ));
    parts.join("\n")
}

pub fn write(path: &Path, graph: &ResolvedGraph) -> Result<()> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir).with_context(|| format!("Failed to create {}", dir.display()))?;
    }
    let doc = render(graph, Local::now());
    fs::write(path, &doc).with_context(|| format!("Failed to write {}", path.display()))?;
    info!(bytes = doc.len(), "Saved {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use chrono::TimeZone;

    use super::*;
    use crate::model::*;
    use crate::resolve::Catalogs;

    fn at() -> DateTime<Local> {
        Local.with_ymd_and_hms(2024, 3, 1, 9, 30, 0).unwrap()
    }

    fn graph() -> ResolvedGraph {
        let chihiro = Character {
            name: "Chihiro Ogino".into(),
            description: Some("Says \"hello\"\nthen leaves".into()),
            age: Some("10".into()),
            appears_in: BTreeSet::from(["Spirited Away".to_string(), "Unlisted Work".to_string()]),
            ..Default::default()
        };
        ResolvedGraph::resolve(Catalogs {
            films: FilmCatalog {
                movies: vec![Film {
                    title: "Spirited Away".into(),
                    url: Some("https://ghibli.fandom.com/wiki/Spirited_Away".into()),
                    release_year: Some(2001),
                    director: Some("Hayao Miyazaki".into()),
                    director_url: Some("https://ghibli.fandom.com/wiki/Hayao_Miyazaki".into()),
                    duration: Some("125 minutes".into()),
                    description: None,
                    synopsis: None,
                    poster_url: Some("https://img.example/sa.png".into()),
                    genres: vec!["Fantasy".into(), "Animation".into()],
                    characters: vec![chihiro.clone()],
                }],
                characters: vec![chihiro],
                directors: Vec::new(),
            },
            series: SeriesCatalog::default(),
            shorts: ShortCatalog {
                shorts: vec![Short {
                    title: "Koro's Big Day Out".into(),
                    url: None,
                    director: Some("Hayao Miyazaki".into()),
                    director_url: None,
                    release_date: None,
                    release_year: None,
                    duration: Some("14 minutes".into()),
                    studio: Some("Studio Ghibli".into()),
                    description: None,
                    plot: None,
                    poster_url: None,
                }],
            },
        })
    }

    #[test]
    fn escaping() {
        assert_eq!(escape_literal(r#"a\b "c""#), r#"a\\b \"c\""#);
        assert_eq!(escape_literal("x\r\ny"), "x\\r\\ny");
        assert_eq!(escape_literal(""), "");
    }

    #[test]
    fn block_ends_with_period() {
        let mut b = Block::new("genre:fantasy".into(), "ghibli:Genre");
        b.literal("name", Some("Fantasy")).literal("missing", None);
        assert_eq!(b.finish(), "genre:fantasy a ghibli:Genre ;\n    ghibli:name \"Fantasy\" .\n");
    }

    #[test]
    fn header_and_prefixes() {
        let doc = render(&graph(), at());
        assert!(doc.starts_with(
            "# Ghibli Wiki RDF Dataset\n# Generated: 2024-03-01 09:30:00\n# Source: Ghibli Fandom Wiki\n\n@prefix ghibli: <http://ghibliwiki.org/ontology#> .\n"
        ));
        assert_eq!(doc.matches("@prefix ").count(), NAMESPACES.len());
    }

    #[test]
    fn film_block() {
        let doc = render(&graph(), at());
        let expected = "\
movie:spirited_away a ghibli:Film ;
    ghibli:title \"Spirited Away\" ;
    ghibli:releaseYear 2001 ;
    ghibli:hasDirector director:hayao_miyazaki ;
    ghibli:duration \"125 minutes\" ;
    ghibli:posterURL <https://img.example/sa.png> ;
    ghibli:hasGenre genre:fantasy ;
    ghibli:hasGenre genre:animation ;
    ghibli:hasCharacter char:chihiro_ogino .
";
        assert!(doc.contains(expected), "{doc}");
    }

    #[test]
    fn people_blocks_resolve_references() {
        let doc = render(&graph(), at());
        assert!(doc.contains("    ghibli:description \"Says \\\"hello\\\"\\nthen leaves\" ;"));
        assert!(doc.contains("    ghibli:appearsIn movie:spirited_away ;\n    ghibli:appearsIn movie:unlisted_work .\n"));
        assert!(doc.contains("    ghibli:wikiURL <https://ghibli.fandom.com/wiki/Hayao_Miyazaki> ;"));
        assert!(doc.contains("    ghibli:directs short:koros_big_day_out ;\n    ghibli:directs movie:spirited_away .\n"));
        assert!(doc.contains("studio:studio_ghibli a ghibli:Studio ;\n    ghibli:name \"Studio Ghibli\" .\n"));
    }

    #[test]
    fn director_block_carries_birth_year_and_history() {
        let mut catalogs = Catalogs::default();
        catalogs.films.directors.push(Director {
            born: Some("October 29, 1935".into()),
            birth_year: Some(1935),
            nationality: Some("Japanese".into()),
            history: Some("Joined \"Toei\" in 1959".into()),
            ..Director::credited("Isao Takahata", None, "Pom Poko")
        });
        let doc = render(&ResolvedGraph::resolve(catalogs), at());
        let expected = "\
director:isao_takahata a ghibli:Director ;
    ghibli:name \"Isao Takahata\" ;
    ghibli:born \"October 29, 1935\" ;
    ghibli:birthYear 1935 ;
    ghibli:nationality \"Japanese\" ;
    ghibli:history \"Joined \\\"Toei\\\" in 1959\" ;
    ghibli:directs movie:pom_poko .
";
        assert!(doc.contains(expected), "{doc}");
    }

    #[test]
    fn empty_catalog_sections_are_omitted() {
        let doc = render(&graph(), at());
        assert!(doc.contains("# FILMS"));
        assert!(!doc.contains("# TV SERIES"));
        assert!(doc.contains("# SHORT FILMS"));

        let empty = render(&ResolvedGraph::resolve(Catalogs::default()), at());
        assert!(!empty.contains("# FILMS"));
        assert!(empty.contains("# CHARACTERS"));
        assert!(empty.contains("# STUDIOS"));
    }

    #[test]
    fn write_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out").join("ghibli-dataset.ttl");
        write(&path, &graph()).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("movie:spirited_away a ghibli:Film ;"));
    }
}
