use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info};
use url::Url;

use crate::aggregate::CrawlState;
use crate::fetch::PageSource;
use crate::frontier::{self, Candidate, FrontierPlan};
use crate::model::{
    Character, Director, FilmCatalog, Series, SeriesCatalog, Short, ShortCatalog,
};
use crate::parser::extract::characters::{self, CharacterPageExtractor};
use crate::parser::extract::{
    CharacterCandidate, CharacterScan, DirectorExtractor, FilmExtractor, SeriesExtractor,
    ShortExtractor,
};
use crate::settings::Settings;

/// Crawl stats returned after each catalog pass.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ScrapeStats {
    /// Detail pages attempted.
    pub total: usize,
    pub ok: usize,
    /// Detail pages that could not be fetched.
    pub errors: usize,
    /// Fetched pages that did not look like a catalog entry.
    pub rejected: usize,
}

#[derive(Debug, Clone)]
pub struct CrawlOptions {
    pub base: Url,
    pub max_breadth: usize,
    pub max_characters: usize,
    pub director_details: bool,
}

impl CrawlOptions {
    pub fn from_settings(settings: &Settings, director_details: bool) -> Result<Self> {
        let base = Url::parse(&settings.base_url)
            .with_context(|| format!("Invalid base_url {}", settings.base_url))?;
        Ok(CrawlOptions {
            base,
            max_breadth: settings.max_breadth,
            max_characters: settings.max_characters,
            director_details,
        })
    }
}

/// Drives one crawl: frontier, detail pages, character pages, and the
/// run-scoped aggregation state. Pages are fetched strictly one at a time.
pub struct Crawler<S> {
    source: S,
    options: CrawlOptions,
    films: FilmExtractor,
    series: SeriesExtractor,
    shorts: ShortExtractor,
    characters: CharacterPageExtractor,
    directors: DirectorExtractor,
}

impl<S: PageSource> Crawler<S> {
    pub fn new(source: S, options: CrawlOptions) -> Self {
        let films = FilmExtractor::new();
        let series = SeriesExtractor::new();
        for chain in [&films.director, &films.year, &series.director, &series.episodes] {
            debug!(field = chain.field(), strategies = ?chain.strategy_names(), "extractor chain");
        }
        Crawler {
            source,
            options,
            films,
            series,
            shorts: ShortExtractor::new(),
            characters: CharacterPageExtractor::new(),
            directors: DirectorExtractor::new(),
        }
    }

    pub async fn crawl_films(&self) -> (FilmCatalog, ScrapeStats) {
        let mut state = CrawlState::new();
        let candidates = self.frontier(&FrontierPlan::FILMS).await;
        let mut stats = ScrapeStats {
            total: candidates.len(),
            ..Default::default()
        };
        let scan = CharacterScan::FILM.with_cap(self.options.max_characters);

        let pb = progress_bar(candidates.len());
        let mut movies = Vec::new();
        for candidate in candidates {
            pb.inc(1);
            let Some(doc) = self.source.fetch_or_skip(&candidate.url).await else {
                stats.errors += 1;
                continue;
            };
            let mut film =
                self.films
                    .extract(&candidate.title, &candidate.url, &self.options.base, &doc);
            let found = characters::discover(&doc, &self.options.base, &scan);
            drop(doc);

            film.characters = self.visit_characters(found, &film.title, &mut state).await;
            if let Some(name) = &film.director {
                state.directors.insert(Director::credited(
                    name,
                    film.director_url.clone(),
                    &film.title,
                ));
            }
            debug!(
                title = %film.title,
                characters = film.characters.len(),
                genres = film.genres.len(),
                "film extracted"
            );
            stats.ok += 1;
            movies.push(film);
        }
        pb.finish_and_clear();

        if self.options.director_details {
            self.enrich_directors(&mut state).await;
        }

        info!(
            "Crawled {} films ({} ok, {} errors), {} characters, {} directors",
            stats.total,
            stats.ok,
            stats.errors,
            state.characters.len(),
            state.directors.len()
        );
        let catalog = FilmCatalog {
            movies,
            characters: state.characters.into_records(),
            directors: state.directors.into_records(),
        };
        (catalog, stats)
    }

    pub async fn crawl_series(&self) -> (SeriesCatalog, ScrapeStats) {
        let mut state = CrawlState::new();
        let candidates = self.frontier(&FrontierPlan::SERIES).await;
        let mut stats = ScrapeStats {
            total: candidates.len(),
            ..Default::default()
        };
        let scan = CharacterScan::SERIES.with_cap(self.options.max_characters);

        let pb = progress_bar(candidates.len());
        let mut series: Vec<Series> = Vec::new();
        for candidate in candidates {
            pb.inc(1);
            let Some(doc) = self.source.fetch_or_skip(&candidate.url).await else {
                stats.errors += 1;
                continue;
            };
            let mut record =
                self.series
                    .extract(&candidate.title, &candidate.url, &self.options.base, &doc);
            if !record.has_substance() {
                debug!(title = %record.title, "not a series page, skipping");
                stats.rejected += 1;
                continue;
            }
            let found = characters::discover(&doc, &self.options.base, &scan);
            drop(doc);

            record.characters = self.visit_characters(found, &record.title, &mut state).await;
            stats.ok += 1;
            series.push(record);
        }
        pb.finish_and_clear();

        info!(
            "Crawled {} series candidates ({} kept, {} rejected, {} errors)",
            stats.total, stats.ok, stats.rejected, stats.errors
        );
        let catalog = SeriesCatalog {
            series,
            characters: state.characters.into_records(),
        };
        (catalog, stats)
    }

    pub async fn crawl_shorts(&self) -> (ShortCatalog, ScrapeStats) {
        let candidates = self.frontier(&FrontierPlan::SHORTS).await;
        let mut stats = ScrapeStats {
            total: candidates.len(),
            ..Default::default()
        };

        let pb = progress_bar(candidates.len());
        let mut shorts: Vec<Short> = Vec::new();
        for candidate in candidates {
            pb.inc(1);
            let Some(doc) = self.source.fetch_or_skip(&candidate.url).await else {
                stats.errors += 1;
                continue;
            };
            let record =
                self.shorts
                    .extract(&candidate.title, &candidate.url, &self.options.base, &doc);
            if !record.has_substance() {
                debug!(title = %record.title, "not a short film page, skipping");
                stats.rejected += 1;
                continue;
            }
            stats.ok += 1;
            shorts.push(record);
        }
        pb.finish_and_clear();

        info!(
            "Crawled {} short candidates ({} kept, {} rejected, {} errors)",
            stats.total, stats.ok, stats.rejected, stats.errors
        );
        (ShortCatalog { shorts }, stats)
    }

    async fn frontier(&self, plan: &FrontierPlan) -> Vec<Candidate> {
        frontier::discover(
            &self.source,
            plan,
            &self.options.base,
            self.options.max_breadth,
        )
        .await
    }

    /// Fetch each character's own page and fold the result into `state`.
    /// Returns the fragments as seen from `title`. A character whose page
    /// fails still counts, with only its name and link.
    async fn visit_characters(
        &self,
        found: Vec<CharacterCandidate>,
        title: &str,
        state: &mut CrawlState,
    ) -> Vec<Character> {
        let mut seen_here = Vec::with_capacity(found.len());
        for candidate in found {
            let profile = match self.source.fetch_or_skip(&candidate.url).await {
                Some(doc) => self.characters.profile(&doc),
                None => Default::default(),
            };
            let fragment = candidate.into_fragment(profile, title);
            state.characters.insert(fragment.clone());
            seen_here.push(fragment);
        }
        seen_here
    }

    /// One extra fetch per director with a known page.
    async fn enrich_directors(&self, state: &mut CrawlState) {
        let targets: Vec<(String, String)> = state
            .directors
            .iter()
            .filter_map(|(_, d)| Some((d.name.clone(), d.url.clone()?)))
            .collect();
        info!("Fetching {} director pages", targets.len());

        for (name, url) in targets {
            let Some(doc) = self.source.fetch_or_skip(&url).await else {
                continue;
            };
            let profile = self.directors.profile(&doc);
            state.directors.insert(profile.into_fragment(&name));
        }
    }
}

fn progress_bar(len: usize) -> ProgressBar {
    let pb = ProgressBar::new(len as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40} {pos}/{len} ({per_sec}, eta {eta})")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=> "),
    );
    pb
}
