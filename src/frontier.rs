use std::collections::HashSet;
use std::sync::LazyLock;

use scraper::{Html, Selector};
use tracing::{debug, info, warn};
use url::Url;

use crate::fetch::PageSource;
use crate::model::CatalogKind;
use crate::parser::document::{absolute, compact_text, content, is_article_href, links};
use crate::parser::sections::keyword_sections;

static MEMBER_LINK_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a.category-page__member-link").unwrap());

const NAVIGATION_WORDS: &[&str] = &["category", "file", "special", "help"];
const MIN_TITLE_CHARS: usize = 3;

/// A page reference found on a listing page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub title: String,
    pub url: String,
}

impl Candidate {
    fn new(title: impl Into<String>, url: impl Into<String>) -> Self {
        Candidate {
            title: title.into(),
            url: url.into(),
        }
    }
}

/// One way of reading candidate links off a listing page.
#[derive(Debug, Clone, Copy)]
pub enum ListingStrategy {
    /// Member links of a category page.
    CategoryMembers,
    /// Every article link in the body, minus navigation-looking ones.
    ContentLinks,
    /// Article links under h2/h3 headings mentioning one of the keywords.
    SectionLinks {
        heading_keywords: &'static [&'static str],
    },
}

impl ListingStrategy {
    pub fn name(&self) -> &'static str {
        match self {
            ListingStrategy::CategoryMembers => "category_members",
            ListingStrategy::ContentLinks => "content_links",
            ListingStrategy::SectionLinks { .. } => "section_links",
        }
    }

    pub fn harvest(&self, doc: &Html, base: &Url) -> Vec<Candidate> {
        match self {
            ListingStrategy::CategoryMembers => doc
                .select(&MEMBER_LINK_SEL)
                .filter_map(|a| {
                    let href = a.value().attr("href")?;
                    if !href.contains("/wiki/") || href.contains(':') {
                        return None;
                    }
                    Some(Candidate::new(compact_text(a), absolute(base, href)?))
                })
                .collect(),
            ListingStrategy::ContentLinks => {
                let Some(body) = content(doc) else {
                    return Vec::new();
                };
                links(body)
                    .filter_map(|a| {
                        let href = a.value().attr("href")?;
                        let title = compact_text(a);
                        if !is_article_href(href) || title.chars().count() < MIN_TITLE_CHARS {
                            return None;
                        }
                        let low = title.to_lowercase();
                        if NAVIGATION_WORDS.iter().any(|w| low.contains(w)) {
                            return None;
                        }
                        Some(Candidate::new(title, absolute(base, href)?))
                    })
                    .collect()
            }
            ListingStrategy::SectionLinks { heading_keywords } => {
                keyword_sections(doc, heading_keywords)
                    .into_iter()
                    .flat_map(links)
                    .filter_map(|a| {
                        let href = a.value().attr("href")?;
                        let title = compact_text(a);
                        if !is_article_href(href) || title.chars().count() < MIN_TITLE_CHARS {
                            return None;
                        }
                        Some(Candidate::new(title, absolute(base, href)?))
                    })
                    .collect()
            }
        }
    }
}

/// Where and how to look for one catalog's pages.
#[derive(Debug)]
pub struct FrontierPlan {
    pub kind: CatalogKind,
    pub seeds: &'static [&'static str],
    pub strategies: &'static [ListingStrategy],
    /// (title, path) pairs that listing pages are known to miss.
    pub known: &'static [(&'static str, &'static str)],
}

impl FrontierPlan {
    pub const FILMS: FrontierPlan = FrontierPlan {
        kind: CatalogKind::Film,
        seeds: &[
            "/wiki/Category:Films",
            "/wiki/List_of_Studio_Ghibli_films",
            "/wiki/Studio_Ghibli_films",
            "/wiki/Studio_Ghibli",
            "/wiki/Category:Studio_Ghibli_films",
        ],
        strategies: &[ListingStrategy::CategoryMembers, ListingStrategy::ContentLinks],
        known: &[],
    };

    pub const SERIES: FrontierPlan = FrontierPlan {
        kind: CatalogKind::Series,
        seeds: &[
            "/wiki/Category:Television_series",
            "/wiki/Category:Series",
            "/wiki/Studio_Ghibli",
            "/wiki/List_of_Studio_Ghibli_films",
        ],
        strategies: &[
            ListingStrategy::CategoryMembers,
            ListingStrategy::SectionLinks {
                heading_keywords: &["television", "tv", "series"],
            },
        ],
        known: &[
            (
                "Ronja, the Robber's Daughter",
                "/wiki/Ronja,_the_Robber%27s_Daughter",
            ),
            ("Sherlock Hound", "/wiki/Sherlock_Hound"),
            ("Film Guru Guru", "/wiki/Film_Guru_Guru"),
        ],
    };

    pub const SHORTS: FrontierPlan = FrontierPlan {
        kind: CatalogKind::Short,
        seeds: &[
            "/wiki/Category:Short_films",
            "/wiki/Category:Shorts",
            "/wiki/Studio_Ghibli",
            "/wiki/List_of_Studio_Ghibli_films",
        ],
        strategies: &[
            ListingStrategy::CategoryMembers,
            ListingStrategy::SectionLinks {
                heading_keywords: &["short"],
            },
        ],
        known: &[],
    };
}

/// Canonical form of a page URL for deduplication: no fragment, no
/// trailing slash.
pub fn normalize_url(raw: &str) -> String {
    let normalized = match Url::parse(raw) {
        Ok(mut url) => {
            url.set_fragment(None);
            url.to_string()
        }
        Err(_) => raw.to_string(),
    };
    match normalized.strip_suffix('/') {
        Some(trimmed) => trimmed.to_string(),
        None => normalized,
    }
}

/// Deduplicated, bounded candidate set for one discovery pass. Lives only
/// as long as the pass.
#[derive(Debug)]
pub struct Frontier {
    cap: usize,
    seen: HashSet<String>,
    candidates: Vec<Candidate>,
}

impl Frontier {
    pub fn new(cap: usize) -> Self {
        Frontier {
            cap,
            seen: HashSet::new(),
            candidates: Vec::new(),
        }
    }

    /// Accepts `candidate` unless its URL was already seen or the frontier
    /// is full.
    pub fn offer(&mut self, candidate: Candidate) -> bool {
        if self.is_full() {
            return false;
        }
        if !self.seen.insert(normalize_url(&candidate.url)) {
            return false;
        }
        self.candidates.push(candidate);
        true
    }

    pub fn extend(&mut self, candidates: impl IntoIterator<Item = Candidate>) -> usize {
        let mut added = 0;
        for candidate in candidates {
            if self.offer(candidate) {
                added += 1;
            }
        }
        added
    }

    pub fn is_full(&self) -> bool {
        self.candidates.len() >= self.cap
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn into_candidates(self) -> Vec<Candidate> {
        self.candidates
    }
}

/// Walk the plan's seeds in order. The first seed on which some strategy
/// finds links ends the pass.
pub async fn discover<S: PageSource>(
    source: &S,
    plan: &FrontierPlan,
    base: &Url,
    cap: usize,
) -> Vec<Candidate> {
    let mut frontier = Frontier::new(cap);
    frontier.extend(plan.known.iter().filter_map(|(title, path)| match base.join(path) {
        Ok(url) => Some(Candidate::new(*title, url.as_str())),
        Err(e) => {
            warn!(path, error = %e, "Invalid known path");
            None
        }
    }));

    for seed in plan.seeds {
        let Ok(seed_url) = base.join(seed) else {
            warn!(seed, "Invalid seed path");
            continue;
        };
        let Some(doc) = source.fetch_or_skip(seed_url.as_str()).await else {
            continue;
        };

        let harvested = plan.strategies.iter().find_map(|strategy| {
            let found = strategy.harvest(&doc, base);
            (!found.is_empty()).then(|| (strategy.name(), found))
        });
        let Some((strategy, found)) = harvested else {
            debug!(seed, "No candidates on listing page");
            continue;
        };

        let raw = found.len();
        let added = frontier.extend(found);
        info!(seed, strategy, raw, added, "Listing page yielded candidates");
        break;
    }

    info!(kind = ?plan.kind, candidates = frontier.len(), "Frontier ready");
    frontier.into_candidates()
}
