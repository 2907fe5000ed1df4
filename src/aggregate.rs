use std::collections::btree_map::Entry;
use std::collections::BTreeMap;

use tracing::warn;

use crate::model::{Character, Director};
use crate::slug::slugify;

/// A record that can absorb a later fragment of itself.
pub trait Fragment {
    fn name(&self) -> &str;
    fn absorb(&mut self, incoming: Self);
}

/// Richer wins: replace only with a non-empty, strictly longer value.
/// Equal lengths keep what was seen first.
fn keep_richer(current: &mut Option<String>, incoming: Option<String>) {
    let Some(new) = incoming.filter(|v| !v.is_empty()) else {
        return;
    };
    let current_len = current.as_deref().map_or(0, |c| c.chars().count());
    if new.chars().count() > current_len {
        *current = Some(new);
    }
}

impl Fragment for Character {
    fn name(&self) -> &str {
        &self.name
    }

    fn absorb(&mut self, incoming: Self) {
        self.appears_in.extend(incoming.appears_in);
        keep_richer(&mut self.url, incoming.url);
        keep_richer(&mut self.description, incoming.description);
        keep_richer(&mut self.image_url, incoming.image_url);
        keep_richer(&mut self.age, incoming.age);
        keep_richer(&mut self.gender, incoming.gender);
    }
}

impl Fragment for Director {
    fn name(&self) -> &str {
        &self.name
    }

    fn absorb(&mut self, incoming: Self) {
        self.works.extend(incoming.works);
        keep_richer(&mut self.url, incoming.url);
        keep_richer(&mut self.born, incoming.born);
        self.birth_year = self.birth_year.or(incoming.birth_year);
        keep_richer(&mut self.nationality, incoming.nationality);
        keep_richer(&mut self.description, incoming.description);
        keep_richer(&mut self.history, incoming.history);
    }
}

/// Canonical records keyed by the slug of their name.
#[derive(Debug, Clone)]
pub struct Registry<T> {
    records: BTreeMap<String, T>,
}

impl<T> Default for Registry<T> {
    fn default() -> Self {
        Registry {
            records: BTreeMap::new(),
        }
    }
}

impl<T: Fragment> Registry<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold a fragment in. Distinct names sharing a slug are merged anyway
    /// (best effort), but the collision is logged.
    pub fn insert(&mut self, fragment: T) {
        let slug = slugify(fragment.name());
        match self.records.entry(slug) {
            Entry::Vacant(slot) => {
                slot.insert(fragment);
            }
            Entry::Occupied(mut slot) => {
                let existing = slot.get_mut();
                if existing.name() != fragment.name() {
                    warn!(
                        slug = %slugify(fragment.name()),
                        kept = existing.name(),
                        merged = fragment.name(),
                        "slug collision, merging records"
                    );
                }
                existing.absorb(fragment);
            }
        }
    }

    #[cfg(test)]
    pub fn get(&self, slug: &str) -> Option<&T> {
        self.records.get(slug)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &T)> {
        self.records.iter()
    }

    pub fn into_records(self) -> Vec<T> {
        self.records.into_values().collect()
    }
}

impl<T: Fragment> Extend<T> for Registry<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for fragment in iter {
            self.insert(fragment);
        }
    }
}

impl<T: Fragment> FromIterator<T> for Registry<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut registry = Registry::new();
        registry.extend(iter);
        registry
    }
}

/// Everything one crawl run has learned about people so far. Owned by the
/// crawl driver and handed to each page visit; dropped when the run ends.
#[derive(Debug, Default)]
pub struct CrawlState {
    pub characters: Registry<Character>,
    pub directors: Registry<Director>,
}

impl CrawlState {
    pub fn new() -> Self {
        Self::default()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;

    fn character(name: &str, title: &str, description: Option<&str>) -> Character {
        Character {
            name: name.into(),
            description: description.map(String::from),
            appears_in: BTreeSet::from([title.to_string()]),
            ..Default::default()
        }
    }

    #[test]
    fn appearances_union_in_any_order() {
        let a = character("Totoro", "A", None);
        let b = character("Totoro", "B", None);

        let ab: Registry<Character> = [a.clone(), b.clone()].into_iter().collect();
        let ba: Registry<Character> = [b, a].into_iter().collect();

        let expected = BTreeSet::from(["A".to_string(), "B".to_string()]);
        assert_eq!(ab.get("totoro").unwrap().appears_in, expected);
        assert_eq!(ba.get("totoro").unwrap().appears_in, expected);
    }

    #[test]
    fn duplicate_titles_collapse() {
        let mut reg = Registry::new();
        reg.insert(character("Totoro", "My Neighbor Totoro", None));
        reg.insert(character("Totoro", "My Neighbor Totoro", None));
        assert_eq!(reg.len(), 1);
        assert_eq!(reg.get("totoro").unwrap().appears_in.len(), 1);
    }

    #[test]
    fn longer_description_wins() {
        let short = "s".repeat(40);
        let long = "l".repeat(120);
        for order in [[&short, &long], [&long, &short]] {
            let mut reg = Registry::new();
            reg.insert(character("San", "Princess Mononoke", Some(order[0])));
            reg.insert(character("San", "Princess Mononoke", Some(order[1])));
            assert_eq!(reg.get("san").unwrap().description.as_deref(), Some(long.as_str()));
        }
    }

    #[test]
    fn equal_length_keeps_first_seen() {
        let mut reg = Registry::new();
        reg.insert(character("Kiki", "X", Some("first")));
        reg.insert(character("Kiki", "Y", Some("later")));
        assert_eq!(reg.get("kiki").unwrap().description.as_deref(), Some("first"));
    }

    #[test]
    fn empty_incoming_never_erases() {
        let mut reg = Registry::new();
        reg.insert(character("Jiji", "X", Some("A black cat.")));
        reg.insert(character("Jiji", "Y", Some("")));
        reg.insert(character("Jiji", "Z", None));
        let jiji = reg.get("jiji").unwrap();
        assert_eq!(jiji.description.as_deref(), Some("A black cat."));
        assert_eq!(jiji.appears_in.len(), 3);
    }

    #[test]
    fn slug_collision_merges_and_keeps_base_name() {
        let mut reg = Registry::new();
        reg.insert(character("No-Face", "Spirited Away", None));
        reg.insert(character("No Face?", "Other", None));
        reg.insert(character("Noface", "Third", None));
        // "No-Face" and "No Face?" differ in slug ("no-face" vs "no_face"), "Noface" is its own
        assert_eq!(reg.len(), 3);

        let mut reg = Registry::new();
        reg.insert(character("Haku!", "Spirited Away", None));
        reg.insert(character("Haku", "Other", None));
        assert_eq!(reg.len(), 1);
        let haku = reg.get("haku").unwrap();
        assert_eq!(haku.name, "Haku!");
        assert_eq!(haku.appears_in.len(), 2);
    }

    #[test]
    fn directors_union_works() {
        let mut reg = Registry::new();
        reg.insert(Director::credited("Isao Takahata", None, "Pom Poko"));
        reg.insert(Director::credited(
            "Isao Takahata",
            Some("https://ghibli.fandom.com/wiki/Isao_Takahata".into()),
            "Only Yesterday",
        ));
        let d = reg.get("isao_takahata").unwrap();
        assert_eq!(d.works.len(), 2);
        assert!(d.url.is_some());
    }

    #[test]
    fn birth_year_keeps_first_known_and_history_keeps_richer() {
        let mut reg = Registry::new();
        reg.insert(Director::credited("Isao Takahata", None, "Pom Poko"));
        reg.insert(Director {
            birth_year: Some(1935),
            history: Some("Joined Toei.".into()),
            ..Director::credited("Isao Takahata", None, "Only Yesterday")
        });
        reg.insert(Director {
            birth_year: Some(1936),
            history: Some("Joined Toei Doga in 1959 and later co-founded Ghibli.".into()),
            ..Director::credited("Isao Takahata", None, "Pom Poko")
        });
        let d = reg.get("isao_takahata").unwrap();
        assert_eq!(d.birth_year, Some(1935));
        assert_eq!(
            d.history.as_deref(),
            Some("Joined Toei Doga in 1959 and later co-founded Ghibli.")
        );
    }
}
