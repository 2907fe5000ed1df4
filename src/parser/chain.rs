use scraper::Html;
use tracing::trace;

/// One extraction heuristic. Pure: reads the document, never changes it.
pub trait Strategy<T>: Send + Sync {
    fn name(&self) -> &'static str;
    fn attempt(&self, doc: &Html) -> Option<T>;
}

/// Ordered fallback list for one field. The first strategy that produces a
/// value wins; when every strategy misses the field is absent.
pub struct Chain<T> {
    field: &'static str,
    strategies: Vec<Box<dyn Strategy<T>>>,
}

impl<T> Chain<T> {
    pub fn new(field: &'static str) -> Self {
        Chain {
            field,
            strategies: Vec::new(),
        }
    }

    pub fn then(mut self, strategy: impl Strategy<T> + 'static) -> Self {
        self.strategies.push(Box::new(strategy));
        self
    }

    pub fn field(&self) -> &'static str {
        self.field
    }

    /// Strategy names in priority order.
    pub fn strategy_names(&self) -> Vec<&'static str> {
        self.strategies.iter().map(|s| s.name()).collect()
    }

    pub fn run(&self, doc: &Html) -> Option<T> {
        self.run_traced(doc).map(|(value, _)| value)
    }

    /// Like [`Chain::run`], also reporting which strategy produced the value.
    pub fn run_traced(&self, doc: &Html) -> Option<(T, &'static str)> {
        for strategy in &self.strategies {
            if let Some(value) = strategy.attempt(doc) {
                trace!(field = self.field, strategy = strategy.name(), "hit");
                return Some((value, strategy.name()));
            }
        }
        trace!(field = self.field, "no strategy matched");
        None
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use super::*;

    struct Fixed(&'static str, Option<&'static str>, Arc<AtomicUsize>);

    impl Strategy<String> for Fixed {
        fn name(&self) -> &'static str {
            self.0
        }
        fn attempt(&self, _doc: &Html) -> Option<String> {
            self.2.fetch_add(1, Ordering::SeqCst);
            self.1.map(String::from)
        }
    }

    #[test]
    fn first_hit_short_circuits() {
        let calls = Arc::new(AtomicUsize::new(0));
        let chain = Chain::new("director")
            .then(Fixed("miss", None, calls.clone()))
            .then(Fixed("hit", Some("A"), calls.clone()))
            .then(Fixed("later", Some("B"), calls.clone()));
        let doc = Html::parse_document("");
        assert_eq!(chain.run_traced(&doc), Some(("A".to_string(), "hit")));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(chain.strategy_names(), vec!["miss", "hit", "later"]);
    }

    #[test]
    fn all_miss_is_absent() {
        let calls = Arc::new(AtomicUsize::new(0));
        let chain = Chain::new("year").then(Fixed("miss", None, calls));
        assert_eq!(chain.run(&Html::parse_document("<p>x</p>")), None);
        assert_eq!(chain.field(), "year");
    }
}
