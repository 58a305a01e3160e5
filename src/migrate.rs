use crate::service::{EntityKind, MusicService, SearchOutcome};

/// What happened to one scraped name
#[derive(Debug, Clone)]
pub enum ItemOutcome {
    /// Resolved and added to favorites
    Favorited { artist_id: u64, matched_name: String },
    /// No artist top hit; nothing was mutated
    NoMatch,
    /// Search or mutation failed; nothing else was affected
    Failed { reason: String },
}

#[derive(Debug, Clone)]
pub struct ItemReport {
    pub name: String,
    pub outcome: ItemOutcome,
}

/// Per-item results for a whole run, in input order
#[derive(Debug, Default)]
pub struct MigrationReport {
    pub items: Vec<ItemReport>,
}

impl MigrationReport {
    pub fn favorited_count(&self) -> usize {
        self.items
            .iter()
            .filter(|i| matches!(i.outcome, ItemOutcome::Favorited { .. }))
            .count()
    }

    pub fn unmatched_count(&self) -> usize {
        self.items
            .iter()
            .filter(|i| matches!(i.outcome, ItemOutcome::NoMatch))
            .count()
    }

    pub fn failed_count(&self) -> usize {
        self.items
            .iter()
            .filter(|i| matches!(i.outcome, ItemOutcome::Failed { .. }))
            .count()
    }
}

/// Resolve each name against the service and favorite the top artist hit.
///
/// Names are processed independently: a failure on one is recorded and the
/// loop moves on, so the run always covers the full input. Each name yields
/// at most one mutation attempt.
pub async fn migrate_artists<S>(
    service: &mut S,
    names: &[String],
    search_limit: usize,
) -> MigrationReport
where
    S: MusicService + ?Sized,
{
    let mut report = MigrationReport::default();

    for name in names {
        let outcome = favorite_one(service, name, search_limit).await;

        match &outcome {
            ItemOutcome::Favorited { matched_name, .. } => {
                tracing::info!(artist = %name, matched = %matched_name, "Favorited");
            }
            ItemOutcome::NoMatch => {
                tracing::info!(artist = %name, "No artist match");
            }
            ItemOutcome::Failed { reason } => {
                tracing::warn!(artist = %name, "Unable to favorite: {}", reason);
            }
        }

        report.items.push(ItemReport {
            name: name.clone(),
            outcome,
        });
    }

    report
}

async fn favorite_one<S>(service: &mut S, name: &str, search_limit: usize) -> ItemOutcome
where
    S: MusicService + ?Sized,
{
    let outcome = match service.search_artist(name, search_limit).await {
        Ok(outcome) => outcome,
        Err(e) => {
            return ItemOutcome::Failed {
                reason: format!("search failed: {}", e),
            }
        }
    };

    let (id, matched_name, kind) = match outcome {
        SearchOutcome::NoMatch => return ItemOutcome::NoMatch,
        SearchOutcome::Match { id, name, kind } => (id, name, kind),
    };

    if kind != EntityKind::Artist {
        return ItemOutcome::NoMatch;
    }

    match service.add_favorite_artist(id).await {
        Ok(()) => ItemOutcome::Favorited {
            artist_id: id,
            matched_name,
        },
        Err(e) => ItemOutcome::Failed {
            reason: format!("favorite failed: {}", e),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::{anyhow, Result};
    use async_trait::async_trait;
    use std::collections::{HashMap, HashSet};

    /// Service double: a fixed name -> outcome table, a set-backed
    /// favorites store, and a log of every mutation call.
    #[derive(Default)]
    struct StubService {
        hits: HashMap<String, (u64, EntityKind)>,
        search_errors: HashSet<String>,
        mutation_errors: HashSet<u64>,
        favorites: HashSet<u64>,
        mutation_calls: Vec<u64>,
    }

    impl StubService {
        fn with_artist(mut self, name: &str, id: u64) -> Self {
            self.hits.insert(name.to_string(), (id, EntityKind::Artist));
            self
        }

        fn with_hit(mut self, name: &str, id: u64, kind: EntityKind) -> Self {
            self.hits.insert(name.to_string(), (id, kind));
            self
        }

        fn with_search_error(mut self, name: &str) -> Self {
            self.search_errors.insert(name.to_string());
            self
        }

        fn with_mutation_error(mut self, id: u64) -> Self {
            self.mutation_errors.insert(id);
            self
        }
    }

    #[async_trait]
    impl MusicService for StubService {
        fn is_authenticated(&self) -> bool {
            true
        }

        async fn search_artist(&mut self, query: &str, _limit: usize) -> Result<SearchOutcome> {
            if self.search_errors.contains(query) {
                return Err(anyhow!("503 service unavailable"));
            }

            Ok(match self.hits.get(query) {
                Some(&(id, kind)) => SearchOutcome::Match {
                    id,
                    name: query.to_string(),
                    kind,
                },
                None => SearchOutcome::NoMatch,
            })
        }

        async fn add_favorite_artist(&mut self, artist_id: u64) -> Result<()> {
            self.mutation_calls.push(artist_id);

            if self.mutation_errors.contains(&artist_id) {
                return Err(anyhow!("500 internal error"));
            }

            // Re-adding is a silent no-op, like the real service
            self.favorites.insert(artist_id);
            Ok(())
        }
    }

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn test_mixed_batch_favorites_only_resolvable_names() {
        let mut service = StubService::default()
            .with_artist("Alice Band", 1)
            .with_artist("Bob Trio", 3);

        let report = migrate_artists(
            &mut service,
            &names(&["Alice Band", "Unknown XYZ123", "Bob Trio"]),
            5,
        )
        .await;

        assert_eq!(service.mutation_calls, vec![1, 3]);
        assert_eq!(report.favorited_count(), 2);
        assert_eq!(report.unmatched_count(), 1);
        assert_eq!(report.failed_count(), 0);

        assert_eq!(report.items[1].name, "Unknown XYZ123");
        assert!(matches!(report.items[1].outcome, ItemOutcome::NoMatch));
    }

    #[tokio::test]
    async fn test_search_failure_is_isolated() {
        let mut service = StubService::default()
            .with_artist("Queen", 10)
            .with_search_error("Bad Apple")
            .with_artist("Eagles", 30);

        let report = migrate_artists(
            &mut service,
            &names(&["Queen", "Bad Apple", "Eagles"]),
            5,
        )
        .await;

        // Every other name still gets its mutation
        assert_eq!(service.mutation_calls, vec![10, 30]);
        assert_eq!(report.failed_count(), 1);
        assert!(matches!(
            report.items[1].outcome,
            ItemOutcome::Failed { .. }
        ));
    }

    #[tokio::test]
    async fn test_mutation_failure_is_isolated() {
        let mut service = StubService::default()
            .with_artist("Queen", 10)
            .with_artist("Eagles", 30)
            .with_mutation_error(10);

        let report = migrate_artists(&mut service, &names(&["Queen", "Eagles"]), 5).await;

        assert_eq!(service.mutation_calls, vec![10, 30]);
        assert_eq!(report.favorited_count(), 1);
        assert_eq!(report.failed_count(), 1);
    }

    #[tokio::test]
    async fn test_non_artist_top_hit_is_not_favorited() {
        let mut service = StubService::default()
            .with_hit("Abbey Road", 77, EntityKind::Album);

        let report = migrate_artists(&mut service, &names(&["Abbey Road"]), 5).await;

        assert!(service.mutation_calls.is_empty());
        assert_eq!(report.unmatched_count(), 1);
    }

    #[tokio::test]
    async fn test_double_run_leaves_one_favorite() {
        let mut service = StubService::default().with_artist("Queen", 10);
        let input = names(&["Queen"]);

        migrate_artists(&mut service, &input, 5).await;
        migrate_artists(&mut service, &input, 5).await;

        // Two attempts, still favorited exactly once
        assert_eq!(service.mutation_calls, vec![10, 10]);
        assert_eq!(service.favorites.len(), 1);
    }

    #[tokio::test]
    async fn test_duplicate_names_each_attempt_one_mutation() {
        let mut service = StubService::default().with_artist("Eagles", 30);

        let report =
            migrate_artists(&mut service, &names(&["Eagles", "Eagles"]), 5).await;

        assert_eq!(service.mutation_calls, vec![30, 30]);
        assert_eq!(service.favorites.len(), 1);
        assert_eq!(report.favorited_count(), 2);
    }

    #[tokio::test]
    async fn test_empty_input_is_a_noop() {
        let mut service = StubService::default();
        let report = migrate_artists(&mut service, &[], 5).await;

        assert!(service.mutation_calls.is_empty());
        assert!(report.items.is_empty());
    }
}
