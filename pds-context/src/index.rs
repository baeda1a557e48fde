use crate::entity::{CatalogEntity, EntityCategory};
use crate::errors::ContextError;
use log::debug;
use strsim::normalized_damerau_levenshtein;

/// Candidates scoring below this similarity are never returned
pub const MIN_SIMILARITY: f64 = 0.5;

pub const DEFAULT_SEARCH_LIMIT: usize = 10;

/// Weight applied to keys that are only part of a name or LID
const PARTIAL_KEY_WEIGHT: f64 = 0.9;

/// One ranked search hit
#[derive(Debug, Clone, PartialEq)]
pub struct ContextMatch<'a> {
    pub entity: &'a CatalogEntity,
    /// Similarity in `[0, 1]`, 1 being an exact match
    pub score: f64,
}

/// Immutable, typo-tolerant lookup over the entities of one category.
///
/// Each entity is matched through a few lower-cased keys: its full name, the
/// words of a multi-word name, and the final segment of its LID (whole and
/// split on `.`/`_`). An entity's score is the best weighted similarity across
/// its keys, so "curiosity" finds "The Mars Science Laboratory Curiosity Rover"
/// while an entity named exactly "Curiosity" still ranks above it.
#[derive(Debug, Clone)]
pub struct ContextIndex {
    category: EntityCategory,
    entities: Vec<CatalogEntity>,
    keys: Vec<Vec<MatchKey>>,
}

#[derive(Debug, Clone, PartialEq)]
struct MatchKey {
    text: String,
    weight: f64,
}

impl ContextIndex {
    /// Build the index from a bulk listing; all entities must belong to `category`
    pub fn build(
        category: EntityCategory,
        entities: Vec<CatalogEntity>,
    ) -> Result<Self, ContextError> {
        if let Some(stray) = entities.iter().find(|e| e.category != category) {
            return Err(ContextError::CategoryMismatch {
                identifier: stray.identifier.clone(),
                expected: category,
                found: stray.category,
            });
        }
        let keys = entities.iter().map(match_keys).collect();
        Ok(Self {
            category,
            entities,
            keys,
        })
    }

    pub fn category(&self) -> EntityCategory {
        self.category
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Entities in their original listing order
    pub fn entities(&self) -> &[CatalogEntity] {
        &self.entities
    }

    /// Ranked approximate lookup.
    ///
    /// Returns at most `limit` entities by descending similarity, ties kept in
    /// listing order. An empty or meaningless query is not an error but gives
    /// unreliable (usually empty) results and should be avoided.
    pub fn search(&self, query: &str, limit: usize) -> Vec<ContextMatch<'_>> {
        let query = query.trim().to_lowercase();
        let mut matches: Vec<ContextMatch<'_>> = self
            .entities
            .iter()
            .zip(&self.keys)
            .filter_map(|(entity, keys)| {
                let score = keys
                    .iter()
                    .map(|key| key.weight * normalized_damerau_levenshtein(&query, &key.text))
                    .fold(0.0_f64, f64::max);
                (score >= MIN_SIMILARITY).then_some(ContextMatch { entity, score })
            })
            .collect();

        // sort_by is stable, equal scores keep listing order
        matches.sort_by(|a, b| b.score.total_cmp(&a.score));
        matches.truncate(limit);

        debug!(
            "context search '{}' over {} {} entities: {} hit(s)",
            query,
            self.entities.len(),
            self.category,
            matches.len()
        );
        matches
    }

    /// Best match only, the first of the ranked list
    pub fn best_match(&self, query: &str) -> Option<ContextMatch<'_>> {
        self.search(query, 1).into_iter().next()
    }

    /// Exact lookup by derived code, e.g. `SETEBOS`; case-insensitive
    pub fn by_code(&self, code: &str) -> Option<&CatalogEntity> {
        let code = code.trim().to_uppercase();
        self.entities.iter().find(|e| e.code() == code)
    }

    pub fn by_identifier(&self, identifier: &str) -> Option<&CatalogEntity> {
        self.entities.iter().find(|e| e.identifier == identifier)
    }
}

fn match_keys(entity: &CatalogEntity) -> Vec<MatchKey> {
    let mut keys: Vec<MatchKey> = Vec::new();
    let mut push = |text: &str, weight: f64| {
        let text = text.trim().to_lowercase();
        if text.is_empty() {
            return;
        }
        match keys.iter_mut().find(|key| key.text == text) {
            Some(existing) => existing.weight = existing.weight.max(weight),
            None => keys.push(MatchKey { text, weight }),
        }
    };

    push(&entity.name, 1.0);
    let words: Vec<&str> = entity.name.split_whitespace().collect();
    if words.len() > 1 {
        for word in words {
            push(word, PARTIAL_KEY_WEIGHT);
        }
    }

    let tail = entity.identifier_tail();
    push(tail, 1.0);
    for part in tail.split(['.', '_']) {
        push(part, PARTIAL_KEY_WEIGHT);
    }
    keys
}
