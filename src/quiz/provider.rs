//! Character pool and question generation.
//!
//! The provider is pure: remote payloads arrive as text (fetched by the web
//! layer), get parsed and validated here, and are merged with the pinned
//! fallback list. Question generation takes an injected RNG so sessions are
//! reproducible under test.

use std::collections::HashSet;
use std::fmt;

use md5::{Digest, Md5};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::Deserialize;

/// Options shown per question (correct answer + distractors).
pub const OPTION_COUNT: usize = 4;

/// Thumbnail paths containing this marker are the remote service's "no image
/// available" stand-in and disqualify the record.
pub const PLACEHOLDER_SENTINEL: &str = "image_not_available";

/// A quizzable character. Built once per session, immutable afterwards.
#[derive(Clone, Debug, PartialEq)]
pub struct Character {
    pub name: String,
    pub image_url: String,
    pub description: Option<String>,
    /// Alternate URLs tried in order when the primary image fails to load.
    pub fallback_image_urls: Vec<String>,
}

/// One multiple-choice question, derived 1:1 from a `Character`.
#[derive(Clone, Debug, PartialEq)]
pub struct Question {
    pub correct_answer: String,
    /// Unique, shuffled; always contains `correct_answer`. Exactly
    /// `OPTION_COUNT` entries unless the pool has fewer distinct names.
    pub options: Vec<String>,
    pub image_url: String,
    pub fallback_image_urls: Vec<String>,
    pub description: Option<String>,
}

/// Explicit provider configuration (no ambient globals).
#[derive(Clone, Debug)]
pub struct ProviderConfig {
    pub remote_enabled: bool,
    /// Fewer valid remote records than this triggers fallback supplementing.
    pub min_valid_results: usize,
    /// Hard cap on the session pool (also the remote page size).
    pub pool_size_cap: usize,
    pub endpoint: String,
    pub public_key: String,
    pub private_key: String,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            remote_enabled: false,
            min_valid_results: 25,
            pool_size_cap: 100,
            endpoint: "https://gateway.marvel.com/v1/public/characters".to_string(),
            public_key: String::new(),
            private_key: String::new(),
        }
    }
}

impl ProviderConfig {
    /// The network is only attempted when enabled *and* both keys are set;
    /// otherwise loading silently proceeds straight to the fallback list.
    pub fn wants_remote(&self) -> bool {
        self.remote_enabled && !self.public_key.is_empty() && !self.private_key.is_empty()
    }

    /// Full request URL with the signed auth triplet for the given timestamp.
    pub fn signed_url(&self, ts: u64) -> String {
        format!(
            "{}?limit={}&ts={}&apikey={}&hash={}",
            self.endpoint,
            self.pool_size_cap,
            ts,
            self.public_key,
            sign_request(ts, &self.private_key, &self.public_key)
        )
    }
}

/// Request signature required by the character service:
/// `md5(ts + privateKey + publicKey)`, lowercase hex.
pub fn sign_request(ts: u64, private_key: &str, public_key: &str) -> String {
    let mut hasher = Md5::new();
    hasher.update(ts.to_string());
    hasher.update(private_key);
    hasher.update(public_key);
    hex::encode(hasher.finalize())
}

/// Payload parsing failed; the caller treats this like any other fetch
/// failure and falls back to the pinned list.
#[derive(Debug)]
pub struct PayloadError(String);

impl fmt::Display for PayloadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "malformed character payload: {}", self.0)
    }
}

impl std::error::Error for PayloadError {}

// --- Remote payload shape ----------------------------------------------------

#[derive(Deserialize)]
struct PoolResponse {
    data: PoolData,
}

#[derive(Deserialize)]
struct PoolData {
    #[serde(default)]
    results: Vec<RemoteCharacter>,
}

#[derive(Deserialize)]
struct RemoteCharacter {
    #[serde(default)]
    name: String,
    #[serde(default)]
    description: String,
    thumbnail: Option<Thumbnail>,
}

#[derive(Deserialize)]
struct Thumbnail {
    #[serde(default)]
    path: String,
    #[serde(default)]
    extension: String,
}

/// Parse the paginated REST payload, keeping only valid records (non-empty
/// name, thumbnail present and not the placeholder sentinel).
pub fn parse_pool_payload(body: &str) -> Result<Vec<Character>, PayloadError> {
    let response: PoolResponse =
        serde_json::from_str(body).map_err(|e| PayloadError(e.to_string()))?;
    Ok(response
        .data
        .results
        .into_iter()
        .filter_map(remote_to_character)
        .collect())
}

fn remote_to_character(record: RemoteCharacter) -> Option<Character> {
    let name = record.name.trim();
    if name.is_empty() {
        return None;
    }
    let thumb = record.thumbnail?;
    if thumb.path.is_empty() || thumb.path.contains(PLACEHOLDER_SENTINEL) {
        return None;
    }
    let description = {
        let d = record.description.trim();
        if d.is_empty() { None } else { Some(d.to_string()) }
    };
    // Portrait variant first; coarser crops and the raw path are fallbacks.
    Some(Character {
        name: name.to_string(),
        image_url: format!("{}/portrait_uncanny.{}", thumb.path, thumb.extension),
        description,
        fallback_image_urls: vec![
            format!("{}/standard_fantastic.{}", thumb.path, thumb.extension),
            format!("{}.{}", thumb.path, thumb.extension),
        ],
    })
}

// --- Pool assembly -----------------------------------------------------------

/// Build the session pool: remote records first, supplemented from the
/// fallback list when the remote side came up short of `min_valid`. Names are
/// deduplicated case-insensitively with the remote origin winning, and the
/// result is truncated to `cap`.
pub fn merge_pools(
    remote: Vec<Character>,
    fallback: &[Character],
    min_valid: usize,
    cap: usize,
) -> Vec<Character> {
    let mut pool: Vec<Character> = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();
    for character in remote {
        if seen.insert(character.name.to_lowercase()) {
            pool.push(character);
        }
    }
    if pool.len() < min_valid {
        for character in fallback {
            if seen.insert(character.name.to_lowercase()) {
                pool.push(character.clone());
            }
        }
    }
    pool.truncate(cap);
    pool
}

/// Materialize `Character`s from the pinned (name, description) dataset.
/// Images resolve against bundled assets, with a PNG variant as fallback.
pub fn fallback_pool(dataset: &[(&str, &str)]) -> Vec<Character> {
    dataset
        .iter()
        .map(|&(name, description)| {
            let slug = slugify(name);
            Character {
                name: name.to_string(),
                image_url: format!("assets/characters/{slug}.jpg"),
                description: if description.is_empty() {
                    None
                } else {
                    Some(description.to_string())
                },
                fallback_image_urls: vec![format!("assets/characters/{slug}.png")],
            }
        })
        .collect()
}

fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut last_dash = true;
    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
            last_dash = false;
        } else if !last_dash {
            slug.push('-');
            last_dash = true;
        }
    }
    while slug.ends_with('-') {
        slug.pop();
    }
    slug
}

// --- Question generation -----------------------------------------------------

/// Shuffle the pool (Fisher–Yates via `SliceRandom`), take the first
/// `min(count, len)` characters and build one question per character.
pub fn generate_questions<R: Rng>(rng: &mut R, pool: &[Character], count: usize) -> Vec<Question> {
    let mut order: Vec<usize> = (0..pool.len()).collect();
    order.shuffle(rng);
    order.truncate(count.min(pool.len()));
    order
        .into_iter()
        .map(|idx| build_question(rng, pool, idx))
        .collect()
}

fn build_question<R: Rng>(rng: &mut R, pool: &[Character], idx: usize) -> Question {
    let subject = &pool[idx];
    // Distractor target degrades with tiny pools instead of retrying forever:
    // we can never show more options than there are distinct names.
    let distinct_others: usize = pool
        .iter()
        .map(|c| c.name.as_str())
        .filter(|&n| n != subject.name)
        .collect::<HashSet<_>>()
        .len();
    let wanted = (OPTION_COUNT - 1).min(distinct_others);

    let mut options: Vec<String> = Vec::with_capacity(wanted + 1);
    options.push(subject.name.clone());
    while options.len() < wanted + 1 {
        let candidate = &pool[rng.gen_range(0..pool.len())].name;
        if !options.iter().any(|o| o == candidate) {
            options.push(candidate.clone());
        }
    }
    options.shuffle(rng);

    Question {
        correct_answer: subject.name.clone(),
        options,
        image_url: subject.image_url.clone(),
        fallback_image_urls: subject.fallback_image_urls.clone(),
        description: subject.description.clone(),
    }
}
