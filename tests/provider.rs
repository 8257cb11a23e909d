// Pool loading and question generation: payload validation, fallback
// merging, request signing, and the distractor-sampling edge cases.

use std::collections::HashSet;

use rand::rngs::StdRng;
use rand::SeedableRng;

use hero_quiz::quiz::provider::{
    fallback_pool, generate_questions, merge_pools, parse_pool_payload, sign_request, Character,
    ProviderConfig, OPTION_COUNT,
};
use hero_quiz::FALLBACK_CHARACTERS;

fn character(name: &str) -> Character {
    Character {
        name: name.to_string(),
        image_url: format!("http://img.example/{name}.jpg"),
        description: None,
        fallback_image_urls: Vec::new(),
    }
}

#[test]
fn request_signature_matches_reference_hash() {
    // md5("1" + "abcd" + "1234")
    assert_eq!(
        sign_request(1, "abcd", "1234"),
        "ffd275c5130566a2916217b101f26150"
    );
}

#[test]
fn signed_url_carries_auth_triplet_and_page_size() {
    let config = ProviderConfig {
        remote_enabled: true,
        public_key: "1234".to_string(),
        private_key: "abcd".to_string(),
        ..ProviderConfig::default()
    };
    let url = config.signed_url(1);
    assert!(url.contains("limit=100"));
    assert!(url.contains("ts=1"));
    assert!(url.contains("apikey=1234"));
    assert!(url.contains("hash=ffd275c5130566a2916217b101f26150"));
}

#[test]
fn remote_is_skipped_without_both_keys() {
    let mut config = ProviderConfig {
        remote_enabled: true,
        public_key: "pub".to_string(),
        ..ProviderConfig::default()
    };
    assert!(!config.wants_remote());
    config.private_key = "priv".to_string();
    assert!(config.wants_remote());
    config.remote_enabled = false;
    assert!(!config.wants_remote());
}

#[test]
fn payload_parsing_keeps_only_valid_records() {
    let body = r#"{
        "data": { "results": [
            { "name": "Thor",
              "description": "  God of thunder.  ",
              "thumbnail": { "path": "http://img.example/thor", "extension": "jpg" } },
            { "name": "   ",
              "description": "blank name",
              "thumbnail": { "path": "http://img.example/blank", "extension": "jpg" } },
            { "name": "No Image",
              "description": "",
              "thumbnail": { "path": "http://img.example/image_not_available", "extension": "jpg" } },
            { "name": "No Thumbnail", "description": "missing" }
        ] }
    }"#;
    let pool = parse_pool_payload(body).unwrap();
    assert_eq!(pool.len(), 1);
    let thor = &pool[0];
    assert_eq!(thor.name, "Thor");
    assert_eq!(thor.description.as_deref(), Some("God of thunder."));
    assert_eq!(thor.image_url, "http://img.example/thor/portrait_uncanny.jpg");
    // coarser crop first, raw path last
    assert_eq!(
        thor.fallback_image_urls,
        vec![
            "http://img.example/thor/standard_fantastic.jpg".to_string(),
            "http://img.example/thor.jpg".to_string(),
        ]
    );
}

#[test]
fn malformed_payload_is_an_error() {
    assert!(parse_pool_payload("not json").is_err());
    assert!(parse_pool_payload(r#"{"data": 7}"#).is_err());
}

#[test]
fn empty_results_parse_to_empty_pool() {
    let pool = parse_pool_payload(r#"{"data": {}}"#).unwrap();
    assert!(pool.is_empty());
}

#[test]
fn short_remote_pool_is_supplemented_from_fallback() {
    let remote = vec![character("Thor"), character("Loki")];
    let fallback = vec![character("Hulk"), character("thor"), character("Storm")];
    let pool = merge_pools(remote, &fallback, 25, 100);
    // remote origin wins the case-insensitive name clash
    let names: Vec<&str> = pool.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["Thor", "Loki", "Hulk", "Storm"]);
    assert!(pool[0].image_url.contains("Thor"));
}

#[test]
fn sufficient_remote_pool_skips_fallback_entirely() {
    let remote: Vec<Character> = (0..30).map(|i| character(&format!("Hero {i}"))).collect();
    let fallback = vec![character("Hulk")];
    let pool = merge_pools(remote, &fallback, 25, 100);
    assert_eq!(pool.len(), 30);
    assert!(pool.iter().all(|c| c.name != "Hulk"));
}

#[test]
fn merged_pool_respects_size_cap() {
    let remote: Vec<Character> = (0..150).map(|i| character(&format!("Hero {i}"))).collect();
    let pool = merge_pools(remote, &[], 25, 100);
    assert_eq!(pool.len(), 100);
}

#[test]
fn fallback_dataset_materializes_with_slugged_asset_urls() {
    let pool = fallback_pool(FALLBACK_CHARACTERS);
    assert_eq!(pool.len(), FALLBACK_CHARACTERS.len());
    let spidey = pool.iter().find(|c| c.name == "Spider-Man").unwrap();
    assert_eq!(spidey.image_url, "assets/characters/spider-man.jpg");
    assert_eq!(
        spidey.fallback_image_urls,
        vec!["assets/characters/spider-man.png".to_string()]
    );
    assert!(spidey.description.is_some());
    // names are unique within the pinned list
    let names: HashSet<&str> = pool.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names.len(), pool.len());
}

#[test]
fn generated_questions_have_four_unique_options_containing_the_answer() {
    let mut rng = StdRng::seed_from_u64(7);
    let pool = fallback_pool(FALLBACK_CHARACTERS);
    let questions = generate_questions(&mut rng, &pool, 10);
    assert_eq!(questions.len(), 10);
    for question in &questions {
        assert_eq!(question.options.len(), OPTION_COUNT);
        let unique: HashSet<&String> = question.options.iter().collect();
        assert_eq!(unique.len(), OPTION_COUNT);
        assert!(question.options.contains(&question.correct_answer));
    }
}

#[test]
fn four_character_pool_uses_every_name_in_each_question() {
    let mut rng = StdRng::seed_from_u64(3);
    let pool = vec![
        character("Thor"),
        character("Loki"),
        character("Hulk"),
        character("Storm"),
    ];
    let questions = generate_questions(&mut rng, &pool, 2);
    assert_eq!(questions.len(), 2);
    for question in &questions {
        let mut options = question.options.clone();
        options.sort();
        assert_eq!(options, vec!["Hulk", "Loki", "Storm", "Thor"]);
    }
}

#[test]
fn tiny_pool_degrades_option_count_instead_of_looping() {
    let mut rng = StdRng::seed_from_u64(11);
    let pool = vec![character("Thor"), character("Loki")];
    let questions = generate_questions(&mut rng, &pool, 5);
    // can't produce more questions than characters
    assert_eq!(questions.len(), 2);
    for question in &questions {
        assert_eq!(question.options.len(), 2);
        assert!(question.options.contains(&question.correct_answer));
    }
}

#[test]
fn single_character_pool_yields_single_option_questions() {
    let mut rng = StdRng::seed_from_u64(19);
    let pool = vec![character("Thor")];
    let questions = generate_questions(&mut rng, &pool, 3);
    assert_eq!(questions.len(), 1);
    assert_eq!(questions[0].options, vec!["Thor"]);
}

#[test]
fn duplicate_names_in_pool_do_not_inflate_options() {
    let mut rng = StdRng::seed_from_u64(23);
    // three distinct names across four entries
    let pool = vec![
        character("Thor"),
        character("Thor"),
        character("Loki"),
        character("Hulk"),
    ];
    let questions = generate_questions(&mut rng, &pool, 4);
    for question in &questions {
        let unique: HashSet<&String> = question.options.iter().collect();
        assert_eq!(unique.len(), question.options.len());
        assert!(question.options.len() <= 3);
    }
}

#[test]
fn generation_is_deterministic_for_a_fixed_seed() {
    let pool = fallback_pool(FALLBACK_CHARACTERS);
    let a = generate_questions(&mut StdRng::seed_from_u64(42), &pool, 10);
    let b = generate_questions(&mut StdRng::seed_from_u64(42), &pool, 10);
    assert_eq!(a, b);
}
