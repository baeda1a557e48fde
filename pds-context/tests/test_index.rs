use pds_context::{CatalogEntity, ContextIndex, EntityCategory, DEFAULT_SEARCH_LIMIT};

fn targets() -> ContextIndex {
    let entities = vec![
        ("planet.jupiter", "Jupiter", "Planet"),
        ("satellite.uranus.setebos", "Setebos", "Satellite"),
        ("jupiter_laboratory_analog", "Jupiter Laboratory Analog", "Analog"),
        ("planet.saturn", "Saturn", "Planet"),
        ("planet.mars", "Mars", "Planet"),
    ]
    .into_iter()
    .map(|(tail, name, kind)| {
        CatalogEntity::new(
            format!("urn:nasa:pds:context:target:{}", tail),
            name,
            EntityCategory::Target,
        )
        .with_kind(kind)
    })
    .collect();
    ContextIndex::build(EntityCategory::Target, entities).unwrap()
}

fn instrument_hosts() -> ContextIndex {
    let entities = vec![
        ("spacecraft.juno", "Juno"),
        ("spacecraft.msl", "The Mars Science Laboratory Curiosity Rover"),
        ("spacecraft.mess", "MESSENGER"),
        ("rover.curiosity", "Curiosity"),
    ]
    .into_iter()
    .map(|(tail, name)| {
        CatalogEntity::new(
            format!("urn:nasa:pds:context:instrument_host:{}", tail),
            name,
            EntityCategory::InstrumentHost,
        )
    })
    .collect();
    ContextIndex::build(EntityCategory::InstrumentHost, entities).unwrap()
}

#[test]
fn test_search_exact_and_typo() {
    let index = targets();

    let hits = index.search("jupiter", DEFAULT_SEARCH_LIMIT);
    assert_eq!(
        hits[0].entity.identifier,
        "urn:nasa:pds:context:target:planet.jupiter"
    );

    let hits = index.search("jupyter", DEFAULT_SEARCH_LIMIT);
    assert_eq!(
        hits[0].entity.identifier,
        "urn:nasa:pds:context:target:planet.jupiter"
    );
}

#[test]
fn test_search_transposed_letter_ranks_first() {
    let index = instrument_hosts();
    let hits = index.search("curiousity", 1);
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].entity.name, "Curiosity");
}

#[test]
fn test_search_finds_word_inside_long_name() {
    let index = instrument_hosts();
    let hits = index.search("cruiosity", DEFAULT_SEARCH_LIMIT);
    let names: Vec<&str> = hits.iter().map(|m| m.entity.name.as_str()).collect();
    assert!(names.contains(&"The Mars Science Laboratory Curiosity Rover"));
    assert!(names.contains(&"Curiosity"));
}

#[test]
fn test_search_by_lid_tail() {
    let index = instrument_hosts();
    let best = index.best_match("msl").unwrap();
    assert_eq!(
        best.entity.identifier,
        "urn:nasa:pds:context:instrument_host:spacecraft.msl"
    );
}

#[test]
fn test_search_ranks_closer_name_first() {
    let index = ContextIndex::build(
        EntityCategory::Target,
        vec![
            CatalogEntity::new(
                "urn:nasa:pds:context:target:asteroid.marsha",
                "Marsha",
                EntityCategory::Target,
            ),
            CatalogEntity::new(
                "urn:nasa:pds:context:target:planet.mars",
                "Mars",
                EntityCategory::Target,
            ),
        ],
    )
    .unwrap();

    let hits = index.search("mras", DEFAULT_SEARCH_LIMIT);
    assert_eq!(hits[0].entity.name, "Mars");
    assert_eq!(hits[1].entity.name, "Marsha");
    assert!(hits[0].score > hits[1].score);
}

#[test]
fn test_ties_keep_listing_order() {
    let index = ContextIndex::build(
        EntityCategory::Target,
        vec![
            CatalogEntity::new("urn:nasa:pds:context:target:a.io", "Io", EntityCategory::Target),
            CatalogEntity::new("urn:nasa:pds:context:target:b.io", "Io", EntityCategory::Target),
        ],
    )
    .unwrap();
    let hits = index.search("io", DEFAULT_SEARCH_LIMIT);
    assert_eq!(hits.len(), 2);
    assert_eq!(hits[0].entity.identifier, "urn:nasa:pds:context:target:a.io");
    assert_eq!(hits[1].entity.identifier, "urn:nasa:pds:context:target:b.io");
}

#[test]
fn test_search_is_deterministic() {
    let first: Vec<String> = targets()
        .search("sat", DEFAULT_SEARCH_LIMIT)
        .iter()
        .map(|m| m.entity.identifier.clone())
        .collect();
    let second: Vec<String> = targets()
        .search("sat", DEFAULT_SEARCH_LIMIT)
        .iter()
        .map(|m| m.entity.identifier.clone())
        .collect();
    assert_eq!(first, second);
}

#[test]
fn test_degenerate_queries_never_fail() {
    let index = targets();
    assert!(index.search("", DEFAULT_SEARCH_LIMIT).is_empty());
    assert!(index.search("   ", DEFAULT_SEARCH_LIMIT).is_empty());

    for garbage in ["\u{1F680}\u{1F30C}", "ñ\u{0301}\u{200B}x", "∂∆∑", "\0"] {
        let hits = index.search(garbage, DEFAULT_SEARCH_LIMIT);
        assert!(hits.len() <= DEFAULT_SEARCH_LIMIT);
    }
}

#[test]
fn test_search_respects_limit() {
    let index = targets();
    let hits = index.search("jupiter", 1);
    assert_eq!(hits.len(), 1);
}

#[test]
fn test_code_and_identifier_lookup() {
    let index = targets();

    let setebos = index.by_code("SETEBOS").unwrap();
    assert_eq!(setebos.name, "Setebos");
    assert_eq!(
        setebos.identifier,
        "urn:nasa:pds:context:target:satellite.uranus.setebos"
    );
    assert!(index.by_code("setebos").is_some());
    assert!(index.by_code("JUPITER_LABORATORY_ANALOG").is_some());
    assert!(index.by_code("PLUTO").is_none());

    let mars = index
        .by_identifier("urn:nasa:pds:context:target:planet.mars")
        .unwrap();
    assert_eq!(mars.kind.as_deref(), Some("Planet"));
}

#[test]
fn test_entity_deserializes_from_json() {
    let json = r#"{
        "identifier": "urn:nasa:pds:context:target:planet.mars",
        "name": "Mars",
        "category": "target"
    }"#;
    let entity: CatalogEntity = serde_json::from_str(json).unwrap();
    assert_eq!(entity.category, EntityCategory::Target);
    assert!(entity.kind.is_none());
}
