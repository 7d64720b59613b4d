//! Graph-level guarantees of builder, serializer and cleaner working together.

use chrono::NaiveDate;
use skosgen_core::{
    BuildOptions, Change, Cleaner, CollectionRecord, ConceptGraphBuilder, ConceptScheme,
    PrimaryRecord, Relation, Serializer, DEFAULT_BASE_URI,
};

fn options() -> BuildOptions {
    BuildOptions {
        title: "ESCO Skills".into(),
        description: "Fähigkeiten".into(),
        created: NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
        locale_tag: "de".into(),
        exact_match_base: Some("http://data.europa.eu/esco/skill/".into()),
    }
}

/// A small tangled input: duplicates, orphans, self loops, a cycle and
/// records arriving before the concepts they reference.
fn build() -> (ConceptScheme, skosgen_core::BuildStats) {
    let mut b = ConceptGraphBuilder::new(options());

    b.add_relation(Relation::new("C", "B"));
    b.add_collection_record(CollectionRecord::new("C", "digital"));
    for (id, label) in [("A", "Kochen"), ("B", "Backen"), ("C", "Brot backen"), ("D", "Garen")] {
        b.add_primary_record(
            PrimaryRecord::new(id, label)
                .with_alternative_labels("Zubereiten|  ")
                .with_external_reference(id),
        );
    }
    b.add_relation(Relation::new("B", "A"));
    b.add_relation(Relation::new("D", "A"));
    b.add_relation(Relation::new("D", "B"));
    b.add_relation(Relation::new("A", "A"));
    b.add_relation(Relation::new("A", "Z9"));
    b.add_relation(Relation::new("Q", "A"));
    b.add_collection_record(CollectionRecord::new("Z9", "green"));
    b.finish()
}

#[test]
fn builder_and_serializer_are_deterministic() {
    let serializer = Serializer::new(DEFAULT_BASE_URI).unwrap();
    let first = serializer.serialize(&build().0);
    let second = serializer.serialize(&build().0);
    assert_eq!(first, second);
}

#[test]
fn no_dangling_edges_or_self_loops() {
    let (scheme, stats) = build();
    assert!(scheme.dangling_edges().is_empty());
    for concept in scheme.concepts.values() {
        assert!(!concept.broader.contains(&concept.identifier));
        assert!(!concept.narrower.contains(&concept.identifier));
    }
    assert_eq!(stats.self_relations, 1);
    assert_eq!(stats.orphan_relations, 2);
    assert_eq!(stats.orphan_collection_rows, 1);
}

#[test]
fn narrower_is_the_transpose_of_broader() {
    let (scheme, _) = build();
    for p in scheme.concepts.values() {
        for c in scheme.concepts.values() {
            assert_eq!(
                p.narrower.contains(&c.identifier),
                c.broader.contains(&p.identifier),
                "{} / {}",
                p.identifier,
                c.identifier
            );
        }
    }
    let d = scheme.concept("D").unwrap();
    assert_eq!(d.broader.len(), 2);
}

#[test]
fn duplicate_primary_row_keeps_the_last() {
    let mut b = ConceptGraphBuilder::new(options());
    b.add_primary_record(PrimaryRecord::new("A1", "Cooking"));
    b.add_primary_record(PrimaryRecord::new("A1", "Cooking (v2)"));
    let (scheme, stats) = b.finish();

    assert_eq!(scheme.len(), 1);
    assert_eq!(scheme.concept("A1").unwrap().preferred_label, "Cooking (v2)");
    assert_eq!(stats.duplicate_primary_rows, 1);
}

#[test]
fn relation_to_missing_parent_is_rejected() {
    let mut b = ConceptGraphBuilder::new(options());
    b.add_primary_record(PrimaryRecord::new("A1", "Cooking"));
    b.add_relation(Relation::new("A1", "Z9"));
    let (scheme, stats) = b.finish();

    assert_eq!(stats.orphan_relations, 1);
    assert!(scheme.concept("A1").unwrap().broader.is_empty());
}

#[test]
fn concept_collects_every_tag() {
    let mut b = ConceptGraphBuilder::new(options());
    b.add_primary_record(PrimaryRecord::new("A1", "Cooking"));
    b.add_collection_record(CollectionRecord::new("A1", "digital"));
    b.add_collection_record(CollectionRecord::new("A1", "green"));
    let (scheme, _) = b.finish();

    let tags: Vec<&str> = scheme
        .concept("A1")
        .unwrap()
        .collections
        .iter()
        .map(String::as_str)
        .collect();
    assert_eq!(tags, vec!["digital", "green"]);
}

#[test]
fn generated_output_is_already_clean() {
    let serializer = Serializer::new(DEFAULT_BASE_URI).unwrap();
    let raw = serializer.serialize(&build().0);
    let out = Cleaner::new(Some(DEFAULT_BASE_URI)).unwrap().clean_text(&raw).unwrap();

    assert!(out.report.is_empty(), "{}", out.report.render_text());
    assert_eq!(out.text, raw);
}

#[test]
fn repeated_concept_block_is_merged_once() {
    let serializer = Serializer::new(DEFAULT_BASE_URI).unwrap();
    let raw = serializer.serialize(&build().0);

    let a_iri = format!("<{}A>", DEFAULT_BASE_URI);
    let start = raw.find(&format!("\n\n{a_iri} ")).unwrap() + 2;
    let end = start + raw[start..].find(" .\n").unwrap() + 2;
    let block = &raw[start..end];
    let doubled = format!("{raw}\n{block}\n");

    let out = Cleaner::new(Some(DEFAULT_BASE_URI)).unwrap().clean_text(&doubled).unwrap();
    let merges = out
        .report
        .entries
        .iter()
        .filter(|e| matches!(e.change, Change::BlockMerged { .. }))
        .count();

    assert_eq!(merges, 1);
    assert_eq!(out.text, raw);
    assert_eq!(out.text.matches(&format!("\n{a_iri} a skos:Concept")).count(), 1);
    assert!(out.report.reconciles());
}

#[test]
fn cleaner_reconciles_and_is_idempotent_on_damaged_input() {
    let serializer = Serializer::new(DEFAULT_BASE_URI).unwrap();
    let raw = serializer.serialize(&build().0);

    // http/https mix, a comment, a stray dot and a duplicated statement
    let damaged = raw
        .replacen("http://w3id.org/openeduhub/vocabs/escoSkills/B>", "https://w3id.org/openeduhub/vocabs/escoSkills/B>", 2)
        .replacen(" .\n\n", " .\n# seen twice\n.\n\n", 1)
        .replacen(
            "skos:prefLabel \"Garen\"@de ;",
            "skos:prefLabel \"Garen\"@de ;\n    skos:prefLabel \"Garen\"@de ;",
            1,
        );
    assert_ne!(damaged, raw);

    let cleaner = Cleaner::new(Some(DEFAULT_BASE_URI)).unwrap();
    let first = cleaner.clean_text(&damaged).unwrap();
    let report = &first.report;
    assert!(report.reconciles(), "{}", report.render_text());
    assert_eq!(
        report.triples_before as i64 + report.triple_delta(),
        report.triples_after as i64
    );
    assert_eq!(first.text, raw);

    let second = cleaner.clean_text(&first.text).unwrap();
    assert!(second.report.is_empty(), "{}", second.report.render_text());
}
