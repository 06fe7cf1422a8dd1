use super::*;
use rdfkb_api::{Error, ObjectKind, RdfFormat};
use test_case::test_case;

type TestResult = Result<(), Box<dyn std::error::Error>>;

const TURTLE: &str = r#"
    @prefix ex: <http://example.org/> .
    ex:a ex:p ex:b ;
        ex:q "chat"@fr, "42"^^<http://www.w3.org/2001/XMLSchema#integer> .
    _:x ex:p ex:a .
"#;

const TRIG: &str = r#"
    @prefix ex: <http://example.org/> .
    ex:a ex:p ex:b .
    ex:g { ex:a ex:p ex:c . }
"#;

fn disk_store() -> Result<(tempfile::TempDir, Store), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let store = Store::on_disk(dir.path().join("kb.db"))?;
    Ok((dir, store))
}

#[test_case(false, BackingKind::Memory; "memory")]
#[test_case(true, BackingKind::MemoryOntology; "ontology")]
fn in_memory_kind(ontology: bool, expected: BackingKind) {
    let store = Store::in_memory(ontology);
    assert_eq!(store.kind(), expected);
    assert_eq!(store.ontology().is_some(), ontology);
    assert!(!store.in_transaction());
}

#[test]
fn ontology_store_knows_well_known_prefixes() {
    let store = Store::in_memory(true);
    assert_eq!(store.prefixes().get("owl"), Some("http://www.w3.org/2002/07/owl#"));
    assert_eq!(store.expand("rdf:type"), "http://www.w3.org/1999/02/22-rdf-syntax-ns#type");
    assert!(Store::in_memory(false).prefixes().is_empty());
}

#[test]
fn later_registration_shadows_earlier_one() -> TestResult {
    let mut store = Store::in_memory(false);
    store
        .register_prefix("ex", "http://example.org/old/")?
        .register_prefix("ex", "http://example.org/new/")?;
    assert_eq!(store.prefixes().len(), 2);
    assert_eq!(store.expand("ex:a"), "http://example.org/new/a");
    assert_eq!(store.expand("unknown:a"), "unknown:a");
    Ok(())
}

#[test]
fn register_prefix_rejects_bad_namespace() {
    let mut store = Store::in_memory(false);
    assert!(matches!(
        store.register_prefix("ex", "not an iri"),
        Err(Error::Parse { .. })
    ));
    assert!(store.prefixes().is_empty());
}

#[test_case(Store::in_memory(false); "memory")]
#[test_case(Store::in_memory(true); "ontology")]
fn size_counts_distinct_triples(mut store: Store) -> TestResult {
    store.register_prefix("ex", "http://example.org/")?;
    assert_eq!(store.size()?, 0);
    assert!(store.add_triple("ex:a", "ex:p", "ex:b", &ObjectKind::Reference)?);
    assert!(store.add_triple("ex:a", "ex:p", "b", &ObjectKind::PlainLiteral)?);
    assert_eq!(store.size()?, 2);
    assert!(!store.add_triple("ex:a", "ex:p", "ex:b", &ObjectKind::Reference)?);
    assert_eq!(store.size()?, 2);
    Ok(())
}

#[test]
fn size_on_disk_counts_distinct_triples() -> TestResult {
    test_setup();
    let (_dir, mut store) = disk_store()?;
    store.register_prefix("ex", "http://example.org/")?;
    assert_eq!(store.size()?, 0);
    store.add_triple("ex:a", "ex:p", "ex:b", &ObjectKind::Reference)?;
    store.add_triple("_:b0", "ex:p", "b", &ObjectKind::LanguageLiteral("en".into()))?;
    store.add_triple("ex:a", "ex:p", "ex:b", &ObjectKind::Reference)?;
    assert_eq!(store.size()?, 2);
    assert!(!store.in_transaction());
    Ok(())
}

#[test]
fn size_ends_open_transaction() -> TestResult {
    let (_dir, mut store) = disk_store()?;
    store.begin(TxMode::Write)?;
    store.add_triple(
        "http://example.org/a",
        "http://example.org/p",
        "1",
        &ObjectKind::TypedLiteral("http://www.w3.org/2001/XMLSchema#integer".into()),
    )?;
    assert!(store.in_transaction());
    assert_eq!(store.size()?, 1);
    assert!(!store.in_transaction());
    Ok(())
}

#[test]
fn object_kinds_are_distinguished() -> TestResult {
    let mut store = Store::in_memory(true);
    store.register_prefix("ex", "http://example.org/")?;
    store.add_triple("ex:a", "rdfs:label", "A", &ObjectKind::LanguageLiteral("en".into()))?;
    assert!(store.contains_triple(
        "ex:a",
        "rdfs:label",
        "A",
        &ObjectKind::LanguageLiteral("en".into())
    )?);
    assert!(!store.contains_triple("ex:a", "rdfs:label", "A", &ObjectKind::PlainLiteral)?);
    assert!(!store.contains_triple("ex:a", "rdfs:label", "ex:A", &ObjectKind::Reference)?);
    // a bare word is not an absolute IRI
    assert!(matches!(
        store.contains_triple("ex:a", "rdfs:label", "A", &ObjectKind::Reference),
        Err(Error::Parse { .. })
    ));
    Ok(())
}

#[test]
fn add_triple_rejects_invalid_terms() {
    let mut store = Store::in_memory(false);
    let res = store.add_triple("http://example.org/a", "not an iri", "x", &ObjectKind::PlainLiteral);
    assert!(matches!(res, Err(Error::Parse { .. })));
    let res = store.add_triple(
        "http://example.org/a",
        "http://example.org/p",
        "x",
        &ObjectKind::LanguageLiteral("not a tag!".into()),
    );
    assert!(matches!(res, Err(Error::Parse { .. })));
}

#[test_case(RdfFormat::RdfXml)]
#[test_case(RdfFormat::Turtle)]
#[test_case(RdfFormat::N3)]
#[test_case(RdfFormat::NTriples)]
fn round_trip_preserves_size(format: RdfFormat) -> TestResult {
    let mut store = Store::in_memory(false);
    store.import_str(TURTLE, Some("turtle"))?;
    assert_eq!(store.size()?, 4);
    let data = store.serialize(format)?;

    let mut copy = Store::in_memory(false);
    copy.import(&data[..], Some(format.name()))?;
    assert_eq!(copy.size()?, 4);
    Ok(())
}

#[test_case(RdfFormat::RdfXml)]
#[test_case(RdfFormat::Turtle)]
#[test_case(RdfFormat::N3)]
fn round_trip_through_disk(format: RdfFormat) -> TestResult {
    test_setup();
    let (_dir, mut store) = disk_store()?;
    store.import_str(TURTLE, Some("text/turtle"))?;
    let data = store.serialize(format)?;
    let mut copy = Store::in_memory(false);
    copy.import(&data[..], Some(format.name()))?;
    assert_eq!(copy.size()?, 4);
    assert!(!store.in_transaction());
    Ok(())
}

#[test]
fn turtle_serialization_uses_registered_prefixes() -> TestResult {
    let mut store = Store::in_memory(false);
    store.register_prefix("ex", "http://example.org/")?;
    store.import_str(TURTLE, Some("turtle"))?;
    let ttl = String::from_utf8(store.serialize(RdfFormat::Turtle)?)?;
    assert!(ttl.contains("ex: <http://example.org/>"));
    assert!(ttl.contains("ex:a"));
    assert!(!ttl.contains("<http://example.org/a>"));
    Ok(())
}

#[test]
fn n3_serialization_uses_at_prefix_directives() -> TestResult {
    let mut store = Store::in_memory(false);
    store
        .register_prefix("ex", "http://example.org/")?
        .register_prefix("xsd", "http://www.w3.org/2001/XMLSchema#")?;
    store.import_str(TURTLE, Some("turtle"))?;
    let n3 = String::from_utf8(store.serialize(RdfFormat::N3)?)?;
    assert!(n3.starts_with("@prefix "), "{n3}");
    assert!(n3.contains("@prefix ex: <http://example.org/> .\n"));
    assert!(!n3.contains("PREFIX"));
    assert!(n3.contains("ex:a"));
    Ok(())
}

#[test]
fn blank_nodes_are_local_to_each_import() -> TestResult {
    let data = r#"[] <http://example.org/p> "y" ."#;
    let mut memory = Store::in_memory(false);
    memory.import_str(data, Some("turtle"))?.import_str(data, Some("turtle"))?;
    assert_eq!(memory.size()?, 2);

    let (_dir, mut disk) = disk_store()?;
    disk.import_str(data, Some("turtle"))?.import_str(data, Some("turtle"))?;
    assert_eq!(disk.size()?, 2);
    Ok(())
}

#[test]
fn blank_nodes_are_shared_within_one_import() -> TestResult {
    let mut store = Store::in_memory(false);
    store.import_str(
        "_:x <http://example.org/p> <http://example.org/a> .\n\
         _:x <http://example.org/q> <http://example.org/b> .",
        Some("nt"),
    )?;
    let subjects = store.subjects("http://example.org/p", "http://example.org/a")?;
    assert_eq!(subjects.len(), 1);
    assert!(subjects[0].starts_with("_:"));
    let others = store.subjects("http://example.org/q", "http://example.org/b")?;
    assert_eq!(others, subjects);
    Ok(())
}

#[test]
fn import_defaults_to_rdf_xml() -> TestResult {
    let xml = r#"<?xml version="1.0"?>
        <rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#"
                 xmlns:ex="http://example.org/">
          <rdf:Description rdf:about="http://example.org/a">
            <ex:p rdf:resource="http://example.org/b"/>
          </rdf:Description>
        </rdf:RDF>"#;
    let mut store = Store::in_memory(false);
    store.import_str(xml, None)?;
    assert_eq!(store.size()?, 1);
    Ok(())
}

#[test]
fn import_rejects_unknown_format() {
    let mut store = Store::in_memory(false);
    let err = store.import_str(TURTLE, Some("json-ld")).err();
    match err {
        Some(Error::Configuration(msg)) => {
            assert!(msg.contains("RDF/XML"));
            assert!(msg.contains("TriG"));
        }
        other => panic!("unexpected result {other:?}"),
    }
}

#[test_case(Some("turtle"))]
#[test_case(Some("nt"))]
#[test_case(None)]
fn import_reports_malformed_data(format: Option<&str>) {
    let mut store = Store::in_memory(false);
    let res = store.import_str("<http://example.org/a> this is not RDF", format);
    assert!(matches!(res, Err(Error::Parse { .. })));
}

#[test_case(Store::in_memory(false); "memory")]
#[test_case(Store::in_memory(true); "ontology")]
fn malformed_import_leaves_memory_store_unchanged(mut store: Store) -> TestResult {
    let data = "<http://example.org/a> <http://example.org/p> <http://example.org/b> .\n\
                <http://example.org/a> <http://example.org/p> <http://example.org/c> .\n\
                <http://example.org/a> broken";
    assert!(matches!(store.import_str(data, Some("nt")), Err(Error::Parse { .. })));
    assert_eq!(store.size()?, 0);
    Ok(())
}

#[test]
fn malformed_import_on_disk_is_rolled_back() -> TestResult {
    let (_dir, mut store) = disk_store()?;
    let data = "<http://example.org/a> <http://example.org/p> <http://example.org/b> .\n\
                <http://example.org/a> <http://example.org/p> <http://example.org/c> .\n\
                <http://example.org/a> broken";
    assert!(store.import_str(data, Some("nt")).is_err());
    assert!(!store.in_transaction());
    assert_eq!(store.size()?, 0);
    Ok(())
}

#[test_case(Store::in_memory(false); "memory")]
#[test_case(Store::in_memory(true); "ontology")]
fn trig_requires_disk(mut store: Store) {
    assert!(matches!(
        store.import_str(TRIG, Some("trig")),
        Err(Error::Configuration(_))
    ));
    assert!(matches!(
        store.serialize(RdfFormat::TriG),
        Err(Error::Configuration(_))
    ));
}

#[test]
fn trig_on_disk() -> TestResult {
    let (_dir, mut store) = disk_store()?;
    store.register_prefix("ex", "http://example.org/")?;
    store.import_str(TRIG, Some("trig"))?;
    assert!(!store.in_transaction());
    assert_eq!(store.size()?, 2);
    let trig = String::from_utf8(store.serialize(RdfFormat::TriG)?)?;
    assert!(trig.contains("ex:g"));

    let dir2 = tempfile::tempdir()?;
    let mut copy = Store::on_disk(dir2.path().join("copy.db"))?;
    copy.import_str(&trig, Some("trig"))?;
    assert_eq!(copy.size()?, 2);
    Ok(())
}

#[test]
fn import_file_guesses_format() -> TestResult {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("data.ttl");
    std::fs::write(&path, TURTLE)?;
    let mut store = Store::in_memory(false);
    store.import_file(&path, None)?;
    assert_eq!(store.size()?, 4);
    Ok(())
}

#[test]
fn import_file_reports_missing_file() {
    let mut store = Store::in_memory(false);
    let res = store.import_file("/this/file/does/not/exist.ttl", None);
    assert!(matches!(res, Err(Error::Io { .. })));
}

#[test]
fn transactions_require_disk() {
    let store = Store::in_memory(false);
    assert!(matches!(store.begin(TxMode::Read), Err(Error::Configuration(_))));
    assert!(matches!(store.commit(), Err(Error::Configuration(_))));
    assert!(matches!(store.rollback(), Err(Error::Configuration(_))));
}

#[test]
fn rollback_discards_added_triples() -> TestResult {
    let (_dir, mut store) = disk_store()?;
    store.register_prefix("ex", "http://example.org/")?;
    store.begin(TxMode::Write)?;
    store.add_triple("ex:a", "ex:p", "ex:b", &ObjectKind::Reference)?;
    store.import_str(TURTLE, Some("turtle"))?;
    assert!(store.in_transaction());
    store.rollback()?;
    assert!(!store.in_transaction());
    assert_eq!(store.size()?, 0);
    Ok(())
}

#[test]
fn nested_begin_is_an_error() -> TestResult {
    let (_dir, store) = disk_store()?;
    store.begin(TxMode::Read)?;
    assert!(matches!(store.begin(TxMode::Read), Err(Error::Storage { .. })));
    assert!(store.in_transaction());
    store.commit()?;
    Ok(())
}

#[test]
fn read_scope_ends_its_own_transaction_only() -> TestResult {
    let (_dir, store) = disk_store()?;
    {
        let _scope = store.read_scope()?;
        assert!(store.in_transaction());
    }
    assert!(!store.in_transaction());

    store.begin(TxMode::Write)?;
    {
        let _scope = store.read_scope()?;
    }
    assert!(store.in_transaction());
    store.commit()?;
    Ok(())
}

#[test]
fn subjects_and_objects() -> TestResult {
    let mut store = Store::in_memory(false);
    store.register_prefix("ex", "http://example.org/")?;
    store.import_str(TURTLE, Some("turtle"))?;
    let subjects = store.subjects("ex:p", "ex:a")?;
    assert_eq!(subjects.len(), 1);
    assert!(subjects[0].starts_with("_:"));
    assert_eq!(store.objects("ex:a", "ex:q")?.len(), 2);
    assert!(store.objects("ex:b", "ex:q")?.is_empty());
    Ok(())
}
