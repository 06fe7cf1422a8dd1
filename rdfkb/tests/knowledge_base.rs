//! End-to-end flows on local stores.
use rdfkb::api::{Error, ObjectKind, RdfFormat};
use rdfkb::sparql::{closure, find_by_literal, query_local, same_as};
use rdfkb::store::Store;
use test_case::test_case;

type TestResult = Result<(), Box<dyn std::error::Error>>;

const PEOPLE: &str = r#"
    @prefix ex: <http://example.org/> .
    @prefix owl: <http://www.w3.org/2002/07/owl#> .
    @prefix rdfs: <http://www.w3.org/2000/01/rdf-schema#> .
    ex:subject owl:sameAs ex:subject2 ;
        rdfs:label "subject" .
    ex:subject2 rdfs:label "subject, again"@en .
    ex:Person a owl:Class ;
        owl:equivalentClass ex:Human .
    [] a ex:Person ; rdfs:label "anonymous" .
"#;

fn disk_store() -> Result<(tempfile::TempDir, Store), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let store = Store::on_disk(dir.path().join("kb.db"))?;
    Ok((dir, store))
}

#[test_case(RdfFormat::RdfXml)]
#[test_case(RdfFormat::Turtle)]
#[test_case(RdfFormat::N3)]
#[test_case(RdfFormat::NTriples)]
fn round_trip_between_backings(format: RdfFormat) -> TestResult {
    let mut source = Store::in_memory(true);
    source.import_str(PEOPLE, Some("turtle"))?;
    let expected = source.size()?;
    assert_eq!(expected, 7);

    let (_dir, mut disk) = disk_store()?;
    disk.import(&source.serialize(format)?[..], Some(format.name()))?;
    assert_eq!(disk.size()?, expected);

    let mut back = Store::in_memory(false);
    back.import(&disk.serialize(format)?[..], Some(format.name()))?;
    assert_eq!(back.size()?, expected);
    Ok(())
}

#[test]
fn size_counts_distinct_triples() -> TestResult {
    let (_dir, mut store) = disk_store()?;
    store.register_prefix("ex", "http://example.org/")?;
    for (i, name) in ["a", "b", "c"].into_iter().enumerate() {
        let before = store.size()?;
        assert_eq!(before, i);
        assert!(store.add_triple(&format!("ex:{name}"), "ex:p", "ex:o", &ObjectKind::Reference)?);
        assert_eq!(store.size()?, before + 1);
    }
    assert!(!store.add_triple("ex:a", "ex:p", "ex:o", &ObjectKind::Reference)?);
    assert_eq!(store.size()?, 3);
    Ok(())
}

#[test]
fn closures_on_disk_store() -> TestResult {
    let (_dir, mut store) = disk_store()?;
    store
        .register_prefix("ex", "http://example.org/")?
        .import_str(PEOPLE, Some("turtle"))?;
    let got = same_as(&store, "ex:subject")?;
    assert_eq!(got.into_iter().collect::<Vec<_>>(), ["ex:subject2"]);
    let got = closure(&store, "ex:Human", "owl:equivalentClass")?;
    assert_eq!(got.into_iter().collect::<Vec<_>>(), ["ex:Person"]);
    assert!(!store.in_transaction());
    Ok(())
}

#[test]
fn query_sees_uncommitted_writes_of_open_transaction() -> TestResult {
    let (_dir, mut store) = disk_store()?;
    store.begin(rdfkb::store::TxMode::Write)?;
    store.add_triple(
        "http://example.org/a",
        "http://example.org/p",
        "v",
        &ObjectKind::PlainLiteral,
    )?;
    let table = query_local(&store, "SELECT ?o WHERE { ?s ?p ?o }")?;
    assert_eq!(table.column("o"), [Some("v")]);
    assert!(store.in_transaction());
    store.rollback()?;
    assert_eq!(store.size()?, 0);
    Ok(())
}

#[test]
fn duplicated_key_is_a_multiple_match() -> TestResult {
    let mut store = Store::in_memory(true);
    store.import_str(
        r#"
        @prefix wd: <http://www.wikidata.org/entity/> .
        @prefix wdt: <http://www.wikidata.org/prop/direct/> .
        wd:Q90 wdt:P1566 "2988507" .
        wd:Q7252 wdt:P1566 "2988507" .
        wd:Q64 wdt:P1566 "2950159" .
        "#,
        Some("turtle"),
    )?;
    let predicate = "http://www.wikidata.org/prop/direct/P1566";
    assert_eq!(
        find_by_literal(&store, predicate, "2950159")?,
        "http://www.wikidata.org/entity/Q64"
    );
    let err = find_by_literal(&store, predicate, "2988507").unwrap_err();
    assert!(matches!(err, Error::MultipleMatch { count: 2, .. }), "{err:?}");
    let err = find_by_literal(&store, predicate, "0").unwrap_err();
    assert!(matches!(err, Error::NotFound(_)), "{err:?}");
    Ok(())
}

#[test]
fn ontology_helpers() -> TestResult {
    let mut store = Store::in_memory(true);
    store.import_str(PEOPLE, Some("turtle"))?;
    let ontology = store.ontology().ok_or("not an ontology store")?;
    assert_eq!(ontology.classes()?, ["http://example.org/Person"]);
    assert!(ontology.ontologies()?.is_empty());
    Ok(())
}
