//! End-to-end flows involving HTTP servers.
use rdfkb::api::{Error, NetworkError};
use rdfkb::loader::FetchConfig;
use rdfkb::sparql::{same_as, EndpointConfig};
use rdfkb::store::Store;
use rdfkb::Toolkit;

type TestResult = Result<(), Box<dyn std::error::Error>>;

const RDF_XML: &str = r#"<?xml version="1.0"?>
<rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#"
         xmlns:owl="http://www.w3.org/2002/07/owl#">
  <rdf:Description rdf:about="http://example.org/subject">
    <owl:sameAs rdf:resource="http://example.org/subject2"/>
  </rdf:Description>
</rdf:RDF>"#;

const ONE_B: &str = r#"<?xml version="1.0"?>
<sparql xmlns="http://www.w3.org/2005/sparql-results#">
  <head><variable name="x"/></head>
  <results>
    <result><binding name="x"><uri>http://example.org/b</uri></binding></result>
  </results>
</sparql>"#;

#[test]
fn import_after_redirect() -> TestResult {
    let mut server = mockito::Server::new();
    let moved = server
        .mock("GET", "/old")
        .with_status(302)
        .with_header("location", "/new")
        .create();
    let doc = server
        .mock("GET", "/new")
        .match_header("accept", "application/xml, application/rdf+xml")
        .with_header("content-type", "application/rdf+xml")
        .with_body(RDF_XML)
        .create();

    let toolkit = Toolkit::new()?;
    let mut store = Store::in_memory(true);
    toolkit.import_url(&mut store, &format!("{}/old", server.url()), &[])?;
    moved.assert();
    doc.assert();

    store.register_prefix("ex", "http://example.org/")?;
    let got = same_as(&store, "ex:subject")?;
    assert_eq!(got.into_iter().collect::<Vec<_>>(), ["ex:subject2"]);
    Ok(())
}

#[test]
fn import_from_unknown_host() -> TestResult {
    let toolkit = Toolkit::with_configs(
        FetchConfig::new().with_connect_timeout_ms(500),
        EndpointConfig::default(),
    )?;
    let mut store = Store::in_memory(false);
    let err = toolkit
        .import_url(&mut store, "http://unknown.host.invalid/onto.owl", &[])
        .unwrap_err();
    assert!(err.to_string().contains("unknown.host.invalid"), "{err}");
    assert!(
        matches!(err, Error::Network(NetworkError::UnknownHost { .. })),
        "{err:?}"
    );
    assert_eq!(store.size()?, 0);
    Ok(())
}

#[test]
fn closure_on_remote_endpoint() -> TestResult {
    let mut server = mockito::Server::new();
    // every one-hop query gets the same answer, so the walk stops after the second node
    let mock = server
        .mock("POST", "/sparql")
        .with_header("content-type", "application/sparql-results+xml")
        .with_body(ONE_B)
        .expect(4)
        .create();

    let toolkit = Toolkit::with_configs(
        FetchConfig::default(),
        EndpointConfig::new().with_prefix("ex", "http://example.org/"),
    )?;
    let endpoint = toolkit.endpoint(&format!("{}/sparql", server.url()))?;
    let got = same_as(&endpoint, "ex:a")?;
    mock.assert();
    assert_eq!(got.into_iter().collect::<Vec<_>>(), ["ex:b"]);
    Ok(())
}

#[test]
fn remote_error_is_not_retried() -> TestResult {
    let mut server = mockito::Server::new();
    let mock = server
        .mock("POST", "/sparql")
        .with_status(503)
        .expect(1)
        .create();

    let toolkit = Toolkit::new()?;
    let endpoint = toolkit.endpoint(&format!("{}/sparql", server.url()))?;
    let err = endpoint.select("SELECT * WHERE { ?s ?p ?o }").unwrap_err();
    mock.assert();
    assert!(
        matches!(
            err,
            Error::Network(NetworkError::Status { code: 503, .. })
        ),
        "{err:?}"
    );
    Ok(())
}
