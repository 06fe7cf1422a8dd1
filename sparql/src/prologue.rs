//! Extraction of the prefix declarations of a SPARQL query.
use lazy_static::lazy_static;
use rdfkb_api::Prefixes;
use regex::Regex;

lazy_static! {
    static ref PREFIX_DECL: Regex =
        Regex::new(r"(?i)\bPREFIX\s+([A-Za-z][\w.-]*)?:\s*<([^>]*)>").unwrap();
}

/// The prefixes declared in the prologue of `sparql`, in declaration order.
///
/// The query is not otherwise parsed: declarations are recognized
/// wherever they appear, and no error is raised for malformed queries.
pub fn prologue_prefixes(sparql: &str) -> Prefixes {
    PREFIX_DECL
        .captures_iter(sparql)
        .map(|c| {
            let prefix = c.get(1).map_or("", |m| m.as_str());
            (prefix.to_string(), c[2].to_string())
        })
        .collect()
}

#[cfg(test)]
mod test {
    use super::*;
    use test_case::test_case;

    #[test_case("SELECT * { ?s ?p ?o }", &[]; "none")]
    #[test_case("PREFIX ex: <http://example.org/> SELECT * {}", &[("ex", "http://example.org/")]; "one")]
    #[test_case(
        "prefix owl:<http://www.w3.org/2002/07/owl#>\nPREFIX : <http://example.org/>\nSELECT * {}",
        &[("owl", "http://www.w3.org/2002/07/owl#"), ("", "http://example.org/")];
        "lowercase and default"
    )]
    #[test_case(
        "PREFIX a: <http://a.example/> PREFIX a: <http://b.example/> ASK {}",
        &[("a", "http://a.example/"), ("a", "http://b.example/")];
        "redeclared"
    )]
    fn extract(sparql: &str, expected: &[(&str, &str)]) {
        let got = prologue_prefixes(sparql);
        assert_eq!(got.iter().collect::<Vec<_>>(), expected);
    }
}
