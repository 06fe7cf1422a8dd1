//! RDF serialization formats.
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use crate::Error;

/// The concrete syntaxes that stores can import and serialize.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RdfFormat {
    /// [RDF/XML](https://www.w3.org/TR/rdf-syntax-grammar/)
    RdfXml,
    /// [Turtle](https://www.w3.org/TR/turtle/)
    Turtle,
    /// [N-Triples](https://www.w3.org/TR/n-triples/)
    NTriples,
    /// [Notation3](https://www.w3.org/TeamSubmission/n3/), restricted to its Turtle subset
    N3,
    /// [TriG](https://www.w3.org/TR/trig/), only available for disk datasets
    TriG,
}

impl RdfFormat {
    /// All supported formats.
    pub const ALL: [RdfFormat; 5] = [
        RdfFormat::RdfXml,
        RdfFormat::Turtle,
        RdfFormat::NTriples,
        RdfFormat::N3,
        RdfFormat::TriG,
    ];

    /// The conventional name of this format.
    pub fn name(self) -> &'static str {
        match self {
            RdfFormat::RdfXml => "RDF/XML",
            RdfFormat::Turtle => "Turtle",
            RdfFormat::NTriples => "N-Triples",
            RdfFormat::N3 => "N3",
            RdfFormat::TriG => "TriG",
        }
    }

    /// The media type of this format.
    pub fn media_type(self) -> &'static str {
        match self {
            RdfFormat::RdfXml => "application/rdf+xml",
            RdfFormat::Turtle => "text/turtle",
            RdfFormat::NTriples => "application/n-triples",
            RdfFormat::N3 => "text/n3",
            RdfFormat::TriG => "application/trig",
        }
    }

    /// Whether this format can hold named graphs.
    pub fn is_quad_format(self) -> bool {
        matches!(self, RdfFormat::TriG)
    }

    /// Guess the format of a file from its extension.
    pub fn from_extension<P: AsRef<Path>>(path: P) -> Option<RdfFormat> {
        let ext = path.as_ref().extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "rdf" | "owl" | "xml" => Some(RdfFormat::RdfXml),
            "ttl" => Some(RdfFormat::Turtle),
            "nt" => Some(RdfFormat::NTriples),
            "n3" => Some(RdfFormat::N3),
            "trig" => Some(RdfFormat::TriG),
            _ => None,
        }
    }

    /// Parse an optional format name, defaulting to RDF/XML.
    pub fn parse_or_default(name: Option<&str>) -> Result<RdfFormat, Error> {
        name.map_or(Ok(RdfFormat::RdfXml), str::parse)
    }

    fn supported() -> String {
        Self::ALL
            .iter()
            .map(|f| f.name())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl FromStr for RdfFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "RDF/XML" | "RDFXML" | "RDF/XML-ABBREV" | "XML" | "APPLICATION/RDF+XML" => {
                Ok(RdfFormat::RdfXml)
            }
            "TURTLE" | "TTL" | "TEXT/TURTLE" => Ok(RdfFormat::Turtle),
            "N-TRIPLES" | "NTRIPLES" | "N-TRIPLE" | "NT" | "APPLICATION/N-TRIPLES" => {
                Ok(RdfFormat::NTriples)
            }
            "N3" | "TEXT/N3" => Ok(RdfFormat::N3),
            "TRIG" | "APPLICATION/TRIG" => Ok(RdfFormat::TriG),
            _ => Err(Error::Configuration(format!(
                "unsupported format {s:?}, expected one of: {}",
                Self::supported()
            ))),
        }
    }
}

impl fmt::Display for RdfFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
