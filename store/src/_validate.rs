//! Shape validation, delegated to an external engine.
use std::fmt;

use rdfkb_api::Result;

use crate::Store;

/// The outcome of validating a store against a shape.
pub trait ValidationReport {
    /// Whether every focus node conforms to the shape.
    fn conforms(&self) -> bool;

    /// A human-readable dump of the validation, for diagnostics.
    fn diagnostics(&self) -> String;
}

/// An engine able to validate a [`Store`] against a shape schema (e.g. ShEx).
///
/// rdfkb does not evaluate shape expressions itself:
/// applications plug their engine of choice through this trait.
pub trait ShapeValidator {
    /// The report produced by this validator.
    type Report: ValidationReport;

    /// Validate every node of type `focus_type` in `store`
    /// against the shape `shape` defined in `schema`.
    ///
    /// `schema` is the source text of the schema,
    /// `shape` and `focus_type` are IRIs (or prefixed names known to `store`).
    fn validate(
        &self,
        store: &Store,
        schema: &str,
        shape: &str,
        focus_type: &str,
    ) -> Result<Self::Report>;
}

/// A simple [`ValidationReport`] made of a conformance flag and a list of messages.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ShapeReport {
    conforms: bool,
    messages: Vec<String>,
}

impl ShapeReport {
    /// A report stating that all focus nodes conform.
    pub fn conforming() -> Self {
        ShapeReport {
            conforms: true,
            messages: vec![],
        }
    }

    /// A report stating that some focus nodes do not conform, for the given reasons.
    pub fn failing<I, S>(messages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ShapeReport {
            conforms: false,
            messages: messages.into_iter().map(Into::into).collect(),
        }
    }

    /// Add a message to this report.
    pub fn with_message<S: Into<String>>(mut self, message: S) -> Self {
        self.messages.push(message.into());
        self
    }

    /// The messages of this report.
    pub fn messages(&self) -> &[String] {
        &self.messages
    }
}

impl ValidationReport for ShapeReport {
    fn conforms(&self) -> bool {
        self.conforms
    }

    fn diagnostics(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for ShapeReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.conforms {
            write!(f, "conforms")?;
        } else {
            write!(f, "does not conform")?;
        }
        for msg in &self.messages {
            write!(f, "\n- {msg}")?;
        }
        Ok(())
    }
}

impl Store {
    /// Validate this store with `validator`.
    ///
    /// See [`ShapeValidator::validate`].
    pub fn validate_shape<V: ShapeValidator>(
        &self,
        validator: &V,
        schema: &str,
        shape: &str,
        focus_type: &str,
    ) -> Result<V::Report> {
        log::debug!("validating {} against shape {shape}", self.name());
        validator.validate(self, schema, shape, focus_type)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use rdfkb_api::ObjectKind;

    type TestResult = Result<(), Box<dyn std::error::Error>>;

    /// Requires every instance of the focus type to carry an `rdfs:label`.
    struct LabelRequired;

    impl ShapeValidator for LabelRequired {
        type Report = ShapeReport;

        fn validate(
            &self,
            store: &Store,
            _schema: &str,
            _shape: &str,
            focus_type: &str,
        ) -> Result<ShapeReport> {
            let mut missing = vec![];
            for s in store.subjects("rdf:type", focus_type)? {
                if store.objects(&s, "rdfs:label")?.is_empty() {
                    missing.push(format!("{s} has no label"));
                }
            }
            Ok(if missing.is_empty() {
                ShapeReport::conforming()
            } else {
                ShapeReport::failing(missing)
            })
        }
    }

    #[test]
    fn validator_sees_the_store() -> TestResult {
        let mut store = Store::in_memory(true);
        store.register_prefix("ex", "http://example.org/")?;
        store.add_triple("ex:a", "rdf:type", "ex:Thing", &ObjectKind::Reference)?;
        let report = store.validate_shape(&LabelRequired, "", "ex:ThingShape", "ex:Thing")?;
        assert!(!report.conforms());
        assert_eq!(report.messages(), ["http://example.org/a has no label"]);
        assert!(report.diagnostics().contains("does not conform"));

        store.add_triple("ex:a", "rdfs:label", "A", &ObjectKind::PlainLiteral)?;
        let report = store.validate_shape(&LabelRequired, "", "ex:ThingShape", "ex:Thing")?;
        assert!(report.conforms());
        assert_eq!(report.diagnostics(), "conforms");
        Ok(())
    }
}
