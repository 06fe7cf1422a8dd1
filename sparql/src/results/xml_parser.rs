//! Parse XML-formatted SPARQL results.
use std::borrow::Cow;
use std::collections::HashMap;
use std::io::BufRead;

use quick_xml::events::Event::{CData, Empty, End, Eof, Start, Text};
use quick_xml::events::{BytesStart, BytesText};
use quick_xml::name::{Namespace, QName, ResolveResult};
use quick_xml::NsReader;

use super::{BindingsDocument, ResultValue, ResultsDocument, ResultsError};
use ResultsError::Syntax;

pub fn parse_results_document<R: BufRead>(data: R) -> Result<ResultsDocument, ResultsError> {
    SparqlXmlParser::new(data).parse_results_document()
}

struct SparqlXmlParser<R: BufRead> {
    events: NsReader<R>,
    buf: Vec<u8>,
}

impl<R: BufRead> SparqlXmlParser<R> {
    fn new(data: R) -> Self {
        let mut events = NsReader::from_reader(data);
        events.config_mut().expand_empty_elements = true;
        Self {
            events,
            buf: vec![],
        }
    }

    fn parse_results_document(&mut self) -> Result<ResultsDocument, ResultsError> {
        self.next_start_expecting("sparql")?;
        self.next_start_expecting("head")?;
        let mut variables: Vec<Box<str>> = vec![];
        while let Some(elt) = self.next_empty()? {
            let (ns, local_name) = self.events.resolve_element(elt.name());
            if ns != ResolveResult::Bound(NS) {
                return Err(Syntax(format!(
                    "unrecognized element in <head>: {local_name:?}"
                )));
            }
            match local_name.into_inner() {
                b"variable" => variables.push(self.get_attr(&elt, "name")?),
                b"link" => continue,
                _ => return Err(Syntax(format!("unknown element <{local_name:?}>"))),
            }
        }
        match self.next_start()? {
            Some(elt) if self.check_element(&elt, "results") => {
                Ok(ResultsDocument::Bindings(BindingsDocument {
                    variables,
                    solutions: self.parse_solutions()?,
                }))
            }
            Some(elt) if variables.is_empty() && self.check_element(&elt, "boolean") => {
                match self.next_text(true)?.as_ref() {
                    "true" => Ok(ResultsDocument::Boolean(true)),
                    "false" => Ok(ResultsDocument::Boolean(false)),
                    other => Err(Syntax(format!("unrecognized boolean value '{other}'"))),
                }
            }
            Some(elt) => Err(Syntax(format!(
                "expected <results> or <boolean>, found {:?}",
                elt.name()
            ))),
            None => Err(Syntax("expected <results> or <boolean>, found nothing".into())),
        }
    }

    fn parse_solutions(&mut self) -> Result<Vec<HashMap<Box<str>, ResultValue>>, ResultsError> {
        let mut solutions = vec![];
        while self.next_start_expecting_maybe("result")?.is_some() {
            let mut solution = HashMap::new();
            while let Some(binding) = self.next_start_expecting_maybe("binding")? {
                let name = self.get_attr(&binding, "name")?;
                let Some(elt) = self.next_start()? else {
                    return Err(Syntax(format!("no child in <binding name='{name}'>")));
                };
                let value = self.parse_value(&elt, &name)?;
                self.expect_closing(binding.name())?;
                solution.insert(name, value);
            }
            solutions.push(solution);
        }
        Ok(solutions)
    }

    fn parse_value(
        &mut self,
        start: &BytesStart<'static>,
        name: &str,
    ) -> Result<ResultValue, ResultsError> {
        let (ns, local_name) = self.events.resolve_element(start.name());
        if ns != ResolveResult::Bound(NS) {
            return Err(Syntax(format!(
                "unrecognized term in <binding name='{name}'>: {:?}",
                start.name()
            )));
        }
        let kind = local_name.into_inner().to_vec();
        // the lexical form of literals is significant, including its white spaces
        let text: Box<str> = self.next_text(&kind[..] != b"literal")?.into();
        match &kind[..] {
            b"uri" => Ok(ResultValue::Uri(text)),
            b"bnode" => Ok(ResultValue::Bnode(text)),
            b"literal" => {
                if let Some(lang) = self.get_attr_maybe(start, "xml:lang")? {
                    Ok(ResultValue::Lang(text, lang))
                } else if let Some(datatype) = self.get_attr_maybe(start, "datatype")? {
                    Ok(ResultValue::Typed(text, datatype))
                } else {
                    Ok(ResultValue::Simple(text))
                }
            }
            other => Err(Syntax(format!(
                "unrecognized term in <binding name='{name}'>: {:?}",
                String::from_utf8_lossy(other)
            ))),
        }
    }

    fn next_start_expecting(&mut self, local_name: &str) -> Result<BytesStart<'static>, ResultsError> {
        match self.next_start_expecting_maybe(local_name)? {
            None => Err(Syntax(format!("expected <{local_name}>, found no element"))),
            Some(elt) => Ok(elt),
        }
    }

    fn next_start_expecting_maybe(
        &mut self,
        local_name: &str,
    ) -> Result<Option<BytesStart<'static>>, ResultsError> {
        if let Some(start) = self.next_start()? {
            if self.check_element(&start, local_name) {
                Ok(Some(start))
            } else {
                Err(Syntax(format!(
                    "expected <{local_name}>, found {:?}",
                    start.name()
                )))
            }
        } else {
            Ok(None)
        }
    }

    fn next_start(&mut self) -> Result<Option<BytesStart<'static>>, ResultsError> {
        loop {
            match self.events.read_event_into(&mut self.buf)? {
                Start(s) => return Ok(Some(s.into_owned())),
                End(_) | Eof => return Ok(None),
                _ => continue,
            }
        }
    }

    fn next_empty(&mut self) -> Result<Option<BytesStart<'static>>, ResultsError> {
        loop {
            match self.events.read_event_into(&mut self.buf)? {
                Empty(s) => return Ok(Some(s.into_owned())),
                Start(s) => {
                    let s = s.into_owned();
                    self.expect_closing(s.name())?;
                    return Ok(Some(s));
                }
                End(_) | Eof => return Ok(None),
                _ => continue,
            }
        }
    }

    fn next_text(&mut self, trim: bool) -> Result<String, ResultsError> {
        loop {
            match self.events.read_event_into(&mut self.buf)? {
                Text(e) => {
                    let text = if trim {
                        txt(e)?.map_or_else(String::new, Cow::into_owned)
                    } else {
                        e.unescape()?.into_owned()
                    };
                    self.skip_to_end()?;
                    return Ok(text);
                }
                End(_) => return Ok(String::new()),
                Start(_) | Empty(_) => return Err(Syntax("unexpected child element".into())),
                CData(_) => return Err(Syntax("unexpected CDATA".into())),
                Eof => return Err(Syntax("unexpected end of document".into())),
                _ => continue,
            }
        }
    }

    fn skip_to_end(&mut self) -> Result<(), ResultsError> {
        loop {
            match self.events.read_event_into(&mut self.buf)? {
                End(_) => return Ok(()),
                Eof => return Err(Syntax("unexpected end of document".into())),
                Start(_) | Empty(_) => return Err(Syntax("unexpected child element".into())),
                _ => continue,
            }
        }
    }

    fn expect_closing(&mut self, name: QName<'_>) -> Result<(), ResultsError> {
        loop {
            match self.events.read_event_into(&mut self.buf)? {
                End(e) if e.name() == name => return Ok(()),
                Start(_) | Empty(_) | CData(_) => {
                    return Err(Syntax(format!("spurious content in {name:?}")))
                }
                Text(e) => {
                    if txt(e)?.is_some() {
                        return Err(Syntax(format!("spurious text in {name:?}")));
                    }
                }
                Eof => return Err(Syntax("unexpected end of document".into())),
                _ => continue,
            }
        }
    }

    fn get_attr(&mut self, start: &BytesStart<'_>, key: &str) -> Result<Box<str>, ResultsError> {
        self.get_attr_maybe(start, key)?
            .ok_or_else(|| Syntax(format!("attribute '{key}' not found")))
    }

    fn get_attr_maybe(
        &mut self,
        start: &BytesStart<'_>,
        key: &str,
    ) -> Result<Option<Box<str>>, ResultsError> {
        let key = QName(key.as_bytes());
        for res in start.attributes() {
            let attr = res?;
            if attr.key == key {
                return Ok(Some(
                    attr.decode_and_unescape_value(self.events.decoder())?
                        .into(),
                ));
            }
        }
        Ok(None)
    }

    fn check_element(&mut self, start: &BytesStart<'_>, local_name: &str) -> bool {
        let (ns, local) = self.events.resolve_element(start.name());
        local.as_ref() == local_name.as_bytes() && ns == ResolveResult::Bound(NS)
    }
}

fn txt(mut bytes_text: BytesText<'_>) -> Result<Option<Cow<'_, str>>, ResultsError> {
    bytes_text.inplace_trim_start();
    if bytes_text.inplace_trim_end() {
        Ok(None)
    } else {
        Ok(Some(bytes_text.unescape()?))
    }
}

const NS: Namespace = Namespace(b"http://www.w3.org/2005/sparql-results#");
