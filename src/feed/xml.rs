//! Flat record extraction for the SAR XML responses.
//!
//! Both feeds answer with a root element holding repeated record elements,
//! each of which holds simple text children:
//!
//! ```xml
//! <ArrayOfReservatorio xmlns="http://sarws.ana.gov.br/">
//!   <Reservatorio>
//!     <VolumePercentual>42,5</VolumePercentual>
//!     <DataInformacao>01/06/2024</DataInformacao>
//!   </Reservatorio>
//! </ArrayOfReservatorio>
//! ```
//!
//! Element names are matched on their local part, so namespace prefixes and
//! default namespaces make no difference. Anything nested deeper than the
//! record's direct children is ignored.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::collections::HashMap;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FeedXmlError {
    #[error("Invalid XML")]
    Syntax(#[from] quick_xml::Error),

    #[error("Response has no root element")]
    NoRootElement,

    #[error("Response ended inside an open element")]
    Truncated,
}

/// The text children of one record element, keyed by local name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct XmlRecord {
    fields: HashMap<String, String>,
}

impl XmlRecord {
    /// Text of the named child, trimmed. `None` if the child is absent.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(|s| s.trim())
    }

    /// Like [`XmlRecord::get`], but treats an empty child as absent.
    pub fn non_empty(&self, name: &str) -> Option<&str> {
        self.get(name).filter(|s| !s.is_empty())
    }

    fn insert(&mut self, name: String, value: String) {
        // First occurrence wins if a child is repeated.
        self.fields.entry(name).or_insert(value);
    }
}

/// Collects the direct children of the root element as records.
///
/// With `record_tag` set, only children with that local name are collected.
/// Records are returned in document order.
pub fn extract_records(
    body: &str,
    record_tag: Option<&str>,
) -> Result<Vec<XmlRecord>, FeedXmlError> {
    let mut reader = Reader::from_str(body);
    reader.config_mut().trim_text(true);

    let accepts = |name: &str| record_tag.map_or(true, |tag| tag == name);

    let mut records = Vec::new();
    let mut seen_root = false;
    let mut depth = 0usize;
    let mut current: Option<XmlRecord> = None;
    let mut field: Option<(String, String)> = None;

    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                depth += 1;
                match depth {
                    1 => seen_root = true,
                    2 if accepts(&local_name(&e)) => current = Some(XmlRecord::default()),
                    3 if current.is_some() => field = Some((local_name(&e), String::new())),
                    _ => {}
                }
            }
            Event::Empty(e) => match depth + 1 {
                1 => seen_root = true,
                2 if accepts(&local_name(&e)) => records.push(XmlRecord::default()),
                3 => {
                    if let Some(record) = current.as_mut() {
                        record.insert(local_name(&e), String::new());
                    }
                }
                _ => {}
            },
            Event::Text(text) => {
                if depth == 3 {
                    if let Some((_, value)) = field.as_mut() {
                        value.push_str(&text.unescape()?);
                    }
                }
            }
            Event::CData(data) => {
                if depth == 3 {
                    if let Some((_, value)) = field.as_mut() {
                        value.push_str(&String::from_utf8_lossy(&data.into_inner()));
                    }
                }
            }
            Event::End(_) => {
                match depth {
                    3 => {
                        if let (Some(record), Some((name, value))) = (current.as_mut(), field.take())
                        {
                            record.insert(name, value);
                        }
                    }
                    2 => {
                        if let Some(record) = current.take() {
                            records.push(record);
                        }
                    }
                    _ => {}
                }
                depth = depth.saturating_sub(1);
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if !seen_root {
        return Err(FeedXmlError::NoRootElement);
    }
    if depth != 0 {
        return Err(FeedXmlError::Truncated);
    }
    Ok(records)
}

fn local_name(element: &BytesStart<'_>) -> String {
    String::from_utf8_lossy(element.local_name().as_ref()).into_owned()
}
