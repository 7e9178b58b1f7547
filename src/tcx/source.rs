use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use log::info;
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

use crate::TcxError;
use crate::config::DecoderConfig;

use super::{Activity, TcxDecoder};

/// Receiver of markup events in document order.
///
/// Element names are passed as written in the document, prefix included.
pub trait TagEventHandler {
    fn open_element(&mut self, name: &str, attributes: &[(String, String)]);

    fn text(&mut self, text: &str);

    fn close_element(&mut self, name: &str);
}

/// Looks up an attribute by local name, ignoring any namespace prefix.
pub fn attribute<'a>(attributes: &'a [(String, String)], key: &str) -> Option<&'a str> {
    attributes
        .iter()
        .find(|(name, _)| name.rsplit(':').next() == Some(key))
        .map(|(_, value)| value.as_str())
}

fn element_attributes<R>(
    reader: &Reader<R>,
    element: &BytesStart<'_>,
) -> Result<Vec<(String, String)>, TcxError> {
    let mut attributes = Vec::new();
    for attr in element.attributes() {
        let attr = attr.map_err(|e| TcxError::MarkupError {
            position: reader.buffer_position() as u64,
            source: e.into(),
        })?;
        let value = attr
            .unescape_value()
            .map_err(|e| TcxError::MarkupError {
                position: reader.buffer_position() as u64,
                source: e,
            })?
            .into_owned();
        attributes.push((String::from_utf8_lossy(attr.key.as_ref()).into_owned(), value));
    }
    Ok(attributes)
}

/// Reads markup from `input` and pushes every event into `handler`.
///
/// Self-closing elements are reported as an open immediately followed by a
/// close. Whitespace-only text is not reported.
pub fn stream_events<R: BufRead, H: TagEventHandler>(
    input: R,
    handler: &mut H,
) -> Result<(), TcxError> {
    let mut reader = Reader::from_reader(input);
    reader.config_mut().trim_text(true);

    let mut buf = Vec::new();
    loop {
        let event = reader
            .read_event_into(&mut buf)
            .map_err(|e| TcxError::MarkupError {
                position: reader.buffer_position() as u64,
                source: e,
            })?;
        match event {
            Event::Start(element) => {
                let name = String::from_utf8_lossy(element.name().as_ref()).into_owned();
                let attributes = element_attributes(&reader, &element)?;
                handler.open_element(&name, &attributes);
            }
            Event::Empty(element) => {
                let name = String::from_utf8_lossy(element.name().as_ref()).into_owned();
                let attributes = element_attributes(&reader, &element)?;
                handler.open_element(&name, &attributes);
                handler.close_element(&name);
            }
            Event::End(element) => {
                handler.close_element(&String::from_utf8_lossy(element.name().as_ref()));
            }
            Event::Text(text) => {
                let text = text.unescape().map_err(|e| TcxError::MarkupError {
                    position: reader.buffer_position() as u64,
                    source: e,
                })?;
                handler.text(&text);
            }
            Event::CData(data) => handler.text(&String::from_utf8_lossy(&data)),
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }
    Ok(())
}

pub fn decode_reader<R: BufRead>(
    input: R,
    config: DecoderConfig,
) -> Result<Vec<Activity>, TcxError> {
    let mut decoder = TcxDecoder::new(config);
    stream_events(input, &mut decoder)?;
    Ok(decoder.finish())
}

pub fn decode_str(input: &str, config: DecoderConfig) -> Result<Vec<Activity>, TcxError> {
    decode_reader(input.as_bytes(), config)
}

pub fn decode_file(path: &Path, config: DecoderConfig) -> Result<Vec<Activity>, TcxError> {
    if !path.exists() {
        return Err(TcxError::InvalidInputFile {
            path: format!("{:?}", path),
        });
    }
    let file = File::open(path).map_err(|e| TcxError::InputIOError { source: e })?;
    let activities = decode_reader(BufReader::new(file), config)?;
    info!("Loaded {:?}, found {} activities", path, activities.len());
    Ok(activities)
}
