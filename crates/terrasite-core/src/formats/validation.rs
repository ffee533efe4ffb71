//! Structural XML checks run before KML parsing

use quick_xml::events::Event;
use quick_xml::Reader;

use crate::error::{Result, TerrasiteError};

/// Walk the whole document and fail on the first structural error
///
/// Unclosed elements at end of input and documents without a root element are
/// rejected as well.
pub fn check_well_formed(text: &str) -> Result<()> {
    let mut reader = Reader::from_str(text);
    reader.config_mut().trim_text(true);

    let mut depth: usize = 0;
    let mut roots: usize = 0;

    loop {
        let event = reader.read_event().map_err(|e| {
            parse_error(format!("{} (at byte {})", e, reader.buffer_position()))
        })?;

        match event {
            Event::Start(_) => {
                if depth == 0 {
                    roots += 1;
                }
                depth += 1;
            }
            Event::Empty(_) if depth == 0 => roots += 1,
            Event::End(_) => depth = depth.saturating_sub(1),
            Event::Text(text) if depth == 0 => {
                let content = String::from_utf8_lossy(&text).into_owned();
                if !content.trim().is_empty() {
                    return Err(parse_error("text content outside of the root element"));
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if depth > 0 {
        return Err(parse_error("unexpected end of document, element never closed"));
    }
    match roots {
        0 => Err(parse_error("document has no root element")),
        1 => Ok(()),
        _ => Err(parse_error("document has more than one root element")),
    }
}

fn parse_error(reason: impl Into<String>) -> TerrasiteError {
    TerrasiteError::XmlParse {
        reason: reason.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_well_formed_document() {
        assert!(check_well_formed(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<kml xmlns="http://www.opengis.net/kml/2.2"><Document><name>Site &amp; Co</name><Folder/></Document></kml>"#
        )
        .is_ok());
    }

    #[test]
    fn test_structural_errors() {
        for text in [
            "not valid xml",
            "<kml><Document></kml>",
            "<kml><Document>",
            "<?xml version=\"1.0\"?>",
            "<kml/><kml/>",
        ] {
            let err = check_well_formed(text).unwrap_err();
            assert!(matches!(err, TerrasiteError::XmlParse { .. }), "{}", text);
        }
    }

    #[test]
    fn test_unclosed_element_message() {
        let err = check_well_formed("<kml><Document>").unwrap_err();
        assert!(err.to_string().contains("never closed"));
    }
}
