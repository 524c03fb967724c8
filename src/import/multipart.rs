// src/import/multipart.rs
//
// Minimal multipart/form-data reader for the upload form. Only what a browser
// sends is handled: CRLF line endings and a Content-Disposition per part.

use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum MultipartError {
    #[error("expected multipart/form-data with a boundary")]
    NotMultipart,
    #[error("malformed multipart body")]
    Malformed,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Part {
    pub name: String,
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub data: Vec<u8>,
}

/// Extracts the boundary from a `multipart/form-data` Content-Type header.
pub fn boundary(content_type: &str) -> Result<String, MultipartError> {
    let m: mime::Mime = content_type
        .parse()
        .map_err(|_| MultipartError::NotMultipart)?;

    if m.type_() != mime::MULTIPART || m.subtype() != mime::FORM_DATA {
        return Err(MultipartError::NotMultipart);
    }
    m.get_param(mime::BOUNDARY)
        .map(|b| b.as_str().to_string())
        .filter(|b| !b.is_empty())
        .ok_or(MultipartError::NotMultipart)
}

fn find(haystack: &[u8], needle: &[u8], from: usize) -> Option<usize> {
    if from > haystack.len() {
        return None;
    }
    haystack[from..]
        .windows(needle.len())
        .position(|w| w == needle)
        .map(|i| i + from)
}

/// Reads a `key="value"` (or bare `key=value`) parameter from a header value.
fn header_param(value: &str, key: &str) -> Option<String> {
    value.split(';').skip(1).find_map(|p| {
        let (k, v) = p.trim().split_once('=')?;
        if !k.trim().eq_ignore_ascii_case(key) {
            return None;
        }
        let v = v.trim();
        Some(v.strip_prefix('"').and_then(|v| v.strip_suffix('"')).unwrap_or(v).to_string())
    })
}

fn parse_part(raw: &[u8]) -> Result<Part, MultipartError> {
    let split = find(raw, b"\r\n\r\n", 0).ok_or(MultipartError::Malformed)?;
    let head = std::str::from_utf8(&raw[..split]).map_err(|_| MultipartError::Malformed)?;

    let mut name = None;
    let mut file_name = None;
    let mut content_type = None;

    for line in head.split("\r\n") {
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let value = value.trim();
        if key.trim().eq_ignore_ascii_case("content-disposition") {
            name = header_param(value, "name");
            file_name = header_param(value, "filename");
        } else if key.trim().eq_ignore_ascii_case("content-type") {
            content_type = Some(value.to_string());
        }
    }

    Ok(Part {
        name: name.ok_or(MultipartError::Malformed)?,
        file_name,
        content_type,
        data: raw[split + 4..].to_vec(),
    })
}

pub fn parse_multipart(body: &[u8], boundary: &str) -> Result<Vec<Part>, MultipartError> {
    let delimiter = format!("--{boundary}").into_bytes();
    let next_delimiter = format!("\r\n--{boundary}").into_bytes();

    let mut pos = find(body, &delimiter, 0).ok_or(MultipartError::Malformed)? + delimiter.len();
    let mut parts = Vec::new();

    loop {
        let rest = &body[pos..];
        if rest.starts_with(b"--") {
            return Ok(parts);
        }
        if !rest.starts_with(b"\r\n") {
            return Err(MultipartError::Malformed);
        }
        let start = pos + 2;
        let end = find(body, &next_delimiter, start).ok_or(MultipartError::Malformed)?;
        parts.push(parse_part(&body[start..end])?);
        pos = end + next_delimiter.len();
    }
}

/// The first part carrying the given field name.
pub fn file_field(parts: Vec<Part>, field: &str) -> Option<Part> {
    parts.into_iter().find(|p| p.name == field)
}

#[cfg(test)]
mod tests {
    use super::*;

    const BODY: &str = "--XyZ\r\n\
        Content-Disposition: form-data; name=\"note\"\r\n\
        \r\n\
        hello\r\n\
        --XyZ\r\n\
        Content-Disposition: form-data; name=\"file\"; filename=\"leads.csv\"\r\n\
        Content-Type: text/csv\r\n\
        \r\n\
        fullName,phone\r\nJane Doe,9999999999\r\n\
        \r\n--XyZ--\r\n";

    #[test]
    fn boundary_from_content_type() {
        assert_eq!(
            boundary("multipart/form-data; boundary=XyZ").unwrap(),
            "XyZ"
        );
        assert_eq!(
            boundary("application/json"),
            Err(MultipartError::NotMultipart)
        );
        assert_eq!(
            boundary("multipart/form-data"),
            Err(MultipartError::NotMultipart)
        );
    }

    #[test]
    fn parts_are_split_on_boundary() {
        let parts = parse_multipart(BODY.as_bytes(), "XyZ").unwrap();
        assert_eq!(parts.len(), 2);
        assert_eq!(parts[0].name, "note");
        assert_eq!(parts[0].data, b"hello");
        assert_eq!(parts[0].file_name, None);

        let file = file_field(parts, "file").unwrap();
        assert_eq!(file.file_name.as_deref(), Some("leads.csv"));
        assert_eq!(file.content_type.as_deref(), Some("text/csv"));
        assert_eq!(file.data, b"fullName,phone\r\nJane Doe,9999999999\r\n");
    }

    #[test]
    fn truncated_body_is_malformed() {
        let cut = &BODY.as_bytes()[..BODY.len() - 12];
        assert_eq!(
            parse_multipart(cut, "XyZ"),
            Err(MultipartError::Malformed)
        );
        assert_eq!(
            parse_multipart(b"no boundary here", "XyZ"),
            Err(MultipartError::Malformed)
        );
    }
}
