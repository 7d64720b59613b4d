//! Encoding resolution for raw source bytes.
//!
//! Candidates are tried in configured order; the first one that decodes the
//! whole buffer without a malformed sequence wins. A byte-order mark matching
//! the candidate is stripped before decoding.

use encoding_rs::{Encoding, UTF_8};
use tracing::debug;

use crate::error::{Result, TabularError};

/// An encoding to try, as configured (`label`) and as resolved (`encoding`).
#[derive(Debug, Clone)]
pub struct EncodingCandidate {
    label: String,
    encoding: &'static Encoding,
}

impl EncodingCandidate {
    /// Resolve a label such as `utf-8`, `utf-8-sig`, `cp1252` or `latin1`.
    ///
    /// `utf-8-sig` is accepted as UTF-8; the BOM is stripped for every
    /// candidate whose encoding matches it.
    pub fn from_label(label: &str) -> Result<Self> {
        let normalized = label.trim().to_ascii_lowercase();
        let encoding = match normalized.as_str() {
            "utf-8-sig" | "utf8-sig" => Some(UTF_8),
            "cp1252" => Encoding::for_label(b"windows-1252"),
            other => Encoding::for_label(other.as_bytes()),
        }
        .ok_or_else(|| TabularError::UnknownEncoding(label.to_string()))?;

        Ok(Self {
            label: normalized,
            encoding,
        })
    }

    /// The label as configured (lower-cased).
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Canonical WHATWG name of the resolved encoding.
    pub fn encoding_name(&self) -> &'static str {
        self.encoding.name()
    }
}

/// Resolve an ordered list of labels, failing on the first unknown label.
pub fn resolve_candidates<S: AsRef<str>>(labels: &[S]) -> Result<Vec<EncodingCandidate>> {
    labels
        .iter()
        .map(|l| EncodingCandidate::from_label(l.as_ref()))
        .collect()
}

/// Successfully decoded source text.
#[derive(Debug, Clone)]
pub struct DecodedSource {
    /// Decoded text, BOM removed.
    pub text: String,
    /// Label of the candidate that succeeded.
    pub label: String,
    /// Canonical name of the encoding used.
    pub encoding: &'static str,
    /// Whether a byte-order mark was stripped.
    pub bom_stripped: bool,
}

/// Decode `bytes` with the first candidate that accepts them.
///
/// Returns [`TabularError::Encoding`] naming the source and every candidate
/// tried when all of them fail.
pub fn decode(
    source_name: &str,
    bytes: &[u8],
    candidates: &[EncodingCandidate],
) -> Result<DecodedSource> {
    for candidate in candidates {
        let (body, bom_stripped) = strip_bom(bytes, candidate.encoding);

        match candidate
            .encoding
            .decode_without_bom_handling_and_without_replacement(body)
        {
            Some(text) => {
                debug!(
                    source = source_name,
                    encoding = candidate.encoding.name(),
                    bom_stripped,
                    "decoded source"
                );
                return Ok(DecodedSource {
                    text: text.into_owned(),
                    label: candidate.label.clone(),
                    encoding: candidate.encoding.name(),
                    bom_stripped,
                });
            }
            None => {
                debug!(
                    source = source_name,
                    encoding = candidate.label.as_str(),
                    "candidate rejected"
                );
            }
        }
    }

    Err(TabularError::Encoding {
        source_name: source_name.to_string(),
        tried: candidates.iter().map(|c| c.label.clone()).collect(),
    })
}

fn strip_bom<'a>(bytes: &'a [u8], encoding: &'static Encoding) -> (&'a [u8], bool) {
    match Encoding::for_bom(bytes) {
        Some((bom_encoding, len)) if bom_encoding == encoding => (&bytes[len..], true),
        _ => (bytes, false),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidates(labels: &[&str]) -> Vec<EncodingCandidate> {
        resolve_candidates(labels).unwrap()
    }

    #[test]
    fn utf8_wins_when_valid() {
        let decoded = decode(
            "skills.csv",
            "Kochen,Küche".as_bytes(),
            &candidates(&["utf-8", "windows-1252"]),
        )
        .unwrap();
        assert_eq!(decoded.text, "Kochen,Küche");
        assert_eq!(decoded.encoding, "UTF-8");
        assert!(!decoded.bom_stripped);
    }

    #[test]
    fn bom_is_stripped() {
        let mut bytes = vec![0xEF, 0xBB, 0xBF];
        bytes.extend_from_slice(b"conceptUri,preferredLabel");
        let decoded = decode("s.csv", &bytes, &candidates(&["utf-8-sig", "utf-8"])).unwrap();
        assert_eq!(decoded.text, "conceptUri,preferredLabel");
        assert_eq!(decoded.label, "utf-8-sig");
        assert!(decoded.bom_stripped);
    }

    #[test]
    fn falls_back_to_single_byte_code_page() {
        // "Küche" in windows-1252: 0xFC is not valid UTF-8 on its own
        let bytes = b"K\xFCche";
        let decoded = decode("s.csv", bytes, &candidates(&["utf-8", "cp1252"])).unwrap();
        assert_eq!(decoded.text, "Küche");
        assert_eq!(decoded.encoding, "windows-1252");
        assert_eq!(decoded.label, "cp1252");
    }

    #[test]
    fn all_candidates_failing_names_source_and_candidates() {
        let err = decode("broken.csv", b"\xFF\xFE\xFD", &candidates(&["utf-8", "utf-8-sig"]))
            .unwrap_err();
        match &err {
            TabularError::Encoding { source_name, tried } => {
                assert_eq!(source_name, "broken.csv");
                assert_eq!(tried, &vec!["utf-8".to_string(), "utf-8-sig".to_string()]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(err.to_string().contains("broken.csv"));
    }

    #[test]
    fn unknown_label_is_rejected() {
        let err = EncodingCandidate::from_label("klingon-8").unwrap_err();
        assert!(matches!(err, TabularError::UnknownEncoding(_)));
    }

    #[test]
    fn latin1_aliases_resolve() {
        for label in ["latin1", "iso-8859-1", "ISO-8859-1"] {
            let c = EncodingCandidate::from_label(label).unwrap();
            assert_eq!(c.encoding_name(), "windows-1252");
        }
    }
}
