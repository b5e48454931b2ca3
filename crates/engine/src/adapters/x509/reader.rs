use std::io::Read;

use x509_cert::der::asn1::AnyRef;
use x509_cert::der::pem::PemLabel;
use x509_cert::der::{Decode, DecodePem, Tag, Tagged};
use x509_cert::Certificate;

use crate::domain::error::{EngineError, EngineResult};
use crate::domain::types::{CertificateSource, ExtensionSet, LimitsConfig};
use super::constants::{PEM_BEGIN, PEM_DASHES, PEM_END};

/// Loads the PEM text for a source, enforcing the size limit.
pub fn load_pem(source: &CertificateSource, limits: &LimitsConfig) -> EngineResult<Vec<u8>> {
  let max = limits.max_certificate_pem_size;
  match source {
    CertificateSource::Path(path) => {
      let file = std::fs::File::open(path)?;
      let mut data = Vec::new();
      // Read one byte past the limit so oversize files are detected without loading them.
      file.take(max as u64 + 1).read_to_end(&mut data)?;
      if data.len() > max {
        return Err(EngineError::Limit(format!("certificate file larger than {max} bytes")));
      }
      Ok(data)
    }
    CertificateSource::Bytes { data } => {
      if data.len() > max {
        return Err(EngineError::Limit(format!(
          "certificate PEM is {} bytes (max: {max})", data.len()
        )));
      }
      Ok(data.clone())
    }
  }
}

/// Decodes a PEM certificate and collects its extensions, keyed by dotted OID.
///
/// The input may be a bundle: other PEM blocks (a private key, say) and text
/// between blocks are skipped, but exactly one `CERTIFICATE` block must be
/// present. Only decoding happens here. Signatures, validity and issuer are
/// not checked.
pub fn read_extensions(source: &CertificateSource, limits: &LimitsConfig) -> EngineResult<ExtensionSet> {
  let pem = load_pem(source, limits)?;
  let cert = Certificate::from_pem(certificate_block(&pem)?)?;

  let extensions = cert.tbs_certificate.extensions.unwrap_or_default();
  if extensions.len() > limits.max_extensions {
    return Err(EngineError::Limit(format!(
      "certificate carries {} extensions (max: {})", extensions.len(), limits.max_extensions
    )));
  }

  Ok(extensions
    .iter()
    .map(|ext| (ext.extn_id.to_string(), decode_value(ext.extn_value.as_bytes())))
    .collect())
}

/// Extension values are normally a DER string; anything else is taken as
/// raw bytes.
pub fn decode_value(raw: &[u8]) -> String {
  if let Ok(any) = AnyRef::from_der(raw) {
    if matches!(any.tag(), Tag::Utf8String | Tag::Ia5String | Tag::PrintableString) {
      if let Ok(s) = std::str::from_utf8(any.value()) {
        return s.to_string();
      }
    }
  }
  String::from_utf8_lossy(raw).into_owned()
}

/// Picks the single `CERTIFICATE` block out of a PEM bundle.
pub fn certificate_block(pem: &[u8]) -> EngineResult<&[u8]> {
  let certs: Vec<&[u8]> = pem_blocks(pem)?
    .into_iter()
    .filter(|(label, _)| *label == Certificate::PEM_LABEL)
    .map(|(_, block)| block)
    .collect();
  match certs.as_slice() {
    [one] => Ok(*one),
    [] => Err(EngineError::CertificateParse("no PEM CERTIFICATE block found".into())),
    many => Err(EngineError::CertificateParse(format!(
      "expected one PEM CERTIFICATE block, found {}", many.len()
    ))),
  }
}

/// Splits PEM text into `(label, block)` pairs. Each block runs from its
/// BEGIN boundary through the matching END boundary.
fn pem_blocks(pem: &[u8]) -> EngineResult<Vec<(&str, &[u8])>> {
  let text = std::str::from_utf8(pem)
    .map_err(|e| EngineError::CertificateParse(format!("PEM input is not UTF-8: {e}")))?;
  let mut blocks = Vec::new();
  let mut pos = 0;
  while let Some(found) = text[pos..].find(PEM_BEGIN) {
    let start = pos + found;
    let label_start = start + PEM_BEGIN.len();
    let label = text[label_start..]
      .find(PEM_DASHES)
      .map(|len| &text[label_start..label_start + len])
      .filter(|label| !label.contains(['\r', '\n']))
      .ok_or_else(|| EngineError::CertificateParse("malformed PEM BEGIN boundary".into()))?;
    let end_boundary = format!("{PEM_END}{label}{PEM_DASHES}");
    let end = text[label_start..]
      .find(&end_boundary)
      .map(|i| label_start + i + end_boundary.len())
      .ok_or_else(|| EngineError::CertificateParse(format!("PEM {label} block has no END boundary")))?;
    let end = end + eol_len(&text[end..]);
    blocks.push((label, &pem[start..end]));
    pos = end;
  }
  Ok(blocks)
}

fn eol_len(rest: &str) -> usize {
  if rest.starts_with("\r\n") {
    2
  } else if rest.starts_with('\n') {
    1
  } else {
    0
  }
}
