#![allow(dead_code)]

use std::io::Write;

use rcgen::{Certificate, CertificateParams, CustomExtension};
use tempfile::TempDir;

/// OID of the download-URL extension for content set 5.
pub const DOWNLOAD_URL_OID: &str = "1.3.6.1.4.1.2312.9.2.5.1.6";
pub const DOWNLOAD_URL_ARCS: &[u64] = &[1, 3, 6, 1, 4, 1, 2312, 9, 2, 5, 1, 6];
/// Same content set, name field (not a download URL).
pub const CONTENT_NAME_ARCS: &[u64] = &[1, 3, 6, 1, 4, 1, 2312, 9, 2, 5, 1];

pub const RHEL_DESTINATION: &str = "/content/repo/rhel/6/x86_64";

/// DER-encode a UTF8String, the way entitlement servers store extension values.
pub fn der_utf8(value: &str) -> Vec<u8> {
    let bytes = value.as_bytes();
    let mut out = vec![0x0c];
    match bytes.len() {
        n if n < 0x80 => out.push(n as u8),
        n if n <= 0xff => out.extend_from_slice(&[0x81, n as u8]),
        n => out.extend_from_slice(&[0x82, (n >> 8) as u8, n as u8]),
    }
    out.extend_from_slice(bytes);
    out
}

/// Generate a self-signed PEM certificate carrying the given custom
/// extensions (arcs, UTF8String value).
pub fn entitlement_cert_pem(extensions: &[(&[u64], &str)]) -> String {
    entitlement_cert_and_key_pem(extensions).0
}

/// Same as [`entitlement_cert_pem`], also returning the PKCS#8 private key
/// PEM, as found in consumer key+cert bundles.
pub fn entitlement_cert_and_key_pem(extensions: &[(&[u64], &str)]) -> (String, String) {
    let mut params = CertificateParams::new(vec!["consumer.example.com".to_string()]);
    params.custom_extensions = extensions
        .iter()
        .map(|(oid, value)| CustomExtension::from_oid_content(oid, der_utf8(value)))
        .collect();
    let cert = Certificate::from_params(params).expect("cert");
    (cert.serialize_pem().expect("cert pem"), cert.serialize_private_key_pem())
}

/// Write a PEM certificate to a temp dir and return (tempdir, path).
pub fn write_pem_file(pem: &str) -> (TempDir, std::path::PathBuf) {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("entitlement.pem");
    std::fs::File::create(&path).and_then(|mut f| f.write_all(pem.as_bytes())).expect("write cert");
    (dir, path)
}

/// Minimal installed-package profile used by the profile manager tests.
pub fn rpm_profile(name: &str, version: &str) -> serde_json::Value {
    serde_json::json!({ "name": name, "version": version })
}
