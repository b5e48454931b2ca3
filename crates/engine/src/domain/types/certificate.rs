use std::path::PathBuf;

/// Where a PEM-encoded client certificate comes from.
///
/// - `Path`: a certificate file on disk, read with the size limit applied.
/// - `Bytes`: PEM text already in memory, e.g. handed over by the web
///   server's client-certificate variable.
#[derive(Clone)]
pub enum CertificateSource {
    Path(PathBuf),
    Bytes {
        data: Vec<u8>,
    },
}

impl CertificateSource {
    pub fn pem(pem: impl Into<Vec<u8>>) -> Self {
        CertificateSource::Bytes { data: pem.into() }
    }
}

impl std::fmt::Debug for CertificateSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CertificateSource::Path(path) => f.debug_tuple("Path").field(path).finish(),
            CertificateSource::Bytes { data } => f.debug_struct("Bytes")
                .field("data_len", &data.len())
                .finish(),
        }
    }
}
