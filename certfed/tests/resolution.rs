//! End-to-end resolution scenarios against stub stores and a loopback HTTP listener

use std::io::{Read, Write};
use std::net::TcpListener;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use der::Decode;
use x509_cert::Certificate;

use certfed::{
    certificate_serial_number, CacheCategory, CachingCertificateSource, CertificateCache,
    CertificateLoader, CertificateSource, Error, FederationCertificateReference,
    FederationCertificateSource, HttpCertificateLoader, IntermediateCertificateSource,
    RemoteCertificateSource,
};

fn ca_a() -> Certificate {
    // serial number 2171
    let der_encoded_cert = include_bytes!("examples/ca_a.der");
    Certificate::from_der(der_encoded_cert).unwrap()
}

struct CountingSource {
    cert: Certificate,
    lookups: AtomicUsize,
    keys: Mutex<Vec<String>>,
}

impl CountingSource {
    fn new(cert: Certificate) -> Self {
        CountingSource {
            cert,
            lookups: AtomicUsize::new(0),
            keys: Mutex::new(vec![]),
        }
    }
}

impl CertificateSource for CountingSource {
    fn get_certificate(&self, key: &str) -> certfed::Result<Certificate> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        self.keys.lock().unwrap().push(key.to_string());
        Ok(self.cert.clone())
    }
}

struct CountingLoader {
    bytes: Vec<u8>,
    lookups: Arc<AtomicUsize>,
}

impl CertificateLoader for CountingLoader {
    fn load_certificate(&self, _key: &str) -> certfed::Result<Vec<u8>> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        Ok(self.bytes.clone())
    }
}

/// Serves one canned HTTP response on a loopback listener and returns the URL to request.
fn spawn_http_server(status_line: &'static str, body: Vec<u8>) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    std::thread::spawn(move || {
        if let Ok((mut stream, _)) = listener.accept() {
            let mut request = [0u8; 2048];
            let _ = stream.read(&mut request);
            let header = format!(
                "HTTP/1.1 {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                status_line,
                body.len()
            );
            let _ = stream.write_all(header.as_bytes());
            let _ = stream.write_all(&body);
        }
    });
    format!("http://{}/intermediate.der", addr)
}

#[test]
fn cache_hit_short_circuits_loader() {
    let lookups = Arc::new(AtomicUsize::new(0));
    let loader = CountingLoader {
        bytes: include_bytes!("examples/ca_a.der").to_vec(),
        lookups: lookups.clone(),
    };

    let store = CachingCertificateSource::new(
        Arc::new(RemoteCertificateSource::new(Box::new(loader))),
        Arc::new(CertificateCache::new()),
        CacheCategory::FederationCert,
    );

    let first = store.get_certificate("CVR:1-UID:2").unwrap();
    let second = store.get_certificate("CVR:1-UID:2").unwrap();
    assert_eq!(first, second);
    assert_eq!(1, lookups.load(Ordering::SeqCst));
}

#[test]
fn remapped_key_queries_inner_store_and_caches_original() {
    let inner = Arc::new(CountingSource::new(ca_a()));
    let cache = Arc::new(CertificateCache::new());
    let store = CachingCertificateSource::with_hooks(
        inner.clone(),
        cache.clone(),
        CacheCategory::FederationCert,
        Box::new(|key| format!("{}remote", key)),
        Box::new(|_key, _cert| Ok(())),
    );

    store.get_certificate("CVR:1-UID:2").unwrap();
    assert_eq!(vec!["CVR:1-UID:2remote".to_string()], *inner.keys.lock().unwrap());
    assert!(cache.get(CacheCategory::FederationCert, "CVR:1-UID:2").is_some());
    assert!(cache.get(CacheCategory::FederationCert, "CVR:1-UID:2remote").is_none());

    store.get_certificate("CVR:1-UID:2").unwrap();
    assert_eq!(1, inner.lookups.load(Ordering::SeqCst));
}

#[test]
fn oces1_reference_is_rejected_without_lookup() {
    let inner = Arc::new(CountingSource::new(ca_a()));
    let source =
        FederationCertificateSource::with_source(inner.clone(), Arc::new(CertificateCache::new()));

    let reference: FederationCertificateReference = "OCES1,CVR:1-UID:2,123".parse().unwrap();
    let r = source.get_federation_certificate(&reference);
    match r {
        Err(Error::UnsupportedVersion(msg)) => assert!(msg.contains("OCES1 is not supported")),
        _ => panic!("expected unsupported version error"),
    }
    assert_eq!(0, inner.lookups.load(Ordering::SeqCst));
}

#[test]
fn serial_number_mismatch_names_both_serials() {
    let inner = Arc::new(CountingSource::new(ca_a()));
    let cache = Arc::new(CertificateCache::new());
    let source = FederationCertificateSource::with_source(inner.clone(), cache.clone());

    let reference: FederationCertificateReference = "OCES2,CVR:1-FID:2,1111".parse().unwrap();
    let r = source.get_federation_certificate(&reference);
    match r {
        Err(Error::Validation(msg)) => {
            assert!(msg.contains("1111"), "missing expected serial in: {}", msg);
            assert!(msg.contains("2171"), "missing actual serial in: {}", msg);
        }
        _ => panic!("expected validation error"),
    }

    // the rejected certificate must not have been cached
    assert!(cache.is_empty(CacheCategory::FederationCert));
    assert!(source.get_federation_certificate(&reference).is_err());
    assert_eq!(2, inner.lookups.load(Ordering::SeqCst));
}

#[test]
fn round_trip_resolves_once_and_returns_equal_results() {
    let inner = Arc::new(CountingSource::new(ca_a()));
    let source =
        FederationCertificateSource::with_source(inner.clone(), Arc::new(CertificateCache::new()));

    let reference: FederationCertificateReference =
        "OCES2,CVR:30808460-FID:94731315,2171".parse().unwrap();
    let first = source.get_federation_certificate(&reference).unwrap();
    let second = source.get_federation_certificate(&reference).unwrap();
    assert_eq!(first, second);
    assert_eq!(1, inner.lookups.load(Ordering::SeqCst));
    // the organization identifier is the lookup key, never the serial number
    assert_eq!(
        vec!["CVR:30808460-FID:94731315".to_string()],
        *inner.keys.lock().unwrap()
    );
}

#[test]
fn cache_hit_is_not_revalidated() {
    let inner = Arc::new(CountingSource::new(ca_a()));
    let source =
        FederationCertificateSource::with_source(inner.clone(), Arc::new(CertificateCache::new()));

    let good: FederationCertificateReference = "OCES2,CVR:1-FID:2,2171".parse().unwrap();
    source.get_federation_certificate(&good).unwrap();

    // validation runs at insertion only; a hit for the same organization returns the cached
    // certificate even though this reference asserts a different serial
    let stale: FederationCertificateReference = "OCES2,CVR:1-FID:2,9999".parse().unwrap();
    let cert = source.get_federation_certificate(&stale).unwrap();
    assert_eq!("2171", certificate_serial_number(&cert).to_string());
    assert_eq!(1, inner.lookups.load(Ordering::SeqCst));
}

#[test]
fn http_non_200_carries_status_and_body() {
    let url = spawn_http_server("404 Not Found", b"no such certificate".to_vec());
    let loader = HttpCertificateLoader::default();
    let r = loader.load_certificate(&url);
    match r {
        Err(Error::NotFound(msg)) => {
            assert!(msg.contains("404"), "missing status in: {}", msg);
            assert!(msg.contains("no such certificate"), "missing body in: {}", msg);
        }
        _ => panic!("expected not found error"),
    }
}

#[test]
fn http_200_yields_certificate() {
    let url = spawn_http_server("200 OK", include_bytes!("examples/ca_b.der").to_vec());
    let source = IntermediateCertificateSource::new(Arc::new(CertificateCache::new()));
    let cert = source.get_certificate(&url).unwrap();
    assert_eq!("772", certificate_serial_number(&cert).to_string());
}

#[test]
fn http_body_that_is_not_der_fails_as_parse_error() {
    let url = spawn_http_server("200 OK", b"not a certificate".to_vec());
    let source = RemoteCertificateSource::new(Box::new(HttpCertificateLoader::default()));
    assert!(matches!(
        source.get_certificate(&url),
        Err(Error::CertificateParse(_, _))
    ));
}

#[test]
fn intermediate_source_fetches_each_uri_once() {
    let inner = Arc::new(CountingSource::new(ca_a()));
    let source =
        IntermediateCertificateSource::with_source(inner.clone(), Arc::new(CertificateCache::new()));

    let uri = "http://ca.example.com/intermediate.der";
    let first = source.get_certificate(uri).unwrap();
    let second = source.get_certificate(uri).unwrap();
    assert_eq!(first, second);
    assert_eq!(1, inner.lookups.load(Ordering::SeqCst));
}

#[test]
fn federation_and_intermediate_partitions_are_independent() {
    let cache = Arc::new(CertificateCache::new());
    let inner = Arc::new(CountingSource::new(ca_a()));
    let intermediate = IntermediateCertificateSource::with_source(inner.clone(), cache.clone());

    intermediate.get_certificate("CVR:1-UID:2").unwrap();
    assert!(cache.get(CacheCategory::IntermediateCert, "CVR:1-UID:2").is_some());
    assert!(cache.get(CacheCategory::FederationCert, "CVR:1-UID:2").is_none());

    // a federation lookup for the same key misses the intermediate entry and fetches anew
    let federation = FederationCertificateSource::with_source(inner.clone(), cache);
    let reference: FederationCertificateReference = "OCES2,CVR:1-UID:2,2171".parse().unwrap();
    federation.get_federation_certificate(&reference).unwrap();
    assert_eq!(2, inner.lookups.load(Ordering::SeqCst));
}
