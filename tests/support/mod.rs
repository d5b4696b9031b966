#![allow(unused)]

use std::net::{IpAddr, Ipv4Addr};
use std::sync::Once;

use camino::Utf8PathBuf;
use daenes::rr::{Name, TimeToLive};
use daenes::{DomainRecord, ZoneBuilder};

/// Registers a global default tracing subscriber when called for the first time. This is intended
/// for use in tests.
pub fn subscribe() {
    static INSTALL_TRACING_SUBSCRIBER: Once = Once::new();
    INSTALL_TRACING_SUBSCRIBER.call_once(|| {
        let subscriber = tracing_subscriber::FmtSubscriber::builder()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .finish();
        tracing::subscriber::set_global_default(subscriber).unwrap();
    });
}

pub const RESOLVER: IpAddr = IpAddr::V4(Ipv4Addr::new(10, 0, 0, 53));

pub fn builder() -> ZoneBuilder {
    ZoneBuilder::new(RESOLVER, TimeToLive::from_secs(300))
}

pub fn name(text: &str) -> Name {
    Name::from_utf8(text).unwrap()
}

/// A handful of containers spread over two networks.
pub fn discovered() -> Vec<DomainRecord> {
    vec![
        DomainRecord::new("app.local", "web", "10.0.0.5").with_alias("www"),
        DomainRecord::new("db.internal", "pg", "fe80::1"),
        DomainRecord::new("app.local", "api", "10.0.0.6").with_aliases(["rest", "graphql"]),
    ]
}

pub fn tempdir() -> (tempfile::TempDir, Utf8PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let path = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).unwrap();
    (dir, path)
}
