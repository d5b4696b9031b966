use daenes::codec;
use daenes::rr::{RecordType, SerialNumber};
use daenes::store::ZoneStore as _;
use daenes::{DomainRecord, FileZoneStore, ZoneUpdater};

mod support;
use support::{builder, discovered, name, subscribe, tempdir};

const HAND_WRITTEN: &str = "\
$ORIGIN app.local.
$TTL 600
www.app.local. 600 IN CNAME web
web 600 IN A 10.0.0.5
@ 600 IN NS ns.app.local.
ns 600 IN A 10.0.0.53
@ 600 IN SOA ns.app.local. admin.app.local. (
    41 ; serial
    3600 600 604800 600 )
";

#[test]
fn hand_written_zone_sets_next_serial() {
    subscribe();
    let (_dir, path) = tempdir();
    std::fs::write(path.join("app.local.zone"), HAND_WRITTEN).unwrap();

    let updater = ZoneUpdater::new(builder(), FileZoneStore::new(&path));
    let previous = updater
        .store()
        .load(&name("app.local."))
        .unwrap()
        .unwrap();
    assert_eq!(previous.serial(), SerialNumber::from(41));

    let report = updater.update_all(discovered());
    assert_eq!(report.zones()[0].serial(), SerialNumber::from(42));
}

#[test]
fn saved_file_is_canonical_text() {
    subscribe();
    let (_dir, path) = tempdir();
    let updater = ZoneUpdater::new(builder(), FileZoneStore::new(&path));

    let report = updater.update_all([
        DomainRecord::new("app.local", "web", "10.0.0.5").with_alias("www"),
    ]);
    let written = std::fs::read_to_string(path.join("app.local.zone")).unwrap();
    assert_eq!(written, codec::to_text(&report.zones()[0]));

    assert_eq!(
        written,
        "\
$ORIGIN app.local.
$TTL 300
@ 300 IN SOA ns admin ( 1 3600 600 604800 600 )
@ 300 IN NS ns
ns 300 IN A 10.0.0.53
web 300 IN A 10.0.0.5
www 300 IN CNAME web
"
    );
}

#[test]
fn saved_file_reads_back_unchanged() {
    subscribe();
    let (_dir, path) = tempdir();
    let updater = ZoneUpdater::new(builder(), FileZoneStore::new(&path));

    let report = updater.update_all(discovered());
    for zone in report.zones() {
        let file = updater.store().zone_path(zone.origin());
        let reread = codec::read_zone_file(&file, zone.origin()).unwrap();
        assert_eq!(&reread, zone);

        let ns = name("ns").append_domain(zone.origin()).unwrap();
        assert_eq!(reread.rdatas(&ns, RecordType::A).len(), 1);
    }
}

#[test]
fn zone_file_for_another_origin() {
    let (_dir, path) = tempdir();
    std::fs::write(path.join("app.local.zone"), HAND_WRITTEN).unwrap();

    let error = codec::read_zone_file(&path.join("app.local.zone"), &name("db.internal."))
        .unwrap_err();
    assert!(matches!(error, codec::CodecError::OriginMismatch { .. }));
}

#[test]
fn rebuild_from_reparsed_serial() {
    let domains = discovered();
    let app: Vec<DomainRecord> = domains
        .into_iter()
        .filter(|domain| domain.parent == "app.local")
        .collect();

    let zone = builder().build("app.local", &app, None).unwrap();
    let reparsed = codec::from_text(&codec::to_text(&zone), &name("app.local.")).unwrap();
    let rebuilt = builder()
        .build("app.local", &app, Some(reparsed.serial()))
        .unwrap();

    assert_eq!(rebuilt.serial(), zone.serial().next());

    let records = |text: String| -> Vec<String> {
        text.lines()
            .filter(|line| !line.contains(" SOA "))
            .map(str::to_owned)
            .collect()
    };
    assert_eq!(
        records(codec::to_text(&rebuilt)),
        records(codec::to_text(&zone))
    );
}
