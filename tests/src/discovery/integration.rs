use std::collections::HashSet;

use hgota_common::cancel::CancelToken;
use hgota_common::models::report::ScanReport;
use hgota_core::network::mock::{self, MockLink, MockOpener};
use hgota_core::scanner::DiscoveryScanner;
use pnet::util::MacAddr;

use crate::utils::{DEVICE, FixedAdapters, HOST, adapter, lo, scan_cfg, template};

fn scan(opener: &MockOpener, adapters: Vec<hgota_common::network::interface::Adapter>) -> Vec<ScanReport> {
    DiscoveryScanner::new(opener, scan_cfg(), CancelToken::new()).scan_all(&FixedAdapters(adapters))
}

#[test]
fn device_behind_second_adapter_is_reported_once() {
    let opener = MockOpener::new();
    let silent = MockLink::new();
    opener.add("eth0", silent.clone());
    opener.add("eth1", MockLink::with_responder(mock::report_responder(DEVICE, template())));

    let reports = scan(
        &opener,
        vec![
            adapter("eth0", 2, Some(MacAddr(0x3c, 0, 0, 0, 0, 1))),
            adapter("eth1", 3, Some(HOST)),
        ],
    );

    assert_eq!(reports.len(), 1, "got {reports:?}");
    assert_eq!(reports[0].adapter, "eth1 (3)");
    assert_eq!(reports[0].interface, "eth1");
    assert_eq!(reports[0].device_mac, DEVICE);
    assert_eq!(reports[0].host_mac, HOST);
    assert!(!silent.sent().is_empty(), "silent adapter was never probed");
}

#[test]
fn report_fields_survive_the_wire() {
    let opener = MockOpener::new();
    opener.add("eth0", MockLink::with_responder(mock::report_responder(DEVICE, template())));

    let reports = scan(&opener, vec![adapter("eth0", 2, Some(HOST))]);

    assert_eq!(reports.len(), 1);
    let report = &reports[0];
    assert_eq!(report.version_str(), "2.3.0.1");
    assert_eq!(report.chip_id, 0x8088);
    assert_eq!(report.svn_version, 4711);
    assert_eq!(report.app_version, 9);
    assert_eq!(report.tail, vec![0xde, 0xad]);
}

#[test]
fn repeated_replies_collapse_per_adapter() {
    let opener = MockOpener::new();
    let link = MockLink::with_responder(mock::report_responder(DEVICE, template()));
    opener.add("eth0", link.clone());

    let reports = scan(&opener, vec![adapter("eth0", 2, Some(HOST))]);

    assert_eq!(link.sent().len(), 3, "every probe should be sent");
    assert_eq!(reports.len(), 1);
}

#[test]
fn same_device_on_two_adapters_is_reported_twice() {
    let opener = MockOpener::new();
    opener.add("eth0", MockLink::with_responder(mock::report_responder(DEVICE, template())));
    opener.add("eth1", MockLink::with_responder(mock::report_responder(DEVICE, template())));

    let reports = scan(
        &opener,
        vec![
            adapter("eth0", 2, Some(HOST)),
            adapter("eth1", 3, Some(MacAddr(0x3c, 0, 0, 0, 0, 9))),
        ],
    );

    let adapters: HashSet<&str> = reports.iter().map(|r| r.adapter.as_str()).collect();
    assert_eq!(reports.len(), 2);
    assert!(adapters.contains("eth0 (2)"));
    assert!(adapters.contains("eth1 (3)"));
}

#[test]
fn loopback_and_addressless_adapters_are_not_probed() {
    let opener = MockOpener::new();
    let addressless = MockLink::new();
    opener.add("tun0", addressless.clone());

    let reports = scan(&opener, vec![lo(), adapter("tun0", 5, None)]);

    assert!(reports.is_empty());
    assert!(addressless.sent().is_empty());
}

#[test]
fn unopenable_adapter_does_not_hide_the_others() {
    let opener = MockOpener::new();
    opener.add("eth1", MockLink::with_responder(mock::report_responder(DEVICE, template())));

    let reports = scan(
        &opener,
        vec![adapter("missing0", 2, Some(HOST)), adapter("eth1", 3, Some(HOST))],
    );

    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].adapter, "eth1 (3)");
}
