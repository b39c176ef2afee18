// Unit tests for the connectivity prober and SSID output parsers

use super::*;
use pretty_assertions::assert_eq;

const AIRPORT_OUTPUT: &str = "     agrCtlRSSI: -62\n     agrExtRSSI: 0\n    agrCtlNoise: -92\n          state: running\n        op mode: station\n     lastTxRate: 130\n        maxRate: 144\nlastAssocStatus: 0\n    802.11 auth: open\n      link auth: wpa2-psk\n          BSSID: aa:bb:cc:dd:ee:ff\n           SSID: GVPH\n            MCS: 14\n        channel: 6\n";

const SYSTEM_PROFILER_OUTPUT: &str = "Wi-Fi:\n\n      Software Versions:\n          CoreWLAN: 16.0\n      Interfaces:\n        en0:\n          Card Type: Wi-Fi\n          Status: Connected\n          Current Network Information:\n            GVPH:\n              PHY Mode: 802.11n\n              Channel: 6\n";

const NETSH_OUTPUT: &str = "\r\nThere is 1 interface on the system:\r\n\r\n    Name                   : Wi-Fi\r\n    Description            : Intel(R) Wireless-AC 9560\r\n    State                  : connected\r\n    SSID                   : GVPH\r\n    BSSID                  : aa:bb:cc:dd:ee:ff\r\n    Radio type             : 802.11n\r\n";

const NMCLI_OUTPUT: &str = "no:eduroam\nyes:GVPH\nno:CoffeeShop\n";

#[test]
fn test_parse_airport_output() {
    assert_eq!(parse_airport_output(AIRPORT_OUTPUT), Some("GVPH".to_string()));
}

#[test]
fn test_parse_airport_skips_bssid_line() {
    // Only the BSSID line present: must not be mistaken for the SSID.
    let output = "          BSSID: aa:bb:cc:dd:ee:ff\n        channel: 6\n";
    assert_eq!(parse_airport_output(output), None);
}

#[test]
fn test_parse_system_profiler_output() {
    assert_eq!(
        parse_system_profiler_output(SYSTEM_PROFILER_OUTPUT),
        Some("GVPH".to_string())
    );
}

#[test]
fn test_parse_netsh_output() {
    assert_eq!(parse_netsh_output(NETSH_OUTPUT), Some("GVPH".to_string()));
}

#[test]
fn test_parse_netsh_ignores_bssid() {
    let output = "    BSSID                  : aa:bb:cc:dd:ee:ff\r\n";
    assert_eq!(parse_netsh_output(output), None);
}

#[test]
fn test_parse_iwgetid_output() {
    assert_eq!(parse_iwgetid_output("GVPH\n"), Some("GVPH".to_string()));
    assert_eq!(parse_iwgetid_output(""), None);
    assert_eq!(parse_iwgetid_output("   \n"), None);
}

#[test]
fn test_parse_nmcli_output() {
    assert_eq!(parse_nmcli_output(NMCLI_OUTPUT), Some("GVPH".to_string()));
    assert_eq!(parse_nmcli_output("no:eduroam\nno:CoffeeShop\n"), None);
}

#[test]
fn test_parsers_survive_garbled_output() {
    let garbled = "\u{1}\u{2} total nonsense ::: SSID\nBSSID\n\n:::\n";
    // None of these may panic; garbage maps to "unknown network".
    assert_eq!(parse_airport_output(garbled), None);
    assert_eq!(parse_system_profiler_output(garbled), None);
    assert_eq!(parse_netsh_output("SSID\nSSID:\nSSID:   \n"), None);
    assert_eq!(parse_nmcli_output(garbled), None);
}

#[test]
fn test_is_target_network() {
    assert!(is_target_network(Some("GVPH"), Some("GVPH")));
    assert!(!is_target_network(Some("CoffeeShop"), Some("GVPH")));
    // No configured target: any associated network counts.
    assert!(is_target_network(Some("CoffeeShop"), None));
    assert!(is_target_network(Some("CoffeeShop"), Some("")));
    // Never associated without an SSID reading.
    assert!(!is_target_network(None, Some("GVPH")));
    assert!(!is_target_network(None, None));
}

#[tokio::test]
async fn test_probe_unreachable_target_returns_false() {
    // Nothing listens on port 1; the failure must map to false, not an error.
    let probe = HttpProbe::new(
        Url::parse("http://127.0.0.1:1/").unwrap(),
        std::time::Duration::from_millis(500),
    )
    .unwrap();
    assert!(!probe.is_internet_reachable().await);
}
