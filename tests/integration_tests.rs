use ir_provision::{
    config::{ChecksumFailurePolicy, ProvisioningConfig},
    device::Progress,
    encoder::encode_session,
    error::{FillError, ProtocolError, ProvisionError},
    link::adapters::{SerialLink, SliceLink},
    store::{
        record::{Field, SecurityMode},
        CredentialStore,
    },
    FillerState, Provisioner,
};

use mock::{MemoryStorage, MockError, MockSymbolLink};

type TestProvisioner = Provisioner<MemoryStorage, SerialLink<MockSymbolLink>>;

fn create_provisioner(symbols: &[u8], config: ProvisioningConfig) -> TestProvisioner {
    let link = SerialLink::new(MockSymbolLink::new(symbols));
    Provisioner::with_config(MemoryStorage::new(), link, config).unwrap()
}

fn bad_checksum_stream() -> Vec<u8> {
    let mut stream = encode_session(SecurityMode::WpaPsk, b"office", b"hunter22", b"dev-7", b'/')
        .unwrap()
        .to_vec();
    let last = stream.len() - 1;
    // Flip the low checksum digit between two valid hex digits
    stream[last] = if stream[last] == b'0' { b'1' } else { b'0' };
    stream
}

#[test]
fn test_poll_provisions_and_saves() {
    let stream = encode_session(SecurityMode::Wpa2Psk, b"home", b"secret99", b"tok-42", b'/').unwrap();
    let mut device = create_provisioner(&stream, ProvisioningConfig::default());
    assert!(!device.is_provisioned());
    assert_eq!(device.state(), FillerState::Security);

    // The link is idle before every symbol
    let mut provisioned = false;
    for _ in 0..stream.len() {
        assert_eq!(device.poll(), Err(nb::Error::WouldBlock));
        match device.poll() {
            Ok(Progress::Pending(_)) => {}
            Ok(Progress::Provisioned) => provisioned = true,
            Err(e) => panic!("unexpected error: {:?}", e),
        }
    }
    assert!(provisioned);
    assert!(device.is_provisioned());
    assert_eq!(device.state(), FillerState::Done);

    // Symbols after completion are rejected
    assert_eq!(
        device.feed(b'1'),
        Err(ProvisionError::Fill(FillError::Protocol(
            ProtocolError::SessionClosed(FillerState::Done)
        )))
    );

    let (store, link) = device.release();
    assert_eq!(link.received() as usize, stream.len());

    // Credentials survive a reboot
    let mut store = CredentialStore::new(store.release(), ProvisioningConfig::default()).unwrap();
    store.load().unwrap();
    assert!(store.is_credentials_valid());
    assert_eq!(store.security_mode(), SecurityMode::Wpa2Psk);
    assert_eq!(store.network_name_str(), Some("home"));
    assert_eq!(store.network_password_str(), Some("secret99"));
    assert_eq!(store.device_token_str(), Some("tok-42"));
}

#[test]
fn test_feed_reports_progress() {
    let mut device = create_provisioner(&[], ProvisioningConfig::default());

    assert_eq!(device.feed(b'8'), Ok(Progress::Pending(FillerState::Security)));
    assert_eq!(device.feed(b'/'), Ok(Progress::Pending(FillerState::Ssid)));
    assert_eq!(
        device.feed(b'x'),
        Err(ProvisionError::Fill(FillError::Protocol(
            ProtocolError::UnexpectedSymbol(b'x')
        )))
    );
    assert_eq!(device.state(), FillerState::Ssid);
}

#[test]
fn test_run_until_provisioned() {
    let stream = encode_session(SecurityMode::Open, b"guest", b"", b"abc", b'/').unwrap();
    let mut device = create_provisioner(&stream, ProvisioningConfig::default());

    device.run().unwrap();
    assert!(device.is_provisioned());
    assert_eq!(device.store().network_name(), b"guest");
    assert!(device.store().network_password().is_empty());
}

#[test]
fn test_run_skips_noise() {
    let mut symbols = b"zz".to_vec();
    symbols.extend_from_slice(b"3");
    symbols.extend_from_slice(
        &encode_session(SecurityMode::Wep, b"n", b"p", b"t", b'/').unwrap(),
    );
    let mut device = create_provisioner(&symbols, ProvisioningConfig::default());

    device.run().unwrap();
    assert!(device.is_provisioned());
    assert_eq!(device.store().security_mode(), SecurityMode::Wep);
}

#[test]
fn test_checksum_failure_restarts() {
    let mut symbols = bad_checksum_stream();
    symbols.extend_from_slice(
        &encode_session(SecurityMode::WpaPsk, b"office", b"hunter22", b"dev-7", b'/').unwrap(),
    );
    let mut device = create_provisioner(&symbols, ProvisioningConfig::default());

    // run() waits out the bad session and accepts the retransmission
    device.run().unwrap();
    assert!(device.is_provisioned());
    assert_eq!(device.store().device_token(), b"dev-7");
}

#[test]
fn test_checksum_failure_restart_policy() {
    let stream = bad_checksum_stream();
    let mut device = create_provisioner(&[], ProvisioningConfig::default());

    let (last, head) = stream.split_last().unwrap();
    for &symbol in head {
        device.feed(symbol).unwrap();
    }
    assert!(matches!(
        device.feed(*last),
        Err(ProvisionError::Fill(FillError::Checksum { .. }))
    ));
    assert_eq!(device.state(), FillerState::Security);
    assert!(!device.is_provisioned());

    // Nothing was saved: only the cleared regions from the initial load
    assert_eq!(device.store_mut().storage_mut().writes, 2);
}

#[test]
fn test_checksum_failure_abandon_policy() {
    let config = ProvisioningConfig::default().with_checksum_policy(ChecksumFailurePolicy::Abandon);
    let stream = bad_checksum_stream();
    let mut device = create_provisioner(&stream, config);

    assert!(matches!(
        device.run(),
        Err(ProvisionError::Fill(FillError::Checksum { .. }))
    ));
    assert_eq!(device.state(), FillerState::Failed);
    assert_eq!(
        device.feed(b'1'),
        Err(ProvisionError::Fill(FillError::Protocol(
            ProtocolError::SessionClosed(FillerState::Failed)
        )))
    );

    device.restart();
    assert_eq!(device.state(), FillerState::Security);
    assert_eq!(device.feed(b'1'), Ok(Progress::Pending(FillerState::Security)));
}

#[test]
fn test_overflow_aborts_session() {
    let mut symbols = b"1/".to_vec();
    symbols.extend(core::iter::repeat(b'4').take(2 * 33));
    let mut device = create_provisioner(&symbols, ProvisioningConfig::default());

    assert_eq!(
        device.run(),
        Err(ProvisionError::Fill(FillError::BufferOverflow(Field::NetworkName)))
    );
    assert_eq!(device.state(), FillerState::Failed);
    assert_eq!(device.store().network_name(), &[0x44; 32][..]);
}

#[test]
fn test_overflow_without_abort() {
    let config = ProvisioningConfig::default().with_abort_on_overflow(false);
    let mut device = create_provisioner(&[], config);

    for &symbol in b"1/" {
        device.feed(symbol).unwrap();
    }
    for _ in 0..32 {
        device.feed(b'4').unwrap();
        device.feed(b'1').unwrap();
    }
    device.feed(b'4').unwrap();
    assert_eq!(
        device.feed(b'1'),
        Err(ProvisionError::Fill(FillError::BufferOverflow(Field::NetworkName)))
    );
    assert_eq!(device.state(), FillerState::Ssid);

    // The session can still move on to the next field
    assert_eq!(device.feed(b'/'), Ok(Progress::Pending(FillerState::Password)));
}

#[test]
fn test_link_error() {
    let mut link = MockSymbolLink::new(b"1/");
    link.fail();
    let mut device = Provisioner::with_config(
        MemoryStorage::new(),
        SerialLink::new(link),
        ProvisioningConfig::default(),
    )
    .unwrap();

    assert_eq!(
        device.poll(),
        Err(nb::Error::Other(ProvisionError::Link(MockError::Failed)))
    );
    assert_eq!(device.run(), Err(ProvisionError::Link(MockError::Failed)));
}

#[test]
fn test_storage_error_on_start() {
    let mut flash = MemoryStorage::new();
    flash.fail_reads = true;
    let result = Provisioner::with_config(flash, SliceLink::new(b""), ProvisioningConfig::default());

    assert!(matches!(
        result,
        Err(ProvisionError::Store(ir_provision::error::StoreError::Storage(MockError::Failed)))
    ));
}

#[test]
fn test_slice_link_replay() {
    let stream = encode_session(SecurityMode::None, b"open-net", b"", b"k", b'/').unwrap();
    let mut device =
        Provisioner::with_config(MemoryStorage::new(), SliceLink::new(&stream), ProvisioningConfig::default())
            .unwrap();

    device.run().unwrap();
    assert!(device.is_provisioned());
    assert_eq!(device.store().security_mode(), SecurityMode::None);

    let (_, link) = device.release();
    assert!(link.remaining().is_empty());
}

#[test]
fn test_existing_credentials_kept() {
    let stream = encode_session(SecurityMode::Open, b"first", b"pw", b"id", b'/').unwrap();
    let mut device = create_provisioner(&stream, ProvisioningConfig::default());
    device.run().unwrap();
    let (store, _) = device.release();

    // A fresh provisioner over the same flash starts provisioned
    let device = Provisioner::with_config(
        store.release(),
        SliceLink::new(b""),
        ProvisioningConfig::default(),
    )
    .unwrap();
    assert!(device.is_provisioned());
    assert_eq!(device.state(), FillerState::Security);
    assert_eq!(device.store().network_name(), b"first");
}

#[test]
fn test_overflow_invalidates_existing_credentials() {
    let stream = encode_session(SecurityMode::Wpa2Psk, b"home", b"pw", b"id", b'/').unwrap();
    let mut device = create_provisioner(&stream, ProvisioningConfig::default());
    device.run().unwrap();
    let (store, _) = device.release();

    let mut symbols = b"1/".to_vec();
    symbols.extend(core::iter::repeat(b'4').take(2 * 33));
    let mut device = Provisioner::with_config(
        store.release(),
        SliceLink::new(&symbols),
        ProvisioningConfig::default(),
    )
    .unwrap();
    assert!(device.is_provisioned());

    assert_eq!(
        device.run(),
        Err(ProvisionError::Fill(FillError::BufferOverflow(Field::NetworkName)))
    );
    assert!(!device.is_provisioned());

    // Saving the aborted session does not resurrect the credentials
    device.store_mut().save().unwrap();
    let (store, _) = device.release();
    let mut store = CredentialStore::new(store.release(), ProvisioningConfig::default()).unwrap();
    store.load().unwrap();
    assert!(!store.is_credentials_valid());
}

#[test]
fn test_hex_separator_config_rejected() {
    let config = ProvisioningConfig {
        separator: b'A',
        ..ProvisioningConfig::default()
    };
    assert!(matches!(
        Provisioner::with_config(MemoryStorage::new(), SliceLink::new(b""), config),
        Err(ProvisionError::Store(ir_provision::error::StoreError::Config(_)))
    ));
}
