//! Host-side provisioning walkthrough
//!
//! Runs a full credential transfer against RAM-backed storage:
//! - Encodes a session the way a transmitter would
//! - Replays it through a `SliceLink` into a `Provisioner`
//! - Corrupts one stored byte and shows the record being cleared on reload
//!
//! Useful for checking a transmitter's output: pass a raw stream as the
//! first argument and it is fed to the device instead of the built-in one.

use embedded_storage::{ReadStorage, Storage};
use ir_provision::{
    config::ProvisioningConfig,
    encoder::encode_session,
    link::SliceLink,
    store::{record::SecurityMode, CredentialStore},
    Provisioner,
};

const FLASH_SIZE: usize = 256;

#[derive(Debug)]
struct OutOfRange;

struct RamFlash {
    bytes: [u8; FLASH_SIZE],
}

impl ReadStorage for RamFlash {
    type Error = OutOfRange;

    fn read(&mut self, offset: u32, bytes: &mut [u8]) -> Result<(), Self::Error> {
        let start = offset as usize;
        let source = self.bytes.get(start..start + bytes.len()).ok_or(OutOfRange)?;
        bytes.copy_from_slice(source);
        Ok(())
    }

    fn capacity(&self) -> usize {
        FLASH_SIZE
    }
}

impl Storage for RamFlash {
    fn write(&mut self, offset: u32, bytes: &[u8]) -> Result<(), Self::Error> {
        let start = offset as usize;
        let target = self.bytes.get_mut(start..start + bytes.len()).ok_or(OutOfRange)?;
        target.copy_from_slice(bytes);
        Ok(())
    }
}

fn main() {
    let stream = match std::env::args().nth(1) {
        Some(raw) => raw.into_bytes(),
        None => encode_session(SecurityMode::Wpa2Psk, b"Test-Ssid", b"TestPW", b"dev012", b'/')
            .expect("demo credentials fit")
            .to_vec(),
    };
    println!("stream: {}", String::from_utf8_lossy(&stream));

    let flash = RamFlash { bytes: [0xFF; FLASH_SIZE] };
    let mut device = Provisioner::with_config(flash, SliceLink::new(&stream), ProvisioningConfig::default())
        .expect("store fits in flash");

    let mut outcome = Ok(());
    while !device.is_provisioned() {
        match device.poll() {
            Ok(progress) => println!("  {:?}", progress),
            Err(nb::Error::WouldBlock) => break,
            Err(nb::Error::Other(e)) => {
                println!("  error: {}", e);
                outcome = Err(e);
                if device.state().is_terminal() {
                    break;
                }
            }
        }
    }

    if !device.is_provisioned() {
        println!("not provisioned (state {:?}, last result {:?})", device.state(), outcome);
        return;
    }

    let (store, _) = device.release();
    println!(
        "provisioned: security {}, ssid {:?}, token {:?}",
        store.security_mode().name(),
        store.network_name_str(),
        store.device_token_str()
    );

    // Flip one bit of the stored network name and reboot
    let mut flash = store.release();
    flash.bytes[1] ^= 0x01;
    let mut store = CredentialStore::new(flash, ProvisioningConfig::default()).expect("store fits in flash");
    store.load().expect("ram flash does not fail");
    println!(
        "after corruption: valid {}, ssid {:?}",
        store.is_credentials_valid(),
        store.network_name_str()
    );
}
