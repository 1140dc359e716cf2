//! Hardware wallet seam.
//!
//! The device protocol is not part of this crate. Callers plug a device in
//! through [`HardwareWallet`]; the keybase only asks it for public keys and
//! signatures, and bounds every call with a timeout.

use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use tracing::warn;

use crate::crypto::{DerivationPath, PublicKey};
use crate::error::HardwareError;

/// A signing device holding private keys.
///
/// Implementations report device failures through [`HardwareError`]; the
/// keybase surfaces them to its caller unchanged.
pub trait HardwareWallet: Send + Sync {
    /// Public key at `path`. `hrp` is the address prefix the device may
    /// display for confirmation.
    fn get_public_key(&self, path: &DerivationPath, hrp: &str) -> Result<PublicKey, HardwareError>;

    /// Sign `msg` with the key at `path`.
    fn sign(&self, path: &DerivationPath, msg: &[u8]) -> Result<Vec<u8>, HardwareError>;
}

/// Run `call` against `wallet`, giving up after `timeout`.
///
/// The call runs on its own thread. On timeout the thread is left to finish
/// in the background and its result is discarded.
pub fn call_with_timeout<T, F>(
    wallet: Arc<dyn HardwareWallet>,
    timeout: Duration,
    call: F,
) -> Result<T, HardwareError>
where
    T: Send + 'static,
    F: FnOnce(&dyn HardwareWallet) -> Result<T, HardwareError> + Send + 'static,
{
    let (tx, rx) = mpsc::channel();
    thread::Builder::new()
        .name("keybase-hardware".to_string())
        .spawn(move || {
            let _ = tx.send(call(wallet.as_ref()));
        })
        .map_err(|e| HardwareError::Device(format!("Failed to start device call: {}", e)))?;

    match rx.recv_timeout(timeout) {
        Ok(result) => result,
        Err(RecvTimeoutError::Timeout) => {
            warn!(timeout_secs = timeout.as_secs_f64(), "hardware wallet call timed out");
            Err(HardwareError::Timeout(timeout))
        }
        Err(RecvTimeoutError::Disconnected) => Err(HardwareError::Device(
            "Device call ended without a response".to_string(),
        )),
    }
}
