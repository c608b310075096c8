//! Factory reset detection.
//!
//! Either a button held during boot, or five quick power cycles in a row.
//! A boot counts as "quick" when power is cut again before
//! [`FactoryReset::reset_counter`] runs, which the firmware calls once the
//! device has been up for [`COUNTER_RESET_UPTIME`].
//!
//! Reboots faster than the settle delay are treated as brown-outs rather
//! than deliberate power cycles and clear both counters.

use core::future::Future;

use embassy_time::Duration;

use crate::persistence::{PersistentStore, StoreError};

/// Primary counter: boots since the last full run
pub const PRIMARY_COUNTER_KEY: &str = "sys/rst-cnt";
/// Secondary counter: boots that survived the settle delay, plus an offset
pub const SECONDARY_COUNTER_KEY: &str = "sys/rst-cnt-2";

/// Initial value of the secondary counter
pub const SECONDARY_COUNTER_INITIAL: i32 = 2;
/// Quick power cycles that trigger a factory reset
pub const RESET_CYCLES: i32 = 5;
/// Delay a boot has to survive to count as a deliberate power cycle
pub const SETTLE_DELAY: Duration = Duration::from_millis(5000);
/// Uptime after which the counters are cleared
pub const COUNTER_RESET_UPTIME: Duration = Duration::from_millis(10_000);
/// Button press length required before the press counts
pub const BUTTON_HOLD: Duration = Duration::from_millis(1000);

/// Factory reset state for one boot
#[derive(Debug, Default)]
pub struct FactoryReset {
    do_reset: bool,
    counter_reset: bool,
    using_button: bool,
}

impl FactoryReset {
    pub const fn new() -> Self {
        Self {
            do_reset: false,
            counter_reset: false,
            using_button: false,
        }
    }

    /// Check if a factory reset was requested during this boot
    pub const fn should_reset(&self) -> bool {
        self.do_reset
    }

    /// Count this boot as a power cycle
    ///
    /// `settle` is awaited only from the second boot in a row on; it should
    /// complete after [`SETTLE_DELAY`].
    pub async fn evaluate_power_cycle<S, F>(&mut self, store: &mut S, settle: F)
    where
        S: PersistentStore + ?Sized,
        F: Future<Output = ()>,
    {
        let mut count = read_counter(store, PRIMARY_COUNTER_KEY, 0);
        let mut count2 = read_counter(store, SECONDARY_COUNTER_KEY, SECONDARY_COUNTER_INITIAL);
        count += 1;
        log::info!("factory reset counter: {}, second counter: {}", count, count2);
        write_counter(store, PRIMARY_COUNTER_KEY, count);

        if count >= SECONDARY_COUNTER_INITIAL {
            log::trace!("waiting for the boot to settle");
            settle.await;

            // An immediate reboot leaves the primary counter ahead
            if count - count2 > 0 {
                log::debug!("reboot during settle delay, clearing counters");
                clear_counters(store);
                return;
            }
            count2 += 1;
        }

        if count >= RESET_CYCLES {
            log::info!("factory reset flagged");
            self.do_reset = true;
            clear_counters(store);
        } else {
            write_counter(store, SECONDARY_COUNTER_KEY, count2);
        }
    }

    /// Check the reset button
    ///
    /// `pressed` is the button level at boot; `still_pressed` resolves to the
    /// level after [`BUTTON_HOLD`] and is awaited only if the button was
    /// pressed.
    pub async fn evaluate_button<F>(&mut self, pressed: bool, still_pressed: F)
    where
        F: Future<Output = bool>,
    {
        self.using_button = true;
        if pressed && still_pressed.await {
            log::info!("factory reset button pressed");
            self.do_reset = true;
        }
    }

    /// Clear the power cycle counters once the device has been up long
    /// enough
    ///
    /// Runs at most once per boot and never when a button is used. Returns
    /// `true` if the counters were cleared.
    pub fn reset_counter<S>(&mut self, store: &mut S, uptime: Duration, force: bool) -> bool
    where
        S: PersistentStore + ?Sized,
    {
        if self.using_button || self.counter_reset {
            return false;
        }
        if !force && uptime <= COUNTER_RESET_UPTIME {
            return false;
        }
        log::info!("resetting factory reset counter");
        clear_counters(store);
        self.counter_reset = true;
        true
    }
}

fn read_counter<S: PersistentStore + ?Sized>(store: &mut S, key: &str, default: i32) -> i32 {
    let mut bytes = [0u8; 4];
    match store.load(key, &mut bytes) {
        Ok(Some(4)) => i32::from_le_bytes(bytes),
        Ok(Some(_)) => {
            log::warn!("counter {} has unexpected size", key);
            default
        }
        Ok(None) => default,
        Err(err) => {
            log::warn!("failed to read counter {}: {}", key, err);
            default
        }
    }
}

fn write_counter<S: PersistentStore + ?Sized>(store: &mut S, key: &str, value: i32) {
    if let Err(err) = store.save(key, &value.to_le_bytes()) {
        log_write_error(key, err);
    }
}

fn clear_counters<S: PersistentStore + ?Sized>(store: &mut S) {
    write_counter(store, PRIMARY_COUNTER_KEY, 0);
    write_counter(store, SECONDARY_COUNTER_KEY, SECONDARY_COUNTER_INITIAL);
}

fn log_write_error(key: &str, err: StoreError) {
    log::error!("failed to write counter {}: {}", key, err);
}
