//! Background low-fuel monitoring.
//!
//! Every watched vehicle gets its own tokio task that samples the fuel gauge
//! on a fixed interval and reports readings below the threshold over an mpsc
//! channel. Tasks are cancelled individually or all at once on shutdown.

use std::{collections::HashMap, time::Duration};

use chrono::{DateTime, Utc};
use tokio::{
    sync::{
        mpsc::{self, error::TrySendError},
        watch,
    },
    task::JoinHandle,
    time::{interval, MissedTickBehavior},
};
use tracing::{debug, trace};

use crate::vehicle::{FuelGauge, Vehicle};

/// Default time between two fuel samples.
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(5);
/// Default level below which a warning is emitted.
pub const DEFAULT_THRESHOLD: f64 = 5.0;

/// Sampling parameters shared by all monitors.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MonitorSettings {
    /// Time between two samples. The first sample is taken immediately.
    pub interval: Duration,
    /// Readings strictly below this level produce a warning.
    pub threshold: f64,
}

impl Default for MonitorSettings {
    fn default() -> Self {
        Self {
            interval: DEFAULT_INTERVAL,
            threshold: DEFAULT_THRESHOLD,
        }
    }
}

/// Advisory event emitted when a vehicle runs low.
#[derive(Debug, Clone, PartialEq)]
pub struct LowFuelWarning {
    /// Name of the vehicle that was sampled.
    pub vehicle: String,
    /// Fuel level at the time of the sample.
    pub fuel_level: f64,
    /// When the sample was taken.
    pub observed_at: DateTime<Utc>,
}

struct MonitorHandle {
    cancel: watch::Sender<bool>,
    task: JoinHandle<()>,
}

/// Process-wide set of running low-fuel monitors.
pub struct FuelMonitors {
    settings: MonitorSettings,
    sender: mpsc::Sender<LowFuelWarning>,
    tasks: HashMap<String, MonitorHandle>,
}

impl FuelMonitors {
    /// Create an empty task set that reports warnings to `sender`.
    pub fn new(settings: MonitorSettings, sender: mpsc::Sender<LowFuelWarning>) -> Self {
        Self {
            settings,
            sender,
            tasks: HashMap::new(),
        }
    }

    /// Settings applied to newly spawned monitors.
    pub fn settings(&self) -> MonitorSettings {
        self.settings
    }

    /// Start monitoring a vehicle. A monitor already running under the same
    /// name is aborted and replaced.
    ///
    /// Must be called from within a tokio runtime.
    pub fn watch(&mut self, vehicle: &Vehicle) {
        let name = vehicle.name().to_string();
        let (cancel, cancelled) = watch::channel(false);
        let task = tokio::spawn(run_monitor(
            name.clone(),
            vehicle.gauge(),
            self.settings,
            self.sender.clone(),
            cancelled,
        ));

        if let Some(previous) = self
            .tasks
            .insert(name.clone(), MonitorHandle { cancel, task })
        {
            let _ = previous.cancel.send(true);
            previous.task.abort();
        }
        debug!(vehicle = %name, "Fuel monitor started");
    }

    /// Stop the monitor for `name` and wait for its task to finish.
    ///
    /// Returns `false` if no monitor was running for that vehicle. Once this
    /// returns, the monitor emits nothing further.
    pub async fn cancel(&mut self, name: &str) -> bool {
        match self.tasks.remove(name) {
            Some(handle) => {
                stop(name, handle).await;
                true
            }
            None => false,
        }
    }

    /// Cancel every monitor and wait for all of them to exit.
    pub async fn shutdown(&mut self) {
        let count = self.tasks.len();
        for (name, handle) in self.tasks.drain() {
            stop(&name, handle).await;
        }
        debug!(count, "Fuel monitors shut down");
    }

    /// Whether a monitor is running for `name`.
    pub fn is_watching(&self, name: &str) -> bool {
        self.tasks.contains_key(name)
    }

    /// Number of running monitors.
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// Whether no monitor is running.
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}

impl Drop for FuelMonitors {
    fn drop(&mut self) {
        for (_, handle) in self.tasks.drain() {
            let _ = handle.cancel.send(true);
            handle.task.abort();
        }
    }
}

async fn stop(name: &str, handle: MonitorHandle) {
    let _ = handle.cancel.send(true);
    if let Err(err) = handle.task.await {
        if !err.is_cancelled() {
            debug!(vehicle = %name, ?err, "Fuel monitor task failed");
        }
    }
    debug!(vehicle = %name, "Fuel monitor cancelled");
}

async fn run_monitor(
    name: String,
    gauge: FuelGauge,
    settings: MonitorSettings,
    sender: mpsc::Sender<LowFuelWarning>,
    mut cancelled: watch::Receiver<bool>,
) {
    let mut ticker = interval(settings.interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;
            changed = cancelled.changed() => {
                if changed.is_err() || *cancelled.borrow() {
                    break;
                }
            }
            _ = ticker.tick() => {
                if *cancelled.borrow() {
                    break;
                }
                let fuel_level = gauge.level();
                if fuel_level >= settings.threshold {
                    continue;
                }
                let warning = LowFuelWarning {
                    vehicle: name.clone(),
                    fuel_level,
                    observed_at: Utc::now(),
                };
                match sender.try_send(warning) {
                    Ok(()) => {}
                    Err(TrySendError::Full(_)) => {
                        trace!(vehicle = %name, "Warning channel full; dropping low fuel warning");
                    }
                    Err(TrySendError::Closed(_)) => break,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::VehicleKind;
    use tokio::time::timeout;

    const QUIET_PERIOD: Duration = Duration::from_secs(60);

    fn settings() -> MonitorSettings {
        MonitorSettings {
            interval: Duration::from_secs(5),
            threshold: 5.0,
        }
    }

    fn drain(rx: &mut mpsc::Receiver<LowFuelWarning>) {
        while rx.try_recv().is_ok() {}
    }

    #[tokio::test(start_paused = true)]
    async fn warns_when_below_threshold() {
        let (tx, mut rx) = mpsc::channel(16);
        let mut monitors = FuelMonitors::new(settings(), tx);
        let vehicle = Vehicle::new("Civic", VehicleKind::Car);

        monitors.watch(&vehicle);
        assert!(monitors.is_watching("Civic"));

        let warning = rx.recv().await.expect("warning");
        assert_eq!(warning.vehicle, "Civic");
        assert_eq!(warning.fuel_level, 0.0);

        let again = rx.recv().await.expect("second warning");
        assert_eq!(again.vehicle, "Civic");
        monitors.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn stays_quiet_at_or_above_threshold() {
        let (tx, mut rx) = mpsc::channel(16);
        let mut monitors = FuelMonitors::new(settings(), tx);
        let mut vehicle = Vehicle::new("Actros", VehicleKind::Truck);
        vehicle.refill_fuel(5.0, 1.2).expect("refill");

        monitors.watch(&vehicle);
        assert!(timeout(QUIET_PERIOD, rx.recv()).await.is_err());
        monitors.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn samples_the_live_fuel_level() {
        let (tx, mut rx) = mpsc::channel(16);
        let mut monitors = FuelMonitors::new(settings(), tx);
        let mut vehicle = Vehicle::new("Vespa", VehicleKind::Bike);
        vehicle.refill_fuel(10.0, 1.0).expect("refill");

        monitors.watch(&vehicle);
        assert!(timeout(Duration::from_secs(12), rx.recv()).await.is_err());

        vehicle.add_trip(80.0, 8.0).expect("trip");
        let warning = rx.recv().await.expect("warning");
        assert_eq!(warning.vehicle, "Vespa");
        assert_eq!(warning.fuel_level, 2.0);
        monitors.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn no_warnings_after_cancel() {
        let (tx, mut rx) = mpsc::channel(16);
        let mut monitors = FuelMonitors::new(settings(), tx);
        let mut vehicle = Vehicle::new("Civic", VehicleKind::Car);

        monitors.watch(&vehicle);
        rx.recv().await.expect("warning before cancel");

        assert!(monitors.cancel("Civic").await);
        assert!(!monitors.is_watching("Civic"));
        drain(&mut rx);

        vehicle.refill_fuel(3.0, 1.0).expect("refill");
        vehicle.set_fuel_level(1.0).expect("override");
        assert!(timeout(QUIET_PERIOD, rx.recv()).await.is_err());
        assert!(!monitors.cancel("Civic").await);
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_drains_every_monitor() {
        let (tx, mut rx) = mpsc::channel(16);
        let mut monitors = FuelMonitors::new(settings(), tx);
        let car = Vehicle::new("Civic", VehicleKind::Car);
        let bike = Vehicle::new("Vespa", VehicleKind::Bike);

        monitors.watch(&car);
        monitors.watch(&bike);
        assert_eq!(monitors.len(), 2);

        monitors.shutdown().await;
        assert!(monitors.is_empty());
        drain(&mut rx);
        assert!(timeout(QUIET_PERIOD, rx.recv()).await.is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn rewatching_replaces_the_previous_monitor() {
        let (tx, mut rx) = mpsc::channel(16);
        let mut monitors = FuelMonitors::new(settings(), tx);
        let vehicle = Vehicle::new("Civic", VehicleKind::Car);

        monitors.watch(&vehicle);
        monitors.watch(&vehicle);
        assert_eq!(monitors.len(), 1);

        monitors.shutdown().await;
        drain(&mut rx);
        assert!(timeout(QUIET_PERIOD, rx.recv()).await.is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn monitor_exits_when_receiver_is_dropped() {
        let (tx, rx) = mpsc::channel(1);
        let mut monitors = FuelMonitors::new(settings(), tx);
        let vehicle = Vehicle::new("Civic", VehicleKind::Car);
        drop(rx);

        monitors.watch(&vehicle);
        tokio::time::sleep(Duration::from_secs(11)).await;
        assert!(monitors.cancel("Civic").await);
    }
}
