use std::time::{Duration, Instant};

use chrono::{DateTime, Local};
use citywaste_core::sensor::CityWasteSensor;

pub(crate) struct App {
    pub sensors: Vec<CityWasteSensor>,
    pub sensor_list_index: usize,

    pub scan_interval: Duration,
    pub last_trigger: Option<Instant>,
    pub last_refresh: Option<DateTime<Local>>,

    pub is_loading: bool,
    pub error_message: Option<String>,
}

impl App {
    pub(crate) fn new(sensors: Vec<CityWasteSensor>, scan_interval: Duration) -> Self {
        Self {
            sensors,
            sensor_list_index: 0,
            scan_interval,
            last_trigger: None,
            last_refresh: None,
            is_loading: false,
            error_message: None,
        }
    }

    /// Whether the periodic trigger should fire at `now`.
    pub(crate) fn refresh_due(&self, now: Instant) -> bool {
        self.last_trigger
            .is_none_or(|last| now.duration_since(last) >= self.scan_interval)
    }

    pub(crate) fn selected_sensor(&self) -> Option<&CityWasteSensor> {
        self.sensors.get(self.sensor_list_index)
    }

    pub(crate) fn select_previous(&mut self) {
        self.sensor_list_index = self.sensor_list_index.saturating_sub(1);
    }

    pub(crate) fn select_next(&mut self) {
        if self.sensor_list_index + 1 < self.sensors.len() {
            self.sensor_list_index += 1;
        }
    }

    /// Update every sensor; the shared fetcher decides whether to hit the network.
    pub(crate) async fn refresh(&mut self, now: Instant) {
        self.last_trigger = Some(now);

        for sensor in &self.sensors {
            sensor.update().await;
        }

        self.last_refresh = Some(Local::now());
        self.error_message = if self.sensors.iter().all(CityWasteSensor::available) {
            None
        } else {
            Some("Service unavailable, showing last known values".into())
        };
    }
}
