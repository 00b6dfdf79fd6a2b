//! Sensor views projecting one monitored condition out of the shared snapshot.

use std::fmt;
use std::sync::Arc;

use serde::Serialize;

use crate::config::CityWasteConfig;
use crate::model::{Condition, QueryIdentity, Snapshot};
use crate::ports::DischargePort;
use crate::service::CityWasteData;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
/// Current reading of a sensor.
pub enum SensorValue {
    /// Whole number reading.
    Integer(i64),
    /// Decimal reading, already rounded to two places.
    Number(f64),
    /// Textual reading, returned verbatim.
    Text(String),
}

impl fmt::Display for SensorValue {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SensorValue::Integer(value) => write!(formatter, "{value}"),
            SensorValue::Number(value) => write!(formatter, "{value}"),
            SensorValue::Text(value) => write!(formatter, "{value}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
/// Extra attributes exposed by the `total_kg` sensor.
pub struct SensorAttributes {
    /// Household address.
    pub address: String,
    /// Number of discharges this month.
    pub total_count: i64,
    /// Most recent weight, rounded.
    pub last_kg: Option<f64>,
    /// Most recent discharge timestamp.
    pub last_date: Option<String>,
    /// Accumulated weight, rounded.
    pub total_kg: f64,
}

/// Read-only view of one condition for one household.
pub struct CityWasteSensor {
    data: Arc<CityWasteData>,
    name: String,
    condition: Condition,
}

impl CityWasteSensor {
    /// Create a sensor reading `condition` from the shared fetcher.
    #[must_use]
    pub fn new<S: Into<String>>(data: Arc<CityWasteData>, name: S, condition: Condition) -> Self {
        Self {
            data,
            name: name.into(),
            condition,
        }
    }

    /// Display name, the configured prefix followed by the condition label.
    #[must_use]
    pub fn name(&self) -> String {
        format!("{} {}", self.name, self.condition.label())
    }

    /// Condition this sensor reports.
    #[must_use]
    pub fn condition(&self) -> Condition {
        self.condition
    }

    /// Unit of measurement.
    #[must_use]
    pub fn unit(&self) -> &'static str {
        self.condition.unit()
    }

    /// Frontend icon.
    #[must_use]
    pub fn icon(&self) -> &'static str {
        self.condition.icon()
    }

    /// Current value, or `None` before the first successful update.
    #[must_use]
    pub fn state(&self) -> Option<SensorValue> {
        let snapshot = self.data.snapshot()?;
        condition_value(&snapshot, self.condition)
    }

    /// Attribute bundle; only the `total_kg` sensor has one.
    #[must_use]
    pub fn attributes(&self) -> Option<SensorAttributes> {
        if self.condition != Condition::TotalKg {
            return None;
        }
        let snapshot = self.data.snapshot()?;

        Some(SensorAttributes {
            address: snapshot.address.clone(),
            total_count: snapshot.total_count,
            last_kg: snapshot.last_kg.map(round2),
            last_date: snapshot.last_date.clone(),
            total_kg: round2(snapshot.total_kg),
        })
    }

    /// Whether the shared fetcher's last cycle succeeded.
    #[must_use]
    pub fn available(&self) -> bool {
        self.data.available()
    }

    /// Ask the shared fetcher for fresh data, subject to its throttle.
    pub async fn update(&self) {
        self.data.update().await;
    }
}

fn condition_value(snapshot: &Snapshot, condition: Condition) -> Option<SensorValue> {
    match condition {
        Condition::TotalCount => Some(SensorValue::Integer(snapshot.total_count)),
        Condition::LastKg => snapshot.last_kg.map(|kg| SensorValue::Number(round2(kg))),
        Condition::LastDate => snapshot.last_date.clone().map(SensorValue::Text),
        Condition::TotalKg => Some(SensorValue::Number(round2(snapshot.total_kg))),
        Condition::Address => Some(SensorValue::Text(snapshot.address.clone())),
    }
}

/// Round to two decimal places, ties to even on the exact binary value.
#[must_use]
pub fn round2(value: f64) -> f64 {
    format!("{value:.2}").parse().unwrap_or(value)
}

/// Build the shared fetcher and one sensor per configured condition.
#[must_use]
pub fn setup_platform(
    config: &CityWasteConfig,
    port: Arc<dyn DischargePort>,
) -> (Arc<CityWasteData>, Vec<CityWasteSensor>) {
    let query = QueryIdentity::new(config.tagprintcd.clone(), config.aptdong, config.apthono);
    let data = Arc::new(CityWasteData::new(port, query));

    let sensors = config
        .monitored_conditions
        .iter()
        .map(|condition| CityWasteSensor::new(Arc::clone(&data), config.name.clone(), *condition))
        .collect();

    (data, sensors)
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use async_trait::async_trait;

    use super::*;
    use crate::model::{DateRange, DischargeRecord, FirstPage};
    use crate::ports::FetchError;

    struct FixedPort {
        first: FirstPage,
    }

    #[async_trait]
    impl DischargePort for FixedPort {
        async fn first_page(
            &self,
            _query: &QueryIdentity,
            _range: DateRange,
        ) -> Result<FirstPage, FetchError> {
            Ok(self.first.clone())
        }

        async fn page(
            &self,
            _query: &QueryIdentity,
            _range: DateRange,
            _index: u32,
        ) -> Result<Vec<DischargeRecord>, FetchError> {
            Ok(Vec::new())
        }
    }

    fn shared_data(records: Vec<DischargeRecord>) -> Arc<CityWasteData> {
        let port = Arc::new(FixedPort {
            first: FirstPage {
                total_count: 4,
                total_pages: 1,
                address: "101-1203".to_owned(),
                records,
            },
        });
        Arc::new(
            CityWasteData::new(port, QueryIdentity::new("TAG", 101, 1203))
                .with_min_interval(Duration::ZERO),
        )
    }

    fn weighed() -> Vec<DischargeRecord> {
        vec![
            DischargeRecord {
                kg: 1.234,
                date: "2024-05-02 08:10".to_owned(),
            },
            DischargeRecord {
                kg: 2.0,
                date: "2024-05-01 19:44".to_owned(),
            },
        ]
    }

    #[tokio::test]
    async fn values_are_rounded_to_two_places() {
        let data = shared_data(weighed());
        let last = CityWasteSensor::new(Arc::clone(&data), "Home", Condition::LastKg);
        let total = CityWasteSensor::new(Arc::clone(&data), "Home", Condition::TotalKg);

        last.update().await;

        assert_eq!(last.state(), Some(SensorValue::Number(1.23)));
        assert_eq!(total.state(), Some(SensorValue::Number(3.23)));
    }

    #[tokio::test]
    async fn text_and_count_are_verbatim() {
        let data = shared_data(weighed());
        let date = CityWasteSensor::new(Arc::clone(&data), "Home", Condition::LastDate);
        let count = CityWasteSensor::new(Arc::clone(&data), "Home", Condition::TotalCount);
        let address = CityWasteSensor::new(Arc::clone(&data), "Home", Condition::Address);

        data.update().await;

        assert_eq!(
            date.state(),
            Some(SensorValue::Text("2024-05-02 08:10".to_owned()))
        );
        assert_eq!(count.state(), Some(SensorValue::Integer(4)));
        assert_eq!(address.state().map(|value| value.to_string()).as_deref(), Some("101-1203"));
    }

    #[tokio::test]
    async fn only_total_kg_has_attributes() {
        let data = shared_data(weighed());
        let total = CityWasteSensor::new(Arc::clone(&data), "Home", Condition::TotalKg);
        let last = CityWasteSensor::new(Arc::clone(&data), "Home", Condition::LastKg);

        data.update().await;

        assert_eq!(
            total.attributes(),
            Some(SensorAttributes {
                address: "101-1203".to_owned(),
                total_count: 4,
                last_kg: Some(1.23),
                last_date: Some("2024-05-02 08:10".to_owned()),
                total_kg: 3.23,
            })
        );
        assert_eq!(last.attributes(), None);
    }

    #[test]
    fn unset_snapshot_reads_as_absent() {
        let data = shared_data(weighed());
        let sensor = CityWasteSensor::new(data, "Home", Condition::TotalKg);

        assert_eq!(sensor.state(), None);
        assert_eq!(sensor.attributes(), None);
        assert!(!sensor.available());
    }

    #[tokio::test]
    async fn empty_month_has_no_last_values() {
        let data = shared_data(Vec::new());
        let last = CityWasteSensor::new(Arc::clone(&data), "Home", Condition::LastKg);
        let total = CityWasteSensor::new(Arc::clone(&data), "Home", Condition::TotalKg);

        data.update().await;

        assert_eq!(last.state(), None);
        assert_eq!(total.state(), Some(SensorValue::Number(0.0)));
        assert!(last.available());
    }

    #[test]
    fn name_unit_and_icon_come_from_the_condition() {
        let sensor = CityWasteSensor::new(shared_data(Vec::new()), "Citywaste", Condition::LastKg);

        assert_eq!(sensor.name(), "Citywaste Last kg");
        assert_eq!(sensor.unit(), "kg");
        assert_eq!(sensor.icon(), "mdi:scale");
    }

    #[test]
    fn setup_creates_one_sensor_per_condition() {
        let config = CityWasteConfig::new("TAG", 101, 1203);
        let port = Arc::new(FixedPort {
            first: FirstPage {
                total_count: 0,
                total_pages: 1,
                address: String::new(),
                records: Vec::new(),
            },
        });

        let (data, sensors) = setup_platform(&config, port);

        let conditions: Vec<Condition> = sensors.iter().map(CityWasteSensor::condition).collect();
        assert_eq!(conditions, Condition::default_set());
        assert_eq!(data.query(), &QueryIdentity::new("TAG", 101, 1203));
        assert_eq!(Arc::strong_count(&data), 4);
    }

    #[test]
    fn rounding() {
        assert_eq!(round2(3.14159), 3.14);
        assert_eq!(round2(2.0), 2.0);
        assert_eq!(round2(0.125_1), 0.13);
    }

    #[test]
    fn rounding_ties_follow_the_binary_value() {
        assert_eq!(round2(0.125), 0.12);
        assert_eq!(round2(2.675), 2.67);
        assert_eq!(round2(0.625), 0.62);
        assert_eq!(round2(10.125), 10.12);
        assert_eq!(round2(4.345), 4.34);
    }
}
