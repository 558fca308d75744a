//! Tabular observation records and their CSV form
//!
//! Header: `age,information_fidelity,error_correction,molecular_damage,entropy_production,scenario`

use std::fmt;
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use csv::{ReaderBuilder, WriterBuilder};
use serde::{Deserialize, Serialize};

use crate::InfoThermoError;

pub const CSV_HEADER: [&str; 6] = [
    "age",
    "information_fidelity",
    "error_correction",
    "molecular_damage",
    "entropy_production",
    "scenario",
];

/// Scenario label attached to every record
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Scenario {
    Baseline,
    Intervention,
    Other(String),
}

impl Scenario {
    pub fn as_str(&self) -> &str {
        match self {
            Scenario::Baseline => "baseline",
            Scenario::Intervention => "intervention",
            Scenario::Other(label) => label.as_str(),
        }
    }
}

impl From<String> for Scenario {
    fn from(label: String) -> Self {
        match label.as_str() {
            "baseline" => Scenario::Baseline,
            "intervention" => Scenario::Intervention,
            _ => Scenario::Other(label),
        }
    }
}

impl From<&str> for Scenario {
    fn from(label: &str) -> Self {
        Scenario::from(label.to_string())
    }
}

impl From<Scenario> for String {
    fn from(scenario: Scenario) -> Self {
        match scenario {
            Scenario::Other(label) => label,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One observation row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObservationRecord {
    pub age: f64,
    pub information_fidelity: f64,
    pub error_correction: f64,
    pub molecular_damage: f64,
    pub entropy_production: f64,
    pub scenario: Scenario,
}

/// Column view of one scenario, sorted by age
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScenarioSeries {
    pub age: Vec<f64>,
    pub information_fidelity: Vec<f64>,
    pub error_correction: Vec<f64>,
    pub molecular_damage: Vec<f64>,
    pub entropy_production: Vec<f64>,
}

impl ScenarioSeries {
    pub fn len(&self) -> usize {
        self.age.len()
    }

    pub fn is_empty(&self) -> bool {
        self.age.is_empty()
    }
}

/// Ordered collection of observation records across scenarios.
///
/// Insertion order is kept; chronology is only meaningful within one
/// scenario after [`Dataset::scenario_series`] sorts it by age.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    records: Vec<ObservationRecord>,
}

impl Dataset {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_records(records: Vec<ObservationRecord>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[ObservationRecord] {
        &self.records
    }

    pub fn into_records(self) -> Vec<ObservationRecord> {
        self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn push(&mut self, record: ObservationRecord) {
        self.records.push(record);
    }

    pub fn extend(&mut self, records: impl IntoIterator<Item = ObservationRecord>) {
        self.records.extend(records);
    }

    pub fn has_scenario(&self, scenario: &Scenario) -> bool {
        self.records.iter().any(|record| &record.scenario == scenario)
    }

    /// Distinct scenarios in order of first appearance.
    pub fn scenarios(&self) -> Vec<Scenario> {
        let mut seen: Vec<Scenario> = Vec::new();
        for record in &self.records {
            if !seen.contains(&record.scenario) {
                seen.push(record.scenario.clone());
            }
        }
        seen
    }

    pub fn iter_scenario<'a>(
        &'a self,
        scenario: &'a Scenario,
    ) -> impl Iterator<Item = &'a ObservationRecord> + 'a {
        self.records
            .iter()
            .filter(move |record| &record.scenario == scenario)
    }

    /// Records of `scenario`, stably sorted by age.
    pub fn scenario_series(&self, scenario: &Scenario) -> ScenarioSeries {
        let mut rows: Vec<&ObservationRecord> = self.iter_scenario(scenario).collect();
        rows.sort_by(|a, b| a.age.total_cmp(&b.age));

        let mut series = ScenarioSeries {
            age: Vec::with_capacity(rows.len()),
            information_fidelity: Vec::with_capacity(rows.len()),
            error_correction: Vec::with_capacity(rows.len()),
            molecular_damage: Vec::with_capacity(rows.len()),
            entropy_production: Vec::with_capacity(rows.len()),
        };
        for row in rows {
            series.age.push(row.age);
            series.information_fidelity.push(row.information_fidelity);
            series.error_correction.push(row.error_correction);
            series.molecular_damage.push(row.molecular_damage);
            series.entropy_production.push(row.entropy_production);
        }
        series
    }

    pub fn write_csv<W: Write>(&self, writer: W) -> Result<(), InfoThermoError> {
        let mut wtr = WriterBuilder::new().has_headers(true).from_writer(writer);

        if self.records.is_empty() {
            wtr.write_record(CSV_HEADER)?;
        }
        for record in &self.records {
            wtr.serialize(record)?;
        }

        wtr.flush()?;
        Ok(())
    }

    pub fn read_csv<R: Read>(reader: R) -> Result<Self, InfoThermoError> {
        let mut rdr = ReaderBuilder::new().has_headers(true).from_reader(reader);

        let headers = rdr.headers()?;
        if let Some(missing) = CSV_HEADER
            .iter()
            .find(|column| !headers.iter().any(|header| header == **column))
        {
            return Err(InfoThermoError::InvalidArgument(format!(
                "dataset is missing column {missing}"
            )));
        }

        let records = rdr
            .deserialize()
            .collect::<Result<Vec<ObservationRecord>, csv::Error>>()?;
        Ok(Self { records })
    }

    pub fn save(&self, path: &Path) -> Result<(), InfoThermoError> {
        let file = File::create(path)?;
        self.write_csv(file)
    }

    pub fn load(path: &Path) -> Result<Self, InfoThermoError> {
        let file = File::open(path)?;
        Self::read_csv(file)
    }
}

impl FromIterator<ObservationRecord> for Dataset {
    fn from_iter<I: IntoIterator<Item = ObservationRecord>>(iter: I) -> Self {
        Self::from_records(iter.into_iter().collect())
    }
}
