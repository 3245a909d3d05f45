//! JSON exporter for gatekeeper runs.
//!
//! Writes the certificates and rollouts of a run as a single JSON document
//! for offline inspection. Best-effort; nothing reads it back.

use crate::gatekeeper::LoopReport;
use gatekeep_core::ProofCertificate;
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// One certificate, with the action rendered as text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CertificateRecord {
    pub action: String,
    pub robustness: f64,
    pub accepted: bool,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub per_trajectory: Vec<f64>,
}

impl CertificateRecord {
    /// Flattens a certificate. Robustness is the worst value of its degree;
    /// a degree that cannot be reduced is recorded as NaN (`null` in JSON).
    pub fn new<A: Display>(cert: &ProofCertificate<A>, threshold: f64) -> Self {
        Self {
            action: cert.action.to_string(),
            robustness: cert.proof_abides.reduce_min().unwrap_or(f64::NAN),
            accepted: cert.abides(threshold),
            per_trajectory: cert
                .per_trajectory
                .iter()
                .map(|d| d.reduce_min().unwrap_or(f64::NAN))
                .collect(),
        }
    }
}

/// Complete run export.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunExport {
    /// Specification name
    pub spec: String,

    /// Formula in its diagnostic form
    pub formula: String,

    /// Seed used
    pub seed: u64,

    /// Acceptance threshold
    pub threshold: f64,

    pub certificates: Vec<CertificateRecord>,

    /// Observation labels of every rollout
    pub trajectories: Vec<Vec<String>>,

    pub accepted: usize,
    pub rejected: usize,
}

impl RunExport {
    /// Creates an empty export container.
    pub fn new(spec: &str, formula: &str, seed: u64, threshold: f64) -> Self {
        Self {
            spec: spec.to_string(),
            formula: formula.to_string(),
            seed,
            threshold,
            certificates: Vec::new(),
            trajectories: Vec::new(),
            accepted: 0,
            rejected: 0,
        }
    }

    /// Adds every certificate and rollout of a loop report.
    pub fn add_report<A: Display, O: Display>(&mut self, report: &LoopReport<A, O>) {
        for cert in &report.certificates {
            let record = CertificateRecord::new(cert, self.threshold);
            if record.accepted {
                self.accepted += 1;
            } else {
                self.rejected += 1;
            }
            self.certificates.push(record);
        }
        self.trajectories.extend(
            report
                .trajectories
                .iter()
                .map(|t| t.iter().map(|o| o.to_string()).collect::<Vec<String>>()),
        );
    }

    /// Writes to a JSON file.
    pub fn write_to_file(&self, path: impl AsRef<Path>) -> std::io::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        let mut file = File::create(path)?;
        file.write_all(json.as_bytes())?;
        Ok(())
    }
}
