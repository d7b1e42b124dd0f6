//! Pipe dimension table and the eighteen named pipe-work coefficients.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{PricingError, Result};

use super::loader::EMBEDDED_PIPES_PRICELIST;
use super::models::Localized;

/// Pipe material, selects which base price column applies
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PipeMaterial {
    #[default]
    Black,
    Galvanized,
}

impl PipeMaterial {
    pub fn label(&self) -> Localized {
        match self {
            PipeMaterial::Black => Localized::new("Black pipe", "Черная труба"),
            PipeMaterial::Galvanized => Localized::new("Galvanized pipe", "Оцинкованная труба"),
        }
    }
}

impl FromStr for PipeMaterial {
    type Err = PricingError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "black" => Ok(PipeMaterial::Black),
            "galvanized" => Ok(PipeMaterial::Galvanized),
            other => Err(PricingError::invalid_input(
                "material",
                format!("unknown pipe material \"{}\"", other),
            )),
        }
    }
}

/// Named per-condition multiplier for pipe work.
///
/// Declaration order is the enumeration order used in breakdown displays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PipeCoefficient {
    EngineRoom,
    ThreadedConnection,
    Sch80,
    Hydraulics,
    InterferingPipeline,
    Plastic,
    Copper,
    StainlessSteel,
    MetalPlastic,
    CustomerMaterial,
    AirBlow,
    Painted,
    InTank,
    InTunnel,
    Handover,
    NewPipeline,
    Sch160,
    RepairOnSite,
}

impl PipeCoefficient {
    pub const ALL: [PipeCoefficient; 18] = [
        PipeCoefficient::EngineRoom,
        PipeCoefficient::ThreadedConnection,
        PipeCoefficient::Sch80,
        PipeCoefficient::Hydraulics,
        PipeCoefficient::InterferingPipeline,
        PipeCoefficient::Plastic,
        PipeCoefficient::Copper,
        PipeCoefficient::StainlessSteel,
        PipeCoefficient::MetalPlastic,
        PipeCoefficient::CustomerMaterial,
        PipeCoefficient::AirBlow,
        PipeCoefficient::Painted,
        PipeCoefficient::InTank,
        PipeCoefficient::InTunnel,
        PipeCoefficient::Handover,
        PipeCoefficient::NewPipeline,
        PipeCoefficient::Sch160,
        PipeCoefficient::RepairOnSite,
    ];

    /// Key used in the data file and in breakdowns
    pub fn key(&self) -> &'static str {
        match self {
            PipeCoefficient::EngineRoom => "engineRoom",
            PipeCoefficient::ThreadedConnection => "threadedConnection",
            PipeCoefficient::Sch80 => "sch80",
            PipeCoefficient::Hydraulics => "hydraulics",
            PipeCoefficient::InterferingPipeline => "interferingPipeline",
            PipeCoefficient::Plastic => "plastic",
            PipeCoefficient::Copper => "copper",
            PipeCoefficient::StainlessSteel => "stainlessSteel",
            PipeCoefficient::MetalPlastic => "metalPlastic",
            PipeCoefficient::CustomerMaterial => "customerMaterial",
            PipeCoefficient::AirBlow => "airBlow",
            PipeCoefficient::Painted => "painted",
            PipeCoefficient::InTank => "inTank",
            PipeCoefficient::InTunnel => "inTunnel",
            PipeCoefficient::Handover => "handover",
            PipeCoefficient::NewPipeline => "newPipeline",
            PipeCoefficient::Sch160 => "sch160",
            PipeCoefficient::RepairOnSite => "repairOnSite",
        }
    }
}

impl fmt::Display for PipeCoefficient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for PipeCoefficient {
    type Err = PricingError;

    fn from_str(s: &str) -> Result<Self> {
        PipeCoefficient::ALL
            .into_iter()
            .find(|c| c.key().eq_ignore_ascii_case(s))
            .ok_or_else(|| {
                PricingError::invalid_input("coefficient", format!("unknown coefficient \"{}\"", s))
            })
    }
}

/// One row of the pipe dimension table, prices per 1000 mm of pipe
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipeDimension {
    #[serde(rename = "dn_mm")]
    pub diameter: u32,
    #[serde(rename = "pipe_black")]
    pub price_black: Decimal,
    #[serde(rename = "pipe_galvanized")]
    pub price_galvanized: Decimal,
    #[serde(rename = "fitting_elbow_transition_weld")]
    pub elbow_price: Decimal,
}

impl PipeDimension {
    pub fn base_price(&self, material: PipeMaterial) -> Decimal {
        match material {
            PipeMaterial::Black => self.price_black,
            PipeMaterial::Galvanized => self.price_galvanized,
        }
    }
}

/// Multiplier value plus its human-readable description
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoefficientRecord {
    pub value: Decimal,
    pub description: String,
}

/// Pipe table as it appears on disk, before validation
#[derive(Deserialize)]
struct RawPipeTable {
    pipes: Vec<PipeDimension>,
    coefficients: BTreeMap<PipeCoefficient, CoefficientRecord>,
}

/// Pipe pricelist: dimension rows plus all eighteen coefficient records.
///
/// Only built through [`PipeTable::from_json`], so every coefficient is present.
#[derive(Debug, Clone)]
pub struct PipeTable {
    pipes: Vec<PipeDimension>,
    coefficients: BTreeMap<PipeCoefficient, CoefficientRecord>,
}

impl PipeTable {
    /// Parse and validate a pipe table from its JSON text.
    pub fn from_json(text: &str) -> Result<Self> {
        let raw: RawPipeTable = serde_json::from_str(text)?;
        let table = PipeTable {
            pipes: raw.pipes,
            coefficients: raw.coefficients,
        };
        table.validate()?;
        info!(
            "Pipe table loaded: {} diameters, {} coefficients",
            table.pipes.len(),
            table.coefficients.len()
        );
        Ok(table)
    }

    /// The pipe table compiled into the binary.
    pub fn embedded() -> Result<Self> {
        Self::from_json(EMBEDDED_PIPES_PRICELIST)
    }

    fn validate(&self) -> Result<()> {
        for coefficient in PipeCoefficient::ALL {
            let record = self.coefficients.get(&coefficient).ok_or_else(|| {
                PricingError::InvalidCatalog {
                    path: format!("coefficients.{}", coefficient),
                    reason: "missing coefficient".to_string(),
                }
            })?;
            if record.value <= Decimal::ZERO {
                return Err(PricingError::InvalidCatalog {
                    path: format!("coefficients.{}", coefficient),
                    reason: format!("value must be positive, got {}", record.value),
                });
            }
        }

        for (index, pipe) in self.pipes.iter().enumerate() {
            if self.pipes[..index]
                .iter()
                .any(|p| p.diameter == pipe.diameter)
            {
                return Err(PricingError::InvalidCatalog {
                    path: format!("pipes[{}]", index),
                    reason: format!("duplicate diameter DN{}", pipe.diameter),
                });
            }
            let prices = [pipe.price_black, pipe.price_galvanized, pipe.elbow_price];
            if prices.iter().any(|p| *p < Decimal::ZERO) {
                return Err(PricingError::InvalidCatalog {
                    path: format!("pipes[{}]", index),
                    reason: "negative price".to_string(),
                });
            }
        }
        Ok(())
    }

    pub fn dimension(&self, diameter: u32) -> Result<&PipeDimension> {
        self.pipes
            .iter()
            .find(|p| p.diameter == diameter)
            .ok_or(PricingError::DiameterNotFound { diameter })
    }

    /// Coefficient record; every coefficient is present once the table has loaded.
    pub fn coefficient(&self, coefficient: PipeCoefficient) -> &CoefficientRecord {
        &self.coefficients[&coefficient]
    }

    pub fn available_diameters(&self) -> Vec<u32> {
        let mut diameters: Vec<u32> = self.pipes.iter().map(|p| p.diameter).collect();
        diameters.sort_unstable();
        diameters
    }
}
