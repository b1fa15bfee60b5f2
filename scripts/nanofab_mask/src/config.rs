//! Mask and sweep configuration.

use std::path::{Path, PathBuf};

use photonics::error::{with_err_context, ErrorContext, ErrorSource, Result};
use serde::{Deserialize, Serialize};

/// Name of the GDS file written by a run.
pub const GDS_FILE_NAME: &str = "JMO_YTY_Nanofab_2024_UoB.gds";

/// Top-level configuration of a mask run.
///
/// Every field has a default, so a TOML file need only list what it overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MaskConfig {
    /// Directory the GDS file is written to.
    pub output_dir: PathBuf,
    pub file_name: String,
    /// Width of the design space, in micrometres.
    pub design_width: f64,
    /// Height of the design space, in micrometres.
    pub design_height: f64,
    /// Fail instead of warning when the devices overflow the design space.
    pub strict_bounds: bool,
    pub sweep: SweepConfig,
}

impl Default for MaskConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("."),
            file_name: GDS_FILE_NAME.to_string(),
            design_width: 6000.,
            design_height: 3000.,
            strict_bounds: false,
            sweep: SweepConfig::default(),
        }
    }
}

impl MaskConfig {
    /// Parses a configuration from TOML and validates it.
    pub fn from_toml(s: &str) -> Result<Self> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = with_err_context(std::fs::read_to_string(path), || {
            ErrorContext::ReadFile(path.to_path_buf())
        })?;
        with_err_context(Self::from_toml(&contents), || {
            ErrorContext::ReadFile(path.to_path_buf())
        })
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.design_width > 0. && self.design_height > 0.) {
            return Err(ErrorSource::Config(format!(
                "design space must have a positive size, got {} x {}",
                self.design_width, self.design_height
            ))
            .into());
        }
        self.sweep.validate()
    }

    /// The path of the GDS file written by a run.
    pub fn output_path(&self) -> PathBuf {
        self.output_dir.join(&self.file_name)
    }
}

/// The MZI sweeps placed on the mask, one row each.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SweepConfig {
    /// Devices in each spiral sweep row.
    pub devices_per_row: usize,
    /// Coupling length of the directional couplers in the spiral sweeps.
    pub coupling_length: f64,
    /// Coupling gap of the directional couplers in the spiral sweeps.
    pub coupling_gap: f64,
    pub lower_spiral_no: f64,
    pub spiral_gap: f64,
    /// Upper-arm turns of the first device in the spiral gap sweep.
    pub upper_spiral_start: f64,
    pub upper_spiral_step: f64,
    /// Upper-arm turns throughout the inner gap sweep.
    pub inner_gap_upper_spiral_no: f64,
    pub inner_gap_start: f64,
    pub inner_gap_step: f64,
    /// Upper-arm turns throughout the directional coupler sweeps.
    ///
    /// These rows keep the inner gap where the inner gap sweep finished.
    pub dc_upper_spiral_no: f64,
    pub dc_sweeps: Vec<DcSweep>,
}

/// Directional coupler geometries matched to one silicon thickness and etch depth.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DcSweep {
    /// Silicon layer thickness, in nanometres.
    pub si_thickness: u32,
    /// Etch depth, in nanometres.
    pub etch_depth: u32,
    pub lengths: Vec<f64>,
    pub gaps: Vec<f64>,
}

impl DcSweep {
    fn new(si_thickness: u32, etch_depth: u32, lengths: &[f64]) -> Self {
        Self {
            si_thickness,
            etch_depth,
            lengths: lengths.to_vec(),
            gaps: DC_GAPS.to_vec(),
        }
    }

    /// The base name of each device in the sweep.
    pub fn name(&self) -> String {
        format!(
            "JMO_YTY_DC_sweep_Si_{}nm_etch_{}nm",
            self.si_thickness, self.etch_depth
        )
    }
}

const DC_GAPS: [f64; 11] = [
    0.290, 0.292, 0.294, 0.296, 0.298, 0.300, 0.302, 0.304, 0.306, 0.308, 0.310,
];

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            devices_per_row: 11,
            coupling_length: 13.8,
            coupling_gap: 0.3,
            lower_spiral_no: 1.,
            spiral_gap: 5.,
            upper_spiral_start: 1.,
            upper_spiral_step: 0.5,
            inner_gap_upper_spiral_no: 5.,
            inner_gap_start: 5.,
            inner_gap_step: 0.3,
            dc_upper_spiral_no: 3.,
            dc_sweeps: vec![
                DcSweep::new(
                    220,
                    110,
                    &[10.3, 10.4, 10.5, 10.6, 10.7, 10.9, 11.5, 11.6, 11.7, 11.9, 12.0],
                ),
                DcSweep::new(
                    220,
                    120,
                    &[11.5, 11.6, 11.7, 11.8, 11.9, 12.2, 12.8, 13.0, 13.1, 13.3, 13.4],
                ),
                DcSweep::new(
                    220,
                    130,
                    &[13.0, 13.1, 13.2, 13.3, 13.5, 13.8, 14.5, 14.7, 15.0, 15.2, 15.3],
                ),
                DcSweep::new(
                    240,
                    130,
                    &[12.1, 12.2, 12.3, 12.4, 12.6, 12.9, 13.4, 13.6, 13.8, 14.0, 14.2],
                ),
            ],
        }
    }
}

impl SweepConfig {
    pub fn validate(&self) -> Result<()> {
        for dc in self.dc_sweeps.iter() {
            if dc.lengths.len() != dc.gaps.len() {
                return Err(ErrorSource::Config(format!(
                    "{} lists {} coupling lengths but {} coupling gaps",
                    dc.name(),
                    dc.lengths.len(),
                    dc.gaps.len()
                ))
                .into());
            }
        }
        Ok(())
    }

    /// The number of devices the sweep places.
    pub fn num_devices(&self) -> usize {
        2 * self.devices_per_row + self.dc_sweeps.iter().map(|dc| dc.lengths.len()).sum::<usize>()
    }
}
