//! Business-rule constants for the sizing engine and quote pricing.
//!
//! Everything here is tunable per region or price list without touching the
//! derivation code. A missing key in a config file keeps its default.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

static DEFAULT_CONFIG: Lazy<SizingConfig> = Lazy::new(SizingConfig::default);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SizingConfig {
    /// Shown when the audit does not name an engineer.
    pub engineer_placeholder: String,
    /// `batteryType` value that selects the lead-acid depth of discharge.
    pub lead_acid_label: String,
    pub lead_acid_dod: f64,
    pub default_dod: f64,
    /// Item counts strictly above this use `large_site_diversity`.
    pub diversity_item_threshold: usize,
    pub large_site_diversity: f64,
    pub default_diversity: f64,
    pub storage_tb_per_camera: f64,
    pub cable_metres_per_camera: f64,
    pub generator_headroom: f64,
    /// Loads strictly above this (kW) get the heavy cable.
    pub heavy_cable_threshold_kw: f64,
    pub heavy_cable_size: String,
    pub standard_cable_size: String,
    /// Monthly fuel spend per connected kW.
    pub fuel_cost_per_kw: f64,
    pub currency_symbol: String,
    pub pricing: PricingConfig,
}

impl Default for SizingConfig {
    fn default() -> Self {
        Self {
            engineer_placeholder: "Field Engineer".to_string(),
            lead_acid_label: "Lead-acid".to_string(),
            lead_acid_dod: 0.5,
            default_dod: 0.8,
            diversity_item_threshold: 10,
            large_site_diversity: 0.65,
            default_diversity: 0.8,
            storage_tb_per_camera: 0.5,
            cable_metres_per_camera: 45.0,
            generator_headroom: 1.5,
            heavy_cable_threshold_kw: 10.0,
            heavy_cable_size: "16mm²".to_string(),
            standard_cable_size: "10mm²".to_string(),
            fuel_cost_per_kw: 15000.0,
            currency_symbol: "₦".to_string(),
            pricing: PricingConfig::default(),
        }
    }
}

impl SizingConfig {
    /// Shared default instance, built once per process.
    pub fn standard() -> &'static SizingConfig {
        &DEFAULT_CONFIG
    }
}

/// Per-unit rates used to turn derived sizing into quote lines.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PricingConfig {
    pub inverter_per_kva: f64,
    pub battery_per_kwh: f64,
    pub panel_per_kwp: f64,
    pub camera_unit: f64,
    pub nvr_unit: f64,
    pub cable_per_metre: f64,
    pub generic_service_fee: f64,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            inverter_per_kva: 250_000.0,
            battery_per_kwh: 180_000.0,
            panel_per_kwp: 450_000.0,
            camera_unit: 85_000.0,
            nvr_unit: 220_000.0,
            cable_per_metre: 1_200.0,
            generic_service_fee: 150_000.0,
        }
    }
}
