//! Sizing engine: turns the normalized bag plus the upstream load stats and
//! design figures into the derived engineering results.
//!
//! Solar, battery and inverter sizes are produced by an external design step
//! and are carried through untouched. The depth-of-discharge and diversity
//! coefficients are reported next to them so a reviewer can follow the
//! proof, but they are not fed back into those figures.

use crate::config::SizingConfig;
use crate::types::{AttributeBag, DerivedResults, DesignSurvey, LoadStats};
use crate::util::finite_or_zero;
use tracing::debug;

pub fn derive(
    bag: &AttributeBag,
    stats: Option<&LoadStats>,
    design: Option<&DesignSurvey>,
    config: &SizingConfig,
) -> DerivedResults {
    let empty_stats = LoadStats::default();
    let empty_design = DesignSurvey::default();
    let stats = stats.unwrap_or(&empty_stats);
    let design = design.unwrap_or(&empty_design);

    let total_load = finite_or_zero(stats.total_load);
    let total_cameras = bag.cameras.len();

    let results = DerivedResults {
        total_load,
        daily_energy: finite_or_zero(stats.total_daily_energy),
        critical_load: finite_or_zero(stats.critical_load),
        peak_load: finite_or_zero(stats.peak_simultaneous_load),
        surge_power: finite_or_zero(stats.surge_power),
        battery_dod: battery_dod(design.battery_type.as_deref(), config),
        diversity_factor: diversity_factor(bag.items.len(), config),
        target_coverage: finite_or_zero(design.target_coverage),
        total_cameras,
        storage_required: storage_required(total_cameras, config),
        total_cable_length: cable_length(total_cameras, config),
        recommended_gen_size: generator_size(total_load, config),
        recommended_cable_size: cable_size(total_load, config).to_string(),
        fuel_cost: fuel_cost(total_load, config),
        rec_inverter: finite_or_zero(design.recommended_inverter),
        rec_battery: finite_or_zero(design.battery_capacity),
        rec_solar_result: finite_or_zero(design.solar_array_size),
        est_autonomy: finite_or_zero(design.backup_hours),
        independence: finite_or_zero(design.independence_level),
        monthly_savings: finite_or_zero(design.monthly_savings),
        payback: finite_or_zero(design.payback_years),
        total_cost: finite_or_zero(design.total_system_cost_estimate),
        warnings: design.warnings.clone(),
    };

    debug!(
        total_load,
        total_cameras,
        gen_kva = results.recommended_gen_size,
        cable = %results.recommended_cable_size,
        "derived sizing results"
    );
    results
}

/// Usable fraction of battery capacity for the given chemistry.
pub fn battery_dod(battery_type: Option<&str>, config: &SizingConfig) -> f64 {
    if battery_type == Some(config.lead_acid_label.as_str()) {
        config.lead_acid_dod
    } else {
        config.default_dod
    }
}

pub fn diversity_factor(item_count: usize, config: &SizingConfig) -> f64 {
    if item_count > config.diversity_item_threshold {
        config.large_site_diversity
    } else {
        config.default_diversity
    }
}

// Products of finite inputs can still overflow to infinity, so every
// computed figure is collapsed back to a finite value.

/// NVR storage in whole terabytes.
pub fn storage_required(cameras: usize, config: &SizingConfig) -> f64 {
    finite_or_zero(Some((cameras as f64 * config.storage_tb_per_camera).ceil()))
}

/// Total camera cable run in metres.
pub fn cable_length(cameras: usize, config: &SizingConfig) -> f64 {
    finite_or_zero(Some(cameras as f64 * config.cable_metres_per_camera))
}

/// Generator rating in whole kVA.
pub fn generator_size(total_load_kw: f64, config: &SizingConfig) -> f64 {
    finite_or_zero(Some((total_load_kw * config.generator_headroom).ceil()))
}

/// Monthly fuel spend, rounded up to a whole currency unit.
pub fn fuel_cost(total_load_kw: f64, config: &SizingConfig) -> f64 {
    finite_or_zero(Some((total_load_kw * config.fuel_cost_per_kw).ceil()))
}

pub fn cable_size(total_load_kw: f64, config: &SizingConfig) -> &str {
    if total_load_kw > config.heavy_cable_threshold_kw {
        &config.heavy_cable_size
    } else {
        &config.standard_cable_size
    }
}
