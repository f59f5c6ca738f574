//! Quote drafting from an adapted audit.
//!
//! Equipment lines are priced from the already-derived results. Nothing in
//! here recomputes sizing.

use crate::config::{PricingConfig, SizingConfig};
use crate::engine::{adapt, audit_label, route};
use crate::types::{DerivedResults, EquipmentLine, RawAuditRecord, ServiceKind, ServiceRoute};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteDraft {
    pub route: ServiceRoute,
    pub client_name: Option<String>,
    /// Copy of the derived results the quote was priced from.
    pub specs: DerivedResults,
    pub lines: Vec<EquipmentLine>,
    pub subtotal: f64,
}

pub fn build_quote(record: &RawAuditRecord, config: &SizingConfig) -> QuoteDraft {
    let route = route(record);
    let view = adapt(record, config);
    let mut lines = equipment_lines(&view.derived_results, route, &config.pricing);
    let label = audit_label(record).unwrap_or_default();
    for line in &mut lines {
        line.audit.clone_from(&label);
    }
    let subtotal: f64 = lines.iter().map(|l| l.amount).sum();
    QuoteDraft {
        route,
        client_name: view.client_profile.name,
        specs: view.derived_results,
        lines,
        subtotal,
    }
}

pub fn equipment_lines(
    results: &DerivedResults,
    route: ServiceRoute,
    pricing: &PricingConfig,
) -> Vec<EquipmentLine> {
    let lines = match route {
        ServiceRoute::Vertical(ServiceKind::Solar) => vec![
            line("Hybrid inverter", results.rec_inverter, "kVA", pricing.inverter_per_kva),
            line("Battery bank", results.rec_battery, "kWh", pricing.battery_per_kwh),
            line("PV array", results.rec_solar_result, "kWp", pricing.panel_per_kwp),
        ],
        ServiceRoute::Vertical(ServiceKind::Cctv) => vec![
            line("IP camera", results.total_cameras as f64, "pcs", pricing.camera_unit),
            line("NVR", if results.total_cameras > 0 { 1.0 } else { 0.0 }, "pcs", pricing.nvr_unit),
            line("Camera cabling", results.total_cable_length, "m", pricing.cable_per_metre),
        ],
        _ => vec![line("Engineering works", 1.0, "lot", pricing.generic_service_fee)],
    };
    lines.into_iter().filter(|l| l.quantity > 0.0).collect()
}

fn line(description: &str, quantity: f64, unit: &str, unit_price: f64) -> EquipmentLine {
    EquipmentLine {
        audit: String::new(),
        description: description.to_string(),
        quantity,
        unit: unit.to_string(),
        unit_price,
        amount: quantity * unit_price,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn quote(value: serde_json::Value) -> QuoteDraft {
        let rec: RawAuditRecord = serde_json::from_value(value).unwrap();
        build_quote(&rec, SizingConfig::standard())
    }

    #[test]
    fn solar_quote_prices_design_sizes() {
        let q = quote(json!({
            "services": ["solar"],
            "design": {"recommendedInverter": 5, "batteryCapacity": 10, "solarArraySize": 4}
        }));
        let p = PricingConfig::default();
        assert_eq!(q.lines.len(), 3);
        assert_eq!(q.lines[0].amount, 5.0 * p.inverter_per_kva);
        assert_eq!(
            q.subtotal,
            5.0 * p.inverter_per_kva + 10.0 * p.battery_per_kwh + 4.0 * p.panel_per_kwp
        );
    }

    #[test]
    fn solar_quote_drops_zero_lines() {
        let q = quote(json!({"services": ["solar"], "design": {"recommendedInverter": 3}}));
        assert_eq!(q.lines.len(), 1);
        assert_eq!(q.lines[0].description, "Hybrid inverter");
    }

    #[test]
    fn cctv_quote_uses_camera_fallback() {
        let q = quote(json!({"services": ["cctv"], "site": {"cameras": [{}, {}]}}));
        let cams = &q.lines[0];
        assert_eq!(cams.quantity, 2.0);
        assert_eq!(q.lines[1].description, "NVR");
        assert_eq!(q.lines[2].quantity, 90.0);
        assert_eq!(q.specs.total_cameras, 2);
    }

    #[test]
    fn cctv_without_cameras_has_no_lines() {
        let q = quote(json!({"services": ["cctv"]}));
        assert!(q.lines.is_empty());
        assert_eq!(q.subtotal, 0.0);
    }

    #[test]
    fn lines_carry_the_audit_label() {
        let q = quote(json!({"id": "AUD-3", "services": ["cctv"], "load": {"cameras": [{}]}}));
        assert_eq!(q.lines.len(), 3);
        assert!(q.lines.iter().all(|l| l.audit == "AUD-3"));
    }

    #[test]
    fn other_verticals_get_placeholder_line() {
        for service in ["wiring", "generator", "earthing", "industrial", "mystery"] {
            let q = quote(json!({"services": [service], "client": {"name": "Ade"}}));
            assert_eq!(q.lines.len(), 1, "service {service}");
            assert_eq!(q.lines[0].description, "Engineering works");
            assert_eq!(q.client_name.as_deref(), Some("Ade"));
        }
    }
}
