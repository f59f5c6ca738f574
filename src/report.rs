use crate::config::SizingConfig;
use crate::engine::{adapt, audit_label, route};
use crate::types::{AdaptedView, RawAuditRecord, ReviewRow, ServiceKind, ServiceRoute};
use crate::util::{format_currency, format_int, format_number, parse_date_safe};

const MISSING: &str = "—";

/// A rendered review: which branch was taken, the view it was built from,
/// and the summary rows.
#[derive(Debug, Clone, PartialEq)]
pub struct Review {
    pub route: ServiceRoute,
    pub view: AdaptedView,
    pub rows: Vec<ReviewRow>,
}

pub fn build_review(record: &RawAuditRecord, config: &SizingConfig) -> Review {
    let route = route(record);
    let view = adapt(record, config);
    let mut rows = review_rows(&view, route, record.services.first().map(String::as_str), config);
    let label = audit_label(record).unwrap_or_default();
    for row in &mut rows {
        row.audit.clone_from(&label);
    }
    Review { route, view, rows }
}

pub fn review_rows(
    view: &AdaptedView,
    route: ServiceRoute,
    service_label: Option<&str>,
    config: &SizingConfig,
) -> Vec<ReviewRow> {
    let mut rows = header_rows(view);
    let r = &view.derived_results;
    let bag = &view.attribute_bag;
    let money = |v: f64| format_currency(&config.currency_symbol, v);
    let field = |key: &str| bag.text(key).unwrap_or_else(|| MISSING.to_string());

    match route {
        ServiceRoute::Vertical(ServiceKind::Solar) => {
            push(&mut rows, "Solar", "Inverter", format!("{} kVA", format_number(r.rec_inverter, 1)));
            push(&mut rows, "Solar", "Battery Bank", format!("{} kWh", format_number(r.rec_battery, 1)));
            push(&mut rows, "Solar", "PV Array", format!("{} kWp", format_number(r.rec_solar_result, 2)));
            push(&mut rows, "Solar", "Autonomy", format!("{} h", format_number(r.est_autonomy, 1)));
            push(&mut rows, "Solar", "Grid Independence", format!("{}%", format_number(r.independence, 0)));
            push(&mut rows, "Solar", "Monthly Savings", money(r.monthly_savings));
            push(&mut rows, "Solar", "Payback", format!("{} years", format_number(r.payback, 1)));
            push(&mut rows, "Solar", "Total System Cost", money(r.total_cost));
            push(&mut rows, "Proof", "Depth of Discharge", format_number(r.battery_dod, 2));
            push(&mut rows, "Proof", "Diversity Factor", format_number(r.diversity_factor, 2));
            push(&mut rows, "Proof", "Target Coverage", format!("{}%", format_number(r.target_coverage, 0)));
            push(
                &mut rows,
                "Proof",
                "Usable Storage",
                format!("{} kWh", format_number(r.rec_battery * r.battery_dod, 2)),
            );
            push(
                &mut rows,
                "Proof",
                "Diversified Load",
                format!("{} kW", format_number(r.total_load * r.diversity_factor, 2)),
            );
        }
        ServiceRoute::Vertical(ServiceKind::Cctv) => {
            push(&mut rows, "CCTV", "Cameras", format_int(r.total_cameras as u64));
            push(&mut rows, "CCTV", "NVR Storage", format!("{} TB", format_number(r.storage_required, 0)));
            push(&mut rows, "CCTV", "Cable Run", format!("{} m", format_number(r.total_cable_length, 0)));
        }
        ServiceRoute::Vertical(ServiceKind::Generator) => {
            push(&mut rows, "Generator", "Connected Load", kw(r.total_load));
            push(&mut rows, "Generator", "Surge Power", kw(r.surge_power));
            push(&mut rows, "Generator", "Recommended Size", format!("{} kVA", format_number(r.recommended_gen_size, 0)));
            push(&mut rows, "Generator", "Est. Monthly Fuel", money(r.fuel_cost));
            push(&mut rows, "Generator", "Existing Generator", field("hasGenerator"));
            push(&mut rows, "Generator", "Existing Rating", field("generatorRating"));
            push(&mut rows, "Generator", "ATS Installed", field("hasAts"));
        }
        ServiceRoute::Vertical(ServiceKind::Wiring) => {
            push(&mut rows, "Wiring", "Connected Load", kw(r.total_load));
            push(&mut rows, "Wiring", "Peak Load", kw(r.peak_load));
            push(&mut rows, "Wiring", "Recommended Cable", r.recommended_cable_size.clone());
            push(&mut rows, "Wiring", "DB Type", field("dbType"));
            push(&mut rows, "Wiring", "DB Condition", field("dbCondition"));
            push(&mut rows, "Wiring", "Breaker Quality", field("breakerQuality"));
            push(&mut rows, "Wiring", "Conduit", field("conduitType"));
        }
        ServiceRoute::Vertical(ServiceKind::Earthing) => {
            push(&mut rows, "Earthing", "Earthing Type", field("earthingType"));
            push(&mut rows, "Earthing", "Measured Resistance (Ω)", field("earthResistance"));
            push(&mut rows, "Earthing", "Soil Type", field("soilType"));
            push(&mut rows, "Earthing", "Lightning Protection", field("lightningProtection"));
        }
        ServiceRoute::Vertical(ServiceKind::Industrial) => {
            push(&mut rows, "Industrial", "Machinery", format_int(bag.machinery.len() as u64));
            push(&mut rows, "Industrial", "Connected Load", kw(r.total_load));
            push(&mut rows, "Industrial", "Critical Load", kw(r.critical_load));
            push(&mut rows, "Industrial", "Peak Load", kw(r.peak_load));
            push(&mut rows, "Industrial", "Surge Power", kw(r.surge_power));
            push(&mut rows, "Industrial", "Generator Size", format!("{} kVA", format_number(r.recommended_gen_size, 0)));
            push(&mut rows, "Industrial", "Supply Cable", r.recommended_cable_size.clone());
        }
        ServiceRoute::Generic => {
            push(&mut rows, "Summary", "Service", service_label.unwrap_or(MISSING).to_string());
            push(&mut rows, "Summary", "Connected Load", kw(r.total_load));
            push(&mut rows, "Summary", "Daily Energy", format!("{} kWh", format_number(r.daily_energy, 2)));
            push(&mut rows, "Summary", "Critical Load", kw(r.critical_load));
        }
    }

    for w in &r.warnings {
        push(&mut rows, "Warning", &w.component, w.message.clone());
    }
    rows
}

fn header_rows(view: &AdaptedView) -> Vec<ReviewRow> {
    let p = &view.client_profile;
    let or_missing = |v: &Option<String>| v.clone().unwrap_or_else(|| MISSING.to_string());
    let audit_date = match parse_date_safe(p.audit_date.as_deref()) {
        Some(d) => d.format("%d %b %Y").to_string(),
        None => or_missing(&p.audit_date),
    };

    let mut rows = Vec::new();
    push(&mut rows, "Client", "Name", or_missing(&p.name));
    push(&mut rows, "Client", "Address", or_missing(&p.address));
    push(&mut rows, "Client", "Building Type", or_missing(&p.building_type));
    push(&mut rows, "Audit", "Engineer", p.engineer_name.clone());
    push(&mut rows, "Audit", "Date", audit_date);
    rows
}

fn kw(v: f64) -> String {
    format!("{} kW", format_number(v, 2))
}

fn push(rows: &mut Vec<ReviewRow>, section: &str, item: &str, value: String) {
    rows.push(ReviewRow {
        audit: String::new(),
        section: section.to_string(),
        item: item.to_string(),
        value,
    });
}
