use crate::util::{
    lenient_f64, lenient_flag, lenient_layer, lenient_string, lenient_text, lenient_vec,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;
use tabled::Tabled;

/// An audit exactly as the capture wizard left it. Every layer is written by
/// a different wizard step and any of them may be missing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawAuditRecord {
    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "lenient_layer", skip_serializing_if = "Option::is_none")]
    pub client: Option<ClientInfo>,
    #[serde(default, deserialize_with = "lenient_layer", skip_serializing_if = "Option::is_none")]
    pub site: Option<SiteSurvey>,
    #[serde(default, deserialize_with = "lenient_layer", skip_serializing_if = "Option::is_none")]
    pub load: Option<LoadSurvey>,
    #[serde(default, deserialize_with = "lenient_layer", skip_serializing_if = "Option::is_none")]
    pub infra: Option<InfraSurvey>,
    #[serde(default, deserialize_with = "lenient_layer", skip_serializing_if = "Option::is_none")]
    pub design: Option<DesignSurvey>,
    #[serde(default, deserialize_with = "lenient_vec")]
    pub services: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientInfo {
    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    /// Whatever the device geolocation produced; passed through untouched.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gps: Option<Value>,
    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub building_type: Option<String>,
    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub ownership: Option<String>,
    #[serde(default, deserialize_with = "lenient_f64", skip_serializing_if = "Option::is_none")]
    pub floor_count: Option<f64>,
    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub landlord_contact: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photos: Option<Value>,
    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub audit_date: Option<String>,
    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub engineer_name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteSurvey {
    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub roof_material: Option<String>,
    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub roof_orientation: Option<String>,
    #[serde(default, deserialize_with = "lenient_f64", skip_serializing_if = "Option::is_none")]
    pub roof_tilt: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shading: Option<Value>,
    #[serde(default, deserialize_with = "lenient_vec", skip_serializing_if = "Vec::is_empty")]
    pub hazards: Vec<Value>,
    #[serde(default, deserialize_with = "lenient_f64", skip_serializing_if = "Option::is_none")]
    pub building_age: Option<f64>,
    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub soil_type: Option<String>,
    #[serde(default, deserialize_with = "lenient_flag", skip_serializing_if = "Option::is_none")]
    pub lightning_protection: Option<bool>,
    #[serde(default, deserialize_with = "lenient_vec", skip_serializing_if = "Vec::is_empty")]
    pub site_photos: Vec<Value>,
    #[serde(default, deserialize_with = "lenient_vec", skip_serializing_if = "Vec::is_empty")]
    pub roof_photos: Vec<Value>,
    /// Older wizard builds recorded cameras on the site step.
    #[serde(default, deserialize_with = "lenient_vec", skip_serializing_if = "Vec::is_empty")]
    pub cameras: Vec<CameraEntry>,
    /// Condition rating keyed by vertical (`"wiring": "Poor"`, ...).
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub conditions: Map<String, Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadSurvey {
    #[serde(default, deserialize_with = "lenient_vec", skip_serializing_if = "Vec::is_empty")]
    pub items: Vec<LoadItem>,
    #[serde(default, deserialize_with = "lenient_vec", skip_serializing_if = "Vec::is_empty")]
    pub cameras: Vec<CameraEntry>,
    #[serde(default, deserialize_with = "lenient_vec", skip_serializing_if = "Vec::is_empty")]
    pub machinery: Vec<Value>,
    #[serde(default, deserialize_with = "lenient_layer", skip_serializing_if = "Option::is_none")]
    pub stats: Option<LoadStats>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadItem {
    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Nameplate power in watts.
    #[serde(default, deserialize_with = "lenient_f64", skip_serializing_if = "Option::is_none")]
    pub power: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64", skip_serializing_if = "Option::is_none")]
    pub quantity: Option<f64>,
    #[serde(
        default,
        alias = "hours",
        deserialize_with = "lenient_f64",
        skip_serializing_if = "Option::is_none"
    )]
    pub hours_per_day: Option<f64>,
    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, alias = "isCritical", deserialize_with = "lenient_flag", skip_serializing_if = "Option::is_none")]
    pub critical: Option<bool>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CameraEntry {
    #[serde(
        default,
        alias = "qty",
        deserialize_with = "lenient_f64",
        skip_serializing_if = "Option::is_none"
    )]
    pub quantity: Option<f64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Aggregates computed by the load wizard step. Consumed as-is.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadStats {
    #[serde(default, deserialize_with = "lenient_f64", skip_serializing_if = "Option::is_none")]
    pub total_load: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64", skip_serializing_if = "Option::is_none")]
    pub total_daily_energy: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64", skip_serializing_if = "Option::is_none")]
    pub critical_load: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64", skip_serializing_if = "Option::is_none")]
    pub peak_simultaneous_load: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64", skip_serializing_if = "Option::is_none")]
    pub surge_power: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InfraSurvey {
    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub db_type: Option<String>,
    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub db_condition: Option<String>,
    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub breaker_quality: Option<String>,
    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub earthing_type: Option<String>,
    /// Measured earth resistance in ohms.
    #[serde(default, deserialize_with = "lenient_f64", skip_serializing_if = "Option::is_none")]
    pub earth_resistance: Option<f64>,
    #[serde(default, deserialize_with = "lenient_flag", skip_serializing_if = "Option::is_none")]
    pub has_generator: Option<bool>,
    #[serde(default, deserialize_with = "lenient_f64", skip_serializing_if = "Option::is_none")]
    pub generator_rating: Option<f64>,
    #[serde(default, deserialize_with = "lenient_flag", skip_serializing_if = "Option::is_none")]
    pub has_ats: Option<bool>,
    #[serde(default, deserialize_with = "lenient_f64", skip_serializing_if = "Option::is_none")]
    pub ats_rating: Option<f64>,
    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub conduit_type: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Output of the external solar design step.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DesignSurvey {
    #[serde(default, deserialize_with = "lenient_f64", skip_serializing_if = "Option::is_none")]
    pub recommended_inverter: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64", skip_serializing_if = "Option::is_none")]
    pub battery_capacity: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64", skip_serializing_if = "Option::is_none")]
    pub solar_array_size: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64", skip_serializing_if = "Option::is_none")]
    pub backup_hours: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64", skip_serializing_if = "Option::is_none")]
    pub independence_level: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64", skip_serializing_if = "Option::is_none")]
    pub monthly_savings: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64", skip_serializing_if = "Option::is_none")]
    pub payback_years: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64", skip_serializing_if = "Option::is_none")]
    pub total_system_cost_estimate: Option<f64>,
    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub battery_type: Option<String>,
    /// Percentage of daily energy the design aims to cover.
    #[serde(default, deserialize_with = "lenient_f64", skip_serializing_if = "Option::is_none")]
    pub target_coverage: Option<f64>,
    #[serde(default, deserialize_with = "lenient_vec", skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<DesignWarning>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DesignWarning {
    #[serde(default, deserialize_with = "lenient_text")]
    pub component: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub message: String,
}

/// The six verticals the business audits for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceKind {
    Solar,
    Cctv,
    Wiring,
    Generator,
    Earthing,
    Industrial,
}

impl ServiceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceKind::Solar => "solar",
            ServiceKind::Cctv => "cctv",
            ServiceKind::Wiring => "wiring",
            ServiceKind::Generator => "generator",
            ServiceKind::Earthing => "earthing",
            ServiceKind::Industrial => "industrial",
        }
    }
}

impl fmt::Display for ServiceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ServiceKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "solar" => Ok(ServiceKind::Solar),
            "cctv" => Ok(ServiceKind::Cctv),
            "wiring" => Ok(ServiceKind::Wiring),
            "generator" => Ok(ServiceKind::Generator),
            "earthing" => Ok(ServiceKind::Earthing),
            "industrial" => Ok(ServiceKind::Industrial),
            other => Err(format!("unknown service vertical: {other}")),
        }
    }
}

/// Which review/export branch applies to an audit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceRoute {
    Vertical(ServiceKind),
    Generic,
}

impl ServiceRoute {
    /// Route on the primary (first) service. Anything unrecognised, or no
    /// service at all, falls back to the generic summary.
    pub fn from_services(services: &[String]) -> Self {
        services
            .first()
            .and_then(|s| s.parse::<ServiceKind>().ok())
            .map(ServiceRoute::Vertical)
            .unwrap_or(ServiceRoute::Generic)
    }
}

impl fmt::Display for ServiceRoute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServiceRoute::Vertical(kind) => kind.fmt(f),
            ServiceRoute::Generic => f.write_str("generic"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientProfile {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub gps: Option<Value>,
    pub building_type: Option<String>,
    pub ownership: Option<String>,
    pub floor_count: Option<f64>,
    pub landlord_contact: Option<String>,
    pub photos: Option<Value>,
    pub audit_date: Option<String>,
    pub site_photos: Vec<Value>,
    pub engineer_name: String,
}

/// Flat merge of the site, load, infra and design layers. The list fields
/// are pulled out of the generic map so they are always present.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttributeBag {
    pub items: Vec<LoadItem>,
    pub cameras: Vec<CameraEntry>,
    pub machinery: Vec<Value>,
    pub hazards: Vec<Value>,
    pub site_photos: Vec<Value>,
    pub roof_photos: Vec<Value>,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl AttributeBag {
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// Render a scalar field for display; `None` when absent or structured.
    pub fn text(&self, key: &str) -> Option<String> {
        match self.fields.get(key)? {
            Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(true) => Some("Yes".to_string()),
            Value::Bool(false) => Some("No".to_string()),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DerivedResults {
    pub total_load: f64,
    pub daily_energy: f64,
    pub critical_load: f64,
    pub peak_load: f64,
    pub surge_power: f64,
    #[serde(rename = "batteryDoD")]
    pub battery_dod: f64,
    pub diversity_factor: f64,
    pub target_coverage: f64,
    pub total_cameras: usize,
    /// Terabytes.
    pub storage_required: f64,
    /// Metres.
    pub total_cable_length: f64,
    /// kVA.
    pub recommended_gen_size: f64,
    pub recommended_cable_size: String,
    pub fuel_cost: f64,
    pub rec_inverter: f64,
    pub rec_battery: f64,
    pub rec_solar_result: f64,
    pub est_autonomy: f64,
    pub independence: f64,
    pub monthly_savings: f64,
    pub payback: f64,
    pub total_cost: f64,
    pub warnings: Vec<DesignWarning>,
}

/// The canonical view every consumer reads.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdaptedView {
    pub client_profile: ClientProfile,
    pub attribute_bag: AttributeBag,
    pub derived_results: DerivedResults,
}

#[derive(Debug, Serialize, Tabled, Clone, PartialEq)]
pub struct ReviewRow {
    /// Which audit the row belongs to when several are exported together.
    #[serde(rename = "Audit")]
    #[tabled(rename = "Audit")]
    pub audit: String,
    #[serde(rename = "Section")]
    #[tabled(rename = "Section")]
    pub section: String,
    #[serde(rename = "Item")]
    #[tabled(rename = "Item")]
    pub item: String,
    #[serde(rename = "Value")]
    #[tabled(rename = "Value")]
    pub value: String,
}

#[derive(Debug, Serialize, Tabled, Clone, PartialEq)]
pub struct EquipmentLine {
    #[serde(rename = "Audit")]
    #[tabled(rename = "Audit")]
    pub audit: String,
    #[serde(rename = "Description")]
    #[tabled(rename = "Description")]
    pub description: String,
    #[serde(rename = "Quantity")]
    #[tabled(rename = "Quantity")]
    pub quantity: f64,
    #[serde(rename = "Unit")]
    #[tabled(rename = "Unit")]
    pub unit: String,
    #[serde(rename = "UnitPrice")]
    #[tabled(rename = "UnitPrice")]
    pub unit_price: f64,
    #[serde(rename = "Amount")]
    #[tabled(rename = "Amount")]
    pub amount: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn routes_on_primary_service_only() {
        let services = vec!["cctv".to_string(), "solar".to_string()];
        assert_eq!(
            ServiceRoute::from_services(&services),
            ServiceRoute::Vertical(ServiceKind::Cctv)
        );
    }

    #[test]
    fn unknown_or_missing_service_is_generic() {
        assert_eq!(
            ServiceRoute::from_services(&["unknown-vertical".to_string()]),
            ServiceRoute::Generic
        );
        assert_eq!(ServiceRoute::from_services(&[]), ServiceRoute::Generic);
    }

    #[test]
    fn service_names_are_case_insensitive() {
        assert_eq!(" Solar ".parse::<ServiceKind>(), Ok(ServiceKind::Solar));
        assert!("hvac".parse::<ServiceKind>().is_err());
    }

    #[test]
    fn record_tolerates_loose_wizard_output() {
        let raw = r#"{
            "client": {"name": "Ade Stores", "floorCount": "2"},
            "site": {"hazards": "none", "cameras": [{"qty": 3}], "dbType": "Old"},
            "load": {"items": [{"name": "Fridge", "power": "150", "hours": 24}], "stats": {"totalLoad": "4.2"}},
            "services": ["solar"]
        }"#;
        let rec: RawAuditRecord = serde_json::from_str(raw).unwrap();
        let site = rec.site.unwrap();
        assert!(site.hazards.is_empty());
        assert_eq!(site.cameras[0].quantity, Some(3.0));
        assert_eq!(site.extra.get("dbType"), Some(&Value::from("Old")));
        let load = rec.load.unwrap();
        assert_eq!(load.items[0].power, Some(150.0));
        assert_eq!(load.items[0].hours_per_day, Some(24.0));
        assert_eq!(load.stats.unwrap().total_load, Some(4.2));
        assert_eq!(rec.client.unwrap().floor_count, Some(2.0));
    }

    #[test]
    fn numeric_text_fields_become_strings() {
        let raw = r#"{
            "id": 117,
            "client": {"phone": 8035550199, "name": "Ade Stores"},
            "infra": {"dbType": 3, "conduitType": ["PVC"]},
            "design": {"batteryType": true}
        }"#;
        let rec: RawAuditRecord = serde_json::from_str(raw).unwrap();
        assert_eq!(rec.id.as_deref(), Some("117"));
        assert_eq!(rec.client.unwrap().phone.as_deref(), Some("8035550199"));
        let infra = rec.infra.unwrap();
        assert_eq!(infra.db_type.as_deref(), Some("3"));
        assert_eq!(infra.conduit_type, None);
        assert_eq!(rec.design.unwrap().battery_type.as_deref(), Some("true"));
    }

    #[test]
    fn non_object_layers_are_absent() {
        let raw = r#"{"client": "Ade", "site": [], "load": {"stats": 7}, "design": null}"#;
        let rec: RawAuditRecord = serde_json::from_str(raw).unwrap();
        assert!(rec.client.is_none());
        assert!(rec.site.is_none());
        assert!(rec.design.is_none());
        assert!(rec.load.unwrap().stats.is_none());
    }

    #[test]
    fn incomplete_warnings_are_kept() {
        let raw = r#"{"warnings": [
            {"component": "battery", "message": null},
            {"message": 42}
        ]}"#;
        let design: DesignSurvey = serde_json::from_str(raw).unwrap();
        assert_eq!(design.warnings.len(), 2);
        assert_eq!(design.warnings[0].component, "battery");
        assert_eq!(design.warnings[0].message, "");
        assert_eq!(design.warnings[1].component, "");
        assert_eq!(design.warnings[1].message, "42");
    }
}
