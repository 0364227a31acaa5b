//! Built-in reference tables: the strategic reservoirs shown by default and the
//! curated city overrides.
//!
//! Both are plain constructors returning owned values so that callers can pass
//! them (or their own replacements) into [`crate::ReservoirResolver`] and
//! [`crate::ReservoirMonitor`].

use crate::types::reservoir::{LatLon, ReservoirRecord};
use std::collections::HashMap;

// (name, feed id, latitude, longitude, state)
const STRATEGIC_RESERVOIRS: [(&str, &str, f64, f64, &str); 21] = [
    // Southeast
    ("Sistema Cantareira (SP)", "12456", -23.15, -46.38, "SP"),
    ("Sistema Alto Tietê (SP)", "12454", -23.51, -46.25, "SP"),
    ("Billings (SP)", "12450", -23.78, -46.63, "SP"),
    ("Guarapiranga (SP)", "12448", -23.68, -46.73, "SP"),
    ("Furnas (MG)", "12423", -20.67, -46.30, "MG"),
    ("Três Marias (MG)", "12411", -18.21, -45.26, "MG"),
    // Centre-West
    ("Descoberto (DF)", "12458", -15.80, -48.17, "DF"),
    ("Santa Maria (DF)", "12457", -15.65, -48.01, "DF"),
    ("Serra da Mesa (GO)", "12409", -13.83, -48.33, "GO"),
    // South
    ("Itaipu (PR)", "12389", -25.41, -54.59, "PR"),
    ("Passo Real (RS)", "12328", -29.03, -53.20, "RS"),
    // Northeast and semi-arid
    ("Sobradinho (BA/PE)", "12415", -9.43, -40.83, "BA"),
    ("Itaparica (Luiz Gonzaga) (PE)", "12416", -9.13, -38.30, "PE"),
    ("Castanhão (CE)", "12368", -5.50, -38.47, "CE"),
    ("Orós (CE)", "12374", -6.24, -38.91, "CE"),
    ("Banabuiú (CE)", "12356", -5.31, -38.92, "CE"),
    ("Armando Ribeiro Gonçalves (RN)", "12347", -5.67, -36.88, "RN"),
    ("Epitácio Pessoa (Boqueirão) (PB)", "12306", -7.49, -36.13, "PB"),
    ("Xingó (SE/AL)", "12417", -9.63, -37.79, "SE"),
    // North
    ("Tucuruí (PA)", "12406", -3.83, -49.64, "PA"),
    ("Belo Monte (PA)", "12516", -3.11, -51.78, "PA"),
];

const CITY_OVERRIDES: [(&str, &str); 15] = [
    ("sao paulo", "Sistema Cantareira (SP)"),
    // Paraíba do Sul flow depends on upstream regulation.
    ("rio de janeiro", "Furnas (MG)"),
    ("belo horizonte", "Três Marias (MG)"),
    ("brasília", "Descoberto (DF)"),
    ("brasilia", "Descoberto (DF)"),
    ("recife", "Itaparica (Luiz Gonzaga) (PE)"),
    ("fortaleza", "Castanhão (CE)"),
    ("natal", "Armando Ribeiro Gonçalves (RN)"),
    ("joao pessoa", "Epitácio Pessoa (Boqueirão) (PB)"),
    ("campina grande", "Epitácio Pessoa (Boqueirão) (PB)"),
    ("juazeiro do norte", "Orós (CE)"),
    ("mossoro", "Armando Ribeiro Gonçalves (RN)"),
    // Araras is not among the strategic reservoirs; resolution falls back
    // to the nearest one unless a catalog-backed candidate set includes it.
    ("sobral", "Araras (CE)"),
    ("curitiba", "Itaipu (PR)"),
    ("porto alegre", "Passo Real (RS)"),
];

/// The 21 strategic reservoirs of the national interconnected system and the
/// large semi-arid dams, in display order.
pub fn strategic_reservoirs() -> Vec<ReservoirRecord> {
    STRATEGIC_RESERVOIRS
        .iter()
        .map(|&(name, id, lat, lon, state)| {
            ReservoirRecord::new(name, id, LatLon(lat, lon), state)
        })
        .collect()
}

/// City key → reservoir name for cities whose real water source differs from
/// their geodesically nearest monitored reservoir.
pub fn city_overrides() -> HashMap<String, String> {
    CITY_OVERRIDES
        .iter()
        .map(|&(city, reservoir)| (city.to_string(), reservoir.to_string()))
        .collect()
}
