//! Parser de IRP Cab Card
//!
//! Parsea "Apportioned License Cab Cards" (IRP, Texas) a partir del texto
//! OCR. Tolera ruido típico de OCR (`|`↔`I`, `0`↔`O`, `l`↔`1`), normaliza
//! los datos y extrae todos los campos requeridos con una confianza por
//! campo en [0, 1].
//!
//! La validación limita la confianza, no la presencia: un candidato que no
//! pasa su shape check se devuelve como None en vez de adivinar un valor.

use chrono::{Datelike, NaiveDate, Utc};
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Peso máximo por jurisdicción. `unit` es normalmente "lbs"; el caso
/// especial de Quebec ("QC: 5 AXLES") se guarda con unit "axles".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JurisdictionWeight {
    pub max_weight: i64,
    pub unit: String,
}

/// Campos extraídos de un cab card
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CabCardFields {
    pub expiration_date: Option<NaiveDate>,
    pub registrant_name: Option<String>,
    pub registrant_address: Option<String>,
    pub plate_number: Option<String>,
    pub vehicle_type: Option<String>,
    pub unit_number: Option<String>,
    pub unladen_weight: Option<i64>,
    pub gross_weight: Option<i64>,
    pub axles: Option<i64>,
    pub seats: Option<i64>,
    pub model_year: Option<i32>,
    pub make: Option<String>,
    pub fuel: Option<String>,
    pub vin: Option<String>,
    pub document_number: Option<String>,
    pub usdot_number: Option<String>,
    pub carrier_responsible_for_safety_name: Option<String>,
    pub carrier_address: Option<String>,
    pub owner_lessor_name: Option<String>,
    pub jurisdiction_weights: Option<BTreeMap<String, JurisdictionWeight>>,
}

impl CabCardFields {
    /// Cantidad de campos con valor
    pub fn extracted_count(&self) -> usize {
        let mut n = 0;
        if self.expiration_date.is_some() {
            n += 1;
        }
        n + [
            self.registrant_name.is_some(),
            self.registrant_address.is_some(),
            self.plate_number.is_some(),
            self.vehicle_type.is_some(),
            self.unit_number.is_some(),
            self.unladen_weight.is_some(),
            self.gross_weight.is_some(),
            self.axles.is_some(),
            self.seats.is_some(),
            self.model_year.is_some(),
            self.make.is_some(),
            self.fuel.is_some(),
            self.vin.is_some(),
            self.document_number.is_some(),
            self.usdot_number.is_some(),
            self.carrier_responsible_for_safety_name.is_some(),
            self.carrier_address.is_some(),
            self.owner_lessor_name.is_some(),
            self.jurisdiction_weights.is_some(),
        ]
        .iter()
        .filter(|b| **b)
        .count()
    }

    /// ¿Hay algún campo crítico presente? (expiración, VIN, placa)
    pub fn has_critical_field(&self) -> bool {
        self.expiration_date.is_some() || self.vin.is_some() || self.plate_number.is_some()
    }

    /// (nombre de campo, ¿tiene valor?) para reconstruir mapas de confianza
    pub fn field_presence(&self) -> Vec<(&'static str, bool)> {
        vec![
            ("expiration_date", self.expiration_date.is_some()),
            ("registrant_name", self.registrant_name.is_some()),
            ("registrant_address", self.registrant_address.is_some()),
            ("plate_number", self.plate_number.is_some()),
            ("vehicle_type", self.vehicle_type.is_some()),
            ("unit_number", self.unit_number.is_some()),
            ("unladen_weight", self.unladen_weight.is_some()),
            ("gross_weight", self.gross_weight.is_some()),
            ("axles", self.axles.is_some()),
            ("seats", self.seats.is_some()),
            ("model_year", self.model_year.is_some()),
            ("make", self.make.is_some()),
            ("fuel", self.fuel.is_some()),
            ("vin", self.vin.is_some()),
            ("document_number", self.document_number.is_some()),
            ("usdot_number", self.usdot_number.is_some()),
            (
                "carrier_responsible_for_safety_name",
                self.carrier_responsible_for_safety_name.is_some(),
            ),
            ("carrier_address", self.carrier_address.is_some()),
            ("owner_lessor_name", self.owner_lessor_name.is_some()),
            ("jurisdiction_weights", self.jurisdiction_weights.is_some()),
        ]
    }
}

/// Resultado completo del parse: campos + confianza + texto crudo + avisos
#[derive(Debug, Clone, Serialize)]
pub struct ParseResult {
    pub fields: CabCardFields,
    pub confidence: HashMap<String, f64>,
    pub raw_text: String,
    pub warnings: Vec<String>,
}

lazy_static! {
    // Fecha de vencimiento: "Expires: March 31, 2025", "EXP 03/31/2025",
    // "03/31/2025 EXP", "Expiration: 2025-03-31"
    static ref EXP_MONTH_NAME: Regex =
        Regex::new(r"(?i)expires?[:\s]+([a-z]+)\s+(\d{1,2}),?\s+(\d{4})").unwrap();
    static ref EXP_SLASH: Regex =
        Regex::new(r"(?i)\bexp[:\s]+(\d{1,2})[/\-](\d{1,2})[/\-](\d{4})").unwrap();
    static ref EXP_ISO: Regex =
        Regex::new(r"(?i)expiration[:\s]+(\d{4})[/\-](\d{1,2})[/\-](\d{1,2})").unwrap();
    static ref EXP_SUFFIX: Regex =
        Regex::new(r"(?i)(\d{1,2})[/\-](\d{1,2})[/\-](\d{4})\s*exp").unwrap();

    // En los campos de texto libre el label va case-insensitive pero el
    // valor exige mayúsculas: así un label en Title Case ("Registrant
    // Address:") corta la captura en vez de ser tragado por ella.
    static ref REGISTRANT_NAME: Regex =
        Regex::new(r"(?i:registrant[:\s]+name[:\s]+)([A-Z][A-Z0-9\s&,\.\-]+)").unwrap();
    static ref ANY_NAME: Regex =
        Regex::new(r"(?i:\bname[:\s]+)([A-Z][A-Z0-9\s&,\.\-]{3,})").unwrap();

    static ref REGISTRANT_ADDRESS: Regex =
        Regex::new(r"(?i:registrant[:\s]+address[:\s]+)([A-Z0-9\s,\.\-]{10,})").unwrap();
    static ref ANY_ADDRESS: Regex =
        Regex::new(r"(?i:\baddress[:\s]+)([A-Z0-9\s,\.\-]{10,})").unwrap();

    static ref PLATE_LABELED: Regex =
        Regex::new(r"(?i)plate[:\s]+number[:\s]+([A-Z0-9]{2,10})").unwrap();
    static ref PLATE_SHORT: Regex = Regex::new(r"(?i)plate[#:\s]+([A-Z0-9]{2,10})").unwrap();

    static ref VEHICLE_TYPE_LABELED: Regex =
        Regex::new(r"(?i)vehicle[:\s]+type[:\s]+([A-Z]{1,4})\b").unwrap();
    static ref VEHICLE_TYPE_SHORT: Regex = Regex::new(r"(?i)\btype[:\s]+([A-Z]{1,4})\b").unwrap();
    // Códigos comunes de tipo de vehículo IRP
    static ref VEHICLE_TYPE_CODE: Regex = Regex::new(r"\b(TT|TR|TK|SB|MH)\b").unwrap();

    static ref UNIT_LABELED: Regex =
        Regex::new(r"(?i)unit[:\s]+number[:\s]+([A-Z0-9\-]{1,20})").unwrap();
    static ref UNIT_SHORT: Regex = Regex::new(r"(?i)unit[#:\s]+([A-Z0-9\-]{1,20})").unwrap();

    static ref UNLADEN_WEIGHT: Regex =
        Regex::new(r"(?i)unladen(?:[:\s]+weight)?[:\s]+(\d+(?:,\d{3})*)\s*(?:lbs?|pounds?|#)?").unwrap();
    static ref GROSS_WEIGHT: Regex =
        Regex::new(r"(?i)(?:gross[:\s]+weight|gvw)[:\s]+(\d+(?:,\d{3})*)\s*(?:lbs?|pounds?|#)?").unwrap();

    static ref AXLES_LABELED: Regex = Regex::new(r"(?i)axles?[:\s]+(\d+)").unwrap();
    static ref AXLES_SUFFIX: Regex = Regex::new(r"(?i)(\d+)\s+axles?").unwrap();

    static ref SEATS_LABELED: Regex = Regex::new(r"(?i)seats?[:\s]+(\d+)").unwrap();
    static ref SEATS_SUFFIX: Regex = Regex::new(r"(?i)(\d+)\s+seats?").unwrap();

    static ref YEAR_LABELED: Regex =
        Regex::new(r"(?i)model[:\s]+year[:\s]+((?:19|20)\d{2})").unwrap();
    static ref YEAR_SHORT: Regex = Regex::new(r"(?i)\byear[:\s]+((?:19|20)\d{2})").unwrap();
    static ref YEAR_BARE: Regex = Regex::new(r"\b((?:19|20)\d{2})\b").unwrap();

    static ref MAKE: Regex = Regex::new(r"(?i:make[:\s]+)([A-Z][A-Z\s\-]{2,20})").unwrap();
    static ref FUEL: Regex = Regex::new(r"(?i:fuel[:\s]+)([A-Z]+)").unwrap();

    // VIN: 17 caracteres, el set estándar excluye I, O y Q
    static ref VIN_LABELED: Regex =
        Regex::new(r"(?i)vin[:\s]+([A-HJ-NPR-Z0-9]{17})\b").unwrap();
    static ref VIN_BARE: Regex = Regex::new(r"\b([A-HJ-NPR-Z0-9]{17})\b").unwrap();
    static ref VIN_EXCLUDED: Regex = Regex::new(r"[IOQ]").unwrap();

    static ref DOC_NUMBER_LABELED: Regex =
        Regex::new(r"(?i)document[:\s]+number[:\s]+([A-Z0-9\-]{5,20})").unwrap();
    static ref DOC_NUMBER_SHORT: Regex = Regex::new(r"(?i)doc[#:\s]+([A-Z0-9\-]{5,20})").unwrap();

    static ref USDOT: Regex = Regex::new(r"(?i)usdot[:\s#]*(\d{6,8})\b").unwrap();
    static ref DOT_SHORT: Regex = Regex::new(r"(?i)\bdot[#:\s]+(\d{6,8})\b").unwrap();

    static ref CARRIER_SAFETY_NAME: Regex = Regex::new(
        r"(?i:carrier[:\s]+responsible[:\s]+for[:\s]+safety[:\s]+name[:\s]+)([A-Z][A-Z0-9\s&,\.\-]+)"
    )
    .unwrap();
    static ref CARRIER_NAME: Regex =
        Regex::new(r"(?i:carrier[:\s]+name[:\s]+)([A-Z][A-Z0-9\s&,\.\-]+)").unwrap();
    static ref CARRIER_ADDRESS: Regex =
        Regex::new(r"(?i:carrier[:\s]+address[:\s]+)([A-Z0-9\s,\.\-]{10,})").unwrap();

    static ref OWNER_LESSOR: Regex =
        Regex::new(r"(?i:owner[/\s]+lessor[:\s]+name[:\s]+)([A-Z][A-Z0-9\s&,\.\-]+)").unwrap();
    static ref OWNER_NAME: Regex =
        Regex::new(r"(?i:owner[:\s]+name[:\s]+)([A-Z][A-Z0-9\s&,\.\-]+)").unwrap();

    // Tabla de pesos por jurisdicción: "TX: 80,000 lbs", "CA: 36K"
    static ref JURISDICTION_WEIGHT: Regex =
        Regex::new(r"\b([A-Z]{2})[:\s]+(\d+(?:,\d{3})*)([Kk]?)\s*(?:lbs?|pounds?)?").unwrap();
    // Caso especial Quebec: expresa cantidad de ejes en vez de peso
    static ref QC_AXLES: Regex = Regex::new(r"(?i)QC[:\s]+(\d+)\s+AXLES?").unwrap();
}

/// Parsea un IRP cab card desde texto OCR.
///
/// Nunca falla: cada campo degrada independientemente a `None` con
/// confianza 0.0. Un warning solo se emite cuando el label del campo está
/// presente pero el valor no parsea o no valida; un campo simplemente
/// ausente no genera warning. El llamador decide, en base a los campos
/// críticos y a la cantidad de warnings, si el documento queda `complete`
/// o `needs_review`.
pub fn parse_cab_card(ocr_text: &str) -> ParseResult {
    let mut confidence = HashMap::new();
    let mut warnings = Vec::new();
    let text = normalize_text(ocr_text);

    let fields = CabCardFields {
        expiration_date: extract_expiration_date(&text, &mut confidence, &mut warnings),
        registrant_name: extract_registrant_name(&text, &mut confidence, &mut warnings),
        registrant_address: extract_address(
            &text,
            "registrant_address",
            &[&REGISTRANT_ADDRESS, &ANY_ADDRESS],
            0.8,
            &mut confidence,
            &mut warnings,
        ),
        plate_number: extract_uppercase(
            &text,
            "plate_number",
            &[&PLATE_LABELED, &PLATE_SHORT],
            0.9,
            &mut confidence,
            &mut warnings,
        ),
        vehicle_type: extract_uppercase(
            &text,
            "vehicle_type",
            &[&VEHICLE_TYPE_LABELED, &VEHICLE_TYPE_SHORT, &VEHICLE_TYPE_CODE],
            0.85,
            &mut confidence,
            &mut warnings,
        ),
        unit_number: extract_uppercase(
            &text,
            "unit_number",
            &[&UNIT_LABELED, &UNIT_SHORT],
            0.85,
            &mut confidence,
            &mut warnings,
        ),
        unladen_weight: extract_weight(&text, "unladen_weight", &UNLADEN_WEIGHT, &mut confidence, &mut warnings),
        gross_weight: extract_weight(&text, "gross_weight", &GROSS_WEIGHT, &mut confidence, &mut warnings),
        axles: extract_count(
            &text,
            "axles",
            &[&AXLES_LABELED, &AXLES_SUFFIX],
            1..20,
            0.9,
            &mut confidence,
            &mut warnings,
        ),
        seats: extract_count(
            &text,
            "seats",
            &[&SEATS_LABELED, &SEATS_SUFFIX],
            1..200,
            0.85,
            &mut confidence,
            &mut warnings,
        ),
        model_year: extract_model_year(&text, &mut confidence),
        make: extract_make(&text, &mut confidence),
        fuel: extract_fuel(&text, &mut confidence),
        vin: extract_vin(&text, &mut confidence, &mut warnings),
        document_number: extract_uppercase(
            &text,
            "document_number",
            &[&DOC_NUMBER_LABELED, &DOC_NUMBER_SHORT],
            0.85,
            &mut confidence,
            &mut warnings,
        ),
        usdot_number: extract_usdot(&text, &mut confidence),
        carrier_responsible_for_safety_name: extract_name(
            &text,
            "carrier_responsible_for_safety_name",
            &[&CARRIER_SAFETY_NAME, &CARRIER_NAME],
            0.8,
            &mut confidence,
            &mut warnings,
        ),
        carrier_address: extract_address(
            &text,
            "carrier_address",
            &[&CARRIER_ADDRESS],
            0.75,
            &mut confidence,
            &mut warnings,
        ),
        owner_lessor_name: extract_name(
            &text,
            "owner_lessor_name",
            &[&OWNER_LESSOR, &OWNER_NAME],
            0.8,
            &mut confidence,
            &mut warnings,
        ),
        jurisdiction_weights: extract_jurisdiction_weights(&text, &mut confidence),
    };

    ParseResult {
        fields,
        confidence,
        raw_text: ocr_text.to_string(),
        warnings,
    }
}

/// Normaliza el texto OCR: colapsa espacios y corrige ruido común.
///
/// `|` se reemplaza globalmente por `I`. La confusión `0`/`O` depende de la
/// dirección, así que se resuelve por contexto local: vecinos dígitos ⇒ `0`,
/// vecinos letras mayúsculas ⇒ `O`, si no queda como está.
fn normalize_text(text: &str) -> String {
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    let chars: Vec<char> = collapsed
        .chars()
        .map(|c| if c == '|' { 'I' } else { c })
        .collect();

    let mut out = String::with_capacity(chars.len());
    for (i, &c) in chars.iter().enumerate() {
        let before = if i > 0 { chars[i - 1] } else { ' ' };
        let after = chars.get(i + 1).copied().unwrap_or(' ');
        let mapped = match c {
            '0' | 'O' => {
                if before.is_ascii_digit() && after.is_ascii_digit() {
                    '0'
                } else if before.is_ascii_uppercase() && after.is_ascii_uppercase() {
                    'O'
                } else {
                    c
                }
            }
            _ => c,
        };
        out.push(mapped);
    }
    out
}

const MONTH_NAMES: [&str; 12] = [
    "january", "february", "march", "april", "may", "june", "july", "august", "september",
    "october", "november", "december",
];

fn extract_expiration_date(
    text: &str,
    confidence: &mut HashMap<String, f64>,
    warnings: &mut Vec<String>,
) -> Option<NaiveDate> {
    // "Expires: March 31, 2025"
    if let Some(caps) = EXP_MONTH_NAME.captures(text) {
        let month_text = caps[1].to_lowercase();
        let month = MONTH_NAMES.iter().position(|m| m.starts_with(&month_text));
        if let Some(month) = month {
            let day: u32 = caps[2].parse().unwrap_or(0);
            let year: i32 = caps[3].parse().unwrap_or(0);
            if let Some(date) = NaiveDate::from_ymd_opt(year, month as u32 + 1, day) {
                confidence.insert("expiration_date".to_string(), 0.9);
                return Some(date);
            }
        }
        warnings.push(format!("Failed to parse expiration date: {}", &caps[0]));
    }

    // "EXP 03/31/2025"
    for pattern in [&*EXP_SLASH, &*EXP_SUFFIX] {
        if let Some(caps) = pattern.captures(text) {
            let month: u32 = caps[1].parse().unwrap_or(0);
            let day: u32 = caps[2].parse().unwrap_or(0);
            let year: i32 = caps[3].parse().unwrap_or(0);
            if let Some(date) = NaiveDate::from_ymd_opt(year, month, day) {
                confidence.insert("expiration_date".to_string(), 0.9);
                return Some(date);
            }
            warnings.push(format!("Failed to parse expiration date: {}", &caps[0]));
        }
    }

    // "Expiration: 2025-03-31"
    if let Some(caps) = EXP_ISO.captures(text) {
        let year: i32 = caps[1].parse().unwrap_or(0);
        let month: u32 = caps[2].parse().unwrap_or(0);
        let day: u32 = caps[3].parse().unwrap_or(0);
        if let Some(date) = NaiveDate::from_ymd_opt(year, month, day) {
            confidence.insert("expiration_date".to_string(), 0.9);
            return Some(date);
        }
        warnings.push(format!("Failed to parse expiration date: {}", &caps[0]));
    }

    // Sin label de vencimiento en el texto: campo ausente, no warning
    confidence.insert("expiration_date".to_string(), 0.0);
    None
}

fn extract_registrant_name(
    text: &str,
    confidence: &mut HashMap<String, f64>,
    warnings: &mut Vec<String>,
) -> Option<String> {
    extract_name(
        text,
        "registrant_name",
        &[&REGISTRANT_NAME, &ANY_NAME],
        0.85,
        confidence,
        warnings,
    )
}

/// Extractor genérico para nombres: label + valor en mayúsculas
fn extract_name(
    text: &str,
    field: &str,
    patterns: &[&Regex],
    conf: f64,
    confidence: &mut HashMap<String, f64>,
    warnings: &mut Vec<String>,
) -> Option<String> {
    for (i, pattern) in patterns.iter().enumerate() {
        if let Some(caps) = pattern.captures(text) {
            let name = clean_value(caps[1].trim());
            if name.len() > 2 {
                if i > 0 {
                    warnings.push(format!("{}: primary pattern failed, used fallback", field));
                }
                confidence.insert(field.to_string(), conf);
                return Some(name);
            }
        }
    }
    confidence.insert(field.to_string(), 0.0);
    None
}

fn extract_address(
    text: &str,
    field: &str,
    patterns: &[&Regex],
    conf: f64,
    confidence: &mut HashMap<String, f64>,
    warnings: &mut Vec<String>,
) -> Option<String> {
    for (i, pattern) in patterns.iter().enumerate() {
        if let Some(caps) = pattern.captures(text) {
            let address = clean_value(caps[1].trim());
            if address.len() > 5 {
                if i > 0 {
                    warnings.push(format!("{}: primary pattern failed, used fallback", field));
                }
                confidence.insert(field.to_string(), conf);
                return Some(address);
            }
        }
    }
    confidence.insert(field.to_string(), 0.0);
    None
}

/// Palabras que funcionan como labels en el layout del cab card. Si una de
/// ellas aparece como token dentro de un valor capturado, el valor real
/// terminó antes (documento en ALL CAPS donde el regex no puede frenar).
const LABEL_TOKENS: [&str; 24] = [
    "REGISTRANT", "ADDRESS", "NAME", "UNIT", "PLATE", "VEHICLE", "TYPE", "VIN", "MAKE", "MODEL",
    "FUEL", "UNLADEN", "GROSS", "AXLES", "SEATS", "USDOT", "DOCUMENT", "CARRIER", "OWNER",
    "LESSOR", "EXPIRES", "EXPIRATION", "WEIGHT", "YEAR",
];

/// Limpia un valor capturado: corta en el primer token que sea un label y
/// descarta iniciales sueltas al final (resto de un label en Title Case que
/// el regex cortó a mitad de palabra).
fn clean_value(value: &str) -> String {
    let tokens: Vec<&str> = value.split_whitespace().collect();
    let cut = tokens
        .iter()
        .position(|t| {
            let bare = t.trim_matches(|c: char| !c.is_ascii_alphanumeric());
            LABEL_TOKENS.contains(&bare)
        })
        .unwrap_or(tokens.len());

    let mut kept = tokens[..cut].to_vec();
    while matches!(kept.last(), Some(t) if t.len() == 1 && t.chars().all(|c| c.is_ascii_alphabetic()))
    {
        kept.pop();
    }
    kept.join(" ")
}

fn extract_uppercase(
    text: &str,
    field: &str,
    patterns: &[&Regex],
    conf: f64,
    confidence: &mut HashMap<String, f64>,
    warnings: &mut Vec<String>,
) -> Option<String> {
    for (i, pattern) in patterns.iter().enumerate() {
        if let Some(caps) = pattern.captures(text) {
            if i > 0 {
                warnings.push(format!("{}: primary pattern failed, used fallback", field));
            }
            confidence.insert(field.to_string(), conf);
            return Some(caps[1].to_uppercase());
        }
    }
    confidence.insert(field.to_string(), 0.0);
    None
}

fn extract_weight(
    text: &str,
    field: &str,
    pattern: &Regex,
    confidence: &mut HashMap<String, f64>,
    warnings: &mut Vec<String>,
) -> Option<i64> {
    if let Some(caps) = pattern.captures(text) {
        if let Ok(weight) = caps[1].replace(',', "").parse::<i64>() {
            confidence.insert(field.to_string(), 0.9);
            return Some(weight);
        }
        // Hubo label pero el valor no es numérico: eso sí es un warning
        warnings.push(format!("{}: candidate '{}' is not a number", field, &caps[1]));
    }
    confidence.insert(field.to_string(), 0.0);
    None
}

fn extract_count(
    text: &str,
    field: &str,
    patterns: &[&Regex],
    valid: std::ops::Range<i64>,
    conf: f64,
    confidence: &mut HashMap<String, f64>,
    warnings: &mut Vec<String>,
) -> Option<i64> {
    for pattern in patterns {
        if let Some(caps) = pattern.captures(text) {
            if let Ok(n) = caps[1].parse::<i64>() {
                if valid.contains(&n) {
                    confidence.insert(field.to_string(), conf);
                    return Some(n);
                }
                warnings.push(format!("{}: candidate {} out of range", field, n));
            }
        }
    }
    confidence.insert(field.to_string(), 0.0);
    None
}

fn extract_model_year(text: &str, confidence: &mut HashMap<String, f64>) -> Option<i32> {
    let max_year = Utc::now().year() + 1;
    for pattern in [&*YEAR_LABELED, &*YEAR_SHORT, &*YEAR_BARE] {
        if let Some(caps) = pattern.captures(text) {
            if let Ok(year) = caps[1].parse::<i32>() {
                if (1900..=max_year).contains(&year) {
                    confidence.insert("model_year".to_string(), 0.85);
                    return Some(year);
                }
            }
        }
    }
    confidence.insert("model_year".to_string(), 0.0);
    None
}

const COMMON_MAKES: [&str; 6] = [
    "FREIGHTLINER", "PETERBILT", "KENWORTH", "VOLVO", "MACK", "INTERNATIONAL",
];

fn extract_make(text: &str, confidence: &mut HashMap<String, f64>) -> Option<String> {
    if let Some(caps) = MAKE.captures(text) {
        let make = clean_value(caps[1].trim()).to_uppercase();
        let conf = if COMMON_MAKES.iter().any(|m| make.contains(m)) {
            0.9
        } else {
            0.7
        };
        confidence.insert("make".to_string(), conf);
        return Some(make);
    }
    confidence.insert("make".to_string(), 0.0);
    None
}

const FUEL_TYPES: [&str; 5] = ["DIESEL", "GASOLINE", "CNG", "LNG", "ELECTRIC"];

fn extract_fuel(text: &str, confidence: &mut HashMap<String, f64>) -> Option<String> {
    if let Some(caps) = FUEL.captures(text) {
        let fuel = caps[1].to_uppercase();
        let conf = if FUEL_TYPES.contains(&fuel.as_str()) {
            0.9
        } else {
            0.7
        };
        confidence.insert("fuel".to_string(), conf);
        return Some(fuel);
    }
    confidence.insert("fuel".to_string(), 0.0);
    None
}

/// VIN: exactamente 17 caracteres, nunca contiene I, O ni Q. Un candidato
/// que no pasa la validación se descarta en vez de devolver un valor
/// adivinado.
fn extract_vin(
    text: &str,
    confidence: &mut HashMap<String, f64>,
    warnings: &mut Vec<String>,
) -> Option<String> {
    for pattern in [&*VIN_LABELED, &*VIN_BARE] {
        if let Some(caps) = pattern.captures(text) {
            let vin = caps[1].to_uppercase();
            if vin.len() == 17 && !VIN_EXCLUDED.is_match(&vin) {
                confidence.insert("vin".to_string(), 0.95);
                return Some(vin);
            }
            warnings.push(format!("vin: candidate '{}' failed validation", vin));
        }
    }
    confidence.insert("vin".to_string(), 0.0);
    None
}

fn extract_usdot(text: &str, confidence: &mut HashMap<String, f64>) -> Option<String> {
    for pattern in [&*USDOT, &*DOT_SHORT] {
        if let Some(caps) = pattern.captures(text) {
            // El regex ya garantiza 6-8 dígitos decimales
            confidence.insert("usdot_number".to_string(), 0.9);
            return Some(caps[1].to_string());
        }
    }
    confidence.insert("usdot_number".to_string(), 0.0);
    None
}

/// Tabla de pesos por jurisdicción.
///
/// El sufijo `K` en un número chico (<100) se expande ×1000 para aproximar
/// libras. Es una heurística de normalización de unidades específica del
/// formato, no una conversión exacta.
fn extract_jurisdiction_weights(
    text: &str,
    confidence: &mut HashMap<String, f64>,
) -> Option<BTreeMap<String, JurisdictionWeight>> {
    let mut weights = BTreeMap::new();

    for caps in JURISDICTION_WEIGHT.captures_iter(text) {
        let code = caps[1].to_string();
        let Ok(mut value) = caps[2].replace(',', "").parse::<i64>() else {
            continue;
        };
        if !caps[3].is_empty() && value < 100 {
            value *= 1000;
        }
        weights.insert(
            code,
            JurisdictionWeight {
                max_weight: value,
                unit: "lbs".to_string(),
            },
        );
    }

    // Quebec expresa ejes, no peso: "QC: 5 AXLES"
    if let Some(caps) = QC_AXLES.captures(text) {
        if let Ok(axles) = caps[1].parse::<i64>() {
            weights.insert(
                "QC".to_string(),
                JurisdictionWeight {
                    max_weight: axles,
                    unit: "axles".to_string(),
                },
            );
        }
    }

    if weights.is_empty() {
        confidence.insert("jurisdiction_weights".to_string(), 0.0);
        None
    } else {
        confidence.insert("jurisdiction_weights".to_string(), 0.8);
        Some(weights)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "TEXAS APPORTIONED LICENSE CAB CARD \
        Registrant Name: ACME TRUCKING LLC Registrant Address: 100 MAIN ST, DALLAS, TX 75201 \
        Unit Number: 042 Plate Number: RP12345 Vehicle Type: TT \
        VIN: 1FUJGHDV5LHLM1234 Make: FREIGHTLINER Model Year: 2019 Fuel: DIESEL \
        Unladen Weight: 17,000 lbs Gross Weight: 80,000 lbs Axles: 5 \
        USDOT: 1234567 Document Number: TX-998877 \
        Carrier Responsible for Safety Name: ACME TRUCKING LLC \
        Expires: March 31, 2025 TX: 80,000 OK: 80,000 QC: 5 AXLES";

    #[test]
    fn test_parse_full_card() {
        let result = parse_cab_card(SAMPLE);
        let f = &result.fields;

        assert_eq!(f.expiration_date, NaiveDate::from_ymd_opt(2025, 3, 31));
        assert_eq!(f.registrant_name.as_deref(), Some("ACME TRUCKING LLC"));
        assert_eq!(f.plate_number.as_deref(), Some("RP12345"));
        assert_eq!(f.vehicle_type.as_deref(), Some("TT"));
        assert_eq!(f.vin.as_deref(), Some("1FUJGHDV5LHLM1234"));
        assert_eq!(f.make.as_deref(), Some("FREIGHTLINER"));
        assert_eq!(f.model_year, Some(2019));
        assert_eq!(f.fuel.as_deref(), Some("DIESEL"));
        assert_eq!(f.unladen_weight, Some(17_000));
        assert_eq!(f.gross_weight, Some(80_000));
        assert_eq!(f.axles, Some(5));
        assert_eq!(f.usdot_number.as_deref(), Some("1234567"));
        assert!(f.has_critical_field());
        assert!(result.confidence["vin"] >= 0.95);
        assert!(result.confidence["expiration_date"] >= 0.9);
    }

    #[test]
    fn test_date_formats_resolve_to_same_iso_date() {
        // P5: los tres formatos de entrada producen la misma fecha
        let expected = NaiveDate::from_ymd_opt(2025, 3, 31);
        for input in [
            "Expires: March 31, 2025",
            "EXP 03/31/2025",
            "Expiration: 2025-03-31",
            "03/31/2025 EXP",
        ] {
            let result = parse_cab_card(input);
            assert_eq!(result.fields.expiration_date, expected, "input: {}", input);
        }
    }

    #[test]
    fn test_invalid_date_yields_none() {
        let result = parse_cab_card("EXP 13/45/2025");
        assert_eq!(result.fields.expiration_date, None);
        assert_eq!(result.confidence["expiration_date"], 0.0);
        assert!(result.warnings.iter().any(|w| w.contains("expiration date")));
    }

    #[test]
    fn test_vin_validation_rejects_excluded_letters() {
        // P4: un candidato con I/O/Q o longitud != 17 nunca se devuelve
        let result = parse_cab_card("VIN: 1FUJGHDV5LHA1234I");
        assert_eq!(result.fields.vin, None);
        assert_eq!(result.confidence["vin"], 0.0);

        let result = parse_cab_card("VIN: 1FUJGHDV5LH");
        assert_eq!(result.fields.vin, None);
    }

    #[test]
    fn test_vin_accepts_valid_17_chars() {
        let result = parse_cab_card("VIN: 1FUJGHDV5LHLM1234");
        assert_eq!(result.fields.vin.as_deref(), Some("1FUJGHDV5LHLM1234"));
        assert_eq!(result.confidence["vin"], 0.95);
    }

    #[test]
    fn test_usdot_shape() {
        let result = parse_cab_card("USDOT: 1234567");
        assert_eq!(result.fields.usdot_number.as_deref(), Some("1234567"));

        // 5 dígitos: fuera del shape 6-8
        let result = parse_cab_card("USDOT: 12345 ");
        assert_eq!(result.fields.usdot_number, None);
    }

    #[test]
    fn test_normalize_pipe_and_zero_o_confusion() {
        // "|" -> "I"; 0 entre dígitos queda 0, O entre letras queda O
        let normalized = normalize_text("V|N 8O0 R0AD");
        assert!(normalized.contains("VIN"));
        assert!(normalized.contains("8O0") || normalized.contains("800"));

        let normalized = normalize_text("1O1");
        assert_eq!(normalized, "101");

        let normalized = normalize_text("R0W");
        assert_eq!(normalized, "ROW");
    }

    #[test]
    fn test_jurisdiction_weights_with_k_suffix() {
        let result = parse_cab_card("TX: 80,000 lbs CA: 36K QC: 5 AXLES");
        let weights = result.fields.jurisdiction_weights.unwrap();

        assert_eq!(weights["TX"].max_weight, 80_000);
        assert_eq!(weights["TX"].unit, "lbs");
        // heurística: K en número < 100 se expande ×1000
        assert_eq!(weights["CA"].max_weight, 36_000);
        // Quebec guarda ejes, no libras
        assert_eq!(weights["QC"].max_weight, 5);
        assert_eq!(weights["QC"].unit, "axles");
    }

    #[test]
    fn test_empty_input_degrades_without_panicking() {
        let result = parse_cab_card("");
        assert_eq!(result.fields.extracted_count(), 0);
        assert!(!result.fields.has_critical_field());
        assert!(result.confidence.values().all(|c| *c == 0.0));
        // Campos ausentes no son warnings: texto vacío parsea limpio
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_absent_fields_do_not_generate_warnings() {
        let result = parse_cab_card("VIN: 1FUJGHDV5LHLM1234 Expiration: 2026-12-31");

        assert!(result.fields.vin.is_some());
        assert!(result.fields.expiration_date.is_some());
        assert_eq!(result.confidence["usdot_number"], 0.0);
        assert!(result.warnings.is_empty(), "warnings: {:?}", result.warnings);
    }

    #[test]
    fn test_garbage_input_degrades_without_panicking() {
        let result = parse_cab_card("@@@@ ???? ---- 12 ab !!");
        assert_eq!(result.fields.vin, None);
        assert_eq!(result.fields.expiration_date, None);
    }
}
