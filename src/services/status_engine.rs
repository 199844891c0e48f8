//! Rule engine de estado de cumplimiento
//!
//! Función pura: set de documentos de una entidad + fecha de hoy →
//! estado semáforo (green/yellow/red) con explicación. Sin side effects,
//! testeable contra listas literales de documentos y un `today` fijo.
//!
//! Precedencia estricta (gana la primera regla que aplica):
//! 1. Falta un tipo requerido            → red
//! 2. Un documento requerido venció      → red
//! 3. Un requerido vence dentro de la ventana → yellow
//! 4. Todo en orden                      → green

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::{Document, EntityKind, EntityStatus};

/// Listas de documentos requeridos y ventana amarilla. Se pasa al engine en
/// vez de hardcodearse, para poder variar por flota/jurisdicción.
#[derive(Debug, Clone)]
pub struct StatusConfig {
    pub required_driver_docs: Vec<String>,
    pub required_vehicle_docs: Vec<String>,
    /// Días antes del vencimiento en los que el estado baja a yellow
    pub yellow_window_days: i64,
}

impl Default for StatusConfig {
    fn default() -> Self {
        Self {
            required_driver_docs: vec!["CDL".to_string(), "Medical Card".to_string()],
            required_vehicle_docs: vec!["Registration".to_string(), "Insurance".to_string()],
            yellow_window_days: 30,
        }
    }
}

impl StatusConfig {
    pub fn with_window(mut self, days: i64) -> Self {
        self.yellow_window_days = days;
        self
    }

    pub fn required_for(&self, kind: EntityKind) -> &[String] {
        match kind {
            EntityKind::Driver => &self.required_driver_docs,
            EntityKind::Vehicle => &self.required_vehicle_docs,
        }
    }
}

/// Documento requerido que vence dentro de la ventana
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExpiringDoc {
    pub doc_type: String,
    pub expires_on: NaiveDate,
    pub days_remaining: i64,
}

/// Resultado del cálculo de estado
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResult {
    pub status: EntityStatus,
    pub reason: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub missing_docs: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub expired_docs: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub expiring_soon_docs: Vec<ExpiringDoc>,
    /// Requeridos vencidos pero retenidos en yellow por needs_review
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub held_for_review_docs: Vec<String>,
}

/// Días hasta el vencimiento a granularidad de día (medianoche). Un
/// documento que vence hoy tiene 0 días restantes: cuenta como "por vencer",
/// no como vencido.
pub fn days_until(expires_on: NaiveDate, today: NaiveDate) -> i64 {
    (expires_on - today).num_days()
}

/// Estado de un documento individual, derivado solo de su vencimiento:
/// vencido → red, dentro de la ventana → yellow, resto → green. Un documento
/// sin fecha de vencimiento no restringe nada.
pub fn document_status(
    expires_on: Option<NaiveDate>,
    config: &StatusConfig,
    today: NaiveDate,
) -> EntityStatus {
    let Some(expires_on) = expires_on else {
        return EntityStatus::Green;
    };

    let days = days_until(expires_on, today);
    if days < 0 {
        EntityStatus::Red
    } else if days <= config.yellow_window_days {
        EntityStatus::Yellow
    } else {
        EntityStatus::Green
    }
}

/// Calcula el estado de una entidad a partir de sus documentos.
///
/// El matching de tipos es case-insensitive con trim, contra la lista de
/// requeridos del tipo de entidad. Regla de confianza: un documento vencido
/// con `needs_review` activo y estado retenido en yellow NO escala a red por
/// la regla de vencimiento; el engine confía en el estado guardado del
/// documento en vez de re-derivar solo desde la fecha (decisión de diseño
/// explícita, ver DESIGN.md).
pub fn compute_status(
    kind: EntityKind,
    documents: &[Document],
    config: &StatusConfig,
    today: NaiveDate,
) -> StatusResult {
    let required = config.required_for(kind);

    // Tipos presentes, normalizados
    let present: Vec<String> = documents.iter().map(|d| d.normalized_type()).collect();

    let missing_docs: Vec<String> = required
        .iter()
        .filter(|req| !present.iter().any(|p| p == &req.trim().to_lowercase()))
        .cloned()
        .collect();

    let mut expired_docs: Vec<String> = Vec::new();
    let mut expiring_soon_docs: Vec<ExpiringDoc> = Vec::new();
    let mut held_for_review_docs: Vec<String> = Vec::new();

    for doc in documents {
        let Some(expires_on) = doc.expires_on else {
            continue;
        };
        let is_required = required
            .iter()
            .any(|req| req.trim().to_lowercase() == doc.normalized_type());
        if !is_required {
            continue;
        }

        let days = days_until(expires_on, today);
        if days < 0 {
            if doc.needs_review && doc.status == EntityStatus::Yellow {
                // Regla de confianza: vencido pero sin verificar
                if !held_for_review_docs.contains(&doc.doc_type) {
                    held_for_review_docs.push(doc.doc_type.clone());
                }
            } else if !expired_docs.contains(&doc.doc_type) {
                expired_docs.push(doc.doc_type.clone());
            }
        } else if days <= config.yellow_window_days {
            expiring_soon_docs.push(ExpiringDoc {
                doc_type: doc.doc_type.clone(),
                expires_on,
                days_remaining: days,
            });
        }
    }

    expiring_soon_docs.sort_by_key(|d| d.days_remaining);

    let (status, reason) = if !missing_docs.is_empty() {
        (
            EntityStatus::Red,
            format!("Missing required documents: {}", missing_docs.join(", ")),
        )
    } else if !expired_docs.is_empty() {
        (
            EntityStatus::Red,
            format!("Expired documents: {}", expired_docs.join(", ")),
        )
    } else if let Some(earliest) = expiring_soon_docs.first() {
        (
            EntityStatus::Yellow,
            format!(
                "{} expires in {} days",
                earliest.doc_type, earliest.days_remaining
            ),
        )
    } else if let Some(held) = held_for_review_docs.first() {
        (
            EntityStatus::Yellow,
            format!("{} expired but is awaiting review", held),
        )
    } else {
        (
            EntityStatus::Green,
            "All required documents present and valid".to_string(),
        )
    };

    StatusResult {
        status,
        reason,
        missing_docs,
        expired_docs,
        expiring_soon_docs,
        held_for_review_docs,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ProcessingStatus;
    use chrono::{Duration, Utc};
    use uuid::Uuid;

    fn doc(doc_type: &str, expires_on: Option<NaiveDate>) -> Document {
        Document {
            id: Uuid::new_v4(),
            fleet_id: Uuid::new_v4(),
            entity_kind: EntityKind::Driver,
            entity_id: Uuid::new_v4(),
            doc_type: doc_type.to_string(),
            expires_on,
            status: EntityStatus::Green,
            processing_status: ProcessingStatus::Complete,
            needs_review: false,
            file_path: None,
            uploaded_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 15).unwrap()
    }

    #[test]
    fn test_missing_required_wins_over_everything() {
        // P1: solo Medical Card vigente, falta CDL => red por faltante
        let docs = vec![doc("Medical Card", Some(today() + Duration::days(300)))];
        let result = compute_status(EntityKind::Driver, &docs, &StatusConfig::default(), today());

        assert_eq!(result.status, EntityStatus::Red);
        assert!(result.reason.contains("Missing"));
        assert_eq!(result.missing_docs, vec!["CDL".to_string()]);
    }

    #[test]
    fn test_document_status_follows_expiration_date() {
        let config = StatusConfig::default();

        // Vencido ayer: red aunque el documento se esté recién subiendo
        assert_eq!(
            document_status(Some(today() - Duration::days(1)), &config, today()),
            EntityStatus::Red
        );
        assert_eq!(
            document_status(Some(today()), &config, today()),
            EntityStatus::Yellow
        );
        assert_eq!(
            document_status(Some(today() + Duration::days(30)), &config, today()),
            EntityStatus::Yellow
        );
        assert_eq!(
            document_status(Some(today() + Duration::days(31)), &config, today()),
            EntityStatus::Green
        );
        assert_eq!(document_status(None, &config, today()), EntityStatus::Green);
    }

    #[test]
    fn test_expiring_today_is_yellow_not_red() {
        // P2: vence exactamente hoy => yellow con 0 días restantes
        let docs = vec![
            doc("CDL", Some(today())),
            doc("Medical Card", Some(today() + Duration::days(300))),
        ];
        let result = compute_status(EntityKind::Driver, &docs, &StatusConfig::default(), today());

        assert_eq!(result.status, EntityStatus::Yellow);
        assert_eq!(result.expiring_soon_docs[0].days_remaining, 0);
        assert!(result.reason.contains("CDL"));
    }

    #[test]
    fn test_expired_yesterday_is_red() {
        // P2: venció ayer => red
        let docs = vec![
            doc("CDL", Some(today() - Duration::days(1))),
            doc("Medical Card", Some(today() + Duration::days(300))),
        ];
        let result = compute_status(EntityKind::Driver, &docs, &StatusConfig::default(), today());

        assert_eq!(result.status, EntityStatus::Red);
        assert_eq!(result.expired_docs, vec!["CDL".to_string()]);
    }

    #[test]
    fn test_needs_review_holds_expired_at_yellow() {
        // P3: vencido pero needs_review y retenido en yellow => no escala a red
        let mut unverified = doc("CDL", Some(today() - Duration::days(1)));
        unverified.needs_review = true;
        unverified.status = EntityStatus::Yellow;

        let docs = vec![
            unverified,
            doc("Medical Card", Some(today() + Duration::days(300))),
        ];
        let result = compute_status(EntityKind::Driver, &docs, &StatusConfig::default(), today());

        assert_eq!(result.status, EntityStatus::Yellow);
        assert!(result.expired_docs.is_empty());
        assert_eq!(result.held_for_review_docs, vec!["CDL".to_string()]);
        assert!(result.reason.contains("awaiting review"));
    }

    #[test]
    fn test_all_valid_is_green() {
        let docs = vec![
            doc("CDL", Some(today() + Duration::days(200))),
            doc("Medical Card", Some(today() + Duration::days(300))),
        ];
        let result = compute_status(EntityKind::Driver, &docs, &StatusConfig::default(), today());

        assert_eq!(result.status, EntityStatus::Green);
        assert!(result.reason.contains("valid"));
    }

    #[test]
    fn test_type_matching_is_case_insensitive_and_trimmed() {
        let docs = vec![
            doc("  cdl ", Some(today() + Duration::days(200))),
            doc("MEDICAL CARD", Some(today() + Duration::days(300))),
        ];
        let result = compute_status(EntityKind::Driver, &docs, &StatusConfig::default(), today());

        assert_eq!(result.status, EntityStatus::Green);
    }

    #[test]
    fn test_earliest_expiring_doc_names_the_reason() {
        let docs = vec![
            doc("CDL", Some(today() + Duration::days(20))),
            doc("Medical Card", Some(today() + Duration::days(5))),
        ];
        let result = compute_status(EntityKind::Driver, &docs, &StatusConfig::default(), today());

        assert_eq!(result.status, EntityStatus::Yellow);
        assert!(result.reason.contains("Medical Card"));
        assert!(result.reason.contains('5'));
    }

    #[test]
    fn test_vehicle_uses_its_own_required_list() {
        let mut docs = vec![
            doc("Registration", Some(today() + Duration::days(200))),
            doc("Insurance", Some(today() + Duration::days(200))),
        ];
        for d in &mut docs {
            d.entity_kind = EntityKind::Vehicle;
        }
        let result = compute_status(EntityKind::Vehicle, &docs, &StatusConfig::default(), today());

        assert_eq!(result.status, EntityStatus::Green);
    }

    #[test]
    fn test_non_required_expired_doc_does_not_affect_status() {
        let docs = vec![
            doc("CDL", Some(today() + Duration::days(200))),
            doc("Medical Card", Some(today() + Duration::days(300))),
            doc("IFTA", Some(today() - Duration::days(10))),
        ];
        let result = compute_status(EntityKind::Driver, &docs, &StatusConfig::default(), today());

        assert_eq!(result.status, EntityStatus::Green);
    }

    #[test]
    fn test_configurable_window() {
        let config = StatusConfig::default().with_window(10);
        let docs = vec![
            doc("CDL", Some(today() + Duration::days(20))),
            doc("Medical Card", Some(today() + Duration::days(300))),
        ];
        let result = compute_status(EntityKind::Driver, &docs, &config, today());

        // 20 días queda fuera de la ventana de 10
        assert_eq!(result.status, EntityStatus::Green);
    }
}
