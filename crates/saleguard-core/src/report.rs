//! # Duplicate Report
//!
//! Serializes a [`DuplicateDetectionResult`] into the plain-text report an
//! operator downloads as a `.txt` file.
//!
//! ## Layout
//! ```text
//! RELATÓRIO DE VENDAS DUPLICADAS
//! ==================================================
//! Total de vendas analisadas: 12
//! Grupos de duplicatas: 1
//! Total de duplicatas: 1
//! Perda estimada: R$ 20,00
//! ==================================================
//!
//! GRUPO 1 - Confiança: ALTA
//!   Venda original: 7f3c...
//!   Cliente: Maria Silva
//!   Valor: R$ 20,00
//!   Data: 10/03/2026 11:00:00
//!   Duplicatas: 1
//!   Critérios:
//!     Mesmo cliente: Sim
//!     ...
//!   IDs das duplicatas:
//!     - 9a1b... (10/03/2026 11:00:30, R$ 20,00)
//! ```
//!
//! Output is deterministic for a given result and offset. No escaping is
//! applied; the report is never rendered as markup.

use chrono::{DateTime, FixedOffset, Offset, Utc};

use crate::duplicates::{Confidence, DuplicateDetectionResult, DuplicateGroup};
use crate::types::Sale;

/// Brasília time, UTC-03:00.
pub const DEFAULT_UTC_OFFSET_MINUTES: i32 = -180;

const RULE: &str = "==================================================";
const DATE_FORMAT: &str = "%d/%m/%Y %H:%M:%S";

/// Formats detection results with pt-BR dates in a fixed UTC offset.
#[derive(Debug, Clone, Copy)]
pub struct ReportFormatter {
    offset: FixedOffset,
}

impl Default for ReportFormatter {
    fn default() -> Self {
        ReportFormatter::new(DEFAULT_UTC_OFFSET_MINUTES)
    }
}

impl ReportFormatter {
    /// Creates a formatter for the given offset from UTC, in minutes.
    ///
    /// Offsets outside ±24h fall back to UTC.
    pub fn new(utc_offset_minutes: i32) -> Self {
        let offset = utc_offset_minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
            .unwrap_or_else(|| Utc.fix());
        ReportFormatter { offset }
    }

    pub fn offset(&self) -> FixedOffset {
        self.offset
    }

    /// Formats a timestamp as `dd/mm/yyyy HH:MM:SS` in this formatter's offset.
    pub fn format_date(&self, date: &DateTime<Utc>) -> String {
        date.with_timezone(&self.offset).format(DATE_FORMAT).to_string()
    }

    /// Renders the full report.
    pub fn format(&self, result: &DuplicateDetectionResult) -> String {
        let mut lines: Vec<String> = vec![
            "RELATÓRIO DE VENDAS DUPLICADAS".to_string(),
            RULE.to_string(),
            format!("Total de vendas analisadas: {}", result.total_sales),
            format!("Grupos de duplicatas: {}", result.duplicate_groups.len()),
            format!("Total de duplicatas: {}", result.total_duplicates),
            format!("Perda estimada: {}", result.estimated_loss),
            RULE.to_string(),
        ];

        if result.duplicate_groups.is_empty() {
            lines.push(String::new());
            lines.push("Nenhuma venda duplicada encontrada.".to_string());
        }

        for (index, group) in result.duplicate_groups.iter().enumerate() {
            lines.push(String::new());
            self.push_group(&mut lines, index + 1, group);
        }

        let mut report = lines.join("\n");
        report.push('\n');
        report
    }

    fn push_group(&self, lines: &mut Vec<String>, number: usize, group: &DuplicateGroup) {
        let original = &group.original_sale;
        let criteria = &group.criteria;

        lines.push(format!(
            "GRUPO {} - Confiança: {}",
            number,
            confidence_label(group.confidence)
        ));
        lines.push(format!("  Venda original: {}", original.id));
        lines.push(format!("  Cliente: {}", customer_label(original)));
        lines.push(format!("  Valor: {}", original.total()));
        lines.push(format!("  Data: {}", self.format_date(&original.date)));
        lines.push(format!("  Duplicatas: {}", group.duplicates.len()));
        lines.push("  Critérios:".to_string());
        lines.push(format!("    Mesmo cliente: {}", yes_no(criteria.same_customer)));
        lines.push(format!("    Mesmo valor: {}", yes_no(criteria.same_total)));
        lines.push(format!("    Mesmos itens: {}", yes_no(criteria.same_items)));
        lines.push(format!("    Horário próximo: {}", yes_no(criteria.close_time)));
        lines.push("  IDs das duplicatas:".to_string());
        for dup in &group.duplicates {
            lines.push(format!(
                "    - {} ({}, {})",
                dup.id,
                self.format_date(&dup.date),
                dup.total()
            ));
        }
    }
}

/// Renders the report with the default (Brasília) offset.
pub fn format_duplicate_report(result: &DuplicateDetectionResult) -> String {
    ReportFormatter::default().format(result)
}

fn confidence_label(confidence: Confidence) -> &'static str {
    match confidence {
        Confidence::High => "ALTA",
        Confidence::Medium => "MÉDIA",
        Confidence::Low => "BAIXA",
    }
}

fn customer_label(sale: &Sale) -> &str {
    let name = sale.customer_name.trim();
    if name.is_empty() {
        "(sem nome)"
    } else {
        name
    }
}

fn yes_no(value: bool) -> &'static str {
    if value {
        "Sim"
    } else {
        "Não"
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
