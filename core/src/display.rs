//! User-facing text shared by the console driver and the GUI. The product
//! speaks Russian, matching the backend's own messages.

use crate::api::StatisticsPayload;
use crate::prelude::ClientError;

/// Shown in place of the text report when it cannot be fetched.
pub const REPORT_PLACEHOLDER: &str = "Текстовый отчет недоступен";

/// Status-line text for a failed job start.
pub fn start_failure_text(err: &ClientError) -> String {
    format!("Не удалось запустить анализ: {}", err.user_message())
}

/// Label/value rows for the detailed-statistics panel.
pub fn stat_rows(stats: &StatisticsPayload) -> Vec<(String, String)> {
    vec![
        (
            "Всего транспортных средств".into(),
            stats.total_vehicles.to_string(),
        ),
        (
            "Средняя скорость".into(),
            format!("{} км/ч", stats.avg_speed_kmh),
        ),
        ("ТС в заторе".into(), stats.congestion_vehicles.to_string()),
        ("Загруженность".into(), format!("{}%", stats.congestion_percent)),
        ("Пиковый час".into(), stats.peak_hour.clone()),
        (
            "Интенсивность".into(),
            format!("{} ТС/час", stats.traffic_intensity),
        ),
        ("Легковые".into(), stats.vehicle_types.light.to_string()),
        ("Грузовые".into(), stats.vehicle_types.heavy.to_string()),
        (
            "Время обработки".into(),
            format!("{} с", stats.processing_time),
        ),
    ]
}

/// Plain-text rendering for the console driver.
pub fn render_stats(stats: &StatisticsPayload) -> String {
    stat_rows(stats)
        .into_iter()
        .map(|(label, value)| format!("{label}: {value}"))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::VehicleTypes;

    #[test]
    fn literal_values_render_unchanged() {
        let stats = StatisticsPayload {
            total_vehicles: 42,
            avg_speed_kmh: 35.2,
            vehicle_types: VehicleTypes { light: 30, heavy: 12 },
            ..Default::default()
        };
        let rendered = render_stats(&stats);
        assert!(rendered.contains("42"), "{rendered}");
        assert!(rendered.contains("35.2"), "{rendered}");
        assert!(rendered.contains("Легковые: 30"), "{rendered}");
    }

    #[test]
    fn start_failure_names_the_launch() {
        let text = start_failure_text(&ClientError::Busy);
        assert!(text.contains("Не удалось запустить анализ"), "{text}");
        assert!(text.contains("Анализ уже запущен"), "{text}");
    }
}
