use chrono::NaiveDateTime;
use weather_core::{ForecastDetail, WeatherRecord};

const RULE_WIDTH: usize = 50;

/// `HH:MM` out of a provider timestamp, or the raw string if it doesn't parse.
fn clock(time: &str) -> String {
    NaiveDateTime::parse_from_str(time, "%Y-%m-%dT%H:%M")
        .map(|t| t.format("%H:%M").to_string())
        .unwrap_or_else(|_| time.to_string())
}

/// Hourly value with its unit, or `n/a` where the provider had none.
fn value(v: Option<f64>, unit: &str) -> String {
    v.map_or_else(|| "n/a".to_string(), |v| format!("{v}{unit}"))
}

pub fn render(record: &WeatherRecord) -> String {
    let rule = "=".repeat(RULE_WIDTH);
    let condition = record.condition();

    let mut lines = vec![
        format!("\n🌤️ WEATHER - {}", record.city.to_uppercase()),
        rule.clone(),
        "➡️ CURRENT CONDITIONS:".to_string(),
        format!("📊 Source: {}", record.source),
        format!("📅 Time: {}", record.observed_at),
        format!("{} {}", condition.emoji(), condition),
        format!("🌡️ Temperature: {}°C", record.current_temperature_c),
        format!("💧 Humidity: {}%", record.humidity_percent),
        format!("💨 Wind: {} m/s", record.wind_speed_ms),
        format!(
            "📈 Today: {}°C / {}°C, {}mm total rain",
            record.daily_min_temperature_c,
            record.daily_max_temperature_c,
            record.daily_total_precipitation_mm
        ),
        "---".to_string(),
    ];

    match &record.forecast {
        ForecastDetail::FullDay { hourly_series } => {
            lines.push("🔮 NEXT 24H FORECAST:".to_string());
            lines.extend(hourly_series.iter().map(|h| {
                format!(
                    "   - {}: {}, rain {}, wind {}",
                    clock(&h.time),
                    value(h.temperature_c, "°C"),
                    value(h.precipitation_mm, "mm"),
                    value(h.wind_speed_ms, " m/s")
                )
            }));
        }
        ForecastDetail::SingleHour(hour) => {
            let label = match &hour.hour_time {
                Some(time) => format!("🕐 THIS HOUR ({}):", clock(time)),
                None => "🕐 THIS HOUR (current conditions):".to_string(),
            };
            lines.push(label);
            lines.push(format!(
                "   {}, rain {}, wind {}",
                value(hour.hour_temperature_c, "°C"),
                value(hour.hour_precipitation_mm, "mm"),
                value(hour.hour_wind_speed_ms, " m/s")
            ));
        }
    }

    lines.push(rule);
    lines.join("\n")
}
