//! Plain-text rendering of the session state.

use std::fmt::Write;

use citycast_core::{
    AppState, CurrentSnapshot, DailySummary, UnitMode,
    units::{convert, display_symbol, wind_unit},
};

/// Glyph shown next to a weather category.
pub fn condition_glyph(main: &str) -> &'static str {
    match main {
        "Clouds" | "Haze" => "☁",
        "Rain" => "🌧",
        "Clear" => "☀",
        "Mist" => "🌫",
        _ => "",
    }
}

fn temperature(value: f64, units: UnitMode) -> String {
    format!("{:.2}°{}", convert(value, units), display_symbol(units))
}

pub fn render_state(state: &AppState) -> String {
    let mut out = String::new();

    if let Some(err) = &state.error {
        let _ = writeln!(out, "✖ {err}");
    }
    if let Some(current) = &state.current {
        out.push_str(&render_current(current, state.units));
    }
    if !state.forecast.is_empty() {
        out.push_str(&render_forecast(&state.forecast, state.units));
    }

    out
}

fn render_current(current: &CurrentSnapshot, units: UnitMode) -> String {
    let mut out = String::new();
    let (main, description) = current
        .primary_condition()
        .map(|c| (c.main.as_str(), c.description.as_str()))
        .unwrap_or_default();

    let _ = writeln!(out, "{}", current.city);
    let _ = writeln!(out, "{} {}", condition_glyph(main), temperature(current.temperature, units));
    let _ = writeln!(out, "{description}");
    let _ = writeln!(
        out,
        "Min: {} | Max: {}",
        temperature(current.temp_min, units),
        temperature(current.temp_max, units)
    );
    let _ = writeln!(out, "Humidity: {}%", current.humidity_pct);
    let _ = writeln!(
        out,
        "Wind: {} {} at {}°",
        current.wind_speed,
        wind_unit(units),
        current.wind_deg
    );
    out
}

fn render_forecast(days: &[DailySummary], units: UnitMode) -> String {
    let mut out = String::from("\n5-Day Forecast\n");
    for day in days {
        let _ = writeln!(
            out,
            "  {:<12} {:<2} {:>10}  {}",
            day.date_label,
            condition_glyph(&day.main),
            temperature(day.avg_temperature, units),
            day.description
        );
    }
    out
}
