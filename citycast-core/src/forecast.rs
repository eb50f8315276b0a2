//! Reduces 3-hour forecast samples into per-day summaries.

use chrono::NaiveDateTime;

use crate::{
    model::{Condition, DailySummary, RawSample},
    units::round_to,
};

/// Upper bound on the number of days reported.
pub const MAX_FORECAST_DAYS: usize = 5;

/// Grouping key for a sample, e.g. `Mon, Jan 5`.
pub fn date_label(timestamp: &NaiveDateTime) -> String {
    timestamp.format("%a, %b %-d").to_string()
}

#[derive(Debug)]
struct DailyAccumulator<'a> {
    date_label: String,
    temp_sum: f64,
    count: u32,
    conditions: Vec<&'a Condition>,
}

impl<'a> DailyAccumulator<'a> {
    fn new(date_label: String) -> Self {
        Self {
            date_label,
            temp_sum: 0.0,
            count: 0,
            conditions: Vec::new(),
        }
    }

    fn add(&mut self, sample: &'a RawSample) {
        self.temp_sum += sample.temperature;
        self.count += 1;
        if let Some(condition) = sample.primary_condition() {
            self.conditions.push(condition);
        }
    }

    fn finish(self) -> DailySummary {
        // first sample of the day decides the condition, not the majority
        let (main, description) = self
            .conditions
            .first()
            .map(|c| (c.main.clone(), c.description.clone()))
            .unwrap_or_default();

        DailySummary {
            date_label: self.date_label,
            avg_temperature: round_to(self.temp_sum / f64::from(self.count), 1),
            main,
            description,
        }
    }
}

/// Groups samples by calendar day in first-seen order and averages each day.
///
/// Input order is trusted; samples are not re-sorted. Only the first
/// [`MAX_FORECAST_DAYS`] distinct days are returned.
pub fn aggregate(samples: &[RawSample]) -> Vec<DailySummary> {
    let mut days: Vec<DailyAccumulator<'_>> = Vec::new();

    for sample in samples {
        let label = date_label(&sample.timestamp);
        let idx = match days.iter().position(|d| d.date_label == label) {
            Some(idx) => idx,
            None => {
                days.push(DailyAccumulator::new(label));
                days.len() - 1
            }
        };
        days[idx].add(sample);
    }

    days.into_iter()
        .take(MAX_FORECAST_DAYS)
        .map(DailyAccumulator::finish)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(day: u32, hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, day)
            .and_then(|d| d.and_hms_opt(hour, 0, 0))
            .expect("valid test timestamp")
    }

    fn sample(day: u32, hour: u32, temperature: f64, main: &str) -> RawSample {
        RawSample {
            timestamp: at(day, hour),
            temperature,
            conditions: vec![Condition {
                main: main.to_string(),
                description: format!("{} at {hour}h", main.to_lowercase()),
            }],
        }
    }

    #[test]
    fn date_label_uses_short_weekday_month_and_day() {
        assert_eq!(date_label(&at(5, 9)), "Fri, Jan 5");
        assert_eq!(date_label(&at(15, 21)), "Mon, Jan 15");
    }

    #[test]
    fn empty_input_yields_empty_output() {
        assert!(aggregate(&[]).is_empty());
    }

    #[test]
    fn averages_temperatures_within_a_day() {
        let samples = vec![
            sample(5, 0, 10.0, "Clear"),
            sample(5, 3, 20.0, "Rain"),
            sample(5, 6, 30.0, "Rain"),
        ];

        let days = aggregate(&samples);
        assert_eq!(days.len(), 1);
        assert_eq!(days[0].avg_temperature, 20.0);
    }

    #[test]
    fn first_condition_of_the_day_wins_over_majority() {
        let samples = vec![
            sample(5, 0, 1.0, "Clear"),
            sample(5, 3, 2.0, "Rain"),
            sample(5, 6, 3.0, "Rain"),
        ];

        let day = &aggregate(&samples)[0];
        assert_eq!(day.main, "Clear");
        assert_eq!(day.description, "clear at 0h");
    }

    #[test]
    fn single_sample_day_is_reported_verbatim() {
        let day = &aggregate(&[sample(7, 12, 13.37, "Mist")])[0];
        assert_eq!(day.date_label, "Sun, Jan 7");
        assert_eq!(day.avg_temperature, 13.4);
        assert_eq!(day.main, "Mist");
    }

    #[test]
    fn average_is_rounded_to_one_decimal() {
        let samples = vec![
            sample(5, 0, 10.0, "Clear"),
            sample(5, 3, 10.0, "Clear"),
            sample(5, 6, 11.0, "Clear"),
        ];
        assert_eq!(aggregate(&samples)[0].avg_temperature, 10.3);
    }

    #[test]
    fn average_rounding_follows_stored_value_not_scaled_value() {
        // 1.45 and 10.35 are stored just below the written value
        let samples = vec![sample(5, 0, 1.45, "Clear"), sample(6, 0, 10.35, "Clear")];

        let days = aggregate(&samples);
        assert_eq!(days[0].avg_temperature, 1.4);
        assert_eq!(days[1].avg_temperature, 10.3);
    }

    #[test]
    fn groups_follow_first_seen_order() {
        // out-of-order input is not re-sorted
        let samples = vec![
            sample(6, 0, 1.0, "Clear"),
            sample(5, 21, 2.0, "Clouds"),
            sample(6, 3, 3.0, "Clear"),
            sample(8, 0, 4.0, "Rain"),
        ];

        let labels: Vec<_> = aggregate(&samples)
            .into_iter()
            .map(|d| d.date_label)
            .collect();
        assert_eq!(labels, vec!["Sat, Jan 6", "Fri, Jan 5", "Mon, Jan 8"]);
    }

    #[test]
    fn truncates_to_five_days() {
        let samples: Vec<_> = (1..=7)
            .flat_map(|day| {
                (0..24)
                    .step_by(3)
                    .map(move |hour| sample(day, hour, f64::from(day), "Clouds"))
            })
            .collect();

        let days = aggregate(&samples);
        assert_eq!(days.len(), MAX_FORECAST_DAYS);
        assert_eq!(days[0].date_label, "Mon, Jan 1");
        assert_eq!(days[4].date_label, "Fri, Jan 5");
        assert_eq!(days[4].avg_temperature, 5.0);
    }

    #[test]
    fn output_never_exceeds_distinct_days() {
        let samples = vec![
            sample(5, 0, 1.0, "Clear"),
            sample(5, 3, 2.0, "Clear"),
            sample(6, 0, 3.0, "Clear"),
        ];
        assert_eq!(aggregate(&samples).len(), 2);
    }

    #[test]
    fn sample_without_conditions_still_counts_towards_average() {
        let mut bare = sample(5, 0, 10.0, "Clear");
        bare.conditions.clear();
        let samples = vec![bare, sample(5, 3, 20.0, "Snow")];

        let day = &aggregate(&samples)[0];
        assert_eq!(day.avg_temperature, 15.0);
        assert_eq!(day.main, "Snow");
    }
}
