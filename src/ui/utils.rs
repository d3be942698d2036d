use chrono::NaiveDate;

/// Format a number with thousands separators and a fixed number of decimals
pub fn format_number(value: f64, decimals: usize) -> String {
    if !value.is_finite() {
        return "n/a".to_string();
    }

    let formatted = format!("{:.*}", decimals, value.abs());
    let (int_part, frac_part) = match formatted.split_once('.') {
        Some((int_part, frac_part)) => (int_part, Some(frac_part)),
        None => (formatted.as_str(), None),
    };

    let mut grouped = String::new();
    let digits = int_part.len();
    for (index, c) in int_part.chars().enumerate() {
        if index > 0 && (digits - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }

    let sign = if value < 0.0 { "-" } else { "" };
    match frac_part {
        Some(frac) => format!("{}{}.{}", sign, grouped, frac),
        None => format!("{}{}", sign, grouped),
    }
}

/// Format a fractional change as a percentage, e.g. 0.0123 becomes "1.2%"
pub fn format_percent(value: f64, decimals: usize) -> String {
    if !value.is_finite() {
        return "n/a".to_string();
    }
    format!("{}%", format_number(value * 100.0, decimals))
}

/// Format an x coordinate in days since the common era as "Nov 2024"
pub fn format_month(days: f64) -> String {
    match NaiveDate::from_num_days_from_ce_opt(days as i32) {
        Some(date) => date.format("%b %Y").to_string(),
        None => "n/a".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Datelike;

    #[test]
    fn numbers_group_thousands() {
        assert_eq!(format_number(1234.5, 2), "1,234.50");
        assert_eq!(format_number(1234567.891, 2), "1,234,567.89");
        assert_eq!(format_number(999.0, 2), "999.00");
        assert_eq!(format_number(0.0, 2), "0.00");
    }

    #[test]
    fn negative_numbers_keep_their_sign() {
        assert_eq!(format_number(-1234.5, 2), "-1,234.50");
        assert_eq!(format_number(-0.5, 2), "-0.50");
    }

    #[test]
    fn zero_decimals_drops_the_point() {
        assert_eq!(format_number(1234.6, 0), "1,235");
    }

    #[test]
    fn non_finite_values_format_as_placeholder() {
        assert_eq!(format_number(f64::NAN, 2), "n/a");
        assert_eq!(format_percent(f64::INFINITY, 1), "n/a");
    }

    #[test]
    fn percentages_scale_fractions() {
        assert_eq!(format_percent(0.0123, 1), "1.2%");
        assert_eq!(format_percent(-0.034, 1), "-3.4%");
        assert_eq!(format_percent(0.0, 1), "0.0%");
    }

    #[test]
    fn months_format_from_day_numbers() {
        let days = NaiveDate::from_ymd_opt(2024, 11, 1)
            .unwrap()
            .num_days_from_ce() as f64;
        assert_eq!(format_month(days), "Nov 2024");
        assert_eq!(format_month(-9.0e18), "n/a");
    }
}
