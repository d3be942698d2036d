use std::fmt;

use chrono::{Datelike, Months, NaiveDate};
use ratatui::layout::Constraint;
use regex::Regex;

use crate::figure::{sparkline_figure, Figure};
use crate::grid::{
    CellAlign, CellValue, ColumnDef, GridRow, StyleRule, ValueFormat, DCC_GRAPH_CLICK_DATA,
};

/// Bundled excerpt of the World Bank "Commodity Markets Outlook" monthly
/// price table, used when no data file is given.
pub const SAMPLE_CSV: &str = include_str!("../data/cmo_sample.csv");

/// Months shown in the trend cell. Thirteen samples put the oldest point
/// exactly one year before the newest.
pub const TREND_MONTHS: usize = 13;

const DATE_TOKEN: &str = r"^(\d{4})M(\d{1,2})$";

#[derive(Debug)]
pub enum DataError {
    MissingHeader,
    BadDate(String),
    Parse(String),
    Empty,
}

impl fmt::Display for DataError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataError::MissingHeader => write!(f, "missing commodity header row"),
            DataError::BadDate(token) => write!(f, "unrecognized month token: {}", token),
            DataError::Parse(message) => write!(f, "malformed table: {}", message),
            DataError::Empty => write!(f, "no monthly price rows found"),
        }
    }
}

impl std::error::Error for DataError {}

/// Messages from the loader thread to the UI loop.
#[derive(Debug)]
pub enum LoaderMsg {
    Row(CommodityRow),
    Done,
    Failed(String),
}

/// The parsed wide-format price table: one row per month, one column per
/// commodity, gaps forward-filled. Prices before a commodity's first quote
/// are NaN.
#[derive(Debug, Clone)]
pub struct CmoTable {
    pub dates: Vec<NaiveDate>,
    pub commodities: Vec<Commodity>,
}

#[derive(Debug, Clone)]
pub struct Commodity {
    pub name: String,
    pub unit: String,
    pub prices: Vec<f64>,
}

/// One fully prepared grid row.
#[derive(Debug, Clone)]
pub struct CommodityRow {
    pub product: String,
    pub unit: String,
    /// Full history as (days since the common era, price).
    pub series: Vec<(f64, f64)>,
    pub price: f64,
    pub price_prev_month: f64,
    pub price_prev_year: f64,
    /// Month-over-month change as a fraction, 0.0123 meaning +1.23%.
    pub mom_change: f64,
    pub yoy_change: f64,
    pub figure: Figure,
}

impl CommodityRow {
    pub fn latest_date(&self) -> Option<NaiveDate> {
        self.series
            .last()
            .and_then(|&(days, _)| NaiveDate::from_num_days_from_ce_opt(days as i32))
    }

    /// Cell order must line up with `column_defs`.
    pub fn to_grid_row(&self) -> GridRow {
        GridRow::new(vec![
            CellValue::Text(self.product.clone()),
            CellValue::Text(self.unit.clone()),
            CellValue::Number(self.price),
            CellValue::Number(self.price_prev_month),
            CellValue::Number(self.price_prev_year),
            CellValue::Number(self.mom_change),
            CellValue::Number(self.yoy_change),
            CellValue::Figure(self.figure.clone()),
        ])
    }
}

/// Parses the CMO monthly price sheet: a commodity name row, a unit row in
/// parentheses, then one `YYYYMmm` row per month. Missing prices take the
/// previous month's value.
pub fn parse_cmo_csv(text: &str) -> Result<CmoTable, DataError> {
    let date_re = Regex::new(DATE_TOKEN).map_err(|e| DataError::Parse(e.to_string()))?;
    let mut lines = text.lines().filter(|line| !line.trim().is_empty());

    let names_row = lines.next().ok_or(DataError::MissingHeader)?;
    let names = split_csv_line(names_row);
    if names.len() < 2 {
        return Err(DataError::MissingHeader);
    }
    let count = names.len() - 1;

    let mut units = vec![String::new(); count];
    let mut pending_data_row: Option<String> = None;
    if let Some(second) = lines.next() {
        let cells = split_csv_line(second);
        if cells.first().map_or(false, |c| date_re.is_match(c)) {
            // No unit row in this file; the line is already data
            pending_data_row = Some(second.to_string());
        } else {
            for (index, unit) in units.iter_mut().enumerate() {
                if let Some(raw) = cells.get(index + 1) {
                    *unit = clean_unit(raw);
                }
            }
        }
    }

    let mut dates = Vec::new();
    let mut observed: Vec<Vec<Option<f64>>> = vec![Vec::new(); count];
    let data_lines = pending_data_row
        .into_iter()
        .chain(lines.map(|line| line.to_string()));
    for line in data_lines {
        let cells = split_csv_line(&line);
        let token = cells.first().cloned().unwrap_or_default();
        let captures = date_re
            .captures(&token)
            .ok_or_else(|| DataError::BadDate(token.clone()))?;
        let year: i32 = captures[1]
            .parse()
            .map_err(|_| DataError::BadDate(token.clone()))?;
        let month: u32 = captures[2]
            .parse()
            .map_err(|_| DataError::BadDate(token.clone()))?;
        let date =
            NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(|| DataError::BadDate(token))?;
        dates.push(date);
        for (index, column) in observed.iter_mut().enumerate() {
            let value = cells
                .get(index + 1)
                .and_then(|cell| cell.parse::<f64>().ok());
            column.push(value);
        }
    }

    if dates.is_empty() {
        return Err(DataError::Empty);
    }

    let commodities = names
        .iter()
        .skip(1)
        .zip(units)
        .zip(observed)
        .map(|((raw_name, unit), column)| {
            let mut prices = Vec::with_capacity(column.len());
            let mut last = f64::NAN;
            for value in column {
                if let Some(value) = value {
                    last = value;
                }
                prices.push(last);
            }
            Commodity {
                name: clean_name(raw_name),
                unit,
                prices,
            }
        })
        .collect();

    Ok(CmoTable { dates, commodities })
}

/// Turns the parsed table into grid rows. Commodities without a full trend
/// window of prices are left out.
pub fn build_rows(table: &CmoTable) -> Vec<CommodityRow> {
    let mut rows = Vec::new();
    for commodity in &table.commodities {
        let series: Vec<(f64, f64)> = table
            .dates
            .iter()
            .zip(&commodity.prices)
            .filter(|(_, price)| price.is_finite())
            .map(|(date, &price)| (date.num_days_from_ce() as f64, price))
            .collect();
        if series.len() < TREND_MONTHS {
            continue;
        }

        let window = &series[series.len() - TREND_MONTHS..];
        let price = window[TREND_MONTHS - 1].1;
        let prev_month = window[TREND_MONTHS - 2].1;
        let prev_year = window[0].1;

        rows.push(CommodityRow {
            product: commodity.name.clone(),
            unit: commodity.unit.clone(),
            figure: sparkline_figure(&commodity.name, window),
            series,
            price,
            price_prev_month: prev_month,
            price_prev_year: prev_year,
            mom_change: change(price, prev_month),
            yoy_change: change(price, prev_year),
        });
    }
    rows
}

/// Column set for the commodity grid. With a known latest month the price
/// columns carry date labels, before any data arrives they fall back to
/// generic ones.
pub fn column_defs(latest: Option<NaiveDate>) -> Vec<ColumnDef> {
    let month_label = |date: Option<NaiveDate>, fallback: &str| {
        date.map(|d| d.format("%b %Y").to_string())
            .unwrap_or_else(|| fallback.to_string())
    };
    let prev_month = latest.and_then(|d| d.checked_sub_months(Months::new(1)));
    let prev_year = latest.and_then(|d| d.checked_sub_months(Months::new(12)));

    let latest_label = month_label(latest, "Latest");
    let prev_month_label = month_label(prev_month, "Prev Month");
    let prev_year_label = month_label(prev_year, "Prev Year");
    let trend_label = if latest.is_some() {
        format!("{} - {}", prev_year_label, latest_label)
    } else {
        "Trend".to_string()
    };

    vec![
        ColumnDef::new("Commodity", Constraint::Min(18)),
        ColumnDef::new("Unit", Constraint::Length(10)),
        ColumnDef::new(latest_label, Constraint::Length(12))
            .align(CellAlign::Right)
            .format(ValueFormat::Number(2)),
        ColumnDef::new(prev_month_label, Constraint::Length(12))
            .align(CellAlign::Right)
            .format(ValueFormat::Number(2)),
        ColumnDef::new(prev_year_label, Constraint::Length(12))
            .align(CellAlign::Right)
            .format(ValueFormat::Number(2)),
        ColumnDef::new("MoM %", Constraint::Length(9))
            .align(CellAlign::Right)
            .format(ValueFormat::Percent(1))
            .style_rule(StyleRule::PosNeg),
        ColumnDef::new("YoY %", Constraint::Length(9))
            .align(CellAlign::Right)
            .format(ValueFormat::Percent(1))
            .style_rule(StyleRule::PosNeg),
        ColumnDef::new(trend_label, Constraint::Min(22)).renderer(DCC_GRAPH_CLICK_DATA),
    ]
}

fn change(current: f64, reference: f64) -> f64 {
    if reference == 0.0 {
        0.0
    } else {
        current / reference - 1.0
    }
}

/// Splits one CSV line, honoring double quotes around fields so commodity
/// names like "Crude oil, Brent" survive.
fn split_csv_line(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes && chars.peek() == Some(&'"') => {
                current.push('"');
                chars.next();
            }
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => {
                fields.push(current.trim().to_string());
                current.clear();
            }
            _ => current.push(c),
        }
    }
    fields.push(current.trim().to_string());
    fields
}

/// Strips footnote markers and stray dots from a commodity name.
fn clean_name(raw: &str) -> String {
    raw.trim_matches(|c: char| c == ' ' || c == '*')
        .replace('.', "")
}

/// Normalizes a unit cell: parentheses off, long unit names shortened the
/// way the source sheet abbreviates them elsewhere.
fn clean_unit(raw: &str) -> String {
    raw.trim()
        .trim_matches(|c: char| c == '(' || c == ')')
        .replace("$/cubic meter", "$/cum")
        .replace("$/troy oz", "$/toz")
        .replace("cents/sheet", "¢/sheets")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_table() -> &'static str {
        concat!(
            ",\"Crude oil, Brent\",Tea avg 3 auctions **,Platinum\n",
            ",($/bbl),($/kg),($/troy oz)\n",
            "2023M10,100,2.00,\n",
            "2023M11,101,2.05,\n",
            "2023M12,102,2.10,\n",
            "2024M01,103,2.15,\n",
            "2024M02,104,2.20,\n",
            "2024M03,105,,\n",
            "2024M04,106,2.30,\n",
            "2024M05,107,2.35,\n",
            "2024M06,108,2.40,\n",
            "2024M07,109,2.45,950.00\n",
            "2024M08,110,2.50,960.00\n",
            "2024M09,111,2.55,970.00\n",
            "2024M10,112,2.60,980.00\n",
            "2024M11,113,2.65,990.00\n",
        )
    }

    #[test]
    fn quoted_fields_keep_embedded_commas() {
        let fields = split_csv_line(r#"2023M10,"Crude oil, Brent",88.69"#);
        assert_eq!(fields, vec!["2023M10", "Crude oil, Brent", "88.69"]);

        let escaped = split_csv_line(r#"a,"say ""hi"", twice",b"#);
        assert_eq!(escaped[1], r#"say "hi", twice"#);
    }

    #[test]
    fn parses_names_units_and_dates() {
        let table = parse_cmo_csv(sample_table()).unwrap();
        assert_eq!(table.dates.len(), 14);
        assert_eq!(table.dates[0], NaiveDate::from_ymd_opt(2023, 10, 1).unwrap());
        assert_eq!(table.dates[13], NaiveDate::from_ymd_opt(2024, 11, 1).unwrap());

        assert_eq!(table.commodities[0].name, "Crude oil, Brent");
        assert_eq!(table.commodities[0].unit, "$/bbl");
        // Footnote markers are stripped, units are abbreviated
        assert_eq!(table.commodities[1].name, "Tea avg 3 auctions");
        assert_eq!(table.commodities[2].unit, "$/toz");
    }

    #[test]
    fn gaps_take_the_previous_month() {
        let table = parse_cmo_csv(sample_table()).unwrap();
        let tea = &table.commodities[1];
        // 2024M03 is blank and inherits the February price
        assert_eq!(tea.prices[5], 2.20);
        assert_eq!(tea.prices[6], 2.30);
    }

    #[test]
    fn rows_compute_window_statistics() {
        let table = parse_cmo_csv(sample_table()).unwrap();
        let rows = build_rows(&table);
        // Platinum has five months of history and is skipped
        assert_eq!(rows.len(), 2);

        let brent = &rows[0];
        assert_eq!(brent.product, "Crude oil, Brent");
        assert_eq!(brent.price, 113.0);
        assert_eq!(brent.price_prev_month, 112.0);
        // The trend window starts twelve months before the latest price
        assert_eq!(brent.price_prev_year, 101.0);
        assert!((brent.mom_change - (113.0 / 112.0 - 1.0)).abs() < 1e-12);
        assert!((brent.yoy_change - (113.0 / 101.0 - 1.0)).abs() < 1e-12);
        assert_eq!(brent.series.len(), 14);
        assert_eq!(brent.figure.series[0].points.len(), TREND_MONTHS);
        assert_eq!(brent.latest_date(), NaiveDate::from_ymd_opt(2024, 11, 1));
    }

    #[test]
    fn grid_row_lines_up_with_column_defs() {
        let table = parse_cmo_csv(sample_table()).unwrap();
        let rows = build_rows(&table);
        let grid_row = rows[0].to_grid_row();
        let columns = column_defs(None);

        assert_eq!(grid_row.cells.len(), columns.len());
        let chart_col = columns
            .iter()
            .position(|c| c.cell_renderer.is_some())
            .unwrap();
        assert!(matches!(grid_row.cells[chart_col], CellValue::Figure(_)));
        assert_eq!(grid_row.cells[0], CellValue::Text("Crude oil, Brent".into()));
    }

    #[test]
    fn column_labels_follow_the_latest_month() {
        let latest = NaiveDate::from_ymd_opt(2024, 11, 1);
        let columns = column_defs(latest);
        assert_eq!(columns[2].header, "Nov 2024");
        assert_eq!(columns[3].header, "Oct 2024");
        assert_eq!(columns[4].header, "Nov 2023");
        assert_eq!(columns[7].header, "Nov 2023 - Nov 2024");

        let generic = column_defs(None);
        assert_eq!(generic[2].header, "Latest");
        assert_eq!(generic[7].header, "Trend");
    }

    #[test]
    fn bad_month_tokens_are_rejected() {
        let result = parse_cmo_csv(",A\n,(x)\n2024X01,1\n");
        assert!(matches!(result, Err(DataError::BadDate(_))));
        let result = parse_cmo_csv(",A\n,(x)\n2024M13,1\n");
        assert!(matches!(result, Err(DataError::BadDate(_))));
    }

    #[test]
    fn header_only_input_is_empty() {
        assert!(matches!(parse_cmo_csv(""), Err(DataError::MissingHeader)));
        assert!(matches!(
            parse_cmo_csv(",A,B\n,(x),(y)\n"),
            Err(DataError::Empty)
        ));
    }

    #[test]
    fn unit_row_is_optional() {
        let table = parse_cmo_csv(",A\n2024M01,1\n2024M02,2\n").unwrap();
        assert_eq!(table.dates.len(), 2);
        assert_eq!(table.commodities[0].unit, "");
        assert_eq!(table.commodities[0].prices, vec![1.0, 2.0]);
    }

    #[test]
    fn bundled_sample_produces_rows() {
        let table = parse_cmo_csv(SAMPLE_CSV).unwrap();
        let rows = build_rows(&table);
        assert!(rows.len() >= 8, "sample should list several commodities");
        for row in &rows {
            assert!(!row.figure.is_empty());
            assert!(!row.unit.is_empty());
            assert!(row.series.len() >= TREND_MONTHS);
        }
        // Sample covers the normalized unit forms
        assert!(rows.iter().any(|r| r.unit == "$/toz"));
        assert!(rows.iter().any(|r| r.unit == "$/cum"));
        assert!(rows.iter().any(|r| r.unit == "¢/sheets"));
    }
}
