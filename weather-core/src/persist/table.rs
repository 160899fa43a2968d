use std::path::PathBuf;

use rust_xlsxwriter::{Format, Workbook};
use tracing::info;

use crate::model::{ForecastDetail, ForecastMode, WeatherRecord};

use super::{PersistError, ensure_dir};

pub const SHEET_NAME: &str = "Forecast";

/// Header row. Base columns first, then the per-hour columns.
pub const HEADERS: [&str; 19] = [
    "Thành_phố",
    "Nguồn_dữ_liệu",
    "Thời_gian_quan_trắc",
    "Thời_gian_cập_nhật",
    "Vĩ_độ",
    "Kinh_độ",
    "Nhiệt_độ_hiện_tại (C)",
    "Độ_ẩm (%)",
    "Lượng_mưa_hiện_tại (mm)",
    "Gió_tốc_độ_hiện_tại (m/s)",
    "Mã_thời_tiết",
    "Nhiệt_độ_cao_nhất_ngày (C)",
    "Nhiệt_độ_thấp_nhất_ngày (C)",
    "Tổng_lượng_mưa_ngày (mm)",
    "Là_dự_báo",
    "Dự_báo_giờ",
    "Nhiệt_độ_giờ (C)",
    "Lượng_mưa_giờ (mm)",
    "Gió_tốc_độ_giờ (m/s)",
];

/// Number of leading columns shared by every row of a record.
pub const BASE_COLUMNS: usize = 15;

#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Text(String),
    Number(f64),
    /// Left blank in the sheet.
    Empty,
}

impl From<Option<f64>> for Cell {
    fn from(value: Option<f64>) -> Self {
        value.map_or(Cell::Empty, Cell::Number)
    }
}

/// One spreadsheet row, in [`HEADERS`] order.
#[derive(Debug, Clone, PartialEq)]
pub struct TableRow {
    pub cells: Vec<Cell>,
}

impl TableRow {
    pub fn base(&self) -> &[Cell] {
        &self.cells[..BASE_COLUMNS]
    }

    pub fn hour(&self) -> &[Cell] {
        &self.cells[BASE_COLUMNS..]
    }
}

/// Flatten a record into rows: one per hourly entry for a full-day record,
/// a single row for a single-hour record.
pub fn table_rows(record: &WeatherRecord, city: &str) -> Vec<TableRow> {
    let base = vec![
        Cell::Text(city.to_string()),
        Cell::Text(record.source.clone()),
        Cell::Text(record.observed_at.clone()),
        Cell::Text(record.updated_at.clone()),
        Cell::Number(record.latitude),
        Cell::Number(record.longitude),
        Cell::Number(record.current_temperature_c),
        Cell::Number(f64::from(record.humidity_percent)),
        Cell::Number(record.current_precipitation_mm),
        Cell::Number(record.wind_speed_ms),
        Cell::Number(f64::from(record.weather_code)),
        Cell::Number(record.daily_max_temperature_c),
        Cell::Number(record.daily_min_temperature_c),
        Cell::Number(record.daily_total_precipitation_mm),
        Cell::Text(if record.is_forecast { "Có" } else { "Không" }.to_string()),
    ];

    let with_hour = |time: &str, temperature: Option<f64>, precipitation: Option<f64>, wind: Option<f64>| {
        let mut cells = base.clone();
        cells.extend([
            Cell::Text(time.to_string()),
            Cell::from(temperature),
            Cell::from(precipitation),
            Cell::from(wind),
        ]);
        TableRow { cells }
    };

    match &record.forecast {
        ForecastDetail::FullDay { hourly_series } => hourly_series
            .iter()
            .map(|h| with_hour(&h.time, h.temperature_c, h.precipitation_mm, h.wind_speed_ms))
            .collect(),
        // On fallback the hour values are the current conditions, so they carry the observation time.
        ForecastDetail::SingleHour(hour) => vec![with_hour(
            hour.hour_time.as_deref().unwrap_or(&record.observed_at),
            hour.hour_temperature_c,
            hour.hour_precipitation_mm,
            hour.hour_wind_speed_ms,
        )],
    }
}

/// One XLSX workbook per city.
#[derive(Debug, Clone)]
pub struct TableStore {
    dir: PathBuf,
}

impl TableStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, city: &str, mode: ForecastMode) -> PathBuf {
        let name = match mode {
            ForecastMode::FullDay => format!("{city}_24h.xlsx"),
            ForecastMode::SingleHour => format!("{city}.xlsx"),
        };
        self.dir.join(name)
    }

    /// Write the record's rows under a bold header row, replacing any previous workbook.
    pub fn save(&self, record: &WeatherRecord, city: &str) -> Result<PathBuf, PersistError> {
        ensure_dir(&self.dir)?;

        let path = self.path_for(city, record.mode());
        let rows = table_rows(record, city);

        let mut workbook = Workbook::new();
        let header = Format::new().set_bold();

        let sheet = workbook.add_worksheet();
        sheet.set_name(SHEET_NAME)?;

        for (col, title) in HEADERS.iter().enumerate() {
            sheet.write_string_with_format(0, col as u16, *title, &header)?;
        }

        for (i, row) in rows.iter().enumerate() {
            let r = i as u32 + 1;
            for (col, cell) in row.cells.iter().enumerate() {
                let c = col as u16;
                match cell {
                    Cell::Text(s) => {
                        sheet.write_string(r, c, s.as_str())?;
                    }
                    Cell::Number(n) => {
                        sheet.write_number(r, c, *n)?;
                    }
                    Cell::Empty => {}
                }
            }
        }
        sheet.autofit();

        workbook.save(&path)?;

        info!(path = %path.display(), rows = rows.len(), "Saved spreadsheet");
        Ok(path)
    }
}
