//! Plain-text month sheets for printing.
//!
//! The printed layout is fixed regardless of the UI locale: English weekday
//! headers, and holidays listed below the grid with their Chinese name.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use crate::calendar::{CalendarCell, MonthGrid, DAYS_PER_WEEK};
use crate::locale::Locale;
use crate::provider::Result;

const CELL_WIDTH: usize = 8;

fn day_cell(cell: &CalendarCell, holiday_char: Option<char>) -> String {
    match cell.day {
        None => String::new(),
        Some(day) => match (cell.is_holiday(), holiday_char) {
            (true, Some(mark)) => format!("{}{}", mark, day),
            _ => day.to_string(),
        },
    }
}

/// Month sheet as printed. Implements `Display` so it can go to stdout or a
/// file alike.
pub struct MonthSheet<'a> {
    grid: &'a MonthGrid,
    holiday_char: Option<char>,
}

impl<'a> MonthSheet<'a> {
    pub fn new(grid: &'a MonthGrid, holiday_char: Option<char>) -> Self {
        MonthSheet { grid, holiday_char }
    }
}

impl fmt::Display for MonthSheet<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = CELL_WIDTH * DAYS_PER_WEEK;

        writeln!(f, "{:^width$}", self.grid.month().to_string(), width = width)?;
        writeln!(f)?;

        for header in Locale::En.texts().week_headers.iter() {
            write!(f, "{:>width$}", header, width = CELL_WIDTH)?;
        }
        writeln!(f)?;

        for week in self.grid.weeks() {
            for cell in week {
                write!(
                    f,
                    "{:>width$}",
                    day_cell(cell, self.holiday_char),
                    width = CELL_WIDTH
                )?;
            }
            writeln!(f)?;
        }

        let mut holidays = self.grid.holidays().peekable();
        if holidays.peek().is_some() {
            writeln!(f)?;
            for record in holidays {
                writeln!(f, "{}  {}", record.key(), record.name_local)?;
            }
        }

        Ok(())
    }
}

pub fn render_month(grid: &MonthGrid, holiday_char: Option<char>) -> String {
    MonthSheet::new(grid, holiday_char).to_string()
}

pub fn file_name(grid: &MonthGrid) -> String {
    format!(
        "hkcal-{}-{:02}.txt",
        grid.month().year(),
        grid.month().month0() + 1
    )
}

/// Writes the month sheet into `dir` and returns the written path.
pub fn print_to_dir(grid: &MonthGrid, dir: &Path, holiday_char: Option<char>) -> Result<PathBuf> {
    fs::create_dir_all(dir)?;
    let path = dir.join(file_name(grid));
    fs::write(&path, render_month(grid, holiday_char))?;
    log::info!("Printed {} to {}", grid.month(), path.display());
    Ok(path)
}
