use std::fmt::Display;
use std::fmt::Write;
use unsegen::base::*;
use unsegen::widget::*;

use crate::calendar::{CalendarCell, DAYS_PER_WEEK};

use super::{Context, Theme};

pub struct DayCell<'a> {
    day_num: u32,
    is_today: bool,
    is_holiday: bool,
    theme: &'a Theme,
}

impl<'a> DayCell<'a> {
    const CELL_HEIGHT: usize = 1;
    const CELL_WIDTH: usize = 8;

    fn new(day_num: u32, theme: &'a Theme) -> Self {
        DayCell {
            day_num,
            is_today: false,
            is_holiday: false,
            theme,
        }
    }

    fn from_cell(cell: &CalendarCell, theme: &'a Theme) -> Option<Self> {
        cell.day.map(|day| {
            DayCell::new(day, theme)
                .today(cell.is_today)
                .holiday(cell.is_holiday())
        })
    }

    fn today(mut self, is_today: bool) -> Self {
        self.is_today = is_today;
        self
    }

    fn holiday(mut self, is_holiday: bool) -> Self {
        self.is_holiday = is_holiday;
        self
    }
}

impl Display for DayCell<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let arg_today = if self.is_today {
            self.theme.today_char.unwrap_or(' ')
        } else {
            ' '
        };

        let arg_holiday = if self.is_holiday {
            self.theme.holiday_char.unwrap_or(' ')
        } else {
            ' '
        };

        write!(f, "{}{}{:>2}", arg_today, arg_holiday, self.day_num)
    }
}

fn cell_style(cell: &CalendarCell, theme: &Theme) -> StyleModifier {
    if cell.is_today {
        theme.today_style
    } else if cell.is_holiday() {
        theme.holiday_style
    } else if cell.is_rest_day {
        theme.rest_day_style
    } else {
        theme.day_style
    }
}

macro_rules! write_logged {
    ($cursor:expr, $($arg:tt)*) => {
        if let Err(err) = write!($cursor, $($arg)*) {
            log::warn!("Error while drawing calendar: {}", err);
        }
    };
}

/// Title, weekday header and the day grid of the context's month.
pub struct MonthPane<'a> {
    context: &'a Context,
}

impl<'a> MonthPane<'a> {
    const ROWS: usize = 6;
    const HEADER_ROWS: usize = 2;

    pub fn new(context: &'a Context) -> Self {
        MonthPane { context }
    }
}

impl Widget for MonthPane<'_> {
    fn space_demand(&self) -> Demand2D {
        Demand2D {
            width: ColDemand::exact(DAYS_PER_WEEK * DayCell::CELL_WIDTH),
            height: RowDemand::exact(Self::HEADER_ROWS + Self::ROWS * DayCell::CELL_HEIGHT),
        }
    }

    fn draw(&self, mut window: Window, _hints: RenderingHints) {
        let theme = self.context.theme();
        let texts = self.context.locale().texts();
        let grid = self.context.grid();

        let mut cursor = Cursor::new(&mut window).style_modifier(theme.month_title_style);

        let title = if self.context.is_loading() {
            format!("{} ...", grid.month())
        } else {
            grid.month().to_string()
        };
        write_logged!(cursor, "{}", title);

        cursor.set_style_modifier(theme.month_header_style);
        for (col, head) in texts.week_headers.iter().enumerate() {
            cursor.move_to(
                ColIndex::new((col * DayCell::CELL_WIDTH) as i32),
                RowIndex::new(1),
            );
            write_logged!(cursor, "{}", head);
        }

        for (row, week) in grid.weeks().enumerate() {
            for (col, cell) in week.iter().enumerate() {
                if let Some(day) = DayCell::from_cell(cell, theme) {
                    cursor.move_to(
                        ColIndex::new((col * DayCell::CELL_WIDTH) as i32),
                        RowIndex::new((Self::HEADER_ROWS + row * DayCell::CELL_HEIGHT) as i32),
                    );
                    cursor.set_style_modifier(cell_style(cell, theme));
                    write_logged!(cursor, "{}", day);
                }
            }
        }
    }
}

/// Holidays of the shown month with their name in the UI language.
pub struct HolidayList<'a> {
    context: &'a Context,
}

impl<'a> HolidayList<'a> {
    pub fn new(context: &'a Context) -> Self {
        HolidayList { context }
    }
}

impl Widget for HolidayList<'_> {
    fn space_demand(&self) -> Demand2D {
        Demand2D {
            width: ColDemand::at_least(DAYS_PER_WEEK * DayCell::CELL_WIDTH),
            height: RowDemand::at_least(1),
        }
    }

    fn draw(&self, mut window: Window, _hints: RenderingHints) {
        let theme = self.context.theme();
        let locale = self.context.locale();
        let holidays = self
            .context
            .store()
            .lookup_month(self.context.month().year(), self.context.month().month0());

        let mut cursor = Cursor::new(&mut window).style_modifier(theme.holiday_style);
        for (day, record) in holidays {
            write_logged!(cursor, "{:>2}  {}", day, locale.holiday_name(record));
            cursor.fill_and_wrap_line();
        }
    }
}
