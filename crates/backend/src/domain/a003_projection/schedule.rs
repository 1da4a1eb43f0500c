use chrono::NaiveDate;

use crate::shared::dates::{add_days, next_monday, round2};

/// Результат расчёта недельного графика
#[derive(Debug, Clone, PartialEq)]
pub struct WeeklySchedule {
    /// Количество материала на неделю, округлено до 2 знаков
    pub per_week_quantity: f64,
    /// Количество недель: ceil((floors + basements) / velocity)
    pub week_count: u32,
    /// Даты начала недель: понедельники с шагом 7 дней
    pub week_starts: Vec<NaiveDate>,
}

impl WeeklySchedule {
    fn empty() -> Self {
        Self {
            per_week_quantity: 0.0,
            week_count: 0,
            week_starts: Vec::new(),
        }
    }

    /// Дата последней недели графика; `start_date` для пустого графика
    pub fn end_date(&self, start_date: NaiveDate) -> NaiveDate {
        self.week_starts.last().copied().unwrap_or(start_date)
    }
}

/// Расчёт недельного графика поставок
///
/// Чистая функция без побочных эффектов. Предусловия (velocity > 0,
/// неотрицательные этажи и количество) обеспечивает валидация вызывающего.
///
/// `floors + basements == 0` — корректный вырожденный случай: ноль недель,
/// нулевое недельное количество, пустой список дат.
pub fn compute(
    floors: i32,
    basements: i32,
    velocity: f64,
    total_quantity: f64,
    start_date: NaiveDate,
) -> WeeklySchedule {
    debug_assert!(velocity > 0.0);
    debug_assert!(floors >= 0 && basements >= 0);

    let levels = floors + basements;
    if levels == 0 {
        return WeeklySchedule::empty();
    }

    let weeks_needed = levels as f64 / velocity;
    // 3/0.3 даёт 10.000000000000002 в f64; эпсилон удерживает ceil честным
    let week_count = (weeks_needed - 1e-9).ceil() as u32;

    // Недельное количество считается от точного отношения, а не от
    // округлённого вверх числа недель. При дробном weeks_needed сумма
    // по периодам превышает total: распределение следует формуле,
    // точная консервация есть только при целом weeks_needed.
    let per_week_quantity = round2(total_quantity / weeks_needed);

    let first_monday = next_monday(start_date);
    let week_starts = (0..week_count)
        .map(|i| add_days(first_monday, 7 * i as i64))
        .collect();

    WeeklySchedule {
        per_week_quantity,
        week_count,
        week_starts,
    }
}
