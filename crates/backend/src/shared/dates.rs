use chrono::{Datelike, Duration, NaiveDate};

/// Номер недели года по ISO 8601
///
/// Неделя начинается в понедельник; первая неделя года — та, что содержит
/// первый четверг года (недели нумеруются 1..=53).
pub fn iso_week_number(date: NaiveDate) -> u32 {
    date.iso_week().week()
}

/// Ближайший понедельник на дату или после неё
///
/// Если дата уже понедельник — возвращается она сама.
pub fn next_monday(date: NaiveDate) -> NaiveDate {
    let offset = (7 - date.weekday().num_days_from_monday()) % 7;
    date + Duration::days(offset as i64)
}

/// Сдвиг даты на заданное число дней (может быть отрицательным)
pub fn add_days(date: NaiveDate, days: i64) -> NaiveDate {
    date + Duration::days(days)
}

/// Округление до 2 знаков, половина — от нуля
///
/// `f64::round` округляет half away from zero, что и требуется для
/// хранимых количеств.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
