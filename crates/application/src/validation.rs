// Declarative request validation. Rules collect into a single aggregated
// validation error so a request reports every failure at once.

use chrono::{Datelike, NaiveDate, Utc};
use person_registry_domain::{DomainError, Gender, Result};

/// A request that declares validation rules. The pipeline runs these before
/// the handler executes and before any transaction is opened.
pub trait ValidateRequest: Send + Sync {
    fn validate(&self) -> Result<()>;
}

/// Collects rule violations for one request.
#[derive(Debug, Default)]
pub struct Rules {
    errors: Vec<String>,
}

impl Rules {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn not_empty(&mut self, field: &str, value: &str) -> &mut Self {
        if value.trim().is_empty() {
            self.errors.push(format!("{field} must not be empty"));
        }
        self
    }

    pub fn length(&mut self, field: &str, value: &str, min: usize, max: usize) -> &mut Self {
        let len = value.trim().chars().count();
        if len < min || len > max {
            self.errors
                .push(format!("{field} must be between {min} and {max} characters"));
        }
        self
    }

    pub fn exact_length(&mut self, field: &str, value: &str, len: usize) -> &mut Self {
        if value.trim().chars().count() != len {
            self.errors.push(format!("{field} must be {len} characters"));
        }
        self
    }

    pub fn digits_only(&mut self, field: &str, value: &str) -> &mut Self {
        if !value.trim().chars().all(|c| c.is_ascii_digit()) {
            self.errors.push(format!("{field} must contain digits only"));
        }
        self
    }

    pub fn positive(&mut self, field: &str, value: impl Into<i64>) -> &mut Self {
        if value.into() < 1 {
            self.errors.push(format!("{field} must be greater than zero"));
        }
        self
    }

    /// Minimum age at the time of the check, in whole years.
    pub fn min_age(&mut self, field: &str, birth_date: NaiveDate, years: u32) -> &mut Self {
        let today = Utc::now().date_naive();
        let target_year = birth_date.year() + years as i32;
        // A Feb 29 birth date completes the year on Mar 1 when the target
        // year is not a leap year.
        let cutoff = birth_date
            .with_year(target_year)
            .or_else(|| NaiveDate::from_ymd_opt(target_year, 3, 1))
            .unwrap_or(NaiveDate::MAX);
        if cutoff > today {
            self.errors.push(format!("{field} must yield an age of at least {years}"));
        }
        self
    }

    /// Letters must all come from one alphabet; mixed Latin/Georgian input
    /// is rejected.
    pub fn single_alphabet(&mut self, field: &str, value: &str) -> &mut Self {
        let has_latin = value.chars().any(|c| c.is_ascii_alphabetic());
        let has_georgian = value.chars().any(|c| ('\u{10A0}'..='\u{10FF}').contains(&c));
        if has_latin && has_georgian {
            self.errors.push(format!("{field} must not mix alphabets"));
        }
        self
    }

    /// The numeric value must be a declared `Gender` member.
    pub fn declared_gender(&mut self, field: &str, value: i16) -> &mut Self {
        if Gender::from_value(value).is_none() {
            self.errors.push(format!("{field} is not a valid gender value"));
        }
        self
    }

    pub fn must(&mut self, condition: bool, message: impl Into<String>) -> &mut Self {
        if !condition {
            self.errors.push(message.into());
        }
        self
    }

    pub fn finish(&mut self) -> Result<()> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(DomainError::Validation {
                errors: std::mem::take(&mut self.errors),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collects_every_violation() {
        let err = Rules::new()
            .not_empty("name", "  ")
            .exact_length("personal number", "123", 11)
            .digits_only("personal number", "123")
            .finish()
            .unwrap_err();

        match err {
            DomainError::Validation { errors } => {
                assert_eq!(errors.len(), 2);
                assert!(errors[0].contains("name"));
                assert!(errors[1].contains("11 characters"));
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn min_age_rejects_recent_birth_dates() {
        let today = Utc::now().date_naive();
        let seventeen = today.with_year(today.year() - 17).unwrap();
        let twenty = today.with_year(today.year() - 20).unwrap();

        assert!(Rules::new().min_age("birth date", seventeen, 18).finish().is_err());
        assert!(Rules::new().min_age("birth date", twenty, 18).finish().is_ok());
    }

    #[test]
    fn min_age_counts_leap_day_birth_dates() {
        let today = Utc::now().date_naive();
        let leap_year_in = |range: std::ops::RangeInclusive<i32>| {
            range
                .rev()
                .find(|y| NaiveDate::from_ymd_opt(*y, 2, 29).is_some())
                .and_then(|y| NaiveDate::from_ymd_opt(y, 2, 29))
                .unwrap()
        };

        // Born on a leap day fewer than 18 years ago: still a minor even
        // though Feb 29 never exists in the cutoff year.
        let minor = leap_year_in(today.year() - 14..=today.year());
        assert!(Rules::new().min_age("birth date", minor, 18).finish().is_err());

        let adult = leap_year_in(today.year() - 40..=today.year() - 22);
        assert!(Rules::new().min_age("birth date", adult, 18).finish().is_ok());
    }

    #[test]
    fn single_alphabet_rejects_mixed_scripts() {
        assert!(Rules::new().single_alphabet("name", "Nino").finish().is_ok());
        assert!(Rules::new().single_alphabet("name", "ნინო").finish().is_ok());
        assert!(Rules::new().single_alphabet("name", "Niნო").finish().is_err());
    }

    #[test]
    fn declared_gender_rejects_undefined_values() {
        assert!(Rules::new().declared_gender("gender", 1).finish().is_ok());
        assert!(Rules::new().declared_gender("gender", 9).finish().is_err());
    }

    #[test]
    fn positive_rejects_zero_and_negative() {
        assert!(Rules::new().positive("page number", 0i32).finish().is_err());
        assert!(Rules::new().positive("page number", -3i32).finish().is_err());
        assert!(Rules::new().positive("page number", 1i32).finish().is_ok());
    }
}
