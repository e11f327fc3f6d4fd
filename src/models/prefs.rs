//! User preferences: loan policy settings

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};

/// Longest loan or renew period, ten years
pub const MAX_PERIOD_DAYS: u32 = 3650;

/// Largest fine charged per overdue day
pub const MAX_FINE_INCREMENT: Decimal = Decimal::from_parts(1000, 0, 0, false, 0);

/// Loan policy applied when lending, renewing and returning books
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSettings {
    pub loan_period_days: u32,
    pub renew_period_days: u32,
    /// Fine charged per day overdue
    pub fine_increment: Decimal,
    pub max_renews: u32,
}

impl Default for UserSettings {
    fn default() -> Self {
        Self {
            loan_period_days: 14,
            renew_period_days: 14,
            fine_increment: Decimal::new(10, 2),
            max_renews: 1,
        }
    }
}

/// Partial update of the user settings
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SettingsUpdate {
    pub loan_period_days: Option<u32>,
    pub renew_period_days: Option<u32>,
    pub fine_increment: Option<Decimal>,
    pub max_renews: Option<u32>,
}

impl SettingsUpdate {
    pub fn is_empty(&self) -> bool {
        self.loan_period_days.is_none()
            && self.renew_period_days.is_none()
            && self.fine_increment.is_none()
            && self.max_renews.is_none()
    }
}

impl UserSettings {
    pub fn validate(&self) -> AppResult<()> {
        if self.loan_period_days == 0 || self.renew_period_days == 0 {
            return Err(AppError::Validation("Loan and renew periods should be at least 1 day".to_string()));
        }
        if self.loan_period_days > MAX_PERIOD_DAYS || self.renew_period_days > MAX_PERIOD_DAYS {
            return Err(AppError::Validation(format!(
                "Loan and renew periods should be at most {} days",
                MAX_PERIOD_DAYS
            )));
        }
        if self.fine_increment.is_sign_negative() {
            return Err(AppError::Validation("Fine increment should not be negative".to_string()));
        }
        if self.fine_increment > MAX_FINE_INCREMENT {
            return Err(AppError::Validation(format!(
                "Fine increment should be at most ${}",
                MAX_FINE_INCREMENT
            )));
        }
        Ok(())
    }

    pub fn updated(&self, update: &SettingsUpdate) -> AppResult<Self> {
        let settings = Self {
            loan_period_days: update.loan_period_days.unwrap_or(self.loan_period_days),
            renew_period_days: update.renew_period_days.unwrap_or(self.renew_period_days),
            fine_increment: update.fine_increment.unwrap_or(self.fine_increment),
            max_renews: update.max_renews.unwrap_or(self.max_renews),
        };
        settings.validate()?;
        Ok(settings)
    }
}

impl std::fmt::Display for UserSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "loan period {} days, renew period {} days, fine ${} per day, max {} renews",
            self.loan_period_days, self.renew_period_days, self.fine_increment, self.max_renews
        )
    }
}

/// Persisted user preferences
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct UserPrefs {
    #[serde(default)]
    pub user_settings: UserSettings,
}

impl UserPrefs {
    pub fn validate(&self) -> AppResult<()> {
        self.user_settings.validate()
    }
}
