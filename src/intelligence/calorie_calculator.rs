// ABOUTME: Calorie target calculation using the Mifflin-St Jeor equation
// ABOUTME: BMR, activity-scaled TDEE, and deficit/surplus targets
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Liftlog Project

//! Calorie Calculator
//!
//! Implements the Mifflin-St Jeor resting energy expenditure equation and
//! scales it by an activity multiplier into maintenance, deficit, and
//! surplus targets.
//!
//! # Scientific References
//!
//! - Mifflin, M.D., et al. (1990). A new predictive equation for resting
//!   energy expenditure. *American Journal of Clinical Nutrition*, 51(2),
//!   241-247. <https://doi.org/10.1093/ajcn/51.2.241>

use serde::{Deserialize, Serialize};

use crate::errors::{AppError, AppResult};

/// Mild daily adjustment for slow weight change (kcal)
const MILD_ADJUSTMENT_KCAL: i32 = 250;
/// Moderate daily adjustment for steady weight change (kcal)
const MODERATE_ADJUSTMENT_KCAL: i32 = 500;

/// Biological sex term of the Mifflin-St Jeor equation
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum BiologicalSex {
    /// +5 kcal constant term
    Male,
    /// -161 kcal constant term
    Female,
}

/// Activity level scaling BMR into total daily energy expenditure
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ActivityLevel {
    /// Little or no exercise
    Sedentary,
    /// Light exercise 1-3 days/week
    LightlyActive,
    /// Moderate exercise 3-5 days/week
    ModeratelyActive,
    /// Hard exercise 6-7 days/week
    VeryActive,
    /// Physical job or twice-daily training
    ExtraActive,
}

impl ActivityLevel {
    /// Standard TDEE multiplier for this activity level
    #[must_use]
    pub const fn multiplier(self) -> f64 {
        match self {
            Self::Sedentary => 1.2,
            Self::LightlyActive => 1.375,
            Self::ModeratelyActive => 1.55,
            Self::VeryActive => 1.725,
            Self::ExtraActive => 1.9,
        }
    }
}

/// Inputs to the calorie calculation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CalorieProfile {
    /// Biological sex
    pub sex: BiologicalSex,
    /// Age in years
    pub age_years: u32,
    /// Body weight in kilograms
    pub weight_kg: f64,
    /// Height in centimeters
    pub height_cm: f64,
    /// Activity level
    pub activity: ActivityLevel,
}

/// Daily calorie targets derived from a profile
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CalorieTargets {
    /// Basal metabolic rate (kcal/day)
    pub bmr: i32,
    /// Maintenance calories (kcal/day)
    pub maintenance: i32,
    /// Maintenance minus 250 kcal
    pub mild_deficit: i32,
    /// Maintenance minus 500 kcal
    pub moderate_deficit: i32,
    /// Maintenance plus 250 kcal
    pub mild_surplus: i32,
    /// Maintenance plus 500 kcal
    pub moderate_surplus: i32,
}

/// Compute daily calorie targets for a profile.
///
/// BMR per Mifflin-St Jeor: `10*weight + 6.25*height - 5*age` plus +5
/// (male) or -161 (female). TDEE is BMR scaled by the activity multiplier.
///
/// # Errors
///
/// Returns `ValueOutOfRange` when age, weight, or height is zero.
pub fn calculate_targets(profile: &CalorieProfile) -> AppResult<CalorieTargets> {
    if profile.age_years == 0 {
        return Err(AppError::out_of_range("age must be positive"));
    }
    if profile.weight_kg <= 0.0 {
        return Err(AppError::out_of_range("weight must be positive"));
    }
    if profile.height_cm <= 0.0 {
        return Err(AppError::out_of_range("height must be positive"));
    }

    let sex_term = match profile.sex {
        BiologicalSex::Male => 5.0,
        BiologicalSex::Female => -161.0,
    };
    let bmr = 10.0 * profile.weight_kg + 6.25 * profile.height_cm
        - 5.0 * f64::from(profile.age_years)
        + sex_term;
    let maintenance = (bmr * profile.activity.multiplier()).round() as i32;

    Ok(CalorieTargets {
        bmr: bmr.round() as i32,
        maintenance,
        mild_deficit: maintenance - MILD_ADJUSTMENT_KCAL,
        moderate_deficit: maintenance - MODERATE_ADJUSTMENT_KCAL,
        mild_surplus: maintenance + MILD_ADJUSTMENT_KCAL,
        moderate_surplus: maintenance + MODERATE_ADJUSTMENT_KCAL,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reference_profile() -> CalorieProfile {
        CalorieProfile {
            sex: BiologicalSex::Male,
            age_years: 30,
            weight_kg: 80.0,
            height_cm: 180.0,
            activity: ActivityLevel::ModeratelyActive,
        }
    }

    #[test]
    fn male_reference_values() {
        // 10*80 + 6.25*180 - 5*30 + 5 = 1780
        let targets = calculate_targets(&reference_profile()).unwrap();
        assert_eq!(targets.bmr, 1780);
        assert_eq!(targets.maintenance, 2759); // 1780 * 1.55
        assert_eq!(targets.mild_deficit, 2509);
        assert_eq!(targets.moderate_surplus, 3259);
    }

    #[test]
    fn female_term_lowers_bmr() {
        let profile = CalorieProfile {
            sex: BiologicalSex::Female,
            ..reference_profile()
        };
        let targets = calculate_targets(&profile).unwrap();
        assert_eq!(targets.bmr, 1780 - 166); // +5 becomes -161
    }

    #[test]
    fn zero_inputs_are_rejected() {
        let mut profile = reference_profile();
        profile.age_years = 0;
        assert!(calculate_targets(&profile).is_err());

        let mut profile = reference_profile();
        profile.weight_kg = 0.0;
        assert!(calculate_targets(&profile).is_err());

        let mut profile = reference_profile();
        profile.height_cm = -1.0;
        assert!(calculate_targets(&profile).is_err());
    }

    #[test]
    fn activity_multipliers_are_ordered() {
        let levels = [
            ActivityLevel::Sedentary,
            ActivityLevel::LightlyActive,
            ActivityLevel::ModeratelyActive,
            ActivityLevel::VeryActive,
            ActivityLevel::ExtraActive,
        ];
        for pair in levels.windows(2) {
            assert!(pair[0].multiplier() < pair[1].multiplier());
        }
    }
}
