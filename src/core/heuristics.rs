//! Fallback estimators used when a catalog row is missing stock figures.
//!
//! Every table here is hand-tuned; the numbers are ballpark values for common
//! enthusiast nameplates and body styles, not measured data.

use crate::domain::model::{Drivetrain, Vehicle};
use regex::Regex;
use std::sync::LazyLock;

pub const DEFAULT_HP: f64 = 180.0;
pub const DEFAULT_WEIGHT_LBS: f64 = 3300.0;
pub const TORQUE_PER_HP: f64 = 0.9;

const ZERO_TO_SIXTY_COEFF: f64 = 0.78;
const ZERO_TO_SIXTY_EXPONENT: f64 = 0.75;
const ZERO_TO_SIXTY_FLOOR_S: f64 = 1.8;
const QUARTER_MILE_COEFF: f64 = 5.825;
const QUARTER_MILE_FLOOR_S: f64 = 6.5;

struct Rule {
    pattern: Regex,
    value: f64,
}

fn rules(table: &[(&str, f64)]) -> Vec<Rule> {
    table
        .iter()
        .map(|(pattern, value)| Rule {
            // 表格為常數，編譯失敗只可能是打錯字，會在單元測試中被發現
            pattern: Regex::new(&format!("(?i){}", pattern)).expect("static heuristic pattern"),
            value: *value,
        })
        .collect()
}

// 由具體到一般排列，第一個符合的規則勝出
static NAMEPLATE_HP: LazyLock<Vec<Rule>> = LazyLock::new(|| {
    rules(&[
        (r"\bcivic\b.*\btype[\s-]?r\b", 306.0),
        (r"\bcivic\b.*\bsi\b", 205.0),
        (r"\bgolf\s+r\b", 288.0),
        (r"\bgti\b", 228.0),
        (r"\bwrx\b.*\bsti\b|\bsti\b", 305.0),
        (r"\bwrx\b", 268.0),
        (r"\bhellcat\b", 717.0),
        (r"\bscat\s*pack\b|\b392\b", 485.0),
        (r"\bcamaro\b.*\bzl1\b", 650.0),
        (r"\bcamaro\b.*\bss\b", 455.0),
        (r"\bmustang\b.*\b(gt|mach\s*1)\b", 450.0),
        (r"\bmustang\b", 310.0),
        (r"\bcorvette\b", 490.0),
        (r"\bm[234]\b", 473.0),
        (r"\bsupra\b", 382.0),
        (r"\b(gr)?86\b|\bbrz\b", 228.0),
        (r"\bmiata\b|\bmx-?5\b", 181.0),
        (r"\bf-?150\b", 400.0),
        (r"\bv8\b", 420.0),
        (r"\bv6\b", 290.0),
        (r"\b(amg|gt|ss|rs|type\s*s)\b", 340.0),
        (r"\bturbo\b", 250.0),
    ])
});

static BODY_STYLE_WEIGHT: LazyLock<Vec<Rule>> = LazyLock::new(|| {
    rules(&[
        (r"\b(truck|pickup|f-?150|silverado|sierra|ram|tundra|tacoma)\b", 4700.0),
        (r"\b(minivan|van)\b", 4400.0),
        (r"\b(suv|crossover|4runner|tahoe|explorer|wrangler|cr-?v|rav4)\b", 4200.0),
        (r"\b(wagon|estate|avant|sportwagen)\b", 3600.0),
        (r"\b(convertible|cabrio(let)?|spyder|spider)\b", 3500.0),
        (r"\b(roadster|miata|mx-?5)\b", 2400.0),
        (r"\b(coupe|2dr|2-door)\b", 3200.0),
        (r"\b(hatch(back)?|5dr|5-door)\b", 3000.0),
        (r"\b(sedan|saloon|4dr|4-door)\b", 3300.0),
    ])
});

fn first_match(table: &[Rule], haystack: &str) -> Option<f64> {
    table
        .iter()
        .find(|rule| rule.pattern.is_match(haystack))
        .map(|rule| rule.value)
}

/// Stock horsepower guessed from make, model and trim.
pub fn hp_by_nameplate(vehicle: &Vehicle) -> f64 {
    let nameplate = [
        vehicle.make.as_deref(),
        vehicle.model.as_deref(),
        vehicle.trim.as_deref(),
    ]
    .into_iter()
    .flatten()
    .collect::<Vec<_>>()
    .join(" ");

    first_match(&NAMEPLATE_HP, &nameplate).unwrap_or(DEFAULT_HP)
}

pub fn tq_by_hp(hp: f64) -> f64 {
    (hp * TORQUE_PER_HP).round()
}

/// Curb weight guessed from the explicit body style, then from model and trim.
pub fn weight_by_body_style(vehicle: &Vehicle) -> f64 {
    if let Some(weight) = vehicle
        .body_style
        .as_deref()
        .and_then(|style| first_match(&BODY_STYLE_WEIGHT, style))
    {
        return weight;
    }

    let descriptor = [vehicle.model.as_deref(), vehicle.trim.as_deref()]
        .into_iter()
        .flatten()
        .collect::<Vec<_>>()
        .join(" ");

    first_match(&BODY_STYLE_WEIGHT, &descriptor).unwrap_or(DEFAULT_WEIGHT_LBS)
}

/// Fraction of crank power that reaches the wheels.
pub fn drivetrain_efficiency(drivetrain: Drivetrain) -> f64 {
    match drivetrain {
        Drivetrain::Fwd => 0.88,
        Drivetrain::Rwd => 0.85,
        Drivetrain::Awd => 0.80,
    }
}

/// Time multiplier for traction off the line. AWD is the baseline.
pub fn launch_factor(drivetrain: Drivetrain) -> f64 {
    match drivetrain {
        Drivetrain::Awd => 1.00,
        Drivetrain::Rwd => 1.08,
        Drivetrain::Fwd => 1.12,
    }
}

fn lbs_per_wheel_hp(hp: f64, weight_lbs: f64, drivetrain: Drivetrain) -> Option<f64> {
    if hp <= 0.0 || weight_lbs <= 0.0 {
        return None;
    }
    Some(weight_lbs / (hp * drivetrain_efficiency(drivetrain)))
}

pub fn empirical_zero_to_sixty(hp: f64, weight_lbs: f64, drivetrain: Drivetrain) -> Option<f64> {
    let ratio = lbs_per_wheel_hp(hp, weight_lbs, drivetrain)?;
    let t = ZERO_TO_SIXTY_COEFF * ratio.powf(ZERO_TO_SIXTY_EXPONENT) * launch_factor(drivetrain);
    Some(t.max(ZERO_TO_SIXTY_FLOOR_S))
}

/// Hale-style ET estimate with a softened launch penalty.
pub fn empirical_quarter_mile(hp: f64, weight_lbs: f64, drivetrain: Drivetrain) -> Option<f64> {
    let ratio = lbs_per_wheel_hp(hp, weight_lbs, drivetrain)?;
    let t = QUARTER_MILE_COEFF * ratio.cbrt() * launch_factor(drivetrain).sqrt();
    Some(t.max(QUARTER_MILE_FLOOR_S))
}
