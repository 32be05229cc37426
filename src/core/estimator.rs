use crate::core::heuristics;
use crate::domain::model::{Estimate, Modification, Vehicle};

/// Multiplier for the second gain-producing mod.
pub const INITIAL_GAIN_FACTOR: f64 = 0.9;
/// Decay applied to the multiplier each time it is used.
pub const GAIN_DECAY: f64 = 0.95;

/// Stock figures after nulls have been replaced by heuristic estimates.
#[derive(Debug, Clone, PartialEq)]
pub struct StockBaseline {
    pub hp: f64,
    pub tq: f64,
    pub weight_lbs: f64,
    pub zero_to_sixty_s: Option<f64>,
    pub quarter_mile_s: Option<f64>,
    pub notes: Vec<String>,
}

fn present(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite() && *v > 0.0)
}

impl StockBaseline {
    pub fn resolve(vehicle: &Vehicle) -> Self {
        let mut notes = Vec::new();

        let hp = present(vehicle.stock_hp).unwrap_or_else(|| {
            let hp = heuristics::hp_by_nameplate(vehicle);
            notes.push(format!("Stock horsepower was estimated at {} hp from the nameplate.", hp));
            hp
        });

        let tq = present(vehicle.stock_tq).unwrap_or_else(|| {
            let tq = heuristics::tq_by_hp(hp);
            notes.push(format!("Stock torque was estimated at {} lb-ft from horsepower.", tq));
            tq
        });

        let weight_lbs = present(vehicle.curb_weight_lbs).unwrap_or_else(|| {
            let weight = heuristics::weight_by_body_style(vehicle);
            notes.push(format!("Curb weight was estimated at {} lb from the body style.", weight));
            weight
        });

        Self {
            hp,
            tq,
            weight_lbs,
            zero_to_sixty_s: present(vehicle.zero_to_sixty_s),
            quarter_mile_s: present(vehicle.quarter_mile_s),
            notes,
        }
    }
}

/// 四捨五入 (.5 一律往 +∞)
fn round_half_up(x: f64) -> f64 {
    let rounded = x.round();
    if (rounded - x).abs() == 0.5 {
        x.ceil()
    } else {
        rounded
    }
}

/// Predicts performance after applying `mods` in order.
///
/// Weight deltas always accumulate. Horsepower and torque gains are scaled by
/// a diminishing-returns multiplier: the first gain-producing mod counts in
/// full, the second at 0.9, and each later one at 0.95 of the one before it.
pub fn estimate(vehicle: &Vehicle, mods: &[Modification]) -> Estimate {
    let stock = StockBaseline::resolve(vehicle);
    let drivetrain = vehicle.drivetrain();

    let mut hp = stock.hp;
    let mut tq = stock.tq;
    let mut weight = stock.weight_lbs;
    let mut notes = stock.notes.clone();

    let mut gain_factor = INITIAL_GAIN_FACTOR;
    let mut gain_mods = 0usize;

    for m in mods {
        weight += m.avg_weight_delta_lbs;

        if m.is_gain_producing() {
            let factor = if gain_mods == 0 {
                1.0
            } else {
                let current = gain_factor;
                gain_factor *= GAIN_DECAY;
                current
            };
            hp += round_half_up(m.avg_hp_gain * factor);
            tq += round_half_up(m.avg_tq_gain * factor);
            gain_mods += 1;
        }

        if m.needs_tune {
            notes.push(format!("{} typically benefits most with a tune.", m.label()));
        }
    }

    let valid = hp > 0.0 && weight > 0.0;
    let power_to_weight = if weight != 0.0 { hp / weight } else { 0.0 };

    let zero_to_sixty = if !valid {
        None
    } else if let Some(stock_t) = stock.zero_to_sixty_s {
        Some(stock_t * (stock.hp / hp) * (weight / stock.weight_lbs))
    } else {
        heuristics::empirical_zero_to_sixty(hp, weight, drivetrain)
    };

    let quarter_mile = if !valid {
        None
    } else if let Some(stock_t) = stock.quarter_mile_s {
        Some(stock_t * ((stock.weight_lbs / weight) * (stock.hp / hp)).sqrt())
    } else {
        heuristics::empirical_quarter_mile(hp, weight, drivetrain)
    };

    tracing::debug!(
        "Estimated {}: {} hp, {} lb-ft, {} lb after {} mods ({} gain-producing)",
        vehicle.display_name(),
        hp,
        tq,
        weight,
        mods.len(),
        gain_mods
    );

    Estimate {
        estimated_hp: hp,
        estimated_tq: tq,
        estimated_weight: round_half_up(weight),
        power_to_weight,
        zero_to_sixty,
        quarter_mile,
        notes,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn civic() -> Vehicle {
        Vehicle {
            id: "civic".to_string(),
            make: Some("Honda".to_string()),
            model: Some("Civic".to_string()),
            year: Some(2019),
            trim: Some("Si".to_string()),
            drivetrain: Some("FWD".to_string()),
            stock_hp: Some(200.0),
            stock_tq: Some(190.0),
            curb_weight_lbs: Some(2900.0),
            zero_to_sixty_s: Some(6.8),
            quarter_mile_s: Some(15.0),
            ..Default::default()
        }
    }

    fn power_mod(id: &str, hp: f64, tq: f64) -> Modification {
        Modification {
            id: id.to_string(),
            name: id.to_string(),
            avg_hp_gain: hp,
            avg_tq_gain: tq,
            ..Default::default()
        }
    }

    fn weight_mod(id: &str, delta: f64) -> Modification {
        Modification {
            id: id.to_string(),
            name: id.to_string(),
            avg_weight_delta_lbs: delta,
            ..Default::default()
        }
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_zero_mods_returns_stock_figures() {
        let result = estimate(&civic(), &[]);

        assert_eq!(result.estimated_hp, 200.0);
        assert_eq!(result.estimated_tq, 190.0);
        assert_eq!(result.estimated_weight, 2900.0);
        assert!(approx(result.power_to_weight, 200.0 / 2900.0));
        assert!(approx(result.zero_to_sixty.unwrap(), 6.8));
        assert!(approx(result.quarter_mile.unwrap(), 15.0));
        assert!(result.notes.is_empty());
    }

    #[test]
    fn test_single_gain_mod_applies_in_full() {
        let result = estimate(&civic(), &[power_mod("intake", 10.0, 8.0)]);
        assert_eq!(result.estimated_hp, 210.0);
        assert_eq!(result.estimated_tq, 198.0);
    }

    #[test]
    fn test_second_gain_mod_is_scaled_by_point_nine() {
        let result = estimate(
            &civic(),
            &[power_mod("intake", 10.0, 10.0), power_mod("exhaust", 20.0, 10.0)],
        );
        assert_eq!(result.estimated_hp, 200.0 + 10.0 + 18.0);
        assert_eq!(result.estimated_tq, 190.0 + 10.0 + 9.0);
    }

    #[test]
    fn test_third_gain_mod_is_scaled_geometrically() {
        let result = estimate(
            &civic(),
            &[
                power_mod("a", 10.0, 0.0),
                power_mod("b", 10.0, 0.0),
                power_mod("c", 20.0, 0.0),
            ],
        );
        // 10 + round(10 * 0.9) + round(20 * 0.855)
        assert_eq!(result.estimated_hp, 200.0 + 10.0 + 9.0 + 17.0);
    }

    #[test]
    fn test_non_gain_mods_do_not_consume_the_full_multiplier() {
        let result = estimate(
            &civic(),
            &[weight_mod("seats", -40.0), power_mod("intake", 10.0, 0.0)],
        );
        assert_eq!(result.estimated_hp, 210.0);
    }

    #[test]
    fn test_torque_only_mod_counts_as_gain_producing() {
        let result = estimate(
            &civic(),
            &[power_mod("tq", 0.0, 20.0), power_mod("hp", 20.0, 0.0)],
        );
        assert_eq!(result.estimated_tq, 210.0);
        assert_eq!(result.estimated_hp, 218.0);
    }

    #[test]
    fn test_weight_deltas_are_additive_regardless_of_sign() {
        let result = estimate(
            &civic(),
            &[
                weight_mod("wheels", -25.0),
                weight_mod("cage", 60.0),
                weight_mod("battery", -12.4),
            ],
        );
        assert_eq!(result.estimated_weight, 2923.0);
        assert!(approx(result.power_to_weight, 200.0 / 2922.6));
        assert_eq!(result.estimated_hp, 200.0);
    }

    #[test]
    fn test_stock_times_scale_with_power_to_weight() {
        let result = estimate(
            &civic(),
            &[power_mod("turbo", 100.0, 0.0), weight_mod("ballast", 100.0)],
        );
        let hp: f64 = 300.0;
        let weight: f64 = 3000.0;
        let expected_060 = 6.8 * (200.0 / hp) * (weight / 2900.0);
        let expected_qm = 15.0 * ((2900.0 / weight) * (200.0 / hp)).sqrt();

        assert!(approx(result.zero_to_sixty.unwrap(), expected_060));
        assert!(approx(result.quarter_mile.unwrap(), expected_qm));
        assert!(result.zero_to_sixty.unwrap() < 6.8);
    }

    #[test]
    fn test_missing_stock_times_use_empirical_formulas() {
        let mut car = civic();
        car.zero_to_sixty_s = None;
        car.quarter_mile_s = None;

        let result = estimate(&car, &[]);
        let drivetrain = car.drivetrain();

        assert_eq!(
            result.zero_to_sixty,
            heuristics::empirical_zero_to_sixty(200.0, 2900.0, drivetrain)
        );
        assert_eq!(
            result.quarter_mile,
            heuristics::empirical_quarter_mile(200.0, 2900.0, drivetrain)
        );
    }

    #[test]
    fn test_missing_stock_figures_are_estimated_with_notes() {
        let car = Vehicle {
            id: "mystery".to_string(),
            make: Some("Subaru".to_string()),
            model: Some("WRX".to_string()),
            trim: Some("Wagon".to_string()),
            ..Default::default()
        };

        let result = estimate(&car, &[]);

        assert_eq!(result.estimated_hp, 268.0);
        assert_eq!(result.estimated_tq, heuristics::tq_by_hp(268.0));
        assert_eq!(result.estimated_weight, 3600.0);
        assert_eq!(result.notes.len(), 3);
        assert!(result.zero_to_sixty.is_some());
    }

    #[test]
    fn test_zero_stock_hp_is_treated_as_missing() {
        let mut car = civic();
        car.stock_hp = Some(0.0);
        let baseline = StockBaseline::resolve(&car);
        assert_eq!(baseline.hp, 205.0);
        assert_eq!(baseline.notes.len(), 1);
    }

    #[test]
    fn test_needs_tune_adds_note() {
        let mut downpipe = power_mod("Downpipe", 25.0, 30.0);
        downpipe.needs_tune = true;

        let result = estimate(&civic(), &[downpipe]);
        assert_eq!(
            result.notes,
            vec!["Downpipe typically benefits most with a tune.".to_string()]
        );
    }

    #[test]
    fn test_degenerate_weight_yields_no_times() {
        let result = estimate(&civic(), &[weight_mod("magic", -5000.0)]);
        assert_eq!(result.zero_to_sixty, None);
        assert_eq!(result.quarter_mile, None);
    }

    #[test]
    fn test_round_half_up() {
        assert_eq!(round_half_up(85.5), 86.0);
        assert_eq!(round_half_up(-2.5), -2.0);
        assert_eq!(round_half_up(8.999_999), 9.0);
        // 最接近 0.5 但小於 0.5 的 f64，不可被進位
        assert_eq!(round_half_up(0.499_999_999_999_999_94), 0.0);
        assert_eq!(round_half_up(-0.5), 0.0);
    }
}
