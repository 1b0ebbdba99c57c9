//! Spread cone - Accuracy to cone angle and weighted direction sampling

use super::{AccuracySettings, FireModeModifiers, RecoilState};
use glam::DVec3;
use rand::Rng;
use std::f64::consts::TAU;

/// Accuracy after the recoil penalty and fire-mode multiplier, clamped to `[0, 100]`
///
/// `penalty = base * recoil_ratio * recoil_penalty`
pub fn compute_accuracy(
    base: f64,
    recoil: &RecoilState,
    mode: &FireModeModifiers,
    settings: &AccuracySettings,
) -> f64 {
    let penalty = base * recoil.ratio() * settings.recoil_penalty;
    let with_recoil = base - penalty;
    (with_recoil * mode.accuracy_multiplier).clamp(0.0, 100.0)
}

/// Full cone angle in degrees for an accuracy rating
pub fn spread_angle(accuracy: f64, settings: &AccuracySettings) -> f64 {
    settings.max_spread_angle * (1.0 - (accuracy / 100.0).clamp(0.0, 1.0))
}

/// Power-law exponent for half-angle sampling
///
/// Interpolates from 1 (uniform) toward `center_weight_multiplier` as accuracy
/// approaches 100, concentrating shots near the center.
pub fn center_weight(accuracy: f64, settings: &AccuracySettings) -> f64 {
    let t = (accuracy / 100.0).clamp(0.0, 1.0);
    1.0 + (settings.center_weight_multiplier - 1.0) * t
}

/// Orthonormal `(right, up)` pair perpendicular to `forward`
pub fn orthonormal_basis(forward: DVec3) -> (DVec3, DVec3) {
    let helper = if forward.y.abs() < 0.99 { DVec3::Y } else { DVec3::X };
    let right = helper.cross(forward).normalize();
    let up = forward.cross(right);
    (right, up)
}

/// Sample a direction inside the spread cone around `direction`
///
/// `spread_degrees` is the full cone angle; the sampled half-angle is
/// `half * u^w` with `w` from [`center_weight`] and the azimuth is uniform.
/// A zero-length direction is returned unchanged.
pub fn sample_direction(
    direction: DVec3,
    spread_degrees: f64,
    accuracy: f64,
    settings: &AccuracySettings,
    rng: &mut impl Rng,
) -> DVec3 {
    let Some(forward) = direction.try_normalize() else {
        return direction;
    };
    if spread_degrees <= 0.0 {
        return forward;
    }

    let half_angle = (spread_degrees * 0.5).to_radians();
    let weight = center_weight(accuracy, settings);
    let u: f64 = rng.gen();
    let theta = half_angle * u.powf(weight);
    let phi = rng.gen::<f64>() * TAU;

    let local = DVec3::new(theta.sin() * phi.cos(), theta.sin() * phi.sin(), theta.cos());
    let (right, up) = orthonormal_basis(forward);
    (right * local.x + up * local.y + forward * local.z).normalize()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn settings() -> AccuracySettings {
        AccuracySettings::default()
    }

    #[test]
    fn test_compute_accuracy_with_recoil() {
        // half recoil: penalty = 80 * 0.5 * 0.5 = 20
        let recoil = RecoilState::new(10.0, 1.0).add_recoil(5.0, 1.0);
        let acc = compute_accuracy(80.0, &recoil, &FireModeModifiers::default(), &settings());
        assert!((acc - 60.0).abs() < 1e-9);
    }

    #[test]
    fn test_compute_accuracy_clamped() {
        let recoil = RecoilState::new(10.0, 1.0);
        let mode = FireModeModifiers {
            accuracy_multiplier: 1.5,
            recoil_multiplier: 1.0,
        };
        assert!((compute_accuracy(90.0, &recoil, &mode, &settings()) - 100.0).abs() < 1e-9);

        let broken = FireModeModifiers {
            accuracy_multiplier: -1.0,
            recoil_multiplier: 1.0,
        };
        assert_eq!(compute_accuracy(90.0, &recoil, &broken, &settings()), 0.0);
    }

    #[test]
    fn test_spread_angle() {
        let s = settings();
        assert_eq!(spread_angle(100.0, &s), 0.0);
        assert!((spread_angle(0.0, &s) - s.max_spread_angle).abs() < 1e-12);
        assert!((spread_angle(75.0, &s) - s.max_spread_angle * 0.25).abs() < 1e-12);
        assert!((spread_angle(150.0, &s)).abs() < 1e-12);
    }

    #[test]
    fn test_center_weight_interpolates() {
        let s = settings();
        assert!((center_weight(0.0, &s) - 1.0).abs() < 1e-12);
        assert!((center_weight(100.0, &s) - s.center_weight_multiplier).abs() < 1e-12);
    }

    #[test]
    fn test_basis_is_orthonormal() {
        for forward in [DVec3::Z, DVec3::Y, DVec3::new(1.0, 2.0, -3.0).normalize()] {
            let (right, up) = orthonormal_basis(forward);
            assert!(right.dot(forward).abs() < 1e-9);
            assert!(up.dot(forward).abs() < 1e-9);
            assert!(right.dot(up).abs() < 1e-9);
            assert!((right.length() - 1.0).abs() < 1e-9);
            assert!((up.length() - 1.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_samples_within_cone() {
        let s = settings();
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let aim = DVec3::new(0.3, 0.1, 1.0).normalize();
        let spread = 12.0;
        let half = (spread * 0.5f64).to_radians();

        for _ in 0..500 {
            let dir = sample_direction(aim, spread, 40.0, &s, &mut rng);
            assert!((dir.length() - 1.0).abs() < 1e-9);
            assert!(dir.angle_between(aim) <= half + 1e-6);
        }
    }

    #[test]
    fn test_zero_spread_is_exact() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let dir = sample_direction(DVec3::X * 3.0, 0.0, 100.0, &settings(), &mut rng);
        assert_eq!(dir, DVec3::X);
    }

    #[test]
    fn test_sampling_is_reproducible() {
        let s = settings();
        let mut a = ChaCha8Rng::seed_from_u64(42);
        let mut b = ChaCha8Rng::seed_from_u64(42);
        for _ in 0..20 {
            let x = sample_direction(DVec3::Z, 8.0, 70.0, &s, &mut a);
            let y = sample_direction(DVec3::Z, 8.0, 70.0, &s, &mut b);
            assert_eq!(x, y);
        }
    }

    #[test]
    fn test_high_accuracy_concentrates_center() {
        let s = settings();
        let spread = 10.0;
        let mean_angle = |accuracy: f64| {
            let mut rng = ChaCha8Rng::seed_from_u64(99);
            let total: f64 = (0..2000)
                .map(|_| sample_direction(DVec3::Z, spread, accuracy, &s, &mut rng).angle_between(DVec3::Z))
                .sum();
            total / 2000.0
        };
        assert!(mean_angle(95.0) < mean_angle(5.0));
    }
}
