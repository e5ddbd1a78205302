//! Closed-form conversions of raw bicycle measurements.
//!
//! All functions work element-wise and require equal-length inputs.

use serde::Serialize;

use crate::error::{IngestionError, Result};

/// Steering assembly constants
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SteerAssembly {
    /// Inertia of everything above the steer tube torque sensor (kg m^2)
    pub handlebar_inertia: f64,
    /// Bearing viscous damping (N m s)
    pub damping: f64,
    /// Bearing Coulomb friction (N m)
    pub friction: f64,
}

/// Frame angular rates
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrameRates {
    pub yaw: Vec<f64>,
    pub roll: Vec<f64>,
    pub pitch: Vec<f64>,
}

fn check_lengths(what: &str, lengths: &[usize]) -> Result<usize> {
    let first = lengths.first().copied().unwrap_or(0);
    if lengths.iter().any(|&l| l != first) {
        return Err(IngestionError::parameter(
            what,
            format!("inputs differ in length: {lengths:?}"),
        ));
    }
    Ok(first)
}

/// Sign with `sign(0) == 0`
fn sign(x: f64) -> f64 {
    if x > 0.0 {
        1.0
    } else if x < 0.0 {
        -1.0
    } else {
        x
    }
}

/// Steer torque applied by the rider.
///
/// `I * accel - damping * rate - sign(rate) * friction + tube_torque`
pub fn steer_torque(
    steer_rate: &[f64],
    steer_accel: &[f64],
    tube_torque: &[f64],
    assembly: &SteerAssembly,
) -> Result<Vec<f64>> {
    check_lengths(
        "steer_torque",
        &[steer_rate.len(), steer_accel.len(), tube_torque.len()],
    )?;
    Ok(steer_rate
        .iter()
        .zip(steer_accel)
        .zip(tube_torque)
        .map(|((&rate, &accel), &tube)| {
            assembly.handlebar_inertia * accel - assembly.damping * rate
                - sign(rate) * assembly.friction
                + tube
        })
        .collect())
}

/// Steer rate: fork rate relative to the frame
pub fn steer_rate(fork_rate: &[f64], angular_rate_z: &[f64]) -> Result<Vec<f64>> {
    check_lengths("steer_rate", &[fork_rate.len(), angular_rate_z.len()])?;
    Ok(fork_rate
        .iter()
        .zip(angular_rate_z)
        .map(|(fork, z)| fork - z)
        .collect())
}

/// Frame yaw, roll and pitch rates from body-fixed rates measured in the
/// head tube frame.
///
/// `lam` is the steer axis tilt (rad). Without a roll angle the frame is
/// taken as upright.
pub fn yaw_roll_pitch_rate(
    rate_x: &[f64],
    rate_y: &[f64],
    rate_z: &[f64],
    lam: f64,
    roll_angle: Option<&[f64]>,
) -> Result<FrameRates> {
    let mut lengths = vec![rate_x.len(), rate_y.len(), rate_z.len()];
    if let Some(roll) = roll_angle {
        lengths.push(roll.len());
    }
    let n = check_lengths("yaw_roll_pitch_rate", &lengths)?;

    let (sin_lam, cos_lam) = lam.sin_cos();
    let mut rates = FrameRates {
        yaw: Vec::with_capacity(n),
        roll: Vec::with_capacity(n),
        pitch: Vec::with_capacity(n),
    };
    for i in 0..n {
        let phi = roll_angle.map_or(0.0, |r| r[i]);
        let (x, y, z) = (rate_x[i], rate_y[i], rate_z[i]);
        rates.yaw.push(-(x * sin_lam - z * cos_lam) / phi.cos());
        rates.roll.push(x * cos_lam + z * sin_lam);
        rates
            .pitch
            .push(y + x * sin_lam * phi.tan() - z * cos_lam * phi.tan());
    }
    Ok(rates)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::FRAC_PI_2;

    const ASSEMBLY: SteerAssembly = SteerAssembly {
        handlebar_inertia: 0.1,
        damping: 0.5,
        friction: 0.2,
    };

    #[test]
    fn test_steer_torque() {
        let torque = steer_torque(&[1.0, 0.0, -2.0], &[10.0, 0.0, 0.0], &[0.3, 0.3, 0.3], &ASSEMBLY)
            .unwrap();
        assert!((torque[0] - (1.0 - 0.5 - 0.2 + 0.3)).abs() < 1e-12);
        // no friction at rest
        assert!((torque[1] - 0.3).abs() < 1e-12);
        assert!((torque[2] - (1.0 + 0.2 + 0.3)).abs() < 1e-12);
    }

    #[test]
    fn test_length_mismatch() {
        assert!(steer_rate(&[1.0], &[1.0, 2.0]).is_err());
        assert!(steer_torque(&[1.0], &[1.0], &[], &ASSEMBLY).is_err());
    }

    #[test]
    fn test_steer_rate() {
        assert_eq!(steer_rate(&[1.0, 2.0], &[0.5, 3.0]).unwrap(), vec![0.5, -1.0]);
    }

    #[test]
    fn test_upright_frame_with_vertical_head_tube() {
        // lam = 0: z is straight up the head tube
        let rates = yaw_roll_pitch_rate(&[0.1], &[0.2], &[0.3], 0.0, None).unwrap();
        assert!((rates.yaw[0] - 0.3).abs() < 1e-12);
        assert!((rates.roll[0] - 0.1).abs() < 1e-12);
        assert!((rates.pitch[0] - 0.2).abs() < 1e-12);
    }

    #[test]
    fn test_horizontal_head_tube_swaps_axes() {
        let rates = yaw_roll_pitch_rate(&[0.1], &[0.0], &[0.3], FRAC_PI_2, Some(&[0.0])).unwrap();
        assert!((rates.yaw[0] + 0.1).abs() < 1e-12);
        assert!((rates.roll[0] - 0.3).abs() < 1e-12);
    }
}
