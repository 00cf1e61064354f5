use crate::utilities::gather_scatter::GatherScatter;
use crate::utilities::vector::Vector;

/// SIMD-wide spring settings shared by every contact of a convex manifold.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default)]
pub struct SpringSettingsWide {
    pub angular_frequency: Vector,
    pub twice_damping_ratio: Vector,
}

impl SpringSettingsWide {
    /// Writes scalar spring settings into one lane of the wide settings.
    #[inline(always)]
    pub fn write_slot(&mut self, source: &SpringSettings, slot_index: usize) {
        GatherScatter::set(&mut self.angular_frequency, slot_index, source.angular_frequency);
        GatherScatter::set(
            &mut self.twice_damping_ratio,
            slot_index,
            source.twice_damping_ratio,
        );
    }

    /// Reads one lane of the wide settings into scalar spring settings.
    #[inline(always)]
    pub fn read_slot(&self, slot_index: usize) -> SpringSettings {
        SpringSettings {
            angular_frequency: GatherScatter::get(&self.angular_frequency, slot_index),
            twice_damping_ratio: GatherScatter::get(&self.twice_damping_ratio, slot_index),
        }
    }

    /// Computes the springiness terms used by soft constraints for the given time step:
    /// the position error to bias velocity conversion, the effective mass CFM scale, and
    /// the accumulated impulse softness scale.
    #[inline(always)]
    pub fn compute_springiness(settings: &Self, dt: f32) -> (Vector, Vector, Vector) {
        let dt_wide = Vector::splat(dt);
        let angular_frequency_dt = settings.angular_frequency * dt_wide;
        let position_error_to_velocity =
            settings.angular_frequency / (angular_frequency_dt + settings.twice_damping_ratio);
        let extra =
            Vector::ONE / (angular_frequency_dt * (angular_frequency_dt + settings.twice_damping_ratio));
        let effective_mass_cfm_scale = Vector::ONE / (Vector::ONE + extra);
        let softness_impulse_scale = extra * effective_mass_cfm_scale;
        (
            position_error_to_velocity,
            effective_mass_cfm_scale,
            softness_impulse_scale,
        )
    }
}

/// Scalar spring settings describing the frequency and damping of a springy constraint.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SpringSettings {
    /// Target number of undamped oscillations per unit of time, scaled by 2 * PI.
    pub angular_frequency: f32,
    /// Twice the ratio of the spring's actual damping to its critical damping.
    pub twice_damping_ratio: f32,
}

impl SpringSettings {
    /// Constructs a new spring settings instance.
    ///
    /// * `frequency` — Target number of undamped oscillations per unit of time.
    /// * `damping_ratio` — Ratio of the spring's actual damping to its critical damping.
    ///   0 is undamped, 1 is critically damped, and higher values are overdamped.
    pub fn new(frequency: f32, damping_ratio: f32) -> Self {
        let settings = Self {
            angular_frequency: frequency * (2.0 * std::f32::consts::PI),
            twice_damping_ratio: damping_ratio * 2.0,
        };
        debug_assert!(
            settings.angular_frequency > 0.0
                && settings.angular_frequency.is_finite()
                && settings.twice_damping_ratio >= 0.0
                && settings.twice_damping_ratio.is_finite(),
            "Spring settings must have positive frequency and nonnegative damping ratio."
        );
        settings
    }

    /// Gets the target number of undamped oscillations per unit of time.
    #[inline(always)]
    pub fn frequency(&self) -> f32 {
        self.angular_frequency / (2.0 * std::f32::consts::PI)
    }

    /// Gets the ratio of the spring's actual damping to its critical damping.
    #[inline(always)]
    pub fn damping_ratio(&self) -> f32 {
        self.twice_damping_ratio / 2.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn accessors_round_trip() {
        let settings = SpringSettings::new(30.0, 1.0);
        assert_relative_eq!(settings.frequency(), 30.0);
        assert_relative_eq!(settings.damping_ratio(), 1.0);
    }

    #[test]
    fn springiness_terms_are_in_expected_ranges() {
        let mut wide = SpringSettingsWide::default();
        let settings = SpringSettings::new(30.0, 1.0);
        for slot in 0..crate::utilities::vector::LANE_COUNT {
            wide.write_slot(&settings, slot);
        }
        let (position_error_to_velocity, effective_mass_cfm_scale, softness_impulse_scale) =
            SpringSettingsWide::compute_springiness(&wide, 1.0 / 60.0);
        let pev = position_error_to_velocity.to_array()[0];
        let cfm = effective_mass_cfm_scale.to_array()[0];
        let softness = softness_impulse_scale.to_array()[0];
        // The bias conversion times dt never exceeds one; the scales are true fractions.
        assert!(pev > 0.0 && pev * (1.0 / 60.0) <= 1.0);
        assert!(cfm > 0.0 && cfm < 1.0);
        assert!(softness > 0.0 && softness < 1.0);
    }
}
