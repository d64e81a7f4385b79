//! Correlated five-channel sensor model
//!
//! Metrics are computed in a fixed dependency order because later channels
//! consume earlier results: flux drives temperature, temperature drives
//! pressure, and flux drives tritium production. The sinusoidal drift terms
//! are pure functions of the time step, so two runs with the same seed and
//! time steps produce identical readings.

use crate::profiles::ReactorProfile;
use chrono::{DateTime, Utc};
use rand::Rng;
use rand_distr::StandardNormal;
use reactorsync_types::{FactorMap, Metric, ReactorId, TelemetryReading};

/// Flux clamp ceiling as a multiple of the profile baseline.
const MAX_FLUX_RATIO: f64 = 1.3;

const TEMPERATURE_RANGE: (f64, f64) = (200.0, 400.0);
const PRESSURE_RANGE: (f64, f64) = (8.0, 18.0);
const VIBRATION_RANGE: (f64, f64) = (0.0, 15.0);
const TRITIUM_RANGE: (f64, f64) = (0.0, 2000.0);

fn gaussian(rng: &mut impl Rng, std_dev: f64) -> f64 {
    let z: f64 = rng.sample(StandardNormal);
    z * std_dev
}

/// Neutron flux (n/cm²/s) for one time step.
///
/// Base flux scaled by the rod-withdrawal fraction, with slow sinusoidal
/// drift and 2 % Gaussian noise. Clamped to [0, 1.3 x base]; the core cannot
/// exceed its critical flux regardless of the injected factor.
pub fn generate_neutron_flux(
    profile: &ReactorProfile,
    time_step: u64,
    factor: f64,
    rng: &mut impl Rng,
) -> f64 {
    let t = time_step as f64;
    let rod_influence = (100.0 - profile.control_rod_position) / 100.0;

    let time_variation = 0.05 * (t * 0.1).sin() + 0.02 * (t * 0.03).sin();
    let noise = gaussian(rng, 0.02);

    let flux = profile.base_neutron_flux * rod_influence * (1.0 + time_variation + noise) * factor;

    flux.clamp(0.0, profile.base_neutron_flux * MAX_FLUX_RATIO)
}

/// Core temperature (°C), correlated with neutron flux via fission heating.
///
/// Seasonal coolant-inlet term plus a flux-proportional rise, a thermal-lag
/// sinusoid, and thermal noise. Clamped to [200, 400].
pub fn generate_core_temperature(
    profile: &ReactorProfile,
    neutron_flux: f64,
    time_step: u64,
    factor: f64,
    rng: &mut impl Rng,
) -> f64 {
    let t = time_step as f64;
    let flux_ratio = neutron_flux / profile.base_neutron_flux;
    let base_temp_rise = 25.0 * flux_ratio;

    let coolant_temp = 260.0 + 5.0 * (t * 0.001).sin();
    let thermal_lag = 0.1 * (t * 0.05).sin();
    let thermal_noise = gaussian(rng, 2.0);

    let core_temp = (coolant_temp + base_temp_rise + thermal_lag + thermal_noise) * factor;

    core_temp.clamp(TEMPERATURE_RANGE.0, TEMPERATURE_RANGE.1)
}

/// Primary circuit pressure (MPa), correlated with core temperature.
///
/// Base pressure plus a temperature-ratio-driven rise and a pump-cycle
/// sinusoid. Clamped to [8, 18], the relief valve band.
pub fn generate_pressure(
    profile: &ReactorProfile,
    temperature: f64,
    time_step: u64,
    factor: f64,
    rng: &mut impl Rng,
) -> f64 {
    let t = time_step as f64;
    let temp_ratio = temperature / profile.base_temperature;
    let pressure_rise = profile.base_pressure * 0.1 * (temp_ratio - 1.0);

    let pump_cycle = 0.5 * (t * 0.2).sin();
    let pressure_noise = gaussian(rng, 0.2);

    let pressure = (profile.base_pressure + pressure_rise + pump_cycle + pressure_noise) * factor;

    pressure.clamp(PRESSURE_RANGE.0, PRESSURE_RANGE.1)
}

/// Mechanical vibration (mm/s) from pumps and turbines.
///
/// Power-scaled base level plus pump and turbine harmonics. Clamped to
/// [0, 15]; sustained readings above that band would trip a shutdown.
pub fn generate_vibration(
    profile: &ReactorProfile,
    time_step: u64,
    factor: f64,
    rng: &mut impl Rng,
) -> f64 {
    let t = time_step as f64;
    let base_vibration = 1.8 + 0.3 * (profile.thermal_power / 3100.0);

    let pump_vibration = 0.3 * (t * 0.8).sin();
    let turbine_vibration = 0.2 * (t * 1.2).sin();
    let mechanical_noise = gaussian(rng, 0.1);

    let vibration =
        (base_vibration + pump_vibration + turbine_vibration + mechanical_noise) * factor;

    vibration.clamp(VIBRATION_RANGE.0, VIBRATION_RANGE.1)
}

/// Tritium level (pCi/L) from neutron activation of heavy water.
///
/// Production proportional to flux, minus a purification-cycle sinusoid.
/// Clamped to [0, 2000], the instrument's measurement range.
pub fn generate_tritium_level(
    profile: &ReactorProfile,
    neutron_flux: f64,
    time_step: u64,
    factor: f64,
    rng: &mut impl Rng,
) -> f64 {
    let t = time_step as f64;
    let flux_ratio = neutron_flux / profile.base_neutron_flux;
    let base_tritium = 450.0 * flux_ratio;

    let purification_cycle = -50.0 * (t * 0.05).sin();
    let tritium_noise = gaussian(rng, 25.0);

    let tritium = (base_tritium + purification_cycle + tritium_noise) * factor;

    tritium.clamp(TRITIUM_RANGE.0, TRITIUM_RANGE.1)
}

/// Generate a complete reading for one reactor at one time step.
///
/// Channels are computed in dependency order so the joint distribution is
/// physically plausible rather than five independent samples. `factors`
/// carries the active anomaly multipliers; absent channels read as 1.0.
pub fn generate_reading(
    profile: &ReactorProfile,
    reactor_id: ReactorId,
    timestamp: DateTime<Utc>,
    time_step: u64,
    factors: &FactorMap,
    rng: &mut impl Rng,
) -> TelemetryReading {
    let neutron_flux =
        generate_neutron_flux(profile, time_step, factors.factor(Metric::NeutronFlux), rng);

    let core_temperature = generate_core_temperature(
        profile,
        neutron_flux,
        time_step,
        factors.factor(Metric::CoreTemperature),
        rng,
    );

    let pressure = generate_pressure(
        profile,
        core_temperature,
        time_step,
        factors.factor(Metric::Pressure),
        rng,
    );

    let vibration = generate_vibration(profile, time_step, factors.factor(Metric::Vibration), rng);

    let tritium_level = generate_tritium_level(
        profile,
        neutron_flux,
        time_step,
        factors.factor(Metric::TritiumLevel),
        rng,
    );

    TelemetryReading {
        reactor_id,
        timestamp,
        neutron_flux,
        core_temperature,
        pressure,
        vibration,
        tritium_level,
    }
}
