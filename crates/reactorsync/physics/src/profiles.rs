//! Reactor operational profiles
//!
//! Fixed physical baselines per reactor type. The profile table is static;
//! unknown types resolve to the CANDU profile, matching the registry's
//! catch-all behavior.

use reactorsync_types::ReactorType;

/// Operational baseline parameters for one reactor type.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReactorProfile {
    /// Thermal power (MW).
    pub thermal_power: f64,

    /// Base neutron flux (n/cm²/s).
    pub base_neutron_flux: f64,

    /// Base core temperature (°C).
    pub base_temperature: f64,

    /// Base primary circuit pressure (MPa).
    pub base_pressure: f64,

    /// Control rod position (0-100 %).
    pub control_rod_position: f64,

    /// Coolant flow rate (kg/s).
    pub coolant_flow_rate: f64,
}

/// CANDU-6 class heavy water reactor.
pub const CANDU: ReactorProfile = ReactorProfile {
    thermal_power: 3100.0,
    base_neutron_flux: 1.2e13,
    base_temperature: 285.0,
    base_pressure: 12.5,
    control_rod_position: 50.0,
    coolant_flow_rate: 28000.0,
};

/// Small modular reactor.
pub const SMR: ReactorProfile = ReactorProfile {
    thermal_power: 300.0,
    base_neutron_flux: 0.8e13,
    base_temperature: 295.0,
    base_pressure: 11.0,
    control_rod_position: 45.0,
    coolant_flow_rate: 8000.0,
};

/// Profile for a reactor type; unknown types fall back to CANDU.
pub fn profile_for(reactor_type: &ReactorType) -> &'static ReactorProfile {
    match reactor_type {
        ReactorType::Smr => &SMR,
        _ => &CANDU,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_types_resolve() {
        assert_eq!(profile_for(&ReactorType::Candu), &CANDU);
        assert_eq!(profile_for(&ReactorType::Smr), &SMR);
    }

    #[test]
    fn test_unknown_type_falls_back_to_candu() {
        let other = ReactorType::Other("HTGR".to_string());
        assert_eq!(profile_for(&other), &CANDU);
        assert_eq!(profile_for(&ReactorType::Pwr), &CANDU);
    }
}
