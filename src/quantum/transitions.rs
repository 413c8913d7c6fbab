//! Conversions between ways of describing a transition: wavenumber (cm⁻¹),
//! frequency, wavelength and photon energy.
//!
//! Frequencies are ordinary (not angular) frequencies throughout.

use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// Speed of light in vacuum (m/s).
pub const SPEED_OF_LIGHT: f64 = 299_792_458.0;
/// Planck constant (J s).
pub const PLANCK: f64 = 6.626_070_15e-34;
/// Elementary charge (C), i.e. joules per electronvolt.
pub const ELECTRON_VOLT: f64 = 1.602_176_634e-19;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WavelengthUnit {
    Nanometer,
    Micrometer,
    Angstrom,
    Meter,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrequencyUnit {
    Hz,
    KHz,
    MHz,
    GHz,
    THz,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnergyUnit {
    ElectronVolt,
    Joule,
}

/// Any supported unit, for generic conversions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unit {
    /// Inverse centimetres.
    Wavenumber,
    Wavelength(WavelengthUnit),
    Frequency(FrequencyUnit),
    Energy(EnergyUnit),
}

impl WavelengthUnit {
    /// Metres per unit.
    pub fn to_si(self) -> f64 {
        match self {
            WavelengthUnit::Nanometer => 1e-9,
            WavelengthUnit::Micrometer => 1e-6,
            WavelengthUnit::Angstrom => 1e-10,
            WavelengthUnit::Meter => 1.0,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            WavelengthUnit::Nanometer => "nm",
            WavelengthUnit::Micrometer => "um",
            WavelengthUnit::Angstrom => "angstrom",
            WavelengthUnit::Meter => "m",
        }
    }
}

impl FrequencyUnit {
    /// Hertz per unit.
    pub fn to_si(self) -> f64 {
        match self {
            FrequencyUnit::Hz => 1.0,
            FrequencyUnit::KHz => 1e3,
            FrequencyUnit::MHz => 1e6,
            FrequencyUnit::GHz => 1e9,
            FrequencyUnit::THz => 1e12,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            FrequencyUnit::Hz => "Hz",
            FrequencyUnit::KHz => "kHz",
            FrequencyUnit::MHz => "MHz",
            FrequencyUnit::GHz => "GHz",
            FrequencyUnit::THz => "THz",
        }
    }
}

impl EnergyUnit {
    /// Joules per unit.
    pub fn to_si(self) -> f64 {
        match self {
            EnergyUnit::ElectronVolt => ELECTRON_VOLT,
            EnergyUnit::Joule => 1.0,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            EnergyUnit::ElectronVolt => "eV",
            EnergyUnit::Joule => "J",
        }
    }
}

impl Unit {
    pub fn symbol(self) -> &'static str {
        match self {
            Unit::Wavenumber => "cm^-1",
            Unit::Wavelength(u) => u.symbol(),
            Unit::Frequency(u) => u.symbol(),
            Unit::Energy(u) => u.symbol(),
        }
    }
}

impl FromStr for WavelengthUnit {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "nm" => Ok(WavelengthUnit::Nanometer),
            "um" | "µm" | "micron" => Ok(WavelengthUnit::Micrometer),
            "angstrom" | "angstroms" | "Å" | "AA" => Ok(WavelengthUnit::Angstrom),
            "m" => Ok(WavelengthUnit::Meter),
            other => Err(Error::invalid(format!(
                "Wavelength unit must be one of nm, um, angstrom, m; got {other:?}."
            ))),
        }
    }
}

impl FromStr for FrequencyUnit {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "Hz" => Ok(FrequencyUnit::Hz),
            "kHz" => Ok(FrequencyUnit::KHz),
            "MHz" => Ok(FrequencyUnit::MHz),
            "GHz" => Ok(FrequencyUnit::GHz),
            "THz" => Ok(FrequencyUnit::THz),
            other => Err(Error::invalid(format!(
                "Frequency unit must be one of Hz, kHz, MHz, GHz, THz; got {other:?}."
            ))),
        }
    }
}

impl FromStr for EnergyUnit {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "eV" => Ok(EnergyUnit::ElectronVolt),
            "J" => Ok(EnergyUnit::Joule),
            other => Err(Error::invalid(format!("Energy unit must be one of eV, J; got {other:?}."))),
        }
    }
}

impl FromStr for Unit {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if matches!(s, "cm-1" | "cm^-1" | "1/cm" | "wavenumber") {
            return Ok(Unit::Wavenumber);
        }
        s.parse()
            .map(Unit::Wavelength)
            .or_else(|_| s.parse().map(Unit::Frequency))
            .or_else(|_| s.parse().map(Unit::Energy))
            .map_err(|_| {
                Error::invalid(format!(
                    "Unknown unit {s:?}; expected cm-1, a wavelength (nm, um, angstrom, m), \
                     a frequency (Hz … THz) or an energy (eV, J)."
                ))
            })
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Wavenumber (cm⁻¹) to frequency.
pub fn wavenumber_to_frequency(wavenumber: f64, f_units: FrequencyUnit) -> f64 {
    SPEED_OF_LIGHT * wavenumber * 1e2 / f_units.to_si()
}

/// Wavenumber (cm⁻¹) to vacuum wavelength.
pub fn wavenumber_to_wavelength(wavenumber: f64, wl_units: WavelengthUnit) -> f64 {
    1e-2 / wavenumber / wl_units.to_si()
}

/// Frequency to wavenumber (cm⁻¹).
pub fn frequency_to_wavenumber(freq: f64, f_units: FrequencyUnit) -> f64 {
    1e-2 * freq * f_units.to_si() / SPEED_OF_LIGHT
}

pub fn frequency_to_wavelength(freq: f64, f_units: FrequencyUnit, wl_units: WavelengthUnit) -> f64 {
    SPEED_OF_LIGHT / (freq * f_units.to_si()) / wl_units.to_si()
}

/// Photon energy `E = h f`.
pub fn frequency_to_energy(freq: f64, f_units: FrequencyUnit, e_units: EnergyUnit) -> f64 {
    PLANCK * freq * f_units.to_si() / e_units.to_si()
}

pub fn wavelength_to_frequency(wl: f64, wl_units: WavelengthUnit, f_units: FrequencyUnit) -> f64 {
    SPEED_OF_LIGHT / (wl * wl_units.to_si()) / f_units.to_si()
}

/// Photon energy `E = h c / λ`.
pub fn wavelength_to_energy(wl: f64, wl_units: WavelengthUnit, e_units: EnergyUnit) -> f64 {
    PLANCK * SPEED_OF_LIGHT / (wl * wl_units.to_si()) / e_units.to_si()
}

pub fn energy_to_frequency(energy: f64, e_units: EnergyUnit, f_units: FrequencyUnit) -> f64 {
    energy * e_units.to_si() / PLANCK / f_units.to_si()
}

/// Convert `value` between any two units, via SI frequency.
///
/// Zero is only rejected where a wavelength is involved, since `λ ∝ 1/ν`.
pub fn convert(value: f64, from: Unit, to: Unit) -> Result<f64, Error> {
    if !value.is_finite() {
        return Err(Error::invalid(format!("Cannot convert {value}.")));
    }
    let inverts = matches!(from, Unit::Wavelength(_)) || matches!(to, Unit::Wavelength(_));
    if value == 0.0 && inverts {
        return Err(Error::invalid(format!("Cannot convert 0 {from} to {to}.")));
    }
    let hz = match from {
        Unit::Wavenumber => wavenumber_to_frequency(value, FrequencyUnit::Hz),
        Unit::Wavelength(u) => wavelength_to_frequency(value, u, FrequencyUnit::Hz),
        Unit::Frequency(u) => value * u.to_si(),
        Unit::Energy(u) => energy_to_frequency(value, u, FrequencyUnit::Hz),
    };
    Ok(match to {
        Unit::Wavenumber => frequency_to_wavenumber(hz, FrequencyUnit::Hz),
        Unit::Wavelength(u) => frequency_to_wavelength(hz, FrequencyUnit::Hz, u),
        Unit::Frequency(u) => hz / u.to_si(),
        Unit::Energy(u) => frequency_to_energy(hz, FrequencyUnit::Hz, u),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    /// Ca⁺ S₁/₂ → P₁/₂ (397 nm).
    const CA_WAVENUMBER: f64 = 25_191.51;

    #[test]
    fn calcium_line() {
        let wl = wavenumber_to_wavelength(CA_WAVENUMBER, WavelengthUnit::Nanometer);
        assert_relative_eq!(wl, 396.959, epsilon = 1e-3);
        let f = wavenumber_to_frequency(CA_WAVENUMBER, FrequencyUnit::THz);
        assert_relative_eq!(f, 755.222, epsilon = 1e-3);
        let e = wavelength_to_energy(wl, WavelengthUnit::Nanometer, EnergyUnit::ElectronVolt);
        assert_relative_eq!(e, 3.1233, epsilon = 1e-4);
        assert_relative_eq!(
            frequency_to_energy(f, FrequencyUnit::THz, EnergyUnit::ElectronVolt),
            e,
            max_relative = 1e-12
        );
    }

    #[test]
    fn conversions_invert_each_other() {
        let f = 444.779_044;
        let wl = frequency_to_wavelength(f, FrequencyUnit::THz, WavelengthUnit::Micrometer);
        assert_relative_eq!(wavelength_to_frequency(wl, WavelengthUnit::Micrometer, FrequencyUnit::THz), f, max_relative = 1e-12);

        let k = frequency_to_wavenumber(f, FrequencyUnit::THz);
        assert_relative_eq!(wavenumber_to_frequency(k, FrequencyUnit::THz), f, max_relative = 1e-12);

        let e = frequency_to_energy(f, FrequencyUnit::THz, EnergyUnit::Joule);
        assert_relative_eq!(energy_to_frequency(e, EnergyUnit::Joule, FrequencyUnit::THz), f, max_relative = 1e-12);
    }

    #[test]
    fn generic_convert_matches_named_functions() {
        let nm = convert(CA_WAVENUMBER, Unit::Wavenumber, "nm".parse().unwrap()).unwrap();
        assert_relative_eq!(nm, wavenumber_to_wavelength(CA_WAVENUMBER, WavelengthUnit::Nanometer), max_relative = 1e-12);
        let back = convert(nm, Unit::Wavelength(WavelengthUnit::Nanometer), Unit::Wavenumber).unwrap();
        assert_relative_eq!(back, CA_WAVENUMBER, max_relative = 1e-12);
        let ghz = convert(1.0, "eV".parse().unwrap(), "GHz".parse().unwrap()).unwrap();
        assert_relative_eq!(ghz, 241_798.924, max_relative = 1e-8);
    }

    #[test]
    fn unknown_units_fail_to_parse() {
        assert!("furlong".parse::<Unit>().is_err());
        assert!("PHz".parse::<FrequencyUnit>().is_err());
        let err = "ly".parse::<WavelengthUnit>().unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::InvalidArgument);
        assert_eq!("cm-1".parse::<Unit>().unwrap(), Unit::Wavenumber);
        assert_eq!("angstroms".parse::<Unit>().unwrap(), Unit::Wavelength(WavelengthUnit::Angstrom));
        assert_eq!("AA".parse::<Unit>().unwrap(), Unit::Wavelength(WavelengthUnit::Angstrom));
        assert!("A".parse::<Unit>().is_err());
    }

    #[test]
    fn zero_converts_unless_a_wavelength_is_involved() {
        let thz = Unit::Frequency(FrequencyUnit::THz);
        let ev = Unit::Energy(EnergyUnit::ElectronVolt);
        let nm = Unit::Wavelength(WavelengthUnit::Nanometer);
        assert_eq!(convert(0.0, Unit::Wavenumber, thz).unwrap(), 0.0);
        assert_eq!(convert(0.0, thz, ev).unwrap(), 0.0);
        assert_eq!(convert(0.0, ev, Unit::Wavenumber).unwrap(), 0.0);
        assert!(convert(0.0, thz, nm).is_err());
        assert!(convert(0.0, nm, thz).is_err());
        assert!(convert(f64::NAN, thz, ev).is_err());
    }
}
