//! Motion settings and operating modes
//!
//! Thresholds for the DMP classifier and the wake-on-motion hardware
//! configuration, with their persisted key names. Values missing from the
//! store silently fall back to the compiled defaults in
//! [`crate::constants`].

use crate::constants::thresholds::{
    DEFAULT_ACCEL_X_G, DEFAULT_ACCEL_Y_G, DEFAULT_ACCEL_Z_G, DEFAULT_PITCH_DEG, DEFAULT_ROLL_DEG,
    DEFAULT_WOM_THRESHOLD_MG, DEFAULT_YAW_DEG, MAX_WOM_THRESHOLD_MG,
};
use crate::errors::{MotionError, MotionResult};
use crate::traits::SettingsStore;

/// Settings namespace in the persisted store
pub const NAMESPACE: &str = "imu";

/// Persisted key names
pub mod keys {
    pub const ACCEL_X: &str = "M_TH_GX";
    pub const ACCEL_Y: &str = "M_TH_GY";
    pub const ACCEL_Z: &str = "M_TH_GZ";
    pub const ROLL: &str = "M_TH_ROLL";
    pub const PITCH: &str = "M_TH_PITCH";
    pub const YAW: &str = "M_TH_YAW";
    pub const WOM_THRESHOLD: &str = "WOM_THR";
    pub const WOM_LPF: &str = "WOM_LPF";
    pub const WOM_RATE: &str = "WOM_RATE";
    pub const ACCEL_COMPARE: &str = "ACC_COMR";
}

/// One persisted key and its typed value
#[derive(Debug, Clone, Copy, PartialEq)]
enum Entry {
    F32(&'static str, f32),
    U32(&'static str, u32),
    Bool(&'static str, bool),
}

impl Entry {
    fn put<S: SettingsStore>(&self, store: &mut S) -> Result<(), S::Error> {
        match *self {
            Self::F32(key, v) => store.put_f32(NAMESPACE, key, v),
            Self::U32(key, v) => store.put_u32(NAMESPACE, key, v),
            Self::Bool(key, v) => store.put_bool(NAMESPACE, key, v),
        }
    }
}

/// Write entries that changed; on failure restore the ones already written
///
/// Restoring is best effort: a store that rejects every write cannot be
/// rolled back, and the original error is what gets reported.
fn save_changed<S: SettingsStore>(
    next: &[Entry],
    previous: &[Entry],
    store: &mut S,
) -> Result<(), S::Error> {
    for (i, (n, p)) in next.iter().zip(previous).enumerate() {
        if n == p {
            continue;
        }
        if let Err(e) = n.put(store) {
            for (written, old) in next[..i].iter().zip(&previous[..i]) {
                if written != old {
                    let _ = old.put(store);
                }
            }
            return Err(e);
        }
    }
    Ok(())
}

/// Per-axis delta thresholds for the DMP classifier
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MotionThresholds {
    /// World-frame X acceleration delta (g)
    pub accel_x: f32,
    /// World-frame Y acceleration delta (g)
    pub accel_y: f32,
    /// World-frame Z acceleration delta (g)
    pub accel_z: f32,
    /// Roll delta (degrees)
    pub roll: f32,
    /// Pitch delta (degrees)
    pub pitch: f32,
    /// Yaw delta (degrees)
    pub yaw: f32,
}

impl Default for MotionThresholds {
    fn default() -> Self {
        Self {
            accel_x: DEFAULT_ACCEL_X_G,
            accel_y: DEFAULT_ACCEL_Y_G,
            accel_z: DEFAULT_ACCEL_Z_G,
            roll: DEFAULT_ROLL_DEG,
            pitch: DEFAULT_PITCH_DEG,
            yaw: DEFAULT_YAW_DEG,
        }
    }
}

impl MotionThresholds {
    /// Load from the store, defaulting any missing key
    pub fn load<S: SettingsStore>(store: &S) -> Self {
        let d = Self::default();
        let get = |key, default| store.get_f32(NAMESPACE, key).unwrap_or(default);
        Self {
            accel_x: get(keys::ACCEL_X, d.accel_x),
            accel_y: get(keys::ACCEL_Y, d.accel_y),
            accel_z: get(keys::ACCEL_Z, d.accel_z),
            roll: get(keys::ROLL, d.roll),
            pitch: get(keys::PITCH, d.pitch),
            yaw: get(keys::YAW, d.yaw),
        }
    }

    /// Persist every threshold
    pub fn save<S: SettingsStore>(&self, store: &mut S) -> Result<(), S::Error> {
        self.entries().iter().try_for_each(|e| e.put(store))
    }

    /// Persist only the thresholds that differ from `previous`
    ///
    /// If a write fails, keys already written are put back to `previous`
    /// so the store never holds a half-applied update.
    pub fn save_changes<S: SettingsStore>(&self, previous: &Self, store: &mut S) -> Result<(), S::Error> {
        save_changed(&self.entries(), &previous.entries(), store)
    }

    fn entries(&self) -> [Entry; 6] {
        [
            Entry::F32(keys::ACCEL_X, self.accel_x),
            Entry::F32(keys::ACCEL_Y, self.accel_y),
            Entry::F32(keys::ACCEL_Z, self.accel_z),
            Entry::F32(keys::ROLL, self.roll),
            Entry::F32(keys::PITCH, self.pitch),
            Entry::F32(keys::YAW, self.yaw),
        ]
    }

    /// Reject negative or non-finite thresholds
    pub fn validate(&self) -> MotionResult<()> {
        let fields = [
            (self.accel_x, keys::ACCEL_X),
            (self.accel_y, keys::ACCEL_Y),
            (self.accel_z, keys::ACCEL_Z),
            (self.roll, keys::ROLL),
            (self.pitch, keys::PITCH),
            (self.yaw, keys::YAW),
        ];
        for (value, key) in fields {
            if !value.is_finite() || value < 0.0 {
                return Err(MotionError::InvalidSetting { key });
            }
        }
        Ok(())
    }
}

/// Accelerometer low-pass filter setting used in low-power mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "u32", into = "u32"))]
#[repr(u8)]
pub enum LowPassFilter {
    Lpf0 = 0,
    Lpf1 = 1,
    Lpf2 = 2,
    Lpf3 = 3,
    Lpf4 = 4,
    Lpf5 = 5,
    Lpf6 = 6,
    Lpf7 = 7,
}

impl LowPassFilter {
    /// Nominal 3 dB bandwidth (Hz)
    pub const fn bandwidth_hz(&self) -> f32 {
        match self {
            Self::Lpf0 => 218.1,
            Self::Lpf1 => 218.1,
            Self::Lpf2 => 99.0,
            Self::Lpf3 => 44.8,
            Self::Lpf4 => 21.2,
            Self::Lpf5 => 10.2,
            Self::Lpf6 => 5.05,
            Self::Lpf7 => 420.0,
        }
    }
}

impl TryFrom<u32> for LowPassFilter {
    type Error = MotionError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Ok(match value {
            0 => Self::Lpf0,
            1 => Self::Lpf1,
            2 => Self::Lpf2,
            3 => Self::Lpf3,
            4 => Self::Lpf4,
            5 => Self::Lpf5,
            6 => Self::Lpf6,
            7 => Self::Lpf7,
            _ => return Err(MotionError::InvalidSetting { key: keys::WOM_LPF }),
        })
    }
}

impl From<LowPassFilter> for u32 {
    fn from(value: LowPassFilter) -> Self {
        value as u32
    }
}

/// Accelerometer output rate in low-power mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "u32", into = "u32"))]
#[repr(u8)]
pub enum WomOutputRate {
    Hz0p24 = 0,
    Hz0p49 = 1,
    Hz0p98 = 2,
    Hz1p95 = 3,
    Hz3p91 = 4,
    Hz7p81 = 5,
    Hz15p63 = 6,
    Hz31p25 = 7,
    Hz62p5 = 8,
    Hz125 = 9,
    Hz250 = 10,
    Hz500 = 11,
}

impl WomOutputRate {
    /// Output rate (Hz)
    pub const fn hz(&self) -> f32 {
        match self {
            Self::Hz0p24 => 0.24,
            Self::Hz0p49 => 0.49,
            Self::Hz0p98 => 0.98,
            Self::Hz1p95 => 1.95,
            Self::Hz3p91 => 3.91,
            Self::Hz7p81 => 7.81,
            Self::Hz15p63 => 15.63,
            Self::Hz31p25 => 31.25,
            Self::Hz62p5 => 62.5,
            Self::Hz125 => 125.0,
            Self::Hz250 => 250.0,
            Self::Hz500 => 500.0,
        }
    }
}

impl TryFrom<u32> for WomOutputRate {
    type Error = MotionError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Ok(match value {
            0 => Self::Hz0p24,
            1 => Self::Hz0p49,
            2 => Self::Hz0p98,
            3 => Self::Hz1p95,
            4 => Self::Hz3p91,
            5 => Self::Hz7p81,
            6 => Self::Hz15p63,
            7 => Self::Hz31p25,
            8 => Self::Hz62p5,
            9 => Self::Hz125,
            10 => Self::Hz250,
            11 => Self::Hz500,
            _ => return Err(MotionError::InvalidSetting { key: keys::WOM_RATE }),
        })
    }
}

impl From<WomOutputRate> for u32 {
    fn from(value: WomOutputRate) -> Self {
        value as u32
    }
}

/// Wake-on-motion hardware configuration
///
/// Serialised with the maintenance UI's key names.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WomConfig {
    /// Detection threshold (mg)
    #[cfg_attr(feature = "serde", serde(rename = "WOM_THR"))]
    pub threshold_mg: f32,
    /// Accelerometer low-pass filter
    #[cfg_attr(feature = "serde", serde(rename = "WOM_LPF"))]
    pub lpf: LowPassFilter,
    /// Low-power output rate
    #[cfg_attr(feature = "serde", serde(rename = "WOM_RATE"))]
    pub rate: WomOutputRate,
    /// Compare against the previous sample instead of the first one
    #[cfg_attr(feature = "serde", serde(rename = "ACC_COMR"))]
    pub accel_compare: bool,
}

impl Default for WomConfig {
    fn default() -> Self {
        Self {
            threshold_mg: DEFAULT_WOM_THRESHOLD_MG,
            lpf: LowPassFilter::Lpf1,
            rate: WomOutputRate::Hz3p91,
            accel_compare: true,
        }
    }
}

impl WomConfig {
    /// Load from the store; missing or out-of-range values fall back to defaults
    pub fn load<S: SettingsStore>(store: &S) -> Self {
        let d = Self::default();
        Self {
            threshold_mg: store
                .get_f32(NAMESPACE, keys::WOM_THRESHOLD)
                .unwrap_or(d.threshold_mg),
            lpf: store
                .get_u32(NAMESPACE, keys::WOM_LPF)
                .and_then(|v| LowPassFilter::try_from(v).ok())
                .unwrap_or(d.lpf),
            rate: store
                .get_u32(NAMESPACE, keys::WOM_RATE)
                .and_then(|v| WomOutputRate::try_from(v).ok())
                .unwrap_or(d.rate),
            accel_compare: store
                .get_bool(NAMESPACE, keys::ACCEL_COMPARE)
                .unwrap_or(d.accel_compare),
        }
    }

    /// Persist every field
    pub fn save<S: SettingsStore>(&self, store: &mut S) -> Result<(), S::Error> {
        self.entries().iter().try_for_each(|e| e.put(store))
    }

    /// Persist only the fields that differ from `previous`, rolling back on failure
    pub fn save_changes<S: SettingsStore>(&self, previous: &Self, store: &mut S) -> Result<(), S::Error> {
        save_changed(&self.entries(), &previous.entries(), store)
    }

    fn entries(&self) -> [Entry; 4] {
        [
            Entry::F32(keys::WOM_THRESHOLD, self.threshold_mg),
            Entry::U32(keys::WOM_LPF, self.lpf.into()),
            Entry::U32(keys::WOM_RATE, self.rate.into()),
            Entry::Bool(keys::ACCEL_COMPARE, self.accel_compare),
        ]
    }

    /// Threshold must be finite and within what the register can hold
    pub fn validate_threshold(threshold_mg: f32) -> MotionResult<f32> {
        if threshold_mg.is_finite() && (0.0..=MAX_WOM_THRESHOLD_MG).contains(&threshold_mg) {
            Ok(threshold_mg)
        } else {
            Err(MotionError::InvalidSetting { key: keys::WOM_THRESHOLD })
        }
    }

    /// Apply a partial update; fields with invalid values are skipped
    ///
    /// Returns true when anything changed.
    pub fn apply(&mut self, patch: &WomPatch) -> bool {
        let before = *self;
        if let Some(t) = patch.threshold_mg.and_then(|t| Self::validate_threshold(t).ok()) {
            self.threshold_mg = t;
        }
        if let Some(lpf) = patch.lpf.and_then(|v| LowPassFilter::try_from(v).ok()) {
            self.lpf = lpf;
        }
        if let Some(rate) = patch.rate.and_then(|v| WomOutputRate::try_from(v).ok()) {
            self.rate = rate;
        }
        if let Some(cmp) = patch.accel_compare {
            self.accel_compare = cmp;
        }
        *self != before
    }
}

/// Partial wake-on-motion update as posted by the maintenance UI
///
/// Enum fields stay raw so an out-of-range value drops only that field.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WomPatch {
    #[cfg_attr(feature = "serde", serde(rename = "WOM_THR", default))]
    pub threshold_mg: Option<f32>,
    #[cfg_attr(feature = "serde", serde(rename = "WOM_LPF", default))]
    pub lpf: Option<u32>,
    #[cfg_attr(feature = "serde", serde(rename = "WOM_RATE", default))]
    pub rate: Option<u32>,
    #[cfg_attr(feature = "serde", serde(rename = "ACC_COMR", default))]
    pub accel_compare: Option<bool>,
}

/// DMP-mode driver parameters
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DmpConfig {
    /// Motion interrupt threshold armed alongside the DMP (mg)
    pub wom_threshold_mg: f32,
}

/// Operating mode of the motion sensor
///
/// DMP and WOM are alternative hardware configurations; their parameters
/// only exist inside their own variant.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum ImuMode {
    /// Sensor not initialised
    #[default]
    Off,
    /// Continuous fused-data streaming, classified against the baseline
    Dmp(DmpConfig),
    /// Low-power hardware threshold interrupt only
    Wom(WomConfig),
}

impl ImuMode {
    pub const fn kind(&self) -> Option<ModeRequest> {
        match self {
            Self::Off => None,
            Self::Dmp(_) => Some(ModeRequest::Dmp),
            Self::Wom(_) => Some(ModeRequest::Wom),
        }
    }

    pub const fn is_off(&self) -> bool {
        matches!(self, Self::Off)
    }
}

/// Mode requested by the caller at setup or restart
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ModeRequest {
    Dmp,
    Wom,
}

/// Everything persisted for the motion engine
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ImuSettings {
    pub thresholds: MotionThresholds,
    pub wom: WomConfig,
}

impl ImuSettings {
    pub fn load<S: SettingsStore>(store: &S) -> Self {
        Self {
            thresholds: MotionThresholds::load(store),
            wom: WomConfig::load(store),
        }
    }

    pub fn save<S: SettingsStore>(&self, store: &mut S) -> Result<(), S::Error> {
        self.thresholds.save(store)?;
        self.wom.save(store)
    }

    /// Resolve a mode request into a configured mode
    pub fn mode_for(&self, request: ModeRequest) -> ImuMode {
        match request {
            ModeRequest::Dmp => ImuMode::Dmp(DmpConfig {
                wom_threshold_mg: self.wom.threshold_mg,
            }),
            ModeRequest::Wom => ImuMode::Wom(self.wom),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[derive(Default)]
    struct MapStore {
        f: HashMap<String, f32>,
        b: HashMap<String, bool>,
        u: HashMap<String, u32>,
        reject: Option<&'static str>,
    }

    impl MapStore {
        fn check(&self, k: &str) -> Result<(), ()> {
            if self.reject == Some(k) {
                return Err(());
            }
            Ok(())
        }
    }

    fn key(ns: &str, k: &str) -> String {
        format!("{}/{}", ns, k)
    }

    impl SettingsStore for MapStore {
        type Error = ();

        fn get_f32(&self, ns: &str, k: &str) -> Option<f32> {
            self.f.get(&key(ns, k)).copied()
        }
        fn put_f32(&mut self, ns: &str, k: &str, v: f32) -> Result<(), ()> {
            self.check(k)?;
            self.f.insert(key(ns, k), v);
            Ok(())
        }
        fn get_bool(&self, ns: &str, k: &str) -> Option<bool> {
            self.b.get(&key(ns, k)).copied()
        }
        fn put_bool(&mut self, ns: &str, k: &str, v: bool) -> Result<(), ()> {
            self.check(k)?;
            self.b.insert(key(ns, k), v);
            Ok(())
        }
        fn get_u32(&self, ns: &str, k: &str) -> Option<u32> {
            self.u.get(&key(ns, k)).copied()
        }
        fn put_u32(&mut self, ns: &str, k: &str, v: u32) -> Result<(), ()> {
            self.check(k)?;
            self.u.insert(key(ns, k), v);
            Ok(())
        }
    }

    #[test]
    fn empty_store_gives_defaults() {
        let settings = ImuSettings::load(&MapStore::default());
        assert_eq!(settings, ImuSettings::default());
        assert_eq!(settings.thresholds.accel_z, 0.0085);
        assert_eq!(settings.wom.rate, WomOutputRate::Hz3p91);
        assert_eq!(settings.wom.rate.hz(), 3.91);
        assert_eq!(settings.wom.lpf.bandwidth_hz(), 218.1);
    }

    #[test]
    fn save_then_load() {
        let mut store = MapStore::default();
        let mut settings = ImuSettings::default();
        settings.thresholds.roll = 2.0;
        settings.wom.lpf = LowPassFilter::Lpf5;
        settings.wom.accel_compare = false;
        settings.save(&mut store).unwrap();

        assert_eq!(store.get_f32("imu", "M_TH_ROLL"), Some(2.0));
        assert_eq!(store.get_u32("imu", "WOM_LPF"), Some(5));
        assert_eq!(ImuSettings::load(&store), settings);
    }

    #[test]
    fn save_changes_writes_only_changed_keys() {
        let mut store = MapStore::default();
        let previous = WomConfig::default();
        let next = WomConfig { rate: WomOutputRate::Hz7p81, ..previous };
        next.save_changes(&previous, &mut store).unwrap();

        assert_eq!(store.get_u32("imu", "WOM_RATE"), Some(5));
        assert_eq!(store.get_f32("imu", "WOM_THR"), None);
        assert_eq!(store.get_u32("imu", "WOM_LPF"), None);
        assert_eq!(store.get_bool("imu", "ACC_COMR"), None);
    }

    #[test]
    fn failed_save_restores_written_keys() {
        let mut store = MapStore::default();
        let previous = MotionThresholds::default();
        previous.save(&mut store).unwrap();

        // Accel keys are written before roll; roll is rejected
        store.reject = Some(keys::ROLL);
        let next = MotionThresholds { accel_x: 0.5, accel_y: 0.6, roll: 4.0, yaw: 9.0, ..previous };
        assert!(next.save_changes(&previous, &mut store).is_err());

        assert_eq!(store.get_f32("imu", "M_TH_GX"), Some(previous.accel_x));
        assert_eq!(store.get_f32("imu", "M_TH_GY"), Some(previous.accel_y));
        assert_eq!(store.get_f32("imu", "M_TH_ROLL"), Some(previous.roll));
        assert_eq!(store.get_f32("imu", "M_TH_YAW"), Some(previous.yaw));
        assert_eq!(MotionThresholds::load(&store), previous);
    }

    #[test]
    fn out_of_range_enum_falls_back() {
        let mut store = MapStore::default();
        store.put_u32("imu", "WOM_RATE", 99).unwrap();
        assert_eq!(WomConfig::load(&store).rate, WomOutputRate::Hz3p91);
    }

    #[test]
    fn patch_skips_invalid_fields() {
        let mut wom = WomConfig::default();
        let changed = wom.apply(&WomPatch {
            threshold_mg: Some(40.0),
            lpf: Some(9),
            rate: Some(11),
            accel_compare: None,
        });
        assert!(changed);
        assert_eq!(wom.threshold_mg, 40.0);
        assert_eq!(wom.lpf, LowPassFilter::Lpf1);
        assert_eq!(wom.rate, WomOutputRate::Hz500);
        assert!(!wom.apply(&WomPatch::default()));
    }

    #[test]
    fn wom_json_uses_ui_keys() {
        let json = serde_json::to_value(WomConfig::default()).unwrap();
        assert_eq!(json["WOM_LPF"], 1);
        assert_eq!(json["WOM_RATE"], 4);
        assert_eq!(json["ACC_COMR"], true);

        let patch: WomPatch = serde_json::from_str(r#"{"WOM_THR": 22.5}"#).unwrap();
        assert_eq!(patch.threshold_mg, Some(22.5));
        assert_eq!(patch.lpf, None);
    }

    #[test]
    fn thresholds_validation() {
        assert!(MotionThresholds::default().validate().is_ok());
        let bad = MotionThresholds { yaw: f32::NAN, ..MotionThresholds::default() };
        assert_eq!(bad.validate(), Err(MotionError::InvalidSetting { key: keys::YAW }));
        assert!(WomConfig::validate_threshold(-1.0).is_err());
    }

    #[test]
    fn mode_for_request() {
        let settings = ImuSettings::default();
        assert_eq!(
            settings.mode_for(ModeRequest::Dmp),
            ImuMode::Dmp(DmpConfig { wom_threshold_mg: 15.0 })
        );
        assert_eq!(settings.mode_for(ModeRequest::Wom).kind(), Some(ModeRequest::Wom));
        assert!(ImuMode::default().is_off());
    }
}
