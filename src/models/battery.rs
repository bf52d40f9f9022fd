//! Battery state as reported by the kernel power-supply class

/// Charging status, mirroring the sysfs `status` attribute values.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum BatteryStatus {
    #[default]
    Unknown,
    Charging,
    Discharging,
    NotCharging,
    Full,
}

impl BatteryStatus {
    pub fn from_sysfs(value: &str) -> BatteryStatus {
        match value.trim() {
            "Charging" => BatteryStatus::Charging,
            "Discharging" => BatteryStatus::Discharging,
            "Not charging" => BatteryStatus::NotCharging,
            "Full" => BatteryStatus::Full,
            _ => BatteryStatus::Unknown,
        }
    }
}

/// One reading of the battery, level in percent (negative when unknown),
/// temperature in tenths of a degree Celsius.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BatteryReading {
    pub status: BatteryStatus,
    pub level: i32,
    pub temp_deci: i32,
}

impl Default for BatteryReading {
    fn default() -> Self {
        BatteryReading {
            status: BatteryStatus::Unknown,
            level: -1,
            temp_deci: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_sysfs_status_strings() {
        assert_eq!(BatteryStatus::from_sysfs("Charging\n"), BatteryStatus::Charging);
        assert_eq!(BatteryStatus::from_sysfs("Discharging"), BatteryStatus::Discharging);
        assert_eq!(BatteryStatus::from_sysfs("Not charging"), BatteryStatus::NotCharging);
        assert_eq!(BatteryStatus::from_sysfs("Full"), BatteryStatus::Full);
        assert_eq!(BatteryStatus::from_sysfs("Fast charging"), BatteryStatus::Unknown);
        assert_eq!(BatteryStatus::from_sysfs(""), BatteryStatus::Unknown);
    }

    #[test]
    fn default_reading_signals_unknown_level() {
        let reading = BatteryReading::default();
        assert_eq!(reading.status, BatteryStatus::Unknown);
        assert!(reading.level < 0);
    }
}
