//! Battery readings from the kernel power-supply class

use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, warn};

use crate::models::battery::{BatteryReading, BatteryStatus};

const POWER_SUPPLY_ROOT: &str = "/sys/class/power_supply";

/// Reads one power-supply sysfs directory. Attribute read failures degrade
/// to the unknown reading rather than erroring; the next frame retries.
pub struct PowerSupply {
    dir: PathBuf,
}

impl PowerSupply {
    pub fn new(dir: PathBuf) -> PowerSupply {
        PowerSupply { dir }
    }

    /// Supply named in the configuration, or the first battery-type supply
    /// found under `/sys/class/power_supply`.
    pub fn discover(name: Option<&str>) -> Option<PowerSupply> {
        Self::discover_in(Path::new(POWER_SUPPLY_ROOT), name)
    }

    fn discover_in(root: &Path, name: Option<&str>) -> Option<PowerSupply> {
        if let Some(name) = name {
            let dir = root.join(name);
            if dir.is_dir() {
                return Some(PowerSupply::new(dir));
            }
            warn!("Power supply {} not found under {}", name, root.display());
            return None;
        }

        let entries = match fs::read_dir(root) {
            Ok(entries) => entries,
            Err(e) => {
                warn!("Could not enumerate {}: {}", root.display(), e);
                return None;
            }
        };

        for entry in entries.flatten() {
            let dir = entry.path();
            let kind = fs::read_to_string(dir.join("type")).unwrap_or_default();
            if kind.trim() == "Battery" {
                debug!("Using power supply {}", dir.display());
                return Some(PowerSupply::new(dir));
            }
        }
        None
    }

    pub fn read(&self) -> BatteryReading {
        BatteryReading {
            status: BatteryStatus::from_sysfs(&self.attribute("status").unwrap_or_default()),
            level: self.numeric_attribute("capacity").unwrap_or(-1),
            temp_deci: self.numeric_attribute("temp").unwrap_or(0),
        }
    }

    fn attribute(&self, name: &str) -> Option<String> {
        fs::read_to_string(self.dir.join(name)).ok()
    }

    fn numeric_attribute(&self, name: &str) -> Option<i32> {
        self.attribute(name)?.trim().parse().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::sync::atomic::{AtomicUsize, Ordering};

    static DIR_SEQ: AtomicUsize = AtomicUsize::new(0);

    fn scratch_supply(contents: &[(&str, &str)]) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "charger-splash-test-{}-{}",
            std::process::id(),
            DIR_SEQ.fetch_add(1, Ordering::Relaxed)
        ));
        fs::create_dir_all(&dir).unwrap();
        for (name, value) in contents {
            fs::write(dir.join(name), value).unwrap();
        }
        dir
    }

    #[test]
    fn reads_a_complete_supply() {
        let dir = scratch_supply(&[("status", "Charging\n"), ("capacity", "57\n"), ("temp", "253\n")]);
        let reading = PowerSupply::new(dir.clone()).read();
        assert_eq!(reading.status, BatteryStatus::Charging);
        assert_eq!(reading.level, 57);
        assert_eq!(reading.temp_deci, 253);
        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn missing_attributes_degrade_to_unknown() {
        let dir = scratch_supply(&[("status", "Charging\n")]);
        let reading = PowerSupply::new(dir.clone()).read();
        assert_eq!(reading.status, BatteryStatus::Charging);
        assert_eq!(reading.level, -1);
        assert_eq!(reading.temp_deci, 0);
        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn discovers_battery_type_supplies() {
        let root = scratch_supply(&[]);
        let ac = root.join("AC");
        let batt = root.join("BAT0");
        fs::create_dir_all(&ac).unwrap();
        fs::create_dir_all(&batt).unwrap();
        fs::write(ac.join("type"), "Mains\n").unwrap();
        fs::write(batt.join("type"), "Battery\n").unwrap();

        let supply = PowerSupply::discover_in(&root, None).unwrap();
        assert_eq!(supply.dir, batt);

        let named = PowerSupply::discover_in(&root, Some("AC")).unwrap();
        assert_eq!(named.dir, ac);

        assert!(PowerSupply::discover_in(&root, Some("BAT9")).is_none());
        let _ = fs::remove_dir_all(root);
    }
}
