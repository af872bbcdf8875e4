use relframe_error::{RelError, Result};
use serde::{Deserialize, Serialize};

/// Configuration for executing collections.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutionConfig {
    /// Number of partitions to split flat row inputs into.
    ///
    /// Partitioning determines parallelism when collecting results.
    pub target_partitions: usize,
    /// If `collect` and `count` drive partitions on the rayon pool. When
    /// false, partitions are drained one after another on the calling thread.
    pub enable_parallel_collect: bool,
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        ExecutionConfig {
            target_partitions: num_cpus::get().max(1),
            enable_parallel_collect: true,
        }
    }
}

impl ExecutionConfig {
    /// Parse a config from json, missing keys take their defaults.
    pub fn from_json(s: &str) -> Result<Self> {
        let conf: ExecutionConfig = serde_json::from_str(s)?;
        conf.validate()?;
        Ok(conf)
    }

    pub fn validate(&self) -> Result<()> {
        if self.target_partitions == 0 {
            return Err(RelError::Config(
                "target_partitions must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    pub fn set_setting(&mut self, name: &str, value: &str) -> Result<()> {
        let func = find_setting(name)?;
        (func.set)(value, self)
    }

    pub fn get_setting(&self, name: &str) -> Result<String> {
        let func = find_setting(name)?;
        Ok((func.get)(self))
    }

    /// Reset a single setting to its default.
    pub fn reset_setting(&mut self, name: &str) -> Result<()> {
        let func = find_setting(name)?;
        let def = (func.get)(&ExecutionConfig::default());
        (func.set)(&def, self)
    }
}

struct SettingFunctions {
    name: &'static str,
    set: fn(value: &str, conf: &mut ExecutionConfig) -> Result<()>,
    get: fn(conf: &ExecutionConfig) -> String,
}

trait ExecutionSetting {
    const NAME: &'static str;

    fn set_from_str(value: &str, conf: &mut ExecutionConfig) -> Result<()>;
    fn get_as_string(conf: &ExecutionConfig) -> String;
}

impl SettingFunctions {
    const fn new<S: ExecutionSetting>() -> Self {
        SettingFunctions {
            name: S::NAME,
            set: S::set_from_str as _,
            get: S::get_as_string as _,
        }
    }
}

const SETTINGS: &[SettingFunctions] = &[
    SettingFunctions::new::<TargetPartitions>(),
    SettingFunctions::new::<EnableParallelCollect>(),
];

fn find_setting(name: &str) -> Result<&'static SettingFunctions> {
    SETTINGS
        .iter()
        .find(|s| s.name == name)
        .ok_or_else(|| RelError::Config(format!("Missing setting for '{name}'")))
}

struct TargetPartitions;

impl ExecutionSetting for TargetPartitions {
    const NAME: &'static str = "target_partitions";

    fn set_from_str(value: &str, conf: &mut ExecutionConfig) -> Result<()> {
        let partitions: usize = value
            .parse()
            .map_err(|_| RelError::Config(format!("Invalid value for '{}': {value}", Self::NAME)))?;
        if partitions == 0 {
            return Err(RelError::Config(format!("'{}' must be at least 1", Self::NAME)));
        }
        conf.target_partitions = partitions;
        Ok(())
    }

    fn get_as_string(conf: &ExecutionConfig) -> String {
        conf.target_partitions.to_string()
    }
}

struct EnableParallelCollect;

impl ExecutionSetting for EnableParallelCollect {
    const NAME: &'static str = "enable_parallel_collect";

    fn set_from_str(value: &str, conf: &mut ExecutionConfig) -> Result<()> {
        conf.enable_parallel_collect = value
            .parse()
            .map_err(|_| RelError::Config(format!("Invalid value for '{}': {value}", Self::NAME)))?;
        Ok(())
    }

    fn get_as_string(conf: &ExecutionConfig) -> String {
        conf.enable_parallel_collect.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_and_get() {
        let mut conf = ExecutionConfig::default();
        conf.set_setting("target_partitions", "3").unwrap();
        assert_eq!(3, conf.target_partitions);
        assert_eq!("3", conf.get_setting("target_partitions").unwrap());

        conf.set_setting("enable_parallel_collect", "false").unwrap();
        assert!(!conf.enable_parallel_collect);
    }

    #[test]
    fn invalid_settings() {
        let mut conf = ExecutionConfig::default();
        assert!(conf.set_setting("target_partitions", "0").is_err());
        assert!(conf.set_setting("target_partitions", "many").is_err());
        assert!(conf.set_setting("not_a_setting", "1").is_err());
        assert!(conf.get_setting("not_a_setting").is_err());
    }

    #[test]
    fn reset() {
        let mut conf = ExecutionConfig::default();
        conf.set_setting("enable_parallel_collect", "false").unwrap();
        conf.reset_setting("enable_parallel_collect").unwrap();
        assert!(conf.enable_parallel_collect);
    }

    #[test]
    fn from_json_defaults() {
        let conf = ExecutionConfig::from_json(r#"{"target_partitions": 2}"#).unwrap();
        assert_eq!(2, conf.target_partitions);
        assert!(conf.enable_parallel_collect);

        assert!(ExecutionConfig::from_json(r#"{"target_partitions": 0}"#).is_err());
    }
}
