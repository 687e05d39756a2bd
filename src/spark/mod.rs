//! Spark installation handling: finding the Spark home and editing its config.

mod defaults;
mod home;

pub use defaults::{
    ENABLE_KEY, KEYFILE_KEY, MANAGED_KEYS, MatchMode, SPARK_DEFAULTS_FILE, managed_lines, merge,
    spark_defaults_path, update_spark_defaults,
};
pub use home::{SparkHomeLocator, is_spark_home};
