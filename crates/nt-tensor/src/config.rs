use crate::backend::ExecutionPolicy;
use crate::error::{Result, TensorError};

/// Environment variable enabling the parallel batch loop (`1`/`true`/`0`/`false`).
pub const ENV_PARALLEL: &str = "NT_PARALLEL";
/// Environment variable fixing the worker count of the parallel batch loop.
pub const ENV_NUM_THREADS: &str = "NT_NUM_THREADS";
/// Environment variable setting the batch count below which matmul stays sequential.
pub const ENV_MIN_PARALLEL_BATCHES: &str = "NT_MIN_PARALLEL_BATCHES";

/// Configuration for a `CpuBackend`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CpuConfig {
    /// Run the matmul batch loop on rayon workers.
    pub parallel: bool,
    /// Dedicated pool size; `None` uses rayon's global pool.
    pub num_threads: Option<usize>,
    /// Batch count below which the parallel policy falls back to sequential.
    pub min_parallel_batches: usize,
}

impl Default for CpuConfig {
    fn default() -> Self {
        CpuConfig {
            parallel: false,
            num_threads: None,
            min_parallel_batches: 2,
        }
    }
}

impl CpuConfig {
    /// Read the configuration from the process environment.
    ///
    /// Unset variables keep their defaults. Setting `NT_NUM_THREADS` implies
    /// `parallel` unless `NT_PARALLEL` says otherwise.
    pub fn from_env() -> Result<CpuConfig> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a configuration from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<CpuConfig> {
        let mut config = CpuConfig::default();

        if let Some(raw) = lookup(ENV_NUM_THREADS) {
            let n = parse_usize(ENV_NUM_THREADS, &raw)?;
            if n == 0 {
                return Err(TensorError::InvalidConfig {
                    key: ENV_NUM_THREADS,
                    value: raw,
                });
            }
            config.num_threads = Some(n);
            config.parallel = true;
        }

        if let Some(raw) = lookup(ENV_PARALLEL) {
            config.parallel = match raw.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => true,
                "0" | "false" | "no" | "off" => false,
                _ => {
                    return Err(TensorError::InvalidConfig {
                        key: ENV_PARALLEL,
                        value: raw,
                    })
                }
            };
        }

        if let Some(raw) = lookup(ENV_MIN_PARALLEL_BATCHES) {
            config.min_parallel_batches = parse_usize(ENV_MIN_PARALLEL_BATCHES, &raw)?;
        }

        Ok(config)
    }

    /// The execution policy this configuration selects.
    pub fn policy(&self) -> ExecutionPolicy {
        if self.parallel {
            ExecutionPolicy::Parallel {
                num_threads: self.num_threads,
            }
        } else {
            ExecutionPolicy::Sequential
        }
    }
}

fn parse_usize(key: &'static str, raw: &str) -> Result<usize> {
    raw.trim()
        .parse::<usize>()
        .map_err(|_| TensorError::InvalidConfig {
            key,
            value: raw.to_string(),
        })
}
