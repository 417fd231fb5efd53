use anyhow::{Context, Result};
use nt_tensor::{CpuBackend, CpuConfig, Tensor};
use tracing::info;
use tracing_subscriber::EnvFilter;

fn init_tracing() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new("info"))?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to install tracing subscriber: {e}"))
}

fn main() -> Result<()> {
    init_tracing()?;

    let config = CpuConfig::from_env().context("reading backend configuration")?;
    let backend = CpuBackend::from_config(&config);
    info!(policy = %backend.policy(), "backend ready");

    let a = Tensor::from_fn([2, 2, 3], |i| (i[0] + i[1] + i[2]) as f32);
    println!("a = {a}\n");

    let b = Tensor::from_fn([2, 3, 4], |i| (i[0] + i[1] + i[2]) as f32);
    println!("b = {b}\n");

    let result = a.matmul(&b, &backend).context("batched matmul")?;
    println!("result = {result}");

    Ok(())
}
