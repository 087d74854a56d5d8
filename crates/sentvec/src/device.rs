use candle_core::Device;

use crate::Result;

#[cfg(all(feature = "metal", feature = "cuda"))]
compile_error!("feature \"metal\" and feature \"cuda\" cannot be enabled at the same time");

/// The device compiled in through cargo features, CPU if neither `cuda` nor `metal` is set.
pub fn default_device() -> Result<Device> {
    #[cfg(feature = "cuda")]
    let device = Device::new_cuda(0)?;

    #[cfg(feature = "metal")]
    let device = Device::new_metal(0)?;

    #[cfg(not(any(feature = "metal", feature = "cuda")))]
    let device = Device::Cpu;

    Ok(device)
}

pub fn print_device_info(device: &Device) {
    if device.is_cpu() {
        tracing::info!("Using CPU")
    }
    if device.is_cuda() {
        tracing::info!("Using CUDA")
    }
    if device.is_metal() {
        tracing::info!("Using Metal")
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[cfg(not(any(feature = "metal", feature = "cuda")))]
    #[test]
    fn test_default_device_is_cpu() -> Result<()> {
        assert!(default_device()?.is_cpu());
        Ok(())
    }
}
