//! Compute device selection
//!
//! Training configs request a device through [`DeviceSpec`]; resolution
//! degrades to the CPU with a logged notice when the requested accelerator
//! is not available. Tensors carry the resolved [`Device`] as a placement
//! tag.

use std::fmt;
use std::process::Command;

use crate::logging::RunLogger;

/// A concrete compute device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Device {
    /// Host CPU
    Cpu,
    /// CUDA accelerator
    Cuda { device_id: usize },
}

impl Device {
    /// Whether this device is a CUDA accelerator.
    #[must_use]
    pub fn is_cuda(&self) -> bool {
        matches!(self, Device::Cuda { .. })
    }
}

impl fmt::Display for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Device::Cpu => write!(f, "cpu"),
            Device::Cuda { device_id } => write!(f, "cuda:{device_id}"),
        }
    }
}

/// What the caller asked for, before availability is checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeviceSpec {
    /// Host CPU, always available
    #[default]
    Cpu,
    /// First CUDA device if one exists, CPU otherwise
    Gpu,
    /// A specific device, falling back to CPU if it is a missing accelerator
    Explicit(Device),
}

impl DeviceSpec {
    /// Resolve to an available device, logging a notice on fallback.
    pub fn resolve(self, logger: &RunLogger) -> Device {
        let wanted = match self {
            DeviceSpec::Cpu => return Device::Cpu,
            DeviceSpec::Gpu => Device::Cuda { device_id: 0 },
            DeviceSpec::Explicit(device) => device,
        };
        if !wanted.is_cuda() || cuda_available() {
            return wanted;
        }
        logger.info(format!("{self} is not available, using cpu instead"));
        Device::Cpu
    }
}

impl fmt::Display for DeviceSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeviceSpec::Cpu => write!(f, "cpu"),
            DeviceSpec::Gpu => write!(f, "gpu"),
            DeviceSpec::Explicit(device) => device.fmt(f),
        }
    }
}

/// Probe for a usable CUDA device.
///
/// Honors `CUDA_VISIBLE_DEVICES` when set (empty or `-1` hides all
/// devices), otherwise asks `nvidia-smi`.
#[must_use]
pub fn cuda_available() -> bool {
    if let Ok(devices) = std::env::var("CUDA_VISIBLE_DEVICES") {
        return !devices.is_empty() && devices != "-1";
    }
    Command::new("nvidia-smi")
        .args(["--query-gpu=name", "--format=csv,noheader"])
        .output()
        .map(|out| out.status.success() && !out.stdout.is_empty())
        .unwrap_or(false)
}
