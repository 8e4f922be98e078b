// ============================================================
// Layer 6 — Compute Target
// ============================================================
// Which processing unit tensor operations run on.
//
//   cpu         → Burn NdArray backend
//   accelerator → Burn Wgpu backend (cargo feature `wgpu`)
//
// The target is resolved once at startup; the application layer
// then runs the whole pipeline generic over the chosen backend.

use serde::{Deserialize, Serialize};

use crate::domain::error::FinetuneError;

pub type CpuBackend = burn::backend::Autodiff<burn::backend::NdArray>;

#[cfg(feature = "wgpu")]
pub type AcceleratorBackend = burn::backend::Autodiff<burn::backend::Wgpu>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComputeTarget {
    Cpu,
    Accelerator,
}

impl Default for ComputeTarget {
    /// The accelerator whenever this build supports one.
    fn default() -> Self {
        if cfg!(feature = "wgpu") { Self::Accelerator } else { Self::Cpu }
    }
}

impl ComputeTarget {
    /// Fail early when this build cannot serve the target.
    pub fn ensure_available(self) -> Result<Self, FinetuneError> {
        match self {
            Self::Cpu => Ok(self),
            Self::Accelerator if cfg!(feature = "wgpu") => Ok(self),
            Self::Accelerator => Err(FinetuneError::Device(
                "accelerator requested but this build has no GPU backend (enable feature `wgpu`)".into(),
            )),
        }
    }
}

pub fn cpu_device() -> burn::backend::ndarray::NdArrayDevice {
    burn::backend::ndarray::NdArrayDevice::Cpu
}

#[cfg(feature = "wgpu")]
pub fn accelerator_device() -> burn::backend::wgpu::WgpuDevice {
    burn::backend::wgpu::WgpuDevice::default()
}
