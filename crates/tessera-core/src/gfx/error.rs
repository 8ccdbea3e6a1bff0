// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! The error hierarchy of the rendering core.
//!
//! Device errors are ordinary values: the driver never panics on a bad
//! request, it returns the specific failure and leaves state untouched.
//! Programming errors (stale handles, stage mismatches) go through the same
//! always-on checks; handle values are never reused, so the checks stay
//! exact in every build profile.

use crate::gfx::{ShaderStage, TextureFormat};
use std::fmt;

/// An error reported by a render device or context operation.
#[derive(Debug, Clone, PartialEq)]
pub enum DeviceError {
    /// A handle was null, destroyed, or of the wrong type for the operation.
    InvalidHandle,
    /// A descriptor contained an invalid parameter combination.
    InvalidDescriptor(String),
    /// A shader module was attached under a stage it was not compiled for.
    StageMismatch {
        /// The stage slot the module was attached to.
        expected: ShaderStage,
        /// The stage the module was actually compiled for.
        found: ShaderStage,
    },
    /// The texture format is not usable for the requested binding.
    UnsupportedFormat(TextureFormat),
    /// A buffer update did not match the buffer's byte size.
    BufferSizeMismatch {
        /// The buffer's size in bytes.
        expected: u64,
        /// The size of the supplied data.
        actual: u64,
    },
    /// A render command failed validation; nothing was executed.
    InvalidCommand(String),
    /// The device ran out of memory for the resource.
    OutOfMemory,
    /// A context already exists and concurrent contexts are not supported.
    ContextBusy,
    /// The context was submitted without being finished first.
    ContextNotFinished,
    /// An operation was recorded on a context that is already finished.
    ContextSealed,
    /// A failure specific to the underlying driver.
    Backend(String),
}

impl fmt::Display for DeviceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeviceError::InvalidHandle => write!(f, "invalid or stale handle"),
            DeviceError::InvalidDescriptor(msg) => write!(f, "invalid descriptor: {msg}"),
            DeviceError::StageMismatch { expected, found } => write!(
                f,
                "shader module compiled for {found:?} attached to the {expected:?} stage"
            ),
            DeviceError::UnsupportedFormat(format) => {
                write!(f, "texture format {format:?} is not usable here")
            }
            DeviceError::BufferSizeMismatch { expected, actual } => write!(
                f,
                "buffer update of {actual} bytes does not match buffer size {expected}"
            ),
            DeviceError::InvalidCommand(msg) => write!(f, "render command rejected: {msg}"),
            DeviceError::OutOfMemory => write!(f, "device out of memory"),
            DeviceError::ContextBusy => {
                write!(f, "a render context is already open on this device")
            }
            DeviceError::ContextNotFinished => {
                write!(f, "render context submitted before finish()")
            }
            DeviceError::ContextSealed => {
                write!(f, "render context is finished; submit it before recording")
            }
            DeviceError::Backend(msg) => write!(f, "driver error: {msg}"),
        }
    }
}

impl std::error::Error for DeviceError {}

/// A high-level error from the rendering system.
#[derive(Debug)]
pub enum RenderError {
    /// The graphics backend could not be initialized.
    InitializationFailed(String),
    /// A device or context operation failed.
    Device(DeviceError),
    /// An unexpected internal error.
    Internal(String),
}

impl fmt::Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderError::InitializationFailed(msg) => {
                write!(f, "failed to initialize graphics backend: {msg}")
            }
            RenderError::Device(err) => write!(f, "graphics device operation failed: {err}"),
            RenderError::Internal(msg) => write!(f, "internal rendering error: {msg}"),
        }
    }
}

impl std::error::Error for RenderError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RenderError::Device(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DeviceError> for RenderError {
    fn from(err: DeviceError) -> Self {
        RenderError::Device(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn device_error_display() {
        assert_eq!(
            format!("{}", DeviceError::InvalidHandle),
            "invalid or stale handle"
        );
        let err = DeviceError::BufferSizeMismatch {
            expected: 64,
            actual: 60,
        };
        assert_eq!(
            format!("{err}"),
            "buffer update of 60 bytes does not match buffer size 64"
        );
    }

    #[test]
    fn stage_mismatch_names_both_stages() {
        let err = DeviceError::StageMismatch {
            expected: ShaderStage::Vertex,
            found: ShaderStage::Pixel,
        };
        let text = format!("{err}");
        assert!(text.contains("Vertex"));
        assert!(text.contains("Pixel"));
    }

    #[test]
    fn render_error_wraps_device_error_as_source() {
        let render_err: RenderError = DeviceError::OutOfMemory.into();
        assert_eq!(
            format!("{render_err}"),
            "graphics device operation failed: device out of memory"
        );
        assert!(render_err.source().is_some());
    }
}
