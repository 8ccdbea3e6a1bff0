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

//! Asset loading errors.

use tessera_core::gfx::DeviceError;
use thiserror::Error;

/// An error raised while loading or writing an asset.
#[derive(Debug, Error)]
pub enum AssetError {
    /// Underlying file I/O failed.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// The asset's contents are not well-formed.
    #[error("malformed asset: {0}")]
    Corrupt(String),

    /// Image decoding failed.
    #[error("image decode failed: {0}")]
    Image(#[from] image::ImageError),

    /// The image decoded but its layout is not usable for the request.
    #[error("unsupported image layout: {0}")]
    UnsupportedImage(String),

    /// A material file failed to parse.
    #[error("material file parse failed: {0}")]
    Material(#[from] serde_json::Error),

    /// The shader files found on disk do not form a drawable program.
    #[error("shader program '{name}' needs a vertex+pixel pair or a compute stage")]
    IncompleteProgram {
        /// The logical program name.
        name: String,
    },

    /// Uploading the asset to the device failed.
    #[error(transparent)]
    Device(#[from] DeviceError),
}
