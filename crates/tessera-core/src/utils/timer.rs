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

//! A minimal stopwatch used for import timing and frame statistics.

use std::time::Instant;

/// Measures wall-clock time from its creation (or the last [`restart`]).
///
/// [`restart`]: Stopwatch::restart
#[derive(Debug, Clone)]
pub struct Stopwatch {
    started: Instant,
}

impl Stopwatch {
    /// Creates a stopwatch and starts it immediately.
    pub fn new() -> Self {
        Self {
            started: Instant::now(),
        }
    }

    /// Resets the measurement origin to now.
    pub fn restart(&mut self) {
        self.started = Instant::now();
    }

    /// Elapsed time in seconds.
    pub fn elapsed_secs_f64(&self) -> f64 {
        self.started.elapsed().as_secs_f64()
    }

    /// Elapsed time in milliseconds.
    pub fn elapsed_ms(&self) -> f64 {
        self.elapsed_secs_f64() * 1000.0
    }
}

impl Default for Stopwatch {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn elapsed_is_monotonic() {
        let watch = Stopwatch::new();
        let first = watch.elapsed_secs_f64();
        let second = watch.elapsed_secs_f64();
        assert!(second >= first);
        assert!(first >= 0.0);
    }

    #[test]
    fn restart_resets_origin() {
        let mut watch = Stopwatch::new();
        std::thread::sleep(std::time::Duration::from_millis(2));
        let before = watch.elapsed_ms();
        watch.restart();
        assert!(watch.elapsed_ms() <= before);
    }
}
