// THEORY:
// The `pipeline` module is the top-level API of the lighting engine. It wires the
// filters together in the order the engine needs them:
//
//     source --smooth--> smoothed --normal_map(strength)--> normal map
//     source + normal map + (light, eye) --relight--> lit image
//
// The normal map depends only on the source and the strength, so it is computed
// once and cached until the strength changes. Relighting always starts from the
// unsmoothed source.
//
// Light and eye vectors are not pipeline state. Every render call receives an
// immutable `LightVectors` pair, which keeps the pipeline free of the
// "update one slider, render with stale vectors" class of bugs.

use crate::core_modules::normal_map::{normal_map, validate_strength};
use crate::core_modules::pixel_buffer::PixelBuffer;
use crate::core_modules::relight::relight;
use crate::core_modules::smoothing::smooth;
use crate::core_modules::vector::Vector3;
use crate::error::{LightingError, Result};
use std::time::Instant;

pub use crate::core_modules::pixel::pixel::Pixel;

/// Strength used until the caller picks one.
pub const DEFAULT_STRENGTH: f64 = 0.5;

/// Configuration for the LightingPipeline.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    /// Bumpiness of the derived normal map. Must be finite and > 0.
    pub strength: f64,
    /// Threads in the pool the filters run on. Must be at least 1.
    pub worker_threads: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            strength: DEFAULT_STRENGTH,
            worker_threads: num_cpus::get(),
        }
    }
}

impl PipelineConfig {
    pub fn validate(&self) -> Result<()> {
        validate_strength(self.strength)?;
        if self.worker_threads == 0 {
            return Err(LightingError::InvalidConfig(
                "worker_threads must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// The light and eye vectors for one render.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightVectors {
    pub light: Vector3,
    pub eye: Vector3,
}

impl LightVectors {
    pub fn new(light: Vector3, eye: Vector3) -> Self {
        Self { light, eye }
    }
}

impl Default for LightVectors {
    fn default() -> Self {
        Self::new(Vector3::zeros(), Vector3::zeros())
    }
}

/// Owns a source image, its cached normal map and the filter thread pool.
pub struct LightingPipeline {
    config: PipelineConfig,
    pool: rayon::ThreadPool,
    source: PixelBuffer,
    normal_map: PixelBuffer,
}

impl LightingPipeline {
    pub fn new(source: PixelBuffer, config: PipelineConfig) -> Result<Self> {
        config.validate()?;

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(config.worker_threads)
            .thread_name(|index| format!("lighting-filter-{index}"))
            .build()
            .map_err(|err| LightingError::ThreadPool(err.to_string()))?;

        let normal_map = Self::derive_normal_map(&pool, &source, config.strength)?;

        Ok(Self {
            config,
            pool,
            source,
            normal_map,
        })
    }

    fn derive_normal_map(pool: &rayon::ThreadPool, source: &PixelBuffer, strength: f64) -> Result<PixelBuffer> {
        let started = Instant::now();
        let normals = pool.install(|| smooth(source).and_then(|smoothed| normal_map(&smoothed, strength)))?;
        log::debug!(
            "normal map {}x{} at strength {strength} in {:?}",
            source.width(),
            source.height(),
            started.elapsed()
        );
        Ok(normals)
    }

    /// Changes the strength and returns the recomputed normal map.
    ///
    /// On failure the previous strength and normal map stay in place.
    pub fn set_strength(&mut self, strength: f64) -> Result<&PixelBuffer> {
        validate_strength(strength)?;
        if strength != self.config.strength {
            self.normal_map = Self::derive_normal_map(&self.pool, &self.source, strength)?;
            self.config.strength = strength;
        }
        Ok(&self.normal_map)
    }

    /// Relights the source with the cached normal map.
    pub fn render(&self, vectors: &LightVectors) -> Result<PixelBuffer> {
        let started = Instant::now();
        let lit = self
            .pool
            .install(|| relight(&self.source, &self.normal_map, &vectors.light, &vectors.eye))?;
        log::trace!("relight with {vectors:?} in {:?}", started.elapsed());
        Ok(lit)
    }

    pub fn source(&self) -> &PixelBuffer {
        &self.source
    }

    pub fn normal_map(&self) -> &PixelBuffer {
        &self.normal_map
    }

    pub fn strength(&self) -> f64 {
        self.config.strength
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }
}
