//! Model input payloads
//!
//! The service accepts a free-form JSON object per model. The text-to-image
//! models share the fields modelled by [`ImageGenerationInput`].

use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// Default model used by the examples and the CLI
pub const DEFAULT_IMAGE_MODEL: &str = "wavespeed-ai/flux-dev";

/// Output image dimensions, serialized as `"W*H"`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ImageSize {
    pub width: u32,
    pub height: u32,
}

impl ImageSize {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl Default for ImageSize {
    fn default() -> Self {
        Self::new(1024, 1024)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid image size {0:?}, expected WIDTH*HEIGHT")]
pub struct InvalidImageSize(pub String);

impl FromStr for ImageSize {
    type Err = InvalidImageSize;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || InvalidImageSize(s.to_string());
        let (width, height) = s.split_once('*').ok_or_else(invalid)?;
        let width: u32 = width.trim().parse().map_err(|_| invalid())?;
        let height: u32 = height.trim().parse().map_err(|_| invalid())?;
        if width == 0 || height == 0 {
            return Err(invalid());
        }
        Ok(Self { width, height })
    }
}

impl std::fmt::Display for ImageSize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}*{}", self.width, self.height)
    }
}

impl Serialize for ImageSize {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ImageSize {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Input for text-to-image (and image-to-image) generation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageGenerationInput {
    pub prompt: String,

    /// Source image URL for image-to-image generation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,

    /// How much to transform the input image (0.0 to 1.0)
    pub strength: f64,

    pub size: ImageSize,

    pub num_inference_steps: u32,

    /// How closely to follow the prompt
    pub guidance_scale: f64,

    pub num_images: u32,

    /// `-1` lets the service pick a random seed
    pub seed: i64,

    pub enable_safety_checker: bool,
}

impl ImageGenerationInput {
    /// Creates an input with the service's recommended defaults
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            image: None,
            strength: 0.6,
            size: ImageSize::default(),
            num_inference_steps: 28,
            guidance_scale: 5.0,
            num_images: 1,
            seed: -1,
            enable_safety_checker: true,
        }
    }

    pub fn with_image(mut self, url: impl Into<String>) -> Self {
        self.image = Some(url.into());
        self
    }

    pub fn with_strength(mut self, strength: f64) -> Self {
        self.strength = strength;
        self
    }

    pub fn with_size(mut self, size: ImageSize) -> Self {
        self.size = size;
        self
    }

    pub fn with_steps(mut self, steps: u32) -> Self {
        self.num_inference_steps = steps;
        self
    }

    pub fn with_guidance_scale(mut self, guidance_scale: f64) -> Self {
        self.guidance_scale = guidance_scale;
        self
    }

    pub fn with_num_images(mut self, num_images: u32) -> Self {
        self.num_images = num_images;
        self
    }

    pub fn with_seed(mut self, seed: i64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_safety_checker(mut self, enabled: bool) -> Self {
        self.enable_safety_checker = enabled;
        self
    }

    /// Checks value ranges the service would otherwise reject
    pub fn validate(&self) -> Result<(), InvalidInput> {
        if self.prompt.trim().is_empty() {
            return Err(InvalidInput("prompt cannot be empty".to_string()));
        }
        if !(0.0..=1.0).contains(&self.strength) {
            return Err(InvalidInput(format!(
                "strength must be between 0.0 and 1.0, got {}",
                self.strength
            )));
        }
        if self.num_inference_steps == 0 {
            return Err(InvalidInput("num_inference_steps must be greater than 0".to_string()));
        }
        if self.num_images == 0 {
            return Err(InvalidInput("num_images must be greater than 0".to_string()));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid generation input: {0}")]
pub struct InvalidInput(pub String);
