//! Generation arguments shared by `generate` and `create`

use anyhow::Result;
use clap::Args;
use serde_json::Value as JsonValue;
use wavespeed_core::input::{DEFAULT_IMAGE_MODEL, ImageGenerationInput, ImageSize};

/// Image generation parameters
#[derive(Args, Debug, Clone)]
pub struct GenerationArgs {
    /// Text description of the desired image
    #[arg(long)]
    pub prompt: String,

    /// URL to an input image (for image-to-image generation)
    #[arg(long)]
    pub image: Option<String>,

    /// How much to transform the input image (0.0 to 1.0)
    #[arg(long, default_value_t = 0.6)]
    pub strength: f64,

    /// Image dimensions in format 'width*height'
    #[arg(long, default_value = "1024*1024")]
    pub size: ImageSize,

    /// Number of inference steps
    #[arg(long, default_value_t = 28)]
    pub steps: u32,

    /// How closely to follow the prompt
    #[arg(long, default_value_t = 5.0)]
    pub guidance: f64,

    /// Number of images to generate
    #[arg(long, default_value_t = 1)]
    pub num_images: u32,

    /// Random seed (-1 for random)
    #[arg(long, default_value_t = -1, allow_hyphen_values = true)]
    pub seed: i64,

    /// Disable content safety filtering
    #[arg(long)]
    pub no_safety: bool,

    /// Model to run
    #[arg(long, default_value = DEFAULT_IMAGE_MODEL)]
    pub model: String,

    /// Extra model inputs as key=value pairs; values are parsed as JSON when possible
    #[arg(short, long, value_parser = parse_key_val)]
    pub param: Vec<(String, String)>,
}

impl GenerationArgs {
    /// Typed input built from the flags
    pub fn image_input(&self) -> ImageGenerationInput {
        let mut input = ImageGenerationInput::new(self.prompt.clone())
            .with_strength(self.strength)
            .with_size(self.size)
            .with_steps(self.steps)
            .with_guidance_scale(self.guidance)
            .with_num_images(self.num_images)
            .with_seed(self.seed)
            .with_safety_checker(!self.no_safety);

        if let Some(image) = &self.image {
            input = input.with_image(image.clone());
        }

        input
    }

    /// JSON payload sent to the service, with `--param` overrides applied
    pub fn to_payload(&self) -> Result<JsonValue> {
        let input = self.image_input();
        input.validate()?;

        let mut payload = serde_json::to_value(&input)?;
        if let Some(object) = payload.as_object_mut() {
            for (key, raw) in &self.param {
                let value =
                    serde_json::from_str(raw).unwrap_or_else(|_| JsonValue::String(raw.clone()));
                object.insert(key.clone(), value);
            }
        }

        Ok(payload)
    }
}

/// Parse a single key=value pair
fn parse_key_val(s: &str) -> Result<(String, String)> {
    let pos = s
        .find('=')
        .ok_or_else(|| anyhow::anyhow!("invalid KEY=value: no `=` found in `{}`", s))?;
    Ok((s[..pos].to_string(), s[pos + 1..].to_string()))
}
