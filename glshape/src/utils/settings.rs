use crate::utils::color;
use crate::utils::color::RgbToPacked;
use anyhow::anyhow;
use anyhow::bail;
use anyhow::Error;
use anyhow::Result;
use colors_transform::Rgb;
use log::warn;
use rustc_hash::FxHashMap;
use std::str::FromStr;

/// Defaults applied to newly created shapes and text rectangles.
///
/// The textual form is one `key=value` pair per line:
///
/// ```text
/// initial_capacity=12
/// text_size=24
/// text_color=#ff8000
/// line_width=2
/// ```
///
/// Colors are either `#rrggbb` (opaque) or `0xrrggbbaa`.
#[derive(Clone, Debug, PartialEq)]
pub struct DrawableSettings {
    pub initial_capacity: usize,
    pub text_size: f32,
    pub text_color: u32,
    pub line_width: f32,
}

impl DrawableSettings {
    pub fn serialize(&self) -> String {
        let mut output = String::new();

        output.push_str(&format!("initial_capacity={}\n", self.initial_capacity));
        output.push_str(&format!("text_size={}\n", self.text_size));
        output.push_str(&format!("text_color=0x{:08x}\n", self.text_color));
        output.push_str(&format!("line_width={}\n", self.line_width));

        output.trim().to_string()
    }

    fn apply(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "initial_capacity" => self.initial_capacity = value.parse()?,
            "text_size" => self.text_size = parse_positive(key, value)?,
            "text_color" => self.text_color = parse_color(value)?,
            "line_width" => self.line_width = value.parse()?,
            _ => warn!("Unknown setting {} ignored", key),
        }

        Ok(())
    }
}

impl Default for DrawableSettings {
    fn default() -> Self {
        Self { initial_capacity: 10, text_size: 32.0, text_color: color::WHITE, line_width: 0.0 }
    }
}

impl FromStr for DrawableSettings {
    type Err = Error;

    fn from_str(content: &str) -> Result<Self> {
        let mut settings = Self::default();

        for (key, value) in deserialize(content)? {
            settings.apply(&key, &value).map_err(|err| anyhow!("Invalid value {} for setting {} ({})", value, key, err))?;
        }

        Ok(settings)
    }
}

fn deserialize(content: &str) -> Result<FxHashMap<String, String>> {
    let mut output = FxHashMap::default();

    for line in content.lines().map(|p| p.trim()) {
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let (name, value) = match line.split_once('=') {
            Some(tokens) => tokens,
            None => bail!("Malformed settings line: {}", line),
        };

        output.insert(name.trim().to_string(), value.trim().to_string());
    }

    Ok(output)
}

fn parse_positive(key: &str, value: &str) -> Result<f32> {
    let parsed: f32 = value.parse()?;
    if !(parsed > 0.0) {
        bail!("{} must be positive", key);
    }

    Ok(parsed)
}

fn parse_color(value: &str) -> Result<u32> {
    if let Some(hex) = value.strip_prefix("0x") {
        return Ok(u32::from_str_radix(hex, 16)?);
    }

    let rgb = Rgb::from_hex_str(value).map_err(|err| anyhow!("{:?}", err))?;
    Ok(rgb.to_packed(0xFF))
}
