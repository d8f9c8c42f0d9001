use crate::error::{BarcodeError, Result};
use crate::symbology::Bars;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::{ImageBuffer, ImageFormat, Rgb, RgbImage};
use core::fmt;
use core::str::FromStr;
use std::io::Cursor;

/*---- Options ----*/

/// Largest accepted `module_width`, in pixels.
pub const MAX_MODULE_WIDTH: u32 = 50;
/// Largest accepted `module_height`, in pixels.
pub const MAX_MODULE_HEIGHT: u32 = 5_000;
/// Largest accepted `quiet_zone`, in modules.
pub const MAX_QUIET_ZONE: u32 = 500;
/// Largest width or height a rendered barcode may have, in pixels.
pub const MAX_DIMENSION: u32 = 32_768;

/// Output format for a single-file barcode.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
pub enum OutputFormat {
    #[default]
    Png,
    Svg,
}

impl OutputFormat {
    /// File extension, without the dot.
    pub const fn extension(self) -> &'static str {
        match self {
            OutputFormat::Png => "png",
            OutputFormat::Svg => "svg",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for OutputFormat {
    type Err = BarcodeError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "png" => Ok(OutputFormat::Png),
            "svg" => Ok(OutputFormat::Svg),
            _ => Err(BarcodeError::UnsupportedFormat(s.trim().to_string())),
        }
    }
}

/// Appearance settings shared by the PNG and SVG writers.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenderOptions {
    /// Width of a single module, in pixels.
    pub module_width: u32,
    /// Height of the bars, in pixels.
    pub module_height: u32,
    /// Blank modules on the left and right of the symbol.
    pub quiet_zone: u32,
    /// Colour of the bars, as RGB.
    pub foreground: [u8; 3],
    /// Colour of the spaces, quiet zone and margins, as RGB.
    pub background: [u8; 3],
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            module_width: 2,
            module_height: 100,
            quiet_zone: 10,
            foreground: [0, 0, 0],
            background: [255, 255, 255],
        }
    }
}

impl RenderOptions {
    /// Sets one option from its textual form.
    ///
    /// Unknown keys are skipped with a warning so that a customization map may carry
    /// settings this writer has no use for.
    ///
    /// # Arguments
    ///
    /// * `key` - One of `module_width`, `module_height`, `quiet_zone`, `foreground`, `background`.
    /// * `value` - An integer for sizes (at most [`MAX_MODULE_WIDTH`], [`MAX_MODULE_HEIGHT`] or
    ///   [`MAX_QUIET_ZONE`]), or `#rrggbb` / `black` / `white` for colours.
    ///
    /// # Errors
    ///
    /// Returns [`BarcodeError::InvalidOption`] if the value does not parse for a known key.
    ///
    /// # Example
    ///
    /// ```rust
    /// use barust::render::RenderOptions;
    ///
    /// let mut opts = RenderOptions::default();
    /// opts.apply("module_width", "3").unwrap();
    /// opts.apply("foreground", "#ff8800").unwrap();
    /// opts.apply("font_size", "12").unwrap(); // ignored
    /// assert_eq!(opts.module_width, 3);
    /// assert_eq!(opts.foreground, [255, 136, 0]);
    /// ```
    pub fn apply(&mut self, key: &str, value: &str) -> Result<()> {
        let invalid = || BarcodeError::InvalidOption {
            key: key.to_string(),
            value: value.to_string(),
        };
        let value = value.trim();
        match key.trim() {
            "module_width" => {
                self.module_width = parse_bounded(value, 1, MAX_MODULE_WIDTH).ok_or_else(invalid)?
            }
            "module_height" => {
                self.module_height = parse_bounded(value, 1, MAX_MODULE_HEIGHT).ok_or_else(invalid)?
            }
            "quiet_zone" => {
                self.quiet_zone = parse_bounded(value, 0, MAX_QUIET_ZONE).ok_or_else(invalid)?
            }
            "foreground" => self.foreground = parse_color(value).ok_or_else(invalid)?,
            "background" => self.background = parse_color(value).ok_or_else(invalid)?,
            other => tracing::warn!(option = other, "ignoring unknown render option"),
        }
        Ok(())
    }

    /// Parses a `key=value` pair and applies it.
    pub fn apply_pair(&mut self, pair: &str) -> Result<()> {
        match pair.split_once('=') {
            Some((key, value)) => self.apply(key, value),
            None => Err(BarcodeError::InvalidOption {
                key: pair.trim().to_string(),
                value: String::new(),
            }),
        }
    }
}

fn parse_bounded(value: &str, min: u32, max: u32) -> Option<u32> {
    value.parse::<u32>().ok().filter(|v| (min..=max).contains(v))
}

/// Pixel geometry of a rendered barcode.
struct Canvas {
    width: u32,
    height: u32,
    margin: u32,
}

impl Canvas {
    /// Computes the geometry, refusing sizes that overflow or exceed [`MAX_DIMENSION`].
    fn measure(bars: &Bars, opts: &RenderOptions) -> Result<Self> {
        let too_large = || BarcodeError::DimensionsTooLarge { max: MAX_DIMENSION };

        let margin = opts.module_width.checked_mul(4).ok_or_else(too_large)?;
        let modules = u32::try_from(bars.len())
            .ok()
            .and_then(|len| opts.quiet_zone.checked_mul(2)?.checked_add(len))
            .ok_or_else(too_large)?;
        let width = modules.checked_mul(opts.module_width).ok_or_else(too_large)?;
        let height = margin
            .checked_mul(2)
            .and_then(|m| m.checked_add(opts.module_height))
            .ok_or_else(too_large)?;

        if width > MAX_DIMENSION || height > MAX_DIMENSION {
            return Err(too_large());
        }
        Ok(Self {
            width,
            height,
            margin,
        })
    }
}

fn parse_color(value: &str) -> Option<[u8; 3]> {
    match value.to_ascii_lowercase().as_str() {
        "black" => return Some([0, 0, 0]),
        "white" => return Some([255, 255, 255]),
        _ => {}
    }
    let hex = value.strip_prefix('#')?;
    if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    Some([channel(0)?, channel(2)?, channel(4)?])
}

/*---- Writers ----*/

/// Renders the bars into an RGB image buffer.
///
/// The image is `(bars + 2 * quiet_zone) * module_width` pixels wide and
/// `module_height + 2 * margin` pixels tall, where the margin is four module widths.
///
/// # Example
///
/// ```rust
/// use barust::render::{to_image_buffer, RenderOptions};
/// use barust::symbology::{encode, Symbology};
///
/// let bars = encode(Symbology::Ean8, "1234567").unwrap();
/// let img = to_image_buffer(&bars, &RenderOptions::default()).unwrap();
/// assert_eq!(img.width(), (67 + 20) * 2);
/// ```
///
/// # Errors
///
/// Returns [`BarcodeError::DimensionsTooLarge`] if either side would exceed [`MAX_DIMENSION`].
pub fn to_image_buffer(bars: &Bars, opts: &RenderOptions) -> Result<RgbImage> {
    let Canvas {
        width,
        height,
        margin,
    } = Canvas::measure(bars, opts)?;
    let mut img = ImageBuffer::from_pixel(width, height, Rgb(opts.background));

    for (x, y, pixel) in img.enumerate_pixels_mut() {
        if y < margin || y >= margin + opts.module_height {
            continue;
        }
        let module = (x / opts.module_width) as usize;
        let Some(index) = module.checked_sub(opts.quiet_zone as usize) else {
            continue;
        };
        if bars.is_bar(index) {
            *pixel = Rgb(opts.foreground);
        }
    }

    Ok(img)
}

/// Renders the bars and encodes them as PNG, in memory.
pub fn to_png_bytes(bars: &Bars, opts: &RenderOptions) -> Result<Vec<u8>> {
    let img = to_image_buffer(bars, opts)?;
    let mut buffer = Cursor::new(Vec::new());
    img.write_to(&mut buffer, ImageFormat::Png)?;
    Ok(buffer.into_inner())
}

// Returns a string of SVG code for an image depicting the given bars.
// Adjacent dark modules are merged into one rectangle.
// The string always uses Unix newlines (\n), regardless of the platform.
// Fails with DimensionsTooLarge under the same limits as to_image_buffer.
pub fn to_svg_string(bars: &Bars, opts: &RenderOptions) -> Result<String> {
    let Canvas {
        width,
        height,
        margin,
    } = Canvas::measure(bars, opts)?;

    let mut result = String::new();
    result += "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n";
    result += "<!DOCTYPE svg PUBLIC \"-//W3C//DTD SVG 1.1//EN\" \"http://www.w3.org/Graphics/SVG/1.1/DTD/svg11.dtd\">\n";
    result += &format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" version=\"1.1\" width=\"{0}\" height=\"{1}\" viewBox=\"0 0 {0} {1}\" stroke=\"none\">\n",
        width, height
    );
    result += &format!("\t<rect width=\"100%\" height=\"100%\" fill=\"{}\"/>\n", hex_color(opts.background));
    result += &format!("\t<g fill=\"{}\">\n", hex_color(opts.foreground));

    let modules = bars.modules();
    let mut i = 0;
    while i < modules.len() {
        if modules[i] != 1 {
            i += 1;
            continue;
        }
        let start = i;
        while i < modules.len() && modules[i] == 1 {
            i += 1;
        }
        let x = (start as u32 + opts.quiet_zone) * opts.module_width;
        let w = (i - start) as u32 * opts.module_width;
        result += &format!(
            "\t\t<rect x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\"/>\n",
            x, margin, w, opts.module_height
        );
    }

    result += "\t</g>\n";
    result += "</svg>\n";
    Ok(result)
}

fn hex_color(rgb: [u8; 3]) -> String {
    format!("#{:02x}{:02x}{:02x}", rgb[0], rgb[1], rgb[2])
}

/// One-line console preview of the bars.
pub fn to_ascii(bars: &Bars) -> String {
    bars.modules()
        .iter()
        .map(|&m| if m == 1 { '█' } else { ' ' })
        .collect()
}

/*---- HTML ----*/

/// Builds an inline `<img>` tag carrying the PNG as a base64 data URI.
pub fn img_tag(png: &[u8]) -> String {
    format!(
        "<img src=\"data:image/png;base64,{}\" alt=\"Barcode\" style=\"max-width:100%;height:auto;\">",
        STANDARD.encode(png)
    )
}

/// Builds a standalone viewer page that shows the image at `image_src` with `data` below it.
pub fn html_page(data: &str, image_src: &str) -> String {
    let data = escape_html(data);
    let image_src = escape_html(image_src);
    format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8">
    <title>Barcode - {data}</title>
    <style>
        body {{ margin: 0; padding: 20px; background: #f5f5f5; font-family: Arial, sans-serif; }}
        .container {{ max-width: 800px; margin: 0 auto; background: white; padding: 30px; border-radius: 10px; box-shadow: 0 2px 10px rgba(0,0,0,0.1); }}
        .barcode {{ text-align: center; margin: 20px 0; }}
        .barcode img {{ max-width: 100%; height: auto; border: 1px solid #ddd; padding: 10px; }}
        .info {{ text-align: center; color: #666; font-size: 14px; margin-top: 15px; }}
        .code {{ font-family: monospace; font-size: 18px; font-weight: bold; color: #333; }}
    </style>
</head>
<body>
    <div class="container">
        <h2 style="text-align: center; color: #333;">Barcode</h2>
        <div class="barcode">
            <img src="{image_src}" alt="Barcode">
        </div>
        <div class="info">
            <div class="code">{data}</div>
            <p>Generated automatically</p>
        </div>
    </div>
</body>
</html>
"#
    )
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

// Tests
#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbology::{encode, Symbology};

    fn ean8() -> Bars {
        encode(Symbology::Ean8, "1234567").unwrap()
    }

    #[test]
    fn test_to_svg_string() {
        let svg = to_svg_string(&ean8(), &RenderOptions::default()).unwrap();

        assert!(svg.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
        assert!(svg.contains("width=\"174\""));
        assert!(svg.ends_with("</svg>\n"));
        // EAN-8 starts with a single-module guard bar right after the quiet zone.
        assert!(svg.contains("<rect x=\"20\" y=\"8\" width=\"2\" height=\"100\"/>"));
    }

    #[test]
    fn test_to_image_buffer_dimensions_and_pixels() {
        let opts = RenderOptions::default();
        let img = to_image_buffer(&ean8(), &opts).unwrap();

        assert_eq!(img.dimensions(), ((67 + 20) * 2, 100 + 16));
        // Quiet zone stays background, first guard bar is foreground.
        assert_eq!(img.get_pixel(0, 50), &Rgb([255, 255, 255]));
        assert_eq!(img.get_pixel(20, 50), &Rgb([0, 0, 0]));
        // Margin rows stay background even over a bar.
        assert_eq!(img.get_pixel(20, 2), &Rgb([255, 255, 255]));
    }

    #[test]
    fn test_to_png_bytes_has_signature() {
        let png = to_png_bytes(&ean8(), &RenderOptions::default()).unwrap();
        assert_eq!(&png[..8], &[0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a]);
    }

    #[test]
    fn test_apply_options() {
        let mut opts = RenderOptions::default();
        opts.apply_pair("quiet_zone=0").unwrap();
        opts.apply_pair("background=black").unwrap();
        opts.apply_pair("text_distance=5").unwrap();
        assert_eq!(opts.quiet_zone, 0);
        assert_eq!(opts.background, [0, 0, 0]);

        assert!(opts.apply("module_width", "0").is_err());
        assert!(opts.apply("module_width", "2000000000").is_err());
        assert!(opts.apply("quiet_zone", "4000000000").is_err());
        assert!(opts.apply("module_height", "99999").is_err());
        assert!(opts.apply("foreground", "#12345").is_err());
        assert!(opts.apply_pair("module_height").is_err());
    }

    #[test]
    fn test_oversized_options_are_rejected_when_rendering() {
        let bars = ean8();

        let mut opts = RenderOptions::default();
        opts.quiet_zone = 4_000_000_000;
        assert!(matches!(
            to_image_buffer(&bars, &opts),
            Err(BarcodeError::DimensionsTooLarge { .. })
        ));
        assert!(matches!(
            to_svg_string(&bars, &opts),
            Err(BarcodeError::DimensionsTooLarge { .. })
        ));

        let mut opts = RenderOptions::default();
        opts.module_width = 2_000_000_000;
        assert!(to_png_bytes(&bars, &opts).is_err());

        // Within the per-option limits, but too wide once multiplied out.
        let mut opts = RenderOptions::default();
        opts.apply("module_width", "50").unwrap();
        opts.apply("quiet_zone", "500").unwrap();
        assert!(matches!(
            to_image_buffer(&bars, &opts),
            Err(BarcodeError::DimensionsTooLarge { max: MAX_DIMENSION })
        ));
    }

    #[test]
    fn test_zero_quiet_zone_with_wide_modules() {
        let mut opts = RenderOptions::default();
        opts.apply("quiet_zone", "0").unwrap();
        opts.apply("module_width", "50").unwrap();
        let img = to_image_buffer(&ean8(), &opts).unwrap();

        assert_eq!(img.dimensions(), (67 * 50, 100 + 400));
        assert_eq!(img.get_pixel(0, 250), &Rgb([0, 0, 0]));
    }

    #[test]
    fn test_output_format_parse() {
        assert_eq!("PNG".parse::<OutputFormat>().unwrap(), OutputFormat::Png);
        assert_eq!("svg".parse::<OutputFormat>().unwrap(), OutputFormat::Svg);
        assert!("gif".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn test_ascii_preview() {
        let preview = to_ascii(&ean8());
        assert_eq!(preview.chars().count(), 67);
        assert!(preview.starts_with("█ █"));
    }

    #[test]
    fn test_html_page_escapes_data() {
        let page = html_page("<b>&", "barcode_1.png");
        assert!(page.contains("&lt;b&gt;&amp;"));
        assert!(page.contains("<img src=\"barcode_1.png\""));
        assert!(!page.contains("<b>&"));
    }

    #[test]
    fn test_img_tag() {
        let tag = img_tag(b"abc");
        assert_eq!(
            tag,
            "<img src=\"data:image/png;base64,YWJj\" alt=\"Barcode\" style=\"max-width:100%;height:auto;\">"
        );
    }
}
