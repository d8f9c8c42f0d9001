use crate::config::{Config, DEFAULT_FOLDER};
use crate::error::Result;
use crate::render::{self, OutputFormat, RenderOptions};
use crate::symbology::{self, CodeType};

use std::fs;
use std::path::{Path, PathBuf};

/// Characters that cannot appear in a generated file name.
const FORBIDDEN_FILENAME_CHARS: [char; 9] = ['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

/// Prefix shared by every generated artifact.
const FILE_PREFIX: &str = "barcode_";

/// Everything [`Generator::generate_barcode`] needs to produce one file.
#[derive(Clone, Debug, Default)]
pub struct BarcodeRequest {
    pub data: String,
    pub code_type: CodeType,
    pub format: OutputFormat,
    /// File name without extension. Derived from the payload when `None`.
    pub file_name: Option<String>,
    /// Target folder. The generator's default folder when `None`.
    pub destination: Option<PathBuf>,
    pub options: RenderOptions,
}

impl BarcodeRequest {
    pub fn new(data: impl Into<String>) -> Self {
        Self {
            data: data.into(),
            ..Self::default()
        }
    }

    pub fn code_type(mut self, code_type: CodeType) -> Self {
        self.code_type = code_type;
        self
    }

    pub fn format(mut self, format: OutputFormat) -> Self {
        self.format = format;
        self
    }

    pub fn file_name(mut self, name: impl Into<String>) -> Self {
        self.file_name = Some(name.into());
        self
    }

    pub fn destination(mut self, folder: impl Into<PathBuf>) -> Self {
        self.destination = Some(folder.into());
        self
    }

    pub fn options(mut self, options: RenderOptions) -> Self {
        self.options = options;
        self
    }
}

/// Files written by [`Generator::generate_clean_barcode`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CleanBarcode {
    /// The PNG image.
    pub png: PathBuf,
    /// An `<img>` tag embedding the same PNG as base64.
    pub base64_img: String,
    /// A viewer page that references the PNG next to it.
    pub html: PathBuf,
}

/// Writes barcodes to disk, remembering a default output folder.
#[derive(Clone, Debug)]
pub struct Generator {
    default_folder: PathBuf,
}

impl Default for Generator {
    fn default() -> Self {
        Self::new(DEFAULT_FOLDER)
    }
}

impl Generator {
    /// Creates a generator whose default folder is `folder`. Nothing is created on disk yet.
    pub fn new(folder: impl Into<PathBuf>) -> Self {
        Self {
            default_folder: folder.into(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.output_dir.clone())
    }

    /// Returns the current default folder.
    pub fn default_folder(&self) -> &Path {
        &self.default_folder
    }

    /// Sets the default folder, creating it and storing its absolute path.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the directory cannot be created or resolved.
    pub fn set_default_folder(&mut self, folder: impl AsRef<Path>) -> Result<&Path> {
        fs::create_dir_all(folder.as_ref())?;
        self.default_folder = fs::canonicalize(folder.as_ref())?;
        tracing::info!(folder = %self.default_folder.display(), "default folder set");
        Ok(&self.default_folder)
    }

    /// Generates a barcode image from the request and saves it to a file.
    ///
    /// The code type is detected from the data when the request says `Auto`. If no file
    /// name is given, `barcode_{first 10 payload chars}_{type}` is used. Characters that are
    /// not allowed in file names are replaced with `_`.
    ///
    /// # Returns
    ///
    /// The full path of the written file, extension included.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use barust::generator::{BarcodeRequest, Generator};
    /// use barust::render::OutputFormat;
    ///
    /// let generator = Generator::default();
    /// let request = BarcodeRequest::new("PRODUCT-ABC").format(OutputFormat::Svg);
    /// let path = generator.generate_barcode(&request).unwrap();
    /// assert!(path.ends_with("barcode_PRODUCT-AB_code39.svg"));
    /// ```
    pub fn generate_barcode(&self, request: &BarcodeRequest) -> Result<PathBuf> {
        let folder = self.ensure_folder(request.destination.as_deref())?;

        let bars = symbology::prepare(&request.data, request.code_type)?;
        // A blank name falls back to the derived one.
        let name = match request.file_name.as_deref().filter(|n| !n.trim().is_empty()) {
            Some(name) => name.to_string(),
            None => format!("{}{}_{}", FILE_PREFIX, head(bars.payload()), bars.symbology()),
        };
        let file_path = folder.join(format!(
            "{}.{}",
            sanitize_file_name(&name),
            request.format.extension()
        ));

        match request.format {
            OutputFormat::Png => render::to_image_buffer(&bars, &request.options)?.save(&file_path)?,
            OutputFormat::Svg => fs::write(&file_path, render::to_svg_string(&bars, &request.options)?)?,
        }

        tracing::info!(
            path = %file_path.display(),
            symbology = %bars.symbology(),
            format = %request.format,
            "barcode written"
        );
        Ok(file_path)
    }

    /// Generates a PNG, an inline base64 `<img>` tag and an HTML viewer page.
    ///
    /// The data is validated for its detected type, but the image always uses Code 128 so it
    /// renders the same way whatever the input looks like.
    pub fn generate_clean_barcode(&self, data: &str, destination: Option<&Path>) -> Result<CleanBarcode> {
        let folder = self.ensure_folder(destination)?;

        let bars = symbology::prepare_clean(data)?;
        let stem = sanitize_file_name(&format!("{}{}", FILE_PREFIX, head(bars.payload())));

        let png_bytes = render::to_png_bytes(&bars, &RenderOptions::default())?;
        let png = folder.join(format!("{}.png", stem));
        fs::write(&png, &png_bytes)?;

        let base64_img = render::img_tag(&png_bytes);

        let html = folder.join(format!("{}.html", stem));
        let png_name = format!("{}.png", stem);
        fs::write(&html, render::html_page(data, &png_name))?;

        tracing::info!(
            png = %png.display(),
            html = %html.display(),
            "clean barcode written"
        );
        Ok(CleanBarcode {
            png,
            base64_img,
            html,
        })
    }

    /// Generates a clean barcode and returns only the PNG path.
    pub fn visualize_barcode(&self, data: &str, destination: Option<&Path>) -> Result<PathBuf> {
        self.generate_clean_barcode(data, destination).map(|clean| clean.png)
    }

    /// Generates an auto-detected PNG with default options.
    pub fn quick_barcode(&self, data: &str, destination: Option<&Path>) -> Result<PathBuf> {
        let mut request = BarcodeRequest::new(data);
        request.destination = destination.map(Path::to_path_buf);
        self.generate_barcode(&request)
    }

    /// Lists generated barcode files (`barcode_*.png|svg|html`) in `folder`, sorted.
    ///
    /// Uses the default folder when `folder` is `None`. A missing folder yields an empty list.
    pub fn list_generated_files(&self, folder: Option<&Path>) -> Result<Vec<PathBuf>> {
        let folder = folder.unwrap_or(&self.default_folder);
        if !folder.exists() {
            return Ok(Vec::new());
        }

        let mut files = Vec::new();
        for entry in fs::read_dir(folder)? {
            let entry = entry?;
            let name = entry.file_name();
            let Some(name) = name.to_str() else {
                continue;
            };
            if is_generated_name(name) {
                files.push(entry.path());
            }
        }
        files.sort();
        Ok(files)
    }

    fn ensure_folder(&self, destination: Option<&Path>) -> Result<PathBuf> {
        let folder = destination.unwrap_or(&self.default_folder);
        // Check if the directory exists, create it if it doesn't
        if !folder.exists() {
            fs::create_dir_all(folder)?;
        }
        Ok(folder.to_path_buf())
    }
}

fn head(payload: &str) -> String {
    payload.chars().take(10).collect()
}

/// Replaces every character that is not allowed in a file name with `_`.
pub fn sanitize_file_name(name: &str) -> String {
    name.chars()
        .map(|c| if FORBIDDEN_FILENAME_CHARS.contains(&c) { '_' } else { c })
        .collect()
}

fn is_generated_name(name: &str) -> bool {
    name.starts_with(FILE_PREFIX)
        && [".png", ".svg", ".html"].iter().any(|ext| name.ends_with(ext))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbology::Symbology;

    #[test]
    fn test_sanitize_file_name() {
        assert_eq!(sanitize_file_name(r#"a<b>c:d"e/f\g|h?i*j"#), "a_b_c_d_e_f_g_h_i_j");
        assert_eq!(sanitize_file_name("barcode_ok-1"), "barcode_ok-1");
    }

    #[test]
    fn test_head_counts_chars() {
        assert_eq!(head("590123412345"), "5901234123");
        assert_eq!(head("abc"), "abc");
    }

    #[test]
    fn test_is_generated_name() {
        assert!(is_generated_name("barcode_123.png"));
        assert!(is_generated_name("barcode_123.html"));
        assert!(is_generated_name("barcode_x_code39.svg"));
        assert!(!is_generated_name("barcode_123.txt"));
        assert!(!is_generated_name("other_123.png"));
    }

    #[test]
    fn test_request_builder() {
        let request = BarcodeRequest::new("ABC")
            .code_type(CodeType::Fixed(Symbology::Code39))
            .format(OutputFormat::Svg)
            .file_name("label");
        assert_eq!(request.data, "ABC");
        assert_eq!(request.code_type, CodeType::Fixed(Symbology::Code39));
        assert_eq!(request.format, OutputFormat::Svg);
        assert_eq!(request.file_name.as_deref(), Some("label"));
        assert!(request.destination.is_none());
    }
}
