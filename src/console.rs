//! Interactive menu for trying the generator by hand.
//!
//! [`Console`] is generic over its input and output so a session can be scripted in tests.
//! End of input at any prompt ends the session.

use crate::config::DEFAULT_FOLDER;
use crate::generator::{BarcodeRequest, Generator};
use crate::render::{self, OutputFormat, RenderOptions};
use crate::symbology::{self, CodeType};

use std::fs;
use std::io::{self, BufRead, Write};
use std::path::Path;

const RULE_WIDTH: usize = 60;

enum Flow {
    Continue,
    Exit,
}

/// A menu-driven session over a [`Generator`].
pub struct Console<R, W> {
    input: R,
    output: W,
    generator: Generator,
}

impl<R: BufRead, W: Write> Console<R, W> {
    pub fn new(input: R, output: W, generator: Generator) -> Self {
        Self {
            input,
            output,
            generator,
        }
    }

    pub fn generator(&self) -> &Generator {
        &self.generator
    }

    /// Consumes the console, returning the generator and the output stream.
    pub fn into_parts(self) -> (Generator, W) {
        (self.generator, self.output)
    }

    /// Runs the menu loop until the user exits or input ends.
    pub fn run(&mut self) -> io::Result<()> {
        writeln!(self.output, "Starting barcode tester...")?;

        let folder = self.generator.default_folder().to_path_buf();
        if !folder.exists() {
            writeln!(self.output, "Creating default folder: {}", folder.display())?;
            fs::create_dir_all(&folder)?;
        }

        loop {
            self.show_menu()?;
            let Some(option) = self.prompt("\n> Choose an option: ")? else {
                writeln!(self.output, "\nInput closed, exiting...")?;
                return Ok(());
            };

            let flow = match option.as_str() {
                "1" => self.clean_barcode()?,
                "2" => self.quick_barcode()?,
                "3" => self.complete_barcode()?,
                "4" => self.visualize_barcode()?,
                "5" => self.configure_folder()?,
                "6" => self.list_barcodes()?,
                "7" => self.show_info()?,
                "0" => {
                    writeln!(self.output, "\nClosing barcode tester...")?;
                    writeln!(self.output, "Thanks for using the barcode generator!")?;
                    return Ok(());
                }
                other => {
                    writeln!(self.output, "Invalid option: '{}'", other)?;
                    writeln!(self.output, "Choose a number from 0 to 7")?;
                    Flow::Continue
                }
            };

            if let Flow::Exit = flow {
                return Ok(());
            }
            if self.prompt("\nPress Enter to continue...")?.is_none() {
                return Ok(());
            }
        }
    }

    fn show_menu(&mut self) -> io::Result<()> {
        let rule = "=".repeat(RULE_WIDTH);
        writeln!(self.output, "\n{}", rule)?;
        writeln!(self.output, "BARCODE TESTER")?;
        writeln!(self.output, "{}", rule)?;
        writeln!(self.output, "1  Generate clean barcode (PNG + HTML + Base64)")?;
        writeln!(self.output, "2  Generate quick barcode (plain PNG)")?;
        writeln!(self.output, "3  Generate barcode with all options")?;
        writeln!(self.output, "4  Visualize barcode (PNG for display)")?;
        writeln!(self.output, "5  Configure default folder")?;
        writeln!(self.output, "6  List generated barcodes")?;
        writeln!(self.output, "7  Show current folder")?;
        writeln!(self.output, "0  Exit")?;
        writeln!(self.output, "{}", rule)
    }

    fn section(&mut self, title: &str) -> io::Result<()> {
        writeln!(self.output, "\n{}", title)?;
        writeln!(self.output, "{}", "-".repeat(40))
    }

    /// Writes `text`, then reads one trimmed line. `None` means end of input.
    fn prompt(&mut self, text: &str) -> io::Result<Option<String>> {
        write!(self.output, "{}", text)?;
        self.output.flush()?;
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }

    fn read_data(&mut self) -> io::Result<Option<String>> {
        writeln!(self.output, "\nEnter the data for the barcode:")?;
        writeln!(self.output, "Numbers, letters, symbols - everything is read as text")?;
        writeln!(self.output, "Examples: '123456789', 'PRODUCT-ABC', 'Hello World 2025'")?;

        loop {
            let Some(data) = self.prompt("\n> Data: ")? else {
                return Ok(None);
            };
            if data.is_empty() {
                writeln!(self.output, "Please enter some data!")?;
                continue;
            }

            writeln!(self.output, "\nData received: '{}'", data)?;
            let Some(answer) = self.prompt("Confirm? (y/n): ")? else {
                return Ok(None);
            };
            match answer.to_lowercase().as_str() {
                "s" | "sim" | "y" | "yes" | "" => return Ok(Some(data)),
                "n" | "nao" | "não" | "no" => {
                    writeln!(self.output, "Enter it again...")?;
                }
                _ => {
                    writeln!(self.output, "Invalid answer, taking it as 'yes'...")?;
                    return Ok(Some(data));
                }
            }
        }
    }

    fn report_file(&mut self, label: &str, path: &Path) -> io::Result<()> {
        match fs::metadata(path) {
            Ok(meta) => {
                writeln!(self.output, "\nSUCCESS! {}: {}", label, path.display())?;
                writeln!(self.output, "Size: {} bytes", meta.len())
            }
            Err(_) => writeln!(self.output, "File was not created"),
        }
    }

    fn clean_barcode(&mut self) -> io::Result<Flow> {
        self.section("TEST: Generate clean barcode")?;
        let Some(data) = self.read_data()? else {
            return Ok(Flow::Exit);
        };

        writeln!(self.output, "\nGenerating clean barcode for: '{}'", data)?;
        match self.generator.generate_clean_barcode(&data, None) {
            Ok(clean) => {
                writeln!(self.output, "\nSUCCESS! Files generated:")?;
                writeln!(self.output, "PNG: {}", clean.png.display())?;
                writeln!(self.output, "HTML: {}", clean.html.display())?;
                writeln!(self.output, "Base64: HTML <img> tag ready to embed ({} bytes)", clean.base64_img.len())?;
                for path in [&clean.png, &clean.html] {
                    if let Ok(meta) = fs::metadata(path) {
                        writeln!(self.output, "File created: {} ({} bytes)", path.display(), meta.len())?;
                    }
                }
                writeln!(self.output, "\nTIP: to see the barcode, open {}", clean.html.display())?;
            }
            Err(e) => writeln!(self.output, "ERROR: {}", e)?,
        }
        Ok(Flow::Continue)
    }

    fn quick_barcode(&mut self) -> io::Result<Flow> {
        self.section("TEST: Generate quick barcode")?;
        let Some(data) = self.read_data()? else {
            return Ok(Flow::Exit);
        };

        writeln!(self.output, "\nGenerating quick barcode for: '{}'", data)?;
        match self.generator.quick_barcode(&data, None) {
            Ok(path) => self.report_file("PNG generated", &path)?,
            Err(e) => writeln!(self.output, "ERROR: {}", e)?,
        }
        Ok(Flow::Continue)
    }

    fn complete_barcode(&mut self) -> io::Result<Flow> {
        self.section("TEST: Generate barcode with all options")?;
        let Some(data) = self.read_data()? else {
            return Ok(Flow::Exit);
        };

        writeln!(self.output, "\nAdvanced options:")?;
        writeln!(self.output, "1. Type: auto, code128, code39, ean13, ean8, upc")?;
        let Some(code_type) = self.prompt("> Code type (Enter=auto): ")? else {
            return Ok(Flow::Exit);
        };
        writeln!(self.output, "2. Format: png, svg")?;
        let Some(format) = self.prompt("> Format (Enter=png): ")? else {
            return Ok(Flow::Exit);
        };
        let Some(file_name) = self.prompt("> File name (Enter=automatic): ")? else {
            return Ok(Flow::Exit);
        };
        writeln!(self.output, "3. Render options: key=value separated by spaces")?;
        writeln!(self.output, "   module_width, module_height, quiet_zone, foreground, background")?;
        let Some(option_pairs) = self.prompt("> Options (Enter=defaults): ")? else {
            return Ok(Flow::Exit);
        };

        let code_type = if code_type.is_empty() { "auto".to_string() } else { code_type };
        let format = if format.is_empty() { "png".to_string() } else { format };

        writeln!(self.output, "\nGenerating barcode...")?;
        writeln!(self.output, "Data: '{}' | Type: {} | Format: {}", data, code_type, format)?;

        let result = build_request(&data, &code_type, &format, &file_name, &option_pairs)
            .and_then(|request| self.generator.generate_barcode(&request));
        match result {
            Ok(path) => self.report_file("File generated", &path)?,
            Err(e) => writeln!(self.output, "ERROR: {}", e)?,
        }
        Ok(Flow::Continue)
    }

    fn visualize_barcode(&mut self) -> io::Result<Flow> {
        self.section("TEST: Visualize barcode")?;
        let Some(data) = self.read_data()? else {
            return Ok(Flow::Exit);
        };

        writeln!(self.output, "\nGenerating barcode for display: '{}'", data)?;
        match self.generator.visualize_barcode(&data, None) {
            Ok(path) => {
                self.report_file("Clean PNG generated", &path)?;
                if let Ok(bars) = symbology::prepare_clean(&data) {
                    let preview = render::to_ascii(&bars);
                    writeln!(self.output, "\n{}\n{}\n{}", preview, preview, preview)?;
                }
            }
            Err(e) => writeln!(self.output, "ERROR: {}", e)?,
        }
        Ok(Flow::Continue)
    }

    fn configure_folder(&mut self) -> io::Result<Flow> {
        self.section("CONFIGURE DEFAULT FOLDER")?;
        writeln!(self.output, "Current folder: {}", self.generator.default_folder().display())?;

        writeln!(self.output, "\nEnter the folder path (or Enter for the default):")?;
        writeln!(self.output, "Example: './my_barcodes' or '/tmp/codes'")?;
        let Some(folder) = self.prompt("> Folder: ")? else {
            return Ok(Flow::Exit);
        };
        let folder = if folder.is_empty() { DEFAULT_FOLDER.to_string() } else { folder };

        match self.generator.set_default_folder(&folder) {
            Ok(path) => {
                let path = path.display().to_string();
                writeln!(self.output, "Default folder updated: {}", path)?;
            }
            Err(e) => writeln!(self.output, "ERROR configuring folder: {}", e)?,
        }
        Ok(Flow::Continue)
    }

    fn list_barcodes(&mut self) -> io::Result<Flow> {
        self.section("GENERATED BARCODES")?;
        let folder = self.generator.default_folder().display().to_string();

        let files = match self.generator.list_generated_files(None) {
            Ok(files) => files,
            Err(e) => {
                writeln!(self.output, "ERROR listing files: {}", e)?;
                return Ok(Flow::Continue);
            }
        };

        if files.is_empty() {
            writeln!(self.output, "No barcodes found in the current folder")?;
            writeln!(self.output, "Folder: {}", folder)?;
            return Ok(Flow::Continue);
        }

        writeln!(self.output, "Folder: {}", folder)?;
        writeln!(self.output, "Total: {} file(s)", files.len())?;
        writeln!(self.output, "\nFiles found:")?;
        for (i, path) in files.iter().enumerate() {
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            match fs::metadata(path) {
                Ok(meta) => writeln!(self.output, "{:2}. {} ({} bytes)", i + 1, name, meta.len())?,
                Err(_) => writeln!(self.output, "{:2}. {} (file not found)", i + 1, name)?,
            }
        }
        Ok(Flow::Continue)
    }

    fn show_info(&mut self) -> io::Result<Flow> {
        self.section("SYSTEM INFORMATION")?;
        let folder = self.generator.default_folder().to_path_buf();
        writeln!(self.output, "Default folder: {}", folder.display())?;
        writeln!(
            self.output,
            "Folder exists: {}",
            if folder.exists() { "yes" } else { "no" }
        )?;
        match self.generator.list_generated_files(None) {
            Ok(files) => writeln!(self.output, "Total barcodes: {}", files.len())?,
            Err(_) => writeln!(self.output, "Total barcodes: error while counting")?,
        }
        Ok(Flow::Continue)
    }
}

/// Builds a request from the raw answers of the "all options" prompt.
fn build_request(
    data: &str,
    code_type: &str,
    format: &str,
    file_name: &str,
    option_pairs: &str,
) -> crate::error::Result<BarcodeRequest> {
    let mut options = RenderOptions::default();
    for pair in option_pairs.split_whitespace() {
        options.apply_pair(pair)?;
    }

    let mut request = BarcodeRequest::new(data)
        .code_type(code_type.parse::<CodeType>()?)
        .format(format.parse::<OutputFormat>()?)
        .options(options);
    if !file_name.is_empty() {
        request = request.file_name(file_name);
    }
    Ok(request)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbology::Symbology;

    #[test]
    fn test_build_request_defaults() {
        let request = build_request("ABC", "auto", "png", "", "").unwrap();
        assert_eq!(request.code_type, CodeType::Auto);
        assert_eq!(request.format, OutputFormat::Png);
        assert!(request.file_name.is_none());
        assert_eq!(request.options, RenderOptions::default());
    }

    #[test]
    fn test_build_request_all_fields() {
        let request = build_request("123", "ean8", "SVG", "label", "module_width=3 quiet_zone=2").unwrap();
        assert_eq!(request.code_type, CodeType::Fixed(Symbology::Ean8));
        assert_eq!(request.format, OutputFormat::Svg);
        assert_eq!(request.file_name.as_deref(), Some("label"));
        assert_eq!(request.options.module_width, 3);
        assert_eq!(request.options.quiet_zone, 2);
    }

    #[test]
    fn test_build_request_rejects_bad_input() {
        assert!(build_request("ABC", "qr", "png", "", "").is_err());
        assert!(build_request("ABC", "auto", "gif", "", "").is_err());
        assert!(build_request("ABC", "auto", "png", "", "module_width=wide").is_err());
    }

    #[test]
    fn test_exit_on_zero() {
        let dir = tempfile::tempdir().unwrap();
        let mut console = Console::new(&b"0\n"[..], Vec::new(), Generator::new(dir.path()));
        console.run().unwrap();

        let (_, output) = console.into_parts();
        let output = String::from_utf8(output).unwrap();
        assert!(output.contains("BARCODE TESTER"));
        assert!(output.contains("Thanks for using the barcode generator!"));
    }

    #[test]
    fn test_eof_ends_session() {
        let dir = tempfile::tempdir().unwrap();
        let mut console = Console::new(&b""[..], Vec::new(), Generator::new(dir.path()));
        assert!(console.run().is_ok());
    }
}
