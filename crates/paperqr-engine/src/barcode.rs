//! QR rendering and scanning through external programs
//!
//! Defaults: `qrencode --8bit --level=L --output=- ...` renders a frame read
//! from stdin into a PNG on stdout; `zbarimg --raw --oneshot --set=binary -`
//! reads a PNG from stdin and prints the raw frame bytes.

use std::io::Write;
use std::process::{Command, Stdio};

use anyhow::Context;

use paperqr_core::config::BarcodeConfig;
use paperqr_pages::Barcode;

#[derive(Debug, Clone)]
pub struct CommandBarcode {
    render_program: String,
    render_args: Vec<String>,
    scan_program: String,
    scan_args: Vec<String>,
}

impl CommandBarcode {
    pub fn new(
        render_program: impl Into<String>,
        render_args: Vec<String>,
        scan_program: impl Into<String>,
        scan_args: Vec<String>,
    ) -> Self {
        Self {
            render_program: render_program.into(),
            render_args,
            scan_program: scan_program.into(),
            scan_args,
        }
    }

    pub fn from_config(config: &BarcodeConfig) -> Self {
        Self::new(
            &config.render_program,
            config.render_args.clone(),
            &config.scan_program,
            config.scan_args.clone(),
        )
    }
}

impl Barcode for CommandBarcode {
    fn render(&self, frame: &[u8]) -> anyhow::Result<Vec<u8>> {
        run_piped("generate QR code", &self.render_program, &self.render_args, frame)
    }

    fn scan(&self, image: &[u8]) -> anyhow::Result<Vec<u8>> {
        let mut frame = run_piped("scan QR code", &self.scan_program, &self.scan_args, image)?;
        // zbarimg terminates raw output with a newline
        if frame.last() == Some(&b'\n') {
            frame.pop();
        }
        Ok(frame)
    }
}

/// Run `program args..`, feeding `input` on stdin and collecting stdout.
fn run_piped(action: &str, program: &str, args: &[String], input: &[u8]) -> anyhow::Result<Vec<u8>> {
    let mut child = Command::new(program)
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .with_context(|| format!("{action}: spawning {program}"))?;

    let mut stdin = child
        .stdin
        .take()
        .with_context(|| format!("{action}: {program} stdin unavailable"))?;

    // Feed stdin from a second thread so a full stdout pipe cannot deadlock us
    let (output, written) = std::thread::scope(|scope| {
        let writer = scope.spawn(move || {
            let result = stdin.write_all(input);
            drop(stdin);
            result
        });
        let output = child.wait_with_output();
        let written = writer
            .join()
            .map_err(|_| anyhow::anyhow!("{action}: stdin writer panicked"))?;
        anyhow::Ok((output, written))
    })?;
    let output = output.with_context(|| format!("{action}: waiting for {program}"))?;

    // Status before stdin errors: an early exit also breaks the pipe
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        anyhow::bail!("{action} failed ({program}, {}): {}", output.status, stderr.trim());
    }
    written.with_context(|| format!("{action}: writing to {program}"))?;

    tracing::debug!(program, input_len = input.len(), output_len = output.stdout.len(), "{action}");
    Ok(output.stdout)
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    fn cat_barcode() -> CommandBarcode {
        CommandBarcode::new("cat", Vec::new(), "cat", Vec::new())
    }

    #[test]
    fn render_pipes_through_program() {
        let frame = b"\x00\x01binary\xFFframe".to_vec();
        assert_eq!(cat_barcode().render(&frame).unwrap(), frame);
    }

    #[test]
    fn scan_strips_trailing_newline() {
        assert_eq!(cat_barcode().scan(b"frame\n").unwrap(), b"frame");
    }

    #[test]
    fn large_input_does_not_deadlock() {
        let image = vec![0x42u8; 1 << 20];
        assert_eq!(cat_barcode().render(&image).unwrap().len(), image.len());
    }

    #[test]
    fn failing_program_reports_status() {
        let barcode = CommandBarcode::new("false", Vec::new(), "false", Vec::new());
        let err = barcode.render(b"frame").unwrap_err();
        assert!(err.to_string().contains("generate QR code failed"));
    }

    #[test]
    fn missing_program_reports_spawn_error() {
        let barcode = CommandBarcode::new(
            "paperqr-no-such-program",
            Vec::new(),
            "paperqr-no-such-program",
            Vec::new(),
        );
        let err = barcode.scan(b"image").unwrap_err();
        assert!(format!("{err:#}").contains("spawning paperqr-no-such-program"));
    }

    #[test]
    fn from_config_uses_configured_programs() {
        let config = BarcodeConfig {
            render_program: "cat".into(),
            render_args: Vec::new(),
            scan_program: "cat".into(),
            scan_args: Vec::new(),
            image_extension: "bin".into(),
        };
        let barcode = CommandBarcode::from_config(&config);
        assert_eq!(barcode.render(b"x").unwrap(), b"x");
    }
}
