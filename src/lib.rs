mod error;
mod fonts;
mod model;
mod pdf;
pub mod report;

pub use error::Error;
pub use model::{
    BatteryInfo, ClientInfo, CompanyInfo, DeviceClass, ElectricalReadings, EmbeddedImage,
    ImageFormat, PhaseReadings, Photo, Report, ServiceInfo, SignatureBlock,
};

use std::path::{Path, PathBuf};
use std::time::Instant;

/// Render a report to PDF bytes.
pub fn render_report(
    report: &Report,
    company: &CompanyInfo,
    report_number: u32,
    date: &str,
) -> Result<Vec<u8>, Error> {
    let t0 = Instant::now();

    let bytes = pdf::render(report, company, report_number, date)?;

    log::info!(
        "Timing: render={:.1}ms (output {} bytes)",
        t0.elapsed().as_secs_f64() * 1000.0,
        bytes.len(),
    );

    Ok(bytes)
}

/// Artifact name: zero-padded report number plus the device-class tag.
pub fn report_file_name(report_number: u32, device: DeviceClass) -> String {
    format!("reporte-tecnico-{report_number:04}-{}.pdf", device.as_str())
}

/// Render a report and write it into `out_dir` under its encoded name.
/// Returns the path of the written artifact.
pub fn export_report(
    report: &Report,
    company: &CompanyInfo,
    report_number: u32,
    date: &str,
    device: DeviceClass,
    out_dir: &Path,
) -> Result<PathBuf, Error> {
    let t0 = Instant::now();

    let bytes = pdf::render(report, company, report_number, date)?;
    let t_render = t0.elapsed();

    let path = out_dir.join(report_file_name(report_number, device));
    std::fs::write(&path, &bytes).map_err(Error::Io)?;
    let t_total = t0.elapsed();

    log::info!(
        "Timing: render={:.1}ms, write={:.1}ms, total={:.1}ms (output {} bytes)",
        t_render.as_secs_f64() * 1000.0,
        (t_total - t_render).as_secs_f64() * 1000.0,
        t_total.as_secs_f64() * 1000.0,
        bytes.len(),
    );

    Ok(path)
}
