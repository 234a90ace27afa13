use std::path::PathBuf;

use clap::Parser;

use informe_pdf::{DeviceClass, Error};

#[derive(Parser)]
#[command(
    name = "informe-pdf",
    version,
    about = "Render a technical service report JSON file as a paginated A4 PDF"
)]
struct Args {
    /// Report JSON file (field values, photos and signatures as data URLs)
    input: PathBuf,

    /// Directory the PDF artifact is written into
    #[arg(short, long, default_value = ".")]
    out_dir: PathBuf,

    /// Device class tag encoded in the artifact name: desktop or mobile
    #[arg(short, long, default_value = "desktop")]
    device: String,
}

fn run(args: &Args) -> Result<PathBuf, Error> {
    let device: DeviceClass = args.device.parse().map_err(Error::InvalidReport)?;
    let doc = informe_pdf::report::parse(&args.input)?;
    informe_pdf::export_report(
        &doc.report,
        &doc.company,
        doc.report_number,
        &doc.date,
        device,
        &args.out_dir,
    )
}

fn main() {
    env_logger::init();
    let args = Args::parse();

    match run(&args) {
        Ok(path) => println!("{}", path.display()),
        Err(e) => {
            eprintln!("error: {e}");
            std::process::exit(1);
        }
    }
}
