use clap::Parser;
use exe_ver_rs::VersionRecord;
use std::io;
use std::path::PathBuf;

/// Inspect the version metadata embedded in an executable
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// File to read
    #[arg(short, long)]
    file: PathBuf,
}

fn main() -> io::Result<()> {
    let args = Args::parse();
    let file = args.file;
    println!("Scanning {} for version metadata", file.display());

    let r = VersionRecord::from_file(&file);

    let fv = r.file_version;
    let pv = r.product_version;
    println!(
        "file version:    {fv}  (raw 0x{:016x}, compact 0x{:08x})",
        fv.raw(),
        fv.compact()
    );
    println!(
        "product version: {pv}  (raw 0x{:016x}, compact 0x{:08x})",
        pv.raw(),
        pv.compact()
    );

    match r.build_time() {
        Some(t) => println!("build time:      {t}"),
        None => println!("build time:      unknown"),
    }
    Ok(())
}
