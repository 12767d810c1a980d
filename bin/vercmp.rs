use clap::Parser;
use exe_ver_rs::VersionRecord;
use std::cmp::Ordering;
use std::io;
use std::path::PathBuf;

/// Compare the file versions of two executables
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Compare the product versions instead
    #[arg(required = false, short, long)]
    product: bool,

    /// First file
    #[arg(index = 1)]
    left: PathBuf,

    /// Second file
    #[arg(index = 2)]
    right: PathBuf,
}

fn main() -> io::Result<()> {
    let args = Args::parse();

    let l = VersionRecord::from_file(&args.left);
    let r = VersionRecord::from_file(&args.right);

    let (lv, rv, ord) = if args.product {
        (l.product_version, r.product_version, l.cmp_product_version(&r))
    } else {
        (l.file_version, r.file_version, l.cmp_file_version(&r))
    };

    println!("{}: {lv}", args.left.display());
    println!("{}: {rv}", args.right.display());

    match ord {
        Ordering::Less => println!("{} is older", args.left.display()),
        Ordering::Greater => println!("{} is newer", args.left.display()),
        Ordering::Equal => println!("same version"),
    }
    Ok(())
}
