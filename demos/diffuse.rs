use log::*;
use perona_malik::{diffuse_path, Conductance, DiffusionParameters, Kappa};

const USAGE: &str = "usage: diffuse <exponential|rational|charbonnier> <iterations> <kappa|auto> <lambda> <input> <output>";

fn main() {
    pretty_env_logger::init_timed();
    let args: Vec<_> = std::env::args().collect();
    if args.len() != 7 {
        eprintln!("{USAGE}");
        std::process::exit(2);
    }
    let conductance: Conductance = args[1].parse().unwrap();
    let iterations: usize = args[2].parse().expect(USAGE);
    let kappa = match args[3].as_str() {
        "auto" => Kappa::estimated(),
        value => Kappa::Fixed(value.parse().expect(USAGE)),
    };
    let lambda: f64 = args[4].parse().expect(USAGE);
    let params = DiffusionParameters::new(iterations, kappa, lambda);

    let (filtered, applied) = diffuse_path(&args[5], conductance, &params).unwrap();
    filtered.to_luma8().save(&args[6]).unwrap();
    info!("Wrote {}", args[6]);
    println!("{conductance}: {applied}");
}
