use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::Error;
use rand::Rng;
use simple_logger::SimpleLogger;

use csv_file_sort::order::Order;
use csv_file_sort::sort::Sort;

use tikv_jemallocator::Jemalloc;
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

fn generate_input(path: &Path, records: usize) -> Result<(), Error> {
    let mut rng = rand::thread_rng();
    let mut writer = BufWriter::new(File::create(path)?);
    writeln!(writer, "id,city,temperature")?;
    let cities = ["Oslo", "Lima", "Cairo", "Perth", "Quito", "Hanoi"];
    for id in 0..records {
        let city = cities[rng.gen_range(0..cities.len())];
        let temperature: f64 = rng.gen_range(-30.0..45.0);
        writeln!(writer, "{},{},{:.1}", id, city, temperature)?;
    }
    writer.flush()?;
    Ok(())
}

fn sort_by_temperature(input_path: &Path, output_path: &Path) -> Result<(), Error> {
    // ascending order is the default
    let mut csv_file =
        Sort::new(input_path.to_path_buf(), output_path.to_path_buf(), "temperature");
    csv_file.with_batch_capacity(1_000);
    let summary = csv_file.sort()?;
    log::info!("Sorted {} records using {} runs", summary.records, summary.runs);
    Ok(())
}

fn sort_by_city_descending(input_path: &Path, output_path: &Path) -> Result<(), Error> {
    let mut csv_file = Sort::new(input_path.to_path_buf(), output_path.to_path_buf(), "city");
    csv_file.with_order(Order::Desc);
    csv_file.sort()?;
    Ok(())
}

fn sort_by_first_column(input_path: &Path, output_path: &Path) -> Result<(), Error> {
    let csv_file = Sort::new(input_path.to_path_buf(), output_path.to_path_buf(), 0usize);
    csv_file.sort()?;
    Ok(())
}

// cargo run -r --example sort_csv_file
pub fn main() -> Result<(), Error> {
    SimpleLogger::new().with_level(log::LevelFilter::Info).init()?;

    let input_path = PathBuf::from("./target/random-10000.csv");
    let temperature_path = PathBuf::from("./target/temperature-10000.csv");
    let city_path = PathBuf::from("./target/city-desc-10000.csv");
    let id_path = PathBuf::from("./target/id-10000.csv");

    generate_input(&input_path, 10_000)?;
    sort_by_temperature(&input_path, &temperature_path)?;
    sort_by_city_descending(&temperature_path, &city_path)?;
    sort_by_first_column(&city_path, &id_path)?;

    let restored = Sort::new(id_path.clone(), PathBuf::new(), "id");
    log::info!("Sorted back by id: {}", restored.check()?);
    Ok(())
}
