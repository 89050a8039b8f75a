use std::fs;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::PathBuf;
use std::str::FromStr;

use data_encoding::HEXLOWER;
use rand::Rng;

pub fn setup() {
    let results_dir_path = PathBuf::from_str("./target/results/").unwrap();

    if !results_dir_path.exists() {
        fs::create_dir_all(&results_dir_path).unwrap_or_else(|_|
            panic!("Failed to create results directory: {:?}", results_dir_path)
        );
    } else {
        println!("Results directory exists at {:?}", results_dir_path);
    }
}

/// Create an empty, uniquely named directory for intermediate runs
#[allow(dead_code)]
pub fn tmp_dir() -> PathBuf {
    let path = temp_file_name("./target/results/");
    fs::create_dir_all(&path).unwrap_or_else(|_|
        panic!("Failed to create tmp directory: {:?}", path)
    );
    path
}

#[allow(dead_code)]
pub fn read_lines(path: PathBuf) -> Result<Vec<String>, anyhow::Error> {
    let reader = BufReader::new(File::open(path)?);
    let lines = reader.lines().map(|x| x.unwrap()).collect();
    Ok(lines)
}

#[allow(dead_code)]
pub fn temp_file_name(dir: &str) -> PathBuf {
    let mut result = PathBuf::from(dir);
    let name = HEXLOWER.encode(&rand::random::<[u8; 16]>());
    result.push(name);
    result
}

#[allow(dead_code)]
pub fn write_lines(path: &PathBuf, lines: &[&str]) -> Result<(), anyhow::Error> {
    let mut writer = BufWriter::new(File::create(path)?);
    for line in lines {
        writeln!(writer, "{}", line)?;
    }
    writer.flush()?;
    Ok(())
}

/// Write `rows` random records with header `id,amount,name`. The id is the row number, the
/// amount a random integer and the name a random lowercase word.
#[allow(dead_code)]
pub fn write_random_csv(path: &PathBuf, rows: usize) -> Result<(), anyhow::Error> {
    let mut rng = rand::thread_rng();
    let mut writer = BufWriter::new(File::create(path)?);
    writeln!(writer, "id,amount,name")?;
    for id in 0..rows {
        let amount: i64 = rng.gen_range(-1000..1000);
        let name: String = (0..rng.gen_range(1..8))
            .map(|_| rng.gen_range(b'a'..=b'z') as char)
            .collect();
        writeln!(writer, "{},{},{}", id, amount, name)?;
    }
    writer.flush()?;
    Ok(())
}

#[allow(dead_code)]
pub fn dir_is_empty(path: &PathBuf) -> Result<bool, anyhow::Error> {
    Ok(fs::read_dir(path)?.next().is_none())
}
