use std::fs;
use std::path::PathBuf;

use csv_file_sort::error::SortError;
use csv_file_sort::key::Key;
use csv_file_sort::order::Order;
use csv_file_sort::sort::Sort;

mod common;

#[test]
fn test_sort_by_name_across_runs() -> Result<(), anyhow::Error> {
    common::setup();
    let input_path = common::temp_file_name("./target/results/");
    let output_path = common::temp_file_name("./target/results/");
    let tmp_path = common::tmp_dir();
    common::write_lines(&input_path, &["id,value", "1,30", "2,10", "3,20"])?;

    let mut csv_file_sort = Sort::new(input_path.clone(), output_path.clone(), "value");
    csv_file_sort.with_batch_capacity(2);
    csv_file_sort.with_tmp_dir(tmp_path.clone());
    let summary = csv_file_sort.sort()?;

    assert_eq!(summary.runs, 2);
    assert_eq!(summary.records, 3);
    let lines = common::read_lines(output_path.clone())?;
    assert_eq!(lines, vec!["id,value", "2,10", "3,20", "1,30"]);
    assert!(common::dir_is_empty(&tmp_path)?);
    fs::remove_file(input_path)?;
    fs::remove_file(output_path)?;
    fs::remove_dir(tmp_path)?;
    Ok(())
}

#[test]
fn test_sort_desc_by_index() -> Result<(), anyhow::Error> {
    common::setup();
    let input_path = common::temp_file_name("./target/results/");
    let output_path = common::temp_file_name("./target/results/");
    let tmp_path = common::tmp_dir();
    common::write_lines(&input_path, &["id,name", "5,e", "3,c", "4,d", "1,a", "2,b"])?;

    let mut csv_file_sort = Sort::new(input_path.clone(), output_path.clone(), 0usize);
    csv_file_sort.with_order(Order::Desc);
    csv_file_sort.with_batch_capacity(2);
    csv_file_sort.with_tmp_dir(tmp_path.clone());
    let summary = csv_file_sort.sort()?;
    assert_eq!(summary.runs, 3);

    let lines = common::read_lines(output_path.clone())?;
    assert_eq!(lines, vec!["id,name", "5,e", "4,d", "3,c", "2,b", "1,a"]);
    assert!(common::dir_is_empty(&tmp_path)?);
    fs::remove_file(input_path)?;
    fs::remove_file(output_path)?;
    fs::remove_dir(tmp_path)?;
    Ok(())
}

#[test]
fn test_numeric_keys_sort_numerically() -> Result<(), anyhow::Error> {
    common::setup();
    let input_path = common::temp_file_name("./target/results/");
    let output_path = common::temp_file_name("./target/results/");
    common::write_lines(&input_path, &["n", "2", "10", "1"])?;

    let csv_file_sort = Sort::new(input_path.clone(), output_path.clone(), "n");
    csv_file_sort.sort()?;

    let lines = common::read_lines(output_path.clone())?;
    assert_eq!(lines, vec!["n", "1", "2", "10"]);
    fs::remove_file(input_path)?;
    fs::remove_file(output_path)?;
    Ok(())
}

#[test]
fn test_numbers_before_text() -> Result<(), anyhow::Error> {
    common::setup();
    let input_path = common::temp_file_name("./target/results/");
    let asc_path = common::temp_file_name("./target/results/");
    let desc_path = common::temp_file_name("./target/results/");
    common::write_lines(&input_path, &["k", "b", "3", "\"\"", "a", "-1.5"])?;

    let mut asc_sort = Sort::new(input_path.clone(), asc_path.clone(), "k");
    asc_sort.with_batch_capacity(2);
    asc_sort.sort()?;
    let mut desc_sort = Sort::new(input_path.clone(), desc_path.clone(), "k");
    desc_sort.with_batch_capacity(2);
    desc_sort.with_order(Order::Desc);
    desc_sort.sort()?;

    // a record with one empty field is written quoted
    let asc_lines = common::read_lines(asc_path.clone())?;
    assert_eq!(asc_lines, vec!["k", "-1.5", "3", "\"\"", "a", "b"]);
    let desc_lines = common::read_lines(desc_path.clone())?;
    assert_eq!(desc_lines, vec!["k", "b", "a", "\"\"", "3", "-1.5"]);
    fs::remove_file(input_path)?;
    fs::remove_file(asc_path)?;
    fs::remove_file(desc_path)?;
    Ok(())
}

#[test]
fn test_equal_keys_keep_input_order() -> Result<(), anyhow::Error> {
    common::setup();
    let input_path = common::temp_file_name("./target/results/");
    let output_path = common::temp_file_name("./target/results/");
    let input = ["id,group", "a,2", "b,1", "c,2", "d,1", "e,2", "f,1", "g,2"];
    common::write_lines(&input_path, &input)?;

    let mut csv_file_sort = Sort::new(input_path.clone(), output_path.clone(), "group");
    csv_file_sort.with_order(Order::Desc);
    csv_file_sort.with_batch_capacity(3);
    csv_file_sort.sort()?;

    let lines = common::read_lines(output_path.clone())?;
    assert_eq!(lines, vec!["id,group", "a,2", "c,2", "e,2", "g,2", "b,1", "d,1", "f,1"]);
    fs::remove_file(input_path)?;
    fs::remove_file(output_path)?;
    Ok(())
}

#[test]
fn test_random_input_is_complete_and_ordered() -> Result<(), anyhow::Error> {
    common::setup();
    let input_path = common::temp_file_name("./target/results/");
    let output_path = common::temp_file_name("./target/results/");
    let resorted_path = common::temp_file_name("./target/results/");
    let tmp_path = common::tmp_dir();
    common::write_random_csv(&input_path, 5_000)?;

    let mut csv_file_sort = Sort::new(input_path.clone(), output_path.clone(), "amount");
    csv_file_sort.with_batch_capacity(317);
    csv_file_sort.with_tmp_dir(tmp_path.clone());
    let summary = csv_file_sort.sort()?;
    assert_eq!(summary.runs, 16);
    assert_eq!(summary.records, 5_000);

    let input_lines = common::read_lines(input_path.clone())?;
    let output_lines = common::read_lines(output_path.clone())?;
    assert_eq!(input_lines.len(), output_lines.len());
    assert_eq!(input_lines[0], output_lines[0]);

    let mut expected = input_lines[1..].to_vec();
    let mut actual = output_lines[1..].to_vec();
    expected.sort();
    actual.sort();
    assert_eq!(expected, actual);

    let amounts: Vec<Key> = output_lines[1..]
        .iter()
        .map(|line| Key::coerce(line.split(',').nth(1).unwrap()))
        .collect();
    assert!(amounts.windows(2).all(|w| w[0] <= w[1]));

    let mut resort = Sort::new(output_path.clone(), resorted_path.clone(), "amount");
    resort.with_batch_capacity(101);
    resort.with_tmp_dir(tmp_path.clone());
    resort.sort()?;
    assert_eq!(fs::read(&output_path)?, fs::read(&resorted_path)?);

    assert!(common::dir_is_empty(&tmp_path)?);
    fs::remove_file(input_path)?;
    fs::remove_file(output_path)?;
    fs::remove_file(resorted_path)?;
    fs::remove_dir(tmp_path)?;
    Ok(())
}

#[test]
fn test_quoted_fields_and_tab_delimiter() -> Result<(), anyhow::Error> {
    common::setup();
    let input_path = common::temp_file_name("./target/results/");
    let output_path = common::temp_file_name("./target/results/");
    common::write_lines(&input_path, &["name\tscore", "\"smith, j\"\t7", "doe\t12", "roe\t-3"])?;

    let mut csv_file_sort = Sort::new(input_path.clone(), output_path.clone(), "score");
    csv_file_sort.with_delimiter(b'\t');
    csv_file_sort.with_batch_capacity(1);
    csv_file_sort.sort()?;

    let lines = common::read_lines(output_path.clone())?;
    assert_eq!(lines, vec!["name\tscore", "roe\t-3", "smith, j\t7", "doe\t12"]);
    fs::remove_file(input_path)?;
    fs::remove_file(output_path)?;
    Ok(())
}

#[test]
fn test_header_only_input() -> Result<(), anyhow::Error> {
    common::setup();
    let input_path = common::temp_file_name("./target/results/");
    let output_path = common::temp_file_name("./target/results/");
    let tmp_path = common::tmp_dir();
    common::write_lines(&input_path, &["id,value"])?;

    let mut csv_file_sort = Sort::new(input_path.clone(), output_path.clone(), "value");
    csv_file_sort.with_tmp_dir(tmp_path.clone());
    let summary = csv_file_sort.sort()?;
    assert_eq!(summary.runs, 0);
    assert_eq!(summary.records, 0);
    assert_eq!(common::read_lines(output_path.clone())?, vec!["id,value"]);
    assert!(common::dir_is_empty(&tmp_path)?);
    fs::remove_file(input_path)?;
    fs::remove_file(output_path)?;
    fs::remove_dir(tmp_path)?;
    Ok(())
}

#[test]
fn test_invalid_key_has_no_side_effects() -> Result<(), anyhow::Error> {
    common::setup();
    let input_path = common::temp_file_name("./target/results/");
    let output_path = common::temp_file_name("./target/results/");
    let tmp_path = common::tmp_dir();
    common::write_lines(&input_path, &["id,value", "1,30", "2,10"])?;

    let mut by_name = Sort::new(input_path.clone(), output_path.clone(), "price");
    by_name.with_tmp_dir(tmp_path.clone());
    assert!(matches!(by_name.sort(), Err(SortError::InvalidKey { .. })));

    let mut by_index = Sort::new(input_path.clone(), output_path.clone(), 2usize);
    by_index.with_tmp_dir(tmp_path.clone());
    assert!(matches!(by_index.sort(), Err(SortError::InvalidKey { .. })));

    assert!(!output_path.exists());
    assert!(common::dir_is_empty(&tmp_path)?);
    fs::remove_file(input_path)?;
    fs::remove_dir(tmp_path)?;
    Ok(())
}

#[test]
fn test_missing_input() -> Result<(), anyhow::Error> {
    common::setup();
    let input_path = PathBuf::from("./target/results/no-such-input.csv");
    let output_path = common::temp_file_name("./target/results/");

    let csv_file_sort = Sort::new(input_path, output_path.clone(), "value");
    let result = csv_file_sort.sort();
    assert!(matches!(result, Err(SortError::NotFound { .. })));
    assert!(!output_path.exists());
    Ok(())
}

#[test]
fn test_empty_input() -> Result<(), anyhow::Error> {
    common::setup();
    let input_path = common::temp_file_name("./target/results/");
    let output_path = common::temp_file_name("./target/results/");
    fs::write(&input_path, "")?;

    let csv_file_sort = Sort::new(input_path.clone(), output_path.clone(), 0usize);
    assert!(matches!(csv_file_sort.sort(), Err(SortError::EmptyInput { .. })));
    assert!(!output_path.exists());
    fs::remove_file(input_path)?;
    Ok(())
}

#[test]
fn test_malformed_record_keeps_output_untouched() -> Result<(), anyhow::Error> {
    common::setup();
    let input_path = common::temp_file_name("./target/results/");
    let output_path = common::temp_file_name("./target/results/");
    let tmp_path = common::tmp_dir();
    common::write_lines(&input_path, &["id,value", "1,30", "2,10", "3,20", "4,5,extra"])?;
    fs::write(&output_path, "previous content\n")?;

    let mut csv_file_sort = Sort::new(input_path.clone(), output_path.clone(), "value");
    csv_file_sort.with_batch_capacity(1);
    csv_file_sort.with_tmp_dir(tmp_path.clone());
    let result = csv_file_sort.sort();
    assert!(
        matches!(result, Err(SortError::MalformedRecord { line: 5, expected: 2, found: 3 }))
    );
    assert_eq!(fs::read_to_string(&output_path)?, "previous content\n");
    assert!(common::dir_is_empty(&tmp_path)?);
    fs::remove_file(input_path)?;
    fs::remove_file(output_path)?;
    fs::remove_dir(tmp_path)?;
    Ok(())
}

#[test]
fn test_blank_lines_in_single_column_are_empty_keys() -> Result<(), anyhow::Error> {
    common::setup();
    let input_path = common::temp_file_name("./target/results/");
    let output_path = common::temp_file_name("./target/results/");
    fs::write(&input_path, "k\nb\n\na\n")?;

    let mut csv_file_sort = Sort::new(input_path.clone(), output_path.clone(), "k");
    csv_file_sort.with_batch_capacity(2);
    let summary = csv_file_sort.sort()?;

    assert_eq!(summary.records, 3);
    let lines = common::read_lines(output_path.clone())?;
    assert_eq!(lines, vec!["k", "\"\"", "a", "b"]);
    fs::remove_file(input_path)?;
    fs::remove_file(output_path)?;
    Ok(())
}

#[test]
fn test_blank_line_in_several_columns_is_malformed() -> Result<(), anyhow::Error> {
    common::setup();
    let input_path = common::temp_file_name("./target/results/");
    let output_path = common::temp_file_name("./target/results/");
    let tmp_path = common::tmp_dir();
    fs::write(&input_path, "id,value\n1,30\n2,10\n\n3,20\n")?;
    fs::write(&output_path, "previous content\n")?;

    let mut csv_file_sort = Sort::new(input_path.clone(), output_path.clone(), "value");
    csv_file_sort.with_batch_capacity(1);
    csv_file_sort.with_tmp_dir(tmp_path.clone());
    let result = csv_file_sort.sort();
    assert!(
        matches!(result, Err(SortError::MalformedRecord { line: 4, expected: 2, found: 0 }))
    );
    assert_eq!(fs::read_to_string(&output_path)?, "previous content\n");
    assert!(common::dir_is_empty(&tmp_path)?);
    fs::remove_file(input_path)?;
    fs::remove_file(output_path)?;
    fs::remove_dir(tmp_path)?;
    Ok(())
}

#[test]
fn test_unbounded_batch_capacity() -> Result<(), anyhow::Error> {
    common::setup();
    let input_path = common::temp_file_name("./target/results/");
    let output_path = common::temp_file_name("./target/results/");
    common::write_lines(&input_path, &["id,value", "1,b", "2,a"])?;

    let mut csv_file_sort = Sort::new(input_path.clone(), output_path.clone(), "value");
    csv_file_sort.with_batch_capacity(usize::MAX);
    let summary = csv_file_sort.sort()?;

    assert_eq!(summary.runs, 1);
    let lines = common::read_lines(output_path.clone())?;
    assert_eq!(lines, vec!["id,value", "2,a", "1,b"]);
    fs::remove_file(input_path)?;
    fs::remove_file(output_path)?;
    Ok(())
}
