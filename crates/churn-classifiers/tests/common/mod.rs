//! Shared fixtures for the integration tests.
#![allow(dead_code)]

use std::path::{Path, PathBuf};

use churn_classifiers::data_handling::{extract_labels, Frame, Labels};
use churn_classifiers::config::LabelRule;
use churn_classifiers::io::{read_churn_records, CsvReaderConfig};

pub const HEADER: &str = "avg_dist,avg_rating_by_driver,trips_in_first_30_days,city,phone,luxury_car_user,weekday_pct,last_trip_date,signup_date\n";

/// Four riders: the first two stopped riding before June 2014.
pub fn four_rows() -> String {
    let mut csv = String::from(HEADER);
    csv.push_str("2.0,5.0,0,Astapor,iPhone,False,100.0,2014-01-15,2014-01-05\n");
    csv.push_str("3.0,4.5,1,Astapor,iPhone,False,0.0,2014-03-01,2014-01-10\n");
    csv.push_str("10.0,4.8,6,Winterfell,Android,True,50.0,2014-06-20,2014-01-12\n");
    csv.push_str("12.0,,8,Winterfell,Android,True,50.0,2014-06-28,2014-01-20\n");
    csv
}

/// Deterministic synthetic riders; every fifth pair churns.
pub fn synthetic_rows(n: usize) -> String {
    let mut csv = String::from(HEADER);
    for i in 0..n {
        let churned = i % 5 < 2;
        let rating = if i % 7 == 0 { String::new() } else { format!("{:.1}", 4.0 + (i % 10) as f64 / 10.0) };
        let row = if churned {
            format!(
                "{:.1},{},{},{},{},{},{:.1},2014-0{}-1{},2014-01-{}\n",
                2.0 + (i % 4) as f64 * 0.5,
                rating,
                i % 2,
                if i % 2 == 0 { "Winterfell" } else { "Astapor" },
                if i % 3 == 0 { "iPhone" } else { "Android" },
                if i % 5 == 0 { "True" } else { "False" },
                [0.0, 100.0, 50.0][i % 3],
                1 + i % 4,
                i % 10,
                10 + i % 20
            )
        } else {
            format!(
                "{:.1},{},{},{},iPhone,{},{:.1},2014-06-2{},2014-01-{}\n",
                4.0 + (i % 7) as f64,
                rating,
                1 + i % 5,
                if i % 3 == 0 { "Astapor" } else { "King's Landing" },
                if i % 2 == 0 { "True" } else { "False" },
                40.0 + (i % 30) as f64,
                i % 10,
                10 + i % 20
            )
        };
        csv.push_str(&row);
    }
    csv
}

/// `csv` with the phone cell of its first iPhone rider left empty.
pub fn with_missing_phone(csv: &str) -> String {
    csv.replacen(",iPhone,", ",,", 1)
}

pub fn frame_from(csv: &str) -> Frame {
    read_churn_records(csv.as_bytes(), &CsvReaderConfig::default()).unwrap()
}

pub fn frame_and_labels(csv: &str) -> (Frame, Labels) {
    let frame = frame_from(csv);
    let labels = extract_labels(&frame, &LabelRule::default()).unwrap();
    (frame, labels)
}

pub fn write_csv(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, content).unwrap();
    path
}
