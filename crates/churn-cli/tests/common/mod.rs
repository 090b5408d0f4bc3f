//! Shared fixtures for the CLI tests.
#![allow(dead_code)]

use std::path::{Path, PathBuf};

const HEADER: &str = "avg_dist,trips_in_first_30_days,city,phone,luxury_car_user,weekday_pct,last_trip_date,signup_date\n";

/// Deterministic riders; two in five stopped riding before June 2014.
pub fn riders(n: usize) -> String {
    let mut csv = String::from(HEADER);
    for i in 0..n {
        let row = if i % 5 < 2 {
            format!(
                "{:.1},{},{},{},{},{:.1},2014-0{}-15,2014-01-{}\n",
                2.0 + (i % 4) as f64 * 0.5,
                i % 2,
                if i % 2 == 0 { "Winterfell" } else { "Astapor" },
                if i % 3 == 0 { "iPhone" } else { "Android" },
                if i % 5 == 0 { "True" } else { "False" },
                [0.0, 100.0, 50.0][i % 3],
                1 + i % 4,
                10 + i % 20
            )
        } else {
            format!(
                "{:.1},{},{},iPhone,{},{:.1},2014-06-2{},2014-01-{}\n",
                4.0 + (i % 7) as f64,
                1 + i % 5,
                if i % 3 == 0 { "Astapor" } else { "Winterfell" },
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

/// Write train/test CSVs and a config pointing at them; returns the config path.
pub fn write_run_fixture(dir: &Path, report: bool) -> PathBuf {
    let train = dir.join("churn_train.csv");
    let test = dir.join("churn_test.csv");
    std::fs::write(&train, riders(45)).unwrap();
    std::fs::write(&test, riders(20)).unwrap();

    let mut config = serde_json::json!({
        "train_path": train,
        "test_path": test,
        "search": { "thresholds": [0.3, 0.5, 0.7] }
    });
    if report {
        config["report_path"] = serde_json::json!(dir.join("report.html"));
    }
    let path = dir.join("churn.json");
    std::fs::write(&path, serde_json::to_string_pretty(&config).unwrap()).unwrap();
    path
}
