//! CLI smoke entry point.
//!
//! # Responsibility
//! - Verify `habitlog_core` linkage and storage wiring outside any UI.
//! - Print the dashboard of a store file in plain text.
//! - Write core logs to a `logs/` directory next to the store file.
//!
//! Usage: `habitlog [DB_PATH] [WINDOW_DAYS]`

use habitlog_core::{Chart, StoreOptions, TaskStore, TrackingWindow};
use std::path::PathBuf;
use std::process::ExitCode;

fn main() -> ExitCode {
    println!("habitlog_core version={}", habitlog_core::core_version());

    let mut args = std::env::args().skip(1);
    let Some(db_path) = args.next() else {
        return ExitCode::SUCCESS;
    };

    let window = match args.next() {
        Some(raw) => match raw.parse::<u32>().ok().and_then(TrackingWindow::from_days) {
            Some(window) => window,
            None => {
                eprintln!("invalid window `{raw}`; expected 7, 14 or 30");
                return ExitCode::FAILURE;
            }
        },
        None => TrackingWindow::default(),
    };

    let db_path = match std::env::current_dir() {
        Ok(cwd) => cwd.join(db_path),
        Err(_) => PathBuf::from(db_path),
    };
    if let Some(log_dir) = db_path.parent().map(|dir| dir.join("logs")) {
        let log_dir = log_dir.to_string_lossy().into_owned();
        if let Err(err) = habitlog_core::init_logging(habitlog_core::default_log_level(), &log_dir) {
            eprintln!("logging disabled: {err}");
        }
    }

    let mut store = TaskStore::open(&StoreOptions::new(db_path));
    store.set_tracking_window(window);
    let dashboard = store.dashboard();

    println!("today={} window_days={}", store.today(), dashboard.window_days);
    for row in &dashboard.rows {
        println!(
            "task priority={} rate={}% streak={} name={}",
            row.task.priority, row.completion_rate, row.streak, row.task.name
        );
    }
    if let Some(summary) = &dashboard.summary {
        println!("overall={}%", summary.overall_score);
        for group in &summary.priority_breakdown {
            println!(
                "priority={} tasks={} avg={}%",
                group.priority, group.task_count, group.avg_completion_rate
            );
        }
    }
    if let Chart::Daily(points) = &dashboard.chart {
        for point in points {
            println!(
                "day={} done={}/{} pct={}%",
                point.date, point.completed, point.total, point.percentage
            );
        }
    }

    store.close();
    ExitCode::SUCCESS
}
