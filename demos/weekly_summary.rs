//! Print a weekly score report for a small two-week log

use pulse_score::ScoreEngine;

fn main() {
    let json = r#"[
        { "category": "steps", "value": 8500, "timestamp": "2024-01-21T18:00:00Z" },
        { "category": "water", "value": 8, "timestamp": "2024-01-21T09:00:00Z" },
        { "category": "calories", "value": "2350", "timestamp": "2024-01-20T20:30:00Z" },
        { "category": "sleep", "value": 6.5, "timestamp": "2024-01-20T07:10:00Z" },
        { "category": "heartRate", "value": 64, "timestamp": "2024-01-19T08:00:00Z" },
        { "category": "bloodPressure", "value": "118/76", "timestamp": "2024-01-19T08:05:00Z" },
        { "category": "weight", "value": 72.4, "timestamp": "2024-01-18T07:00:00Z" },
        { "category": "water", "value": 4, "timestamp": "2024-01-12T12:00:00Z" },
        { "category": "steps", "value": 4200, "timestamp": "2024-01-10T19:00:00Z" }
    ]"#;

    let engine = ScoreEngine::new();
    match engine.process_json(json, "2024-01-21", "demo-subject", None) {
        Ok(report) => print!("{report}"),
        Err(e) => eprintln!("Error: {e:?}"),
    }
}
