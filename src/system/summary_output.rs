use std::time::Duration;

use crate::runner::{RunReport, RunSettings};

pub(crate) fn start_line(settings: &RunSettings) -> String {
    let mut line = format!(
        "Starting run: {} | workers={} | duration={} | timeout={}",
        settings.endpoint,
        settings.workers.get(),
        format_duration(settings.duration),
        format_duration(settings.request_timeout),
    );
    if let Some(host) = settings.endpoint.host_override() {
        line.push_str(" | host=");
        line.push_str(host);
    }
    line
}

pub(crate) fn completion_line(report: &RunReport) -> String {
    format!(
        "Run complete ({}) after {} | pool replacements={} | initial addresses=[{}]",
        report.end,
        format_duration(report.elapsed),
        report.replacements,
        report.initial_addresses,
    )
}

fn format_duration(duration: Duration) -> String {
    let millis = duration.as_millis();
    if millis % 1000 == 0 {
        format!("{}s", millis / 1000)
    } else if millis < 1000 {
        format!("{}ms", millis)
    } else {
        format!("{:.1}s", duration.as_secs_f64())
    }
}
