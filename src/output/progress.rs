use indicatif::ProgressState;
use tracing_indicatif::style::ProgressStyle;

const TICKS: [&str; 11] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "✓"];

/// Bar style for storage scans, with millisecond elapsed time.
pub fn get_progress_style() -> ProgressStyle {
    let style = ProgressStyle::default_bar()
        .template("{spinner:.green} {msg} [{elapsed_precise_subsec}] [{bar:40.cyan/blue}] {pos}/{len}")
        .unwrap_or_else(|_| ProgressStyle::default_bar());

    style
        .with_key("elapsed_precise_subsec", elapsed_precise_subsec)
        .tick_strings(&TICKS)
        .progress_chars("#>-")
}

/// Spinner style for waits of unknown length (validator and chain responses).
pub fn get_spinner_style() -> ProgressStyle {
    ProgressStyle::default_spinner()
        .template("{spinner:.blue} {msg} [{elapsed_precise_subsec}]")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
        .with_key("elapsed_precise_subsec", elapsed_precise_subsec)
        .tick_strings(&TICKS)
}

/// HH:MM:SS.mmm
fn elapsed_precise_subsec(state: &ProgressState, writer: &mut dyn std::fmt::Write) {
    let elapsed = state.elapsed();
    let secs = elapsed.as_secs();
    let _ = write!(
        writer,
        "{:02}:{:02}:{:02}.{:03}",
        secs / 3600,
        (secs % 3600) / 60,
        secs % 60,
        elapsed.subsec_millis()
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_indicatif::span_ext::IndicatifSpanExt;

    #[test]
    fn styles_attach_to_spans() {
        let span = tracing::info_span!("certificate_scan");
        span.pb_set_style(&get_progress_style());
        span.pb_set_style(&get_spinner_style());
    }
}
