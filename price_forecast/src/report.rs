//! Plain-text summary of a finished run.

use std::fmt::Write;

use crate::session::SessionState;

/// Renders metrics, signal, movement summary and data preview.
pub fn render_report(state: &SessionState) -> String {
    let mut out = String::new();
    let _ = write_report(&mut out, state);
    out
}

fn write_report(out: &mut String, state: &SessionState) -> std::fmt::Result {
    let eval = &state.evaluation;

    writeln!(out, "Source:   {}", state.source)?;
    writeln!(out, "Model:    {}", state.model.spec)?;
    writeln!(
        out,
        "Rows:     {} loaded, {} with features, {} train / {} test",
        state.series.len(),
        state.features.len(),
        state.n_train,
        eval.len()
    )?;
    writeln!(out)?;
    writeln!(out, "MSE:      {:.4}", eval.mse)?;
    writeln!(out, "RMSE:     {:.4}", eval.rmse)?;
    writeln!(out, "R²:       {:.4}", eval.r2)?;
    writeln!(out)?;

    match &state.signal {
        Some(signal) => {
            writeln!(
                out,
                "Signal:   {} ({:.1}% confidence)",
                signal.action, signal.confidence
            )?;
            let change = signal
                .expected_change_pct()
                .map_or_else(|| "n/a".to_string(), |pct| format!("{pct:+.2}%"));
            writeln!(
                out,
                "          predicted ${:.2} vs current ${:.2} ({change})",
                signal.predicted_price, signal.current_price,
            )?;
        }
        None => writeln!(out, "Signal:   unavailable")?,
    }

    let m = &state.movement;
    writeln!(
        out,
        "Movement: {} up, {} down, {} flat",
        m.up, m.down, m.flat
    )?;
    writeln!(out)?;

    writeln!(
        out,
        "Preview ({} of {} rows):",
        state.preview.head.len(),
        state.preview.total_rows
    )?;
    writeln!(
        out,
        "{:<12}{:>10}{:>10}{:>10}{:>10}{:>14}",
        "Date", "Open", "High", "Low", "Close", "Volume"
    )?;
    for p in &state.preview.head {
        writeln!(
            out,
            "{:<12}{:>10.2}{:>10.2}{:>10.2}{:>10.2}{:>14.0}",
            p.date.to_string(),
            p.open,
            p.high,
            p.low,
            p.close,
            p.volume
        )?;
    }
    Ok(())
}
