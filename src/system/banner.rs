use std::io::IsTerminal;

use crossterm::style::{Color, Stylize};

const BANNER_LINES: [&str; 7] = [
    "███████╗██╗   ██╗███████╗████████╗ █████╗ ██╗███╗   ██╗",
    "██╔════╝██║   ██║██╔════╝╚══██╔══╝██╔══██╗██║████╗  ██║",
    "███████╗██║   ██║███████╗   ██║   ███████║██║██╔██╗ ██║",
    "╚════██║██║   ██║╚════██║   ██║   ██╔══██║██║██║╚██╗██║",
    "███████║╚██████╔╝███████║   ██║   ██║  ██║██║██║ ╚████║",
    "╚══════╝ ╚═════╝ ╚══════╝   ╚═╝   ╚═╝  ╚═╝╚═╝╚═╝  ╚═══╝",
    "                                                       ",
];

type Rgb = (u8, u8, u8);

/// Colour stops spread evenly over the art, top to bottom.
const STOPS: [Rgb; 3] = [TEAL, SKY, VIOLET];
const TEAL: Rgb = (0x2e, 0xc4, 0xb6);
const SKY: Rgb = (0x3a, 0xa9, 0xff);
const VIOLET: Rgb = (0x80, 0x4c, 0xff);

/// Prints the banner and the version line. Colour only goes to a terminal.
pub(crate) fn print_cli_banner(no_color: bool) {
    let colored = !no_color && std::io::stdout().is_terminal();
    let rows = BANNER_LINES.len();
    for (row, line) in BANNER_LINES.iter().enumerate() {
        if colored {
            println!("{}", line.with(row_color(row, rows)));
        } else {
            println!("{line}");
        }
    }

    let tagline = format!(
        "sustain v{} | fixed worker pool, DNS-following, bounded runs",
        env!("CARGO_PKG_VERSION")
    );
    if colored {
        println!("{}", tagline.with(rgb(SKY)).bold());
    } else {
        println!("{tagline}");
    }
}

const fn rgb((r, g, b): Rgb) -> Color {
    Color::Rgb { r, g, b }
}

/// Colour of `row` out of `rows`, interpolated between the two nearest stops.
fn row_color(row: usize, rows: usize) -> Color {
    let segments = STOPS.len().saturating_sub(1).max(1);
    let last_row = rows.saturating_sub(1).max(1);
    // Position in "segment units": row * segments / last_row, split into the
    // segment index and the remainder within it.
    let scaled = row.min(last_row).saturating_mul(segments);
    let segment = scaled.checked_div(last_row).unwrap_or(0).min(segments.saturating_sub(1));
    let within = scaled.saturating_sub(segment.saturating_mul(last_row));

    let from = STOPS.get(segment).copied().unwrap_or_default();
    let to = STOPS.get(segment.saturating_add(1)).copied().unwrap_or(from);
    rgb(mix(from, to, within, last_row))
}

/// Linear mix of two colours at `num / den`.
fn mix(from: Rgb, to: Rgb, num: usize, den: usize) -> Rgb {
    let channel = |a: u8, b: u8| -> u8 {
        let span = i64::from(b).saturating_sub(i64::from(a));
        let num = i64::try_from(num).unwrap_or(i64::MAX);
        let den = i64::try_from(den.max(1)).unwrap_or(i64::MAX);
        let step = span.saturating_mul(num).checked_div(den).unwrap_or(0);
        u8::try_from(i64::from(a).saturating_add(step).clamp(0, 255)).unwrap_or(a)
    };
    (
        channel(from.0, to.0),
        channel(from.1, to.1),
        channel(from.2, to.2),
    )
}
