//! Welcome banner. Top rows in the Entry colour, bottom rows in the Exit colour.

use crossterm::queue;
use crossterm::style::{Color, Print, PrintStyledContent, Stylize};
use std::io::{Write, stdout};

const ENTRY_COLOR: Color = Color::Rgb {
    r: 0x14,
    g: 0xb8,
    b: 0xa6,
};
const EXIT_COLOR: Color = Color::Rgb {
    r: 0xf5,
    g: 0x9e,
    b: 0x0b,
};

const BANNER: &[&str] = &[
    r"  _  _   _     _ ___ ___ ___ ",
    r" | || | /_\ _ | |_ _| _ \_ _|",
    r" | __ |/ _ \ || || ||   /| | ",
    r" |_||_/_/ \_\__/|___|_|_\___|",
];

/// Row colour: first half Entry, second half Exit.
fn row_color(row: usize) -> Color {
    if row < BANNER.len() / 2 {
        ENTRY_COLOR
    } else {
        EXIT_COLOR
    }
}

/// Prints the banner, then version and the class/subject being taken.
pub fn print_welcome(class_subject: &str) {
    let mut out = stdout();
    for (row, line) in BANNER.iter().enumerate() {
        let _ = queue!(out, PrintStyledContent(line.with(row_color(row))), Print("\r\n"));
    }
    let status = format!(
        "attendance capture v{} | class/subject {}",
        env!("CARGO_PKG_VERSION"),
        class_subject
    );
    let _ = queue!(
        out,
        PrintStyledContent(status.as_str().dim()),
        Print("\r\n")
    );
    let _ = out.flush();
}
