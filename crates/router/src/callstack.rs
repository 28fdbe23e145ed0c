//! Call-stack capture
//!
//! Frames belonging to this crate are skipped so the rendered stack starts
//! at the caller. The component identity is derived from `module_path!()`
//! rather than a hardcoded name.

use std::backtrace::Backtrace;

/// Runtime frames that sit above the caller in every capture
const RUNTIME_COMPONENTS: [&str; 3] = ["std", "core", "alloc"];

/// Crate name of the router itself
pub fn own_component() -> &'static str {
    component_of(module_path!())
}

/// Leading path segment of a symbol, ignoring `<` of trait-impl symbols
pub fn component_of(symbol: &str) -> &str {
    let symbol = symbol.trim_start_matches('<');
    symbol.split("::").next().unwrap_or(symbol)
}

/// Capture the current stack, keeping at most `max_frames` caller frames.
///
/// Returns `None` when `max_frames` is zero or no caller frame survives.
pub fn capture(max_frames: usize) -> Option<String> {
    if max_frames == 0 {
        return None;
    }
    let raw = Backtrace::force_capture().to_string();
    render(&raw, own_component(), max_frames)
}

#[derive(Debug, PartialEq, Eq)]
struct Frame<'a> {
    symbol: &'a str,
    location: Option<&'a str>,
}

/// Split `std::backtrace::Backtrace` display output into frames
fn parse(raw: &str) -> Vec<Frame<'_>> {
    let mut frames: Vec<Frame<'_>> = Vec::new();
    for line in raw.lines() {
        let line = line.trim();
        if let Some(location) = line.strip_prefix("at ") {
            if let Some(last) = frames.last_mut() {
                last.location.get_or_insert(location);
            }
            continue;
        }
        let Some((index, symbol)) = line.split_once(": ") else {
            continue;
        };
        if !index.is_empty() && index.bytes().all(|b| b.is_ascii_digit()) {
            frames.push(Frame {
                symbol: symbol.trim(),
                location: None,
            });
        }
    }
    frames
}

fn render(raw: &str, own: &str, max_frames: usize) -> Option<String> {
    let frames = parse(raw);

    // Drop the capture machinery and our own frames above the caller
    let first_caller = frames.iter().position(|frame| {
        let component = component_of(frame.symbol);
        component != own && !RUNTIME_COMPONENTS.contains(&component)
    })?;

    let mut kept = frames[first_caller..]
        .iter()
        .filter(|frame| component_of(frame.symbol) != own);

    let mut out = String::new();
    for frame in kept.by_ref().take(max_frames) {
        out.push_str(frame.symbol);
        if let Some(location) = frame.location {
            out.push_str(" (at ");
            out.push_str(location);
            out.push(')');
        }
        out.push('\n');
    }
    if kept.next().is_some() {
        out.push_str(&format!("... call stack capped at {max_frames} frames\n"));
    }
    Some(out)
}
