//! Annotated tree output for the terminal

use crate::models::{RecStatus, ScanResult};
use colored::{Color, Colorize};

/// Width used when the terminal size cannot be determined
pub const DEFAULT_WIDTH: usize = 150;

const TICK: &str = "✓";
const CROSS: &str = "✕";
const WARN: &str = "!";
const ARROW: &str = "→";
const BRANCH: &str = "├─";
const LAST_BRANCH: &str = "└─";
const PIPE: &str = "│";

/// Console rendering options
#[derive(Debug, Clone, Copy)]
pub struct ConsoleOptions {
    /// Print the expected value under MISSING and DIFF entries
    pub show_recommended: bool,
    pub color: bool,
    /// Total line width available for wrapping
    pub width: usize,
}

impl ConsoleOptions {
    /// Options sized to the current terminal
    pub fn detect(show_recommended: bool, color: bool) -> Self {
        Self {
            show_recommended,
            color,
            width: terminal_width(),
        }
    }
}

/// Current stdout width, or [`DEFAULT_WIDTH`] when it is unknown
pub fn terminal_width() -> usize {
    match console::Term::stdout().size_checked() {
        Some((_, cols)) if cols > 0 => usize::from(cols),
        _ => DEFAULT_WIDTH,
    }
}

/// Splits `text` into lines of at most `limit` characters, breaking at spaces when possible
pub fn wrap(text: &str, limit: usize) -> Vec<String> {
    let mut rest = text.trim();
    if limit == 0 || rest.chars().count() <= limit {
        return vec![rest.to_string()];
    }

    let mut lines = Vec::new();
    while rest.chars().count() > limit {
        let boundary = rest
            .char_indices()
            .nth(limit)
            .map_or(rest.len(), |(i, _)| i);
        let cut = match rest[..boundary].rfind(' ') {
            Some(i) if i > 0 => i,
            _ => boundary,
        };
        lines.push(rest[..cut].trim().to_string());
        rest = rest[cut..].trim();
    }
    if !rest.is_empty() {
        lines.push(rest.to_string());
    }
    lines
}

struct Block {
    lines: Vec<String>,
    opts: ConsoleOptions,
}

impl Block {
    fn new(opts: ConsoleOptions) -> Self {
        Self {
            lines: Vec::new(),
            opts,
        }
    }

    fn line(&mut self, text: impl Into<String>) {
        self.lines.push(text.into());
    }

    fn paint(&self, text: &str, color: Color) -> String {
        if self.opts.color {
            text.color(color).to_string()
        } else {
            text.to_string()
        }
    }

    fn icon(&self, glyph: &str, color: Color) -> String {
        self.paint(&format!("[{glyph}]"), color)
    }

    fn section(&mut self, title: &str) {
        let heading = format!("[+] {title}");
        let heading = if self.opts.color {
            heading.yellow().bold().to_string()
        } else {
            heading
        };
        self.line(heading);
    }

    fn finish(self) -> String {
        let mut out = self.lines.join("\n");
        out.push('\n');
        out
    }
}

fn branch(last: bool) -> &'static str {
    if last {
        LAST_BRANCH
    } else {
        BRANCH
    }
}

fn render_recommended(block: &mut Block, result: &ScanResult) {
    block.section("Recommended Security Headers");

    let total = result.recommended.len();
    for (idx, finding) in result.recommended.iter().enumerate() {
        let last = idx + 1 == total;
        let vert = if last { " " } else { PIPE };

        let (icon, mut details) = match finding.status {
            RecStatus::Ok => (block.icon(TICK, Color::Green), vec![finding.status.to_string()]),
            RecStatus::Missing => (block.icon(CROSS, Color::Red), vec![finding.status.to_string()]),
            RecStatus::Different => (
                block.icon(WARN, Color::Yellow),
                vec![format!(
                    "{} {}",
                    finding.status,
                    finding.observed.as_deref().unwrap_or_default()
                )],
            ),
        };
        if finding.status != RecStatus::Ok && block.opts.show_recommended {
            details.push(format!("Recommended: {}", finding.expected));
        }

        block.line(format!(" {} {icon} {}", branch(last), finding.header));

        let first_prefix = format!(" {vert}  {ARROW} ");
        let next_prefix = format!(" {vert}    ");
        let limit = block.opts.width.saturating_sub(first_prefix.chars().count());
        for detail in &details {
            for (i, part) in wrap(detail, limit).into_iter().enumerate() {
                let prefix = if i == 0 { &first_prefix } else { &next_prefix };
                block.line(format!("{prefix}{part}"));
            }
        }
        if !last {
            block.line(format!(" {PIPE}"));
        }
    }
    block.line("");
}

fn render_entries(block: &mut Block, entries: &[String]) {
    if entries.is_empty() {
        let ok = block.icon(TICK, Color::Green);
        block.line(format!(" {LAST_BRANCH} {ok} None found"));
        block.line("");
        return;
    }

    let warn = block.icon(WARN, Color::Yellow);
    for (idx, entry) in entries.iter().enumerate() {
        let last = idx + 1 == entries.len();
        block.line(format!(" {} {warn} {entry}", branch(last)));
        if !last {
            block.line(format!(" {PIPE}"));
        }
    }
    block.line("");
}

/// Renders one target's findings as a self-contained text block
pub fn render(result: &ScanResult, opts: &ConsoleOptions) -> String {
    let mut block = Block::new(*opts);

    let label = if opts.color {
        "Analyzing:".bold().to_string()
    } else {
        "Analyzing:".to_string()
    };
    block.line(format!("{label} {}", result.url));
    block.line("");

    if result.checks.recommended {
        render_recommended(&mut block, result);
    }

    if result.checks.leak {
        block.section("Information-Leak Headers");
        let entries: Vec<String> = result
            .leaks
            .iter()
            .map(|l| format!("{}: {}", l.header, l.value))
            .collect();
        render_entries(&mut block, &entries);
    }

    if result.checks.deprecated {
        block.section("Deprecated Headers");
        let entries: Vec<String> = result
            .deprecated
            .iter()
            .map(|d| match d.replacement {
                Some(replacement) => format!("{} (use \"{replacement}\" instead)", d.header),
                None => format!("{} (no replacement)", d.header),
            })
            .collect();
        render_entries(&mut block, &entries);
    }

    block.finish()
}
