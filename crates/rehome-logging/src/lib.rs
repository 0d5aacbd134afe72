use std::fmt;

use jiff::Timestamp;
use owo_colors::OwoColorize;
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::{FmtContext, FormatEvent, FormatFields, FormattedFields};
use tracing_subscriber::registry::LookupSpan;

/// The decorations of a rehome log line, written as
/// `<timestamp> <level> <span>{<fields>}:<span>: <target>: <message>`.
#[derive(Debug, Clone, Copy)]
pub struct RehomeFormat {
    pub display_timestamp: bool,
    pub display_level: bool,
    pub display_target: bool,
    /// Prefix each line with the spans it was emitted in, including their fields (e.g., the file
    /// being rewritten).
    pub show_spans: bool,
}

impl Default for RehomeFormat {
    /// Only the level and the message.
    fn default() -> Self {
        Self {
            display_timestamp: false,
            display_level: true,
            display_target: false,
            show_spans: false,
        }
    }
}

impl RehomeFormat {
    /// The decorations used for `--verbose` output: a timestamp, to tell slow files apart, and the
    /// spans of every line.
    pub fn verbose() -> Self {
        Self {
            display_timestamp: true,
            show_spans: true,
            ..Self::default()
        }
    }
}

fn write_level(writer: &mut Writer<'_>, level: Level, ansi: bool) -> fmt::Result {
    if !ansi {
        return write!(writer, "{level} ");
    }
    match level {
        Level::TRACE => write!(writer, "{} ", level.purple()),
        Level::DEBUG => write!(writer, "{} ", level.blue()),
        Level::INFO => write!(writer, "{} ", level.green()),
        Level::WARN => write!(writer, "{} ", level.yellow()),
        Level::ERROR => write!(writer, "{} ", level.red()),
    }
}

/// See <https://docs.rs/tracing-subscriber/0.3.18/src/tracing_subscriber/fmt/format/mod.rs.html#1026-1156>
impl<S, N> FormatEvent<S, N> for RehomeFormat
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        let meta = event.metadata();
        let ansi = writer.has_ansi_escapes();

        if self.display_timestamp {
            let now = Timestamp::now();
            if ansi {
                write!(writer, "{} ", now.dimmed())?;
            } else {
                write!(writer, "{now} ")?;
            }
        }

        if self.display_level {
            write_level(&mut writer, *meta.level(), ansi)?;
        }

        if self.show_spans {
            let span = event
                .parent()
                .and_then(|id| ctx.span(id))
                .or_else(|| ctx.lookup_current());

            let mut seen = false;
            for span in span.into_iter().flat_map(|span| span.scope().from_root()) {
                seen = true;
                if ansi {
                    write!(writer, "{}", span.metadata().name().bold())?;
                } else {
                    write!(writer, "{}", span.metadata().name())?;
                }
                let extensions = span.extensions();
                if let Some(fields) = extensions.get::<FormattedFields<N>>() {
                    if !fields.is_empty() {
                        write!(writer, "{{{fields}}}")?;
                    }
                }
                writer.write_char(':')?;
            }
            if seen {
                writer.write_char(' ')?;
            }
        }

        if self.display_target {
            if ansi {
                write!(writer, "{}: ", meta.target().dimmed())?;
            } else {
                write!(writer, "{}: ", meta.target())?;
            }
        }

        ctx.field_format().format_fields(writer.by_ref(), event)?;

        writeln!(writer)
    }
}
