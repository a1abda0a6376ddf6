// src/core/report.rs

//! Renders the plaintext status report.

use std::fmt;

const SEPARATOR: &str = "-------------------------------------";

/// A point-in-time copy of every reported value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatsSnapshot {
    pub uptime_secs: u64,
    pub requests_total: u64,
    pub bytes_sent_total: u64,
    pub upstream_bytes_recv_total: u64,
    pub requests_per_second: u64,
    pub avg_response_time_ms: u64,
    pub status_20x: u64,
    pub status_30x: u64,
    pub status_40x: u64,
    pub status_50x: u64,
}

impl StatsSnapshot {
    /// Writes the eleven report lines, each terminated by `\n`.
    pub fn write_to<W: fmt::Write>(&self, out: &mut W) -> fmt::Result {
        let mut buf = itoa::Buffer::new();

        write_line(out, &mut buf, "Uptime: ", self.uptime_secs)?;
        write_line(out, &mut buf, "upstream requests: ", self.requests_total)?;
        write_line(out, &mut buf, "upstream sent: ", self.bytes_sent_total)?;
        write_line(out, &mut buf, "upstream recv: ", self.upstream_bytes_recv_total)?;
        write_line(out, &mut buf, "upstream reqs/per: ", self.requests_per_second)?;
        write_line(
            out,
            &mut buf,
            "upstream resp_time/avg(ms): ",
            self.avg_response_time_ms,
        )?;
        out.write_str(SEPARATOR)?;
        out.write_char('\n')?;
        write_line(out, &mut buf, "reqs_20x: ", self.status_20x)?;
        write_line(out, &mut buf, "reqs_30x: ", self.status_30x)?;
        write_line(out, &mut buf, "reqs_40x: ", self.status_40x)?;
        write_line(out, &mut buf, "reqs_50x: ", self.status_50x)
    }

    pub fn render(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for StatsSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_to(f)
    }
}

fn write_line<W: fmt::Write>(
    out: &mut W,
    buf: &mut itoa::Buffer,
    label: &str,
    value: u64,
) -> fmt::Result {
    out.write_str(label)?;
    out.write_str(buf.format(value))?;
    out.write_char('\n')
}
