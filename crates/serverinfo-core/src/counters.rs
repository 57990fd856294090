//! Interface-aggregate network byte counters.
//!
//! The kernel keeps cumulative sent/received byte totals per interface. We sum
//! them across every interface (loopback included) into one [`NetCounters`]
//! value:
//! - Linux: `/proc/net/dev`
//! - macOS: `netstat -ibn` (link-layer rows only, one per interface)
//! - everywhere else: [`SysinfoCounters`]

/// Cumulative byte totals summed across all interfaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NetCounters {
    pub bytes_sent: u64,
    pub bytes_received: u64,
}

#[derive(Debug, thiserror::Error)]
pub enum CounterError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: &'static str,
        source: std::io::Error,
    },
    #[error("failed to run {command}: {source}")]
    Command {
        command: &'static str,
        source: std::io::Error,
    },
    #[error("{command} exited with {status}")]
    CommandStatus {
        command: &'static str,
        status: std::process::ExitStatus,
    },
    #[error("no interface counters found in {0}")]
    Empty(&'static str),
}

/// Anything that can report the current cumulative counters.
///
/// The estimator owns a boxed source, so tests can substitute a scripted one
/// for the real kernel counters.
pub trait CounterSource: Send + Sync {
    fn read(&self) -> Result<NetCounters, CounterError>;
}

/// Reads the running kernel's counters.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemCounters;

#[cfg(target_os = "linux")]
const PROC_NET_DEV: &str = "/proc/net/dev";

impl CounterSource for SystemCounters {
    #[cfg(target_os = "linux")]
    fn read(&self) -> Result<NetCounters, CounterError> {
        let raw = std::fs::read_to_string(PROC_NET_DEV).map_err(|source| CounterError::Io {
            path: PROC_NET_DEV,
            source,
        })?;
        parse_proc_net_dev(&raw).ok_or(CounterError::Empty(PROC_NET_DEV))
    }

    #[cfg(target_os = "macos")]
    fn read(&self) -> Result<NetCounters, CounterError> {
        const NETSTAT: &str = "netstat";
        let output = std::process::Command::new(NETSTAT)
            .args(["-ibn"])
            .stdin(std::process::Stdio::null())
            .stderr(std::process::Stdio::null())
            .output()
            .map_err(|source| CounterError::Command {
                command: NETSTAT,
                source,
            })?;
        if !output.status.success() {
            return Err(CounterError::CommandStatus {
                command: NETSTAT,
                status: output.status,
            });
        }
        let raw = String::from_utf8_lossy(&output.stdout);
        parse_netstat_ibn(&raw).ok_or(CounterError::Empty(NETSTAT))
    }

    #[cfg(not(any(target_os = "linux", target_os = "macos")))]
    fn read(&self) -> Result<NetCounters, CounterError> {
        SysinfoCounters.read()
    }
}

/// Counters as reported by `sysinfo`'s interface list.
#[derive(Debug, Clone, Copy, Default)]
pub struct SysinfoCounters;

impl CounterSource for SysinfoCounters {
    fn read(&self) -> Result<NetCounters, CounterError> {
        let networks = sysinfo::Networks::new_with_refreshed_list();
        if networks.is_empty() {
            return Err(CounterError::Empty("sysinfo"));
        }
        let mut totals = NetCounters::default();
        for (_name, data) in networks.iter() {
            totals.bytes_received = totals.bytes_received.wrapping_add(data.total_received());
            totals.bytes_sent = totals.bytes_sent.wrapping_add(data.total_transmitted());
        }
        Ok(totals)
    }
}

/// Sum the receive/transmit byte columns of `/proc/net/dev`.
///
/// Returns `None` when no interface line could be parsed.
pub fn parse_proc_net_dev(raw: &str) -> Option<NetCounters> {
    let mut totals = NetCounters::default();
    let mut interfaces = 0usize;

    // First two lines are the column headers.
    for line in raw.lines().skip(2) {
        let Some((_iface, stats)) = line.split_once(':') else {
            continue;
        };
        let fields: Vec<u64> = stats
            .split_whitespace()
            .filter_map(|s| s.parse::<u64>().ok())
            .collect();
        if fields.len() < 16 {
            continue;
        }
        interfaces += 1;
        totals.bytes_received = totals.bytes_received.wrapping_add(fields[0]);
        totals.bytes_sent = totals.bytes_sent.wrapping_add(fields[8]);
    }

    (interfaces > 0).then_some(totals)
}

/// Sum the `Ibytes`/`Obytes` columns of `netstat -ibn`.
///
/// netstat repeats an interface once per configured address with the same
/// counters, so only the `<Link#N>` row of each interface is counted. The
/// Address column is empty for some link rows, so columns are indexed from
/// the end: `... Ibytes Opkts Oerrs Obytes Coll`.
pub fn parse_netstat_ibn(raw: &str) -> Option<NetCounters> {
    let mut totals = NetCounters::default();
    let mut interfaces = 0usize;

    for line in raw.lines() {
        let cols: Vec<&str> = line.split_whitespace().collect();
        if cols.len() < 9 || cols[0] == "Name" {
            continue;
        }
        if !cols[2].starts_with("<Link") {
            continue;
        }
        let n = cols.len();
        let ibytes = cols[n - 5].parse::<u64>().ok();
        let obytes = cols[n - 2].parse::<u64>().ok();
        if let (Some(ibytes), Some(obytes)) = (ibytes, obytes) {
            interfaces += 1;
            totals.bytes_received = totals.bytes_received.wrapping_add(ibytes);
            totals.bytes_sent = totals.bytes_sent.wrapping_add(obytes);
        }
    }

    (interfaces > 0).then_some(totals)
}
