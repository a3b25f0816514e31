// Linux-specific readers: /proc tick and page counters, /sys topology and interface speed.
// The page size comes from libc on any unix.

use super::cpu::CoreTicks;
use super::memory::VmPages;
use crate::error::SampleError;

#[cfg(target_os = "linux")]
const PROC_STAT: &str = "/proc/stat";
#[cfg(target_os = "linux")]
const PROC_VMSTAT: &str = "/proc/vmstat";

/// Per-logical-core tick counters from /proc/stat, in core index order.
pub(super) fn read_cpu_ticks() -> Result<Vec<CoreTicks>, SampleError> {
    #[cfg(target_os = "linux")]
    {
        let content = std::fs::read_to_string(PROC_STAT).map_err(|source| SampleError::Io {
            path: PROC_STAT,
            source,
        })?;
        parse_proc_stat(&content)
    }
    #[cfg(not(target_os = "linux"))]
    Err(SampleError::Unavailable("per-core tick counters"))
}

/// Parses `cpuN user nice system idle ...` lines; the aggregate `cpu` line is skipped.
/// Offline CPUs are absent, so `N` is kept rather than the line position.
#[cfg_attr(not(target_os = "linux"), allow(dead_code))]
pub(super) fn parse_proc_stat(content: &str) -> Result<Vec<CoreTicks>, SampleError> {
    let mut cores = Vec::new();
    for line in content.lines() {
        let mut fields = line.split_whitespace();
        let Some(label) = fields.next() else {
            continue;
        };
        let Some(Ok(id)) = label
            .strip_prefix("cpu")
            .filter(|s| !s.is_empty())
            .map(str::parse::<usize>)
        else {
            continue;
        };
        let values: Vec<u64> = fields
            .take(4)
            .map(|f| f.parse::<u64>())
            .collect::<Result<_, _>>()
            .map_err(|e| SampleError::Parse {
                path: "/proc/stat",
                detail: format!("{label}: {e}"),
            })?;
        let [user, nice, system, idle] = values[..] else {
            return Err(SampleError::Parse {
                path: "/proc/stat",
                detail: format!("{label}: expected 4 tick fields, got {}", values.len()),
            });
        };
        cores.push(CoreTicks {
            id,
            user,
            system,
            idle,
            nice,
        });
    }
    if cores.is_empty() {
        return Err(SampleError::Parse {
            path: "/proc/stat",
            detail: "no per-core lines".into(),
        });
    }
    Ok(cores)
}

/// VM page counts from /proc/vmstat.
pub(super) fn read_vm_pages() -> Result<VmPages, SampleError> {
    #[cfg(target_os = "linux")]
    {
        let content = std::fs::read_to_string(PROC_VMSTAT).map_err(|source| SampleError::Io {
            path: PROC_VMSTAT,
            source,
        })?;
        parse_vmstat(&content)
    }
    #[cfg(not(target_os = "linux"))]
    Err(SampleError::Unavailable("VM page counters"))
}

/// active = nr_active_anon + nr_active_file, wired = nr_unevictable,
/// compressed = nr_zspages, free = nr_free_pages. Missing optional keys count as 0.
#[cfg_attr(not(target_os = "linux"), allow(dead_code))]
pub(super) fn parse_vmstat(content: &str) -> Result<VmPages, SampleError> {
    let mut pages = VmPages::default();
    let mut saw_free = false;
    for line in content.lines() {
        let Some((key, value)) = line.split_once(' ') else {
            continue;
        };
        let Ok(value) = value.trim().parse::<u64>() else {
            continue;
        };
        match key {
            "nr_active_anon" | "nr_active_file" => pages.active += value,
            "nr_unevictable" => pages.wired = value,
            "nr_zspages" => pages.compressed = value,
            "nr_free_pages" => {
                pages.free = value;
                saw_free = true;
            }
            _ => {}
        }
    }
    if !saw_free {
        return Err(SampleError::Parse {
            path: "/proc/vmstat",
            detail: "missing nr_free_pages".into(),
        });
    }
    Ok(pages)
}

/// Kernel page size in bytes, from `sysconf(_SC_PAGESIZE)`.
pub(super) fn page_size() -> Option<u64> {
    #[cfg(unix)]
    {
        // SAFETY: sysconf has no preconditions and only reads a configuration value.
        let size = unsafe { libc::sysconf(libc::_SC_PAGESIZE) };
        if size > 0 {
            return Some(size as u64);
        }
    }
    None
}

/// (performance, efficiency) logical CPU counts on hybrid parts that expose
/// cpu_core / cpu_atom PMUs. `None` on homogeneous machines.
pub(super) fn hybrid_core_counts() -> Option<(usize, usize)> {
    #[cfg(target_os = "linux")]
    {
        let p = std::fs::read_to_string("/sys/devices/cpu_core/cpus").ok()?;
        let e = std::fs::read_to_string("/sys/devices/cpu_atom/cpus").ok()?;
        let p = count_cpu_list(&p)?;
        let e = count_cpu_list(&e)?;
        if p > 0 && e > 0 {
            return Some((p, e));
        }
    }
    None
}

/// Counts CPUs in a kernel cpu list such as `0-15,20,22-23`.
#[cfg_attr(not(target_os = "linux"), allow(dead_code))]
pub(super) fn count_cpu_list(list: &str) -> Option<usize> {
    let list = list.trim();
    if list.is_empty() {
        return Some(0);
    }
    let mut count = 0;
    for part in list.split(',') {
        match part.split_once('-') {
            Some((lo, hi)) => {
                let lo = lo.trim().parse::<usize>().ok()?;
                let hi = hi.trim().parse::<usize>().ok()?;
                count += hi.checked_sub(lo)? + 1;
            }
            None => {
                part.trim().parse::<usize>().ok()?;
                count += 1;
            }
        }
    }
    Some(count)
}

/// Read network interface link speed from /sys/class/net/<interface>/speed (Linux).
/// Returns speed in bits per second, or 0 if unavailable.
pub(super) fn get_interface_speed(interface_name: &str) -> u64 {
    #[cfg(target_os = "linux")]
    {
        let path = format!("/sys/class/net/{}/speed", interface_name);
        if let Ok(content) = std::fs::read_to_string(&path)
            && let Ok(mbps) = content.trim().parse::<i64>()
            && mbps > 0
        {
            return (mbps as u64) * 1_000_000;
        }
    }
    #[cfg(not(target_os = "linux"))]
    let _ = interface_name;
    0
}

#[cfg(test)]
mod tests {
    use super::*;

    const PROC_STAT_SAMPLE: &str = "\
cpu  4705 356 584 3699 23 23 0 0 0 0
cpu0 1393 280 290 1800 8 11 0 0 0 0
cpu1 3312 76 294 1899 15 12 0 0 0 0
intr 114930548 113199788 3 0 5 263 0 4
ctxt 1990473
cpuidle 12
";

    #[test]
    fn parse_proc_stat_reads_per_core_lines() {
        let cores = parse_proc_stat(PROC_STAT_SAMPLE).unwrap();
        assert_eq!(cores.len(), 2);
        assert_eq!(
            cores[0],
            CoreTicks {
                id: 0,
                user: 1393,
                system: 290,
                idle: 1800,
                nice: 280
            }
        );
        assert_eq!(cores[1].user, 3312);
        assert_eq!(cores[1].nice, 76);
        assert_eq!(cores[1].id, 1);
    }

    #[test]
    fn parse_proc_stat_keeps_cpu_numbers_across_gaps() {
        let content = "cpu  9 9 9 9\ncpu0 1 0 1 8\ncpu2 3 0 1 6\ncpu5 2 0 2 6\n";
        let ids: Vec<usize> = parse_proc_stat(content)
            .unwrap()
            .iter()
            .map(|c| c.id)
            .collect();
        assert_eq!(ids, vec![0, 2, 5]);
    }

    #[test]
    fn parse_proc_stat_rejects_missing_cores() {
        assert!(parse_proc_stat("cpu  1 2 3 4\nintr 5\n").is_err());
    }

    #[test]
    fn parse_proc_stat_rejects_truncated_line() {
        assert!(parse_proc_stat("cpu0 1 2\n").is_err());
    }

    #[test]
    fn parse_vmstat_maps_page_classes() {
        let content = "\
nr_free_pages 1000
nr_zone_inactive_anon 5
nr_active_anon 200
nr_inactive_file 7
nr_active_file 300
nr_unevictable 40
nr_zspages 25
";
        let pages = parse_vmstat(content).unwrap();
        assert_eq!(
            pages,
            VmPages {
                active: 500,
                wired: 40,
                compressed: 25,
                free: 1000
            }
        );
    }

    #[test]
    fn parse_vmstat_requires_free_pages() {
        assert!(parse_vmstat("nr_active_anon 1\n").is_err());
    }

    #[cfg(unix)]
    #[test]
    fn page_size_is_a_power_of_two() {
        let size = page_size().unwrap();
        assert!(size >= 4096);
        assert!(size.is_power_of_two());
    }

    #[test]
    fn count_cpu_list_handles_ranges_and_singles() {
        assert_eq!(count_cpu_list("0-15\n"), Some(16));
        assert_eq!(count_cpu_list("16-23"), Some(8));
        assert_eq!(count_cpu_list("0-3,8,10-11"), Some(7));
        assert_eq!(count_cpu_list(""), Some(0));
        assert_eq!(count_cpu_list("3-1"), None);
        assert_eq!(count_cpu_list("x"), None);
    }
}
