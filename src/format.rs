// Human-readable byte counts and rates (binary units).

const KIB: f64 = 1024.0;
const MIB: f64 = KIB * 1024.0;
const GIB: f64 = MIB * 1024.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ByteUnit {
    Bytes,
    Kibibytes,
    Mebibytes,
    Gibibytes,
}

impl ByteUnit {
    pub fn divisor(self) -> f64 {
        match self {
            ByteUnit::Bytes => 1.0,
            ByteUnit::Kibibytes => KIB,
            ByteUnit::Mebibytes => MIB,
            ByteUnit::Gibibytes => GIB,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            ByteUnit::Bytes => "B",
            ByteUnit::Kibibytes => "KiB",
            ByteUnit::Mebibytes => "MiB",
            ByteUnit::Gibibytes => "GiB",
        }
    }

    /// Largest unit that keeps the value at or above 1.
    pub fn best_for(value: f64) -> Self {
        if value >= GIB {
            ByteUnit::Gibibytes
        } else if value >= MIB {
            ByteUnit::Mebibytes
        } else if value >= KIB {
            ByteUnit::Kibibytes
        } else {
            ByteUnit::Bytes
        }
    }
}

/// Up to two decimals below 10, one below 100, none above; trailing zeros dropped.
pub fn format_bytes(bytes: f64, unit: Option<ByteUnit>) -> String {
    let unit = unit.unwrap_or_else(|| ByteUnit::best_for(bytes));
    let value = bytes / unit.divisor();
    let decimals = if value < 10.0 {
        2
    } else if value < 100.0 {
        1
    } else {
        0
    };
    let mut number = format!("{value:.decimals$}");
    if number.contains('.') {
        number = number.trim_end_matches('0').trim_end_matches('.').to_string();
    }
    format!("{} {}", number, unit.symbol())
}

pub fn format_rate(bytes_per_sec: f64, unit: Option<ByteUnit>) -> String {
    format!("{}/s", format_bytes(bytes_per_sec, unit))
}

/// Fixed-width style used in narrow displays: "1.50 GiB", "12.0 MiB", "512 B".
pub fn format_compact(bytes: u64) -> String {
    let value = bytes as f64;
    let unit = ByteUnit::best_for(value);
    if unit == ByteUnit::Bytes {
        return format!("{value:.0} B");
    }
    let scaled = value / unit.divisor();
    if scaled >= 100.0 {
        format!("{scaled:.0} {}", unit.symbol())
    } else if scaled >= 10.0 {
        format!("{scaled:.1} {}", unit.symbol())
    } else {
        format!("{scaled:.2} {}", unit.symbol())
    }
}
