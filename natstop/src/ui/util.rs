//! Small UI helpers: human-readable sizes, truncation.

/// Byte (or message) count with a binary K/M/G suffix and one decimal.
pub fn psize(n: u64) -> String {
    const K: f64 = 1024.0;
    let b = n as f64;
    if b < K {
        return format!("{n}");
    }
    let kb = b / K;
    if kb < K {
        return format!("{kb:.1}K");
    }
    let mb = kb / K;
    if mb < K {
        return format!("{mb:.1}M");
    }
    format!("{:.1}G", mb / K)
}

pub fn truncate_middle(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    if max <= 3 {
        return "...".into();
    }
    let chars: Vec<char> = s.chars().collect();
    let keep = max - 3;
    let left = keep / 2;
    let right = keep - left;
    let head: String = chars[..left].iter().collect();
    let tail: String = chars[chars.len() - right..].iter().collect();
    format!("{head}...{tail}")
}
