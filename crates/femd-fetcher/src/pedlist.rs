//! Formatting for the pedestal/threshold dump captured by `LIST ped`/`LIST thr`.

use femd_codec::item::PedThrEntry;

/// Channels per ASIC for both AGET (72 = 4 × 18) and AFTER family lists;
/// `spec.md` names the entry counts but not the asic/channel grouping, so
/// this divides the list evenly across the fixed 4-ASIC-per-card layout.
const ASICS_PER_CARD: usize = 4;

/// Render a decoded pedestal/threshold list as the text the disk sink
/// writes for `LIST ped`/`LIST thr`: a `fem <id>` header line followed by
/// one `ped <asic> <ch> 0x<hex> (<dec>)` line per entry, in list order.
pub fn format_ped_list(fem_id: u8, entries: &[PedThrEntry]) -> String {
    let per_asic = entries.len().div_ceil(ASICS_PER_CARD).max(1);
    let mut out = format!("fem {}\n", fem_id);
    for (i, entry) in entries.iter().enumerate() {
        let asic = i / per_asic;
        let ch = i % per_asic;
        out.push_str(&format!("ped {} {} 0x{:04x} ({})\n", asic, ch, entry.pedestal, entry.pedestal));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scenario_s1_pedestal_list_capture() {
        let entries: Vec<PedThrEntry> = (0..72u16).map(|i| PedThrEntry { pedestal: i, threshold: i * 2 }).collect();
        let text = format_ped_list(3, &entries);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "fem 3");
        assert_eq!(lines.len(), 73);
        assert_eq!(lines[1], "ped 0 0 0x0000 (0)");
        assert_eq!(lines[72], format!("ped 3 17 0x0047 (71)"));
    }
}
