use core::fmt;

use crate::SleetId;

struct FieldLayout {
    name: &'static str,
    bits: u32,
    value: u64,
}

fn fields(id: &SleetId) -> [FieldLayout; 5] {
    [
        FieldLayout {
            name: "reserved",
            bits: 1,
            value: id.to_raw() >> 63,
        },
        FieldLayout {
            name: "millis",
            bits: SleetId::MILLIS_BITS,
            value: id.millis_offset(),
        },
        FieldLayout {
            name: "datacenter_id",
            bits: SleetId::DATACENTER_ID_BITS,
            value: id.datacenter_id(),
        },
        FieldLayout {
            name: "machine_id",
            bits: SleetId::MACHINE_ID_BITS,
            value: id.machine_id(),
        },
        FieldLayout {
            name: "sequence",
            bits: SleetId::SEQUENCE_BITS,
            value: id.sequence(),
        },
    ]
}

fn center(s: impl ToString, width: usize) -> String {
    let s = s.to_string();
    let len = s.len();
    if len >= width {
        return s;
    }
    let pad = width - len;
    let left = pad / 2;
    let right = pad - left;
    format!("{}{}{}", " ".repeat(left), s, " ".repeat(right))
}

fn write_border(f: &mut fmt::Formatter<'_>, columns: &[usize]) -> fmt::Result {
    write!(f, "        +")?;
    for &w in columns {
        write!(f, "{}+", "-".repeat(w))?;
    }
    writeln!(f)
}

/// Renders an ID as a table of its bit fields, in decimal and hex.
pub(crate) fn write_bit_layout_debug(f: &mut fmt::Formatter<'_>, id: &SleetId) -> fmt::Result {
    let fields = fields(id);

    // Widest of label, decimal and hex, plus padding
    let columns: Vec<usize> = fields
        .iter()
        .map(|field| {
            let label_len = format!("{} ({})", field.name, field.bits).len();
            let dec_len = field.value.to_string().len();
            let hex_len = format!("0x{:x}", field.value).len();
            label_len.max(dec_len).max(hex_len) + 2
        })
        .collect();

    writeln!(f, "SleetId {{")?;
    writeln!(f, "    raw id     : 0x{:016x} ({})", id.to_raw(), id.to_raw())?;
    writeln!(f, "    padded     : {}", id.to_padded_string())?;
    writeln!(f, "    layout     :")?;

    write_border(f, &columns)?;

    write!(f, "        |")?;
    for (field, &w) in fields.iter().zip(&columns) {
        write!(f, "{}|", center(format!("{} ({})", field.name, field.bits), w))?;
    }
    writeln!(f)?;

    write_border(f, &columns)?;

    write!(f, "        |")?;
    for (field, &w) in fields.iter().zip(&columns) {
        write!(f, "{}|", center(field.value, w))?;
    }
    writeln!(f)?;

    write!(f, "        |")?;
    for (field, &w) in fields.iter().zip(&columns) {
        write!(f, "{}|", center(format!("0x{:x}", field.value), w))?;
    }
    writeln!(f)?;

    write_border(f, &columns)?;

    write!(f, "}}")
}
