//! Rupiah formatting for reports and tooltips.

use std::sync::OnceLock;

use numfmt::{Formatter, Precision, Scales};

/// Format whole rupiah with Indonesian digit grouping, e.g. "Rp 1.250.000".
pub fn format_rupiah(amount: i64) -> String {
    static POSITIVE_FMT: OnceLock<Formatter> = OnceLock::new();

    let positive_fmt = POSITIVE_FMT.get_or_init(|| {
        Formatter::currency("Rp ")
            .unwrap()
            .scales(Scales::none())
            .precision(Precision::Decimals(0))
    });

    static NEGATIVE_FMT: OnceLock<Formatter> = OnceLock::new();

    let negative_fmt = NEGATIVE_FMT.get_or_init(|| {
        Formatter::currency("-Rp ")
            .unwrap()
            .scales(Scales::none())
            .precision(Precision::Decimals(0))
    });

    // Zero is hardcoded as "0" by numfmt.
    let formatted = match amount {
        0 => return "Rp 0".to_owned(),
        amount if amount < 0 => negative_fmt.fmt_string(amount.unsigned_abs() as f64),
        amount => positive_fmt.fmt_string(amount as f64),
    };

    formatted.replace(',', ".")
}
