use crate::{assemble, Width};

use proptest::prelude::*;

fn accepts(source: &str) -> bool {
    assemble(source, 0).is_ok()
}

#[test]
fn boundaries() {
    let cases = [
        ("LD B, {}", Width::Either8),
        ("ADD SP, {}", Width::Signed8),
        ("LD BC, {}", Width::Either16),
        ("JP {}", Width::Unsigned16),
        ("BIT {}, A", Width::BitIndex),
    ];
    for (template, width) in cases {
        let (low, high) = (*width.range().start(), *width.range().end());
        for (value, ok) in [(low, true), (high, true), (low - 1, false), (high + 1, false)] {
            let source = template.replace("{}", &value.to_string());
            assert_eq!(accepts(&source), ok, "{source}");
        }
    }
}

#[test]
fn unsigned8_boundaries() {
    assert!(accepts("LDH (0x00), A"));
    assert!(accepts("LDH (0xFF), A"));
    assert!(!accepts("LDH (0x100), A"));
    assert!(!accepts("LDH (0xFEFF), A"));
    assert!(accepts("LDH (0xFF00), A"));
    assert!(accepts("LDH (0xFFFF), A"));
}

proptest! {
    #[test]
    fn either8(value in -70_000..70_000_i32) {
        prop_assert_eq!(accepts(&format!("LD B, {value}")), (-128..=255).contains(&value));
    }

    #[test]
    fn signed8(value in -70_000..70_000_i32) {
        prop_assert_eq!(accepts(&format!("ADD SP, {value}")), (-128..=127).contains(&value));
    }

    #[test]
    fn either16(value in -100_000..100_000_i32) {
        prop_assert_eq!(accepts(&format!("LD HL, {value}")), (-32768..=65535).contains(&value));
    }

    #[test]
    fn unsigned16(value in -100_000..100_000_i32) {
        prop_assert_eq!(accepts(&format!("CALL {value}")), (0..=65535).contains(&value));
    }

    #[test]
    fn bit_index(value in -20..20_i32) {
        prop_assert_eq!(accepts(&format!("SET {value}, (HL)")), (0..=7).contains(&value));
    }

    #[test]
    fn high_page(value in 0..0x1_0000_i32) {
        let ok = value <= 0xff || value >= 0xff00;
        prop_assert_eq!(accepts(&format!("LDH A, ({value})")), ok);
    }

    #[test]
    fn width_check(value in any::<i32>()) {
        for width in [Width::Either8, Width::Signed8, Width::Either16, Width::BitIndex] {
            prop_assert_eq!(width.check(value).is_ok(), width.range().contains(&value));
        }
    }
}
