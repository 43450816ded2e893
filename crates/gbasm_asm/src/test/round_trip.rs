use super::single;

use gbasm_isa::{decode, decode_length, PREFIX};

/// Decode every opcode with the given operand bytes, print it and assemble the text again.
fn round_trip(operands: [u8; 2]) {
    for op in 0..=255_u8 {
        let len = decode_length(op);
        if len == 0 || op == PREFIX {
            continue;
        }
        let mut bytes = vec![op];
        bytes.extend_from_slice(&operands[..len - 1]);
        // STOP is always followed by a zero byte.
        if op == 0x10 {
            bytes[1] = 0x00;
        }
        let ins = decode(&bytes).unwrap();
        assert_eq!(single(&ins.to_string()), ins, "{ins}");
    }
}

#[test]
fn base_set() {
    round_trip([0x12, 0x34]);
    round_trip([0xfe, 0xff]);
}

#[test]
fn extended_set() {
    for op in 0..=255_u8 {
        let ins = decode(&[PREFIX, op]).unwrap();
        let again = single(&ins.to_string());
        assert_eq!(again, ins, "{ins}");
        assert_eq!(again.opcode(), ins.opcode());
    }
}
