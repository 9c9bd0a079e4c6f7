//! Memory Target Unit Tests.
//!
//! Verifies byte-enable masking on reads and writes, modulo-size address
//! wraparound, rejection of unsupported transaction shapes, and latency
//! annotation through the memory controller.

use pretty_assertions::assert_eq;
use proptest::prelude::*;
use rstest::rstest;

use crate::common::harness::{mask, memory};
use crate::common::mocks::controller::MockController;
use tlmsim_core::SimTime;
use tlmsim_core::common::SimError;
use tlmsim_core::soc::memory::Memory;
use tlmsim_core::soc::memory::controller::SimpleController;
use tlmsim_core::soc::traits::Target;
use tlmsim_core::tlm::{Command, ResponseStatus, Transaction};

fn write_word(mem: &mut Memory, address: u64, value: u32, m: u32) -> (ResponseStatus, SimTime) {
    let mut data = value.to_le_bytes();
    let be = mask(m);
    let mut txn = Transaction::write(address, &mut data).with_byte_enable(&be);
    let mut delay = SimTime::ZERO;
    mem.submit(&mut txn, &mut delay);
    (txn.response_status(), delay)
}

fn read_word(mem: &mut Memory, address: u64, m: u32) -> (ResponseStatus, u32) {
    let mut data = [0xEEu8; 4];
    let be = mask(m);
    let mut txn = Transaction::read(address, &mut data).with_byte_enable(&be);
    let mut delay = SimTime::ZERO;
    mem.submit(&mut txn, &mut delay);
    let status = txn.response_status();
    (status, u32::from_le_bytes(data))
}

// ══════════════════════════════════════════════════════════
// 1. Construction
// ══════════════════════════════════════════════════════════

#[rstest]
#[case(0)]
#[case(100)]
#[case(255)]
fn rejects_non_power_of_two_sizes(#[case] size: usize) {
    let result = Memory::with_latency(size, SimTime::ZERO, SimTime::ZERO);
    assert!(matches!(result, Err(SimError::InvalidMemorySize(s)) if s == size));
}

#[test]
fn load_and_dump_words() {
    let mut mem = memory(0, 0);
    mem.load(&[0x78, 0x56, 0x34, 0x12, 0xEF, 0xBE], 0);
    assert_eq!(mem.read_word(0), 0x1234_5678);
    assert_eq!(mem.dump_words(2), vec![(0, 0x1234_5678), (4, 0x0000_BEEF)]);
}

// ══════════════════════════════════════════════════════════
// 2. Byte-enable masking
// ══════════════════════════════════════════════════════════

#[test]
fn read_after_write_with_byte_enables() {
    let mut mem = memory(0, 0);
    assert_eq!(
        write_word(&mut mem, 0x20, 0xAABB_CCDD, 0xFFFF_FFFF).0,
        ResponseStatus::Ok
    );
    assert_eq!(
        write_word(&mut mem, 0x20, 0x1122_3344, 0x00FF_00FF).0,
        ResponseStatus::Ok
    );

    assert_eq!(
        read_word(&mut mem, 0x20, 0xFFFF_FFFF),
        (ResponseStatus::Ok, 0xAA22_CC44)
    );
    assert_eq!(
        read_word(&mut mem, 0x20, 0x0000_FFFF),
        (ResponseStatus::Ok, 0x0000_CC44)
    );
}

#[test]
fn write_without_byte_enable_stores_every_lane() {
    let mut mem = memory(0, 0);
    mem.fill(0x55);
    let mut data = [1u8, 2];
    let mut txn = Transaction::write(0x10, &mut data);
    let mut delay = SimTime::ZERO;
    mem.submit(&mut txn, &mut delay);
    assert!(txn.is_response_ok());
    assert_eq!(mem.read_word(0x10), 0x5555_0201);
}

proptest! {
    #[test]
    fn masked_write_merges_bitwise(old: u32, data: u32, m: u32, addr in 0u64..252) {
        let mut mem = memory(0, 0);
        mem.load(&old.to_le_bytes(), addr);
        let (status, _) = write_word(&mut mem, addr, data, m);
        prop_assert_eq!(status, ResponseStatus::Ok);
        prop_assert_eq!(mem.read_word(addr), (old & !m) | (data & m));
    }

    #[test]
    fn masked_read_returns_stored_and_mask(stored: u32, m: u32) {
        let mut mem = memory(0, 0);
        mem.load(&stored.to_le_bytes(), 0x40);
        prop_assert_eq!(read_word(&mut mem, 0x40, m), (ResponseStatus::Ok, stored & m));
    }
}

// ══════════════════════════════════════════════════════════
// 3. Address wraparound
// ══════════════════════════════════════════════════════════

#[rstest]
#[case(256, 0)]
#[case(256 + 7, 7)]
#[case(0xFF00_0000, 0)]
#[case(u64::MAX, 255)]
fn addresses_wrap_modulo_size(#[case] address: u64, #[case] offset: u64) {
    let mut mem = memory(0, 0);
    let mut data = [0x5A];
    let mut txn = Transaction::write(address, &mut data);
    let mut delay = SimTime::ZERO;
    mem.submit(&mut txn, &mut delay);
    assert!(txn.is_response_ok());
    assert_eq!(mem.peek(offset), 0x5A);
}

#[test]
fn word_straddling_the_end_wraps_per_lane() {
    let mut mem = memory(0, 0);
    let _ = write_word(&mut mem, 254, 0x4433_2211, 0xFFFF_FFFF);
    assert_eq!(mem.peek(254), 0x11);
    assert_eq!(mem.peek(255), 0x22);
    assert_eq!(mem.peek(0), 0x33);
    assert_eq!(mem.peek(1), 0x44);
    assert_eq!(read_word(&mut mem, 254, 0xFFFF_FFFF).1, 0x4433_2211);
}

// ══════════════════════════════════════════════════════════
// 4. Protocol rejection
// ══════════════════════════════════════════════════════════

#[derive(Clone, Copy, Debug)]
enum BadShape {
    ZeroLength,
    TooLong,
    Streaming,
    ShortData,
    ShortByteEnable,
}

fn submit_bad(mem: &mut Memory, shape: BadShape, command: Command) -> (ResponseStatus, SimTime) {
    let mut small = [0xAAu8; 2];
    let mut word = [0xAAu8; 4];
    let mut wide = [0xAAu8; 8];
    let short_be = [0xFFu8; 2];
    let mut txn = match shape {
        BadShape::ZeroLength => Transaction::new(command, 0, &mut word).with_length(0),
        BadShape::TooLong => Transaction::new(command, 0, &mut wide),
        BadShape::Streaming => Transaction::new(command, 0, &mut word).with_streaming_width(2),
        BadShape::ShortData => Transaction::new(command, 0, &mut small)
            .with_length(4)
            .with_streaming_width(4),
        BadShape::ShortByteEnable => {
            Transaction::new(command, 0, &mut word).with_byte_enable(&short_be)
        }
    };
    let mut delay = SimTime::from_ns(3);
    mem.submit(&mut txn, &mut delay);
    (txn.response_status(), delay)
}

#[rstest]
fn unsupported_shapes_leave_memory_untouched(
    #[values(
        BadShape::ZeroLength,
        BadShape::TooLong,
        BadShape::Streaming,
        BadShape::ShortData,
        BadShape::ShortByteEnable
    )]
    shape: BadShape,
    #[values(Command::Read, Command::Write)] command: Command,
) {
    let mut mem = memory(5, 5);
    mem.fill(0x11);
    let before = mem.as_bytes().to_vec();

    let (status, delay) = submit_bad(&mut mem, shape, command);

    assert_eq!(status, ResponseStatus::Error);
    assert_eq!(delay, SimTime::from_ns(3), "rejection must not charge time");
    assert_eq!(mem.as_bytes(), before.as_slice());
}

#[test]
fn rejected_access_never_reaches_the_controller() {
    let mut controller = MockController::new();
    let _ = controller.expect_access_latency().never();
    let mut mem = Memory::new(256, Box::new(controller)).unwrap();
    let (status, _) = submit_bad(&mut mem, BadShape::TooLong, Command::Write);
    assert_eq!(status, ResponseStatus::Error);
}

#[test]
fn memory_with_mocked_controller_formats_without_it() {
    let mem = Memory::new(64, Box::new(MockController::new()))
        .unwrap()
        .named("sram");
    let text = format!("{mem:?}");
    assert!(text.starts_with("Memory"));
    assert!(text.contains("\"sram\""));
    assert!(text.contains("size: 64"));
    assert_eq!(mem.name(), "sram");
}

// ══════════════════════════════════════════════════════════
// 5. Latency annotation
// ══════════════════════════════════════════════════════════

#[test]
fn latency_is_added_to_the_incoming_delay() {
    let mut mem = memory(3, 8);
    let mut data = [0u8; 4];
    let mut txn = Transaction::read(0, &mut data);
    let mut delay = SimTime::from_ns(7);
    mem.submit(&mut txn, &mut delay);
    assert_eq!(delay, SimTime::from_ns(10));

    let mut txn = Transaction::write(0, &mut data);
    let mut delay = SimTime::ZERO;
    mem.submit(&mut txn, &mut delay);
    assert_eq!(delay, SimTime::from_ns(8));
}

#[test]
fn uniform_controller_charges_reads_and_writes_alike() {
    let controller = SimpleController::uniform(SimTime::from_ns(4));
    assert_eq!(controller.read_latency(), controller.write_latency());
    let mut mem = Memory::new(256, Box::new(controller)).unwrap();

    let (_, write_delay) = write_word(&mut mem, 0, 0x55, 0xFFFF_FFFF);
    let mut data = [0u8; 4];
    let mut txn = Transaction::read(0, &mut data);
    let mut read_delay = SimTime::ZERO;
    mem.submit(&mut txn, &mut read_delay);

    assert_eq!(write_delay, SimTime::from_ns(4));
    assert_eq!(read_delay, SimTime::from_ns(4));
}

#[test]
fn controller_sees_command_and_wrapped_offset() {
    let mut controller = MockController::new();
    let _ = controller
        .expect_access_latency()
        .withf(|command, addr| *command == Command::Write && *addr == 0x10)
        .times(1)
        .return_const(SimTime::from_ns(9));
    let mut mem = Memory::new(256, Box::new(controller)).unwrap();

    let (status, delay) = write_word(&mut mem, 0x110, 1, 0xFFFF_FFFF);
    assert_eq!(status, ResponseStatus::Ok);
    assert_eq!(delay, SimTime::from_ns(9));
}

#[test]
fn ignore_command_completes_without_side_effects() {
    let mut mem = memory(5, 5);
    mem.fill(0x33);
    let mut data = [0u8; 4];
    let mut txn = Transaction::new(Command::None, 0x8, &mut data);
    let mut delay = SimTime::ZERO;
    mem.submit(&mut txn, &mut delay);
    assert_eq!(txn.response_status(), ResponseStatus::Ok);
    assert_eq!(delay, SimTime::ZERO);
    assert_eq!(data, [0u8; 4]);
    assert_eq!(mem.read_word(0x8), 0x3333_3333);
}
