use crate::config::Configuration;
use crate::frame::Frame;
use crate::node::Node;
use crate::registers::*;
use bytes::Bytes;

/// Payload sizes of the burst scenarios
const BURST_SIZES: [usize; 21] = [
    32, 28, 27, 253, 1, 31, 128, 200, 12, 7, 0, 29, 88, 253, 252, 13, 55, 60, 34, 200, 149,
];

fn burst_frame(index: usize) -> Vec<u8> {
    let payload: Vec<u8> = (0..BURST_SIZES[index])
        .map(|i| (index as u8).wrapping_add(i as u8))
        .collect();
    Frame::new(0x01, 0x02, Bytes::from(payload)).unwrap().encode()
}

fn drain_frame(node: &mut Node, len: usize) -> Vec<u8> {
    let data = (0..len).map(|_| node.register_read(REG_RX)).collect();
    node.register_write(
        REG_RX_CTRL,
        RxCtrl::new().with_clr_pending(true).with_rst_pointer(true).into(),
    );
    data
}

fn stage(node: &mut Node, data: &[u8]) {
    for byte in data {
        node.register_write(REG_TX, *byte);
    }
}

fn start(node: &mut Node) {
    node.register_write(REG_TX_CTRL, TxCtrl::new().with_start(true).with_rst_pointer(true).into());
}

#[test]
fn test_version_register() {
    let mut node = Node::new(0x01);
    assert_eq!(VERSION, node.register_read(REG_VERSION));
}

#[test]
fn test_setting_roundtrip() {
    let mut node = Node::new(0x01);

    node.register_write(REG_SETTING, 0b0001_0101);
    assert_eq!(0b0001_0101, node.register_read(REG_SETTING));
    assert!(node.config().user_crc);
    assert!(node.config().tx_push_pull);
}

#[test]
fn test_sixteen_bit_registers() {
    let mut node = Node::new(0x01);

    node.register_write(REG_TX_PERMIT_LEN_H, 0x01);
    node.register_write(REG_TX_PERMIT_LEN_L, 0x44);
    assert_eq!(0x0144, node.config().tx_permit_len);

    node.register_write(REG_DIV_LS_H, 0x00);
    node.register_write(REG_DIV_LS_L, 39);
    node.register_write(REG_DIV_HS_H, 0x00);
    node.register_write(REG_DIV_HS_L, 3);
    assert_eq!(39, node.register_read(REG_DIV_LS_L));
    assert_eq!(3, node.register_read(REG_DIV_HS_L));

    node.register_write(REG_MAX_IDLE_LEN_L, 0xf4);
    node.register_write(REG_MAX_IDLE_LEN_H, 0x01);
    assert_eq!(0x01f4, node.config().max_idle_len);
}

#[test]
fn test_filter_registers() {
    let mut node = Node::new(0x01);

    node.register_write(REG_FILTER, 0x03);
    node.register_write(REG_FILTER1, 0x09);
    node.register_write(REG_FILTER2, 0x0c);

    assert_eq!(0x03, node.register_read(REG_FILTER));
    assert_eq!(0x09, node.register_read(REG_FILTER1));
    assert_eq!(0x0c, node.register_read(REG_FILTER2));
}

#[test]
fn test_start_arms_pending_frame() {
    let mut node = Node::new(0x01);
    assert!(!node.wants_tx());

    stage(&mut node, &[0x01, 0x02, 0x01, 0xcd]);
    assert!(!node.flags().tx_buf_clean());

    start(&mut node);
    assert!(node.wants_tx());
    assert_eq!(0x01u8.reverse_bits(), node.arbitration_key());

    // Engine appends the checksum on the way out
    assert_eq!(vec![0x01, 0x02, 0x01, 0xcd, 0x60, 0x1d], node.begin_tx());

    node.complete_tx();
    assert!(!node.wants_tx());
    assert!(node.flags().tx_buf_clean());
}

#[test]
fn test_user_crc_sends_trailer_verbatim() {
    let mut node = Node::new(0x01);
    node.register_write(REG_SETTING, 0b0001_0100);

    stage(&mut node, &[0x01, 0x02, 0x01, 0xcd, 0x90, 0x91]);
    start(&mut node);

    assert_eq!(vec![0x01, 0x02, 0x01, 0xcd, 0x90, 0x91], node.begin_tx());
}

#[test]
fn test_start_with_empty_staging() {
    let mut node = Node::new(0x01);
    start(&mut node);

    assert!(!node.wants_tx());
    assert!(node.flags().tx_error());
}

#[test]
fn test_staging_overflow() {
    let mut node = Node::new(0x01);

    for _ in 0..300 {
        node.register_write(REG_TX, 0x0);
    }

    assert!(node.flags().tx_error());
}

#[test]
fn test_abort_then_replace() {
    let mut node = Node::new(0x01);

    stage(&mut node, &[0x01, 0x02, 0x01, 0xaa]);
    start(&mut node);

    node.register_write(REG_TX_CTRL, TxCtrl::new().with_abort(true).into());
    assert!(!node.wants_tx());

    stage(&mut node, &[0x01, 0x02, 0x01, 0xcd]);
    start(&mut node);

    // Only the replacement frame goes out
    assert_eq!(vec![0x01, 0x02, 0x01, 0xcd, 0x60, 0x1d], node.begin_tx());
}

#[test]
fn test_reset_pointer_discards_staging() {
    let mut node = Node::new(0x01);

    stage(&mut node, &[0x55, 0x55]);
    node.register_write(REG_TX_CTRL, TxCtrl::new().with_rst_pointer(true).into());
    assert!(node.flags().tx_buf_clean());
}

#[test]
fn test_receive_accepted_frame() {
    let mut node = Node::new(0x02);

    node.receive_frame(&[0x01, 0x02, 0x01, 0xcd, 0x60, 0x1d]);
    assert!(node.flags().rx_pending());

    let read: Vec<u8> = (0..6).map(|_| node.register_read(REG_RX)).collect();
    assert_eq!(vec![0x01, 0x02, 0x01, 0xcd, 0x60, 0x1d], read);

    node.register_write(REG_RX_CTRL, RxCtrl::new().with_clr_pending(true).with_rst_pointer(true).into());
    assert!(!node.flags().rx_pending());
}

#[test]
fn test_receive_filtered_out() {
    let mut node = Node::new(0x05);

    node.receive_frame(&[0x01, 0x02, 0x01, 0xcd, 0x60, 0x1d]);
    assert!(!node.flags().rx_pending());
    assert!(!node.flags().rx_error());
}

#[test]
fn test_receive_broken_frame_discarded() {
    let mut node = Node::new(0x02);

    node.receive_frame(&[0x01, 0x02, 0x01, 0xcd, 0x60, 0x1e]);
    assert!(node.flags().rx_error());
    assert!(!node.flags().rx_pending());

    node.register_write(REG_RX_CTRL, RxCtrl::new().with_clr_error(true).into());
    assert!(!node.flags().rx_error());
}

#[test]
fn test_no_drop_keeps_broken_frame() {
    let mut node = Node::new(0x02);
    node.register_write(REG_SETTING, 0b0001_1000);

    node.receive_frame(&[0x01, 0x02, 0x01, 0xcd, 0x60, 0x1e]);
    assert!(node.flags().rx_error());
    assert!(node.flags().rx_pending());
}

#[test]
fn test_receive_runt_frame() {
    let mut node = Node::new(0x02);

    node.receive_frame(&[0x01, 0x02]);
    assert!(node.flags().rx_error());
    assert!(!node.flags().rx_pending());
}

#[test]
fn test_rx_lost_on_overflow() {
    let config = Configuration {
        filter: 0x02,
        ..Default::default()
    };
    let mut node = Node::with_config(config, 2);

    for _ in 0..3 {
        node.receive_frame(&[0x01, 0x02, 0x01, 0xcd, 0x60, 0x1d]);
    }

    assert!(node.flags().rx_lost());
    node.register_write(REG_RX_CTRL, RxCtrl::new().with_clr_lost(true).into());
    assert!(!node.flags().rx_lost());
}

#[test]
fn test_initial_flags() {
    let mut node = Node::new(0x01);
    let flags = node.flags();

    assert!(flags.tx_buf_clean());
    assert!(!flags.rx_pending());
    assert!(!flags.tx_error());
}

#[test]
fn test_burst_no_drop_keeps_first_pages() {
    let config = Configuration {
        filter: 0x02,
        no_drop: true,
        ..Default::default()
    };
    let mut node = Node::with_config(config, 8);

    for index in 0..BURST_SIZES.len() {
        node.receive_frame(&burst_frame(index));
    }

    assert!(node.flags().rx_lost());
    assert_eq!(0xff, node.register_read(REG_RX_PAGE_FLAG));

    // First eight frames survive byte-exact and in order
    for index in 0..8 {
        let expected = burst_frame(index);
        assert_eq!(expected, drain_frame(&mut node, expected.len()));
    }

    assert!(!node.flags().rx_pending());
}

#[test]
fn test_burst_default_overwrites_oldest() {
    let config = Configuration {
        filter: 0x02,
        ..Default::default()
    };
    let mut node = Node::with_config(config, 8);

    for index in 0..BURST_SIZES.len() {
        node.receive_frame(&burst_frame(index));
    }

    assert!(node.flags().rx_lost());

    // Newest eight frames survive, oldest were overwritten
    for index in 13..21 {
        let expected = burst_frame(index);
        assert_eq!(expected, drain_frame(&mut node, expected.len()));
    }

    assert!(!node.flags().rx_pending());
}

#[test]
fn test_rx_reset_clears_everything() {
    let mut node = Node::new(0x02);

    node.receive_frame(&[0x01, 0x02, 0x01, 0xcd, 0x60, 0x1d]);
    node.receive_break();
    node.register_write(REG_RX_CTRL, RxCtrl::new().with_rst(true).into());

    let flags = node.flags();
    assert!(!flags.rx_pending());
    assert!(!flags.rx_break());
}

#[test]
fn test_permit_threshold() {
    let mut node = Node::new(0x01);
    // arbitrate mode, defaults
    assert_eq!(30, node.permit_threshold());

    // plain mode waits for idle only
    node.register_write(REG_SETTING, 0x0);
    assert_eq!(10, node.permit_threshold());

    // full duplex ignores the permit window
    node.register_write(REG_SETTING, 0b0101_0000);
    assert_eq!(10, node.permit_threshold());

    // max idle caps the wait
    node.register_write(REG_SETTING, 0b0001_0000);
    node.register_write(REG_MAX_IDLE_LEN_L, 15);
    assert_eq!(15, node.permit_threshold());
}

#[test]
fn test_lose_arbitration_retries_in_arbitrate_mode() {
    let mut node = Node::new(0x01);
    stage(&mut node, &[0x01, 0x02, 0x01, 0xcd]);
    start(&mut node);

    node.lose_arbitration();
    assert!(node.flags().tx_cd());
    assert!(node.wants_tx());

    node.register_write(REG_TX_CTRL, TxCtrl::new().with_clr_cd(true).into());
    assert!(!node.flags().tx_cd());
}

#[test]
fn test_lose_arbitration_disarms_without_arbitrate() {
    let mut node = Node::new(0x01);
    node.register_write(REG_SETTING, 0x0);

    stage(&mut node, &[0x01, 0x02, 0x01, 0xcd]);
    start(&mut node);

    node.lose_arbitration();
    assert!(node.flags().tx_cd());
    assert!(!node.wants_tx());
}

#[test]
fn test_restart_after_arbitration_loss() {
    let mut node = Node::new(0x01);
    node.register_write(REG_SETTING, 0x0);

    stage(&mut node, &[0x01, 0x02, 0x01, 0xcd]);
    start(&mut node);

    // Without arbitrate mode the loss disarms the frame but keeps it
    node.lose_arbitration();
    assert!(!node.wants_tx());

    start(&mut node);
    assert!(node.wants_tx());
    assert!(!node.flags().tx_error());
    assert_eq!(vec![0x01, 0x02, 0x01, 0xcd, 0x60, 0x1d], node.begin_tx());
}

#[test]
fn test_begin_tx_without_pending_frame() {
    let mut node = Node::new(0x01);

    assert!(node.begin_tx().is_empty());
    assert!(!node.is_transmitting());
}

#[test]
fn test_full_duplex_ignores_collision() {
    let mut node = Node::new(0x01);
    node.register_write(REG_SETTING, 0b0100_0000);

    stage(&mut node, &[0x01, 0x02, 0x01, 0xcd]);
    start(&mut node);

    node.lose_arbitration();
    assert!(!node.flags().tx_cd());
    assert!(node.wants_tx());
}

#[test]
fn test_irq_line() {
    let mut node = Node::new(0x02);
    assert!(!node.irq());

    node.register_write(REG_INT_MASK, IntFlag::new().with_rx_pending(true).into());
    assert!(!node.irq());

    node.receive_frame(&[0x01, 0x02, 0x01, 0xcd, 0x60, 0x1d]);
    assert!(node.irq());

    node.register_write(REG_RX_CTRL, RxCtrl::new().with_clr_pending(true).into());
    assert!(!node.irq());
}

#[test]
fn test_send_break_request() {
    let mut node = Node::new(0x01);
    assert!(!node.wants_break());

    node.register_write(REG_TX_CTRL, TxCtrl::new().with_send_break(true).into());
    assert!(node.wants_break());

    node.begin_break();
    node.complete_break();
    assert!(!node.wants_break());
}
